// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI en utilisant les widgets de ratatui
//
// DISPOSITION :
// ┌──────────────── Header ─────────────────┐
// │ Réglages      │ Aperçu                  │
// │ (barre        │ - Graphique TradingView │
// │  latérale)    │ - Niveaux clés          │
// │               │ - Actualités            │
// └──────────────── Footer ─────────────────┘
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones (vertical puis horizontal)
// 3. Paragraph + Wrap : texte long replié sur plusieurs lignes
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::api::NewsFeed;
use crate::app::{App, Control, Screen};
use crate::report::{format_price, DashboardReport, LevelsPanel, WidgetSection, INTRADAY_NOTE};
use crate::ui::candlestick_text;

/// Largeur de la barre latérale des réglages
const SIDEBAR_WIDTH: u16 = 32;

/// Dessine l'interface complète
///
/// CONCEPT RUST : Routing avec match sur enum
/// - Le compilateur garantit l'exhaustivité (tous les écrans gérés)
pub fn render(frame: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Dashboard => render_dashboard(frame, app),
        Screen::ChartView => candlestick_text::render_candlestick_chart(frame, app, frame.size()),
    }
}

/// Dessine le dashboard : header, réglages + aperçu, footer
fn render_dashboard(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(frame, app, body[0]);
    render_overview(frame, app, body[1]);
    render_footer(frame, app, chunks[2]);
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header
// ============================================================================

/// Dessine le header : nom de l'actif, ou l'indicateur de chargement
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" MarketDash ")
        .title_alignment(Alignment::Center);

    let line = if app.is_loading_data() {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Chargement en cours...".to_string());
        Line::from(Span::styled(
            format!("⏳ {}", message),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    } else {
        let title = match &app.report {
            Some(report) => report.title(),
            None => app.settings.asset_name.clone(),
        };
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ))
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Barre latérale : réglages
// ============================================================================

/// Dessine les contrôles (actif, période, intervalle, widget)
///
/// Le contrôle qui a le focus est affiché en inversé, avec des flèches ◀ ▶
fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" ⚙ Réglages ");

    let mut lines = vec![Line::from("")];
    for control in Control::all() {
        let focused = control == app.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(format!(" {}", control.label()), label_style)));

        let value = control_value(app, control);
        let value_line = if focused {
            Line::from(Span::styled(
                format!(" ◀ {} ▶", value),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED),
            ))
        } else {
            Line::from(Span::raw(format!("   {}", value)))
        };
        lines.push(value_line);
        lines.push(Line::from(""));
    }

    if let Some(entry) = app.selected_asset() {
        lines.push(Line::from(Span::styled(
            format!(" {} · {}", entry.class.label(), entry.provider_symbol),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Valeur affichée pour un contrôle
fn control_value(app: &App, control: Control) -> String {
    match control {
        Control::Asset => app.settings.asset_name.clone(),
        Control::Period => app.settings.period.label().to_string(),
        Control::Interval => app.settings.interval.label().to_string(),
        Control::Widget => {
            let mark = if app.settings.show_widget { "x" } else { " " };
            format!("[{}] Afficher", mark)
        }
    }
}

// ============================================================================
// Aperçu : widget, niveaux, actualités
// ============================================================================

/// Dessine l'aperçu du dernier rapport
fn render_overview(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📊 Aperçu ");

    let lines = match &app.report {
        Some(report) => overview_lines(report),
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "Aucune donnée chargée",
                Style::default().fg(Color::Gray),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Construit les lignes de l'aperçu, section par section
///
/// CONCEPT : Chaque section "pattern-match" le résultat de son étape
/// - Une étape en échec affiche un message, les suivantes restent visibles
fn overview_lines(report: &DashboardReport) -> Vec<Line<'static>> {
    let section = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let muted = Style::default().fg(Color::Gray);
    let warning = Style::default().fg(Color::Yellow);

    let mut lines = Vec::new();

    if let Err(e) = &report.asset {
        lines.push(Line::from(Span::styled(
            e.to_string(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
    }

    // Widget TradingView
    lines.push(Line::from(Span::styled("Graphique TradingView", section)));
    match &report.widget {
        WidgetSection::Shown(widget) => {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    widget.chart_url(),
                    Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                "  (HTML intégrable : marketdash --export-widget <fichier>)",
                muted,
            )));
        }
        WidgetSection::Hidden => lines.push(Line::from(Span::styled(
            "  Graphique masqué. Activez-le dans les réglages pour voir le graphique interactif.",
            muted,
        ))),
    }
    lines.push(Line::from(""));

    // Niveaux clés
    lines.push(Line::from(Span::styled(
        format!(
            "Niveaux clés (Yahoo Finance, {} / {})",
            report.settings.period, report.settings.interval
        ),
        section,
    )));
    match &report.levels {
        LevelsPanel::Levels { stats, approximate } => {
            lines.push(Line::from(vec![
                Span::raw("  Plus haut d'hier : "),
                Span::styled(
                    format_price(stats.previous_high),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::raw("  Plus bas d'hier  : "),
                Span::styled(
                    format_price(stats.previous_low),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!(
                    "  Amplitude {} · chandelle du {}",
                    format_price(stats.range()),
                    stats.timestamp.format("%d/%m/%Y %H:%M UTC")
                ),
                muted,
            )));
            if *approximate {
                lines.push(Line::from(Span::styled(format!("  ⚠ {}", INTRADAY_NOTE), warning)));
            }
        }
        other => {
            if let Some(message) = other.message() {
                lines.push(Line::from(Span::styled(format!("  {}", message), warning)));
            }
        }
    }
    lines.push(Line::from(""));

    // Actualités
    lines.push(Line::from(Span::styled("Actualités", section)));
    match &report.news {
        NewsFeed::Headlines(articles) => {
            for article in articles {
                lines.push(Line::from(format!("  • {}", article.title)));
                lines.push(Line::from(Span::styled(format!("    {}", article.url), muted)));
            }
        }
        NewsFeed::Fallback { reason, links } => {
            lines.push(Line::from(Span::styled(format!("  {}", reason), muted)));
            for link in links.iter() {
                lines.push(Line::from(format!("  • {} : {}", link.label, link.url)));
            }
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Mis à jour à {}", report.loaded_at.format("%H:%M:%S UTC")),
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

// ============================================================================
// Footer : Instructions
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
///
/// CONCEPT : Confirmation de quit two-step
/// - Si app.is_awaiting_quit_confirmation(), affiche le message d'avertissement
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", key),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                key,
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[↑↓ / j k]", key),
            Span::raw(" Réglage  "),
            Span::styled("[←→ / h l]", key),
            Span::raw(" Valeur  "),
            Span::styled("[Space]", key),
            Span::raw(" Widget  "),
            Span::styled("[Enter]", key),
            Span::raw(" Chart  "),
            Span::styled("[r]", key),
            Span::raw(" Reload"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::{asset, Interval, OHLCData, Period, OHLC};
    use crate::report::FetchOutcome;
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, Terminal};

    /// Rend l'application dans un terminal virtuel et retourne le texte affiché
    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    fn report_with(candles: &[(f64, f64)], show_widget: bool) -> DashboardReport {
        let settings = Settings {
            interval: Interval::D1,
            show_widget,
            ..Settings::default()
        };
        let mut data = OHLCData::new("XAUUSD=X".to_string(), Period::OneMonth, Interval::D1);
        for (day, &(high, low)) in candles.iter().enumerate() {
            let ts = Utc.with_ymd_and_hms(2024, 3, 4 + day as u32, 0, 0, 0).unwrap();
            data.add_candle(OHLC::new(ts, low, high, low, high, 0));
        }
        DashboardReport::assemble(
            settings,
            asset::resolve("Gold (XAU/USD)"),
            FetchOutcome::Loaded(data),
            NewsFeed::fallback("pas de clé"),
        )
    }

    #[test]
    fn test_render_before_first_report() {
        let app = App::default();
        let screen = draw(&app);
        assert!(screen.contains("Réglages"));
        assert!(screen.contains("Aucune donnée chargée"));
        assert!(screen.contains("Gold (XAU/USD)"));
    }

    #[test]
    fn test_render_levels_and_fallback_links() {
        let mut app = App::default();
        app.set_report(report_with(&[(2300.0, 2280.0), (2350.5, 2310.25), (2360.0, 2340.0)], true));

        let screen = draw(&app);
        assert!(screen.contains("2350.50"));
        assert!(screen.contains("2310.25"));
        assert!(screen.contains("tradingview.com/chart/?symbol=OANDA:XAUUSD"));
        assert!(screen.contains("Investing.com News"));
    }

    #[test]
    fn test_render_insufficient_history() {
        let mut app = App::default();
        app.set_report(report_with(&[(2300.0, 2280.0)], false));

        let screen = draw(&app);
        assert!(screen.contains("Historique insuffisant"));
        assert!(screen.contains("Graphique masqué"));
    }

    #[test]
    fn test_render_quit_confirmation() {
        let mut app = App::default();
        app.request_quit();
        assert!(draw(&app).contains("à nouveau pour quitter"));
    }
}
