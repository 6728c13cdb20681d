// ============================================================================
// Candlestick Chart - Rendu texte ligne par ligne
// ============================================================================
// Dessine les chandelles Yahoo Finance de l'actif sélectionné avec des
// caractères Unicode, et superpose les niveaux de la période précédente.
//
// ALGORITHME :
// - Chaque ligne de l'écran est un tampon de cellules (caractère + couleur)
// - Les chandelles sont placées à des colonnes calculées depuis leur index
// - Logique des 3 zones : mèche supérieure, corps, mèche inférieure
// - Seuils fractionnaires (0.25, 0.75) pour précision sub-caractère
// - Les lignes des niveaux "plus haut / plus bas d'hier" remplissent les
//   cellules vides avec ┈
//
// CARACTÈRES UNICODE :
// ┃ Corps plein          │ Mèche pleine
// ╻ Demi-corps (bas)     ╹ Demi-corps (haut)
// ╽ Transition top       ╿ Transition bottom
// ╷ Demi-mèche sup       ╵ Demi-mèche inf
// ============================================================================

use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::analysis::PeriodStats;
use crate::app::App;
use crate::models::{OHLCData, OHLC};
use crate::report::{format_price, FetchOutcome, LevelsPanel};

// ============================================================================
// Constantes
// ============================================================================

const GLYPH_VOID: char = ' ';
const GLYPH_BODY: char = '┃';
const GLYPH_HALF_BODY_BOTTOM: char = '╻';
const GLYPH_HALF_BODY_TOP: char = '╹';
const GLYPH_WICK: char = '│';
const GLYPH_TOP: char = '╽';
const GLYPH_BOTTOM: char = '╿';
const GLYPH_UPPER_WICK: char = '╷';
const GLYPH_LOWER_WICK: char = '╵';
const GLYPH_LEVEL: char = '┈';

const BULLISH_COLOR: Color = Color::Rgb(52, 208, 88);
const BEARISH_COLOR: Color = Color::Rgb(234, 74, 90);
const HIGH_LEVEL_COLOR: Color = Color::Rgb(90, 170, 255);
const LOW_LEVEL_COLOR: Color = Color::Rgb(255, 170, 60);
const AXIS_COLOR: Color = Color::Gray;

/// Largeur minimale de la zone graphique
const MIN_TERMINAL_WIDTH: u16 = 60;

/// En dessous de cette largeur, l'axe des prix est réduit
const ADAPTIVE_Y_AXIS_THRESHOLD: u16 = 80;
const Y_AXIS_WIDTH: usize = 13;
const NARROW_Y_AXIS_WIDTH: usize = 11;

/// Un label de prix toutes les N lignes
const PRICE_LABEL_EVERY: u16 = 4;

// ============================================================================
// Géométrie
// ============================================================================

/// Bornes de prix affichées (avec une marge de 2%)
#[derive(Debug, Clone, Copy, PartialEq)]
struct PriceScale {
    min: f64,
    max: f64,
    rows: u16,
}

impl PriceScale {
    fn new(candles: &[OHLC], levels: Option<&PeriodStats>, rows: u16) -> Self {
        let (mut low, mut high) = candles
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c.low), hi.max(c.high))
            });

        // Les niveaux restent visibles même s'ils sortent de la fenêtre
        if let Some(stats) = levels {
            low = low.min(stats.previous_low);
            high = high.max(stats.previous_high);
        }

        let margin = (high - low) * 0.02;
        Self {
            min: (low - margin).max(0.0),
            max: high + margin,
            rows,
        }
    }

    /// Prix -> hauteur en lignes (0.0 = bas du graphique)
    fn height(&self, price: f64) -> f64 {
        if self.max <= self.min {
            return self.rows as f64 / 2.0;
        }
        (price - self.min) / (self.max - self.min) * self.rows as f64
    }

    /// Ligne (1..=rows) sur laquelle tombe un prix
    fn row_of(&self, price: f64) -> u16 {
        (self.height(price).round() as u16).clamp(1, self.rows.max(1))
    }

    /// Prix au niveau d'une ligne
    fn price_at(&self, row: u16) -> f64 {
        self.min + row as f64 * (self.max - self.min) / self.rows.max(1) as f64
    }
}

/// Hauteurs d'une chandelle sur l'échelle
struct CandleHeights {
    high: f64,
    low: f64,
    body_top: f64,
    body_bottom: f64,
}

impl CandleHeights {
    fn new(candle: &OHLC, scale: &PriceScale) -> Self {
        Self {
            high: scale.height(candle.high),
            low: scale.height(candle.low),
            body_top: scale.height(candle.open.max(candle.close)),
            body_bottom: scale.height(candle.open.min(candle.close)),
        }
    }

    /// Caractère de la chandelle sur la ligne `row`
    ///
    /// Adapté de cli-candlestick-chart : on regarde dans quelle zone tombe
    /// la ligne, puis la fraction de corps / mèche qui la recouvre.
    fn glyph(&self, row: u16) -> char {
        let y = row as f64;

        if self.high.ceil() >= y && y >= self.body_top.floor() {
            // Mèche supérieure
            let body = self.body_top - y;
            let wick = self.high - y;
            if body > 0.75 {
                GLYPH_BODY
            } else if body > 0.25 {
                if wick > 0.75 {
                    GLYPH_TOP
                } else {
                    GLYPH_HALF_BODY_BOTTOM
                }
            } else if wick > 0.75 {
                GLYPH_WICK
            } else if wick > 0.25 {
                GLYPH_UPPER_WICK
            } else {
                GLYPH_VOID
            }
        } else if self.body_top.floor() >= y && y >= self.body_bottom.ceil() {
            GLYPH_BODY
        } else if self.body_bottom.ceil() >= y && y >= self.low.floor() {
            // Mèche inférieure
            let body = self.body_bottom - y;
            let wick = self.low - y;
            if body < 0.25 {
                GLYPH_BODY
            } else if body < 0.75 {
                if wick < 0.25 {
                    GLYPH_BOTTOM
                } else {
                    GLYPH_HALF_BODY_TOP
                }
            } else if wick < 0.25 {
                GLYPH_WICK
            } else if wick < 0.75 {
                GLYPH_LOWER_WICK
            } else {
                GLYPH_VOID
            }
        } else {
            GLYPH_VOID
        }
    }
}

/// Les N dernières chandelles qui tiennent dans la largeur
fn last_candles(candles: &[OHLC], columns: usize) -> &[OHLC] {
    &candles[candles.len().saturating_sub(columns)..]
}

/// Largeur du plus long libellé de l'axe des prix
///
/// Les libellés réguliers restent entre `scale.min` et `scale.max`.
fn widest_label(scale: &PriceScale, levels: Option<&PeriodStats>) -> usize {
    let mut labels = vec![format_price(scale.min), format_price(scale.max)];
    if let Some(stats) = levels {
        labels.push(format!("H {}", format_price(stats.previous_high)));
        labels.push(format!("L {}", format_price(stats.previous_low)));
    }
    labels.iter().map(|l| l.chars().count()).max().unwrap_or(0)
}

/// Cellule du tampon de ligne
type Cell = (char, Color);

/// Regroupe les cellules consécutives de même couleur en Spans
fn cells_to_spans(cells: &[Cell]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_color = None;

    for &(ch, color) in cells {
        if run_color != Some(color) && !run.is_empty() {
            spans.push(Span::styled(
                std::mem::take(&mut run),
                Style::default().fg(run_color.unwrap_or(AXIS_COLOR)),
            ));
        }
        run_color = Some(color);
        run.push(ch);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, Style::default().fg(run_color.unwrap_or(AXIS_COLOR))));
    }
    spans
}

// ============================================================================
// Renderer
// ============================================================================

/// Graphique en chandeliers d'une série OHLC
pub struct CandlestickChart<'a> {
    data: &'a OHLCData,
    levels: Option<&'a PeriodStats>,
    scale: PriceScale,
    /// Largeur de la zone des chandelles (hors axe)
    columns: usize,
    axis_width: usize,
}

impl<'a> CandlestickChart<'a> {
    /// Crée le renderer pour une zone intérieure (sans bordures)
    ///
    /// La zone réserve 2 lignes pour l'axe du temps.
    pub fn new(data: &'a OHLCData, levels: Option<&'a PeriodStats>, area: Rect) -> Self {
        let base_width = if area.width < ADAPTIVE_Y_AXIS_THRESHOLD {
            NARROW_Y_AXIS_WIDTH
        } else {
            Y_AXIS_WIDTH
        };
        let rows = area.height.saturating_sub(2);

        // L'axe s'élargit si un libellé ne tient pas (ex: "H 105500.00")
        let columns = (area.width as usize).saturating_sub(base_width);
        let scale = PriceScale::new(last_candles(&data.candles, columns), levels, rows);
        let axis_width = base_width.max(widest_label(&scale, levels) + 2);

        let columns = (area.width as usize).saturating_sub(axis_width);
        Self {
            data,
            levels,
            scale: PriceScale::new(last_candles(&data.candles, columns), levels, rows),
            columns,
            axis_width,
        }
    }

    fn visible(&self) -> &'a [OHLC] {
        last_candles(&self.data.candles, self.columns)
    }

    /// Colonne de la i-ème chandelle visible
    ///
    /// CONCEPT : Position calculée depuis l'index
    /// - i × spacing plutôt qu'un cumul, pas de dérive d'arrondi
    fn column_of(&self, index: usize, count: usize) -> usize {
        if count <= 1 {
            return self.columns / 2;
        }
        let spacing = self.columns as f64 / count as f64;
        ((index as f64 * spacing).round() as usize).min(self.columns.saturating_sub(1))
    }

    /// Libellé de l'axe des prix pour une ligne
    fn axis_label(&self, row: u16, high_row: Option<u16>, low_row: Option<u16>) -> (String, Color) {
        let width = self.axis_width.saturating_sub(2);
        let (text, color) = match (high_row, low_row) {
            (Some(h), _) if h == row => (
                format!("H {}", format_price(self.levels.map_or(0.0, |s| s.previous_high))),
                HIGH_LEVEL_COLOR,
            ),
            (_, Some(l)) if l == row => (
                format!("L {}", format_price(self.levels.map_or(0.0, |s| s.previous_low))),
                LOW_LEVEL_COLOR,
            ),
            _ if row % PRICE_LABEL_EVERY == 0 => (format_price(self.scale.price_at(row)), AXIS_COLOR),
            _ => (String::new(), AXIS_COLOR),
        };
        // L'échelle finale peut différer de celle qui a dimensionné l'axe
        let text: String = text.chars().take(width).collect();
        (format!("{:>width$} │", text, width = width), color)
    }

    /// Génère toutes les lignes (chandelles puis axe du temps)
    pub fn lines(&self) -> Vec<Line<'static>> {
        let visible = self.visible();
        if visible.is_empty() || self.columns == 0 {
            return Vec::new();
        }

        let heights: Vec<CandleHeights> = visible
            .iter()
            .map(|c| CandleHeights::new(c, &self.scale))
            .collect();
        let columns: Vec<usize> = (0..visible.len())
            .map(|i| self.column_of(i, visible.len()))
            .collect();

        let high_row = self.levels.map(|s| self.scale.row_of(s.previous_high));
        let low_row = self.levels.map(|s| self.scale.row_of(s.previous_low));

        let mut lines = Vec::with_capacity(self.scale.rows as usize + 2);

        for row in (1..=self.scale.rows).rev() {
            let level_color = match (high_row, low_row) {
                (Some(h), _) if h == row => Some(HIGH_LEVEL_COLOR),
                (_, Some(l)) if l == row => Some(LOW_LEVEL_COLOR),
                _ => None,
            };

            let mut cells: Vec<Cell> = match level_color {
                Some(color) => vec![(GLYPH_LEVEL, color); self.columns],
                None => vec![(GLYPH_VOID, AXIS_COLOR); self.columns],
            };

            for ((candle, h), &col) in visible.iter().zip(&heights).zip(&columns) {
                let glyph = h.glyph(row);
                if glyph != GLYPH_VOID {
                    let color = if candle.is_bullish() { BULLISH_COLOR } else { BEARISH_COLOR };
                    cells[col] = (glyph, color);
                }
            }

            let (label, label_color) = self.axis_label(row, high_row, low_row);
            let mut spans = vec![Span::styled(label, Style::default().fg(label_color))];
            spans.extend(cells_to_spans(&cells));
            lines.push(Line::from(spans));
        }

        lines.extend(self.time_axis(visible, &columns));
        lines
    }

    /// Axe du temps : une ligne de repères, une ligne de libellés
    ///
    /// En intraday, le premier libellé d'une nouvelle journée affiche la date
    /// au lieu de l'heure.
    fn time_axis(&self, visible: &[OHLC], columns: &[usize]) -> Vec<Line<'static>> {
        let (format, is_intraday) = self.data.interval.x_axis_format();

        let mut ticks = vec![' '; self.columns];
        let mut labels = vec![' '; self.columns];
        let mut next_free = 0usize;
        let mut last_day: Option<NaiveDate> = None;

        for (candle, &col) in visible.iter().zip(columns) {
            let day = candle.timestamp.date_naive();
            let new_day = last_day.map_or(false, |d| d != day);
            last_day = Some(day);

            if col < next_free {
                continue;
            }

            let text = if is_intraday && new_day {
                candle.timestamp.format("%d/%m").to_string()
            } else {
                candle.timestamp.format(format).to_string()
            };
            let width = text.chars().count();
            if col + width > self.columns {
                break;
            }

            ticks[col] = '╵';
            for (offset, ch) in text.chars().enumerate() {
                labels[col + offset] = ch;
            }
            next_free = col + width + 2;
        }

        let pad = " ".repeat(self.axis_width);
        let style = Style::default().fg(AXIS_COLOR);
        vec![
            Line::from(Span::styled(
                format!("{}{}", pad, ticks.into_iter().collect::<String>()),
                style,
            )),
            Line::from(Span::styled(
                format!("{}{}", pad, labels.into_iter().collect::<String>()),
                style,
            )),
        ]
    }
}

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine le graphique en chandeliers de l'actif du dernier rapport
pub fn render_candlestick_chart(frame: &mut Frame, app: &App, area: Rect) {
    let Some(report) = &app.report else {
        render_no_data(frame, area, "Aucune donnée chargée");
        return;
    };

    let data = match &report.prices {
        FetchOutcome::Loaded(data) if !data.is_empty() => data,
        FetchOutcome::Loaded(_) => {
            render_no_data(frame, area, "Pas de chandelles à afficher");
            return;
        }
        FetchOutcome::Failed(err) => {
            render_no_data(frame, area, &err.to_string());
            return;
        }
    };

    if area.width < MIN_TERMINAL_WIDTH {
        render_too_narrow(frame, area);
        return;
    }

    let levels = match &report.levels {
        LevelsPanel::Levels { stats, .. } => Some(stats),
        _ => None,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_header(frame, app, data, levels, chunks[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(
            " 🕯️ {} - {} / {} ({} chandeliers) ",
            report.settings.asset_name,
            data.period.label(),
            data.interval.label(),
            data.len()
        ));
    let inner = block.inner(chunks[1]);

    let chart = CandlestickChart::new(data, levels, inner);
    frame.render_widget(Paragraph::new(chart.lines()).block(block), chunks[1]);
}

// ============================================================================
// Header
// ============================================================================

/// Dessine le header : dernier prix, variation, niveaux
fn render_header(
    frame: &mut Frame,
    app: &App,
    data: &OHLCData,
    levels: Option<&PeriodStats>,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} ", data.symbol));

    let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let line = if app.is_awaiting_quit_confirmation() {
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
    } else if app.is_loading_data() {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Chargement en cours...".to_string());
        Line::from(Span::styled(
            format!("⏳ {}", message),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    } else {
        let mut spans = Vec::new();

        if let (Some(last), Some(change)) = (data.last(), data.total_change_percent()) {
            let color = if change >= 0.0 { Color::Green } else { Color::Red };
            let arrow = if change >= 0.0 { "▲" } else { "▼" };
            spans.push(Span::raw("Dernier : "));
            spans.push(Span::styled(
                format_price(last.close),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(format!(" {} {:+.2}%  ", arrow, change), Style::default().fg(color)));
        }

        if let Some(stats) = levels {
            spans.push(Span::styled(
                format!("H {} ", format_price(stats.previous_high)),
                Style::default().fg(HIGH_LEVEL_COLOR),
            ));
            spans.push(Span::styled(
                format!("L {}  ", format_price(stats.previous_low)),
                Style::default().fg(LOW_LEVEL_COLOR),
            ));
        }

        spans.push(Span::styled("[ESC]", key));
        spans.push(Span::raw(" Retour  "));
        spans.push(Span::styled("[r]", key));
        spans.push(Span::raw(" Reload  "));
        spans.push(Span::styled("[q]", key));
        spans.push(Span::raw(" Quitter"));
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![line]).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Messages
// ============================================================================

/// Affiche un message quand il n'y a pas de données
fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ Erreur ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled("[ESC] Retour", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Affiche un message quand le terminal est trop étroit
fn render_too_narrow(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" ⚠ Terminal trop petit ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Terminal trop étroit pour afficher le graphique",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(
            format!("Largeur minimale requise : {} colonnes", MIN_TERMINAL_WIDTH),
            Style::default().fg(Color::Gray),
        )),
    ];

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
