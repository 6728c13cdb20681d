// ============================================================================
// MarketDash - Dashboard de marché en terminal
// ============================================================================
// Affiche, pour un actif choisi dans une table fixe :
// - le lien / HTML du widget TradingView
// - le plus haut et le plus bas de la période précédente (Yahoo Finance)
// - les derniers titres d'actualité (NewsAPI) ou des liens de repli
//
// MODES :
// - TUI interactif (par défaut)
// - --once : rapport texte sur la sortie standard
// - --export-widget <PATH> : écrit le HTML du widget et quitte
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour les appels HTTP
// ============================================================================

mod cli;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use marketdash::api::build_client;
use marketdash::app::App;
use marketdash::config::{Config, NewsConfig, Settings};
use marketdash::models::asset;
use marketdash::report::load_report;
use marketdash::ui::events::{
    is_down_event, is_enter_event, is_escape_event, is_left_event, is_quit_event,
    is_reload_event, is_right_event, is_space_event, is_up_event, Event,
};
use marketdash::ui::{render, EventHandler};
use marketdash::widget::TradingViewWidget;

use crate::cli::Cli;

// ============================================================================
// Logging
// ============================================================================
// Le TUI occupe le terminal : les logs vont dans un fichier à rotation
// quotidienne.
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/marketdash/logs
/// - macOS : ~/Library/Application Support/marketdash/logs
/// - Sinon : ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("marketdash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/marketdash/logs/marketdash.log.*
/// RUST_LOG=marketdash=trace marketdash
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "marketdash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour marketdash, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketdash=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // .env est optionnel (NEWSAPI_KEY=...)
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });
    info!("MarketDash starting up");

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    config.apply_env();

    let mut settings = Settings::from(&config.dashboard);
    cli.apply_to(&mut settings);
    debug!(?settings, "Initial settings");

    if let Some(path) = &cli.export_widget {
        return export_widget(&settings, path);
    }

    let client = build_client(config.http.timeout())?;
    let runtime = tokio::runtime::Runtime::new()?;

    if cli.once {
        let report = runtime.block_on(load_report(&client, &settings, &config.news));
        for line in report.lines() {
            println!("{}", line);
        }
        return Ok(());
    }

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(settings);
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &runtime, &client, &config.news);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }
    result
}

/// Écrit le HTML d'intégration du widget pour l'actif sélectionné
fn export_widget(settings: &Settings, path: &Path) -> Result<()> {
    let entry = asset::resolve(&settings.asset_name)?;
    let widget = TradingViewWidget::for_symbol(entry.widget_symbol);

    std::fs::write(path, widget.embed_html())
        .with_context(|| format!("Écriture de {} impossible", path.display()))?;

    info!(symbol = %entry.widget_symbol, path = %path.display(), "Widget exported");
    println!("Widget {} écrit dans {}", entry.widget_symbol, path.display());
    Ok(())
}

// ============================================================================
// Boucle principale
// ============================================================================
// CONCEPT : Re-exécution complète
// - Un changement de contrôle marque le rapport comme périmé
// - On dessine d'abord un écran "chargement", puis on bloque sur la passe
// - Pas de thread de fond : une passe à la fois, dans l'ordre
// ============================================================================

/// Exécute la boucle principale de l'application
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    runtime: &tokio::runtime::Runtime,
    client: &reqwest::Client,
    news: &NewsConfig,
) -> Result<()> {
    while app.is_running() {
        // ========================================
        // 1. UPDATE : recharge si les contrôles ont changé
        // ========================================
        if let Some(settings) = app.take_refresh() {
            app.start_loading(Some(format!(
                "Chargement de {} ({} / {})...",
                settings.asset_name, settings.period, settings.interval
            )));
            terminal.draw(|frame| render(frame, app))?;

            let report = runtime.block_on(load_report(client, &settings, news));
            app.set_report(report);
            app.stop_loading();
        }

        // ========================================
        // 2. RENDER : dessine l'interface
        // ========================================
        terminal.draw(|frame| render(frame, app))?;

        // ========================================
        // 3. INPUT : traite les événements
        // ========================================
        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - La confirmation de sortie passe avant tout le reste
/// - Puis navigation contextuelle selon l'écran actuel
fn handle_event(app: &mut App, event: Event) {
    if !matches!(event, Event::Key(_)) {
        return;
    }

    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("Quit confirmed");
            app.quit();
        } else {
            app.request_quit();
        }
        return;
    }

    // Toute autre touche annule la demande de sortie
    if app.is_awaiting_quit_confirmation() {
        app.cancel_quit();
        return;
    }

    if is_reload_event(&event) {
        info!("Manual reload requested");
        app.request_refresh();
        return;
    }

    if app.is_on_chart() {
        if is_escape_event(&event) || is_space_event(&event) {
            app.show_dashboard();
        }
        return;
    }

    if is_up_event(&event) {
        app.focus_up();
    } else if is_down_event(&event) {
        app.focus_down();
    } else if is_right_event(&event) {
        app.change_value(true);
    } else if is_left_event(&event) {
        app.change_value(false);
    } else if is_space_event(&event) {
        app.toggle_widget();
    } else if is_enter_event(&event) {
        app.show_chart();
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::empty())));
    }

    #[test]
    fn test_quit_needs_two_presses() {
        let mut app = App::default();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.is_running());
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.is_awaiting_quit_confirmation());
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_control_change_marks_report_stale() {
        let mut app = App::default();
        app.take_refresh();

        press(&mut app, KeyCode::Down);
        assert!(!app.needs_refresh);
        press(&mut app, KeyCode::Right);
        assert!(app.needs_refresh);
    }

    #[test]
    fn test_chart_navigation() {
        let mut app = App::default();
        press(&mut app, KeyCode::Enter);
        assert!(app.is_on_chart());

        // Les flèches ne changent pas les réglages depuis le graphique
        app.take_refresh();
        press(&mut app, KeyCode::Right);
        assert!(!app.needs_refresh);

        press(&mut app, KeyCode::Esc);
        assert!(app.is_on_dashboard());
    }
}
