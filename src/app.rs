// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Enums pour l'écran courant et le contrôle qui a le focus
//
// PATTERN : "Application State" + re-exécution complète
// - Les contrôles de la barre latérale (actif, période, intervalle, widget)
//   vivent dans `settings`
// - Tout changement de contrôle marque le rapport comme périmé
// - La boucle principale relance alors une passe complète (report::load_report)
// ============================================================================

use crate::config::Settings;
use crate::models::{asset, AssetEntry};
use crate::report::DashboardReport;

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : réglages + aperçu (widget, niveaux, actualités)
    Dashboard,

    /// Vue graphique : chandeliers de l'actif sélectionné
    ChartView,
}

/// Contrôles de la barre latérale, dans l'ordre d'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Asset,
    Period,
    Interval,
    Widget,
}

impl Control {
    /// Tous les contrôles, de haut en bas
    pub fn all() -> [Control; 4] {
        [Control::Asset, Control::Period, Control::Interval, Control::Widget]
    }

    /// Label affiché dans la barre latérale
    pub fn label(&self) -> &'static str {
        match self {
            Control::Asset => "Actif",
            Control::Period => "Période",
            Control::Interval => "Intervalle",
            Control::Widget => "Graphique TradingView",
        }
    }

    fn next(&self) -> Control {
        match self {
            Control::Asset => Control::Period,
            Control::Period => Control::Interval,
            Control::Interval => Control::Widget,
            Control::Widget => Control::Asset, // Boucle
        }
    }

    fn previous(&self) -> Control {
        match self {
            Control::Asset => Control::Widget, // Boucle
            Control::Period => Control::Asset,
            Control::Interval => Control::Period,
            Control::Widget => Control::Interval,
        }
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Valeurs des contrôles de la barre latérale
    pub settings: Settings,

    /// Contrôle qui a le focus
    pub focus: Control,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,

    /// Indique si une passe est en cours (affiche un indicateur)
    pub is_loading: bool,

    /// Message de chargement optionnel
    pub loading_message: Option<String>,

    /// Dernier rapport chargé (None avant la première passe)
    pub report: Option<DashboardReport>,

    /// Le rapport ne correspond plus aux contrôles
    pub needs_refresh: bool,
}

impl App {
    /// Crée l'application avec les réglages initiaux
    ///
    /// Le rapport est périmé d'emblée : la première itération le charge.
    pub fn new(settings: Settings) -> Self {
        Self {
            running: true,
            settings,
            focus: Control::Asset,
            current_screen: Screen::Dashboard,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            report: None,
            needs_refresh: true,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Actif sélectionné (None si le nom est inconnu)
    pub fn selected_asset(&self) -> Option<&'static AssetEntry> {
        asset::resolve(&self.settings.asset_name).ok()
    }

    // ========================================================================
    // Barre latérale
    // ========================================================================

    /// Focus sur le contrôle précédent
    pub fn focus_up(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Focus sur le contrôle suivant
    pub fn focus_down(&mut self) {
        self.focus = self.focus.next();
    }

    /// Change la valeur du contrôle qui a le focus
    ///
    /// CONCEPT : Cycle d'états
    /// - forward = true : valeur suivante (touche → / l)
    /// - forward = false : valeur précédente (touche ← / h)
    pub fn change_value(&mut self, forward: bool) {
        match self.focus {
            Control::Asset => self.cycle_asset(forward),
            Control::Period => {
                self.settings.period = if forward {
                    self.settings.period.next()
                } else {
                    self.settings.period.previous()
                };
            }
            Control::Interval => {
                self.settings.interval = if forward {
                    self.settings.interval.next()
                } else {
                    self.settings.interval.previous()
                };
            }
            Control::Widget => {
                self.settings.show_widget = !self.settings.show_widget;
            }
        }
        self.needs_refresh = true;
    }

    /// Affiche ou masque le widget TradingView (touche Espace)
    pub fn toggle_widget(&mut self) {
        self.settings.show_widget = !self.settings.show_widget;
        self.needs_refresh = true;
    }

    /// Passe à l'actif suivant / précédent de la table
    ///
    /// Un nom inconnu (ex: venant de la config) repart du premier actif.
    fn cycle_asset(&mut self, forward: bool) {
        let assets = asset::all();
        let next_index = match asset::position(&self.settings.asset_name) {
            Some(i) if forward => (i + 1) % assets.len(),
            Some(i) => (i + assets.len() - 1) % assets.len(),
            None => 0,
        };
        self.settings.asset_name = assets[next_index].display_name.to_string();
    }

    // ========================================================================
    // Rapport
    // ========================================================================

    /// Demande une nouvelle passe (touche 'r')
    pub fn request_refresh(&mut self) {
        self.needs_refresh = true;
    }

    /// Retourne les réglages à charger si le rapport est périmé
    ///
    /// CONCEPT RUST : Option comme "consommation" d'un drapeau
    /// - Remet needs_refresh à false
    /// - Le clone permet de relâcher l'emprunt de self pendant le chargement
    pub fn take_refresh(&mut self) -> Option<Settings> {
        if !self.needs_refresh {
            return None;
        }
        self.needs_refresh = false;
        Some(self.settings.clone())
    }

    /// Enregistre le rapport d'une passe
    pub fn set_report(&mut self, report: DashboardReport) {
        self.report = Some(report);
    }

    /// Démarre le chargement avec un message optionnel
    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    /// Termine le chargement
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    /// Vérifie si des données sont en cours de chargement
    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Écrans et confirmation de sortie
    // ========================================================================

    /// Affiche la vue graphique (ChartView)
    pub fn show_chart(&mut self) {
        self.current_screen = Screen::ChartView;
    }

    /// Retourne à la vue dashboard
    pub fn show_dashboard(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    /// Vérifie si on est sur le dashboard
    pub fn is_on_dashboard(&self) -> bool {
        self.current_screen == Screen::Dashboard
    }

    /// Vérifie si on est sur la vue graphique
    pub fn is_on_chart(&self) -> bool {
        self.current_screen == Screen::ChartView
    }

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Interval, Period};

    #[test]
    fn test_app_creation() {
        let app = App::default();
        assert!(app.is_running());
        assert!(app.is_on_dashboard());
        assert_eq!(app.focus, Control::Asset);
        assert!(app.report.is_none());
        assert!(app.needs_refresh);
    }

    #[test]
    fn test_app_quit() {
        let mut app = App::default();
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_focus_cycle() {
        let mut app = App::default();
        app.focus_down();
        assert_eq!(app.focus, Control::Period);
        app.focus_up();
        app.focus_up();
        assert_eq!(app.focus, Control::Widget); // Boucle
    }

    #[test]
    fn test_take_refresh_consumes_flag() {
        let mut app = App::default();
        assert_eq!(app.take_refresh(), Some(Settings::default()));
        assert_eq!(app.take_refresh(), None);

        app.request_refresh();
        assert!(app.take_refresh().is_some());
    }

    #[test]
    fn test_asset_cycle_wraps() {
        let mut app = App::default();
        app.take_refresh();

        app.change_value(false);
        assert_eq!(app.settings.asset_name, "SPY");
        assert!(app.needs_refresh);

        app.change_value(true);
        assert_eq!(app.settings.asset_name, "Gold (XAU/USD)");
        app.change_value(true);
        assert_eq!(app.settings.asset_name, "EUR/USD");
    }

    #[test]
    fn test_unknown_asset_restarts_at_first_entry() {
        let mut app = App::new(Settings {
            asset_name: "DOGE".to_string(),
            ..Settings::default()
        });
        assert!(app.selected_asset().is_none());

        app.change_value(true);
        assert_eq!(app.settings.asset_name, "Gold (XAU/USD)");
        assert!(app.selected_asset().is_some());
    }

    #[test]
    fn test_period_interval_and_widget_controls() {
        let mut app = App::default();

        app.focus = Control::Period;
        app.change_value(true);
        assert_eq!(app.settings.period, Period::ThreeMonths);

        app.focus = Control::Interval;
        app.change_value(false);
        assert_eq!(app.settings.interval, Interval::D1);

        app.focus = Control::Widget;
        app.change_value(true);
        assert!(!app.settings.show_widget);
        app.toggle_widget();
        assert!(app.settings.show_widget);
    }

    #[test]
    fn test_quit_confirmation() {
        let mut app = App::default();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
    }
}
