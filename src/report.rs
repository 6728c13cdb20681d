// ============================================================================
// Rapport du dashboard
// ============================================================================
// Une "passe" complète, de haut en bas :
// 1. Résolution de l'actif sélectionné
// 2. Section widget TradingView (ou message si masqué)
// 3. Chargement des chandelles Yahoo Finance
// 4. Niveaux de la période précédente
// 5. Actualités
//
// CONCEPT : Résultats explicites au lieu d'exceptions
// - Chaque étape produit un enum que l'UI "pattern-match"
// - Aucune étape ne fait échouer la passe : les erreurs deviennent des messages
// ============================================================================

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::analysis::{derive_stats, PeriodStats};
use crate::api::{fetch_bars, load_news, NewsFeed};
use crate::config::{NewsConfig, Settings};
use crate::error::{DashboardError, LookupError};
use crate::models::{asset, AssetEntry, OHLCData};
use crate::widget::TradingViewWidget;

/// Résultat du chargement des chandelles
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// Chandelles chargées (au moins une)
    Loaded(OHLCData),

    /// Échec : actif inconnu, erreur réseau, ou aucune donnée
    Failed(DashboardError),
}

impl FetchOutcome {
    /// Retourne les données si chargées
    pub fn data(&self) -> Option<&OHLCData> {
        match self {
            FetchOutcome::Loaded(data) => Some(data),
            FetchOutcome::Failed(_) => None,
        }
    }
}

/// Contenu du panneau "niveaux clés"
#[derive(Debug, Clone, PartialEq)]
pub enum LevelsPanel {
    /// Plus haut / plus bas de la chandelle précédente
    ///
    /// `approximate` : intervalle intraday, la chandelle précédente n'est pas "hier"
    Levels { stats: PeriodStats, approximate: bool },

    /// Moins de deux chandelles
    InsufficientHistory { rows: usize },

    /// Pas de données du tout
    Unavailable(DashboardError),
}

impl LevelsPanel {
    /// Dérive le panneau depuis le résultat du chargement
    pub fn from_outcome(outcome: &FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Loaded(data) => match derive_stats(&data.candles) {
                Some(stats) => LevelsPanel::Levels {
                    stats,
                    approximate: data.interval.is_intraday(),
                },
                None => LevelsPanel::InsufficientHistory { rows: data.len() },
            },
            FetchOutcome::Failed(err) => LevelsPanel::Unavailable(err.clone()),
        }
    }

    /// Message à afficher quand il n'y a pas de niveaux
    pub fn message(&self) -> Option<String> {
        match self {
            LevelsPanel::Levels { .. } => None,
            LevelsPanel::InsufficientHistory { rows } => Some(format!(
                "{}. Essayez une autre période ou un autre intervalle.",
                DashboardError::InsufficientHistory { rows: *rows }
            )),
            LevelsPanel::Unavailable(err) => Some(format!(
                "Pas de données pour ce symbole / cet intervalle ({}). \
                 Essayez une autre période ou le graphique TradingView.",
                err
            )),
        }
    }
}

/// Section du widget TradingView
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetSection {
    Shown(TradingViewWidget),
    Hidden,
}

/// Résultat d'une passe complète
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub settings: Settings,
    pub asset: Result<&'static AssetEntry, LookupError>,
    pub widget: WidgetSection,
    pub prices: FetchOutcome,
    pub levels: LevelsPanel,
    pub news: NewsFeed,
    pub loaded_at: DateTime<Utc>,
}

/// Exécute une passe complète (ne retourne jamais d'erreur)
///
/// # Arguments
/// * `client` - Client HTTP partagé
/// * `settings` - État des contrôles
/// * `news` - Configuration des actualités
pub async fn load_report(
    client: &reqwest::Client,
    settings: &Settings,
    news: &NewsConfig,
) -> DashboardReport {
    let asset = asset::resolve(&settings.asset_name);

    let prices = match &asset {
        Ok(entry) => {
            match fetch_bars(client, entry.provider_symbol, settings.period, settings.interval).await {
                Ok(data) => FetchOutcome::Loaded(data),
                Err(e) => {
                    warn!(ticker = %entry.provider_symbol, error = ?e, "Price fetch failed");
                    FetchOutcome::Failed(DashboardError::fetch(entry.provider_symbol, &e))
                }
            }
        }
        Err(e) => {
            warn!(asset = %settings.asset_name, "Unknown asset, skipping fetch");
            FetchOutcome::Failed(e.clone().into())
        }
    };

    let news = load_news(client, news.api_key.as_deref(), &news.query, news.limit).await;

    let report = DashboardReport::assemble(settings.clone(), asset, prices, news);
    info!(
        asset = %settings.asset_name,
        candles = report.prices.data().map(|d| d.len()).unwrap_or(0),
        has_levels = matches!(report.levels, LevelsPanel::Levels { .. }),
        "Dashboard report loaded"
    );
    report
}

impl DashboardReport {
    /// Assemble un rapport à partir des résultats de chaque étape
    pub fn assemble(
        settings: Settings,
        asset: Result<&'static AssetEntry, LookupError>,
        prices: FetchOutcome,
        news: NewsFeed,
    ) -> Self {
        let widget = match (&asset, settings.show_widget) {
            (Ok(entry), true) => WidgetSection::Shown(TradingViewWidget::for_symbol(entry.widget_symbol)),
            _ => WidgetSection::Hidden,
        };
        let levels = LevelsPanel::from_outcome(&prices);

        Self {
            settings,
            asset,
            widget,
            prices,
            levels,
            news,
            loaded_at: Utc::now(),
        }
    }

    /// Titre de la section principale
    pub fn title(&self) -> String {
        match &self.asset {
            Ok(entry) => format!(
                "{} ({} | {})",
                entry.display_name, entry.provider_symbol, entry.widget_symbol
            ),
            Err(e) => e.to_string(),
        }
    }

    /// Rendu texte du rapport (mode --once)
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("=== {} ===", self.title()), String::new()];

        lines.push("Graphique TradingView".to_string());
        match &self.widget {
            WidgetSection::Shown(widget) => lines.push(format!("  {}", widget.chart_url())),
            WidgetSection::Hidden => lines.push(
                "  Graphique masqué. Activez-le dans les réglages pour voir le graphique interactif."
                    .to_string(),
            ),
        }
        lines.push(String::new());

        lines.push(format!(
            "Niveaux clés (Yahoo Finance, {} / {})",
            self.settings.period, self.settings.interval
        ));
        match &self.levels {
            LevelsPanel::Levels { stats, approximate } => {
                lines.push(format!("  Plus haut d'hier : {}", format_price(stats.previous_high)));
                lines.push(format!("  Plus bas d'hier  : {}", format_price(stats.previous_low)));
                lines.push(format!(
                    "  Chandelle du {}",
                    stats.timestamp.format("%d/%m/%Y %H:%M UTC")
                ));
                if *approximate {
                    lines.push(format!("  Note : {}", INTRADAY_NOTE));
                }
            }
            other => {
                if let Some(message) = other.message() {
                    lines.push(format!("  {}", message));
                }
            }
        }
        lines.push(String::new());

        lines.push("Actualités".to_string());
        match &self.news {
            NewsFeed::Headlines(articles) => {
                for article in articles {
                    lines.push(format!("  - {} ({})", article.title, article.url));
                }
            }
            NewsFeed::Fallback { reason, links } => {
                lines.push(format!("  {}", reason));
                for link in links.iter() {
                    lines.push(format!("  - {} ({})", link.label, link.url));
                }
            }
        }

        lines
    }
}

/// Avertissement affiché pour les niveaux en intraday
pub const INTRADAY_NOTE: &str =
    "intervalle intraday, ces niveaux sont ceux de la chandelle précédente et non de la séance d'hier";

/// Formate un prix avec une précision adaptée à son ordre de grandeur
///
/// - Forex (1.0842) : 5 décimales
/// - USD/JPY, actions (151.23) : 3 décimales
/// - Or, BTC (2345.10) : 2 décimales
pub fn format_price(price: f64) -> String {
    let magnitude = price.abs();
    if magnitude < 10.0 {
        format!("{:.5}", price)
    } else if magnitude < 1000.0 {
        format!("{:.3}", price)
    } else {
        format!("{:.2}", price)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
