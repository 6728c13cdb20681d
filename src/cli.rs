// ============================================================================
// Ligne de commande
// ============================================================================
// Flags clap qui surchargent la configuration au démarrage :
// --asset, --period, --interval, --no-widget pour les contrôles,
// --once et --export-widget pour les modes sans TUI.
// ============================================================================

use std::path::PathBuf;

use clap::Parser;

use marketdash::config::Settings;
use marketdash::models::{Interval, Period};

/// Dashboard de marché en terminal : graphique, niveaux d'hier et actualités.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Actif à afficher (nom exact, ex: "EUR/USD")
    #[arg(long)]
    pub asset: Option<String>,

    /// Période d'historique : 5d, 1mo, 3mo
    #[arg(long)]
    pub period: Option<Period>,

    /// Intervalle des chandelles : 15m, 30m, 1h, 1d
    #[arg(long)]
    pub interval: Option<Interval>,

    /// Masque le widget TradingView
    #[arg(long)]
    pub no_widget: bool,

    /// Affiche le rapport une fois sur la sortie standard, sans TUI
    #[arg(long)]
    pub once: bool,

    /// Écrit le HTML du widget TradingView de l'actif dans un fichier
    #[arg(long, value_name = "PATH")]
    pub export_widget: Option<PathBuf>,

    /// Fichier de configuration (sinon ./config.toml puis ~/.config/marketdash/)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Les options passées en ligne de commande priment sur la configuration
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(asset) = &self.asset {
            settings.asset_name = asset.clone();
        }
        if let Some(period) = self.period {
            settings.period = period;
        }
        if let Some(interval) = self.interval {
            settings.interval = interval;
        }
        if self.no_widget {
            settings.show_widget = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "marketdash",
            "--asset",
            "BTC/USD",
            "--interval",
            "1d",
            "--no-widget",
        ])
        .unwrap();

        let mut settings = Settings::default();
        cli.apply_to(&mut settings);

        assert_eq!(settings.asset_name, "BTC/USD");
        assert_eq!(settings.interval, Interval::D1);
        assert_eq!(settings.period, Period::OneMonth);
        assert!(!settings.show_widget);
    }

    #[test]
    fn test_rejects_unknown_period() {
        assert!(Cli::try_parse_from(["marketdash", "--period", "1y"]).is_err());
    }
}
