//! Configuration du dashboard.
//!
//! Charge `config.toml` (répertoire courant, puis `~/.config/marketdash/`),
//! applique la variable d'environnement `NEWSAPI_KEY`, puis les options CLI
//! (dans `main`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{asset, Interval, Period};

/// Variable d'environnement de la clé NewsAPI
pub const NEWSAPI_KEY_VAR: &str = "NEWSAPI_KEY";

/// Erreurs de configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Lecture de {path} impossible : {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Fichier de configuration {path} invalide : {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Configuration racine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dashboard: DashboardConfig,
    pub news: NewsConfig,
    pub http: HttpConfig,
}

/// Valeurs initiales de la barre latérale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub asset: String,
    pub period: Period,
    pub interval: Interval,
    pub show_widget: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            asset: asset::default_asset().display_name.to_string(),
            period: Period::default(),
            interval: Interval::default(),
            show_widget: true,
        }
    }
}

/// Section actualités.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Clé NewsAPI ; sans clé, liens statiques
    pub api_key: Option<String>,
    pub query: String,
    pub limit: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            query: "markets".to_string(),
            limit: 5,
        }
    }
}

/// Réglages HTTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    /// Charge la configuration depuis un fichier.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse le contenu TOML.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Emplacements recherchés, dans l'ordre.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("marketdash").join("config.toml"));
        }
        paths
    }

    /// Charge le premier fichier existant, ou les valeurs par défaut.
    ///
    /// Un fichier présent mais invalide est une erreur : on ne l'ignore pas.
    pub fn load_default() -> Result<Self, ConfigError> {
        for path in Self::default_paths() {
            if path.is_file() {
                info!(path = %path.display(), "Loading config file");
                return Self::load(&path);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applique `NEWSAPI_KEY` si elle est définie (prioritaire sur le fichier).
    pub fn apply_env(&mut self) {
        self.apply_news_key(std::env::var(NEWSAPI_KEY_VAR).ok());
    }

    fn apply_news_key(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.news.api_key = Some(key);
        }
    }
}

/// État des contrôles de la barre latérale (une "passe" de rendu).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Nom affiché de l'actif (résolu à chaque passe)
    pub asset_name: String,
    pub period: Period,
    pub interval: Interval,
    pub show_widget: bool,
}

impl From<&DashboardConfig> for Settings {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            asset_name: config.asset.clone(),
            period: config.period,
            interval: config.interval,
            show_widget: config.show_widget,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from(&DashboardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dashboard.asset, "Gold (XAU/USD)");
        assert_eq!(config.dashboard.period, Period::OneMonth);
        assert_eq!(config.dashboard.interval, Interval::M15);
        assert!(config.dashboard.show_widget);
        assert_eq!(config.news.api_key, None);
        assert_eq!(config.http.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_parse_partial_file() {
        let config = Config::parse(
            r#"
            [dashboard]
            asset = "BTC/USD"
            interval = "1d"
            show_widget = false

            [news]
            api_key = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.dashboard.asset, "BTC/USD");
        assert_eq!(config.dashboard.interval, Interval::D1);
        assert_eq!(config.dashboard.period, Period::OneMonth);
        assert!(!config.dashboard.show_widget);
        assert_eq!(config.news.api_key.as_deref(), Some("abc"));
        assert_eq!(config.news.limit, 5);
    }

    #[test]
    fn test_parse_rejects_unknown_interval() {
        assert!(Config::parse("[dashboard]\ninterval = \"4h\"\n").is_err());
    }

    #[test]
    fn test_unknown_asset_is_kept_for_resolution() {
        // Le fichier est accepté : c'est resolve() qui signalera l'erreur
        let config = Config::parse("[dashboard]\nasset = \"DOGE\"\n").unwrap();
        let settings = Settings::from(&config.dashboard);
        assert_eq!(settings.asset_name, "DOGE");
        assert!(asset::resolve(&settings.asset_name).is_err());
    }

    #[test]
    fn test_news_key_override() {
        let mut config = Config::default();
        config.news.api_key = Some("from-file".to_string());

        config.apply_news_key(Some("  ".to_string()));
        assert_eq!(config.news.api_key.as_deref(), Some("from-file"));

        config.apply_news_key(Some("from-env".to_string()));
        assert_eq!(config.news.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/marketdash/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
