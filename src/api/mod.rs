// ============================================================================
// Module : api
// ============================================================================
// Clients HTTP des sources externes
// - yahoo : chandelles OHLC (Yahoo Finance)
// - news : titres d'actualité (NewsAPI), avec liens de repli
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};

pub mod news;  // Client NewsAPI
pub mod yahoo; // Client API Yahoo Finance

// Re-export des fonctions principales
pub use news::{load_news, NewsFeed};
pub use yahoo::fetch_bars;

/// User-Agent de navigateur pour éviter le blocage par Yahoo
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Crée le client HTTP partagé par tous les appels
///
/// CONCEPT : Un seul client réutilisé
/// - reqwest::Client garde un pool de connexions
/// - Le timeout borne chaque requête (pas de retry)
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Échec de la création du client HTTP")
}
