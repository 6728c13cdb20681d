// ============================================================================
// API Client : NewsAPI
// ============================================================================
// Récupère les derniers titres de marché si une clé API est configurée.
// Sans clé, ou si la requête échoue, on affiche des liens statiques.
//
// CONCEPT : Dégradation gracieuse
// - load_news() ne retourne jamais d'erreur
// - L'échec devient un NewsFeed::Fallback avec la raison
// ============================================================================

use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::error::DashboardError;

/// Endpoint de recherche NewsAPI
const NEWSAPI_URL: &str = "https://newsapi.org/v2/everything";

/// Un titre d'actualité
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Article {
    pub title: String,
    pub url: String,
}

/// Lien statique affiché à la place des titres
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsLink {
    pub label: &'static str,
    pub url: &'static str,
}

/// Liens généraux (actualités + calendrier économique)
pub static FALLBACK_LINKS: &[NewsLink] = &[
    NewsLink {
        label: "Investing.com News",
        url: "https://www.investing.com/news/",
    },
    NewsLink {
        label: "ForexFactory Calendar",
        url: "https://www.forexfactory.com/calendar.php",
    },
];

/// Contenu de la section actualités
#[derive(Debug, Clone, PartialEq)]
pub enum NewsFeed {
    /// Titres récupérés depuis NewsAPI
    Headlines(Vec<Article>),

    /// Liens de repli, avec la raison (NewsUnavailable)
    Fallback {
        reason: DashboardError,
        links: &'static [NewsLink],
    },
}

impl NewsFeed {
    /// Construit un repli avec les liens statiques
    pub fn fallback(reason: impl Into<String>) -> Self {
        NewsFeed::Fallback {
            reason: DashboardError::NewsUnavailable(reason.into()),
            links: FALLBACK_LINKS,
        }
    }
}

// Réponse NewsAPI : seuls les champs utiles sont désérialisés
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    title: Option<String>,
    url: Option<String>,
}

/// Charge la section actualités (ne retourne jamais d'erreur)
///
/// # Arguments
/// * `client` - Client HTTP partagé
/// * `api_key` - Clé NewsAPI (None : liens statiques directement)
/// * `query` - Mots-clés de recherche
/// * `limit` - Nombre maximum de titres
pub async fn load_news(
    client: &reqwest::Client,
    api_key: Option<&str>,
    query: &str,
    limit: usize,
) -> NewsFeed {
    let Some(api_key) = api_key.filter(|k| !k.trim().is_empty()) else {
        debug!("No NewsAPI key configured, using static links");
        return NewsFeed::fallback("clé NewsAPI non configurée, liens généraux à la place");
    };

    match fetch_headlines(client, api_key, query, limit).await {
        Ok(articles) if articles.is_empty() => {
            info!(query = %query, "NewsAPI returned no articles");
            NewsFeed::fallback("aucun article trouvé")
        }
        Ok(articles) => NewsFeed::Headlines(articles),
        Err(e) => {
            warn!(error = ?e, "Failed to fetch news");
            NewsFeed::fallback(format!("{:#}", e))
        }
    }
}

/// Appelle NewsAPI et retourne les titres complets (titre + url)
#[instrument(skip(client, api_key))]
pub async fn fetch_headlines(
    client: &reqwest::Client,
    api_key: &str,
    query: &str,
    limit: usize,
) -> Result<Vec<Article>> {
    let url = build_news_url(query, limit)?;
    debug!(url = %url, "Built NewsAPI URL");

    let response = client
        .get(url)
        .header("X-Api-Key", api_key)
        .send()
        .await
        .context("Échec de la requête HTTP vers NewsAPI")?;

    let status = response.status();
    let body: NewsApiResponse = response
        .json()
        .await
        .with_context(|| format!("Réponse NewsAPI illisible (HTTP {})", status))?;

    let articles = parse_news_response(body)?;
    info!(count = articles.len(), "Fetched news headlines");
    Ok(articles.into_iter().take(limit).collect())
}

/// Construit l'URL de recherche NewsAPI
fn build_news_url(query: &str, limit: usize) -> Result<Url> {
    let mut url = Url::parse(NEWSAPI_URL).context("URL NewsAPI invalide")?;
    url.query_pairs_mut()
        .append_pair("q", query)
        .append_pair("pageSize", &limit.to_string())
        .append_pair("sortBy", "publishedAt")
        .append_pair("language", "en");
    Ok(url)
}

/// Vérifie le statut et garde les articles complets
fn parse_news_response(body: NewsApiResponse) -> Result<Vec<Article>> {
    if body.status != "ok" {
        anyhow::bail!(
            "NewsAPI : {}",
            body.message.unwrap_or_else(|| body.status.clone())
        );
    }

    // Les articles supprimés arrivent avec title "[Removed]"
    Ok(body
        .articles
        .into_iter()
        .filter_map(|a| match (a.title, a.url) {
            (Some(title), Some(url)) if title != "[Removed]" => Some(Article { title, url }),
            _ => None,
        })
        .collect())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_falls_back_to_static_links() {
        let client = reqwest::Client::new();

        for key in [None, Some(""), Some("   ")] {
            match load_news(&client, key, "markets", 5).await {
                NewsFeed::Fallback { reason, links } => {
                    assert!(matches!(reason, DashboardError::NewsUnavailable(_)));
                    assert_eq!(links.len(), 2);
                    assert_eq!(links[0].url, "https://www.investing.com/news/");
                    assert_eq!(links[1].url, "https://www.forexfactory.com/calendar.php");
                }
                other => panic!("expected fallback, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_build_news_url() {
        let url = build_news_url("gold price", 5).unwrap();
        let url = url.as_str();
        assert!(url.starts_with("https://newsapi.org/v2/everything?"));
        assert!(url.contains("q=gold+price"));
        assert!(url.contains("pageSize=5"));
    }

    #[test]
    fn test_parse_news_response_keeps_complete_articles() {
        let body: NewsApiResponse = serde_json::from_str(
            r#"{
                "status": "ok",
                "totalResults": 3,
                "articles": [
                    { "title": "Gold hits record", "url": "https://example.com/a" },
                    { "title": "[Removed]", "url": "https://removed.com" },
                    { "title": null, "url": "https://example.com/c" }
                ]
            }"#,
        )
        .unwrap();

        let articles = parse_news_response(body).unwrap();
        assert_eq!(
            articles,
            vec![Article {
                title: "Gold hits record".to_string(),
                url: "https://example.com/a".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_news_error_status() {
        let body: NewsApiResponse = serde_json::from_str(
            r#"{ "status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid." }"#,
        )
        .unwrap();

        let err = parse_news_response(body).unwrap_err();
        assert!(err.to_string().contains("API key is invalid"));
    }
}
