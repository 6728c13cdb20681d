// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Récupère les chandelles OHLC d'un symbole depuis l'endpoint chart v8
//
// CONCEPTS RUST :
// 1. async/await : programmation asynchrone (non-bloquante)
// 2. Result<T, E> : gestion d'erreurs avec contexte (anyhow)
// 3. Serde : désérialisation JSON vers des structures typées
// ============================================================================

use anyhow::{Context, Result};
use chrono::DateTime;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::models::{Interval, OHLCData, Period, OHLC};

/// Base de l'endpoint chart
const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart/";

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================
// Yahoo retourne un JSON imbriqué, on définit des structures qui matchent
// exactement sa forme pour que serde puisse désérialiser automatiquement.
// En cas d'erreur, `result` vaut null et `error` contient une description.
// ============================================================================

/// Réponse complète de l'API Yahoo Finance
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

/// Erreur renvoyée dans le corps JSON (ex: symbole inconnu)
#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

/// Colonnes OHLCV : chaque valeur peut être null côté Yahoo
#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

// ============================================================================
// Fonctions publiques de l'API
// ============================================================================

/// Récupère les chandelles d'un symbole pour une période et un intervalle
///
/// Un seul essai, sans retry : l'appelant transforme l'erreur en message.
///
/// # Arguments
/// * `client` - Client HTTP partagé (User-Agent + timeout configurés)
/// * `symbol` - Symbole fournisseur (ex: "EURUSD=X", "BTC-USD")
/// * `period` - Durée totale demandée
/// * `interval` - Granularité des chandelles
///
/// # Erreurs
/// Requête échouée, statut HTTP non 2xx, JSON invalide, erreur Yahoo,
/// ou aucune chandelle valide.
#[instrument(skip(client))]
pub async fn fetch_bars(
    client: &reqwest::Client,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Result<OHLCData> {
    let url = build_yahoo_url(symbol, period, interval)?;
    debug!(url = %url, "Built Yahoo Finance API URL");

    let response = client
        .get(url)
        .send()
        .await
        .context("Échec de la requête HTTP vers Yahoo Finance")?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    // Lit le corps même en cas d'erreur : Yahoo y met la description
    let body = response
        .text()
        .await
        .context("Échec de la lecture de la réponse Yahoo")?;

    let parsed: Result<YahooResponse, _> = serde_json::from_str(&body);

    if !status.is_success() {
        let detail = parsed
            .ok()
            .and_then(|r| r.chart.error)
            .and_then(|e| e.description.or(e.code));
        error!(status = %status, detail = ?detail, "Yahoo Finance returned error status");
        match detail {
            Some(detail) => anyhow::bail!("Yahoo Finance : HTTP {} ({})", status, detail),
            None => anyhow::bail!("Yahoo Finance a retourné une erreur : HTTP {}", status),
        }
    }

    let yahoo_response = parsed.context("Échec du parsing JSON de la réponse Yahoo")?;

    let data = parse_yahoo_response(yahoo_response, symbol, period, interval)?;

    info!(candles = data.len(), "Successfully fetched price data");
    Ok(data)
}

/// Construit l'URL de l'API Yahoo Finance
///
/// CONCEPT : Url plutôt que format!
/// - path_segments_mut() ajoute le symbole comme un seul segment
/// - query_pairs_mut() encode les paramètres
fn build_yahoo_url(symbol: &str, period: Period, interval: Interval) -> Result<Url> {
    let mut url = Url::parse(YAHOO_CHART_URL).context("URL Yahoo invalide")?;

    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("URL Yahoo sans chemin"))?
        .pop_if_empty()
        .push(symbol);

    url.query_pairs_mut()
        .append_pair("interval", interval.to_yahoo_string())
        .append_pair("range", period.to_yahoo_range());

    Ok(url)
}

/// Convertit la réponse Yahoo en OHLCData validée
///
/// CONCEPT : Validation à l'ingestion
/// - Les lignes avec un prix manquant sont ignorées (et comptées)
/// - Le reste du programme ne manipule que des OHLC complets
fn parse_yahoo_response(
    yahoo_response: YahooResponse,
    symbol: &str,
    period: Period,
    interval: Interval,
) -> Result<OHLCData> {
    if let Some(err) = yahoo_response.chart.error {
        let detail = err
            .description
            .or(err.code)
            .unwrap_or_else(|| "erreur inconnue".to_string());
        anyhow::bail!("Yahoo Finance : {}", detail);
    }

    let result = yahoo_response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .context("Aucune donnée retournée par Yahoo Finance")?;

    let mut ohlc_data = OHLCData::new(symbol.to_string(), period, interval);

    let timestamps = result.timestamp.unwrap_or_default();
    debug!(timestamp_count = timestamps.len(), "Received timestamps from Yahoo");

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .context("Pas de données OHLC dans la réponse")?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    // CONCEPT RUST : get(i).copied().flatten()
    // - get() : Option<&Option<f64>> (None si la colonne est trop courte)
    // - flatten() : Option<f64> (None si absent ou null)
    let column = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut skipped_count = 0;
    for (i, &timestamp) in timestamps.iter().enumerate() {
        // Timestamp hors de la plage chrono : ligne ignorée comme les autres
        let Some(datetime) = DateTime::from_timestamp(timestamp, 0) else {
            skipped_count += 1;
            continue;
        };

        let candle = OHLC::validated(
            datetime,
            column(&opens, i),
            column(&highs, i),
            column(&lows, i),
            column(&closes, i),
            volumes.get(i).copied().flatten(),
        );

        match candle {
            Some(candle) => ohlc_data.add_candle(candle),
            None => skipped_count += 1,
        }
    }

    if skipped_count > 0 {
        warn!(
            skipped = skipped_count,
            total = timestamps.len(),
            "Skipped candles with missing data"
        );
    }

    ohlc_data.sort_by_time();

    debug!(
        parsed = ohlc_data.len(),
        total = timestamps.len(),
        skipped = skipped_count,
        "Finished parsing OHLC data"
    );

    if ohlc_data.is_empty() {
        error!("No valid OHLC data found");
        anyhow::bail!(
            "Aucune donnée pour {} ({} / {})",
            symbol,
            period.to_yahoo_range(),
            interval.to_yahoo_string()
        );
    }

    Ok(ohlc_data)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<OHLCData> {
        let response: YahooResponse = serde_json::from_str(json).unwrap();
        parse_yahoo_response(response, "EURUSD=X", Period::FiveDays, Interval::D1)
    }

    #[test]
    fn test_build_yahoo_url() {
        let url = build_yahoo_url("EURUSD=X", Period::OneMonth, Interval::M15).unwrap();
        let url = url.as_str();
        assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/EURUSD"));
        assert!(url.contains("interval=15m"));
        assert!(url.contains("range=1mo"));
    }

    #[test]
    fn test_build_yahoo_url_keeps_symbol_as_single_segment() {
        let url = build_yahoo_url("BTC-USD", Period::FiveDays, Interval::D1).unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/BTC-USD");
        assert_eq!(url.query(), Some("interval=1d&range=5d"));
    }

    #[test]
    fn test_parse_skips_incomplete_rows() {
        let json = r#"{
            "chart": {
                "result": [{
                    "meta": { "symbol": "EURUSD=X" },
                    "timestamp": [1709251200, 1709510400, 1709596800],
                    "indicators": { "quote": [{
                        "open":   [1.08, null, 1.085],
                        "high":   [1.09, 1.10, 1.095],
                        "low":    [1.07, 1.06, 1.080],
                        "close":  [1.085, 1.09, 1.09],
                        "volume": [0, 0, null]
                    }]}
                }],
                "error": null
            }
        }"#;

        let data = parse(json).unwrap();
        assert_eq!(data.symbol, "EURUSD=X");
        assert_eq!(data.len(), 2);
        assert_eq!(data.candles[0].high, 1.09);
        assert_eq!(data.candles[1].low, 1.080);
        assert_eq!(data.candles[1].volume, 0);
    }

    #[test]
    fn test_parse_skips_out_of_range_timestamp() {
        // i64::MAX secondes dépasse la plage de chrono
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1709251200, 9223372036854775807, 1709510400],
                    "indicators": { "quote": [{
                        "open":  [1.08, 1.08, 1.085],
                        "high":  [1.09, 1.09, 1.095],
                        "low":   [1.07, 1.07, 1.080],
                        "close": [1.085, 1.085, 1.09]
                    }]}
                }],
                "error": null
            }
        }"#;

        let data = parse(json).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.candles[1].close, 1.09);
    }

    #[test]
    fn test_parse_all_null_is_an_error() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1709251200],
                    "indicators": { "quote": [{
                        "open": [null], "high": [null], "low": [null], "close": [null]
                    }]}
                }],
                "error": null
            }
        }"#;

        let err = parse(json).unwrap_err();
        assert!(err.to_string().contains("Aucune donnée"));
    }

    #[test]
    fn test_parse_empty_result_without_timestamps() {
        // Marché fermé / intervalle trop fin : Yahoo renvoie un résultat sans timestamp
        let json = r#"{
            "chart": {
                "result": [{ "indicators": { "quote": [{}] } }],
                "error": null
            }
        }"#;

        assert!(parse(json).is_err());
    }

    #[test]
    fn test_parse_yahoo_error_body() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }"#;

        let err = parse(json).unwrap_err();
        assert!(err.to_string().contains("symbol may be delisted"));
    }

    // Test avec un vrai appel API (peut échouer si pas de connexion)
    #[tokio::test]
    async fn test_fetch_bars() {
        let client = crate::api::build_client(std::time::Duration::from_secs(15)).unwrap();
        let result = fetch_bars(&client, "SPY", Period::FiveDays, Interval::D1).await;

        match result {
            Ok(data) => {
                assert_eq!(data.symbol, "SPY");
                assert!(!data.is_empty());
                assert!(data.candles.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
                println!("✓ Récupéré {} chandelles pour SPY", data.len());
            }
            Err(e) => {
                println!("⚠ Test skippé (pas de connexion?) : {:#}", e);
            }
        }
    }
}
