// ============================================================================
// Structure : OHLC (Open, High, Low, Close)
// ============================================================================
// Représente les données d'une chandelle japonaise (candlestick)
// ainsi que la période et l'intervalle demandés au fournisseur
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : type de chrono pour dates avec timezone UTC
// 2. f64 : floating point 64 bits pour les prix (précision suffisante)
// 3. FromStr : parsing des valeurs "5d", "15m"... (CLI et config)
// ============================================================================

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Période totale demandée au fournisseur (paramètre `range` de Yahoo)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    /// 5 jours
    #[serde(rename = "5d")]
    FiveDays,
    /// 1 mois
    #[serde(rename = "1mo")]
    OneMonth,
    /// 3 mois
    #[serde(rename = "3mo")]
    ThreeMonths,
}

impl Period {
    /// Valeur du paramètre `range` pour l'API Yahoo Finance
    pub fn to_yahoo_range(&self) -> &'static str {
        match self {
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
        }
    }

    /// Retourne le label pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            Period::FiveDays => "5D",
            Period::OneMonth => "1M",
            Period::ThreeMonths => "3M",
        }
    }

    /// Toutes les périodes proposées dans la barre latérale
    pub fn all() -> Vec<Period> {
        vec![Period::FiveDays, Period::OneMonth, Period::ThreeMonths]
    }

    /// Période suivante (cycle)
    pub fn next(&self) -> Period {
        match self {
            Period::FiveDays => Period::OneMonth,
            Period::OneMonth => Period::ThreeMonths,
            Period::ThreeMonths => Period::FiveDays, // Boucle
        }
    }

    /// Période précédente (cycle)
    pub fn previous(&self) -> Period {
        match self {
            Period::FiveDays => Period::ThreeMonths, // Boucle
            Period::OneMonth => Period::FiveDays,
            Period::ThreeMonths => Period::OneMonth,
        }
    }
}

impl Default for Period {
    /// Période par défaut : 1 mois
    fn default() -> Self {
        Period::OneMonth
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::all()
            .into_iter()
            .find(|p| p.to_yahoo_range() == s)
            .ok_or_else(|| format!("période invalide \"{}\" (attendu : 5d, 1mo, 3mo)", s))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_yahoo_range())
    }
}

/// Intervalle de temps entre les chandelles
///
/// CONCEPT : Intervalle vs Période
/// - Interval : granularité des chandelles (15m, 30m, 1h, 1d)
/// - Period : durée totale demandée (5 jours, 1 mois, 3 mois)
/// - Les deux sont choisis indépendamment dans la barre latérale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    /// 15 minutes
    #[serde(rename = "15m")]
    M15,
    /// 30 minutes
    #[serde(rename = "30m")]
    M30,
    /// 1 heure
    #[serde(rename = "1h")]
    H1,
    /// 1 jour (daily)
    #[serde(rename = "1d")]
    D1,
}

impl Interval {
    /// Convertit l'intervalle en string pour l'API Yahoo Finance
    ///
    /// CONCEPT RUST : &'static str
    /// - Retourne une string littérale (dans le binaire)
    /// - Pas d'allocation
    pub fn to_yahoo_string(&self) -> &'static str {
        match self {
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::D1 => "1d",
        }
    }

    /// Retourne le label court pour l'affichage
    pub fn label(&self) -> &'static str {
        self.to_yahoo_string()
    }

    /// Format des labels de l'axe X, et si une ligne de dates est nécessaire
    ///
    /// - Intraday : heures sur la ligne 2, dates aux changements de jour en ligne 3
    /// - D1 : dates directement sur la ligne 2
    pub fn x_axis_format(&self) -> (&'static str, bool) {
        match self {
            Interval::M15 | Interval::M30 | Interval::H1 => ("%H:%M", true),
            Interval::D1 => ("%d/%m", false),
        }
    }

    /// Retourne true si l'intervalle est intraday (plusieurs chandelles par jour)
    ///
    /// CONCEPT : Une chandelle = une séance uniquement en D1
    /// - Pour les autres, "la chandelle précédente" n'est pas "hier"
    pub fn is_intraday(&self) -> bool {
        !matches!(self, Interval::D1)
    }

    /// Retourne tous les intervalles disponibles (pour UI de sélection)
    pub fn all() -> Vec<Interval> {
        vec![Interval::M15, Interval::M30, Interval::H1, Interval::D1]
    }

    /// Retourne l'intervalle suivant (cycle)
    pub fn next(&self) -> Interval {
        match self {
            Interval::M15 => Interval::M30,
            Interval::M30 => Interval::H1,
            Interval::H1 => Interval::D1,
            Interval::D1 => Interval::M15, // Boucle
        }
    }

    /// Retourne l'intervalle précédent (cycle)
    pub fn previous(&self) -> Interval {
        match self {
            Interval::M15 => Interval::D1, // Boucle
            Interval::M30 => Interval::M15,
            Interval::H1 => Interval::M30,
            Interval::D1 => Interval::H1,
        }
    }
}

impl Default for Interval {
    /// Intervalle par défaut : 15 minutes
    fn default() -> Self {
        Interval::M15
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::all()
            .into_iter()
            .find(|i| i.to_yahoo_string() == s)
            .ok_or_else(|| format!("intervalle invalide \"{}\" (attendu : 15m, 30m, 1h, 1d)", s))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_yahoo_string())
    }
}

/// Une chandelle japonaise (candlestick)
///
/// Tous les champs de prix sont obligatoires : les lignes incomplètes
/// du fournisseur sont rejetées à l'ingestion (voir `OHLC::validated`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OHLC {
    /// Timestamp de la chandelle
    pub timestamp: DateTime<Utc>,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Volume échangé (0 si inconnu, ex: forex)
    pub volume: u64,
}

impl OHLC {
    /// Constructeur : crée une nouvelle chandelle OHLC
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Construit une chandelle depuis des champs optionnels
    ///
    /// CONCEPT RUST : Option chaining avec ?
    /// - Retourne None dès qu'un prix manque
    /// - Rejette aussi les valeurs non finies (NaN, infini)
    pub fn validated(
        timestamp: DateTime<Utc>,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: Option<f64>,
        volume: Option<u64>,
    ) -> Option<Self> {
        let (open, high, low, close) = (open?, high?, low?, close?);
        if ![open, high, low, close].iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(Self::new(timestamp, open, high, low, close, volume.unwrap_or(0)))
    }

    /// Vérifie si la chandelle est haussière (bullish)
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }
}

/// Série de chandelles OHLC pour un symbole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OHLCData {
    /// Symbole fournisseur (ex: "EURUSD=X")
    pub symbol: String,

    /// Période demandée
    pub period: Period,

    /// Intervalle entre les chandelles
    pub interval: Interval,

    /// Liste des chandelles, triées par timestamp croissant
    pub candles: Vec<OHLC>,
}

impl OHLCData {
    /// Crée une série vide
    pub fn new(symbol: String, period: Period, interval: Interval) -> Self {
        Self {
            symbol,
            period,
            interval,
            candles: Vec::new(),
        }
    }

    /// Ajoute une chandelle
    pub fn add_candle(&mut self, candle: OHLC) {
        self.candles.push(candle);
    }

    /// Trie les chandelles par timestamp croissant
    ///
    /// Yahoo renvoie déjà les données triées, mais l'extraction de la
    /// période précédente repose sur cet ordre.
    pub fn sort_by_time(&mut self) {
        self.candles.sort_by_key(|c| c.timestamp);
    }

    /// Retourne le nombre de chandelles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Vérifie si la série est vide
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Retourne la chandelle la plus récente
    pub fn last(&self) -> Option<&OHLC> {
        self.candles.last()
    }

    /// Calcule la variation totale en pourcentage
    pub fn total_change_percent(&self) -> Option<f64> {
        let (first, last) = (self.candles.first()?, self.candles.last()?);
        if first.open == 0.0 {
            return None;
        }
        Some(((last.close - first.open) / first.open) * 100.0)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_ohlc_bullish() {
        let ohlc = OHLC::new(Utc::now(), 100.0, 110.0, 95.0, 105.0, 1000);
        assert!(ohlc.is_bullish());

        let ohlc = OHLC::new(Utc::now(), 100.0, 105.0, 90.0, 95.0, 1000);
        assert!(!ohlc.is_bullish());
    }

    #[test]
    fn test_validated_rejects_missing_or_nan() {
        let ts = at(9);
        assert!(OHLC::validated(ts, Some(1.0), Some(2.0), Some(0.5), Some(1.5), None).is_some());
        assert!(OHLC::validated(ts, Some(1.0), None, Some(0.5), Some(1.5), Some(10)).is_none());
        assert!(OHLC::validated(ts, Some(1.0), Some(f64::NAN), Some(0.5), Some(1.5), None).is_none());

        let candle = OHLC::validated(ts, Some(1.0), Some(2.0), Some(0.5), Some(1.5), None).unwrap();
        assert_eq!(candle.volume, 0);
    }

    #[test]
    fn test_ohlc_data_change() {
        let mut data = OHLCData::new("SPY".to_string(), Period::FiveDays, Interval::D1);
        assert!(data.is_empty());
        assert!(data.total_change_percent().is_none());

        data.add_candle(OHLC::new(at(9), 100.0, 110.0, 95.0, 105.0, 1000));
        data.add_candle(OHLC::new(at(10), 105.0, 115.0, 100.0, 110.0, 1200));

        assert_eq!(data.len(), 2);
        assert_eq!(data.last().map(|c| c.close), Some(110.0));
        assert_eq!(data.total_change_percent(), Some(10.0));
    }

    #[test]
    fn test_sort_by_time() {
        let mut data = OHLCData::new("SPY".to_string(), Period::FiveDays, Interval::H1);
        let base = at(9);
        data.add_candle(OHLC::new(base + Duration::hours(2), 3.0, 3.0, 3.0, 3.0, 0));
        data.add_candle(OHLC::new(base, 1.0, 1.0, 1.0, 1.0, 0));
        data.add_candle(OHLC::new(base + Duration::hours(1), 2.0, 2.0, 2.0, 2.0, 0));

        data.sort_by_time();
        let opens: Vec<f64> = data.candles.iter().map(|c| c.open).collect();
        assert_eq!(opens, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_interval_strings_and_parsing() {
        assert_eq!(Interval::M15.to_yahoo_string(), "15m");
        assert_eq!(Interval::D1.to_yahoo_string(), "1d");
        assert_eq!("1h".parse::<Interval>(), Ok(Interval::H1));
        assert!("4h".parse::<Interval>().is_err());
        assert_eq!(Interval::default(), Interval::M15);
    }

    #[test]
    fn test_period_strings_and_parsing() {
        assert_eq!(Period::OneMonth.to_yahoo_range(), "1mo");
        assert_eq!("3mo".parse::<Period>(), Ok(Period::ThreeMonths));
        assert!("1y".parse::<Period>().is_err());
        assert_eq!(Period::default(), Period::OneMonth);
    }

    #[test]
    fn test_cycles() {
        assert_eq!(Interval::D1.next(), Interval::M15); // Boucle
        assert_eq!(Interval::M15.previous(), Interval::D1);
        assert_eq!(Period::ThreeMonths.next(), Period::FiveDays);
        assert_eq!(Period::FiveDays.previous(), Period::ThreeMonths);
    }

    #[test]
    fn test_is_intraday() {
        assert!(Interval::M15.is_intraday());
        assert!(Interval::H1.is_intraday());
        assert!(!Interval::D1.is_intraday());
    }
}
