// ============================================================================
// Niveaux de la période précédente ("plus haut / plus bas d'hier")
// ============================================================================
// Transformation pure : une série de chandelles -> Option<PeriodStats>
//
// ALGORITHME :
// - Moins de 2 chandelles : None (historique insuffisant, pas zéro)
// - Sinon : la chandelle en position len - 2 fournit high et low
//
// LIMITATION CONNUE :
// - La chandelle précédente n'est "hier" que si une chandelle = une séance (1d)
// - En intraday (15m, 30m, 1h), c'est simplement la barre précédente
// - Le résultat n'est pas corrigé : le rapport le signale comme approximatif
// ============================================================================

use chrono::{DateTime, Utc};

use crate::models::OHLC;

/// Plus haut et plus bas de la période précédente
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodStats {
    /// High de l'avant-dernière chandelle
    pub previous_high: f64,

    /// Low de l'avant-dernière chandelle
    pub previous_low: f64,

    /// Timestamp de la chandelle utilisée
    pub timestamp: DateTime<Utc>,
}

impl PeriodStats {
    /// Amplitude de la période (high - low)
    pub fn range(&self) -> f64 {
        self.previous_high - self.previous_low
    }
}

/// Extrait les niveaux de la période précédente
///
/// CONCEPT RUST : checked_sub + slice::get
/// - len.checked_sub(2) vaut None si len < 2 (pas d'underflow sur usize)
/// - get() retourne une Option, jamais de panic
///
/// Les chandelles doivent être triées par timestamp croissant.
pub fn derive_stats(bars: &[OHLC]) -> Option<PeriodStats> {
    let index = bars.len().checked_sub(2)?;
    let bar = bars.get(index)?;

    Some(PeriodStats {
        previous_high: bar.high,
        previous_low: bar.low,
        timestamp: bar.timestamp,
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bars(high_low: &[(f64, f64)]) -> Vec<OHLC> {
        let base = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        high_low
            .iter()
            .enumerate()
            .map(|(i, &(high, low))| {
                OHLC::new(base + Duration::days(i as i64), low, high, low, high, 0)
            })
            .collect()
    }

    #[test]
    fn test_empty_series_has_no_stats() {
        assert_eq!(derive_stats(&[]), None);
    }

    #[test]
    fn test_single_bar_has_no_stats() {
        assert_eq!(derive_stats(&bars(&[(10.0, 8.0)])), None);
    }

    #[test]
    fn test_second_to_last_bar_is_used() {
        let series = bars(&[(10.0, 8.0), (12.0, 9.0), (15.0, 11.0)]);
        let stats = derive_stats(&series).unwrap();

        assert_eq!(stats.previous_high, 12.0);
        assert_eq!(stats.previous_low, 9.0);
        assert_eq!(stats.timestamp, series[1].timestamp);
        assert_eq!(stats.range(), 3.0);
    }

    #[test]
    fn test_two_bars_use_the_first() {
        let stats = derive_stats(&bars(&[(10.0, 8.0), (20.0, 1.0)])).unwrap();
        assert_eq!(stats.previous_high, 10.0);
        assert_eq!(stats.previous_low, 8.0);
    }

    #[test]
    fn test_last_bar_never_affects_result() {
        let a = derive_stats(&bars(&[(10.0, 8.0), (12.0, 9.0), (15.0, 11.0)]));
        let b = derive_stats(&bars(&[(10.0, 8.0), (12.0, 9.0), (999.0, 0.1)]));
        assert_eq!(a.map(|s| (s.previous_high, s.previous_low)), Some((12.0, 9.0)));
        assert_eq!(b.map(|s| (s.previous_high, s.previous_low)), Some((12.0, 9.0)));
    }
}
