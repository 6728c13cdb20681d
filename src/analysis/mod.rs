// ============================================================================
// Module : analysis
// ============================================================================
// Calculs dérivés des séries de chandelles
// ============================================================================

pub mod period_stats; // Niveaux de la période précédente

pub use period_stats::{derive_stats, PeriodStats};
