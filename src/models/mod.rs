// ============================================================================
// Module : models
// ============================================================================
// Ce module contient les structures de données de l'application
// - asset : table fixe des actifs (nom affiché -> symboles)
// - ohlc : chandelles, période et intervalle
// ============================================================================

pub mod asset; // Table des actifs et résolution
pub mod ohlc;  // Chandelles OHLC

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use marketdash::models::ohlc::OHLC;
// On peut faire : use marketdash::models::OHLC;
pub use asset::{AssetClass, AssetEntry};
pub use ohlc::{Interval, OHLCData, Period, OHLC};
