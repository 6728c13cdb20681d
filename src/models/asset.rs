// ============================================================================
// Structure : AssetEntry
// ============================================================================
// Table fixe des actifs proposés dans le dashboard
// Chaque actif a un nom affiché, un symbole Yahoo Finance et un symbole TradingView
//
// CONCEPTS RUST :
// 1. &'static str : les chaînes vivent dans le binaire, aucune allocation
// 2. static : table immuable, initialisée à la compilation
// 3. Result<&'static T, E> : on rend une référence vers la table, pas une copie
// ============================================================================

use crate::error::LookupError;

/// Classe d'actif financier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    Forex,     // Paire de devises (ex: EUR/USD)
    Metal,     // Métal précieux (ex: XAU/USD)
    Crypto,    // Cryptomonnaie (ex: BTC/USD)
    ETF,       // Exchange-Traded Fund (ex: SPY)
}

impl AssetClass {
    /// Label court pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            AssetClass::Forex => "Forex",
            AssetClass::Metal => "Métal",
            AssetClass::Crypto => "Crypto",
            AssetClass::ETF => "ETF",
        }
    }
}

/// Une entrée de la table des actifs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEntry {
    /// Nom affiché, unique dans la table (clé de sélection)
    pub display_name: &'static str,

    /// Symbole compris par Yahoo Finance (ex: "EURUSD=X")
    pub provider_symbol: &'static str,

    /// Symbole compris par le widget TradingView (ex: "OANDA:EURUSD")
    pub widget_symbol: &'static str,

    /// Classe d'actif
    pub class: AssetClass,
}

/// Table des actifs, dans l'ordre d'affichage
///
/// Note : Yahoo cote "JPY=X" comme USD/JPY
static ASSETS: &[AssetEntry] = &[
    AssetEntry {
        display_name: "Gold (XAU/USD)",
        provider_symbol: "XAUUSD=X",
        widget_symbol: "OANDA:XAUUSD",
        class: AssetClass::Metal,
    },
    AssetEntry {
        display_name: "EUR/USD",
        provider_symbol: "EURUSD=X",
        widget_symbol: "OANDA:EURUSD",
        class: AssetClass::Forex,
    },
    AssetEntry {
        display_name: "GBP/USD",
        provider_symbol: "GBPUSD=X",
        widget_symbol: "OANDA:GBPUSD",
        class: AssetClass::Forex,
    },
    AssetEntry {
        display_name: "USD/JPY",
        provider_symbol: "JPY=X",
        widget_symbol: "OANDA:USDJPY",
        class: AssetClass::Forex,
    },
    AssetEntry {
        display_name: "BTC/USD",
        provider_symbol: "BTC-USD",
        widget_symbol: "BITSTAMP:BTCUSD",
        class: AssetClass::Crypto,
    },
    AssetEntry {
        display_name: "SPY",
        provider_symbol: "SPY",
        widget_symbol: "NYSEARCA:SPY",
        class: AssetClass::ETF,
    },
];

/// Retourne toute la table, dans l'ordre d'affichage
pub fn all() -> &'static [AssetEntry] {
    ASSETS
}

/// Retourne l'actif sélectionné par défaut (premier de la table)
pub fn default_asset() -> &'static AssetEntry {
    &ASSETS[0]
}

/// Liste des noms affichés (pour le contrôle de sélection)
pub fn display_names() -> Vec<&'static str> {
    ASSETS.iter().map(|a| a.display_name).collect()
}

/// Position d'un nom dans la table
pub fn position(display_name: &str) -> Option<usize> {
    ASSETS.iter().position(|a| a.display_name == display_name)
}

/// Résout un nom affiché en entrée de la table
///
/// CONCEPT RUST : ok_or_else
/// - Option<T> -> Result<T, E>
/// - La closure ne construit l'erreur (et n'alloue) que si None
///
/// La comparaison est exacte : l'interface ne propose que des noms valides.
pub fn resolve(display_name: &str) -> Result<&'static AssetEntry, LookupError> {
    ASSETS
        .iter()
        .find(|a| a.display_name == display_name)
        .ok_or_else(|| LookupError {
            name: display_name.to_string(),
        })
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_entry_resolves_to_non_empty_symbols() {
        for name in display_names() {
            let entry = resolve(name).unwrap();
            assert_eq!(entry.display_name, name);
            assert!(!entry.provider_symbol.is_empty());
            assert!(!entry.widget_symbol.is_empty());
        }
    }

    #[test]
    fn test_display_names_are_unique() {
        let names: HashSet<&str> = display_names().into_iter().collect();
        assert_eq!(names.len(), all().len());
    }

    #[test]
    fn test_resolve_known_assets() {
        let gold = resolve("Gold (XAU/USD)").unwrap();
        assert_eq!(gold.provider_symbol, "XAUUSD=X");
        assert_eq!(gold.widget_symbol, "OANDA:XAUUSD");

        let jpy = resolve("USD/JPY").unwrap();
        assert_eq!(jpy.provider_symbol, "JPY=X");
        assert_eq!(jpy.widget_symbol, "OANDA:USDJPY");
    }

    #[test]
    fn test_resolve_unknown_asset() {
        let err = resolve("DOGE/USD").unwrap_err();
        assert_eq!(err.name, "DOGE/USD");

        // Comparaison exacte : pas de tolérance sur la casse
        assert!(resolve("spy").is_err());
    }

    #[test]
    fn test_default_and_position() {
        assert_eq!(default_asset().display_name, "Gold (XAU/USD)");
        assert_eq!(position("SPY"), Some(5));
        assert_eq!(position("nope"), None);
    }
}
