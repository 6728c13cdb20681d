// ============================================================================
// Erreurs du domaine
// ============================================================================
// Taxonomie des erreurs affichables du dashboard
//
// CONCEPTS RUST :
// 1. thiserror : dérive Display + std::error::Error depuis des attributs
// 2. anyhow reste utilisé dans les clients HTTP et dans main
// 3. Ces erreurs ne sont jamais fatales : elles deviennent des messages
// ============================================================================

use thiserror::Error;

/// Nom d'actif absent de la table fixe
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Actif inconnu : \"{name}\"")]
pub struct LookupError {
    /// Nom demandé (tel que saisi)
    pub name: String,
}

/// Erreurs convertibles en message pour l'utilisateur
///
/// CONCEPT : Erreurs non fatales
/// - Chaque variant est capturé là où il se produit
/// - Le reste de la page continue à s'afficher
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// L'appel au fournisseur de données a échoué ou n'a rien renvoyé
    #[error("Échec du chargement de {symbol} : {reason}")]
    FetchFailure { symbol: String, reason: String },

    /// Moins de deux chandelles : pas de "période précédente"
    #[error("Historique insuffisant ({rows} chandelle(s)) pour calculer les niveaux d'hier")]
    InsufficientHistory { rows: usize },

    /// Pas de clé NewsAPI, ou requête échouée
    #[error("Actualités indisponibles : {0}")]
    NewsUnavailable(String),
}

impl DashboardError {
    /// Construit une FetchFailure depuis une erreur anyhow
    ///
    /// CONCEPT : {:#} sur anyhow::Error
    /// - Affiche toute la chaîne de contexte sur une ligne
    pub fn fetch(symbol: &str, error: &anyhow::Error) -> Self {
        DashboardError::FetchFailure {
            symbol: symbol.to_string(),
            reason: format!("{:#}", error),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_message() {
        let err = LookupError { name: "DOGE".to_string() };
        assert_eq!(err.to_string(), "Actif inconnu : \"DOGE\"");

        // Transparent : le message reste identique une fois converti
        let wrapped: DashboardError = err.into();
        assert_eq!(wrapped.to_string(), "Actif inconnu : \"DOGE\"");
    }

    #[test]
    fn test_fetch_failure_keeps_context_chain() {
        let source = anyhow::anyhow!("HTTP 404").context("Échec de la requête");
        let err = DashboardError::fetch("SPY", &source);
        let message = err.to_string();
        assert!(message.contains("SPY"));
        assert!(message.contains("Échec de la requête"));
        assert!(message.contains("HTTP 404"));
    }

    #[test]
    fn test_insufficient_history_message() {
        let err = DashboardError::InsufficientHistory { rows: 1 };
        assert!(err.to_string().contains("1 chandelle"));
    }
}
