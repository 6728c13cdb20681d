// ============================================================================
// MarketDash - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod analysis; // Niveaux de la période précédente
pub mod api;      // Yahoo Finance + NewsAPI
pub mod app;      // État de l'application
pub mod config;   // config.toml + variables d'environnement
pub mod error;    // Erreurs du domaine
pub mod models;   // Structures de données
pub mod report;   // Une passe complète du dashboard
pub mod ui;       // Interface utilisateur
pub mod widget;   // Widget TradingView
