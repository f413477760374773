// ============================================================================
// tickerchart - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;      // Client de l'API de cotation
pub mod app;      // État de l'application
pub mod config;   // Configuration (fichier JSON + variables d'environnement)
pub mod models;   // Structures de données
pub mod ui;       // Interface utilisateur
pub mod windower; // Fenêtrage de l'historique de prix
