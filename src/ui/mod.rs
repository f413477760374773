// ============================================================================
// Module : ui
// ============================================================================
// Gère toute l'interface utilisateur (Terminal User Interface)
// ============================================================================

pub mod chart;  // Rendu du graphique ligne
pub mod events; // Gestion des événements clavier
pub mod screen; // Layout : header, graphique, footer

// Re-exports pour simplifier les imports
pub use events::{Event, EventHandler};
pub use screen::render;
