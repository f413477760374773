// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod record; // Un jour de trading (date + clôture)
pub mod span;   // Fenêtres de temps et leur table de paramètres

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use tickerchart::models::span::Span;
// On peut faire : use tickerchart::models::Span;
pub use record::DailyRecord;
pub use span::Span;
