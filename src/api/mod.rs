// ============================================================================
// Module : api
// ============================================================================
// Client de l'API de cotation (historique end-of-day)
// ============================================================================

pub mod marketstack; // Client API marketstack

// Re-export des fonctions principales
pub use marketstack::{fetch_eod_history, parse_eod_response};
