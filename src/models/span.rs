// ============================================================================
// Enum : Span (fenêtre de temps affichée)
// ============================================================================
// Représente la période choisie par l'utilisateur : dernière semaine,
// dernier mois ou 3 derniers mois.
//
// CONCEPTS RUST :
// 1. Table statique : chaque Span pointe vers une entrée de SPAN_TABLE
// 2. FromStr : conversion string -> enum avec erreur typée
// 3. Copy : enum sans données, copiée implicitement
// ============================================================================

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::windower::WindowError;

/// Fenêtre de temps sélectionnable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Span {
    /// 7 derniers jours de trading
    #[default]
    Week,
    /// 31 derniers jours de trading
    Month,
    /// 91 derniers jours de trading
    ThreeMonth,
}

/// Paramètres d'une fenêtre : profondeur et espacement des labels
///
/// - `lookback_days` : index du jour le plus ancien inclus (0 = aujourd'hui)
/// - `label_stride` : un label de date tous les `label_stride` index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanConfig {
    pub span: Span,
    /// Valeur utilisée dans la config ("week", "month", "3month")
    pub selector: &'static str,
    /// Titre affiché à côté du ticker
    pub title: &'static str,
    pub lookback_days: usize,
    pub label_stride: usize,
}

// ============================================================================
// Table statique Span -> (lookback, stride)
// ============================================================================
// CONCEPT RUST : const array
// - Évaluée à la compilation, aucune allocation
// - L'ordre des entrées suit l'ordre des variants (voir Span::index)
// ============================================================================

pub const SPAN_TABLE: [SpanConfig; 3] = [
    SpanConfig {
        span: Span::Week,
        selector: "week",
        title: "Last Week",
        lookback_days: 6,
        label_stride: 1,
    },
    SpanConfig {
        span: Span::Month,
        selector: "month",
        title: "Last Month",
        lookback_days: 30,
        label_stride: 5,
    },
    SpanConfig {
        span: Span::ThreeMonth,
        selector: "3month",
        title: "Last 3 Months",
        lookback_days: 90,
        label_stride: 15,
    },
];

impl Span {
    /// Toutes les fenêtres, dans l'ordre d'affichage
    pub const ALL: [Span; 3] = [Span::Week, Span::Month, Span::ThreeMonth];

    fn index(self) -> usize {
        match self {
            Span::Week => 0,
            Span::Month => 1,
            Span::ThreeMonth => 2,
        }
    }

    /// Retourne l'entrée de la table statique pour cette fenêtre
    pub fn config(self) -> &'static SpanConfig {
        &SPAN_TABLE[self.index()]
    }

    pub fn lookback_days(self) -> usize {
        self.config().lookback_days
    }

    pub fn label_stride(self) -> usize {
        self.config().label_stride
    }

    pub fn title(self) -> &'static str {
        self.config().title
    }

    pub fn selector(self) -> &'static str {
        self.config().selector
    }

    /// Parse un sélecteur, retombe sur la fenêtre par défaut si inconnu
    ///
    /// Un sélecteur invalide n'est pas montré à l'utilisateur : on affiche
    /// simplement la dernière semaine.
    pub fn parse_or_default(selector: &str) -> Span {
        selector.parse().unwrap_or_else(|e: WindowError| {
            debug!(selector = %selector, error = %e, "Unknown span selector, using default");
            Span::default()
        })
    }

    /// Fenêtre suivante (cycle Week → Month → ThreeMonth → Week)
    pub fn next(self) -> Span {
        Span::ALL[(self.index() + 1) % Span::ALL.len()]
    }

    /// Fenêtre précédente (cycle inverse)
    pub fn previous(self) -> Span {
        Span::ALL[(self.index() + Span::ALL.len() - 1) % Span::ALL.len()]
    }
}

impl FromStr for Span {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SPAN_TABLE
            .iter()
            .find(|entry| entry.selector.eq_ignore_ascii_case(wanted))
            .map(|entry| entry.span)
            .ok_or_else(|| WindowError::InvalidSpan(s.to_string()))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
