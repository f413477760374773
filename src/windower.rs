// ============================================================================
// HistoryWindower : fenêtrage de l'historique de prix
// ============================================================================
// Transforme l'historique brut (jours du plus récent au plus ancien) en :
// - une série de prix de clôture, du plus ancien au plus récent
// - une série creuse de labels "MM-DD" pour l'axe X
//
// CONCEPTS RUST :
// 1. Fonctions pures : aucune mutation d'état, même entrée = même sortie
// 2. thiserror : erreurs typées avec messages via #[error(...)]
// 3. Ranges inversées : (0..=n).rev() pour itérer de n à 0
// ============================================================================

use thiserror::Error;
use tracing::warn;

use crate::models::{DailyRecord, Span};

/// Longueur minimale d'une date exploitable ("YYYY-MM-DD")
const DATE_PREFIX_LEN: usize = 10;

// ============================================================================
// Erreurs du fenêtrage
// ============================================================================
// Aucune n'est fatale : l'appelant choisit un rendu dégradé
// (fenêtre par défaut, label vide, message "historique insuffisant").
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Sélecteur de fenêtre inconnu (ni "week", ni "month", ni "3month")
    #[error("Fenêtre inconnue : {0:?}")]
    InvalidSpan(String),

    /// L'historique est plus court que la fenêtre demandée
    #[error("Historique insuffisant : {required} jours requis, {available} disponibles")]
    InsufficientHistory { required: usize, available: usize },

    /// Date de moins de 10 caractères
    #[error("Date mal formée : {0:?}")]
    MalformedDate(String),
}

/// Résultat du fenêtrage, prêt à être passé au graphique
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowResult {
    /// Prix de clôture, du plus ancien au plus récent
    pub prices: Vec<f64>,

    /// Labels de dates, alignés sur un sous-ensemble des prix
    pub labels: Vec<String>,
}

impl WindowResult {
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Prix le plus récent de la fenêtre
    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    /// Variation en pourcentage entre le premier et le dernier prix
    pub fn change_percent(&self) -> Option<f64> {
        let first = *self.prices.first()?;
        let last = *self.prices.last()?;
        if first == 0.0 {
            return None;
        }
        Some(((last - first) / first) * 100.0)
    }

    /// Retourne true si la fenêtre finit au-dessus (ou au niveau) de son début
    pub fn is_positive(&self) -> bool {
        self.change_percent().map(|c| c >= 0.0).unwrap_or(true)
    }
}

// ============================================================================
// Opérations
// ============================================================================

/// Découpe l'historique selon la fenêtre demandée
///
/// Parcourt l'index `i` de `lookback_days` jusqu'à 0 :
/// - chaque `records[i].close` est ajouté aux prix
/// - si `i % label_stride == 0`, la date de `records[i]` devient un label
///
/// Le test du modulo porte sur l'index décroissant (distance à aujourd'hui),
/// pas sur la position dans la fenêtre : les labels sont ancrés au calendrier.
///
/// # Erreurs
/// * `InsufficientHistory` si `lookback_days >= records.len()`
///
/// Une date mal formée ne fait pas échouer la fenêtre : son label est vide.
pub fn window(records: &[DailyRecord], span: Span) -> Result<WindowResult, WindowError> {
    let config = span.config();
    let lookback = config.lookback_days;
    let stride = config.label_stride;

    if lookback >= records.len() {
        return Err(WindowError::InsufficientHistory {
            required: lookback + 1,
            available: records.len(),
        });
    }

    let mut prices = Vec::with_capacity(lookback + 1);
    let mut labels = Vec::with_capacity(lookback / stride + 1);

    for i in (0..=lookback).rev() {
        let record = &records[i];
        prices.push(record.close);

        if i % stride == 0 {
            let label = format_label(&record.date).unwrap_or_else(|e| {
                warn!(index = i, error = %e, "Malformed record date, using empty label");
                String::new()
            });
            labels.push(label);
        }
    }

    Ok(WindowResult { prices, labels })
}

/// Formate une date "YYYY-MM-DD..." en "MM-DD"
///
/// Seuls les 10 premiers caractères comptent. Aucune validation calendaire :
/// les deux tranches (mois, jour) sont recopiées telles quelles.
///
/// # Exemple
/// format_label("2020-11-13T00:00:00+0000") == Ok("11-13")
pub fn format_label(date: &str) -> Result<String, WindowError> {
    // CONCEPT RUST : chars() plutôt que des index d'octets
    // - Un slice d'octets paniquerait au milieu d'un caractère UTF-8
    let head: Vec<char> = date.chars().take(DATE_PREFIX_LEN).collect();
    if head.len() < DATE_PREFIX_LEN {
        return Err(WindowError::MalformedDate(date.to_string()));
    }

    let month: String = head[5..7].iter().collect();
    let day: String = head[8..10].iter().collect();
    Ok(format!("{}-{}", month, day))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    /// Génère `count` jours, du plus récent (index 0) au plus ancien
    /// Les prix valent 100 + index pour retrouver facilement la provenance
    fn make_records(count: usize) -> Vec<DailyRecord> {
        let today = NaiveDate::from_ymd_opt(2020, 11, 13).unwrap();
        (0..count)
            .map(|i| {
                let day = today - Duration::days(i as i64);
                DailyRecord::new(
                    format!("{}T00:00:00+0000", day.format("%Y-%m-%d")),
                    100.0 + i as f64,
                )
            })
            .collect()
    }

    #[test]
    fn test_format_label_with_time() {
        assert_eq!(format_label("2020-11-13T00:00:00+0000").unwrap(), "11-13");
    }

    #[test]
    fn test_format_label_plain_date() {
        assert_eq!(format_label("2020-01-05").unwrap(), "01-05");
    }

    #[test]
    fn test_format_label_no_calendar_validation() {
        assert_eq!(format_label("2020-99-ab").unwrap(), "99-ab");
    }

    #[test]
    fn test_format_label_too_short() {
        assert_eq!(
            format_label("2020-11-1"),
            Err(WindowError::MalformedDate("2020-11-1".to_string()))
        );
        assert!(format_label("").is_err());
    }

    #[test]
    fn test_format_label_multibyte_does_not_panic() {
        assert_eq!(format_label("2020-1é-13").unwrap(), "1é-13");
        assert!(format_label("ééééé").is_err());
    }

    #[test]
    fn test_week_window() {
        let records = make_records(10);
        let result = window(&records, Span::Week).unwrap();

        // Index 6 → 0 : du plus ancien au plus récent
        let expected: Vec<f64> = (0..=6).rev().map(|i| 100.0 + i as f64).collect();
        assert_eq!(result.prices, expected);

        // Stride 1 : chaque index porte un label
        assert_eq!(result.labels.len(), 7);
        assert_eq!(result.labels[0], format_label(&records[6].date).unwrap());
        assert_eq!(result.labels[6], format_label(&records[0].date).unwrap());
    }

    #[test]
    fn test_month_window_labels() {
        let records = make_records(31);
        let result = window(&records, Span::Month).unwrap();

        assert_eq!(result.prices.len(), 31);
        let expected: Vec<String> = [30, 25, 20, 15, 10, 5, 0]
            .iter()
            .map(|&i| format_label(&records[i].date).unwrap())
            .collect();
        assert_eq!(result.labels, expected);
    }

    #[test]
    fn test_three_month_window_labels() {
        let records = make_records(91);
        let result = window(&records, Span::ThreeMonth).unwrap();

        assert_eq!(result.prices.len(), 91);
        let expected: Vec<String> = [90, 75, 60, 45, 30, 15, 0]
            .iter()
            .map(|&i| format_label(&records[i].date).unwrap())
            .collect();
        assert_eq!(result.labels, expected);
    }

    #[test]
    fn test_window_lengths_for_all_spans() {
        let records = make_records(100);
        for span in Span::ALL {
            let result = window(&records, span).unwrap();
            let lookback = span.lookback_days();
            let stride = span.label_stride();
            assert_eq!(result.prices.len(), lookback + 1);
            assert_eq!(result.labels.len(), lookback / stride + 1);
        }
    }

    #[test]
    fn test_labels_come_from_stride_indices() {
        let records = make_records(100);
        for span in Span::ALL {
            let lookback = span.lookback_days();
            let stride = span.label_stride();
            let allowed: Vec<String> = (0..=lookback)
                .filter(|i| i % stride == 0)
                .map(|i| format_label(&records[i].date).unwrap())
                .collect();

            let result = window(&records, span).unwrap();
            for label in &result.labels {
                assert!(allowed.contains(label), "{} not at a stride index", label);
            }
        }
    }

    #[test]
    fn test_window_ignores_records_beyond_lookback() {
        let mut records = make_records(8);
        records[7].close = -1.0;
        let result = window(&records, Span::Week).unwrap();
        assert!(!result.prices.contains(&-1.0));
    }

    #[test]
    fn test_insufficient_history() {
        // Exactement lookback_days enregistrements : il en manque un
        let records = make_records(30);
        assert_eq!(
            window(&records, Span::Month),
            Err(WindowError::InsufficientHistory {
                required: 31,
                available: 30
            })
        );
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(
            window(&[], Span::Week),
            Err(WindowError::InsufficientHistory {
                required: 7,
                available: 0
            })
        );
    }

    #[test]
    fn test_malformed_date_gives_empty_label() {
        let mut records = make_records(7);
        records[3].date = "bad".to_string();
        let result = window(&records, Span::Week).unwrap();

        // Index 3 est à la position 6 - 3 = 3 dans la fenêtre
        assert_eq!(result.labels[3], "");
        assert_eq!(result.prices.len(), 7);
    }

    #[test]
    fn test_window_is_idempotent() {
        let records = make_records(91);
        for span in Span::ALL {
            assert_eq!(window(&records, span), window(&records, span));
        }
    }

    #[test]
    fn test_change_percent() {
        let result = WindowResult {
            prices: vec![100.0, 90.0, 110.0],
            labels: vec![],
        };
        assert!((result.change_percent().unwrap() - 10.0).abs() < 1e-9);
        assert!(result.is_positive());
        assert_eq!(result.last_price(), Some(110.0));

        let empty = WindowResult::default();
        assert!(empty.change_percent().is_none());
        assert!(empty.is_empty());
    }
}
