// ============================================================================
// Structure : DailyRecord
// ============================================================================
// Un jour de trading tel que renvoyé par l'API de cotation :
// une date (string ISO-8601 ou proche) et un prix de clôture.
//
// L'API renvoie les jours du plus récent au plus ancien (index 0 = dernier
// jour de trading). Cet ordre n'est jamais modifié après réception.
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Un jour de trading (date + clôture)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Date brute, ex: "2020-11-13T00:00:00+0000"
    pub date: String,

    /// Prix de clôture
    pub close: f64,
}

impl DailyRecord {
    pub fn new(date: impl Into<String>, close: f64) -> Self {
        Self {
            date: date.into(),
            close,
        }
    }

    /// Jour calendaire correspondant (10 premiers caractères)
    ///
    /// CONCEPT RUST : Option chaining avec ?
    /// - str::get() retourne None si la plage est hors limites
    /// - .ok() convertit le Result de chrono en Option
    ///
    /// Sert uniquement à l'affichage ("données au 13/11/2020") ;
    /// le fenêtrage travaille sur la string brute.
    pub fn trading_day(&self) -> Option<NaiveDate> {
        let head = self.date.get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}
