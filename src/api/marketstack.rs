// ============================================================================
// API Client : marketstack (end-of-day)
// ============================================================================
// Récupère l'historique des clôtures journalières d'un ticker
//
// Exemple de réponse (champs inutiles omis) :
// {
//   "pagination": { "limit": 100, "offset": 0, "count": 100, "total": 252 },
//   "data": [
//     { "date": "2020-11-13T00:00:00+0000", "close": 119.26, "symbol": "AAPL" },
//     { "date": "2020-11-12T00:00:00+0000", "close": 119.21, "symbol": "AAPL" }
//   ]
// }
//
// Les jours sont triés du plus récent au plus ancien ; cet ordre est conservé
// tel quel, le fenêtrage en dépend.
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AppConfig;
use crate::models::DailyRecord;

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================
// CONCEPT RUST : serde ignore les champs inconnus
// - open, high, low, volume, exchange... ne sont pas déclarés
// - seul ce qui nous sert est désérialisé
// ============================================================================

#[derive(Debug, Deserialize)]
struct EodResponse {
    data: Option<Vec<EodEntry>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct EodEntry {
    date: String,
    close: Option<f64>,
}

/// Enveloppe d'erreur renvoyée par marketstack
/// ex: { "error": { "code": "invalid_access_key", "message": "..." } }
#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

impl ApiError {
    fn describe(&self) -> String {
        match &self.code {
            Some(code) => format!("{} ({})", self.message, code),
            None => self.message.clone(),
        }
    }
}

// ============================================================================
// Fonctions publiques
// ============================================================================

/// Récupère l'historique end-of-day d'un ticker
///
/// # Arguments
/// * `config` - URL de base, clé d'accès, timeout, limite
/// * `symbol` - Ticker saisi par l'utilisateur (ex: "aapl ")
///
/// # Retourne
/// * `Result<Vec<DailyRecord>>` - Jours du plus récent au plus ancien
///
/// CONCEPT RUST : #[instrument]
/// - skip(config) : la clé d'accès ne doit pas finir dans les logs
/// - Pour la même raison, l'URL (qui porte la clé) est retirée des
///   erreurs reqwest avec `without_url()`
#[instrument(skip(config))]
pub async fn fetch_eod_history(config: &AppConfig, symbol: &str) -> Result<Vec<DailyRecord>> {
    let symbol = normalize_symbol(symbol)?;
    let url = build_eod_url(&config.api.base_url);
    let limit = config.api.history_limit.to_string();
    debug!(url = %url, symbol = %symbol, limit = %limit, "Built marketstack EOD URL");

    let client = reqwest::Client::builder()
        .user_agent(concat!("tickerchart/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout())
        .build()
        .context("Échec de la création du client HTTP")?;

    debug!("Sending HTTP request to marketstack");
    let response = client
        .get(&url)
        .query(&[
            ("access_key", config.api.access_key.as_str()),
            ("symbols", symbol.as_str()),
            ("limit", limit.as_str()),
        ])
        .send()
        .await
        .map_err(|e| e.without_url())
        .context("Échec de la requête HTTP vers marketstack")?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    let body = response
        .text()
        .await
        .map_err(|e| e.without_url())
        .context("Échec de la lecture de la réponse marketstack")?;

    if !status.is_success() {
        let detail = api_error_message(&body)
            .map(|msg| format!(" : {}", msg))
            .unwrap_or_default();
        error!(status = %status, detail = %detail, "marketstack returned error status");
        anyhow::bail!("marketstack a retourné une erreur HTTP {}{}", status, detail);
    }

    let records = parse_eod_response(&body)?;
    if records.is_empty() {
        error!("No EOD data in response");
        anyhow::bail!("Aucune donnée de clôture pour {}", symbol);
    }

    info!(records = records.len(), "Successfully fetched EOD history");
    Ok(records)
}

/// Parse le corps JSON d'une réponse EOD
///
/// - Une enveloppe `error` devient une erreur
/// - Un jour sans clôture (`null`) rejette toute la réponse : l'ignorer
///   décalerait les index, et `records[i]` doit rester "i jours avant"
pub fn parse_eod_response(body: &str) -> Result<Vec<DailyRecord>> {
    let response: EodResponse =
        serde_json::from_str(body).context("Échec du parsing JSON de la réponse marketstack")?;

    if let Some(api_error) = response.error {
        anyhow::bail!("marketstack : {}", api_error.describe());
    }

    let entries = response.data.unwrap_or_default();

    // CONCEPT RUST : collect() sur des Result
    // - Vec<Result<T>> -> Result<Vec<T>>
    // - s'arrête à la première erreur
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| match entry.close {
            Some(close) => Ok(DailyRecord::new(entry.date, close)),
            None => {
                warn!(index = i, date = %entry.date, "EOD entry without close price");
                Err(anyhow::anyhow!(
                    "Clôture manquante pour le {} (jour {})",
                    entry.date,
                    i
                ))
            }
        })
        .collect()
}

/// Nettoie le ticker saisi : espaces retirés, majuscules
fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        anyhow::bail!("Ticker vide");
    }
    Ok(symbol)
}

/// Construit l'URL de l'endpoint EOD (les paramètres sont ajoutés par reqwest)
fn build_eod_url(base_url: &str) -> String {
    format!("{}/eod", base_url.trim_end_matches('/'))
}

/// Extrait le message d'une enveloppe d'erreur, si le corps en contient une
fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.describe())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "pagination": { "limit": 3, "offset": 0, "count": 3, "total": 252 },
        "data": [
            { "open": 119.44, "high": 119.67, "low": 117.87, "close": 119.26,
              "volume": 81688586.0, "symbol": "AAPL", "exchange": "XNAS",
              "date": "2020-11-13T00:00:00+0000" },
            { "close": 119.21, "symbol": "AAPL", "date": "2020-11-12T00:00:00+0000" },
            { "close": 119.49, "symbol": "AAPL", "date": "2020-11-11T00:00:00+0000" }
        ]
    }"#;

    #[test]
    fn test_parse_keeps_order() {
        let records = parse_eod_response(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], DailyRecord::new("2020-11-13T00:00:00+0000", 119.26));
        assert_eq!(records[2].close, 119.49);
    }

    #[test]
    fn test_parse_rejects_null_close() {
        let body = r#"{ "data": [
            { "date": "2020-11-13", "close": 10.0 },
            { "date": "2020-11-12", "close": null },
            { "date": "2020-11-11", "close": 12.0 }
        ] }"#;
        let err = parse_eod_response(body).unwrap_err();
        assert!(err.to_string().contains("2020-11-12"));
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{ "error": { "code": "invalid_access_key",
                        "message": "You have not supplied a valid API Access Key." } }"#;
        let err = parse_eod_response(body).unwrap_err();
        assert!(err.to_string().contains("invalid_access_key"));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(parse_eod_response("<html>").is_err());
    }

    #[test]
    fn test_api_error_message() {
        let body = r#"{ "error": { "message": "Rate limit reached" } }"#;
        assert_eq!(api_error_message(body).as_deref(), Some("Rate limit reached"));
        assert!(api_error_message(SAMPLE).is_none());
    }

    #[test]
    fn test_build_eod_url() {
        assert_eq!(
            build_eod_url("http://api.marketstack.com/v1/"),
            "http://api.marketstack.com/v1/eod"
        );
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert!(normalize_symbol("   ").is_err());
    }

    // CONCEPT RUST : #[tokio::test]
    // - Runtime tokio monté pour le test, .await autorisé
    // - Port 9 (discard) fermé en local : la connexion doit échouer proprement
    // - La clé d'accès ne doit apparaître ni dans le message affiché,
    //   ni dans le Debug loggé par le worker
    #[tokio::test]
    async fn test_fetch_unreachable_host_fails_without_leaking_key() {
        let mut config = AppConfig::default();
        config.api.base_url = "http://127.0.0.1:9/v1".to_string();
        config.api.access_key = "SECRETKEY123".to_string();
        config.api.timeout_secs = 2;

        let err = fetch_eod_history(&config, "AAPL").await.unwrap_err();
        let shown = format!("{:#}", err);
        let logged = format!("{:?}", err);
        assert!(shown.contains("Échec de la requête HTTP"));
        assert!(!shown.contains("SECRETKEY123"), "{}", shown);
        assert!(!logged.contains("SECRETKEY123"), "{}", logged);
    }

    #[tokio::test]
    async fn test_fetch_empty_symbol_fails_without_request() {
        let config = AppConfig::default();
        let err = fetch_eod_history(&config, "  ").await.unwrap_err();
        assert_eq!(err.to_string(), "Ticker vide");
    }
}
