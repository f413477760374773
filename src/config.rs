// ============================================================================
// Configuration de l'application
// ============================================================================
// Chargée depuis un fichier JSON optionnel, avec des valeurs par défaut
// pour chaque champ absent.
//
// Emplacements essayés, dans l'ordre :
// - Linux : ~/.config/tickerchart/config.json
// - macOS : ~/Library/Application Support/tickerchart/config.json
// - ./config.json (répertoire courant)
//
// La variable d'environnement MARKETSTACK_ACCESS_KEY remplace la clé du
// fichier si elle est définie.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::Span;

/// Variable d'environnement pour la clé d'accès marketstack
pub const ACCESS_KEY_ENV: &str = "MARKETSTACK_ACCESS_KEY";

/// Configuration de l'API de cotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// URL de base, sans le "/eod" final
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Clé d'accès (paramètre access_key)
    #[serde(default)]
    pub access_key: String,

    /// Timeout de la requête HTTP (secondes)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Nombre de jours demandés à l'API (paramètre limit)
    /// 100 couvre les 91 jours d'une fenêtre de 3 mois
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// Configuration globale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,

    /// Fenêtre sélectionnée au démarrage ("week", "month", "3month")
    #[serde(default = "default_span")]
    pub default_span: String,
}

fn default_base_url() -> String {
    "http://api.marketstack.com/v1".to_string()
}
fn default_timeout() -> u64 {
    15
}
fn default_history_limit() -> usize {
    100
}
fn default_span() -> String {
    Span::default().selector().to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_key: String::new(),
            timeout_secs: default_timeout(),
            history_limit: default_history_limit(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            default_span: default_span(),
        }
    }
}

impl AppConfig {
    /// Charge la configuration depuis un fichier JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Lecture impossible de {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Configuration invalide dans {}", path.display()))
    }

    /// Parse une configuration JSON (champs absents = valeurs par défaut)
    pub fn from_json(content: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Charge la configuration, fichier d'abord, sinon valeurs par défaut
    ///
    /// CONCEPT : Dégradation gracieuse
    /// - Un fichier illisible est loggé puis ignoré
    /// - L'application démarre toujours
    pub fn load() -> Self {
        let mut config = Self::load_from(&Self::candidate_paths());
        config.apply_access_key_override(std::env::var(ACCESS_KEY_ENV).ok());
        config
    }

    fn load_from(paths: &[PathBuf]) -> Self {
        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded configuration");
                    return config;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = ?e, "Failed to load configuration");
                }
            }
        }

        info!("Using default configuration");
        Self::default()
    }

    /// Emplacements possibles du fichier de configuration
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("tickerchart").join("config.json"));
        }
        paths.push(PathBuf::from("config.json"));
        paths
    }

    /// Remplace la clé d'accès si une valeur non vide est fournie
    pub fn apply_access_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.api.access_key = key.trim().to_string();
        }
    }

    /// Fenêtre de démarrage (Week si le sélecteur est invalide)
    pub fn default_span(&self) -> Span {
        Span::parse_or_default(&self.default_span)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn has_access_key(&self) -> bool {
        !self.api.access_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api.base_url, "http://api.marketstack.com/v1");
        assert_eq!(config.api.history_limit, 100);
        assert_eq!(config.default_span(), Span::Week);
        assert!(!config.has_access_key());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AppConfig::from_json(
            r#"{ "api": { "access_key": "abc" }, "default_span": "3month" }"#,
        )
        .unwrap();
        assert_eq!(config.api.access_key, "abc");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.default_span(), Span::ThreeMonth);
    }

    #[test]
    fn test_invalid_span_falls_back_to_week() {
        let config = AppConfig::from_json(r#"{ "default_span": "fortnight" }"#).unwrap();
        assert_eq!(config.default_span(), Span::Week);
    }

    #[test]
    fn test_invalid_json() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_access_key_override() {
        let mut config = AppConfig::default();
        config.api.access_key = "from-file".to_string();

        config.apply_access_key_override(None);
        assert_eq!(config.api.access_key, "from-file");

        config.apply_access_key_override(Some("  ".to_string()));
        assert_eq!(config.api.access_key, "from-file");

        config.apply_access_key_override(Some("from-env".to_string()));
        assert_eq!(config.api.access_key, "from-env");
    }

    #[test]
    fn test_load_from_missing_paths() {
        let config = AppConfig::load_from(&[PathBuf::from("/nonexistent/tickerchart.json")]);
        assert_eq!(config.api.history_limit, 100);
    }
}
