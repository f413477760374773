// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Remplacement en bloc : le graphique courant (ChartState) n'est jamais
//    modifié champ par champ, il est reconstruit puis remplacé
// ============================================================================

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::models::{DailyRecord, Span};
use crate::windower::{window, WindowError, WindowResult};

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : graphique du ticker courant
    Chart,

    /// Mode saisie : le footer devient une ligne de saisie de ticker
    /// - Enter valide, ESC annule
    InputMode,
}

/// Gravité d'un message de statut (détermine sa couleur)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Warning,
    Error,
}

/// Message affiché dans le footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

// ============================================================================
// Structure : ChartState
// ============================================================================
// Tout ce qu'il faut pour dessiner un graphique. Immuable une fois construit.
// ============================================================================

/// Graphique courant : historique brut + fenêtre calculée
#[derive(Debug, Clone, PartialEq)]
pub struct ChartState {
    pub symbol: String,
    pub span: Span,

    /// Historique complet reçu de l'API (du plus récent au plus ancien)
    /// Conservé pour changer de fenêtre sans refaire de requête
    pub records: Vec<DailyRecord>,

    pub window: WindowResult,

    /// Dernier jour de trading (None si la date est illisible)
    pub latest_day: Option<NaiveDate>,
}

impl ChartState {
    /// Calcule la fenêtre et construit l'état du graphique
    ///
    /// # Erreurs
    /// * `InsufficientHistory` si l'historique est trop court pour `span`
    pub fn build(
        symbol: String,
        records: Vec<DailyRecord>,
        span: Span,
    ) -> Result<Self, WindowError> {
        let window = window(&records, span)?;
        let latest_day = records.first().and_then(|r| r.trading_day());
        Ok(Self {
            symbol,
            span,
            records,
            window,
            latest_day,
        })
    }

    /// Reconstruit le graphique pour une autre fenêtre (même historique)
    pub fn with_span(&self, span: Span) -> Result<Self, WindowError> {
        Self::build(self.symbol.clone(), self.records.clone(), span)
    }

    /// Titre façon "AAPL Stock Last Week"
    pub fn title(&self) -> String {
        format!("{} Stock {}", self.symbol, self.span.title())
    }
}

// ============================================================================
// Structure : App
// ============================================================================

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' = demande de confirmation
    pub confirm_quit: bool,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Buffer de saisie du ticker
    pub input_buffer: String,

    /// Fenêtre sélectionnée (utilisée pour la prochaine requête)
    pub selected_span: Span,

    /// Une requête est en cours (une seule à la fois)
    pub is_loading: bool,

    pub loading_message: Option<String>,

    pub status: Option<StatusMessage>,

    /// Graphique affiché, None tant qu'aucune requête n'a abouti
    pub chart: Option<ChartState>,
}

impl App {
    /// Crée l'application avec la fenêtre de démarrage donnée
    pub fn new(selected_span: Span) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            current_screen: Screen::Chart,
            input_buffer: String::new(),
            selected_span,
            is_loading: false,
            loading_message: None,
            status: None,
            chart: None,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Symbole du graphique affiché
    pub fn current_symbol(&self) -> Option<&str> {
        self.chart.as_ref().map(|c| c.symbol.as_str())
    }

    // ========================================================================
    // Loading
    // ========================================================================

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    /// Prépare une requête pour `symbol`
    ///
    /// CONCEPT : Une seule requête en vol
    /// - Retourne None (et un message) si une requête est déjà en cours
    /// - Retourne None si le ticker est vide
    /// - Sinon active le chargement et retourne le ticker normalisé
    pub fn begin_fetch(&mut self, symbol: &str) -> Option<String> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return None;
        }

        if self.is_loading {
            self.set_status(StatusMessage::warning("Une requête est déjà en cours"));
            return None;
        }

        self.clear_status();
        self.start_loading(Some(format!("Chargement de {}...", symbol)));
        Some(symbol)
    }

    /// Applique un historique reçu du worker
    ///
    /// Le graphique n'est remplacé que si la fenêtre a pu être calculée :
    /// un historique trop court est signalé, jamais tronqué.
    pub fn apply_history(&mut self, symbol: String, records: Vec<DailyRecord>) {
        self.stop_loading();

        let available = records.len();
        match ChartState::build(symbol.clone(), records, self.selected_span) {
            Ok(state) => {
                info!(ticker = %symbol, span = %self.selected_span, records = available, "Chart updated");
                self.chart = Some(state);
                self.clear_status();
            }
            Err(e) => {
                warn!(ticker = %symbol, error = %e, "Cannot window history");
                self.set_status(StatusMessage::warning(format!("{} : {}", symbol, e)));
            }
        }
    }

    /// Applique une erreur de requête renvoyée par le worker
    pub fn apply_fetch_error(&mut self, symbol: &str, error: &str) {
        self.stop_loading();
        self.set_status(StatusMessage::error(format!("{} : {}", symbol, error)));
    }

    // ========================================================================
    // Fenêtres
    // ========================================================================

    /// Sélectionne une fenêtre et recalcule le graphique affiché
    ///
    /// Si l'historique en mémoire est trop court pour la nouvelle fenêtre,
    /// l'ancien graphique et l'ancienne sélection restent en place avec un
    /// avertissement : `selected_span` suit toujours `chart.span`.
    pub fn select_span(&mut self, span: Span) {
        let rebuilt = match &self.chart {
            Some(chart) if chart.span != span => chart.with_span(span),
            Some(_) => return,
            None => {
                self.selected_span = span;
                return;
            }
        };

        match rebuilt {
            Ok(state) => {
                self.selected_span = span;
                self.chart = Some(state);
                self.clear_status();
            }
            Err(e) => {
                let symbol = self.current_symbol().unwrap_or_default().to_string();
                warn!(ticker = %symbol, span = %span, error = %e, "Cannot switch span");
                self.set_status(StatusMessage::warning(format!("{} : {}", symbol, e)));
            }
        }
    }

    pub fn next_span(&mut self) {
        self.select_span(self.selected_span.next());
    }

    pub fn previous_span(&mut self) {
        self.select_span(self.selected_span.previous());
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    pub fn start_input(&mut self) {
        self.current_screen = Screen::InputMode;
        self.input_buffer.clear();
    }

    pub fn cancel_input(&mut self) {
        self.current_screen = Screen::Chart;
        self.input_buffer.clear();
    }

    /// Récupère la valeur saisie et retourne au graphique
    pub fn submit_input(&mut self) -> String {
        let value = std::mem::take(&mut self.input_buffer);
        self.current_screen = Screen::Chart;
        value
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(Span::default())
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn records(count: usize) -> Vec<DailyRecord> {
        (0..count)
            .map(|i| DailyRecord::new(format!("2020-11-{:02}", (i % 28) + 1), 100.0 + i as f64))
            .collect()
    }

    #[test]
    fn test_app_creation() {
        let app = App::new(Span::Month);
        assert!(app.is_running());
        assert_eq!(app.selected_span, Span::Month);
        assert!(app.chart.is_none());
        assert_eq!(app.current_screen, Screen::Chart);
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::default();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_input_mode() {
        let mut app = App::default();
        app.start_input();
        assert!(app.is_in_input_mode());

        app.append_char('a');
        app.append_char('p');
        app.append_char('x');
        app.backspace();
        assert_eq!(app.submit_input(), "ap");
        assert!(!app.is_in_input_mode());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_begin_fetch_single_request() {
        let mut app = App::default();
        assert_eq!(app.begin_fetch(" aapl "), Some("AAPL".to_string()));
        assert!(app.is_loading_data());

        // Deuxième requête refusée tant que la première n'est pas revenue
        assert_eq!(app.begin_fetch("TSLA"), None);
        assert_eq!(app.status.as_ref().map(|s| s.level), Some(StatusLevel::Warning));
    }

    #[test]
    fn test_begin_fetch_empty_symbol() {
        let mut app = App::default();
        assert_eq!(app.begin_fetch("   "), None);
        assert!(!app.is_loading_data());
    }

    #[test]
    fn test_apply_history_replaces_chart() {
        let mut app = App::default();
        app.begin_fetch("AAPL");
        app.apply_history("AAPL".to_string(), records(10));

        assert!(!app.is_loading_data());
        let chart = app.chart.as_ref().unwrap();
        assert_eq!(chart.symbol, "AAPL");
        assert_eq!(chart.window.prices.len(), 7);
        assert_eq!(chart.title(), "AAPL Stock Last Week");

        app.apply_history("TSLA".to_string(), records(10));
        assert_eq!(app.current_symbol(), Some("TSLA"));
    }

    #[test]
    fn test_apply_short_history_keeps_previous_chart() {
        let mut app = App::new(Span::Month);
        app.apply_history("AAPL".to_string(), records(40));
        app.apply_history("NEW".to_string(), records(5));

        assert_eq!(app.current_symbol(), Some("AAPL"));
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.level, StatusLevel::Warning);
        assert!(status.text.contains("Historique insuffisant"));
    }

    #[test]
    fn test_select_span_rewindows_cached_history() {
        let mut app = App::default();
        app.apply_history("AAPL".to_string(), records(100));

        app.next_span();
        let chart = app.chart.as_ref().unwrap();
        assert_eq!(chart.span, Span::Month);
        assert_eq!(chart.window.prices.len(), 31);

        app.select_span(Span::ThreeMonth);
        assert_eq!(app.chart.as_ref().unwrap().window.labels.len(), 7);
    }

    #[test]
    fn test_select_span_too_long_keeps_chart() {
        let mut app = App::default();
        app.apply_history("AAPL".to_string(), records(20));

        app.select_span(Span::Month);
        assert_eq!(app.selected_span, Span::Week);
        assert_eq!(app.chart.as_ref().unwrap().span, Span::Week);
        assert!(app.status.is_some());
    }

    #[test]
    fn test_select_span_without_chart() {
        let mut app = App::default();
        app.select_span(Span::ThreeMonth);
        assert_eq!(app.selected_span, Span::ThreeMonth);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_apply_fetch_error() {
        let mut app = App::default();
        app.begin_fetch("ZZZZ");
        app.apply_fetch_error("ZZZZ", "HTTP 404");
        assert!(!app.is_loading_data());
        assert_eq!(app.status.as_ref().map(|s| s.level), Some(StatusLevel::Error));
    }
}
