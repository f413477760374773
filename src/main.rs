// ============================================================================
// tickerchart - Historique de cours en graphique
// ============================================================================
// Programme TUI : saisir un ticker, choisir une fenêtre (semaine, mois,
// 3 mois), récupérer l'historique end-of-day et l'afficher en graphique ligne
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Worker thread + channels : le fetch HTTP ne bloque jamais l'UI
// 4. Restauration du terminal même en cas d'erreur
// ============================================================================

use std::io;
use std::path::PathBuf;
use std::sync::mpsc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use tickerchart::api::fetch_eod_history;
use tickerchart::app::{App, StatusMessage};
use tickerchart::config::{AppConfig, ACCESS_KEY_ENV};
use tickerchart::models::DailyRecord;
use tickerchart::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand / AppResult : messages échangés avec le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker exécute le fetch async et renvoie un résultat
// - App n'est possédée que par l'event loop : pas de Mutex
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Récupérer l'historique end-of-day d'un ticker
    FetchHistory { symbol: String },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    HistoryLoaded {
        symbol: String,
        records: Vec<DailyRecord>,
    },

    FetchFailed {
        symbol: String,
        error: String,
    },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier, avec rotation quotidienne.
// ============================================================================

/// Répertoire des logs
///
/// - Linux : ~/.local/share/tickerchart/logs/
/// - macOS : ~/Library/Application Support/tickerchart/logs/
/// - Sinon : ./logs
fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("tickerchart").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/tickerchart/logs/tickerchart.log.*
/// RUST_LOG=tickerchart=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "tickerchart.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Distingue l'UI du worker
                .with_line_number(true),
        )
        .with(
            // CONCEPT : EnvFilter
            // - RUST_LOG=debug : tous les logs debug+
            // - Par défaut : debug pour tickerchart, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tickerchart=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Logging en premier : si l'init échoue, on continue sans logs
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("tickerchart starting up");

    let config = AppConfig::load();
    let mut app = App::new(config.default_span());
    if !config.has_access_key() {
        warn!("No marketstack access key configured");
        app.set_status(StatusMessage::warning(format!(
            "Aucune clé marketstack : définissez {} ou api.access_key dans config.json",
            ACCESS_KEY_ENV
        )));
    }

    // Le runtime est créé ici pour que l'erreur remonte avec ?
    // puis déplacé dans le worker thread
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(runtime, config.clone(), command_rx, result_tx);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// Une commande à la fois : la requête suivante n'est lue qu'une fois la
// précédente terminée. App refuse de toute façon d'en envoyer une seconde
// tant que la première n'est pas revenue.
// ============================================================================

/// Worker thread qui exécute les fetch HTTP
///
/// # Arguments
/// * `runtime` - Runtime tokio déplacé dans le thread
/// * `config` - Copie de la configuration (URL, clé, timeout)
/// * `command_rx` - Receiver pour recevoir les commandes
/// * `result_tx` - Sender pour envoyer les résultats
fn spawn_background_worker(
    runtime: tokio::runtime::Runtime,
    config: AppConfig,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        // CONCEPT : recv() retourne Err quand tous les Sender sont drop
        // - La boucle s'arrête toute seule à la fin de main()
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            match command {
                AppCommand::FetchHistory { symbol } => {
                    let result = runtime.block_on(fetch_eod_history(&config, &symbol));

                    let message = match result {
                        Ok(records) => {
                            info!(ticker = %symbol, records = records.len(), "History loaded");
                            AppResult::HistoryLoaded { symbol, records }
                        }
                        Err(e) => {
                            error!(ticker = %symbol, error = ?e, "Failed to load history");
                            AppResult::FetchFailed {
                                symbol,
                                error: format!("{:#}", e),
                            }
                        }
                    };

                    if result_tx.send(message).is_err() {
                        break;
                    }
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Render
//   2. Input
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // CONCEPT : Non-blocking receive avec try_recv
        match result_rx.try_recv() {
            Ok(AppResult::HistoryLoaded { symbol, records }) => {
                app.apply_history(symbol, records);
            }
            Ok(AppResult::FetchFailed { symbol, error }) => {
                app.apply_fetch_error(&symbol, &error);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected!");
                anyhow::bail!("Le worker de chargement s'est arrêté");
            }
        }

        terminal.draw(|frame| render(frame, app))?;

        match events.next() {
            Ok(event) => handle_event(app, event, command_tx),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// L'ordre des branches compte : en mode saisie, toutes les lettres vont
// dans le buffer (y compris 'q', 'h', 'l', 'r').
// ============================================================================

fn handle_event(
    app: &mut App,
    event: tickerchart::ui::events::Event,
    command_tx: &mpsc::Sender<AppCommand>,
) {
    use tickerchart::ui::events::{
        get_char_from_event, is_backspace_event, is_enter_event, is_escape_event,
        is_next_span_event, is_previous_span_event, is_quit_event, is_refresh_event,
        is_search_event, is_ticker_char_event, span_shortcut, Event,
    };

    if let Event::Tick = event {
        return;
    }

    // ========================================
    // Input Mode : saisie du ticker
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            info!("User cancelled input");
            app.cancel_input();
        } else if is_enter_event(&event) {
            let input = app.submit_input();
            request_fetch(app, &input, command_tx);
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_ticker_char_event(&event) {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }
        return;
    }

    // ========================================
    // Vue graphique
    // ========================================
    if is_quit_event(&event) {
        // Two-step : première pression = confirmation, deuxième = quit
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return;
    }

    // Toute autre touche annule la confirmation de quit
    app.cancel_quit();

    if is_search_event(&event) {
        debug!("User opened ticker input");
        app.start_input();
    } else if is_refresh_event(&event) {
        match app.current_symbol().map(str::to_string) {
            Some(symbol) => request_fetch(app, &symbol, command_tx),
            None => debug!("Nothing to refresh"),
        }
    } else if is_next_span_event(&event) {
        app.next_span();
        info!(span = %app.selected_span, "User changed to next span");
    } else if is_previous_span_event(&event) {
        app.previous_span();
        info!(span = %app.selected_span, "User changed to previous span");
    } else if let Some(span) = span_shortcut(&event) {
        app.select_span(span);
        info!(span = %span, "User selected span");
    }
}

/// Envoie une requête au worker si App l'autorise
fn request_fetch(app: &mut App, input: &str, command_tx: &mpsc::Sender<AppCommand>) {
    let Some(symbol) = app.begin_fetch(input) else {
        debug!(input = %input, "Fetch not started");
        return;
    };

    info!(ticker = %symbol, span = %app.selected_span, "User requested history");
    if command_tx
        .send(AppCommand::FetchHistory { symbol: symbol.clone() })
        .is_err()
    {
        app.apply_fetch_error(&symbol, "worker indisponible");
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
