// ============================================================================
// Screen - Rendu de l'interface principale
// ============================================================================
// Trois zones empilées :
// - Header : titre du ticker, dernier prix, variation sur la fenêtre
// - Graphique : voir ui::chart
// - Footer : raccourcis, message de statut ou ligne de saisie
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, StatusLevel};
use crate::models::Span as TimeSpan;
use crate::ui::chart;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = create_layout(frame.size());

    render_header(frame, app, chunks[0]);
    chart::render_chart(frame, app.chart.as_ref(), chunks[1]);

    if app.is_in_input_mode() {
        render_input_footer(frame, app, chunks[2]);
    } else {
        render_footer(frame, app, chunks[2]);
    }
}

/// Crée le layout principal (header, graphique, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header : titre + ligne de fenêtres
            Constraint::Min(0),    // Graphique : tout le reste
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📈 tickerchart ")
        .title_alignment(Alignment::Center);

    let summary = match &app.chart {
        Some(chart) => {
            let mut spans = vec![Span::styled(
                chart.title(),
                Style::default().add_modifier(Modifier::BOLD),
            )];

            if let Some(price) = chart.window.last_price() {
                spans.push(Span::raw(format!("   ${:.2}", price)));
            }

            if let Some(change) = chart.window.change_percent() {
                let (arrow, color) = if change >= 0.0 {
                    ("▲", Color::Green)
                } else {
                    ("▼", Color::Red)
                };
                spans.push(Span::styled(
                    format!("  {} {:+.2}%", arrow, change),
                    Style::default().fg(color),
                ));
            }

            if let Some(day) = chart.latest_day {
                spans.push(Span::styled(
                    format!("   au {}", day.format("%d/%m/%Y")),
                    Style::default().fg(Color::Gray),
                ));
            }

            Line::from(spans)
        }
        None => Line::from(Span::styled(
            "Aucun ticker",
            Style::default().fg(Color::Gray),
        )),
    };

    let paragraph = Paragraph::new(vec![summary, span_selector_line(app.selected_span)])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Ligne "Last Week | Last Month | Last 3 Months", la sélection en inverse
fn span_selector_line(selected: TimeSpan) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, span) in TimeSpan::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
        }

        let style = if *span == selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, span.title()), style));
    }
    Line::from(spans)
}

// ============================================================================
// Footer
// ============================================================================

/// Footer : confirmation de quit > chargement > statut > raccourcis
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else if let (true, Some(message)) = (app.is_loading_data(), app.loading_message.as_ref()) {
        Line::from(Span::styled(
            format!("⏳ {}", message),
            Style::default().fg(Color::Cyan),
        ))
    } else if let Some(status) = &app.status {
        let color = match status.level {
            StatusLevel::Warning => Color::Yellow,
            StatusLevel::Error => Color::Red,
        };
        Line::from(Span::styled(status.text.as_str(), Style::default().fg(color)))
    } else {
        let key = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        Line::from(vec![
            Span::styled("[q]", key),
            Span::raw(" Quit  "),
            Span::styled("[/]", key),
            Span::raw(" Ticker  "),
            Span::styled("[h l / 1 2 3]", key),
            Span::raw(" Fenêtre  "),
            Span::styled("[r]", key),
            Span::raw(" Recharger"),
        ])
    };

    let paragraph = Paragraph::new(vec![line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Footer en mode saisie : prompt + buffer + curseur
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" [Enter] Valider  [ESC] Annuler ");

    let input_line = Line::from(vec![
        Span::styled(
            "Ticker : ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let paragraph = Paragraph::new(vec![input_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
