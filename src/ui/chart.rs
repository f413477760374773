// ============================================================================
// Chart - Rendu du graphique ligne
// ============================================================================
// Dessine WindowResult : les prix en série, les labels sur l'axe X
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de points (x, y)
// 3. Axis : bornes et labels
//
// Alignement des labels : ratatui répartit les labels uniformément sur l'axe.
// Les labels du windower tombent tous les `label_stride` points, de la
// première à la dernière position, quand `lookback_days` est un multiple de
// `label_stride` (vrai pour toute la table des fenêtres) : les deux
// répartitions coïncident.
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::ChartState;
use crate::windower::WindowResult;

/// Marge verticale autour des prix (5%)
const Y_MARGIN_RATIO: f64 = 0.05;

/// Dessine le graphique, ou un message si rien n'est chargé
pub fn render_chart(frame: &mut Frame, chart: Option<&ChartState>, area: Rect) {
    let chart = match chart {
        Some(chart) if !chart.window.is_empty() => chart,
        _ => {
            render_placeholder(frame, area);
            return;
        }
    };

    let points = chart_points(&chart.window);
    let (y_min, y_max) = y_bounds(&chart.window.prices);

    let color = if chart.window.is_positive() {
        Color::Green
    } else {
        Color::Red
    };

    let datasets = vec![Dataset::default()
        .name(chart.symbol.as_str())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points)];

    let x_labels: Vec<Span> = chart
        .window
        .labels
        .iter()
        .map(|label| Span::raw(label.as_str()))
        .collect();

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (points.len().saturating_sub(1)).max(1) as f64])
        .labels(x_labels);

    let y_axis = Axis::default()
        .title("Prix ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.2}", y_min)),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.2}", y_max)),
        ]);

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", chart.title())),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(widget, area);
}

/// Convertit les prix en points (position dans la fenêtre, prix)
pub fn chart_points(window: &WindowResult) -> Vec<(f64, f64)> {
    window
        .prices
        .iter()
        .enumerate()
        .map(|(i, &price)| (i as f64, price))
        .collect()
}

/// Bornes de l'axe Y avec une marge de 5%, jamais sous 0
///
/// Une série plate reçoit une marge d'une unité pour que l'axe ait une hauteur.
pub fn y_bounds(prices: &[f64]) -> (f64, f64) {
    if prices.is_empty() {
        return (0.0, 1.0);
    }

    // CONCEPT RUST : fold pour calculer min et max en un seul passage
    let (min, max) = prices
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), &p| (min.min(p), max.max(p)));

    let margin = if max > min {
        (max - min) * Y_MARGIN_RATIO
    } else {
        1.0
    };

    ((min - margin).max(0.0), max + margin)
}

/// Message affiché avant la première requête
fn render_placeholder(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Graphique ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Aucun ticker chargé",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[/] Rechercher un ticker (ex: AAPL)",
            Style::default().fg(Color::Yellow),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_points() {
        let window = WindowResult {
            prices: vec![10.0, 11.0, 12.5],
            labels: vec!["11-11".into(), "11-12".into(), "11-13".into()],
        };
        assert_eq!(
            chart_points(&window),
            vec![(0.0, 10.0), (1.0, 11.0), (2.0, 12.5)]
        );
    }

    #[test]
    fn test_y_bounds_margin() {
        let (lo, hi) = y_bounds(&[100.0, 200.0]);
        assert!((lo - 95.0).abs() < 1e-9);
        assert!((hi - 205.0).abs() < 1e-9);
    }

    #[test]
    fn test_y_bounds_flat_series() {
        assert_eq!(y_bounds(&[50.0, 50.0]), (49.0, 51.0));
    }

    #[test]
    fn test_y_bounds_never_negative() {
        let (lo, _) = y_bounds(&[0.1, 0.5]);
        assert!(lo >= 0.0);
        assert_eq!(y_bounds(&[]), (0.0, 1.0));
    }
}
