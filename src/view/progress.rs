//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{PlayIndicator, Transport};
use super::layout::volume_percent;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, transport: &Transport) {
    let status_text = match (transport.selection(), transport.indicator()) {
        (None, _) => " No track playing".to_string(),
        (Some(selection), PlayIndicator::Playing) => {
            format!(" ▶ {} | {}", selection.title, selection.artist)
        }
        (Some(selection), PlayIndicator::Paused) => {
            format!("⏸  {} | {}", selection.title, selection.artist)
        }
    };

    let time_str = format!("{} / {}", transport.elapsed_label(), transport.total_label());
    let progress_ratio = (f64::from(transport.progress()) / 100.0).clamp(0.0, 1.0);

    let title = format!("{} ", status_text);
    let controls_info = format!(
        " Vol: {}% | Space: play/pause | ←/→: seek | H: help ",
        volume_percent(transport.volume())
    );

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
}
