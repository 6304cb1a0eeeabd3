//! Main content area rendering (results list, now playing panel)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{ActiveSection, ResultsView, SearchResult, Transport, TransportStatus, UiState};
use super::utils::{calculate_result_column_widths, truncate_string};

pub fn render_results(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    results: &ResultsView,
    playing_url: Option<&str>,
) {
    let is_focused = ui_state.active_section == ActiveSection::Results;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Results ")
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    let (message, style) = match results {
        ResultsView::Results {
            results,
            selected_index,
        } => {
            render_result_list(frame, area, block, results, *selected_index, is_focused, playing_url);
            return;
        }
        ResultsView::Empty => (
            "Type in search and press Enter to find music\n\nUse Tab to switch between search and results\nPress H for help",
            Style::default().fg(Color::DarkGray),
        ),
        ResultsView::Loading => ("Searching iTunes...", Style::default().fg(Color::Yellow)),
        ResultsView::NoResults => ("Nothing found.", Style::default().fg(Color::White)),
        ResultsView::Failed => ("Could not reach iTunes.", Style::default().fg(Color::Red)),
    };

    let placeholder = Paragraph::new(message).style(style).block(block);
    frame.render_widget(placeholder, area);
}

fn render_result_list(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    results: &[SearchResult],
    selected_index: usize,
    is_focused: bool,
    playing_url: Option<&str>,
) {
    let content_width = area.width.saturating_sub(4) as usize;
    let (num_width, title_width, artist_width) =
        calculate_result_column_widths(content_width, results.len());

    let items: Vec<ListItem> = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let is_playing = playing_url == Some(result.preview_url.as_str());
            let marker = if is_playing { "▶".to_string() } else { format!("{}", i + 1) };

            let style = if i == selected_index && is_focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if i == selected_index {
                Style::default().add_modifier(Modifier::BOLD)
            } else if is_playing {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };

            let line = format!(
                " {:>num_width$}   {}   {}",
                marker,
                truncate_string(&result.title, title_width),
                truncate_string(&result.artist, artist_width),
                num_width = num_width,
            );
            ListItem::new(line).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn render_now_playing(frame: &mut Frame, area: Rect, transport: &Transport) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Now Playing ")
        .padding(Padding::horizontal(1));

    let Some(selection) = transport.selection() else {
        let idle = Paragraph::new("Pick a track and press Enter")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(idle, area);
        return;
    };

    let status = match transport.status() {
        _ if transport.load_failed() => "Unavailable (Space to retry)",
        TransportStatus::Idle => "Idle",
        TransportStatus::Playing => "Playing",
        TransportStatus::Paused => "Paused",
        TransportStatus::Ended => "Finished",
    };

    let lines = vec![
        Line::from(Span::styled(
            selection.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(selection.artist.clone(), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(Span::styled(status, Style::default().fg(Color::Green))),
        Line::from(""),
        Line::from(Span::styled("Cover", Style::default().fg(Color::Yellow))),
        Line::from(Span::styled(
            selection.artwork_url.clone(),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(panel, area);
}
