//! Terminal user interface for topk-tui

use crate::app::{App, UiState};
use crate::error::{Result, TopkError};
use crate::keys::{self, HELP};
use chrono::{DateTime, SecondsFormat, Utc};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::info;

/// Run the TUI until the user quits
pub async fn run(app: &App) -> Result<()> {
    let mut terminal = setup_terminal()?;
    install_panic_hook();
    info!("terminal attached");

    let result = run_loop(&mut terminal, app).await;

    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().map_err(|e| TopkError::Terminal(format!("raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| TopkError::Terminal(format!("alternate screen: {}", e)))?;
    Terminal::new(CrosstermBackend::new(stdout))
        .map_err(|e| TopkError::Terminal(e.to_string()))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Leave raw mode before the panic message prints
fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

/// Main event loop
async fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> Result<()> {
    let frame_period = app.config().plot_period();
    loop {
        terminal.draw(|f| draw(f, app))?;

        if event::poll(frame_period)? {
            if let Event::Key(key) = event::read()? {
                let page = usize::from(terminal.size()?.height.saturating_sub(3) / 2);
                if keys::apply_event(app, keys::translate_key(key), page) {
                    info!("quit requested");
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Draw one frame
pub fn draw(f: &mut Frame, app: &App) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(size);

    let split = app.config().render.view_split.clamp(20, 80);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(split),
            Constraint::Percentage(100 - split),
        ])
        .split(chunks[0]);

    let log_scale = app.log_scale();
    {
        let mut ui = app.ui.lock();
        draw_list(f, app, &mut ui, panes[0]);
        draw_plot(f, app, &mut ui, log_scale, panes[1]);
    }
    draw_help(f, chunks[1]);
}

/// Columns taken by `#rank` for a top-`k` list
pub fn rank_width(k: usize) -> usize {
    1 + ((k + 1) as f64).log10().ceil() as usize
}

fn draw_list(f: &mut Frame, app: &App, ui: &mut UiState, area: Rect) {
    let k = app.config().sketch.k;
    let width = rank_width(k);
    let (highlight, _) = app.palette();

    let items: Vec<ListItem> = ui
        .view
        .items()
        .iter()
        .map(|item| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("#{:<width$}", item.rank),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(item.label.clone()),
                ]),
                Line::from(Span::styled(
                    format!("{:width$} {}", "", item.count),
                    Style::default().fg(Color::Gray),
                )),
            ])
        })
        .collect();

    let title = if ui.track_selected {
        format!(" top {} · tracking ", k)
    } else {
        format!(" top {} ", k)
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(highlight.into())
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▌");

    let selected = (!ui.view.is_empty()).then(|| ui.view.selected());
    ui.list_state.select(selected);
    f.render_stateful_widget(list, area, &mut ui.list_state);
}

fn draw_plot(f: &mut Frame, app: &App, ui: &mut UiState, log_scale: bool, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    let plot = rows[0];
    ui.plot_area = (usize::from(plot.width), usize::from(plot.height));

    if ui.canvas.is_empty() {
        f.render_widget(
            Paragraph::new("waiting for data").style(Style::default().fg(Color::DarkGray)),
            plot,
        );
    } else {
        f.render_widget(&ui.canvas, plot);
    }

    let (highlight, _) = app.palette();
    let footer = footer_line(
        ui.latest_tick,
        app.config().sketch.window,
        log_scale,
        usize::from(rows[1].width),
        highlight.into(),
    );
    f.render_widget(Paragraph::new(footer), rows[1]);
}

/// `start  LIN LOG  end` with the active scale highlighted. Times are the
/// window bounds ending at `latest`, blank until a tick has been seen.
pub fn footer_line(
    latest: Option<DateTime<Utc>>,
    window: Duration,
    log_scale: bool,
    width: usize,
    active: Color,
) -> Line<'static> {
    let (left, right) = match latest {
        Some(end) => {
            let window = chrono::Duration::from_std(window).unwrap_or_else(|_| chrono::Duration::zero());
            (
                (end - window).to_rfc3339_opts(SecondsFormat::Secs, true),
                end.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
        }
        None => (String::new(), String::new()),
    };
    let scale_style = |on: bool| {
        if on {
            Style::default().fg(active).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let gap = width.saturating_sub(left.len() + right.len() + "LIN LOG".len());
    let left_pad = gap / 2;
    Line::from(vec![
        Span::raw(left),
        Span::raw(" ".repeat(left_pad)),
        Span::styled("LIN", scale_style(!log_scale)),
        Span::raw(" "),
        Span::styled("LOG", scale_style(log_scale)),
        Span::raw(" ".repeat(gap - left_pad)),
        Span::raw(right),
    ])
}

fn draw_help(f: &mut Frame, area: Rect) {
    let mut spans = Vec::with_capacity(HELP.len() * 3);
    for (i, (key, action)) in HELP.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(*key, Style::default().fg(Color::Gray)));
        spans.push(Span::styled(format!(" {}", action), Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_rank_width() {
        assert_eq!(rank_width(9), 2);
        assert_eq!(rank_width(50), 3);
        assert_eq!(rank_width(99), 3);
        assert_eq!(rank_width(100), 4);
    }

    #[test]
    fn test_footer_without_ticks() {
        let line = footer_line(None, Duration::from_secs(10), false, 11, Color::Cyan);
        assert_eq!(text(&line), "  LIN LOG  ");
        assert_eq!(line.spans[2].style.fg, Some(Color::Cyan));
        assert_eq!(line.spans[4].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_footer_window_bounds() {
        let end = DateTime::from_timestamp(1_700_000_010, 0).expect("in range");
        let line = footer_line(Some(end), Duration::from_secs(10), true, 60, Color::Cyan);
        let rendered = text(&line);
        assert!(rendered.starts_with("2023-11-14T22:13:20Z"));
        assert!(rendered.ends_with("2023-11-14T22:13:30Z"));
        assert_eq!(rendered.chars().count(), 60);
        assert_eq!(line.spans[4].style.fg, Some(Color::Cyan));
    }
}
