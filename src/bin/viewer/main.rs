mod app;
mod narrative;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use app::{fetch_bounds, preview_lines, truncate, AppState, ChartSlot, ConnectionStatus, Mode};

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:6969".to_string());
    let out_dir = std::env::var("VIEWER_OUT_DIR").unwrap_or_else(|_| "charts".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("failed to build HTTP client");

    // Nothing else is shown if the service can't report its date range.
    let bounds = match fetch_bounds(&client, &base_url).await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to fetch date range from the API: {e}");
            std::process::exit(1);
        }
    };

    let mut app = AppState::new(base_url, PathBuf::from(out_dir), bounds);

    // Initial fetch before rendering
    app.refresh(&client).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut chart_table_state = TableState::default();
    chart_table_state.select(Some(0));

    let result = run_loop(&mut terminal, &mut app, &client, &mut chart_table_state).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
    chart_state: &mut TableState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app, chart_state))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Mode::Convert(input) = &mut app.mode {
            match key.code {
                KeyCode::Esc => app.mode = Mode::Browse,
                KeyCode::Enter => {
                    let input = std::mem::take(input);
                    app.mode = Mode::Browse;
                    app.info("Converting…");
                    terminal.draw(|f| render(f, app, chart_state))?;
                    app.convert(client, &input).await;
                }
                KeyCode::Backspace => {
                    input.pop();
                }
                KeyCode::Char(c) => input.push(c),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                app.info(format!("Fetching charts for {} to {}…", app.start, app.end));
                terminal.draw(|f| render(f, app, chart_state))?;
                app.refresh(client).await;
                app.message = None;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let max = app.charts.len().saturating_sub(1);
                let next = chart_state.selected().map_or(0, |i| (i + 1).min(max));
                chart_state.select(Some(next));
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let prev = chart_state.selected().map_or(0, |i| i.saturating_sub(1));
                chart_state.select(Some(prev));
            }
            KeyCode::Char('[') => app.shift_start(-1),
            KeyCode::Char(']') => app.shift_start(1),
            KeyCode::Char('{') => app.shift_end(-1),
            KeyCode::Char('}') => app.shift_end(1),
            KeyCode::Char('c') | KeyCode::Char('C') => app.mode = Mode::Convert(String::new()),
            KeyCode::Char('w') | KeyCode::Char('W') => {
                match app.save_chart(chart_state.selected().unwrap_or(0)) {
                    Ok(path) => app.info(format!("Saved {}", path.display())),
                    Err(e) => app.error(e),
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState, chart_state: &mut TableState) {
    let area = f.area();

    // Outer vertical split: header | body | status | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(0),    // body
            Constraint::Length(1), // status
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_body(f, app, chart_state, chunks[1]);
    render_status(f, app, chunks[2]);
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        ConnectionStatus::Connected => ("● connected".to_string(), Color::Green),
        ConnectionStatus::Connecting => ("◌ connecting".to_string(), Color::Yellow),
        ConnectionStatus::Error(e) => (format!("✗ {}", truncate(e, 40)), Color::Red),
    };

    let title_spans = vec![
        Span::styled(
            " Transaction Analysis Dashboard  ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
        Span::raw("  │  "),
        Span::styled(
            format!("{} → {}", app.start, app.end),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("data {} to {}", app.bounds.0, app.bounds.1),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  │  "),
        Span::styled(
            format!("fetched {}s ago", app.last_refresh.elapsed().as_secs()),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(title_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, chart_state: &mut TableState, area: Rect) {
    // Horizontal split: charts + narrative (35%) | preview (65%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.charts.len() as u16 + 3),
            Constraint::Min(0),
        ])
        .split(halves[0]);

    render_chart_table(f, app, chart_state, left[0]);
    render_narrative(f, left[1]);
    render_preview(f, app, chart_state.selected().unwrap_or(0), halves[1]);
}

fn render_chart_table(f: &mut Frame, app: &AppState, state: &mut TableState, area: Rect) {
    let header_cells = ["#", "Chart", "Status"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .charts
        .iter()
        .enumerate()
        .map(|(i, (kind, slot))| {
            let (status, color) = match slot {
                ChartSlot::Pending => ("…".to_string(), Color::DarkGray),
                ChartSlot::Ready(img) => {
                    let (w, h) = img.rgb.dimensions();
                    (format!("{w}×{h}"), Color::Green)
                }
                ChartSlot::Failed(_) => ("error".to_string(), Color::Red),
            };
            Row::new(vec![
                Cell::from(format!("{}", i + 1)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(kind.heading(), 36)),
                Cell::from(status).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " CHARTS ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    f.render_stateful_widget(table, area, state);
}

fn render_narrative(f: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(narrative::lines()).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " ANALYSIS ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(paragraph, area);
}

fn render_preview(f: &mut Frame, app: &AppState, selected: usize, area: Rect) {
    let Some((kind, slot)) = app.charts.get(selected) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", kind.heading().to_uppercase()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(inner);

    match slot {
        ChartSlot::Pending => {
            f.render_widget(Paragraph::new("Loading…").style(Style::default().fg(Color::DarkGray)), parts[0]);
        }
        ChartSlot::Failed(e) => {
            let text = format!("Failed to fetch image from {}: {e}", kind.endpoint());
            f.render_widget(
                Paragraph::new(text)
                    .wrap(Wrap { trim: true })
                    .style(Style::default().fg(Color::Red)),
                parts[0],
            );
        }
        ChartSlot::Ready(img) => {
            let lines = preview_lines(&img.rgb, parts[0].width, parts[0].height);
            f.render_widget(Paragraph::new(lines), parts[0]);
        }
    }

    f.render_widget(
        Paragraph::new(kind.caption())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray)),
        parts[1],
    );
}

fn render_status(f: &mut Frame, app: &AppState, area: Rect) {
    let line = match (&app.mode, &app.message) {
        (Mode::Convert(input), _) => Line::from(vec![
            Span::styled(" Convert to USD (amount CODE): ", Style::default().fg(Color::Yellow)),
            Span::raw(format!("{input}▏")),
        ]),
        (Mode::Browse, Some(msg)) => {
            let color = if msg.is_error { Color::Red } else { Color::Green };
            Line::from(Span::styled(format!(" {}", msg.text), Style::default().fg(color)))
        }
        (Mode::Browse, None) => Line::raw(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [q] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit  "),
        Span::styled("[r] ", Style::default().fg(Color::Yellow)),
        Span::raw("fetch  "),
        Span::styled("[↑↓ / j k] ", Style::default().fg(Color::Yellow)),
        Span::raw("select chart  "),
        Span::styled("[ [ ] ] ", Style::default().fg(Color::Yellow)),
        Span::raw("start ±1d  "),
        Span::styled("[ { } ] ", Style::default().fg(Color::Yellow)),
        Span::raw("end ±1d  "),
        Span::styled("[c] ", Style::default().fg(Color::Yellow)),
        Span::raw("convert  "),
        Span::styled("[w] ", Style::default().fg(Color::Yellow)),
        Span::raw("save png"),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
