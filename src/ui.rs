use accucheck::{Report, Role};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
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
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Totals,
    Findings,
    Notes,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Totals => Page::Findings,
            Page::Findings => Page::Notes,
            Page::Notes => Page::Totals,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Totals => Page::Notes,
            Page::Findings => Page::Totals,
            Page::Notes => Page::Findings,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Totals => "Totals",
            Page::Findings => "Findings",
            Page::Notes => "Notes",
        }
    }
}

pub struct App {
    pub report: Report,
    pub current_page: Page,
    pub totals_state: TableState,
    pub findings_state: TableState,
    pub show_detail: bool,
}

impl App {
    pub fn new(report: Report) -> Self {
        let mut totals_state = TableState::default();
        if !report.aggregate.is_empty() {
            totals_state.select(Some(0));
        }

        let mut findings_state = TableState::default();
        if !report.findings.is_empty() {
            findings_state.select(Some(0));
        }

        let current_page = if report.has_findings() { Page::Findings } else { Page::Totals };

        Self {
            report,
            current_page,
            totals_state,
            findings_state,
            show_detail: false,
        }
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    fn active_list(&mut self) -> Option<(&mut TableState, usize)> {
        match self.current_page {
            Page::Totals => Some((&mut self.totals_state, self.report.aggregate.len())),
            Page::Findings => Some((&mut self.findings_state, self.report.findings.len())),
            Page::Notes => None,
        }
    }

    pub fn next(&mut self) {
        if let Some((state, len)) = self.active_list() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(i) if i + 1 >= len => 0,
                Some(i) => i + 1,
                None => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        if let Some((state, len)) = self.active_list() {
            if len == 0 {
                return;
            }
            let i = match state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            state.select(Some(i));
        }
    }

    pub fn selected_finding(&self) -> Option<&accucheck::Finding> {
        self.findings_state
            .selected()
            .and_then(|i| self.report.findings.get(i))
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    if app.show_detail && app.current_page == Page::Findings {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_findings(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        match app.current_page {
            Page::Totals => render_totals(f, chunks[1], app),
            Page::Findings => render_findings(f, chunks[1], app),
            Page::Notes => render_notes(f, chunks[1], app),
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Totals, Page::Findings, Page::Notes];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Rows: {}", app.report.overview.row_count),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));

    let findings_color = if app.report.has_findings() { Color::Red } else { Color::Green };
    tab_spans.push(Span::styled(
        format!("⚠ {}", app.report.findings.len()),
        Style::default().fg(findings_color),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles.iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_totals(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.report.aggregate.iter().map(|row| {
        let color = if row.total < 0.0 { Color::Red } else { Color::Green };
        Row::new(vec![
            Cell::from(truncate(&row.classification, 40)),
            Cell::from(format!("{:.2}", row.total)).style(Style::default().fg(color)),
        ])
    });

    let table = Table::new(rows, [Constraint::Length(42), Constraint::Length(20)])
        .header(header_row(&["Classification", "Total"]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Totals by Classification "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.totals_state);
}

fn findings_title(report: &Report) -> &'static str {
    if !report.checks_ran() {
        " Findings - not evaluated "
    } else if report.has_findings() {
        " Findings "
    } else {
        " Findings - none ✅ "
    }
}

fn render_findings(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.report.findings.iter().map(|finding| {
        Row::new(vec![
            Cell::from(finding.row_number().to_string()),
            Cell::from(finding.rule_id.clone()).style(Style::default().fg(Color::Red)),
            Cell::from(truncate(&finding.message, 80)),
        ])
    });

    let title = findings_title(&app.report);

    let table = Table::new(
        rows,
        [Constraint::Length(6), Constraint::Length(20), Constraint::Min(20)],
    )
    .header(header_row(&["Row", "Rule", "Message"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.findings_state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.selected_finding() {
        Some(finding) => vec![
            Line::from(vec![
                Span::styled("Row: ", Style::default().fg(Color::Yellow)),
                Span::raw(finding.row_number().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Rule: ", Style::default().fg(Color::Yellow)),
                Span::raw(finding.rule_id.clone()),
            ]),
            Line::from(""),
            Line::from(finding.message.clone()),
        ],
        None => vec![Line::from("No finding selected")],
    };

    let panel = Paragraph::new(content).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Detail "),
    );

    f.render_widget(panel, area);
}

fn render_notes(f: &mut Frame, area: Rect, app: &App) {
    let report = &app.report;
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::from(Span::styled("Columns", heading))];
    for role in Role::ALL {
        let text = match report.overview.roles.get(role) {
            Some(col) => format!("  ✓ {}: {}", role, col.header),
            None => format!("  ✗ {}: not found", role),
        };
        lines.push(Line::from(text));
    }

    if !report.advisories.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Advisories", heading)));
        for advisory in &report.advisories {
            lines.push(Line::from(format!("  {}", advisory.message())));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Interpretation", heading)));
    lines.push(Line::from(report.interpretation()));
    if let Some(commentary) = &report.commentary {
        lines.push(Line::from(""));
        lines.push(Line::from(commentary.clone()));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Recommendations", heading)));
    for item in report.recommendations() {
        lines.push(Line::from(format!("  - {}", item)));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Notes "),
    );

    f.render_widget(paragraph, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let status_spans = vec![
        Span::styled(format!(" {} ", app.report.summary()), Style::default().fg(Color::Cyan)),
        Span::raw(" | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Details | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
