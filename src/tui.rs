use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::board::JobBoard;
use crate::filter::FilterCriteria;
use crate::models::JobPosting;
use crate::pagination::PageResult;
use crate::store::RecordStore;

struct AppState {
    criteria: FilterCriteria,
    page: PageResult,
    selected: usize,
    scroll_offset: u16,
    opened: Option<JobPosting>,
    message: Option<String>,
}

impl AppState {
    fn new(criteria: FilterCriteria, page: PageResult) -> Self {
        Self {
            criteria,
            page,
            selected: 0,
            scroll_offset: 0,
            opened: None,
            message: None,
        }
    }

    fn current_job(&self) -> Option<&JobPosting> {
        self.page.data.get(self.selected)
    }

    fn next(&mut self) {
        if !self.page.data.is_empty() && self.selected < self.page.data.len() - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }

    fn has_next_page(&self) -> bool {
        u64::from(self.page.pagination.page) < self.page.pagination.pages
    }

    fn turn_page<S: RecordStore>(&mut self, board: &JobBoard<S>, forward: bool) {
        let window = if forward {
            if !self.has_next_page() {
                return;
            }
            self.criteria.page.next()
        } else {
            if self.criteria.page.page() == 1 {
                return;
            }
            self.criteria.page.previous()
        };

        let criteria = FilterCriteria {
            page: window,
            ..self.criteria.clone()
        };
        match board.list_jobs(&criteria) {
            Ok(page) => {
                self.criteria = criteria;
                self.page = page;
                self.selected = 0;
                self.scroll_offset = 0;
                self.message = None;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn open_current<S: RecordStore>(&mut self, board: &JobBoard<S>) {
        let Some(id) = self.current_job().map(|j| j.id) else { return };
        match board.get_job(id) {
            Ok(posting) => {
                if let Some(listed) = self.page.data.get_mut(self.selected) {
                    listed.views = posting.views;
                }
                self.opened = Some(posting);
                self.message = None;
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }
}

pub fn run_browse<S: RecordStore>(board: &JobBoard<S>, criteria: FilterCriteria) -> Result<()> {
    let page = board.list_jobs(&criteria)?;
    if page.pagination.total == 0 {
        println!("No jobs found.");
        return Ok(());
    }

    let mut state = AppState::new(criteria, page);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, board);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop<S: RecordStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    board: &JobBoard<S>,
) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('n') | KeyCode::Right => state.turn_page(board, true),
                KeyCode::Char('p') | KeyCode::Left => state.turn_page(board, false),
                KeyCode::Enter => state.open_current(board),
                _ => {}
            }
            list_state.select(Some(state.selected));
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(65),
        ])
        .split(frame.area());

    // Left panel: one page of postings
    let items: Vec<ListItem> = state
        .page
        .data
        .iter()
        .map(|job| {
            let title = if job.title.chars().count() > 35 {
                format!("{}...", job.title.chars().take(32).collect::<String>())
            } else {
                job.title.clone()
            };
            ListItem::new(format!("#{:<4} {} | {}", job.id, title, job.company_name))
        })
        .collect();

    let meta = &state.page.pagination;
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Jobs ({}) page {}/{} ",
            meta.total,
            meta.page,
            meta.pages.max(1)
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: posting detail
    let detail = build_detail(state);
    let detail_widget = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(detail_widget, chunks[1]);

    // Footer help
    let help_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let footer = match &state.message {
        Some(msg) => format!(" {}", msg),
        None => " j/k:navigate  J/K:scroll  n/p:page  enter:open  q:quit".to_string(),
    };
    let help = Paragraph::new(footer).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area[1]);
}

fn build_detail(state: &AppState) -> Text<'_> {
    let Some(listed) = state.current_job() else {
        return Text::raw("No job selected");
    };
    let opened = state.opened.as_ref().filter(|o| o.id == listed.id);
    let job = opened.unwrap_or(listed);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        job.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {} ({})", job.company_name, job.location)));
    lines.push(Line::from(Span::styled(
        format!("{} | {} | {}", job.job_type, job.category, job.experience_level),
        Style::default().fg(Color::Cyan),
    )));

    if let Some(range) = job.salary.range() {
        lines.push(Line::from(format!("Salary: {}", range)));
    }

    let views_style = if opened.is_some() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(Span::styled(format!("Views: {}", job.views), views_style)));
    lines.push(Line::from(format!("Posted: {}", job.created_at)));
    lines.push(Line::from(""));

    if !job.skills.is_empty() {
        lines.push(Line::from(Span::styled(
            "SKILLS",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("  {}", job.skills.join(", "))));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "DESCRIPTION",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for line in textwrap::fill(&job.description, 70).lines() {
        lines.push(Line::from(format!("  {}", line)));
    }

    if let Some(quals) = &job.qualifications {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "QUALIFICATIONS",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(quals, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    if opened.is_none() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "(press enter to open and count a view)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    Text::from(lines)
}
