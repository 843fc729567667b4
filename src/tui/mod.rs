//! TUI module - Plan viewer with ratatui

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};
use std::io::{Stdout, stdout};

use crate::parser::Section;
use crate::planner::Plan;
use crate::session::SessionRecord;

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App {
    plan: Plan,
    record: SessionRecord,
    date: String,
    scroll: u16,
    /// Furthest scroll that still fills the advice pane, from the last render
    max_scroll: u16,
    should_quit: bool,
}

impl App {
    pub fn new(plan: Plan, record: SessionRecord, date: impl Into<String>) -> Self {
        Self {
            plan,
            record,
            date: date.into(),
            scroll: 0,
            max_scroll: 0,
            should_quit: false,
        }
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        let result = (|| -> Result<()> {
            while !self.should_quit {
                terminal.draw(|frame| self.render(frame))?;
                self.handle_events()?;
            }
            Ok(())
        })();

        restore_terminal()?;
        result
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let suggestion_rows = self.plan.rule_suggestions().len() as u16 + 3;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(suggestion_rows),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new(format!("🎾 courtplan - Daily Plan for {}", self.date))
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Yesterday's session
        let session = Paragraph::new(format!(
            "Drills: {}  |  {} {}  |  {} {}  |  {} {}",
            self.record.activity_list(),
            self.record.intensity().emoji(),
            self.record.intensity(),
            self.record.form_quality().emoji(),
            self.record.form_quality(),
            self.record.fatigue().emoji(),
            self.record.fatigue(),
        ))
        .block(Block::default().borders(Borders::ALL).title("Yesterday"));
        frame.render_widget(session, chunks[1]);

        // Rule suggestions
        let rows: Vec<Row> = self
            .plan
            .rule_suggestions()
            .iter()
            .enumerate()
            .map(|(i, s)| Row::new(vec![Cell::from(format!("{}.", i + 1)), Cell::from(s.clone())]))
            .collect();

        let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(20)])
            .header(Row::new(vec!["#", "Suggestion"]).style(Style::default().bold()))
            .block(Block::default().borders(Borders::ALL).title("Rule-based"));
        frame.render_widget(table, chunks[2]);

        // Coach advice; scroll bounds follow the wrapped row count
        let advice = Paragraph::new(self.advice_lines()).wrap(Wrap { trim: false });
        let inner_width = chunks[3].width.saturating_sub(2);
        let inner_height = chunks[3].height.saturating_sub(2) as usize;
        let rows = advice.line_count(inner_width);
        self.max_scroll = rows.saturating_sub(inner_height).min(u16::MAX as usize) as u16;
        self.scroll = self.scroll.min(self.max_scroll);

        let advice = advice
            .scroll((self.scroll, 0))
            .block(Block::default().borders(Borders::ALL).title("AI coach"));
        frame.render_widget(advice, chunks[3]);

        // Footer
        let footer = Paragraph::new("q: quit | ↑/k ↓/j: scroll advice")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[4]);
    }

    /// One title line per section, then each line of its body, then a gap
    fn advice_lines(&self) -> Vec<Line<'static>> {
        let advice = self.plan.structured_advice();
        let mut lines = Vec::new();

        for (section, text) in advice.iter() {
            lines.push(Line::from(format!("{} {}", section.emoji(), section.title())).bold());
            if section == Section::Warnings && advice.no_warnings() {
                lines.push(Line::from("No warnings - you're good to go!"));
            } else {
                lines.extend(text.lines().map(|line| Line::from(line.to_string())));
            }
            lines.push(Line::default());
        }
        lines
    }

    fn scroll_down(&mut self) {
        self.scroll = (self.scroll + 1).min(self.max_scroll);
    }

    fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            self.handle_key(key.code);
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.scroll_down(),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_up(),
            _ => {}
        }
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::ActivityVocabulary;
    use crate::parser::StructuredAdvice;
    use ratatui::backend::TestBackend;

    fn app_with(advice: StructuredAdvice) -> App {
        let record = SessionRecord::from_labels(
            &ActivityVocabulary::default(),
            ["Volley"],
            "Moderate",
            "Good",
            "Low",
        )
        .unwrap();
        let plan = Plan::new(vec!["Work on reaction time".to_string()], advice, String::new());
        App::new(plan, record, "2026-10-18")
    }

    fn app() -> App {
        app_with(StructuredAdvice::defaults())
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_scroll_stays_at_top_when_advice_fits() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 60)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        app.handle_key(KeyCode::Up);
        assert_eq!(app.scroll, 0);
        for _ in 0..100 {
            app.handle_key(KeyCode::Char('j'));
        }
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_advice_lines_cover_all_sections() {
        let lines = app().advice_lines();
        assert_eq!(lines.len(), Section::ALL.len() * 3);
    }

    #[test]
    fn test_multiline_body_keeps_its_lines() {
        let mut advice = StructuredAdvice::defaults();
        advice.plan = "1. Serve 10 minutes\n2. Volley drill".to_string();
        let lines = app_with(advice).advice_lines();

        assert_eq!(lines[1].to_string(), "1. Serve 10 minutes");
        assert_eq!(lines[2].to_string(), "2. Volley drill");
    }

    #[test]
    fn test_long_plan_scrolls_to_last_section() {
        let mut advice = StructuredAdvice::defaults();
        advice.plan = (1..=40)
            .map(|i| format!("{}. Cross-court rally drill for ten minutes", i))
            .collect::<Vec<_>>()
            .join("\n");
        advice.recovery = "Ice the shoulder after practice".to_string();
        let mut app = app_with(advice);
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();

        terminal.draw(|frame| app.render(frame)).unwrap();
        let first = screen(&terminal);
        assert!(!first.contains("minutes2."));
        assert!(!first.contains("Ice the shoulder"));

        for _ in 0..200 {
            app.handle_key(KeyCode::Char('j'));
            terminal.draw(|frame| app.render(frame)).unwrap();
        }
        assert!(app.scroll > 11);
        assert!(screen(&terminal).contains("Ice the shoulder"));
    }

    #[test]
    fn test_render_to_buffer() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("courtplan"));
        assert!(text.contains("Work on reaction time"));
    }
}
