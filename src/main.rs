use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use std::io::{stdout, Stdout};
use std::time::Duration;

mod buffer;
mod error;
mod mode;
mod navigation;
mod search;
mod store;

use buffer::{Record, RECORD_SIZE};
use mode::{hex_digit, EditorState, InputEvent, InputResult};
use navigation::EditorSession;

struct App {
    session: EditorSession,
    should_quit: bool,
    /// Last notification (search result, save confirmation, i/o failure).
    status: Option<String>,
    /// Some while the search prompt is open; holds the typed hex text.
    search_input: Option<String>,
}

impl App {
    fn new(session: EditorSession) -> Self {
        Self {
            session,
            should_quit: false,
            status: None,
            search_input: None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.search_input.is_some() {
            return self.handle_prompt_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') = key.code {
                return self.apply(InputEvent::Quit);
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Up => self.apply(InputEvent::Up),
            KeyCode::Down => self.apply(InputEvent::Down),
            KeyCode::Left => self.apply(InputEvent::Left),
            KeyCode::Right => self.apply(InputEvent::Right),
            KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Char('q') => {
                self.apply(InputEvent::Quit)
            }
            KeyCode::Char('w') | KeyCode::Char('W') => self.apply(InputEvent::Save),
            KeyCode::Char('s') | KeyCode::Char('S') => {
                // Opening the prompt drops any half-typed byte first.
                self.apply(InputEvent::Cancel)?;
                self.search_input = Some(String::new());
                Ok(())
            }
            KeyCode::Char(c) => match hex_digit(c) {
                Some(digit) => self.apply(InputEvent::HexDigit(digit)),
                // A non-hex character aborts a pending edit.
                None => self.apply(InputEvent::Cancel),
            },
            // Esc and anything unbound aborts a pending edit too.
            _ => self.apply(InputEvent::Cancel),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.search_input = None;
                Ok(())
            }
            KeyCode::Enter => {
                let text = self.search_input.take().unwrap_or_default();
                match search::parse_pattern(&text) {
                    Ok(pattern) => self.apply(InputEvent::Search(pattern)),
                    Err(e) => {
                        self.status = Some(e.to_string());
                        Ok(())
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.search_input.as_mut() {
                    input.pop();
                }
                Ok(())
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.search_input.as_mut() {
                    input.push(c);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn apply(&mut self, event: InputEvent) -> Result<()> {
        match self.session.handle_event(event)? {
            InputResult::Handled => self.status = None,
            InputResult::Message(message) => self.status = Some(message),
            InputResult::Quit => self.should_quit = true,
        }
        Ok(())
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    terminal.show_cursor()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Style for the byte under the cursor: red background while a digit is
/// pending, reverse video while browsing.
fn cursor_style(editing: bool) -> Style {
    if editing {
        Style::default().bg(Color::Red).fg(Color::White)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    }
}

/// Render one window row: offset gutter, 16 hex cells, ASCII gutter.
fn hex_line(record: &Record, file_line: u64, cursor_col: Option<usize>, editing: bool) -> Line<'static> {
    let mut spans = Vec::with_capacity(2 * RECORD_SIZE + 3);

    spans.push(Span::styled(
        format!("  0x{:08X}   ", file_line * RECORD_SIZE as u64),
        Style::default().fg(Color::DarkGray),
    ));

    for col in 0..RECORD_SIZE {
        let cell = match record.get(col) {
            Some(byte) => format!("{byte:02X}"),
            None => "  ".to_string(),
        };
        if cursor_col == Some(col) {
            spans.push(Span::styled(cell, cursor_style(editing)));
        } else {
            spans.push(Span::raw(cell));
        }
        spans.push(Span::raw(" "));
    }

    spans.push(Span::raw("   "));

    for col in 0..RECORD_SIZE {
        let ch = match record.get(col) {
            Some(byte) if (0x20..=0x7E).contains(&byte) => byte as char,
            Some(_) => '.',
            None => ' ',
        };
        if cursor_col == Some(col) {
            spans.push(Span::styled(
                ch.to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        } else {
            spans.push(Span::raw(ch.to_string()));
        }
        spans.push(Span::raw(" "));
    }

    Line::from(spans)
}

fn render_ui(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &App) -> Result<()> {
    terminal.draw(|frame| {
        let size = frame.area();

        // Split into main area, toolbar and status bar
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(size);

        let main_block = Block::default().borders(Borders::ALL).title(" Hex Editor ");
        let inner_area = main_block.inner(chunks[0]);
        frame.render_widget(main_block, chunks[0]);

        let window = app.session.window();
        let cursor = app.session.cursor();
        let editing = app.session.state().is_editing();

        let mut lines = Vec::with_capacity(window.capacity() + 1);
        let header: String = (0..RECORD_SIZE).map(|c| format!("{c:02X} ")).collect();
        lines.push(Line::from(Span::styled(
            format!("               {header}"),
            Style::default().fg(Color::DarkGray),
        )));

        for row in 0..window.capacity() {
            if let Some(record) = window.record(row) {
                let cursor_col = (row == cursor.row).then_some(cursor.col);
                lines.push(hex_line(
                    record,
                    window.base_line() + row as u64,
                    cursor_col,
                    editing,
                ));
            }
        }

        frame.render_widget(Paragraph::new(lines), inner_area);

        // Toolbar
        let toolbar = Line::from(vec![
            Span::raw(" "),
            Span::styled(" S ", Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(" Pattern Search   "),
            Span::styled(" W ", Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(" Write to File   "),
            Span::styled(" X ", Style::default().add_modifier(Modifier::REVERSED)),
            Span::raw(" Quit"),
        ]);
        frame.render_widget(Paragraph::new(toolbar), chunks[1]);

        // Status bar, replaced by the input line while the prompt is open
        let status_text = if let Some(input) = &app.search_input {
            format!(" Search (hex): 0x{input}")
        } else {
            let file_name = app
                .session
                .file_path()
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("<unknown>");
            let modified = if app.session.is_modified() { " [+]" } else { "" };
            let state = match app.session.state() {
                EditorState::Browsing => String::new(),
                state => format!(" {}", state.display()),
            };
            let message = app
                .status
                .as_deref()
                .map(|m| format!(" | {m}"))
                .unwrap_or_default();

            format!(
                " {} ({}){} | 0x{:08X}{}{}",
                file_name,
                format_size(app.session.file_size()),
                modified,
                app.session.cursor_offset(),
                state,
                message,
            )
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(Color::DarkGray).fg(Color::White));
        frame.render_widget(status, chunks[2]);
    })?;

    Ok(())
}

fn run(mut app: App, mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    loop {
        render_ui(&mut terminal, &app)?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key)?;
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("usage: hexed <FILE>");
        std::process::exit(1);
    };

    // Open before the terminal is touched so a bad path fails loudly.
    let session = EditorSession::open(path)?;
    let app = App::new(session);

    // Set up panic hook to restore terminal
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
        default_panic(info);
    }));

    let terminal = setup_terminal()?;
    let result = run(app, terminal);

    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    restore_terminal(terminal)?;

    result
}
