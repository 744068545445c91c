use std::fmt::Display;
use std::fs;
use std::io::{self, StdoutLock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use tokio::task::JoinHandle;
use tui_input::backend::crossterm::EventHandler;
use tui_input::Input;

use crate::language::Language;
use crate::model::{CodeResult, Task, Transport};
use crate::orchestrator::Orchestrator;
use crate::GenieError;

pub struct UiOptions {
    pub language: Language,
    pub input_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub write_stdout: bool,
}

enum Accept {
    Yes,
    No,
}

enum RequestExit {
    Stopped,
    Exit,
    Finished,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum OutputTab {
    Code,
    Explanation,
}

impl OutputTab {
    const fn toggle(self) -> Self {
        match self {
            Self::Code => Self::Explanation,
            Self::Explanation => Self::Code,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum RequestProgress {
    Waiting,
    S0,
    S1,
    S2,
    S3,
}

impl RequestProgress {
    const fn next_state(self) -> Self {
        match self {
            Self::Waiting | Self::S3 => Self::S0,
            Self::S0 => Self::S1,
            Self::S1 => Self::S2,
            Self::S2 => Self::S3,
        }
    }
}

impl Display for RequestProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, ""),
            Self::S0 => write!(f, "-"),
            Self::S1 => write!(f, "\\"),
            Self::S2 => write!(f, "|"),
            Self::S3 => write!(f, "/"),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Controls {
    Started,
    Processing,
    ResultReady,
}

fn controls_text(controls: Controls) -> &'static str {
    match controls {
        Controls::Started => {
            "<C-c>: Exit | Enter: Send | <A-Enter>: Newline | Tab: Mode | <C-l>: Language"
        }
        Controls::Processing => "<C-c>: Exit | Esc: Stop",
        Controls::ResultReady => {
            "<C-c>: Exit | Enter: Send | <A-Enter>: Newline | Tab: Mode | <C-l>: Language | <C-t>: Code/Explanation | <C-a>: Accept"
        }
    }
}

fn output_title(tab: OutputTab, language: Language, progress: RequestProgress) -> String {
    match tab {
        OutputTab::Code => format!("[Code ({language})] Explanation {progress}"),
        OutputTab::Explanation => format!("Code ({language}) [Explanation] {progress}"),
    }
}

fn input_title(task: Task, language: Language) -> String {
    match task {
        Task::Generate => format!("generate ({language}): describe the code you want"),
        Task::Debug => format!("debug ({language}): paste the code to fix"),
        Task::Explain => format!("explain ({language}): paste the code to explain"),
    }
}

const MAX_INPUT_LINES: usize = 12;

/// Inserts `text` at char position `cursor`, keeping its line breaks.
/// Returns the new value and the cursor placed after the inserted text.
fn insert_text(value: &str, cursor: usize, text: &str) -> (String, usize) {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let split = value
        .char_indices()
        .nth(cursor)
        .map_or(value.len(), |(index, _)| index);
    let inserted = format!("{}{text}{}", &value[..split], &value[split..]);
    (inserted, cursor + text.chars().count())
}

/// Column and row of char position `cursor` inside a possibly multi-line value.
fn cursor_position(value: &str, cursor: usize) -> (usize, usize) {
    let before: Vec<char> = value.chars().take(cursor).collect();
    let row = before.iter().filter(|c| **c == '\n').count();
    let column = before.iter().rev().take_while(|c| **c != '\n').count();
    (column, row)
}

/// First visible row or column so that `position` stays inside `size` cells.
const fn viewport_offset(position: usize, size: usize) -> usize {
    position.saturating_sub(size.saturating_sub(1))
}

/// Height of the input box, borders included.
fn input_height(value: &str) -> u16 {
    let lines = value.split('\n').count().clamp(1, MAX_INPUT_LINES);
    u16::try_from(lines + 2).unwrap_or(3)
}

fn create_output_paragraph<'t>(text: String, title: String) -> Paragraph<'t> {
    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
}

fn create_input_paragraph<'t>(text: String, title: String) -> Paragraph<'t> {
    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Left)
}

fn create_controls_paragraph<'t>(controls: Controls, status: String) -> Paragraph<'t> {
    let text = if status.is_empty() {
        controls_text(controls).to_string()
    } else {
        format!("{status}\n{}", controls_text(controls))
    };
    Paragraph::new(text)
        .block(Block::default().borders(Borders::TOP))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
}

pub struct GenieUI<'t, T> {
    orchestrator: Arc<Orchestrator<T>>,
    options: UiOptions,
    term: Terminal<CrosstermBackend<StdoutLock<'t>>>,
    input: Input,
    task: Task,
    language: Language,
    tab: OutputTab,
    result: CodeResult,
    status: String,
    progress: RequestProgress,
    busy: bool,
}

impl<'t, T: Transport + 'static> GenieUI<'t, T> {
    /// Splits setup from [`Self::new`] so raw mode is always disabled on failure
    fn initialization(
        orchestrator: Arc<Orchestrator<T>>,
        options: UiOptions,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let initial = match &options.input_file {
            Some(file) => fs::read_to_string(file)?,
            None => String::new(),
        };

        let mut stdout = io::stdout().lock();
        crossterm::execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableBracketedPaste
        )?;
        let backend = CrosstermBackend::new(stdout);
        let term = Terminal::new(backend)?;

        let task = if initial.is_empty() {
            Task::Generate
        } else {
            Task::Explain
        };
        Ok(GenieUI {
            orchestrator,
            language: options.language,
            options,
            term,
            input: Input::new(initial.clone()).with_cursor(initial.chars().count()),
            task,
            tab: OutputTab::Code,
            result: CodeResult::default(),
            status: String::new(),
            progress: RequestProgress::Waiting,
            busy: false,
        })
    }

    pub fn new(
        orchestrator: Arc<Orchestrator<T>>,
        options: UiOptions,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        enable_raw_mode()?;
        match Self::initialization(orchestrator, options) {
            Ok(genie) => Ok(genie),
            Err(err) => {
                disable_raw_mode()?;
                Err(err)
            }
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let accept = self.mainloop().await;

        // restore terminal mode
        disable_raw_mode()?;
        crossterm::execute!(
            self.term.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        )?;
        self.term.show_cursor()?;

        if matches!(accept?, Accept::Yes) && !self.result.code.is_empty() {
            if let Some(file) = &self.options.output_file {
                fs::write(file, &self.result.code)?;
            }
            if self.options.write_stdout {
                println!("{}", self.result.code);
            }
        }
        Ok(())
    }

    fn controls(&self) -> Controls {
        if self.busy {
            Controls::Processing
        } else if self.result.code.is_empty() && self.result.explanation.is_empty() {
            Controls::Started
        } else {
            Controls::ResultReady
        }
    }

    async fn mainloop(&mut self) -> Result<Accept, Box<dyn std::error::Error>> {
        loop {
            self.draw()?;
            let controls = self.controls();

            let key = match crossterm::event::read()? {
                Event::Key(key) => key,
                Event::Paste(text) => {
                    self.insert(&text);
                    continue;
                }
                _ => continue,
            };
            match key {
                KeyEvent {
                    code: KeyCode::Char('c'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => return Ok(Accept::No),
                KeyEvent {
                    code: KeyCode::Char('a'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } if matches!(controls, Controls::ResultReady) => return Ok(Accept::Yes),
                KeyEvent {
                    code: KeyCode::Char('t'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => self.tab = self.tab.toggle(),
                KeyEvent {
                    code: KeyCode::Char('l'),
                    modifiers: KeyModifiers::CONTROL,
                    ..
                } => self.language = self.language.next(),
                KeyEvent {
                    code: KeyCode::Tab, ..
                } => self.task = self.task.next(),
                KeyEvent {
                    code: KeyCode::Enter,
                    modifiers: KeyModifiers::ALT,
                    ..
                } => self.insert("\n"),
                KeyEvent {
                    code: KeyCode::Enter,
                    ..
                } => {
                    if matches!(self.send_request().await?, RequestExit::Exit) {
                        return Ok(Accept::No);
                    }
                }
                _ => {
                    self.input.handle_event(&Event::Key(key));
                }
            }
        }
    }

    fn insert(&mut self, text: &str) {
        let (value, cursor) = insert_text(self.input.value(), self.input.cursor(), text);
        self.input = Input::new(value).with_cursor(cursor);
    }

    fn draw(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let input_text = create_input_paragraph(
            self.input.value().to_string(),
            input_title(self.task, self.language),
        );
        let shown = match self.tab {
            OutputTab::Code => self.result.code.clone(),
            OutputTab::Explanation => self.result.explanation.clone(),
        };
        let output = create_output_paragraph(
            shown,
            output_title(self.tab, self.language, self.progress),
        );
        let controls = create_controls_paragraph(self.controls(), self.status.clone());
        let input_rows = input_height(self.input.value());
        let (cursor_column, cursor_row) = cursor_position(self.input.value(), self.input.cursor());

        self.term.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(input_rows),
                    Constraint::Min(10),
                    Constraint::Length(3),
                ])
                .split(f.size());
            // 2 cells of border on each axis, 1 extra column for the cursor
            let width = usize::from(chunks[0].width.max(3) - 3);
            let height = usize::from(chunks[0].height.max(3) - 2);
            let scroll_x = viewport_offset(cursor_column, width);
            let scroll_y = viewport_offset(cursor_row, height);
            f.render_widget(
                input_text.scroll((
                    u16::try_from(scroll_y).unwrap_or_default(),
                    u16::try_from(scroll_x).unwrap_or_default(),
                )),
                chunks[0],
            );
            f.set_cursor(
                chunks[0].x + u16::try_from(cursor_column - scroll_x).unwrap_or_default() + 1,
                chunks[0].y + u16::try_from(cursor_row - scroll_y).unwrap_or_default() + 1,
            );
            f.render_widget(output, chunks[1]);
            f.render_widget(controls, chunks[2]);
        })?;
        Ok(())
    }

    fn clear_result(&mut self) {
        self.result = CodeResult::default();
        self.status.clear();
        self.progress = RequestProgress::Waiting;
    }

    async fn send_request(&mut self) -> Result<RequestExit, Box<dyn std::error::Error>> {
        if self.busy {
            return Ok(RequestExit::Finished);
        }
        let user_input = self.input.value().to_string();
        if user_input.trim().is_empty() {
            self.status = match self.task {
                Task::Generate => "Please enter a description of the code you want to generate.",
                Task::Debug => "Please enter code to debug.",
                Task::Explain => "Please enter code to explain.",
            }
            .to_string();
            return Ok(RequestExit::Finished);
        }

        self.clear_result();
        self.busy = true;
        let orchestrator = Arc::clone(&self.orchestrator);
        let (task, language) = (self.task, self.language);
        let request_task: JoinHandle<Result<CodeResult, GenieError>> =
            tokio::spawn(async move { orchestrator.run(task, &user_input, language).await });

        let exit = self.await_request(request_task).await;
        self.busy = false;
        self.progress = RequestProgress::Waiting;
        exit
    }

    async fn await_request(
        &mut self,
        request_task: JoinHandle<Result<CodeResult, GenieError>>,
    ) -> Result<RequestExit, Box<dyn std::error::Error>> {
        loop {
            self.draw()?;
            if crossterm::event::poll(Duration::from_millis(100))? {
                if let Event::Key(key) = crossterm::event::read()? {
                    match key {
                        KeyEvent {
                            code: KeyCode::Esc, ..
                        } => {
                            // stopping drops the local future; the endpoint may
                            // still finish generating on its side
                            request_task.abort();
                            self.clear_result();
                            self.status = "Request stopped.".to_string();
                            return Ok(RequestExit::Stopped);
                        }
                        KeyEvent {
                            code: KeyCode::Char('c'),
                            modifiers: KeyModifiers::CONTROL,
                            ..
                        } => {
                            request_task.abort();
                            return Ok(RequestExit::Exit);
                        }
                        _ => (),
                    }
                }
            }
            if request_task.is_finished() {
                match request_task.await? {
                    Ok(result) => {
                        self.tab = if result.code.is_empty() || self.task == Task::Explain {
                            OutputTab::Explanation
                        } else {
                            OutputTab::Code
                        };
                        self.result = result;
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "request failed");
                        self.status = format!("Error: {err}");
                    }
                }
                return Ok(RequestExit::Finished);
            }
            self.progress = self.progress.next_state();
        }
    }
}
