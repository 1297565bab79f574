//! Terminal UI module using ratatui
//!
//! Shows the current pipeline phase, a running tally of files and records, a
//! progress gauge and an activity log. [`LogUi`] routes the same calls to
//! `tracing` for non-interactive runs.

mod components;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{info, warn};

use components::{LogLevel, LogPanel, ProgressPanel, StatusPanel};

/// Pipeline phases shown in the status panel
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Checking,
    Downloading,
    Unpacking,
    Extracting,
    Writing,
    Complete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Checking => write!(f, "Checking for updates"),
            Phase::Downloading => write!(f, "Downloading corpus"),
            Phase::Unpacking => write!(f, "Unpacking archive"),
            Phase::Extracting => write!(f, "Extracting records"),
            Phase::Writing => write!(f, "Writing table"),
            Phase::Complete => write!(f, "Complete"),
        }
    }
}

/// Progress of the current operation; `total == 0` means the end is unknown
#[derive(Debug, Clone, Default)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
    pub label: String,
}

impl Progress {
    pub fn new(current: u64, total: u64, label: impl Into<String>) -> Self {
        Self {
            current,
            total,
            label: label.into(),
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Running counts shown while a corpus is being extracted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub files: u64,
    pub records: u64,
    pub skipped: u64,
}

/// Progress sink for long-running pipeline stages
pub trait Ui {
    fn set_phase(&mut self, phase: Phase);
    fn set_info(&mut self, info: impl Into<String>);
    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>);
    fn set_tally(&mut self, tally: Tally);
    fn clear_progress(&mut self);
    fn log(&mut self, message: impl Into<String>);
    fn warn(&mut self, message: impl Into<String>);

    /// Whether the user asked to stop; long loops check this between steps
    fn interrupted(&mut self) -> bool {
        false
    }
}

/// Ctrl+C or `q`
fn is_quit_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Full-screen terminal implementation
pub struct UiApp {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    status: StatusPanel,
    progress: ProgressPanel,
    log: LogPanel,
    interrupted: bool,
    restored: bool,
}

impl UiApp {
    /// Enter the alternate screen and draw an empty frame
    pub fn new() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let mut app = Self {
            terminal,
            status: StatusPanel::new(),
            progress: ProgressPanel::new(),
            log: LogPanel::new(200),
            interrupted: false,
            restored: false,
        };
        app.draw()?;
        Ok(app)
    }

    /// Raw mode swallows Ctrl+C, so quit keys are read from the event queue
    fn poll_quit(&mut self) {
        while event::poll(Duration::from_millis(0)).unwrap_or(false) {
            if let Ok(CrosstermEvent::Key(key)) = event::read() {
                if is_quit_key(&key) {
                    self.interrupted = true;
                }
            }
        }
    }

    fn draw(&mut self) -> Result<()> {
        let status = &self.status;
        let progress = &self.progress;
        let log = &self.log;

        self.terminal.draw(|frame| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(6),
                    Constraint::Length(3),
                    Constraint::Min(5),
                ])
                .split(frame.area());

            status.render(frame, chunks[0]);
            progress.render(frame, chunks[1]);
            log.render(frame, chunks[2]);
        })?;

        Ok(())
    }

    /// Show the final summary, wait for a key and restore the terminal
    pub fn finish(mut self, summary: &str) -> Result<()> {
        self.set_phase(Phase::Complete);
        self.clear_progress();
        for line in summary.lines() {
            self.log.add(LogLevel::Info, line);
        }
        self.log.add(LogLevel::Info, "Press any key to exit...");
        self.draw()?;

        loop {
            if event::poll(Duration::from_millis(100))? {
                if let CrosstermEvent::Key(_) = event::read()? {
                    break;
                }
            }
        }

        self.restore()
    }

    /// Leave the alternate screen immediately, e.g. when a build fails
    pub fn restore(mut self) -> Result<()> {
        self.leave_screen()?;
        Ok(())
    }

    fn leave_screen(&mut self) -> io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        terminal::disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()
    }
}

impl Ui for UiApp {
    fn set_phase(&mut self, phase: Phase) {
        self.status.set_phase(phase);
        self.draw().ok();
    }

    fn set_info(&mut self, info: impl Into<String>) {
        self.status.set_info(info);
        self.draw().ok();
    }

    fn set_progress(&mut self, current: u64, total: u64, label: impl Into<String>) {
        self.progress
            .set_progress(Progress::new(current, total, label));
        self.poll_quit();
        self.draw().ok();
    }

    fn set_tally(&mut self, tally: Tally) {
        self.status.set_tally(tally);
        self.poll_quit();
        self.draw().ok();
    }

    fn clear_progress(&mut self) {
        self.progress.clear();
        self.draw().ok();
    }

    fn log(&mut self, message: impl Into<String>) {
        self.log.add(LogLevel::Info, message);
        self.draw().ok();
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.log.add(LogLevel::Warn, message);
        self.draw().ok();
    }

    fn interrupted(&mut self) -> bool {
        self.interrupted
    }
}

impl Drop for UiApp {
    fn drop(&mut self) {
        let _ = self.leave_screen();
    }
}

/// Forwards phases and log lines to `tracing`, dropping progress ticks
#[derive(Default)]
pub struct LogUi {
    phase: Option<Phase>,
}

impl LogUi {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ui for LogUi {
    fn set_phase(&mut self, phase: Phase) {
        if self.phase.as_ref() != Some(&phase) {
            info!("{}", phase);
            self.phase = Some(phase);
        }
    }

    fn set_info(&mut self, info: impl Into<String>) {
        info!("{}", info.into());
    }

    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}

    fn set_tally(&mut self, _tally: Tally) {}

    fn clear_progress(&mut self) {}

    fn log(&mut self, message: impl Into<String>) {
        info!("{}", message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        warn!("{}", message.into());
    }
}

/// Discards everything; used by tests and library callers
#[derive(Default)]
pub struct SilentUi;

impl SilentUi {
    pub fn new() -> Self {
        Self
    }
}

impl Ui for SilentUi {
    fn set_phase(&mut self, _phase: Phase) {}
    fn set_info(&mut self, _info: impl Into<String>) {}
    fn set_progress(&mut self, _current: u64, _total: u64, _label: impl Into<String>) {}
    fn set_tally(&mut self, _tally: Tally) {}
    fn clear_progress(&mut self) {}
    fn log(&mut self, _message: impl Into<String>) {}
    fn warn(&mut self, _message: impl Into<String>) {}
}
