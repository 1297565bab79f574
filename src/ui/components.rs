//! Panels drawn by [`super::UiApp`]

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::Frame;
use std::collections::VecDeque;

use super::{Phase, Progress, Tally};

/// Phase, info line and running tally
pub struct StatusPanel {
    phase: Phase,
    info: String,
    tally: Tally,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Checking,
            info: String::new(),
            tally: Tally::default(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn set_tally(&mut self, tally: Tally) {
        self.tally = tally;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let color = match self.phase {
            Phase::Complete => Color::Green,
            _ => Color::Cyan,
        };
        let phase_style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let skipped_style = if self.tally.skipped > 0 {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", phase_glyph(&self.phase)), phase_style),
                Span::styled(self.phase.to_string(), phase_style),
            ]),
            Line::from(vec![
                Span::raw("   "),
                Span::styled(&self.info, Style::default().fg(Color::Gray)),
            ]),
            Line::from(vec![
                Span::raw("   "),
                Span::raw(format!("files {}  ", self.tally.files)),
                Span::raw(format!("records {}  ", self.tally.records)),
                Span::styled(format!("skipped {}", self.tally.skipped), skipped_style),
            ]),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" UPI Pulse ")
            .border_style(Style::default().fg(Color::Blue));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

fn phase_glyph(phase: &Phase) -> &'static str {
    match phase {
        Phase::Checking => "?",
        Phase::Downloading => "↓",
        Phase::Unpacking => "⤷",
        Phase::Extracting => "⚙",
        Phase::Writing => "✎",
        Phase::Complete => "✓",
    }
}

/// Gauge when the total is known, a plain counter otherwise
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        match &self.progress {
            Some(p) if p.total > 0 => {
                let label = format!(
                    "{}: {}/{} ({:.0}%)",
                    p.label,
                    p.current,
                    p.total,
                    p.ratio() * 100.0
                );
                let gauge = Gauge::default()
                    .block(block)
                    .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
                    .ratio(p.ratio().min(1.0))
                    .label(label);
                frame.render_widget(gauge, area);
            }
            Some(p) => {
                let text = format!(" {}: {}", p.label, p.current);
                frame.render_widget(Paragraph::new(text).block(block), area);
            }
            None => frame.render_widget(Paragraph::new("").block(block), area),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
}

/// Bounded activity log; warnings stay highlighted
pub struct LogPanel {
    entries: VecDeque<(LogLevel, String)>,
    capacity: usize,
}

impl LogPanel {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn add(&mut self, level: LogLevel, message: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back((level, message.into()));
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Activity ")
            .border_style(Style::default().fg(Color::Blue));

        let visible = area.height.saturating_sub(2) as usize;
        let start = self.entries.len().saturating_sub(visible);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .skip(start)
            .map(|(level, entry)| {
                let style = match level {
                    LogLevel::Warn => Style::default().fg(Color::Yellow),
                    LogLevel::Info => Style::default().fg(Color::Gray),
                };
                ListItem::new(Span::styled(format!(" {}", entry), style))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_panel_is_bounded() {
        let mut log = LogPanel::new(2);
        log.add(LogLevel::Info, "a");
        log.add(LogLevel::Warn, "b");
        log.add(LogLevel::Info, "c");
        let kept: Vec<&str> = log.entries.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(kept, vec!["b", "c"]);
    }
}
