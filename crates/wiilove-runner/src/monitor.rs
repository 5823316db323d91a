//! Pad monitor view
//!
//! Renders the controller state captured by the last pump and a rolling log
//! of the events the main loop has polled.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table},
};
use std::collections::VecDeque;
use wiilove::{Event, Love};
use wiilove_hal::{Slot, WiimoteButton};

const LOG_CAPACITY: usize = 64;

/// One slot as shown in the table
#[derive(Debug, Clone, PartialEq)]
pub struct PadRow {
    pub slot: Slot,
    pub connected: bool,
    pub extension: &'static str,
    pub held: Vec<&'static str>,
    pub position: (f32, f32),
    pub rumbling: bool,
}

/// Everything the view needs from one frame
#[derive(Debug, Clone)]
pub struct PadSnapshot {
    pub rows: Vec<PadRow>,
    pub fps: f64,
    pub mode: &'static str,
    pub generation: u64,
}

impl PadSnapshot {
    pub fn capture(love: &mut Love) -> Self {
        let mode = love.mode().as_str();
        let fps = love.timer().fps();

        let pump = love.event();
        let generation = pump.generation();
        let wiimotes = pump.wiimotes();

        let rows = Slot::ALL
            .into_iter()
            .map(|slot| PadRow {
                slot,
                connected: wiimotes.is_connected(slot),
                extension: wiimotes.extension(slot).name(),
                held: WiimoteButton::all()
                    .iter()
                    .filter(|b| wiimotes.is_down(slot, **b))
                    .map(|b| b.name())
                    .collect(),
                position: wiimotes.position(slot),
                rumbling: wiimotes.is_rumbling(slot),
            })
            .collect();

        Self {
            rows,
            fps,
            mode,
            generation,
        }
    }
}

/// Rolling event log
#[derive(Debug)]
pub struct Monitor {
    log: VecDeque<String>,
    status: String,
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    pub fn new() -> Self {
        Self {
            log: VecDeque::with_capacity(LOG_CAPACITY),
            status: "Running".to_string(),
        }
    }

    pub fn record(&mut self, generation: u64, event: &Event) {
        if self.log.len() == LOG_CAPACITY {
            self.log.pop_front();
        }
        self.log.push_back(format!("#{:<6} {}", generation, event));
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    pub fn draw(&self, frame: &mut Frame, snapshot: &PadSnapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(7), // Pads
                Constraint::Min(0),    // Event log
                Constraint::Length(3), // Footer
            ])
            .split(frame.size());

        self.draw_header(frame, chunks[0], snapshot);
        draw_pads(frame, chunks[1], snapshot);
        self.draw_log(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect, snapshot: &PadSnapshot) {
        let (major, minor, patch) = Love::version();
        let title = format!(
            "WiiLÖVE {}.{}.{} [{}]  {:.0} FPS",
            major, minor, patch, snapshot.mode, snapshot.fps
        );

        let header = Paragraph::new(title)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));

        frame.render_widget(header, area);
    }

    fn draw_log(&self, frame: &mut Frame, area: Rect) {
        // Newest at the top; only as many as fit
        let visible = usize::from(area.height.saturating_sub(2));
        let items: Vec<ListItem> = self
            .log
            .iter()
            .rev()
            .take(visible)
            .map(|line| ListItem::new(line.as_str()))
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Events"));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(area);

        let help = Paragraph::new("[F1-F4] Sync  [Tab] Slot  [H] Home  [R] Reset  [P] Power")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));

        let status = Paragraph::new(self.status.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL));

        frame.render_widget(help, chunks[0]);
        frame.render_widget(status, chunks[1]);
    }
}

fn draw_pads(frame: &mut Frame, area: Rect, snapshot: &PadSnapshot) {
    let rows: Vec<Row> = snapshot
        .rows
        .iter()
        .map(|row| {
            let style = if row.connected {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                row.slot.to_string(),
                if row.connected { "yes" } else { "no" }.to_string(),
                row.extension.to_string(),
                format!("{:>4.0},{:>4.0}", row.position.0, row.position.1),
                if row.rumbling { "on" } else { "" }.to_string(),
                row.held.join(" "),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(19),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Min(0),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Slot", "Connected", "Extension", "Pointer", "Rumble", "Held"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Wii Remotes (generation {})", snapshot.generation)),
        );

    frame.render_widget(table, area);
}
