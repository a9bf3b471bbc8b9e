use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use super::Component;
use crate::bulk::{Progress, BULK_SIZES};
use crate::update::Update;

pub enum BulkMsg {
    SelectNext,
    SelectPrev,
    Start,
    /// Bubbled to the dashboard.
    Requested(usize),
}

pub struct BulkComponent {
    selected: usize,
    progress: Option<Progress>,
}

impl BulkComponent {
    pub fn new() -> Self {
        Self {
            selected: 0,
            progress: None,
        }
    }

    pub fn selected_size(&self) -> usize {
        BULK_SIZES[self.selected]
    }

    pub fn set_progress(&mut self, progress: Option<Progress>) {
        self.progress = progress;
    }
}

impl Component for BulkComponent {
    type Msg = BulkMsg;

    fn update(&mut self, msg: Self::Msg) -> Update<Self::Msg> {
        match msg {
            BulkMsg::SelectNext => {
                self.selected = (self.selected + 1).min(BULK_SIZES.len() - 1);
                Update::none()
            }
            BulkMsg::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
                Update::none()
            }
            BulkMsg::Start => BulkMsg::Requested(self.selected_size()).into(),
            BulkMsg::Requested(_) => Update::none(), // Handled by parent
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Update<Self::Msg> {
        use crossterm::event::KeyCode::*;
        match key.code {
            Right | Down | Char('l') | Char('j') => BulkMsg::SelectNext.into(),
            Left | Up | Char('h') | Char('k') => BulkMsg::SelectPrev.into(),
            Enter => BulkMsg::Start.into(),
            _ => Update::none(),
        }
    }

    fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let border = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let block = Block::default()
            .title("Bulk Insert Crop Records")
            .borders(Borders::ALL)
            .border_style(border);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(1)])
            .split(inner);

        let mut spans = vec![Span::raw("Records to insert: ")];
        for (i, size) in BULK_SIZES.iter().enumerate() {
            let style = if i == self.selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let label = if i == self.selected {
                format!("[{}]", size)
            } else {
                format!(" {} ", size)
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
        }
        let lines = vec![
            Line::from(spans),
            Line::from(Span::styled(
                "[Enter] Insert Bulk Records",
                Style::default().fg(Color::Green),
            )),
        ];
        f.render_widget(Paragraph::new(lines), chunks[0]);

        if let Some(p) = self.progress {
            let ratio = if p.total == 0 {
                1.0
            } else {
                (p.inserted as f64 / p.total as f64).clamp(0.0, 1.0)
            };
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(Color::Green))
                .label(format!("{}/{} (batch {}/{})", p.inserted, p.total, p.batch, p.batches))
                .ratio(ratio);
            f.render_widget(gauge, chunks[1]);
        }
    }
}
