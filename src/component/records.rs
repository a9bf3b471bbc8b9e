use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell as TuiCell, Paragraph, Row, Table as TuiTable},
    Frame,
};

use super::Component;
use crate::crop::DISPLAY_COLUMNS;
use crate::update::Update;
use crate::view::ViewModel;

const PAGE: usize = 20;

pub enum RecordsMsg {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    /// Bubbled to the dashboard.
    Refresh,
}

/// Read-only table of every stored record, identifier hidden.
pub struct RecordsComponent {
    view: Option<ViewModel>,
    offset: usize,
}

impl RecordsComponent {
    pub fn new() -> Self {
        Self {
            view: None,
            offset: 0,
        }
    }

    pub fn set_view(&mut self, view: ViewModel) {
        self.offset = self.offset.min(view.records.len().saturating_sub(1));
        self.view = Some(view);
    }

    pub fn clear(&mut self) {
        self.view = None;
        self.offset = 0;
    }

    pub fn len(&self) -> usize {
        self.view.as_ref().map_or(0, |v| v.records.len())
    }

    fn scroll_to(&mut self, offset: usize) {
        self.offset = offset.min(self.len().saturating_sub(1));
    }

    /// Rows `[start, end)` visible in a body of `height` lines.
    fn window(&self, height: usize) -> (usize, usize) {
        let total = self.len();
        let start = self.offset.min(total);
        (start, (start + height.max(1)).min(total))
    }
}

impl Component for RecordsComponent {
    type Msg = RecordsMsg;

    fn update(&mut self, msg: Self::Msg) -> Update<Self::Msg> {
        match msg {
            RecordsMsg::ScrollUp => self.scroll_to(self.offset.saturating_sub(1)).into(),
            RecordsMsg::ScrollDown => self.scroll_to(self.offset + 1).into(),
            RecordsMsg::PageUp => self.scroll_to(self.offset.saturating_sub(PAGE)).into(),
            RecordsMsg::PageDown => self.scroll_to(self.offset + PAGE).into(),
            RecordsMsg::Top => self.scroll_to(0).into(),
            RecordsMsg::Bottom => self.scroll_to(usize::MAX).into(),
            RecordsMsg::Refresh => RecordsMsg::Refresh.into(),
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Update<Self::Msg> {
        use crossterm::event::KeyCode::*;
        match key.code {
            Up | Char('k') => RecordsMsg::ScrollUp.into(),
            Down | Char('j') => RecordsMsg::ScrollDown.into(),
            PageUp => RecordsMsg::PageUp.into(),
            PageDown => RecordsMsg::PageDown.into(),
            Home | Char('g') => RecordsMsg::Top.into(),
            End | Char('G') => RecordsMsg::Bottom.into(),
            Char('r') => RecordsMsg::Refresh.into(),
            _ => Update::none(),
        }
    }

    fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let content_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };
        let title = match &self.view {
            Some(v) if !v.is_empty() => format!(
                "Crop Records ({}-{} of {})",
                self.offset + 1,
                self.window(usize::from(area.height.saturating_sub(3))).1,
                v.records.len()
            ),
            _ => "Crop Records".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(content_style);

        let Some(view) = &self.view else {
            f.render_widget(Paragraph::new("Loading records...").block(block), area);
            return;
        };
        if let Some(err) = &view.error {
            let msg = Paragraph::new(err.as_str())
                .style(Style::default().fg(Color::Red))
                .block(block);
            f.render_widget(msg, area);
            return;
        }
        if view.is_empty() {
            let msg = Paragraph::new("No records found.")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            f.render_widget(msg, area);
            return;
        }

        // borders (2) + header (1)
        let body = usize::from(area.height.saturating_sub(3));
        let (start, end) = self.window(body);
        let header = Row::new(DISPLAY_COLUMNS.iter().map(|c| {
            TuiCell::from(*c).style(Style::default().add_modifier(Modifier::BOLD))
        }));
        let rows = view.records[start..end]
            .iter()
            .map(|r| Row::new(r.display_row()));
        let widths = [
            Constraint::Length(10),
            Constraint::Length(13),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(16),
        ];
        let table = TuiTable::new(rows, widths).header(header).block(block);
        f.render_widget(table, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::CropRecord;
    use crate::generator::CropGenerator;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    fn view(n: usize) -> ViewModel {
        let mut generator = CropGenerator::seeded(2, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        ViewModel {
            records: (0..n)
                .map(|i| CropRecord {
                    id: i as i64 + 1,
                    crop: generator.next_crop(),
                })
                .collect(),
            error: None,
        }
    }

    fn render(component: &RecordsComponent, width: u16, height: u16) -> String {
        let mut terminal = ratatui::Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| component.draw(f, f.size(), true))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut records = RecordsComponent::new();
        records.set_view(view(30));
        records.update(RecordsMsg::ScrollUp);
        assert_eq!(records.window(10), (0, 10));
        records.update(RecordsMsg::PageDown);
        records.update(RecordsMsg::PageDown);
        assert_eq!(records.window(10), (29, 30));
        records.update(RecordsMsg::Top);
        records.update(RecordsMsg::ScrollDown);
        assert_eq!(records.window(10), (1, 11));

        // a smaller reload pulls the offset back into range
        records.update(RecordsMsg::Bottom);
        records.set_view(view(5));
        assert_eq!(records.window(10), (4, 5));
    }

    #[test]
    fn renders_header_without_id() {
        let mut records = RecordsComponent::new();
        let v = view(3);
        let first = v.records[0].crop.crop_name.clone();
        records.set_view(v);
        let screen = render(&records, 110, 10);
        assert!(screen.contains("Crop Name"));
        assert!(screen.contains("Yield Prediction"));
        assert!(!screen.contains("ID"));
        assert!(screen.contains(&first));
        assert!(screen.contains("(1-3 of 3)"));
    }

    #[test]
    fn renders_empty_and_error_states() {
        let mut records = RecordsComponent::new();
        assert!(render(&records, 60, 5).contains("Loading records..."));
        records.set_view(ViewModel::default());
        assert!(render(&records, 60, 5).contains("No records found."));
        records.set_view(ViewModel {
            records: Vec::new(),
            error: Some("Error connecting to database: refused".into()),
        });
        assert!(render(&records, 60, 5).contains("Error connecting to database"));
    }

    #[test]
    fn refresh_bubbles_up() {
        let mut records = RecordsComponent::new();
        assert!(matches!(
            records.update(RecordsMsg::Refresh).msg,
            Some(RecordsMsg::Refresh)
        ));
    }
}
