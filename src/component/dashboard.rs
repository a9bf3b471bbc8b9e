use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{BulkComponent, BulkMsg, Component, FormComponent, FormMsg, RecordsComponent, RecordsMsg};
use crate::bulk::{self, BulkError, BulkReport, Progress};
use crate::connection::Connection;
use crate::crop::NewCrop;
use crate::db::{Gateway, StoreError};
use crate::generator::CropGenerator;
use crate::logger::{debug, info, warn};
use crate::update::{Command, MapMsg, Update};
use crate::view::ViewModel;

/// Messages the Dashboard component can emit
pub enum DashboardMsg {
    /// Request to leave dashboard back to the connection list
    Leave,
    Connected(Connection),
    FocusNext,
    FocusPrev,
    /// Rebuild the view model from the store
    Reload,
    Reloaded(ViewModel),
    Submit(NewCrop),
    Invalid(String),
    Inserted(Result<(), StoreError>),
    BulkRequested(usize),
    BulkProgress(Progress),
    BulkFinished(Result<BulkReport, BulkError>),
    Form(FormMsg),
    Bulk(BulkMsg),
    Records(RecordsMsg),
}

impl From<FormMsg> for DashboardMsg {
    fn from(msg: FormMsg) -> Self {
        match msg {
            FormMsg::Submitted(crop) => DashboardMsg::Submit(crop),
            FormMsg::Invalid(e) => DashboardMsg::Invalid(e),
            m => DashboardMsg::Form(m),
        }
    }
}
impl From<BulkMsg> for DashboardMsg {
    fn from(msg: BulkMsg) -> Self {
        match msg {
            BulkMsg::Requested(total) => DashboardMsg::BulkRequested(total),
            m => DashboardMsg::Bulk(m),
        }
    }
}
impl From<RecordsMsg> for DashboardMsg {
    fn from(msg: RecordsMsg) -> Self {
        match msg {
            RecordsMsg::Refresh => DashboardMsg::Reload,
            m => DashboardMsg::Records(m),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardFocus {
    Form,
    Bulk,
    Records,
}

impl DashboardFocus {
    fn next(self) -> Self {
        match self {
            DashboardFocus::Form => DashboardFocus::Bulk,
            DashboardFocus::Bulk => DashboardFocus::Records,
            DashboardFocus::Records => DashboardFocus::Form,
        }
    }
    fn prev(self) -> Self {
        match self {
            DashboardFocus::Form => DashboardFocus::Records,
            DashboardFocus::Bulk => DashboardFocus::Form,
            DashboardFocus::Records => DashboardFocus::Bulk,
        }
    }
}

/// Form, bulk control and record table for one store.
///
/// At most one store operation runs at a time; the dashboard is busy from
/// the moment it spawns one until the follow-up reload arrives.
pub struct DashboardComponent {
    form: FormComponent,
    bulk: BulkComponent,
    records: RecordsComponent,
    focus: DashboardFocus,
    gateway: Option<Gateway>,
    busy: bool,
    notice: Option<Notice>,
}

impl DashboardComponent {
    pub fn new() -> Self {
        Self {
            form: FormComponent::new(),
            bulk: BulkComponent::new(),
            records: RecordsComponent::new(),
            focus: DashboardFocus::Form,
            gateway: None,
            busy: false,
            notice: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn set_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice::new(level, text));
    }

    /// Claim the store for one operation.
    fn begin(&mut self) -> Option<Gateway> {
        if self.busy {
            self.set_notice(NoticeLevel::Warning, "Another operation is still running");
            return None;
        }
        let gateway = self.gateway.clone()?;
        self.busy = true;
        Some(gateway)
    }

    fn on_connected(&mut self, conn: Connection) -> Update<DashboardMsg> {
        info(&format!("dashboard: using {}", conn.label()));
        self.gateway = Some(Gateway::new(conn));
        self.records.clear();
        self.bulk.set_progress(None);
        self.notice = None;
        self.busy = false;
        self.reload()
    }

    fn reload(&mut self) -> Update<DashboardMsg> {
        let Some(gateway) = self.begin() else {
            return Update::none();
        };
        debug("dashboard: reloading records");
        Command::spawn(move |tx| {
            let _ = tx.send(DashboardMsg::Reloaded(ViewModel::reload(&gateway)).into());
        })
        .into()
    }

    fn submit(&mut self, crop: NewCrop) -> Update<DashboardMsg> {
        let Some(gateway) = self.begin() else {
            return Update::none();
        };
        Command::spawn(move |tx| {
            let result = gateway.insert_one(&crop);
            let _ = tx.send(DashboardMsg::Inserted(result).into());
            let _ = tx.send(DashboardMsg::Reloaded(ViewModel::reload(&gateway)).into());
        })
        .into()
    }

    fn start_bulk(&mut self, total: usize) -> Update<DashboardMsg> {
        let Some(gateway) = self.begin() else {
            return Update::none();
        };
        self.set_notice(NoticeLevel::Info, format!("Inserting {} records...", total));
        Command::spawn(move |tx| {
            let mut generator = CropGenerator::new();
            let result = bulk::run(&gateway, &mut generator, total, |p| {
                let _ = tx.send(DashboardMsg::BulkProgress(p).into());
            });
            let _ = tx.send(DashboardMsg::BulkFinished(result).into());
            let _ = tx.send(DashboardMsg::Reloaded(ViewModel::reload(&gateway)).into());
        })
        .into()
    }

    fn leave(&mut self) -> Update<DashboardMsg> {
        if self.busy {
            self.set_notice(NoticeLevel::Warning, "Wait for the running operation to finish");
            return Update::none();
        }
        DashboardMsg::Leave.into()
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let line = match &self.notice {
            Some(n) => {
                let (icon, color) = match n.level {
                    NoticeLevel::Info => ("ℹ", Color::Cyan),
                    NoticeLevel::Success => ("✔", Color::Green),
                    NoticeLevel::Warning => ("⚠", Color::Yellow),
                    NoticeLevel::Error => ("✖", Color::Red),
                };
                Line::from(Span::styled(
                    format!("{} {}", icon, n.text),
                    Style::default().fg(color),
                ))
            }
            None if self.busy => Line::from(Span::styled(
                "Working...",
                Style::default().fg(Color::Cyan),
            )),
            None => Line::from(""),
        };
        f.render_widget(Paragraph::new(line), area);
    }
}

impl Component for DashboardComponent {
    type Msg = DashboardMsg;

    fn update(&mut self, msg: Self::Msg) -> Update<Self::Msg> {
        match msg {
            DashboardMsg::Leave => self.leave(),
            DashboardMsg::Connected(conn) => self.on_connected(conn),
            DashboardMsg::FocusNext => {
                self.focus = self.focus.next();
                Update::none()
            }
            DashboardMsg::FocusPrev => {
                self.focus = self.focus.prev();
                Update::none()
            }
            DashboardMsg::Reload => self.reload(),
            DashboardMsg::Reloaded(view) => {
                self.busy = false;
                self.records.set_view(view);
                Update::none()
            }
            DashboardMsg::Submit(crop) => self.submit(crop),
            DashboardMsg::Invalid(e) => {
                self.set_notice(NoticeLevel::Error, e);
                Update::none()
            }
            DashboardMsg::Inserted(Ok(())) => {
                self.set_notice(NoticeLevel::Success, "Crop record inserted successfully!");
                Update::none()
            }
            DashboardMsg::Inserted(Err(e)) => {
                self.set_notice(NoticeLevel::Error, e.to_string());
                Update::none()
            }
            DashboardMsg::BulkRequested(total) => self.start_bulk(total),
            DashboardMsg::BulkProgress(p) => {
                self.bulk.set_progress(Some(p));
                self.set_notice(NoticeLevel::Info, format!("{} records inserted...", p.inserted));
                Update::none()
            }
            DashboardMsg::BulkFinished(result) => {
                self.bulk.set_progress(None);
                match result {
                    Ok(report) => self.set_notice(
                        NoticeLevel::Success,
                        format!("{} records inserted successfully!", report.inserted),
                    ),
                    Err(e) => {
                        warn(&format!("dashboard: {}", e));
                        self.set_notice(NoticeLevel::Error, e.to_string())
                    }
                }
                Update::none()
            }
            DashboardMsg::Form(m) => self.form.update(m).map_auto(),
            DashboardMsg::Bulk(m) => self.bulk.update(m).map_auto(),
            DashboardMsg::Records(m) => self.records.update(m).map_auto(),
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Update<Self::Msg> {
        use crossterm::event::KeyCode::*;
        match key.code {
            Tab => DashboardMsg::FocusNext.into(),
            BackTab => DashboardMsg::FocusPrev.into(),
            F(5) => DashboardMsg::Reload.into(),
            Esc => DashboardMsg::Leave.into(),
            // Forward key to focused component - let update handle side effects
            _ => match self.focus {
                DashboardFocus::Form => self.form.handle_key(key).map_auto(),
                DashboardFocus::Bulk => self.bulk.handle_key(key).map_auto(),
                DashboardFocus::Records => self.records.handle_key(key).map_auto(),
            },
        }
    }

    fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let title = match &self.gateway {
            Some(g) => format!("Crop Management System | {}", g.connection().label()),
            None => "Crop Management System".to_string(),
        };
        f.render_widget(
            Paragraph::new(Span::styled(
                title,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            rows[0],
        );

        // Create layout: 40% left (form + bulk), 60% right (records)
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Length(5), Constraint::Min(0)])
            .split(main[0]);

        self.form
            .draw(f, left[0], focused && self.focus == DashboardFocus::Form);
        self.bulk
            .draw(f, left[1], focused && self.focus == DashboardFocus::Bulk);
        self.records
            .draw(f, main[1], focused && self.focus == DashboardFocus::Records);

        self.draw_status(f, rows[2]);
        f.render_widget(
            Paragraph::new(Span::styled(
                "Tab focus | ↑↓ move | ←→ change | Enter submit | F5 refresh | Esc connections | Ctrl-C quit",
                Style::default().fg(Color::DarkGray),
            )),
            rows[3],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppMsg;
    use crate::component::RootMsg;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;

    /// Run a spawned task inline and feed its messages back.
    fn run(cmd: Command, dashboard: &mut DashboardComponent) {
        let (tx, rx) = std::sync::mpsc::channel();
        match cmd {
            Command::Spawn(task) => task(tx),
            Command::None => return,
        }
        for msg in rx.try_iter() {
            if let AppMsg::Root(RootMsg::Dashboard(m)) = msg {
                assert!(dashboard.update(m).cmd.is_none());
            }
        }
    }

    fn connected(dir: &tempfile::TempDir) -> DashboardComponent {
        let conn = Connection::sqlite(dir.path().join("dash.db"));
        Gateway::new(conn.clone()).ensure_schema().unwrap();
        let mut dashboard = DashboardComponent::new();
        let update = dashboard.update(DashboardMsg::Connected(conn));
        assert!(dashboard.is_busy());
        run(update.cmd, &mut dashboard);
        assert!(!dashboard.is_busy());
        dashboard
    }

    fn crop() -> NewCrop {
        NewCrop {
            crop_name: "Barley".into(),
            planting_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            harvest_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            growth_stage: "Maturity".into(),
            pest_control_measures: "Chemical pesticides".into(),
            yield_prediction: 3100,
        }
    }

    #[test]
    fn submit_inserts_then_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = connected(&dir);
        assert_eq!(dashboard.records.len(), 0);

        let update = dashboard.update(DashboardMsg::Submit(crop()));
        run(update.cmd, &mut dashboard);
        assert_eq!(dashboard.records.len(), 1);
        assert_eq!(
            dashboard.notice(),
            Some(&Notice::new(NoticeLevel::Success, "Crop record inserted successfully!"))
        );
    }

    #[test]
    fn bulk_reports_progress_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = connected(&dir);
        let update = dashboard.update(DashboardMsg::BulkRequested(1_000));
        assert_eq!(dashboard.notice().unwrap().text, "Inserting 1000 records...");
        run(update.cmd, &mut dashboard);
        assert_eq!(dashboard.records.len(), 1_000);
        assert_eq!(dashboard.notice().unwrap().text, "1000 records inserted successfully!");
        assert!(!dashboard.is_busy());
    }

    #[test]
    fn busy_dashboard_refuses_new_operations() {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = connected(&dir);
        let pending = dashboard.update(DashboardMsg::Reload);
        assert!(!pending.cmd.is_none());

        assert!(dashboard.update(DashboardMsg::Submit(crop())).cmd.is_none());
        assert!(dashboard.update(DashboardMsg::BulkRequested(1_000)).cmd.is_none());
        assert!(dashboard.update(DashboardMsg::Leave).msg.is_none());
        assert_eq!(dashboard.notice().unwrap().level, NoticeLevel::Warning);

        run(pending.cmd, &mut dashboard);
        assert!(matches!(dashboard.update(DashboardMsg::Leave).msg, Some(DashboardMsg::Leave)));
    }

    #[test]
    fn failed_insert_surfaces_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut dashboard = DashboardComponent::new();
        let update = dashboard.update(DashboardMsg::Connected(Connection::sqlite(
            dir.path().join("missing/dash.db"),
        )));
        run(update.cmd, &mut dashboard);

        let update = dashboard.update(DashboardMsg::Submit(crop()));
        run(update.cmd, &mut dashboard);
        let notice = dashboard.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.starts_with("Error connecting to database"));
        assert!(!dashboard.is_busy());
    }

    #[test]
    fn partial_bulk_failure_is_reported() {
        let mut dashboard = DashboardComponent::new();
        dashboard.update(DashboardMsg::BulkFinished(Err(BulkError {
            inserted: 20_000,
            total: 100_000,
            source: StoreError::Insert("lost connection".into()),
        })));
        let notice = dashboard.notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.contains("20000 of 100000"));
    }

    #[test]
    fn child_messages_bubble_into_dashboard_actions() {
        assert!(matches!(
            DashboardMsg::from(FormMsg::Submitted(crop())),
            DashboardMsg::Submit(_)
        ));
        assert!(matches!(
            DashboardMsg::from(BulkMsg::Requested(10_000)),
            DashboardMsg::BulkRequested(10_000)
        ));
        assert!(matches!(DashboardMsg::from(RecordsMsg::Refresh), DashboardMsg::Reload));
        assert!(matches!(DashboardMsg::from(FormMsg::NextField), DashboardMsg::Form(_)));
    }

    #[test]
    fn renders_all_panels() {
        let dir = tempfile::tempdir().unwrap();
        let dashboard = connected(&dir);
        let mut terminal = ratatui::Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|f| dashboard.draw(f, f.size(), true)).unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Insert a New Crop Record"));
        assert!(screen.contains("Bulk Insert Crop Records"));
        assert!(screen.contains("No records found."));
    }
}
