use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::update::Update;

mod bulk;
mod connection;
mod dashboard;
mod form;
mod records;
mod root;

pub use bulk::{BulkComponent, BulkMsg};
pub use connection::{ConnectionComponent, ConnectionMsg};
pub use dashboard::{DashboardComponent, DashboardMsg, Notice, NoticeLevel};
pub use form::{FormComponent, FormMsg};
pub use records::{RecordsComponent, RecordsMsg};
pub use root::{RootComponent, RootMsg};

pub trait Component {
    type Msg;

    /// Pure update (no IO). Return bubbled message (optional) + Command.
    fn update(&mut self, msg: Self::Msg) -> Update<Self::Msg>;

    /// Handle raw input only if focused; otherwise ignore or implement soft reactions later.
    fn handle_key(&self, key: KeyEvent) -> Update<Self::Msg>;

    /// Draw is side-effectful but only touches the frame.
    fn draw(&self, f: &mut Frame, area: Rect, focused: bool);
}
