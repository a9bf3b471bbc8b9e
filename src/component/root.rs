use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::component::{
    Component, ConnectionComponent, ConnectionMsg, DashboardComponent, DashboardMsg,
};
use crate::connection::Connection;
use crate::update::{MapMsg, Update};

pub enum RootMsg {
    ConnectionSelected(Connection),
    LeaveDashboard,
    Quit,
    Connection(ConnectionMsg),
    Dashboard(DashboardMsg),
}

impl From<ConnectionMsg> for RootMsg {
    fn from(msg: ConnectionMsg) -> Self {
        match msg {
            ConnectionMsg::ConnectionSelected(conn) => RootMsg::ConnectionSelected(conn),
            ConnectionMsg::Quit => RootMsg::Quit,
            m => RootMsg::Connection(m),
        }
    }
}
impl From<DashboardMsg> for RootMsg {
    fn from(msg: DashboardMsg) -> Self {
        match msg {
            DashboardMsg::Leave => RootMsg::LeaveDashboard,
            m => RootMsg::Dashboard(m),
        }
    }
}

enum Focus {
    Connection,
    Dashboard,
}

pub struct RootComponent {
    focus: Focus,
    connection: ConnectionComponent,
    dashboard: DashboardComponent,
}

impl RootComponent {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            focus: Focus::Connection,
            connection: ConnectionComponent::new(connections),
            dashboard: DashboardComponent::new(),
        }
    }
    fn move_to_dashboard(&mut self, conn: Connection) -> Update<RootMsg> {
        // Hand the connection over and load its records immediately
        self.focus = Focus::Dashboard;
        self.dashboard
            .update(DashboardMsg::Connected(conn))
            .map_auto()
    }
    fn move_to_connection(&mut self) -> Update<RootMsg> {
        self.focus = Focus::Connection;
        Update::none()
    }
}

impl Component for RootComponent {
    type Msg = RootMsg;

    fn update(&mut self, msg: Self::Msg) -> Update<Self::Msg> {
        match msg {
            RootMsg::ConnectionSelected(conn) => self.move_to_dashboard(conn),
            RootMsg::LeaveDashboard => self.move_to_connection(),
            RootMsg::Quit => RootMsg::Quit.into(),
            RootMsg::Connection(m) => self.connection.update(m).map_auto(),
            RootMsg::Dashboard(m) => self.dashboard.update(m).map_auto(),
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Update<Self::Msg> {
        match self.focus {
            Focus::Connection => self.connection.handle_key(key).map_auto(),
            Focus::Dashboard => self.dashboard.handle_key(key).map_auto(),
        }
    }

    fn draw(&self, f: &mut Frame, area: Rect, focused: bool) {
        match self.focus {
            Focus::Connection => self.connection.draw(f, area, focused),
            Focus::Dashboard => self.dashboard.draw(f, area, focused),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_a_connection_opens_dashboard_and_loads() {
        let mut root = RootComponent::new(vec![Connection::sqlite("/tmp/crops.db")]);
        let update = root.update(RootMsg::ConnectionSelected(Connection::sqlite("/tmp/crops.db")));
        assert!(matches!(root.focus, Focus::Dashboard));
        assert!(!update.cmd.is_none());
        assert!(matches!(root.update(RootMsg::LeaveDashboard).msg, None));
        assert!(matches!(root.focus, Focus::Connection));
    }

    #[test]
    fn dashboard_leave_maps_to_root() {
        assert!(matches!(RootMsg::from(DashboardMsg::Leave), RootMsg::LeaveDashboard));
        assert!(matches!(RootMsg::from(ConnectionMsg::Quit), RootMsg::Quit));
    }
}
