use anyhow::Result;
use crossterm::event::KeyModifiers;
use crossterm::event::{self, Event, KeyCode};
use ratatui::prelude::Backend;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::component::{Component, ConnectionMsg, DashboardMsg, RootComponent, RootMsg};
use crate::connection::Connection;
use crate::logger::{error, trace};
use crate::terminal::Terminal;
use crate::update::{Command, MapMsg, Update};

pub enum AppMsg {
    Quit,
    Root(RootMsg),
}

impl From<RootMsg> for AppMsg {
    fn from(msg: RootMsg) -> Self {
        match msg {
            RootMsg::Quit => AppMsg::Quit,
            m => AppMsg::Root(m),
        }
    }
}

// Convenience: allow bubbling lower-level messages directly into AppMsg
impl From<DashboardMsg> for AppMsg {
    fn from(msg: DashboardMsg) -> Self {
        AppMsg::from(RootMsg::from(msg))
    }
}
impl From<ConnectionMsg> for AppMsg {
    fn from(msg: ConnectionMsg) -> Self {
        AppMsg::from(RootMsg::from(msg))
    }
}

pub struct App<B: Backend> {
    term: Terminal<B>,
    root: RootComponent,
    rx: Receiver<AppMsg>,
    tx: Sender<AppMsg>,
    should_quit: bool,
}

impl<B: Backend> App<B> {
    pub fn new(term: Terminal<B>, connections: Vec<Connection>) -> Self {
        let (tx, rx) = std::sync::mpsc::channel();
        Self {
            term,
            root: RootComponent::new(connections),
            rx,
            tx,
            should_quit: false,
        }
    }

    /// Skip the connection list and open `conn` right away.
    pub fn open(&mut self, conn: Connection) {
        self.handle_update(Update::msg(AppMsg::Root(RootMsg::ConnectionSelected(conn))));
    }

    pub fn run(&mut self) -> Result<()> {
        while !self.should_quit {
            self.handle_async_messages();
            self.draw()?;
            self.handle_event()?;
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let root = &self.root;
        self.term.draw(|f| {
            root.draw(f, f.size(), true);
        })?;
        Ok(())
    }

    fn handle_event(&mut self) -> Result<()> {
        if !event::poll(Duration::from_millis(250))? {
            return Ok(());
        }

        let Event::Key(key) = event::read()? else {
            return Ok(());
        };
        trace(&format!("key: {:?}", key.code));

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        let update = self.root.handle_key(key).map_auto();
        self.handle_update(update);

        Ok(())
    }

    fn handle_update(&mut self, update: Update<AppMsg>) {
        if let Some(msg) = update.msg {
            let u = self.handle_msg(msg);
            self.handle_update(u);
        }
        self.run_command(update.cmd);
    }

    fn handle_msg(&mut self, msg: AppMsg) -> Update<AppMsg> {
        match msg {
            AppMsg::Quit => {
                self.should_quit = true;
                Update::none()
            }
            AppMsg::Root(m) => self.root.update(m).map_auto(),
        }
    }

    fn handle_async_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.handle_update(Update::msg(msg));
        }
    }

    fn run_command(&mut self, cmd: Command) {
        match cmd {
            Command::None => {}
            Command::Spawn(task) => {
                let tx = self.tx.clone();
                let spawned = std::thread::Builder::new()
                    .name("cropdbm-store".into())
                    .spawn(move || task(tx));
                if let Err(e) = spawned {
                    error(&format!("failed to spawn store task: {}", e));
                }
            }
        }
    }
}

pub fn run_app<B: Backend>(terminal: Terminal<B>, connections: Vec<Connection>, open: Option<Connection>) -> Result<()> {
    let mut app = App::new(terminal, connections);
    if let Some(conn) = open {
        app.open(conn);
    }
    app.run()
}
