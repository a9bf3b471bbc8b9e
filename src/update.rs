use std::sync::mpsc::Sender;

use crate::app::AppMsg;
use crate::component::{BulkMsg, ConnectionMsg, DashboardMsg, FormMsg, RecordsMsg, RootMsg};

pub enum Command {
    None,
    /// Runs on a worker thread and posts its results back as `AppMsg`s.
    Spawn(Box<dyn FnOnce(Sender<AppMsg>) + Send>),
}

impl Command {
    pub fn spawn(task: impl FnOnce(Sender<AppMsg>) + Send + 'static) -> Self {
        Command::Spawn(Box::new(task))
    }
    pub fn is_none(&self) -> bool {
        matches!(self, Command::None)
    }
}

pub struct Update<T> {
    pub msg: Option<T>,
    pub cmd: Command,
}

impl<T> Update<T> {
    pub fn none() -> Self {
        Self {
            msg: None,
            cmd: Command::None,
        }
    }
    pub fn cmd(cmd: Command) -> Self {
        Self { msg: None, cmd }
    }
    pub fn msg(msg: T) -> Self {
        Self {
            msg: Some(msg),
            cmd: Command::None,
        }
    }
}

impl<M> From<()> for Update<M> {
    fn from(_: ()) -> Self {
        Update::none()
    }
}

impl<M> From<Command> for Update<M> {
    fn from(cmd: Command) -> Self {
        Update::cmd(cmd)
    }
}

// Message-specific From implementations to allow `msg.into()` ergonomics
impl From<FormMsg> for Update<FormMsg> {
    fn from(msg: FormMsg) -> Self {
        Update::msg(msg)
    }
}
impl From<BulkMsg> for Update<BulkMsg> {
    fn from(msg: BulkMsg) -> Self {
        Update::msg(msg)
    }
}
impl From<RecordsMsg> for Update<RecordsMsg> {
    fn from(msg: RecordsMsg) -> Self {
        Update::msg(msg)
    }
}
impl From<DashboardMsg> for Update<DashboardMsg> {
    fn from(msg: DashboardMsg) -> Self {
        Update::msg(msg)
    }
}
impl From<ConnectionMsg> for Update<ConnectionMsg> {
    fn from(msg: ConnectionMsg) -> Self {
        Update::msg(msg)
    }
}
impl From<RootMsg> for Update<RootMsg> {
    fn from(msg: RootMsg) -> Self {
        Update::msg(msg)
    }
}

pub trait MapMsg<M> {
    fn map_auto<ParentMsg>(self) -> Update<ParentMsg>
    where
        ParentMsg: From<M>;
}

impl<M> MapMsg<M> for Update<M> {
    fn map_auto<ParentMsg>(self) -> Update<ParentMsg>
    where
        ParentMsg: From<M>,
    {
        Update {
            msg: self.msg.map(ParentMsg::from),
            cmd: self.cmd,
        }
    }
}
