pub mod app;
pub mod bulk;
pub mod cli;
pub mod component;
pub mod config;
pub mod connection;
pub mod crop;
pub mod db;
pub mod generator;
pub mod logger;
pub mod terminal;
pub mod update;
pub mod view;
