//! Command-line interface for cropdbm
//!
//! ```bash
//! # Pick a store interactively
//! cropdbm
//!
//! # Create the crops table on the "farm" connection, then fill it
//! cropdbm -c farm init
//! cropdbm -c farm bulk 10000 --seed 7
//!
//! # Record one crop and list everything
//! cropdbm -c farm insert --crop Wheat --planting 2025-03-01 --harvest 2025-07-15 \
//!   --stage Maturity --pest "Biological control" --yield-prediction 2400
//! cropdbm -c farm list
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::app::run_app;
use crate::bulk;
use crate::config::Config;
use crate::crop::{NewCrop, DISPLAY_COLUMNS};
use crate::db::Gateway;
use crate::generator::CropGenerator;
use crate::logger::info;
use crate::terminal::with_terminal;

#[derive(Debug, Parser)]
#[command(name = "cropdbm")]
#[command(about = "Record, bulk-generate and browse crop records in MySQL, PostgreSQL or SQLite")]
#[command(long_about = None)]
pub struct Cli {
    /// Config file (defaults to config.yaml in the app config dir)
    #[arg(long, env = "CROPDBM_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Connection name from the config; the first one when omitted
    #[arg(short, long, value_name = "NAME")]
    pub connection: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the terminal UI (default)
    Tui,
    /// Create the crops table if it does not exist
    Init,
    /// Insert one crop record
    Insert {
        #[arg(long)]
        crop: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        planting: NaiveDate,
        #[arg(long, value_name = "YYYY-MM-DD")]
        harvest: NaiveDate,
        #[arg(long)]
        stage: String,
        #[arg(long)]
        pest: String,
        /// Kilograms
        #[arg(long)]
        yield_prediction: u32,
    },
    /// Generate and insert random crop records in batches
    Bulk {
        count: usize,
        /// Seed the generator for a reproducible data set
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print every stored record
    List {
        /// Print only the number of records
        #[arg(long)]
        count: bool,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref()).context("failed to load config")?;
        let command = self.command.unwrap_or(Command::Tui);

        if let Command::Tui = command {
            // An explicit -c skips the connection list.
            let open = match &self.connection {
                Some(name) => Some(config.select(Some(name))?.clone()),
                None => None,
            };
            return with_terminal(|t| run_app(t, config.conn.clone(), open));
        }

        let conn = config.select(self.connection.as_deref())?.clone();
        info(&format!("cli: using {}", conn.label()));
        let gateway = Gateway::new(conn);

        match command {
            Command::Tui => Ok(()),
            Command::Init => {
                gateway.ensure_schema()?;
                println!("crops table ready on {}", gateway.connection().label());
                Ok(())
            }
            Command::Insert {
                crop,
                planting,
                harvest,
                stage,
                pest,
                yield_prediction,
            } => {
                gateway.insert_one(&NewCrop {
                    crop_name: crop,
                    planting_date: planting,
                    harvest_date: harvest,
                    growth_stage: stage,
                    pest_control_measures: pest,
                    yield_prediction,
                })?;
                println!("Crop record inserted successfully!");
                Ok(())
            }
            Command::Bulk { count, seed } => {
                let mut generator = match seed {
                    Some(seed) => CropGenerator::seeded(seed, chrono::Local::now().date_naive()),
                    None => CropGenerator::new(),
                };
                let report = bulk::run(&gateway, &mut generator, count, |p| {
                    println!("{} records inserted...", p.inserted)
                })?;
                println!("{} records inserted successfully!", report.inserted);
                Ok(())
            }
            Command::List { count: true } => {
                println!("{}", gateway.count()?);
                Ok(())
            }
            Command::List { count: false } => {
                let records = gateway.try_fetch_all()?;
                if records.is_empty() {
                    println!("No records found.");
                    return Ok(());
                }
                println!("{}", DISPLAY_COLUMNS.join("\t"));
                for record in records {
                    println!("{}", record.display_row().join("\t"));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["cropdbm", "-c", "farm"]).unwrap();
        assert_eq!(cli.connection.as_deref(), Some("farm"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn insert_parses_dates_and_yield() {
        let cli = Cli::try_parse_from([
            "cropdbm",
            "insert",
            "--crop",
            "Wheat",
            "--planting",
            "2025-03-01",
            "--harvest",
            "2025-02-01",
            "--stage",
            "Maturity",
            "--pest",
            "None",
            "--yield-prediction",
            "2400",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Insert {
                planting,
                harvest,
                yield_prediction,
                ..
            }) => {
                // harvest before planting is accepted as entered
                assert!(harvest < planting);
                assert_eq!(yield_prediction, 2400);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(Cli::try_parse_from(["cropdbm", "bulk", "many"]).is_err());
        assert!(Cli::try_parse_from([
            "cropdbm",
            "insert",
            "--crop",
            "Rice",
            "--planting",
            "01/03/2025",
            "--harvest",
            "2025-07-01",
            "--stage",
            "Seedling",
            "--pest",
            "None",
            "--yield-prediction",
            "900",
        ])
        .is_err());
    }

    #[test]
    fn bulk_and_list_against_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.yaml");
        std::fs::write(
            &config,
            format!(
                "conn:\n  - type: sqlite\n    name: local\n    path: {}\n",
                dir.path().join("crops.db").display()
            ),
        )
        .unwrap();
        let config = config.to_str().unwrap();

        let run = |args: &[&str]| {
            let mut argv = vec!["cropdbm", "--config", config];
            argv.extend_from_slice(args);
            Cli::try_parse_from(argv).unwrap().run()
        };
        run(&["init"]).unwrap();
        run(&["-c", "local", "bulk", "1500", "--seed", "3"]).unwrap();
        run(&["list", "--count"]).unwrap();

        let gateway = Gateway::new(Config::load(Some(std::path::Path::new(config))).unwrap().conn[0].clone());
        assert_eq!(gateway.count().unwrap(), 1_500);
        assert!(run(&["-c", "elsewhere", "list"]).is_err());
    }
}
