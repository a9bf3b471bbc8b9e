use clap::Parser;

use cropdbm::cli::Cli;
use cropdbm::config::Config;
use cropdbm::logger::{error, init};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize file logging under the app config directory
    if let Ok(dir) = Config::app_config_dir() {
        let log_path = dir.join("cropdbm.log");
        let _ = init(log_path);
    }

    if let Err(err) = cli.run() {
        eprintln!("{:?}", err);
        error(&format!("fatal error: {:?}", err));
        std::process::exit(1);
    }

    Ok(())
}
