use clap::Parser;
use log::{LevelFilter, error, info};
use pinwire_cli::Config;
use std::{process, str::FromStr};

fn main() {
    // Parse configuration first
    let cfg = Config::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&cfg.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'info' instead.",
            cfg.log_level
        );
        LevelFilter::Info
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!("Starting pinwire with log level: {log_level}");

    if let Err(err) = pinwire_cli::run(&cfg) {
        error!(err:err; "Run failed");
        process::exit(1);
    }

    info!("Completed successfully");
}
