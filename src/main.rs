use anyhow::{Context, anyhow};
use clap::Parser;
use colored::*;
use race_telemetry::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    let result = run(args);

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), error);
            process::exit(1);
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result.map_err(|error| {
                let message = error.user_message();
                if message == error.to_string() {
                    anyhow::Error::new(error)
                } else {
                    anyhow::Error::new(error).context(message)
                }
            }),
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(anyhow!("Run interrupted by user"))
            }
        }
    })
}
