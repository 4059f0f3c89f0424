//! dirmap - concurrent filesystem tree mapper and worker-count benchmark.

#![deny(unsafe_code)]

mod cli;
mod commands;
mod menu;
mod output;
mod reports;

use anyhow::Result;
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Cooperative interruption: bench and auto check this between runs,
    // a single crawl always completes.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            eprintln!("\ninterrupted, finishing the current run...");
            flag.store(true, Ordering::SeqCst);
        })
        .ok();
    }

    match cli.command {
        Some(Command::Scan(args)) => commands::scan::run(&args, &cli.out),
        Some(Command::Bench(args)) => commands::bench::run(&args, &cli.out, &shutdown),
        Some(Command::Disk(args)) => commands::disk::run(&args, &cli.out),
        Some(Command::Auto(args)) => commands::auto::run(&args, &cli.out, &shutdown),
        Some(Command::Workers(args)) => commands::workers::run(&args),
        None => menu::run(&cli.out, &shutdown),
    }
}
