//! Interactive menu, shown when no subcommand is given.

use anyhow::Result;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use dirmap_core::host::HostInfo;

use crate::commands::{bench, disk, scan};
use crate::reports::ReportFormat;

pub fn run(out_dir: &Path, shutdown: &Arc<AtomicBool>) -> Result<()> {
    let host = HostInfo::detect();
    println!("dirmap");
    println!(
        "host: os={} arch={} cores={}",
        host.os, host.arch, host.cores
    );

    loop {
        println!();
        println!("1) scan  2) bench  3) disk  4) quit");
        match prompt("choice: ")?.as_str() {
            "1" => {
                let root = prompt_root()?;
                let fast = prompt_yes_no("fast mode y/n [n]: ")?;
                let args = scan::Args {
                    root,
                    workers: None,
                    fast,
                    throttle_ms: None,
                    format: ReportFormat::Both,
                };
                scan::run(&args, out_dir)?;
            }
            "2" => {
                let root = prompt_root()?;
                let iterations = prompt_usize("iterations [1]: ", 1)?;
                let fast = prompt_yes_no("fast mode y/n [n]: ")?;
                let args = bench::Args {
                    root,
                    iterations,
                    fast,
                    throttle_ms: None,
                    format: ReportFormat::Both,
                };
                bench::run(&args, out_dir, shutdown)?;
            }
            "3" => {
                let args = disk::Args { path: None };
                disk::run(&args, out_dir)?;
            }
            "4" | "q" => break,
            other => println!("unknown choice: {other}"),
        }
    }
    Ok(())
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_root() -> Result<PathBuf> {
    let answer = prompt("root [.]: ")?;
    Ok(if answer.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(answer)
    })
}

fn prompt_yes_no(label: &str) -> Result<bool> {
    Ok(prompt(label)?.eq_ignore_ascii_case("y"))
}

fn prompt_usize(label: &str, default: usize) -> Result<usize> {
    let answer = prompt(label)?;
    if answer.is_empty() {
        return Ok(default);
    }
    Ok(answer.parse().unwrap_or(default))
}
