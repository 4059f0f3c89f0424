//! Workers command - print the advisor recommendation.

use anyhow::Result;
use clap::Args as ClapArgs;

use dirmap_core::advisor::recommend_workers;
use dirmap_core::host::HostInfo;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Explicit worker count (echoed back verbatim, floored at 1).
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Fast mode: scale the pool more aggressively.
    #[arg(long)]
    pub fast: bool,
}

pub fn run(args: &Args) -> Result<()> {
    let host = HostInfo::detect();
    let recommended = recommend_workers(args.workers, args.fast);
    println!(
        "host: os={} arch={} cores={}",
        host.os, host.arch, host.cores
    );
    println!("recommended workers: {recommended}");
    Ok(())
}
