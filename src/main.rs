//! Command-line front-end: load the data, run the day, answer queries.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use chrono::NaiveTime;
use clap::Parser;

use parcel_dispatch::dispatch::DispatchSystem;
use parcel_dispatch::ingest::{read_distances, read_packages};
use parcel_dispatch::status::PackageSnapshot;

#[derive(Parser)]
#[command(name = "parcel-dispatch")]
#[command(about = "Package delivery routing simulation and status queries")]
struct Cli {
    /// Package table (CSV)
    #[arg(long, default_value = "data/packages.csv")]
    packages: String,

    /// Distance table (CSV)
    #[arg(long, default_value = "data/distances.csv")]
    distances: String,

    /// Query time, e.g. "10:30 AM"
    #[arg(long)]
    at: Option<String>,

    /// Show one package's status and exit
    #[arg(long)]
    package: Option<u32>,

    /// Show every package's status and exit
    #[arg(long)]
    all: bool,

    /// Show fleet mileage and exit
    #[arg(long)]
    mileage: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = read_packages(&cli.packages)
        .with_context(|| format!("loading packages from {}", cli.packages))?;
    let index = read_distances(&cli.distances)
        .with_context(|| format!("loading distances from {}", cli.distances))?;

    let mut system = DispatchSystem::new(store, index);
    let summaries = system.run(&[]).context("routing failed")?;
    for s in summaries {
        println!(
            "truck {} delivered {} packages in {:.1} mi, back by {}",
            s.truck(),
            s.delivered(),
            s.miles(),
            s.finished_at().format("%-I:%M %p")
        );
    }
    println!("total mileage: {:.1} mi", system.total_mileage());
    println!();

    let at = match cli.at.as_deref() {
        Some(raw) => Some(parse_query_time(raw)?),
        None => None,
    };

    if let Some(id) = cli.package {
        match system.status(id, at) {
            Some(snap) => print_snapshot(&snap),
            None => println!("package {id} not found"),
        }
        return Ok(());
    }
    if cli.all {
        for snap in system.statuses(at) {
            print_line(&snap);
        }
        return Ok(());
    }
    if cli.mileage {
        for (truck, miles) in system.mileage_by_truck() {
            println!("truck {truck}: {miles:.1} mi");
        }
        return Ok(());
    }

    menu(&system)
}

/// Interactive status console. Query faults are reported and the loop
/// keeps going; only EOF or the exit choice ends it.
fn menu(system: &DispatchSystem) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        println!();
        println!("Package Tracking");
        println!("1. Check package status");
        println!("2. Check all packages");
        println!("3. Fleet mileage");
        println!("4. Exit");
        print!("Choice: ");
        io::stdout().flush()?;

        let Some(choice) = lines.next().transpose()? else {
            return Ok(());
        };
        match choice.trim() {
            "1" => {
                print!("Package id: ");
                io::stdout().flush()?;
                let Some(raw_id) = lines.next().transpose()? else {
                    return Ok(());
                };
                let Ok(id) = raw_id.trim().parse::<u32>() else {
                    println!("invalid package id {:?}", raw_id.trim());
                    continue;
                };
                print!("Time (H:MM AM/PM, blank for current): ");
                io::stdout().flush()?;
                let Some(raw_time) = lines.next().transpose()? else {
                    return Ok(());
                };
                let at = match raw_time.trim() {
                    "" => None,
                    raw => match parse_query_time(raw) {
                        Ok(t) => Some(t),
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    },
                };
                match system.status(id, at) {
                    Some(snap) => print_snapshot(&snap),
                    None => println!("package {id} not found"),
                }
            }
            "2" => {
                print!("Time (H:MM AM/PM): ");
                io::stdout().flush()?;
                let Some(raw_time) = lines.next().transpose()? else {
                    return Ok(());
                };
                match parse_query_time(raw_time.trim()) {
                    Ok(t) => {
                        for snap in system.statuses(Some(t)) {
                            print_line(&snap);
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
            "3" => {
                for (truck, miles) in system.mileage_by_truck() {
                    println!("truck {truck}: {miles:.1} mi");
                }
                println!("total: {:.1} mi", system.total_mileage());
            }
            "4" => return Ok(()),
            other => println!("invalid choice {other:?}"),
        }
    }
}

fn parse_query_time(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(&raw.to_ascii_uppercase(), "%I:%M %p")
        .with_context(|| format!("invalid time {raw:?}, expected H:MM AM/PM"))
}

fn print_snapshot(snap: &PackageSnapshot) {
    println!("package {}", snap.id);
    println!("  status: {}", snap.status);
    println!("  address: {}, {} {}", snap.address, snap.city, snap.zip);
    println!("  deadline: {}", snap.deadline);
    println!("  weight: {} kg", snap.weight);
    if let Some(truck) = snap.truck {
        println!("  truck: {truck}");
    }
    if let Some(at) = snap.delivery_time {
        println!("  delivered at: {}", at.format("%-I:%M %p"));
    }
}

fn print_line(snap: &PackageSnapshot) {
    println!(
        "package {:>3}: {:<10} deadline {:<8} truck {}",
        snap.id,
        snap.status.to_string(),
        snap.deadline.to_string(),
        snap.truck.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
    );
}
