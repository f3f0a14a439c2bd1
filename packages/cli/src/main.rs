mod commands;
mod config;
mod page;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, check, inspect, publish, ApplyArgs, CheckArgs, InspectArgs, PublishArgs};
use tracing_subscriber::EnvFilter;

/// Storefront page builder - inspect and edit page documents
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a page's layer tree
    Inspect(InspectArgs),

    /// Check a page for structural problems
    Check(CheckArgs),

    /// Apply a JSON script of mutations to a page
    Apply(ApplyArgs),

    /// Mark a page as published
    Publish(PublishArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Inspect(args) => inspect(args, &cwd),
        Command::Check(args) => check(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
        Command::Publish(args) => publish(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
