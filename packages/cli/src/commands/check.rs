use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use crate::page;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Page documents (JSON) to check
    #[arg(required = true)]
    pub pages: Vec<PathBuf>,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    println!("🔍 {} page check", "Starting".green().bold());
    println!();

    let mut total_issues = 0;

    for input in &args.pages {
        let path = page::resolve(cwd, input);
        let document = page::load(&path)?;
        let issues = document.blocks.check();

        if issues.is_empty() {
            println!("   {} {}", "✓".green(), path.display());
            continue;
        }

        println!("   {} {}", "✗".red(), path.display());
        for issue in &issues {
            println!("     {} {}", "error:".red(), issue);
        }
        total_issues += issues.len();
    }

    println!();
    if total_issues > 0 {
        return Err(anyhow::anyhow!("{} integrity issue(s) found", total_issues));
    }

    println!("✨ {} {} page(s) clean", "Done".green().bold(), args.pages.len());
    Ok(())
}
