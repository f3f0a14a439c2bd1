use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use storefront_blocks::PageStatus;

use crate::page;

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Page document (JSON)
    pub page: PathBuf,

    /// Where to write the published page (defaults to overwriting it)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn publish(args: PublishArgs, cwd: &str) -> Result<()> {
    let path = page::resolve(cwd, &args.page);
    let mut document = page::load(&path)?;

    let issues = document.blocks.check();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("   {} {}", "error:".red(), issue);
        }
        return Err(anyhow::anyhow!(
            "refusing to publish {} with {} integrity issue(s)",
            document.id,
            issues.len()
        ));
    }

    if document.status == PageStatus::Published {
        println!("   {} {} was already published, restamping", "note:".yellow(), document.id);
    }
    document.publish();

    let out_path = args.output.map(|out| page::resolve(cwd, &out)).unwrap_or(path);
    page::save(&document, &out_path)?;

    println!("🚀 {} {} → {}", "Published".green().bold(), document.id, out_path.display());
    Ok(())
}
