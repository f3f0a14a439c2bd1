use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use storefront_blocks::{BlockNode, PageDocument, PageStatus};

use crate::page;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Page document (JSON)
    pub page: PathBuf,

    /// Show each block's settings
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the block tree as JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let path = page::resolve(cwd, &args.page);
    let document = page::load(&path)?;

    if args.json {
        println!("{}", document.blocks.to_json_pretty()?);
        return Ok(());
    }

    print!("{}", render(&document, args.verbose));
    Ok(())
}

/// Header plus an indented outline of the layer tree
pub fn render(document: &PageDocument, verbose: bool) -> String {
    let status = match document.status {
        PageStatus::Draft => "draft".yellow(),
        PageStatus::Published => "published".green(),
    };

    let mut out = String::new();
    out.push_str(&format!(
        "📄 {} ({}) [{}]\n",
        document.title.bold(),
        document.id,
        status
    ));
    out.push_str(&format!(
        "   {} blocks, updated {}\n\n",
        document.blocks.node_count(),
        document.updated_at.format("%Y-%m-%d %H:%M")
    ));

    let blocks = document.blocks.blocks();
    for (index, node) in blocks.iter().enumerate() {
        outline(node, "", index + 1 == blocks.len(), verbose, &mut out);
    }
    out
}

fn outline(node: &BlockNode, prefix: &str, last: bool, verbose: bool, out: &mut String) {
    let branch = if last { "└── " } else { "├── " };

    let mut line = format!("{}{}{} {}", prefix, branch, node.kind.to_string().cyan(), node.id);
    if !node.variant.is_empty() && node.variant != "default" {
        line.push_str(&format!(" ({})", node.variant));
    }
    if !node.visible {
        line.push_str(&format!(" {}", "hidden".dimmed()));
    }
    if node.locked {
        line.push_str(&format!(" {}", "locked".red()));
    }
    if let Some(group) = &node.group_id {
        line.push_str(&format!(" {}", format!("#{}", group).magenta()));
    }
    out.push_str(&line);
    out.push('\n');

    let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });

    if verbose {
        for (key, value) in &node.settings {
            out.push_str(&format!("{}  {} = {}\n", child_prefix, key.dimmed(), value));
        }
    }

    let children = node.children();
    for (index, child) in children.iter().enumerate() {
        outline(child, &child_prefix, index + 1 == children.len(), verbose, out);
    }
}
