use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Deserialize;
use std::path::PathBuf;
use storefront_editor::{EditorStore, Mutation, MutationError};
use tracing::debug;

use crate::{config, page};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Page document (JSON)
    pub page: PathBuf,

    /// Script: a JSON array of mutations, plus `undo` / `redo` / `jump_to` steps
    pub script: PathBuf,

    /// Where to write the result (defaults to overwriting the page)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop at the first rejected step
    #[arg(long)]
    pub strict: bool,

    /// Report only, write nothing
    #[arg(long)]
    pub dry_run: bool,
}

/// History navigation inside a script
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Control {
    Undo,
    Redo,
    JumpTo { index: usize },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Control(Control),
    Mutation(Mutation),
}

#[derive(Debug, Default, PartialEq)]
pub struct Report {
    pub applied: usize,
    pub rejected: Vec<(usize, String)>,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = config::load(cwd)?;
    let page_path = page::resolve(cwd, &args.page);
    let script_path = page::resolve(cwd, &args.script);

    let document = page::load(&page_path)?;
    let script = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Failed to read script {}", script_path.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid script {}", script_path.display()))?;
    debug!(steps = steps.len(), page = %document.id, "script loaded");

    println!("🛠  {} {} step(s) on {}", "Applying".green().bold(), steps.len(), page_path.display());
    println!();

    let mut store = EditorStore::from_document(&document, &config);
    let report = run(&mut store, steps, args.strict);

    println!();
    print_history(&store);

    if !report.rejected.is_empty() && args.strict {
        let (index, reason) = &report.rejected[0];
        return Err(anyhow::anyhow!("step {} rejected: {}", index + 1, reason));
    }

    if args.dry_run || !store.is_dirty() {
        println!();
        println!("✨ {} nothing written", "Done".green().bold());
        return Ok(());
    }

    let out_path = args
        .output
        .map(|out| page::resolve(cwd, &out))
        .unwrap_or(page_path);
    page::save(&store.to_document(&document), &out_path)?;
    store.mark_saved();

    println!();
    println!(
        "✨ {} {} applied, {} rejected → {}",
        "Done".green().bold(),
        report.applied,
        report.rejected.len(),
        out_path.display()
    );
    Ok(())
}

/// Run every step against `store`, printing one line per step.
pub fn run(store: &mut EditorStore, steps: Vec<Step>, strict: bool) -> Report {
    let mut report = Report::default();

    for (index, step) in steps.into_iter().enumerate() {
        let result = match step {
            Step::Mutation(mutation) => store
                .dispatch(mutation)
                .map(|commit| commit.description)
                .map_err(|error: MutationError| error.to_string()),
            Step::Control(Control::Undo) => navigate(store.undo(), "Undo", "nothing to undo"),
            Step::Control(Control::Redo) => navigate(store.redo(), "Redo", "nothing to redo"),
            Step::Control(Control::JumpTo { index }) => {
                navigate(store.jump_to(index), "Jumped in history", "no such history entry")
            }
        };

        match result {
            Ok(description) => {
                println!("   {} {}", "✓".green(), description);
                report.applied += 1;
            }
            Err(reason) => {
                println!("   {} {}", "✗".red(), reason);
                report.rejected.push((index, reason));
                if strict {
                    break;
                }
            }
        }
    }

    report
}

fn navigate(moved: bool, done: &str, failed: &str) -> Result<String, String> {
    if moved {
        Ok(done.to_string())
    } else {
        Err(failed.to_string())
    }
}

fn print_history(store: &EditorStore) {
    println!("   {}", "History:".bold());
    for item in store.history_items() {
        let marker = if item.current { "▶".green() } else { " ".normal() };
        println!(
            "   {} {:>3}  {}  {}",
            marker,
            item.index,
            item.timestamp.format("%H:%M:%S"),
            item.description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_blocks::{BlockId, BlockKind, BlockNode, BlockTree, PageDocument};
    use storefront_editor::EditorConfig;

    fn tree() -> BlockTree {
        BlockTree::new(vec![
            BlockNode::new("header", BlockKind::Header),
            BlockNode::new("hero", BlockKind::Hero),
            BlockNode::new("text", BlockKind::Text),
        ])
    }

    fn ids(store: &EditorStore) -> Vec<String> {
        store.tree().blocks().iter().map(|n| n.id.to_string()).collect()
    }

    #[test]
    fn test_script_parses_mutations_and_controls() {
        let script = r#"[
            { "op": "move_down", "nodeId": "hero" },
            { "op": "undo" },
            { "op": "jump_to", "index": 0 },
            { "op": "delete", "nodeIds": ["text"] }
        ]"#;
        let steps: Vec<Step> = serde_json::from_str(script).unwrap();

        assert_eq!(steps[0], Step::Mutation(Mutation::MoveDown { node_id: BlockId::from("hero") }));
        assert_eq!(steps[1], Step::Control(Control::Undo));
        assert_eq!(steps[2], Step::Control(Control::JumpTo { index: 0 }));
        assert!(matches!(steps[3], Step::Mutation(Mutation::Delete { .. })));
    }

    #[test]
    fn test_run_reports_rejections_and_continues() {
        let mut store = EditorStore::new("home", tree(), &EditorConfig::default());
        let steps = vec![
            Step::Mutation(Mutation::Delete { node_ids: vec![BlockId::from("header")] }),
            Step::Mutation(Mutation::MoveDown { node_id: BlockId::from("hero") }),
            Step::Control(Control::Redo),
        ];

        let report = run(&mut store, steps, false);
        assert_eq!(report.applied, 1);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].0, 0);
        assert_eq!(ids(&store), vec!["header", "text", "hero"]);
    }

    #[test]
    fn test_strict_stops_at_first_rejection() {
        let mut store = EditorStore::new("home", tree(), &EditorConfig::default());
        let steps = vec![
            Step::Control(Control::Undo),
            Step::Mutation(Mutation::MoveDown { node_id: BlockId::from("hero") }),
        ];

        let report = run(&mut store, steps, true);
        assert_eq!(report.applied, 0);
        assert_eq!(ids(&store), vec!["header", "hero", "text"]);
    }

    #[test]
    fn test_apply_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        PageDocument::draft("home", "Home", tree())
            .save(&dir.path().join("home.json"))
            .unwrap();
        std::fs::write(
            dir.path().join("script.json"),
            r#"[{ "op": "add_below", "targetId": "hero", "kind": "newsletter" }]"#,
        )
        .unwrap();

        let args = ApplyArgs {
            page: PathBuf::from("home.json"),
            script: PathBuf::from("script.json"),
            output: Some(PathBuf::from("out.json")),
            strict: false,
            dry_run: false,
        };
        apply(args, cwd).unwrap();

        let written = PageDocument::load(&dir.path().join("out.json")).unwrap();
        assert_eq!(written.blocks.blocks()[2].kind, BlockKind::Newsletter);
        let original = PageDocument::load(&dir.path().join("home.json")).unwrap();
        assert_eq!(original.blocks.node_count(), 3);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        PageDocument::draft("home", "Home", tree())
            .save(&dir.path().join("home.json"))
            .unwrap();
        std::fs::write(dir.path().join("script.json"), r#"[{ "op": "move_up", "nodeId": "text" }]"#).unwrap();

        let args = ApplyArgs {
            page: PathBuf::from("home.json"),
            script: PathBuf::from("script.json"),
            output: Some(PathBuf::from("out.json")),
            strict: false,
            dry_run: true,
        };
        apply(args, cwd).unwrap();
        assert!(!dir.path().join("out.json").exists());
    }
}
