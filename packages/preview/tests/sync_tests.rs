//! End-to-end: editor store ⇄ isolated preview over a tokio channel

use std::collections::HashMap;

use storefront_blocks::{BlockId, BlockKind, BlockNode, BlockTree};
use storefront_editor::{DragController, EditorConfig, EditorStore, Point, PreviewMode, Rect};
use storefront_preview::{
    CommandOutcome, ConnectionState, MessageType, MpscTransport, PreviewMessage, PreviewSync,
};

const ORIGIN: &str = "http://localhost:3000";

fn store() -> EditorStore {
    let tree = BlockTree::new(vec![
        BlockNode::new("header", BlockKind::Header),
        BlockNode::new("hero", BlockKind::Hero),
        BlockNode::new("grid", BlockKind::ProductGrid),
    ]);
    EditorStore::new("home", tree, &EditorConfig::default())
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<String>) -> Vec<PreviewMessage> {
    let mut messages = Vec::new();
    while let Ok(text) = rx.try_recv() {
        messages.push(serde_json::from_str(&text).unwrap());
    }
    messages
}

#[tokio::test]
async fn test_drag_commit_reaches_isolated_preview() -> anyhow::Result<()> {
    let mut store = store();
    let (transport, mut rx) = MpscTransport::connected(8);
    let mut sync = PreviewSync::isolated(transport, ORIGIN);
    assert_eq!(sync.mode(), PreviewMode::Isolated);

    sync.publish(&store);
    assert_eq!(drain(&mut rx).len(), 1);

    let geometry = HashMap::from([(BlockId::from("grid"), Rect::new(0.0, 400.0, 800.0, 200.0))]);
    let mut drag = DragController::new();
    drag.begin(&store, &BlockId::from("hero"))?;
    drag.hover(&BlockId::from("grid"), Point::new(5.0, 590.0), &geometry);
    drag.end(&mut store);

    sync.publish(&store);
    let messages = drain(&mut rx);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_type, MessageType::BlocksUpdate);
    assert_eq!(messages[0].payload["blocks"][2]["id"], "hero");
    Ok(())
}

#[tokio::test]
async fn test_preview_torn_down_and_reattached() -> anyhow::Result<()> {
    let mut store = store();
    let (transport, rx) = MpscTransport::connected(8);
    let mut sync = PreviewSync::isolated(transport, ORIGIN);
    drop(rx);

    store.select(&BlockId::from("hero"));
    sync.publish(&store);
    assert_eq!(sync.connection(), ConnectionState::Disconnected);

    // Preview reloads on a fresh channel and announces itself
    let (tx, mut rx) = tokio::sync::mpsc::channel(8);
    if let Some(channel) = sync.channel_mut() {
        channel.transport_mut().attach(tx);
    }
    let ready = r#"{"type":"PREVIEW_READY","source":"preview"}"#;
    assert_eq!(sync.handle_inbound(ready, ORIGIN, &mut store), Some(CommandOutcome::Ready));
    assert_eq!(sync.connection(), ConnectionState::Connected);

    let types: Vec<_> = drain(&mut rx).into_iter().map(|m| m.message_type).collect();
    assert_eq!(
        types,
        vec![MessageType::SelectBlock, MessageType::BlocksUpdate, MessageType::SelectBlock]
    );
    Ok(())
}

#[tokio::test]
async fn test_preview_click_selects_in_editor() {
    let mut store = store();
    let (transport, mut rx) = MpscTransport::connected(8);
    let mut sync = PreviewSync::isolated(transport, ORIGIN);
    sync.publish(&store);
    drain(&mut rx);

    let click = r#"{"type":"PREVIEW_CLICK","source":"preview","payload":{"blockId":"grid"}}"#;
    assert_eq!(
        sync.handle_inbound(click, ORIGIN, &mut store),
        Some(CommandOutcome::SelectionChanged)
    );
    assert_eq!(store.selection().ids(), &[BlockId::from("grid")]);

    let messages = drain(&mut rx);
    assert_eq!(messages[0].message_type, MessageType::SelectBlock);
    assert_eq!(messages[0].payload["blockId"], "grid");
}
