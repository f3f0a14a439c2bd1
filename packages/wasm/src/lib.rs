//! Browser bindings for the page editor.
//!
//! The host owns the DOM: it reports pointer positions and element bounds,
//! and re-renders from `toJson()` / `selection()` after each call that
//! returns a change. All structured values cross the boundary as JSON text.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::json;
use wasm_bindgen::prelude::*;

use storefront_blocks::{BlockId, PageDocument};
use storefront_editor::{
    resolve_position, AutoScroller, Commit, DragController, DragOutcome,
    DropPosition, EditorConfig, EditorStore, Mutation, Point, Rect, ScrollTarget,
};

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Scroll requested by auto-scroll frames, drained by the host
#[derive(Default)]
struct PendingScroll(Mutex<f32>);

impl PendingScroll {
    fn take(&self) -> f32 {
        let mut pending = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *pending)
    }
}

impl ScrollTarget for PendingScroll {
    fn scroll_by(&self, dy: f32) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) += dy;
    }
}

#[wasm_bindgen]
pub struct WasmEditor {
    document: PageDocument,
    store: EditorStore,
    drag: DragController,
    bounds: HashMap<BlockId, Rect>,
    scroll: Arc<PendingScroll>,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Open a page document. `config` is an optional editor config JSON.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(page: &str, config: Option<String>) -> Result<WasmEditor, JsValue> {
        let document = PageDocument::from_json(page)
            .map_err(|e| JsValue::from_str(&format!("Page error: {}", e)))?;
        let config = match config {
            Some(source) => EditorConfig::from_json(&source)
                .map_err(|e| JsValue::from_str(&format!("Config error: {}", e)))?,
            None => EditorConfig::default(),
        };
        Ok(Self::open(document, &config))
    }

    /// The page document with the live tree
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.store.to_document(&self.document)).map_err(serialization_error)
    }

    #[wasm_bindgen(getter)]
    pub fn revision(&self) -> f64 {
        self.store.revision() as f64
    }

    #[wasm_bindgen(js_name = isDirty)]
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    #[wasm_bindgen(js_name = markSaved)]
    pub fn mark_saved(&mut self) {
        self.store.mark_saved();
    }

    /// Apply one mutation (`{"op": "...", ...}`). Returns the commit as
    /// JSON, or throws with the rejection reason.
    pub fn dispatch(&mut self, mutation: &str) -> Result<String, JsValue> {
        let mutation: Mutation = serde_json::from_str(mutation)
            .map_err(|e| JsValue::from_str(&format!("Invalid mutation: {}", e)))?;
        let commit = self
            .store
            .dispatch(mutation)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(commit_json(&commit))
    }

    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    #[wasm_bindgen(js_name = jumpTo)]
    pub fn jump_to(&mut self, index: usize) -> bool {
        self.store.jump_to(index)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.store.history().can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.store.history().can_redo()
    }

    /// History panel entries as JSON
    pub fn history(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.store.history_items()).map_err(serialization_error)
    }

    //
    // Selection
    //

    pub fn select(&mut self, id: &str) -> bool {
        self.store.select(&BlockId::from(id))
    }

    #[wasm_bindgen(js_name = selectAdd)]
    pub fn select_add(&mut self, id: &str) -> bool {
        self.store.select_add(&BlockId::from(id))
    }

    #[wasm_bindgen(js_name = selectToggle)]
    pub fn select_toggle(&mut self, id: &str) -> bool {
        self.store.select_toggle(&BlockId::from(id))
    }

    #[wasm_bindgen(js_name = selectRange)]
    pub fn select_range(&mut self, anchor: &str, target: &str) -> bool {
        self.store
            .select_range(&BlockId::from(anchor), &BlockId::from(target))
    }

    #[wasm_bindgen(js_name = selectExtend)]
    pub fn select_extend(&mut self, target: &str) -> bool {
        self.store.select_extend(&BlockId::from(target))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    /// Selected ids, in selection order
    pub fn selection(&self) -> Vec<String> {
        self.store
            .selection()
            .ids()
            .iter()
            .map(|id| id.to_string())
            .collect()
    }

    //
    // Drop validation
    //

    #[wasm_bindgen(js_name = canDrop)]
    pub fn can_drop(&self, dragged: &str, target: &str, position: &str) -> bool {
        parse_position(position).is_some_and(|position| {
            self.store
                .can_drop(&BlockId::from(dragged), &BlockId::from(target), position)
        })
    }

    //
    // Drag gesture
    //

    /// Record an element's bounding box for hover resolution.
    #[wasm_bindgen(js_name = setBounds)]
    pub fn set_bounds(&mut self, id: &str, x: f32, y: f32, width: f32, height: f32) {
        self.bounds
            .insert(BlockId::from(id), Rect::new(x, y, width, height));
    }

    #[wasm_bindgen(js_name = clearBounds)]
    pub fn clear_bounds(&mut self) {
        self.bounds.clear();
    }

    /// Start dragging `id`; returns every id being dragged.
    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, id: &str) -> Result<Vec<String>, JsValue> {
        let dragged = self
            .drag
            .begin(&self.store, &BlockId::from(id))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(dragged.iter().map(|id| id.to_string()).collect())
    }

    /// Pointer over `target`. Returns `{"target","position","valid"}` JSON,
    /// or `None` when the target has no recorded bounds.
    #[wasm_bindgen(js_name = dragOver)]
    pub fn drag_over(&mut self, target: &str, pointer_x: f32, pointer_y: f32) -> Option<String> {
        let candidate = self.drag.hover(
            &BlockId::from(target),
            Point::new(pointer_x, pointer_y),
            &self.bounds,
        )?;
        Some(
            json!({
                "target": candidate.target,
                "position": candidate.position,
                "valid": candidate.valid,
            })
            .to_string(),
        )
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&mut self) {
        self.drag.leave();
    }

    /// Feed the pointer to edge auto-scroll; returns px per frame.
    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(
        &mut self,
        pointer_y: f32,
        viewport_top: f32,
        viewport_height: f32,
    ) -> f32 {
        let viewport = Rect::new(0.0, viewport_top, 0.0, viewport_height);
        self.drag.pointer_moved(Point::new(0.0, pointer_y), viewport)
    }

    /// Run one auto-scroll frame (from `requestAnimationFrame`) and return
    /// the distance the host should scroll by.
    #[wasm_bindgen(js_name = scrollFrame)]
    pub fn scroll_frame(&mut self) -> f32 {
        self.drag.scroll_tick();
        self.scroll.take()
    }

    /// Release. Returns the commit JSON, or `None` when nothing changed.
    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self) -> Option<String> {
        match self.drag.end(&mut self.store) {
            DragOutcome::Committed(commit) => Some(commit_json(&commit)),
            DragOutcome::Cancelled(_) => None,
        }
    }

    #[wasm_bindgen(js_name = dragCancel)]
    pub fn drag_cancel(&mut self) {
        self.drag.cancel();
        self.scroll.take();
    }
}

impl WasmEditor {
    fn open(document: PageDocument, config: &EditorConfig) -> Self {
        let scroll = Arc::new(PendingScroll::default());
        let scroller = AutoScroller::new(config.auto_scroll.clone(), scroll.clone());

        Self {
            store: EditorStore::from_document(&document, config),
            document,
            drag: DragController::new().with_auto_scroll(scroller),
            bounds: HashMap::new(),
            scroll,
        }
    }
}

/// Drop position for a pointer over a box: `"before"`, `"after"` or `"inside"`
#[wasm_bindgen(js_name = resolvePosition)]
pub fn resolve_position_js(pointer_y: f32, top: f32, height: f32, is_container: bool) -> String {
    let position = resolve_position(pointer_y, Rect::new(0.0, top, 0.0, height), is_container);
    position_name(position).to_string()
}

fn position_name(position: DropPosition) -> &'static str {
    match position {
        DropPosition::Before => "before",
        DropPosition::After => "after",
        DropPosition::Inside => "inside",
    }
}

fn parse_position(value: &str) -> Option<DropPosition> {
    match value {
        "before" => Some(DropPosition::Before),
        "after" => Some(DropPosition::After),
        "inside" => Some(DropPosition::Inside),
        _ => None,
    }
}

fn commit_json(commit: &Commit) -> String {
    json!({
        "kind": commit.kind,
        "description": commit.description,
        "affected": commit.affected,
        "revision": commit.revision,
    })
    .to_string()
}

fn serialization_error(error: serde_json::Error) -> JsValue {
    JsValue::from_str(&format!("Serialization error: {}", error))
}
