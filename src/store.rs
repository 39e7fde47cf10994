use tracing::debug;

use crate::{
    engine::{self, Draft, IdGen},
    error::SwingmarkResult,
    geom::{DEFAULT_HIT_TOLERANCE, NormPoint},
    history::{DEFAULT_DEPTH, History},
    model::{Annotation, AnnotationPatch, Shape, Style, StylePatch, Tool},
};

/// Store tunables. The paused-commit window and hit tolerance are policy
/// knobs, not constants baked into the engine.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Undo depth; oldest snapshots are evicted FIFO past this.
    pub history_depth: usize,
    /// Visibility window granted to a stroke committed while playback is
    /// paused: `t_end = start_time + paused_window_secs`.
    pub paused_window_secs: f64,
    /// Normalized hit-test tolerance (fraction of the frame).
    pub hit_tolerance: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_DEPTH,
            paused_window_secs: 5.0,
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
        }
    }
}

/// Per-tick playback state read from the host video element. The store never
/// reads or controls playback itself.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlaybackClock {
    pub current_time: f64, // seconds
    pub is_playing: bool,
}

/// Single source of truth for annotations, tool/style selection and undo.
/// Explicitly constructed and injected; there is deliberately no global
/// instance. One store owns one annotation collection.
#[derive(Debug)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    current_tool: Tool,
    current_style: Style,
    selected_id: Option<String>,
    history: History<Vec<Annotation>>,
    draft: Option<Draft>,
    config: StoreConfig,
    ids: IdGen,
}

impl AnnotationStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            annotations: Vec::new(),
            current_tool: Tool::Select,
            current_style: Style::default(),
            selected_id: None,
            history: History::with_depth(Vec::new(), config.history_depth),
            draft: None,
            config,
            ids: IdGen::new(),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn current_tool(&self) -> Tool {
        self.current_tool
    }

    pub fn current_style(&self) -> &Style {
        &self.current_style
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Switching tools deselects (stale selection must not highlight while
    /// drawing) and discards any in-flight draft: tool switching mid-drag is
    /// not a supported gesture, so the draft is dropped rather than committed.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.draft.take().is_some() {
            debug!(?tool, "discarding in-flight draft on tool switch");
        }
        self.selected_id = None;
        self.current_tool = tool;
    }

    /// Merges into the current style only. Committed annotations keep the
    /// style snapshot they were committed with.
    pub fn set_style(&mut self, patch: StylePatch) {
        self.current_style.merge(patch);
    }

    // Every mutation snapshots the pre-mutation collection before applying,
    // and clears redo. `history.push` receives the post-state and retires the
    // pre-state into `past`, which keeps that ordering correct by construction.
    fn commit_collection(&mut self, next: Vec<Annotation>) {
        self.history.push(next.clone());
        self.annotations = next;
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        debug!(id = %annotation.id, shape = ?annotation.shape, "add annotation");
        let mut next = self.annotations.clone();
        next.push(annotation);
        self.commit_collection(next);
    }

    /// Shallow-merges `patch` into the matching annotation. A missing id is
    /// tolerated (stale references race with deletions in UI flows) but a
    /// history entry is still pushed, matching long-standing behavior some
    /// callers may rely on for checkpointing.
    pub fn update_annotation(&mut self, id: &str, patch: AnnotationPatch) {
        let mut next = self.annotations.clone();
        if let Some(ann) = next.iter_mut().find(|ann| ann.id == id) {
            ann.apply(patch);
        } else {
            debug!(id, "update for unknown annotation id");
        }
        self.commit_collection(next);
    }

    /// Removes the annotation, if present; unknown ids are a tolerated no-op
    /// mutation. Clears the selection when it pointed at the removed id.
    pub fn delete_annotation(&mut self, id: &str) {
        debug!(id, "delete annotation");
        let mut next = self.annotations.clone();
        next.retain(|ann| ann.id != id);
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        self.commit_collection(next);
    }

    /// Deletes the currently selected annotation. Returns whether anything
    /// was selected.
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_id.clone() else {
            return false;
        };
        self.delete_annotation(&id);
        true
    }

    /// Selection is transient UI state, not an undoable edit: no history push.
    pub fn select_annotation(&mut self, id: Option<&str>) {
        self.selected_id = id.map(str::to_owned);
    }

    pub fn clear_annotations(&mut self) {
        debug!(count = self.annotations.len(), "clear annotations");
        self.selected_id = None;
        self.commit_collection(Vec::new());
    }

    /// Annotations visible at `t` (inclusive window), in insertion order.
    pub fn annotations_at(&self, t: f64) -> impl Iterator<Item = &Annotation> {
        engine::visible_at(&self.annotations, t)
    }

    /// Topmost annotation under `pt` at the configured tolerance.
    pub fn hit_test(&self, pt: NormPoint) -> Option<&str> {
        engine::hit_test(&self.annotations, pt, self.config.hit_tolerance)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Boundary no-op. Clears the selection either way: the restored
    /// collection may no longer contain the selected id.
    pub fn undo(&mut self) -> bool {
        if !self.history.undo() {
            return false;
        }
        self.annotations = self.history.present().clone();
        self.selected_id = None;
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo() {
            return false;
        }
        self.annotations = self.history.present().clone();
        self.selected_id = None;
        true
    }

    /// Starts a drawing gesture at `pt`/`t`. Ignored while the select tool is
    /// active. A draft already in flight is stale (its pointer-up was never
    /// delivered) and gets discarded.
    pub fn begin_stroke(&mut self, pt: NormPoint, t: f64) {
        let Tool::Draw(shape) = self.current_tool else {
            return;
        };
        if self.draft.take().is_some() {
            debug!("discarding stale draft on new stroke");
        }
        self.draft = Some(Draft::begin(shape, pt, t, self.current_style.clone()));
    }

    pub fn move_stroke(&mut self, pt: NormPoint) {
        if let Some(draft) = self.draft.as_mut() {
            draft.drag_to(pt);
        }
    }

    /// Ends the gesture. Two-point shapes with no effective movement are
    /// abandoned silently (no annotation, no history entry); a dot always
    /// commits. The visibility window ends at the pointer-up time while
    /// playing, or `start_time + paused_window_secs` while paused, so pausing
    /// to annotate still yields a usable window.
    pub fn end_stroke(&mut self, pt: NormPoint, clock: PlaybackClock) -> Option<String> {
        let mut draft = self.draft.take()?;
        draft.drag_to(pt);
        if draft.shape != Shape::Dot && !draft.has_moved() {
            return None;
        }
        let t_end = if clock.is_playing {
            clock.current_time
        } else {
            draft.start_time + self.config.paused_window_secs
        };
        let annotation = draft.commit(t_end, self.ids.next_id());
        let id = annotation.id.clone();
        self.add_annotation(annotation);
        Some(id)
    }

    /// Pointer-leave abandon: the draft is dropped with no trace.
    pub fn cancel_stroke(&mut self) {
        self.draft = None;
    }

    /// Replaces the collection wholesale (session restore). Annotations are
    /// validated structurally; history restarts empty, since restore does not
    /// replay undo history.
    pub fn restore(&mut self, annotations: Vec<Annotation>) -> SwingmarkResult<()> {
        for ann in &annotations {
            ann.validate()?;
        }
        self.history.reset(annotations.clone());
        self.annotations = annotations;
        self.selected_id = None;
        self.draft = None;
        Ok(())
    }
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
