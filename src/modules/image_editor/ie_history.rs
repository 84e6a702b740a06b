use image::ImageFormat;
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use crate::error::Result;
use crate::modules::image_export::write_image;
use super::ie_main::{Snapshot, SourceInfo, color_mode};

/// Where the cursor sits in the history, used to decide what undo/redo can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// A single snapshot: nothing to undo or redo.
    Start,
    First,
    Last,
    Middle,
}

/// What a history mutation changed. Empty when the call was a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Update {
    pub snapshot_replaced: bool,
    pub size_changed: bool,
    /// The `changed` flag flipped.
    pub saved_state_changed: bool,
    pub path_changed: bool,
}

impl Update {
    pub fn is_empty(&self) -> bool {
        !(self.snapshot_replaced || self.size_changed || self.saved_state_changed || self.path_changed)
    }
}

/// Enabled state of the undo and redo actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionState { pub undo: bool, pub redo: bool }

impl ActionState {
    pub fn from_position(position: Option<Position>) -> Self {
        match position {
            Some(Position::First) => Self { undo: false, redo: true },
            Some(Position::Last) => Self { undo: true, redo: false },
            Some(Position::Middle) => Self { undo: true, redo: true },
            Some(Position::Start) | None => Self::default(),
        }
    }
}

pub type Listener = Box<dyn FnMut(&Update)>;

/// Linear edit history of one document.
///
/// `changes[head]` is the displayed snapshot and `changes[tail]` the one last
/// written to disk. A new edit made after an undo discards everything past
/// `head`; there is no redo tree.
pub struct History {
    changes: Vec<Snapshot>,
    head: usize,
    /// `None` once the saved snapshot has been discarded by branch truncation.
    tail: Option<usize>,
    info: SourceInfo,
    listeners: Vec<Listener>,
}

impl Default for History {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("len", &self.changes.len())
            .field("head", &self.head())
            .field("tail", &self.tail())
            .field("info", &self.info)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl History {
    pub fn new() -> Self {
        Self { changes: Vec::new(), head: 0, tail: None, info: SourceInfo::default(), listeners: Vec::new() }
    }

    /// Registers a callback run after every mutation that changed something.
    pub fn subscribe(&mut self, listener: Listener) { self.listeners.push(listener); }

    pub fn is_empty(&self) -> bool { self.changes.is_empty() }
    pub fn len(&self) -> usize { self.changes.len() }
    pub fn snapshots(&self) -> &[Snapshot] { &self.changes }
    pub fn info(&self) -> &SourceInfo { &self.info }
    pub fn head(&self) -> Option<usize> { if self.is_empty() { None } else { Some(self.head) } }
    pub fn tail(&self) -> Option<usize> { if self.is_empty() { None } else { self.tail } }
    pub fn current(&self) -> Option<&Snapshot> { self.changes.get(self.head) }

    pub fn changed(&self) -> bool { !self.is_empty() && self.tail != Some(self.head) }

    /// True while the document has never been written during its lifetime.
    // A saved snapshot lost to branch truncation (`tail == None`) is not a
    // first save: the document has a file, so plain save writes in place.
    pub fn first_save(&self) -> bool { self.tail() == Some(0) }

    pub fn position(&self) -> Option<Position> {
        let last: usize = self.changes.len().checked_sub(1)?;
        Some(match (self.head == 0, self.head == last) {
            (true, true) => Position::Start,
            (true, false) => Position::First,
            (false, true) => Position::Last,
            (false, false) => Position::Middle,
        })
    }

    pub fn actions(&self) -> ActionState { ActionState::from_position(self.position()) }

    /// Starts a new document lifetime from a freshly opened image.
    ///
    /// `format` is the format detected while decoding; when absent it is
    /// inferred from the path's extension.
    pub fn new_document(&mut self, snapshot: Snapshot, path: &Path, format: Option<ImageFormat>) -> Update {
        let was_changed: bool = self.changed();
        let path_changed: bool = self.info.path != path;

        self.changes.clear();
        self.changes.push(snapshot);
        self.head = 0; self.tail = Some(0);

        let current: &Snapshot = &self.changes[0];
        let size_changed: bool = self.info.set_size(current);
        self.info.mode = current.mode().to_string();
        self.info.set_path(path, format);
        info!("opened {} ({}, {})", path.display(), self.info.size, self.info.mode);

        self.notify(Update { snapshot_replaced: true, size_changed, saved_state_changed: was_changed, path_changed })
    }

    /// Appends an edit, discarding any redo snapshots past the cursor.
    pub fn add(&mut self, snapshot: Snapshot) -> Update {
        if self.is_empty() { warn!("edit ignored: no document is open"); return Update::default(); }
        let was_changed: bool = self.changed();

        let last: usize = self.changes.len() - 1;
        if self.head != last {
            self.changes.truncate(self.head + 1);
            if self.tail.is_some_and(|t| t > self.head) { self.tail = None; }
            debug!("discarded {} redo snapshot(s)", last - self.head);
        }
        self.changes.push(snapshot);
        self.head = self.changes.len() - 1;
        debug!("add: head={} len={}", self.head, self.changes.len());

        self.moved(was_changed)
    }

    pub fn undo(&mut self) -> Update {
        if self.is_empty() || self.head == 0 { return Update::default(); }
        let was_changed: bool = self.changed();
        self.head -= 1;
        debug!("undo: head={}", self.head);
        self.moved(was_changed)
    }

    pub fn redo(&mut self) -> Update {
        if self.is_empty() || self.head == self.changes.len() - 1 { return Update::default(); }
        let was_changed: bool = self.changed();
        self.head += 1;
        debug!("redo: head={}", self.head);
        self.moved(was_changed)
    }

    /// Writes the current snapshot and marks it as saved.
    ///
    /// With `path` this is "save as": the file is written there, the format
    /// follows its extension, and the path fields of [`SourceInfo`] move to
    /// it. Without, the image is written back to the document's own path in
    /// its original format. The saved marker only moves once the write
    /// succeeded.
    pub fn save(&mut self, path: Option<&Path>) -> Result<Update> {
        let snapshot: Snapshot = match self.current() {
            Some(s) => s.clone(),
            None => { warn!("save ignored: no document is open"); return Ok(Update::default()); }
        };
        let was_changed: bool = self.changed();

        let path_changed: bool = match path {
            Some(target) => {
                let written = write_image(&snapshot, target, None)?;
                let path_changed: bool = self.info.path != target;
                self.info.set_path(target, None);
                self.info.mode = color_mode(written).to_string();
                path_changed
            }
            None => {
                let target: PathBuf = self.info.path.clone();
                write_image(&snapshot, &target, self.info.format)?;
                false
            }
        };

        self.tail = Some(self.head);
        info!("saved {} at history index {}", self.info.path.display(), self.head);
        Ok(self.notify(Update { snapshot_replaced: false, size_changed: false, saved_state_changed: was_changed, path_changed }))
    }

    fn moved(&mut self, was_changed: bool) -> Update {
        let current: Snapshot = self.changes[self.head].clone();
        let size_changed: bool = self.info.set_size(&current);
        let saved_state_changed: bool = was_changed != self.changed();
        self.notify(Update { snapshot_replaced: true, size_changed, saved_state_changed, path_changed: false })
    }

    fn notify(&mut self, update: Update) -> Update {
        if !update.is_empty() {
            for listener in &mut self.listeners { listener(&update); }
        }
        update
    }
}
