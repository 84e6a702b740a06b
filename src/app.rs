use log::{info, warn};
use std::path::{Path, PathBuf};
use crate::error::Result;
use crate::modules::EditorModule;
use crate::modules::image_editor::{
    ActionState, Filter, History, Listener, Snapshot, Transform, Update, ZoomState,
    SUPPORTED_MODES, WINDOW_TITLE, resize,
};
use crate::modules::image_export::{ensure_extension, is_read_only_format, is_writable_format, open_image};
use crate::modules::settings::EditorSettings;

/// Which save action the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveRequest { Save, SaveAs }

/// What the shell should do in response to a [`SaveRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAction {
    /// Nothing to write.
    Skip,
    SaveInPlace,
    /// Ask for a target path, then call [`Editor::save_as`].
    PromptSaveAs,
}

/// Headless editor session: one document's history plus the user settings and
/// view state the window shell reads back after every action.
pub struct Editor {
    history: History,
    settings: EditorSettings,
    zoom: ZoomState,
}

impl Default for Editor {
    fn default() -> Self { Self::new(EditorSettings::default()) }
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        Self { history: History::new(), settings, zoom: ZoomState::default() }
    }

    pub fn with_saved_settings() -> Self { Self::new(EditorSettings::load()) }

    pub fn history(&self) -> &History { &self.history }
    pub fn settings(&self) -> &EditorSettings { &self.settings }
    pub fn settings_mut(&mut self) -> &mut EditorSettings { &mut self.settings }
    pub fn zoom(&self) -> &ZoomState { &self.zoom }
    pub fn zoom_mut(&mut self) -> &mut ZoomState { &mut self.zoom }
    pub fn subscribe(&mut self, listener: Listener) { self.history.subscribe(listener); }

    pub fn open(&mut self, path: &Path) -> Result<Update> {
        let opened = open_image(path)?;
        let update: Update = self.history.new_document(opened.snapshot, path, opened.format);
        let location: PathBuf = self.history.info().location.clone();
        self.settings.remember_location(&location);
        Ok(update)
    }

    pub fn save_action(&self, request: SaveRequest) -> SaveAction {
        if self.history.is_empty() { return SaveAction::Skip; }
        match request {
            SaveRequest::SaveAs => SaveAction::PromptSaveAs,
            SaveRequest::Save if !self.history.changed() => SaveAction::Skip,
            SaveRequest::Save if self.history.first_save() => SaveAction::PromptSaveAs,
            SaveRequest::Save => SaveAction::SaveInPlace,
        }
    }

    /// Writes the document back to its own file.
    pub fn save(&mut self) -> Result<Update> {
        let update: Update = self.history.save(None)?;
        self.remember_document_location();
        Ok(update)
    }

    /// Writes the document to `path`, adding the document's extension when
    /// the chosen name lacks it.
    pub fn save_as(&mut self, path: &Path) -> Result<Update> {
        let target: PathBuf = ensure_extension(path, &self.history.info().extension);
        let update: Update = self.history.save(Some(target.as_path()))?;
        self.remember_document_location();
        Ok(update)
    }

    pub fn apply_filter(&mut self, filter: Filter) -> Result<Update> {
        let Some(current) = self.editable() else { return Ok(Update::default()); };
        let result: Snapshot = filter.apply(&current)?;
        Ok(self.history.add(result))
    }

    pub fn apply_transform(&mut self, transform: Transform) -> Result<Update> {
        let Some(current) = self.editable() else { return Ok(Update::default()); };
        let result: Snapshot = transform.apply(&current)?;
        Ok(self.history.add(result))
    }

    /// Resizing to the current dimensions records nothing.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<Update> {
        let Some(current) = self.editable() else { return Ok(Update::default()); };
        if current.dimensions() == (width, height) { return Ok(Update::default()); }
        let result: Snapshot = resize(&current, width, height)?;
        Ok(self.history.add(result))
    }

    pub fn undo(&mut self) -> Update { self.history.undo() }
    pub fn redo(&mut self) -> Update { self.history.redo() }
    pub fn actions(&self) -> ActionState { self.history.actions() }

    /// Saveable format and an editable color mode.
    pub fn writable(&self) -> bool {
        let info = self.history.info();
        is_writable_format(info.format) && SUPPORTED_MODES.contains(&info.mode.as_str())
    }

    /// Opening another file or quitting would lose edits.
    pub fn needs_discard_confirmation(&self) -> bool { self.history.changed() }

    pub fn title(&self) -> String {
        if self.history.is_empty() { return WINDOW_TITLE.to_string(); }
        let info = self.history.info();
        let mut text: String = if self.settings.config.file_path_in_title { info.path.display().to_string() }
            else { info.name_with_extension.clone() };
        if self.history.changed() { text.push('*'); }
        if !self.writable() { text.push_str(" (Read-only)"); }
        format!("{} – {}", WINDOW_TITLE, text)
    }

    /// Status-bar text: pixel size and zoom percentage.
    pub fn size_label(&self) -> String { self.zoom.label(&self.history.info().size) }

    /// Re-derives the zoom after the displayed image changed.
    pub fn refresh_view(&mut self, view: (f32, f32)) {
        let scene: (f32, f32) = self.scene_size();
        self.zoom.reset_for(scene, view, self.settings.config.auto_fit_in_view);
    }

    pub fn toggle_fit(&mut self, view: (f32, f32)) {
        let scene: (f32, f32) = self.scene_size();
        self.zoom.toggle_fit(scene, view);
    }

    fn scene_size(&self) -> (f32, f32) {
        let info = self.history.info();
        (info.width as f32, info.height as f32)
    }

    fn editable(&self) -> Option<Snapshot> {
        let current: Snapshot = self.history.current()?.clone();
        let info = self.history.info();
        if is_read_only_format(info.format) {
            warn!("edit ignored: {} files are read-only", info.format_name);
            return None;
        }
        if !is_writable_format(info.format) {
            warn!("edit ignored: {} has no writable format", info.name_with_extension);
            return None;
        }
        Some(current)
    }

    fn remember_document_location(&mut self) {
        if self.history.is_empty() { return; }
        let location: PathBuf = self.history.info().location.clone();
        info!("remembering location {}", location.display());
        self.settings.remember_location(&location);
    }
}

impl EditorModule for Editor {
    fn save(&mut self) -> Result<()> { Editor::save(self).map(|_| ()) }
    fn save_as(&mut self, path: &Path) -> Result<()> { Editor::save_as(self, path).map(|_| ()) }
    fn get_title(&self) -> String { self.title() }
    fn is_dirty(&self) -> bool { self.history.changed() }
}
