use std::path::Path;
use crate::error::Result;

pub mod image_editor;
pub mod image_export;
pub mod settings;

/// Operations every open document exposes to the window shell.
pub trait EditorModule {
    fn save(&mut self) -> Result<()>;
    fn save_as(&mut self, path: &Path) -> Result<()>;
    fn get_title(&self) -> String;
    fn is_dirty(&self) -> bool;
}
