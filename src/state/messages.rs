use crate::state::export::LoadingState;
use bracket_core::{CaptureGuard, Match};
use crossterm::event::KeyEvent;
use std::path::PathBuf;

/// A frozen bracket on its way to disk. Holds the capture guard, so the
/// session stays read-only exactly as long as the request is alive.
#[derive(Debug)]
pub struct ExportRequest {
    pub guard: CaptureGuard,
    /// Rendered bracket, one string per terminal row.
    pub capture: Vec<String>,
    pub matches: Vec<Match>,
    pub champion: Option<String>,
    pub dir: PathBuf,
    pub header: Option<PathBuf>,
    pub file_stem: String,
}

#[derive(Debug)]
pub enum ExportResponse {
    LoadingStateChanged { loading_state: LoadingState },
    Finished { capture_path: PathBuf, data_path: PathBuf },
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
}
