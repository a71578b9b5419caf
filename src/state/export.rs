use crate::state::messages::{ExportRequest, ExportResponse};
use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

#[derive(Debug)]
pub enum ExportError {
    Unsupported(String),
    Io(std::io::Error, PathBuf),
    Serialize(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Unsupported(reason) => write!(f, "Export unavailable: {reason}"),
            ExportError::Io(e, path) => write!(f, "Export failed for {}: {e}", path.display()),
            ExportError::Serialize(e) => write!(f, "Export failed to encode matches: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Box-drawing glyphs only survive the capture on a UTF-8 locale.
///
/// Locale variables are checked in POSIX precedence order; the first
/// non-empty one decides.
pub fn capture_supported(lookup: impl Fn(&str) -> Option<String>) -> Result<(), ExportError> {
    if cfg!(windows) {
        return Ok(());
    }
    let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
        .into_iter()
        .find_map(|key| lookup(key).filter(|v| !v.trim().is_empty()));
    match locale {
        Some(value) if is_utf8_locale(&value) => Ok(()),
        Some(value) => Err(ExportError::Unsupported(format!(
            "locale {value} cannot represent the bracket lines, switch to a UTF-8 locale"
        ))),
        None => Err(ExportError::Unsupported(
            "no locale set, switch to a UTF-8 locale".to_string(),
        )),
    }
}

fn is_utf8_locale(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.contains("utf-8") || lower.contains("utf8")
}

pub fn file_stem(now: DateTime<Local>) -> String {
    format!("bracket-{}", now.format("%Y%m%d-%H%M%S"))
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

pub struct ExportWorker {
    requests: mpsc::Receiver<ExportRequest>,
    responses: mpsc::Sender<ExportResponse>,
    is_loading: Arc<AtomicBool>,
}

impl ExportWorker {
    pub fn new(
        requests: mpsc::Receiver<ExportRequest>,
        responses: mpsc::Sender<ExportResponse>,
    ) -> Self {
        Self {
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            self.start_loading_animation().await;

            let result = write_export(request).await;

            debug!("export request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = match result {
                Ok((capture_path, data_path)) => {
                    info!("bracket exported to {}", capture_path.display());
                    ExportResponse::Finished { capture_path, data_path }
                }
                Err(err) => {
                    error!("{err}");
                    ExportResponse::Error { message: err.to_string() }
                }
            };

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send export response: {e}");
                break;
            }
        }
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(ExportResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(ExportResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(ExportResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}

/// Write the capture (`<stem>.txt`) and the match list (`<stem>.json`).
///
/// The capture guard inside the request is released when this returns,
/// on success and on every error path.
pub async fn write_export(request: ExportRequest) -> Result<(PathBuf, PathBuf), ExportError> {
    let ExportRequest {
        guard,
        capture,
        matches,
        champion,
        dir,
        header,
        file_stem,
    } = request;

    let header_text = match header {
        Some(path) => load_header(&path).await,
        None => None,
    };
    let document = render_document(header_text.as_deref(), champion.as_deref(), &capture);

    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ExportError::Io(e, dir.clone()))?;

    let capture_path = dir.join(format!("{file_stem}.txt"));
    tokio::fs::write(&capture_path, document)
        .await
        .map_err(|e| ExportError::Io(e, capture_path.clone()))?;

    let data = serde_json::to_string_pretty(&matches).map_err(ExportError::Serialize)?;
    let data_path = dir.join(format!("{file_stem}.json"));
    tokio::fs::write(&data_path, data)
        .await
        .map_err(|e| ExportError::Io(e, data_path.clone()))?;

    drop(guard);
    Ok((capture_path, data_path))
}

/// A missing or unreadable header only costs the banner, not the export.
async fn load_header(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("export header {} unavailable, continuing without it: {e}", path.display());
            None
        }
    }
}

fn render_document(header: Option<&str>, champion: Option<&str>, capture: &[String]) -> String {
    let mut out = String::new();
    if let Some(header) = header {
        out.push_str(header.trim_end());
        out.push_str("\n\n");
    }
    if let Some(champion) = champion {
        out.push_str(&format!("Champion: {champion}\n\n"));
    }
    for line in capture {
        out.push_str(line);
        out.push('\n');
    }
    out
}
