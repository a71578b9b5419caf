mod app;
mod components;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::{AppSettings, EXPORT_DIR_VAR, EXPORT_HEADER_VAR, LOG_VAR};
use crate::state::export::ExportWorker;
use crate::state::messages::{ExportRequest, ExportResponse, UiEvent};
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_cli_args(std::env::args().skip(1)) {
        CliAction::Run => {}
        CliAction::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        CliAction::Version => {
            println!("bracketui {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        CliAction::Unknown(arg) => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }

    better_panic::install();

    let settings = AppSettings::load();
    tui_logger::init_logger(settings.log_level)?;
    tui_logger::set_default_level(settings.log_level);

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    info!("bracketui {} started", env!("CARGO_PKG_VERSION"));
    let app = Arc::new(Mutex::new(App::with_settings(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (export_req_tx, export_req_rx) = mpsc::channel::<ExportRequest>(8);
    let (export_resp_tx, export_resp_rx) = mpsc::channel::<ExportResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Export thread
    let export_worker = ExportWorker::new(export_req_rx, export_resp_tx);
    let export_task = tokio::spawn(export_worker.run());

    // First frame
    let _ = ui_event_tx.send(UiEvent::Resize).await;

    main_ui_loop(terminal, app, ui_event_rx, export_req_tx, export_resp_rx).await;

    input_handler.abort();
    export_task.abort();
    cleanup_terminal();

    Ok(())
}

#[derive(Debug, PartialEq)]
enum CliAction {
    Run,
    Help,
    Version,
    Unknown(String),
}

fn parse_cli_args(mut args: impl Iterator<Item = String>) -> CliAction {
    let Some(arg) = args.next() else {
        return CliAction::Run;
    };

    match arg.as_str() {
        "-h" | "--help" => CliAction::Help,
        "-V" | "--version" => CliAction::Version,
        _ => CliAction::Unknown(arg),
    }
}

fn usage_text() -> String {
    format!(
        "bracketui - single-elimination tournament bracket builder

Usage:
  bracketui
  bracketui --help
  bracketui --version

Environment:
  {EXPORT_DIR_VAR}      Directory exports are written to (default .)
  {EXPORT_HEADER_VAR}   Text file placed at the top of every export
  {LOG_VAR}             Log level: error, warn, info, debug, trace (default info)"
    )
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    export_requests: mpsc::Sender<ExportRequest>,
    mut export_responses: mpsc::Receiver<ExportResponse>,
) {
    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                handle_ui_event(ui_event, &app, &export_requests).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard);
            }

            Some(response) = export_responses.recv() => {
                handle_export_response(response, &app).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard);
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    export_requests: &mpsc::Sender<ExportRequest>,
) {
    match ui_event {
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, export_requests).await;
        }
        UiEvent::Resize => {}
    }
}

async fn handle_export_response(response: ExportResponse, app: &Arc<Mutex<App>>) {
    let mut guard = app.lock().await;
    match response {
        ExportResponse::LoadingStateChanged { loading_state } => {
            guard.on_export_loading(loading_state);
        }
        ExportResponse::Finished { capture_path, data_path } => {
            guard.on_export_finished(&capture_path, &data_path);
        }
        ExportResponse::Error { message } => {
            error!("Export error: {message}");
            guard.on_export_failed(message);
        }
    }
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                error!("input error: {e}");
                continue;
            }
            Err(_) => break,
        };
        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

/// Best effort: also runs from the panic hook, where there is nobody to
/// report a failure to.
pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        parse_cli_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn no_arguments_runs_the_ui() {
        assert_eq!(parse(&[]), CliAction::Run);
    }

    #[test]
    fn help_and_version_flags() {
        assert_eq!(parse(&["--help"]), CliAction::Help);
        assert_eq!(parse(&["-h"]), CliAction::Help);
        assert_eq!(parse(&["--version"]), CliAction::Version);
        assert_eq!(parse(&["-V"]), CliAction::Version);
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert_eq!(parse(&["--players"]), CliAction::Unknown("--players".to_string()));
    }

    #[test]
    fn usage_lists_every_setting() {
        let usage = usage_text();
        for var in [EXPORT_DIR_VAR, EXPORT_HEADER_VAR, LOG_VAR] {
            assert!(usage.contains(var), "{var} missing from usage");
        }
    }
}
