use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::bracket::{BracketGrid, BracketView};
use crate::state::app_state::StatusKind;
use crate::state::export::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use bracket_core::{NodeId, Phase, Slot};

static TABS: &[&str; 2] = &["Players", "Bracket"];

const HELP_LINES: &[(&str, &str)] = &[
    ("Players", ""),
    ("  type + Enter", "add a player"),
    ("  Ctrl-D", "remove the last player"),
    ("  Ctrl-R", "shuffle the player order"),
    ("  Ctrl-S", "start the tournament (2+ players)"),
    ("Bracket", ""),
    ("  ←/→ h/l", "previous / next round"),
    ("  ↑/↓ k/j", "move between matches"),
    ("  1 / 2", "pick top / bottom slot as winner (again to clear)"),
    ("  e / E", "rename top / bottom slot"),
    ("  x", "export the bracket"),
    ("  R", "reset the tournament (y/n to confirm)"),
    ("Anywhere but the name field", ""),
    ("  Tab", "switch Players / Bracket"),
    ("  \"", "toggle the log pane"),
    ("  f", "toggle full screen"),
    ("  ?", "help (Esc to close)"),
    ("  q", "quit"),
    ("  Ctrl-C", "quit, even while typing"),
];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Players => draw_players(f, layout.main, app),
            MenuItem::Bracket => draw_bracket(f, layout.main, app),
            MenuItem::Help => draw_help(f, layout.main),
        }

        draw_status(f, layout.status, app);
        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }
        if app.state.session.reset_pending() {
            draw_reset_confirm(f, f.area());
        }
        draw_loading_spinner(f, f.area(), app, app.state.export);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Players => 0,
        MenuItem::Bracket => 1,
        MenuItem::Help => match app.state.previous_tab {
            MenuItem::Bracket => 1,
            _ => 0,
        },
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_players(f: &mut Frame, area: Rect, app: &App) {
    let session = &app.state.session;
    let started = session.phase() == Phase::Bracket;
    let block = default_border(Color::White).title(format!(" Players ({}) ", session.players().len()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [input_area, legend, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let (input_text, input_color) = if started {
        ("Tournament in progress, press R to reset".to_string(), Color::DarkGray)
    } else {
        (format!("{}_", app.state.entry.input), Color::Yellow)
    };
    f.render_widget(
        Paragraph::new(input_text).block(default_border(input_color).title(" Name ")),
        input_area,
    );

    let start_hint = if session.can_start() {
        Span::styled("Ctrl-S=start", Style::default().fg(Color::Green))
    } else {
        Span::styled("Ctrl-S=start (2+ players)", Style::default().fg(Color::DarkGray))
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                "Enter=add  Ctrl-D=remove last  Ctrl-R=shuffle  ",
                Style::default().fg(Color::DarkGray),
            ),
            start_hint,
        ])),
        legend,
    );

    if session.players().is_empty() {
        f.render_widget(
            Paragraph::new("No players yet")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            list_area,
        );
        return;
    }

    let visible = list_area.height as usize;
    let skip = session.players().len().saturating_sub(visible);
    let lines: Vec<Line> = session
        .players()
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, name)| Line::from(format!("{:>3}. {name}", i + 1)))
        .collect();
    f.render_widget(Paragraph::new(lines), list_area);
}

fn draw_bracket(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Bracket ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let session = &app.state.session;
    if session.phase() == Phase::Entry {
        f.render_widget(
            Paragraph::new("Add players and press Ctrl-S to start")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let [header, key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    let players = session.players().len();
    let header_text = match session.champion() {
        Some(champion) => format!("{players} players | Champion: {champion}"),
        None => format!(
            "{players} players | {} rounds to decide",
            bracket_core::rounds_to_decide(players)
        ),
    };
    f.render_widget(Paragraph::new(header_text), header);

    let read_only = session.is_read_only();
    let legend = if read_only {
        "Exporting... the bracket is read-only"
    } else {
        "Keys: h/l=round  j/k=move  1/2=winner  e/E=edit  x=export  R=reset  ?=help"
    };
    f.render_widget(
        Paragraph::new(legend).style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let projection = session.projection();
    let grid = BracketGrid::compute(&projection, content.width);
    let selected = if read_only { None } else { app.selected_match() };
    let (scroll_x, scroll_y) = grid.scroll_for(selected.map(NodeId::Match), content);

    f.render_widget(
        BracketView {
            matches: session.matches(),
            projection: &projection,
            grid: &grid,
            selected,
            scroll_x,
            scroll_y,
        },
        content,
    );

    if !read_only && let Some(editor) = app.state.editor.as_ref() {
        draw_slot_editor(f, content, editor.slot, &editor.input);
    }
}

fn draw_slot_editor(f: &mut Frame, area: Rect, slot: Slot, input: &str) {
    let title = match slot {
        Slot::P1 => " Rename top slot (Enter=save, Esc=cancel) ",
        Slot::P2 => " Rename bottom slot (Enter=save, Esc=cancel) ",
    };
    let popup = centered(area, 50, 3);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(format!("{input}_")).block(default_border(Color::Yellow).title(title)),
        popup,
    );
}

fn draw_reset_confirm(f: &mut Frame, area: Rect) {
    let popup = centered(area, 44, 5);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(vec![
            Line::from("Discard all players and results?"),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::raw("=reset  "),
                Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw("=keep"),
            ]),
        ])
        .alignment(Alignment::Center)
        .block(default_border(Color::Red).title(" Reset ")),
        popup,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let block = default_border(Color::White).title(" Help ");
    let lines: Vec<Line> = HELP_LINES
        .iter()
        .map(|(key, action)| {
            if action.is_empty() {
                Line::from(Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)))
            } else {
                Line::from(vec![
                    Span::styled(format!("{key:<16}"), Style::default().fg(Color::Yellow)),
                    Span::raw(*action),
                ])
            }
        })
        .collect();
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }).block(block), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let Some(status) = app.state.status.as_ref() else {
        return;
    };
    let style = match status.kind {
        StatusKind::Info => Style::default().fg(Color::Gray),
        StatusKind::Error => Style::default().fg(Color::Red),
    };
    f.render_widget(Paragraph::new(format!(" {}", status.message)).style(style), area);
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logger = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(logger, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
