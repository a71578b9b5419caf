use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const STATUS_HEIGHT: u16 = 1;
pub const LOG_PANE_HEIGHT: u16 = 8;

/// Pre-computed layout areas for the main draw loop.
#[derive(Debug)]
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    pub status: Rect,
    pub logs: Option<Rect>,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let log_height = if show_logs { LOG_PANE_HEIGHT } else { 0 };
        let tab_height = if full_screen { 0 } else { TAB_BAR_HEIGHT };

        let [tab, main, logs, status] = Layout::vertical([
            Constraint::Length(tab_height),
            Constraint::Fill(1),
            Constraint::Length(log_height),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .areas(area);

        LayoutAreas {
            tab_bar: if full_screen {
                [Rect::ZERO, Rect::ZERO]
            } else {
                Self::split_tab_bar(tab)
            },
            main,
            status,
            logs: show_logs.then_some(logs),
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_pane_takes_rows_from_main() {
        let area = Rect::new(0, 0, 80, 30);
        let without = LayoutAreas::from_rect(area, false, false);
        let with = LayoutAreas::from_rect(area, false, true);
        assert!(without.logs.is_none());
        assert_eq!(with.logs.map(|r| r.height), Some(LOG_PANE_HEIGHT));
        assert_eq!(without.main.height - with.main.height, LOG_PANE_HEIGHT);
        assert_eq!(with.status.y, 29);
    }

    #[test]
    fn full_screen_hides_tab_bar() {
        let layout = LayoutAreas::from_rect(Rect::new(0, 0, 80, 30), true, false);
        assert_eq!(layout.tab_bar, [Rect::ZERO, Rect::ZERO]);
        assert_eq!(layout.main.y, 0);
        assert_eq!(layout.main.height, 29);
    }
}
