//! Layout management

use ratatui::prelude::*;

/// Areas of the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainLayout {
    pub title: Rect,
    pub auth: Rect,
    pub load: Rect,
    pub comments: Rect,
    pub removal: Rect,
    pub footer: Rect,
}

impl MainLayout {
    /// Split the terminal area
    pub fn split(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(4),
                Constraint::Length(1),
            ])
            .split(area);

        Self {
            title: rows[0],
            auth: rows[1],
            load: rows[2],
            comments: rows[3],
            removal: rows[4],
            footer: rows[5],
        }
    }
}

/// Rectangle centered in `r` taking the given percentages
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 50, area);
        assert_eq!(popup.width, 50);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 25);
        assert_eq!(popup.y, 10);
    }

    #[test]
    fn test_main_layout_fills_height() {
        let layout = MainLayout::split(Rect::new(0, 0, 80, 30));
        assert_eq!(layout.title.height, 1);
        assert_eq!(layout.footer.y, 29);
        assert_eq!(layout.comments.height, 30 - 1 - 3 - 3 - 4 - 1);
    }
}
