//! Render functions

use crate::app::{AppState, Focus, Latency, Notice, NoticeLevel, Overlay};
use crate::input::TextInput;
use crate::layout::{centered_rect, MainLayout};
use crate::theme::Theme;
use ratatui::{prelude::*, widgets::*};
use ts_core::comment::Comment;
use ts_core::pipeline::SweepState;

/// Shown by the about popup
pub const ABOUT_TEXT: &str = "YouTube comments remover. Purposed to remove comments related to \
online gambling. Provided 2 options: Manual and Use AI removal.";

/// Draw the whole screen
pub fn render(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let layout = MainLayout::split(frame.area());

    render_title_bar(frame, layout.title, state, theme);
    render_auth(frame, layout.auth, state, theme);
    render_load(frame, layout.load, state, theme);
    render_comments(frame, layout.comments, state, theme);
    render_removal(frame, layout.removal, state, theme);
    render_footer(frame, layout.footer, state, theme);

    if state.is_reviewing() {
        render_review(frame, frame.area(), state, theme);
    }

    match &state.overlay {
        Some(Overlay::Help) => render_help(frame, frame.area()),
        Some(Overlay::About) => render_about(frame, frame.area()),
        Some(Overlay::Logs { content, scroll }) => {
            render_logs(frame, frame.area(), content.as_deref(), *scroll)
        }
        None => {}
    }

    if let Some(notice) = &state.notice {
        render_notice(frame, frame.area(), notice, theme);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let account = state
        .session
        .credentials_name()
        .map(|name| format!("authenticated with {}", name))
        .unwrap_or_else(|| "not authenticated".to_string());
    let model = match state.session.classifier() {
        Some(classifier) => format!("model: {}", classifier.name()),
        None => "no model".to_string(),
    };
    let title = format!(" tubesweep | {} | {} ", account, model);

    frame.render_widget(
        Paragraph::new(title).style(
            Style::default()
                .bg(theme.title_bg)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        area,
    );
}

/// Single-line input inside a titled border, with the cursor when focused
fn render_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    input: &TextInput,
    focused: bool,
    enabled: bool,
    theme: &Theme,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(theme.border(focused));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let style = if enabled {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(theme.disabled)
    };
    // Keep the cursor in view on long values
    let cursor = input.display_cursor() as u16;
    let offset = cursor.saturating_sub(inner.width.saturating_sub(1));
    frame.render_widget(
        Paragraph::new(input.value()).style(style).scroll((0, offset)),
        inner,
    );

    if focused && enabled && inner.width > 0 {
        let cursor_x = inner.x + (cursor - offset).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

fn render_auth(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let focused = state.focus == Focus::Credentials;

    if let Some(url) = &state.consent_url {
        let block = Block::default()
            .title("Open this URL to grant access (waiting...)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning));
        frame.render_widget(Paragraph::new(url.as_str()).block(block), area);
        return;
    }

    let title = if state.authenticating {
        "Credentials file (authenticating...)"
    } else if state.session.is_authenticated() {
        "Credentials file (authenticated, Enter to switch)"
    } else {
        "Credentials file (Enter to authenticate)"
    };
    render_input(
        frame,
        area,
        title,
        &state.credentials,
        focused,
        !state.authenticating,
        theme,
    );
}

fn render_load(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let title = match state.loading {
        Some((pages, comments)) => format!(
            "Video URL (loading: {} page(s), {} comment(s))",
            pages, comments
        ),
        None => "Video URL (Enter to load comments)".to_string(),
    };
    render_input(
        frame,
        area,
        &title,
        &state.video_url,
        state.focus == Focus::VideoUrl,
        state.loading.is_none(),
        theme,
    );
}

fn comment_row(comment: &Comment) -> Row<'_> {
    Row::new(vec![
        Cell::from(comment.id.as_str()),
        Cell::from(comment.author.as_str()),
        Cell::from(single_line(&comment.text)),
    ])
}

/// Comment text on one table line
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn comment_table<'a>(rows: Vec<Row<'a>>, block: Block<'a>, theme: &Theme) -> Table<'a> {
    Table::new(
        rows,
        [
            Constraint::Length(28),
            Constraint::Length(20),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["ID", "Author", "Comment"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    )
    .block(block)
    .row_highlight_style(
        Style::default()
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD),
    )
}

fn render_comments(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let focused = state.focus == Focus::Comments;
    let comments = state.comments();

    let title = match &comments {
        Some(set) => format!("Comments of {} ({})", set.video_id(), set.len()),
        None => "Comments".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(theme.border(focused));

    let Some(set) = comments.filter(|set| !set.is_empty()) else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No comments loaded",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
            .block(block),
            area,
        );
        return;
    };

    let rows: Vec<Row> = set.iter().map(comment_row).collect();
    let mut table_state = TableState::default();
    if focused {
        table_state.select(Some(state.selected_comment.min(set.len() - 1)));
    }
    frame.render_stateful_widget(comment_table(rows, block, theme), area, &mut table_state);
}

fn toggle(label: &str, on: bool, theme: &Theme) -> Span<'static> {
    let mark = if on { "[x]" } else { "[ ]" };
    let style = if on {
        Style::default().fg(theme.success)
    } else {
        Style::default()
    };
    Span::styled(format!("{} {}", mark, label), style)
}

fn render_removal(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let focused = state.focus == Focus::Removal;
    let ai = state.session.ai_assisted;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let title = if ai {
        "Comment id (AI assisted, Enter to scan loaded comments)".to_string()
    } else if state.removals_in_flight > 0 {
        format!("Comment id (removing {}...)", state.removals_in_flight)
    } else {
        "Comment id (Enter to remove)".to_string()
    };
    render_input(frame, rows[0], &title, &state.comment_id, focused, !ai, theme);

    let mut spans = vec![
        Span::raw(" "),
        toggle("Ban author (F2)", state.session.ban_author, theme),
        Span::raw("   "),
        toggle("AI assisted (F3)", ai, theme),
    ];
    if ai && !state.session.has_classifier() {
        spans.push(Span::styled(
            "   no model loaded",
            Style::default().fg(theme.warning),
        ));
    }
    if matches!(state.sweep.state(), SweepState::Predicting) {
        spans.push(Span::styled(
            "   classifying...",
            Style::default().fg(theme.info),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (latency, latency_style) = match state.latency {
        Latency::Connected(rtt) => (
            format!("{} ms ", rtt.as_millis()),
            Style::default().fg(theme.success),
        ),
        Latency::Disconnected => ("Disconnected ".to_string(), Style::default().fg(theme.error)),
        Latency::Unknown => ("... ".to_string(), Style::default()),
    };

    let text = state
        .message
        .clone()
        .unwrap_or_else(|| " Tab focus | F1 help | F4 logs | F5 about | F10 quit".to_string());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(latency.len() as u16)])
        .split(area);

    let bar = Style::default().bg(Color::DarkGray).fg(Color::White);
    frame.render_widget(Paragraph::new(format!(" {}", text.trim_start())).style(bar), columns[0]);
    frame.render_widget(
        Paragraph::new(latency).style(bar.patch(latency_style)),
        columns[1],
    );
}

fn render_review(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let popup = centered_rect(85, 70, area);
    frame.render_widget(Clear, popup);

    if let SweepState::Applying { total } = state.sweep.state() {
        let block = Block::default()
            .title("Flagged comments")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.warning));
        frame.render_widget(
            Paragraph::new(format!("Removing {} comment(s)...", total)).block(block),
            popup,
        );
        return;
    }

    let Some(flagged) = state.flagged() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(popup);

    let block = Block::default()
        .title(format!("Flagged comments ({})", flagged.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.warning));
    let rows: Vec<Row> = flagged.iter().map(comment_row).collect();
    let mut table_state = TableState::default();
    table_state.select(Some(state.selected_flagged.min(flagged.len().saturating_sub(1))));
    frame.render_stateful_widget(comment_table(rows, block, theme), chunks[0], &mut table_state);

    let ban = if state.session.ban_author {
        " and ban authors"
    } else {
        ""
    };
    frame.render_widget(
        Paragraph::new(format!(
            " Enter remove all{} | x keep selected | Esc cancel",
            ban
        ))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White)),
        chunks[1],
    );
}

fn render_notice(frame: &mut Frame, area: Rect, notice: &Notice, theme: &Theme) {
    let color = match notice.level {
        NoticeLevel::Success => theme.success,
        NoticeLevel::Info => theme.info,
        NoticeLevel::Warning => theme.warning,
        NoticeLevel::Error => theme.error,
    };

    let popup = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(notice.message.as_str()),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to close",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(notice.level.title())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        ),
        popup,
    );
}

fn render_logs(frame: &mut Frame, area: Rect, content: Option<&str>, scroll: u16) {
    let popup = centered_rect(90, 80, area);
    frame.render_widget(Clear, popup);

    let text = content.unwrap_or("No log file found.");
    frame.render_widget(
        Paragraph::new(text)
            .scroll((scroll, 0))
            .block(
                Block::default()
                    .title("Logs (j/k scroll, Esc close)")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            ),
        popup,
    );
}

fn render_about(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                concat!("tubesweep ", env!("CARGO_PKG_VERSION")),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(ABOUT_TEXT),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title("About")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup,
    );
}

fn render_help(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "tubesweep - YouTube comment remover",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled("Panels", Style::default().fg(Color::Yellow))),
        Line::from("  Tab/S-Tab   Next/Previous panel"),
        Line::from("  Enter       Authenticate / Load / Remove"),
        Line::from("  Esc         Clear the focused input"),
        Line::from(""),
        Line::from(Span::styled("Comments", Style::default().fg(Color::Yellow))),
        Line::from("  j/k         Move selection up/down"),
        Line::from("  g/G         Go to top/bottom"),
        Line::from("  y           Copy id to the removal input"),
        Line::from(""),
        Line::from(Span::styled("Removal", Style::default().fg(Color::Yellow))),
        Line::from("  F2          Toggle ban author"),
        Line::from("  F3          Toggle AI assisted removal"),
        Line::from("  x           Keep the selected flagged comment"),
        Line::from(""),
        Line::from(Span::styled("Other", Style::default().fg(Color::Yellow))),
        Line::from("  F4          Show logs"),
        Line::from("  F5          About"),
        Line::from("  F10/Ctrl-c  Quit"),
        Line::from("  F1          Show this help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let help_area = centered_rect(50, 80, area);
    frame.render_widget(Clear, help_area);
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        help_area,
    );
}
