//! TUI widget rendering: mode tabs, form pane, result pane, status bar,
//! and the login form.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};

use super::Field;
use crate::catalog::TextDirection;
use crate::render;
use crate::view::ViewMode;

/// Lay out one output block as styled lines. Right-to-left blocks are
/// right-aligned; multi-line bodies keep their line breaks.
pub fn block_to_lines(block: &render::Block) -> Vec<Line<'static>> {
    let lines: Vec<Line<'static>> = match block {
        render::Block::Verse { text } => vec![Line::from(Span::styled(
            text.clone(),
            Style::default().fg(Color::Yellow),
        ))],
        render::Block::Heading { text } => vec![
            Line::default(),
            Line::from(Span::styled(
                text.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
        ],
        render::Block::Body { text, .. } => {
            text.lines().map(|l| Line::raw(l.to_string())).collect()
        }
        render::Block::Field { label, value } => vec![Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
            Span::raw(value.clone()),
        ])],
        render::Block::Error { message } => vec![Line::from(vec![
            Span::styled(
                "[error] ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw(message.clone()),
        ])],
        render::Block::Notice { text } => vec![Line::from(Span::styled(
            text.clone(),
            Style::default().fg(Color::DarkGray),
        ))],
        render::Block::Separator => vec![Line::from(Span::styled(
            "─".repeat(40),
            Style::default().fg(Color::DarkGray),
        ))],
    };

    match block.direction() {
        TextDirection::Rtl => lines
            .into_iter()
            .map(|l| l.alignment(Alignment::Right))
            .collect(),
        TextDirection::Ltr => lines,
    }
}

pub fn blocks_to_lines(blocks: &[render::Block]) -> Vec<Line<'static>> {
    blocks.iter().flat_map(block_to_lines).collect()
}

/// Rows the lines occupy once wrapped to `width` columns.
pub fn wrapped_rows(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines.iter().map(|l| l.width().max(1).div_ceil(width)).sum()
}

pub struct MainView<'a> {
    pub mode: ViewMode,
    pub rows: &'a [(Field, String)],
    pub focus: usize,
    pub output: &'a [render::Block],
    pub scroll_offset: usize,
    pub busy: bool,
    pub authenticated: bool,
    pub base_url: &'a str,
}

/// Main screen layout. Returns the inner width of the result pane.
pub fn render_main(frame: &mut Frame, view: &MainView<'_>) -> u16 {
    let [header_area, tabs_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let form_height = u16::try_from(view.rows.len()).unwrap_or(u16::MAX).saturating_add(2);
    let [form_area, output_area] =
        Layout::vertical([Constraint::Length(form_height), Constraint::Fill(1)]).areas(body_area);

    render_header(frame, header_area, view.base_url);

    let selected = ViewMode::ALL
        .iter()
        .position(|&m| m == view.mode)
        .unwrap_or(0);
    let tabs = Tabs::new(
        ViewMode::ALL
            .iter()
            .enumerate()
            .map(|(i, m)| format!("F{} {}", i + 1, m.title())),
    )
    .select(selected)
    .highlight_style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    );
    frame.render_widget(tabs, tabs_area);

    // Form.
    let form_lines: Vec<Line> = view
        .rows
        .iter()
        .enumerate()
        .map(|(i, (field, value))| {
            let focused = i == view.focus;
            let marker = if focused { "> " } else { "  " };
            let value_style = if focused {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            let value = if *field == Field::Query && focused {
                format!("{value}_")
            } else {
                value.clone()
            };
            Line::from(vec![
                Span::raw(marker),
                Span::styled(
                    format!("{:<18}", field.label()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(value, value_style),
            ])
        })
        .collect();
    let form = Paragraph::new(form_lines)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", view.mode.title())));
    frame.render_widget(form, form_area);

    // Results.
    let lines = if view.busy {
        vec![Line::from(Span::styled(
            "Working...",
            Style::default().fg(Color::Yellow),
        ))]
    } else {
        blocks_to_lines(view.output)
    };
    let scroll = u16::try_from(view.scroll_offset).unwrap_or(u16::MAX);
    let results = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(results, output_area);

    // Status bar.
    let session = if view.authenticated {
        "logged in"
    } else {
        "anonymous"
    };
    let status = Paragraph::new(status_line(view.mode, session, view.base_url));
    frame.render_widget(status, status_area);

    output_area.width.saturating_sub(2)
}

/// Mode, session state, backend URL, then the key reference.
pub fn status_line(mode: ViewMode, session: &str, base_url: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {} ", mode.title()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("| "),
        Span::styled(format!("{session} "), Style::default().fg(Color::DarkGray)),
        Span::raw("| "),
        Span::styled(format!("{base_url} "), Style::default().fg(Color::DarkGray)),
        Span::raw("| "),
        Span::styled(
            "Tab/F1-F3 mode  ↑↓ field  ←→ choose  Enter submit  PgUp/PgDn scroll  Ctrl+L logout  Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn render_header(frame: &mut Frame, area: Rect, base_url: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " basirah ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" :: {base_url} ")),
    ]));
    frame.render_widget(header, area);
}

pub struct LoginView<'a> {
    pub username: &'a str,
    pub password_len: usize,
    pub password_focused: bool,
    pub message: Option<&'a str>,
    pub busy: bool,
    pub base_url: &'a str,
}

/// Login screen: username, masked password, and the last failure.
pub fn render_login(frame: &mut Frame, view: &LoginView<'_>) {
    let [header_area, _, form_area, message_area, _] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(frame.area());

    render_header(frame, header_area, view.base_url);

    let focused = Style::default().add_modifier(Modifier::REVERSED);
    let (user_style, pass_style) = if view.password_focused {
        (Style::default(), focused)
    } else {
        (focused, Style::default())
    };
    let form = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Username  ", Style::default().fg(Color::DarkGray)),
            Span::styled(view.username.to_string(), user_style),
        ]),
        Line::from(vec![
            Span::styled("Password  ", Style::default().fg(Color::DarkGray)),
            Span::styled("*".repeat(view.password_len), pass_style),
        ]),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Login "));
    frame.render_widget(form, form_area);

    let message = if view.busy {
        Line::from(Span::styled("Logging in...", Style::default().fg(Color::Yellow)))
    } else if let Some(m) = view.message {
        Line::from(Span::styled(m.to_string(), Style::default().fg(Color::Red)))
    } else {
        Line::from(Span::styled(
            "Tab switch field  Enter log in  Esc quit",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(message), message_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TextStyle;

    #[test]
    fn rtl_blocks_are_right_aligned() {
        let lines = block_to_lines(&render::Block::body("سطر\nسطر آخر", TextStyle::Arabic));
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.alignment == Some(Alignment::Right)));

        let verse = block_to_lines(&render::Block::verse("1:1 بسم"));
        assert_eq!(verse[0].alignment, Some(Alignment::Right));
    }

    #[test]
    fn ltr_blocks_keep_default_alignment() {
        let lines = block_to_lines(&render::Block::body("one\ntwo\nthree", TextStyle::Latin));
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.alignment.is_none()));
    }

    #[test]
    fn status_line_names_mode_and_backend() {
        let line = status_line(ViewMode::Reflection, "anonymous", "http://localhost:8000");
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("Reflection"));
        assert!(text.contains("anonymous"));
        assert!(text.contains("http://localhost:8000"));
    }

    #[test]
    fn wrapped_rows_counts_overflow() {
        let lines = vec![Line::raw("a".repeat(25)), Line::raw("")];
        assert_eq!(wrapped_rows(&lines, 10), 4);
    }
}
