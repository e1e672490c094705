//! Prism - UI rendering
//!
//! Renders the hero header, upload summary, preview table, backend panel
//! and popups using Ratatui widgets.

use crate::app::{App, Focus};
use crate::config;
use crate::panel::{PanelVariant, Tab};
use crate::sections;
use crate::upload::UploadState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

/// Theme colors for the UI
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub error: Color,
    pub warning: Color,
    pub success: Color,
    pub border: Color,
    pub highlight: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        // Dracula-inspired dark theme
        Self {
            bg: Color::Rgb(40, 42, 54),
            fg: Color::Rgb(248, 248, 242),
            accent: Color::Rgb(139, 233, 253),
            error: Color::Rgb(255, 85, 85),
            warning: Color::Rgb(255, 184, 108),
            success: Color::Rgb(80, 250, 123),
            border: Color::Rgb(98, 114, 164),
            highlight: Color::Rgb(68, 71, 90),
            muted: Color::Rgb(98, 114, 164),
        }
    }
}

const LOADING_SEND: &str = "Sending…";
const LOADING_GENERATE: &str = "Generating…";
const MAX_CELL_CHARS: usize = 24;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let theme = Theme::default();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(12),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_hero(frame, main_chunks[0], &theme);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_chunks[1]);

    let data_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(20)])
        .split(body[0]);

    render_upload(frame, app, data_chunks[0], &theme);

    // Borders plus the header row
    app.set_viewport_height((data_chunks[1].height as usize).saturating_sub(3));
    render_preview(frame, app, data_chunks[1], &theme);

    render_panel(frame, app, body[1], &theme);
    render_status_bar(frame, app, main_chunks[2], &theme);

    let footer = Paragraph::new(Span::styled(sections::FOOTER, Style::default().fg(theme.muted)))
        .style(Style::default().bg(theme.bg));
    frame.render_widget(footer, main_chunks[3]);

    if app.show_help {
        render_help_popup(frame, &theme);
    } else if app.show_features {
        render_features_popup(frame, &theme);
    }
}

fn bordered<'a>(title: impl Into<String>, theme: &Theme, focused: bool) -> Block<'a> {
    let border = if focused { theme.accent } else { theme.border };
    Block::default()
        .title(Span::styled(
            format!(" {} ", title.into()),
            Style::default().fg(theme.accent),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(theme.bg))
}

/// Input line with a cursor marker while focused
fn input_line<'a>(label: &'a str, value: &'a str, focused: bool, theme: &Theme) -> Line<'a> {
    let value_style = if focused {
        Style::default().fg(theme.fg).bg(theme.highlight)
    } else {
        Style::default().fg(theme.fg)
    };
    let mut spans = vec![
        Span::styled(label, Style::default().fg(theme.warning)),
        Span::styled(value, value_style),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(theme.accent)));
    }
    Line::from(spans)
}

fn render_hero(frame: &mut Frame, area: Rect, theme: &Theme) {
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} ", sections::HERO_BADGE),
            Style::default()
                .fg(theme.bg)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            sections::HERO_HEADLINE,
            Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(sections::HERO_TAGLINE, Style::default().fg(theme.muted))),
    ];

    let hero = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(theme.border))
                .style(Style::default().bg(theme.bg)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(hero, area);
}

// ─── Upload & preview ───────────────────────────────────────────────────────

fn render_upload(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let upload = &app.upload;
    let mut lines = vec![input_line(
        "Path: ",
        &app.path_input,
        app.focus == Focus::FilePath,
        theme,
    )];

    let (state, state_color) = match upload.state() {
        UploadState::Idle => ("No file selected", theme.muted),
        UploadState::FileSelected => ("Reading…", theme.warning),
        UploadState::Parsed => ("Parsed", theme.success),
        UploadState::Error => ("Error", theme.error),
    };
    lines.push(Line::from(vec![
        Span::styled("State: ", Style::default().fg(theme.warning)),
        Span::styled(state, Style::default().fg(state_color)),
    ]));

    if !upload.file_name().is_empty() {
        let format = upload.format().map(|f| f.label()).unwrap_or("-");
        lines.push(Line::from(vec![
            Span::styled("File:  ", Style::default().fg(theme.warning)),
            Span::raw(format!("{} ({})", upload.file_name(), format)),
        ]));
    }

    if let Some(meta) = upload.meta() {
        lines.push(Line::from(""));
        for (label, value) in [
            ("Rows", meta.rows_count.to_string()),
            ("Columns", meta.cols_count.to_string()),
            ("Quality", meta.quality.to_string()),
        ] {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<9}", label), Style::default().fg(theme.muted)),
                Span::styled(value, Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
            ]));
        }
    }

    if upload.state() == UploadState::Error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            upload.error().to_string(),
            Style::default().fg(theme.error),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "o:Open  x:Clear",
        Style::default().fg(theme.muted),
    )));

    let panel = Paragraph::new(lines)
        .block(bordered("Upload", theme, app.focus == Focus::FilePath))
        .wrap(Wrap { trim: false });
    frame.render_widget(panel, area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    } else {
        text.to_string()
    }
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let table = app.upload.preview();

    if table.is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            sections::PREVIEW_PLACEHOLDER,
            Style::default().fg(theme.muted),
        ))
        .block(bordered("Preview", theme, false))
        .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, area);
        return;
    }

    let types = app.upload.meta().map(|m| m.types.as_slice()).unwrap_or(&[]);
    let header = Row::new(table.header.iter().enumerate().map(|(i, name)| {
        let label = types.get(i).map(|t| t.label()).unwrap_or("");
        Cell::from(Line::from(vec![
            Span::styled(
                truncate(name, MAX_CELL_CHARS),
                Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {}", label), Style::default().fg(theme.muted)),
        ]))
    }));

    let width = table.width();
    let rows = table
        .rows
        .iter()
        .enumerate()
        .skip(app.scroll)
        .take(app.viewport_height)
        .map(|(idx, _)| {
            Row::new((0..width).map(|col| Cell::from(truncate(table.cell(idx, col), MAX_CELL_CHARS))))
                .style(Style::default().fg(theme.fg))
        });

    let widths = vec![Constraint::Fill(1); width.max(1)];
    let title = format!(
        "Preview {}-{} of {}",
        (app.scroll + 1).min(table.rows.len()),
        (app.scroll + app.viewport_height).min(table.rows.len()),
        table.rows.len()
    );

    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .block(bordered(title, theme, false));
    frame.render_widget(widget, area);
}

// ─── Backend panel ──────────────────────────────────────────────────────────

fn render_panel(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{}:{}", i + 1, tab.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.panel.active.index())
        .style(Style::default().fg(theme.muted))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider(Span::styled("|", Style::default().fg(theme.border)))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .style(Style::default().bg(theme.bg)),
        );
    frame.render_widget(tabs, chunks[0]);

    let lines = match app.panel.active {
        Tab::Chat => chat_lines(app, theme),
        Tab::Visualize => visualize_lines(app, theme),
        Tab::Clean => clean_lines(app, theme),
        Tab::Report => report_lines(app, theme),
    };
    let focused = app.focus.is_editing() && app.focus != Focus::FilePath;
    let body = Paragraph::new(lines)
        .block(bordered(app.panel.active.label(), theme, focused))
        .wrap(Wrap { trim: false });
    frame.render_widget(body, chunks[1]);
}

fn hint(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(theme.muted)))
}

fn notice_line(text: &str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(theme.warning)))
}

fn chat_lines<'a>(app: &'a App, theme: &Theme) -> Vec<Line<'a>> {
    let chat = &app.panel.chat;
    let mut lines = Vec::new();
    if app.panel.dataset_id().is_none() {
        lines.push(notice_line(sections::CHAT_DATASET_BANNER, theme));
    }
    lines.push(input_line("Ask: ", &chat.question, app.focus == Focus::Question, theme));
    lines.push(Line::from(""));

    if chat.slot.is_loading() {
        lines.push(notice_line(LOADING_SEND, theme));
    } else if let Some(answer) = &chat.answer {
        lines.extend(answer.lines().map(|l| Line::from(l.to_string())));
    } else {
        lines.push(hint("Try asking:", theme));
        for example in sections::CHAT_EXAMPLES {
            lines.push(Line::from(format!("  • {}", example)));
        }
        lines.push(hint("Suggestions:", theme));
        for suggestion in sections::CHAT_SUGGESTIONS {
            lines.push(Line::from(format!("  • {}", suggestion)));
        }
    }

    lines.push(Line::from(""));
    lines.push(hint("a/Enter:Ask  i:Dataset id", theme));
    lines
}

fn visualize_lines<'a>(app: &'a App, theme: &Theme) -> Vec<Line<'a>> {
    let viz = &app.panel.visualize;
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Chart: ", Style::default().fg(theme.warning)),
            Span::styled(viz.chart_type.label(), Style::default().fg(theme.accent)),
        ]),
        input_line("X: ", &viz.x, app.focus == Focus::VizX, theme),
        input_line("Y: ", &viz.y, app.focus == Focus::VizY, theme),
        Line::from(""),
    ];

    if let Some(notice) = &viz.notice {
        lines.push(notice_line(notice, theme));
    } else if viz.slot.is_loading() {
        lines.push(notice_line(LOADING_GENERATE, theme));
    } else if let Some(spec) = viz.spec_text() {
        lines.extend(spec.lines().map(|l| highlight_json(l, theme)));
    } else {
        lines.push(hint(sections::VISUALIZE_PLACEHOLDER, theme));
    }

    lines.push(Line::from(""));
    lines.push(hint("c:Chart type  X/Y:Columns  g:Generate", theme));
    lines
}

fn clean_lines<'a>(app: &'a App, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for (key, label) in [
        ("d", "Drop rows with missing values"),
        ("m", "Fill missing with mean"),
        ("n", "Fill missing with median"),
        ("f", "Fill missing with mode"),
        ("u", "Remove duplicate rows"),
        ("r", "Report IQR outliers"),
    ] {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}  ", key), Style::default().fg(theme.warning)),
            Span::raw(label),
        ]));
    }
    if let Some(summary) = &app.clean_summary {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            summary.as_str(),
            Style::default().fg(theme.success),
        )));
    }
    lines
}

fn report_lines<'a>(app: &'a App, theme: &Theme) -> Vec<Line<'a>> {
    let report = &app.panel.report;
    let mut lines = Vec::new();

    if let Some(notice) = &report.notice {
        lines.push(notice_line(notice, theme));
        lines.push(Line::from(""));
    }

    match app.panel.variant {
        PanelVariant::Static => {
            lines.push(hint(sections::REPORT_PLACEHOLDER, theme));
            lines.push(Line::from(""));
            lines.push(hint("e:Export CSV  E:Export JSON", theme));
        }
        PanelVariant::Linked => {
            if report.slot.is_loading() {
                lines.push(notice_line(LOADING_GENERATE, theme));
            } else if report.markdown.is_empty() {
                lines.push(hint(sections::REPORT_PLACEHOLDER, theme));
            } else {
                lines.extend(report.markdown.lines().map(Line::from));
            }
            lines.push(Line::from(""));
            lines.push(hint("g:Generate report", theme));
        }
    }
    lines
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let dataset = app
        .panel
        .dataset_id()
        .map(|id| format!(" dataset {} ", id))
        .unwrap_or_else(|| " no dataset ".to_string());
    let dataset_style = if app.panel.dataset_id().is_some() {
        Style::default().fg(theme.success)
    } else {
        Style::default().fg(theme.warning)
    };

    let mut spans = vec![
        Span::styled(
            concat!(" Prism v", env!("CARGO_PKG_VERSION"), " "),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled("|", Style::default().fg(theme.border)),
        Span::styled(
            format!(" {} ", app.focus.label()),
            Style::default().fg(theme.bg).bg(theme.accent),
        ),
        Span::styled("|", Style::default().fg(theme.border)),
        Span::styled(format!(" {} ", app.panel.variant), Style::default().fg(theme.fg)),
        Span::styled("|", Style::default().fg(theme.border)),
    ];

    if app.focus == Focus::DatasetId {
        spans.push(Span::raw(" "));
        spans.extend(input_line("Dataset id: ", &app.dataset_input, true, theme).spans);
        spans.push(Span::raw(" "));
    } else {
        spans.push(Span::styled(dataset, dataset_style));
    }

    if app.panel.variant == PanelVariant::Linked {
        spans.push(Span::styled("|", Style::default().fg(theme.border)));
        spans.push(Span::styled(
            format!(" {} ", config::get().backend_url),
            Style::default().fg(theme.muted),
        ));
    }

    spans.push(Span::styled("|", Style::default().fg(theme.border)));
    spans.push(Span::styled(
        " ?:Help F:Features q:Quit ",
        Style::default().fg(theme.muted),
    ));

    let status_bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.bg)),
    );

    frame.render_widget(status_bar, area);
}

// ─── Popups ─────────────────────────────────────────────────────────────────

fn key_line(key: &str, desc: &str, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), Style::default().fg(color)),
        Span::raw(desc.to_string()),
    ])
}

fn heading(text: &str, color: Color) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

/// Render help popup
fn render_help_popup(frame: &mut Frame, theme: &Theme) {
    let area = centered_rect(60, 85, frame.area());
    frame.render_widget(Clear, area);

    let help_text = vec![
        heading("Keyboard Shortcuts", theme.accent),
        Line::from(""),
        heading("Data", theme.warning),
        key_line("o", "Enter a file path to load", theme.warning),
        key_line("x", "Clear the current file", theme.warning),
        key_line("j / k", "Scroll preview", theme.warning),
        key_line("PgDn/PgUp", "Scroll a page", theme.warning),
        key_line("Home/End", "Top / bottom of preview", theme.warning),
        Line::from(""),
        heading("Panel", theme.accent),
        key_line("Tab / 1-4", "Switch tab", theme.accent),
        key_line("i", "Set dataset id", theme.accent),
        key_line("a / Enter", "Ask a question (chat)", theme.accent),
        key_line("c X Y g", "Chart type, columns, generate", theme.accent),
        key_line("d m n f u r", "Cleaning operations", theme.accent),
        key_line("g / e / E", "Report, export CSV, export JSON", theme.accent),
        Line::from(""),
        key_line("Esc", "Leave an input field", theme.muted),
        key_line("F", "Feature overview", theme.muted),
        key_line("?", "Toggle this help", theme.muted),
        key_line("q", "Quit", theme.error),
    ];

    let help = Paragraph::new(help_text)
        .block(bordered("Help", theme, false))
        .wrap(Wrap { trim: false });
    frame.render_widget(help, area);
}

fn render_features_popup(frame: &mut Frame, theme: &Theme) {
    let area = centered_rect(70, 80, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        heading(sections::FEATURES_HEADING, theme.accent),
        Line::from(Span::styled(
            sections::FEATURES_SUBHEADING,
            Style::default().fg(theme.muted),
        )),
        Line::from(""),
    ];
    for feature in sections::FEATURES {
        lines.push(heading(feature.title, theme.warning));
        lines.push(Line::from(format!("  {}", feature.description)));
        lines.push(Line::from(""));
    }

    let popup = Paragraph::new(lines)
        .block(bordered("Features", theme, false))
        .wrap(Wrap { trim: false });
    frame.render_widget(popup, area);
}

/// Basic JSON syntax highlighting
fn highlight_json(text: &str, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current = String::new();
    let mut is_key = true;

    let flush = |current: &mut String, spans: &mut Vec<Span<'static>>| {
        if !current.is_empty() {
            spans.push(Span::raw(std::mem::take(current)));
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                flush(&mut current, &mut spans);
                let mut literal = String::from('"');
                let mut escaped = false;
                for ch in chars.by_ref() {
                    literal.push(ch);
                    if ch == '"' && !escaped {
                        break;
                    }
                    escaped = ch == '\\' && !escaped;
                }
                let color = if is_key {
                    theme.accent
                } else {
                    Color::Rgb(241, 250, 140)
                };
                spans.push(Span::styled(literal, Style::default().fg(color)));
            }
            ':' | ',' => {
                flush(&mut current, &mut spans);
                spans.push(Span::styled(c.to_string(), Style::default().fg(theme.fg)));
                is_key = c == ',';
            }
            '{' | '}' | '[' | ']' => {
                flush(&mut current, &mut spans);
                spans.push(Span::styled(c.to_string(), Style::default().fg(theme.warning)));
                if c == '{' || c == '[' {
                    is_key = c == '{';
                }
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        let trimmed = current.trim();
        let color = if trimmed.parse::<f64>().is_ok() {
            Color::Rgb(189, 147, 249)
        } else if matches!(trimmed, "true" | "false" | "null") {
            Color::Rgb(255, 121, 198)
        } else {
            theme.fg
        };
        spans.push(Span::styled(current, Style::default().fg(color)));
    }

    Line::from(spans)
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
