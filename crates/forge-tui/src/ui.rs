use forge_core::render::{DesignPanel, TranscriptEntry, WebsitePanel};
use forge_core::{ChatType, ImageResult};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, tabs, stats ticker, body, footer
    let [header_area, tabs_area, stats_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(4),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_tabs(app, frame, tabs_area);
    render_stats(app, frame, stats_area);
    render_body(app, frame, body_area);
    render_footer(frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let pending = app.chat.in_flight();
    let pending_indicator = if pending > 0 {
        format!(" [{} generating]", pending)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" FORGE AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(pending_indicator, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_tabs(app: &mut App, frame: &mut Frame, area: Rect) {
    let tabs = ChatType::all();
    let constraints: Vec<Constraint> = tabs
        .iter()
        .map(|t| Constraint::Length(t.display_name().chars().count() as u16 + 4))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let cells = Layout::horizontal(constraints).split(area);

    app.tab_areas.clear();
    for (i, chat_type) in tabs.iter().enumerate() {
        let style = if *chat_type == app.chat.active() {
            Style::default().bg(Color::Cyan).fg(Color::Black).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let label = Paragraph::new(format!("  {}  ", chat_type.display_name())).style(style);
        frame.render_widget(label, cells[i]);
        app.tab_areas.push((*chat_type, cells[i]));
    }
}

fn render_stats(app: &App, frame: &mut Frame, area: Rect) {
    let slots = app.stats.slots();
    if slots.len() < 3 {
        return;
    }

    let cells = Layout::horizontal([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .split(area);

    for (slot, cell) in slots.iter().zip(cells.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let text = Text::from(vec![
            Line::from(Span::styled(
                slot.display.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ))
            .centered(),
            Line::from(Span::styled(slot.label.clone(), Style::default().fg(Color::DarkGray)))
                .centered(),
        ]);
        frame.render_widget(Paragraph::new(text).block(block), *cell);
    }
}

fn render_body(app: &mut App, frame: &mut Frame, area: Rect) {
    // Chat on the left, the active panel on the right
    let [chat_area, panel_area] = Layout::horizontal([
        Constraint::Percentage(55),
        Constraint::Percentage(45),
    ])
    .areas(area);

    let [transcript_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_area);

    render_transcript(app, frame, transcript_area);
    render_input(app, frame, input_area);

    let panels = app.chat.panels();
    if panels.is_visible(ChatType::Design) {
        render_design_panel(&panels.design, frame, panel_area);
    } else {
        render_website_panel(&panels.website, frame, panel_area);
    }
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    app.transcript_area = Some(area);

    // Inner size minus borders, for scroll calculations
    app.transcript_height = area.height.saturating_sub(2);
    app.transcript_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {} chat ", app.chat.active().display_name()));

    let entries = app.chat.transcript().entries();
    let text = if entries.is_empty() {
        let hint = match app.chat.active() {
            ChatType::Design => "Describe a brand to get a logo and a banner...",
            ChatType::Website => "Describe a website to get a mockup...",
        };
        Text::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for entry in entries {
            match entry {
                TranscriptEntry::User(message) => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(message.clone()));
                }
                TranscriptEntry::AiSuccess(_) => {
                    lines.push(ai_label());
                    lines.push(Line::from(Span::styled(
                        entry.text().to_string(),
                        Style::default().fg(Color::Green),
                    )));
                }
                TranscriptEntry::AiFailure => {
                    lines.push(ai_label());
                    lines.push(Line::from(Span::styled(
                        entry.text().to_string(),
                        Style::default().fg(Color::Red),
                    )));
                }
                TranscriptEntry::Loading { .. } => {
                    lines.push(ai_label());
                    lines.push(Line::from(Span::styled(
                        app.loading_text(entry),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    )));
                }
            }
            lines.push(Line::default());
        }
        Text::from(lines)
    };

    let transcript = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(transcript, area);
}

fn ai_label() -> Line<'static> {
    Line::from(Span::styled(
        "AI:",
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Prompt (Enter to send) ");

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn image_lines(images: &[ImageResult], empty: &'static str) -> Vec<Line<'static>> {
    if images.is_empty() {
        return vec![Line::from(Span::styled(empty, Style::default().fg(Color::DarkGray)))];
    }
    images
        .iter()
        .map(|img| {
            Line::from(vec![
                Span::styled(format!("[{}] ", img.kind), Style::default().fg(Color::Magenta)),
                Span::styled(img.url.clone(), Style::default().add_modifier(Modifier::UNDERLINED)),
            ])
        })
        .collect()
}

fn render_design_panel(panel: &DesignPanel, frame: &mut Frame, area: Rect) {
    let [logo_area, images_area] = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(area);

    let logo = Paragraph::new(image_lines(&panel.logo, "No logo yet"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" Logo "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(logo, logo_area);

    let banners = Paragraph::new(image_lines(&panel.banners, "No banner yet"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" Banners "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(banners, images_area);
}

fn render_website_panel(panel: &WebsitePanel, frame: &mut Frame, area: Rect) {
    let images: Vec<ImageResult> = panel.mockup.iter().cloned().collect();
    let mockup = Paragraph::new(image_lines(&images, "No mockup yet"))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(" Website Mockup "),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(mockup, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" Tab ", key_style),
        Span::styled(" switch mode ", label_style),
        Span::styled(" F1/F2 ", key_style),
        Span::styled(" website/design ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Esc ", key_style),
        Span::styled(" quit ", label_style),
    ];

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
