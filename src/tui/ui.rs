use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::tui::{
    app::{Focus, PickerApp},
    message::MessageRole,
    render::{block_lines, sanitize, wrap_lines},
};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the main UI
pub fn render_ui(f: &mut Frame, app: &PickerApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(8),    // Products, selection, conversation
            Constraint::Length(3), // Chat input
            Constraint::Length(1), // Key help
        ])
        .split(f.size());

    render_status_bar(f, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_products(f, app, panes[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(panes[1]);

    render_selection(f, app, right[0]);
    render_conversation(f, app, right[1]);
    render_input_box(f, app, chunks[2]);
    render_help(f, app, chunks[3]);
}

fn pane_block(title: &str, focused: bool) -> Block<'_> {
    let color = if focused { Color::Cyan } else { Color::Gray };
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color))
}

fn render_status_bar(f: &mut Frame, app: &PickerApp, area: Rect) {
    let category = if app.category().is_empty() {
        "All".to_string()
    } else {
        sanitize(app.category())
    };

    let mut spans = vec![
        Span::styled("Model: ", Style::default().fg(Color::Gray)),
        Span::styled(app.model_name().to_string(), Style::default().fg(Color::Green)),
        Span::styled(" | Category: ", Style::default().fg(Color::Gray)),
        Span::styled(category, Style::default().fg(Color::Yellow)),
        Span::styled(" | Search: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}_", sanitize(app.search_input())),
            Style::default().fg(if app.focus() == Focus::Search {
                Color::White
            } else {
                Color::DarkGray
            }),
        ),
    ];

    let pending = app.pending_requests();
    if pending > 0 {
        let millis = chrono::Local::now().timestamp_subsec_millis() as usize;
        let frame = SPINNER[millis / 250 % SPINNER.len()];
        let noun = if pending == 1 { "reply" } else { "replies" };
        spans.push(Span::styled(
            format!(" | {} waiting for {} {}", frame, pending, noun),
            Style::default().fg(Color::Magenta),
        ));
    }

    let status_bar = Paragraph::new(Line::from(spans))
        .block(pane_block("Routine Picker", app.focus() == Focus::Search));
    f.render_widget(status_bar, area);
}

fn render_products(f: &mut Frame, app: &PickerApp, area: Rect) {
    let items: Vec<ListItem> = app
        .visible_products()
        .iter()
        .map(|product| {
            let selected = app.selection().is_selected(product);
            let marker = if selected { "[x] " } else { "[ ] " };
            let name_style = if selected {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut lines = vec![Line::from(vec![
                Span::raw(marker),
                Span::styled(sanitize(&product.name), name_style),
                Span::styled(
                    format!("  {} · {}", sanitize(&product.brand), sanitize(&product.category)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])];

            if app.is_expanded(product) {
                let description = product
                    .description
                    .as_deref()
                    .unwrap_or("No description available.");
                lines.push(Line::from(Span::styled(
                    format!("    {}", sanitize(description)),
                    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                )));
            }

            ListItem::new(Text::from(lines))
        })
        .collect();

    let title = format!("Products ({})", app.visible_products().len());
    let items = if items.is_empty() {
        vec![ListItem::new("No products match.")]
    } else {
        items
    };
    let list = List::new(items)
        .block(pane_block(&title, app.focus() == Focus::Products))
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !app.visible_products().is_empty() {
        state.select(Some(app.product_cursor()));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_selection(f: &mut Frame, app: &PickerApp, area: Rect) {
    let items: Vec<ListItem> = app
        .selection()
        .iter()
        .map(|(_, item)| {
            ListItem::new(Line::from(vec![
                Span::styled(sanitize(&item.name), Style::default().fg(Color::Green)),
                Span::styled(
                    format!("  {}", sanitize(&item.brand)),
                    Style::default().fg(Color::Gray),
                ),
                Span::styled(
                    format!("  {}", sanitize(&item.image)),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = format!("Selected ({})", app.selection().len());
    let focused = app.focus() == Focus::Selected;
    let list = List::new(items)
        .block(pane_block(&title, focused))
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if focused && !app.selection().is_empty() {
        state.select(Some(app.selected_cursor()));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_conversation(f: &mut Frame, app: &PickerApp, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in app.transcript() {
        let (label, color) = match msg.role {
            MessageRole::User => ("You", Color::Cyan),
            MessageRole::Assistant if msg.is_notice => ("Notice", Color::Red),
            MessageRole::Assistant => ("Advisor", Color::Green),
            MessageRole::System => ("Info", Color::Yellow),
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("{} ", msg.timestamp.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(
                format!("{}:", label),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]));

        if msg.blocks.is_empty() {
            lines.push(Line::from(sanitize(&msg.content)));
        } else {
            lines.extend(block_lines(&msg.blocks));
        }
        lines.push(Line::from(""));
    }

    // Wrap up front so the row count matches the screen, then keep the newest rows in view
    let inner_width = usize::from(area.width.saturating_sub(2));
    let inner_height = usize::from(area.height.saturating_sub(2));
    let rows = wrap_lines(lines, inner_width);
    let scroll = u16::try_from(rows.len().saturating_sub(inner_height)).unwrap_or(u16::MAX);

    let conversation = Paragraph::new(Text::from(rows))
        .block(pane_block("Conversation", app.focus() == Focus::Chat))
        .scroll((scroll, 0));

    f.render_widget(conversation, area);
}

fn render_input_box(f: &mut Frame, app: &PickerApp, area: Rect) {
    let focused = app.focus() == Focus::Chat;

    // Long input scrolls left so the end and the cursor stay inside the box
    let inner_width = usize::from(area.width.saturating_sub(2));
    let typed = app.chat_input().chars().count();
    let hidden = typed.saturating_sub(inner_width.saturating_sub(1));
    let cursor_offset = u16::try_from(typed - hidden).unwrap_or(u16::MAX);

    let input = Paragraph::new(sanitize(app.chat_input()))
        .style(Style::default().fg(if focused { Color::White } else { Color::DarkGray }))
        .block(pane_block("Ask the advisor", focused))
        .scroll((0, u16::try_from(hidden).unwrap_or(u16::MAX)));

    f.render_widget(input, area);

    if focused {
        f.set_cursor(area.x + 1 + cursor_offset, area.y + 1);
    }
}

fn render_help(f: &mut Frame, app: &PickerApp, area: Rect) {
    let help = match app.focus() {
        Focus::Products => {
            "↑/↓ move  space select  i info  [/] category  / search  s selected  c chat  g routine  q quit"
        }
        Focus::Selected => "↑/↓ move  d remove  x clear all  g routine  esc back  q quit",
        Focus::Search => "type to filter  enter apply  esc back",
        Focus::Chat => "type a question  enter send  esc back",
    };

    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{sample_products, Catalog};
    use crate::llm::RequestKind;
    use crate::tui::chat::{testing::ScriptedClient, ChatEvent};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Instant;

    fn picker(products: Vec<crate::catalog::Product>) -> PickerApp {
        PickerApp::new(
            Catalog::new(products),
            Arc::new(ScriptedClient::with_replies(vec![])),
        )
    }

    fn press(app: &mut PickerApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    fn draw(app: &PickerApp, width: u16, height: u16) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render_ui(f, app)).unwrap();
        terminal
    }

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer.get(x, y).symbol.clone())
                    .collect()
            })
            .collect()
    }

    fn screen_contains(terminal: &Terminal<TestBackend>, needle: &str) -> bool {
        screen_rows(terminal).iter().any(|row| row.contains(needle))
    }

    #[test]
    fn test_long_reply_tail_is_visible() {
        let mut app = picker(sample_products());
        let reply = format!("{}THE_END", "moisturize twice daily ".repeat(45));
        assert!(reply.len() > 1000);
        app.apply_chat_event(ChatEvent {
            request_id: 1,
            kind: RequestKind::FollowUp,
            result: Ok(reply),
        });

        let terminal = draw(&app, 100, 30);
        assert!(screen_contains(&terminal, "THE_END"));
    }

    #[test]
    fn test_expanded_description_is_drawn() {
        let mut app = picker(sample_products());
        let terminal = draw(&app, 100, 30);
        assert!(!screen_contains(&terminal, "Gel cleanser with ceramides"));

        press(&mut app, KeyCode::Char('i'));
        let terminal = draw(&app, 100, 30);
        assert!(screen_contains(&terminal, "    Gel cleanser with ceramides"));
    }

    #[test]
    fn test_missing_description_placeholder() {
        let mut app = picker(sample_products());
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('i'));

        let terminal = draw(&app, 100, 30);
        assert!(screen_contains(&terminal, "No description available."));
    }

    #[test]
    fn test_empty_results_message() {
        let mut app = picker(sample_products());
        press(&mut app, KeyCode::Char('/'));
        for c in "retinol".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert!(app.visible_products().is_empty());

        let terminal = draw(&app, 100, 30);
        assert!(screen_contains(&terminal, "No products match."));
        assert!(screen_contains(&terminal, "Products (0)"));
    }

    #[test]
    fn test_empty_catalog_message() {
        let app = picker(Vec::new());
        let terminal = draw(&app, 100, 30);
        assert!(screen_contains(&terminal, "No products match."));
    }

    #[test]
    fn test_input_cursor_stays_inside_box() {
        let mut app = picker(sample_products());
        press(&mut app, KeyCode::Char('c'));
        for c in "which sunscreen works under makeup ".repeat(8).chars() {
            press(&mut app, KeyCode::Char(c));
        }

        let mut terminal = draw(&app, 80, 24);
        let (x, y) = terminal.get_cursor().unwrap();
        // Input box spans the full width on rows 20..23
        assert!((1..=78).contains(&x), "cursor x {} outside input box", x);
        assert_eq!(y, 21);

        // The newest text is what stays visible
        let rows = screen_rows(&terminal);
        assert!(rows[21].contains("under makeup"));
    }

    #[test]
    fn test_short_input_cursor_follows_text() {
        let mut app = picker(sample_products());
        press(&mut app, KeyCode::Char('c'));
        for c in "spf?".chars() {
            press(&mut app, KeyCode::Char(c));
        }

        let mut terminal = draw(&app, 80, 24);
        assert_eq!(terminal.get_cursor().unwrap(), (5, 21));
    }
}
