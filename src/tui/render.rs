use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::format::FormattedBlock;

/// Replace control characters so catalog or model text cannot drive the terminal
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Turn parsed reply blocks into styled transcript lines
pub fn block_lines(blocks: &[FormattedBlock]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for block in blocks {
        match block {
            FormattedBlock::Heading(text) => {
                lines.push(Line::from(Span::styled(
                    sanitize(text),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            FormattedBlock::OrderedList(items) => {
                for (i, item) in items.iter().enumerate() {
                    lines.push(Line::from(vec![
                        Span::styled(format!("  {}. ", i + 1), Style::default().fg(Color::Yellow)),
                        Span::raw(sanitize(item)),
                    ]));
                }
            }
            FormattedBlock::UnorderedList(items) => {
                for item in items {
                    lines.push(Line::from(vec![
                        Span::styled("  • ", Style::default().fg(Color::Yellow)),
                        Span::raw(sanitize(item)),
                    ]));
                }
            }
            FormattedBlock::Paragraph(text) => {
                lines.push(Line::from(sanitize(text)));
            }
        }
    }

    lines
}

/// Plain-text rendering of blocks, used by the non-interactive commands
/// Break lines into rows no wider than `width` columns, at spaces where possible.
///
/// The result maps one to one onto screen rows, so callers can size
/// scrolling from its length.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for line in lines {
        let mut row: Vec<Span<'static>> = Vec::new();
        let mut used = 0;

        for span in line.spans {
            let style = span.style;
            for word in span.content.split_inclusive(' ') {
                let mut rest = word;
                if used > 0 && used + rest.chars().count() > width {
                    rows.push(Line::from(std::mem::take(&mut row)));
                    used = 0;
                }

                // A word longer than the row is cut
                while rest.chars().count() > width - used {
                    let cut = rest
                        .char_indices()
                        .nth(width - used)
                        .map(|(i, _)| i)
                        .unwrap_or(rest.len());
                    row.push(Span::styled(rest[..cut].to_string(), style));
                    rows.push(Line::from(std::mem::take(&mut row)));
                    used = 0;
                    rest = &rest[cut..];
                }

                if !rest.is_empty() {
                    used += rest.chars().count();
                    row.push(Span::styled(rest.to_string(), style));
                }
            }
        }

        rows.push(Line::from(row));
    }

    rows
}

pub fn blocks_to_text(blocks: &[FormattedBlock]) -> String {
    block_lines(blocks)
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
