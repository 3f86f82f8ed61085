use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref PARAGRAPH_BREAK: Regex =
        Regex::new(r"\n\s*\n").expect("paragraph break pattern is valid");
    static ref HEADING_COLON: Regex =
        Regex::new(r":\s*$").expect("heading colon pattern is valid");
    static ref NUMBERED_MARKER: Regex =
        Regex::new(r"^\d+[.)]\s+").expect("numbered marker pattern is valid");
    static ref BULLET_MARKER: Regex =
        Regex::new(r"^[-*•]\s+").expect("bullet marker pattern is valid");
    static ref STEP_MARKER: Regex =
        Regex::new(r"(?i)^\s*step\s+\d+[:.)]\s*").expect("step marker pattern is valid");
}

/// A structural piece of an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum FormattedBlock {
    Heading(String),
    OrderedList(Vec<String>),
    UnorderedList(Vec<String>),
    Paragraph(String),
}

/// Which leading token starts a list item
#[derive(Debug, Clone, Copy, PartialEq)]
enum Marker {
    Numbered,
    Bullet,
    Step,
}

impl Marker {
    fn pattern(self) -> &'static Regex {
        match self {
            Marker::Numbered => &NUMBERED_MARKER,
            Marker::Bullet => &BULLET_MARKER,
            Marker::Step => &STEP_MARKER,
        }
    }

    fn matches(self, line: &str) -> bool {
        self.pattern().is_match(line)
    }
}

/// Parse free-form assistant text into headings, lists and paragraphs.
///
/// Never fails: blank input gives an empty vector and anything that
/// does not look like a heading or list falls back to a paragraph.
pub fn format(text: &str) -> Vec<FormattedBlock> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let normalized = normalized.trim();

    let mut blocks = Vec::new();
    if normalized.is_empty() {
        return blocks;
    }

    for unit in PARAGRAPH_BREAK.split(normalized) {
        let lines: Vec<&str> = unit
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            continue;
        }

        classify(&lines, &mut blocks);
    }

    blocks
}

fn classify(lines: &[&str], blocks: &mut Vec<FormattedBlock>) {
    let first = lines[0];

    // "Title:" followed by more lines introduces a section
    if lines.len() > 1 && HEADING_COLON.is_match(first) {
        let title = HEADING_COLON.replace(first, "").into_owned();
        blocks.push(FormattedBlock::Heading(title));
        blocks.extend(format(&lines[1..].join("\n")));
        return;
    }

    let has_numbered = lines.iter().any(|line| Marker::Numbered.matches(line));
    let has_bullet = lines.iter().any(|line| Marker::Bullet.matches(line));

    if has_numbered && !has_bullet {
        blocks.push(FormattedBlock::OrderedList(collect_items(
            lines,
            Marker::Numbered,
        )));
        return;
    }

    if has_bullet && !has_numbered {
        blocks.push(FormattedBlock::UnorderedList(collect_items(
            lines,
            Marker::Bullet,
        )));
        return;
    }

    let step_lines = lines.iter().filter(|line| Marker::Step.matches(line)).count();
    if step_lines >= 2 {
        blocks.push(FormattedBlock::OrderedList(collect_items(lines, Marker::Step)));
        return;
    }

    blocks.push(FormattedBlock::Paragraph(lines.join(" ")));
}

/// Split marked lines into items, folding unmarked lines into the previous item.
fn collect_items(lines: &[&str], marker: Marker) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();

    for line in lines {
        if let Some(found) = marker.pattern().find(line) {
            items.push(line[found.end()..].to_string());
        } else if let Some(last) = items.last_mut() {
            last.push(' ');
            last.push_str(line);
        }
        // A continuation before any marker has nothing to attach to
    }

    items
}
