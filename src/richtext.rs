//! Rich-text formatting of captured insight text
//!
//! Converts freeform captured text into a structured document fragment of
//! paragraphs, bullet lists, and numbered lists. The conversion is total:
//! every input produces a fragment, and malformed list markers fall through
//! to the paragraph case.

use serde::{Deserialize, Serialize};

/// One block of a rich-text fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A paragraph; each entry is one line, rendered with hard line breaks
    Paragraph { lines: Vec<String> },
    /// An unordered list
    BulletList { items: Vec<String> },
    /// A numbered list
    OrderedList { items: Vec<String> },
    /// A horizontal rule separating successive insights within one note
    Rule,
}

/// An ordered sequence of blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub blocks: Vec<Block>,
}

impl Fragment {
    /// The placeholder fragment: a single empty paragraph.
    ///
    /// A note created before any real content arrives holds this
    /// placeholder; the note store's append logic relies on it to detect
    /// "no content yet", so the formatter never emits an empty fragment.
    pub fn placeholder() -> Self {
        Self {
            blocks: vec![Block::Paragraph {
                lines: vec![String::new()],
            }],
        }
    }

    /// Whether this fragment is exactly the empty placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.blocks.len() == 1
            && matches!(
                &self.blocks[0],
                Block::Paragraph { lines } if lines.len() == 1 && lines[0].is_empty()
            )
    }

    /// Append `other` after a horizontal rule.
    pub fn append_separated(&mut self, other: Fragment) {
        self.blocks.push(Block::Rule);
        self.blocks.extend(other.blocks);
    }

    /// Render as plain text, one line per paragraph line or list item.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph { lines } => {
                    for line in lines {
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                Block::BulletList { items } => {
                    for item in items {
                        out.push_str("- ");
                        out.push_str(item);
                        out.push('\n');
                    }
                }
                Block::OrderedList { items } => {
                    for (i, item) in items.iter().enumerate() {
                        out.push_str(&format!("{}. {}\n", i + 1, item));
                    }
                }
                Block::Rule => out.push_str("---\n"),
            }
        }
        out
    }
}

/// Convert freeform captured text into a structured fragment.
///
/// Splits on blank-line boundaries; each block is classified by its first
/// line and blocks are concatenated in source order with no separator
/// between them. Empty or blank input yields the single-empty-paragraph
/// placeholder, never an empty fragment.
pub fn to_document(text: &str) -> Fragment {
    let blocks: Vec<Block> = split_blocks(text)
        .iter()
        .map(|lines| classify_block(lines))
        .collect();

    if blocks.is_empty() {
        return Fragment::placeholder();
    }
    Fragment { blocks }
}

/// Group non-blank lines into blocks separated by blank lines.
fn split_blocks(text: &str) -> Vec<Vec<String>> {
    let mut blocks = Vec::new();
    let mut current: Vec<String> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.to_string());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Classify one block by its first line.
fn classify_block(lines: &[String]) -> Block {
    let first = lines[0].trim_start();
    if first.starts_with('-') || first.starts_with('•') {
        Block::BulletList {
            items: lines.iter().map(|l| strip_bullet(l)).collect(),
        }
    } else if ordered_marker(first).is_some() {
        Block::OrderedList {
            items: lines.iter().map(|l| strip_ordered(l)).collect(),
        }
    } else {
        Block::Paragraph {
            lines: lines.to_vec(),
        }
    }
}

/// Byte length of a leading `<digits>.` marker, if present.
fn ordered_marker(line: &str) -> Option<usize> {
    let digits = line.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits > 0 && line.as_bytes().get(digits) == Some(&b'.') {
        Some(digits + 1)
    } else {
        None
    }
}

/// List items keep their text even when an individual line is missing its
/// marker; markers are stripped per line, not per block.
fn strip_bullet(line: &str) -> String {
    let trimmed = line.trim_start();
    trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('•'))
        .map(|rest| rest.trim_start())
        .unwrap_or(trimmed)
        .to_string()
}

fn strip_ordered(line: &str) -> String {
    let trimmed = line.trim_start();
    match ordered_marker(trimmed) {
        Some(len) => trimmed[len..].trim_start().to_string(),
        None => trimmed.to_string(),
    }
}
