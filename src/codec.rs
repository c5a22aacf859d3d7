//! The intermediate `detected_texts.txt` format.
//!
//! ```text
//! <id>:
//! <text, one or more lines>
//!
//! <id>:
//! ...
//! ```
//!
//! Blocks are separated by one or more blank lines. Nothing is escaped, so a
//! text line ending in `:` that directly follows a blank line reads back as a
//! header, and a blank line inside a text splits it into two blocks.

use crate::batch::Batch;
use thiserror::Error;

/// A recoverable problem found while decoding an edited document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeWarning {
    /// The block was dropped.
    #[error("block header does not end with ':' -> {0}")]
    MalformedHeader(String),
    /// The entry was kept with empty text.
    #[error("no text found for image {0}")]
    EmptyText(String),
}

#[derive(Debug, Clone, Default)]
pub struct Decoded {
    pub batch: Batch,
    pub warnings: Vec<DecodeWarning>,
}

pub fn encode(batch: &Batch) -> String {
    let mut out = String::new();
    for (id, text) in batch.iter() {
        out.push_str(id);
        out.push_str(":\n");
        if !text.is_empty() {
            out.push_str(text);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn decode(document: &str) -> Decoded {
    let document = document.strip_prefix('\u{feff}').unwrap_or(document);
    let mut decoded = Decoded::default();

    for block in split_blocks(document) {
        let Some((header, body)) = block.split_first() else {
            continue;
        };

        let header = header.trim_end();
        let Some(id) = header.strip_suffix(':') else {
            decoded
                .warnings
                .push(DecodeWarning::MalformedHeader(header.trim().to_string()));
            continue;
        };
        let id = id.trim();

        let text = body
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join("\n");
        if text.is_empty() {
            decoded.warnings.push(DecodeWarning::EmptyText(id.to_string()));
        }

        decoded.batch.insert(id, text);
    }

    decoded
}

/// Groups consecutive non-blank lines. Lines that are empty or whitespace-only
/// act as separators, however many there are.
fn split_blocks(document: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in document.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_lines_separate_blocks() {
        let blocks = split_blocks("a:\nx\n  \t\n\n\nb:\ny\n");
        assert_eq!(blocks, vec![vec!["a:", "x"], vec!["b:", "y"]]);
    }

    #[test]
    fn trailing_block_without_newline() {
        let blocks = split_blocks("a:\nx");
        assert_eq!(blocks, vec![vec!["a:", "x"]]);
    }
}
