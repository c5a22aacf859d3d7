use crate::config::Normalize;
use anyhow::{Context, Result};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Turns raw OCR output into the single-line text placed in a batch.
///
/// The block format is line oriented, so every line break the OCR engine
/// reports becomes a space here, before the text is ever encoded.
pub struct TextNormalizer {
    normalize_unicode: bool,
    collapse_whitespace: bool,
    strip: Vec<Regex>,
}

impl TextNormalizer {
    pub fn new(cfg: &Normalize) -> Result<Self> {
        let strip = cfg
            .strip_patterns
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("invalid normalize.strip_patterns entry: {p}")))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            normalize_unicode: cfg.normalize_unicode,
            collapse_whitespace: cfg.collapse_whitespace,
            strip,
        })
    }

    pub fn normalize(&self, raw: &str) -> String {
        let mut s = if self.normalize_unicode {
            raw.nfkc().collect::<String>()
        } else {
            raw.to_string()
        };

        s = single_line(&sanitize_control_chars(&s));

        for r in &self.strip {
            s = r.replace_all(&s, "").into_owned();
        }

        if self.collapse_whitespace {
            s = s.split_whitespace().collect::<Vec<_>>().join(" ");
        }

        s.trim().to_string()
    }
}

fn single_line(s: &str) -> String {
    s.trim().replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn sanitize_control_chars(s: &str) -> String {
    s.chars()
        .filter(|&ch| ch == '\n' || ch == '\r' || ch == '\t' || !ch.is_control())
        .collect()
}
