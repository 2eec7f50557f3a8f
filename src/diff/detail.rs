//! Intra-line differences between a pair of replaced lines

use crate::{
    matcher::{Opcode, SequenceMatcher, Tag},
    range::Range,
};
use serde::{Deserialize, Serialize};

/// How finely paired lines of a replacement are compared
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Paired lines are shown as they are
    None,
    /// Mark everything between the common prefix and the common suffix
    #[default]
    Line,
    /// Mark the words which differ
    Word,
    /// Mark the characters which differ
    Char,
}

/// A piece of a line, flagged if it differs from the paired line
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub changed: bool,
}

/// The segments of both lines of a pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDetail<'a> {
    pub old: Vec<Segment<'a>>,
    pub new: Vec<Segment<'a>>,
}

struct Tokens<'a> {
    text: &'a str,
    tokens: Vec<&'a str>,
    // Byte offset of every token, plus the end of the text
    bounds: Vec<usize>,
}

impl<'a> Tokens<'a> {
    fn chars(text: &'a str) -> Self {
        Self::split(text, |_, _| true)
    }

    fn words(text: &'a str) -> Self {
        fn class(c: char) -> u8 {
            if c.is_alphanumeric() || c == '_' {
                0
            } else if c.is_whitespace() {
                1
            } else {
                2
            }
        }

        Self::split(text, |prev, c| {
            let prev = class(prev);
            prev != class(c) || prev == 2
        })
    }

    // `boundary(prev, c)` decides if a new token starts at `c`
    fn split(text: &'a str, boundary: impl Fn(char, char) -> bool) -> Self {
        let mut bounds = Vec::new();
        let mut prev = None;
        for (idx, c) in text.char_indices() {
            if prev.is_none_or(|prev| boundary(prev, c)) {
                bounds.push(idx);
            }
            prev = Some(c);
        }
        bounds.push(text.len());

        let tokens = bounds.windows(2).map(|w| &text[w[0]..w[1]]).collect();
        Self {
            text,
            tokens,
            bounds,
        }
    }

    fn span(&self, start: usize, end: usize) -> &'a str {
        &self.text[self.bounds[start]..self.bounds[end]]
    }

    fn segments(&self, spans: &[(usize, usize, bool)]) -> Vec<Segment<'a>> {
        spans
            .iter()
            .map(|&(start, end, changed)| Segment {
                text: self.span(start, end),
                changed,
            })
            .collect()
    }
}

pub(crate) fn line_detail<'a>(
    old: &'a str,
    new: &'a str,
    level: DetailLevel,
) -> Option<LineDetail<'a>> {
    let (old_tokens, new_tokens) = match level {
        DetailLevel::None => return None,
        DetailLevel::Line | DetailLevel::Char => (Tokens::chars(old), Tokens::chars(new)),
        DetailLevel::Word => (Tokens::words(old), Tokens::words(new)),
    };

    let opcodes = if level == DetailLevel::Line {
        trim_affixes(&old_tokens.tokens, &new_tokens.tokens)
    } else {
        SequenceMatcher::without_autojunk(&old_tokens.tokens, &new_tokens.tokens)
            .opcodes()
            .to_vec()
    };

    let mut old_spans = Vec::new();
    let mut new_spans = Vec::new();
    for op in opcodes {
        let changed = op.tag != Tag::Equal;
        push_span(&mut old_spans, op.old_start, op.old_end, changed);
        push_span(&mut new_spans, op.new_start, op.new_end, changed);
    }

    let detail = LineDetail {
        old: old_tokens.segments(&old_spans),
        new: new_tokens.segments(&new_spans),
    };
    Some(detail)
}

// Opcodes covering the common prefix, the differing middle and the common suffix
fn trim_affixes(old: &[&str], new: &[&str]) -> Vec<Opcode> {
    let old = Range::new(old, ..);
    let new = Range::new(new, ..);
    let prefix = old.common_prefix_len(new);
    let suffix = old.slice(prefix..).common_suffix_len(new.slice(prefix..));
    let old_mid = prefix..old.len() - suffix;
    let new_mid = prefix..new.len() - suffix;

    let mut opcodes = Vec::with_capacity(3);
    if prefix > 0 {
        opcodes.push(Opcode::new(Tag::Equal, 0..prefix, 0..prefix));
    }
    let tag = match (old_mid.is_empty(), new_mid.is_empty()) {
        (true, true) => None,
        (true, false) => Some(Tag::Insert),
        (false, true) => Some(Tag::Delete),
        (false, false) => Some(Tag::Replace),
    };
    if let Some(tag) = tag {
        opcodes.push(Opcode::new(tag, old_mid.clone(), new_mid.clone()));
    }
    if suffix > 0 {
        opcodes.push(Opcode::new(
            Tag::Equal,
            old_mid.end..old.len(),
            new_mid.end..new.len(),
        ));
    }
    opcodes
}

// Spans of consecutive opcodes are contiguous on each side, so neighbours with the same flag merge
fn push_span(spans: &mut Vec<(usize, usize, bool)>, start: usize, end: usize, changed: bool) {
    if start == end {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.2 == changed => last.1 = end,
        _ => spans.push((start, end, changed)),
    }
}
