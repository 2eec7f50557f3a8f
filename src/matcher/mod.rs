//! Find matching blocks between two sequences and turn them into opcodes
//!
//! The matcher looks for the longest contiguous matching block, then recursively does the same on
//! the pieces to the left and to the right of it. This doesn't yield a minimal edit script, but it
//! tends to produce matches that look right to people reading the result.

use crate::range::Range;
use hashbrown::HashMap;
use serde::Serialize;
use std::{cmp, hash::Hash, mem, ops, sync::OnceLock};


/// Sequences shorter than this are never subject to autojunk
pub const AUTOJUNK_MIN_LEN: usize = 200;

/// A maximal run of elements common to both sequences
///
/// `old[a..a + len] == new[b..b + len]`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub a: usize,
    pub b: usize,
    pub len: usize,
}

impl Match {
    pub fn new(a: usize, b: usize, len: usize) -> Self {
        Self { a, b, len }
    }
}

/// The kind of edit an [`Opcode`] describes
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Tag {
    #[serde(rename = "eq")]
    Equal,
    #[serde(rename = "ins")]
    Insert,
    #[serde(rename = "del")]
    Delete,
    #[serde(rename = "rep")]
    Replace,
}

impl Tag {
    /// Short name used in rendered output
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Equal => "eq",
            Tag::Insert => "ins",
            Tag::Delete => "del",
            Tag::Replace => "rep",
        }
    }
}

/// Describes how to turn `old[old_start..old_end]` into `new[new_start..new_end]`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub old_start: usize,
    pub old_end: usize,
    pub new_start: usize,
    pub new_end: usize,
}

impl Opcode {
    pub fn new(tag: Tag, old: ops::Range<usize>, new: ops::Range<usize>) -> Self {
        Self {
            tag,
            old_start: old.start,
            old_end: old.end,
            new_start: new.start,
            new_end: new.end,
        }
    }

    pub fn old_range(&self) -> ops::Range<usize> {
        self.old_start..self.old_end
    }

    pub fn new_range(&self) -> ops::Range<usize> {
        self.new_start..self.new_end
    }
}

/// Compares two sequences of hashable elements
///
/// Matching blocks and opcodes are computed on first use and cached for the lifetime of the
/// matcher.
///
/// ```
/// use opdiff::{Opcode, SequenceMatcher, Tag};
///
/// let old = ["a", "b", "c"];
/// let new = ["a", "x", "c"];
/// let matcher = SequenceMatcher::new(&old, &new);
///
/// assert_eq!(
///     matcher.opcodes(),
///     [
///         Opcode::new(Tag::Equal, 0..1, 0..1),
///         Opcode::new(Tag::Replace, 1..2, 1..2),
///         Opcode::new(Tag::Equal, 2..3, 2..3),
///     ]
/// );
/// ```
pub struct SequenceMatcher<'a, T> {
    a: &'a [T],
    b: &'a [T],

    // Positions of every element of `b` which may anchor a match
    b2j: HashMap<&'a T, Vec<usize>>,
    // Elements removed from `b2j` by autojunk
    popular: HashMap<&'a T, Vec<usize>>,

    matching_blocks: OnceLock<Vec<Match>>,
    opcodes: OnceLock<Vec<Opcode>>,
}

impl<'a, T> SequenceMatcher<'a, T>
where
    T: Hash + Eq,
{
    /// Construct a matcher with autojunk enabled
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        Self::build(a, b, true, |_| false)
    }

    /// Construct a matcher which anchors on every element of `b`, however common
    pub fn without_autojunk(a: &'a [T], b: &'a [T]) -> Self {
        Self::build(a, b, false, |_| false)
    }

    /// Construct a matcher with autojunk enabled, except for elements where `never_junk` is true
    pub fn with_never_junk<F>(a: &'a [T], b: &'a [T], never_junk: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        Self::build(a, b, true, never_junk)
    }

    fn build<F>(a: &'a [T], b: &'a [T], autojunk: bool, never_junk: F) -> Self
    where
        F: Fn(&T) -> bool,
    {
        let mut b2j: HashMap<&'a T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(elt).or_default().push(j);
        }

        let mut popular = HashMap::new();
        let n = b.len();
        if autojunk && n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            let junk: Vec<&'a T> = b2j
                .iter()
                .filter(|(elt, idxs)| idxs.len() > ntest && !never_junk(elt))
                .map(|(elt, _)| *elt)
                .collect();
            for elt in junk {
                if let Some((elt, idxs)) = b2j.remove_entry(elt) {
                    popular.insert(elt, idxs);
                }
            }
            if !popular.is_empty() {
                tracing::trace!(len = n, popular = popular.len(), "autojunk activated");
            }
        }

        Self {
            a,
            b,
            b2j,
            popular,
            matching_blocks: OnceLock::new(),
            opcodes: OnceLock::new(),
        }
    }

    /// Returns true if `elt` was excluded from match anchoring by autojunk
    pub fn is_popular(&self, elt: &T) -> bool {
        self.popular.contains_key(elt)
    }

    fn positions(&self, elt: &T, with_popular: bool) -> &[usize] {
        self.b2j
            .get(elt)
            .or_else(|| {
                if with_popular {
                    self.popular.get(elt)
                } else {
                    None
                }
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Find the longest matching block within the given ranges of `a` and `b`.
    ///
    /// Of all maximal blocks, the one starting earliest in `a` wins, and of those the one starting
    /// earliest in `b`. Popular elements only anchor a match if nothing else does. A match of
    /// length zero means the ranges have nothing in common.
    ///
    /// # Panics
    ///
    /// Panics if either range is out of bounds of its sequence.
    pub fn find_longest_match(&self, a: ops::Range<usize>, b: ops::Range<usize>) -> Match {
        self.longest_match(Range::new(self.a, a), Range::new(self.b, b))
    }

    fn longest_match(&self, a: Range<'a, [T]>, b: Range<'a, [T]>) -> Match {
        let mut best = self.longest_anchored(a, b, false);
        if best.len == 0 && !self.popular.is_empty() {
            best = self.longest_anchored(a, b, true);
        }
        if best.len == 0 {
            return best;
        }

        // Popular elements never anchor a match on their own, so glue any equal neighbours back on
        while best.a > a.offset() && best.b > b.offset() && a.at(best.a - 1) == b.at(best.b - 1) {
            best.a -= 1;
            best.b -= 1;
            best.len += 1;
        }
        while best.a + best.len < a.end()
            && best.b + best.len < b.end()
            && a.at(best.a + best.len) == b.at(best.b + best.len)
        {
            best.len += 1;
        }

        best
    }

    fn longest_anchored(&self, a: Range<'a, [T]>, b: Range<'a, [T]>, with_popular: bool) -> Match {
        let mut best = Match::new(a.offset(), b.offset(), 0);

        // `j2len[j]` is the length of the longest match ending with `a[i - 1]` and `b[j]`
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        let mut new_j2len: HashMap<usize, usize> = HashMap::new();

        for (i, elt) in a.iter().enumerate() {
            let i = a.offset() + i;
            for &j in self.positions(elt, with_popular) {
                if j < b.offset() {
                    continue;
                }
                if j >= b.end() {
                    break;
                }

                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                new_j2len.insert(j, k);
                if k > best.len {
                    best = Match::new(i + 1 - k, j + 1 - k, k);
                }
            }
            mem::swap(&mut j2len, &mut new_j2len);
            new_j2len.clear();
        }

        best
    }

    /// All matching blocks in increasing order, terminated by a `(len(a), len(b), 0)` sentinel.
    ///
    /// Adjacent blocks are merged, so no two consecutive non-sentinel blocks touch on both sides.
    pub fn matching_blocks(&self) -> &[Match] {
        self.matching_blocks
            .get_or_init(|| self.compute_matching_blocks())
    }

    fn compute_matching_blocks(&self) -> Vec<Match> {
        let mut queue = vec![(Range::new(self.a, ..), Range::new(self.b, ..))];
        let mut blocks = Vec::new();

        while let Some((a, b)) = queue.pop() {
            let m = self.longest_match(a, b);
            if m.len == 0 {
                continue;
            }

            if a.offset() < m.a && b.offset() < m.b {
                queue.push((a.between(a.offset(), m.a), b.between(b.offset(), m.b)));
            }
            if m.a + m.len < a.end() && m.b + m.len < b.end() {
                queue.push((
                    a.between(m.a + m.len, a.end()),
                    b.between(m.b + m.len, b.end()),
                ));
            }
            blocks.push(m);
        }
        blocks.sort_unstable_by_key(|m| (m.a, m.b));

        let mut collapsed: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for m in blocks {
            match collapsed.last_mut() {
                Some(last) if last.a + last.len == m.a && last.b + last.len == m.b => {
                    last.len += m.len;
                }
                _ => collapsed.push(m),
            }
        }
        tracing::trace!(blocks = collapsed.len(), "computed matching blocks");

        collapsed.push(Match::new(self.a.len(), self.b.len(), 0));
        collapsed
    }

    /// The opcodes which turn `a` into `b`
    ///
    /// The spans of consecutive opcodes are adjacent on both sides and together cover all of `a`
    /// and all of `b`. Two empty sequences produce no opcodes.
    pub fn opcodes(&self) -> &[Opcode] {
        self.opcodes.get_or_init(|| opcodes_from_blocks(self.matching_blocks()))
    }

    /// The opcodes split into groups with at most `context` lines of unchanged context
    pub fn grouped_opcodes(&self, context: usize) -> Vec<Vec<Opcode>> {
        group_opcodes(self.opcodes(), context)
    }
}

fn opcodes_from_blocks(blocks: &[Match]) -> Vec<Opcode> {
    let mut opcodes = Vec::new();
    let mut i = 0;
    let mut j = 0;

    for m in blocks {
        let tag = match (i < m.a, j < m.b) {
            (true, true) => Some(Tag::Replace),
            (true, false) => Some(Tag::Delete),
            (false, true) => Some(Tag::Insert),
            (false, false) => None,
        };
        if let Some(tag) = tag {
            opcodes.push(Opcode::new(tag, i..m.a, j..m.b));
        }

        i = m.a + m.len;
        j = m.b + m.len;
        if m.len > 0 {
            opcodes.push(Opcode::new(Tag::Equal, m.a..i, m.b..j));
        }
    }

    opcodes
}

/// Split `opcodes` into groups separated by runs of more than `2 * context` unchanged lines.
///
/// Each group keeps at most `context` unchanged lines next to each of its changes. The leading
/// and trailing unchanged runs are trimmed on their outer side only. A group consisting of
/// nothing but unchanged lines is never produced, so equal sequences produce no groups. A
/// `context` of `usize::MAX` keeps everything in a single group.
pub fn group_opcodes(opcodes: &[Opcode], context: usize) -> Vec<Vec<Opcode>> {
    let mut codes = opcodes.to_vec();

    if let Some(first) = codes.first_mut().filter(|op| op.tag == Tag::Equal) {
        first.old_start = cmp::max(first.old_start, first.old_end.saturating_sub(context));
        first.new_start = cmp::max(first.new_start, first.new_end.saturating_sub(context));
    }
    if let Some(last) = codes.last_mut().filter(|op| op.tag == Tag::Equal) {
        last.old_end = cmp::min(last.old_end, last.old_start.saturating_add(context));
        last.new_end = cmp::min(last.new_end, last.new_start.saturating_add(context));
    }

    let double_context = context.saturating_mul(2);
    let mut groups = Vec::new();
    let mut group = Vec::new();

    for mut op in codes {
        if op.tag == Tag::Equal && op.old_end - op.old_start > double_context {
            group.push(Opcode::new(
                Tag::Equal,
                op.old_start..cmp::min(op.old_end, op.old_start.saturating_add(context)),
                op.new_start..cmp::min(op.new_end, op.new_start.saturating_add(context)),
            ));
            groups.push(mem::take(&mut group));

            op.old_start = cmp::max(op.old_start, op.old_end.saturating_sub(context));
            op.new_start = cmp::max(op.new_start, op.new_end.saturating_sub(context));
        }
        group.push(op);
    }

    if !(group.is_empty() || (group.len() == 1 && group[0].tag == Tag::Equal)) {
        groups.push(group);
    }

    // Trimming with a context of zero leaves empty equal spans behind
    for group in &mut groups {
        group.retain(|op| op.tag != Tag::Equal || op.old_start < op.old_end);
    }
    groups
}
