use crate::{
    error::Result,
    matcher::{Opcode, SequenceMatcher, Tag, group_opcodes},
    utils::{Classifier, Normalization},
};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

mod detail;


pub use detail::{DetailLevel, LineDetail, Segment};

/// Options which control how two sequences of lines are compared
///
/// Deserializes from a JSON object with camelCase keys; missing keys keep their defaults.
///
/// ```
/// use opdiff::{DetailLevel, DiffOptions};
///
/// let options = DiffOptions::from_json(r#"{ "contextLines": 1, "ignoreCase": true }"#).unwrap();
/// assert_eq!(options.context_lines, 1);
/// assert!(options.ignore_case);
/// assert_eq!(options.detail_level, DetailLevel::Line);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct DiffOptions {
    /// Unchanged lines kept around each change, `usize::MAX` keeps all of them
    pub context_lines: usize,
    pub ignore_case: bool,
    pub ignore_whitespace: bool,
    pub ignore_line_ending: bool,
    /// Granularity of the second pass over paired replaced lines
    pub detail_level: DetailLevel,
    /// Lines longer than this many chars are not compared in detail
    pub length_limit: usize,
}

impl DiffOptions {
    pub const DEFAULT_CONTEXT_LINES: usize = 3;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn set_context_lines(&mut self, context_lines: usize) -> &mut Self {
        self.context_lines = context_lines;
        self
    }

    pub fn set_detail_level(&mut self, detail_level: DetailLevel) -> &mut Self {
        self.detail_level = detail_level;
        self
    }

    fn normalization(&self) -> Normalization {
        Normalization {
            ignore_case: self.ignore_case,
            ignore_whitespace: self.ignore_whitespace,
            ignore_line_ending: self.ignore_line_ending,
        }
    }
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            context_lines: Self::DEFAULT_CONTEXT_LINES,
            ignore_case: false,
            ignore_whitespace: false,
            ignore_line_ending: false,
            detail_level: DetailLevel::default(),
            length_limit: 2000,
        }
    }
}

/// Lines of one side of a [`Change`], along with the index of the first one
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineSpan<'a> {
    pub offset: usize,
    pub lines: &'a [&'a str],
}

/// An opcode resolved against the lines it refers to
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Change<'a> {
    pub tag: Tag,
    pub old: LineSpan<'a>,
    pub new: LineSpan<'a>,
}

/// The difference between two sequences of lines
///
/// Opcodes are computed when first asked for and cached until the lines or the options they
/// depend on change. Lines are compared through normalized copies; the originals are what
/// renderers get to see.
#[derive(Debug)]
pub struct Differ<'a> {
    old: Vec<&'a str>,
    new: Vec<&'a str>,
    options: DiffOptions,

    opcodes: OnceLock<Vec<Opcode>>,
    grouped_opcodes: OnceLock<Vec<Vec<Opcode>>>,
}

impl<'a> Differ<'a> {
    pub fn new(old: Vec<&'a str>, new: Vec<&'a str>, options: DiffOptions) -> Self {
        Self {
            old,
            new,
            options,
            opcodes: OnceLock::new(),
            grouped_opcodes: OnceLock::new(),
        }
    }

    pub fn old_lines(&self) -> &[&'a str] {
        &self.old
    }

    pub fn new_lines(&self) -> &[&'a str] {
        &self.new
    }

    pub fn options(&self) -> &DiffOptions {
        &self.options
    }

    pub fn set_old(&mut self, old: Vec<&'a str>) -> &mut Self {
        if self.old != old {
            self.old = old;
            self.invalidate();
        }
        self
    }

    pub fn set_new(&mut self, new: Vec<&'a str>) -> &mut Self {
        if self.new != new {
            self.new = new;
            self.invalidate();
        }
        self
    }

    pub fn set_options(&mut self, options: DiffOptions) -> &mut Self {
        if self.options.normalization() != options.normalization() {
            self.invalidate();
        } else if self.options.context_lines != options.context_lines {
            self.grouped_opcodes = OnceLock::new();
        }
        self.options = options;
        self
    }

    fn invalidate(&mut self) {
        tracing::debug!("discarding cached opcodes");
        self.opcodes = OnceLock::new();
        self.grouped_opcodes = OnceLock::new();
    }

    /// The opcodes which turn the old lines into the new lines
    pub fn opcodes(&self) -> &[Opcode] {
        self.opcodes.get_or_init(|| {
            tracing::debug!(
                old = self.old.len(),
                new = self.new.len(),
                "computing opcodes"
            );
            let mut classifier = Classifier::new(self.options.normalization());
            let old = classifier.classify_lines(&self.old);
            let new = classifier.classify_lines(&self.new);
            SequenceMatcher::new(&old, &new).opcodes().to_vec()
        })
    }

    /// The opcodes split into groups with at most `context_lines` of unchanged context
    pub fn grouped_opcodes(&self) -> &[Vec<Opcode>] {
        self.grouped_opcodes
            .get_or_init(|| group_opcodes(self.opcodes(), self.options.context_lines))
    }

    /// Returns true if any line was inserted, deleted or replaced
    pub fn has_changes(&self) -> bool {
        self.opcodes().iter().any(|op| op.tag != Tag::Equal)
    }

    /// The grouped opcodes resolved against the lines they cover
    pub fn changes(&self) -> Vec<Vec<Change<'_>>> {
        self.grouped_opcodes()
            .iter()
            .map(|group| group.iter().map(|op| self.change(op)).collect())
            .collect()
    }

    fn change(&self, op: &Opcode) -> Change<'_> {
        Change {
            tag: op.tag,
            old: LineSpan {
                offset: op.old_start,
                lines: &self.old[op.old_range()],
            },
            new: LineSpan {
                offset: op.new_start,
                lines: &self.new[op.new_range()],
            },
        }
    }

    /// Compare a pair of replaced lines at the configured detail level.
    ///
    /// Returns `None` if detail is disabled or either line exceeds the length limit.
    pub fn line_detail<'l>(&self, old: &'l str, new: &'l str) -> Option<LineDetail<'l>> {
        let limit = self.options.length_limit;
        if old.chars().count() > limit || new.chars().count() > limit {
            return None;
        }
        detail::line_detail(old, new, self.options.detail_level)
    }
}
