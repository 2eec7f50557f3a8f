//! Common utilities

use hashbrown::{HashMap, hash_map::Entry};
use std::borrow::Cow;

/// How lines are folded before they are compared
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Normalization {
    pub ignore_case: bool,
    pub ignore_whitespace: bool,
    pub ignore_line_ending: bool,
}

impl Normalization {
    fn is_identity(&self) -> bool {
        !(self.ignore_case || self.ignore_whitespace || self.ignore_line_ending)
    }

    fn apply<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.is_identity() {
            return Cow::Borrowed(line);
        }

        let mut line = Cow::Borrowed(line);
        if self.ignore_line_ending {
            line = match line {
                Cow::Borrowed(l) => Cow::Borrowed(l.trim_end_matches(['\r', '\n'])),
                Cow::Owned(l) => Cow::Owned(l.trim_end_matches(['\r', '\n']).to_owned()),
            };
        }
        if self.ignore_whitespace && line.contains(char::is_whitespace) {
            line = Cow::Owned(line.chars().filter(|c| !c.is_whitespace()).collect());
        }
        if self.ignore_case {
            let lower = line.to_lowercase();
            if lower != *line {
                line = Cow::Owned(lower);
            }
        }
        line
    }
}

/// Classifies lines, converting lines into unique `u64`s for quicker comparison
///
/// Two lines receive the same id exactly when their normalized forms are equal, while the
/// original text is left untouched for display.
#[derive(Default)]
pub struct Classifier<'a> {
    next_id: u64,
    normalization: Normalization,
    unique_ids: HashMap<Cow<'a, str>, u64>,
}

impl<'a> Classifier<'a> {
    pub fn new(normalization: Normalization) -> Self {
        Self {
            normalization,
            ..Self::default()
        }
    }

    fn classify(&mut self, record: &'a str) -> u64 {
        match self.unique_ids.entry(self.normalization.apply(record)) {
            Entry::Occupied(o) => *o.get(),
            Entry::Vacant(v) => {
                let id = self.next_id;
                self.next_id += 1;
                *v.insert(id)
            }
        }
    }

    pub fn classify_lines(&mut self, lines: &[&'a str]) -> Vec<u64> {
        lines.iter().map(|line| self.classify(line)).collect()
    }
}

/// Split a block of text on `\n` into its lines.
///
/// The separator is dropped and nothing else is, so `"a\n"` yields `["a", ""]` and the
/// empty string yields a single empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}
