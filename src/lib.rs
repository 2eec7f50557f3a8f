//! Find the differences between two sequences of lines and render them
//!
//! A [`SequenceMatcher`] finds the blocks two sequences have in common and describes how to turn
//! one into the other as a list of [`Opcode`]s. A [`Differ`] applies that to lines of text,
//! honoring the comparison options in [`DiffOptions`], and groups the opcodes into hunks with a
//! limited amount of unchanged context. A [`Renderer`] turns those hunks into output.
//!
//! ```
//! use opdiff::{DiffOptions, RendererConfig, compute};
//!
//! let old = "a\nb\nc";
//! let new = "a\nx\nc";
//!
//! let unified = compute(old, new, "Unified", DiffOptions::new(), RendererConfig::default()).unwrap();
//! assert_eq!(unified, "@@ -1,3 +1,3 @@\n a\n-b\n+x\n c\n");
//!
//! let same = compute(old, old, "SideBySide", DiffOptions::new(), RendererConfig::default()).unwrap();
//! assert_eq!(same, "");
//! ```

mod diff;
mod error;
mod matcher;
mod range;
mod render;
mod utils;

pub use diff::{
    Change, DetailLevel, DiffOptions, Differ, LineDetail, LineSpan, Segment,
};
pub use error::{Error, Result, Side};
pub use matcher::{AUTOJUNK_MIN_LEN, Match, Opcode, SequenceMatcher, Tag, group_opcodes};
pub use render::{
    Constructor, Descriptor, Format, Inline, Json, Language, MAX_TAB_SIZE, Registry, Renderer,
    RendererConfig, RendererOptions, RendererState, SideBySide, Unified,
};
pub use utils::split_lines;

/// One side of a diff, either a block of text or lines which have already been split
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input<'a> {
    Text(&'a str),
    Lines(Vec<&'a str>),
}

impl<'a> Input<'a> {
    /// Split text on `\n`; already split lines must not contain a `\n` themselves
    pub fn into_lines(self, side: Side) -> Result<Vec<&'a str>> {
        match self {
            Input::Text(text) => Ok(split_lines(text)),
            Input::Lines(lines) => match lines.iter().position(|line| line.contains('\n')) {
                Some(index) => Err(Error::InvalidSequence { side, index }),
                None => Ok(lines),
            },
        }
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self {
        Input::Text(text)
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(text: &'a String) -> Self {
        Input::Text(text)
    }
}

impl<'a> From<Vec<&'a str>> for Input<'a> {
    fn from(lines: Vec<&'a str>) -> Self {
        Input::Lines(lines)
    }
}

impl<'a> From<&[&'a str]> for Input<'a> {
    fn from(lines: &[&'a str]) -> Self {
        Input::Lines(lines.to_vec())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for Input<'a> {
    fn from(lines: [&'a str; N]) -> Self {
        Input::Lines(lines.to_vec())
    }
}

impl<'a> From<&'a [String]> for Input<'a> {
    fn from(lines: &'a [String]) -> Self {
        Input::Lines(lines.iter().map(String::as_str).collect())
    }
}

impl Registry {
    /// Diff `old` against `new` and render the result in the format registered as `format`.
    ///
    /// Equal inputs skip the diff entirely and produce the format's identical result.
    pub fn compute<'a>(
        &self,
        old: impl Into<Input<'a>>,
        new: impl Into<Input<'a>>,
        format: &str,
        diff_options: DiffOptions,
        config: RendererConfig,
    ) -> Result<String> {
        let renderer = self.create(format, config)?;
        let old = old.into().into_lines(Side::Old)?;
        let new = new.into().into_lines(Side::New)?;

        if old == new {
            return Ok(renderer.descriptor().identical_result.to_owned());
        }

        let differ = Differ::new(old, new, diff_options);
        Ok(renderer.render(&differ))
    }
}

/// Diff `old` against `new` and render the result with one of the built-in formats
///
/// See [`Registry::compute`].
pub fn compute<'a>(
    old: impl Into<Input<'a>>,
    new: impl Into<Input<'a>>,
    format: &str,
    diff_options: DiffOptions,
    config: RendererConfig,
) -> Result<String> {
    Registry::default().compute(old, new, format, diff_options, config)
}
