use super::{Descriptor, Format, Renderer, RendererConfig, RendererOptions, RendererState};
use crate::{
    diff::{Change, Differ},
    error::Result,
    matcher::Tag,
};
use std::fmt::{self, Display, Formatter};

/// Plain text in the unified format, one `@@` hunk per group
///
/// With the `color` feature enabled the `color` option highlights hunks with ANSI escapes.
#[derive(Clone, Debug)]
pub struct Unified {
    state: RendererState,
}

impl Format for Unified {
    const DESCRIPTOR: Descriptor = Descriptor {
        name: "Unified",
        description: "Unified",
        is_markup: false,
        identical_result: "",
    };

    fn with_config(config: RendererConfig) -> Result<Self> {
        Ok(Self {
            state: RendererState::new(config, Self::default_options())?,
        })
    }
}

impl Renderer for Unified {
    fn descriptor(&self) -> Descriptor {
        Self::DESCRIPTOR
    }

    fn options(&self) -> &RendererOptions {
        self.state.options()
    }

    fn set_options(&mut self, config: RendererConfig) -> Result<()> {
        self.state.apply(config, Self::default_options())
    }

    fn fmt_diff(&self, diff: &Differ<'_>, f: &mut Formatter<'_>) -> fmt::Result {
        let styles = Styles::new(self.options().color);
        for group in diff.changes() {
            write!(f, "{}", HunkDisplay { styles, group: &group })?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct HunkRange {
    /// The starting line number of a hunk
    start: usize,
    /// The hunk size (number of lines)
    len: usize,
}

impl HunkRange {
    fn new(offset: usize, len: usize) -> Self {
        let start = if len > 0 { offset + 1 } else { offset };
        Self { start, len }
    }
}

impl Display for HunkRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.start)?;
        if self.len != 1 {
            write!(f, ",{}", self.len)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone)]
struct Styles {
    #[cfg(feature = "color")]
    enabled: bool,
}

#[derive(Copy, Clone)]
enum Kind {
    Context,
    Delete,
    Insert,
    HunkHeader,
}

impl Styles {
    #[cfg(feature = "color")]
    fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[cfg(not(feature = "color"))]
    fn new(_enabled: bool) -> Self {
        Self {}
    }

    #[cfg(feature = "color")]
    fn style(&self, kind: Kind) -> Option<anstyle::Style> {
        use anstyle::{AnsiColor, Style};

        if !self.enabled {
            return None;
        }
        match kind {
            Kind::Context => None,
            Kind::Delete => Some(Style::new().fg_color(Some(AnsiColor::Red.into()))),
            Kind::Insert => Some(Style::new().fg_color(Some(AnsiColor::Green.into()))),
            Kind::HunkHeader => Some(Style::new().fg_color(Some(AnsiColor::Cyan.into()))),
        }
    }

    fn write(&self, f: &mut Formatter<'_>, kind: Kind, content: impl Display) -> fmt::Result {
        #[cfg(feature = "color")]
        if let Some(style) = self.style(kind) {
            return writeln!(f, "{}{}{}", style.render(), content, style.render_reset());
        }

        let _ = kind;
        writeln!(f, "{content}")
    }
}

struct HunkDisplay<'a> {
    styles: Styles,
    group: &'a [Change<'a>],
}

impl Display for HunkDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (Some(first), Some(last)) = (self.group.first(), self.group.last()) else {
            return Ok(());
        };
        let old_end = last.old.offset + last.old.lines.len();
        let new_end = last.new.offset + last.new.lines.len();
        let old_range = HunkRange::new(first.old.offset, old_end - first.old.offset);
        let new_range = HunkRange::new(first.new.offset, new_end - first.new.offset);

        self.styles.write(
            f,
            Kind::HunkHeader,
            format_args!("@@ -{old_range} +{new_range} @@"),
        )?;

        for change in self.group {
            if change.tag == Tag::Equal {
                for line in change.old.lines {
                    self.styles.write(f, Kind::Context, format_args!(" {line}"))?;
                }
                continue;
            }
            for line in change.old.lines {
                self.styles.write(f, Kind::Delete, format_args!("-{line}"))?;
            }
            for line in change.new.lines {
                self.styles.write(f, Kind::Insert, format_args!("+{line}"))?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diff::DiffOptions, utils::split_lines};

    fn render(old: &str, new: &str, options: DiffOptions) -> String {
        let differ = Differ::new(split_lines(old), split_lines(new), options);
        Unified::with_config(RendererConfig::default())
            .unwrap()
            .render(&differ)
    }

    #[test]
    fn hunk_range() {
        assert_eq!(HunkRange::new(0, 0).to_string(), "0,0");
        assert_eq!(HunkRange::new(3, 1).to_string(), "4");
        assert_eq!(HunkRange::new(3, 0).to_string(), "3,0");
        assert_eq!(HunkRange::new(0, 7).to_string(), "1,7");
    }

    #[test]
    fn single_hunk() {
        let a = "A\nB\nC\nA\nB\nB\nA";
        let b = "C\nB\nA\nB\nA\nC";
        let expected = "\
@@ -1,7 +1,6 @@
+C
+B
 A
 B
+A
 C
-A
-B
-B
-A
";
        assert_eq!(render(a, b, DiffOptions::new()), expected);
    }

    #[test]
    fn separate_hunks() {
        let old: Vec<String> = (1..=12).map(|i| i.to_string()).collect();
        let mut new = old.clone();
        new[0] = "one".to_owned();
        new.push("13".to_owned());
        let old = old.join("\n");
        let new = new.join("\n");

        let mut options = DiffOptions::new();
        options.set_context_lines(1);
        let expected = "\
@@ -1,2 +1,2 @@
-1
+one
 2
@@ -12 +12,2 @@
 12
+13
";
        assert_eq!(render(&old, &new, options), expected);
    }

    #[test]
    fn identical() {
        assert_eq!(render("a\nb", "a\nb", DiffOptions::new()), "");
    }

    #[cfg(feature = "color")]
    #[test]
    fn colorized() {
        let differ = Differ::new(vec!["a"], vec!["b"], DiffOptions::new());
        let renderer = Unified::with_config(RendererConfig {
            color: Some(true),
            ..RendererConfig::default()
        })
        .unwrap();
        let output = renderer.render(&differ);
        assert!(output.contains("\x1b[31m-a"));
        assert!(output.contains("\x1b[32m+b"));
    }
}
