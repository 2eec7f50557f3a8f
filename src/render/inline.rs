use super::{
    Descriptor, Format, Renderer, RendererConfig, RendererOptions, RendererState,
    html::{self, NBSP},
};
use crate::{
    diff::{Change, Differ, Segment},
    error::Result,
    matcher::Tag,
};
use std::fmt::{self, Formatter};

/// Single-column HTML table, deleted lines followed by the lines inserted in their place
#[derive(Clone, Debug)]
pub struct Inline {
    state: RendererState,
}

impl Format for Inline {
    const DESCRIPTOR: Descriptor = Descriptor {
        name: "Inline",
        description: "Inline",
        is_markup: true,
        identical_result: "",
    };

    fn with_config(config: RendererConfig) -> Result<Self> {
        Ok(Self {
            state: RendererState::new(config, Self::default_options())?,
        })
    }
}

#[derive(Copy, Clone)]
enum Row<'a> {
    Context(usize, usize, &'a str),
    Delete(usize, Line<'a>),
    Insert(usize, Line<'a>),
}

#[derive(Copy, Clone)]
enum Line<'a> {
    Whole(&'a str),
    Detail(&'a [Segment<'a>]),
}

impl Renderer for Inline {
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
        f.write_str(r#"<table class="diff diff-html diff-inline">"#)?;
        write!(
            f,
            r#"<thead><tr><th>{}</th><th>{}</th><th></th><th>{}</th></tr></thead>"#,
            html::escape(self.state.translate("old_version")),
            html::escape(self.state.translate("new_version")),
            html::escape(self.state.translate("differences")),
        )?;

        for (idx, group) in diff.changes().iter().enumerate() {
            if idx > 0 && self.options().separate_block {
                write!(
                    f,
                    r#"<tbody class="skipped"><tr><th>&hellip;</th><th>&hellip;</th><th></th><td>{NBSP}</td></tr></tbody>"#
                )?;
            }

            for change in group {
                write!(f, r#"<tbody class="change change-{}">"#, change.tag.as_str())?;
                self.fmt_change(diff, change, f)?;
                f.write_str("</tbody>")?;
            }
        }

        f.write_str("</table>")
    }
}

impl Inline {
    fn fmt_change(
        &self,
        diff: &Differ<'_>,
        change: &Change<'_>,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        let old_no = |no: usize| change.old.offset + no + 1;
        let new_no = |no: usize| change.new.offset + no + 1;

        match change.tag {
            Tag::Equal => {
                for (no, line) in change.old.lines.iter().enumerate() {
                    self.fmt_row(f, Row::Context(old_no(no), new_no(no), line))?;
                }
            }
            Tag::Delete => {
                for (no, line) in change.old.lines.iter().enumerate() {
                    self.fmt_row(f, Row::Delete(old_no(no), Line::Whole(line)))?;
                }
            }
            Tag::Insert => {
                for (no, line) in change.new.lines.iter().enumerate() {
                    self.fmt_row(f, Row::Insert(new_no(no), Line::Whole(line)))?;
                }
            }
            Tag::Replace => {
                // Detail of every pair of lines which share an index
                let details: Vec<_> = change
                    .old
                    .lines
                    .iter()
                    .zip(change.new.lines)
                    .map(|(old, new)| diff.line_detail(old, new))
                    .collect();

                for (no, line) in change.old.lines.iter().enumerate() {
                    let line = match details.get(no) {
                        Some(Some(detail)) => Line::Detail(&detail.old),
                        _ => Line::Whole(line),
                    };
                    self.fmt_row(f, Row::Delete(old_no(no), line))?;
                }
                for (no, line) in change.new.lines.iter().enumerate() {
                    let line = match details.get(no) {
                        Some(Some(detail)) => Line::Detail(&detail.new),
                        _ => Line::Whole(line),
                    };
                    self.fmt_row(f, Row::Insert(new_no(no), line))?;
                }
            }
        }

        Ok(())
    }

    fn fmt_row(&self, f: &mut Formatter<'_>, row: Row<'_>) -> fmt::Result {
        let options = self.options();
        match row {
            Row::Context(old_no, new_no, line) => write!(
                f,
                r#"<tr><th class="n-old">{old_no}</th><th class="n-new">{new_no}</th><th class="sign"></th><td class="old">{}</td></tr>"#,
                html::format_text(line, options)
            ),
            Row::Delete(old_no, line) => {
                write!(
                    f,
                    r#"<tr><th class="n-old">{old_no}</th><th></th><th class="sign del">-</th><td class="old">"#
                )?;
                fmt_line(f, line, "del", options)?;
                f.write_str("</td></tr>")
            }
            Row::Insert(new_no, line) => {
                write!(
                    f,
                    r#"<tr><th></th><th class="n-new">{new_no}</th><th class="sign ins">+</th><td class="new">"#
                )?;
                fmt_line(f, line, "ins", options)?;
                f.write_str("</td></tr>")
            }
        }
    }
}

fn fmt_line(
    f: &mut Formatter<'_>,
    line: Line<'_>,
    tag: &str,
    options: &RendererOptions,
) -> fmt::Result {
    match line {
        Line::Whole(line) => write!(f, "<{tag}>{}</{tag}>", html::format_text(line, options)),
        Line::Detail(segments) => html::write_segments(f, segments, tag, options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::DiffOptions;

    fn render(old: Vec<&str>, new: Vec<&str>) -> String {
        let differ = Differ::new(old, new, DiffOptions::new());
        Inline::with_config(RendererConfig::default())
            .unwrap()
            .render(&differ)
    }

    #[test]
    fn identical() {
        assert_eq!(render(vec!["a"], vec!["a"]), "");
    }

    #[test]
    fn header() {
        assert!(render(vec!["a"], vec![]).starts_with(concat!(
            r#"<table class="diff diff-html diff-inline">"#,
            r#"<thead><tr><th>Old</th><th>New</th><th></th><th>Differences</th></tr></thead>"#,
        )));
    }

    #[test]
    fn replace_lists_deletions_then_insertions() {
        let output = render(vec!["a", "foo bar"], vec!["a", "foo baz", "qux"]);
        let expected = concat!(
            r#"<tbody class="change change-rep">"#,
            r#"<tr><th class="n-old">2</th><th></th><th class="sign del">-</th><td class="old">foo ba<del>r</del></td></tr>"#,
            r#"<tr><th></th><th class="n-new">2</th><th class="sign ins">+</th><td class="new">foo ba<ins>z</ins></td></tr>"#,
            r#"<tr><th></th><th class="n-new">3</th><th class="sign ins">+</th><td class="new"><ins>qux</ins></td></tr>"#,
            "</tbody>",
        );
        assert!(output.contains(expected), "{output}");
        assert!(output.contains(
            r#"<tr><th class="n-old">1</th><th class="n-new">1</th><th class="sign"></th><td class="old">a</td></tr>"#
        ));
    }
}
