use super::{
    Descriptor, Format, Renderer, RendererConfig, RendererOptions, RendererState,
    html::{self, NBSP},
};
use crate::{
    diff::{Change, Differ, LineSpan, Segment},
    error::Result,
    matcher::Tag,
};
use std::fmt::{self, Formatter};

/// Two-column HTML table with the old lines on the left and the new lines on the right
#[derive(Clone, Debug)]
pub struct SideBySide {
    state: RendererState,
}

impl Format for SideBySide {
    const DESCRIPTOR: Descriptor = Descriptor {
        name: "SideBySide",
        description: "Side by side",
        is_markup: true,
        identical_result: "",
    };

    fn with_config(config: RendererConfig) -> Result<Self> {
        Ok(Self {
            state: RendererState::new(config, Self::default_options())?,
        })
    }
}

impl Renderer for SideBySide {
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
        f.write_str(r#"<table class="diff diff-html diff-side-by-side">"#)?;
        write!(
            f,
            r#"<thead><tr><th colspan="2">{}</th><th colspan="2">{}</th></tr></thead>"#,
            html::escape(self.state.translate("old_version")),
            html::escape(self.state.translate("new_version")),
        )?;

        for (idx, group) in diff.changes().iter().enumerate() {
            // Unchanged lines between groups have been left out
            if idx > 0 && self.options().separate_block {
                write!(
                    f,
                    r#"<tbody class="skipped"><tr><th>&hellip;</th><td>{NBSP}</td><th>&hellip;</th><td>{NBSP}</td></tr></tbody>"#
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

impl SideBySide {
    fn fmt_change(
        &self,
        diff: &Differ<'_>,
        change: &Change<'_>,
        f: &mut Formatter<'_>,
    ) -> fmt::Result {
        let options = self.options();
        let rows = change.old.lines.len().max(change.new.lines.len());

        for no in 0..rows {
            let old = change.old.lines.get(no).copied();
            let new = change.new.lines.get(no).copied();

            let (old_text, new_text) = match (change.tag, old, new) {
                (Tag::Equal, Some(old), Some(new)) => (
                    html::format_text(old, options),
                    html::format_text(new, options),
                ),
                (Tag::Replace, Some(old), Some(new)) => match diff.line_detail(old, new) {
                    Some(detail) => (
                        format!("<span>{}</span>", Segments(&detail.old, "del", options)),
                        format!("<span>{}</span>", Segments(&detail.new, "ins", options)),
                    ),
                    None => (
                        format!("<span>{}</span>", html::format_text(old, options)),
                        format!("<span>{}</span>", html::format_text(new, options)),
                    ),
                },
                (tag, old, new) => (
                    old.map(|line| wrap(tag, "del", line, options))
                        .unwrap_or_default(),
                    new.map(|line| wrap(tag, "ins", line, options))
                        .unwrap_or_default(),
                ),
            };

            f.write_str("<tr>")?;
            fmt_cell(f, "f-num", "old", &change.old, no, old.map(|_| old_text))?;
            fmt_cell(f, "t-num", "new", &change.new, no, new.map(|_| new_text))?;
            f.write_str("</tr>")?;
        }

        Ok(())
    }
}

// Content of a line on its own: deletions and insertions are marked as a whole, replaced lines
// without a partner are emphasized
fn wrap(tag: Tag, element: &str, line: &str, options: &RendererOptions) -> String {
    let element = if tag == Tag::Replace { "span" } else { element };
    format!("<{element}>{}</{element}>", html::format_text(line, options))
}

fn fmt_cell(
    f: &mut Formatter<'_>,
    num_class: &str,
    class: &str,
    span: &LineSpan<'_>,
    no: usize,
    content: Option<String>,
) -> fmt::Result {
    match content {
        Some(content) => write!(
            f,
            r#"<th class="{num_class}">{}</th><td class="{class}">{content}</td>"#,
            span.offset + no + 1
        ),
        None => write!(f, r#"<th>{NBSP}</th><td class="{class}">{NBSP}</td>"#),
    }
}

struct Segments<'a>(&'a [Segment<'a>], &'a str, &'a RendererOptions);

impl fmt::Display for Segments<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        html::write_segments(f, self.0, self.1, self.2)
    }
}
