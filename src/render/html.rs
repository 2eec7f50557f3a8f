use super::RendererOptions;
use crate::diff::Segment;
use std::{borrow::Cow, fmt};

/// Placeholder for a cell without a line
pub(super) const NBSP: &str = "&#xA0;";

pub(super) fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_safe(text)
}

/// Escape a piece of a line, expanding tabs and spaces as configured
pub(super) fn format_text(text: &str, options: &RendererOptions) -> String {
    let mut text = escape(text).into_owned();
    if text.contains('\t') {
        text = text.replace('\t', &" ".repeat(options.tab_size));
    }
    if options.spaces_to_nbsp {
        text = text.replace(' ', "&nbsp;");
    }
    text
}

/// Write segments of a line, wrapping the changed ones in `<tag>`
pub(super) fn write_segments(
    f: &mut fmt::Formatter<'_>,
    segments: &[Segment<'_>],
    tag: &str,
    options: &RendererOptions,
) -> fmt::Result {
    for segment in segments {
        let text = format_text(segment.text, options);
        if segment.changed {
            write!(f, "<{tag}>{text}</{tag}>")?;
        } else {
            f.write_str(&text)?;
        }
    }
    Ok(())
}
