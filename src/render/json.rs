use super::{Descriptor, Format, Renderer, RendererConfig, RendererOptions, RendererState};
use crate::{diff::Differ, error::Result};
use std::fmt::{self, Formatter};

/// The grouped changes as JSON
///
/// Every group is an array of changes, each of the form
/// `{"tag": "rep", "old": {"offset": 1, "lines": ["b"]}, "new": {"offset": 1, "lines": ["x"]}}`.
#[derive(Clone, Debug)]
pub struct Json {
    state: RendererState,
}

impl Format for Json {
    const DESCRIPTOR: Descriptor = Descriptor {
        name: "Json",
        description: "JSON",
        is_markup: false,
        identical_result: "[]",
    };

    fn with_config(config: RendererConfig) -> Result<Self> {
        Ok(Self {
            state: RendererState::new(config, Self::default_options())?,
        })
    }
}

impl Renderer for Json {
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
        let json = serde_json::to_string(&diff.changes()).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
