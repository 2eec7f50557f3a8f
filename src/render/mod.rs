//! Turn a computed diff into text
//!
//! Every output format implements [`Renderer`]. Formats are looked up by name through a
//! [`Registry`], which knows the built-in formats and anything registered on top of them.

use crate::{
    diff::Differ,
    error::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

mod html;
mod inline;
mod json;
mod language;
mod side_by_side;
mod unified;

pub use inline::Inline;
pub use json::Json;
pub use language::Language;
pub use side_by_side::SideBySide;
pub use unified::Unified;

/// Static information about an output format
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub name: &'static str,
    pub description: &'static str,
    /// Output is markup and its text content is escaped
    pub is_markup: bool,
    /// Output when there is no difference to show
    pub identical_result: &'static str,
}

/// Largest number of spaces a tab may expand to
pub const MAX_TAB_SIZE: usize = 64;

/// Fully resolved renderer options
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererOptions {
    /// Tag of the language used for labels
    pub language: String,
    /// Number of spaces a tab expands to in markup output
    pub tab_size: usize,
    /// Mark elided unchanged lines between groups
    pub separate_block: bool,
    /// Render spaces as `&nbsp;` in markup output
    pub spaces_to_nbsp: bool,
    /// Colorize text output (needs the `color` feature)
    pub color: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            language: "eng".to_owned(),
            tab_size: 4,
            separate_block: true,
            spaces_to_nbsp: false,
            color: false,
        }
    }
}

/// Options supplied by a caller; anything left out takes the format's default
///
/// ```
/// use opdiff::{RendererConfig, RendererOptions};
///
/// let config = RendererConfig::from_json(r#"{ "language": "jpn" }"#).unwrap();
/// let options = config.merge_over(RendererOptions::default());
/// assert_eq!(options.language, "jpn");
/// assert_eq!(options.tab_size, 4);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct RendererConfig {
    pub language: Option<String>,
    pub tab_size: Option<usize>,
    pub separate_block: Option<bool>,
    pub spaces_to_nbsp: Option<bool>,
    pub color: Option<bool>,
}

impl RendererConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Caller values win, the rest comes from `defaults`
    ///
    /// The result is not validated, see [`RendererOptions::validate`].
    pub fn merge_over(self, defaults: RendererOptions) -> RendererOptions {
        RendererOptions {
            language: self.language.unwrap_or(defaults.language),
            tab_size: self.tab_size.unwrap_or(defaults.tab_size),
            separate_block: self.separate_block.unwrap_or(defaults.separate_block),
            spaces_to_nbsp: self.spaces_to_nbsp.unwrap_or(defaults.spaces_to_nbsp),
            color: self.color.unwrap_or(defaults.color),
        }
    }
}

impl RendererOptions {
    pub fn validate(&self) -> Result<()> {
        if self.tab_size > MAX_TAB_SIZE {
            return Err(Error::TabSizeTooLarge(self.tab_size));
        }
        Ok(())
    }
}

/// The merged options of a renderer and the language they select
#[derive(Clone, Debug)]
pub struct RendererState {
    options: RendererOptions,
    language: Arc<Language>,
}

impl RendererState {
    pub fn new(config: RendererConfig, defaults: RendererOptions) -> Result<Self> {
        let options = config.merge_over(defaults);
        options.validate()?;
        let language = Arc::new(Language::new(&options.language)?);
        Ok(Self { options, language })
    }

    /// Replace the options with `config` merged over `defaults`.
    ///
    /// A different language gets a fresh binding; on error nothing changes.
    pub fn apply(&mut self, config: RendererConfig, defaults: RendererOptions) -> Result<()> {
        let options = config.merge_over(defaults);
        options.validate()?;
        if options.language != self.language.tag() {
            tracing::debug!(
                from = self.language.tag(),
                to = %options.language,
                "rebinding renderer language"
            );
            self.language = Arc::new(Language::new(&options.language)?);
        }
        self.options = options;
        Ok(())
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }

    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        self.language.translate(key)
    }
}

/// An output format
pub trait Renderer: Send + Sync {
    fn descriptor(&self) -> Descriptor;

    fn options(&self) -> &RendererOptions;

    /// Merge `config` over this format's defaults.
    ///
    /// Options set by earlier calls do not carry over. Invalid values are reported and leave the
    /// renderer as it was.
    fn set_options(&mut self, config: RendererConfig) -> Result<()>;

    /// Write the rendered diff, which is known to contain changes
    fn fmt_diff(&self, diff: &Differ<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Render `diff`, or return the format's identical result if nothing changed
    fn render(&self, diff: &Differ<'_>) -> String {
        if !diff.has_changes() {
            return self.descriptor().identical_result.to_owned();
        }

        DiffDisplay {
            renderer: self,
            diff,
        }
        .to_string()
    }
}

struct DiffDisplay<'r, 'a, R: ?Sized> {
    renderer: &'r R,
    diff: &'r Differ<'a>,
}

impl<R: Renderer + ?Sized> fmt::Display for DiffDisplay<'_, '_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.renderer.fmt_diff(self.diff, f)
    }
}

/// A renderer which can be registered by type
pub trait Format: Renderer + Sized + 'static {
    const DESCRIPTOR: Descriptor;

    fn default_options() -> RendererOptions {
        RendererOptions::default()
    }

    fn with_config(config: RendererConfig) -> Result<Self>;
}

pub type Constructor = fn(RendererConfig) -> Result<Box<dyn Renderer>>;

fn construct<F: Format>(config: RendererConfig) -> Result<Box<dyn Renderer>> {
    Ok(Box::new(F::with_config(config)?))
}

/// Maps format names to renderers
///
/// `Registry::default()` knows every built-in format.
///
/// ```
/// use opdiff::Registry;
///
/// let registry = Registry::default();
/// assert_eq!(registry.names().collect::<Vec<_>>(), ["SideBySide", "Inline", "Unified", "Json"]);
/// assert!(registry.descriptor("Unknown").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Registry {
    formats: Vec<(Descriptor, Constructor)>,
}

impl Registry {
    /// A registry without any formats
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Register `constructor` under `descriptor.name`, replacing any format of the same name
    pub fn register(&mut self, descriptor: Descriptor, constructor: Constructor) -> &mut Self {
        match self
            .formats
            .iter_mut()
            .find(|(d, _)| d.name == descriptor.name)
        {
            Some(entry) => *entry = (descriptor, constructor),
            None => self.formats.push((descriptor, constructor)),
        }
        self
    }

    pub fn register_format<F: Format>(&mut self) -> &mut Self {
        self.register(F::DESCRIPTOR, construct::<F>)
    }

    fn resolve(&self, name: &str) -> Result<&(Descriptor, Constructor)> {
        self.formats
            .iter()
            .find(|(d, _)| d.name == name)
            .ok_or_else(|| Error::UnknownTemplate(name.to_owned()))
    }

    pub fn descriptor(&self, name: &str) -> Result<Descriptor> {
        self.resolve(name).map(|(descriptor, _)| *descriptor)
    }

    /// Construct the renderer registered as `name`
    pub fn create(&self, name: &str, config: RendererConfig) -> Result<Box<dyn Renderer>> {
        let (_, constructor) = self.resolve(name)?;
        tracing::debug!(format = name, "creating renderer");
        constructor(config)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> + '_ {
        self.formats.iter().map(|(descriptor, _)| descriptor)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors().map(|descriptor| descriptor.name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register_format::<SideBySide>()
            .register_format::<Inline>()
            .register_format::<Unified>()
            .register_format::<Json>();
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_template() {
        let registry = Registry::default();
        assert!(matches!(
            registry.create("Nope", RendererConfig::default()),
            Err(Error::UnknownTemplate(name)) if name == "Nope"
        ));
        assert!(matches!(
            Registry::empty().descriptor("SideBySide"),
            Err(Error::UnknownTemplate(_))
        ));
    }

    #[test]
    fn register_replaces_by_name() {
        fn unified_as_json(config: RendererConfig) -> Result<Box<dyn Renderer>> {
            Ok(Box::new(Unified::with_config(config)?))
        }

        let mut registry = Registry::default();
        let descriptor = Descriptor {
            description: "Unified, under another name",
            ..Json::DESCRIPTOR
        };
        registry.register(descriptor, unified_as_json);

        assert_eq!(registry.names().count(), 4);
        assert_eq!(registry.descriptor("Json").unwrap(), descriptor);
        let renderer = registry.create("Json", RendererConfig::default()).unwrap();
        assert_eq!(renderer.descriptor(), Unified::DESCRIPTOR);
    }

    #[test]
    fn descriptors_list_builtins() {
        let registry = Registry::default();
        let markup: Vec<_> = registry
            .descriptors()
            .filter(|d| d.is_markup)
            .map(|d| d.name)
            .collect();
        assert_eq!(markup, ["SideBySide", "Inline"]);
    }

    #[test]
    fn options_merge_over_defaults() {
        let mut renderer = SideBySide::with_config(RendererConfig {
            tab_size: Some(2),
            ..RendererConfig::default()
        })
        .unwrap();
        assert_eq!(renderer.options().tab_size, 2);

        renderer
            .set_options(RendererConfig {
                separate_block: Some(false),
                ..RendererConfig::default()
            })
            .unwrap();
        assert_eq!(
            renderer.options(),
            &RendererOptions {
                separate_block: false,
                ..RendererOptions::default()
            }
        );
    }

    #[test]
    fn language_rebinds_only_on_change() {
        let mut state =
            RendererState::new(RendererConfig::default(), RendererOptions::default()).unwrap();
        let english = Arc::clone(state.language());

        state
            .apply(
                RendererConfig {
                    tab_size: Some(8),
                    ..RendererConfig::default()
                },
                RendererOptions::default(),
            )
            .unwrap();
        assert!(Arc::ptr_eq(&english, state.language()));

        let config = RendererConfig {
            language: Some("chs".to_owned()),
            ..RendererConfig::default()
        };
        state.apply(config, RendererOptions::default()).unwrap();
        assert!(!Arc::ptr_eq(&english, state.language()));
        assert_eq!(state.translate("new_version"), "新版本");
        // The old binding is untouched
        assert_eq!(english.translate("new_version"), "New");
    }

    #[test]
    fn invalid_language_leaves_options_alone() {
        let mut state =
            RendererState::new(RendererConfig::default(), RendererOptions::default()).unwrap();
        let config = RendererConfig {
            language: Some("klingon".to_owned()),
            tab_size: Some(1),
            ..RendererConfig::default()
        };
        assert!(matches!(
            state.apply(config, RendererOptions::default()),
            Err(Error::UnknownLanguage(_))
        ));
        assert_eq!(state.options(), &RendererOptions::default());
        assert_eq!(state.language().tag(), "eng");
    }

    #[test]
    fn huge_tab_size_is_rejected() {
        let config = RendererConfig::from_json(r#"{ "tabSize": 18446744073709551615 }"#).unwrap();
        assert!(matches!(
            SideBySide::with_config(config.clone()),
            Err(Error::TabSizeTooLarge(usize::MAX))
        ));

        let mut state =
            RendererState::new(RendererConfig::default(), RendererOptions::default()).unwrap();
        assert!(state.apply(config, RendererOptions::default()).is_err());
        assert_eq!(state.options(), &RendererOptions::default());

        let config = RendererConfig {
            tab_size: Some(MAX_TAB_SIZE),
            ..RendererConfig::default()
        };
        state.apply(config, RendererOptions::default()).unwrap();
        assert_eq!(state.options().tab_size, MAX_TAB_SIZE);
    }

    #[test]
    fn config_from_json() {
        let config = RendererConfig::from_json(r#"{ "tabSize": 2, "spacesToNbsp": true }"#).unwrap();
        assert_eq!(config.tab_size, Some(2));
        assert_eq!(config.spaces_to_nbsp, Some(true));
        assert_eq!(config.language, None);

        assert!(matches!(
            RendererConfig::from_json(r#"{ "tabSize": -1 }"#),
            Err(Error::InvalidOptions(_))
        ));
        assert!(matches!(
            RendererConfig::from_json(r#"{ "lang": "eng" }"#),
            Err(Error::InvalidOptions(_))
        ));
    }
}
