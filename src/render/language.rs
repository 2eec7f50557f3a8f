use crate::error::{Error, Result};

type Entries = &'static [(&'static str, &'static str)];

const ENG: Entries = &[
    ("old_version", "Old"),
    ("new_version", "New"),
    ("differences", "Differences"),
];

const CHS: Entries = &[
    ("old_version", "旧版本"),
    ("new_version", "新版本"),
    ("differences", "差异"),
];

const CHT: Entries = &[
    ("old_version", "舊版本"),
    ("new_version", "新版本"),
    ("differences", "差異"),
];

const JPN: Entries = &[
    ("old_version", "古い"),
    ("new_version", "新しい"),
    ("differences", "差異"),
];

/// Translations of the labels renderers put around a diff
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Language {
    tag: &'static str,
    entries: Entries,
}

impl Language {
    pub const TAGS: &'static [&'static str] = &["eng", "chs", "cht", "jpn"];

    pub fn new(tag: &str) -> Result<Self> {
        let (tag, entries) = match tag {
            "eng" => ("eng", ENG),
            "chs" => ("chs", CHS),
            "cht" => ("cht", CHT),
            "jpn" => ("jpn", JPN),
            _ => return Err(Error::UnknownLanguage(tag.to_owned())),
        };
        Ok(Self { tag, entries })
    }

    pub fn tag(&self) -> &str {
        self.tag
    }

    /// Look up `key`, falling back to the key itself
    pub fn translate<'a>(&self, key: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or(key)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self {
            tag: "eng",
            entries: ENG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_languages() {
        for tag in Language::TAGS {
            let language = Language::new(tag).unwrap();
            assert_eq!(language.tag(), *tag);
            assert_ne!(language.translate("old_version"), "old_version");
        }
        assert_eq!(Language::default(), Language::new("eng").unwrap());
    }

    #[test]
    fn missing_key_falls_back() {
        let language = Language::new("jpn").unwrap();
        assert_eq!(language.translate("new_version"), "新しい");
        assert_eq!(language.translate("no_such_key"), "no_such_key");
    }

    #[test]
    fn unknown_language() {
        assert!(matches!(
            Language::new("xyz"),
            Err(Error::UnknownLanguage(tag)) if tag == "xyz"
        ));
    }
}
