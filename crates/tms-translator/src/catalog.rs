use std::collections::BTreeMap;

use crate::{AUTO, LanguageCode};

/// Simplified-Chinese codes, most preferred first
const SIMPLIFIED_CHINESE: &[&str] = &["ZH-HANS", "zh-CN", "zh-Hans", "zh-SG"];
const ENGLISH: &[&str] = &["EN", "en"];

/// Language code -> display name, as reported by one provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    languages: BTreeMap<LanguageCode, String>,
}

impl LanguageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, name: impl Into<String>) {
        self.languages.insert(code.into(), name.into());
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.languages.get(code).map(String::as_str)
    }

    /// Display name for `code`, or the code itself when unknown
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).unwrap_or(code)
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.languages.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }

    /// Entries ordered by display name, then code
    pub fn sorted_by_name(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn codes_by_name(&self) -> Vec<&str> {
        self.sorted_by_name().into_iter().map(|(code, _)| code).collect()
    }

    fn find_code(&self, wanted: &str) -> Option<&str> {
        self.languages
            .keys()
            .find(|code| code.eq_ignore_ascii_case(wanted))
            .map(String::as_str)
    }
}

impl FromIterator<(String, String)> for LanguageCatalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            languages: iter.into_iter().collect(),
        }
    }
}

/// Default output language: simplified Chinese, then plain Chinese, then any
/// other Chinese variant, then the first language by display name.
pub fn default_target_language(catalog: &LanguageCatalog) -> Option<&str> {
    if let Some(code) = SIMPLIFIED_CHINESE.iter().find_map(|c| catalog.find_code(c)) {
        return Some(code);
    }
    if let Some(code) = catalog.find_code("zh") {
        return Some(code);
    }

    let sorted = catalog.sorted_by_name();
    sorted
        .iter()
        .find(|(code, name)| {
            code.to_ascii_lowercase().starts_with("zh") || name.to_lowercase().contains("chinese")
        })
        .or_else(|| sorted.first())
        .map(|(code, _)| *code)
}

/// Source choices as presented: auto-detect first, then codes by display name
pub fn source_language_options(catalog: &LanguageCatalog) -> Vec<&str> {
    let mut options = Vec::with_capacity(catalog.len() + 1);
    options.push(AUTO);
    options.extend(catalog.codes_by_name());
    options
}

/// Index into [`source_language_options`] of the default source language.
///
/// English when available, else the first real language, else auto.
pub fn default_source_index(catalog: &LanguageCatalog) -> usize {
    let codes = catalog.codes_by_name();
    if let Some(pos) = codes.iter().position(|code| ENGLISH.contains(code)) {
        return pos + 1;
    }
    if codes.is_empty() { 0 } else { 1 }
}
