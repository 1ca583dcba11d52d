//! Turning literal text into a readable key fragment.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{Error, Result};

lazy_static! {
    static ref ORIGIN_TEXT_REGEX: Regex = Regex::new(r"[a-zA-Z\x{4e00}-\x{9fa5}]+").unwrap();
}

/// Fragment used when the text has no letters or ideographs at all.
pub const SYMBOL_FRAGMENT: &str = "zhongWenFuHao";

/// Maximum number of characters kept by [`origin_text`].
const ORIGIN_TEXT_LEN: usize = 5;

/// Produces an English-ish phrase for a piece of source-language text.
pub trait Translator {
    fn translate(&self, text: &str) -> Result<String>;
}

/// Uses the text itself: letters and ideographs only, first five characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackTranslator;

impl Translator for FallbackTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        Ok(origin_text(text))
    }
}

/// Looks translations up in a fixed text → phrase table.
#[derive(Debug, Clone, Default)]
pub struct GlossaryTranslator {
    entries: HashMap<String, String>,
}

impl GlossaryTranslator {
    pub fn new(entries: HashMap<String, String>) -> Self {
        GlossaryTranslator { entries }
    }

    /// Reads a JSON object of `"原文": "phrase"` pairs.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let entries: HashMap<String, String> = serde_json::from_str(&content)?;
        debug!(file = %path.display(), entries = entries.len(), "loaded glossary");
        Ok(GlossaryTranslator { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for GlossaryTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        self.entries
            .get(text)
            .or_else(|| self.entries.get(text.trim()))
            .cloned()
            .ok_or_else(|| Error::Translation(format!("no glossary entry for `{text}`")))
    }
}

/// Letters and ideographs of `text`, concatenated and cut to five characters.
pub fn origin_text(text: &str) -> String {
    ORIGIN_TEXT_REGEX
        .find_iter(text)
        .flat_map(|m| m.as_str().chars())
        .take(ORIGIN_TEXT_LEN)
        .collect()
}

fn split_words(phrase: &str) -> Vec<String> {
    let chars: Vec<char> = phrase.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_uppercase() && c.is_uppercase() && next_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `"Save changes"` → `"saveChanges"`, `"XMLHttp request"` → `"xmlHttpRequest"`.
pub fn camel_case(phrase: &str) -> String {
    split_words(phrase)
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i == 0 {
                return lower;
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Key fragment for `text`: the translation camel-cased, falling back to
/// [`origin_text`] (and then [`SYMBOL_FRAGMENT`]) when the translator fails
/// or yields something unusable as a key segment.
pub fn key_fragment(translator: &dyn Translator, text: &str) -> String {
    let usable = |fragment: &str| {
        fragment
            .chars()
            .next()
            .is_some_and(|c| !c.is_ascii_digit())
    };

    match translator.translate(text) {
        Ok(phrase) => {
            let fragment = camel_case(&phrase).replace('-', "_");
            if usable(&fragment) {
                return fragment;
            }
            warn!(text, phrase = %phrase, "translation unusable as a key, falling back");
        }
        Err(err) => warn!(text, error = %err, "translation failed, falling back"),
    }

    let fragment = camel_case(&origin_text(text));
    if usable(&fragment) {
        fragment
    } else {
        SYMBOL_FRAGMENT.to_string()
    }
}
