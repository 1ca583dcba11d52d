//! Key assignment: reuse existing keys, mint collision-free new ones.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::KEY_ROOT;
use crate::dictionary::LanguageDictionary;
use crate::error::{Error, Result};
use crate::scanner::TextOccurrence;
use crate::store::INDEX_MODULE;
use crate::translate::{Translator, key_fragment};

lazy_static! {
    static ref PREFIX_REGEX: Regex = Regex::new(r"^I18N(\.[-_a-zA-Z1-9$]+)+$").unwrap();
}

/// Upper bound on numeric suffixes tried for one candidate key.
pub const MAX_COLLISION_ATTEMPTS: usize = 10_000;

/// Validates an explicit key prefix (`I18N.common`) and strips the root.
pub fn parse_prefix(prefix: &str) -> Result<String> {
    let prefix = prefix.trim();
    if !PREFIX_REGEX.is_match(prefix) {
        return Err(Error::InvalidPrefix(prefix.to_string()));
    }
    let stripped = &prefix[KEY_ROOT.len() + 1..];
    // The first segment names a dictionary module.
    if stripped.split('.').next() == Some(INDEX_MODULE) {
        return Err(Error::InvalidPrefix(prefix.to_string()));
    }
    Ok(stripped.to_string())
}

/// Moves a candidate out of the `index` aggregator module: `index.a` becomes `index_.a`.
fn outside_index_module(candidate: String) -> String {
    match candidate.split_once('.') {
        Some((INDEX_MODULE, rest)) => format!("{INDEX_MODULE}_.{rest}"),
        _ => candidate,
    }
}

/// The key picked for one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAssignment {
    pub occurrence: TextOccurrence,
    /// Dot path without the `I18N.` root.
    pub key: String,
    /// `false` when the key already existed (in the store or earlier in this run).
    pub needs_write: bool,
}

impl KeyAssignment {
    /// `I18N.<key>`.
    pub fn reference(&self) -> String {
        format!("{KEY_ROOT}.{}", self.key)
    }
}

/// Restorable state of a [`KeyAssigner`].
#[derive(Debug, Clone)]
pub struct AssignerCheckpoint {
    dictionary: LanguageDictionary,
    memo: HashMap<String, String>,
}

/// Assigns keys against a dictionary snapshot that grows as keys are minted.
pub struct KeyAssigner<'t> {
    dictionary: LanguageDictionary,
    translator: &'t dyn Translator,
    prefix: Option<String>,
    max_attempts: usize,
    memo: HashMap<String, String>,
}

impl<'t> KeyAssigner<'t> {
    pub fn new(dictionary: LanguageDictionary, translator: &'t dyn Translator) -> Self {
        KeyAssigner {
            dictionary,
            translator,
            prefix: None,
            max_attempts: MAX_COLLISION_ATTEMPTS,
            memo: HashMap::new(),
        }
    }

    /// Uses `prefix` (already stripped of `I18N.`) instead of file namespaces.
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Caps the numeric suffixes tried for one candidate key.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn dictionary(&self) -> &LanguageDictionary {
        &self.dictionary
    }

    pub fn checkpoint(&self) -> AssignerCheckpoint {
        AssignerCheckpoint {
            dictionary: self.dictionary.clone(),
            memo: self.memo.clone(),
        }
    }

    /// Forgets every key minted since `checkpoint` was taken.
    pub fn rollback(&mut self, checkpoint: AssignerCheckpoint) {
        self.dictionary = checkpoint.dictionary;
        self.memo = checkpoint.memo;
    }

    /// Picks the key for one occurrence found in a file with `namespace`.
    pub fn assign(&mut self, namespace: &[String], occurrence: TextOccurrence) -> Result<KeyAssignment> {
        let text = occurrence.text.as_str();

        if let Some(key) = self.memo.get(text) {
            return Ok(KeyAssignment {
                key: key.clone(),
                occurrence,
                needs_write: false,
            });
        }

        if let Some(existing) = self.dictionary.find_key(text) {
            let key = existing.replace('-', "_");
            debug!(key = %key, text, "reusing existing key");
            self.memo.insert(text.to_string(), key.clone());
            return Ok(KeyAssignment {
                key,
                occurrence,
                needs_write: false,
            });
        }

        let fragment = key_fragment(self.translator, text);
        let base = match &self.prefix {
            Some(prefix) => prefix.clone(),
            None => namespace.join("."),
        };
        let candidate = outside_index_module(
            if base.is_empty() {
                fragment
            } else {
                format!("{base}.{fragment}")
            }
            .replace('-', "_"),
        );

        let key = self.free_key(&candidate, text)?;
        let needs_write = !self.dictionary.contains_key(&key);
        if needs_write {
            self.dictionary.insert(key.clone(), text);
        }
        self.memo.insert(text.to_string(), key.clone());
        Ok(KeyAssignment {
            key,
            occurrence,
            needs_write,
        })
    }

    /// `candidate`, or `candidate2`, `candidate3`, … : the first key that is
    /// free or already holds `text`.
    fn free_key(&self, candidate: &str, text: &str) -> Result<String> {
        for n in 1..=self.max_attempts {
            let key = if n == 1 {
                candidate.to_string()
            } else {
                format!("{candidate}{n}")
            };
            match self.dictionary.get(&key) {
                Some(value) if value == text => return Ok(key),
                Some(_) => continue,
                None if self.dictionary.conflicts(&key) => continue,
                None => return Ok(key),
            }
        }
        Err(Error::KeyCollisionExhausted {
            candidate: candidate.to_string(),
            attempts: self.max_attempts,
        })
    }
}
