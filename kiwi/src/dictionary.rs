//! In-memory language dictionary: dot-path keys mapped to literal text.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

/// One locale's dictionary, flattened to dot paths (`home.title`).
///
/// A key is either a leaf holding text or a branch prefix of other keys, never
/// both. The reverse index resolves text to the smallest key holding it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageDictionary {
    pub locale: String,
    entries: BTreeMap<String, String>,
    #[serde(skip)]
    by_value: HashMap<String, String>,
}

impl LanguageDictionary {
    pub fn new(locale: impl Into<String>) -> Self {
        LanguageDictionary {
            locale: locale.into(),
            ..Default::default()
        }
    }

    /// Builds a dictionary from a nested object, prefixing every path with
    /// `namespace` when given. Non-string leaves are skipped.
    pub fn from_tree(locale: impl Into<String>, namespace: Option<&str>, tree: &Map<String, Value>) -> Self {
        let mut dictionary = LanguageDictionary::new(locale);
        dictionary.merge_tree(namespace, tree);
        dictionary
    }

    /// Adds every leaf of `tree` under `namespace`.
    pub fn merge_tree(&mut self, namespace: Option<&str>, tree: &Map<String, Value>) {
        fn walk(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
            match value {
                Value::String(text) => out.push((prefix.to_string(), text.clone())),
                Value::Object(map) => {
                    for (k, v) in map {
                        let path = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&path, v, out);
                    }
                }
                _ => {}
            }
        }

        let mut leaves = Vec::new();
        for (k, v) in tree {
            let path = match namespace {
                Some(ns) if !ns.is_empty() => format!("{ns}.{k}"),
                _ => k.clone(),
            };
            walk(&path, v, &mut leaves);
        }
        for (key, text) in leaves {
            self.by_value.entry(text.clone()).or_insert_with(|| key.clone());
            self.entries.insert(key, text);
        }
        self.rebuild_reverse_index();
    }

    fn rebuild_reverse_index(&mut self) {
        self.by_value.clear();
        for (key, text) in &self.entries {
            self.by_value.entry(text.clone()).or_insert_with(|| key.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    /// Looks up the text stored at a dot path.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Looks up a key written with `_` where the stored key uses `-`.
    pub fn get_normalized(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| {
            self.entries
                .iter()
                .find(|(k, _)| k.contains('-') && k.replace('-', "_") == key)
                .map(|(_, v)| v.as_str())
        })
    }

    /// Reverse lookup: the key already holding exactly `text`, if any.
    pub fn find_key(&self, text: &str) -> Option<&str> {
        self.by_value.get(text).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// `true` when `key` cannot become a leaf: it is already a branch, or one
    /// of its prefixes is already a leaf.
    pub fn conflicts(&self, key: &str) -> bool {
        let branch = format!("{key}.");
        let is_branch = self
            .entries
            .range(branch.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(&branch));
        if is_branch {
            return true;
        }
        key.match_indices('.')
            .any(|(i, _)| self.entries.contains_key(&key[..i]))
    }

    /// Inserts or replaces the text at `key`.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        let text = text.into();
        if let Some(old) = self.entries.insert(key.clone(), text.clone()) {
            if old != text {
                self.rebuild_reverse_index();
                return;
            }
        }
        match self.by_value.get(&text) {
            Some(existing) if existing.as_str() <= key.as_str() => {}
            _ => {
                self.by_value.insert(text, key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> LanguageDictionary {
        let tree = json!({
            "baoCun": "保存",
            "form": { "title": "标题", "save-btn": "保存" }
        });
        LanguageDictionary::from_tree("zh-CN", Some("home"), tree.as_object().unwrap())
    }

    #[test]
    fn test_flattens_nested_tree_with_namespace() {
        let dictionary = sample();
        assert_eq!(dictionary.len(), 3);
        assert_eq!(dictionary.get("home.baoCun"), Some("保存"));
        assert_eq!(dictionary.get("home.form.title"), Some("标题"));
        assert_eq!(dictionary.get("home.form"), None);
    }

    #[test]
    fn test_reverse_lookup_prefers_smallest_key() {
        let dictionary = sample();
        assert_eq!(dictionary.find_key("保存"), Some("home.baoCun"));
        assert_eq!(dictionary.find_key("不存在"), None);
    }

    #[test]
    fn test_insert_updates_reverse_index() {
        let mut dictionary = sample();
        dictionary.insert("home.shanChu", "删除");
        assert_eq!(dictionary.find_key("删除"), Some("home.shanChu"));
        dictionary.insert("home.shanChu", "移除");
        assert_eq!(dictionary.find_key("删除"), None);
        assert_eq!(dictionary.find_key("移除"), Some("home.shanChu"));
    }

    #[test]
    fn test_conflicts() {
        let dictionary = sample();
        assert!(dictionary.conflicts("home.form"));
        assert!(dictionary.conflicts("home.baoCun.extra"));
        assert!(!dictionary.conflicts("home.formal"));
        assert!(!dictionary.conflicts("home.baoCun2"));
    }

    #[test]
    fn test_get_normalized() {
        let dictionary = sample();
        assert_eq!(dictionary.get_normalized("home.form.save_btn"), Some("保存"));
        assert_eq!(dictionary.get_normalized("home.form.title"), Some("标题"));
    }
}
