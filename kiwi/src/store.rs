//! On-disk dictionary store: `<dir>/<locale>/<namespace>.<ext>` modules plus
//! a generated `index.<ext>` per locale.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::dictionary::LanguageDictionary;
use crate::error::{Error, Result};
use crate::object_literal::{ModuleFormat, parse_module, render_index, render_module};

const MODULE_EXTENSIONS: [&str; 3] = ["ts", "js", "json"];

/// Stem of the aggregator module; never a namespace.
pub const INDEX_MODULE: &str = "index";

/// Reads and updates the dictionary modules under one directory.
#[derive(Debug, Clone)]
pub struct DictionaryStore {
    dir: PathBuf,
    format: ModuleFormat,
}

impl DictionaryStore {
    /// A store rooted at `dir` that creates new modules in `format`.
    pub fn new(dir: impl Into<PathBuf>, format: ModuleFormat) -> Self {
        DictionaryStore {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn locale_dir(&self, locale: &str) -> PathBuf {
        self.dir.join(locale)
    }

    /// Loads one locale. A missing locale directory is an empty dictionary.
    pub fn load_locale(&self, locale: &str) -> Result<LanguageDictionary> {
        let dir = self.locale_dir(locale);
        if !dir.is_dir() {
            debug!(locale, dir = %dir.display(), "locale directory missing, starting empty");
            return Ok(LanguageDictionary::new(locale));
        }
        load_locale_dir(&dir, locale)
    }

    /// Loads every locale directory under the store root.
    pub fn load_all(&self) -> Result<BTreeMap<String, LanguageDictionary>> {
        let mut out = BTreeMap::new();
        if !self.dir.is_dir() {
            return Ok(out);
        }
        for entry in sorted_entries(&self.dir)? {
            if !entry.is_dir() {
                continue;
            }
            let Some(locale) = entry.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            out.insert(locale.to_string(), load_locale_dir(&entry, locale)?);
        }
        Ok(out)
    }

    /// Loads a dictionary from an explicit path: a locale directory, its
    /// `index` module, or a single namespace module.
    pub fn load_path(path: &Path) -> Result<LanguageDictionary> {
        if path.is_dir() {
            let locale = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
            return load_locale_dir(path, locale);
        }
        if !path.is_file() {
            return Err(Error::dictionary_format(path, "no such dictionary file or directory"));
        }

        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let locale = parent.file_name().and_then(|s| s.to_str()).unwrap_or_default();
        match module_stem(path) {
            Some(INDEX_MODULE) => load_locale_dir(parent, locale),
            Some(namespace) => {
                let mut dictionary = LanguageDictionary::new(locale);
                dictionary.merge_tree(Some(namespace), &read_module(path)?);
                Ok(dictionary)
            }
            None => Err(Error::dictionary_format(
                path,
                "expected a .ts, .js or .json dictionary module",
            )),
        }
    }

    /// Writes `entries` (full dot-path keys) into the locale's namespace
    /// modules, grouping by first key segment. Existing entries are kept.
    ///
    /// Returns every file written. The `index` module is regenerated whenever
    /// a namespace module is created.
    pub fn persist(&self, locale: &str, entries: &[(String, String)]) -> Result<Vec<PathBuf>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let dir = self.locale_dir(locale);
        let mut grouped: BTreeMap<&str, Vec<(&str, &str)>> = BTreeMap::new();
        for (key, text) in entries {
            let Some((namespace, rest)) = key.split_once('.') else {
                return Err(Error::dictionary_format(
                    &dir,
                    format!("key `{key}` has no namespace segment"),
                ));
            };
            if namespace == INDEX_MODULE {
                return Err(Error::dictionary_format(
                    &dir,
                    format!("key `{key}` would land in the {INDEX_MODULE} module"),
                ));
            }
            grouped.entry(namespace).or_default().push((rest, text.as_str()));
        }

        fs::create_dir_all(&dir)?;
        let mut written = Vec::new();
        let mut created = false;

        for (namespace, items) in grouped {
            let (path, format, mut tree) = match self.find_module(&dir, namespace) {
                Some((path, format)) => {
                    let tree = read_module(&path)?;
                    (path, format, tree)
                }
                None => {
                    created = true;
                    let path = dir.join(format!("{namespace}.{}", self.format.extension()));
                    (path, self.format, Map::new())
                }
            };

            for (rest, text) in items {
                insert_path(&mut tree, rest, text)
                    .map_err(|message| Error::dictionary_format(&path, message))?;
            }
            fs::write(&path, render_module(&tree, format))?;
            info!(file = %path.display(), "updated dictionary module");
            written.push(path);
        }

        if created && self.format != ModuleFormat::Json {
            written.push(self.write_index(&dir)?);
        }
        Ok(written)
    }

    fn find_module(&self, dir: &Path, namespace: &str) -> Option<(PathBuf, ModuleFormat)> {
        std::iter::once(self.format.extension())
            .chain(MODULE_EXTENSIONS)
            .filter_map(|ext| {
                let path = dir.join(format!("{namespace}.{ext}"));
                let format = ModuleFormat::from_extension(ext)?;
                path.is_file().then_some((path, format))
            })
            .next()
    }

    fn write_index(&self, dir: &Path) -> Result<PathBuf> {
        let namespaces: BTreeSet<String> = sorted_entries(dir)?
            .iter()
            .filter(|p| p.is_file())
            .filter_map(|p| module_stem(p))
            .filter(|stem| *stem != INDEX_MODULE)
            .map(str::to_string)
            .collect();
        let namespaces: Vec<String> = namespaces.into_iter().collect();
        let path = dir.join(format!("{INDEX_MODULE}.{}", self.format.extension()));
        fs::write(&path, render_index(&namespaces))?;
        info!(file = %path.display(), namespaces = namespaces.len(), "regenerated dictionary index");
        Ok(path)
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// The namespace name of a dictionary module path, if it is one.
fn module_stem(path: &Path) -> Option<&str> {
    let ext = path.extension()?.to_str()?;
    ModuleFormat::from_extension(ext)?;
    let stem = path.file_stem()?.to_str()?;
    // Type declaration files are not dictionaries.
    if stem.ends_with(".d") {
        return None;
    }
    Some(stem)
}

fn read_module(path: &Path) -> Result<Map<String, Value>> {
    let source = fs::read_to_string(path)?;
    parse_module(&source).map_err(|message| Error::dictionary_format(path, message))
}

fn load_locale_dir(dir: &Path, locale: &str) -> Result<LanguageDictionary> {
    let mut dictionary = LanguageDictionary::new(locale);
    for path in sorted_entries(dir)? {
        if !path.is_file() {
            continue;
        }
        let Some(namespace) = module_stem(&path) else {
            continue;
        };
        if namespace == INDEX_MODULE {
            continue;
        }
        dictionary.merge_tree(Some(namespace), &read_module(&path)?);
    }
    debug!(locale, entries = dictionary.len(), "loaded dictionary");
    Ok(dictionary)
}

/// Sets `path` (dot separated) inside a nested object.
fn insert_path(tree: &mut Map<String, Value>, path: &str, text: &str) -> std::result::Result<(), String> {
    let mut node = tree;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            if let Some(Value::Object(_)) = node.get(segment) {
                return Err(format!("`{path}` is already a group of keys"));
            }
            node.insert(segment.to_string(), Value::String(text.to_string()));
            return Ok(());
        }
        let child = node
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        node = match child {
            Value::Object(map) => map,
            _ => return Err(format!("`{segment}` in `{path}` already holds text")),
        };
    }
    Ok(())
}
