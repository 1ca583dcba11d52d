//! Namespace suggestion from a source file path.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PAGE_REGEX: Regex = Regex::new(r"/pages/\w+/([^/]+)/([^/.]+)").unwrap();
}

/// Turns a path segment into something usable as one key segment. The
/// result must stay a valid member name after `I18N.`, so it never starts
/// with a digit.
fn normalize_segment(segment: &str) -> String {
    let normalized: String = segment
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if normalized.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{normalized}")
    } else {
        normalized
    }
}

/// Suggests the namespace segments for keys minted from `path`.
///
/// Files under a `pages/<group>/<page>/<file>` layout use `[page, file]`.
/// Everything else uses the containing directory and the file base name; the
/// two collapse into one segment when they are equal or when the file is an
/// `index` module.
pub fn suggest_namespace(path: &Path) -> Vec<String> {
    let slashed = format!("/{}", path.to_string_lossy().replace('\\', "/"));

    if slashed.contains("/pages/") {
        if let Some(caps) = PAGE_REGEX.captures(&slashed) {
            return caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| normalize_segment(m.as_str()))
                .collect();
        }
    }

    let names: Vec<&str> = slashed.split('/').filter(|s| !s.is_empty()).collect();
    let Some(file_name) = names.last() else {
        return Vec::new();
    };
    let file_key = normalize_segment(file_name.split('.').next().unwrap_or_default());
    let dir = names
        .len()
        .checked_sub(2)
        .map(|i| normalize_segment(names[i]))
        .filter(|d| !d.is_empty() && d != "_");

    match dir {
        None => vec![file_key],
        Some(dir) if dir == file_key || file_key == "index" => vec![dir],
        Some(dir) => vec![dir, file_key],
    }
}
