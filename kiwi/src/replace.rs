//! Batch range replacement over one source string.
//!
//! Offsets recorded by the scanner are only valid against the text they were
//! scanned from. Edits are therefore applied from the highest start offset
//! down, so an applied edit never shifts the bytes an unapplied one points at.

use crate::error::{Error, Result};

/// A single `[start, end)` byte range of the original text and its replacement.
///
/// An edit with `start == end` is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Edit {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Edit::new(at, at, text)
    }
}

/// An ordered list of edits for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementPlan {
    edits: Vec<Edit>,
}

impl ReplacementPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, edit: Edit) {
        self.edits.push(edit);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Edits in application order: descending start, and for equal starts the
    /// wider edit first so an insertion at `o` lands in front of a replacement
    /// that also begins at `o`.
    pub fn ordered(&self) -> Vec<&Edit> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));
        edits
    }

    /// Applies every edit to `source` and returns the rewritten text.
    ///
    /// Fails without touching anything when an edit is out of bounds, splits a
    /// UTF-8 sequence, or overlaps another edit.
    pub fn apply(&self, source: &str) -> Result<String> {
        let ordered = self.ordered();

        for edit in &ordered {
            if edit.start > edit.end
                || edit.end > source.len()
                || !source.is_char_boundary(edit.start)
                || !source.is_char_boundary(edit.end)
            {
                return Err(Error::EditOutOfBounds {
                    start: edit.start,
                    end: edit.end,
                    len: source.len(),
                });
            }
        }

        // Sorted descending: every edit must end at or before the start of the one above it.
        for pair in ordered.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            if lower.end > upper.start {
                return Err(Error::OverlappingEdits {
                    first: (lower.start, lower.end),
                    second: (upper.start, upper.end),
                });
            }
        }

        let mut out = source.to_string();
        for edit in ordered {
            out.replace_range(edit.start..edit.end, &edit.replacement);
        }
        Ok(out)
    }
}

impl FromIterator<Edit> for ReplacementPlan {
    fn from_iter<T: IntoIterator<Item = Edit>>(iter: T) -> Self {
        ReplacementPlan {
            edits: iter.into_iter().collect(),
        }
    }
}

/// Convenience wrapper: apply `edits` to `source` in descending-start order.
pub fn replace_ranges(source: &str, edits: Vec<Edit>) -> Result<String> {
    edits.into_iter().collect::<ReplacementPlan>().apply(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_multiple_ranges_regardless_of_input_order() {
        let source = "a = '保存'; b = '删除';";
        let first = source.find("'保存'").unwrap();
        let second = source.find("'删除'").unwrap();
        let edits = vec![
            Edit::new(first, first + "'保存'".len(), "I18N.home.baoCun"),
            Edit::new(second, second + "'删除'".len(), "I18N.home.shanChu"),
        ];
        let out = replace_ranges(source, edits).unwrap();
        assert_eq!(out, "a = I18N.home.baoCun; b = I18N.home.shanChu;");
    }

    #[test]
    fn test_ascending_application_would_corrupt() {
        // Applying the first edit before the second shifts the second's offsets.
        let source = "x('中') + y('文')";
        let a = source.find("'中'").unwrap();
        let b = source.find("'文'").unwrap();
        let a_edit = Edit::new(a, a + "'中'".len(), "I18N.a.zhong");
        let b_edit = Edit::new(b, b + "'文'".len(), "I18N.a.wen");

        let mut naive = source.to_string();
        naive.replace_range(a_edit.start..a_edit.end, &a_edit.replacement);
        let naive_b_end = b_edit.end.min(naive.len());
        let naive_b_start = b_edit.start.min(naive_b_end);
        if naive.is_char_boundary(naive_b_start) && naive.is_char_boundary(naive_b_end) {
            naive.replace_range(naive_b_start..naive_b_end, &b_edit.replacement);
        }

        let out = replace_ranges(source, vec![a_edit, b_edit]).unwrap();
        assert_eq!(out, "x(I18N.a.zhong) + y(I18N.a.wen)");
        assert_ne!(naive, out);
    }

    #[test]
    fn test_insertion_at_same_offset_lands_before_replacement() {
        let source = "'中文'";
        let edits = vec![
            Edit::insert(0, "import I18N from 'x';\n"),
            Edit::new(0, source.len(), "I18N.a.zhongWen"),
        ];
        let out = replace_ranges(source, edits).unwrap();
        assert_eq!(out, "import I18N from 'x';\nI18N.a.zhongWen");
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let err = replace_ranges("0123456789", vec![Edit::new(0, 5, "a"), Edit::new(3, 8, "b")])
            .unwrap_err();
        assert!(matches!(err, Error::OverlappingEdits { .. }));
    }

    #[test]
    fn test_adjacent_edits_are_allowed() {
        let out =
            replace_ranges("abcdef", vec![Edit::new(0, 3, "X"), Edit::new(3, 6, "Y")]).unwrap();
        assert_eq!(out, "XY");
    }

    #[test]
    fn test_out_of_bounds_and_char_splitting_rejected() {
        assert!(matches!(
            replace_ranges("abc", vec![Edit::new(1, 9, "x")]).unwrap_err(),
            Error::EditOutOfBounds { .. }
        ));
        // '中' is three bytes; offset 1 is inside it.
        assert!(matches!(
            replace_ranges("中", vec![Edit::new(1, 3, "x")]).unwrap_err(),
            Error::EditOutOfBounds { .. }
        ));
    }

    #[test]
    fn test_empty_plan_is_identity() {
        let plan = ReplacementPlan::new();
        assert!(plan.is_empty());
        assert_eq!(plan.apply("unchanged").unwrap(), "unchanged");
    }
}
