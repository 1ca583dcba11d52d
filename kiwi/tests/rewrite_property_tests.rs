use kiwi::{
    FallbackTranslator, KeyAssigner, LanguageDictionary, ScanOptions, extract_source,
    restore_source,
};
use proptest::prelude::*;
use std::path::Path;

fn text_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[保存删除成功失败提示确定取消][保存删除成功失败提示确定取消a-z ,!]{0,8}")
        .expect("valid text regex")
}

fn filler_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z =;\n+,]{0,12}").expect("valid filler regex")
}

fn segments_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((filler_strategy(), text_strategy()), 1..10)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_range_is_replaced_exactly_once(segments in segments_strategy(), tail in filler_strategy()) {
        let mut source = String::new();
        for (filler, text) in &segments {
            source.push_str(filler);
            source.push('\'');
            source.push_str(text);
            source.push('\'');
        }
        source.push_str(&tail);

        let translator = FallbackTranslator;
        let mut assigner = KeyAssigner::new(LanguageDictionary::new("zh-CN"), &translator);
        let extraction = extract_source(
            &source,
            Path::new("src/demo/page.ts"),
            &mut assigner,
            &ScanOptions::extract(Vec::<String>::new()),
            "",
        )
        .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(extraction.assignments.len(), segments.len());
        let mut expected = String::new();
        for ((filler, _), assignment) in segments.iter().zip(&extraction.assignments) {
            expected.push_str(filler);
            expected.push_str(&assignment.reference());
        }
        expected.push_str(&tail);
        prop_assert_eq!(extraction.output, expected);

        // Equal text always maps to the same key.
        for a in &extraction.assignments {
            for b in &extraction.assignments {
                prop_assert_eq!(a.occurrence.text == b.occurrence.text, a.key == b.key);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn restore_inverts_extract(texts in prop::collection::vec(text_strategy(), 1..8)) {
        let source: String = texts.iter().map(|t| format!("t('{t}');\n")).collect();

        let translator = FallbackTranslator;
        let mut assigner = KeyAssigner::new(LanguageDictionary::new("zh-CN"), &translator);
        let path = Path::new("src/demo/page.ts");
        let extraction = extract_source(
            &source,
            path,
            &mut assigner,
            &ScanOptions::extract(Vec::<String>::new()),
            "",
        )
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(!extraction.output.contains('\''));

        let restore = restore_source(
            &extraction.output,
            path,
            assigner.dictionary(),
            &ScanOptions::restore(["t"]),
        )
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(restore.misses.is_empty());
        prop_assert_eq!(restore.output, source);
    }
}
