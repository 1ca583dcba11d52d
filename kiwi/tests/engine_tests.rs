use kiwi::{
    DictionaryStore, ExtractEngine, ExtractOptions, FallbackTranslator, GlossaryTranslator,
    IssueKind, ProjectConfig, RestoreEngine, RestoreOptions,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const IMPORT: &str = "import I18N from 'src/utils/I18N';";

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

fn extract(root: &Path) -> kiwi::ExtractReport {
    let translator = FallbackTranslator;
    ExtractEngine::new(root, ProjectConfig::default(), &translator)
        .run(&ExtractOptions::new())
        .unwrap()
}

fn source_dictionary(root: &Path) -> kiwi::LanguageDictionary {
    DictionaryStore::load_path(&root.join(".kiwi/zh-CN")).unwrap()
}

#[test]
fn test_duplicate_literals_share_one_new_entry() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "pages/home/index.ts",
        "const a = '保存';\nconst b = '删除';\nconst c = \"保存\";\n",
    );

    let report = extract(root);
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert_eq!(report.new_entries.len(), 2);
    assert_eq!(report.occurrences, 3);
    assert_eq!(report.files_changed, 1);

    let output = read(root, "pages/home/index.ts");
    assert_eq!(
        output,
        format!("{IMPORT}\nconst a = I18N.home.保存;\nconst b = I18N.home.删除;\nconst c = I18N.home.保存;\n")
    );

    let dictionary = source_dictionary(root);
    assert_eq!(dictionary.len(), 2);
    assert_eq!(dictionary.get("home.保存"), Some("保存"));
    assert_eq!(dictionary.get("home.删除"), Some("删除"));
    assert!(root.join(".kiwi/zh-CN/index.ts").is_file());
}

#[test]
fn test_second_run_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/order/list.tsx", "export const t = () => <div title=\"订单\">订单列表</div>;\n");
    extract(root);

    let after_first = read(root, "src/order/list.tsx");
    let order_module = read(root, ".kiwi/zh-CN/order.ts");

    let report = extract(root);
    assert_eq!(report.files_changed, 0);
    assert!(report.new_entries.is_empty());
    assert!(report.dictionary_files_written.is_empty());
    assert_eq!(read(root, "src/order/list.tsx"), after_first);
    assert_eq!(read(root, ".kiwi/zh-CN/order.ts"), order_module);
}

#[test]
fn test_existing_entries_are_reused_across_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, ".kiwi/zh-CN/common.ts", "export default {\n  ok: '确定',\n};\n");
    write(root, "src/a/form.ts", "alert('确定');\n");
    write(root, "src/b/dialog.ts", "confirm('确定');\nconfirm('取消');\n");

    let report = extract(root);
    assert_eq!(report.new_entries.len(), 1);
    assert_eq!(report.new_entries[0].text, "取消");
    assert_eq!(report.reused_keys, 2);
    assert!(read(root, "src/a/form.ts").contains("alert(I18N.common.ok);"));
    assert!(read(root, "src/b/dialog.ts").contains("confirm(I18N.common.ok);"));
}

#[test]
fn test_colliding_fragments_get_distinct_keys() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    // Both texts truncate to the same five-character fragment.
    write(root, "src/tip/tip.ts", "a('保存成功啦');\nb('保存成功啦啦');\n");

    let report = extract(root);
    let keys: Vec<&str> = report.new_entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["tip.保存成功啦", "tip.保存成功啦2"]);

    let dictionary = source_dictionary(root);
    assert_eq!(dictionary.get("tip.保存成功啦"), Some("保存成功啦"));
    assert_eq!(dictionary.get("tip.保存成功啦2"), Some("保存成功啦啦"));
}

#[test]
fn test_glossary_keys_and_template_interpolation() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/list/pager.ts", "const s = `共 ${total} 条`;\n");

    let translator = GlossaryTranslator::new(HashMap::from([(
        "共 {val1} 条".to_string(),
        "total items".to_string(),
    )]));
    let report = ExtractEngine::new(root, ProjectConfig::default(), &translator)
        .run(&ExtractOptions::new())
        .unwrap();
    assert_eq!(report.new_entries[0].key, "list.pager.totalItems");
    assert!(read(root, "src/list/pager.ts")
        .contains("const s = I18N.get(I18N.list.pager.totalItems, { val1: total });"));
    assert_eq!(
        source_dictionary(root).get("list.pager.totalItems"),
        Some("共 {val1} 条")
    );
}

#[test]
fn test_vue_component() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "src/user/card.vue",
        "<template>\n  <div title=\"用户\">姓名</div>\n</template>\n<script>\nexport default { data() { return { tip: '提示' } } }\n</script>\n",
    );

    let report = extract(root);
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    let output = read(root, "src/user/card.vue");
    assert!(output.contains(":title=\"I18N.user.card.用户\""));
    assert!(output.contains("{{ I18N.user.card.姓名 }}"));
    assert!(output.contains("tip: I18N.user.card.提示"));
    assert!(output.contains(&format!("<script>\n{IMPORT}\nexport default")));
}

#[test]
fn test_dry_run_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let source = "const a = '保存';\n";
    write(root, "src/a.ts", source);

    let translator = FallbackTranslator;
    let report = ExtractEngine::new(root, ProjectConfig::default(), &translator)
        .run(&ExtractOptions::new().with_dry_run(true))
        .unwrap();
    assert!(report.dry_run);
    assert_eq!(report.files_changed, 1);
    assert_eq!(report.new_entries.len(), 1);
    assert!(report.files_written.is_empty());
    assert_eq!(read(root, "src/a.ts"), source);
    assert!(!root.join(".kiwi").exists());
}

#[test]
fn test_invalid_prefix_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/a.ts", "const a = '保存';\n");

    let translator = FallbackTranslator;
    let err = ExtractEngine::new(root, ProjectConfig::default(), &translator)
        .run(&ExtractOptions::new().with_prefix("common.btn"))
        .unwrap_err();
    assert!(matches!(err, kiwi::Error::InvalidPrefix(_)));
    assert_eq!(read(root, "src/a.ts"), "const a = '保存';\n");
}

#[test]
fn test_prefix_override_and_target() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/a.ts", "const a = '保存';\n");
    write(root, "src/b.ts", "const b = '删除';\n");

    let translator = FallbackTranslator;
    let report = ExtractEngine::new(root, ProjectConfig::default(), &translator)
        .run(&ExtractOptions::new().with_prefix("I18N.common.btn").with_target("src/a.ts"))
        .unwrap();
    assert_eq!(report.files_scanned, 1);
    assert!(read(root, "src/a.ts").contains("I18N.common.btn.保存"));
    assert_eq!(read(root, "src/b.ts"), "const b = '删除';\n");
}

#[test]
fn test_broken_file_is_reported_and_others_proceed() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/bad.ts", "const a = '坏了;\n");
    write(root, "src/good.ts", "const a = '好的';\n");

    let report = extract(root);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::ScanError);
    assert_eq!(read(root, "src/bad.ts"), "const a = '坏了;\n");
    assert!(read(root, "src/good.ts").contains("I18N.src.good.好的"));
}

#[test]
fn test_extract_then_restore_round_trip() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let original = format!(
        "{IMPORT}\nmessage.success('保存成功');\nmessage.error(`第 ${{page}} 页失败`);\nconst label = '标签';\n"
    );
    write(root, "src/page/save.ts", &original);
    extract(root);
    assert!(!read(root, "src/page/save.ts").contains("保存成功'"));

    let report = RestoreEngine::new(root, ProjectConfig::default())
        .run(&RestoreOptions::new(["message.success", "message.error"]))
        .unwrap();
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert_eq!(report.restored, 2);

    let restored = read(root, "src/page/save.ts");
    assert_eq!(
        restored,
        format!(
            "{IMPORT}\nmessage.success('保存成功');\nmessage.error(`第 ${{page}} 页失败`);\nconst label = I18N.page.save.标签;\n"
        )
    );
}

#[test]
fn test_restore_miss_is_reported_and_left_alone() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, ".kiwi/zh-CN/home.ts", "export default { baoCun: '保存' };\n");
    write(
        root,
        "src/home.ts",
        "toast(I18N.home.baoCun);\ntoast(I18N.home.gone);\n",
    );

    let report = RestoreEngine::new(root, ProjectConfig::default())
        .run(&RestoreOptions::new(["toast"]))
        .unwrap();
    assert_eq!(report.restored, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::DictionaryLookupMiss);
    assert_eq!(
        read(root, "src/home.ts"),
        "toast('保存');\ntoast(I18N.home.gone);\n"
    );
    // The dictionary module itself is never rewritten.
    assert_eq!(
        read(root, ".kiwi/zh-CN/home.ts"),
        "export default { baoCun: '保存' };\n"
    );
}

#[test]
fn test_restore_with_explicit_dictionary_and_files() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "i18n/zh-CN/home.js", "module.exports = { title: '标题' };\n");
    write(root, "src/a.ts", "t(I18N.home.title);\n");
    write(root, "src/b.ts", "t(I18N.home.title);\n");

    let report = RestoreEngine::new(root, ProjectConfig::default())
        .run(
            &RestoreOptions::new(["t"])
                .with_input("src/a.ts")
                .with_dictionary("i18n/zh-CN/home.js")
                .with_dry_run(false),
        )
        .unwrap();
    assert_eq!(report.files_scanned, 1);
    assert_eq!(read(root, "src/a.ts"), "t('标题');\n");
    assert_eq!(read(root, "src/b.ts"), "t(I18N.home.title);\n");
}

#[test]
fn test_root_index_file_keeps_its_entry() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "index.ts", "const a = '保存';\n");
    write(root, "z/b.ts", "const b = '删除';\n");

    let report = extract(root);
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    let keys: Vec<&str> = report.new_entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["index_.保存", "z.b.删除"]);
    assert_eq!(
        read(root, "index.ts"),
        format!("{IMPORT}\nconst a = I18N.index_.保存;\n")
    );

    let dictionary = source_dictionary(root);
    assert_eq!(dictionary.get("index_.保存"), Some("保存"));
    assert_eq!(dictionary.get("z.b.删除"), Some("删除"));
    assert!(read(root, ".kiwi/zh-CN/index.ts").contains("import index_ from './index_';"));

    // The aggregator stays parseable on the next run.
    let again = extract(root);
    assert!(again.issues.is_empty(), "{:?}", again.issues);
    assert!(again.new_entries.is_empty());
}

#[test]
fn test_digit_leading_directory_gives_valid_reference() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/404/index.ts", "const a = '页面不存在';\n");

    let report = extract(root);
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert!(read(root, "src/404/index.ts").contains("const a = I18N._404.页面不存在;"));
    assert_eq!(source_dictionary(root).get("_404.页面不存在"), Some("页面不存在"));
}
