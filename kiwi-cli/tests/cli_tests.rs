use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn kiwi_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("kiwi"))
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_cli_extract_rewrites_sources_and_writes_dictionary() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/home/index.ts", "const a = '保存';\n");

    let output = kiwi_cmd()
        .args(["extract", "--root", root.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Files changed: 1"));
    assert!(stdout.contains("New entries: 1"));
    assert!(stdout.contains("home.保存 = 保存"));

    let rewritten = fs::read_to_string(root.join("src/home/index.ts")).unwrap();
    assert_eq!(
        rewritten,
        "import I18N from 'src/utils/I18N';\nconst a = I18N.home.保存;\n"
    );
    let module = fs::read_to_string(root.join(".kiwi/zh-CN/home.ts")).unwrap();
    assert!(module.contains("'保存'"));
}

#[test]
fn test_cli_extract_dry_run_leaves_files_alone() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/a.ts", "alert('删除');\n");

    let output = kiwi_cmd()
        .args(["extract", "--dry-run", "--root", root.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dry-run mode: no files were written"));
    assert_eq!(
        fs::read_to_string(root.join("src/a.ts")).unwrap(),
        "alert('删除');\n"
    );
    assert!(!root.join(".kiwi").exists());
}

#[test]
fn test_cli_extract_rejects_invalid_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/a.ts", "alert('删除');\n");

    let output = kiwi_cmd()
        .args([
            "extract",
            "--prefix",
            "common.btn",
            "--root",
            root.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid key prefix"));
    assert_eq!(
        fs::read_to_string(root.join("src/a.ts")).unwrap(),
        "alert('删除');\n"
    );
}

#[test]
fn test_cli_extract_with_glossary_and_target() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/home/index.ts", "const a = '保存';\n");
    write(root, "src/other/list.ts", "const b = '列表';\n");
    let glossary = root.join("glossary.json");
    fs::write(&glossary, r#"{ "保存": "save" }"#).unwrap();

    let output = kiwi_cmd()
        .args([
            "extract",
            "src/home",
            "--glossary",
            glossary.to_str().unwrap(),
            "--root",
            root.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(fs::read_to_string(root.join("src/home/index.ts"))
        .unwrap()
        .contains("I18N.home.save"));
    assert_eq!(
        fs::read_to_string(root.join("src/other/list.ts")).unwrap(),
        "const b = '列表';\n"
    );
}

#[test]
fn test_cli_extract_strict_fails_on_scan_error_and_writes_report() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/bad.ts", "const a = '坏了;\n");
    write(root, "src/good.ts", "const a = '好的';\n");
    let report_path = root.join("out/report.json");

    let output = kiwi_cmd()
        .args([
            "extract",
            "--strict",
            "--report-json",
            report_path.to_str().unwrap(),
            "--root",
            root.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Extract policy failure (scan_error=1)"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["command"], "extract");
    assert_eq!(report["summary"]["files_scanned"], 2);
    assert_eq!(report["issues"][0]["kind"], "scan_error");
    // The good file is still processed.
    assert!(fs::read_to_string(root.join("src/good.ts"))
        .unwrap()
        .contains("I18N."));
}

#[test]
fn test_cli_restore_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "src/page/save.ts", "message.success('保存成功');\n");

    let extract = kiwi_cmd()
        .args(["extract", "--root", root.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(extract.status.success());
    let extracted = fs::read_to_string(root.join("src/page/save.ts")).unwrap();
    assert!(extracted.contains("message.success(I18N.page.save.保存成功);"));

    let output = kiwi_cmd()
        .args([
            "restore",
            "--fn",
            "message.success;toast",
            "--root",
            root.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Restored: 1"));
    let restored = fs::read_to_string(root.join("src/page/save.ts")).unwrap();
    assert!(restored.contains("message.success('保存成功');"));
}

#[test]
fn test_cli_restore_strict_fails_on_lookup_miss() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "i18n/home.ts", "export default { title: '标题' };\n");
    write(root, "src/a.ts", "toast(I18N.home.title);\ntoast(I18N.home.gone);\n");
    write(root, "src/b.ts", "toast(I18N.home.title);\n");

    let output = kiwi_cmd()
        .args([
            "restore",
            "--fn",
            "toast",
            "--file",
            "src/a.ts",
            "--dict",
            "i18n/home.ts",
            "--strict",
            "--root",
            root.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Restore policy failure (dictionary_lookup_miss=1)"));
    assert_eq!(
        fs::read_to_string(root.join("src/a.ts")).unwrap(),
        "toast('标题');\ntoast(I18N.home.gone);\n"
    );
    assert_eq!(
        fs::read_to_string(root.join("src/b.ts")).unwrap(),
        "toast(I18N.home.title);\n"
    );
}

#[test]
fn test_cli_restore_requires_function_names() {
    let temp_dir = TempDir::new().unwrap();

    let output = kiwi_cmd()
        .args([
            "restore",
            "--fn",
            ";",
            "--root",
            temp_dir.path().to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("At least one function name is required"));
}

#[test]
fn test_cli_missing_root_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope");

    let output = kiwi_cmd()
        .args(["extract", "--root", missing.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Project root does not exist"));
}
