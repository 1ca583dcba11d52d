use std::path::Path;

/// Validate the project root exists and is a directory
pub fn validate_root(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("Project root does not exist: {}", path.display()));
    }

    if !path.is_dir() {
        return Err(format!("Project root is not a directory: {}", path.display()));
    }

    Ok(())
}

/// Validate a file or directory path under the project root exists
pub fn validate_input_path(root: &Path, input: &Path) -> Result<(), String> {
    let full = root.join(input);
    if !full.exists() {
        return Err(format!("Path does not exist: {}", full.display()));
    }
    Ok(())
}

/// Validate file path exists and is a readable file
pub fn validate_file_path(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Err(format!("File does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Path is not a file: {}", path.display()));
    }

    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            // Try to create the directory
            if let Err(e) = std::fs::create_dir_all(parent) {
                return Err(format!("Cannot create output directory: {}", e));
            }
        }
    }

    Ok(())
}

/// Validate an explicit key prefix such as `I18N.common`
pub fn validate_prefix(prefix: &str) -> Result<(), String> {
    if prefix.trim().is_empty() {
        return Err("Prefix cannot be empty".to_string());
    }
    kiwi::parse_prefix(prefix).map(|_| ()).map_err(|e| e.to_string())
}

/// Validate a `;`-separated function list has at least one name
pub fn validate_function_list(list: &str) -> Result<Vec<String>, String> {
    let functions = kiwi::parse_function_list(list);
    if functions.is_empty() {
        return Err("At least one function name is required (e.g. --fn \"message.success;toast\")".to_string());
    }
    if let Some(bad) = functions
        .iter()
        .find(|f| f.split('.').any(|part| part.is_empty() || part.contains(char::is_whitespace)))
    {
        return Err(format!("Invalid function name: {}", bad));
    }
    Ok(functions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_root() {
        let temp = TempDir::new().unwrap();
        assert!(validate_root(temp.path()).is_ok());
        assert!(validate_root(&temp.path().join("missing")).is_err());

        let file = temp.path().join("a.ts");
        std::fs::write(&file, "").unwrap();
        assert!(validate_root(&file).is_err());
        assert!(validate_file_path(&file).is_ok());
        assert!(validate_file_path(temp.path()).is_err());
        assert!(validate_input_path(temp.path(), Path::new("a.ts")).is_ok());
        assert!(validate_input_path(temp.path(), Path::new("b.ts")).is_err());
    }

    #[test]
    fn test_validate_output_path_creates_parent() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("reports/nested/report.json");
        assert!(validate_output_path(&out).is_ok());
        assert!(temp.path().join("reports/nested").is_dir());
        assert!(validate_output_path(Path::new("report.json")).is_ok());
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("I18N.common").is_ok());
        assert!(validate_prefix("").is_err());
        let err = validate_prefix("common").unwrap_err();
        assert!(err.contains("invalid key prefix"));
    }

    #[test]
    fn test_validate_function_list() {
        assert_eq!(
            validate_function_list("message.success;toast").unwrap(),
            vec!["message.success", "toast"]
        );
        assert!(validate_function_list(";;").is_err());
        assert!(validate_function_list("message..success").is_err());
    }
}
