//! Configuration utility functions.

use serde_json::Value;
use std::path::{Path, PathBuf};

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
///
/// # Example
/// ```text
/// /home/user/book/chapters/   ← cwd
/// /home/user/book/svgweave.toml  ← found!
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

fn find_upward(start: &Path, config_name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

/// Recursively merge `overlay` into `base`: tables merge key by key,
/// any other value replaces the base value.
pub fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    #[test]
    fn test_find_upward() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("svgweave.toml"), "").unwrap();

        assert_eq!(
            find_upward(&nested, Path::new("svgweave.toml")),
            Some(dir.path().join("svgweave.toml"))
        );
        assert_eq!(find_upward(&nested, Path::new("other.toml")), None);
    }

    #[test]
    fn test_find_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        assert_eq!(find_config_file(&path), None);
        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path), Some(path));
    }

    #[test]
    fn test_merge_json() {
        let mut base = json!({"minify": {"enable": true, "indent": 2}, "text": {"enable": true}});
        merge_json(
            &mut base,
            json!({"minify": {"enable": false}, "filter": {"formats": ["html5"]}}),
        );
        assert_eq!(
            base,
            json!({
                "minify": {"enable": false, "indent": 2},
                "text": {"enable": true},
                "filter": {"formats": ["html5"]}
            })
        );
    }
}
