//! Locates the shared test resources (condition models and mnemonic
//! streams) used by the tests of every crate in the workspace, and the
//! fixtures that only the command line uses.
use std::{fs, path::PathBuf};

fn resource_dir(parts: &[&str]) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("..");
    path.extend(parts);
    path
}

fn shared_resource_dir() -> PathBuf {
    resource_dir(&["resources", "test"])
}

/// Returns the path of the named resource in the shared directory.
pub fn shared_resource_path(name: &str) -> PathBuf {
    shared_resource_dir().join(name)
}

/// Returns the path of the named command line fixture (option files and
/// streams that exercise a single rule).
pub fn cli_resource_path(name: &str) -> PathBuf {
    resource_dir(&["cli", "resources", "test"]).join(name)
}

/// Reads the named resource. Panics if the resource does not exist.
pub fn read_shared_resource(name: &str) -> String {
    let path = shared_resource_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Unable to read {}: {}", path.display(), e))
}

/// Returns the names of the shared resources that end with the suffix,
/// sorted so that tests iterate in a stable order.
pub fn shared_resource_names(suffix: &str) -> Vec<String> {
    let entries = fs::read_dir(shared_resource_dir())
        .unwrap_or_else(|e| panic!("Unable to list shared resources: {}", e));
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(suffix))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_resource_path_when_options_then_exists() {
        assert!(cli_resource_path("options.json").is_file());
    }

    #[test]
    fn shared_resource_names_when_rows_suffix_then_excludes_cli_fixtures() {
        let names = shared_resource_names("_rows.json");
        assert!(names.contains(&"valid_rows.json".to_string()));
        assert!(!names.contains(&"double_coil.json".to_string()));
    }
}
