//! Backing sources of template text

use rustc_hash::FxHashMap;
use std::io;
use std::path::{Path, PathBuf};

/// One readable template text per resource-type key
///
/// Keys reaching a source are already normalized: lower-case, no path
/// separators.
pub trait TemplateSource: Send + Sync {
    /// Read the template text for `key`
    fn read(&self, key: &str) -> io::Result<String>;

    /// Keys this source can serve, sorted
    fn list(&self) -> Vec<String>;

    /// Where a key would be read from, for error messages
    fn describe(&self, key: &str) -> String;
}

/// Templates stored as `<root>/<key>.<extension>`
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
    extension: String,
}

impl FileSystemSource {
    /// Create a source rooted at `root`; a leading dot on `extension` is ignored
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    /// Template directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.{}", self.extension))
    }
}

impl TemplateSource for FileSystemSource {
    fn read(&self, key: &str) -> io::Result<String> {
        std::fs::read_to_string(self.path_for(key))
    }

    fn list(&self) -> Vec<String> {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let extension = glob::Pattern::escape(&self.extension);
        let pattern = Path::new(&root).join(format!("*.{extension}"));
        let pattern = pattern.to_string_lossy();
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(e) => {
                log::warn!("Invalid template glob '{pattern}': {e}");
                return Vec::new();
            }
        };

        let mut keys: Vec<String> = paths
            .filter_map(|entry| match entry {
                Ok(path) => path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().to_lowercase()),
                Err(e) => {
                    log::warn!("Skipping unreadable template path: {e}");
                    None
                }
            })
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    fn describe(&self, key: &str) -> String {
        self.path_for(key).display().to_string()
    }
}

/// Templates held in memory, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    templates: FxHashMap<String, String>,
}

impl InMemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`InMemorySource::insert`]
    pub fn with_template(mut self, key: &str, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    /// Add or replace a template; the key is lower-cased
    pub fn insert(&mut self, key: &str, text: impl Into<String>) {
        self.templates.insert(key.to_lowercase(), text.into());
    }
}

impl TemplateSource for InMemorySource {
    fn read(&self, key: &str) -> io::Result<String> {
        self.templates.get(key).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no template named '{key}'"))
        })
    }

    fn list(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.templates.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn describe(&self, key: &str) -> String {
        format!("memory:{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_filesystem_read_and_list() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("patient.liquid"), "{}").unwrap();
        fs::write(dir.path().join("Observation.liquid"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let source = FileSystemSource::new(dir.path(), ".liquid");
        assert_eq!(source.read("patient").unwrap(), "{}");
        assert_eq!(source.list(), vec!["observation", "patient"]);
        assert!(source.describe("patient").ends_with("patient.liquid"));

        let err = source.read("encounter").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_list_with_glob_characters_in_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("templates [v2]*?");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("bundle.liquid"), "{}").unwrap();
        fs::write(root.join("medication-request.liquid"), "{}").unwrap();

        let source = FileSystemSource::new(&root, "liquid");
        assert_eq!(source.list(), vec!["bundle", "medication-request"]);
    }

    #[test]
    fn test_missing_directory_lists_nothing() {
        let source = FileSystemSource::new("/definitely/not/here", "liquid");
        assert!(source.list().is_empty());
    }

    #[test]
    fn test_in_memory() {
        let source = InMemorySource::new()
            .with_template("Patient", "a")
            .with_template("condition", "b");
        assert_eq!(source.read("patient").unwrap(), "a");
        assert_eq!(source.list(), vec!["condition", "patient"]);
        assert!(source.read("encounter").is_err());
    }
}
