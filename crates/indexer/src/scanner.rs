use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// How a scanned file should be chunked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Python source, handled by the syntax path
    Code,
    /// Markdown/text documentation, handled by the document path
    Document,
}

/// Classify a path by extension, `None` for unsupported files
#[must_use]
pub fn source_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if CODE_EXTENSIONS.iter().any(|c| c == &ext) {
        Some(SourceKind::Code)
    } else if DOC_EXTENSIONS.iter().any(|c| c == &ext) {
        Some(SourceKind::Document)
    } else {
        None
    }
}

/// Scanner for finding chunkable files in a corpus directory
pub struct FileScanner {
    root: PathBuf,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Scan the corpus for supported files (.gitignore aware)
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(true) // do not index hidden files by default
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);
        builder.filter_entry(move |entry| !FileScanner::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    if source_kind(path).is_none() {
                        continue;
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort();
        log::info!("Found {} chunkable files", files.len());
        files
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        if let Ok(relative) = path.strip_prefix(root) {
            for component in relative.components() {
                if let std::path::Component::Normal(name) = component {
                    let lowered = name.to_string_lossy().to_lowercase();
                    if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

const IGNORED_SCOPES: &[&str] = &[
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    // caches / builds
    ".cache",
    "__pycache__",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    "node_modules",
    "build",
    "dist",
    "site-packages",
    ".eggs",
];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB

/// Python sources handled by the syntax path
const CODE_EXTENSIONS: &[&str] = &["py", "pyw"];

/// Documentation formats handled by the document path
const DOC_EXTENSIONS: &[&str] = &["md", "markdown", "rst", "txt"];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_by_extension() {
        assert_eq!(source_kind(Path::new("a.py")), Some(SourceKind::Code));
        assert_eq!(source_kind(Path::new("b.PY")), Some(SourceKind::Code));
        assert_eq!(source_kind(Path::new("c.md")), Some(SourceKind::Document));
        assert_eq!(source_kind(Path::new("d.rst")), Some(SourceKind::Document));
        assert_eq!(source_kind(Path::new("e.json")), None);
        assert_eq!(source_kind(Path::new("Makefile")), None);
    }

    #[test]
    fn scan_finds_only_supported_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("main.py"), b"x = 1\n").unwrap();
        fs::write(temp.path().join("README.md"), b"# Hello\n").unwrap();
        fs::write(temp.path().join("data.json"), b"{}").unwrap();

        let scanner = FileScanner::new(temp.path());
        let files = scanner.scan();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("main.py")));
        assert!(files.iter().any(|p| p.ends_with("README.md")));
    }

    #[test]
    fn skips_cache_directories() {
        let temp = tempdir().unwrap();
        let cache = temp.path().join("__pycache__");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("mod.py"), b"compiled = True\n").unwrap();
        fs::write(temp.path().join("mod.py"), b"compiled = False\n").unwrap();

        let scanner = FileScanner::new(temp.path());
        let files = scanner.scan();

        assert_eq!(files.len(), 1);
        assert!(files
            .iter()
            .all(|p| !p.to_string_lossy().contains("__pycache__")));
    }

    #[test]
    fn respects_gitignore() {
        let temp = tempdir().unwrap();
        // gitignore rules only apply inside a git repository.
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        let generated = temp.path().join("generated");
        fs::create_dir_all(&generated).unwrap();
        fs::write(generated.join("auto.py"), b"x = 1\n").unwrap();
        fs::write(temp.path().join("kept.py"), b"y = 2\n").unwrap();
        fs::write(temp.path().join(".gitignore"), b"/generated\n").unwrap();

        let scanner = FileScanner::new(temp.path());
        let files = scanner.scan();

        assert!(files
            .iter()
            .all(|p| !p.to_string_lossy().contains("generated")));
        assert!(files.iter().any(|p| p.ends_with("kept.py")));
    }
}
