//! Facilities for discovering input files and loading text corpora.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::config::IngestConfig;
use crate::error::{BpeError, Result};

/// Discovers files rooted at the provided input paths according to the ingest configuration.
///
/// Files named directly are always kept. Directories are traversed recursively by default (set
/// [`IngestConfig::recursive`] to `false` to stay on the first level) in file-name order, keeping
/// only files accepted by [`IngestConfig::extensions`].
pub fn collect_paths<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(BpeError::InvalidConfig(format!(
                "input path {path:?} does not exist"
            )));
        }
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        let walker = WalkDir::new(path)
            .follow_links(cfg.follow_symlinks)
            .max_depth(if cfg.recursive { usize::MAX } else { 1 })
            .sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|err| {
                let entry_path = err.path().map(Path::to_path_buf);
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                BpeError::io(source, entry_path)
            })?;
            let extension = entry.path().extension().and_then(|ext| ext.to_str());
            if entry.file_type().is_file() && cfg.accepts_extension(extension) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    if files.is_empty() {
        return Err(BpeError::InvalidConfig(
            "no files discovered in provided inputs".into(),
        ));
    }
    Ok(files)
}

/// Loads every discovered file as UTF-8 text and concatenates them in discovery order.
pub fn load_text_corpus<P: AsRef<Path>>(inputs: &[P], cfg: &IngestConfig) -> Result<String> {
    let mut corpus = String::new();
    for file_path in collect_paths(inputs, cfg)? {
        let text = fs::read_to_string(&file_path)
            .map_err(|err| BpeError::io(err, Some(file_path.clone())))?;
        debug!("loaded {} bytes from {}", text.len(), file_path.display());
        corpus.push_str(&text);
    }
    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn collect_paths_discovers_files_recursively() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).expect("create nested directory");
        let file_a = dir.path().join("a.txt");
        let file_b = nested.join("b.txt");
        fs::write(&file_a, "alpha").expect("write a");
        fs::write(&file_b, "beta").expect("write b");

        let cfg = IngestConfig::default();
        let paths = collect_paths(&[dir.path()], &cfg).expect("collect paths");
        assert_eq!(paths, vec![file_a.clone(), file_b]);

        let shallow = IngestConfig::builder().recursive(false).build();
        let paths = collect_paths(&[dir.path()], &shallow).expect("collect shallow");
        assert_eq!(paths, vec![file_a]);
    }

    #[test]
    fn extension_filter_applies_inside_directories() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("keep.txt"), "x").expect("write txt");
        fs::write(dir.path().join("skip.bin"), "y").expect("write bin");

        let cfg = IngestConfig::builder().extensions(["txt"]).build();
        let paths = collect_paths(&[dir.path()], &cfg).expect("collect paths");
        assert_eq!(paths, vec![dir.path().join("keep.txt")]);

        let direct = collect_paths(&[dir.path().join("skip.bin")], &cfg).expect("direct file");
        assert_eq!(direct.len(), 1);
    }

    #[test]
    fn load_text_corpus_concatenates_in_order() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("1.txt"), "hello ").expect("write first");
        fs::write(dir.path().join("2.txt"), "world").expect("write second");
        let corpus =
            load_text_corpus(&[dir.path()], &IngestConfig::default()).expect("load corpus");
        assert_eq!(corpus, "hello world");
    }

    #[test]
    fn missing_inputs_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let err = collect_paths(&[dir.path().join("absent")], &IngestConfig::default())
            .expect_err("missing path");
        assert!(matches!(err, BpeError::InvalidConfig(_)));

        let err = collect_paths(&[dir.path()], &IngestConfig::default()).expect_err("empty dir");
        assert!(matches!(err, BpeError::InvalidConfig(message) if message.contains("no files")));
    }

    #[test]
    fn non_utf8_files_are_io_errors() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("bad.txt");
        fs::write(&file, [0xFFu8, 0xFE]).expect("write bytes");
        let err = load_text_corpus(&[file], &IngestConfig::default()).expect_err("invalid utf-8");
        assert!(matches!(err, BpeError::Io { .. }));
    }
}
