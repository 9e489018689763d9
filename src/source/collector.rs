use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, warn};
use walkdir::WalkDir;

use super::is_supported_image;
use crate::error::ThumbError;

/// Collect the supported images under `input`.
///
/// A regular file yields itself when its extension is supported. A directory
/// is walked recursively and the result is sorted. Anything else (missing
/// path, broken symlink, device) is rejected with [`ThumbError::InvalidInput`].
pub fn collect_image_paths(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(if is_supported_image(input) {
            vec![input.to_path_buf()]
        } else {
            debug!("Skipping unsupported file {}", input.display());
            Vec::new()
        });
    }

    if !input.is_dir() {
        return Err(ThumbError::InvalidInput(input.to_path_buf()).into());
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(input).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            paths.push(entry.into_path());
        }
    }
    paths.sort();

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_single_supported_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("IMG_0001.CR3");
        touch(&file);

        assert_eq!(collect_image_paths(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_single_unsupported_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        touch(&file);

        assert!(collect_image_paths(&file).unwrap().is_empty());
    }

    #[test]
    fn test_directory_is_walked_recursively_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("b.jpg"));
        touch(&root.join("a.PNG"));
        touch(&root.join("nested/deeper/c.arw"));
        touch(&root.join("nested/d.cr2"));
        touch(&root.join("nested/e.jpeg"));
        touch(&root.join("nested/skip.gif"));
        touch(&root.join("readme.md"));
        fs::create_dir_all(root.join("empty.jpg")).unwrap();

        let paths = collect_image_paths(root).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            [
                "a.PNG",
                "b.jpg",
                "nested/d.cr2",
                "nested/deeper/c.arw",
                "nested/e.jpeg"
            ]
        );
    }

    #[test]
    fn test_missing_path_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = collect_image_paths(&missing).unwrap_err();
        match err.downcast_ref::<ThumbError>() {
            Some(ThumbError::InvalidInput(path)) => assert_eq!(path, &missing),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("dangling.jpg");
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), &link).unwrap();

        let err = collect_image_paths(&link).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ThumbError>(),
            Some(ThumbError::InvalidInput(_))
        ));
    }
}
