//! Media catalog
//!
//! Lists the files in the source directory that can be offered for
//! selection.

use log::warn;
use std::fs;
use std::io;
use std::path::Path;

/// Names of regular files in `dir` whose extension is one of `extensions`
/// (compared case-insensitively), sorted by name.
pub fn list_media_files(dir: &Path, extensions: &[String]) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let path = entry.path();
        let is_media = path
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                extensions.iter().any(|known| known.eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false);

        if is_media {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_lists_only_media() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.mp4", "a.MKV", "notes.txt", "clip.avi", "noext"] {
            File::create(dir.path().join(name)).unwrap();
        }
        fs::create_dir(dir.path().join("folder.mp4")).unwrap();

        let extensions = vec!["mp4".to_string(), "avi".to_string(), "mkv".to_string()];
        let names = list_media_files(dir.path(), &extensions).unwrap();
        assert_eq!(names, vec!["a.MKV", "b.mp4", "clip.avi"]);
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_media_files(&dir.path().join("gone"), &["mp4".to_string()]).is_err());
    }
}
