//! Documentation archive handling: filename parsing, validation and extraction.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::StoreResult;

/// Entry that must sit at the root of every documentation archive.
pub const INDEX_FILE: &str = "index.html";

/// Optional changelog entry shared across a project's versions.
pub const CHANGELOG_FILE: &str = "changelog.html";

const S_IFMT: u32 = 0o170000;
const S_IFLNK: u32 = 0o120000;

/// Split `<name>-<version>.zip` on the last hyphen.
///
/// Example: "my-docs-1.2.0.zip" -> ("my-docs", "1.2.0"). The parts are not
/// validated here.
pub fn parse_archive_filename(filename: &str) -> Option<(String, String)> {
    let stem = filename.strip_suffix(".zip")?;
    let (name, version) = stem.rsplit_once('-')?;
    Some((name.to_string(), version.to_string()))
}

/// An opened zip archive holding a documentation bundle.
pub struct DocArchive<R> {
    zip: ZipArchive<R>,
}

impl<R: Read + Seek> DocArchive<R> {
    pub fn open(reader: R) -> StoreResult<Self> {
        Ok(Self {
            zip: ZipArchive::new(reader)?,
        })
    }

    /// Whether `index.html` is present at the archive root.
    pub fn has_root_index(&self) -> bool {
        self.zip.file_names().any(|name| name == INDEX_FILE)
    }

    /// Unpack every entry below `dest`.
    ///
    /// Entries whose names would land outside `dest` abort the extraction;
    /// symlink entries are skipped.
    pub fn extract_to(&mut self, dest: &Path) -> StoreResult<()> {
        for index in 0..self.zip.len() {
            let mut entry = self.zip.by_index(index)?;

            let relative = entry.enclosed_name().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("archive entry escapes target directory: {}", entry.name()),
                )
            })?;

            if entry
                .unix_mode()
                .is_some_and(|mode| mode & S_IFMT == S_IFLNK)
            {
                warn!(entry = %entry.name(), "Skipping symlink entry in archive");
                continue;
            }

            let target = dest.join(relative);
            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            io::copy(&mut entry, &mut out)?;
        }

        debug!(dest = %dest.display(), entries = self.zip.len(), "Archive extracted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_zip(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        let mut cursor = writer.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_parse_archive_filename() {
        assert_eq!(
            parse_archive_filename("sample-1.0.0.zip"),
            Some(("sample".to_string(), "1.0.0".to_string()))
        );
        assert_eq!(
            parse_archive_filename("my-docs-site-2.0-rc1.zip"),
            Some(("my-docs-site-2.0".to_string(), "rc1".to_string()))
        );
        assert_eq!(
            parse_archive_filename("sample-.zip"),
            Some(("sample".to_string(), String::new()))
        );
        assert_eq!(parse_archive_filename("sample-1.0.0.tar.gz"), None);
        assert_eq!(parse_archive_filename("sample.zip"), None);
    }

    #[test]
    fn test_root_index_detection() {
        let archive = DocArchive::open(build_zip(&[("index.html", "<html/>")])).unwrap();
        assert!(archive.has_root_index());

        let nested = DocArchive::open(build_zip(&[("docs/index.html", "<html/>")])).unwrap();
        assert!(!nested.has_root_index());
    }

    #[test]
    fn test_open_rejects_non_zip() {
        assert!(DocArchive::open(Cursor::new(b"not a zip".to_vec())).is_err());
    }

    #[test]
    fn test_extract_creates_nested_files() {
        let temp = TempDir::new().unwrap();
        let mut archive = DocArchive::open(build_zip(&[
            ("index.html", "<html>root</html>"),
            ("api/module.html", "<html>api</html>"),
        ]))
        .unwrap();

        archive.extract_to(temp.path()).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("index.html")).unwrap(),
            "<html>root</html>"
        );
        assert!(temp.path().join("api/module.html").is_file());
    }

    #[test]
    fn test_extract_rejects_traversal_entries() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir(&dest).unwrap();
        let mut archive = DocArchive::open(build_zip(&[
            ("index.html", "<html/>"),
            ("../escape.html", "gotcha"),
        ]))
        .unwrap();

        assert!(archive.extract_to(&dest).is_err());
        assert!(!temp.path().join("escape.html").exists());
    }
}
