//! Common test utilities and helpers
//!
//! Builds stores on temporary directories and writes zip fixtures.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::Arc;

use docstore::{DocStore, Profile, RegisterRequest, StoreConfig, UploadOutcome};
use serde_json::json;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Store rooted in a temporary directory that lives as long as the setup.
pub struct TestStore {
    pub temp_dir: TempDir,
    pub store: DocStore,
}

impl TestStore {
    pub fn root(&self) -> &std::path::Path {
        self.store.root()
    }

    /// Register `name` and return its unique key.
    pub fn register(&self, name: &str) -> String {
        self.register_with(name, "python", &["docs"])
    }

    pub fn register_with(&self, name: &str, lang: &str, tags: &[&str]) -> String {
        self.store
            .register(&registration(name, lang, tags))
            .expect("registration should succeed")
            .unique_key
    }

    /// Upload a minimal valid archive for `name`-`version`.
    pub fn upload(&self, name: &str, version: &str, key: &str) -> UploadOutcome {
        self.upload_entries(name, version, key, false, &[("index.html", version)])
    }

    pub fn upload_entries(
        &self,
        name: &str,
        version: &str,
        key: &str,
        reupload: bool,
        entries: &[(&str, &str)],
    ) -> UploadOutcome {
        self.store
            .upload(
                zip_archive(entries),
                &format!("{name}-{version}.zip"),
                key,
                reupload,
            )
            .expect("upload should produce an outcome")
    }
}

/// Writable store with default limits.
pub fn create_test_store() -> TestStore {
    create_test_store_with(|_| {})
}

pub fn create_test_store_with(customize: impl FnOnce(&mut StoreConfig)) -> TestStore {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut config = StoreConfig::with_root(temp_dir.path().join("docfiles"), Profile::Dev);
    customize(&mut config);
    let store = DocStore::new(Arc::new(config));
    TestStore { temp_dir, store }
}

pub fn registration(name: &str, lang: &str, tags: &[&str]) -> RegisterRequest {
    RegisterRequest::from_json(&json!({
        "name": name,
        "description": format!("{name} documentation"),
        "owner": "Jane Doe",
        "owner-email": "jane@example.com",
        "programming-lang": lang,
        "tags": tags,
    }))
    .expect("valid registration payload")
}

/// In-memory zip archive holding `entries` as (path, contents).
pub fn zip_archive(entries: &[(&str, &str)]) -> Cursor<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start zip entry");
        writer.write_all(body.as_bytes()).expect("write zip entry");
    }
    let mut cursor = writer.finish().expect("finish zip");
    cursor.set_position(0);
    cursor
}
