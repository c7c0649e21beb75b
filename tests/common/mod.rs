#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

/// Test fixture paths
pub struct TestFixtures {
    pub fixtures_dir: PathBuf,
}

impl TestFixtures {
    pub fn new() -> Self {
        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("projects");

        Self { fixtures_dir }
    }

    pub fn project(&self, name: &str) -> PathBuf {
        self.fixtures_dir.join(name)
    }

    pub fn valid(&self) -> PathBuf {
        self.project("valid.vcxproj")
    }

    pub fn mislabeled(&self) -> PathBuf {
        self.project("mislabeled.vcxproj")
    }

    pub fn arm64(&self) -> PathBuf {
        self.project("arm64.vcxproj")
    }

    pub fn second_itemgroup(&self) -> PathBuf {
        self.project("second_itemgroup.vcxproj")
    }

    pub fn malformed(&self) -> PathBuf {
        self.project("malformed.vcxproj")
    }
}

/// Copy fixtures into a fresh temporary tree.
///
/// Each entry is `(fixture name, destination relative to the tree root)`.
pub async fn project_tree(entries: &[(&str, &str)]) -> std::io::Result<TempDir> {
    let fixtures = TestFixtures::new();
    let temp_dir = TempDir::new()?;

    for (fixture, destination) in entries {
        let target = temp_dir.path().join(destination);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(fixtures.project(fixture), &target).await?;
    }

    Ok(temp_dir)
}

pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
