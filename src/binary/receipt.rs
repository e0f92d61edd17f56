use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// File written next to the installed binary.
pub const RECEIPT_FILE_NAME: &str = ".rlx-install.json";
const RECEIPT_TMP_FILE_NAME: &str = ".rlx-install.json.tmp";

/// Record of what an install put on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReceipt {
    pub name: String,
    pub version: String,
    pub release_target: String,
    pub binary_name: String,
    pub url: String,
    /// Top-level entries the install created, besides the receipt itself.
    #[serde(default)]
    pub files: Vec<String>,
}

impl InstallReceipt {
    pub fn path(install_dir: &Path) -> PathBuf {
        install_dir.join(RECEIPT_FILE_NAME)
    }

    /// Whether `file_name`, a top-level entry of the install directory,
    /// belongs to this install.
    pub fn owns(&self, file_name: &str) -> bool {
        file_name == RECEIPT_FILE_NAME
            || file_name == RECEIPT_TMP_FILE_NAME
            || file_name == self.binary_name
            || self.files.iter().any(|f| f == file_name)
    }

    pub fn load<R: Runtime>(runtime: &R, install_dir: &Path) -> Result<Self> {
        let path = Self::path(install_dir);
        let content = runtime
            .read_to_string(&path)
            .with_context(|| format!("Failed to read install receipt {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse install receipt {:?}", path))
    }

    /// Writes the receipt atomically (temp file, then rename).
    pub fn save<R: Runtime>(&self, runtime: &R, install_dir: &Path) -> Result<()> {
        let path = Self::path(install_dir);
        let tmp_path = install_dir.join(RECEIPT_TMP_FILE_NAME);
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize install receipt")?;
        runtime.write(&tmp_path, json.as_bytes())?;
        runtime.rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::*;
    use tempfile::tempdir;

    fn receipt() -> InstallReceipt {
        InstallReceipt {
            name: "rlx".into(),
            version: "1.2.3".into(),
            release_target: "x86_64-unknown-linux-musl".into(),
            binary_name: "rlx".into(),
            url: "https://example.com/rlx-v1.2.3-x86_64-unknown-linux-musl.tar.gz".into(),
            files: vec!["LICENSE".into(), "rlx".into()],
        }
    }

    #[test]
    fn test_save_then_load() -> Result<()> {
        let dir = tempdir()?;
        receipt().save(&RealRuntime, dir.path())?;

        assert!(dir.path().join(RECEIPT_FILE_NAME).exists());
        assert!(!dir.path().join(".rlx-install.json.tmp").exists());
        assert_eq!(InstallReceipt::load(&RealRuntime, dir.path())?, receipt());
        Ok(())
    }

    #[cfg(not(windows))]
    #[test]
    fn test_save_writes_temp_then_renames() {
        let install_dir = Path::new("/opt/rlx/bin");
        let mut runtime = MockRuntime::new();
        runtime
            .expect_write()
            .withf(|path, contents| {
                path == Path::new("/opt/rlx/bin/.rlx-install.json.tmp")
                    && String::from_utf8_lossy(contents).contains("\"version\": \"1.2.3\"")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        runtime
            .expect_rename()
            .with(
                eq(PathBuf::from("/opt/rlx/bin/.rlx-install.json.tmp")),
                eq(PathBuf::from("/opt/rlx/bin/.rlx-install.json")),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        receipt().save(&runtime, install_dir).unwrap();
    }

    #[test]
    fn test_owns_installed_entries_only() {
        let receipt = receipt();
        assert!(receipt.owns("rlx"));
        assert!(receipt.owns("LICENSE"));
        assert!(receipt.owns(RECEIPT_FILE_NAME));
        assert!(!receipt.owns("other-tool"));
    }

    #[test]
    fn test_load_receipt_without_file_list() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read_to_string().returning(|_| {
            Ok(r#"{"name":"rlx","version":"1.0.0","release_target":"x86_64-apple-darwin","binary_name":"rlx","url":"u"}"#.to_string())
        });

        let receipt = InstallReceipt::load(&runtime, Path::new("/opt/rlx/bin")).unwrap();
        assert!(receipt.files.is_empty());
        assert!(receipt.owns("rlx"));
        assert!(!receipt.owns("LICENSE"));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("not json".to_string()));

        let err = InstallReceipt::load(&runtime, Path::new("/opt/rlx/bin")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse install receipt"));
    }
}
