//! Installing and running the prebuilt binary.
//!
//! [`BinaryInstaller`] is the seam between the platform-aware commands and
//! the mechanics of fetching, unpacking and spawning a release binary.

mod receipt;
mod release;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::platform::PlatformDescriptor;

pub use receipt::{InstallReceipt, RECEIPT_FILE_NAME};
pub use release::ReleaseBinary;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BinaryInstaller: Send + Sync {
    /// Downloads the archive at `url` and installs `descriptor`'s binary into
    /// `install_dir`, replacing whatever was there.
    async fn install_binary(
        &self,
        descriptor: &PlatformDescriptor,
        url: &str,
        version: &str,
        install_dir: &Path,
    ) -> Result<()>;

    /// Runs the installed binary with `args` and inherited stdio, returning
    /// its exit code.
    fn run_binary(&self, descriptor: &PlatformDescriptor, args: &[String]) -> Result<i32>;
}

/// The binary to run has not been installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryNotFoundError {
    pub program: String,
    pub binary_path: PathBuf,
}

impl fmt::Display for BinaryNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is not installed at {}. You must install {} before you can run it (try `rlx-shim install`).",
            self.program,
            self.binary_path.display(),
            self.program
        )
    }
}

impl std::error::Error for BinaryNotFoundError {}
