use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::platform::PlatformDescriptor;
use crate::runtime::Runtime;

/// Name of the program this shim installs and runs.
pub const PROGRAM_NAME: &str = "rlx";

/// Release of the program to fetch, fixed at build time.
pub const RELEASE_VERSION: &str = env!("RLX_RELEASE_VERSION");

/// Repository hosting the release archives, fixed at build time.
pub const REPOSITORY_URL: &str = env!("RLX_REPOSITORY_URL");

/// Settings shared by the install and run commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimConfig {
    pub name: String,
    pub version: String,
    pub repository_url: String,
    pub install_dir: PathBuf,
}

impl ShimConfig {
    /// Builds the configuration from build-time constants, applying any
    /// command line overrides.
    pub fn new<R: Runtime>(
        runtime: &R,
        install_dir: Option<PathBuf>,
        repository_url: Option<String>,
    ) -> Result<Self> {
        let install_dir = match install_dir {
            Some(dir) => dir,
            None => default_install_dir(runtime)?,
        };
        let config = Self {
            name: PROGRAM_NAME.to_string(),
            version: RELEASE_VERSION.to_string(),
            repository_url: repository_url.unwrap_or_else(|| REPOSITORY_URL.to_string()),
            install_dir,
        };
        debug!("Using configuration {:?}", config);
        Ok(config)
    }

    /// Download URL of the release archive for `descriptor`.
    pub fn release_url(&self, descriptor: &PlatformDescriptor) -> String {
        release_url(
            &self.repository_url,
            &self.name,
            &self.version,
            descriptor.release_target,
        )
    }

    /// Location of the installed executable for `descriptor`.
    pub fn binary_path(&self, descriptor: &PlatformDescriptor) -> PathBuf {
        self.install_dir.join(descriptor.binary_name)
    }
}

/// `<data_local_dir>/rlx/bin`
pub fn default_install_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let data_dir = runtime
        .data_local_dir()
        .context("Could not determine a data directory; pass --install-dir")?;
    Ok(data_dir.join(PROGRAM_NAME).join("bin"))
}

/// Builds `<repository>/releases/download/rust_v<version>/<name>-v<version>-<target>.tar.gz`.
///
/// Package metadata often carries the repository as `git+https://...git`;
/// those decorations and a trailing slash are dropped first.
pub fn release_url(
    repository_url: &str,
    name: &str,
    version: &str,
    release_target: &str,
) -> String {
    format!(
        "{}/releases/download/rust_v{}/{}-v{}-{}.tar.gz",
        normalize_repository_url(repository_url),
        version,
        name,
        version,
        release_target
    )
}

fn normalize_repository_url(url: &str) -> &str {
    let url = url.trim();
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.trim_end_matches('/');
    url.strip_suffix(".git").unwrap_or(url)
}
