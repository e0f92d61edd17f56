use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{BinaryInstaller, BinaryNotFoundError, InstallReceipt};
use crate::archive::ArchiveExtractor;
use crate::cleanup::{self, CleanupGuard, SharedCleanupContext};
use crate::config::ShimConfig;
use crate::download::download_file;
use crate::http::HttpClient;
use crate::platform::PlatformDescriptor;
use crate::runtime::Runtime;

/// Installs release archives from the project's download page and runs the
/// unpacked binary.
pub struct ReleaseBinary<R: Runtime, E: ArchiveExtractor> {
    runtime: R,
    http_client: HttpClient,
    extractor: E,
    name: String,
    version: String,
    install_dir: PathBuf,
}

impl<R: Runtime + 'static, E: ArchiveExtractor> ReleaseBinary<R, E> {
    pub fn new(runtime: R, http_client: HttpClient, extractor: E, config: &ShimConfig) -> Self {
        Self {
            runtime,
            http_client,
            extractor,
            name: config.name.clone(),
            version: config.version.clone(),
            install_dir: config.install_dir.clone(),
        }
    }

    async fn install_into(
        &self,
        descriptor: &PlatformDescriptor,
        url: &str,
        version: &str,
        install_dir: &Path,
        cleanup_ctx: SharedCleanupContext,
    ) -> Result<()> {
        self.prepare_install_dir(install_dir)?;
        let guard = CleanupGuard::new(Arc::clone(&cleanup_ctx), install_dir.to_path_buf());

        println!("Downloading release from {}", url);
        let result = self
            .fetch_and_unpack(descriptor, url, version, install_dir, cleanup_ctx)
            .await;

        if let Err(e) = result {
            debug!("Install failed, removing {:?}", install_dir);
            if self.runtime.exists(install_dir)
                && let Err(cleanup_err) = self.runtime.remove_dir_all(install_dir)
            {
                warn!("Failed to remove partial install {:?}: {}", install_dir, cleanup_err);
            }
            guard.success();
            return Err(e);
        }

        guard.success();
        println!("{} has been installed!", self.name);
        Ok(())
    }

    /// Clears out a previous install. The directory is only removed when
    /// everything in it was put there by that install.
    fn prepare_install_dir(&self, install_dir: &Path) -> Result<()> {
        if self.runtime.exists(install_dir) {
            let entries = self
                .runtime
                .read_dir(install_dir)
                .with_context(|| format!("Failed to read install directory {:?}", install_dir))?;
            if !entries.is_empty() {
                self.check_owned_entries(install_dir, &entries)?;
            }
            info!("Removing previous installation at {:?}", install_dir);
            self.runtime
                .remove_dir_all(install_dir)
                .with_context(|| {
                    format!("Failed to remove previous installation at {:?}", install_dir)
                })?;
        }

        self.runtime
            .create_dir_all(install_dir)
            .with_context(|| format!("Failed to create install directory at {:?}", install_dir))
    }

    fn check_owned_entries(&self, install_dir: &Path, entries: &[PathBuf]) -> Result<()> {
        if !self.runtime.exists(&InstallReceipt::path(install_dir)) {
            bail!(
                "Refusing to install into {:?}: the directory is not empty and does not hold a previous {} install",
                install_dir,
                self.name
            );
        }
        let receipt = InstallReceipt::load(&self.runtime, install_dir)?;

        let foreign: Vec<String> = entries
            .iter()
            .filter_map(|entry| entry.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !receipt.owns(name))
            .collect();
        if !foreign.is_empty() {
            bail!(
                "Refusing to replace the {} install in {:?}: it also holds {}, which {} did not install",
                self.name,
                install_dir,
                foreign.join(", "),
                self.name
            );
        }
        Ok(())
    }

    async fn fetch_and_unpack(
        &self,
        descriptor: &PlatformDescriptor,
        url: &str,
        version: &str,
        install_dir: &Path,
        cleanup_ctx: SharedCleanupContext,
    ) -> Result<()> {
        let archive_path = install_dir.join(format!(
            "{}-v{}-{}.tar.gz",
            self.name, version, descriptor.release_target
        ));

        download_file(&self.runtime, url, &archive_path, &self.http_client).await?;

        self.extractor
            .extract_with_cleanup(&self.runtime, &archive_path, install_dir, cleanup_ctx)
            .with_context(|| format!("Failed to extract {:?}", archive_path))?;
        self.runtime
            .remove_file(&archive_path)
            .with_context(|| format!("Failed to clean up archive {:?}", archive_path))?;

        let binary_path = install_dir.join(descriptor.binary_name);
        if !self.runtime.is_file(&binary_path) {
            bail!(
                "Binary '{}' not found in downloaded archive {}",
                descriptor.binary_name,
                url
            );
        }
        self.runtime.set_permissions(&binary_path, 0o755)?;

        let mut files: Vec<String> = self
            .runtime
            .read_dir(install_dir)?
            .iter()
            .filter_map(|entry| entry.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        files.sort();

        let receipt = InstallReceipt {
            name: self.name.clone(),
            version: version.to_string(),
            release_target: descriptor.release_target.to_string(),
            binary_name: descriptor.binary_name.to_string(),
            url: url.to_string(),
            files,
        };
        receipt.save(&self.runtime, install_dir)?;
        Ok(())
    }
}

#[async_trait]
impl<R: Runtime + 'static, E: ArchiveExtractor> BinaryInstaller for ReleaseBinary<R, E> {
    #[tracing::instrument(skip(self, descriptor))]
    async fn install_binary(
        &self,
        descriptor: &PlatformDescriptor,
        url: &str,
        version: &str,
        install_dir: &Path,
    ) -> Result<()> {
        let cleanup_ctx = cleanup::new_shared();
        let cleanup_ctx_clone = Arc::clone(&cleanup_ctx);

        // Register Ctrl-C handler
        let ctrl_c_handler = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nInterrupted, cleaning up...");
                cleanup::lock(&cleanup_ctx_clone).cleanup();
                std::process::exit(130); // Standard exit code for Ctrl-C
            }
        });

        let result = self
            .install_into(descriptor, url, version, install_dir, cleanup_ctx)
            .await;

        ctrl_c_handler.abort();
        result
    }

    #[tracing::instrument(skip(self, descriptor, args))]
    fn run_binary(&self, descriptor: &PlatformDescriptor, args: &[String]) -> Result<i32> {
        let binary_path = self.install_dir.join(descriptor.binary_name);
        if !self.runtime.is_file(&binary_path) {
            return Err(BinaryNotFoundError {
                program: self.name.clone(),
                binary_path,
            }
            .into());
        }

        match InstallReceipt::load(&self.runtime, &self.install_dir) {
            Ok(receipt) if receipt.version != self.version => warn!(
                "Installed {} is version {} but this shim expects {}; run install to update it",
                self.name, receipt.version, self.version
            ),
            Ok(_) => {}
            Err(e) => debug!("No usable install receipt: {:#}", e),
        }

        let cwd = self.runtime.current_dir()?;
        self.runtime.run_command(&binary_path, args, &cwd)
    }
}
