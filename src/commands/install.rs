use anyhow::Result;
use log::{info, warn};

use crate::archive::TarGzExtractor;
use crate::binary::{BinaryInstaller, ReleaseBinary};
use crate::config::ShimConfig;
use crate::http::HttpClient;
use crate::platform::{PlatformDetector, resolve_platform};
use crate::runtime::Runtime;

use super::{GlobalOptions, USER_AGENT};

/// Downloads and installs the release binary for the host platform.
#[tracing::instrument(skip(runtime, options))]
pub async fn install<R: Runtime + 'static>(runtime: R, options: &GlobalOptions) -> Result<()> {
    let config = ShimConfig::new(
        &runtime,
        options.install_dir.clone(),
        options.repository_url.clone(),
    )?;
    let detector = options.detector();
    let http_client = HttpClient::with_user_agent(USER_AGENT)?;
    let binary = ReleaseBinary::new(runtime, http_client, TarGzExtractor, &config);

    install_with(&config, &detector, &binary).await
}

pub async fn install_with<D, B>(config: &ShimConfig, detector: &D, binary: &B) -> Result<()>
where
    D: PlatformDetector + ?Sized,
    B: BinaryInstaller + ?Sized,
{
    let descriptor = resolve_platform(detector, &config.name)?;
    let url = config.release_url(descriptor);
    if descriptor.is_emulated() {
        warn!(
            "No native {} build for {}/{}; installing {}, which runs under emulation",
            config.name, descriptor.os_type, descriptor.architecture, descriptor.release_target
        );
    }
    info!(
        "Installing {} {} ({}) into {:?}",
        config.name, config.version, descriptor.release_target, config.install_dir
    );

    binary
        .install_binary(descriptor, &url, &config.version, &config.install_dir)
        .await
}
