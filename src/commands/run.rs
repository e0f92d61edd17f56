use anyhow::Result;
use log::debug;

use crate::archive::TarGzExtractor;
use crate::binary::{BinaryInstaller, ReleaseBinary};
use crate::config::ShimConfig;
use crate::http::HttpClient;
use crate::platform::{PlatformDetector, resolve_platform};
use crate::runtime::Runtime;

use super::{GlobalOptions, USER_AGENT};

/// Runs the installed binary with `args`, returning its exit code.
/// Never installs; a missing binary is an error.
#[tracing::instrument(skip(runtime, options, args))]
pub fn run<R: Runtime + 'static>(
    runtime: R,
    options: &GlobalOptions,
    args: &[String],
) -> Result<i32> {
    let config = ShimConfig::new(
        &runtime,
        options.install_dir.clone(),
        options.repository_url.clone(),
    )?;
    let detector = options.detector();
    let http_client = HttpClient::with_user_agent(USER_AGENT)?;
    let binary = ReleaseBinary::new(runtime, http_client, TarGzExtractor, &config);

    run_with(&config, &detector, &binary, args)
}

pub fn run_with<D, B>(
    config: &ShimConfig,
    detector: &D,
    binary: &B,
    args: &[String],
) -> Result<i32>
where
    D: PlatformDetector + ?Sized,
    B: BinaryInstaller + ?Sized,
{
    let descriptor = resolve_platform(detector, &config.name)?;
    debug!("Running {} for {}", descriptor.binary_name, descriptor.release_target);
    binary.run_binary(descriptor, args)
}
