use std::path::PathBuf;

use crate::platform::{FixedPlatformDetector, HostPlatform};

mod install;
mod platforms;
mod run;

pub use install::{install, install_with};
pub use platforms::{platforms, write_platforms};
pub use run::{run, run_with};

/// User agent sent with release downloads.
pub const USER_AGENT: &str = concat!("rlx-shim/", env!("CARGO_PKG_VERSION"));

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub install_dir: Option<PathBuf>,
    pub repository_url: Option<String>,
    pub os_type: Option<String>,
    pub architecture: Option<String>,
}

impl GlobalOptions {
    /// Host platform with any `--os-type`/`--arch` overrides applied.
    pub fn detector(&self) -> FixedPlatformDetector {
        FixedPlatformDetector(
            HostPlatform::detect().with_overrides(self.os_type.clone(), self.architecture.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformDetector;

    #[test]
    fn test_detector_without_overrides_reports_host() {
        let options = GlobalOptions::default();
        assert_eq!(options.detector().detect(), HostPlatform::detect());
    }

    #[test]
    fn test_detector_with_overrides() {
        let options = GlobalOptions {
            os_type: Some("Plan9".into()),
            architecture: Some("mips".into()),
            ..Default::default()
        };
        assert_eq!(options.detector().detect(), HostPlatform::new("Plan9", "mips"));
    }
}
