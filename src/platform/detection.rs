use std::fmt;

/// Host platform as reported by the operating system.
///
/// Values use the vocabulary of `uname`-style host queries (`Linux`,
/// `Darwin`, `Windows_NT`; `x64`, `arm64`) so they line up with the support
/// table and with the names users see in release notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub os_type: String,
    pub architecture: String,
}

impl HostPlatform {
    pub fn new(os_type: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            os_type: os_type.into(),
            architecture: architecture.into(),
        }
    }

    /// Detect the current platform
    pub fn detect() -> Self {
        Self {
            os_type: Self::detect_os_type().to_string(),
            architecture: Self::detect_architecture().to_string(),
        }
    }

    /// Replace detected values with explicit ones, e.g. from the command line.
    pub fn with_overrides(self, os_type: Option<String>, architecture: Option<String>) -> Self {
        Self {
            os_type: os_type.unwrap_or(self.os_type),
            architecture: architecture.unwrap_or(self.architecture),
        }
    }

    fn detect_os_type() -> &'static str {
        os_type_name(std::env::consts::OS)
    }

    fn detect_architecture() -> &'static str {
        architecture_name(std::env::consts::ARCH)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os_type, self.architecture)
    }
}

/// Render a Rust `target_os` value the way the host reports its kernel name.
fn os_type_name(os: &'static str) -> &'static str {
    match os {
        "windows" => "Windows_NT",
        "linux" => "Linux",
        "macos" => "Darwin",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        "solaris" | "illumos" => "SunOS",
        "aix" => "AIX",
        other => other,
    }
}

/// Render a Rust `target_arch` value in the host's architecture vocabulary.
fn architecture_name(arch: &'static str) -> &'static str {
    match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

/// Trait for platform detection (useful for testing)
#[cfg_attr(test, mockall::automock)]
pub trait PlatformDetector: Send + Sync {
    fn detect(&self) -> HostPlatform;
}

/// Detector backed by the platform this binary was compiled for.
pub struct SystemPlatformDetector;

impl PlatformDetector for SystemPlatformDetector {
    fn detect(&self) -> HostPlatform {
        HostPlatform::detect()
    }
}

/// Detector that always reports the same platform.
pub struct FixedPlatformDetector(pub HostPlatform);

impl PlatformDetector for FixedPlatformDetector {
    fn detect(&self) -> HostPlatform {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detect() {
        let platform = HostPlatform::detect();

        assert!(!platform.os_type.is_empty());
        assert!(!platform.architecture.is_empty());

        #[cfg(target_os = "macos")]
        assert_eq!(platform.os_type, "Darwin");

        #[cfg(target_os = "linux")]
        assert_eq!(platform.os_type, "Linux");

        #[cfg(target_os = "windows")]
        assert_eq!(platform.os_type, "Windows_NT");

        #[cfg(target_arch = "x86_64")]
        assert_eq!(platform.architecture, "x64");

        #[cfg(target_arch = "aarch64")]
        assert_eq!(platform.architecture, "arm64");
    }

    #[test]
    fn test_unknown_values_pass_through() {
        assert_eq!(os_type_name("plan9"), "plan9");
        assert_eq!(architecture_name("mips"), "mips");
        assert_eq!(architecture_name("x86"), "ia32");
    }

    #[test]
    fn test_with_overrides() {
        let host = HostPlatform::new("Linux", "x64");

        let overridden = host
            .clone()
            .with_overrides(Some("Plan9".into()), Some("mips".into()));
        assert_eq!(overridden, HostPlatform::new("Plan9", "mips"));

        let partial = host.clone().with_overrides(None, Some("arm64".into()));
        assert_eq!(partial, HostPlatform::new("Linux", "arm64"));

        assert_eq!(host.clone().with_overrides(None, None), host);
    }

    #[test]
    fn test_detectors() {
        let detector = SystemPlatformDetector;
        assert_eq!(detector.detect(), HostPlatform::detect());

        let fixed = FixedPlatformDetector(HostPlatform::new("Darwin", "arm64"));
        assert_eq!(fixed.detect().to_string(), "Darwin/arm64");
    }
}
