use std::collections::HashMap;
use std::fmt;

/// A platform `rlx` publishes a prebuilt binary for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformDescriptor {
    /// Host OS family, e.g. `Linux`.
    pub os_type: &'static str,
    /// Host architecture, e.g. `x64`.
    pub architecture: &'static str,
    /// Build flavor of the release archive, e.g. `x86_64-unknown-linux-musl`.
    pub release_target: &'static str,
    /// File name of the executable inside the archive.
    pub binary_name: &'static str,
}

impl PlatformDescriptor {
    pub fn key(&self) -> (&'static str, &'static str) {
        (self.os_type, self.architecture)
    }

    /// Whether the release target was built for a different CPU than the
    /// host architecture, so the binary runs under emulation.
    pub fn is_emulated(&self) -> bool {
        let target_cpu = self.release_target.split('-').next().unwrap_or_default();
        match target_cpu_for(self.architecture) {
            Some(cpu) => cpu != target_cpu,
            None => false,
        }
    }
}

/// Target triple CPU for a host-query architecture name.
fn target_cpu_for(architecture: &str) -> Option<&'static str> {
    match architecture {
        "x64" => Some("x86_64"),
        "arm64" => Some("aarch64"),
        "ia32" => Some("i686"),
        _ => None,
    }
}

/// Supported platforms, in lookup order.
///
/// Darwin/arm64 deliberately points at the Intel build: only
/// `x86_64-apple-darwin` archives are published, and they run under Rosetta 2.
/// [`shared_release_targets`] reports the overlap.
pub const SUPPORTED_PLATFORMS: &[PlatformDescriptor] = &[
    PlatformDescriptor {
        os_type: "Windows_NT",
        architecture: "x64",
        release_target: "x86_64-pc-windows-msvc",
        binary_name: "rlx.exe",
    },
    PlatformDescriptor {
        os_type: "Linux",
        architecture: "x64",
        release_target: "x86_64-unknown-linux-musl",
        binary_name: "rlx",
    },
    PlatformDescriptor {
        os_type: "Darwin",
        architecture: "x64",
        release_target: "x86_64-apple-darwin",
        binary_name: "rlx",
    },
    PlatformDescriptor {
        os_type: "Darwin",
        architecture: "arm64",
        release_target: "x86_64-apple-darwin",
        binary_name: "rlx",
    },
];

/// Two entries of a platform table share the same (OS type, architecture) key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePlatformError {
    pub os_type: &'static str,
    pub architecture: &'static str,
    pub first_index: usize,
    pub duplicate_index: usize,
}

impl fmt::Display for DuplicatePlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Platform table lists type \"{}\" and architecture \"{}\" twice (entries {} and {})",
            self.os_type, self.architecture, self.first_index, self.duplicate_index
        )
    }
}

impl std::error::Error for DuplicatePlatformError {}

/// Checks that no two entries share a lookup key.
pub fn validate_table(table: &[PlatformDescriptor]) -> Result<(), DuplicatePlatformError> {
    let mut seen: HashMap<(&str, &str), usize> = HashMap::new();
    for (index, descriptor) in table.iter().enumerate() {
        if let Some(&first_index) = seen.get(&descriptor.key()) {
            return Err(DuplicatePlatformError {
                os_type: descriptor.os_type,
                architecture: descriptor.architecture,
                first_index,
                duplicate_index: index,
            });
        }
        seen.insert(descriptor.key(), index);
    }
    Ok(())
}

/// Release targets that more than one platform downloads, each with the
/// entries that use it, in table order.
pub fn shared_release_targets(
    table: &[PlatformDescriptor],
) -> Vec<(&'static str, Vec<PlatformDescriptor>)> {
    let mut shared: Vec<(&'static str, Vec<PlatformDescriptor>)> = Vec::new();
    for descriptor in table {
        match shared
            .iter_mut()
            .find(|(target, _)| *target == descriptor.release_target)
        {
            Some((_, users)) => users.push(*descriptor),
            None => shared.push((descriptor.release_target, vec![*descriptor])),
        }
    }
    shared.retain(|(_, users)| users.len() > 1);
    shared
}
