//! Platform detection and release resolution.
//!
//! This module detects the host operating system and architecture and maps
//! them onto the static table of platforms `rlx` publishes prebuilt binaries
//! for.

mod detection;
mod resolver;
mod table;

pub use detection::{FixedPlatformDetector, HostPlatform, PlatformDetector, SystemPlatformDetector};
#[cfg(test)]
pub use detection::MockPlatformDetector;
pub use resolver::{UnsupportedPlatformError, render_table, resolve_platform, resolve_platform_in};
pub use table::{
    DuplicatePlatformError, PlatformDescriptor, SUPPORTED_PLATFORMS, shared_release_targets,
    validate_table,
};
