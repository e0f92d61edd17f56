use log::{debug, info};
use std::fmt;

use super::detection::{HostPlatform, PlatformDetector};
use super::table::{PlatformDescriptor, SUPPORTED_PLATFORMS};

/// No supported platform matches the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedPlatformError {
    pub program: String,
    pub os_type: String,
    pub architecture: String,
    pub supported: Vec<PlatformDescriptor>,
}

impl fmt::Display for UnsupportedPlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Platform with type \"{}\" and architecture \"{}\" is not supported by {}.\nYour system must be one of the following:\n\n{}",
            self.os_type,
            self.architecture,
            self.program,
            render_table(&self.supported)
        )
    }
}

impl std::error::Error for UnsupportedPlatformError {}

/// Resolves the host reported by `detector` against [`SUPPORTED_PLATFORMS`].
#[tracing::instrument(skip(detector))]
pub fn resolve_platform<D: PlatformDetector + ?Sized>(
    detector: &D,
    program: &str,
) -> Result<&'static PlatformDescriptor, UnsupportedPlatformError> {
    let host = detector.detect();
    debug!("Detected host platform {}", host);

    let descriptor = resolve_platform_in(SUPPORTED_PLATFORMS, &host, program)?;

    if descriptor.is_emulated() {
        info!(
            "{} has no native {} build; using {} under emulation",
            host, program, descriptor.release_target
        );
    }

    Ok(descriptor)
}

/// Finds the entry whose key equals `host` exactly. The first match in table
/// order wins.
pub fn resolve_platform_in<'a>(
    table: &'a [PlatformDescriptor],
    host: &HostPlatform,
    program: &str,
) -> Result<&'a PlatformDescriptor, UnsupportedPlatformError> {
    table
        .iter()
        .find(|d| d.os_type == host.os_type && d.architecture == host.architecture)
        .ok_or_else(|| UnsupportedPlatformError {
            program: program.to_string(),
            os_type: host.os_type.clone(),
            architecture: host.architecture.clone(),
            supported: table.to_vec(),
        })
}

/// Formats descriptors as a plain-text table with one row per entry.
pub fn render_table(descriptors: &[PlatformDescriptor]) -> String {
    const HEADERS: [&str; 4] = ["TYPE", "ARCHITECTURE", "RELEASE TARGET", "BINARY NAME"];

    let rows: Vec<[&str; 4]> = descriptors
        .iter()
        .map(|d| [d.os_type, d.architecture, d.release_target, d.binary_name])
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let format_row = |cells: &[&str; 4]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(&HEADERS)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(rows.iter().map(format_row));
    lines.join("\n")
}
