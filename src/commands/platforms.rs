use anyhow::Result;
use std::io::Write;

use crate::platform::{
    PlatformDetector, SUPPORTED_PLATFORMS, render_table, resolve_platform_in,
    shared_release_targets,
};

/// Prints the supported platforms and how the host resolves.
pub fn platforms<D: PlatformDetector + ?Sized>(detector: &D) -> Result<()> {
    let stdout = std::io::stdout();
    write_platforms(detector, &mut stdout.lock())
}

pub fn write_platforms<D: PlatformDetector + ?Sized, W: Write>(
    detector: &D,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{}", render_table(SUPPORTED_PLATFORMS))?;
    writeln!(out)?;

    for (target, users) in shared_release_targets(SUPPORTED_PLATFORMS) {
        let keys: Vec<String> = users
            .iter()
            .map(|d| format!("{}/{}", d.os_type, d.architecture))
            .collect();
        writeln!(out, "note: {} is shared by {}", target, keys.join(", "))?;
    }

    let host = detector.detect();
    match resolve_platform_in(SUPPORTED_PLATFORMS, &host, crate::config::PROGRAM_NAME) {
        Ok(descriptor) => writeln!(
            out,
            "host: {} -> {} ({}){}",
            host,
            descriptor.release_target,
            descriptor.binary_name,
            if descriptor.is_emulated() { ", emulated" } else { "" }
        )?,
        Err(_) => writeln!(out, "host: {} -> unsupported", host)?,
    }
    Ok(())
}
