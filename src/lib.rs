//! Installs and runs the prebuilt `rlx` binary for the host platform.

pub mod archive;
pub mod binary;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod download;
pub mod http;
pub mod platform;
pub mod runtime;
