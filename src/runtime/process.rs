//! Child process execution.

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self, args))]
    pub(crate) fn run_command_impl(
        &self,
        program: &Path,
        args: &[String],
        cwd: &Path,
    ) -> Result<i32> {
        debug!("Spawning {:?} with {} argument(s)", program, args.len());
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute {:?}", program))?;

        let code = exit_code(status);
        debug!("{:?} exited with code {}", program, code);
        Ok(code)
    }
}

/// Maps a child's exit status to the code this process should exit with.
/// A child killed by a signal maps to `128 + signal`, like a POSIX shell.
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
