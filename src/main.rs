use anyhow::Result;
use clap::Parser;
use rlx_shim::commands::{self, GlobalOptions};
use rlx_shim::runtime::RealRuntime;
use std::path::PathBuf;

/// rlx-shim - install and run the prebuilt rlx binary
///
/// Detects the host operating system and architecture, downloads the matching
/// rlx release archive, and runs the installed binary with your arguments.
///
/// Examples:
///   rlx-shim install           # Download rlx for this platform
///   rlx-shim run -- --help     # Run rlx, forwarding all arguments
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory the rlx binary is installed into (also via RLX_INSTALL_DIR)
    #[arg(long = "install-dir", env = "RLX_INSTALL_DIR", value_name = "PATH", global = true)]
    pub install_dir: Option<PathBuf>,

    /// Repository hosting the release archives
    #[arg(
        long = "repository-url",
        env = "RLX_REPOSITORY_URL",
        value_name = "URL",
        global = true,
        hide = true
    )]
    pub repository_url: Option<String>,

    /// Pretend to run on this OS type (e.g. Linux, Darwin, Windows_NT)
    #[arg(long = "os-type", env = "RLX_OS_TYPE", value_name = "TYPE", global = true, hide = true)]
    pub os_type: Option<String>,

    /// Pretend to run on this architecture (e.g. x64, arm64)
    #[arg(long = "arch", env = "RLX_ARCH", value_name = "ARCH", global = true, hide = true)]
    pub architecture: Option<String>,
}

impl Cli {
    fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            install_dir: self.install_dir.clone(),
            repository_url: self.repository_url.clone(),
            os_type: self.os_type.clone(),
            architecture: self.architecture.clone(),
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Download and install the rlx binary for this platform
    Install,

    /// Run the installed rlx binary, forwarding all arguments
    #[command(disable_help_flag = true)]
    Run(RunArgs),

    /// List supported platforms and how this host resolves
    Platforms,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Arguments passed to rlx unchanged
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let options = cli.global_options();
    let runtime = RealRuntime;

    match cli.command {
        Commands::Install => commands::install(runtime, &options).await?,
        Commands::Run(args) => {
            let code = commands::run(runtime, &options, &args.args)?;
            std::process::exit(code);
        }
        Commands::Platforms => commands::platforms(&options.detector())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["rlx-shim", "install"]).unwrap();
        assert!(matches!(cli.command, Commands::Install));
        assert_eq!(cli.install_dir, None);
    }

    #[test]
    fn test_cli_install_dir_parsing() {
        let cli =
            Cli::try_parse_from(["rlx-shim", "install", "--install-dir", "/tmp/rlx"]).unwrap();
        assert_eq!(cli.install_dir, Some(PathBuf::from("/tmp/rlx")));

        let cli =
            Cli::try_parse_from(["rlx-shim", "--install-dir", "/tmp/rlx", "install"]).unwrap();
        assert_eq!(cli.global_options().install_dir, Some(PathBuf::from("/tmp/rlx")));
    }

    #[test]
    fn test_cli_run_forwards_hyphenated_args() {
        let cli =
            Cli::try_parse_from(["rlx-shim", "run", "changelog", "--help", "-v", "x"]).unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.args, vec!["changelog", "--help", "-v", "x"]);
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_run_leading_flag_is_forwarded() {
        let cli = Cli::try_parse_from(["rlx-shim", "run", "--help"]).unwrap();
        match cli.command {
            Commands::Run(args) => assert_eq!(args.args, vec!["--help"]),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_run_without_args() {
        let cli = Cli::try_parse_from(["rlx-shim", "run"]).unwrap();
        match cli.command {
            Commands::Run(args) => assert!(args.args.is_empty()),
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_platform_overrides() {
        let cli = Cli::try_parse_from([
            "rlx-shim", "--os-type", "Plan9", "--arch", "mips", "platforms",
        ])
        .unwrap();
        let options = cli.global_options();
        assert_eq!(options.os_type.as_deref(), Some("Plan9"));
        assert_eq!(options.architecture.as_deref(), Some("mips"));
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["rlx-shim"]).is_err());
    }
}
