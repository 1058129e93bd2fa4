//! Binsight CLI - photograph or upload waste, learn where it goes
//!
//! Main entry point for the Binsight application.

mod app;
mod commands;

use anyhow::Result;
use binsight_core::FacingMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use app::{initialize, InitOptions};
use commands::snap::SnapOptions;

#[derive(Debug, Parser)]
#[command(name = "binsight", version, about = "Classify waste items from a photo")]
struct Cli {
    /// Print debug logs to stdout as well as the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this configuration file instead of ~/.binsight/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify an image file
    Classify {
        /// Image to classify (type is taken from the extension)
        file: PathBuf,
    },
    /// Open a camera backed by an image, capture a photo and classify it
    Snap(SnapArgs),
    /// Show configuration and classifier readiness
    Status,
}

#[derive(Debug, Args)]
struct SnapArgs {
    /// Image served as the camera feed
    #[arg(long, value_name = "IMAGE")]
    device: PathBuf,

    /// Camera to open: environment (rear) or user (front)
    #[arg(long)]
    facing: Option<FacingMode>,

    /// Turn the flashlight on before capturing
    #[arg(long)]
    torch: bool,

    /// Switch to the other camera before capturing
    #[arg(long)]
    switch: bool,

    /// Emulate a device that honours facing-mode constraints
    #[arg(long)]
    facing_modes: bool,

    /// Emulate a device with a flashlight
    #[arg(long)]
    torch_capable: bool,
}

impl From<SnapArgs> for SnapOptions {
    fn from(args: SnapArgs) -> Self {
        Self {
            device: args.device,
            facing: args.facing,
            torch: args.torch,
            switch: args.switch,
            facing_modes: args.facing_modes,
            torch_capable: args.torch_capable,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = initialize(InitOptions::command(cli.verbose, cli.config))?;

    match cli.command {
        Command::Classify { file } => commands::classify::run(&ctx, &file).await,
        Command::Snap(args) => commands::snap::run(&ctx, args.into()).await,
        Command::Status => commands::status::run(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_classify() {
        let cli = Cli::try_parse_from(["binsight", "classify", "bottle.jpg"]).unwrap();
        assert!(!cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Classify { file } if file == PathBuf::from("bottle.jpg")
        ));
    }

    #[test]
    fn test_parse_snap_flags() {
        let cli = Cli::try_parse_from([
            "binsight",
            "snap",
            "--device",
            "feed.png",
            "--facing",
            "front",
            "--torch",
            "--torch-capable",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Snap(args) => {
                let options = SnapOptions::from(args);
                assert_eq!(options.device, PathBuf::from("feed.png"));
                assert_eq!(options.facing, Some(FacingMode::User));
                assert!(options.torch);
                assert!(options.torch_capable);
                assert!(!options.switch);
                assert!(!options.facing_modes);
            }
            other => panic!("Expected snap, got {:?}", other),
        }
    }

    #[test]
    fn test_snap_requires_device() {
        assert!(Cli::try_parse_from(["binsight", "snap"]).is_err());
    }

    #[test]
    fn test_invalid_facing_rejected() {
        let result =
            Cli::try_parse_from(["binsight", "snap", "--device", "a.png", "--facing", "sideways"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["binsight", "status", "--config", "/tmp/b.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/b.toml")));
        assert!(matches!(cli.command, Command::Status));
    }
}
