//! spineview - simulate reading through a spine and report cache behaviour

use clap::Parser;
use spineview::config::CliOverrides;
use spineview::logging::LogDestination;
use spineview::manager::ViewManager;
use spineview::model::{ScrollMode, Spine};
use spineview::sim::{run_navigation, SimFactory, SimViewport};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::info;

/// Drive the view cache through a navigation path with simulated load latency
#[derive(Parser, Debug)]
#[command(name = "spineview")]
#[command(version)]
#[command(about = "Simulate reading through an e-book spine and report what the view cache does")]
pub struct Args {
    /// JSON spine manifest (a reflowable spine of --items items if not provided)
    pub manifest: Option<PathBuf>,

    /// Number of items in the generated spine
    #[arg(short = 'n', long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub items: u32,

    /// Comma-separated spine indices to visit (every item in order if not provided)
    #[arg(short, long, value_delimiter = ',')]
    pub path: Option<Vec<usize>>,

    /// Simulated time for a view to load, in milliseconds
    #[arg(long, default_value = "40")]
    pub latency_ms: u64,

    /// Time spent on each item before moving on, in milliseconds
    #[arg(long, default_value = "250")]
    pub dwell_ms: u64,

    /// Eviction window (overrides config)
    #[arg(long)]
    pub window: Option<usize>,

    /// Settle delay after a new view loads, in milliseconds (overrides config)
    #[arg(long)]
    pub settle_ms: Option<u64>,

    /// Give up on a view that takes longer than this to load, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Reader scroll mode
    #[arg(long, value_parser = ["auto", "scroll-doc", "scroll-continuous"])]
    pub scroll: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = spineview::config::load_config_with_precedence(args.config.clone())?;
        let merged = spineview::config::merge_config(config_file);
        let with_env = spineview::config::apply_env_overrides(merged)?;

        let overrides = CliOverrides {
            eviction_window: args.window,
            settle_delay_ms: args.settle_ms,
            load_timeout_ms: args.timeout_ms,
            scroll: args.scroll.as_deref().and_then(ScrollMode::parse),
        };
        spineview::config::apply_cli_overrides(with_env, overrides)
    };

    let destination = if args.log_stderr {
        LogDestination::Stderr
    } else {
        LogDestination::File(config.log_file_path.clone())
    };
    spineview::logging::init(&destination)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let spine = match &args.manifest {
        Some(path) => Spine::load_manifest(path)?,
        None => Spine::reflowable(args.items as usize),
    };
    let path = args
        .path
        .clone()
        .unwrap_or_else(|| (0..spine.len()).collect());

    let factory = SimFactory::with_latency(Duration::from_millis(args.latency_ms));
    let manager = ViewManager::new(Rc::new(spine), Rc::new(factory), config.view_cache());
    let viewport = Rc::new(SimViewport::new());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let local = tokio::task::LocalSet::new();
    let report = local.block_on(
        &runtime,
        run_navigation(
            &manager,
            viewport,
            &config.viewer,
            &path,
            Duration::from_millis(args.dwell_ms),
        ),
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        // Help should succeed (exits with code 0)
        let result = Args::try_parse_from(["spineview", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["spineview", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["spineview"]);
        assert_eq!(args.manifest, None);
        assert_eq!(args.items, 10);
        assert_eq!(args.path, None);
        assert_eq!(args.latency_ms, 40);
        assert_eq!(args.dwell_ms, 250);
        assert_eq!(args.window, None);
        assert_eq!(args.settle_ms, None);
        assert_eq!(args.timeout_ms, None);
        assert_eq!(args.scroll, None);
        assert!(!args.json);
        assert!(!args.log_stderr);
    }

    #[test]
    fn test_manifest_positional() {
        let args = Args::parse_from(["spineview", "book.json"]);
        assert_eq!(args.manifest, Some(PathBuf::from("book.json")));
    }

    #[test]
    fn test_path_is_comma_separated() {
        let args = Args::parse_from(["spineview", "--path", "5,9,8"]);
        assert_eq!(args.path, Some(vec![5, 9, 8]));
    }

    #[test]
    fn test_path_short_flag() {
        let args = Args::parse_from(["spineview", "-p", "2"]);
        assert_eq!(args.path, Some(vec![2]));
    }

    #[test]
    fn test_path_rejects_negative_index() {
        let result = Args::try_parse_from(["spineview", "--path", "3,-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_items_rejects_zero() {
        let result = Args::try_parse_from(["spineview", "--items", "0"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_scroll_modes_accepted() {
        for mode in ["auto", "scroll-doc", "scroll-continuous"] {
            let args = Args::parse_from(["spineview", "--scroll", mode]);
            assert_eq!(args.scroll.as_deref(), Some(mode));
            assert!(ScrollMode::parse(mode).is_some());
        }
    }

    #[test]
    fn test_scroll_invalid_rejects() {
        let result = Args::try_parse_from(["spineview", "--scroll", "sideways"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_config_path() {
        let args = Args::parse_from(["spineview", "--config", "/custom/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_combined_flags() {
        let args = Args::parse_from([
            "spineview",
            "book.json",
            "-p",
            "1,2",
            "--latency-ms",
            "5",
            "--window",
            "2",
            "--settle-ms",
            "0",
            "--timeout-ms",
            "1000",
            "--json",
            "--log-stderr",
        ]);
        assert_eq!(args.manifest, Some(PathBuf::from("book.json")));
        assert_eq!(args.path, Some(vec![1, 2]));
        assert_eq!(args.latency_ms, 5);
        assert_eq!(args.window, Some(2));
        assert_eq!(args.settle_ms, Some(0));
        assert_eq!(args.timeout_ms, Some(1000));
        assert!(args.json);
        assert!(args.log_stderr);
    }
}
