//! Entry point for **wsgrid-icons**, the static icon-set generator.
//!
//! Writes one SVG per grid position (`grid_<row>_<col>.svg`, 1-based), each
//! with that position drawn as the active workspace.  Panels that can only
//! swap between pre-rendered images use the set as a lookup table.

use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use wsgrid::config::Config;
use wsgrid::icon::{build_icon_set, icon_set_size, IconError, IconOptions};
use wsgrid::snapshot::WorkspaceLayout;

#[derive(Parser)]
#[command(name = "wsgrid-icons", version, about = "Generate a workspace-grid SVG icon set")]
struct Cli {
    /// Number of grid columns.
    #[arg(short = 'W', long, default_value_t = 3)]
    columns: usize,
    /// Number of grid rows.
    #[arg(short = 'H', long, default_value_t = 3)]
    rows: usize,
    /// Largest allowed icon size in pixels.
    #[arg(short = 'M', long, default_value_t = 32)]
    max_size: u32,
    /// Fail if the icon would be smaller than this.
    #[arg(short = 'm', long, default_value_t = 24)]
    min_size: u32,
    /// Config file (default: `$XDG_CONFIG_HOME/wsgrid/config.json`).
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output directory.
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

#[derive(Debug, thiserror::Error)]
enum GenerateError {
    #[error(transparent)]
    Icon(#[from] IconError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/wsgrid`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("wsgrid")
}

/// Load the config from `path`, or from the default location, falling back
/// to compiled-in defaults.
fn load_config(path: Option<&Path>) -> Config {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config_dir().join("config.json"));
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match generate(&cli) {
        Ok(count) => {
            info!("wrote {} icons to {}", count, cli.out.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("wsgrid-icons: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn generate(cli: &Cli) -> Result<usize, GenerateError> {
    let config = load_config(cli.config.as_deref());
    let layout = WorkspaceLayout::new(cli.rows, cli.columns);
    let size = icon_set_size(layout, cli.max_size, cli.min_size)?;
    let options = IconOptions {
        outline: config.indicator.icon_outline,
        absent: config.indicator.absent_cells,
    };
    let icons = build_icon_set(layout, &config.theme, options, size)?;

    std::fs::create_dir_all(&cli.out).map_err(|source| GenerateError::Write {
        path: cli.out.clone(),
        source,
    })?;
    for (coord, icon) in &icons {
        let path = cli
            .out
            .join(format!("grid_{}_{}.svg", coord.row + 1, coord.col + 1));
        std::fs::write(&path, icon.as_str()).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;
        println!("Created {}", path.display());
    }
    Ok(icons.len())
}
