pub mod color;
pub mod config;
pub mod data;
pub mod domain;
pub mod legend;
pub mod lookup;
pub mod path;
pub mod processing;
pub mod render;
pub mod server;
pub mod tooltip;
pub mod topology;
pub mod types;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the choropleth to an SVG and an HTML page
    Render {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Render the map, then serve it with the tooltip API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .init();
}

/// Stage one (topology, then education) feeds stage two (map and legend).
/// A load failure returns before anything is written.
async fn load_and_render(config: &config::AppConfig) -> anyhow::Result<types::Datasets> {
    let datasets = data::load_datasets(config)
        .await
        .context("Error fetching data")?;

    let map = render::generate_map(config, &datasets)?;
    render::write_map(config, &map)?;
    Ok(datasets)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config_path, serve) = match &cli.command {
        Commands::Render { config } => (config, false),
        Commands::Serve { config } => (config, true),
    };
    info!("Using config: {:?}", config_path);
    let app_config = config::AppConfig::load_from_file(config_path)?;

    let datasets = match load_and_render(&app_config).await {
        Ok(datasets) => datasets,
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    };

    if serve {
        server::start_server(app_config, datasets).await?;
    } else {
        info!("Render complete!");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, InputConfig};

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "objects": {"counties": {"type": "Polygon", "id": 1003, "arcs": [[0]]}},
        "arcs": [[[0, 0], [4, 0], [4, 4], [0, 0]]]
    }"#;

    const EDUCATION: &str = r#"[
        {"fips": 1003, "state": "AL", "area_name": "Baldwin County", "bachelorsOrHigher": 35.2}
    ]"#;

    fn config_in(dir: &std::path::Path) -> AppConfig {
        let mut config = AppConfig {
            input: InputConfig {
                counties: dir.join("counties.json").display().to_string(),
                education: dir.join("education.json").display().to_string(),
                ..InputConfig::default()
            },
            ..AppConfig::default()
        };
        config.output.dir = dir.join("out");
        config
    }

    #[tokio::test]
    async fn missing_county_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("education.json"), EDUCATION).unwrap();
        let config = config_in(dir.path());

        let err = load_and_render(&config).await.unwrap_err();

        assert!(format!("{err:#}").contains("Failed to load county data"));
        assert!(!config.output.dir.join("map.svg").exists());
        assert!(!config.output.dir.join("index.html").exists());
    }

    #[tokio::test]
    async fn missing_education_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("counties.json"), TOPOLOGY).unwrap();
        let config = config_in(dir.path());

        assert!(load_and_render(&config).await.is_err());
        assert!(!config.output.dir.exists());
    }

    #[tokio::test]
    async fn both_sources_render_the_page() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("counties.json"), TOPOLOGY).unwrap();
        std::fs::write(dir.path().join("education.json"), EDUCATION).unwrap();
        let config = config_in(dir.path());

        let datasets = load_and_render(&config).await.unwrap();

        assert_eq!(datasets.counties.len(), 1);
        let page = std::fs::read_to_string(config.output.dir.join("index.html")).unwrap();
        assert!(page.contains(r#"data-area-name="Baldwin County""#));
        assert!(config.output.dir.join("map.svg").exists());
    }
}
