use crate::color::Rgb;
use crate::domain::ColorDomain;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const COUNTY_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/counties.json";
pub const EDUCATION_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/for_user_education.json";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub palette: PaletteConfig,
    pub domain: DomainConfig,
    pub legend: LegendConfig,
    pub tooltip: TooltipConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    /// URL or file path of the county topology (TopoJSON or GeoJSON).
    pub counties: String,
    /// URL or file path of the education records.
    pub education: String,
    /// Object inside the topology holding the county geometries.
    pub topology_object: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PaletteConfig {
    pub color1: String, // Hex code
    pub color2: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DomainConfig {
    pub start: f64,
    pub step: f64,
    pub limit: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LegendConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TooltipConfig {
    pub offset_x: f64,
    pub offset_y: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            counties: COUNTY_URL.to_string(),
            education: EDUCATION_URL.to_string(),
            topology_object: "counties".to_string(),
        }
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            color1: "#e4fffb".to_string(),
            color2: "#001311".to_string(),
        }
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            start: 3.0,
            step: 9.0,
            limit: 72.0,
        }
    }
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            x: 565.0,
            y: 32.0,
            width: 290.0,
            height: 8.0,
            padding: 5.0,
        }
    }
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            offset_x: 5.0,
            offset_y: -40.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            width: 1000,
            height: 600,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks colours and the domain before anything is fetched.
    pub fn validate(&self) -> Result<()> {
        self.palette
            .color1
            .parse::<Rgb>()
            .context("palette.color1")?;
        self.palette
            .color2
            .parse::<Rgb>()
            .context("palette.color2")?;
        self.color_domain()?;
        if !(self.legend.width > 0.0) {
            anyhow::bail!("legend.width must be positive");
        }
        Ok(())
    }

    pub fn color_domain(&self) -> Result<ColorDomain> {
        ColorDomain::stepped(self.domain.start, self.domain.step, self.domain.limit)
            .context("Invalid [domain] configuration")
    }
}
