use crate::config::AppConfig;
use crate::topology::{parse_id, Topology};
use crate::types::{CountyFeature, Datasets, EducationRecord};
use anyhow::{anyhow, Context, Result};
use geo::MultiPolygon;
use geojson::GeoJson;
use serde::Deserialize;
use tracing::{info, warn};

/// Loads the county topology, then the education records. The second load
/// only starts once the first has succeeded.
pub async fn load_datasets(config: &AppConfig) -> Result<Datasets> {
    info!("Loading data...");

    // 1. Load Geometry (TopoJSON or GeoJSON)
    let county_bytes = fetch(&config.input.counties)
        .await
        .with_context(|| format!("Failed to load county data from {}", config.input.counties))?;
    let counties = parse_counties(&county_bytes, &config.input.topology_object)?;
    info!("Loaded geometry for {} counties", counties.len());

    // 2. Load education records
    let education_bytes = fetch(&config.input.education).await.with_context(|| {
        format!("Failed to load education data from {}", config.input.education)
    })?;
    let education = parse_education(&education_bytes)?;
    info!("Loaded education data for {} areas", education.len());

    Ok(Datasets {
        counties,
        education,
    })
}

/// `http(s)://` sources go over the network, anything else is a file path.
async fn fetch(source: &str) -> Result<Vec<u8>> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::get(source).await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to open file: {}", source))
    }
}

pub fn parse_education(bytes: &[u8]) -> Result<Vec<EducationRecord>> {
    serde_json::from_slice(bytes).context("Failed to parse education records")
}

/// Only the `type` member, to pick a decoder.
#[derive(Deserialize)]
struct DocumentKind {
    #[serde(rename = "type")]
    kind: Option<String>,
}

pub fn parse_counties(bytes: &[u8], object: &str) -> Result<Vec<CountyFeature>> {
    let document: DocumentKind =
        serde_json::from_slice(bytes).context("County data is not valid JSON")?;

    match document.kind.as_deref() {
        Some("Topology") => {
            let topology = Topology::from_slice(bytes).context("Failed to parse TopoJSON")?;
            Ok(topology.features(object)?)
        }
        Some("FeatureCollection") => parse_geojson(bytes),
        other => Err(anyhow!("Unsupported county data type: {:?}", other)),
    }
}

fn parse_geojson(bytes: &[u8]) -> Result<Vec<CountyFeature>> {
    let collection = match GeoJson::from_reader(bytes).context("Failed to parse GeoJSON")? {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let mut counties = Vec::new();

    for feature in collection.features {
        // 1. Get ID, from the feature itself or its properties
        let id = match &feature.id {
            Some(geojson::feature::Id::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Some(geojson::feature::Id::String(s)) => s.trim().parse().ok(),
            None => feature.property("id").and_then(parse_id),
        };
        let Some(id) = id else {
            warn!("Skipping GeoJSON feature without a usable id");
            continue;
        };

        // 2. Get Geometry
        let geometry = match feature.geometry {
            Some(geo) => {
                let valid_geo: geo::Geometry<f64> = geo
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geojson geometry: {:?}", e))?;

                match valid_geo {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue, // Skip points/lines
                }
            }
            None => continue,
        };

        counties.push(CountyFeature { id, geometry });
    }

    Ok(counties)
}
