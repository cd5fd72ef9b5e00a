//! TopoJSON decoding into per-county polygons.
//!
//! Arcs are shared between neighbouring shapes and, when the topology carries a
//! `transform`, stored quantized and delta-encoded. Polygons reference arcs by
//! index; a negative index `~i` walks arc `i` backwards.

use crate::types::CountyFeature;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("topology is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("topology has no object named {0:?}")]
    MissingObject(String),
    #[error("arc index {0} is out of range")]
    ArcOutOfRange(i64),
    #[error("arc {arc} has a position with fewer than two values")]
    ShortPosition { arc: usize },
    #[error("malformed arcs for {kind}: {source}")]
    MalformedArcs {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub transform: Option<Transform>,
    pub objects: HashMap<String, TopoObject>,
    pub arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
pub struct TopoObject {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub arcs: Value,
    #[serde(default)]
    pub geometries: Vec<TopoObject>,
}

impl Topology {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TopologyError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Absolute coordinates of every arc.
    fn decode_arcs(&self) -> Result<Vec<Vec<Coord<f64>>>, TopologyError> {
        self.arcs
            .iter()
            .enumerate()
            .map(|(index, arc)| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .map(|position| {
                        let [dx, dy] = match position.as_slice() {
                            [a, b, ..] => [*a, *b],
                            _ => return Err(TopologyError::ShortPosition { arc: index }),
                        };
                        Ok(match &self.transform {
                            Some(t) => {
                                x += dx;
                                y += dy;
                                Coord {
                                    x: x * t.scale[0] + t.translate[0],
                                    y: y * t.scale[1] + t.translate[1],
                                }
                            }
                            None => Coord { x: dx, y: dy },
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    /// Flattens the named object into one feature per geometry.
    pub fn features(&self, object: &str) -> Result<Vec<CountyFeature>, TopologyError> {
        let root = self
            .objects
            .get(object)
            .ok_or_else(|| TopologyError::MissingObject(object.to_string()))?;
        let arcs = self.decode_arcs()?;

        let mut features = Vec::new();
        collect_features(root, &arcs, &mut features)?;
        debug!(object, count = features.len(), "decoded topology features");
        Ok(features)
    }
}

fn collect_features(
    geometry: &TopoObject,
    arcs: &[Vec<Coord<f64>>],
    out: &mut Vec<CountyFeature>,
) -> Result<(), TopologyError> {
    let polygons = match geometry.kind.as_deref() {
        Some("GeometryCollection") => {
            for child in &geometry.geometries {
                collect_features(child, arcs, out)?;
            }
            return Ok(());
        }
        Some("Polygon") => {
            let rings: Vec<Vec<i64>> = serde_json::from_value(geometry.arcs.clone())
                .map_err(|source| TopologyError::MalformedArcs { kind: "Polygon", source })?;
            vec![polygon(&rings, arcs)?]
        }
        Some("MultiPolygon") => {
            let parts: Vec<Vec<Vec<i64>>> = serde_json::from_value(geometry.arcs.clone())
                .map_err(|source| TopologyError::MalformedArcs { kind: "MultiPolygon", source })?;
            parts
                .iter()
                .map(|rings| polygon(rings, arcs))
                .collect::<Result<Vec<_>, _>>()?
        }
        other => {
            debug!(kind = ?other, "skipping non-polygon geometry");
            return Ok(());
        }
    };

    match geometry.id.as_ref().and_then(parse_id) {
        Some(id) => out.push(CountyFeature {
            id,
            geometry: MultiPolygon::new(polygons),
        }),
        None => warn!(id = ?geometry.id, "skipping geometry without a usable id"),
    }
    Ok(())
}

/// FIPS ids show up both as numbers and as zero-padded strings.
pub(crate) fn parse_id(id: &Value) -> Option<u32> {
    match id {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn polygon(rings: &[Vec<i64>], arcs: &[Vec<Coord<f64>>]) -> Result<Polygon<f64>, TopologyError> {
    let mut rings = rings.iter().map(|r| ring(r, arcs));
    let exterior = match rings.next() {
        Some(ring) => ring?,
        None => LineString::new(Vec::new()),
    };
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn ring(indexes: &[i64], arcs: &[Vec<Coord<f64>>]) -> Result<LineString<f64>, TopologyError> {
    let mut coords: Vec<Coord<f64>> = Vec::new();
    for &index in indexes {
        let (position, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = usize::try_from(position)
            .ok()
            .and_then(|p| arcs.get(p))
            .ok_or(TopologyError::ArcOutOfRange(index))?;

        // Consecutive arcs share an endpoint.
        coords.pop();
        if reversed {
            coords.extend(arc.iter().rev());
        } else {
            coords.extend(arc.iter());
        }
    }
    Ok(LineString::new(coords))
}
