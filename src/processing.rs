use crate::color::{ColorScale, Rgb};
use crate::lookup::AttainmentLookup;
use crate::path::svg_path;
use crate::types::{CountyFeature, EducationRecord};
use rayon::prelude::*;
use tracing::info;

/// A county ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyShape {
    pub fips: u32,
    /// Attainment percentage, 0 for counties missing from the education data.
    pub education: f64,
    pub fill: Rgb,
    pub path: String,
    /// The joined record, `None` when the county is missing from the data.
    pub record: Option<EducationRecord>,
}

pub fn county_shapes(
    counties: &[CountyFeature],
    lookup: &AttainmentLookup,
    scale: &ColorScale,
) -> Vec<CountyShape> {
    info!("Colouring {} counties...", counties.len());

    let shapes: Vec<CountyShape> = counties
        .par_iter()
        .map(|county| {
            let record = lookup.find(county.id).cloned();
            let education = record.as_ref().map_or(0.0, |r| r.bachelors_or_higher);
            CountyShape {
                fips: county.id,
                education,
                fill: scale.color(education),
                path: svg_path(&county.geometry),
                record,
            }
        })
        .collect();

    let unmatched = shapes.iter().filter(|s| s.record.is_none()).count();
    if unmatched > 0 {
        info!("{} counties have no education record and default to 0%", unmatched);
    }

    shapes
}
