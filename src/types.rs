use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct CountyFeature {
    /// FIPS code.
    pub id: u32,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    pub fips: u32,
    pub area_name: String,
    pub state: String,
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// Both stage-one results, handed to rendering as one value.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub counties: Vec<CountyFeature>,
    pub education: Vec<EducationRecord>,
}
