//! SVG path data for projected county shapes.
//!
//! The county topology is already in screen space, so coordinates are written
//! out as-is (identity projection).

use geo::{LineString, MultiPolygon};
use std::fmt::Write;

pub fn svg_path(geometry: &MultiPolygon<f64>) -> String {
    let mut d = String::new();
    for polygon in geometry {
        write_ring(&mut d, polygon.exterior());
        for interior in polygon.interiors() {
            write_ring(&mut d, interior);
        }
    }
    d
}

fn write_ring(d: &mut String, ring: &LineString<f64>) {
    // geo closes rings by repeating the first point; `Z` already does that.
    let coords = if ring.is_closed() && ring.0.len() > 1 {
        &ring.0[..ring.0.len() - 1]
    } else {
        &ring.0[..]
    };
    for (i, c) in coords.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{command}{},{}", round(c.x), round(c.y));
    }
    if !coords.is_empty() {
        d.push('Z');
    }
}

/// Three decimals, with trailing zeros dropped by the float formatter.
fn round(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    #[test]
    fn writes_rings_with_holes() {
        let square = polygon!(
            exterior: [(x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 10.), (x: 0., y: 10.)],
            interiors: [[(x: 4., y: 4.), (x: 6., y: 4.), (x: 6., y: 6.)]]
        );
        let d = svg_path(&MultiPolygon::new(vec![square]));
        assert_eq!(d, "M0,0L10,0L10,10L0,10ZM4,4L6,4L6,6Z");
    }

    #[test]
    fn rounds_coordinates_and_skips_empty_shapes() {
        let tri = polygon![(x: 0.12345, y: 1.0), (x: 2.5, y: 1.0), (x: 2.5, y: 3.9999)];
        assert_eq!(
            svg_path(&MultiPolygon::new(vec![tri])),
            "M0.123,1L2.5,1L2.5,4Z"
        );
        assert_eq!(svg_path(&MultiPolygon::new(vec![])), "");
    }
}
