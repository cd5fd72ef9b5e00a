use crate::color::{interpolate_color, ColorError, Rgb};
use crate::config::LegendConfig;
use crate::domain::ColorDomain;

#[derive(Debug, Clone, PartialEq)]
pub struct LegendBand {
    pub x: f64,
    pub width: f64,
    pub fill: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendTick {
    pub x: f64,
    pub label: String,
}

/// Layout of the legend strip, in legend-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub bands: Vec<LegendBand>,
    pub ticks: Vec<LegendTick>,
}

pub fn build_legend(
    color1: &str,
    color2: &str,
    domain: &ColorDomain,
    layout: &LegendConfig,
) -> Result<Legend, ColorError> {
    let number_of_colors = domain.band_count();
    // One colour more than there are bands; the darkest end is never drawn.
    let colors = interpolate_color(color1, color2, number_of_colors)?;
    let slot = layout.width / number_of_colors as f64;

    let bands = colors
        .iter()
        .take(number_of_colors)
        .enumerate()
        .map(|(i, fill)| LegendBand {
            x: layout.padding + i as f64 * slot,
            width: slot,
            fill: *fill,
        })
        .collect();

    let ticks = domain
        .thresholds()
        .iter()
        .enumerate()
        .map(|(i, threshold)| LegendTick {
            x: layout.padding + i as f64 * slot,
            label: format!("{threshold}%"),
        })
        .collect();

    Ok(Legend {
        x: layout.x,
        y: layout.y,
        width: layout.width,
        height: layout.height,
        bands,
        ticks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_domain() -> ColorDomain {
        ColorDomain::stepped(3.0, 9.0, 72.0).unwrap()
    }

    #[test]
    fn seven_bands_and_eight_ticks() {
        let legend = build_legend("#e4fffb", "#001311", &default_domain(), &LegendConfig::default())
            .unwrap();

        assert_eq!(legend.bands.len(), 7);
        assert_eq!(legend.ticks.len(), 8);
        assert_eq!((legend.x, legend.y), (565.0, 32.0));
        assert_eq!((legend.width, legend.height), (290.0, 8.0));

        let slot = 290.0 / 7.0;
        for (i, band) in legend.bands.iter().enumerate() {
            assert!((band.x - (5.0 + i as f64 * slot)).abs() < 1e-9);
            assert!((band.width - slot).abs() < 1e-9);
        }
        assert_eq!(legend.ticks[0].label, "3%");
        assert_eq!(legend.ticks[7].label, "66%");
        assert!((legend.ticks[7].x - (5.0 + 7.0 * slot)).abs() < 1e-9);
    }

    #[test]
    fn last_interpolated_colour_is_left_out() {
        let domain = default_domain();
        let legend =
            build_legend("#e4fffb", "#001311", &domain, &LegendConfig::default()).unwrap();
        let colors = interpolate_color("#e4fffb", "#001311", 7).unwrap();

        let fills: Vec<Rgb> = legend.bands.iter().map(|b| b.fill).collect();
        assert_eq!(fills, &colors[..7]);
        assert!(!fills.contains(&Rgb::new(0, 19, 17)));
    }

    #[test]
    fn bad_colour_fails_the_legend() {
        let err = build_legend("teal", "#001311", &default_domain(), &LegendConfig::default());
        assert!(matches!(err, Err(ColorError::Format { .. })));
    }
}
