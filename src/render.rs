use crate::color::ColorScale;
use crate::config::AppConfig;
use crate::legend::{build_legend, Legend};
use crate::lookup::AttainmentLookup;
use crate::processing::{county_shapes, CountyShape};
use crate::types::Datasets;
use anyhow::{Context, Result};
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;
use tracing::info;

const TITLE: &str = "United States Educational Attainment";
const DESCRIPTION: &str =
    "Percentage of adults age 25 and older with a bachelor's degree or higher (2010-2014)";

const PAGE_SCRIPT: &str = r##"
const tooltip = document.getElementById("tooltip");
const tooltipCache = new Map();
let active = null;
const resolve = (county) => {
  const fips = county.dataset.fips;
  if (tooltipCache.has(fips)) return tooltipCache.get(fips);
  if (county.dataset.areaName === undefined) return null;
  const entry = {
    text: `${county.dataset.areaName}, ${county.dataset.state}: ${county.dataset.education}%`,
    education: county.dataset.education,
  };
  tooltipCache.set(fips, entry);
  return entry;
};
const place = (event) => {
  tooltip.style.left = `${event.pageX + __OFFSET_X__}px`;
  tooltip.style.top = `${event.pageY + __OFFSET_Y__}px`;
};
document.querySelectorAll("#canvas .county").forEach((county) => {
  county.addEventListener("mouseover", (event) => {
    const entry = resolve(county);
    if (!entry) return;
    active = county;
    tooltip.textContent = entry.text;
    tooltip.setAttribute("data-education", entry.education);
    place(event);
    tooltip.style.visibility = "visible";
  });
  county.addEventListener("mousemove", (event) => {
    if (active === county) place(event);
  });
  county.addEventListener("mouseout", () => {
    if (active === county) active = null;
    tooltip.style.visibility = "hidden";
  });
});
"##;

pub struct RenderedMap {
    pub shapes: Vec<CountyShape>,
    pub legend: Legend,
    pub svg: String,
    pub page: String,
}

/// Stage two: both datasets are in, draw everything once.
pub fn generate_map(config: &AppConfig, datasets: &Datasets) -> Result<RenderedMap> {
    let domain = config.color_domain()?;
    let palette = &config.palette;
    let scale = ColorScale::new(&domain, &palette.color1, &palette.color2)
        .context("Failed to build colour scale")?;
    let legend = build_legend(&palette.color1, &palette.color2, &domain, &config.legend)
        .context("Failed to build legend")?;

    let lookup = AttainmentLookup::new(datasets.education.clone());
    let shapes = county_shapes(&datasets.counties, &lookup, &scale);

    let svg = render_svg(&shapes, &legend, config.output.width, config.output.height);
    let page = render_page(&svg, config);

    Ok(RenderedMap {
        shapes,
        legend,
        svg,
        page,
    })
}

/// Writes `map.svg` and `index.html` into the output directory.
pub fn write_map(config: &AppConfig, map: &RenderedMap) -> Result<PathBuf> {
    let dir = &config.output.dir;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    let svg_path = dir.join("map.svg");
    fs::write(&svg_path, &map.svg)
        .with_context(|| format!("Failed to write {:?}", svg_path))?;
    let page_path = dir.join("index.html");
    fs::write(&page_path, &map.page)
        .with_context(|| format!("Failed to write {:?}", page_path))?;

    info!("Wrote {} counties to {:?}", map.shapes.len(), page_path);
    Ok(page_path)
}

pub fn render_svg(shapes: &[CountyShape], legend: &Legend, width: u32, height: u32) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg id="canvas" xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    for shape in shapes {
        let _ = write!(
            svg,
            r#"  <path class="county" d="{}" fill="{}" data-fips="{}" data-education="{}""#,
            shape.path, shape.fill, shape.fips, shape.education
        );
        // Tooltip text is resolved in the page; unmatched counties get none.
        if let Some(record) = &shape.record {
            let _ = write!(
                svg,
                r#" data-area-name="{}" data-state="{}""#,
                escape(&record.area_name),
                escape(&record.state)
            );
        }
        svg.push_str("/>\n");
    }
    write_legend(&mut svg, legend);
    svg.push_str("</svg>\n");
    svg
}

fn write_legend(svg: &mut String, legend: &Legend) {
    let _ = writeln!(
        svg,
        r#"  <g id="legend" width="{}" height="{}" transform="translate({},{})">"#,
        legend.width, legend.height, legend.x, legend.y
    );
    for band in &legend.bands {
        let _ = writeln!(
            svg,
            r#"    <rect class="legend-rect" x="{}" y="0" width="{}" height="{}" fill="{}"/>"#,
            band.x, band.width, legend.height, band.fill
        );
    }
    for tick in &legend.ticks {
        let _ = writeln!(
            svg,
            r##"    <line class="tick-line" x1="{x}" y1="0" x2="{x}" y2="{}" stroke="#000" stroke-width="1"/>"##,
            legend.height + 5.0,
            x = tick.x
        );
    }
    for tick in &legend.ticks {
        let _ = writeln!(
            svg,
            r#"    <text class="legend-label" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            tick.x,
            legend.height + 15.0,
            escape(&tick.label)
        );
    }
    svg.push_str("  </g>\n");
}

pub fn render_page(svg: &str, config: &AppConfig) -> String {
    let script = PAGE_SCRIPT
        .replace("__OFFSET_X__", &config.tooltip.offset_x.to_string())
        .replace("__OFFSET_Y__", &config.tooltip.offset_y.to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; text-align: center; }}
  #tooltip {{ visibility: hidden; position: absolute; padding: 7px; border-radius: 5px; pointer-events: none; background: #fff; border: 1px solid #000; }}
  .legend-label {{ font-size: 10px; }}
</style>
</head>
<body>
<h1 id="title">{title}</h1>
<p id="description">{description}</p>
{svg}<div id="tooltip"></div>
<script>{script}</script>
</body>
</html>
"#,
        title = escape(TITLE),
        description = escape(DESCRIPTION),
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::tests::record;
    use crate::types::CountyFeature;
    use geo::{polygon, MultiPolygon};

    fn datasets() -> Datasets {
        let square = |id| CountyFeature {
            id,
            geometry: MultiPolygon::new(vec![polygon![
                (x: 0., y: 0.),
                (x: 2., y: 0.),
                (x: 2., y: 2.),
                (x: 0., y: 2.)
            ]]),
        };
        Datasets {
            counties: vec![square(1003), square(1005)],
            education: vec![record(1003, "Baldwin County", "AL", 35.2)],
        }
    }

    #[test]
    fn svg_carries_county_attributes_and_legend() {
        let map = generate_map(&AppConfig::default(), &datasets()).unwrap();

        assert!(map.svg.starts_with(r#"<svg id="canvas""#));
        assert!(map.svg.contains(r#"data-fips="1003" data-education="35.2""#));
        assert!(map.svg.contains(
            r#"data-fips="1003" data-education="35.2" data-area-name="Baldwin County" data-state="AL"/>"#
        ));
        assert!(map.svg.contains(
            r#"d="M0,0L2,0L2,2L0,2Z" fill="rgb(228,255,251)" data-fips="1005" data-education="0"/>"#
        ));
        assert!(map.svg.contains(r#"<g id="legend" width="290" height="8" transform="translate(565,32)">"#));
        assert_eq!(map.svg.matches(r#"class="legend-rect""#).count(), 7);
        assert_eq!(map.svg.matches(r#"class="tick-line""#).count(), 8);
        assert!(map.svg.contains(">66%</text>"));
    }

    #[test]
    fn page_hosts_svg_and_tooltip() {
        let config = AppConfig::default();
        let map = generate_map(&config, &datasets()).unwrap();

        assert!(map.page.contains(r#"<div id="tooltip"></div>"#));
        assert!(map.page.contains(&map.svg));
        assert!(map.page.contains("event.pageX + 5"));
        assert!(map.page.contains("event.pageY + -40"));
        assert!(map.page.contains("bachelor&#39;s"));
        assert!(!map.page.contains("__OFFSET"));
    }

    #[test]
    fn page_resolves_tooltips_without_the_server() {
        let map = generate_map(&AppConfig::default(), &datasets()).unwrap();

        assert!(!map.page.contains("fetch("));
        assert!(!map.page.contains("await"));
        assert!(map.page.contains("tooltipCache"));
        assert!(map.page.contains("if (active === county) place(event);"));
    }

    #[test]
    fn record_text_is_escaped_in_attributes() {
        let mut data = datasets();
        data.education = vec![record(1003, "St. Mary's \"Parish\" & <Co>", "LA", 20.0)];

        let map = generate_map(&AppConfig::default(), &data).unwrap();
        assert!(map.svg.contains(
            r#"data-area-name="St. Mary&#39;s &quot;Parish&quot; &amp; &lt;Co&gt;" data-state="LA""#
        ));
    }

    #[test]
    fn writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.output.dir = dir.path().join("out");

        let map = generate_map(&config, &datasets()).unwrap();
        let page = write_map(&config, &map).unwrap();

        assert_eq!(page, dir.path().join("out").join("index.html"));
        let svg = fs::read_to_string(dir.path().join("out").join("map.svg")).unwrap();
        assert_eq!(svg, map.svg);
    }
}
