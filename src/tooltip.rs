//! Hover interaction: enter shows, move repositions, exit hides.

use crate::config::TooltipConfig;
use crate::lookup::AttainmentLookup;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub page_x: f64,
    pub page_y: f64,
}

/// What the page applies to the `#tooltip` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub visible: bool,
    pub text: Option<String>,
    pub data_education: Option<f64>,
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone)]
pub struct Tooltip {
    offset: TooltipConfig,
    visible: bool,
    text: Option<String>,
    data_education: Option<f64>,
    left: f64,
    top: f64,
}

impl Tooltip {
    pub fn new(offset: TooltipConfig) -> Self {
        Self {
            offset,
            visible: false,
            text: None,
            data_education: None,
            left: 0.0,
            top: 0.0,
        }
    }

    /// Returns whether the tooltip is shown. Counties without a record leave
    /// it untouched.
    pub fn enter(&mut self, lookup: &mut AttainmentLookup, fips: u32, pointer: Pointer) -> bool {
        let Some(record) = lookup.lookup(fips) else {
            return false;
        };
        self.text = Some(format!(
            "{}, {}: {}%",
            record.area_name, record.state, record.bachelors_or_higher
        ));
        self.data_education = Some(record.bachelors_or_higher);
        self.visible = true;
        self.move_to(pointer);
        true
    }

    pub fn move_to(&mut self, pointer: Pointer) {
        self.left = pointer.page_x + self.offset.offset_x;
        self.top = pointer.page_y + self.offset.offset_y;
    }

    pub fn exit(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn view(&self) -> TooltipView {
        TooltipView {
            visible: self.visible,
            text: self.text.clone(),
            data_education: self.data_education,
            left: self.left,
            top: self.top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::tests::record;

    fn lookup() -> AttainmentLookup {
        AttainmentLookup::new(vec![record(1003, "Baldwin County", "AL", 35.2)])
    }

    #[test]
    fn hover_cycle() {
        let mut lookup = lookup();
        let mut tooltip = Tooltip::new(TooltipConfig::default());

        assert!(tooltip.enter(&mut lookup, 1003, Pointer { page_x: 100.0, page_y: 200.0 }));
        let view = tooltip.view();
        assert!(view.visible);
        assert_eq!(view.text.as_deref(), Some("Baldwin County, AL: 35.2%"));
        assert_eq!(view.data_education, Some(35.2));
        assert_eq!((view.left, view.top), (105.0, 160.0));

        tooltip.move_to(Pointer { page_x: 10.0, page_y: 50.0 });
        assert_eq!((tooltip.view().left, tooltip.view().top), (15.0, 10.0));

        tooltip.exit();
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn unknown_county_keeps_tooltip_hidden() {
        let mut lookup = lookup();
        let mut tooltip = Tooltip::new(TooltipConfig::default());

        assert!(!tooltip.enter(&mut lookup, 77777, Pointer { page_x: 1.0, page_y: 1.0 }));
        let view = tooltip.view();
        assert!(!view.visible);
        assert_eq!(view.text, None);
    }

    #[test]
    fn second_hover_hits_the_cache() {
        let mut lookup = lookup();
        let mut tooltip = Tooltip::new(TooltipConfig::default());
        let pointer = Pointer { page_x: 0.0, page_y: 0.0 };

        tooltip.enter(&mut lookup, 1003, pointer);
        tooltip.exit();
        tooltip.enter(&mut lookup, 1003, pointer);

        assert_eq!(lookup.scan_count(), 1);
    }
}
