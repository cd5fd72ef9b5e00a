//! FIPS → education record join, with a cache for tooltip lookups.

use crate::types::EducationRecord;
use std::collections::HashMap;
use tracing::trace;

/// Records found by [`AttainmentLookup::lookup`]. Entries are never
/// invalidated; misses are not stored.
pub type TooltipCache = HashMap<u32, EducationRecord>;

#[derive(Debug, Default)]
pub struct AttainmentLookup {
    records: Vec<EducationRecord>,
    cache: TooltipCache,
    scans: usize,
}

impl AttainmentLookup {
    pub fn new(records: Vec<EducationRecord>) -> Self {
        Self {
            records,
            cache: TooltipCache::new(),
            scans: 0,
        }
    }

    /// Cached lookup used by the tooltip. A miss re-scans every time.
    pub fn lookup(&mut self, fips: u32) -> Option<&EducationRecord> {
        if !self.cache.contains_key(&fips) {
            self.scans += 1;
            let found = self.records.iter().find(|r| r.fips == fips)?.clone();
            trace!(fips, "caching education record");
            self.cache.insert(fips, found);
        }
        self.cache.get(&fips)
    }

    /// Uncached scan used for fills.
    pub fn find(&self, fips: u32) -> Option<&EducationRecord> {
        self.records.iter().find(|r| r.fips == fips)
    }

    pub fn scan_count(&self) -> usize {
        self.scans
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn record(fips: u32, area_name: &str, state: &str, pct: f64) -> EducationRecord {
        EducationRecord {
            fips,
            area_name: area_name.to_string(),
            state: state.to_string(),
            bachelors_or_higher: pct,
        }
    }

    fn sample() -> AttainmentLookup {
        AttainmentLookup::new(vec![
            record(1001, "Autauga County", "AL", 21.9),
            record(1003, "Baldwin County", "AL", 35.2),
            record(1005, "Barbour County", "AL", 11.5),
        ])
    }

    #[test]
    fn repeated_lookup_scans_once() {
        let mut lookup = sample();

        let first = lookup.lookup(1003).cloned();
        let second = lookup.lookup(1003).cloned();

        let expected = record(1003, "Baldwin County", "AL", 35.2);
        assert_eq!(first, Some(expected.clone()));
        assert_eq!(second, Some(expected));
        assert_eq!(lookup.scan_count(), 1);
        assert_eq!(lookup.cached(), 1);
    }

    #[test]
    fn misses_are_not_cached() {
        let mut lookup = sample();

        assert!(lookup.lookup(9999).is_none());
        assert!(lookup.lookup(9999).is_none());
        assert_eq!(lookup.scan_count(), 2);
        assert_eq!(lookup.cached(), 0);
    }

    #[test]
    fn find_bypasses_the_cache() {
        let lookup = sample();
        assert_eq!(lookup.find(1005).map(|r| r.bachelors_or_higher), Some(11.5));
        assert!(lookup.find(42).is_none());
        assert_eq!(lookup.scan_count(), 0);
        assert_eq!(lookup.cached(), 0);
    }
}
