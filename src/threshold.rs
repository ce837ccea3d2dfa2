//! Low/high hour watermarks and per-report flag counting.

use crate::roster::Person;
use std::collections::HashSet;

pub const DEFAULT_LOW_HOURS: f64 = 3.0;
pub const DEFAULT_HIGH_HOURS: f64 = 7.0;

/// Where a total falls relative to the watermarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoursClass {
    Low,
    Normal,
    High,
}

/// The pair of watermarks. Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub low: f64,
    pub high: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_HOURS,
            high: DEFAULT_HIGH_HOURS,
        }
    }
}

impl Thresholds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// High is checked first, so with `low > high` anything above both is High.
    pub fn classify(&self, hours: f64) -> HoursClass {
        if hours > self.high {
            HoursClass::High
        } else if hours < self.low {
            HoursClass::Low
        } else {
            HoursClass::Normal
        }
    }
}

/// Distinct people flagged in one report variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagCounts {
    pub low: usize,
    pub high: usize,
}

/// Classifies people and counts each flagged id once per report variant.
#[derive(Debug)]
pub struct FlagTally {
    thresholds: Thresholds,
    seen: HashSet<String>,
    counts: FlagCounts,
}

impl FlagTally {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            seen: HashSet::new(),
            counts: FlagCounts::default(),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Classify `person`, bumping the matching counter the first time their id is flagged.
    pub fn classify(&mut self, person: &Person) -> HoursClass {
        let class = self.thresholds.classify(person.hours());
        let counter = match class {
            HoursClass::Low => &mut self.counts.low,
            HoursClass::High => &mut self.counts.high,
            HoursClass::Normal => return class,
        };
        if self.seen.insert(person.id().to_string()) {
            *counter += 1;
        }
        class
    }

    pub fn counts(&self) -> FlagCounts {
        self.counts
    }

    /// Start a new report variant with the same watermarks.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.counts = FlagCounts::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::Roster;

    #[test]
    fn test_classify_boundaries_are_exclusive() {
        let t = Thresholds::new(3.0, 7.0);
        assert_eq!(t.classify(2.9), HoursClass::Low);
        assert_eq!(t.classify(7.1), HoursClass::High);
        assert_eq!(t.classify(5.0), HoursClass::Normal);
        assert_eq!(t.classify(3.0), HoursClass::Normal);
        assert_eq!(t.classify(7.0), HoursClass::Normal);
    }

    #[test]
    fn test_inverted_watermarks_prefer_high() {
        let t = Thresholds::new(10.0, 2.0);
        assert_eq!(t.classify(5.0), HoursClass::High);
        assert_eq!(t.classify(1.0), HoursClass::Low);
        assert_eq!(t.classify(2.0), HoursClass::Low);
    }

    #[test]
    fn test_tally_counts_each_id_once() {
        let mut roster = Roster::new();
        let low = roster.resolve("A B", "1", 1.0);
        let high = roster.resolve("C D", "2", 9.0);
        let ok = roster.resolve("E F", "3", 5.0);

        let mut tally = FlagTally::new(Thresholds::default());
        for _ in 0..3 {
            assert_eq!(tally.classify(roster.get(low).unwrap()), HoursClass::Low);
            assert_eq!(tally.classify(roster.get(high).unwrap()), HoursClass::High);
            assert_eq!(tally.classify(roster.get(ok).unwrap()), HoursClass::Normal);
        }
        assert_eq!(tally.counts(), FlagCounts { low: 1, high: 1 });

        tally.reset();
        assert_eq!(tally.counts(), FlagCounts::default());
        tally.classify(roster.get(low).unwrap());
        assert_eq!(tally.counts(), FlagCounts { low: 1, high: 0 });
    }
}
