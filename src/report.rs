//! Builds the coaches and parents sheets from one set of team data.

use crate::config::Config;
use crate::error::LayoutError;
use crate::layout::{preflight, sections_from_config, CellSink, LayoutEngine, StyleTag, Variant};
use crate::roster::Roster;
use crate::teams::TeamIndex;
use crate::threshold::{FlagCounts, FlagTally, Thresholds};

/// What one variant's layout pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantReport {
    pub variant: Variant,
    /// Distinct people flagged low/high on this sheet, including any
    /// written before a configuration error stopped the pass.
    pub counts: FlagCounts,
    /// Final row reached by the layout, absent when the pass failed.
    pub max_row: Option<i64>,
    pub error: Option<LayoutError>,
}

impl VariantReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub coach: VariantReport,
    pub parent: VariantReport,
}

impl ReportSummary {
    pub fn errors(&self) -> impl Iterator<Item = &LayoutError> {
        [&self.coach, &self.parent]
            .into_iter()
            .filter_map(|r| r.error.as_ref())
    }
}

pub struct ReportAssembler<'a> {
    roster: &'a Roster,
    teams: &'a TeamIndex,
    thresholds: Thresholds,
    generated_at: String,
    strict: bool,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(
        roster: &'a Roster,
        teams: &'a TeamIndex,
        thresholds: Thresholds,
        generated_at: impl Into<String>,
    ) -> Self {
        Self {
            roster,
            teams,
            thresholds,
            generated_at: generated_at.into(),
            strict: false,
        }
    }

    /// Validate every configured column before writing a variant's cells.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Lay out both sheets. A configuration error in one does not stop the other.
    pub fn build_report<C, P>(
        &self,
        config: &Config,
        coach: &mut C,
        parent: &mut P,
    ) -> ReportSummary
    where
        C: CellSink + ?Sized,
        P: CellSink + ?Sized,
    {
        ReportSummary {
            coach: self.build_variant(config, Variant::Coach, coach),
            parent: self.build_variant(config, Variant::Parent, parent),
        }
    }

    /// Lay out a single sheet with its own flag tally.
    pub fn build_variant<S: CellSink + ?Sized>(
        &self,
        config: &Config,
        variant: Variant,
        sink: &mut S,
    ) -> VariantReport {
        let mut tally = FlagTally::new(self.thresholds);
        let result = self.run_variant(config, variant, sink, &mut tally);
        let counts = tally.counts();
        match result {
            Ok(max_row) => {
                log::info!(
                    "{} sheet: {} low, {} high, last row {}",
                    variant.sheet_name(),
                    counts.low,
                    counts.high,
                    max_row
                );
                VariantReport {
                    variant,
                    counts,
                    max_row: Some(max_row),
                    error: None,
                }
            }
            Err(e) => VariantReport {
                variant,
                counts,
                max_row: None,
                error: Some(e),
            },
        }
    }

    fn run_variant<S: CellSink + ?Sized>(
        &self,
        config: &Config,
        variant: Variant,
        sink: &mut S,
        tally: &mut FlagTally,
    ) -> Result<i64, LayoutError> {
        sink.write_merged(
            0,
            0,
            variant.title_last_col(),
            &variant.title(&self.generated_at),
            StyleTag::Title,
        )?;

        let start_row = config.start_row(variant)?;
        let sections = sections_from_config(config, variant)?;
        if self.strict {
            preflight(&sections)?;
        }
        let engine = LayoutEngine::new(self.roster, self.teams, variant);
        let outcome = engine.layout_sections(sink, &sections, start_row, tally)?;
        Ok(outcome.max_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::GridSheet;

    fn data() -> (Roster, TeamIndex) {
        let mut roster = Roster::new();
        let mut teams = TeamIndex::new();
        for (team, name, id, hrs) in [
            (1, "John Doe", "123", 9.0),
            (1, "Jane Doe", "456", 1.0),
            (2, "Bob Lee", "789", 5.0),
        ] {
            let h = roster.resolve(name, id, hrs);
            teams.add_member(team, h);
        }
        (roster, teams)
    }

    fn config() -> Config {
        Config::parse(
            "coachesStartRow=1\n\
             coachesTopRow=1,2\n\
             coachesColumn-1=0\n\
             coachesColumn-2=3\n\
             parentsStartRow=0\n\
             parentsTopRow=1\n\
             parentsBotRow=2,1\n\
             parentsColumn-1=0\n\
             parentsColumn-2=4\n",
        )
    }

    #[test]
    fn test_both_variants_are_counted_separately() {
        let (roster, teams) = data();
        let assembler = ReportAssembler::new(&roster, &teams, Thresholds::default(), "now");
        let mut coach = GridSheet::new();
        let mut parent = GridSheet::new();

        let summary = assembler.build_report(&config(), &mut coach, &mut parent);

        assert!(summary.coach.is_ok());
        assert!(summary.parent.is_ok());
        assert_eq!(summary.coach.counts, FlagCounts { low: 1, high: 1 });
        // team 1 appears twice on the parents sheet but is only counted once
        assert_eq!(summary.parent.counts, FlagCounts { low: 1, high: 1 });
        assert_eq!(summary.errors().count(), 0);

        assert_eq!(coach.text(0, 0), Some("COACHES Hours Report now"));
        assert_eq!(coach.style(0, 0), Some(StyleTag::Title));
        assert_eq!(coach.text(2, 0), Some("Team 1"));
        assert_eq!(coach.text(3, 0), Some("Doe, John"));
        assert_eq!(summary.coach.max_row, Some(5));

        assert_eq!(parent.text(0, 0), Some("PARENTS Hours Report now"));
        assert_eq!(parent.text(1, 0), Some("ID"));
        assert_eq!(parent.text(2, 0), Some("123"));
        // top section ends at row 4, bottom section header on row 5
        assert_eq!(parent.text(5, 4), Some("ID"));
        assert_eq!(parent.text(6, 4), Some("789"));
        assert_eq!(parent.text(6, 0), Some("123"));
        assert_eq!(summary.parent.max_row, Some(8));
    }

    #[test]
    fn test_config_error_in_one_variant() {
        let (roster, teams) = data();
        let mut config = config();
        config.set("parentsMidRow", "2,9");
        let assembler = ReportAssembler::new(&roster, &teams, Thresholds::default(), "now");
        let mut coach = GridSheet::new();
        let mut parent = GridSheet::new();

        let summary = assembler.build_report(&config, &mut coach, &mut parent);

        assert!(summary.coach.is_ok());
        assert_eq!(
            summary.parent.error,
            Some(LayoutError::MissingColumn {
                key: "parentsColumn-9".to_string()
            })
        );
        // the top section and team 2 of the mid section were written
        assert_eq!(parent.text(2, 0), Some("123"));
        assert_eq!(parent.text(6, 4), Some("789"));
        assert_eq!(summary.parent.counts, FlagCounts { low: 1, high: 1 });
        assert_eq!(summary.errors().count(), 1);
    }

    #[test]
    fn test_strict_mode_writes_no_blocks() {
        let (roster, teams) = data();
        let mut config = config();
        config.set("coachesBotRow", "7");
        let assembler =
            ReportAssembler::new(&roster, &teams, Thresholds::default(), "now").strict(true);
        let mut coach = GridSheet::new();
        let mut parent = GridSheet::new();

        let summary = assembler.build_report(&config, &mut coach, &mut parent);

        assert!(matches!(
            summary.coach.error,
            Some(LayoutError::MissingColumn { .. })
        ));
        // only the title made it onto the sheet
        assert_eq!(coach.len(), 1);
        assert_eq!(summary.coach.counts, FlagCounts::default());
        assert!(summary.parent.is_ok());
    }

    #[test]
    fn test_unconfigured_variant_has_only_title() {
        let (roster, teams) = data();
        let assembler = ReportAssembler::new(&roster, &teams, Thresholds::new(0.0, 100.0), "t");
        let mut coach = GridSheet::new();

        let report = assembler.build_variant(&Config::new(), Variant::Coach, &mut coach);

        assert_eq!(report.max_row, Some(-1));
        assert_eq!(report.counts, FlagCounts::default());
        assert_eq!(coach.len(), 1);
    }
}
