//! Section layout: placing team blocks onto a report sheet.
//!
//! A sheet is split into up to three horizontal sections (`TopRow`, `MidRow`,
//! `BotRow`). Each section lists teams and every team has a configured start
//! column. All blocks in a section share a header row; the next section
//! starts one blank row below the tallest block seen so far.
//!
//! ```text
//!   row base     | Team 1 | Hours |   | Team 2 | Hours |
//!   row base+1   | Doe, J |  8.5  |   | Lee, B |  7.0  |
//!   ...
//! ```

use crate::config::{Config, MAX_COLUMN};
use crate::error::LayoutError;
use crate::roster::{Person, Roster};
use crate::teams::TeamIndex;
use crate::threshold::{FlagTally, HoursClass};
use std::collections::BTreeSet;

/// Section names, in the order they are laid out.
pub const SECTION_NAMES: [&str; 3] = ["TopRow", "MidRow", "BotRow"];

/// The two report sheets built from the same team data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Coach-facing: student names and hours.
    Coach,
    /// Parent-facing: anonymous ids, team number, and hours.
    Parent,
}

impl Variant {
    /// Prefix of every config key for this variant.
    pub fn key_prefix(self) -> &'static str {
        match self {
            Variant::Coach => "coaches",
            Variant::Parent => "parents",
        }
    }

    pub fn sheet_name(self) -> &'static str {
        match self {
            Variant::Coach => "Coaches",
            Variant::Parent => "Parents",
        }
    }

    pub fn title(self, generated_at: &str) -> String {
        let label = match self {
            Variant::Coach => "COACHES",
            Variant::Parent => "PARENTS",
        };
        format!("{} Hours Report {}", label, generated_at)
    }

    /// Last column spanned by the merged title row.
    pub fn title_last_col(self) -> u16 {
        match self {
            Variant::Coach => 8,
            Variant::Parent => 12,
        }
    }

    /// Columns per team block.
    pub fn block_width(self) -> u16 {
        match self {
            Variant::Coach => 2,
            Variant::Parent => 3,
        }
    }

    fn block_headers(self, team: i64) -> Vec<String> {
        match self {
            Variant::Coach => vec![format!("Team {}", team), "Hours".to_string()],
            Variant::Parent => vec!["ID".to_string(), "Team".to_string(), "Hours".to_string()],
        }
    }

    pub fn start_row_key(self) -> String {
        format!("{}StartRow", self.key_prefix())
    }

    pub fn section_key(self, section: &str) -> String {
        format!("{}{}", self.key_prefix(), section)
    }

    pub fn column_key(self, team: i64) -> String {
        format!("{}Column-{}", self.key_prefix(), team)
    }
}

/// Semantic style of a written cell. The sink decides what it looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    Title,
    Header,
    Normal,
    NormalCentered,
    NormalRight,
    /// Below the low watermark.
    Low,
    /// Above the high watermark.
    High,
}

impl From<HoursClass> for StyleTag {
    fn from(class: HoursClass) -> Self {
        match class {
            HoursClass::Low => StyleTag::Low,
            HoursClass::High => StyleTag::High,
            HoursClass::Normal => StyleTag::NormalRight,
        }
    }
}

/// Where layout output goes: a worksheet, or an in-memory grid in tests.
pub trait CellSink {
    fn write_text(&mut self, row: u32, col: u16, value: &str, style: StyleTag)
        -> Result<(), LayoutError>;

    fn write_number(&mut self, row: u32, col: u16, value: f64, style: StyleTag)
        -> Result<(), LayoutError>;

    /// Write `value` across `first_col..=last_col` of `row` as a single cell.
    fn write_merged(
        &mut self,
        row: u32,
        first_col: u16,
        last_col: u16,
        value: &str,
        style: StyleTag,
    ) -> Result<(), LayoutError>;

    fn autofit_column(&mut self, col: u16) -> Result<(), LayoutError>;
}

/// One team inside a section. The column stays unresolved until the block
/// is placed, so a missing `Column-N` key is reported when it is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamPlacement {
    pub team: i64,
    pub column: Result<u16, LayoutError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSection {
    pub name: String,
    pub placements: Vec<TeamPlacement>,
}

impl LayoutSection {
    pub fn new(name: impl Into<String>, placements: Vec<(i64, u16)>) -> Self {
        Self {
            name: name.into(),
            placements: placements
                .into_iter()
                .map(|(team, col)| TeamPlacement {
                    team,
                    column: Ok(col),
                })
                .collect(),
        }
    }
}

/// Read this variant's sections from config. Sections without a team list
/// are left out.
pub fn sections_from_config(
    config: &Config,
    variant: Variant,
) -> Result<Vec<LayoutSection>, LayoutError> {
    let mut sections = Vec::new();
    for name in SECTION_NAMES {
        let Some(list) = config.section(variant, name) else {
            log::debug!("No {} configured, skipping", variant.section_key(name));
            continue;
        };
        let mut placements = Vec::new();
        for raw in list.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let team: i64 = raw.parse().map_err(|_| LayoutError::InvalidTeamId {
                key: variant.section_key(name),
                value: raw.to_string(),
            })?;
            placements.push(TeamPlacement {
                team,
                column: config.team_column(variant, team),
            });
        }
        sections.push(LayoutSection {
            name: name.to_string(),
            placements,
        });
    }
    Ok(sections)
}

/// Check every placement's column before anything is written.
pub fn preflight(sections: &[LayoutSection]) -> Result<(), LayoutError> {
    for section in sections {
        for placement in &section.placements {
            placement.column.clone()?;
        }
    }
    Ok(())
}

/// Result of a completed layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOutcome {
    /// One past the last member row of the tallest block, or the starting
    /// row if nothing was written.
    pub max_row: i64,
    /// Columns that received at least one cell.
    pub columns: BTreeSet<u16>,
}

/// Lays out team blocks for one report variant.
pub struct LayoutEngine<'a> {
    roster: &'a Roster,
    teams: &'a TeamIndex,
    variant: Variant,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(roster: &'a Roster, teams: &'a TeamIndex, variant: Variant) -> Self {
        Self {
            roster,
            teams,
            variant,
        }
    }

    /// Place every section in order, starting below `start_row`.
    ///
    /// Stops at the first unresolvable column. Cells written before that
    /// point stay written and no columns are auto-fitted.
    pub fn layout_sections<S: CellSink + ?Sized>(
        &self,
        sink: &mut S,
        sections: &[LayoutSection],
        start_row: i64,
        tally: &mut FlagTally,
    ) -> Result<LayoutOutcome, LayoutError> {
        let mut max_row = start_row;
        let mut columns = BTreeSet::new();

        for section in sections {
            let base_row =
                u32::try_from(max_row + 1).map_err(|_| LayoutError::InvalidStartRow {
                    key: self.variant.start_row_key(),
                    value: start_row.to_string(),
                })?;
            log::debug!(
                "{} {}: header row {}",
                self.variant.sheet_name(),
                section.name,
                base_row
            );
            for placement in &section.placements {
                let col = placement.column.clone()?;
                if let Some(end) =
                    self.place_team(sink, placement.team, base_row, col, tally, &mut columns)?
                {
                    max_row = max_row.max(i64::from(end));
                }
            }
        }

        for &col in &columns {
            sink.autofit_column(col)?;
        }
        Ok(LayoutOutcome { max_row, columns })
    }

    /// Write one team block with its header at `base_row`.
    ///
    /// Returns the row after the last member, or `None` for an empty team.
    fn place_team<S: CellSink + ?Sized>(
        &self,
        sink: &mut S,
        team: i64,
        base_row: u32,
        start_col: u16,
        tally: &mut FlagTally,
        columns: &mut BTreeSet<u16>,
    ) -> Result<Option<u32>, LayoutError> {
        let width = self.variant.block_width();
        if start_col > MAX_COLUMN + 1 - width {
            return Err(LayoutError::InvalidColumn {
                key: self.variant.column_key(team),
                value: start_col.to_string(),
            });
        }

        let members = self.teams.members_of(team, self.roster);
        if members.is_empty() {
            log::debug!("Team {} has no members, nothing placed", team);
            return Ok(None);
        }

        let mut row = base_row + 1;
        for person in &members {
            self.write_member(sink, person, team, row, start_col, tally)?;
            row += 1;
        }
        for (offset, header) in self.variant.block_headers(team).iter().enumerate() {
            sink.write_text(base_row, start_col + offset as u16, header, StyleTag::Header)?;
        }
        columns.extend(start_col..start_col + width);
        Ok(Some(row))
    }

    fn write_member<S: CellSink + ?Sized>(
        &self,
        sink: &mut S,
        person: &Person,
        team: i64,
        row: u32,
        start_col: u16,
        tally: &mut FlagTally,
    ) -> Result<(), LayoutError> {
        let mut col = start_col;
        match self.variant {
            Variant::Coach => {
                sink.write_text(row, col, &person.display_name(), StyleTag::Normal)?;
                col += 1;
            }
            Variant::Parent => {
                sink.write_text(row, col, person.id(), StyleTag::NormalCentered)?;
                sink.write_number(row, col + 1, team as f64, StyleTag::NormalCentered)?;
                col += 2;
            }
        }
        let class = tally.classify(person);
        sink.write_number(row, col, person.hours(), class.into())
    }
}
