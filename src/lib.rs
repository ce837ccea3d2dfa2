//! Hours Report
//!
//! Turns a fingerprint-scanner hours export into a two-sheet workbook of
//! per-team hours, flagging students whose totals fall outside the watermarks.
//!
//! This library provides:
//! - `roster`: per-student hour accumulation keyed by id
//! - `teams`: team membership and hours ranking
//! - `threshold`: low/high classification and flag counting
//! - `layout`: placement of team blocks into configured sheet sections
//! - `report`: the coaches and parents sheets built from one data set
//! - `config`, `input`, `output`: properties file, export reading, sheet writing
//!
//! Binaries:
//! - `hours-report`: command-line front end

pub mod config;
pub mod error;
pub mod input;
pub mod layout;
pub mod output;
pub mod report;
pub mod roster;
pub mod teams;
pub mod threshold;

pub use config::Config;
pub use error::{ConfigError, InputError, LayoutError};
pub use layout::{CellSink, LayoutEngine, LayoutSection, StyleTag, Variant};
pub use report::{ReportAssembler, ReportSummary, VariantReport};
pub use roster::{Person, PersonId, Roster};
pub use teams::TeamIndex;
pub use threshold::{FlagCounts, FlagTally, HoursClass, Thresholds};
