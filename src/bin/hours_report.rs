//! Hours Report - build the coaches/parents hours workbook
//!
//! Reads a scanner hours export (CSV or workbook), totals hours per student,
//! and writes an Excel workbook with one sheet for coaches (names) and one
//! for parents (ids), laid out as described by the properties file.
//!
//! Usage: hours-report -c HoursExport.properties -i export.xlsx -o report.xlsx

use anyhow::{bail, Context, Result};
use clap::Parser;
use hours_report::config::{
    Config, DEFAULT_CONFIG_FILE, KEY_HIGH_THRESHOLD, KEY_INPUT_FILE, KEY_LOW_THRESHOLD,
    KEY_OUTPUT_FILE,
};
use hours_report::input::{load_rows, read_rows, LoadOptions};
use hours_report::output::{save_workbook, GridSheet, XlsxSheet};
use hours_report::{ReportAssembler, ReportSummary, Roster, TeamIndex, Variant, VariantReport};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hours-report")]
#[command(about = "Summarize scanner hours per team for coaches and parents")]
struct Cli {
    /// Properties file with column names, thresholds and sheet layout
    #[arg(short, long, env = "HOURS_REPORT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Hours export to read (overrides inputFile)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Workbook to create (overrides outputFile)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Totals below this are flagged low (overrides hoursLowThreshold)
    #[arg(long, visible_alias = "lt")]
    low_threshold: Option<f64>,

    /// Totals above this are flagged high (overrides hoursHighThreshold)
    #[arg(long, visible_alias = "ht")]
    high_threshold: Option<f64>,

    /// Check every configured team column before writing any sheet cells
    #[arg(long)]
    strict_layout: bool,

    /// Print the laid-out sheets instead of writing a workbook
    #[arg(long)]
    dry_run: bool,

    /// Debug logging (per-team detail)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = Config::load(&cli.config).context("Failed to load configuration")?;
    apply_overrides(&cli, &mut config);

    println!("Processing starting at:  {}", timestamp());

    let input = config
        .get(KEY_INPUT_FILE)
        .map(PathBuf::from)
        .context("No input file given (use --input or inputFile)")?;
    println!("Reading from file:  {}", input.display());

    let mut roster = Roster::new();
    let mut teams = TeamIndex::new();
    let rows = read_rows(&input)
        .with_context(|| format!("Failed to read input file {}", input.display()))?;
    let options = LoadOptions {
        reject_negative_hours: config.reject_negative_hours()?,
    };
    load_rows(&rows, &config.input_columns(), options, &mut roster, &mut teams)
        .with_context(|| format!("Not all columns present in {}", input.display()))?;
    println!(
        "Successfully parsed Input file:  {} teams and {} students",
        teams.team_count(),
        teams.member_count()
    );
    for team in teams.team_ids() {
        let members: Vec<String> = teams
            .members_of(team, &roster)
            .iter()
            .map(|p| p.to_string())
            .collect();
        log::debug!("{}:  {}", team, members.join(", "));
    }

    let thresholds = config.thresholds().context(
        "Illegal number format for Config hoursLow/HighThreshold and/or --low/--high-threshold",
    )?;
    let assembler = ReportAssembler::new(&roster, &teams, thresholds, timestamp())
        .strict(cli.strict_layout);

    let summary = if cli.dry_run {
        let mut coach = GridSheet::new();
        let mut parent = GridSheet::new();
        let summary = assembler.build_report(&config, &mut coach, &mut parent);
        println!("\n=== {} ===\n{}", Variant::Coach.sheet_name(), coach.render());
        println!("=== {} ===\n{}", Variant::Parent.sheet_name(), parent.render());
        summary
    } else {
        let output = config
            .get(KEY_OUTPUT_FILE)
            .map(PathBuf::from)
            .context("No output file given (use --output or outputFile)")?;
        let summary = write_report(&assembler, &config, &output)?;
        println!("File Created:  {}", output.display());
        summary
    };

    print_counts(&summary.coach);
    print_counts(&summary.parent);
    println!("Processing Complete at:  {}", timestamp());

    let errors: Vec<String> = summary.errors().map(|e| e.to_string()).collect();
    if !errors.is_empty() {
        for e in &errors {
            log::error!("{}", e);
        }
        bail!("{} report sheet(s) incomplete: {}", errors.len(), errors.join("; "));
    }
    Ok(())
}

/// Command-line values win over the properties file.
fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(input) = &cli.input {
        config.set(KEY_INPUT_FILE, input.to_string_lossy());
    }
    if let Some(output) = &cli.output {
        config.set(KEY_OUTPUT_FILE, output.to_string_lossy());
    }
    if let Some(low) = cli.low_threshold {
        config.set(KEY_LOW_THRESHOLD, low.to_string());
    }
    if let Some(high) = cli.high_threshold {
        config.set(KEY_HIGH_THRESHOLD, high.to_string());
    }
}

fn write_report(
    assembler: &ReportAssembler,
    config: &Config,
    output: &Path,
) -> Result<ReportSummary> {
    if output
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("xls"))
    {
        log::warn!(
            "{} will be written in xlsx format despite the .xls extension",
            output.display()
        );
    }

    let mut coach = XlsxSheet::new(Variant::Coach)?;
    let mut parent = XlsxSheet::new(Variant::Parent)?;
    let summary = assembler.build_report(config, &mut coach, &mut parent);

    // sheets are saved even when a pass stopped early
    save_workbook(vec![coach, parent], output)
        .with_context(|| format!("Failed to write workbook {}", output.display()))?;
    Ok(summary)
}

fn print_counts(report: &VariantReport) {
    println!(
        "{}: noted {} students with low hours and {} students with high hours",
        report.variant.sheet_name(),
        report.counts.low,
        report.counts.high
    );
}

fn timestamp() -> String {
    chrono::Local::now().format("%m/%d/%Y %I:%M %p").to_string()
}
