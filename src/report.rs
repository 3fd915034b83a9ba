//! Run reports: per-example outcomes, totals, and their text and JSON renderings.
//!
//! Every executed example instance gets exactly one entry, so an example that
//! reaches the tree through several shared-group inclusions is reported once
//! per inclusion. Entries keep traversal order, which makes the report
//! deterministic for a given tree and configuration.

use std::io;

use difference::{Changeset, Difference};
use serde::Serialize;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::errors::{ErrorCause, Failure};
use crate::guard::Version;

// ============================================================================
// OUTCOMES
// ============================================================================

/// Why an example did not run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Excluded by a guard on the example's context or an ancestor.
    Guard(String),
    /// Its full description does not match the configured filter.
    Filtered,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Guard(guard) => write!(f, "{guard}"),
            SkipReason::Filtered => f.write_str("filtered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    NotRun(SkipReason),
    Passed,
    Failed(Failure),
    Errored(ErrorCause),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::NotRun(_) => "SKIP",
            Outcome::Passed => "PASS",
            Outcome::Failed(_) => "FAIL",
            Outcome::Errored(_) => "ERROR",
        }
    }

    fn color(&self) -> Color {
        match self {
            Outcome::NotRun(_) => Color::Yellow,
            Outcome::Passed => Color::Green,
            Outcome::Failed(_) | Outcome::Errored(_) => Color::Red,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Descriptions of the enclosing named contexts, outermost first.
    pub path: Vec<String>,
    pub description: Option<String>,
    pub outcome: Outcome,
}

impl ReportEntry {
    /// Context path and description joined by spaces, e.g. `Regexp#=~ returns nil`.
    pub fn full_description(&self) -> String {
        let mut parts: Vec<&str> = self.path.iter().map(String::as_str).collect();
        if let Some(description) = &self.description {
            parts.push(description);
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
}

impl Totals {
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errored + self.skipped
    }

    /// Share of executed examples that passed, as a percentage.
    pub fn success_rate(&self) -> f64 {
        let executed = self.passed + self.failed + self.errored;
        if executed == 0 {
            100.0
        } else {
            self.passed as f64 / executed as f64 * 100.0
        }
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub target_version: Version,
    pub platform: Option<String>,
    totals: Totals,
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new(target_version: Version, platform: Option<String>) -> Self {
        Self {
            target_version,
            platform,
            totals: Totals::default(),
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, entry: ReportEntry) {
        match entry.outcome {
            Outcome::NotRun(_) => self.totals.skipped += 1,
            Outcome::Passed => self.totals.passed += 1,
            Outcome::Failed(_) => self.totals.failed += 1,
            Outcome::Errored(_) => self.totals.errored += 1,
        }
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    /// Entry whose full description equals `full`, first match in run order.
    pub fn find(&self, full: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.full_description() == full)
    }

    pub fn has_failures(&self) -> bool {
        self.totals.failed + self.totals.errored > 0
    }

    /// 0 when nothing failed or errored, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        i32::from(self.has_failures())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report: one line per example, failure details, then totals.
    pub fn write_text<W: WriteColor>(&self, out: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            write_colored(out, entry.outcome.label(), entry.outcome.color())?;
            write!(out, ": {}", entry.full_description())?;
            if let Outcome::NotRun(reason) = &entry.outcome {
                write!(out, " ({reason})")?;
            }
            writeln!(out)?;
        }

        let problems: Vec<&ReportEntry> = self
            .entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Failed(_) | Outcome::Errored(_)))
            .collect();
        if !problems.is_empty() {
            writeln!(out, "\nFailures:")?;
            for (index, entry) in problems.iter().enumerate() {
                writeln!(out, "\n  {}) {}", index + 1, entry.full_description())?;
                match &entry.outcome {
                    Outcome::Failed(failure) => write_failure(out, failure)?,
                    Outcome::Errored(cause) => {
                        write_colored(out, &format!("     {cause}"), Color::Red)?;
                        writeln!(out)?;
                    }
                    Outcome::NotRun(_) | Outcome::Passed => {}
                }
            }
        }

        let totals = self.totals;
        write!(out, "\nTest summary: total {}, ", totals.total())?;
        write_colored(out, "passed", Color::Green)?;
        write!(out, " {}, ", totals.passed)?;
        write_colored(out, "failed", Color::Red)?;
        write!(out, " {}, ", totals.failed)?;
        write_colored(out, "errored", Color::Red)?;
        write!(out, " {}, ", totals.errored)?;
        write_colored(out, "skipped", Color::Yellow)?;
        writeln!(out, " {}", totals.skipped)?;
        writeln!(
            out,
            "Target version {}, platform {}",
            self.target_version,
            self.platform.as_deref().unwrap_or("unknown")
        )
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_colored<W: WriteColor>(out: &mut W, text: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{text}")?;
    out.reset()
}

fn write_failure<W: WriteColor>(out: &mut W, failure: &Failure) -> io::Result<()> {
    for line in failure.message.lines() {
        writeln!(out, "     {line}")?;
    }
    // Single-line values are already spelled out in the message.
    if let (Some(expected), Some(actual)) = (&failure.expected, &failure.actual) {
        if expected.contains('\n') || actual.contains('\n') {
            writeln!(out, "     Diff (-expected +actual):")?;
            let changeset = Changeset::new(expected, actual, "\n");
            write_diff(out, &changeset.diffs)?;
        }
    }
    Ok(())
}

fn write_diff<W: WriteColor>(out: &mut W, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        let (prefix, text, color) = match diff {
            Difference::Same(x) => (' ', x, None),
            Difference::Add(x) => ('+', x, Some(Color::Green)),
            Difference::Rem(x) => ('-', x, Some(Color::Red)),
        };
        out.set_color(ColorSpec::new().set_fg(color))?;
        for line in text.lines() {
            writeln!(out, "     {prefix}{line}")?;
        }
        out.reset()?;
    }
    Ok(())
}
