//! Handles all user-facing output for the CLI.

use std::io::{self, Write};

use miette::Report;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::config::RunConfig;
use crate::corpus::SUITES;
use crate::report::Report as RunReport;
use crate::tree::{Child, ContextId, SpecTree};

use super::CliError;

fn stdout(use_colors: bool) -> StandardStream {
    StandardStream::stdout(if use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    })
}

pub(super) fn print_report(report: &RunReport, use_colors: bool) -> io::Result<()> {
    let mut out = stdout(use_colors);
    report.write_text(&mut out)
}

pub(super) fn print_outline(tree: &SpecTree, config: &RunConfig) -> io::Result<()> {
    let mut out = stdout(config.use_colors);
    write_outline(&mut out, tree, config)
}

pub(super) fn print_suites() -> io::Result<()> {
    let mut out = io::stdout().lock();
    for def in SUITES {
        writeln!(out, "{:<8} {}", def.name, def.summary)?;
    }
    Ok(())
}

pub(super) fn print_error(error: CliError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

/// Writes the context tree, marking contexts whose guards exclude them.
pub(crate) fn write_outline<W: WriteColor>(
    out: &mut W,
    tree: &SpecTree,
    config: &RunConfig,
) -> io::Result<()> {
    for &root in tree.roots() {
        write_context(out, tree, root, config, 0, true)?;
    }
    Ok(())
}

fn write_context<W: WriteColor>(
    out: &mut W,
    tree: &SpecTree,
    id: ContextId,
    config: &RunConfig,
    depth: usize,
    parent_admitted: bool,
) -> io::Result<()> {
    let context = tree.context(id);
    let own_admitted = context.guards().iter().all(|guard| guard.admits(config));
    let admitted = parent_admitted && own_admitted;
    let indent = "  ".repeat(depth);

    let mut heading: Vec<String> = context.description().map(str::to_string).into_iter().collect();
    heading.extend(context.guards().iter().map(|guard| format!("[{guard}]")));
    write!(out, "{indent}{}", heading.join(" "))?;
    if !own_admitted {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(out, " (excluded)")?;
        out.reset()?;
    }
    writeln!(out)?;

    for child in context.children() {
        match child {
            Child::Context(nested) => write_context(out, tree, *nested, config, depth + 1, admitted)?,
            Child::Example(example) => {
                if !admitted {
                    out.set_color(ColorSpec::new().set_dimmed(true))?;
                }
                writeln!(out, "{indent}  - {}", example.description().unwrap_or("(anonymous)"))?;
                out.reset()?;
            }
        }
    }
    Ok(())
}
