//! Line-oriented edit session
//!
//! Each input line is one command (`place a b`, `remove a`, `chart`, ...),
//! parsed with clap so the session shares the CLI's help and error texts.
//! Edit failures are reported and the session carries on.

use std::io::{BufRead, Write};

use clap::{Parser, Subcommand};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::HierarchyService;
use crate::cli::render::{render_chart, render_table, render_unplaced};
use crate::cli::CliResult;
use crate::infrastructure::InfraError;

#[derive(Parser, Debug)]
#[command(name = "orgtree", no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Place an employee under a manager (omit the manager for a root)
    Place {
        subordinate: String,
        manager: Option<String>,
    },
    /// Remove an employee and everyone reporting to it
    Remove { id: String },
    /// Remove everything
    Clear,
    /// Expand or collapse one chart node
    Toggle { id: String },
    /// Expand every chart node
    ExpandAll,
    /// Collapse every chart node
    CollapseAll,
    /// Print the flattened table
    Table,
    /// Print the chart
    Chart,
    /// List employees not yet placed
    Unplaced,
    /// Place employees under the managers declared in the roster
    Seed,
    /// Print placed, root, depth and leaf counts
    Stats,
    /// End the session
    #[command(alias = "exit")]
    Quit,
}

/// Parse one input line. `None` for blank lines and `#` comments.
pub fn parse_line(line: &str) -> Option<Result<ShellCommand, clap::Error>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(ShellLine::try_parse_from(trimmed.split_whitespace()).map(|parsed| parsed.command))
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub indent_width: usize,
    /// Print a prompt before reading each line
    pub prompt: bool,
    /// Acknowledge edits and print errors inline
    pub echo: bool,
}

/// A line that could not be parsed or whose edit was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub line: usize,
    pub message: String,
}

/// Run commands from `input` against `service`, writing views to `out`.
#[instrument(level = "debug", skip_all)]
pub fn run_session<R: BufRead, W: Write>(
    service: &mut HierarchyService,
    input: R,
    out: &mut W,
    options: SessionOptions,
) -> CliResult<Vec<LineFailure>> {
    let mut failures = Vec::new();
    let mut lines = input.lines().enumerate();

    loop {
        if options.prompt {
            write!(out, "orgtree> ").and_then(|_| out.flush()).map_err(write_err)?;
        }
        let Some((idx, line)) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| InfraError::io("read session input", e))?;
        let Some(parsed) = parse_line(&line) else {
            continue;
        };
        let command = match parsed {
            Ok(command) => command,
            Err(e) => {
                if options.echo {
                    write!(out, "{}", e.render()).map_err(write_err)?;
                }
                let rendered = e.to_string();
                let first = rendered.lines().next().unwrap_or_default();
                failures.push(LineFailure {
                    line: idx + 1,
                    message: first.trim_start_matches("error: ").to_string(),
                });
                continue;
            }
        };
        debug!("session command: {:?}", command);
        if command == ShellCommand::Quit {
            break;
        }

        match execute(service, command, options.indent_width) {
            Outcome::View(text) => write!(out, "{text}").map_err(write_err)?,
            Outcome::Ack(text) => {
                if options.echo {
                    writeln!(out, "{text}").map_err(write_err)?;
                }
            }
            Outcome::Failed(message) => {
                if options.echo {
                    writeln!(out, "error: {message}").map_err(write_err)?;
                }
                failures.push(LineFailure {
                    line: idx + 1,
                    message,
                });
            }
        }
    }
    Ok(failures)
}

enum Outcome {
    View(String),
    Ack(String),
    Failed(String),
}

fn execute(service: &mut HierarchyService, command: ShellCommand, indent_width: usize) -> Outcome {
    match command {
        ShellCommand::Place {
            subordinate,
            manager,
        } => match service.place(&subordinate, manager.as_deref()) {
            Ok(()) => Outcome::Ack(match manager {
                Some(m) => format!("placed {subordinate} under {m}"),
                None => format!("placed {subordinate} as root"),
            }),
            Err(e) => Outcome::Failed(e.to_string()),
        },
        ShellCommand::Remove { id } => {
            let removed = service.remove(&id);
            if removed.is_empty() {
                Outcome::Ack(format!("not placed: {id}"))
            } else {
                Outcome::Ack(format!("removed {}", removed.iter().join(", ")))
            }
        }
        ShellCommand::Clear => {
            service.clear();
            Outcome::Ack("cleared".to_string())
        }
        ShellCommand::Toggle { id } => match service.toggle_expanded(&id) {
            Some(true) => Outcome::Ack(format!("expanded {id}")),
            Some(false) => Outcome::Ack(format!("collapsed {id}")),
            None => Outcome::Ack(format!("not placed: {id}")),
        },
        ShellCommand::ExpandAll => {
            service.expand_all();
            Outcome::Ack("expanded all".to_string())
        }
        ShellCommand::CollapseAll => {
            service.collapse_all();
            Outcome::Ack("collapsed all".to_string())
        }
        ShellCommand::Table => {
            Outcome::View(render_table(&service.flattened_view(), indent_width))
        }
        ShellCommand::Chart => Outcome::View(render_chart(&service.chart())),
        ShellCommand::Unplaced => Outcome::View(render_unplaced(&service.unplaced())),
        ShellCommand::Seed => {
            let report = service.seed_from_roster();
            let mut text = format!(
                "seeded {}, skipped {}",
                report.placed,
                report.skipped.len()
            );
            for (id, e) in &report.skipped {
                text.push_str(&format!("\n  {id}: {e}"));
            }
            Outcome::Ack(text)
        }
        ShellCommand::Stats => {
            let stats = service.stats();
            Outcome::View(format!(
                "placed {}, roots {}, depth {}, leaves {} (max level {})\n",
                stats.placed, stats.roots, stats.depth, stats.leaves, stats.max_level
            ))
        }
        ShellCommand::Quit => Outcome::Ack(String::new()),
    }
}

fn write_err(e: std::io::Error) -> InfraError {
    InfraError::io("write session output", e)
}
