//! Command dispatch: wires settings, roster loading and the hierarchy service

use std::io::{self, BufReader, IsTerminal};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, info, instrument};

use crate::application::HierarchyService;
use crate::cli::args::{Cli, Commands, ConfigCommands, SourceArgs};
use crate::cli::output;
use crate::cli::render::{render_chart, render_table, render_unplaced};
use crate::cli::shell::{run_session, SessionOptions};
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_dir, global_config_path, local_config_path, Settings};
use crate::domain::TreeBuilder;
use crate::infrastructure::{InfraError, RosterFile, RosterSource};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let base_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(|e| InfraError::io("resolve current dir", e))?,
    };

    match &cli.command {
        Some(Commands::Table { source }) => cmd_table(&base_dir, source),
        Some(Commands::Chart { source, expand_all }) => cmd_chart(&base_dir, source, *expand_all),
        Some(Commands::Unplaced { source }) => cmd_unplaced(&base_dir, source),
        Some(Commands::Shell { roster, seed }) => cmd_shell(&base_dir, roster.as_deref(), *seed),
        Some(Commands::Config { command }) => cmd_config(&base_dir, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `orgtree --help`".to_string(),
        )),
    }
}

/// Settings, roster and service assembled for one invocation.
struct Session {
    settings: Settings,
    service: HierarchyService,
}

#[instrument(level = "debug")]
fn open_session(base_dir: &Path, roster: Option<&Path>, seed: bool) -> CliResult<Session> {
    let settings = Settings::load(Some(base_dir))?;
    let roster_path: PathBuf = roster
        .map(Path::to_path_buf)
        .or_else(|| settings.roster.clone())
        .ok_or_else(|| {
            CliError::Usage("no roster given: pass --roster or set `roster` in config".to_string())
        })?;

    let records = RosterFile::new(&roster_path).load()?;
    info!("loaded {} employee(s) from {}", records.len(), roster_path.display());
    let mut service = HierarchyService::from_records(records, TreeBuilder::new(settings.max_level))?;

    if seed {
        let report = service.seed_from_roster();
        debug!("seeded {} placement(s)", report.placed);
        for (id, e) in &report.skipped {
            output::warning(&format!("seed skipped {id}: {e}"));
        }
    }
    Ok(Session { settings, service })
}

/// Apply `source.script` quietly; rejected lines become warnings.
fn apply_script(session: &mut Session, script: Option<&Path>) -> CliResult<()> {
    let Some(script) = script else {
        return Ok(());
    };
    let file = std::fs::File::open(script)
        .map_err(|e| InfraError::io(format!("open script {}", script.display()), e))?;
    let options = SessionOptions {
        indent_width: session.settings.indent_width,
        prompt: false,
        echo: false,
    };
    let failures = run_session(
        &mut session.service,
        BufReader::new(file),
        &mut io::stdout(),
        options,
    )?;
    for failure in failures {
        output::warning(&format!(
            "{}:{}: {}",
            script.display(),
            failure.line,
            failure.message
        ));
    }
    Ok(())
}

fn prepare(base_dir: &Path, source: &SourceArgs) -> CliResult<Session> {
    let mut session = open_session(base_dir, source.roster.as_deref(), source.seed)?;
    apply_script(&mut session, source.script.as_deref())?;
    Ok(session)
}

#[instrument(level = "debug")]
fn cmd_table(base_dir: &Path, source: &SourceArgs) -> CliResult<()> {
    let session = prepare(base_dir, source)?;
    let rows = session.service.flattened_view();
    print!("{}", render_table(&rows, session.settings.indent_width));
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_chart(base_dir: &Path, source: &SourceArgs, expand_all: bool) -> CliResult<()> {
    let mut session = prepare(base_dir, source)?;
    if expand_all {
        session.service.expand_all();
    }
    print!("{}", render_chart(&session.service.chart()));
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_unplaced(base_dir: &Path, source: &SourceArgs) -> CliResult<()> {
    let session = prepare(base_dir, source)?;
    print!("{}", render_unplaced(&session.service.unplaced()));
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_shell(base_dir: &Path, roster: Option<&Path>, seed: bool) -> CliResult<()> {
    let mut session = open_session(base_dir, roster, seed)?;
    let stdin = io::stdin();
    let options = SessionOptions {
        indent_width: session.settings.indent_width,
        prompt: stdin.is_terminal(),
        echo: true,
    };
    let failures = run_session(
        &mut session.service,
        stdin.lock(),
        &mut io::stdout(),
        options,
    )?;
    debug!("session ended with {} failed line(s)", failures.len());
    Ok(())
}

fn cmd_config(base_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(base_dir))?;
            output::header("Merged configuration");
            print!("{}", settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                let dir = global_config_dir().ok_or_else(|| {
                    CliError::InvalidArgs("cannot determine global config dir".to_string())
                })?;
                std::fs::create_dir_all(&dir)
                    .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
                global_config_path().ok_or_else(|| {
                    CliError::InvalidArgs("cannot determine global config path".to_string())
                })?
            } else {
                local_config_path(base_dir)
            };
            if path.exists() {
                return Err(CliError::InvalidArgs(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".to_string());
            output::action("global", &global);
            output::action("local", &local_config_path(base_dir).display());
            Ok(())
        }
    }
}
