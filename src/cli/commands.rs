//! Command dispatch and rendering

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{DocblockService, ScanReport};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{self, OutputFormat, ScanConfig, Settings};
use crate::domain::TagTree;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Run the command selected on the command line.
///
/// Settings are loaded only for commands that use them, so `config path`
/// and `completion` still work next to a broken config file.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = match &cli.project_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| InfraError::io("resolve current directory", e))?,
    };

    let command = cli.command.as_ref().ok_or_else(|| {
        CliError::Usage("no command given, run with --help for usage".to_string())
    })?;

    match command {
        Commands::Completion { shell } => cmd_completion(*shell),
        Commands::Config {
            command: ConfigCommands::Path,
        } => cmd_config_path(&project_dir),
        _ => {
            let settings = Settings::load(Some(&project_dir))?;
            debug!("settings: {:?}", settings);
            let container = ServiceContainer::new(settings);
            dispatch(&container, command, &project_dir)
        }
    }
}

fn dispatch(container: &ServiceContainer, command: &Commands, project_dir: &Path) -> CliResult<()> {
    match command {
        Commands::Parse { file, format } => cmd_parse(
            container,
            file.as_deref(),
            format.unwrap_or(container.settings.format),
        ),
        Commands::Get { key, file } => cmd_get(container, key, file.as_deref()),
        Commands::Scan {
            path,
            format,
            extensions,
            include_empty,
        } => {
            let scan = scan_config(&container.settings.scan, extensions, *include_empty)?;
            cmd_scan(
                container,
                path,
                &scan,
                format.unwrap_or(container.settings.format),
            )
        }
        Commands::Config { command } => cmd_config(container, command, project_dir),
        Commands::Completion { shell } => cmd_completion(*shell),
    }
}

/// Apply `scan` command line flags on top of the configured scan settings.
fn scan_config(
    base: &ScanConfig,
    extensions: &[String],
    include_empty: bool,
) -> CliResult<ScanConfig> {
    if extensions
        .iter()
        .any(|ext| ext.trim_start_matches('.').is_empty())
    {
        return Err(CliError::InvalidArgs(
            "--ext needs a non-empty extension such as `php`".to_string(),
        ));
    }

    let mut scan = base.clone();
    if !extensions.is_empty() {
        scan.file_extensions = extensions.to_vec();
    }
    scan.include_empty |= include_empty;
    Ok(scan)
}

#[instrument(level = "debug", skip(container))]
fn cmd_parse(
    container: &ServiceContainer,
    file: Option<&Path>,
    format: OutputFormat,
) -> CliResult<()> {
    let tags = read_tags(&container.docblock_service, file)?;
    let label = file
        .map(|f| f.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());
    output::info(&render_tags(&tags, &label, format)?);
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_get(container: &ServiceContainer, key: &str, file: Option<&Path>) -> CliResult<()> {
    let tags = read_tags(&container.docblock_service, file)?;
    let value = DocblockService::value_at(&tags, key)?;
    output::info(value);
    Ok(())
}

#[instrument(level = "debug", skip(container, scan))]
fn cmd_scan(
    container: &ServiceContainer,
    path: &Path,
    scan: &ScanConfig,
    format: OutputFormat,
) -> CliResult<()> {
    let report = container.docblock_service.scan(path, scan)?;
    if report.files_skipped > 0 {
        output::warning(&format!(
            "{} unreadable file(s) skipped, run with -d for details",
            report.files_skipped
        ));
    }
    if format != OutputFormat::Json {
        output::header(&format!(
            "{} doc comment(s) in {} file(s)",
            report.matches.len(),
            report.files_scanned
        ));
    }
    output::info(&render_scan(&report, format)?);
    Ok(())
}

fn cmd_config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: &Path,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => return cmd_config_path(project_dir),
    }
    Ok(())
}

fn cmd_config_path(project_dir: &Path) -> CliResult<()> {
    let global = config::global_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unavailable>".to_string());
    output::action("global", &global);
    output::action("local", &config::local_config_path(project_dir).display());
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

/// Parse the doc comment in `file`, or stdin when absent or `-`.
fn read_tags(service: &DocblockService, file: Option<&Path>) -> CliResult<TagTree> {
    match file {
        Some(path) if path != Path::new("-") => Ok(service.parse_file(path)?),
        _ => {
            let input =
                io::read_to_string(io::stdin()).map_err(|e| InfraError::io("read stdin", e))?;
            Ok(service.parse_str(&input)?)
        }
    }
}

/// Render one tag tree in the given format.
pub fn render_tags(tags: &TagTree, label: &str, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Tree => Ok(tags.to_tree_string(label).to_string().trim_end().to_string()),
        OutputFormat::Json => to_json(tags),
        OutputFormat::Flat => Ok(tags
            .entries()
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .join("\n")),
    }
}

/// Render a scan report in the given format.
pub fn render_scan(report: &ScanReport, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Tree => report
            .matches
            .iter()
            .map(|m| {
                let label = format!("{}:{}", m.path.display(), m.line);
                render_tags(&m.tags, &label, format)
            })
            .collect::<CliResult<Vec<_>>>()
            .map(|blocks| blocks.join("\n")),
        OutputFormat::Flat => Ok(report
            .matches
            .iter()
            .flat_map(|m| {
                m.tags.entries().into_iter().map(move |(key, value)| {
                    format!("{}:{}: {}={}", m.path.display(), m.line, key, value)
                })
            })
            .join("\n")),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ApplicationError::OperationFailed {
            context: "serialize json".to_string(),
            source: Box::new(e),
        }
        .into()
    })
}
