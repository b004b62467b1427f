//! Replays a scripted property-pane session and prints what the host saw.

mod logging;

use std::fmt::Write as FmtWrite;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;

use propfields::app::{Replay, Scenario};
use propfields::io::{DocumentFormat, OutputDestination, OutputOptions, emit, parse_document_str};

use crate::logging::{LogConfig, init_logging};

#[derive(Debug, Parser)]
#[command(
    name = "propfields",
    version,
    about = "Replay property-pane interactions through the deferred validation pipeline"
)]
struct Cli {
    /// Scenario spec: file path, inline payload, or "-" for stdin
    #[arg(short = 's', long = "scenario", value_name = "SPEC")]
    scenario: String,

    /// Output destinations ("-" writes to stdout). Accepts multiple values per flag use.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,

    /// More log output on stderr (repeat for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug)]
enum InputSource {
    File(PathBuf),
    Stdin,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let log_config =
        LogConfig::from_flags(cli.verbose, cli.quiet).with_ansi(io::stderr().is_terminal());
    init_logging(&log_config).map_err(|err| eyre!("failed to initialise logging: {err}"))?;

    let mut diagnostics = DiagnosticCollector::default();

    let hint = resolve_format_hint(&cli.scenario, &mut diagnostics);
    let scenario = if hint.blocked {
        None
    } else {
        match load_scenario(&cli.scenario, hint.format) {
            Ok(scenario) => Some(scenario),
            Err(err) => {
                diagnostics.push_input(format!("{err:#}"));
                None
            }
        }
    };

    let output_options = build_output_options(&cli, hint.extension_value(), &mut diagnostics);
    diagnostics.into_result()?;

    let (Some(scenario), Some(output_options)) = (scenario, output_options) else {
        return Err(eyre!("nothing to replay"));
    };

    tracing::info!(
        fields = scenario.fields.len(),
        steps = scenario.steps.len(),
        "replaying scenario"
    );
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .wrap_err("failed to start the async runtime")?;
    let report = runtime
        .block_on(Replay::new(scenario).run())
        .map_err(|err| eyre!("replay failed: {err:#}"))?;

    emit(&report, &output_options).map_err(|err| eyre!("{err:#}"))?;
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
struct FormatHint {
    format: DocumentFormat,
    from_extension: bool,
    blocked: bool,
}

impl FormatHint {
    fn extension_value(&self) -> Option<DocumentFormat> {
        self.from_extension.then_some(self.format)
    }
}

fn resolve_format_hint(spec: &str, diagnostics: &mut DiagnosticCollector) -> FormatHint {
    if spec == "-" {
        return FormatHint::default();
    }
    match probe_format_from_extension(Path::new(spec)) {
        ExtensionFormat::Known(format) => FormatHint {
            format,
            from_extension: true,
            blocked: false,
        },
        ExtensionFormat::UnsupportedFeature {
            format_name,
            feature_flag,
        } => {
            diagnostics.push_input(format!(
                "scenario '{spec}' requires {format_name} support, but this build lacks the '{feature_flag}' feature"
            ));
            FormatHint {
                blocked: true,
                ..FormatHint::default()
            }
        }
        ExtensionFormat::Unknown => FormatHint::default(),
    }
}

fn load_scenario(spec: &str, format: DocumentFormat) -> Result<Scenario> {
    let value = load_value(spec, format)?;
    serde_json::from_value(value).wrap_err("document is not a valid scenario")
}

fn load_value(spec: &str, format: DocumentFormat) -> Result<Value> {
    if spec == "-" {
        let contents = read_from_source(&InputSource::Stdin)?;
        return parse_contents(&contents, format, "scenario");
    }

    let path = PathBuf::from(spec);
    if !path.exists() {
        return parse_contents(spec, format, "inline scenario");
    }
    let contents = read_from_source(&InputSource::File(path.clone()))
        .wrap_err_with(|| format!("failed to load scenario from {}", path.display()))?;
    parse_contents(&contents, format, "scenario")
}

fn read_from_source(source: &InputSource) -> Result<String> {
    match source {
        InputSource::Stdin => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .wrap_err("failed to read from stdin")?;
            Ok(buffer)
        }
        InputSource::File(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read file {}", path.display())),
    }
}

fn parse_contents(contents: &str, format: DocumentFormat, label: &str) -> Result<Value> {
    match parse_document_str(contents, format) {
        Ok(value) => Ok(value),
        Err(primary) => {
            for candidate in DocumentFormat::available_formats() {
                if candidate == format {
                    continue;
                }
                if let Ok(value) = parse_document_str(contents, candidate) {
                    return Ok(value);
                }
            }
            Err(Report::msg(format!(
                "failed to parse {label}: tried {} (first error: {primary})",
                format_list()
            )))
        }
    }
}

fn format_list() -> String {
    let items: Vec<String> = DocumentFormat::available_formats()
        .into_iter()
        .map(|fmt| fmt.to_string())
        .collect();
    items.join(", ")
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_input(&mut self, message: impl Into<String>) {
        self.messages
            .push(format!("input (scenario): {}", message.into()));
    }

    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn len(&self) -> usize {
        self.messages.len()
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered input/output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

fn build_output_options(
    cli: &Cli,
    scenario_hint: Option<DocumentFormat>,
    diagnostics: &mut DiagnosticCollector,
) -> Option<OutputOptions> {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
            continue;
        }
        destinations.push(OutputDestination::parse(raw));
    }
    if cli.outputs.is_empty() {
        destinations.push(OutputDestination::Stdout);
    }

    let file_paths: Vec<PathBuf> = destinations
        .iter()
        .filter_map(|dest| match dest {
            OutputDestination::File(path) => Some(path.clone()),
            OutputDestination::Stdout => None,
        })
        .collect();

    let start = diagnostics.len();
    let format = if file_paths.is_empty() {
        scenario_hint.unwrap_or_default()
    } else {
        infer_format_from_files(&file_paths, diagnostics).unwrap_or_default()
    };
    ensure_output_paths_available(&file_paths, cli.force, diagnostics);

    if diagnostics.len() > start || destinations.is_empty() {
        return None;
    }

    Some(
        OutputOptions::new(format)
            .with_pretty(!cli.no_pretty)
            .with_overwrite(cli.force)
            .with_destinations(destinations),
    )
}

fn infer_format_from_files(
    file_paths: &[PathBuf],
    diagnostics: &mut DiagnosticCollector,
) -> Option<DocumentFormat> {
    let mut detected: Option<DocumentFormat> = None;
    for path in file_paths {
        match probe_format_from_extension(path) {
            ExtensionFormat::Known(format) => {
                if let Some(existing) = detected {
                    if existing != format {
                        diagnostics.push_output(format!(
                            "output file {} uses {format} but other destinations use {existing}; align extensions",
                            path.display()
                        ));
                    }
                } else {
                    detected = Some(format);
                }
            }
            ExtensionFormat::UnsupportedFeature {
                format_name,
                feature_flag,
            } => diagnostics.push_output(format!(
                "output file {} requires {format_name} support, but this build was compiled without the '{feature_flag}' feature",
                path.display()
            )),
            ExtensionFormat::Unknown => diagnostics.push_output(format!(
                "cannot infer format from output file {}; use .json/.yaml/.toml",
                path.display()
            )),
        }
    }
    detected
}

fn probe_format_from_extension(path: &Path) -> ExtensionFormat {
    if let Some(format) = DocumentFormat::from_path(path) {
        return ExtensionFormat::Known(format);
    }
    let Some(ext) = path.extension() else {
        return ExtensionFormat::Unknown;
    };
    match ext.to_string_lossy().to_ascii_lowercase().as_str() {
        "yaml" | "yml" => ExtensionFormat::UnsupportedFeature {
            format_name: "yaml",
            feature_flag: "yaml",
        },
        "toml" => ExtensionFormat::UnsupportedFeature {
            format_name: "toml",
            feature_flag: "toml",
        },
        _ => ExtensionFormat::Unknown,
    }
}

#[derive(Debug)]
enum ExtensionFormat {
    Known(DocumentFormat),
    UnsupportedFeature {
        format_name: &'static str,
        feature_flag: &'static str,
    },
    Unknown,
}

fn ensure_output_paths_available(
    paths: &[PathBuf],
    force: bool,
    diagnostics: &mut DiagnosticCollector,
) {
    if force {
        return;
    }
    for path in paths {
        if path.exists() {
            diagnostics.push_output(format!(
                "file {} already exists (pass --force to overwrite)",
                path.display()
            ));
        }
    }
}
