//! sheetgen CLI - generate source code from CSV data and a template

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use sheetgen::prelude::*;
use sheetgen::{presets, Severity};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetgen")]
#[command(
    author,
    version,
    about = "Generate source code from tabular data with a marker template"
)]
struct Cli {
    /// Log engine decisions to stderr (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a template and write the generated code
    #[command(alias = "gen")]
    Generate {
        #[command(flatten)]
        input: Input,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit with an error if any diagnostic was recorded
        #[arg(long)]
        strict: bool,
    },

    /// Check a template for unsupported markers and unknown ranges
    Validate {
        #[command(flatten)]
        input: Input,
    },

    /// List built-in templates, or print one
    Presets {
        /// Preset to print
        name: Option<String>,
    },
}

/// Where the project comes from: a saved project file or flags
#[derive(Args)]
struct Input {
    /// Project file (JSON)
    #[arg(short, long, conflicts_with_all = ["template", "files", "ranges", "names"])]
    config: Option<PathBuf>,

    /// Template file
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Built-in template to use instead of a template file
    #[arg(short, long, conflicts_with = "template")]
    preset: Option<String>,

    /// CSV data file, in FILES_LOOP order
    #[arg(short, long = "file", value_name = "CSV")]
    files: Vec<PathBuf>,

    /// Selected range in A1 notation, in RANGES_LOOP order
    #[arg(short, long = "range", value_name = "A1:B2")]
    ranges: Vec<String>,

    /// Named range
    #[arg(short, long = "name", value_name = "NAME=A1:B2")]
    names: Vec<String>,

    /// Default walk direction
    #[arg(short, long, value_parser = parse_direction)]
    direction: Option<Direction>,
}

fn parse_direction(value: &str) -> std::result::Result<Direction, String> {
    value.parse()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            strict,
        } => generate(&input, output.as_deref(), strict),
        Commands::Validate { input } => validate(&input),
        Commands::Presets { name } => show_presets(name.as_deref()),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Build the project configuration from a project file or from flags
fn load_config(input: &Input) -> Result<ProjectConfig> {
    let mut config = match &input.config {
        Some(path) => {
            let mut config = ProjectConfig::load(path)
                .with_context(|| format!("Failed to load project '{}'", path.display()))?;
            if let Some(base) = path.parent() {
                config.resolve_paths(base);
            }
            config
        }
        None => config_from_flags(input)?,
    };

    if let Some(name) = &input.preset {
        if presets::get(name).is_none() {
            bail!("Unknown preset '{}' (see `sheetgen presets`)", name);
        }
        config.set_preset(name.as_str());
    }
    if input.direction.is_some() {
        config.template_direction = input.direction;
    }

    tracing::debug!(
        files = config.excel_files.len(),
        ranges = config.selected_ranges.len(),
        named = config.named_ranges.len(),
        template_type = ?config.template_type,
        "project configured"
    );
    Ok(config)
}

fn config_from_flags(input: &Input) -> Result<ProjectConfig> {
    let mut config = ProjectConfig {
        excel_files: input.files.clone(),
        ..ProjectConfig::default()
    };

    for notation in &input.ranges {
        let range = RangeSpec::parse(notation)
            .with_context(|| format!("Invalid range '{}'", notation))?;
        config.selected_ranges.push(SelectedRange::from(&range));
    }

    for entry in &input.names {
        let (name, notation) = entry
            .split_once('=')
            .with_context(|| format!("Expected NAME=A1:B2, got '{}'", entry))?;
        config
            .named_ranges
            .insert(name.trim().to_string(), notation.trim().to_string());
    }

    match (&input.template, &input.preset) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read template '{}'", path.display()))?;
            config.set_code_template(text);
        }
        (None, Some(_)) => {}
        (None, None) => bail!("Provide --config, --template or --preset"),
    }

    Ok(config)
}

fn generate(input: &Input, output: Option<&Path>, strict: bool) -> Result<()> {
    let config = load_config(input)?;
    let project = Project::open(config).context("Failed to load data files")?;
    let generated = project.generate().context("Failed to resolve template")?;

    report(generated.diagnostics.iter());

    if let Some(output_path) = output {
        std::fs::write(output_path, &generated.text)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!(
            "Wrote {} bytes ({} layout) to '{}'",
            generated.text.len(),
            generated.layout,
            output_path.display()
        );
    } else {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(generated.text.as_bytes())
            .and_then(|_| stdout.write_all(b"\n"))
            .context("Failed to write to stdout")?;
    }

    if strict && !generated.diagnostics.is_empty() {
        bail!("{} diagnostic(s) recorded", generated.diagnostics.len());
    }
    Ok(())
}

fn validate(input: &Input) -> Result<()> {
    let config = load_config(input)?;
    let catalog = config.catalog().context("Invalid ranges")?;
    let template = config.template().context("Failed to resolve template")?;

    let validation = sheetgen::validate(&template, &catalog);

    for marker in &validation.unsupported {
        println!("unsupported marker: {}", marker);
    }
    report(validation.diagnostics.iter());

    if !validation.is_ok() {
        bail!("Template has {} problem(s)", validation.diagnostics.len());
    }
    println!("OK");
    Ok(())
}

fn report<'a>(diagnostics: impl Iterator<Item = &'a Diagnostic>) {
    for diagnostic in diagnostics {
        let label = match diagnostic.severity() {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        eprintln!("{}[{}]: {}", label, diagnostic.kind().as_str(), diagnostic);
    }
}

fn show_presets(name: Option<&str>) -> Result<()> {
    match name {
        Some(name) => {
            let preset = presets::get(name)
                .with_context(|| format!("Unknown preset '{}'", name))?;
            println!("{}", preset.template);
        }
        None => {
            for preset in presets::all() {
                println!("{}\t{}", preset.name, preset.description);
            }
        }
    }
    Ok(())
}
