//! Command-line interface for template-driven FHIR conversion

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use octofhir_converter::model::context_from_json;
use octofhir_converter::{ConversionRequest, ConverterConfig, ConverterEngine};
use serde_json::Value as JsonValue;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "octofhir-converter")]
#[command(about = "Convert flat clinical data into FHIR resources using templates")]
#[command(version)]
#[command(author = "OctoFHIR Team <funyloony@gmail.com>")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Template directory, overrides the configuration
    #[arg(short, long, global = true)]
    templates: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert request files ({resourceType, inputData, validate}) into resources
    Convert {
        /// Conversion request JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Validate every resource regardless of the request flag
        #[arg(long)]
        validate: bool,
        /// Serialize resources without indentation
        #[arg(long)]
        compact: bool,
    },
    /// Render a template and print the raw text
    Render {
        /// Resource type selecting the template
        resource_type: String,
        /// JSON object with input data (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// List available templates
    Templates,
}

#[tokio::main]
async fn main() {
    // Setup human-panic for better error messages
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

/// Returns whether every conversion succeeded
async fn run(cli: Cli) -> Result<bool> {
    let mut config = match &cli.config {
        Some(path) => ConverterConfig::from_json_file(path)?,
        None => ConverterConfig::default(),
    };
    if let Some(dir) = cli.templates {
        config.templates_dir = dir;
    }

    match cli.command {
        Commands::Convert {
            files,
            validate,
            compact,
        } => {
            if compact {
                config.pretty_print = false;
            }
            handle_convert(ConverterEngine::new(config), &files, validate).await
        }
        Commands::Render {
            resource_type,
            input,
        } => {
            handle_render(&ConverterEngine::new(config), &resource_type, input.as_deref())?;
            Ok(true)
        }
        Commands::Templates => {
            handle_templates(&ConverterEngine::new(config));
            Ok(true)
        }
    }
}

async fn handle_convert(engine: ConverterEngine, files: &[PathBuf], validate: bool) -> Result<bool> {
    let mut requests = Vec::with_capacity(files.len());
    for file in files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("Error reading request file '{}'", file.display()))?;
        let mut request: ConversionRequest = serde_json::from_str(&text)
            .with_context(|| format!("Error parsing request file '{}'", file.display()))?;
        request.validate |= validate;
        requests.push(request);
    }

    let results = engine.convert_all(requests).await;
    let mut all_succeeded = true;
    for (file, result) in files.iter().zip(&results) {
        all_succeeded &= result.success;
        if !result.success {
            log::warn!("{}: conversion failed", file.display());
        }
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    Ok(all_succeeded)
}

fn handle_render(engine: &ConverterEngine, resource_type: &str, input: Option<&Path>) -> Result<()> {
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Error reading input file '{}'", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Error reading from stdin")?;
            buffer
        }
    };

    let JsonValue::Object(data) =
        serde_json::from_str::<JsonValue>(&text).context("Error parsing input JSON")?
    else {
        bail!("Input data must be a JSON object");
    };

    let rendered = engine.render(resource_type, &context_from_json(data))?;
    println!("{rendered}");
    Ok(())
}

fn handle_templates(engine: &ConverterEngine) {
    let templates = engine.available_templates();
    if templates.is_empty() {
        eprintln!(
            "No templates found in {}",
            engine.config().templates_dir.display()
        );
    }
    for name in templates {
        println!("{name}");
    }
}
