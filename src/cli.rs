use crate::config::{Config, load_config};
use crate::parser::parse_diagrams;
use crate::render::{RenderOptions, render_svg, to_data_uri, write_output_svg};
use crate::schema::{Diagram, ShapeTag};
use crate::validate::{ValidationOptions, ValidationResult, validate_with_config};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "geodiag", version, about = "Validate and render structured geometry diagrams")]
pub struct Args {
    /// Input file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/data URI). Defaults to stdout for text formats.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, render and validation sections)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Treat out-of-bounds coordinates as errors
    #[arg(long)]
    pub strict: bool,

    /// Check coordinates against the wide window instead of the default one
    #[arg(long)]
    pub extended_bounds: bool,

    /// Print the validation result as JSON and skip rendering
    #[arg(long)]
    pub validate_only: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    DataUri,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::DataUri => "txt",
        }
    }
}

pub fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let options = ValidationOptions {
        extended_bounds: args.extended_bounds,
        strict: args.strict,
    };

    let input = read_input(args.input.as_deref())?;
    let diagrams = parse_diagrams(&input)?;
    if diagrams.is_empty() {
        return Err(anyhow::anyhow!("No diagrams found in input"));
    }

    let results: Vec<ValidationResult> = diagrams
        .iter()
        .map(|diagram| validate_with_config(diagram, options, &config.validation))
        .collect();

    if args.validate_only {
        let report = if results.len() == 1 {
            serde_json::to_string_pretty(&results[0])?
        } else {
            serde_json::to_string_pretty(&results)?
        };
        println!("{report}");
    }

    let mut invalid = 0;
    for (idx, (diagram, result)) in diagrams.iter().zip(&results).enumerate() {
        report_findings(idx, diagram, result);
        if !result.is_valid {
            invalid += 1;
        }
    }
    if invalid > 0 {
        return Err(anyhow::anyhow!(
            "{invalid} of {} diagram(s) failed validation",
            diagrams.len()
        ));
    }
    if args.validate_only {
        return Ok(());
    }

    if diagrams.len() == 1 {
        return write_diagram(&diagrams[0], &config, args.output_format, args.output.as_deref());
    }

    let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, diagrams.len())?;
    for (diagram, output) in diagrams.iter().zip(&outputs) {
        write_diagram(diagram, &config, args.output_format, Some(output))?;
    }
    Ok(())
}

fn report_findings(idx: usize, diagram: &Diagram, result: &ValidationResult) {
    let shape_type = diagram
        .shape_type
        .as_ref()
        .map(ShapeTag::as_str)
        .unwrap_or("<missing>");
    for warning in &result.warnings {
        log::warn!(
            diagram = idx + 1,
            shape_type = shape_type,
            field:? = warning.field;
            "{}",
            warning.message
        );
    }
    for issue in &result.errors {
        let field = issue
            .field
            .as_deref()
            .map(|field| format!(" [{field}]"))
            .unwrap_or_default();
        eprintln!(
            "diagram {} ({shape_type}): {} {}: {}{field}",
            idx + 1,
            issue.code.as_str(),
            issue.code.name(),
            issue.message
        );
    }
}

fn write_diagram(
    diagram: &Diagram,
    config: &Config,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let options = RenderOptions::from(config);
    let svg = render_svg(diagram, &options)?;
    match format {
        OutputFormat::Svg => write_output_svg(&svg, output),
        OutputFormat::DataUri => write_output_svg(&to_data_uri(&svg), output),
        OutputFormat::Png => {
            let output = ensure_output(output, "png")?;
            write_png(&svg, output, config)
        }
    }
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the 'png' feature"
    ))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for a diagram batch"))?;
    if base.is_dir() {
        return Ok((1..=count)
            .map(|n| base.join(format!("diagram-{n}.{ext}")))
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("diagram");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok((1..=count)
        .map(|n| parent.join(format!("{stem}-{n}.{ext}")))
        .collect())
}
