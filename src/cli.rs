use crate::config::{Config, load_config, merge_init_config};
use crate::ir::WordList;
use crate::layout::{Viewport, compute_layout};
use crate::layout_dump::write_layout_dump;
use crate::parser::{parse_words, parse_words_json};
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wcr", version, about = "Word cloud layout and renderer in Rust")]
pub struct Args {
    /// Input file (one word per line, or .json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Word or phrase to leave out (repeatable)
    #[arg(long = "exclude")]
    pub exclude: Vec<String>,

    /// Write the computed layout as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

/// Installs a stderr subscriber filtered by `RUST_LOG` (default `warn`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let (input, is_json) = read_input(args.input.as_deref())?;
    let (mut list, config) = load_words(&input, is_json, config)?;
    for value in &args.exclude {
        list.exclude(value.clone());
    }

    let viewport = Viewport::new(config.render.width, config.render.height);
    let mut rasterizer = crate::default_rasterizer(&config);
    let layout = compute_layout(&list, viewport, &config.layout, rasterizer.as_mut())?;
    tracing::info!(
        placed = layout.words.len(),
        dropped = layout.failures.len(),
        "layout computed"
    );
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout)?;
    }

    let svg = render_svg(&layout, &config.theme, &config.render, config.layout.margin);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

fn load_words(input: &str, is_json: bool, config: Config) -> Result<(WordList, Config)> {
    if is_json {
        return Ok((parse_words_json(input)?, config));
    }
    let parsed = parse_words(input)?;
    let config = match parsed.init_config {
        Some(init_cfg) => merge_init_config(config, init_cfg)?,
        None => config,
    };
    Ok((parsed.list, config))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    write_output_png(svg, output, &config.render, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, false));
        }
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        return Ok((content, is_json));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_directive_overrides_config() {
        let input = "%%{init: {\"general\": {\"maxFontSize\": 42}}}%%\ncar\ntruck";
        let (list, config) = load_words(input, false, Config::default()).unwrap();
        assert_eq!(list.occurrences.len(), 2);
        assert_eq!(config.layout.general.max_font_size, 42.0);
    }

    #[test]
    fn json_input_keeps_config() {
        let input = r#"[{"text": "car", "weight": 4}]"#;
        let (list, config) = load_words(input, true, Config::default()).unwrap();
        assert_eq!(list.occurrences[0].weight, 4.0);
        assert_eq!(config.layout.general.max_font_size, 100.0);
    }

    #[test]
    fn png_requires_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        let path = ensure_output(&Some(PathBuf::from("cloud.png")), "png").unwrap();
        assert_eq!(path, PathBuf::from("cloud.png"));
    }

    #[test]
    fn parses_repeatable_excludes() {
        let args = Args::try_parse_from(["wcr", "--exclude", "the", "--exclude", "a", "-w", "640"])
            .unwrap();
        assert_eq!(args.exclude, vec!["the".to_string(), "a".to_string()]);
        assert_eq!(args.width, 640.0);
        assert_eq!(args.height, 800.0);
    }
}
