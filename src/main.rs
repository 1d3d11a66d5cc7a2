//! Shaper SVG fixup CLI
//!
//! Usage:
//!   fixup-shaper-svg [OPTIONS] [INFILE] [OUTFILE]
//!
//! Reads from stdin and writes to stdout when a file is missing or `-`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{info, LevelFilter};

use shaper_svg_fixup::{fixup_svg, FixupConfig, FixupError};

#[derive(Parser)]
#[command(name = "fixup-shaper-svg")]
#[command(about = "Fix lengths and styles in FreeCAD SVG exports for Shaper Origin")]
struct Cli {
    /// Input SVG file (reads from stdin if not provided or `-`)
    infile: Option<PathBuf>,

    /// Output SVG file (writes to stdout if not provided or `-`)
    outfile: Option<PathBuf>,

    /// Additional style property to remove (repeatable)
    #[arg(long = "strip-property", value_name = "NAME")]
    strip_properties: Vec<String>,

    /// Keep `fill-rule` declarations in style attributes
    #[arg(long)]
    keep_fill_rule: bool,

    /// Don't collapse whitespace in length values
    #[arg(long)]
    no_lengths: bool,

    /// Don't touch style attributes
    #[arg(long)]
    no_styles: bool,

    /// Log more (-v for a summary, -vv for every rewritten attribute)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> FixupConfig {
        let mut config = FixupConfig::new()
            .with_normalize_lengths(!self.no_lengths)
            .with_sanitize_styles(!self.no_styles);
        if self.keep_fill_rule {
            config = config.without_removed_style_property("fill-rule");
        }
        for property in &self.strip_properties {
            config = config.with_removed_style_property(property.as_str());
        }
        config
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

/// `None` stands for the standard stream
fn file_arg(path: &Option<PathBuf>) -> Option<&Path> {
    path.as_deref().filter(|p| p.as_os_str() != "-")
}

fn read_input(path: Option<&Path>) -> Result<String, FixupError> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| FixupError::Read {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| FixupError::Read {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&Path>, output: &str) -> Result<(), FixupError> {
    match path {
        Some(path) => fs::write(path, output).map_err(|source| FixupError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(|source| FixupError::Write {
                    path: PathBuf::from("<stdout>"),
                    source,
                })
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let infile = file_arg(&cli.infile);
    let outfile = file_arg(&cli.outfile);
    let filename = infile
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let source = match read_input(infile) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Nothing is written unless the whole document was processed
    let output = match fixup_svg(&source, &cli.config()) {
        Ok((output, report)) => {
            info!("{}: {} attributes rewritten", filename, report.changed());
            output
        }
        Err(e) => {
            eprintln!("{}", e.format(&source, &filename));
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_output(outfile, &output) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
