// Licensed under the Apache-2.0 license

//! Command-line driver for the register export engine.
//!
//! Reads an elaborated design (JSON) and writes the selected artifacts next
//! to `--output`: `<output>.h` / `<output>.svh`, `<output>.sv`,
//! `<output>.xml` and `<output>/docs`.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use registers_export::config::{ExportConfig, HeaderDialect};
use registers_export::diag::LogSink;
use registers_export::emit::{HeaderEmitter, HtmlEmitter, IpxactEmitter, UvmEmitter};
use registers_export::model::{Design, Node};
use registers_export::{export, Emitter};
use simple_logger::SimpleLogger;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum HeaderKind {
    All,
    Verilog,
    C,
}

#[derive(Parser, Debug)]
#[command(
    name = "rdl-export",
    author,
    version,
    about = "Export an elaborated SystemRDL register map"
)]
struct Cli {
    /// Elaborated design as JSON
    #[arg(value_name = "DESIGN")]
    input: PathBuf,

    /// Output base path
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Generate C and/or Verilog header constants (default: all)
    #[arg(long, value_enum, num_args = 0..=1, default_missing_value = "all")]
    header: Option<HeaderKind>,

    /// Generate a UVM register model
    #[arg(long)]
    uvm: bool,

    /// Generate HTML documentation
    #[arg(long)]
    doc: bool,

    /// Generate an IP-XACT description
    #[arg(long)]
    xml: bool,

    /// Skip nodes whose 'ispresent' property is false
    #[arg(short, long)]
    skip_not_present: bool,

    /// Emitter options (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Title of the HTML documentation
    #[arg(long)]
    title: Option<String>,

    /// Footer of the HTML documentation
    #[arg(long)]
    footer: Option<String>,

    /// Home link shown in the HTML documentation
    #[arg(long)]
    home_url: Option<String>,

    /// Print progress
    #[arg(short, long)]
    verbose: bool,

    /// Print debug output
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }

    fn load_config(&self) -> Result<ExportConfig> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_path(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ExportConfig::default(),
        };
        if self.skip_not_present {
            config.skip_not_present = true;
            config.header.skip_not_present = true;
            config.uvm.skip_not_present = true;
            config.ipxact.skip_not_present = true;
            config.html.skip_not_present = true;
        }
        if let Some(title) = &self.title {
            config.html = config.html.title(title);
        }
        if let Some(footer) = &self.footer {
            config.html = config.html.footer(footer);
        }
        if let Some(url) = &self.home_url {
            config.html = config.html.home_url(url);
        }
        Ok(config)
    }
}

/// `<base>.<extension>`, keeping any dots already in the base name.
fn with_suffix(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

fn run<E: Emitter>(what: &str, emitter: &E, top: &Node, destination: &Path) -> Result<()> {
    info!("Generating {what}...");
    let report = export(emitter, top, destination, &LogSink)
        .with_context(|| format!("generating {what} at {}", destination.display()))?;
    info!(
        "Generating {what} done: {} file(s), {} warning(s)",
        report.files.len(),
        report.warnings
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    SimpleLogger::new().with_level(cli.level()).init()?;

    if cli.header.is_none() && !(cli.uvm || cli.doc || cli.xml) {
        bail!("select at least one generator: --header, --uvm, --doc or --xml");
    }

    let config = cli.load_config()?;
    let design = Design::from_path(&cli.input)
        .with_context(|| format!("loading design {}", cli.input.display()))?;
    let top = design.top();
    info!("Loaded '{}' from {}", top.inst_name, cli.input.display());

    let dialects: &[HeaderDialect] = match cli.header {
        Some(HeaderKind::All) => &[HeaderDialect::C, HeaderDialect::Verilog],
        Some(HeaderKind::C) => &[HeaderDialect::C],
        Some(HeaderKind::Verilog) => &[HeaderDialect::Verilog],
        None => &[],
    };
    for dialect in dialects {
        let emitter = HeaderEmitter::new(config.header.clone().dialect(*dialect));
        let destination = with_suffix(&cli.output, dialect.extension());
        run("header", &emitter, top, &destination)?;
    }

    if cli.uvm {
        let emitter = UvmEmitter::new(config.uvm.clone());
        run("UVM register model", &emitter, top, &with_suffix(&cli.output, "sv"))?;
    }

    if cli.doc {
        let emitter = HtmlEmitter::new(config.html.clone());
        run("HTML documentation", &emitter, top, &cli.output.join("docs"))?;
    }

    if cli.xml {
        let emitter = IpxactEmitter::new(config.ipxact.clone());
        run("IP-XACT description", &emitter, top, &with_suffix(&cli.output, "xml"))?;
    }

    Ok(())
}
