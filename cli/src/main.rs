use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use sassline_core::{Diagnostic, Document, FileCache, FileSettings, Severity};
use tracing::debug;


static TRACE_INIT: Once = Once::new();
const DEFAULT_TRACE_FILTER: &str = "sassline_core=warn,sassline=info";

#[derive(Debug, Parser)]
#[command(name = "sassline", author, version, about = "Formatter and checker for indented Sass", long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, Args)]
struct IndentArgs {
    /// Columns per nesting level
    #[arg(long, default_value_t = 2)]
    tab_size: usize,
    /// Indent with spaces instead of tabs
    #[arg(long)]
    spaces: bool,
}

impl From<IndentArgs> for FileSettings {
    fn from(value: IndentArgs) -> Self {
        FileSettings::new(value.tab_size, value.spaces)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print (or rewrite) files in canonical form.
    Fmt {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
        #[command(flatten)]
        indent: IndentArgs,
    },
    /// Report diagnostics; fails when any error is found.
    Check {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        indent: IndentArgs,
    },
    /// Dump the parsed tree as JSON.
    Ast {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[command(flatten)]
        indent: IndentArgs,
    },
}

fn read_file_content(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))
}

fn uri_of(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Parse `path` into `cache`, returning its URI.
fn load(cache: &mut FileCache, path: &Path, settings: &FileSettings) -> anyhow::Result<String> {
    let text = read_file_content(path)?;
    let uri = uri_of(path);
    cache.parse(&Document::new(uri.clone(), text), settings);
    Ok(uri)
}

/// `path:line:col: severity: message`, one-based.
fn render_diagnostic(path: &Path, diagnostic: &Diagnostic) -> String {
    format!(
        "{}:{}: {}: {}",
        path.display(),
        diagnostic.range.start,
        diagnostic.severity,
        diagnostic.message
    )
}

fn run_fmt(files: &[PathBuf], write: bool, settings: &FileSettings) -> anyhow::Result<()> {
    let mut cache = FileCache::default();
    for path in files {
        let uri = load(&mut cache, path, settings)?;
        let text = cache.stringify_file(&uri, settings)?;
        if write {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write file '{}'", path.display()))?;
            debug!(file = %path.display(), "formatted");
        } else if text.ends_with('\n') {
            print!("{}", text);
        } else {
            println!("{}", text);
        }
    }
    Ok(())
}

fn run_check(files: &[PathBuf], settings: &FileSettings) -> anyhow::Result<()> {
    let mut cache = FileCache::default();
    let mut errors = 0;
    for path in files {
        let uri = load(&mut cache, path, settings)?;
        let Some(file) = cache.file(&uri) else {
            bail!("Failed to parse '{}'", path.display());
        };
        for diagnostic in &file.diagnostics {
            println!("{}", render_diagnostic(path, diagnostic));
            if diagnostic.severity == Severity::Error {
                errors += 1;
            }
        }
    }
    if errors > 0 {
        bail!("{} error(s) found", errors);
    }
    Ok(())
}

fn run_ast(path: &Path, settings: &FileSettings) -> anyhow::Result<()> {
    let mut cache = FileCache::default();
    let uri = load(&mut cache, path, settings)?;
    let Some(file) = cache.file(&uri) else {
        bail!("Failed to parse '{}'", path.display());
    };
    println!("{}", file.to_json()?);
    Ok(())
}

fn init_tracing() {
    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        use tracing_subscriber::fmt;

        let builder = fmt().with_writer(std::io::stderr);
        let builder = match std::env::var("RUST_LOG").ok().and_then(|expr| EnvFilter::try_new(expr).ok()) {
            Some(filter) => builder.with_env_filter(filter),
            None => builder.with_env_filter(DEFAULT_TRACE_FILTER),
        };
        let _ = builder.try_init();
    });
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let CliArgs { command } = CliArgs::parse();
    match command {
        Commands::Fmt { files, write, indent } => run_fmt(&files, write, &indent.into()),
        Commands::Check { files, indent } => run_check(&files, &indent.into()),
        Commands::Ast { file, indent } => run_ast(&file, &indent.into()),
    }
}
