//! html2gmi: CLI tool to convert HTML documents to Gemini gemtext

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use config::{CONFIG_FILE_NAME, Config};
use html2gmi_core::{RenderOptions, render_bytes};

#[derive(Parser, Debug)]
#[command(name = "html2gmi")]
#[command(about = "Convert HTML documents to Gemini gemtext")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = "Examples:
  html2gmi page.html                # Convert single file to page.gmi
  html2gmi page.html -o out.gmi     # Convert to specific output file
  cat page.html | html2gmi          # Read stdin, write stdout
  html2gmi site/ -o capsule/ -r     # Convert directory tree
  html2gmi site/ -o capsule/ -j4    # Use 4 parallel jobs
  html2gmi init                     # Write a sample _html2gmi.toml")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    convert: ConvertArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a sample configuration file
    Init {
        /// Output path (defaults to _html2gmi.toml in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the JSON schema of the configuration file instead
        #[arg(long)]
        schema: bool,
    },
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Input HTML file or directory (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Output file or directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of parallel jobs (defaults to number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Process directories recursively
    #[arg(short, long)]
    recursive: bool,

    /// Configuration file (defaults to _html2gmi.toml next to the input)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Draw tables as text grids
    #[arg(long)]
    pretty_tables: bool,

    /// Drop links, keeping only their text
    #[arg(long)]
    omit_links: bool,

    /// Number of the first citation
    #[arg(long, value_name = "N")]
    citation_start: Option<usize>,

    /// Do not write [n] markers after linked text
    #[arg(long)]
    no_citation_markers: bool,

    /// Leave [n] out of link lines
    #[arg(long)]
    no_numbered_links: bool,

    /// Paragraphs between link-line blocks
    #[arg(long, value_name = "N")]
    link_emit_frequency: Option<usize>,

    /// Do not cite image sources as links
    #[arg(long)]
    no_images_as_links: bool,

    /// Text shown before image descriptions
    #[arg(long, value_name = "TEXT")]
    image_marker_prefix: Option<String>,

    /// Link text for links that wrap only an image
    #[arg(long, value_name = "TEXT")]
    empty_link_prefix: Option<String>,

    /// Word limit below which a lone link becomes a link line
    #[arg(long, value_name = "N")]
    link_word_threshold: Option<usize>,

    /// Keep <nav> and <footer> content
    #[arg(long)]
    keep_navigation: bool,

    /// Print the parsed node tree as JSON instead of gemtext
    #[arg(long)]
    dump_tree: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,
}

impl ConvertArgs {
    /// Overlay command-line flags onto `options`
    fn apply(&self, options: &mut RenderOptions) {
        if self.pretty_tables {
            options.pretty_tables = true;
        }
        if self.omit_links {
            options.omit_links = true;
        }
        if let Some(n) = self.citation_start {
            options.citation_start = n;
        }
        if self.no_citation_markers {
            options.citation_markers = false;
        }
        if self.no_numbered_links {
            options.numbered_links = false;
        }
        if let Some(n) = self.link_emit_frequency {
            options.link_emit_frequency = n;
        }
        if self.no_images_as_links {
            options.emit_images_as_links = false;
        }
        if let Some(prefix) = &self.image_marker_prefix {
            options.image_marker_prefix = prefix.clone();
        }
        if let Some(prefix) = &self.empty_link_prefix {
            options.empty_link_prefix = prefix.clone();
        }
        if let Some(n) = self.link_word_threshold {
            options.list_item_link_word_threshold = n;
        }
        if self.keep_navigation {
            options.skip_navigation = false;
        }
    }

    /// Input path, or `None` for stdin
    fn input_path(&self) -> Option<&Path> {
        self.input
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
    }
}

/// Settings shared by every file of one run
struct Settings {
    options: RenderOptions,
    dump_tree: bool,
    verbose: bool,
    quiet: bool,
}

impl Settings {
    fn extension(&self) -> &'static str {
        if self.dump_tree { "json" } else { "gmi" }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.convert.verbose);

    match cli.command {
        Some(Commands::Init { output, schema }) => init_config(output.as_deref(), schema),
        None => run(&cli.convert),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Write a sample config file, or print the JSON schema
fn init_config(output: Option<&Path>, schema: bool) -> Result<()> {
    if schema {
        let json = Config::json_schema_string()?;
        match output {
            Some(path) => fs::write(path, json + "\n")
                .with_context(|| format!("Failed to write: {}", path.display()))?,
            None => println!("{}", json),
        }
        return Ok(());
    }

    let path = output.unwrap_or(Path::new(CONFIG_FILE_NAME));
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }

    let content = Config::sample().to_toml_with_schema()?;
    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))?;
    eprintln!("Created {}", path.display());

    Ok(())
}

fn run(args: &ConvertArgs) -> Result<()> {
    let input = args.input_path();

    let config = match &args.config {
        Some(path) => Some(Config::load(path)?),
        None => match input {
            Some(path) if path.is_dir() => Config::load_from_dir(path)?,
            Some(path) => match path.parent() {
                Some(parent) => Config::load_from_dir(parent)?,
                None => None,
            },
            None => Config::load_from_dir(Path::new("."))?,
        },
    };

    let mut options = RenderOptions::default();
    if let Some(config) = &config {
        tracing::debug!("applying configuration file");
        config.apply(&mut options);
    }
    args.apply(&mut options);
    tracing::debug!(?options, "resolved render options");

    let settings = Settings {
        options,
        dump_tree: args.dump_tree,
        verbose: args.verbose,
        quiet: args.quiet,
    };

    match input {
        None => convert_stdin(args.output.as_deref(), &settings),
        Some(path) if path.is_file() => convert_file(path, args.output.as_deref(), &settings),
        Some(path) if path.is_dir() => convert_directory(
            path,
            args.output.as_deref(),
            args.recursive,
            args.jobs,
            &settings,
        ),
        Some(path) => anyhow::bail!("Input path does not exist: {}", path.display()),
    }
}

/// Convert HTML read from stdin, writing to `output` or stdout
fn convert_stdin(output: Option<&Path>, settings: &Settings) -> Result<()> {
    let mut bytes = Vec::new();
    io::stdin()
        .read_to_end(&mut bytes)
        .context("Failed to read stdin")?;

    let text = convert_html(&bytes, settings)?;

    match output {
        Some(path) => write_output(path, &text)?,
        None => println!("{}", text),
    }

    Ok(())
}

/// Convert a single HTML file
fn convert_file(input: &Path, output: Option<&Path>, settings: &Settings) -> Result<()> {
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => input.with_extension(settings.extension()),
    };

    if settings.verbose {
        eprintln!(
            "Converting: {} -> {}",
            input.display(),
            output_path.display()
        );
    }

    convert_file_inner(input, &output_path, settings)?;

    if !settings.quiet {
        println!("{}", output_path.display());
    }

    Ok(())
}

/// Convert a directory of HTML files
fn convert_directory(
    input: &Path,
    output: Option<&Path>,
    recursive: bool,
    jobs: Option<usize>,
    settings: &Settings,
) -> Result<()> {
    let output_dir = output.unwrap_or(input);

    let files = collect_html_files(input, recursive)?;

    if files.is_empty() {
        if !settings.quiet {
            eprintln!("No HTML files found in {}", input.display());
        }
        return Ok(());
    }

    let total = files.len();
    if settings.verbose {
        eprintln!("Found {} HTML files", total);
    }

    if let Some(n) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let success = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let errors: Vec<_> = files
        .par_iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(input).unwrap_or(file);
            let output_file = output_dir
                .join(relative)
                .with_extension(settings.extension());

            match convert_file_inner(file, &output_file, settings) {
                Ok(()) => {
                    success.fetch_add(1, Ordering::Relaxed);
                    if !settings.quiet {
                        println!("{}", output_file.display());
                    }
                    None
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    Some((file.clone(), e))
                }
            }
        })
        .collect();

    for (file, e) in &errors {
        eprintln!("Error converting {}: {:#}", file.display(), e);
    }

    let success_count = success.load(Ordering::Relaxed);
    let failed_count = failed.load(Ordering::Relaxed);

    if !settings.quiet {
        eprintln!("Converted {} files, {} failed", success_count, failed_count);
    }

    if failed_count > 0 {
        anyhow::bail!("{} files failed to convert", failed_count);
    }

    Ok(())
}

/// Inner conversion function that doesn't print (for parallel use)
fn convert_file_inner(input: &Path, output: &Path, settings: &Settings) -> Result<()> {
    let bytes = fs::read(input).with_context(|| format!("Failed to read: {}", input.display()))?;

    let text = convert_html(&bytes, settings)
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    write_output(output, &text)
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut content = text.to_string();
    if !content.is_empty() {
        content.push('\n');
    }
    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))
}

/// Collect all HTML files in a directory
fn collect_html_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if is_html_file(&path) {
                files.push(path);
            }
        } else if path.is_dir() && recursive {
            files.extend(collect_html_files(&path, recursive)?);
        }
    }

    files.sort();
    Ok(files)
}

fn is_html_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| {
        ["html", "htm", "xhtml"]
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Core conversion function
fn convert_html(bytes: &[u8], settings: &Settings) -> Result<String> {
    if settings.dump_tree {
        let tree = html2gmi_dom::parse_bytes(bytes).context("Failed to decode HTML")?;
        return tree
            .to_json_pretty()
            .context("Failed to serialize node tree");
    }

    render_bytes(bytes, &settings.options).context("Failed to render HTML")
}
