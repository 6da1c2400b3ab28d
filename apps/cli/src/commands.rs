//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use sitegen_core::{
    CorpusStats, FrequencyStore, Provenance, Synthesis, Synthesizer, aggregate,
    aggregate_parallel, read_dsl, write_atomic, write_site,
};
use sitegen_extract::RawInput;
use sitegen_fetch::{Fetcher, ScrapeProgress, parse_url_list};
use sitegen_render::PageRenderer;
use sitegen_shared::{
    AppConfig, ExtractionConfig, FetchConfig, SiteRecord, expand_home, init_config, load_config,
};
use tracing::{info, warn};
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SiteGen: synthesize websites from descriptions and learned layouts.
#[derive(Parser)]
#[command(
    name = "sitegen",
    version,
    about = "Synthesize single-page websites from a description or an existing page.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate a site from a free-text description.
    Generate {
        /// Description of the desired site.
        text: String,

        /// Output directory (defaults to `[defaults] output_dir`).
        #[arg(short, long)]
        out: Option<String>,

        /// Frequency store snapshot (defaults to `[defaults] store_path`).
        #[arg(long)]
        store: Option<String>,
    },

    /// Generate a site modelled on an existing page (URL or local HTML file).
    Clone {
        /// `http(s)://` URL or path to an HTML file.
        source: String,

        #[arg(short, long)]
        out: Option<String>,

        #[arg(long)]
        store: Option<String>,
    },

    /// Scrape a list of URLs into a corpus file.
    Scrape {
        /// File with one URL per line (`#` starts a comment).
        #[arg(long)]
        urls: String,

        /// Corpus JSON to write.
        #[arg(long)]
        out: String,

        /// Maximum concurrent requests.
        #[arg(long, default_value = "4")]
        concurrency: usize,
    },

    /// Build a frequency store snapshot from a corpus file.
    Aggregate {
        /// Corpus JSON produced by `scrape`.
        #[arg(long)]
        corpus: String,

        /// Store snapshot to write.
        #[arg(long)]
        out: String,

        /// Tally the corpus on all cores.
        #[arg(long)]
        parallel: bool,
    },

    /// Render a stored DSL into HTML.
    Render {
        /// `dsl.json` or a directory containing one.
        #[arg(long)]
        dsl: String,

        /// Headline and description copy.
        #[arg(long, default_value = "")]
        text: String,

        #[arg(short, long)]
        out: Option<String>,
    },

    /// Print category and component counts for a corpus file.
    Stats {
        #[arg(long)]
        corpus: String,

        /// Print as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

const LOG_TARGETS: &[&str] = &[
    "sitegen",
    "sitegen_shared",
    "sitegen_extract",
    "sitegen_core",
    "sitegen_render",
    "sitegen_fetch",
];

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate { text, out, store } => {
            cmd_generate(&text, out.as_deref(), store.as_deref())
        }
        Command::Clone { source, out, store } => {
            cmd_clone(&source, out.as_deref(), store.as_deref()).await
        }
        Command::Scrape {
            urls,
            out,
            concurrency,
        } => cmd_scrape(&urls, &out, concurrency).await,
        Command::Aggregate {
            corpus,
            out,
            parallel,
        } => cmd_aggregate(&corpus, &out, parallel),
        Command::Render { dsl, text, out } => cmd_render(&dsl, &text, out.as_deref()),
        Command::Stats { corpus, json } => cmd_stats(&corpus, json),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load the store snapshot, or an empty store when none has been built yet.
fn load_store(config: &AppConfig, store: Option<&str>) -> Result<Arc<FrequencyStore>> {
    let path = expand_home(store.unwrap_or(config.defaults.store_path.as_str()));
    if !path.exists() {
        warn!(path = %path.display(), "no store snapshot found, using built-in defaults");
        return Ok(Arc::new(FrequencyStore::empty()));
    }
    Ok(Arc::new(FrequencyStore::load(&path)?))
}

fn output_dir(config: &AppConfig, out: Option<&str>) -> PathBuf {
    expand_home(out.unwrap_or(config.defaults.output_dir.as_str()))
}

fn read_corpus(path: &str) -> Result<Vec<SiteRecord>> {
    let content =
        std::fs::read_to_string(path).map_err(|e| eyre!("cannot read corpus '{path}': {e}"))?;
    let records: Vec<SiteRecord> =
        serde_json::from_str(&content).map_err(|e| eyre!("invalid corpus '{path}': {e}"))?;
    Ok(records)
}

fn synthesize_to_disk(
    input: RawInput,
    out: Option<&str>,
    store: Option<&str>,
) -> Result<()> {
    let config = load_config()?;
    let store = load_store(&config, store)?;
    let synth = Synthesizer::from_config(&config, store)?;

    let Synthesis { plan, page } = synth.synthesize(&input)?;

    let dir = output_dir(&config, out);
    let provenance = Provenance {
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: Some(synth.classifier_name().to_string()),
        input: input.kind().to_string(),
    };
    let manifest = write_site(&dir, &plan.dsl, &page, &provenance)?;

    println!();
    println!("  Site generated!");
    println!("  Type:       {}", manifest.site_type);
    println!("  Style:      {}", manifest.style);
    println!("  Confidence: {:.2}", manifest.confidence);
    println!("  Sections:   {}", manifest.sections.join(", "));
    if !manifest.dropped.is_empty() {
        println!("  Dropped:    {}", manifest.dropped.join(", "));
    }
    println!("  Path:       {}", dir.display());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_generate(text: &str, out: Option<&str>, store: Option<&str>) -> Result<()> {
    info!(chars = text.len(), "generating site from description");
    synthesize_to_disk(RawInput::Text(text.to_string()), out, store)
}

async fn cmd_clone(source: &str, out: Option<&str>, store: Option<&str>) -> Result<()> {
    let html = if source.starts_with("http://") || source.starts_with("https://") {
        let url = Url::parse(source).map_err(|e| eyre!("invalid URL '{source}': {e}"))?;
        let config = load_config()?;
        let fetcher = Fetcher::new(FetchConfig::from(&config))?;

        let spinner = spinner(&format!("Fetching {url}"));
        let page = fetcher.fetch_page(&url).await;
        spinner.finish_and_clear();
        page?.html
    } else {
        std::fs::read_to_string(source).map_err(|e| eyre!("cannot read '{source}': {e}"))?
    };

    info!(source, bytes = html.len(), "cloning page");
    synthesize_to_disk(RawInput::Html(html), out, store)
}

async fn cmd_scrape(urls_path: &str, out: &str, concurrency: usize) -> Result<()> {
    let content =
        std::fs::read_to_string(urls_path).map_err(|e| eyre!("cannot read '{urls_path}': {e}"))?;
    let urls = parse_url_list(&content)?;
    if urls.is_empty() {
        return Err(eyre!("no URLs found in '{urls_path}'"));
    }

    let config = load_config()?;
    let fetch_config = FetchConfig::from(&config);
    let total = urls.len().min(fetch_config.max_pages);
    let fetcher = Fetcher::new(fetch_config)?;

    info!(urls = urls.len(), concurrency, "scraping corpus");

    let progress = Arc::new(CliProgress::new(total));
    let report = fetcher
        .scrape_many(
            &urls,
            &ExtractionConfig::from(&config),
            concurrency,
            progress.clone(),
        )
        .await;
    progress.bar.finish_and_clear();

    let json = serde_json::to_string_pretty(&report.records)?;
    write_atomic(Path::new(out), &json)?;

    println!();
    println!("  Corpus written!");
    println!("  Records: {}", report.records.len());
    println!("  Failed:  {}", report.errors.len());
    for (url, error) in &report.errors {
        println!("           {url}: {error}");
    }
    if report.skipped > 0 {
        println!("  Skipped: {} (max_pages)", report.skipped);
    }
    println!("  Path:    {out}");
    println!("  Time:    {:.1}s", report.duration.as_secs_f64());
    println!();

    Ok(())
}

fn cmd_aggregate(corpus: &str, out: &str, parallel: bool) -> Result<()> {
    let records = read_corpus(corpus)?;
    info!(records = records.len(), parallel, "aggregating corpus");

    let store = if parallel {
        aggregate_parallel(&records)
    } else {
        aggregate(&records)
    };
    store.save(Path::new(out))?;

    println!();
    println!("  Store built!");
    println!("  Records:    {}", records.len());
    println!("  Site types: {}", store.layouts().len());
    println!("  Rules:      {}", store.variant_rules().len());
    println!("  Path:       {out}");
    println!();

    Ok(())
}

fn cmd_render(dsl_path: &str, text: &str, out: Option<&str>) -> Result<()> {
    let dsl = read_dsl(Path::new(dsl_path))?;
    let page = PageRenderer::default().render(&dsl, text);

    let config = load_config()?;
    let dir = output_dir(&config, out);
    let provenance = Provenance {
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        classifier: None,
        input: "dsl".to_string(),
    };
    write_site(&dir, &dsl, &page, &provenance)?;

    println!("Rendered {} sections to {}", page.rendered.len(), dir.display());
    Ok(())
}

fn cmd_stats(corpus: &str, json: bool) -> Result<()> {
    let records = read_corpus(corpus)?;
    let stats = CorpusStats::from_records(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("  Records: {}", stats.records);
    for (title, rows) in [
        ("Site types", &stats.site_types),
        ("Styles", &stats.styles),
        ("Components", &stats.components),
    ] {
        println!();
        println!("  {title}:");
        for (name, count) in rows {
            println!("    {name:<20} {count:>6}");
        }
    }
    println!();

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporting
// ---------------------------------------------------------------------------

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Scrape progress as an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl ScrapeProgress for CliProgress {
    fn page_done(&self, url: &str, ok: bool, done: usize, _total: usize) {
        self.bar.set_position(done as u64);
        self.bar
            .set_message(format!("{} {url}", if ok { "ok" } else { "failed" }));
    }
}
