mod analyze;
mod check;
mod config;
mod site;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use poem_atlas::{Dataset, FilterState, Location, LocationType, PopupContent, TypeFilter};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(name = "poetry_map", about = "Tang poetry place-name atlas")]
struct Cli {
    /// Directory holding analyzed_locations.json and poems.json
    #[arg(long, global = true, env = "POETRY_MAP_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Site origin for absolute sitemap URLs
    #[arg(long, global = true, env = "POETRY_MAP_BASE_URL", default_value = config::DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summary statistics
    Stats,
    /// Filter locations by type and name/alias substring
    Search {
        /// "all" or one of: city, mountain, river, lake, region, foreign, landmark
        #[arg(long = "type", default_value = "all")]
        kind: TypeFilter,
        /// Substring of a name, alias or modern name, e.g. "京华"
        #[arg(default_value = "")]
        query: String,
    },
    /// Show one location with its map popup
    Location {
        /// Location id or any of its names, e.g. "changan", "长安", "西安"
        key: String,
    },
    /// Poems and places of one author
    Author { name: String },
    /// Report dangling references, missing coordinates and name collisions
    Check {
        /// Exit non-zero when any issue is found
        #[arg(long)]
        strict: bool,
    },
    /// Link raw poems to a base gazetteer and write the dataset into --data-dir
    Analyze {
        /// Locations without poems (bare array or wrapped)
        #[arg(long)]
        base: PathBuf,
        /// Raw poems: id, title, author, contents
        #[arg(long)]
        poems: PathBuf,
    },
    /// Write the frontend data files and sitemap.xml
    Build {
        #[arg(long, default_value = "site")]
        out: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::new(cli.data_dir, &cli.base_url);
    let load = || config.load_dataset();

    match cli.command {
        Command::Stats => print_json(&load()?.stats()),
        Command::Search { kind, query } => run_search(&load()?, kind, &query),
        Command::Location { key } => run_location(&load()?, &key),
        Command::Author { name } => {
            let dataset = load()?;
            match dataset.author_profile(&name) {
                Some(profile) => print_json(&profile),
                None => bail!("no poems by author {name:?}"),
            }
        }
        Command::Check { strict } => run_check(&load()?, strict),
        Command::Analyze { base, poems } => run_analyze(&config, &base, &poems),
        Command::Build { out } => {
            let summary = site::build(&load()?, &config, &out)?;
            eprintln!(
                "Wrote {} files ({} sitemap routes) to {}",
                summary.files.len(),
                summary.routes,
                out.display()
            );
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  SEARCH MODE: the sidebar list for a type filter + search string
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct SearchHit<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(rename = "type")]
    kind: LocationType,
    poem_count: usize,
}

fn run_search(dataset: &Dataset, kind: TypeFilter, query: &str) -> anyhow::Result<()> {
    let mut state = FilterState::new();
    state.set_type(kind);
    state.set_search(query);

    let hits: Vec<SearchHit> = state
        .derive(dataset)
        .into_iter()
        .map(|l| SearchHit {
            id: &l.id,
            name: &l.name,
            kind: l.kind,
            poem_count: l.poems.len(),
        })
        .collect();

    eprintln!("{} location(s) for type={kind} query={query:?}", hits.len());
    print_json(&hits)
}

// ═══════════════════════════════════════════════════════════════════════
//  LOCATION MODE: record + popup for one place
// ═══════════════════════════════════════════════════════════════════════

#[derive(Serialize)]
struct LocationView<'a> {
    location: &'a Location,
    popup: PopupContent,
}

fn run_location(dataset: &Dataset, key: &str) -> anyhow::Result<()> {
    let Some(location) = dataset
        .location_by_id(key)
        .or_else(|| dataset.location_by_name(key))
    else {
        bail!("no location with id or name {key:?}");
    };

    print_json(&LocationView {
        location,
        popup: PopupContent::for_location(location),
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  CHECK MODE: data-integrity report
// ═══════════════════════════════════════════════════════════════════════

fn run_check(dataset: &Dataset, strict: bool) -> anyhow::Result<()> {
    let report = check::check(dataset);
    print_json(&report)?;

    eprintln!(
        "Checked {} locations, {} poems: {} issue(s)",
        report.locations_checked,
        report.poems_checked,
        report.issues.len()
    );
    if strict && !report.is_clean() {
        bail!("{} integrity issue(s) found", report.issues.len());
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  ANALYZE MODE: base gazetteer + raw poems → data directory
// ═══════════════════════════════════════════════════════════════════════

fn run_analyze(config: &Config, base_path: &Path, poems_path: &Path) -> anyhow::Result<()> {
    let read = |path: &Path| std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()));
    let locations = poem_atlas::parse_locations(&read(base_path)?)
        .with_context(|| format!("invalid gazetteer {}", base_path.display()))?;
    let poems = poem_atlas::parse_poems(&read(poems_path)?)
        .with_context(|| format!("invalid poems {}", poems_path.display()))?;

    let (dataset, summary) = analyze::analyze(locations, poems).context("cannot build keyword matcher")?;

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("cannot create {}", config.data_dir.display()))?;
    site::write_json(
        &config.locations_path(),
        &site::LocationsOut {
            locations: dataset.locations(),
        },
    )?;
    site::write_json(&config.poems_path(), dataset.poems())?;

    eprintln!(
        "Analyzed {} poems: {} mention a place, {} places mentioned",
        summary.poems, summary.poems_with_locations, summary.locations_mentioned
    );
    eprintln!("\nMost mentioned:");
    for loc in poem_atlas::query::rank_by_poem_count(dataset.locations_with_poems()).iter().take(15) {
        eprintln!("  {}: {} poems", loc.name, loc.poems.len());
    }
    Ok(())
}
