use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use actor_search::locale::{DirLocaleLoader, HttpLocaleLoader};
use actor_search::search::config::REFERENCE_LOCALE;
use actor_search::{Actor, ActorCatalog, ActorSearchService, LocaleLoader, SearchConfig, Translation};

/// Localized fuzzy search over a game's actor catalog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file listing the actors (`[[actor]]` tables with `id` and `name`)
    #[arg(long, env = "ACTOR_SEARCH_CATALOG")]
    catalog: PathBuf,

    /// Directory holding `<locale>.json` translation bundles
    #[arg(long, env = "ACTOR_SEARCH_LOCALES_DIR", conflicts_with = "locales_url")]
    locales_dir: Option<PathBuf>,

    /// Base URL serving `<locale>.json` translation bundles
    #[arg(long, env = "ACTOR_SEARCH_LOCALES_URL")]
    locales_url: Option<String>,

    /// Locale to search in
    #[arg(long, env = "ACTOR_SEARCH_LOCALE", default_value = REFERENCE_LOCALE)]
    locale: String,

    /// Optional TOML file with search tuning
    #[arg(long, env = "ACTOR_SEARCH_CONFIG")]
    config: Option<PathBuf>,

    /// Queries to run; an empty query prints `null`
    #[arg(required = true)]
    queries: Vec<String>,
}

enum CliLoader {
    Dir(DirLocaleLoader),
    Http(HttpLocaleLoader),
}

impl LocaleLoader for CliLoader {
    async fn load_locale(&self, locale: &str) -> Result<Translation> {
        match self {
            CliLoader::Dir(loader) => loader.load_locale(locale).await,
            CliLoader::Http(loader) => loader.load_locale(locale).await,
        }
    }
}

#[derive(Serialize)]
struct MatchedActor<'a> {
    id: Actor,
    name: &'a str,
}

#[derive(Serialize)]
struct QueryResult<'a> {
    query: &'a str,
    results: Option<Vec<MatchedActor<'a>>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let loader = match (args.locales_dir, args.locales_url) {
        (Some(dir), _) => CliLoader::Dir(DirLocaleLoader::new(dir)),
        (None, Some(url)) => CliLoader::Http(HttpLocaleLoader::new(url)),
        (None, None) => bail!("Either --locales-dir or --locales-url is required"),
    };

    let config = match &args.config {
        Some(path) => SearchConfig::from_toml_file(path)?,
        None => SearchConfig::default(),
    };

    let catalog = ActorCatalog::from_toml_file(&args.catalog)?;
    tracing::info!("Loaded {} actors from {}", catalog.len(), args.catalog.display());

    let service = ActorSearchService::with_config(catalog, loader, config)?;
    let translation = service.loader().load_locale(&args.locale).await?;
    service.initialize(&args.locale, &translation).await?;

    let search = service.current();
    let catalog = service.catalog();
    let output: Vec<QueryResult> = args
        .queries
        .iter()
        .map(|query| QueryResult {
            query,
            results: search.search(query).map(|actors| {
                actors
                    .into_iter()
                    .map(|id| MatchedActor {
                        id,
                        name: catalog.name(id).unwrap_or_default(),
                    })
                    .collect()
            }),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
