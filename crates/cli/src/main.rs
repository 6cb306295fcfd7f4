//! httpcache command-line entry point.
//!
//! Runs a single cache operation against the configured endpoint and prints
//! the result as JSON on stdout. Logging goes to stderr so the output stays
//! machine-readable. Point `HTTPCACHE_DB_PATH` (or `--db`) at a file to keep
//! the cache between invocations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use httpcache_client::{HttpConfig, HttpTransport};
use httpcache_core::config::AppConfig;
use httpcache_core::{CacheDb, DocId, Document, FetchOptions, GetOptions, LocalStore, MemoryStore, ResourceCache};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "httpcache", version, about = "Cache-aware client for a remote resource collection")]
struct Cli {
    /// Collection to operate on (overrides HTTPCACHE_COLLECTION).
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Domain prefix for the collection (overrides HTTPCACHE_DOMAIN).
    #[arg(long, global = true)]
    domain: Option<String>,

    /// Endpoint base URL (overrides HTTPCACHE_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// SQLite cache file (overrides HTTPCACHE_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Do not write responses into the cache.
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read one document.
    Get {
        id: String,
        #[arg(long)]
        ignore_cache: bool,
    },
    /// List the collection.
    Fetch {
        #[arg(long)]
        ignore_cache: bool,
        #[arg(long)]
        offset: Option<usize>,
        #[arg(long)]
        index: Option<String>,
        #[arg(long)]
        secondary: Option<String>,
        /// Extra filter parameter, as `name=value`. Repeatable.
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Create a document from a JSON object.
    Create { json: String },
    /// Replace a document; the JSON object must carry its id.
    Update { json: String },
    /// Set one property; `value` is parsed as JSON, falling back to a string.
    Patch { id: String, prop: String, value: String },
    /// Delete a document.
    Delete { id: String },
    /// Drop everything cached for the collection.
    Purge,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))
}

/// Integer-looking ids are sent as integers so they match server documents.
fn parse_id(raw: &str) -> DocId {
    raw.parse::<u64>()
        .map(DocId::from)
        .or_else(|_| raw.parse::<i64>().map(DocId::Int))
        .unwrap_or_else(|_| DocId::from(raw))
}

fn parse_document(raw: &str) -> Result<Document> {
    let value: Value = serde_json::from_str(raw).context("document must be valid JSON")?;
    Ok(Document::try_from(value)?)
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(collection) = &self.collection {
            config.collection = collection.clone();
        }
        if let Some(domain) = &self.domain {
            config.domain = domain.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(db) = &self.db {
            config.db_path = Some(db.clone());
        }
        if self.no_cache {
            config.caching = false;
        }
    }
}

async fn run(cache: &ResourceCache, command: Command) -> Result<Value> {
    let output = match command {
        Command::Get { id, ignore_cache } => {
            let doc = cache.get(parse_id(&id), GetOptions { ignore_cache }).await?;
            serde_json::to_value(doc)?
        }
        Command::Fetch { ignore_cache, offset, index, secondary, params } => {
            let options =
                FetchOptions { ignore_cache, offset, index, secondary, params: params.into_iter().collect() };
            serde_json::to_value(cache.fetch(options).await?)?
        }
        Command::Create { json } => serde_json::to_value(cache.create(parse_document(&json)?).await?)?,
        Command::Update { json } => serde_json::to_value(cache.update(parse_document(&json)?).await?)?,
        Command::Patch { id, prop, value } => {
            serde_json::to_value(cache.patch(parse_id(&id), &prop, parse_value(&value)).await?)?
        }
        Command::Delete { id } => json!({ "deleted": cache.delete(parse_id(&id)).await? }),
        Command::Purge => {
            cache.purge().await?;
            json!({ "purged": cache.cache_key() })
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().context("failed to load configuration")?;
    cli.apply(&mut config);
    config.validate()?;
    config.require_collection()?;

    let transport = HttpTransport::new(HttpConfig {
        base_url: config.base_url.clone(),
        user_agent: config.user_agent.clone(),
        timeout: config.timeout(),
    })?;

    let store: Arc<dyn LocalStore> = match &config.db_path {
        Some(path) => Arc::new(CacheDb::open(path).await?),
        None => Arc::new(MemoryStore::new()),
    };

    tracing::info!(
        collection = %config.collection,
        domain = %config.domain,
        base_url = %transport.base_url(),
        "running httpcache command"
    );

    let cache = ResourceCache::new(config.cache_options(), store, Arc::new(transport));
    let output = run(&cache, cli.command).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
