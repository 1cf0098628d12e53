//! Command execution and output.

use crate::cli::Command;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use reader_cache::{Database, Repository, StoreHandle, UrlRecord};
use reader_config::{Config, ExtractorKind};
use reader_extract::{ExtractorHandle, MetaExtractor, ProcessExtractor};
use reader_ingest::{HttpFetcher, Reader};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Attach the ingestion status to a failed ingestion.
fn ingest<T>(result: reader_ingest::error::Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            let status = err.status_code();
            Err(err).or_raise(|| ErrorKind::Ingest(status))
        },
    }
}

pub async fn run(config: &Config, command: Command, cancel: &CancellationToken) -> Result<()> {
    // Commands that don't touch the store.
    match &command {
        Command::Clean { url } => {
            println!("{}", reader_canonical::clean(url));
            return Ok(());
        },
        Command::Encode { id } => {
            println!("{}", config.shortener().or_raise(|| ErrorKind::Configuration)?.encode(*id));
            return Ok(());
        },
        Command::Decode { short } => {
            let shortener = config.shortener().or_raise(|| ErrorKind::Configuration)?;
            println!("{}", shortener.decode(short).or_raise(|| ErrorKind::InvalidShortId)?);
            return Ok(());
        },
        _ => {},
    }

    let db = open_database(config).await?;
    let reader = build_reader(config, &db)?;
    let result = execute(&reader, command, cancel).await;
    db.close().await;
    result
}

async fn execute(reader: &Reader, command: Command, cancel: &CancellationToken) -> Result<()> {
    match command {
        Command::Add { url } => {
            let record = ingest(reader.add_url(cancel, &url).await)?;
            print_summary(reader, &record);
        },
        Command::Update { id } => {
            let record = ingest(reader.update_url(cancel, &id).await)?;
            print_summary(reader, &record);
        },
        Command::Show { id, html } => print_article(reader, &ingest(reader.view(&id).await)?, html),
        Command::Random => print_article(reader, &ingest(reader.random().await)?, false),
        Command::List => {
            for record in ingest(reader.list().await)? {
                println!("{}\t{}\t{}\t{}", reader.short_id(&record), record.id, record.url, record.article.title);
            }
        },
        Command::Clean { .. } | Command::Encode { .. } | Command::Decode { .. } => {},
    }
    Ok(())
}

async fn open_database(config: &Config) -> Result<Database> {
    if let Some(parent) = config.database.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Database)?;
    }
    Database::connect(&config.database).await.or_raise(|| ErrorKind::Database)
}

fn build_reader(config: &Config, db: &Database) -> Result<Reader> {
    let store: StoreHandle = Arc::new(Repository::from(db));
    let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout()).or_raise(|| ErrorKind::Fetcher)?;
    let extractor: ExtractorHandle = match config.extractor.kind {
        ExtractorKind::Process => {
            let settings = &config.extractor;
            let mut extractor = match &settings.node {
                Some(node) => ProcessExtractor::new(node),
                None => ProcessExtractor::discover(),
            }
            .or_raise(|| ErrorKind::Extractor)?;
            if let Some(script) = &settings.script {
                extractor = extractor.with_script(script);
            }
            if let Some(node_path) = &settings.node_path {
                extractor = extractor.with_node_path(node_path);
            }
            tracing::debug!(node = %extractor.node().display(), script = %extractor.script().display(), "Using readability");
            Arc::new(extractor)
        },
        ExtractorKind::Meta => Arc::new(MetaExtractor::new()),
    };
    let shortener = config.shortener().or_raise(|| ErrorKind::Configuration)?;
    Ok(Reader::new(store, Arc::new(fetcher), extractor).with_shortener(shortener))
}

fn print_summary(reader: &Reader, record: &UrlRecord) {
    println!("{}\t{}\t{}", reader.short_id(record), record.url, record.article.title);
}

fn print_article(reader: &Reader, record: &UrlRecord, html: bool) {
    let article = &record.article;
    println!("{}", article.title);
    println!("{} ({})", record.url, reader.short_id(record));
    if !article.byline.is_empty() {
        println!("{}", article.byline);
    }
    println!();
    println!("{}", if html { &article.content } else { &article.text_content });
}
