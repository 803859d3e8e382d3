//! Queer Memory listings in the terminal
//!
//! Runs the search, cities and countries listings against Wikidata and
//! prints partial results as each source answers.

use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use queer_memory::catalog::Vocabulary;
use queer_memory::i18n::{system_locale, Dictionary, Translator};
use queer_memory::listings::search::SearchLimits;
use queer_memory::prefs::{system_prefers_dark, PreferenceStore, Preferences};
use queer_memory::session::{Command, Session, HELP};
use queer_memory::utils::init_logging;
use queer_memory::{Aggregator, AppConfig, WikidataClient};

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_logging()?;

    println!("\n{}", "═".repeat(60));
    println!("🏳️‍🌈 Queer Memory v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "═".repeat(60));
    println!("Endpoint: {}", config.endpoint);
    println!("{}\n", "═".repeat(60));

    let vocabulary = match &config.vocabulary_path {
        Some(path) => Vocabulary::load(path).await?,
        None => Vocabulary::default(),
    };

    let mut dictionary = Dictionary::builtin();
    if let Some(path) = &config.dictionary_path {
        dictionary.extend(Dictionary::load(path).await?);
        info!("Loaded dictionary overlay from {}", path.display());
    }

    let store = PreferenceStore::new(&config.prefs_path);
    let prefs = store.load().await.unwrap_or_else(|e| {
        warn!("Ignoring unreadable preferences: {:#}", e);
        Preferences::default()
    });

    let locale = system_locale();
    let lang = dictionary.resolve_lang(config.lang.as_deref(), prefs.lang.as_deref(), locale.as_deref());
    let translator = Translator::new(Arc::new(dictionary), &lang);
    info!("Language: {}", translator.lang());

    let client = Arc::new(WikidataClient::from_config(&config));
    let aggregator = Aggregator::new(client).with_timeout(config.query_timeout);

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            println!("\n{}\n", text);
        }
    });

    let limits = config.search_limit.map(SearchLimits::uniform).unwrap_or_default();
    let mut session = Session::new(aggregator, translator, vocabulary, tx)
        .with_search_limits(limits)
        .with_preferences(store, prefs, system_prefers_dark());

    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("🔎 ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match session.handle(Command::parse(&line)).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("❌ Error: {:#}\n", e),
        }
    }

    println!("\n👋 Goodbye!\n");
    session.cancel();
    session.wait().await;
    drop(session);
    let _ = printer.await;
    Ok(())
}
