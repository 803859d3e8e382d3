//! End-to-end listing runs through the interactive session

mod common;

use common::{item, ScriptedClient};
use queer_memory::aggregate::{Aggregator, FilterMode, SourceKey};
use queer_memory::catalog::Vocabulary;
use queer_memory::i18n::Translator;
use queer_memory::listings::{Cities, Countries, Listing, Search};
use queer_memory::prefs::{PreferenceStore, Preferences, Theme};
use queer_memory::session::{Command, Session};
use queer_memory::sparql::{QueryError, ResultRow};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn session(client: Arc<ScriptedClient>) -> (Session, UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let session = Session::new(Aggregator::new(client), Translator::default(), Vocabulary::default(), tx);
    (session, rx)
}

fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<String> {
    let mut out = Vec::new();
    while let Ok(text) = rx.try_recv() {
        out.push(text);
    }
    out
}

fn country(qid: &str, label: &str, field: &str, count: i64) -> ResultRow {
    ResultRow::new()
        .with("country", format!("http://www.wikidata.org/entity/{}", qid))
        .with("countryLabel", label)
        .with(field, count)
}

fn city(qid: &str, label: &str, count: i64) -> ResultRow {
    ResultRow::new()
        .with("city", format!("http://www.wikidata.org/entity/{}", qid))
        .with("cityLabel", label)
        .with("count", count)
}

#[tokio::test]
async fn test_countries_listing_with_filter_and_find() {
    let client = Arc::new(ScriptedClient::new());
    let descriptors = Countries::default().descriptors("en");
    client.reply(
        &descriptors[0].query,
        Ok(vec![country("Q142", "France", "rightsCount", 2), country("Q183", "Germany", "rightsCount", 1)]),
    );
    client.reply(&descriptors[1].query, Ok(vec![country("Q142", "France", "historyCount", 4)]));

    let (mut session, mut rx) = session(client);
    assert!(session.handle(Command::Countries).await.unwrap());
    session.wait().await;

    let view = session.view().unwrap();
    assert_eq!(view.summary, "2 countries");
    assert_eq!(view.cards[0].tags, vec!["Rights items: 2".to_string(), "History items: 4".to_string()]);
    let output = drain(&mut rx);
    assert_eq!(output[0], "Loading from Wikidata…");
    assert!(output.last().unwrap().contains("2 of 2 sources loaded"));

    session.handle(Command::Filter("history".into())).await.unwrap();
    assert_eq!(session.filter().mode(), &FilterMode::Exclusive(SourceKey::from("history")));
    let view = session.view().unwrap();
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].title, "France");

    session.handle(Command::All).await.unwrap();
    session.handle(Command::Find("germ".into())).await.unwrap();
    let view = session.view().unwrap();
    assert_eq!(view.cards.len(), 1);
    assert_eq!(view.cards[0].title, "Germany");

    session.handle(Command::Filter("elsewhere".into())).await.unwrap();
    assert!(drain(&mut rx).last().unwrap().starts_with("Unknown source 'elsewhere'"));
}

#[tokio::test]
async fn test_new_run_supersedes_previous() {
    let client = Arc::new(ScriptedClient::new());
    let cities = Cities::default().descriptors("en");
    let gates: Vec<_> = cities
        .iter()
        .map(|d| client.gated(&d.query, Ok(vec![city("Q90", "Paris", 3)])))
        .collect();
    let countries = Countries::default().descriptors("en");
    client.reply(&countries[0].query, Ok(vec![country("Q29", "Spain", "rightsCount", 1)]));
    client.reply(&countries[1].query, Ok(vec![]));

    let (mut session, mut rx) = session(client);
    session.handle(Command::Cities).await.unwrap();
    tokio::task::yield_now().await;
    session.handle(Command::Countries).await.unwrap();
    session.wait().await;

    // releasing the superseded run's queries changes nothing
    for gate in gates {
        let _ = gate.send(());
    }
    tokio::task::yield_now().await;

    let view = session.view().unwrap();
    assert_eq!(view.summary, "1 countries");
    assert_eq!(view.cards[0].title, "Spain");
    assert!(drain(&mut rx).iter().all(|text| !text.contains("Paris")));
}

#[tokio::test]
async fn test_search_failure_and_short_terms() {
    let client = Arc::new(ScriptedClient::new());
    let search = Search::new("stonewall", Vocabulary::default()).unwrap();
    for d in search.descriptors("en") {
        client.reply(&d.query, Err(QueryError::Http { status: 500 }));
    }

    let (mut session, mut rx) = session(client.clone());
    session.handle(Command::Search("x".into())).await.unwrap();
    assert_eq!(drain(&mut rx), vec!["Type at least 2 characters to search.".to_string()]);
    assert_eq!(client.calls(), 0);

    session.handle(Command::Search("stonewall".into())).await.unwrap();
    session.wait().await;
    assert_eq!(client.calls(), 3);
    assert_eq!(drain(&mut rx).last().map(String::as_str), Some("Search failed. Please try again."));
}

#[tokio::test]
async fn test_search_results_merge_across_categories() {
    let client = Arc::new(ScriptedClient::new());
    let search = Search::new("berlin", Vocabulary::default()).unwrap();
    let d = search.descriptors("en");
    // person, country, lgbt
    client.reply(&d[0].query, Ok(vec![item("Q1", "Berlin Person")]));
    client.reply(&d[1].query, Ok(vec![item("Q64", "Berlin")]));
    client.reply(&d[2].query, Ok(vec![item("Q64", "Berlin"), item("Q5", "Berlin Pride")]));

    let (mut session, _rx) = session(client);
    session.handle(Command::Search("berlin".into())).await.unwrap();
    session.wait().await;

    let view = session.view().unwrap();
    let ids: Vec<&str> = view.cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["Q64", "Q1", "Q5"]);
    assert_eq!(view.summary, "3 results for “berlin”");
}

#[tokio::test]
async fn test_language_and_theme_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session::new(
        Aggregator::new(Arc::new(ScriptedClient::new())),
        Translator::default(),
        Vocabulary::default(),
        tx,
    )
    .with_preferences(PreferenceStore::new(&path), Preferences::default(), true);

    assert_eq!(session.theme(), Theme::Dark);
    session.handle(Command::Theme).await.unwrap();
    assert_eq!(session.theme(), Theme::Light);

    session.handle(Command::Lang("fr".into())).await.unwrap();
    assert_eq!(session.translator().lang(), "fr");
    session.handle(Command::Lang("xx".into())).await.unwrap();
    assert_eq!(session.translator().lang(), "fr");
    assert!(drain(&mut rx).last().unwrap().starts_with("Unsupported language 'xx'"));

    let stored = PreferenceStore::new(&path).load().await.unwrap();
    assert_eq!(stored.theme, Some(Theme::Light));
    assert_eq!(stored.lang.as_deref(), Some("fr"));

    assert!(!session.handle(Command::Quit).await.unwrap());
}
