//! Interactive session
//!
//! Turns prompt commands into listing runs. Each run renders into the same
//! place, so starting one cancels the previous run through the run slot.
//! Rendered text goes to an output channel; the binary prints it.

use anyhow::Result;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::aggregate::{AggregateError, Aggregator, MergedEntity, Progress, RunOutcome, RunSlot, SourceFilter, SourceKey, Update};
use crate::catalog::Vocabulary;
use crate::i18n::Translator;
use crate::listings::search::{SearchLimits, MIN_TERM_CHARS};
use crate::listings::{build_view, Cities, Countries, Listing, ListingView, Search};
use crate::prefs::{PreferenceStore, Preferences, Theme};
use crate::render;

pub const HELP: &str = "\
Commands:
  search <term>    search people, places and topics
  cities           cities with LGBTQIA+ records
  countries        countries with rights or history records
  filter <source>  toggle a source (click the only one again to show all)
  all              show every source
  find <text>      narrow the current listing by name
  lang <code>      switch language
  theme            toggle light/dark theme
  help             show this help
  quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Cities,
    Countries,
    Filter(String),
    All,
    Find(String),
    Lang(String),
    Theme,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_lowercase().as_str() {
            "" => Command::Empty,
            "search" | "s" => Command::Search(rest.to_string()),
            "cities" => Command::Cities,
            "countries" => Command::Countries,
            "filter" | "f" if !rest.is_empty() => Command::Filter(rest.to_string()),
            "all" => Command::All,
            "find" => Command::Find(rest.to_string()),
            "lang" if !rest.is_empty() => Command::Lang(rest.to_lowercase()),
            "theme" => Command::Theme,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// What the active listing shows; shared with the run task
struct Screen {
    listing: Option<Arc<dyn Listing>>,
    /// Sorted snapshot from the latest update
    entities: Vec<MergedEntity>,
    progress: Option<Progress>,
    filter: SourceFilter,
    find: String,
    translator: Translator,
}

impl Screen {
    fn view(&self) -> Option<ListingView> {
        let listing = self.listing.as_ref()?;
        let all: Vec<&MergedEntity> = self.entities.iter().collect();
        let visible = self.filter.apply(&all);
        Some(build_view(listing.as_ref(), &visible, &self.find, &self.translator))
    }

    fn render(&self) -> Option<String> {
        let view = self.view()?;
        let mut out = String::new();
        if let Some(progress) = &self.progress {
            out.push_str(&render::progress(progress, &self.translator));
            out.push('\n');
        }
        if self.filter.sources().len() > 1 {
            out.push_str(&render::filter(&self.filter));
            out.push('\n');
        }
        out.push_str(&render::view(&view));
        Some(out)
    }
}

fn lock(screen: &Mutex<Screen>) -> MutexGuard<'_, Screen> {
    screen.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct Session {
    aggregator: Arc<Aggregator>,
    slot: Arc<RunSlot>,
    screen: Arc<Mutex<Screen>>,
    output: UnboundedSender<String>,
    vocabulary: Vocabulary,
    limits: SearchLimits,
    store: Option<PreferenceStore>,
    prefs: Preferences,
    system_dark: bool,
    running: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(aggregator: Aggregator, translator: Translator, vocabulary: Vocabulary, output: UnboundedSender<String>) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            slot: Arc::new(RunSlot::new()),
            screen: Arc::new(Mutex::new(Screen {
                listing: None,
                entities: Vec::new(),
                progress: None,
                filter: SourceFilter::new(Vec::new()),
                find: String::new(),
                translator,
            })),
            output,
            vocabulary,
            limits: SearchLimits::default(),
            store: None,
            prefs: Preferences::default(),
            system_dark: false,
            running: None,
        }
    }

    pub fn with_search_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Persist theme and language changes to `store`
    pub fn with_preferences(mut self, store: PreferenceStore, prefs: Preferences, system_dark: bool) -> Self {
        self.store = Some(store);
        self.prefs = prefs;
        self.system_dark = system_dark;
        self
    }

    pub fn translator(&self) -> Translator {
        lock(&self.screen).translator.clone()
    }

    pub fn theme(&self) -> Theme {
        Theme::preferred(self.prefs.theme, self.system_dark)
    }

    /// Current view of the active listing, if any
    pub fn view(&self) -> Option<ListingView> {
        lock(&self.screen).view()
    }

    pub fn filter(&self) -> SourceFilter {
        lock(&self.screen).filter.clone()
    }

    fn say(&self, text: impl Into<String>) {
        let _ = self.output.send(text.into());
    }

    fn rerender(&self) {
        if let Some(text) = lock(&self.screen).render() {
            self.say(text);
        }
    }

    /// Handle one command; `false` means the session should end
    pub async fn handle(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Empty => {}
            Command::Search(term) => match Search::new(&term, self.vocabulary.clone()) {
                Some(search) => self.start(Arc::new(search.with_limits(self.limits))),
                None => {
                    let n = MIN_TERM_CHARS.to_string();
                    let text = self.translator().t_with("search.tooShort", &[("n", n.as_str())]);
                    self.say(text);
                }
            },
            Command::Cities => self.start(Arc::new(Cities::new(self.vocabulary.clone()))),
            Command::Countries => self.start(Arc::new(Countries::new(self.vocabulary.clone()))),
            Command::Filter(source) => {
                let known = lock(&self.screen).filter.click(&SourceKey::from(source.as_str()));
                if known {
                    self.rerender();
                } else {
                    let sources = self.filter().sources().iter().map(|s| s.to_string()).collect::<Vec<_>>();
                    self.say(format!("Unknown source '{}'. Sources: {}", source, sources.join(", ")));
                }
            }
            Command::All => {
                lock(&self.screen).filter.select_all();
                self.rerender();
            }
            Command::Find(text) => {
                lock(&self.screen).find = text;
                self.rerender();
            }
            Command::Lang(code) => self.switch_lang(&code).await?,
            Command::Theme => self.toggle_theme().await?,
            Command::Help => self.say(HELP),
            Command::Quit => {
                self.cancel();
                return Ok(false);
            }
            Command::Unknown(line) => self.say(format!("Unknown command '{}'. Type 'help'.", line)),
        }
        Ok(true)
    }

    async fn switch_lang(&mut self, code: &str) -> Result<()> {
        let switched = self.translator().with_lang(code);
        let Some(translator) = switched else {
            let langs: Vec<String> = self.translator().dictionary().languages().map(str::to_string).collect();
            self.say(format!("Unsupported language '{}'. Available: {}", code, langs.join(", ")));
            return Ok(());
        };

        let label = translator.t("lang.label");
        lock(&self.screen).translator = translator;
        self.prefs.lang = Some(code.to_string());
        self.save_prefs().await?;
        self.say(format!("{}: {}", label, code));
        self.rerender();
        Ok(())
    }

    async fn toggle_theme(&mut self) -> Result<()> {
        let theme = self.theme().toggle();
        self.prefs.theme = Some(theme);
        self.save_prefs().await?;
        let hint = self.translator().t(theme.toggle_label_key());
        self.say(format!("Theme: {} ({})", theme.as_str(), hint));
        Ok(())
    }

    async fn save_prefs(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.save(&self.prefs).await?;
        }
        Ok(())
    }

    /// Start `listing` in the background, cancelling whatever ran before
    pub fn start(&mut self, listing: Arc<dyn Listing>) {
        let ticket = self.slot.begin();
        let (translator, plan) = {
            let mut screen = lock(&self.screen);
            let plan = listing.plan(screen.translator.lang());
            screen.filter = plan.filter.clone();
            screen.listing = Some(Arc::clone(&listing));
            screen.entities.clear();
            screen.progress = None;
            screen.find.clear();
            (screen.translator.clone(), plan)
        };
        self.say(translator.t("loading"));
        info!("Starting '{}' listing (run {})", listing.name(), ticket.generation);

        let aggregator = Arc::clone(&self.aggregator);
        let slot = Arc::clone(&self.slot);
        let screen = Arc::clone(&self.screen);
        let output = self.output.clone();

        self.running = Some(tokio::spawn(async move {
            let outcome = aggregator
                .run(plan, ticket.token.clone(), |update: Update<'_>| {
                    // checked under the lock: `start` begins a new run before resetting the screen
                    let mut screen = lock(&screen);
                    if !slot.is_current(&ticket) {
                        return;
                    }
                    screen.entities = update.entities.iter().map(|e| (*e).clone()).collect();
                    screen.progress = Some(update.progress.clone());
                    if let Some(text) = screen.render() {
                        let _ = output.send(text);
                    }
                })
                .await;

            match outcome {
                Ok(RunOutcome::Completed(state)) => {
                    debug!("'{}' listing complete with {} entities", listing.name(), state.merged.len());
                    let screen = lock(&screen);
                    if state.progress.total == 0 && slot.is_current(&ticket) {
                        if let Some(text) = screen.render() {
                            let _ = output.send(text);
                        }
                    }
                }
                Ok(RunOutcome::Cancelled { settled }) => {
                    debug!("'{}' listing superseded after {} sources", listing.name(), settled);
                }
                Err(AggregateError::AllSourcesFailed { failures }) => {
                    warn!("'{}' listing failed on all {} sources", listing.name(), failures.len());
                    let _screen = lock(&screen);
                    if slot.is_current(&ticket) {
                        let _ = output.send(listing.failure_message(&translator));
                    }
                }
            }
        }));
    }

    /// Cancel the active run, if any
    pub fn cancel(&self) {
        self.slot.cancel();
    }

    /// Wait for the latest run to finish
    pub async fn wait(&mut self) {
        if let Some(handle) = self.running.take() {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparql::{QueryClient, QueryError, ResultRow};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::{mpsc, Semaphore};
    use tokio_util::sync::CancellationToken;

    /// Answers every query with one city row once a permit is released
    struct HeldClient {
        permits: Semaphore,
    }

    #[async_trait]
    impl QueryClient for HeldClient {
        async fn execute(&self, _query: &str, cancel: &CancellationToken) -> Result<Vec<ResultRow>, QueryError> {
            tokio::select! {
                _ = cancel.cancelled() => return Err(QueryError::Cancelled),
                permit = self.permits.acquire() => {
                    if let Ok(permit) = permit {
                        permit.forget();
                    }
                }
            }
            Ok(vec![ResultRow::new()
                .with("city", "http://www.wikidata.org/entity/Q90")
                .with("cityLabel", "Paris")
                .with("count", 3)])
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_superseded_update_waiting_on_screen_is_dropped() {
        let client = Arc::new(HeldClient { permits: Semaphore::new(0) });
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut session = Session::new(
            Aggregator::new(client.clone()),
            Translator::default(),
            Vocabulary::default(),
            tx,
        );
        session.start(Arc::new(Cities::default()));
        let old_run = session.running.take().unwrap();

        {
            // the old run's update blocks on the screen while a new run takes over
            let mut screen = lock(&session.screen);
            client.permits.add_permits(1);
            std::thread::sleep(Duration::from_millis(100));

            session.slot.begin();
            let countries: Arc<dyn Listing> = Arc::new(Countries::default());
            screen.filter = countries.plan("en").filter;
            screen.listing = Some(countries);
            screen.entities.clear();
            screen.progress = None;
        }
        old_run.await.unwrap();

        let screen = lock(&session.screen);
        assert_eq!(screen.listing.as_ref().map(|l| l.name()), Some("countries"));
        assert!(screen.entities.is_empty());
        assert!(screen.progress.is_none());
        drop(screen);

        let mut output = Vec::new();
        while let Ok(text) = rx.try_recv() {
            output.push(text);
        }
        assert!(output.iter().all(|text| !text.contains("Paris")));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("search  Harvey Milk "), Command::Search("Harvey Milk".into()));
        assert_eq!(Command::parse("CITIES"), Command::Cities);
        assert_eq!(Command::parse("filter events"), Command::Filter("events".into()));
        assert_eq!(Command::parse("find"), Command::Find(String::new()));
        assert_eq!(Command::parse("lang FR"), Command::Lang("fr".into()));
        assert_eq!(Command::parse("   "), Command::Empty);
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse("filter"), Command::Unknown("filter".into()));
        assert_eq!(Command::parse("dance"), Command::Unknown("dance".into()));
    }
}
