//! Search listing
//!
//! Three entity searches run side by side: countries and cities, LGBTQIA+
//! people, and LGBT topics (events, organisations, places, rights).
//! Results are deduplicated by item and shown countries first.

use crate::aggregate::{MergePolicy, MergedEntity, OrderBy, QueryDescriptor, SourceKey};
use crate::catalog::Vocabulary;
use crate::i18n::Translator;
use crate::sparql::{entity_search_service, entity_url, thumb, wd, SelectQuery};

use super::{non_blank, title_of, Card, Listing};

/// Shorter terms do not run
pub const MIN_TERM_CHARS: usize = 2;
pub const THUMB_WIDTH: u32 = 200;

pub const COUNTRY: &str = "country";
pub const PERSON: &str = "person";
pub const LGBT: &str = "lgbt";

/// Row caps per category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub countries: usize,
    pub people: usize,
    pub topics: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            countries: 15,
            people: 20,
            topics: 15,
        }
    }
}

impl SearchLimits {
    pub fn uniform(limit: usize) -> Self {
        Self {
            countries: limit,
            people: limit,
            topics: limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Search {
    term: String,
    vocabulary: Vocabulary,
    limits: SearchLimits,
}

impl Search {
    /// `None` when the trimmed term is too short to search for
    pub fn new(term: &str, vocabulary: Vocabulary) -> Option<Self> {
        let term = term.trim();
        if term.chars().count() < MIN_TERM_CHARS {
            return None;
        }
        Some(Self {
            term: term.to_string(),
            vocabulary,
            limits: SearchLimits::default(),
        })
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    fn base(&self, lang: &str) -> SelectQuery {
        SelectQuery::new()
            .distinct()
            .select(["?item", "?itemLabel", "?itemDescription", "?image"])
            .pattern(entity_search_service("?item", &self.term, lang))
    }

    fn finish(query: SelectQuery, lang: &str, limit: usize) -> String {
        query
            .optional("?item wdt:P18 ?image .")
            .label_service(lang)
            .limit(limit)
            .build()
    }

    pub fn countries_query(&self, lang: &str) -> String {
        let branches = self
            .vocabulary
            .search_place_classes
            .iter()
            .map(|class| format!("?item wdt:P31 {} .", wd(class)));
        Self::finish(self.base(lang).union(branches), lang, self.limits.countries)
    }

    pub fn people_query(&self, lang: &str) -> String {
        let excluded: Vec<String> = self.vocabulary.binary_genders.iter().map(|q| wd(q)).collect();
        let query = self
            .base(lang)
            .pattern(format!("?item wdt:P31 {} .", wd(&self.vocabulary.human_class)))
            .union([
                "?item wdt:P91 [] .".to_string(),
                format!("?item wdt:P21 ?gender . FILTER(?gender NOT IN ({}))", excluded.join(", ")),
            ]);
        Self::finish(query, lang, self.limits.people)
    }

    pub fn topics_query(&self, lang: &str) -> String {
        let query = self
            .base(lang)
            .values("?relatedType", &self.vocabulary.search_related_types)
            .pattern("?item wdt:P31 ?relatedType .");
        Self::finish(query, lang, self.limits.topics)
    }

    fn ranking() -> Vec<SourceKey> {
        vec![COUNTRY.into(), PERSON.into(), LGBT.into()]
    }

    /// Best-ranked source of an entity, which decides its category and link
    fn category_of(entity: &MergedEntity) -> Option<SourceKey> {
        Self::ranking().into_iter().find(|s| entity.has_source(s))
    }
}

impl Listing for Search {
    fn name(&self) -> &str {
        "search"
    }

    fn descriptors(&self, lang: &str) -> Vec<QueryDescriptor> {
        vec![
            QueryDescriptor::new(PERSON, self.people_query(lang)).category("search.catPerson"),
            QueryDescriptor::new(COUNTRY, self.countries_query(lang)).category("search.catCountry"),
            QueryDescriptor::new(LGBT, self.topics_query(lang)).category("search.catLgbt"),
        ]
    }

    fn policy(&self) -> MergePolicy {
        MergePolicy::new("item").qid()
    }

    fn order(&self) -> OrderBy {
        OrderBy::SourceRank(Self::ranking())
    }

    fn card(&self, entity: &MergedEntity, t: &Translator) -> Card {
        let id = entity.identity().to_string();
        let category = Self::category_of(entity);
        let internal = category.as_ref().map_or(false, |c| c.as_str() == COUNTRY);
        let subtitle = category.map(|c| {
            t.t(match c.as_str() {
                COUNTRY => "search.catCountry",
                PERSON => "search.catPerson",
                _ => "search.catLgbt",
            })
        });
        let link = if internal {
            format!("./country.html?qid={}", id)
        } else {
            entity_url(&id)
        };

        Card {
            title: title_of(entity, "itemLabel"),
            subtitle,
            description: non_blank(entity.text("itemDescription")),
            image: non_blank(entity.text("image")).map(|url| thumb(&url, THUMB_WIDTH)),
            link,
            internal,
            tags: Vec::new(),
            id,
        }
    }

    fn summary(&self, shown: usize, t: &Translator) -> String {
        let noun = if shown == 1 { "search.results" } else { "search.resultsPlural" };
        format!("{} {} {} “{}”", shown, t.t(noun), t.t("search.for"), self.term)
    }

    /// No-results line followed by the hint to try another term
    fn empty_message(&self, t: &Translator) -> String {
        format!("{} “{}”\n{}", t.t("search.noResults"), self.term, t.t("search.tryAgain"))
    }

    fn failure_message(&self, t: &Translator) -> String {
        t.t("search.failed")
    }
}
