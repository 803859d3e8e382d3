//! Countries listing
//!
//! Countries with documented LGBT rights or history items. Rights and
//! history are counted by separate queries and merged per country.

use crate::aggregate::{MergePolicy, MergedEntity, OrderBy, QueryDescriptor};
use crate::catalog::Vocabulary;
use crate::i18n::Translator;
use crate::sparql::{wd, SelectQuery};

use super::{title_of, Card, Listing};

pub const RIGHTS: &str = "rights";
pub const HISTORY: &str = "history";

pub const COUNTRY_LIMIT: usize = 400;

#[derive(Debug, Clone, Default)]
pub struct Countries {
    vocabulary: Vocabulary,
}

impl Countries {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Rights items per country. Items without a country statement that are
    /// themselves a country count for it.
    pub fn rights_query(&self, lang: &str) -> String {
        SelectQuery::new()
            .select(["?country", "?countryLabel", "(COUNT(DISTINCT ?rights) AS ?rightsCount)"])
            .pattern(format!("?rights wdt:P31 {} .", wd(&self.vocabulary.rights_class)))
            .optional("?rights wdt:P17 ?countryDirect .")
            .pattern("BIND(COALESCE(?countryDirect, ?rights) AS ?country)")
            .pattern(format!("?country wdt:P31 {} .", wd(&self.vocabulary.country_class)))
            .label_service(lang)
            .group_by(["?country", "?countryLabel"])
            .order_by("?countryLabel")
            .limit(COUNTRY_LIMIT)
            .build()
    }

    /// History and timeline items per country. The country statement (P17)
    /// wins over the main subject (P921), so an item counts for one country.
    pub fn history_query(&self, lang: &str) -> String {
        SelectQuery::new()
            .select(["?country", "?countryLabel", "(COUNT(DISTINCT ?item) AS ?historyCount)"])
            .values("?type", &self.vocabulary.history_types)
            .pattern("?item wdt:P31 ?type .")
            .optional("?item wdt:P17 ?countryDirect .")
            .optional("?item wdt:P921 ?subject .")
            .pattern("BIND(COALESCE(?countryDirect, ?subject) AS ?country)")
            .filter("BOUND(?countryDirect) || BOUND(?subject)")
            .pattern(format!("?country wdt:P31 {} .", wd(&self.vocabulary.country_class)))
            .label_service(lang)
            .group_by(["?country", "?countryLabel"])
            .order_by("?countryLabel")
            .limit(COUNTRY_LIMIT)
            .build()
    }
}

fn count_tag(t: &Translator, key: &str, count: f64) -> Option<String> {
    (count > 0.0).then(|| t.t_with(key, &[("n", (count as u64).to_string().as_str())]))
}

impl Listing for Countries {
    fn name(&self) -> &str {
        "countries"
    }

    fn descriptors(&self, lang: &str) -> Vec<QueryDescriptor> {
        vec![
            QueryDescriptor::new(RIGHTS, self.rights_query(lang)).category("countries.catRights"),
            QueryDescriptor::new(HISTORY, self.history_query(lang)).category("countries.catHistory"),
        ]
    }

    fn policy(&self) -> MergePolicy {
        MergePolicy::new("country")
            .qid()
            .additive("rightsCount")
            .additive("historyCount")
    }

    fn order(&self) -> OrderBy {
        OrderBy::Label
    }

    fn card(&self, entity: &MergedEntity, t: &Translator) -> Card {
        let id = entity.identity().to_string();
        let tags = [
            count_tag(t, "countries.rightsItems", entity.total("rightsCount")),
            count_tag(t, "countries.historyItems", entity.total("historyCount")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Card {
            title: title_of(entity, "countryLabel"),
            link: format!("./country.html?id={}", id),
            internal: true,
            tags,
            id,
            ..Card::default()
        }
    }

    fn summary(&self, shown: usize, t: &Translator) -> String {
        t.t_with("countries.count", &[("n", shown.to_string().as_str())])
    }

    fn empty_message(&self, t: &Translator) -> String {
        t.t("countries.none")
    }
}
