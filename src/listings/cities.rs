//! Cities listing
//!
//! Cities hosting LGBTQIA+ places, events or organisations. Each category
//! is its own query returning a per-city count; the merged count is the sum
//! over categories.

use crate::aggregate::{MergePolicy, MergedEntity, OrderBy, QueryDescriptor};
use crate::catalog::Vocabulary;
use crate::i18n::Translator;
use crate::sparql::{wd, SelectQuery};
use crate::utils::contains_ignore_case;

use super::{non_blank, title_of, Card, Listing};

pub const PLACES: &str = "places";
pub const EVENTS: &str = "events";
pub const ORGANIZATIONS: &str = "organizations";

pub const CITY_LIMIT: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct Cities {
    vocabulary: Vocabulary,
}

impl Cities {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// Per-city item counts for one set of types. `location` is the property
    /// path from item to city.
    pub fn count_query(&self, types: &[String], location: &str, lang: &str) -> String {
        SelectQuery::new()
            .select([
                "?city",
                "?cityLabel",
                "?country",
                "?countryLabel",
                "(COUNT(DISTINCT ?item) AS ?count)",
            ])
            .values("?type", types)
            .pattern("?item wdt:P31 ?type .")
            .pattern(format!("?item {} ?city .", location))
            .pattern(format!("?city wdt:P31/wdt:P279* {} .", wd(&self.vocabulary.city_class)))
            .optional("?city wdt:P17 ?country .")
            .label_service(lang)
            .group_by(["?city", "?cityLabel", "?country", "?countryLabel"])
            .order_by("DESC(?count)")
            .order_by("?cityLabel")
            .limit(CITY_LIMIT)
            .build()
    }
}

impl Listing for Cities {
    fn name(&self) -> &str {
        "cities"
    }

    fn descriptors(&self, lang: &str) -> Vec<QueryDescriptor> {
        let v = &self.vocabulary;
        vec![
            QueryDescriptor::new(PLACES, self.count_query(&v.place_types, "wdt:P131", lang))
                .category("cities.catPlaces"),
            QueryDescriptor::new(EVENTS, self.count_query(&v.event_types, "wdt:P131|wdt:P276", lang))
                .category("cities.catEvents"),
            // organisations are usually located through their headquarters
            QueryDescriptor::new(ORGANIZATIONS, self.count_query(&v.organization_types, "wdt:P159|wdt:P131", lang))
                .category("cities.catOrganizations"),
        ]
    }

    fn policy(&self) -> MergePolicy {
        MergePolicy::new("city").qid().additive("count")
    }

    fn order(&self) -> OrderBy {
        OrderBy::Score {
            field: "count".to_string(),
            descending: true,
        }
    }

    fn card(&self, entity: &MergedEntity, t: &Translator) -> Card {
        let id = entity.identity().to_string();
        let count = entity.total("count");
        Card {
            title: title_of(entity, "cityLabel"),
            subtitle: non_blank(entity.text("countryLabel")),
            link: format!("./city.html?id={}", id),
            internal: true,
            tags: vec![t.t_with("cities.records", &[("n", (count as u64).to_string().as_str())])],
            id,
            ..Card::default()
        }
    }

    fn matches(&self, entity: &MergedEntity, text: &str) -> bool {
        contains_ignore_case(&entity.text("cityLabel"), text)
            || contains_ignore_case(&entity.text("countryLabel"), text)
    }

    fn summary(&self, shown: usize, t: &Translator) -> String {
        t.t_with("cities.count", &[("n", shown.to_string().as_str())])
    }

    fn empty_message(&self, t: &Translator) -> String {
        t.t("cities.none")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{tag, MergedSet};
    use crate::listings::build_view;
    use crate::sparql::ResultRow;

    fn row(qid: &str, label: &str, country: &str, count: i64) -> ResultRow {
        let mut row = ResultRow::new()
            .with("city", format!("http://www.wikidata.org/entity/{}", qid))
            .with("cityLabel", label)
            .with("count", count);
        if !country.is_empty() {
            row.insert("countryLabel", country);
        }
        row
    }

    #[test]
    fn test_query_shape() {
        let cities = Cities::default();
        let descriptors = cities.descriptors("en");
        assert_eq!(descriptors.len(), 3);

        let places = &descriptors[0].query;
        assert!(places.contains("VALUES ?type { wd:Q2945640 wd:Q118108259"));
        assert!(places.contains("?item wdt:P131 ?city ."));
        assert!(places.contains("?city wdt:P31/wdt:P279* wd:Q515 ."));
        assert!(places.contains("GROUP BY ?city ?cityLabel ?country ?countryLabel"));
        assert!(places.ends_with("ORDER BY DESC(?count) ?cityLabel\nLIMIT 200"));
        assert!(descriptors[2].query.contains("?item wdt:P159|wdt:P131 ?city ."));
    }

    #[test]
    fn test_counts_sum_across_categories() {
        let cities = Cities::default();
        let mut set = MergedSet::new(cities.policy());
        set.merge(tag(vec![row("Q90", "Paris", "", 5), row("Q1490", "Tokyo", "Japan", 3)], &PLACES.into()));
        set.merge(tag(vec![row("Q90", "Paris", "France", 4)], &EVENTS.into()));
        set.merge(tag(vec![row("Q1490", "Tokyo", "Japan", 6)], &ORGANIZATIONS.into()));

        let t = Translator::default();
        let sorted = set.sorted(&cities.order());
        let view = build_view(&cities, &sorted, "", &t);

        assert_eq!(view.summary, "2 cities");
        assert_eq!(view.cards[0].title, "Paris");
        assert_eq!(view.cards[0].subtitle.as_deref(), Some("France"));
        assert_eq!(view.cards[0].tags, vec!["9 records".to_string()]);
        assert_eq!(view.cards[0].link, "./city.html?id=Q90");
        assert_eq!(view.cards[1].tags, vec!["9 records".to_string()]);
    }

    #[test]
    fn test_text_filter_matches_country() {
        let cities = Cities::default();
        let mut set = MergedSet::new(cities.policy());
        set.merge(tag(
            vec![row("Q90", "Paris", "France", 5), row("Q1490", "Tokyo", "Japan", 3)],
            &PLACES.into(),
        ));

        let t = Translator::default();
        let sorted = set.sorted(&cities.order());
        let view = build_view(&cities, &sorted, "JAP", &t);
        assert_eq!(view.cards.len(), 1);
        assert_eq!(view.cards[0].id, "Q1490");

        let view = build_view(&cities, &sorted, "zurich", &t);
        assert!(view.cards.is_empty());
        assert_eq!(view.summary, "No cities found.");
    }
}
