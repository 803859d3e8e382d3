//! Reusable Wikidata queries shared by the listing pages
//!
//! Library API for detail pages: each helper returns query text that goes
//! into a `QueryDescriptor`, so any set of them can run as one aggregated
//! plan.

use super::builder::{wd, SelectQuery};

fn wikipedia_article(subject: &str, lang: &str) -> String {
    format!(
        "?article schema:about {} ; schema:isPartOf <https://{}.wikipedia.org/> .",
        subject, lang
    )
}

/// Instances of a class with label, description, image and Wikipedia article
pub fn instances_of(class_qid: &str, lang: &str, limit: Option<usize>) -> String {
    let mut query = SelectQuery::new()
        .select(["?item", "?itemLabel", "?itemDescription", "?image", "?article"])
        .pattern(format!("?item wdt:P31 {} .", wd(class_qid)))
        .optional("?item wdt:P18 ?image .")
        .optional(wikipedia_article("?item", lang))
        .label_service(lang)
        .order_by("?itemLabel");
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    query.build()
}

/// Details for a fixed list of items
pub fn items<S: AsRef<str>>(qids: &[S], lang: &str) -> String {
    SelectQuery::new()
        .select(["?item", "?itemLabel", "?itemDescription", "?image", "?article"])
        .values("?item", qids)
        .optional("?item wdt:P18 ?image .")
        .optional(wikipedia_article("?item", lang))
        .label_service(lang)
        .build()
}

/// Notable people whose `property` has the value `value_qid`,
/// e.g. sexual orientation (P91) homosexuality (Q6636)
pub fn people_by(property: &str, value_qid: &str, lang: &str, limit: usize) -> String {
    SelectQuery::new()
        .select([
            "?person",
            "?personLabel",
            "?personDescription",
            "?image",
            "?article",
            "?dob",
            "?dod",
        ])
        .pattern(format!(
            "?person wdt:P31 wd:Q5 ; wdt:{} {} .",
            property,
            wd(value_qid)
        ))
        .optional("?person wdt:P18 ?image .")
        .optional("?person wdt:P569 ?dob .")
        .optional("?person wdt:P570 ?dod .")
        .optional(wikipedia_article("?person", lang))
        .label_service(lang)
        .order_by("?personLabel")
        .limit(limit)
        .build()
}

/// Number of people per identity value for `property`
pub fn people_counts<S: AsRef<str>>(property: &str, value_qids: &[S], lang: &str) -> String {
    SelectQuery::new()
        .select([
            "?identity",
            "?identityLabel",
            "(COUNT(DISTINCT ?person) AS ?count)",
        ])
        .values("?identity", value_qids)
        .pattern(format!("?person wdt:P31 wd:Q5 ; wdt:{} ?identity .", property))
        .label_service(lang)
        .group_by(["?identity", "?identityLabel"])
        .order_by("DESC(?count)")
        .build()
}
