//! Listings
//!
//! Pure view models for the pages built on the aggregator. A listing says
//! which queries to run, how their rows merge and sort, and how a merged
//! entity becomes a card. Nothing here performs I/O.

pub mod cities;
pub mod countries;
pub mod search;

pub use cities::Cities;
pub use countries::Countries;
pub use search::Search;

use serde::Serialize;

use crate::aggregate::{MergePolicy, MergedEntity, OrderBy, QueryDescriptor, RunPlan};
use crate::i18n::Translator;
use crate::utils::contains_ignore_case;

/// One rendered result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    /// Category or country line under the title
    pub subtitle: Option<String>,
    pub description: Option<String>,
    /// Thumbnail URL
    pub image: Option<String>,
    pub link: String,
    /// Site-internal link rather than an external Wikidata page
    pub internal: bool,
    pub tags: Vec<String>,
}

/// What the render target shows for a listing at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingView {
    pub cards: Vec<Card>,
    /// Count line, or the empty-state message
    pub summary: String,
}

pub trait Listing: Send + Sync {
    fn name(&self) -> &str;

    /// Queries of one run, labels in `lang`
    fn descriptors(&self, lang: &str) -> Vec<QueryDescriptor>;

    fn policy(&self) -> MergePolicy;

    fn order(&self) -> OrderBy;

    fn card(&self, entity: &MergedEntity, t: &Translator) -> Card;

    /// Client-side text filter; matches the label by default
    fn matches(&self, entity: &MergedEntity, text: &str) -> bool {
        contains_ignore_case(&entity.text(&self.policy().label_field), text)
    }

    fn summary(&self, shown: usize, t: &Translator) -> String;

    fn empty_message(&self, t: &Translator) -> String;

    /// Shown when every query of a run failed
    fn failure_message(&self, t: &Translator) -> String {
        t.t("error.load")
    }

    fn plan(&self, lang: &str) -> RunPlan {
        RunPlan::new(self.descriptors(lang), self.policy()).order(self.order())
    }
}

/// Cards for the entities that pass the text filter, plus the summary line
pub fn build_view(listing: &dyn Listing, entities: &[&MergedEntity], text: &str, t: &Translator) -> ListingView {
    let cards: Vec<Card> = entities
        .iter()
        .filter(|e| listing.matches(e, text))
        .map(|e| listing.card(e, t))
        .collect();
    let summary = if cards.is_empty() {
        listing.empty_message(t)
    } else {
        listing.summary(cards.len(), t)
    };
    ListingView { cards, summary }
}

/// Label with the identity as a fallback
pub(crate) fn title_of(entity: &MergedEntity, label_field: &str) -> String {
    let label = entity.text(label_field);
    if label.trim().is_empty() {
        entity.identity().to_string()
    } else {
        label
    }
}

pub(crate) fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}
