//! Deduplicating Merger
//!
//! Folds tagged rows from many sources into one entity per identity.
//! The first row seen for an identity becomes its representative; later
//! rows only fill blank fields. Additive fields (per-source partial
//! counts) are summed, each `(identity, source)` pair contributing once.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use super::{SourceKey, TaggedRow};
use crate::sparql::{qid_from_uri, ResultRow, Scalar};

/// How the identity cell is turned into a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityForm {
    /// Use the cell text as-is
    #[default]
    Raw,
    /// Reduce entity URIs to their QID
    Qid,
}

/// What to do with rows that have no identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingIdentity {
    #[default]
    Drop,
    /// Keep the row, unmerged, in `MergedSet::unkeyed`
    PassThrough,
}

/// Merge configuration for one listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergePolicy {
    pub identity_field: String,
    pub identity_form: IdentityForm,
    /// Field used for display and as the sort tie-break
    pub label_field: String,
    pub additive_fields: BTreeSet<String>,
    pub missing_identity: MissingIdentity,
}

impl MergePolicy {
    /// Policy keyed on `identity_field`, labelled by `{identity_field}Label`
    pub fn new(identity_field: impl Into<String>) -> Self {
        let identity_field = identity_field.into();
        Self {
            label_field: format!("{}Label", identity_field),
            identity_field,
            identity_form: IdentityForm::Raw,
            additive_fields: BTreeSet::new(),
            missing_identity: MissingIdentity::Drop,
        }
    }

    pub fn qid(mut self) -> Self {
        self.identity_form = IdentityForm::Qid;
        self
    }

    pub fn label(mut self, field: impl Into<String>) -> Self {
        self.label_field = field.into();
        self
    }

    pub fn additive(mut self, field: impl Into<String>) -> Self {
        self.additive_fields.insert(field.into());
        self
    }

    pub fn pass_through(mut self) -> Self {
        self.missing_identity = MissingIdentity::PassThrough;
        self
    }

    /// Identity key of a row, `None` when the identity cell is blank
    pub fn identity_of(&self, row: &ResultRow) -> Option<String> {
        if row.is_blank(&self.identity_field) {
            return None;
        }
        let raw = row.text(&self.identity_field);
        let key = match self.identity_form {
            IdentityForm::Raw => raw.trim().to_string(),
            IdentityForm::Qid => qid_from_uri(raw.trim()).to_string(),
        };
        (!key.is_empty()).then_some(key)
    }

    fn is_additive(&self, field: &str) -> bool {
        self.additive_fields.contains(field)
    }
}

/// One deduplicated entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntity {
    identity: String,
    row: ResultRow,
    sources: BTreeSet<SourceKey>,
    first_source: SourceKey,
    contributions: BTreeMap<SourceKey, BTreeMap<String, f64>>,
}

impl MergedEntity {
    fn seed(identity: String, tagged: TaggedRow, policy: &MergePolicy) -> Self {
        let mut entity = Self {
            identity,
            row: ResultRow::new(),
            sources: BTreeSet::new(),
            first_source: tagged.source.clone(),
            contributions: BTreeMap::new(),
        };
        entity.absorb(tagged, policy);
        entity
    }

    fn absorb(&mut self, tagged: TaggedRow, policy: &MergePolicy) {
        let TaggedRow { source, row } = tagged;
        let first_from_source = !self.contributions.contains_key(&source);
        let mut partials = BTreeMap::new();

        for (field, value) in row.fields() {
            if policy.is_additive(field) {
                if first_from_source {
                    if let Some(n) = value.as_number() {
                        partials.insert(field.clone(), n);
                    }
                }
            } else if self.row.is_blank(field) && !value.is_blank() {
                self.row.insert(field.clone(), value.clone());
            }
        }

        if first_from_source {
            self.contributions.insert(source.clone(), partials);
        }
        self.sources.insert(source);
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Representative row without additive fields
    pub fn row(&self) -> &ResultRow {
        &self.row
    }

    pub fn sources(&self) -> &BTreeSet<SourceKey> {
        &self.sources
    }

    pub fn has_source(&self, source: &SourceKey) -> bool {
        self.sources.contains(source)
    }

    /// Source whose row seeded this entity
    pub fn first_source(&self) -> &SourceKey {
        &self.first_source
    }

    /// Running total of an additive field across sources
    pub fn total(&self, field: &str) -> f64 {
        self.contributions
            .values()
            .filter_map(|partials| partials.get(field))
            .sum()
    }

    /// Contribution of one source to an additive field
    pub fn contribution(&self, source: &SourceKey, field: &str) -> Option<f64> {
        self.contributions.get(source).and_then(|p| p.get(field)).copied()
    }

    fn has_additive(&self, field: &str) -> bool {
        self.contributions.values().any(|p| p.contains_key(field))
    }

    /// Field value, with additive fields resolved to their totals
    pub fn value(&self, field: &str) -> Option<Scalar> {
        if self.has_additive(field) {
            return Some(Scalar::Number(self.total(field)));
        }
        self.row.get(field).cloned()
    }

    pub fn text(&self, field: &str) -> String {
        self.value(field).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.value(field).and_then(|v| v.as_number())
    }

    /// Representative row with additive totals filled in
    pub fn to_row(&self) -> ResultRow {
        let mut row = self.row.clone();
        let fields: BTreeSet<&String> = self.contributions.values().flat_map(|p| p.keys()).collect();
        for field in fields {
            row.insert(field.clone(), self.total(field));
        }
        row
    }
}

/// Outcome of one `merge` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Sort order for the merged view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// First-seen order
    Insertion,
    Label,
    Score { field: String, descending: bool },
    /// Rank by the best-placed source in the list; unknown sources go last
    SourceRank(Vec<SourceKey>),
}

/// The running merged state of one aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedSet {
    policy: MergePolicy,
    entities: Vec<MergedEntity>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    unkeyed: Vec<TaggedRow>,
    skipped: usize,
}

impl MergedSet {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            entities: Vec::new(),
            index: HashMap::new(),
            unkeyed: Vec::new(),
            skipped: 0,
        }
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// Fold tagged rows into the set
    pub fn merge(&mut self, rows: Vec<TaggedRow>) -> MergeStats {
        let mut stats = MergeStats::default();

        for tagged in rows {
            let Some(identity) = self.policy.identity_of(&tagged.row) else {
                stats.skipped += 1;
                if self.policy.missing_identity == MissingIdentity::PassThrough {
                    self.unkeyed.push(tagged);
                }
                continue;
            };

            match self.index.get(&identity) {
                Some(&i) => {
                    self.entities[i].absorb(tagged, &self.policy);
                    stats.updated += 1;
                }
                None => {
                    self.index.insert(identity.clone(), self.entities.len());
                    self.entities.push(MergedEntity::seed(identity, tagged, &self.policy));
                    stats.inserted += 1;
                }
            }
        }

        self.skipped += stats.skipped;
        if stats.skipped > 0 {
            debug!("Skipped {} rows without '{}'", stats.skipped, self.policy.identity_field);
        }
        stats
    }

    pub fn get(&self, identity: &str) -> Option<&MergedEntity> {
        self.index.get(identity).map(|&i| &self.entities[i])
    }

    /// Entities in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &MergedEntity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Rows dropped (or passed through) for lack of an identity, over all merges
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn unkeyed(&self) -> &[TaggedRow] {
        &self.unkeyed
    }

    /// Identity → source set, the order-independent part of the state
    pub fn source_sets(&self) -> BTreeMap<String, BTreeSet<SourceKey>> {
        self.entities
            .iter()
            .map(|e| (e.identity.clone(), e.sources.clone()))
            .collect()
    }

    /// Entities re-sorted by `order`. Ties are broken by the
    /// case-normalized label, then by identity.
    pub fn sorted(&self, order: &OrderBy) -> Vec<&MergedEntity> {
        let mut view: Vec<&MergedEntity> = self.entities.iter().collect();
        sort_entities(&mut view, order, &self.policy.label_field);
        view
    }
}

/// Sort a view of entities in place; see [`MergedSet::sorted`]
pub fn sort_entities(view: &mut [&MergedEntity], order: &OrderBy, label_field: &str) {
    let tie_break = |a: &MergedEntity, b: &MergedEntity| {
        let la = a.text(label_field).to_lowercase();
        let lb = b.text(label_field).to_lowercase();
        la.cmp(&lb).then_with(|| a.identity.cmp(&b.identity))
    };

    match order {
        OrderBy::Insertion => {}
        OrderBy::Label => view.sort_by(|a, b| tie_break(*a, *b)),
        OrderBy::Score { field, descending } => view.sort_by(|a, b| {
            let primary = compare_scores(a.number(field), b.number(field));
            let primary = if *descending { primary.reverse() } else { primary };
            primary.then_with(|| tie_break(*a, *b))
        }),
        OrderBy::SourceRank(ranking) => {
            let rank = |e: &MergedEntity| {
                e.sources
                    .iter()
                    .filter_map(|s| ranking.iter().position(|r| r == s))
                    .min()
                    .unwrap_or(ranking.len())
            };
            view.sort_by(|a, b| rank(*a).cmp(&rank(*b)).then_with(|| tie_break(*a, *b)))
        }
    }
}

// Missing scores rank below every present score
fn compare_scores(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
