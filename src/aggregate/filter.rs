//! Source Filter
//!
//! Per-source enable map with the exclusive-select / select-all toggle:
//!
//! - all enabled, click X: only X
//! - only X, click X: all enabled
//! - only X, click Y: X and Y
//!
//! The enabled set is never empty.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{MergedEntity, SourceKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "source", rename_all = "snake_case")]
pub enum FilterMode {
    All,
    Exclusive(SourceKey),
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFilter {
    sources: Vec<SourceKey>,
    enabled: BTreeSet<SourceKey>,
    mode: FilterMode,
}

impl SourceFilter {
    /// All of `sources` enabled
    pub fn new<I: IntoIterator<Item = SourceKey>>(sources: I) -> Self {
        let mut seen = BTreeSet::new();
        let sources: Vec<SourceKey> = sources.into_iter().filter(|s| seen.insert(s.clone())).collect();
        Self {
            enabled: seen,
            sources,
            mode: FilterMode::All,
        }
    }

    pub fn sources(&self) -> &[SourceKey] {
        &self.sources
    }

    pub fn mode(&self) -> &FilterMode {
        &self.mode
    }

    pub fn enabled(&self) -> &BTreeSet<SourceKey> {
        &self.enabled
    }

    pub fn is_enabled(&self, source: &SourceKey) -> bool {
        self.enabled.contains(source)
    }

    pub fn is_all(&self) -> bool {
        self.mode == FilterMode::All
    }

    pub fn select_all(&mut self) {
        self.enabled = self.sources.iter().cloned().collect();
        self.mode = FilterMode::All;
    }

    /// Apply one click on `source`. Unknown sources are ignored and
    /// return `false`.
    pub fn click(&mut self, source: &SourceKey) -> bool {
        if !self.sources.contains(source) {
            return false;
        }

        match self.mode.clone() {
            FilterMode::All => self.only(source),
            FilterMode::Exclusive(current) if &current == source => self.select_all(),
            FilterMode::Exclusive(_) | FilterMode::Custom => {
                if self.enabled.contains(source) {
                    self.enabled.remove(source);
                } else {
                    self.enabled.insert(source.clone());
                }
                self.settle_mode();
            }
        }
        true
    }

    fn only(&mut self, source: &SourceKey) {
        self.enabled = BTreeSet::from([source.clone()]);
        self.mode = FilterMode::Exclusive(source.clone());
    }

    fn settle_mode(&mut self) {
        match self.enabled.len() {
            0 => self.select_all(),
            n if n == self.sources.len() => self.mode = FilterMode::All,
            1 => {
                let remaining = self.enabled.iter().next().cloned();
                if let Some(source) = remaining {
                    self.mode = FilterMode::Exclusive(source);
                }
            }
            _ => self.mode = FilterMode::Custom,
        }
    }

    /// Whether an entity with these sources passes
    pub fn admits(&self, sources: &BTreeSet<SourceKey>) -> bool {
        self.is_all() || sources.iter().any(|s| self.enabled.contains(s))
    }

    /// Filtered view, order preserved
    pub fn apply<'a>(&self, entities: &[&'a MergedEntity]) -> Vec<&'a MergedEntity> {
        entities
            .iter()
            .copied()
            .filter(|e| self.admits(e.sources()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> SourceFilter {
        SourceFilter::new(["A", "B", "C"].map(SourceKey::from))
    }

    fn enabled(f: &SourceFilter) -> Vec<&str> {
        f.enabled().iter().map(|s| s.as_str()).collect()
    }

    #[test]
    fn test_default_all_enabled() {
        let f = abc();
        assert!(f.is_all());
        assert_eq!(enabled(&f), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_click_sequence() {
        let mut f = abc();
        f.click(&"A".into());
        assert_eq!(f.mode(), &FilterMode::Exclusive("A".into()));
        assert_eq!(enabled(&f), vec!["A"]);

        f.click(&"A".into());
        assert!(f.is_all());
        assert_eq!(enabled(&f), vec!["A", "B", "C"]);

        f.click(&"A".into());
        f.click(&"B".into());
        assert_eq!(f.mode(), &FilterMode::Custom);
        assert_eq!(enabled(&f), vec!["A", "B"]);
    }

    #[test]
    fn test_never_all_false() {
        let mut f = abc();
        f.click(&"A".into());
        f.click(&"B".into());
        // drop B, back to A alone
        f.click(&"B".into());
        assert_eq!(f.mode(), &FilterMode::Exclusive("A".into()));
        // A is sole-enabled: resets instead of emptying
        f.click(&"A".into());
        assert!(f.is_all());
        assert!(!f.enabled().is_empty());
    }

    #[test]
    fn test_completing_the_set_returns_to_all() {
        let mut f = abc();
        f.click(&"A".into());
        f.click(&"B".into());
        f.click(&"C".into());
        assert!(f.is_all());
    }

    #[test]
    fn test_unknown_source_ignored() {
        let mut f = abc();
        assert!(!f.click(&"Z".into()));
        assert!(f.is_all());
    }

    #[test]
    fn test_duplicate_sources_collapsed() {
        let f = SourceFilter::new(["A", "A", "B"].map(SourceKey::from));
        assert_eq!(f.sources().len(), 2);
    }
}
