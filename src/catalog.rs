//! Wikidata vocabulary
//!
//! The class and property identifiers the listings query for. The catalog
//! changes independently of the code, so it can be replaced by a JSON file
//! with the same shape.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// LGBT community centres, museums, archives, libraries, historic places
    pub place_types: Vec<String>,
    /// LGBTQ+ events, protests, pride events
    pub event_types: Vec<String>,
    /// LGBTQ+ organisations and rights organisations
    pub organization_types: Vec<String>,
    /// Types matched by the topic category of the search page
    pub search_related_types: Vec<String>,
    /// Classes treated as countries or cities by the search page
    pub search_place_classes: Vec<String>,
    pub city_class: String,
    pub country_class: String,
    pub human_class: String,
    /// Gender values excluded when looking for non-cisgender people
    pub binary_genders: Vec<String>,
    /// LGBT rights by country or territory
    pub rights_class: String,
    /// LGBT history and timeline items
    pub history_types: Vec<String>,
}

fn qids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            place_types: qids(&[
                "Q2945640",   // LGBT community center
                "Q118108259", // LGBT information point
                "Q61710650",  // LGBT museum
                "Q64364539",  // LGBT place
                "Q61710689",  // LGBT archive
                "Q62128088",  // LGBT library
                "Q29469577",  // LGBT historic place
            ]),
            event_types: qids(&["Q64348974", "Q125506609", "Q130285134"]),
            organization_types: qids(&["Q64606659", "Q6458277"]),
            search_related_types: qids(&[
                "Q51404", "Q7242811", "Q64606659", "Q6458277", "Q2945640", "Q61710650", "Q105321449",
                "Q1043639", "Q20442589", "Q85133165", "Q17898", "Q17888", "Q48264", "Q29469577",
                "Q62128088",
            ]),
            search_place_classes: qids(&["Q6256", "Q3624078", "Q515"]),
            city_class: "Q515".to_string(),
            country_class: "Q6256".to_string(),
            human_class: "Q5".to_string(),
            binary_genders: qids(&["Q6581097", "Q6581072"]),
            rights_class: "Q17898".to_string(),
            history_types: qids(&["Q130262508", "Q125143610"]),
        }
    }
}

impl Vocabulary {
    /// Load from JSON; missing fields keep their built-in values
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse vocabulary")
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read vocabulary file {}", path.display()))?;
        let vocabulary = Self::from_json(&json)?;
        info!("Loaded vocabulary from {}", path.display());
        Ok(vocabulary)
    }
}
