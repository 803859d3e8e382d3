//! Result Rows
//!
//! A row is one SPARQL solution: an ordered map from variable name to a
//! scalar value. Absent variables are simply missing keys.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::qid_from_uri;

const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
const NUMERIC_TYPES: &[&str] = &["integer", "decimal", "double", "float", "int", "long"];

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Blank cells are filled in by later sources during a merge
    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Text(s) => s.trim().is_empty(),
            Scalar::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

/// One solution returned by a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRow {
    fields: BTreeMap<String, Scalar>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for fixtures
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Scalar>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.fields.get(field)
    }

    /// True if the field is absent or holds blank text
    pub fn is_blank(&self, field: &str) -> bool {
        self.fields.get(field).map_or(true, Scalar::is_blank)
    }

    /// Plain text of a cell, empty string when missing
    pub fn text(&self, field: &str) -> String {
        self.fields.get(field).map(|v| v.to_string()).unwrap_or_default()
    }

    /// Short entity id (e.g. `Q42`) of a URI-valued cell, empty when missing
    pub fn qid(&self, field: &str) -> String {
        qid_from_uri(&self.text(field)).to_string()
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Scalar::as_number)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Scalar)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = ResultRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// SPARQL JSON RESULTS
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SparqlResults {
    results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<BTreeMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    value: String,
    #[serde(default)]
    datatype: Option<String>,
}

impl SparqlTerm {
    fn into_scalar(self) -> Scalar {
        let numeric = self
            .datatype
            .as_deref()
            .and_then(|dt| dt.strip_prefix(XSD))
            .map_or(false, |local| NUMERIC_TYPES.contains(&local));

        if numeric {
            if let Ok(n) = self.value.parse::<f64>() {
                return Scalar::Number(n);
            }
        }
        Scalar::Text(self.value)
    }
}

/// Decode an `application/sparql-results+json` document into rows,
/// preserving binding order.
pub fn parse_bindings(body: &str) -> serde_json::Result<Vec<ResultRow>> {
    let parsed: SparqlResults = serde_json::from_str(body)?;
    Ok(parsed
        .results
        .bindings
        .into_iter()
        .map(|binding| {
            binding
                .into_iter()
                .map(|(var, term)| (var, term.into_scalar()))
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bindings_types_and_order() {
        let body = r#"{
            "head": { "vars": ["city", "cityLabel", "count"] },
            "results": { "bindings": [
                {
                    "city": { "type": "uri", "value": "http://www.wikidata.org/entity/Q90" },
                    "cityLabel": { "xml:lang": "en", "type": "literal", "value": "Paris" },
                    "count": { "datatype": "http://www.w3.org/2001/XMLSchema#integer", "type": "literal", "value": "12" }
                },
                {
                    "city": { "type": "uri", "value": "http://www.wikidata.org/entity/Q64" },
                    "count": { "datatype": "http://www.w3.org/2001/XMLSchema#integer", "type": "literal", "value": "3" }
                }
            ] }
        }"#;

        let rows = parse_bindings(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].qid("city"), "Q90");
        assert_eq!(rows[0].text("cityLabel"), "Paris");
        assert_eq!(rows[0].get("count"), Some(&Scalar::Number(12.0)));
        assert_eq!(rows[1].qid("city"), "Q64");
        assert!(rows[1].is_blank("cityLabel"));
    }

    #[test]
    fn test_non_numeric_datatype_stays_text() {
        let body = r#"{"results":{"bindings":[
            {"dob":{"type":"literal","datatype":"http://www.w3.org/2001/XMLSchema#dateTime","value":"1912-06-23T00:00:00Z"}}
        ]}}"#;
        let rows = parse_bindings(body).unwrap();
        assert_eq!(rows[0].get("dob"), Some(&Scalar::Text("1912-06-23T00:00:00Z".into())));
    }

    #[test]
    fn test_parse_rejects_non_results_document() {
        assert!(parse_bindings("<html>rate limited</html>").is_err());
        assert!(parse_bindings(r#"{"head":{}}"#).is_err());
    }

    #[test]
    fn test_scalar_display_and_blank() {
        assert_eq!(Scalar::Number(5.0).to_string(), "5");
        assert_eq!(Scalar::Number(2.5).to_string(), "2.5");
        assert!(Scalar::Text("  ".into()).is_blank());
        assert!(!Scalar::Number(0.0).is_blank());
        assert_eq!(Scalar::Text(" 7 ".into()).as_number(), Some(7.0));
    }
}
