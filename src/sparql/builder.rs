//! SPARQL Query Builder
//!
//! Composable clause helpers (label service, VALUES lists, entity search)
//! and a small `SELECT` builder that joins them into query text.

/// Escape a string for use inside a double-quoted SPARQL literal
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}

/// Prefixed entity reference, e.g. `wd:Q5`
pub fn wd(qid: &str) -> String {
    format!("wd:{}", qid)
}

/// `SERVICE wikibase:label` clause with the multilingual fallback
pub fn label_service(lang: &str) -> String {
    format!(
        "SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"{},mul\" . }}",
        lang
    )
}

/// `VALUES ?var { wd:Q1 wd:Q2 }`
pub fn values_clause<S: AsRef<str>>(variable: &str, qids: &[S]) -> String {
    let items: Vec<String> = qids.iter().map(|q| wd(q.as_ref())).collect();
    format!("VALUES {} {{ {} }}", variable, items.join(" "))
}

/// MediaWiki `EntitySearch` binding `variable` to the matching items
pub fn entity_search_service(variable: &str, term: &str, lang: &str) -> String {
    [
        "SERVICE wikibase:mwapi {".to_string(),
        "    bd:serviceParam wikibase:endpoint \"www.wikidata.org\";".to_string(),
        "                    wikibase:api \"EntitySearch\";".to_string(),
        format!("                    mwapi:search \"{}\";", escape_literal(term)),
        format!("                    mwapi:language \"{}\".", escape_literal(lang)),
        format!("    {} wikibase:apiOutputItem mwapi:item.", variable),
        "  }".to_string(),
    ]
    .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    Raw(String),
    Optional(String),
    Union(Vec<String>),
    Filter(String),
}

/// Builder for `SELECT` queries
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    distinct: bool,
    projection: Vec<String>,
    clauses: Vec<Clause>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<usize>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add projected variables or expressions (`?x`, `(COUNT(?y) AS ?n)`)
    pub fn select<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.extend(vars.into_iter().map(Into::into));
        self
    }

    /// Add a raw triple pattern or service clause
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.clauses.push(Clause::Raw(pattern.into()));
        self
    }

    pub fn optional(mut self, pattern: impl Into<String>) -> Self {
        self.clauses.push(Clause::Optional(pattern.into()));
        self
    }

    /// Alternatives joined with `UNION`
    pub fn union<I, S>(mut self, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.clauses.push(Clause::Union(branches.into_iter().map(Into::into).collect()));
        self
    }

    pub fn values<S: AsRef<str>>(self, variable: &str, qids: &[S]) -> Self {
        let clause = values_clause(variable, qids);
        self.pattern(clause)
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.clauses.push(Clause::Filter(expression.into()));
        self
    }

    pub fn label_service(self, lang: &str) -> Self {
        let clause = label_service(lang);
        self.pattern(clause)
    }

    pub fn group_by<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by.extend(vars.into_iter().map(Into::into));
        self
    }

    pub fn order_by(mut self, key: impl Into<String>) -> Self {
        self.order_by.push(key.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render the query text
    pub fn build(&self) -> String {
        let mut lines = Vec::new();
        let projection = if self.projection.is_empty() {
            "*".to_string()
        } else {
            self.projection.join(" ")
        };
        lines.push(format!(
            "SELECT {}{} WHERE {{",
            if self.distinct { "DISTINCT " } else { "" },
            projection
        ));

        for clause in &self.clauses {
            match clause {
                Clause::Raw(p) => lines.push(format!("  {}", p)),
                Clause::Optional(p) => lines.push(format!("  OPTIONAL {{ {} }}", p)),
                Clause::Filter(e) => lines.push(format!("  FILTER({})", e)),
                Clause::Union(branches) => {
                    for (i, b) in branches.iter().enumerate() {
                        if i > 0 {
                            lines.push("  UNION".to_string());
                        }
                        lines.push(format!("  {{ {} }}", b));
                    }
                }
            }
        }
        lines.push("}".to_string());

        if !self.group_by.is_empty() {
            lines.push(format!("GROUP BY {}", self.group_by.join(" ")));
        }
        if !self.order_by.is_empty() {
            lines.push(format!("ORDER BY {}", self.order_by.join(" ")));
        }
        if let Some(limit) = self.limit {
            lines.push(format!("LIMIT {}", limit));
        }
        lines.join("\n")
    }
}

impl std::fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.build())
    }
}
