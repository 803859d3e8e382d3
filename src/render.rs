//! Plain-text rendering of listing views for the terminal

use std::fmt::Write;

use crate::aggregate::{FilterMode, Progress, SourceFilter, SourceStatus};
use crate::i18n::Translator;
use crate::listings::{Card, ListingView};
use crate::utils::truncate_chars;

const DESCRIPTION_CHARS: usize = 90;

/// One line per source: category, state, row count or error
pub fn progress(progress: &Progress, t: &Translator) -> String {
    let done = (progress.total - progress.pending).to_string();
    let total = progress.total.to_string();
    let mut out = t.t_with("progress.sources", &[("done", done.as_str()), ("total", total.as_str())]);

    for source in &progress.sources {
        let name = source
            .category
            .as_deref()
            .map(|key| t.t(key))
            .unwrap_or_else(|| source.source.to_string());
        let state = match &source.status {
            SourceStatus::Pending => "…".to_string(),
            SourceStatus::Done { rows } => format!("✓ {}", rows),
            SourceStatus::Error { message } => format!("✗ {}", message),
            SourceStatus::Cancelled => "– cancelled".to_string(),
            SourceStatus::TimedOut => "⏱ timed out".to_string(),
        };
        let _ = write!(out, "\n   {:<16} {}", name, state);
    }
    if progress.is_settled() && (progress.failed > 0 || progress.cancelled > 0) && progress.succeeded > 0 {
        let _ = write!(out, "\n   {}", t.t("progress.partial"));
    }
    out
}

/// Source toggles, `[x]` for enabled sources
pub fn filter(filter: &SourceFilter) -> String {
    let toggles: Vec<String> = filter
        .sources()
        .iter()
        .map(|s| format!("[{}] {}", if filter.is_enabled(s) { "x" } else { " " }, s))
        .collect();
    let mode = match filter.mode() {
        FilterMode::All => "all".to_string(),
        FilterMode::Exclusive(s) => format!("only {}", s),
        FilterMode::Custom => "custom".to_string(),
    };
    format!("{}  ({})", toggles.join("  "), mode)
}

pub fn card(card: &Card) -> String {
    let mut out = format!("• {}", card.title);
    if let Some(subtitle) = &card.subtitle {
        let _ = write!(out, " · {}", subtitle);
    }
    if !card.tags.is_empty() {
        let _ = write!(out, " [{}]", card.tags.join(", "));
    }
    if let Some(description) = &card.description {
        let _ = write!(out, "\n    {}", truncate_chars(description, DESCRIPTION_CHARS));
    }
    let _ = write!(out, "\n    {}", card.link);
    out
}

/// Summary line followed by every card
pub fn view(view: &ListingView) -> String {
    let mut out = view.summary.clone();
    for c in &view.cards {
        out.push('\n');
        out.push_str(&card(c));
    }
    out
}
