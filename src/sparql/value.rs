//! Value helpers for Wikidata identifiers and media URLs

const ENTITY_PAGE: &str = "https://www.wikidata.org/wiki/";

/// Extract the short id (e.g. `Q12345`) from a full entity URI.
/// Values without a slash are returned unchanged.
pub fn qid_from_uri(uri: &str) -> &str {
    match uri.rfind('/') {
        Some(i) => &uri[i + 1..],
        None => uri,
    }
}

/// Wikidata entity page for a QID
pub fn entity_url(qid: &str) -> String {
    format!("{}{}", ENTITY_PAGE, qid)
}

/// Resized Commons image URL. The endpoint returns
/// `Special:FilePath` URLs which accept a `width` parameter.
pub fn thumb(file_url: &str, width: u32) -> String {
    if file_url.is_empty() {
        return String::new();
    }
    let sep = if file_url.contains('?') { '&' } else { '?' };
    format!("{}{}width={}", file_url, sep, width)
}
