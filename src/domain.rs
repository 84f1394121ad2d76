/// Company website normalization for lookups and guesses

/// Strip the scheme and a trailing slash from a company website
///
/// This is the form sent to the provider and used in cache keys.
///
/// Examples:
/// - https://acme.com/ → acme.com
/// - http://www.acme.com → www.acme.com
/// - acme.com → acme.com
pub fn clean_domain(website: &str) -> Option<String> {
    let trimmed = website.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let cleaned = without_scheme.strip_suffix('/').unwrap_or(without_scheme);

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Domain part of a heuristic `first@domain` guess
///
/// Like `clean_domain`, but also drops a leading `www.` label and lower-cases.
///
/// Examples:
/// - https://www.acme.com/ → acme.com
/// - WWW.Acme.COM → acme.com
pub fn guess_domain(website: &str) -> Option<String> {
    let cleaned = clean_domain(website)?.to_lowercase();
    let bare = cleaned.strip_prefix("www.").unwrap_or(&cleaned);

    if bare.is_empty() {
        None
    } else {
        Some(bare.to_string())
    }
}
