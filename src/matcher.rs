use regex::RegexBuilder;

/// Domain-style suffixes that carry no signal when matching a brand name
/// against free text.
const DOMAIN_SUFFIXES: &[&str] = &[".ai", ".io", ".com", ".co", ".app", ".so"];

/// Decide whether a brand name is present in a block of free text.
///
/// Assistant responses phrase brand names inconsistently (with or without a
/// domain suffix, with or without an "AI" qualifier), so matching is layered,
/// short-circuiting on the first strategy that fires:
///
/// 1. case-insensitive substring containment of the literal name;
/// 2. substring containment of the suffix-stripped base name;
/// 3. substring containment of `base name + " ai"` ("Otter.ai" → "Otter AI");
/// 4. word-boundary regex match of the escaped literal name;
/// 5. word-boundary regex match of the base name when longer than 2 chars.
///
/// Substring containment runs first, so "Zoom" matches inside "ZoomInfo".
pub fn is_mentioned(brand_name: &str, text: &str) -> bool {
    let brand = brand_name.trim();
    if brand.is_empty() || text.is_empty() {
        return false;
    }

    let text_lower = text.to_lowercase();
    let brand_lower = brand.to_lowercase();

    if text_lower.contains(&brand_lower) {
        return true;
    }

    let base = base_name(brand);
    if !base.is_empty() && base != brand_lower && text_lower.contains(&base) {
        return true;
    }

    if !base.is_empty() {
        let with_qualifier = format!("{} ai", base);
        if text_lower.contains(&with_qualifier) {
            return true;
        }
    }

    if word_boundary_match(brand, text) {
        return true;
    }

    if base.len() > 2 && word_boundary_match(&base, text) {
        return true;
    }

    false
}

/// Lowercased brand name with any domain-style suffix or trailing
/// standalone "ai"/"io" token removed.
pub fn base_name(brand_name: &str) -> String {
    let lowered = brand_name.trim().to_lowercase();

    for suffix in DOMAIN_SUFFIXES {
        if let Some(base) = lowered.strip_suffix(suffix) {
            return base.trim().to_string();
        }
    }

    for token in [" ai", " io"] {
        if let Some(base) = lowered.strip_suffix(token) {
            return base.trim().to_string();
        }
    }

    lowered
}

/// Case-insensitive word-boundary match of `name` against `text`. Regex
/// construction failure counts as a non-match for this strategy only.
fn word_boundary_match(name: &str, text: &str) -> bool {
    let pattern = format!(r"\b{}\b", regex::escape(name));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}
