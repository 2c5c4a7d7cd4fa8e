use crate::matcher;
use crate::models::{BrandMention, Sentiment};

/// Extract the ordered brand mentions for one response.
///
/// Known brands are checked first, in caller order (your brand, then the
/// selected competitors), with the tolerant matcher — this pass is
/// authoritative even when the discovery pass misses or renames a tracked
/// brand. Discovered brands extend coverage to products the assistant
/// volunteered, and are always appended after all known mentions, so
/// `position` reflects detection-pass order rather than where a name sits
/// in the text.
///
/// Names that differ only by case never produce duplicate mentions.
pub fn extract_mentions(
    response: &str,
    known_brands: &[String],
    discovered_brands: &[String],
) -> Vec<BrandMention> {
    let mut mentions: Vec<BrandMention> = Vec::new();
    let mut position: u32 = 1;

    for name in known_brands {
        if !matcher::is_mentioned(name, response) {
            continue;
        }
        if contains_name(&mentions, name) {
            continue;
        }
        mentions.push(BrandMention {
            name: name.clone(),
            position,
            sentiment: Sentiment::Neutral,
            is_known: true,
        });
        position += 1;
    }

    for name in discovered_brands {
        let name = name.trim();
        if name.is_empty() || contains_name(&mentions, name) {
            continue;
        }
        mentions.push(BrandMention {
            name: name.to_string(),
            position,
            sentiment: Sentiment::Neutral,
            is_known: false,
        });
        position += 1;
    }

    mentions
}

fn contains_name(mentions: &[BrandMention], name: &str) -> bool {
    let lowered = name.to_lowercase();
    mentions.iter().any(|m| m.name.to_lowercase() == lowered)
}
