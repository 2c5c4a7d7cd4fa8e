use crate::models::{BrandMention, BrandSourceMapping, ContentType, Prominence, Source};

/// Assign each mention its citation sources, a content-type classification,
/// and a prominence tier.
///
/// A mention is attributed to every source whose title or URL contains the
/// brand name (the URL is compared against the name with whitespace
/// stripped). When nothing matches and at least one source exists, the
/// first source is attributed so no mention is left without provenance.
pub fn attribute(
    mentions: &[BrandMention],
    query: &str,
    response: &str,
    sources: &[Source],
) -> Vec<BrandSourceMapping> {
    let content_type = classify_content_type(query, response);

    mentions
        .iter()
        .map(|mention| {
            let name_lower = mention.name.to_lowercase();
            let url_needle: String = name_lower.split_whitespace().collect();

            let mut mentioned_in_sources: Vec<String> = sources
                .iter()
                .filter(|s| {
                    s.title.to_lowercase().contains(&name_lower)
                        || s.url.to_lowercase().contains(&url_needle)
                })
                .map(|s| s.url.clone())
                .collect();

            if mentioned_in_sources.is_empty() {
                if let Some(first) = sources.first() {
                    mentioned_in_sources.push(first.url.clone());
                }
            }

            BrandSourceMapping {
                brand: mention.name.clone(),
                mentioned_in_sources,
                content_type,
                prominence: prominence_for(mention.position),
            }
        })
        .collect()
}

/// Classify a query/response pair by keyword, first matching rule wins:
/// comparison, then review, then list, then tutorial, then general.
pub fn classify_content_type(query: &str, response: &str) -> ContentType {
    let haystack = format!("{} {}", query.to_lowercase(), response.to_lowercase());

    if ["vs", "compare", "comparison"]
        .iter()
        .any(|kw| haystack.contains(kw))
    {
        ContentType::Comparison
    } else if haystack.contains("review") {
        ContentType::Review
    } else if ["best", "top"].iter().any(|kw| haystack.contains(kw)) {
        ContentType::List
    } else if ["how to", "tutorial"].iter().any(|kw| haystack.contains(kw)) {
        ContentType::Tutorial
    } else {
        ContentType::General
    }
}

/// Prominence tier from a mention's position.
pub fn prominence_for(position: u32) -> Prominence {
    if position <= 2 {
        Prominence::High
    } else if position <= 4 {
        Prominence::Medium
    } else {
        Prominence::Low
    }
}

/// Build the synthetic citation list for one query.
///
/// No real citation-following happens, so every result gets a plausible,
/// deterministic set of sources derived only from the query and the known
/// brand list: encyclopedia and review-platform pages for the leading known
/// brands plus a topical listicle and press article. Identical inputs
/// always produce identical sources.
pub fn synthesize_sources(query: &str, known_brands: &[String]) -> Vec<Source> {
    let mut sources = Vec::new();
    let topic_slug = slug(query);

    for brand in known_brands.iter().take(2) {
        sources.push(Source {
            title: format!("{} - Wikipedia", brand),
            url: format!("https://en.wikipedia.org/wiki/{}", brand.replace(' ', "_")),
        });
    }

    for brand in known_brands.iter().take(2) {
        sources.push(Source {
            title: format!("{} Reviews | G2", brand),
            url: format!("https://www.g2.com/products/{}/reviews", slug(brand)),
        });
    }

    if let Some(brand) = known_brands.first() {
        sources.push(Source {
            title: format!("{} Pricing & Reviews - Capterra", brand),
            url: format!("https://www.capterra.com/p/{}/", slug(brand)),
        });
    }

    sources.push(Source {
        title: format!("Top picks: {}", query),
        url: format!("https://medium.com/toolstack/{}", topic_slug),
    });
    sources.push(Source {
        title: format!("How teams shop for {}", query),
        url: format!("https://techcrunch.com/tag/{}/", topic_slug),
    });

    sources
}

/// Lowercased, dash-separated token form of a string, for synthetic URLs.
fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_dash = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;
    use pretty_assertions::assert_eq;

    fn mention(name: &str, position: u32) -> BrandMention {
        BrandMention {
            name: name.to_string(),
            position,
            sentiment: Sentiment::Neutral,
            is_known: true,
        }
    }

    fn source(title: &str, url: &str) -> Source {
        Source {
            title: title.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn comparison_wins_over_list_keywords() {
        assert_eq!(
            classify_content_type("Notion vs Asana: which is the best?", ""),
            ContentType::Comparison
        );
    }

    #[test]
    fn review_keyword_classifies_as_review() {
        assert_eq!(
            classify_content_type("honest review of meeting tools", ""),
            ContentType::Review
        );
    }

    #[test]
    fn best_and_top_classify_as_list() {
        assert_eq!(
            classify_content_type("best meeting assistant", ""),
            ContentType::List
        );
        assert_eq!(
            classify_content_type("top CRM for startups", ""),
            ContentType::List
        );
    }

    #[test]
    fn how_to_classifies_as_tutorial() {
        assert_eq!(
            classify_content_type("how to record meeting notes", ""),
            ContentType::Tutorial
        );
    }

    #[test]
    fn response_text_participates_in_classification() {
        assert_eq!(
            classify_content_type(
                "meeting note tools",
                "Most reviews put Otter first."
            ),
            ContentType::Review
        );
    }

    #[test]
    fn plain_query_classifies_as_general() {
        assert_eq!(
            classify_content_type("I need a tool for meeting notes", ""),
            ContentType::General
        );
    }

    #[test]
    fn sources_match_on_title_and_url() {
        let sources = vec![
            source("Otter.ai - Wikipedia", "https://en.wikipedia.org/wiki/Otter.ai"),
            source("Copy AI Reviews | G2", "https://www.g2.com/products/copyai/reviews"),
            source("Unrelated", "https://example.com/post"),
        ];
        let mentions = vec![mention("Otter.ai", 1), mention("Copy AI", 2)];

        let mappings = attribute(&mentions, "note taking tools", "", &sources);

        assert_eq!(
            mappings[0].mentioned_in_sources,
            vec!["https://en.wikipedia.org/wiki/Otter.ai".to_string()]
        );
        // Whitespace is stripped from the brand name before URL comparison.
        assert!(mappings[1]
            .mentioned_in_sources
            .contains(&"https://www.g2.com/products/copyai/reviews".to_string()));
    }

    #[test]
    fn unmatched_mention_falls_back_to_first_source() {
        let sources = vec![
            source("Some roundup", "https://example.com/roundup"),
            source("Another post", "https://example.com/other"),
        ];
        let mappings = attribute(&[mention("Acme", 1)], "team tools", "", &sources);

        assert_eq!(
            mappings[0].mentioned_in_sources,
            vec!["https://example.com/roundup".to_string()]
        );
    }

    #[test]
    fn no_sources_leaves_attribution_empty() {
        let mappings = attribute(&[mention("Acme", 1)], "team tools", "", &[]);
        assert!(mappings[0].mentioned_in_sources.is_empty());
    }

    #[test]
    fn prominence_tiers_follow_position() {
        assert_eq!(prominence_for(1), Prominence::High);
        assert_eq!(prominence_for(2), Prominence::High);
        assert_eq!(prominence_for(3), Prominence::Medium);
        assert_eq!(prominence_for(4), Prominence::Medium);
        assert_eq!(prominence_for(5), Prominence::Low);
    }

    #[test]
    fn synthesized_sources_are_deterministic() {
        let brands = vec!["Otter.ai".to_string(), "Fireflies".to_string()];
        let a = synthesize_sources("best meeting assistant", &brands);
        let b = synthesize_sources("best meeting assistant", &brands);

        let urls_a: Vec<_> = a.iter().map(|s| s.url.clone()).collect();
        let urls_b: Vec<_> = b.iter().map(|s| s.url.clone()).collect();
        assert_eq!(urls_a, urls_b);
    }

    #[test]
    fn synthesized_sources_cover_key_platforms() {
        let brands = vec!["Otter.ai".to_string()];
        let sources = synthesize_sources("best meeting assistant", &brands);

        assert!(sources.iter().any(|s| s.url.contains("wikipedia")));
        assert!(sources.iter().any(|s| s.url.contains("g2.com")));
        assert!(sources.iter().any(|s| s.url.contains("capterra")));
        assert!(sources.iter().any(|s| s.url.contains("medium.com")));
        assert!(sources.iter().any(|s| s.url.contains("techcrunch")));
    }

    #[test]
    fn no_known_brands_still_yields_topical_sources() {
        let sources = synthesize_sources("note taking tools", &[]);
        assert_eq!(sources.len(), 2);
        assert!(sources.iter().all(|s| !s.url.contains("wikipedia")));
    }
}
