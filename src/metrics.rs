use std::collections::{HashMap, HashSet};

use crate::error::AnalysisError;
use crate::models::{AggregateReport, CompetitorRanking, QueryResult, VisibilityMetrics};

/// Fold a collection of per-query results into brand-level counts,
/// visibility percentages, average position, and competitor rankings.
///
/// Within one result each distinct brand name contributes at most one
/// mention to its aggregate count, folding names case-insensitively — the
/// known-brand and discovery passes can both register slight variants of
/// the same brand. Your own brand is counted from `your_brand_mentioned`
/// only, never by scanning `mentioned_brands`, which closes the second
/// double-count path.
///
/// An empty results slice is valid and yields zeros. A missing company
/// name is a caller contract violation.
pub fn aggregate(
    results: &[QueryResult],
    company_name: &str,
    competitor_names: &[String],
) -> Result<AggregateReport, AnalysisError> {
    let company = company_name.trim();
    if company.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "company name is required".to_string(),
        ));
    }
    let company_lower = company.to_lowercase();

    // Tracked brands in presentation order: your brand, then competitors.
    let mut order: Vec<String> = vec![company.to_string()];
    let mut counts: HashMap<String, usize> = HashMap::new();
    counts.insert(company_lower.clone(), 0);
    for name in competitor_names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_lowercase();
        if !counts.contains_key(&lower) {
            counts.insert(lower, 0);
            order.push(trimmed.to_string());
        }
    }

    for result in results {
        if result.your_brand_mentioned {
            if let Some(count) = counts.get_mut(&company_lower) {
                *count += 1;
            }
        }

        let mut unique_in_result: HashSet<String> = HashSet::new();
        for brand in &result.mentioned_brands {
            let lower = brand.name.to_lowercase();
            if lower != company_lower && counts.contains_key(&lower) {
                unique_in_result.insert(lower);
            }
        }
        for lower in unique_in_result {
            if let Some(count) = counts.get_mut(&lower) {
                *count += 1;
            }
        }
    }

    let total = results.len();
    let mut rankings: Vec<CompetitorRanking> = order
        .iter()
        .map(|name| {
            let lower = name.to_lowercase();
            let mentions = counts[&lower];
            CompetitorRanking {
                name: name.clone(),
                mentions,
                visibility_percentage: percentage(mentions, total),
                is_you: lower == company_lower,
            }
        })
        .collect();
    // Stable sort on raw mention count; ties keep tracked order.
    rankings.sort_by(|a, b| b.mentions.cmp(&a.mentions));

    let positions: Vec<u32> = results
        .iter()
        .filter(|r| r.your_brand_mentioned)
        .filter_map(|r| r.your_brand_position)
        .collect();
    let avg_position = if positions.is_empty() {
        0.0
    } else {
        positions.iter().map(|p| f64::from(*p)).sum::<f64>() / positions.len() as f64
    };

    let mention_count = results.iter().filter(|r| r.your_brand_mentioned).count();

    Ok(AggregateReport {
        visibility_percentage: percentage(mention_count, total),
        mention_count,
        total_prompts: total,
        avg_position,
        rankings,
    })
}

/// Derive the dashboard metric snapshot from an aggregate report.
///
/// The top source is the domain cited most often across all results
/// (ties break toward the lexicographically smaller domain); with no
/// sources at all, the assistant itself is reported as the source.
pub fn visibility_metrics(report: &AggregateReport, results: &[QueryResult]) -> VisibilityMetrics {
    let mut domain_counts: HashMap<String, usize> = HashMap::new();
    for result in results {
        for source in &result.sources {
            if let Some(domain) = source_domain(&source.url) {
                *domain_counts.entry(domain).or_insert(0) += 1;
            }
        }
    }

    let (top_source, top_source_mentions) = domain_counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .unwrap_or_else(|| ("ChatGPT".to_string(), report.mention_count));

    let closest = report.rankings.iter().find(|r| !r.is_you);
    let brand_ranking = report
        .rankings
        .iter()
        .position(|r| r.is_you)
        .map(|i| i + 1)
        .unwrap_or(report.rankings.len() + 1);

    VisibilityMetrics {
        visibility_percentage: report.visibility_percentage,
        total_prompts: report.total_prompts,
        mention_count: report.mention_count,
        avg_position: report.avg_position,
        top_source,
        top_source_mentions,
        closest_competitor: closest.map(|c| c.name.clone()).unwrap_or_else(|| "None".to_string()),
        closest_competitor_mentions: closest.map(|c| c.mentions).unwrap_or(0),
        brand_ranking,
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Host part of a URL with any `www.` prefix removed.
fn source_domain(url: &str) -> Option<String> {
    let rest = url.split("://").nth(1).unwrap_or(url);
    let host = rest.split('/').next()?.trim();
    if host.is_empty() || !host.contains('.') {
        return None;
    }
    Some(host.trim_start_matches("www.").to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrandMention, Sentiment, Source};
    use pretty_assertions::assert_eq;

    fn mention(name: &str, position: u32, is_known: bool) -> BrandMention {
        BrandMention {
            name: name.to_string(),
            position,
            sentiment: Sentiment::Neutral,
            is_known,
        }
    }

    fn result(
        query: &str,
        brands: Vec<BrandMention>,
        your_brand_mentioned: bool,
        your_brand_position: Option<u32>,
    ) -> QueryResult {
        QueryResult {
            query: query.to_string(),
            response: String::new(),
            mentioned_brands: brands,
            your_brand_mentioned,
            your_brand_position,
            sources: vec![],
            brand_source_mappings: vec![],
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_result_ranks_mentioned_competitor_first() {
        let results = vec![result(
            "best meeting assistant",
            vec![
                mention("Otter.ai", 1, true),
                mention("Fireflies", 2, false),
            ],
            false,
            None,
        )];

        let report = aggregate(&results, "Acme", &names(&["Otter.ai"])).unwrap();

        assert_eq!(report.total_prompts, 1);
        assert_eq!(report.mention_count, 0);
        assert_eq!(report.visibility_percentage, 0.0);
        assert_eq!(report.avg_position, 0.0);

        assert_eq!(report.rankings.len(), 2);
        assert_eq!(report.rankings[0].name, "Otter.ai");
        assert_eq!(report.rankings[0].mentions, 1);
        assert_eq!(report.rankings[0].visibility_percentage, 100.0);
        assert_eq!(report.rankings[1].name, "Acme");
        assert_eq!(report.rankings[1].mentions, 0);
        assert_eq!(report.rankings[1].visibility_percentage, 0.0);
    }

    #[test]
    fn duplicate_brand_variants_count_once_per_result() {
        // Known-brand and discovery passes both registered "Notion".
        let results = vec![result(
            "best wiki",
            vec![mention("Notion", 1, true), mention("notion", 2, false)],
            false,
            None,
        )];

        let report = aggregate(&results, "Acme", &names(&["Notion"])).unwrap();
        let notion = report.rankings.iter().find(|r| r.name == "Notion").unwrap();
        assert_eq!(notion.mentions, 1);
    }

    #[test]
    fn own_brand_is_counted_from_the_flag_only() {
        // A mention row carrying the company name must not add a second
        // count on top of your_brand_mentioned.
        let mentioned = vec![result(
            "q",
            vec![mention("Acme", 1, true)],
            true,
            Some(1),
        )];
        let report = aggregate(&mentioned, "Acme", &[]).unwrap();
        assert_eq!(report.rankings[0].mentions, 1);

        // Conversely, without the flag the mention rows are ignored.
        let unflagged = vec![result("q", vec![mention("Acme", 1, true)], false, None)];
        let report = aggregate(&unflagged, "Acme", &[]).unwrap();
        assert_eq!(report.rankings[0].mentions, 0);
    }

    #[test]
    fn untracked_brands_stay_out_of_rankings() {
        let results = vec![result(
            "q",
            vec![mention("Widgetly", 1, false)],
            false,
            None,
        )];
        let report = aggregate(&results, "Acme", &names(&["Otter.ai"])).unwrap();
        assert!(report.rankings.iter().all(|r| r.name != "Widgetly"));
    }

    #[test]
    fn empty_results_yield_zeros_not_errors() {
        let report = aggregate(&[], "Acme", &names(&["Otter.ai"])).unwrap();
        assert_eq!(report.total_prompts, 0);
        assert_eq!(report.mention_count, 0);
        assert_eq!(report.visibility_percentage, 0.0);
        assert_eq!(report.avg_position, 0.0);
        assert!(report.rankings.iter().all(|r| r.visibility_percentage == 0.0));
    }

    #[test]
    fn missing_company_name_is_rejected() {
        assert!(aggregate(&[], "", &[]).is_err());
        assert!(aggregate(&[], "   ", &[]).is_err());
    }

    #[test]
    fn empty_competitor_list_ranks_company_alone() {
        let report = aggregate(&[], "Acme", &[]).unwrap();
        assert_eq!(report.rankings.len(), 1);
        assert_eq!(report.rankings[0].name, "Acme");
        assert!(report.rankings[0].is_you);
    }

    #[test]
    fn rankings_sort_by_raw_mentions_with_stable_ties() {
        let results = vec![
            result("q1", vec![mention("Beta", 1, true)], true, Some(2)),
            result("q2", vec![mention("Beta", 1, true)], false, None),
            result("q3", vec![mention("Gamma", 1, true)], false, None),
        ];
        let report = aggregate(&results, "Acme", &names(&["Beta", "Gamma"])).unwrap();

        assert_eq!(report.rankings[0].name, "Beta"); // 2 mentions
        // Acme and Gamma tie at 1; Acme keeps its earlier tracked slot.
        assert_eq!(report.rankings[1].name, "Acme");
        assert_eq!(report.rankings[2].name, "Gamma");
    }

    #[test]
    fn avg_position_covers_only_mentioned_results() {
        let results = vec![
            result("q1", vec![], true, Some(1)),
            result("q2", vec![], true, Some(3)),
            result("q3", vec![], false, None),
        ];
        let report = aggregate(&results, "Acme", &[]).unwrap();
        assert_eq!(report.avg_position, 2.0);
        assert_eq!(report.mention_count, 2);
        assert!((report.visibility_percentage - 66.666).abs() < 0.01);
    }

    #[test]
    fn top_source_is_most_cited_domain() {
        let mut r1 = result("q1", vec![], true, Some(1));
        r1.sources = vec![
            Source {
                title: "A".into(),
                url: "https://en.wikipedia.org/wiki/Acme".into(),
            },
            Source {
                title: "B".into(),
                url: "https://www.g2.com/products/acme/reviews".into(),
            },
        ];
        let mut r2 = result("q2", vec![], false, None);
        r2.sources = vec![Source {
            title: "C".into(),
            url: "https://en.wikipedia.org/wiki/Widgetly".into(),
        }];

        let results = vec![r1, r2];
        let report = aggregate(&results, "Acme", &[]).unwrap();
        let metrics = visibility_metrics(&report, &results);

        assert_eq!(metrics.top_source, "en.wikipedia.org");
        assert_eq!(metrics.top_source_mentions, 2);
    }

    #[test]
    fn metrics_without_sources_fall_back_to_the_assistant() {
        let results = vec![result("q", vec![], true, Some(1))];
        let report = aggregate(&results, "Acme", &names(&["Beta"])).unwrap();
        let metrics = visibility_metrics(&report, &results);

        assert_eq!(metrics.top_source, "ChatGPT");
        assert_eq!(metrics.top_source_mentions, 1);
        assert_eq!(metrics.closest_competitor, "Beta");
        assert_eq!(metrics.brand_ranking, 1);
    }
}
