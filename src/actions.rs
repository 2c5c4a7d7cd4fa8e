use std::collections::{BTreeMap, BTreeSet};

use crate::error::AnalysisError;
use crate::matcher;
use crate::models::{
    Action, ActionCategory, ActionEvidence, ActionSummary, ContentType, Effort, Priority,
    QueryResult, Topic,
};

// Policy thresholds. Visibility ceilings are percentages of all results;
// mention ceilings and coverage floors are fractions.
const WIKIPEDIA_VISIBILITY_CEILING: f64 = 50.0;
const REVIEW_SITE_VISIBILITY_CEILING: f64 = 60.0;
const BLOG_VISIBILITY_CEILING: f64 = 50.0;
const COMPARISON_MENTION_CEILING: f64 = 0.5;
const LISTICLE_MENTION_CEILING: f64 = 0.4;
const DECISION_MENTION_CEILING: f64 = 0.4;
const WEAK_TOPIC_COVERAGE_FLOOR: f64 = 0.3;
const LATE_POSITION_FLOOR: f64 = 4.0;
const LISTICLE_QUERY_MINIMUM: usize = 2;

const EVIDENCE_LIMIT: usize = 3;
const SOURCE_URL_LIMIT: usize = 2;
const TOP_COMPETITOR_LIMIT: usize = 3;

/// Generated action plan: the ordered actions plus their roll-up.
#[derive(Debug, Clone)]
pub struct ActionPlan {
    pub actions: Vec<Action>,
    pub summary: ActionSummary,
}

#[derive(Default)]
struct CompetitorStats {
    mentions: usize,
    sources: BTreeSet<String>,
}

struct RuleContext<'a> {
    company_name: &'a str,
    company_lower: String,
    results: &'a [QueryResult],
    topics: &'a [Topic],
    total_results: usize,
    your_mentions: usize,
    your_visibility: f64,
    avg_position: f64,
    /// Top competitors by mention count (ties broken by name), with stats.
    top_competitors: Vec<(String, CompetitorStats)>,
    wikipedia_sources: Vec<String>,
    review_site_sources: Vec<String>,
    blog_sources: Vec<String>,
}

/// Produce the ranked list of improvement actions for one analysis run.
///
/// A fixed, ordered battery of independent rules; each inspects the
/// aggregated data and appends zero or one action. Rules never suppress
/// each other, evidence always cites literal queries/competitors/sources
/// from the input (stable slices, no sampling), and identical input
/// produces an identical plan.
pub fn recommend(
    company_name: &str,
    results: &[QueryResult],
    topics: &[Topic],
    competitors: &[String],
) -> Result<ActionPlan, AnalysisError> {
    let company = company_name.trim();
    if company.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "company name is required".to_string(),
        ));
    }

    let ctx = build_context(company, results, topics, competitors);

    let rules: [fn(&RuleContext) -> Option<Action>; 9] = [
        wikipedia_rule,
        review_sites_rule,
        comparison_rule,
        weak_topics_rule,
        listicle_rule,
        blogs_rule,
        decision_topics_rule,
        consistency_rule,
        placement_rule,
    ];

    let mut actions: Vec<Action> = rules.iter().filter_map(|rule| rule(&ctx)).collect();
    for (index, action) in actions.iter_mut().enumerate() {
        action.id = format!("action-{}", index + 1);
    }

    let high = actions.iter().filter(|a| a.priority == Priority::High).count();
    let medium = actions.iter().filter(|a| a.priority == Priority::Medium).count();
    let low = actions.iter().filter(|a| a.priority == Priority::Low).count();

    let top_competitor = ctx.top_competitors.first().map(|(name, _)| name.clone());
    let summary = ActionSummary {
        total_actions: actions.len(),
        high_priority: high,
        medium_priority: medium,
        low_priority: low,
        estimated_impact: estimated_impact(ctx.your_visibility).to_string(),
        strategy_summary: fallback_strategy_summary(
            company,
            ctx.your_mentions,
            ctx.total_results,
            ctx.your_visibility,
            high,
            top_competitor.as_deref(),
        ),
    };

    Ok(ActionPlan { actions, summary })
}

/// Deterministic templated strategy summary, used when the assistant's
/// generated summary is unavailable.
pub fn fallback_strategy_summary(
    company_name: &str,
    your_mentions: usize,
    total_results: usize,
    your_visibility: f64,
    high_priority: usize,
    top_competitor: Option<&str>,
) -> String {
    let mut summary = format!(
        "{} appears in {} of {} simulated answers ({:.1}% visibility). \
         Start with the {} high-priority actions to build presence on the \
         sources AI assistants cite most",
        company_name, your_mentions, total_results, your_visibility, high_priority,
    );
    match top_competitor {
        Some(name) => {
            summary.push_str(&format!(", and close the gap with {}.", name));
        }
        None => summary.push('.'),
    }
    summary
}

fn estimated_impact(your_visibility: f64) -> &'static str {
    if your_visibility < 30.0 {
        "+40-60% visibility"
    } else if your_visibility < 50.0 {
        "+25-40% visibility"
    } else {
        "+15-25% visibility"
    }
}

fn build_context<'a>(
    company: &'a str,
    results: &'a [QueryResult],
    topics: &'a [Topic],
    competitors: &'a [String],
) -> RuleContext<'a> {
    let company_lower = company.to_lowercase();
    let total_results = results.len();
    let your_mentions = results.iter().filter(|r| r.your_brand_mentioned).count();
    let your_visibility = if total_results == 0 {
        0.0
    } else {
        your_mentions as f64 / total_results as f64 * 100.0
    };

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

    // Per-competitor mention/source/content-type stats, keyed by the
    // competitor's canonical name.
    let mut stats: BTreeMap<String, CompetitorStats> = BTreeMap::new();
    for name in competitors {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            stats.entry(trimmed.to_string()).or_default();
        }
    }

    for result in results {
        for brand in &result.mentioned_brands {
            let Some(entry) = stats.get_mut(&brand.name) else {
                continue;
            };
            entry.mentions += 1;
            for mapping in &result.brand_source_mappings {
                if mapping.brand == brand.name {
                    entry
                        .sources
                        .extend(mapping.mentioned_in_sources.iter().cloned());
                }
            }
        }
    }

    let mut ranked: Vec<(String, CompetitorStats)> = stats.into_iter().collect();
    ranked.sort_by(|a, b| b.1.mentions.cmp(&a.1.mentions).then_with(|| a.0.cmp(&b.0)));
    let top_competitors: Vec<(String, CompetitorStats)> =
        ranked.into_iter().take(TOP_COMPETITOR_LIMIT).collect();

    let all_sources: BTreeSet<String> = top_competitors
        .iter()
        .flat_map(|(_, s)| s.sources.iter().cloned())
        .collect();
    let wikipedia_sources: Vec<String> = all_sources
        .iter()
        .filter(|s| s.contains("wikipedia"))
        .cloned()
        .collect();
    let review_site_sources: Vec<String> = all_sources
        .iter()
        .filter(|s| s.contains("g2.com") || s.contains("capterra"))
        .cloned()
        .collect();
    let blog_sources: Vec<String> = all_sources
        .iter()
        .filter(|s| s.contains("medium.com") || s.contains("techcrunch") || s.contains("blog"))
        .cloned()
        .collect();

    RuleContext {
        company_name: company,
        company_lower,
        results,
        topics,
        total_results,
        your_mentions,
        your_visibility,
        avg_position,
        top_competitors,
        wikipedia_sources,
        review_site_sources,
        blog_sources,
    }
}

fn wikipedia_rule(ctx: &RuleContext) -> Option<Action> {
    if ctx.wikipedia_sources.is_empty() || ctx.your_visibility >= WIKIPEDIA_VISIBILITY_CEILING {
        return None;
    }

    let competitors_with_wikipedia: Vec<String> = ctx
        .top_competitors
        .iter()
        .filter(|(_, s)| s.sources.iter().any(|src| src.contains("wikipedia")))
        .map(|(name, _)| name.clone())
        .collect();
    if competitors_with_wikipedia.is_empty() {
        return None;
    }

    let cited_result_count = ctx
        .results
        .iter()
        .filter(|r| r.sources.iter().any(|s| s.url.contains("wikipedia")))
        .count();

    Some(Action {
        id: String::new(),
        priority: Priority::High,
        category: ActionCategory::SourcePresence,
        title: "Create or improve Wikipedia page".to_string(),
        description: format!(
            "{} of your top competitors have Wikipedia pages. AI assistants \
             frequently cite Wikipedia as an authoritative source.",
            competitors_with_wikipedia.len()
        ),
        impact: "+20-30% visibility".to_string(),
        effort: Effort::High,
        steps: vec![
            "Verify your company meets Wikipedia notability guidelines (significant press coverage, awards, funding)".to_string(),
            "Gather 3-5 reliable secondary sources (news articles, industry publications)".to_string(),
            "Draft the article following Wikipedia's neutral point of view and style guidelines".to_string(),
            "Create a Wikipedia account and submit the article for review".to_string(),
            "Monitor and maintain the page with regular updates".to_string(),
        ],
        evidence: ActionEvidence {
            competitor_examples: Some(truncated(&competitors_with_wikipedia, EVIDENCE_LIMIT)),
            source_urls: Some(truncated(&ctx.wikipedia_sources, SOURCE_URL_LIMIT)),
            mention_count: Some(cited_result_count),
            ..Default::default()
        },
    })
}

fn review_sites_rule(ctx: &RuleContext) -> Option<Action> {
    if ctx.review_site_sources.is_empty() || ctx.your_visibility >= REVIEW_SITE_VISIBILITY_CEILING {
        return None;
    }

    let competitors_on_review_sites: Vec<String> = ctx
        .top_competitors
        .iter()
        .filter(|(_, s)| {
            s.sources
                .iter()
                .any(|src| src.contains("g2") || src.contains("capterra"))
        })
        .map(|(name, _)| name.clone())
        .collect();
    if competitors_on_review_sites.is_empty() {
        return None;
    }

    Some(Action {
        id: String::new(),
        priority: Priority::High,
        category: ActionCategory::SourcePresence,
        title: "Get listed on review platforms (G2, Capterra)".to_string(),
        description: "Competitors are getting mentioned because they have a strong presence \
                      on review sites. AI assistants use these as trusted sources."
            .to_string(),
        impact: "+15-25% visibility".to_string(),
        effort: Effort::Medium,
        steps: vec![
            "Claim your company profile on G2.com and Capterra".to_string(),
            "Complete the profile with screenshots, videos, and full product information".to_string(),
            "Launch a review collection campaign to get 10+ verified reviews".to_string(),
            "Respond to all reviews professionally".to_string(),
            "Add review badges to your website to build authority".to_string(),
        ],
        evidence: ActionEvidence {
            competitor_examples: Some(truncated(&competitors_on_review_sites, EVIDENCE_LIMIT)),
            source_urls: Some(truncated(&ctx.review_site_sources, SOURCE_URL_LIMIT)),
            frequency: Some(ctx.review_site_sources.len()),
            ..Default::default()
        },
    })
}

fn comparison_rule(ctx: &RuleContext) -> Option<Action> {
    let comparison_queries: Vec<&QueryResult> = ctx
        .results
        .iter()
        .filter(|r| {
            r.brand_source_mappings
                .iter()
                .any(|m| m.content_type == ContentType::Comparison)
        })
        .collect();
    if comparison_queries.is_empty()
        || (ctx.your_mentions as f64) >= ctx.total_results as f64 * COMPARISON_MENTION_CEILING
    {
        return None;
    }

    let competitors_in_comparisons: BTreeSet<String> = comparison_queries
        .iter()
        .flat_map(|r| r.mentioned_brands.iter())
        .filter(|b| b.name.to_lowercase() != ctx.company_lower)
        .map(|b| b.name.clone())
        .collect();
    let competitor_examples: Vec<String> = competitors_in_comparisons
        .into_iter()
        .take(EVIDENCE_LIMIT)
        .collect();
    let query_examples: Vec<String> = comparison_queries
        .iter()
        .take(EVIDENCE_LIMIT)
        .map(|r| r.query.clone())
        .collect();

    Some(Action {
        id: String::new(),
        priority: Priority::High,
        category: ActionCategory::Comparison,
        title: "Create comparison pages".to_string(),
        description: format!(
            "The assistant mentions competitors in {} comparison queries. Dedicated \
             comparison content gets you into these answers.",
            comparison_queries.len()
        ),
        impact: "+10-20% visibility".to_string(),
        effort: Effort::Medium,
        steps: vec![
            format!(
                "Create \"{} vs [Competitor]\" pages for your top 3 competitors",
                ctx.company_name
            ),
            "Include detailed feature comparison tables".to_string(),
            "Add pricing comparisons and use-case recommendations".to_string(),
            "Optimize the pages for comparison keywords".to_string(),
            "Promote the comparison pages through your marketing channels".to_string(),
        ],
        evidence: ActionEvidence {
            competitor_examples: Some(competitor_examples),
            query_examples: Some(query_examples),
            frequency: Some(comparison_queries.len()),
            ..Default::default()
        },
    })
}

fn weak_topics_rule(ctx: &RuleContext) -> Option<Action> {
    let weak_topics: Vec<&Topic> = ctx
        .topics
        .iter()
        .filter(|t| t.selected)
        .filter(|topic| {
            let prefix = topic_prefix(&topic.name, 2);
            if prefix.is_empty() {
                return false;
            }
            let topic_results: Vec<&QueryResult> = ctx
                .results
                .iter()
                .filter(|r| r.query.to_lowercase().contains(&prefix))
                .collect();
            if topic_results.is_empty() {
                return false;
            }
            let mentioned = topic_results.iter().filter(|r| r.your_brand_mentioned).count();
            (mentioned as f64 / topic_results.len() as f64) < WEAK_TOPIC_COVERAGE_FLOOR
        })
        .collect();
    if weak_topics.is_empty() {
        return None;
    }

    Some(Action {
        id: String::new(),
        priority: Priority::Medium,
        category: ActionCategory::TopicCoverage,
        title: format!("Improve content for {} weak topics", weak_topics.len()),
        description: "You appear in less than 30% of queries for these topics. Competitors \
                      are dominating this space."
            .to_string(),
        impact: "+15-20% visibility".to_string(),
        effort: Effort::Medium,
        steps: vec![
            "Create comprehensive guides for each weak topic".to_string(),
            "Include real examples, case studies, and best practices".to_string(),
            "Optimize the content with relevant keywords and structured data".to_string(),
            "Publish on your blog and promote through social channels".to_string(),
            "Build backlinks from authoritative sites in your industry".to_string(),
        ],
        evidence: ActionEvidence {
            query_examples: Some(
                weak_topics
                    .iter()
                    .take(EVIDENCE_LIMIT)
                    .map(|t| format!("Best tools for {}", t.name))
                    .collect(),
            ),
            frequency: Some(weak_topics.len()),
            ..Default::default()
        },
    })
}

fn listicle_rule(ctx: &RuleContext) -> Option<Action> {
    let best_of_queries: Vec<&QueryResult> = ctx
        .results
        .iter()
        .filter(|r| {
            r.brand_source_mappings
                .iter()
                .any(|m| m.content_type == ContentType::List)
        })
        .collect();
    if best_of_queries.len() <= LISTICLE_QUERY_MINIMUM
        || (ctx.your_mentions as f64) >= ctx.total_results as f64 * LISTICLE_MENTION_CEILING
    {
        return None;
    }

    Some(Action {
        id: String::new(),
        priority: Priority::Medium,
        category: ActionCategory::ContentCreation,
        title: "Create \"best of\" and listicle content".to_string(),
        description: "The assistant frequently answers with \"best tools\" and \"top \
                      solutions\" lists. Publish this content to get included."
            .to_string(),
        impact: "+10-15% visibility".to_string(),
        effort: Effort::Low,
        steps: vec![
            "Write \"Best [Category] Tools\" articles that include your product".to_string(),
            "Stay objective and include competitors to build trust".to_string(),
            "Add clear criteria and comparison matrices".to_string(),
            "Structure headings so answers are easy to lift".to_string(),
            "Refresh the articles annually to keep them current".to_string(),
        ],
        evidence: ActionEvidence {
            query_examples: Some(
                best_of_queries
                    .iter()
                    .take(EVIDENCE_LIMIT)
                    .map(|r| r.query.clone())
                    .collect(),
            ),
            frequency: Some(best_of_queries.len()),
            ..Default::default()
        },
    })
}

fn blogs_rule(ctx: &RuleContext) -> Option<Action> {
    if ctx.blog_sources.is_empty() || ctx.your_visibility >= BLOG_VISIBILITY_CEILING {
        return None;
    }

    Some(Action {
        id: String::new(),
        priority: Priority::Medium,
        category: ActionCategory::Authority,
        title: "Publish on high-authority blogs".to_string(),
        description: "Competitors are getting mentioned through posts on Medium, TechCrunch, \
                      and industry blogs. Guest posting builds the authority assistants lean on."
            .to_string(),
        impact: "+10-15% visibility".to_string(),
        effort: Effort::Medium,
        steps: vec![
            "Identify the top industry blogs and publications in your space".to_string(),
            "Pitch guest post ideas that provide genuine value".to_string(),
            "Write in-depth articles (1500+ words) with expert insights".to_string(),
            "Include natural mentions of your product where relevant".to_string(),
            "Build relationships with editors for ongoing opportunities".to_string(),
        ],
        evidence: ActionEvidence {
            source_urls: Some(truncated(&ctx.blog_sources, SOURCE_URL_LIMIT)),
            frequency: Some(ctx.blog_sources.len()),
            ..Default::default()
        },
    })
}

fn decision_topics_rule(ctx: &RuleContext) -> Option<Action> {
    let decision_queries: Vec<&QueryResult> = ctx
        .results
        .iter()
        .filter(|r| {
            r.brand_source_mappings.iter().any(|m| {
                m.content_type == ContentType::Comparison || m.content_type == ContentType::List
            })
        })
        .collect();
    if decision_queries.is_empty() {
        return None;
    }

    let mentioned = decision_queries
        .iter()
        .filter(|r| r.your_brand_mentioned)
        .count();
    if (mentioned as f64 / decision_queries.len() as f64) >= DECISION_MENTION_CEILING {
        return None;
    }

    let missed_examples: Vec<String> = decision_queries
        .iter()
        .filter(|r| !r.your_brand_mentioned)
        .take(EVIDENCE_LIMIT)
        .map(|r| r.query.clone())
        .collect();

    Some(Action {
        id: String::new(),
        priority: if mentioned == 0 {
            Priority::High
        } else {
            Priority::Medium
        },
        category: ActionCategory::DecisionTopics,
        title: "Show up in decision-stage queries".to_string(),
        description: format!(
            "Buyers comparing or shortlisting tools see you in {} of {} decision-stage \
             answers. These queries sit closest to a purchase.",
            mentioned,
            decision_queries.len()
        ),
        impact: "+15-25% visibility".to_string(),
        effort: Effort::Medium,
        steps: vec![
            "Audit which comparison and \"best of\" queries exclude you".to_string(),
            "Publish pages that answer those exact questions".to_string(),
            "Get your product added to the third-party lists assistants cite".to_string(),
            "Keep feature and pricing data current so inclusion sticks".to_string(),
        ],
        evidence: ActionEvidence {
            query_examples: Some(missed_examples),
            mention_count: Some(mentioned),
            frequency: Some(decision_queries.len()),
            ..Default::default()
        },
    })
}

fn consistency_rule(ctx: &RuleContext) -> Option<Action> {
    let company_base = matcher::base_name(ctx.company_name);

    let mut variants: BTreeSet<String> = BTreeSet::new();
    let mut example_queries: Vec<String> = Vec::new();
    for result in ctx.results {
        for brand in &result.mentioned_brands {
            if brand.is_known || brand.name.to_lowercase() == ctx.company_lower {
                continue;
            }
            if matcher::base_name(&brand.name) == company_base
                && variants.insert(brand.name.clone())
                && example_queries.len() < EVIDENCE_LIMIT
            {
                example_queries.push(result.query.clone());
            }
        }
    }
    if variants.is_empty() {
        return None;
    }

    let variant_list: Vec<String> = variants.iter().cloned().collect();

    Some(Action {
        id: String::new(),
        priority: Priority::Medium,
        category: ActionCategory::Consistency,
        title: "Standardize your brand name".to_string(),
        description: format!(
            "Assistants refer to you as {} instead of \"{}\". Inconsistent naming splits \
             your mentions and dilutes ranking signals.",
            variant_list
                .iter()
                .map(|v| format!("\"{}\"", v))
                .collect::<Vec<_>>()
                .join(", "),
            ctx.company_name
        ),
        impact: "+5-10% visibility".to_string(),
        effort: Effort::Low,
        steps: vec![
            "Pick one canonical brand spelling and use it everywhere".to_string(),
            "Update your website title, docs, and directory listings to match".to_string(),
            "Ask review platforms to correct alternate spellings".to_string(),
        ],
        evidence: ActionEvidence {
            query_examples: Some(example_queries),
            frequency: Some(variant_list.len()),
            ..Default::default()
        },
    })
}

fn placement_rule(ctx: &RuleContext) -> Option<Action> {
    if ctx.your_mentions == 0 || ctx.avg_position <= LATE_POSITION_FLOOR {
        return None;
    }

    Some(Action {
        id: String::new(),
        priority: Priority::Medium,
        category: ActionCategory::Seo,
        title: "Improve your placement within answers".to_string(),
        description: format!(
            "When you are mentioned, you average position {:.1} in the answer. Brands \
             listed first capture most of the attention.",
            ctx.avg_position
        ),
        impact: "+5-10% visibility".to_string(),
        effort: Effort::Medium,
        steps: vec![
            "Strengthen structured data and entity markup on your site".to_string(),
            "Earn citations on the sources assistants list first".to_string(),
            "Sharpen positioning copy so your category fit is unambiguous".to_string(),
        ],
        evidence: ActionEvidence {
            mention_count: Some(ctx.your_mentions),
            ..Default::default()
        },
    })
}

fn truncated(items: &[String], limit: usize) -> Vec<String> {
    items.iter().take(limit).cloned().collect()
}

/// First `words` whitespace-separated words of a topic name, lowercased.
fn topic_prefix(name: &str, words: usize) -> String {
    name.to_lowercase()
        .split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BrandMention, BrandSourceMapping, Prominence, Sentiment, Source};
    use pretty_assertions::assert_eq;

    fn mention(name: &str, position: u32, is_known: bool) -> BrandMention {
        BrandMention {
            name: name.to_string(),
            position,
            sentiment: Sentiment::Neutral,
            is_known,
        }
    }

    fn mapping(brand: &str, sources: &[&str], content_type: ContentType) -> BrandSourceMapping {
        BrandSourceMapping {
            brand: brand.to_string(),
            mentioned_in_sources: sources.iter().map(|s| s.to_string()).collect(),
            content_type,
            prominence: Prominence::High,
        }
    }

    fn result(
        query: &str,
        brands: Vec<BrandMention>,
        mappings: Vec<BrandSourceMapping>,
        your_brand_mentioned: bool,
        your_brand_position: Option<u32>,
    ) -> QueryResult {
        QueryResult {
            query: query.to_string(),
            response: String::new(),
            mentioned_brands: brands,
            your_brand_mentioned,
            your_brand_position,
            sources: vec![Source {
                title: "Otter.ai - Wikipedia".to_string(),
                url: "https://en.wikipedia.org/wiki/Otter.ai".to_string(),
            }],
            brand_source_mappings: mappings,
        }
    }

    fn topic(name: &str, selected: bool) -> Topic {
        Topic {
            id: format!("topic-{}", name.len()),
            name: name.to_string(),
            selected,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn invisible_results_with_wiki_competitor() -> Vec<QueryResult> {
        vec![
            result(
                "best meeting assistant",
                vec![mention("Otter.ai", 1, true)],
                vec![mapping(
                    "Otter.ai",
                    &["https://en.wikipedia.org/wiki/Otter.ai"],
                    ContentType::List,
                )],
                false,
                None,
            ),
            result(
                "tools for meeting notes",
                vec![mention("Otter.ai", 1, true)],
                vec![mapping(
                    "Otter.ai",
                    &["https://www.g2.com/products/otter-ai/reviews"],
                    ContentType::General,
                )],
                false,
                None,
            ),
        ]
    }

    #[test]
    fn wikipedia_rule_fires_when_competitors_hold_the_source() {
        let results = invisible_results_with_wiki_competitor();
        let plan = recommend("Acme", &results, &[], &names(&["Otter.ai"])).unwrap();

        let action = plan
            .actions
            .iter()
            .find(|a| a.title.contains("Wikipedia"))
            .expect("wikipedia action");
        assert_eq!(action.priority, Priority::High);
        assert_eq!(action.category, ActionCategory::SourcePresence);
        assert_eq!(
            action.evidence.competitor_examples,
            Some(vec!["Otter.ai".to_string()])
        );
    }

    #[test]
    fn wikipedia_rule_is_silent_at_high_visibility() {
        let mut results = invisible_results_with_wiki_competitor();
        for r in &mut results {
            r.your_brand_mentioned = true;
            r.your_brand_position = Some(1);
        }
        let plan = recommend("Acme", &results, &[], &names(&["Otter.ai"])).unwrap();
        assert!(plan.actions.iter().all(|a| !a.title.contains("Wikipedia")));
    }

    #[test]
    fn review_sites_rule_cites_review_platform_urls() {
        let results = invisible_results_with_wiki_competitor();
        let plan = recommend("Acme", &results, &[], &names(&["Otter.ai"])).unwrap();

        let action = plan
            .actions
            .iter()
            .find(|a| a.title.contains("review platforms"))
            .expect("review platform action");
        assert!(action
            .evidence
            .source_urls
            .as_ref()
            .unwrap()
            .iter()
            .any(|u| u.contains("g2.com")));
    }

    #[test]
    fn comparison_rule_fires_below_half_mention_rate() {
        let results = vec![
            result(
                "Notion vs Asana",
                vec![mention("Notion", 1, true), mention("Asana", 2, false)],
                vec![mapping("Notion", &[], ContentType::Comparison)],
                false,
                None,
            ),
            result("other query", vec![], vec![], false, None),
        ];
        let plan = recommend("Acme", &results, &[], &names(&["Notion"])).unwrap();

        let action = plan
            .actions
            .iter()
            .find(|a| a.category == ActionCategory::Comparison)
            .expect("comparison action");
        assert_eq!(action.priority, Priority::High);
        assert_eq!(
            action.evidence.query_examples,
            Some(vec!["Notion vs Asana".to_string()])
        );
        assert!(action
            .evidence
            .competitor_examples
            .as_ref()
            .unwrap()
            .contains(&"Asana".to_string()));
        assert_eq!(action.evidence.frequency, Some(1));
    }

    #[test]
    fn weak_topics_rule_uses_two_word_prefix_matching() {
        let results = vec![
            result("meeting assistant for teams", vec![], vec![], false, None),
            result("meeting assistant pricing", vec![], vec![], false, None),
        ];
        let topics = vec![topic("meeting assistant tools", true)];
        let plan = recommend("Acme", &results, &topics, &[]).unwrap();

        let action = plan
            .actions
            .iter()
            .find(|a| a.category == ActionCategory::TopicCoverage)
            .expect("topic coverage action");
        assert_eq!(
            action.evidence.query_examples,
            Some(vec!["Best tools for meeting assistant tools".to_string()])
        );
    }

    #[test]
    fn weak_topics_rule_skips_unselected_and_covered_topics() {
        let results = vec![result(
            "meeting assistant for teams",
            vec![],
            vec![],
            true,
            Some(1),
        )];
        let topics = vec![
            topic("meeting assistant tools", true),
            topic("note taking apps", false),
        ];
        let plan = recommend("Acme", &results, &topics, &[]).unwrap();
        assert!(plan
            .actions
            .iter()
            .all(|a| a.category != ActionCategory::TopicCoverage));
    }

    #[test]
    fn listicle_rule_needs_more_than_two_list_queries() {
        let list_result = |q: &str| {
            result(
                q,
                vec![],
                vec![mapping("Otter.ai", &[], ContentType::List)],
                false,
                None,
            )
        };

        let two = vec![list_result("best a"), list_result("best b")];
        let plan = recommend("Acme", &two, &[], &[]).unwrap();
        assert!(plan
            .actions
            .iter()
            .all(|a| a.category != ActionCategory::ContentCreation));

        let three = vec![
            list_result("best a"),
            list_result("best b"),
            list_result("best c"),
        ];
        let plan = recommend("Acme", &three, &[], &[]).unwrap();
        let action = plan
            .actions
            .iter()
            .find(|a| a.category == ActionCategory::ContentCreation)
            .expect("listicle action");
        assert_eq!(action.evidence.frequency, Some(3));
        assert_eq!(action.evidence.query_examples.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn decision_rule_priority_tracks_severity() {
        let decision = |q: &str, mentioned: bool| {
            result(
                q,
                vec![],
                vec![mapping("Otter.ai", &[], ContentType::Comparison)],
                mentioned,
                mentioned.then_some(1),
            )
        };

        let absent = vec![decision("a vs b", false), decision("best c", false)];
        let plan = recommend("Acme", &absent, &[], &[]).unwrap();
        let action = plan
            .actions
            .iter()
            .find(|a| a.category == ActionCategory::DecisionTopics)
            .expect("decision action");
        assert_eq!(action.priority, Priority::High);

        let partial = vec![
            decision("a vs b", true),
            decision("best c", false),
            decision("best d", false),
        ];
        let plan = recommend("Acme", &partial, &[], &[]).unwrap();
        let action = plan
            .actions
            .iter()
            .find(|a| a.category == ActionCategory::DecisionTopics)
            .expect("decision action");
        assert_eq!(action.priority, Priority::Medium);
    }

    #[test]
    fn consistency_rule_spots_discovered_name_variants() {
        let results = vec![result(
            "note tools",
            vec![mention("Acme AI", 1, false)],
            vec![],
            false,
            None,
        )];
        let plan = recommend("Acme", &results, &[], &[]).unwrap();

        let action = plan
            .actions
            .iter()
            .find(|a| a.category == ActionCategory::Consistency)
            .expect("consistency action");
        assert!(action.description.contains("Acme AI"));
        assert_eq!(action.evidence.frequency, Some(1));
    }

    #[test]
    fn placement_rule_fires_on_late_average_position() {
        let results = vec![
            result("q1", vec![], vec![], true, Some(5)),
            result("q2", vec![], vec![], true, Some(6)),
        ];
        let plan = recommend("Acme", &results, &[], &[]).unwrap();
        let action = plan
            .actions
            .iter()
            .find(|a| a.category == ActionCategory::Seo)
            .expect("placement action");
        assert!(action.description.contains("5.5"));
    }

    #[test]
    fn placement_rule_is_silent_for_early_positions() {
        let results = vec![result("q1", vec![], vec![], true, Some(1))];
        let plan = recommend("Acme", &results, &[], &[]).unwrap();
        assert!(plan.actions.iter().all(|a| a.category != ActionCategory::Seo));
    }

    #[test]
    fn identical_input_yields_identical_plans() {
        let results = invisible_results_with_wiki_competitor();
        let topics = vec![topic("meeting assistant tools", true)];
        let competitors = names(&["Otter.ai"]);

        let a = recommend("Acme", &results, &topics, &competitors).unwrap();
        let b = recommend("Acme", &results, &topics, &competitors).unwrap();

        assert_eq!(
            serde_json::to_value(&a.actions).unwrap(),
            serde_json::to_value(&b.actions).unwrap()
        );
        assert_eq!(a.summary.strategy_summary, b.summary.strategy_summary);
    }

    #[test]
    fn action_ids_are_sequential() {
        let results = invisible_results_with_wiki_competitor();
        let plan = recommend("Acme", &results, &[], &names(&["Otter.ai"])).unwrap();
        for (i, action) in plan.actions.iter().enumerate() {
            assert_eq!(action.id, format!("action-{}", i + 1));
        }
    }

    #[test]
    fn summary_counts_match_the_plan() {
        let results = invisible_results_with_wiki_competitor();
        let plan = recommend("Acme", &results, &[], &names(&["Otter.ai"])).unwrap();

        assert_eq!(plan.summary.total_actions, plan.actions.len());
        assert_eq!(
            plan.summary.high_priority,
            plan.actions
                .iter()
                .filter(|a| a.priority == Priority::High)
                .count()
        );
        // Zero visibility sits in the lowest tier.
        assert_eq!(plan.summary.estimated_impact, "+40-60% visibility");
        assert!(plan.summary.strategy_summary.contains("Acme"));
        assert!(plan.summary.strategy_summary.contains("Otter.ai"));
    }

    #[test]
    fn empty_results_produce_an_empty_plan() {
        let plan = recommend("Acme", &[], &[], &[]).unwrap();
        assert!(plan.actions.is_empty());
        assert_eq!(plan.summary.total_actions, 0);
        assert!(!plan.summary.strategy_summary.is_empty());
    }

    #[test]
    fn missing_company_name_is_rejected() {
        assert!(recommend("", &[], &[], &[]).is_err());
    }

    #[test]
    fn fallback_summary_is_deterministic_text() {
        let summary = fallback_strategy_summary("Acme", 1, 4, 25.0, 2, Some("Otter.ai"));
        assert_eq!(
            summary,
            "Acme appears in 1 of 4 simulated answers (25.0% visibility). Start with \
             the 2 high-priority actions to build presence on the sources AI \
             assistants cite most, and close the gap with Otter.ai."
        );
    }
}
