use futures::future::join_all;
use tracing::{info, warn};

use crate::assistant::AssistantClient;
use crate::error::AnalysisError;
use crate::models::{
    AggregateReport, Competitor, QueryResult, Topic, VisibilityMetrics,
};
use crate::{actions, attribution, mentions, metrics};

/// Simulated answers collected per topic.
const QUERY_VARIATIONS_PER_TOPIC: usize = 3;

/// Everything one analysis run produces.
pub struct AnalysisOutcome {
    pub results: Vec<QueryResult>,
    pub report: AggregateReport,
    pub metrics: VisibilityMetrics,
    pub plan: actions::ActionPlan,
}

/// The brand list checked against every response: your brand first, then
/// the competitors in selection order.
pub fn known_brands(company_name: &str, competitor_names: &[String]) -> Vec<String> {
    let mut brands = vec![company_name.to_string()];
    brands.extend(competitor_names.iter().cloned());
    brands
}

/// Assemble one `QueryResult` from a simulated response: extraction, then
/// synthetic sources, then attribution. Pure and synchronous.
pub fn build_query_result(
    query: &str,
    response: &str,
    company_name: &str,
    known_brands: &[String],
    discovered_brands: &[String],
) -> QueryResult {
    let mentioned_brands = mentions::extract_mentions(response, known_brands, discovered_brands);
    let sources = attribution::synthesize_sources(query, known_brands);
    let brand_source_mappings = attribution::attribute(&mentioned_brands, query, response, &sources);

    let company_lower = company_name.to_lowercase();
    let your_mention = mentioned_brands
        .iter()
        .find(|m| m.name.to_lowercase() == company_lower);

    QueryResult {
        query: query.to_string(),
        response: response.to_string(),
        your_brand_mentioned: your_mention.is_some(),
        your_brand_position: your_mention.map(|m| m.position),
        mentioned_brands,
        sources,
        brand_source_mappings,
    }
}

/// Simulate one topic's query variations and extract their results.
///
/// A failed simulation is isolated to this topic: it logs a warning and
/// contributes nothing, so one bad call never aborts the batch. An empty
/// but successful response still yields a result with no brands.
pub async fn simulate_topic(
    assistant: &AssistantClient,
    topic: &str,
    company_name: &str,
    known_brands: &[String],
) -> Vec<QueryResult> {
    let simulations = join_all(
        (0..QUERY_VARIATIONS_PER_TOPIC).map(|_| assistant.simulate_response(topic)),
    )
    .await;

    let mut results = Vec::new();
    for simulation in simulations {
        let response = match simulation {
            Ok(response) => response,
            Err(err) => {
                warn!(topic = %topic, error = %err, "simulation failed for topic");
                continue;
            }
        };

        let discovered = if response.is_empty() {
            Vec::new()
        } else {
            assistant.discover_brands(&response).await
        };

        results.push(build_query_result(
            topic,
            &response,
            company_name,
            known_brands,
            &discovered,
        ));
    }
    results
}

/// Run a full analysis: fan out all selected topics concurrently, zip the
/// per-topic results back in topic order, then aggregate and recommend.
pub async fn run_analysis(
    assistant: &AssistantClient,
    company_name: &str,
    topics: &[Topic],
    competitors: &[Competitor],
) -> Result<AnalysisOutcome, AnalysisError> {
    let company = company_name.trim();
    if company.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "company name is required".to_string(),
        ));
    }

    let competitor_names: Vec<String> = competitors.iter().map(|c| c.name.clone()).collect();
    let known = known_brands(company, &competitor_names);

    let selected: Vec<&Topic> = topics.iter().filter(|t| t.selected).collect();
    info!(
        company = %company,
        topics = selected.len(),
        competitors = competitor_names.len(),
        "starting analysis run"
    );

    let per_topic = join_all(
        selected
            .iter()
            .map(|topic| simulate_topic(assistant, &topic.name, company, &known)),
    )
    .await;
    let results: Vec<QueryResult> = per_topic.into_iter().flatten().collect();

    let report = metrics::aggregate(&results, company, &competitor_names)?;
    let visibility = metrics::visibility_metrics(&report, &results);
    let mut plan = actions::recommend(company, &results, topics, &competitor_names)?;

    // Best-effort generated summary; the deterministic fallback stays in
    // place when the collaborator is unavailable.
    let top_competitor = report.rankings.iter().find(|r| !r.is_you);
    match assistant
        .summarize_strategy(
            report.visibility_percentage,
            top_competitor.map(|c| (c.name.as_str(), c.mentions)),
            plan.actions.len(),
        )
        .await
    {
        Ok(summary) => plan.summary.strategy_summary = summary,
        Err(err) => {
            warn!(error = %err, "strategy summary generation failed, using fallback");
        }
    }

    info!(
        results = results.len(),
        actions = plan.actions.len(),
        visibility = report.visibility_percentage,
        "analysis run complete"
    );

    Ok(AnalysisOutcome {
        results,
        report,
        metrics: visibility,
        plan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_brands_lead_with_the_company() {
        let brands = known_brands("Acme", &names(&["Otter.ai", "Fireflies"]));
        assert_eq!(brands, names(&["Acme", "Otter.ai", "Fireflies"]));
    }

    #[test]
    fn query_result_flags_your_brand() {
        let known = known_brands("Acme", &names(&["Otter.ai"]));
        let result = build_query_result(
            "best meeting assistant",
            "Acme and Otter AI both fit.",
            "Acme",
            &known,
            &[],
        );

        assert!(result.your_brand_mentioned);
        assert_eq!(result.your_brand_position, Some(1));
        assert_eq!(result.mentioned_brands.len(), 2);
        assert_eq!(result.mentioned_brands[1].name, "Otter.ai");
    }

    #[test]
    fn query_result_attributes_every_mention() {
        let known = known_brands("Acme", &names(&["Otter.ai"]));
        let result = build_query_result(
            "best meeting assistant",
            "Otter AI is the common answer; Fathom also fits.",
            "Acme",
            &known,
            &names(&["Fathom"]),
        );

        assert!(!result.your_brand_mentioned);
        assert_eq!(result.your_brand_position, None);
        assert_eq!(result.mentioned_brands.len(), 2);
        assert_eq!(
            result.brand_source_mappings.len(),
            result.mentioned_brands.len()
        );
        // Synthetic sources always exist, so no mention is left unattributed.
        assert!(result
            .brand_source_mappings
            .iter()
            .all(|m| !m.mentioned_in_sources.is_empty()));
    }

    #[test]
    fn empty_response_yields_an_empty_result() {
        let known = known_brands("Acme", &[]);
        let result = build_query_result("best tools", "", "Acme", &known, &[]);

        assert!(!result.your_brand_mentioned);
        assert!(result.mentioned_brands.is_empty());
        assert!(result.brand_source_mappings.is_empty());
        // Sources are synthesized from the query alone.
        assert!(!result.sources.is_empty());
    }
}
