use chrono::Utc;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Route, State};
use tracing::warn;

use crate::assistant::AssistantClient;
use crate::models::*;
use crate::scraper::{self, Scraper};
use crate::session::SessionStore;
use crate::{actions, analysis};

// =====================
// Generation Routes
// =====================

#[post("/generate-topics", data = "<req>")]
pub async fn generate_topics(
    req: Json<GenerateTopicsRequest>,
    assistant: &State<AssistantClient>,
) -> Json<GenerateTopicsResponse> {
    let req = req.into_inner();
    if req.company_name.trim().is_empty() || req.description.trim().is_empty() {
        return Json(GenerateTopicsResponse {
            success: false,
            topics: vec![],
            error: Some("invalid input: description and company_name are required".to_string()),
        });
    }

    match assistant
        .generate_topics(
            &req.company_name,
            &req.description,
            &req.category,
            &req.scraped_features,
            &req.scraped_keywords,
        )
        .await
    {
        Ok(topics) => Json(GenerateTopicsResponse {
            success: true,
            topics,
            error: None,
        }),
        Err(err) => {
            warn!(error = %err, "topic generation failed");
            Json(GenerateTopicsResponse {
                success: false,
                topics: vec![],
                error: Some("failed to generate topics".to_string()),
            })
        }
    }
}

#[post("/generate-competitors", data = "<req>")]
pub async fn generate_competitors(
    req: Json<GenerateCompetitorsRequest>,
    assistant: &State<AssistantClient>,
) -> Json<GenerateCompetitorsResponse> {
    let req = req.into_inner();
    if req.company_name.trim().is_empty() || req.description.trim().is_empty() {
        return Json(GenerateCompetitorsResponse {
            success: false,
            competitors: vec![],
            error: Some("invalid input: description and company_name are required".to_string()),
        });
    }

    match assistant
        .generate_competitors(
            &req.company_name,
            &req.description,
            &req.category,
            &req.scraped_features,
            &req.topics,
        )
        .await
    {
        Ok(competitors) => Json(GenerateCompetitorsResponse {
            success: true,
            competitors,
            error: None,
        }),
        Err(err) => {
            warn!(error = %err, "competitor generation failed");
            Json(GenerateCompetitorsResponse {
                success: false,
                competitors: vec![],
                error: Some("failed to generate competitors".to_string()),
            })
        }
    }
}

#[post("/generate-description", data = "<req>")]
pub async fn generate_description(
    req: Json<GenerateDescriptionRequest>,
    assistant: &State<AssistantClient>,
    scraper: &State<Scraper>,
) -> Json<GenerateDescriptionResponse> {
    let req = req.into_inner();
    if req.url.trim().is_empty() || req.company_name.trim().is_empty() {
        return Json(GenerateDescriptionResponse {
            success: false,
            description: String::new(),
            category: String::new(),
            error: Some("invalid input: url and company_name are required".to_string()),
        });
    }

    let scraped = scraper.scrape_website(&req.url).await;
    let external_info = assistant.research_company(&req.company_name, &req.url).await;
    let formatted = scraper::format_for_llm(&scraped, &external_info);

    match assistant
        .generate_description(&req.company_name, &formatted)
        .await
    {
        Ok((description, category)) => Json(GenerateDescriptionResponse {
            success: true,
            description,
            category,
            error: None,
        }),
        Err(err) => {
            warn!(error = %err, "description generation failed");
            Json(GenerateDescriptionResponse {
                success: false,
                description: String::new(),
                category: String::new(),
                error: Some("failed to generate description".to_string()),
            })
        }
    }
}

// =====================
// Simulation & Analysis Routes
// =====================

#[post("/simulate-search", data = "<req>")]
pub async fn simulate_search(
    req: Json<SimulateSearchRequest>,
    assistant: &State<AssistantClient>,
) -> Json<SimulateSearchResponse> {
    let req = req.into_inner();
    if req.company_name.trim().is_empty() || req.topic.trim().is_empty() {
        return Json(SimulateSearchResponse {
            success: false,
            results: vec![],
            error: Some("invalid input: topic and company_name are required".to_string()),
        });
    }

    let known = analysis::known_brands(&req.company_name, &req.competitors);
    let results =
        analysis::simulate_topic(assistant, &req.topic, &req.company_name, &known).await;

    Json(SimulateSearchResponse {
        success: true,
        results,
        error: None,
    })
}

#[post("/generate-actions", data = "<req>")]
pub async fn generate_actions(
    req: Json<GenerateActionsRequest>,
    assistant: &State<AssistantClient>,
) -> Json<GenerateActionsResponse> {
    let req = req.into_inner();

    let mut plan = match actions::recommend(
        &req.your_brand,
        &req.simulation_results,
        &req.topics,
        &req.competitors,
    ) {
        Ok(plan) => plan,
        Err(err) => {
            return Json(GenerateActionsResponse {
                success: false,
                actions: vec![],
                summary: None,
                error: Some(err.to_string()),
            });
        }
    };

    // Best-effort generated summary; keep the templated fallback on failure.
    let visibility = if req.simulation_results.is_empty() {
        0.0
    } else {
        req.simulation_results
            .iter()
            .filter(|r| r.your_brand_mentioned)
            .count() as f64
            / req.simulation_results.len() as f64
            * 100.0
    };
    match assistant
        .summarize_strategy(visibility, None, plan.actions.len())
        .await
    {
        Ok(summary) => plan.summary.strategy_summary = summary,
        Err(err) => warn!(error = %err, "strategy summary generation failed, using fallback"),
    }

    Json(GenerateActionsResponse {
        success: true,
        actions: plan.actions,
        summary: Some(plan.summary),
        error: None,
    })
}

#[post("/analyze", data = "<req>")]
pub async fn analyze(
    req: Json<AnalyzeRequest>,
    assistant: &State<AssistantClient>,
    store: &State<SessionStore>,
) -> Json<AnalyzeResponse> {
    let req = req.into_inner();

    let outcome = match analysis::run_analysis(
        assistant,
        &req.company_name,
        &req.topics,
        &req.competitors,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(err) => {
            return Json(AnalyzeResponse {
                success: false,
                results: vec![],
                metrics: None,
                rankings: vec![],
                actions: vec![],
                summary: None,
                error: Some(err.to_string()),
            });
        }
    };

    store.replace(AnalysisSession {
        company_name: req.company_name.clone(),
        website_url: req.website_url.clone(),
        description: req.description.clone(),
        category: String::new(),
        topics: req.topics.clone(),
        competitors: req.competitors.clone(),
        results: outcome.results.clone(),
        metrics: Some(outcome.metrics.clone()),
        rankings: outcome.report.rankings.clone(),
        actions: outcome.plan.actions.clone(),
        actions_summary: Some(outcome.plan.summary.clone()),
        completed_at: Some(Utc::now()),
    });

    Json(AnalyzeResponse {
        success: true,
        results: outcome.results,
        metrics: Some(outcome.metrics),
        rankings: outcome.report.rankings,
        actions: outcome.plan.actions,
        summary: Some(outcome.plan.summary),
        error: None,
    })
}

// =====================
// Session Snapshot Routes
// =====================

#[get("/stats")]
pub fn api_stats(store: &State<SessionStore>) -> Json<VisibilityMetrics> {
    let metrics = store.snapshot().metrics.unwrap_or_else(|| VisibilityMetrics {
        visibility_percentage: 0.0,
        total_prompts: 0,
        mention_count: 0,
        avg_position: 0.0,
        top_source: "ChatGPT".to_string(),
        top_source_mentions: 0,
        closest_competitor: "None".to_string(),
        closest_competitor_mentions: 0,
        brand_ranking: 0,
    });
    Json(metrics)
}

#[get("/rankings")]
pub fn api_rankings(store: &State<SessionStore>) -> Json<Vec<CompetitorRanking>> {
    Json(store.snapshot().rankings)
}

#[get("/results")]
pub fn api_results(store: &State<SessionStore>) -> Json<Vec<QueryResult>> {
    Json(store.snapshot().results)
}

#[get("/actions")]
pub fn api_actions(store: &State<SessionStore>) -> Json<GenerateActionsResponse> {
    let session = store.snapshot();
    Json(GenerateActionsResponse {
        success: true,
        actions: session.actions,
        summary: session.actions_summary,
        error: None,
    })
}

#[get("/session")]
pub fn api_session(store: &State<SessionStore>) -> Json<AnalysisSession> {
    Json(store.snapshot())
}

// =====================
// Route Collections
// =====================

pub fn api_routes() -> Vec<Route> {
    routes![
        generate_topics,
        generate_competitors,
        generate_description,
        simulate_search,
        generate_actions,
        analyze,
        api_stats,
        api_rankings,
        api_results,
        api_actions,
        api_session,
    ]
}
