use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment attached to a brand mention.
///
/// No sentiment analysis is performed; every mention is tagged `Neutral`.
/// The enum exists so downstream consumers have a stable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Content-type classification for a query/response pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Comparison,
    Review,
    List,
    Tutorial,
    General,
}

/// How prominently a brand appeared within a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prominence {
    High,
    Medium,
    Low,
}

/// Brand mention detected in a simulated assistant response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandMention {
    pub name: String,
    /// 1-based detection order. Known brands are checked before discovered
    /// ones, so this is pass order, not textual occurrence order.
    pub position: u32,
    pub sentiment: Sentiment,
    /// True when the name was supplied up front (your brand or a listed
    /// competitor), false when it came from the discovery pass.
    pub is_known: bool,
}

/// Citation record attached to a query result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Per-mention source and content attribution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandSourceMapping {
    pub brand: String,
    pub mentioned_in_sources: Vec<String>,
    pub content_type: ContentType,
    pub prominence: Prominence,
}

/// One simulated query with everything extracted from its response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    pub response: String,
    pub mentioned_brands: Vec<BrandMention>,
    pub your_brand_mentioned: bool,
    pub your_brand_position: Option<u32>,
    pub sources: Vec<Source>,
    pub brand_source_mappings: Vec<BrandSourceMapping>,
}

/// Aggregated standing of one brand across an analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorRanking {
    pub name: String,
    pub mentions: usize,
    pub visibility_percentage: f64,
    pub is_you: bool,
}

/// Output of the metrics aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub rankings: Vec<CompetitorRanking>,
    pub visibility_percentage: f64,
    pub mention_count: usize,
    pub total_prompts: usize,
    pub avg_position: f64,
}

/// Dashboard metric snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityMetrics {
    pub visibility_percentage: f64,
    pub total_prompts: usize,
    pub mention_count: usize,
    pub avg_position: f64,
    pub top_source: String,
    pub top_source_mentions: usize,
    pub closest_competitor: String,
    pub closest_competitor_mentions: usize,
    pub brand_ranking: usize,
}

/// Search topic a user can include in an analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Tracked competitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub id: String,
    pub name: String,
    pub website: Option<String>,
    pub favicon: Option<String>,
}

/// Competitor candidate as returned by the assistant collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorCandidate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub website: String,
    #[serde(rename = "type", default = "default_competitor_kind")]
    pub kind: String,
    #[serde(default)]
    pub reason: String,
}

fn default_competitor_kind() -> String {
    "direct".to_string()
}

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Estimated effort to execute a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

/// Recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    SourcePresence,
    ContentCreation,
    TopicCoverage,
    Seo,
    Comparison,
    Authority,
    DecisionTopics,
    Consistency,
}

/// Supporting data cited by a recommendation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionEvidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_examples: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_examples: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mention_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<usize>,
}

/// Improvement recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub priority: Priority,
    pub category: ActionCategory,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub effort: Effort,
    pub steps: Vec<String>,
    pub evidence: ActionEvidence,
}

/// Roll-up over a generated action plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSummary {
    pub total_actions: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub low_priority: usize,
    pub estimated_impact: String,
    pub strategy_summary: String,
}

/// One scraped page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedPage {
    pub url: String,
    pub title: String,
    pub description: String,
    pub headings: Vec<String>,
    pub content: String,
    pub links: Vec<String>,
}

/// Everything the scraper learned about a website
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapedData {
    pub homepage: Option<ScrapedPage>,
    pub about_page: Option<ScrapedPage>,
    pub features_page: Option<ScrapedPage>,
    pub pricing_page: Option<ScrapedPage>,
    pub product_page: Option<ScrapedPage>,
    pub all_content: String,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub product_features: Vec<String>,
    pub pricing: Vec<String>,
    pub social_proof: Vec<String>,
}

/// In-memory state for one analysis session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub company_name: String,
    pub website_url: String,
    pub description: String,
    pub category: String,
    pub topics: Vec<Topic>,
    pub competitors: Vec<Competitor>,
    pub results: Vec<QueryResult>,
    pub metrics: Option<VisibilityMetrics>,
    pub rankings: Vec<CompetitorRanking>,
    pub actions: Vec<Action>,
    pub actions_summary: Option<ActionSummary>,
    pub completed_at: Option<DateTime<Utc>>,
}

// =====================
// API request/response types
// =====================

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateSearchRequest {
    pub topic: String,
    pub company_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub competitors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulateSearchResponse {
    pub success: bool,
    pub results: Vec<QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateTopicsRequest {
    pub company_name: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub scraped_features: Vec<String>,
    #[serde(default)]
    pub scraped_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateTopicsResponse {
    pub success: bool,
    pub topics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCompetitorsRequest {
    pub company_name: String,
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub scraped_features: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateCompetitorsResponse {
    pub success: bool,
    pub competitors: Vec<CompetitorCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateDescriptionRequest {
    pub url: String,
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateDescriptionResponse {
    pub success: bool,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateActionsRequest {
    pub your_brand: String,
    pub simulation_results: Vec<QueryResult>,
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateActionsResponse {
    pub success: bool,
    pub actions: Vec<Action>,
    pub summary: Option<ActionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub company_name: String,
    #[serde(default)]
    pub website_url: String,
    #[serde(default)]
    pub description: String,
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub results: Vec<QueryResult>,
    pub metrics: Option<VisibilityMetrics>,
    pub rankings: Vec<CompetitorRanking>,
    pub actions: Vec<Action>,
    pub summary: Option<ActionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
