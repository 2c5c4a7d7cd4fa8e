use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AssistantError;
use crate::models::CompetitorCandidate;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT_SECS: u64 = 30;

const MAX_TOPICS: usize = 10;
const MAX_COMPETITORS: usize = 12;
const MAX_DISCOVERED_BRANDS: usize = 15;

const SIMULATOR_SYSTEM_PROMPT: &str = "\
You are ChatGPT, a helpful AI assistant. Answer user questions about software and tools naturally.

When users ask for recommendations, provide a helpful list of 3-5 relevant tools/products.
Include well-known products in the space and be specific about their capabilities.
Format your response conversationally, mentioning products by name.";

const DISCOVERY_SYSTEM_PROMPT: &str = "\
You extract product and brand names from text.

Return ONLY a JSON array of the distinct product/brand names mentioned in the
user's text, e.g. [\"Notion\", \"Asana\"]. No markdown, no explanation. Return
[] when no products are mentioned.";

const TOPICS_SYSTEM_PROMPT: &str = "\
Generate prompts that users ask AI assistants to DISCOVER and GET RECOMMENDATIONS for products.

THE ONE RULE: every prompt must make the AI respond with a LIST of recommended products/brands.

Valid prompt types:
1. Recommendation requests: \"What's the best [product type] for [use case]?\"
2. Need/problem statements: \"I need a tool to [do something]\"
3. Feature-based discovery: \"[Product type] with [specific feature]\"
4. Alternative requests: \"Alternatives to [famous well-known competitor only]\"

Strict rules:
- Generate EXACTLY 10 prompts
- NEVER mention the company itself - users don't know about it yet
- NEVER mention any brand names except in \"alternatives to [famous brand]\"
- NO comparison questions like \"X vs Y\"
- NO educational/tutorial questions
- Sound like real humans (casual, conversational)
- Mix short (5-8 words) and medium (10-15 words) prompts
- Return ONLY a JSON array of strings";

const COMPETITORS_SYSTEM_PROMPT: &str = "\
You are a competitive intelligence analyst who deeply understands the software/SaaS market.

Identify REAL, ACTUAL competitors for the product described. These must be real
companies that exist, with working websites. Include direct competitors, feature
competitors, adjacent solutions, and alternatives for other market segments. Be
specific to the exact product type, and never invent fake companies.

For each competitor provide:
- name: official company/product name
- website: their actual website domain (without https://)
- type: \"direct\" | \"feature\" | \"adjacent\" | \"alternative\"
- reason: one sentence why they compete (10-20 words)

Return ONLY a valid JSON array, no markdown, no explanation:
[{\"name\": \"...\", \"website\": \"...\", \"type\": \"...\", \"reason\": \"...\"}, ...]";

const RESEARCH_SYSTEM_PROMPT: &str = "\
You are a research assistant. Given a company name and website, provide a brief
summary of what you know about this company from your training data: what it
does, its main products/services, target audience, and key differentiators.
Keep it factual and concise (max 300 words). If you don't have information, say so.";

const DESCRIPTION_SYSTEM_PROMPT: &str = "\
You are a business analyst expert at understanding what companies do.

Generate a clear, factual business description from the provided website content
and research. Rules:
- Maximum 500 characters
- Focus on what the product IS, WHO it's for, and HOW it works
- Write in third person; be specific about features, use cases, or audience
- Do not include pricing, contact info, or calls to action
- Avoid vague phrases like \"comprehensive solution\"

After the description, add one final line of the form
Category: <two-to-four word product category>";

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a strategic advisor for AI visibility. Be concise and actionable.";

/// Client for the external text-generation collaborator.
///
/// One client covers every collaborator role: the response simulator, the
/// free-text brand discovery sub-call, the topic/competitor/description
/// generators, and the strategy summarizer.
pub struct AssistantClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl AssistantClient {
    /// Build a client from the environment: `OPENAI_API_KEY`,
    /// `LENS_OPENAI_BASE_URL`, and `LENS_MODEL`.
    pub fn from_env() -> Self {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let base_url = std::env::var("LENS_OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("LENS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(base_url, api_key, model)
    }

    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, AssistantError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            max_tokens,
            temperature,
        };

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AssistantError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = resp.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(AssistantError::EmptyCompletion)
    }

    /// Simulate one assistant answer for a search query.
    pub async fn simulate_response(&self, query: &str) -> Result<String, AssistantError> {
        info!(query = %query, "simulating assistant response");
        self.chat(SIMULATOR_SYSTEM_PROMPT, query, 400, 0.8).await
    }

    /// Extract brand names the simulator volunteered in a response.
    ///
    /// Best-effort: a failed call or an unparseable payload degrades to an
    /// empty list, never an error.
    pub async fn discover_brands(&self, response_text: &str) -> Vec<String> {
        match self.chat(DISCOVERY_SYSTEM_PROMPT, response_text, 200, 0.0).await {
            Ok(text) => parse_brand_list(&text),
            Err(err) => {
                warn!(error = %err, "brand discovery failed, continuing without it");
                Vec::new()
            }
        }
    }

    /// Generate candidate search topics for a company.
    pub async fn generate_topics(
        &self,
        company_name: &str,
        description: &str,
        category: &str,
        scraped_features: &[String],
        scraped_keywords: &[String],
    ) -> Result<Vec<String>, AssistantError> {
        let mut user = format!("Company: {}\nDescription: {}", company_name, description);
        if !category.is_empty() {
            user.push_str(&format!("\nProduct Category: {}", category));
        }
        if !scraped_features.is_empty() {
            user.push_str(&format!(
                "\nActual Product Features: {}",
                scraped_features.join(", ")
            ));
        }
        if !scraped_keywords.is_empty() {
            user.push_str(&format!(
                "\nWebsite Keywords: {}",
                scraped_keywords.join(", ")
            ));
        }
        user.push_str(&format!(
            "\n\nGenerate 10 prompts that users would ask an AI to discover \
             products like this (where {} could potentially appear).",
            company_name
        ));

        let text = self.chat(TOPICS_SYSTEM_PROMPT, &user, 600, 0.3).await?;
        Ok(parse_string_list(&text))
    }

    /// Generate candidate competitors for a company.
    pub async fn generate_competitors(
        &self,
        company_name: &str,
        description: &str,
        category: &str,
        scraped_features: &[String],
        topics: &[String],
    ) -> Result<Vec<CompetitorCandidate>, AssistantError> {
        let mut user = format!(
            "Find competitors for:\n\nCompany: {}\nDescription: {}",
            company_name, description
        );
        if !category.is_empty() {
            user.push_str(&format!("\nProduct Category: {}", category));
        }
        if !scraped_features.is_empty() {
            let features: Vec<&str> = scraped_features
                .iter()
                .take(5)
                .map(String::as_str)
                .collect();
            user.push_str(&format!("\nKey Features: {}", features.join(", ")));
        }
        if !topics.is_empty() {
            let listed: Vec<&str> = topics.iter().take(5).map(String::as_str).collect();
            user.push_str(&format!("\nTarget Search Topics: {}", listed.join(", ")));
        }
        user.push_str("\n\nIdentify 10 REAL competitors with their actual websites:");

        let text = self.chat(COMPETITORS_SYSTEM_PROMPT, &user, 1200, 0.5).await?;
        Ok(parse_competitor_list(&text))
    }

    /// What the model already knows about a company, used to pad out thin
    /// scraped content. Best-effort.
    pub async fn research_company(&self, company_name: &str, url: &str) -> String {
        let user = format!(
            "Company: {}\nWebsite: {}\n\nWhat do you know about this company?",
            company_name, url
        );
        match self.chat(RESEARCH_SYSTEM_PROMPT, &user, 400, 0.3).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "company research failed, continuing without it");
                String::new()
            }
        }
    }

    /// Generate the company description (and a short category label) from
    /// formatted website content.
    pub async fn generate_description(
        &self,
        company_name: &str,
        formatted_content: &str,
    ) -> Result<(String, String), AssistantError> {
        let user = format!(
            "Company: {}\n\nAvailable information:\n{}",
            company_name, formatted_content
        );
        let text = self.chat(DESCRIPTION_SYSTEM_PROMPT, &user, 300, 0.4).await?;
        Ok(split_description_and_category(&text))
    }

    /// One-paragraph strategy summary over the aggregated statistics.
    /// Best-effort; callers fall back to the deterministic template.
    pub async fn summarize_strategy(
        &self,
        your_visibility: f64,
        top_competitor: Option<(&str, usize)>,
        total_actions: usize,
    ) -> Result<String, AssistantError> {
        let competitor_line = match top_competitor {
            Some((name, mentions)) => format!("{} with {} mentions", name, mentions),
            None => "none identified".to_string(),
        };
        let user = format!(
            "Based on this analysis:\n\
             - Your brand visibility: {:.1}%\n\
             - Top competitor: {}\n\
             - Total actions recommended: {}\n\n\
             Write a 2-3 sentence executive summary of the key strategy to improve AI visibility.",
            your_visibility, competitor_line, total_actions
        );
        self.chat(SUMMARY_SYSTEM_PROMPT, &user, 150, 0.7).await
    }
}

/// Parse a list of topic strings from a completion.
///
/// Prefers a JSON array embedded anywhere in the text; falls back to
/// line-splitting with enumeration markers stripped when no valid array is
/// present.
pub fn parse_string_list(text: &str) -> Vec<String> {
    if let Some(list) = parse_json_string_array(text) {
        return list
            .into_iter()
            .filter(|t| t.len() > 5 && t.len() < 100)
            .take(MAX_TOPICS)
            .collect();
    }

    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || c == '-' || c == '.' || c == ')' || c == ' '
                })
                .replace(['"', '[', ']'], "")
                .trim()
                .to_string()
        })
        .filter(|line| line.len() > 5 && line.len() < 100)
        .take(MAX_TOPICS)
        .collect()
}

/// Parse a list of brand names from a discovery completion. Anything that
/// is not a JSON array of strings degrades to an empty list.
pub fn parse_brand_list(text: &str) -> Vec<String> {
    parse_json_string_array(text)
        .unwrap_or_default()
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty() && name.len() < 50)
        .take(MAX_DISCOVERED_BRANDS)
        .collect()
}

/// Parse competitor candidates from a completion. Malformed payloads or
/// entries degrade to an empty list / get filtered, never error.
pub fn parse_competitor_list(text: &str) -> Vec<CompetitorCandidate> {
    let Some(raw) = extract_json_array(text) else {
        return Vec::new();
    };
    let Ok(mut candidates) = serde_json::from_str::<Vec<CompetitorCandidate>>(raw) else {
        return Vec::new();
    };

    for candidate in &mut candidates {
        candidate.website = candidate
            .website
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();
    }

    candidates
        .into_iter()
        .filter(|c| c.name.len() > 1 && c.name.len() < 50)
        .take(MAX_COMPETITORS)
        .collect()
}

/// Split a description completion into (description, category), where the
/// category rides on a trailing `Category: ...` line.
fn split_description_and_category(text: &str) -> (String, String) {
    let mut description_lines: Vec<&str> = Vec::new();
    let mut category = String::new();

    for line in text.lines() {
        if let Some(rest) = line.trim().strip_prefix("Category:") {
            category = rest.trim().to_string();
        } else {
            description_lines.push(line);
        }
    }

    (description_lines.join("\n").trim().to_string(), category)
}

fn parse_json_string_array(text: &str) -> Option<Vec<String>> {
    let raw = extract_json_array(text)?;
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .collect(),
    )
}

/// The outermost `[...]` span in a completion, if any.
fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}
