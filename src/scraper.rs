use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use regex::Regex;
use tracing::{info, warn};

use crate::models::{ScrapedData, ScrapedPage};

/// Relative paths probed on every site, homepage first.
const PAGES_TO_SCRAPE: &[&str] = &[
    "",
    "about",
    "about-us",
    "features",
    "product",
    "products",
    "pricing",
    "solutions",
    "platform",
    "how-it-works",
    "services",
    "what-we-do",
    "use-cases",
    "customers",
    "case-studies",
    "blog",
    "resources",
];

const PAGE_CONTENT_LIMIT: usize = 8_000;
const ALL_CONTENT_LIMIT: usize = 20_000;
const FETCH_TIMEOUT_SECS: u64 = 10;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Multi-page website scraper feeding description generation.
pub struct Scraper {
    http: reqwest::Client,
}

impl Default for Scraper {
    fn default() -> Self {
        Self::new()
    }
}

impl Scraper {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }

    /// Scrape a website across its common pages and distill what the
    /// company does. Unreachable pages are skipped; a site where nothing
    /// loads produces an empty `ScrapedData` rather than an error.
    pub async fn scrape_website(&self, base_url: &str) -> ScrapedData {
        let normalized = normalize_url(base_url);
        info!(url = %normalized, "scraping website");

        let urls: Vec<String> = PAGES_TO_SCRAPE
            .iter()
            .map(|path| {
                if path.is_empty() {
                    normalized.clone()
                } else {
                    format!("{}/{}", normalized, path)
                }
            })
            .collect();

        let fetched = join_all(urls.iter().map(|url| self.fetch_html(url))).await;

        let mut data = ScrapedData::default();
        let mut homepage_html = String::new();
        let mut all_pages: Vec<ScrapedPage> = Vec::new();

        for (index, html) in fetched.into_iter().enumerate() {
            let Some(html) = html else { continue };
            let path = PAGES_TO_SCRAPE[index];
            let page = parse_page(&urls[index], &html);

            if path.is_empty() {
                data.meta_title = page.title.clone();
                data.meta_description = page.description.clone();
                homepage_html = html;
                data.homepage = Some(page.clone());
            } else if path.contains("about") {
                data.about_page = Some(page.clone());
            } else if path.contains("feature") || path.contains("platform") {
                data.features_page = Some(page.clone());
            } else if path.contains("pricing") {
                data.pricing_page = Some(page.clone());
            } else if path.contains("product") || path.contains("solution") {
                data.product_page = Some(page.clone());
            }

            all_pages.push(page);
        }

        if all_pages.is_empty() {
            warn!(url = %normalized, "no pages could be scraped");
            return data;
        }

        let all_content: String = all_pages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let all_headings: Vec<String> = all_pages.iter().flat_map(|p| p.headings.clone()).collect();

        data.all_content = truncate(&all_content, ALL_CONTENT_LIMIT);
        data.product_features = extract_features(&all_content, &all_headings);
        data.pricing = extract_pricing(&all_content);
        data.social_proof = extract_social_proof(&all_content);
        data.keywords = extract_keywords(&homepage_html);

        data
    }

    async fn fetch_html(&self, url: &str) -> Option<String> {
        let resp = self.http.get(url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        resp.text().await.ok()
    }
}

/// Parse one page of raw HTML into its structured pieces.
pub fn parse_page(url: &str, html: &str) -> ScrapedPage {
    ScrapedPage {
        url: url.to_string(),
        title: extract_title(html),
        description: extract_meta_description(html),
        headings: extract_headings(html),
        content: extract_content(html),
        links: extract_links(html),
    }
}

fn normalize_url(base_url: &str) -> String {
    let mut url = base_url.trim().to_string();
    if !url.starts_with("http") {
        url = format!("https://{}", url);
    }
    url.trim_end_matches('/').to_string()
}

fn extract_title(html: &str) -> String {
    capture_first(html, r"(?is)<title[^>]*>([^<]+)</title>")
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

fn extract_meta_description(html: &str) -> String {
    capture_first(
        html,
        r#"(?is)<meta[^>]*name=["']description["'][^>]*content=["']([^"']+)["']"#,
    )
    .map(|d| d.trim().to_string())
    .unwrap_or_default()
}

fn extract_headings(html: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r"(?is)<h[1-3][^>]*>([^<]+)</h[1-3]>") else {
        return Vec::new();
    };
    re.captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| collapse_whitespace(m.as_str()))
        .filter(|h| h.len() > 3 && h.len() < 200)
        .collect()
}

fn extract_links(html: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r#"(?i)href=["']([^"']+)["']"#) else {
        return Vec::new();
    };
    re.captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|href| href.starts_with('/') && !href.starts_with("//") && !href.contains('#'))
        .collect()
}

/// Visible text content with chrome (scripts, styles, nav, footer) removed.
fn extract_content(html: &str) -> String {
    let block_patterns = [
        r"(?is)<script[^>]*>.*?</script>",
        r"(?is)<style[^>]*>.*?</style>",
        r"(?is)<nav[^>]*>.*?</nav>",
        r"(?is)<footer[^>]*>.*?</footer>",
        r"(?is)<header[^>]*>.*?</header>",
        r"(?is)<aside[^>]*>.*?</aside>",
        r"(?s)<!--.*?-->",
    ];

    let mut content = html.to_string();
    for pattern in block_patterns {
        if let Ok(re) = Regex::new(pattern) {
            content = re.replace_all(&content, " ").into_owned();
        }
    }
    if let Ok(re) = Regex::new(r"<[^>]+>") {
        content = re.replace_all(&content, " ").into_owned();
    }

    truncate(&collapse_whitespace(&content), PAGE_CONTENT_LIMIT)
}

/// Feature-like statements from content plus feature-flavored headings.
fn extract_features(content: &str, headings: &[String]) -> Vec<String> {
    let mut features: Vec<String> = Vec::new();

    let patterns = [
        r"(?is)(?:features?|capabilities|what (?:we|you) (?:do|get)|benefits).{0,500}?([^.]+\.)",
        r"(?:✓|✔|•|→|►)\s*([^.\n]+)",
    ];
    for pattern in patterns {
        if let Ok(re) = Regex::new(pattern) {
            for capture in re.captures_iter(content) {
                if let Some(m) = capture.get(1) {
                    let feature = m.as_str().trim().to_string();
                    if feature.len() > 10 && feature.len() < 150 {
                        features.push(feature);
                    }
                }
            }
        }
    }

    for heading in headings {
        let lowered = heading.to_lowercase();
        if lowered.contains("feature")
            || lowered.contains("benefit")
            || lowered.contains("why")
            || lowered.contains("how")
        {
            features.push(heading.clone());
        }
    }

    dedup_preserving_order(features, 15)
}

fn extract_pricing(content: &str) -> Vec<String> {
    let mut pricing: Vec<String> = Vec::new();

    let patterns = [
        r"\$[\d,]+(?:\.\d{2})?(?:\s*/\s*(?:mo(?:nth)?|yr|year|user|seat))?",
        r"(?i)(?:free|starter|pro|enterprise|business|team)\s*(?:plan|tier)",
        r"(?is)(?:pricing|plans?).{0,200}?(\$[\d,]+)",
    ];
    for pattern in patterns {
        if let Ok(re) = Regex::new(pattern) {
            for m in re.find_iter(content) {
                pricing.push(m.as_str().trim().to_string());
            }
        }
    }

    dedup_preserving_order(pricing, 10)
}

fn extract_social_proof(content: &str) -> Vec<String> {
    let mut proof: Vec<String> = Vec::new();

    let patterns = [
        r"(?i)\d+(?:,\d+)?\+?\s*(?:customers?|users?|companies|teams|businesses)",
        r"(?i)(?:trusted by|used by|loved by|powering)\s+[^.]+",
        r"(?:Fortune|Inc\.|Forbes)\s*\d*",
    ];
    for pattern in patterns {
        if let Ok(re) = Regex::new(pattern) {
            for m in re.find_iter(content) {
                proof.push(m.as_str().trim().to_string());
            }
        }
    }

    dedup_preserving_order(proof, 10)
}

/// Keywords from the homepage's meta keywords and OpenGraph tags.
fn extract_keywords(html: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();

    if let Some(raw) = capture_first(
        html,
        r#"(?is)<meta[^>]*name=["']keywords["'][^>]*content=["']([^"']+)["']"#,
    ) {
        keywords.extend(raw.split(',').map(|k| k.trim().to_string()));
    }

    if let Ok(re) = Regex::new(
        r#"(?is)<meta[^>]*property=["']og:(?:title|description)["'][^>]*content=["']([^"']+)["']"#,
    ) {
        for capture in re.captures_iter(html) {
            if let Some(m) = capture.get(1) {
                keywords.extend(
                    m.as_str()
                        .split_whitespace()
                        .filter(|w| w.len() > 4)
                        .map(|w| w.to_string()),
                );
            }
        }
    }

    dedup_preserving_order(keywords, 20)
}

/// Format scraped data (plus optional external research) for the
/// description-generation prompt.
pub fn format_for_llm(data: &ScrapedData, external_info: &str) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !data.meta_title.is_empty() {
        sections.push(format!("Website Title: {}", data.meta_title));
    }
    if !data.meta_description.is_empty() {
        sections.push(format!("Website Description: {}", data.meta_description));
    }
    if let Some(homepage) = &data.homepage {
        if !homepage.headings.is_empty() {
            let headlines: Vec<&str> = homepage
                .headings
                .iter()
                .take(15)
                .map(String::as_str)
                .collect();
            sections.push(format!("Main Headlines:\n{}", headlines.join("\n")));
        }
    }
    if !data.product_features.is_empty() {
        sections.push(format!(
            "Product Features:\n{}",
            data.product_features.join("\n")
        ));
    }
    if let Some(about) = &data.about_page {
        if !about.content.is_empty() {
            sections.push(format!(
                "About Page Content:\n{}",
                truncate(&about.content, 3_000)
            ));
        }
    }
    if let Some(features) = &data.features_page {
        if !features.content.is_empty() {
            sections.push(format!(
                "Features Page Content:\n{}",
                truncate(&features.content, 2_500)
            ));
        }
    }
    if let Some(product) = &data.product_page {
        if !product.content.is_empty() {
            sections.push(format!(
                "Product Page Content:\n{}",
                truncate(&product.content, 2_000)
            ));
        }
    }
    if !data.pricing.is_empty() {
        sections.push(format!("Pricing Info: {}", data.pricing.join(", ")));
    }
    if !data.social_proof.is_empty() {
        sections.push(format!("Social Proof: {}", data.social_proof.join(", ")));
    }
    if !data.keywords.is_empty() {
        sections.push(format!("Keywords: {}", data.keywords.join(", ")));
    }
    if !external_info.is_empty() {
        sections.push(format!("External Information:\n{}", external_info));
    }
    if let Some(homepage) = &data.homepage {
        if !homepage.content.is_empty() && sections.join("\n\n").len() < 18_000 {
            sections.push(format!(
                "Homepage Content:\n{}",
                truncate(&homepage.content, 4_000)
            ));
        }
    }

    sections.join("\n\n---\n\n")
}

fn capture_first(html: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

fn dedup_preserving_order(items: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .take(limit)
        .collect()
}
