//! AI blog writer
//!
//! Generates a blog post per movie through an OpenRouter-style
//! chat-completions API. The model is asked for TITLE/CONTENT/SUMMARY/
//! KEYWORDS sections; whatever cannot be parsed falls back field by field,
//! and a failed or unconfigured API falls back to a canned templated body.
//! Public readers therefore always get *some* article.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

use crate::db::models::MovieRow;
use crate::models::blog::GeneratedBlog;

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"(?s)TITLE:\s*(.*?)\s*CONTENT:").unwrap();
    static ref CONTENT_RE: Regex = Regex::new(r"(?s)CONTENT:\s*(.*?)\s*(?:SUMMARY:|$)").unwrap();
    static ref SUMMARY_RE: Regex = Regex::new(r"(?s)SUMMARY:\s*(.*?)\s*(?:KEYWORDS:|$)").unwrap();
    static ref KEYWORDS_RE: Regex = Regex::new(r"(?s)KEYWORDS:\s*(.*)\s*$").unwrap();
}

/// Client for the blog-generation chat-completions API
#[derive(Clone)]
pub struct BlogWriter {
    http: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl BlogWriter {
    pub fn new(api_url: &str, api_key: Option<String>, model: &str, timeout_ms: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_url: api_url.to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a blog post for a movie. Falls back to a templated body on
    /// any failure; the returned value is always usable.
    pub async fn generate(&self, movie: &MovieRow) -> GeneratedBlog {
        match self.request_completion(movie).await {
            Ok(text) => parse_sections(&text, movie),
            Err(e) => {
                warn!(
                    "Blog generation failed for '{}', using fallback: {}",
                    movie.title, e
                );
                fallback_blog(movie)
            }
        }
    }

    async fn request_completion(&self, movie: &MovieRow) -> anyhow::Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("blog API key not configured"))?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a professional movie blogger who writes engaging, \
                        SEO-optimized posts. Write in an enthusiastic, family-friendly tone \
                        and use proper HTML formatting with headings, paragraphs and lists."
                },
                {
                    "role": "user",
                    "content": build_prompt(movie)
                }
            ],
            "max_tokens": 1500,
            "temperature": 0.7
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        anyhow::ensure!(status.is_success(), "blog API returned {}", status);

        let data: serde_json::Value = response.json().await?;
        data["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("no content in blog API response"))
    }
}

fn build_prompt(movie: &MovieRow) -> String {
    let characters = movie.characters_list();
    let platforms = movie.ott_list();

    format!(
        "Write a comprehensive, engaging blog post about the movie \"{title}\"{year}.\n\n\
         Movie details:\n\
         - Description: {description}\n\
         - Main characters: {characters}\n\
         - Available on: {platforms}\n\
         - Duration: {duration}\n\n\
         Structure the response exactly as:\n\
         TITLE: [engaging blog title]\n\
         CONTENT: [full HTML blog content, 800-1200 words, using <h2>, <h3>, <p>, <ul>, <li>]\n\
         SUMMARY: [2-3 sentence summary for the meta description]\n\
         KEYWORDS: [comma-separated SEO keywords]\n\n\
         Cover the plot (no major spoilers), the characters, the visual quality, the themes, \
         and where to watch.",
        title = movie.title,
        year = movie
            .year
            .map(|y| format!(" ({y})"))
            .unwrap_or_default(),
        description = movie
            .description
            .as_deref()
            .unwrap_or("A wonderful adventure"),
        characters = if characters.is_empty() {
            "not listed".to_string()
        } else {
            characters.join(", ")
        },
        platforms = if platforms.is_empty() {
            "various platforms".to_string()
        } else {
            platforms.join(", ")
        },
        duration = movie
            .duration_minutes
            .map(|m| format!("{m} minutes"))
            .unwrap_or_else(|| "feature length".to_string()),
    )
}

/// Extract the marked sections from a model response, falling back per
/// field when a marker is missing or empty.
fn parse_sections(text: &str, movie: &MovieRow) -> GeneratedBlog {
    let fallback = fallback_blog(movie);

    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };

    GeneratedBlog {
        title: capture(&TITLE_RE).unwrap_or(fallback.title),
        content: capture(&CONTENT_RE).unwrap_or(fallback.content),
        summary: capture(&SUMMARY_RE).unwrap_or(fallback.summary),
        keywords: capture(&KEYWORDS_RE).unwrap_or(fallback.keywords),
    }
}

/// Canned template used when the API is down, slow or unconfigured
fn fallback_blog(movie: &MovieRow) -> GeneratedBlog {
    let characters = movie.characters_list();
    let platforms = movie.ott_list();
    let year = movie
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "this".to_string());

    let character_line = if characters.is_empty() {
        String::new()
    } else {
        format!(
            "<p>The film features {}; each brings their own strengths to the adventure.</p>\n",
            characters.join(", ")
        )
    };

    let watch_line = if platforms.is_empty() {
        "Check your local streaming platforms for availability.".to_string()
    } else {
        format!("You can enjoy it on {}.", platforms.join(", "))
    };

    let content = format!(
        "<h2>Welcome to the world of {title}</h2>\n\
         <p>Released in {year}, <strong>{title}</strong> delivers everything fans love: \
         heartfelt friendship, memorable adventures and moments that stay with you.</p>\n\
         <h3>The story</h3>\n\
         <p>{description}</p>\n\
         {character_line}\
         <h3>Why you should watch</h3>\n\
         <ul>\n\
         <li>Entertainment suitable for the whole family</li>\n\
         <li>Beautiful visuals and engaging storytelling</li>\n\
         <li>Valuable life lessons wrapped in fun adventures</li>\n\
         </ul>\n\
         <h3>Where to watch</h3>\n\
         <p>{watch_line}</p>",
        title = movie.title,
        year = year,
        description = movie.description.as_deref().unwrap_or(
            "This adventure takes its characters on an unforgettable journey filled with \
             excitement, challenges and valuable life lessons."
        ),
    );

    GeneratedBlog {
        title: format!("{}: An Adventure Worth Watching", movie.title),
        content,
        summary: format!(
            "Discover {}, a heartwarming movie that brings adventure and friendship to life.",
            movie.title
        ),
        keywords: format!("{}, movie, review, streaming, family entertainment", movie.title),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_movie() -> MovieRow {
        MovieRow {
            id: 1,
            title: "Treasure Island".to_string(),
            year: Some(2018),
            description: Some("A swashbuckling search for treasure.".to_string()),
            characters: serde_json::json!(["Jim", "Silver"]),
            thumbnail_url: None,
            file_handle: None,
            source_url: None,
            ott_availability: serde_json::json!(["NetStream"]),
            genre: "Animation".to_string(),
            duration_minutes: Some(109),
            rating: Some(8.0),
            view_count: 0,
            download_count: 0,
            is_active: true,
            created_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn parses_all_marked_sections() {
        let text = "TITLE: Sailing for Gold\n\
                    CONTENT: <h2>Adventure</h2><p>A great film.</p>\n\
                    SUMMARY: A short summary.\n\
                    KEYWORDS: treasure, island, animation";
        let blog = parse_sections(text, &sample_movie());
        assert_eq!(blog.title, "Sailing for Gold");
        assert_eq!(blog.content, "<h2>Adventure</h2><p>A great film.</p>");
        assert_eq!(blog.summary, "A short summary.");
        assert_eq!(blog.keywords, "treasure, island, animation");
    }

    #[test]
    fn missing_sections_fall_back_per_field() {
        let text = "CONTENT: <p>Only content came back.</p>";
        let blog = parse_sections(text, &sample_movie());
        assert_eq!(blog.content, "<p>Only content came back.</p>");
        // Title/summary/keywords come from the template
        assert!(blog.title.contains("Treasure Island"));
        assert!(blog.summary.contains("Treasure Island"));
        assert!(blog.keywords.contains("Treasure Island"));
    }

    #[test]
    fn garbage_response_falls_back_entirely() {
        let blog = parse_sections("502 bad gateway, try later", &sample_movie());
        assert!(blog.title.contains("Treasure Island"));
        assert!(blog.content.contains("<h2>"));
    }

    #[test]
    fn fallback_mentions_characters_and_platforms() {
        let blog = fallback_blog(&sample_movie());
        assert!(blog.content.contains("Jim, Silver"));
        assert!(blog.content.contains("NetStream"));
    }
}
