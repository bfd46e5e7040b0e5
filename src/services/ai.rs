// SPDX-License-Identifier: MIT

//! OpenAI-backed caption, hashtag, and image generation.
//!
//! Like the Pinterest integration, this runs in mock mode when no real API
//! key is configured, returning deterministic canned content.

use crate::config::PLACEHOLDER_PREFIX;
use crate::error::AppError;
use serde::{Deserialize, Serialize};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const CHAT_MODEL: &str = "gpt-4o";
const IMAGE_MODEL: &str = "dall-e-3";
const MAX_COMPLETION_TOKENS: u32 = 500;

/// Sizes accepted by the image generation endpoint.
pub const IMAGE_SIZES: [&str; 3] = ["1024x1024", "1792x1024", "1024x1792"];
/// Quality settings accepted by the image generation endpoint.
pub const IMAGE_QUALITIES: [&str; 2] = ["standard", "hd"];

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Serialize)]
struct ImageGenerationRequest {
    model: &'static str,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: String,
}

/// AI content generation service.
#[derive(Clone)]
pub struct AiService {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    is_mock: bool,
}

impl AiService {
    /// Build from the configured API key. Absent or placeholder keys switch
    /// to mock mode.
    pub fn new(api_key: &str) -> Self {
        let is_mock = api_key.is_empty() || api_key.starts_with(PLACEHOLDER_PREFIX);
        Self {
            http: reqwest::Client::new(),
            api_base: OPENAI_API_BASE.to_string(),
            api_key: api_key.to_string(),
            is_mock,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.is_mock
    }

    /// Generate a Pinterest caption for a topic.
    ///
    /// The 500-character bound is a prompt instruction, not validated here.
    pub async fn generate_caption(
        &self,
        topic: &str,
        tone: &str,
        keywords: &[String],
    ) -> Result<String, AppError> {
        if self.is_mock {
            return Ok(mock_caption(topic, tone, keywords));
        }

        let mut prompt = format!("Create a compelling Pinterest caption about: {}\n", topic);
        prompt.push_str(&format!("Tone: {}\n", tone));
        if !keywords.is_empty() {
            prompt.push_str(&format!(
                "Include these keywords naturally: {}\n",
                keywords.join(", ")
            ));
        }
        prompt.push_str(
            "\nThe caption should be engaging, include relevant hashtags, and be \
             optimized for Pinterest. Keep it under 500 characters.",
        );

        self.chat_completion(
            "You are a creative Pinterest caption writer. Create engaging, \
             scroll-stopping captions that drive engagement.",
            prompt,
        )
        .await
    }

    /// Suggest hashtags for a topic, parsed from `#`-prefixed lines.
    pub async fn suggest_hashtags(&self, topic: &str) -> Result<Vec<String>, AppError> {
        let raw = if self.is_mock {
            mock_hashtag_lines(topic)
        } else {
            let prompt = format!(
                "Suggest 10-15 relevant Pinterest hashtags for a post about: {}\n\
                 Return only the hashtags, one per line, with the # symbol.",
                topic
            );
            self.chat_completion(
                "You are a Pinterest hashtag expert. Suggest relevant, trending hashtags.",
                prompt,
            )
            .await?
        };

        Ok(parse_hashtags(&raw))
    }

    /// Generate an image and return its URL.
    pub async fn generate_image(
        &self,
        prompt: &str,
        style: &str,
        size: &str,
        quality: &str,
    ) -> Result<String, AppError> {
        if !IMAGE_SIZES.contains(&size) {
            return Err(AppError::Validation(format!(
                "Invalid image size '{}', expected one of: {}",
                size,
                IMAGE_SIZES.join(", ")
            )));
        }
        if !IMAGE_QUALITIES.contains(&quality) {
            return Err(AppError::Validation(format!(
                "Invalid image quality '{}', expected one of: {}",
                quality,
                IMAGE_QUALITIES.join(", ")
            )));
        }

        if self.is_mock {
            return Ok(format!(
                "https://via.placeholder.com/{}?text=AI+Generated+Image",
                size
            ));
        }

        let request = ImageGenerationRequest {
            model: IMAGE_MODEL,
            prompt: format!("{}, {} style", prompt, style),
            n: 1,
            size: size.to_string(),
            quality: quality.to_string(),
        };

        let response = self
            .http
            .post(format!("{}/images/generations", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Image generation request failed: {}", e)))?;

        let parsed: ImageGenerationResponse = check_json(response).await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|image| image.url)
            .ok_or_else(|| AppError::Upstream("Image response contained no images".to_string()))
    }

    async fn chat_completion(
        &self,
        system: &'static str,
        prompt: String,
    ) -> Result<String, AppError> {
        let request = ChatCompletionRequest {
            model: CHAT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Chat completion request failed: {}", e)))?;

        let parsed: ChatCompletionResponse = check_json(response).await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Upstream("Chat response contained no choices".to_string()))
    }
}

/// Check response status and parse the JSON body; non-2xx surfaces the
/// provider's raw response body.
async fn check_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Upstream(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Upstream(format!("JSON parse error: {}", e)))
}

fn parse_hashtags(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn mock_caption(topic: &str, tone: &str, keywords: &[String]) -> String {
    let keyword_part = if keywords.is_empty() {
        String::new()
    } else {
        format!(" Featuring {}.", keywords.join(", "))
    };
    let tag = topic
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<String>();

    format!(
        "Discover the magic of {topic}! Here's an {tone} look you won't want to \
         miss.{keyword_part} Save this pin for later! #{tag} #pinspiration #discover"
    )
}

fn mock_hashtag_lines(topic: &str) -> String {
    let base = topic
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<String>();

    let mut lines: Vec<String> = vec![format!("#{}", base)];
    for word in topic.split_whitespace() {
        lines.push(format!("#{}", word.to_lowercase()));
    }
    for suffix in [
        "inspiration",
        "ideas",
        "aesthetic",
        "love",
        "daily",
        "tips",
        "goals",
        "style",
        "trending",
    ] {
        lines.push(format!("#{}{}", base, suffix));
    }

    lines.join("\n")
}
