//! Anthropic Messages API wire types.
//!
//! These are Anthropic-specific request/response structures used for HTTP
//! communication with `/v1/messages`. They are NOT the provider-agnostic
//! types from popmodel-types.

use serde::{Deserialize, Serialize};

use popmodel_types::chat::{ContentBlock, UpstreamRequest};

/// Request body for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ApiRequest {
    /// Build the wire request for one single-turn user message.
    pub fn from_parts(model: &str, request: &UpstreamRequest) -> Self {
        let content = request.content.iter().map(ApiContentBlock::from).collect();
        Self {
            model: model.to_string(),
            max_tokens: request.max_tokens,
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content,
            }],
            system: request.system.clone(),
            temperature: request.temperature,
        }
    }
}

/// A single message in an Anthropic conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: Vec<ApiContentBlock>,
}

/// A content block in an Anthropic request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ApiContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image { source: ImageSource },
}

impl From<&ContentBlock> for ApiContentBlock {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => ApiContentBlock::Text { text: text.clone() },
            ContentBlock::ImageUrl { url } => ApiContentBlock::Image {
                source: ImageSource::Url { url: url.clone() },
            },
            ContentBlock::ImageBase64 { media_type, data } => ApiContentBlock::Image {
                source: ImageSource::Base64 {
                    media_type: media_type.clone(),
                    data: data.clone(),
                },
            },
        }
    }
}

/// The `source` field of an image block.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ImageSource {
    #[serde(rename = "url")]
    Url { url: String },
    #[serde(rename = "base64")]
    Base64 { media_type: String, data: String },
}

/// Non-streaming response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub content: Vec<ResponseBlock>,
}

impl ApiResponse {
    /// Concatenated text content, or the literal placeholder when the
    /// model returned no text at all.
    pub fn text_or_placeholder(&self) -> String {
        let text: String = self
            .content
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text.as_str()),
                ResponseBlock::Other => None,
            })
            .collect();
        if text.trim().is_empty() {
            "No response.".to_string()
        } else {
            text
        }
    }
}

/// A content block in an Anthropic response.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}
