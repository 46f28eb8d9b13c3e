//! Upstream chat request model.
//!
//! These types describe one outbound turn to the upstream model API in
//! provider-neutral form. The infra layer translates them into the
//! provider's wire format.

use serde::{Deserialize, Serialize};

/// An image attached to an inbound message: either a remote URL or an
/// inline `data:` URL carrying a base64 payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data_url: Option<String>,
}

impl ImageInput {
    /// Convert to a content block, if the input is well formed.
    ///
    /// Malformed inline payloads are dropped rather than rejected; images
    /// are best-effort attachments.
    pub fn to_block(&self) -> Option<ContentBlock> {
        if let Some(url) = self.url.as_deref()
            && !url.is_empty()
        {
            return Some(ContentBlock::ImageUrl {
                url: url.to_string(),
            });
        }
        if let Some(data_url) = self.data_url.as_deref() {
            let rest = data_url.strip_prefix("data:")?;
            let (media_type, data) = rest.split_once(";base64,")?;
            let media_type = if media_type.is_empty() {
                "image/png"
            } else {
                media_type
            };
            return Some(ContentBlock::ImageBase64 {
                media_type: media_type.to_string(),
                data: data.to_string(),
            });
        }
        None
    }

    /// Stored form for session persistence: URL kept, payload elided.
    pub fn stored(&self) -> crate::session::StoredImage {
        crate::session::StoredImage {
            url: self.url.clone(),
            has_data: self.data_url.is_some(),
        }
    }
}

/// One piece of message content sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Text { text: String },
    ImageUrl { url: String },
    ImageBase64 { media_type: String, data: String },
}

/// A fully composed upstream request, ready for a provider client.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub system: Option<String>,
    pub content: Vec<ContentBlock>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// The outcome of a successful gateway exchange.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Assistant text (or the literal placeholder when the upstream reply
    /// carried no text content).
    pub reply: String,
    /// Set when the gateway auto-switched models mid-request.
    pub note: Option<String>,
    /// The model that produced the reply.
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_image_becomes_url_block() {
        let img = ImageInput {
            url: Some("https://example.com/a.png".to_string()),
            data_url: None,
        };
        assert_eq!(
            img.to_block(),
            Some(ContentBlock::ImageUrl {
                url: "https://example.com/a.png".to_string()
            })
        );
    }

    #[test]
    fn data_url_is_parsed_into_media_type_and_payload() {
        let img = ImageInput {
            url: None,
            data_url: Some("data:image/jpeg;base64,aGVsbG8=".to_string()),
        };
        assert_eq!(
            img.to_block(),
            Some(ContentBlock::ImageBase64 {
                media_type: "image/jpeg".to_string(),
                data: "aGVsbG8=".to_string(),
            })
        );
    }

    #[test]
    fn data_url_without_media_type_defaults_to_png() {
        let img = ImageInput {
            url: None,
            data_url: Some("data:;base64,eHl6".to_string()),
        };
        match img.to_block() {
            Some(ContentBlock::ImageBase64 { media_type, .. }) => {
                assert_eq!(media_type, "image/png");
            }
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn malformed_inputs_are_dropped() {
        assert!(ImageInput::default().to_block().is_none());
        let bad = ImageInput {
            url: None,
            data_url: Some("not-a-data-url".to_string()),
        };
        assert!(bad.to_block().is_none());
    }

    #[test]
    fn stored_form_elides_payload() {
        let img = ImageInput {
            url: None,
            data_url: Some("data:image/png;base64,eHl6".to_string()),
        };
        let stored = img.stored();
        assert!(stored.has_data);
        assert!(stored.url.is_none());
    }
}
