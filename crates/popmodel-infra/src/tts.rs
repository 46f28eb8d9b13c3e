//! Text-to-speech proxy client.
//!
//! Fetches MP3 audio from the Google Translate TTS endpoint so the
//! browser never talks to it directly. The response body is streamed
//! through rather than buffered.

use std::time::Duration;

use popmodel_types::error::TtsError;

const TTS_URL: &str = "https://translate.google.com/translate_tts";

/// Longest text accepted for one utterance, in characters.
pub const MAX_TTS_CHARS: usize = 2000;

pub struct TtsClient {
    client: reqwest::Client,
    base_url: String,
}

impl TtsClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: TTS_URL.to_string(),
        }
    }

    /// Override the endpoint URL (useful for testing).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Fetch spoken audio for `text`, returning the upstream response for
    /// body streaming.
    pub async fn fetch(&self, text: &str, lang: &str) -> Result<reqwest::Response, TtsError> {
        let text = validate_text(text)?;
        let lang = normalize_lang(lang);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", text.as_str()),
                ("tl", lang.as_str()),
                ("client", "tw-ob"),
            ])
            // The endpoint rejects requests without a browser user agent.
            .header("user-agent", "Mozilla/5.0")
            .send()
            .await
            .map_err(|e| TtsError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TtsError::Unavailable);
        }
        Ok(response)
    }
}

impl Default for TtsClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim the utterance; empty or over-long text is an error.
fn validate_text(text: &str) -> Result<String, TtsError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TtsError::InvalidText("text is required".to_string()));
    }
    if text.chars().count() > MAX_TTS_CHARS {
        return Err(TtsError::InvalidText("text too long".to_string()));
    }
    Ok(text.to_string())
}

/// Restrict the language tag to a plain BCP 47-ish shape; anything odd
/// falls back to English.
fn normalize_lang(lang: &str) -> String {
    let lang = lang.trim();
    let valid = !lang.is_empty()
        && lang.len() <= 10
        && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        lang.to_string()
    } else {
        "en".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(
            validate_text("   "),
            Err(TtsError::InvalidText(_))
        ));
    }

    #[test]
    fn over_long_text_is_rejected_not_clipped() {
        let long = "é".repeat(MAX_TTS_CHARS + 1);
        assert!(matches!(
            validate_text(&long),
            Err(TtsError::InvalidText(_))
        ));
    }

    #[test]
    fn text_at_the_limit_passes_through() {
        let text = "a".repeat(MAX_TTS_CHARS);
        assert_eq!(validate_text(&text).unwrap(), text);
    }

    #[test]
    fn odd_language_tags_fall_back_to_english() {
        assert_eq!(normalize_lang("en-GB"), "en-GB");
        assert_eq!(normalize_lang(""), "en");
        assert_eq!(normalize_lang("../x"), "en");
        assert_eq!(normalize_lang(&"x".repeat(40)), "en");
    }
}
