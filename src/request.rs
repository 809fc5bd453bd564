use std::fs;
use std::num::NonZeroU32;
use std::path::Path;

use tracing::debug;

use crate::error::{GencliError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttachment {
    /// Format as declared by the user (`png`, `jpeg`, ...); never checked
    /// against the bytes.
    pub format: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn mime_type(&self) -> String {
        if self.format.contains('/') {
            self.format.clone()
        } else {
            format!("image/{}", self.format)
        }
    }
}

/// One generation request, built per invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model_id: String,
    pub query: String,
    pub language: String,
    pub word_budget: Option<NonZeroU32>,
    pub temperature: Option<f32>,
    pub image: Option<ImageAttachment>,
}

impl GenerateRequest {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Text sent to the model: the query plus length and language directives.
    pub fn prompt(&self) -> String {
        match self.word_budget {
            Some(words) => format!(
                "{} in {} words in {} language",
                self.query, words, self.language
            ),
            None => format!("{} in {} language", self.query, self.language),
        }
    }
}

/// Accepts only ASCII decimal digits naming a positive number.
pub fn parse_word_budget(raw: &str) -> Result<NonZeroU32> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(GencliError::InvalidWordBudget(raw.to_string()));
    }
    raw.parse::<NonZeroU32>()
        .map_err(|_| GencliError::InvalidWordBudget(raw.to_string()))
}

fn join_query(query_words: &[String]) -> String {
    query_words.join(" ")
}

pub fn build_text_request(
    query_words: &[String],
    word_budget: &str,
    language: &str,
    temperature: f32,
    model_id: &str,
) -> Result<GenerateRequest> {
    let words = parse_word_budget(word_budget)?;
    let request = GenerateRequest {
        model_id: model_id.to_string(),
        query: join_query(query_words),
        language: language.to_string(),
        word_budget: Some(words),
        temperature: Some(temperature),
        image: None,
    };
    debug!(
        model = %request.model_id,
        word_budget = words.get(),
        language = %request.language,
        "built text request"
    );
    Ok(request)
}

pub fn build_image_request(
    query_words: &[String],
    image_path: &Path,
    image_format: &str,
    language: &str,
    model_id: &str,
) -> Result<GenerateRequest> {
    let bytes = fs::read(image_path).map_err(|source| GencliError::ImageRead {
        path: image_path.to_path_buf(),
        source,
    })?;
    debug!(
        model = %model_id,
        image_path = %image_path.display(),
        image_format,
        image_len = bytes.len(),
        "built image request"
    );

    Ok(GenerateRequest {
        model_id: model_id.to_string(),
        query: join_query(query_words),
        language: language.to_string(),
        word_budget: None,
        temperature: None,
        image: Some(ImageAttachment {
            format: image_format.to_string(),
            bytes,
        }),
    })
}
