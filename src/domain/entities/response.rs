use serde::{Deserialize, Serialize};

/// Structured answer produced by the synthesis step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedResponse {
    pub answer: String,
    #[serde(default)]
    pub thought_process: Vec<String>,
    #[serde(default = "default_enough_context")]
    pub enough_context: bool,
}

fn default_enough_context() -> bool {
    true
}

impl SynthesizedResponse {
    /// Builds a response from raw model output.
    ///
    /// The model is asked for a JSON object; when it answers with anything
    /// else the whole text becomes the answer.
    pub fn from_model_output(raw: &str) -> Self {
        if let Some(parsed) = extract_json_object(raw)
            .and_then(|json| serde_json::from_str::<SynthesizedResponse>(json).ok())
        {
            return parsed;
        }

        Self {
            answer: raw.trim().to_string(),
            thought_process: vec![
                "Analyzed context".to_string(),
                "Generated response from unstructured model output".to_string(),
            ],
            enough_context: true,
        }
    }
}

/// Free-form model answer with no imposed structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericResponse {
    pub content: String,
}

impl GenericResponse {
    pub fn from_model_output(raw: &str) -> Self {
        Self {
            content: raw.trim().to_string(),
        }
    }
}

/// Shape the caller expects back from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    #[default]
    Synthesized,
    Generic,
}

impl ResponseKind {
    pub fn build(self, raw: &str) -> ModelResponse {
        match self {
            Self::Synthesized => {
                ModelResponse::Synthesized(SynthesizedResponse::from_model_output(raw))
            }
            Self::Generic => ModelResponse::Generic(GenericResponse::from_model_output(raw)),
        }
    }

    /// Output instructions appended to the system prompt for this kind.
    pub fn format_instructions(self) -> &'static str {
        match self {
            Self::Synthesized => {
                "Respond with a single JSON object and nothing else, using exactly these keys:\n\
                 \"answer\": string, the full answer to the question;\n\
                 \"thought_process\": array of strings, the reasoning steps taken;\n\
                 \"enough_context\": boolean, whether the context was sufficient to answer."
            }
            Self::Generic => "Respond in plain text.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelResponse {
    Synthesized(SynthesizedResponse),
    Generic(GenericResponse),
}

impl ModelResponse {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Synthesized(_) => ResponseKind::Synthesized,
            Self::Generic(_) => ResponseKind::Generic,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Synthesized(r) => &r.answer,
            Self::Generic(r) => &r.content,
        }
    }
}

/// Finds the outermost `{ ... }` span, ignoring surrounding prose or code fences.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}
