//! Persona used as the system prompt for every completion

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Built-in personas selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaKind {
    /// Rates the attendee's donut story, see [`Persona::donut_judge`]
    #[default]
    Judge,
    /// Short playful line about a flavor, see [`Persona::donut_fairy`]
    Fairy,
}

impl PersonaKind {
    /// Build the persona
    pub fn persona(self) -> Persona {
        match self {
            Self::Judge => Persona::donut_judge(),
            Self::Fairy => Persona::donut_fairy(),
        }
    }
}

impl FromStr for PersonaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "judge" => Ok(Self::Judge),
            "fairy" => Ok(Self::Fairy),
            other => Err(Error::config(format!("unknown persona: {}", other))),
        }
    }
}

/// Describes how the agent talks and what it asks the model to return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// High-level role (e.g., "Donut story judge")
    pub role: String,
    /// Tone instructions
    pub tone: String,
    /// Behavioral constraints
    pub constraints: Vec<String>,
    /// Required shape of the model's answer, if any
    pub response_format: Option<String>,
}

impl Persona {
    /// Render the persona as a system prompt
    pub fn to_prompt(&self) -> String {
        let mut prompt = format!("You are {}.\n", self.role);
        prompt.push_str(&format!("Your tone should be: {}.\n", self.tone));

        if !self.constraints.is_empty() {
            prompt.push_str("Adhere to these guidelines:\n");
            for constraint in &self.constraints {
                prompt.push_str(&format!("- {}\n", constraint));
            }
        }

        if let Some(format) = &self.response_format {
            prompt.push_str(&format!("Respond ONLY with {}\n", format));
        }

        prompt
    }

    /// Rates the attendee's donut story and answers with a JSON verdict
    pub fn donut_judge() -> Self {
        Self {
            role: "a fun, enthusiastic donut story judge".to_string(),
            tone: "Playful, warm and short".to_string(),
            constraints: vec![
                "The user will share a favorite donut or a donut-related story.".to_string(),
                "Rate it from 1 to 10 and give a short, encouraging comment.".to_string(),
                "Keep the comment to one or two sentences.".to_string(),
            ],
            response_format: Some(
                r#"valid JSON: {"score": <int>, "comment": "<string>"}"#.to_string(),
            ),
        }
    }

    /// Answers with a short playful line about the user's donut choice
    pub fn donut_fairy() -> Self {
        Self {
            role: "a friendly donut fairy handing out donut tickets at an event".to_string(),
            tone: "Playful and enthusiastic".to_string(),
            constraints: vec![
                "Reply to the user's favorite donut flavor in one short sentence.".to_string(),
                "Never invent coupon codes; the ticket is added separately.".to_string(),
            ],
            response_format: None,
        }
    }
}
