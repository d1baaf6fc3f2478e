// src/entity/kind.rs
use serde::{Deserialize, Serialize};

/// Target model a prompt or component is written for. The kind is the
/// sole compatibility key when composing components onto a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    #[default]
    Chatgpt,
    Midjourney,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Chatgpt => "chatgpt",
            PromptKind::Midjourney => "midjourney",
        }
    }
}

impl std::fmt::Display for PromptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PromptKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chatgpt" => Ok(PromptKind::Chatgpt),
            "midjourney" => Ok(PromptKind::Midjourney),
            _ => Err(format!("Invalid prompt type: {}", s)),
        }
    }
}
