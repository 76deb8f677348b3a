use crate::error::{PolymathError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type alias for embedding vectors
pub type Embedding = Vec<f32>;

/// A named domain of knowledge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldOfExpertise {
    /// Store-assigned record id (`field_of_expertise:...`).
    /// Ignored on insert; the store always assigns a fresh one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Join key for `ExpertiseRef::field_name`, e.g. "psychology".
    pub name: String,

    /// Ordered, not necessarily unique.
    #[serde(default)]
    pub subfields: Vec<String>,
}

impl FieldOfExpertise {
    pub fn new(name: impl Into<String>, subfields: Vec<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            subfields,
        }
    }
}

/// Denormalized pointer into a `FieldOfExpertise`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExpertiseRef {
    pub field_name: String,
    pub subfield: String,
}

impl ExpertiseRef {
    pub fn new(field_name: impl Into<String>, subfield: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            subfield: subfield.into(),
        }
    }
}

impl fmt::Display for ExpertiseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_name, self.subfield)
    }
}

/// A named persona with one primary expertise and any number of side interests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display identity. Prompts refer to the expert by this name.
    pub name: String,

    pub expertise: ExpertiseRef,

    #[serde(default)]
    pub also_interested_in: Vec<ExpertiseRef>,
}

impl Expert {
    pub fn new(name: impl Into<String>, expertise: ExpertiseRef) -> Self {
        Self {
            id: None,
            name: name.into(),
            expertise,
            also_interested_in: Vec::new(),
        }
    }

    pub fn with_interest(mut self, interest: ExpertiseRef) -> Self {
        self.also_interested_in.push(interest);
        self
    }
}

/// Kind of generated text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ContentType {
    Essay,
    Debate,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Essay => write!(f, "Essay"),
            ContentType::Debate => write!(f, "Debate"),
        }
    }
}

/// A persisted essay or debate.
///
/// Secondary field/expert names are present if and only if the content is a
/// debate. Build values through [`GeneratedContent::essay`] or
/// [`GeneratedContent::debate`] so that holds by construction; records read
/// back from elsewhere can be checked with [`GeneratedContent::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "type")]
    pub content_type: ContentType,

    pub title_or_topic: String,

    pub content: String,

    pub primary_field_name: String,

    pub primary_expert_name: String,

    pub secondary_field_name: Option<String>,

    pub secondary_expert_name: Option<String>,

    /// Set once when the content is built. Never updated.
    #[serde(with = "fixed_rfc3339")]
    pub created_at: DateTime<Utc>,

    /// Attached after the content has been stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_embedding: Option<Embedding>,
}

/// RFC 3339 with nanosecond precision and a `Z` suffix, so that stored
/// timestamps sort chronologically as plain strings.
mod fixed_rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(deserializer)
    }
}

impl GeneratedContent {
    pub fn essay(
        topic: impl Into<String>,
        content: impl Into<String>,
        field: &FieldOfExpertise,
        expert: &Expert,
    ) -> Self {
        Self {
            id: None,
            content_type: ContentType::Essay,
            title_or_topic: topic.into(),
            content: content.into(),
            primary_field_name: field.name.clone(),
            primary_expert_name: expert.name.clone(),
            secondary_field_name: None,
            secondary_expert_name: None,
            created_at: Utc::now(),
            vector_embedding: None,
        }
    }

    pub fn debate(
        title: impl Into<String>,
        content: impl Into<String>,
        primary: (&FieldOfExpertise, &Expert),
        secondary: (&FieldOfExpertise, &Expert),
    ) -> Self {
        Self {
            id: None,
            content_type: ContentType::Debate,
            title_or_topic: title.into(),
            content: content.into(),
            primary_field_name: primary.0.name.clone(),
            primary_expert_name: primary.1.name.clone(),
            secondary_field_name: Some(secondary.0.name.clone()),
            secondary_expert_name: Some(secondary.1.name.clone()),
            created_at: Utc::now(),
            vector_embedding: None,
        }
    }

    /// Check the Essay/Debate invariant on the secondary names.
    pub fn validate(&self) -> Result<()> {
        let has_field = self.secondary_field_name.is_some();
        let has_expert = self.secondary_expert_name.is_some();
        match self.content_type {
            ContentType::Debate if !(has_field && has_expert) => Err(PolymathError::Validation(
                "debate content requires secondary field and expert names".to_string(),
            )),
            ContentType::Essay if has_field || has_expert => Err(PolymathError::Validation(
                "essay content must not carry secondary field or expert names".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// One essay topic proposed by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmTopicSuggestion {
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brief_description: Option<String>,
}

/// A debate title proposed by the model, with optional one-sentence stances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmDebateTitleSuggestion {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_1_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perspective_2_summary: Option<String>,
}
