//! Story, chapter, lorebook and prompt records.
//!
//! These are the records the stores hand out. The prompt engine only reads
//! them; it never mutates a record it receives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A story: the top-level container for chapters and lorebook entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Unique story identifier.
    pub id: String,

    /// Story title.
    pub title: String,

    /// Author name.
    #[serde(default)]
    pub author: String,

    /// Language the story is written in.
    #[serde(default)]
    pub language: String,

    /// Optional short synopsis.
    #[serde(default)]
    pub synopsis: Option<String>,
}

/// Point-of-view style of a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PovType {
    /// First person narration.
    #[serde(rename = "First Person")]
    FirstPerson,

    /// Third person, limited to one character.
    #[serde(rename = "Third Person Limited")]
    ThirdPersonLimited,

    /// Third person, omniscient narrator.
    #[serde(rename = "Third Person Omniscient")]
    ThirdPersonOmniscient,
}

impl PovType {
    /// Returns the display label of this POV type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PovType::FirstPerson => "First Person",
            PovType::ThirdPersonLimited => "Third Person Limited",
            PovType::ThirdPersonOmniscient => "Third Person Omniscient",
        }
    }
}

impl fmt::Display for PovType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PovType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first person" | "first" => Ok(PovType::FirstPerson),
            "third person limited" | "limited" => Ok(PovType::ThirdPersonLimited),
            "third person omniscient" | "omniscient" => Ok(PovType::ThirdPersonOmniscient),
            _ => Err(format!("unknown POV type: {s}")),
        }
    }
}

/// A chapter of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    /// Unique chapter identifier.
    pub id: String,

    /// Identifier of the story this chapter belongs to.
    pub story_id: String,

    /// Chapter title.
    #[serde(default)]
    pub title: String,

    /// Optional summary written for (or generated from) the chapter.
    #[serde(default)]
    pub summary: Option<String>,

    /// Position of the chapter within its story.
    pub order: u32,

    /// Plain text content of the chapter.
    #[serde(default)]
    pub content: String,

    /// Cached word count.
    #[serde(default)]
    pub word_count: u32,

    /// Character whose point of view the chapter is told from.
    #[serde(default)]
    pub pov_character: Option<String>,

    /// Point-of-view style of the chapter.
    #[serde(default)]
    pub pov_type: Option<PovType>,
}

/// How much an entry matters to the story. Ordered by rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Major,
    Minor,
    Background,
}

impl Importance {
    /// Sort rank: `major` 0, `minor` 1, `background` 2.
    pub fn rank(&self) -> u8 {
        match self {
            Importance::Major => 0,
            Importance::Minor => 1,
            Importance::Background => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Major => "major",
            Importance::Minor => "minor",
            Importance::Background => "background",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relationship between a lorebook entry and something else in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Kind of relationship (e.g. "sister", "rival").
    #[serde(rename = "type")]
    pub kind: String,

    /// Free text description.
    #[serde(default)]
    pub description: String,
}

/// Optional metadata attached to a lorebook entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub importance: Option<Importance>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// A world-building record: a character, location, item and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LorebookEntry {
    /// Unique entry identifier. Entry identity is decided by this field.
    pub id: String,

    /// Identifier of the story this entry belongs to.
    pub story_id: String,

    /// Display name of the entry.
    pub name: String,

    /// Free text description.
    #[serde(default)]
    pub description: String,

    /// Category such as `character` or `location`.
    pub category: String,

    /// Tags used to find the entry in prose.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub metadata: Option<EntryMetadata>,
}

impl LorebookEntry {
    /// Importance used for ordering; entries without one sort as background.
    pub fn importance_rank(&self) -> u8 {
        self.metadata
            .as_ref()
            .and_then(|m| m.importance)
            .unwrap_or(Importance::Background)
            .rank()
    }
}

/// Role of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role-tagged message. Used both for template messages and resolved ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A user-authored prompt template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique prompt identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// What the prompt is for (e.g. `scene_beat`, `gen_summary`).
    #[serde(default)]
    pub prompt_type: String,

    /// Ordered template messages.
    #[serde(default)]
    pub messages: Vec<PromptMessage>,

    /// Models this prompt is meant to be used with.
    #[serde(default)]
    pub allowed_models: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_importance_rank_order() {
        assert!(Importance::Major.rank() < Importance::Minor.rank());
        assert!(Importance::Minor.rank() < Importance::Background.rank());
    }

    #[test]
    fn test_entry_without_importance_ranks_as_background() {
        let entry = LorebookEntry {
            id: "e1".to_string(),
            story_id: "s1".to_string(),
            name: "Harbor".to_string(),
            description: String::new(),
            category: "location".to_string(),
            tags: vec![],
            metadata: None,
        };
        assert_eq!(entry.importance_rank(), Importance::Background.rank());
    }

    #[test]
    fn test_pov_type_parse_and_display() {
        let pov: PovType = "third person limited".parse().unwrap();
        assert_eq!(pov, PovType::ThirdPersonLimited);
        assert_eq!(pov.to_string(), "Third Person Limited");
        assert!("second person".parse::<PovType>().is_err());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::System.to_string(), "system");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
