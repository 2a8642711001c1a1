//! InteractionType enum tagging every AI-backed activity flow.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of student interaction the platform sends to an agent.
///
/// The set is closed: adding a variant requires a prompt template, an agent
/// binding entry and a validation rule, and the exhaustive matches in those
/// three places enforce it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    ConceptIdentification,
    ConceptRestitution,
    QuizEvaluation,
    NoteFeedback,
    MindmapFeedback,
    StudyPlanning,
    ProgressReport,
}

/// Error returned when a tag does not name a known interaction type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interaction type: {0}")]
pub struct UnknownInteractionType(pub String);

impl InteractionType {
    /// Returns every interaction type.
    pub fn all() -> &'static [InteractionType] {
        &[
            InteractionType::ConceptIdentification,
            InteractionType::ConceptRestitution,
            InteractionType::QuizEvaluation,
            InteractionType::NoteFeedback,
            InteractionType::MindmapFeedback,
            InteractionType::StudyPlanning,
            InteractionType::ProgressReport,
        ]
    }

    /// Returns the snake_case tag used in configuration and on the wire.
    pub fn as_tag(&self) -> &'static str {
        match self {
            InteractionType::ConceptIdentification => "concept_identification",
            InteractionType::ConceptRestitution => "concept_restitution",
            InteractionType::QuizEvaluation => "quiz_evaluation",
            InteractionType::NoteFeedback => "note_feedback",
            InteractionType::MindmapFeedback => "mindmap_feedback",
            InteractionType::StudyPlanning => "study_planning",
            InteractionType::ProgressReport => "progress_report",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for InteractionType {
    type Err = UnknownInteractionType;

    /// Accepts the snake_case tag as well as the kebab-case spelling used by
    /// the front-end routes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_tag() == normalized)
            .ok_or_else(|| UnknownInteractionType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_returns_7_types() {
        assert_eq!(InteractionType::all().len(), 7);
    }

    #[test]
    fn from_str_accepts_snake_and_kebab_case() {
        assert_eq!(
            "note_feedback".parse::<InteractionType>().unwrap(),
            InteractionType::NoteFeedback
        );
        assert_eq!(
            "concept-restitution".parse::<InteractionType>().unwrap(),
            InteractionType::ConceptRestitution
        );
        assert_eq!(
            " Quiz_Evaluation ".parse::<InteractionType>().unwrap(),
            InteractionType::QuizEvaluation
        );
    }

    #[test]
    fn from_str_rejects_unknown_tag() {
        let err = "essay_grading".parse::<InteractionType>().unwrap_err();
        assert_eq!(err, UnknownInteractionType("essay_grading".to_string()));
        assert_eq!(err.to_string(), "unknown interaction type: essay_grading");
    }

    #[test]
    fn tag_round_trips_through_from_str() {
        for t in InteractionType::all() {
            assert_eq!(t.as_tag().parse::<InteractionType>().unwrap(), *t);
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&InteractionType::MindmapFeedback).unwrap();
        assert_eq!(json, "\"mindmap_feedback\"");
    }
}
