//! Typed interaction results and their fallback defaults.
//!
//! One record type per interaction type. Serialized field names match the
//! JSON the agents are asked to produce, so a validated result serializes
//! back to the payload it was built from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::domain::foundation::InteractionType;

/// Message shown to the student whenever a fallback result is returned.
pub const FALLBACK_MESSAGE: &str =
    "An error occurred while evaluating your answer. Please try again.";

/// Highest score a single restitution field can receive.
pub const MAX_FIELD_SCORE: f64 = 10.0;

/// Highest aggregate restitution score.
pub const MAX_AGGREGATE_SCORE: f64 = 30.0;

/// Minimum score every answered field needs for the restitution to validate.
pub const PASSING_FIELD_SCORE: f64 = 7.0;

/// Result of one interaction, keyed by interaction type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InteractionResult {
    ConceptIdentification(ConceptIdentificationResult),
    ConceptRestitution(ConceptRestitutionResult),
    QuizEvaluation(QuizEvaluationResult),
    NoteFeedback(FeedbackResult),
    MindmapFeedback(FeedbackResult),
    StudyPlanning(Map<String, Value>),
    ProgressReport(Map<String, Value>),
}

impl InteractionResult {
    /// Returns the interaction type this result belongs to.
    pub fn interaction_type(&self) -> InteractionType {
        match self {
            InteractionResult::ConceptIdentification(_) => InteractionType::ConceptIdentification,
            InteractionResult::ConceptRestitution(_) => InteractionType::ConceptRestitution,
            InteractionResult::QuizEvaluation(_) => InteractionType::QuizEvaluation,
            InteractionResult::NoteFeedback(_) => InteractionType::NoteFeedback,
            InteractionResult::MindmapFeedback(_) => InteractionType::MindmapFeedback,
            InteractionResult::StudyPlanning(_) => InteractionType::StudyPlanning,
            InteractionResult::ProgressReport(_) => InteractionType::ProgressReport,
        }
    }
}

/// Returns the canonical safe default for an interaction type.
///
/// Shaped exactly like a successful result: zeroed scores, empty lists and
/// [`FALLBACK_MESSAGE`] wherever text is expected.
pub fn fallback_result(interaction_type: InteractionType) -> InteractionResult {
    match interaction_type {
        InteractionType::ConceptIdentification => {
            InteractionResult::ConceptIdentification(ConceptIdentificationResult {
                is_correct: false,
                similarity: 0.0,
                feedback: FALLBACK_MESSAGE.to_string(),
            })
        }
        InteractionType::ConceptRestitution => {
            InteractionResult::ConceptRestitution(ConceptRestitutionResult {
                concept: String::new(),
                fields: BTreeMap::new(),
                aggregate_score: 0.0,
                validated: false,
                general_comment: FALLBACK_MESSAGE.to_string(),
            })
        }
        InteractionType::QuizEvaluation => InteractionResult::QuizEvaluation(
            QuizEvaluationResult::new(0.0, FALLBACK_MESSAGE, Vec::new()),
        ),
        InteractionType::NoteFeedback => InteractionResult::NoteFeedback(FeedbackResult::fallback()),
        InteractionType::MindmapFeedback => {
            InteractionResult::MindmapFeedback(FeedbackResult::fallback())
        }
        InteractionType::StudyPlanning => InteractionResult::StudyPlanning(fallback_summary()),
        InteractionType::ProgressReport => InteractionResult::ProgressReport(fallback_summary()),
    }
}

fn fallback_summary() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("summary".to_string(), Value::String(FALLBACK_MESSAGE.to_string()));
    map
}

// ============================================================================
// Concept identification
// ============================================================================

/// Whether the student named the right concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptIdentificationResult {
    pub is_correct: bool,
    /// Similarity between answer and expected concept, in [0, 1].
    pub similarity: f64,
    pub feedback: String,
}

// ============================================================================
// Concept restitution
// ============================================================================

/// Field-by-field grading of a concept restitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRestitutionResult {
    pub concept: String,
    #[serde(rename = "champs")]
    pub fields: BTreeMap<String, FieldAssessment>,
    /// Mean of answered field scores times 3, out of 30.
    #[serde(rename = "note_globale_sur_30")]
    pub aggregate_score: f64,
    #[serde(rename = "valide")]
    pub validated: bool,
    #[serde(rename = "commentaire_general")]
    pub general_comment: String,
}

/// Grading of one field of a concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldAssessment {
    /// Score out of 10; None when the student left the field empty.
    #[serde(rename = "note")]
    pub score: Option<f64>,
    #[serde(rename = "type_erreur")]
    pub error_kind: Option<String>,
    #[serde(rename = "commentaire")]
    pub comment: String,
}

impl ConceptRestitutionResult {
    /// Scores of the fields the student answered.
    pub fn answered_scores(&self) -> Vec<f64> {
        self.fields.values().filter_map(|f| f.score).collect()
    }

    /// Recomputes the aggregate score and validation flag from field scores.
    pub fn recompute(&mut self) {
        let scores = self.answered_scores();
        self.aggregate_score = aggregate_score(&scores);
        self.validated = is_validated(&scores);
    }

    /// Marks the given fields as unanswered and recomputes the totals.
    pub fn mark_unanswered<'a>(&mut self, field_names: impl IntoIterator<Item = &'a str>) {
        for name in field_names {
            if let Some(field) = self.fields.get_mut(name) {
                field.score = None;
            }
        }
        self.recompute();
    }
}

/// Aggregate restitution score: mean of answered scores times 3.
///
/// Rounded to one decimal and bounded to [0, 30]. No answered field scores 0.
pub fn aggregate_score(answered: &[f64]) -> f64 {
    if answered.is_empty() {
        return 0.0;
    }
    let raw = answered.iter().sum::<f64>() * 3.0 / answered.len() as f64;
    ((raw * 10.0).round() / 10.0).clamp(0.0, MAX_AGGREGATE_SCORE)
}

/// A restitution validates when at least one field was answered and every
/// answered field reaches [`PASSING_FIELD_SCORE`].
pub fn is_validated(answered: &[f64]) -> bool {
    !answered.is_empty() && answered.iter().all(|s| *s >= PASSING_FIELD_SCORE)
}

// ============================================================================
// Quiz evaluation
// ============================================================================

/// Evaluation of a full quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizEvaluationResult {
    pub score: f64,
    pub feedback: String,
    pub question_results: Vec<QuestionResult>,
    pub total_questions: usize,
    pub correct_answers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question_id: String,
    pub is_correct: bool,
    pub score: f64,
    pub feedback: String,
}

impl QuizEvaluationResult {
    /// Creates a quiz result, deriving the totals from the question results.
    pub fn new(
        score: f64,
        feedback: impl Into<String>,
        question_results: Vec<QuestionResult>,
    ) -> Self {
        let correct_answers = question_results.iter().filter(|q| q.is_correct).count();
        Self {
            score,
            feedback: feedback.into(),
            total_questions: question_results.len(),
            correct_answers,
            question_results,
        }
    }
}

// ============================================================================
// Note / mind map feedback
// ============================================================================

/// Qualitative feedback on notes or a mind map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub feedback: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

impl FeedbackResult {
    fn fallback() -> Self {
        Self {
            feedback: FALLBACK_MESSAGE.to_string(),
            strengths: Vec::new(),
            improvements: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(score: Option<f64>) -> FieldAssessment {
        FieldAssessment {
            score,
            error_kind: None,
            comment: String::new(),
        }
    }

    fn restitution(scores: &[(&str, Option<f64>)]) -> ConceptRestitutionResult {
        ConceptRestitutionResult {
            concept: "photosynthesis".to_string(),
            fields: scores
                .iter()
                .map(|(name, score)| (name.to_string(), field(*score)))
                .collect(),
            aggregate_score: 0.0,
            validated: false,
            general_comment: String::new(),
        }
    }

    #[test]
    fn aggregate_is_mean_times_three() {
        assert_eq!(aggregate_score(&[8.0, 6.5, 7.5]), 22.0);
        assert_eq!(aggregate_score(&[10.0, 10.0]), 30.0);
        assert_eq!(aggregate_score(&[7.0]), 21.0);
    }

    #[test]
    fn aggregate_rounds_to_one_decimal() {
        // mean 7.1666.. * 3 = 21.5
        assert_eq!(aggregate_score(&[7.0, 7.0, 7.5]), 21.5);
        // mean 6.3333.. * 3 = 19.0
        assert_eq!(aggregate_score(&[6.0, 6.0, 7.0]), 19.0);
        // mean 6.75 * 3 = 20.25
        assert_eq!(aggregate_score(&[6.5, 7.0]), 20.3);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        assert_eq!(aggregate_score(&[]), 0.0);
    }

    #[test]
    fn unanswered_fields_are_excluded_from_mean() {
        let mut result = restitution(&[
            ("definition", Some(8.0)),
            ("example", None),
            ("formula", Some(6.0)),
        ]);
        result.recompute();
        assert_eq!(result.aggregate_score, 21.0);
    }

    #[test]
    fn validated_requires_every_answered_field_at_seven() {
        assert!(is_validated(&[7.0, 9.5, 10.0]));
        assert!(!is_validated(&[7.0, 6.9, 10.0]));
        assert!(!is_validated(&[]));
    }

    #[test]
    fn unanswered_field_does_not_block_validation() {
        let mut result = restitution(&[("definition", Some(8.0)), ("example", None)]);
        result.recompute();
        assert!(result.validated);
    }

    #[test]
    fn mark_unanswered_clears_score_and_recomputes() {
        let mut result = restitution(&[("definition", Some(9.0)), ("example", Some(2.0))]);
        result.recompute();
        assert!(!result.validated);
        assert_eq!(result.aggregate_score, 16.5);

        result.mark_unanswered(["example"]);

        assert_eq!(result.fields["example"].score, None);
        assert!(result.validated);
        assert_eq!(result.aggregate_score, 27.0);
    }

    #[test]
    fn quiz_totals_are_derived() {
        let quiz = QuizEvaluationResult::new(
            1.0,
            "ok",
            vec![
                QuestionResult {
                    question_id: "q1".into(),
                    is_correct: true,
                    score: 1.0,
                    feedback: String::new(),
                },
                QuestionResult {
                    question_id: "q2".into(),
                    is_correct: false,
                    score: 0.0,
                    feedback: String::new(),
                },
            ],
        );
        assert_eq!(quiz.total_questions, 2);
        assert_eq!(quiz.correct_answers, 1);
    }

    #[test]
    fn every_fallback_matches_its_type() {
        for t in InteractionType::all() {
            assert_eq!(fallback_result(*t).interaction_type(), *t);
        }
    }

    #[test]
    fn fallbacks_carry_retry_message_and_neutral_scores() {
        match fallback_result(InteractionType::ConceptRestitution) {
            InteractionResult::ConceptRestitution(r) => {
                assert_eq!(r.aggregate_score, 0.0);
                assert!(!r.validated);
                assert!(r.fields.is_empty());
                assert_eq!(r.general_comment, FALLBACK_MESSAGE);
            }
            other => panic!("unexpected fallback {:?}", other),
        }

        match fallback_result(InteractionType::QuizEvaluation) {
            InteractionResult::QuizEvaluation(q) => {
                assert_eq!(q.score, 0.0);
                assert_eq!(q.total_questions, 0);
                assert_eq!(q.feedback, FALLBACK_MESSAGE);
            }
            other => panic!("unexpected fallback {:?}", other),
        }
    }

    #[test]
    fn feedback_fallback_serializes_to_expected_shape() {
        let value = serde_json::to_value(fallback_result(InteractionType::NoteFeedback)).unwrap();
        assert_eq!(
            value,
            json!({"feedback": FALLBACK_MESSAGE, "strengths": [], "improvements": []})
        );
    }

    #[test]
    fn restitution_serializes_with_french_keys() {
        let mut result = restitution(&[("definition", Some(8.0))]);
        result.recompute();
        let value = serde_json::to_value(InteractionResult::ConceptRestitution(result)).unwrap();

        assert_eq!(value["champs"]["definition"]["note"], json!(8.0));
        assert_eq!(value["champs"]["definition"]["type_erreur"], Value::Null);
        assert_eq!(value["note_globale_sur_30"], json!(24.0));
        assert_eq!(value["valide"], json!(true));
    }

    #[test]
    fn identification_serializes_camel_case() {
        let value = serde_json::to_value(ConceptIdentificationResult {
            is_correct: true,
            similarity: 1.0,
            feedback: "Correct".into(),
        })
        .unwrap();
        assert_eq!(value, json!({"isCorrect": true, "similarity": 1.0, "feedback": "Correct"}));
    }
}
