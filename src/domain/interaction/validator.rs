//! Per-type validation of parsed agent responses.
//!
//! Checks the required fields of each interaction type and builds the typed
//! result. All problems in a payload are collected before failing, so one
//! `ShapeMismatch` names every missing or mistyped field.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::errors::ShapeMismatch;
use super::results::{
    ConceptIdentificationResult, ConceptRestitutionResult, FeedbackResult, FieldAssessment,
    InteractionResult, QuestionResult, QuizEvaluationResult, MAX_FIELD_SCORE,
};
use crate::domain::foundation::InteractionType;

/// Validates a parsed payload against the contract of its interaction type.
pub fn validate(
    interaction_type: InteractionType,
    parsed: Value,
) -> Result<InteractionResult, ShapeMismatch> {
    let mismatch = |problems: Vec<String>| ShapeMismatch {
        interaction_type,
        problems,
    };

    let object = match parsed {
        Value::Object(object) => object,
        Value::Null => return Err(mismatch(vec!["expected a JSON object, got null".into()])),
        other => {
            return Err(mismatch(vec![format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )]))
        }
    };

    match interaction_type {
        InteractionType::ConceptIdentification => {
            concept_identification(&object).map(InteractionResult::ConceptIdentification)
        }
        InteractionType::ConceptRestitution => {
            concept_restitution(&object).map(InteractionResult::ConceptRestitution)
        }
        InteractionType::QuizEvaluation => {
            quiz_evaluation(&object).map(InteractionResult::QuizEvaluation)
        }
        InteractionType::NoteFeedback => feedback(&object).map(InteractionResult::NoteFeedback),
        InteractionType::MindmapFeedback => {
            feedback(&object).map(InteractionResult::MindmapFeedback)
        }
        InteractionType::StudyPlanning => Ok(InteractionResult::StudyPlanning(object)),
        InteractionType::ProgressReport => Ok(InteractionResult::ProgressReport(object)),
    }
    .map_err(mismatch)
}

fn concept_identification(object: &Map<String, Value>) -> Result<ConceptIdentificationResult, Vec<String>> {
    let mut fields = FieldReader::new(object, "");
    let is_correct = fields.boolean(&["isCorrect", "is_correct"]);
    let similarity = fields.number(&["similarity"]);
    let feedback = fields.string(&["feedback"]);
    fields.finish()?;

    Ok(ConceptIdentificationResult {
        is_correct,
        similarity: similarity.clamp(0.0, 1.0),
        feedback,
    })
}

fn concept_restitution(object: &Map<String, Value>) -> Result<ConceptRestitutionResult, Vec<String>> {
    let mut reader = FieldReader::new(object, "");
    let concept = reader.string(&["concept"]);
    // Checked for presence only; both are recomputed from field scores.
    reader.number(&["note_globale_sur_30", "aggregate_score"]);
    reader.boolean(&["valide", "validated"]);
    let general_comment = reader.string(&["commentaire_general", "general_comment"]);

    let mut fields = BTreeMap::new();
    match lookup(object, &["champs", "fields"]) {
        None => reader.problems.push("missing field champs".into()),
        Some(Value::Object(entries)) => {
            for (name, entry) in entries {
                let path = format!("champs.{}", name);
                match entry {
                    Value::Object(entry) => {
                        let mut field = FieldReader::new(entry, &path);
                        let score = field.nullable_number(&["note", "score"]);
                        let error_kind = field.optional_string(&["type_erreur", "error_kind"]);
                        let comment = field.string(&["commentaire", "comment"]);
                        reader.problems.append(&mut field.problems);
                        fields.insert(
                            name.clone(),
                            FieldAssessment {
                                score: score.map(|s| s.clamp(0.0, MAX_FIELD_SCORE)),
                                error_kind,
                                comment,
                            },
                        );
                    }
                    other => reader
                        .problems
                        .push(format!("{} must be an object, got {}", path, json_kind(other))),
                }
            }
        }
        Some(other) => reader
            .problems
            .push(format!("champs must be an object, got {}", json_kind(other))),
    }
    reader.finish()?;

    let mut result = ConceptRestitutionResult {
        concept,
        fields,
        aggregate_score: 0.0,
        validated: false,
        general_comment,
    };
    result.recompute();
    Ok(result)
}

fn quiz_evaluation(object: &Map<String, Value>) -> Result<QuizEvaluationResult, Vec<String>> {
    let mut reader = FieldReader::new(object, "");
    let score = reader.number(&["score"]);
    let feedback = reader.string(&["feedback"]);

    let mut question_results = Vec::new();
    match lookup(object, &["questionResults", "question_results"]) {
        None => reader.problems.push("missing field questionResults".into()),
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                let path = format!("questionResults[{}]", i);
                let Value::Object(entry) = item else {
                    reader
                        .problems
                        .push(format!("{} must be an object, got {}", path, json_kind(item)));
                    continue;
                };
                let mut question = FieldReader::new(entry, &path);
                let question_id = question.identifier(&["questionId", "question_id"]);
                let is_correct = question.boolean(&["isCorrect", "is_correct"]);
                let question_score = question.number(&["score"]);
                let question_feedback = question.string(&["feedback"]);
                reader.problems.append(&mut question.problems);
                question_results.push(QuestionResult {
                    question_id,
                    is_correct,
                    score: question_score,
                    feedback: question_feedback,
                });
            }
        }
        Some(other) => reader
            .problems
            .push(format!("questionResults must be a list, got {}", json_kind(other))),
    }
    reader.finish()?;

    Ok(QuizEvaluationResult::new(score, feedback, question_results))
}

fn feedback(object: &Map<String, Value>) -> Result<FeedbackResult, Vec<String>> {
    let mut reader = FieldReader::new(object, "");
    let feedback = reader.string(&["feedback"]);
    let strengths = reader.string_list(&["strengths"]);
    let improvements = reader.string_list(&["improvements"]);
    reader.finish()?;

    Ok(FeedbackResult {
        feedback,
        strengths,
        improvements,
    })
}

/// Returns the first present key among `names` (canonical name first).
fn lookup<'a>(object: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| object.get(*name))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Reads typed fields from one JSON object, recording problems instead of
/// failing on the first one. Accessors return a neutral value on failure.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    prefix: String,
    problems: Vec<String>,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>, path: &str) -> Self {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}.", path)
        };
        Self {
            object,
            prefix,
            problems: Vec::new(),
        }
    }

    fn finish(self) -> Result<(), Vec<String>> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(self.problems)
        }
    }

    fn get(&mut self, names: &[&str]) -> Option<&'a Value> {
        let value = lookup(self.object, names);
        if value.is_none() {
            self.problems
                .push(format!("missing field {}{}", self.prefix, names[0]));
        }
        value
    }

    fn invalid(&mut self, name: &str, expected: &str, got: &Value) {
        self.problems.push(format!(
            "{}{} must be {}, got {}",
            self.prefix,
            name,
            expected,
            json_kind(got)
        ));
    }

    fn string(&mut self, names: &[&str]) -> String {
        match self.get(names) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                self.invalid(names[0], "a string", other);
                String::new()
            }
            None => String::new(),
        }
    }

    /// Missing and null both read as None.
    fn optional_string(&mut self, names: &[&str]) -> Option<String> {
        match lookup(self.object, names) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.invalid(names[0], "a string or null", other);
                None
            }
        }
    }

    fn boolean(&mut self, names: &[&str]) -> bool {
        match self.get(names) {
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                self.invalid(names[0], "a boolean", other);
                false
            }
            None => false,
        }
    }

    fn number(&mut self, names: &[&str]) -> f64 {
        match self.get(names) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(other) => {
                self.invalid(names[0], "a number", other);
                0.0
            }
            None => 0.0,
        }
    }

    /// Key must be present; null reads as None.
    fn nullable_number(&mut self, names: &[&str]) -> Option<f64> {
        match self.get(names) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::Null) | None => None,
            Some(other) => {
                self.invalid(names[0], "a number or null", other);
                None
            }
        }
    }

    /// String or number, rendered as a string.
    fn identifier(&mut self, names: &[&str]) -> String {
        match self.get(names) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(other) => {
                self.invalid(names[0], "a string or number", other);
                String::new()
            }
            None => String::new(),
        }
    }

    fn string_list(&mut self, names: &[&str]) -> Vec<String> {
        match self.get(names) {
            Some(Value::Array(items)) => {
                let strings: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.as_str().map(String::from))
                    .collect();
                if strings.len() != items.len() {
                    self.problems
                        .push(format!("{}{} must be a list of strings", self.prefix, names[0]));
                }
                strings
            }
            Some(other) => {
                self.invalid(names[0], "a list of strings", other);
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}
