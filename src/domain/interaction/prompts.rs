//! Prompt templates sent to the grading agents.
//!
//! Each template tells the agent what to evaluate and the exact JSON shape to
//! answer with. The student content is appended after a blank line.

use crate::domain::foundation::InteractionType;

/// Returns the instruction template for an interaction type.
pub fn prompt_template_for(interaction_type: InteractionType) -> &'static str {
    match interaction_type {
        InteractionType::ConceptIdentification => CONCEPT_IDENTIFICATION_TEMPLATE,
        InteractionType::ConceptRestitution => CONCEPT_RESTITUTION_TEMPLATE,
        InteractionType::QuizEvaluation => QUIZ_EVALUATION_TEMPLATE,
        InteractionType::NoteFeedback => NOTE_FEEDBACK_TEMPLATE,
        InteractionType::MindmapFeedback => MINDMAP_FEEDBACK_TEMPLATE,
        InteractionType::StudyPlanning => STUDY_PLANNING_TEMPLATE,
        InteractionType::ProgressReport => PROGRESS_REPORT_TEMPLATE,
    }
}

/// Builds the message sent to the agent: template, blank line, content.
pub fn compose_prompt(interaction_type: InteractionType, content: &str) -> String {
    format!("{}\n\n{}", prompt_template_for(interaction_type), content)
}

// ============================================================================
// Templates
// ============================================================================

const CONCEPT_IDENTIFICATION_TEMPLATE: &str = r#"You check whether a student correctly identified a concept from its definition.

Compare the student's answer with the expected concept. Accept synonyms and minor spelling mistakes.

Respond ONLY with a JSON object of this exact shape:
{
  "isCorrect": true | false,
  "similarity": 0.0-1.0,
  "feedback": "one or two sentences addressed to the student"
}"#;

const CONCEPT_RESTITUTION_TEMPLATE: &str = r#"You grade a student's restitution of a concept, field by field.

For every field of the concept, score the student's answer from 0 to 10. If the student left a field empty, set its "note" to null. Classify the main error, if any, as "omission", "imprecision", "confusion" or "contresens"; otherwise use null.

The global score is the mean of the answered fields multiplied by 3 (out of 30). The restitution is validated only if every answered field scores 7 or more.

Respond ONLY with a JSON object of this exact shape:
{
  "concept": "name of the concept",
  "champs": {
    "<field name>": {
      "note": 0-10 | null,
      "type_erreur": "omission" | "imprecision" | "confusion" | "contresens" | null,
      "commentaire": "short comment on this field"
    }
  },
  "note_globale_sur_30": 0-30,
  "valide": true | false,
  "commentaire_general": "overall remediation advice"
}"#;

const QUIZ_EVALUATION_TEMPLATE: &str = r#"You evaluate a student's answers to a quiz.

For each question, decide whether the answer is correct, give a score from 0 to 1 and a short explanation. The overall score is the sum of the question scores.

Respond ONLY with a JSON object of this exact shape:
{
  "score": number,
  "feedback": "overall feedback",
  "questionResults": [
    {
      "questionId": "identifier of the question",
      "isCorrect": true | false,
      "score": number,
      "feedback": "explanation for this question"
    }
  ]
}"#;

const NOTE_FEEDBACK_TEMPLATE: &str = r#"You review a student's study notes for a chapter.

Assess structure, accuracy and completeness. Be concrete and encouraging.

Respond ONLY with a JSON object of this exact shape:
{
  "feedback": "overall assessment",
  "strengths": ["strength", "..."],
  "improvements": ["suggested improvement", "..."]
}"#;

const MINDMAP_FEEDBACK_TEMPLATE: &str = r#"You review a student's mind map, given as a list of nodes and links.

Assess the hierarchy of ideas, the relevance of the links and what is missing.

Respond ONLY with a JSON object of this exact shape:
{
  "feedback": "overall assessment",
  "strengths": ["strength", "..."],
  "improvements": ["suggested improvement", "..."]
}"#;

const STUDY_PLANNING_TEMPLATE: &str = r#"You build a study plan for a student from their courses, deadlines and available time.

Spread the work over the available days, prioritise upcoming deadlines and include review sessions.

Respond ONLY with a JSON object, for example:
{
  "summary": "one paragraph overview",
  "sessions": [
    { "date": "YYYY-MM-DD", "course": "course name", "chapter": "chapter name", "durationMinutes": number, "activity": "what to do" }
  ]
}"#;

const PROGRESS_REPORT_TEMPLATE: &str = r#"You write a progress report from a student's activity history and scores.

Highlight progress, recurring difficulties and the next priorities.

Respond ONLY with a JSON object, for example:
{
  "summary": "one paragraph overview",
  "achievements": ["..."],
  "difficulties": ["..."],
  "nextSteps": ["..."]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_a_non_empty_template() {
        for t in InteractionType::all() {
            assert!(!prompt_template_for(*t).trim().is_empty(), "{} has no template", t);
        }
    }

    #[test]
    fn templates_ask_for_json_only() {
        for t in InteractionType::all() {
            assert!(prompt_template_for(*t).contains("Respond ONLY with a JSON object"));
        }
    }

    #[test]
    fn restitution_template_names_the_scored_fields() {
        let template = prompt_template_for(InteractionType::ConceptRestitution);
        assert!(template.contains("\"champs\""));
        assert!(template.contains("\"note_globale_sur_30\""));
        assert!(template.contains("\"valide\""));
    }

    #[test]
    fn compose_prompt_separates_template_and_content_with_blank_line() {
        let prompt = compose_prompt(InteractionType::NoteFeedback, "my notes");
        let template = prompt_template_for(InteractionType::NoteFeedback);

        assert!(prompt.starts_with(template));
        assert!(prompt.ends_with("\n\nmy notes"));
        assert_eq!(prompt.len(), template.len() + 2 + "my notes".len());
    }
}
