//! Interaction pipeline domain: prompt catalog, agent selection, JSON
//! extraction and repair, per-type validation and the result shapes.

mod agent_binding;
mod errors;
mod extractor;
mod prompts;
mod results;
mod similarity;
mod validator;

pub use agent_binding::{AgentBinding, AgentBindings, LOCAL_ALGORITHM_MARKER};
pub use errors::{ConfigurationError, ExtractionError, InteractionFailure, ShapeMismatch};
pub use extractor::{extract_json, RepairedJson, MAX_PAYLOAD_STARTS, MAX_REPAIR_ATTEMPTS};
pub use prompts::{compose_prompt, prompt_template_for};
pub use results::{
    aggregate_score, fallback_result, is_validated, ConceptIdentificationResult,
    ConceptRestitutionResult, FeedbackResult, FieldAssessment, InteractionResult, QuestionResult,
    QuizEvaluationResult, FALLBACK_MESSAGE, MAX_AGGREGATE_SCORE, MAX_FIELD_SCORE,
    PASSING_FIELD_SCORE,
};
pub use similarity::{identify_concept, identify_from_value, similarity, CORRECT_THRESHOLD};
pub use validator::validate;
