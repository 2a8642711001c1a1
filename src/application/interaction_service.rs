//! InteractionService - Single entry point for AI-graded interactions.
//!
//! Turns (organization, content, interaction type) into a validated typed
//! result. Per call:
//!
//! 1. Resolve the agent (explicit id, binding table, or local algorithm)
//! 2. Local algorithm: compare strings in-process and return
//! 3. Remote: compose the prompt, open a fresh thread, send one message
//! 4. Extract and repair the JSON payload, then validate its shape
//!
//! Any failure from thread creation onward is logged and replaced by the
//! fallback result for the type. Only configuration defects reach the caller.

use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::foundation::{AgentId, InteractionType, OrganizationId};
use crate::domain::interaction::{
    compose_prompt, extract_json, fallback_result, identify_concept, identify_from_value, validate,
    AgentBinding, AgentBindings, ConfigurationError, InteractionFailure, InteractionResult,
};
use crate::ports::{ThreadTransport, TransportError};

/// Longest raw-response excerpt written to logs.
pub const MAX_LOGGED_RESPONSE_CHARS: usize = 500;

const ANSWER_KEYS: &[&str] = &["reponses", "answers"];

/// What the student submitted.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionContent {
    /// Free text, appended to the prompt as-is.
    Text(String),
    /// Structured input, appended to the prompt as pretty JSON.
    Structured(Value),
}

impl InteractionContent {
    /// Renders the content for the prompt.
    pub fn render(&self) -> String {
        match self {
            InteractionContent::Text(text) => text.clone(),
            InteractionContent::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl From<&str> for InteractionContent {
    fn from(text: &str) -> Self {
        InteractionContent::Text(text.to_string())
    }
}

impl From<String> for InteractionContent {
    fn from(text: String) -> Self {
        InteractionContent::Text(text)
    }
}

impl From<Value> for InteractionContent {
    fn from(value: Value) -> Self {
        InteractionContent::Structured(value)
    }
}

/// One interaction call.
#[derive(Debug, Clone)]
pub struct InteractionRequest {
    pub organization: String,
    pub content: InteractionContent,
    pub interaction_type: InteractionType,
    pub agent: Option<String>,
    pub timeout: Option<Duration>,
}

impl InteractionRequest {
    pub fn new(
        organization: impl Into<String>,
        content: impl Into<InteractionContent>,
        interaction_type: InteractionType,
    ) -> Self {
        Self {
            organization: organization.into(),
            content: content.into(),
            interaction_type,
            agent: None,
            timeout: None,
        }
    }

    /// Uses this agent regardless of the binding table.
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Bounds each transport call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Recoverable failure plus the raw completion, when one was received.
struct Failed {
    failure: InteractionFailure,
    raw: Option<String>,
}

impl From<TransportError> for Failed {
    fn from(err: TransportError) -> Self {
        Self {
            failure: err.into(),
            raw: None,
        }
    }
}

/// Facade over prompt catalog, transport, extractor and validator.
pub struct InteractionService {
    transport: Arc<dyn ThreadTransport>,
    bindings: AgentBindings,
    default_organization: Option<OrganizationId>,
    default_timeout: Option<Duration>,
}

impl InteractionService {
    pub fn new(transport: Arc<dyn ThreadTransport>, bindings: AgentBindings) -> Self {
        Self {
            transport,
            bindings,
            default_organization: None,
            default_timeout: None,
        }
    }

    /// Organization used when a call passes a blank one.
    pub fn with_default_organization(mut self, organization: impl Into<String>) -> Self {
        self.default_organization = OrganizationId::new(organization);
        self
    }

    /// Timeout applied when a request sets none.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Runs one interaction.
    ///
    /// Returns `Err` only for configuration defects, before any network call.
    pub async fn interact(
        &self,
        organization: &str,
        content: impl Into<InteractionContent>,
        interaction_type: InteractionType,
        explicit_agent: Option<&str>,
    ) -> Result<InteractionResult, ConfigurationError> {
        let mut request = InteractionRequest::new(organization, content, interaction_type);
        request.agent = explicit_agent.map(str::to_string);
        self.execute(request).await
    }

    /// Runs one interaction described by a request.
    pub async fn execute(
        &self,
        request: InteractionRequest,
    ) -> Result<InteractionResult, ConfigurationError> {
        let span = tracing::info_span!(
            "interaction",
            request_id = %Uuid::new_v4(),
            interaction_type = %request.interaction_type,
        );
        self.execute_in_span(request).instrument(span).await
    }

    async fn execute_in_span(
        &self,
        request: InteractionRequest,
    ) -> Result<InteractionResult, ConfigurationError> {
        let interaction_type = request.interaction_type;
        let explicit = request.agent.as_deref().and_then(AgentId::new);

        let binding = self.bindings.resolve(interaction_type, explicit.as_ref())?;
        tracing::debug!(%interaction_type, ?binding, "agent resolved");

        let agent = match binding {
            AgentBinding::LocalAlgorithm => {
                tracing::debug!(%interaction_type, "computing locally");
                return Ok(self.compute_locally(interaction_type, &request.content));
            }
            AgentBinding::Remote(agent) => agent,
        };

        let organization = OrganizationId::new(request.organization.as_str())
            .or_else(|| self.default_organization.clone())
            .ok_or(ConfigurationError::MissingOrganization)?;

        let timeout = request.timeout.or(self.default_timeout);
        match self
            .run_remote(&organization, &agent, interaction_type, &request.content, timeout)
            .await
        {
            Ok(result) => {
                tracing::debug!(%interaction_type, "interaction validated");
                Ok(result)
            }
            Err(Failed { failure, raw }) => {
                let raw_response = raw.as_deref().map(excerpt).unwrap_or_default();
                tracing::warn!(
                    %interaction_type,
                    agent_id = %agent,
                    kind = failure.kind(),
                    error = %failure,
                    %raw_response,
                    "interaction failed, returning fallback"
                );
                Ok(fallback_result(interaction_type))
            }
        }
    }

    /// The local algorithm only produces identification results; other
    /// types bound to it get their fallback.
    fn compute_locally(
        &self,
        interaction_type: InteractionType,
        content: &InteractionContent,
    ) -> InteractionResult {
        if interaction_type != InteractionType::ConceptIdentification {
            tracing::warn!(%interaction_type, "no local algorithm for type, returning fallback");
            return fallback_result(interaction_type);
        }
        let result = match content {
            InteractionContent::Structured(value) => identify_from_value(value),
            InteractionContent::Text(answer) => identify_concept(None, answer),
        };
        InteractionResult::ConceptIdentification(result)
    }

    async fn run_remote(
        &self,
        organization: &OrganizationId,
        agent: &AgentId,
        interaction_type: InteractionType,
        content: &InteractionContent,
        timeout: Option<Duration>,
    ) -> Result<InteractionResult, Failed> {
        let prompt = compose_prompt(interaction_type, &content.render());

        let thread = bounded(timeout, self.transport.create_thread(organization, agent)).await?;
        tracing::debug!(%interaction_type, thread_id = %thread, "thread created");

        let raw = bounded(
            timeout,
            self.transport.send_message(organization, &thread, &prompt),
        )
        .await?;
        tracing::debug!(%interaction_type, thread_id = %thread, "message sent");

        let with_raw = |err: InteractionFailure, raw: &str| Failed {
            failure: err,
            raw: Some(raw.to_string()),
        };

        let repaired = extract_json(&raw).map_err(|e| with_raw(e.into(), &raw))?;
        if repaired.repaired {
            tracing::info!(%interaction_type, thread_id = %thread, "agent response repaired");
        }
        tracing::debug!(%interaction_type, "json extracted");

        let mut result =
            validate(interaction_type, repaired.value).map_err(|e| with_raw(e.into(), &raw))?;

        if let (InteractionResult::ConceptRestitution(restitution), InteractionContent::Structured(value)) =
            (&mut result, content)
        {
            let blank = blank_answers(value);
            if !blank.is_empty() {
                restitution.mark_unanswered(blank.iter().map(String::as_str));
            }
        }

        Ok(result)
    }
}

/// Applies an optional deadline to one transport call.
async fn bounded<T, F>(timeout: Option<Duration>, call: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| TransportError::timeout(limit))?,
        None => call.await,
    }
}

/// Fields the student left blank, read from a `reponses` or `answers` object.
fn blank_answers(content: &Value) -> Vec<String> {
    let Some(answers) = ANSWER_KEYS
        .iter()
        .find_map(|key| content.get(*key).and_then(Value::as_object))
    else {
        return Vec::new();
    };
    answers
        .iter()
        .filter(|(_, answer)| match answer {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        })
        .map(|(field, _)| field.clone())
        .collect()
}

fn excerpt(raw: &str) -> String {
    raw.chars().take(MAX_LOGGED_RESPONSE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockThreadTransport;
    use crate::domain::interaction::FALLBACK_MESSAGE;
    use serde_json::json;

    fn service(transport: MockThreadTransport) -> InteractionService {
        let bindings = AgentBindings::new()
            .with_local(InteractionType::ConceptIdentification)
            .with_agent(InteractionType::ConceptRestitution, "restitution-bot")
            .with_agent(InteractionType::NoteFeedback, "notes-bot");
        InteractionService::new(Arc::new(transport), bindings)
    }

    #[test]
    fn structured_content_renders_as_json() {
        let content = InteractionContent::from(json!({"a": 1}));
        assert_eq!(content.render(), "{\n  \"a\": 1\n}");
        assert_eq!(InteractionContent::from("plain").render(), "plain");
    }

    #[test]
    fn blank_answers_finds_empty_fields() {
        let content = json!({"reponses": {"definition": "x", "example": "  ", "formula": null}});
        let mut blank = blank_answers(&content);
        blank.sort();
        assert_eq!(blank, vec!["example".to_string(), "formula".to_string()]);
        assert!(blank_answers(&json!({"other": 1})).is_empty());
    }

    #[test]
    fn excerpt_is_bounded_on_char_boundaries() {
        let raw = "é".repeat(800);
        assert_eq!(excerpt(&raw).chars().count(), MAX_LOGGED_RESPONSE_CHARS);
    }

    #[tokio::test]
    async fn prompt_is_template_then_content() {
        let transport = MockThreadTransport::new()
            .with_completion(r#"{"feedback": "ok", "strengths": [], "improvements": []}"#);
        let svc = service(transport.clone());

        svc.interact("org-1", "my notes", InteractionType::NoteFeedback, None)
            .await
            .unwrap();

        let sent = transport.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].prompt.ends_with("\n\nmy notes"));
        assert_eq!(
            sent[0].prompt,
            compose_prompt(InteractionType::NoteFeedback, "my notes")
        );
    }

    #[tokio::test]
    async fn blank_organization_uses_default() {
        let transport = MockThreadTransport::new()
            .with_completion(r#"{"feedback": "ok", "strengths": [], "improvements": []}"#);
        let svc = service(transport.clone()).with_default_organization("org-default");

        svc.interact("", "notes", InteractionType::NoteFeedback, None)
            .await
            .unwrap();

        assert_eq!(transport.created_threads()[0].org.as_str(), "org-default");
    }

    #[tokio::test]
    async fn missing_organization_is_configuration_error() {
        let transport = MockThreadTransport::new();
        let svc = service(transport.clone());

        let err = svc
            .interact("  ", "notes", InteractionType::NoteFeedback, None)
            .await
            .unwrap_err();

        assert_eq!(err, ConfigurationError::MissingOrganization);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn create_failure_skips_send() {
        let transport =
            MockThreadTransport::new().with_create_error(TransportError::status(500, "boom"));
        let svc = service(transport.clone());

        let result = svc
            .interact("org-1", "notes", InteractionType::NoteFeedback, None)
            .await
            .unwrap();

        assert_eq!(result, fallback_result(InteractionType::NoteFeedback));
        assert_eq!(transport.send_count(), 0);
    }

    #[tokio::test]
    async fn slow_transport_times_out_to_fallback() {
        let transport = MockThreadTransport::new()
            .with_completion(r#"{"feedback": "late", "strengths": [], "improvements": []}"#)
            .with_delay(Duration::from_millis(200));
        let svc = service(transport);

        let request = InteractionRequest::new("org-1", "notes", InteractionType::NoteFeedback)
            .with_timeout(Duration::from_millis(20));
        let result = svc.execute(request).await.unwrap();

        let InteractionResult::NoteFeedback(feedback) = result else {
            panic!("wrong variant");
        };
        assert_eq!(feedback.feedback, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn sub_second_deadline_is_reported_in_milliseconds() {
        let call = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<(), TransportError>(())
        };

        let err = bounded(Some(Duration::from_millis(20)), call).await.unwrap_err();

        assert_eq!(err, TransportError::timeout(Duration::from_millis(20)));
        assert_eq!(err.to_string(), "request timed out after 20ms");
    }

    #[tokio::test]
    async fn shape_mismatch_falls_back() {
        let transport = MockThreadTransport::new().with_completion(r#"{"feedback": 3}"#);
        let svc = service(transport);

        let result = svc
            .interact("org-1", "notes", InteractionType::NoteFeedback, None)
            .await
            .unwrap();

        assert_eq!(result, fallback_result(InteractionType::NoteFeedback));
    }

    #[tokio::test]
    async fn truncated_response_is_repaired() {
        let transport = MockThreadTransport::new()
            .with_completion(r#"{"feedback": "good", "strengths": ["clear"], "improvements": ["#);
        let svc = service(transport);

        let result = svc
            .interact("org-1", "notes", InteractionType::NoteFeedback, None)
            .await
            .unwrap();

        let InteractionResult::NoteFeedback(feedback) = result else {
            panic!("wrong variant");
        };
        assert_eq!(feedback.feedback, "good");
        assert_eq!(feedback.strengths, vec!["clear".to_string()]);
        assert!(feedback.improvements.is_empty());
    }

    #[tokio::test]
    async fn restitution_blank_answers_are_excluded() {
        let completion = json!({
            "concept": "Osmosis",
            "champs": {
                "definition": {"note": 8, "type_erreur": null, "commentaire": "good"},
                "example": {"note": 2, "type_erreur": "absent", "commentaire": "nothing given"}
            },
            "note_globale_sur_30": 15,
            "valide": false,
            "commentaire_general": "ok"
        })
        .to_string();
        let transport = MockThreadTransport::new().with_completion(completion);
        let svc = service(transport);

        let content = json!({"concept": "Osmosis", "reponses": {"definition": "water moves", "example": ""}});
        let result = svc
            .interact("org-1", content, InteractionType::ConceptRestitution, None)
            .await
            .unwrap();

        let InteractionResult::ConceptRestitution(r) = result else {
            panic!("wrong variant");
        };
        assert_eq!(r.fields["example"].score, None);
        assert_eq!(r.aggregate_score, 24.0);
        assert!(r.validated);
    }

    #[tokio::test]
    async fn local_structured_content_is_compared() {
        let transport = MockThreadTransport::new();
        let svc = service(transport.clone());

        let result = svc
            .interact(
                "org-1",
                json!({"concept": "Respiration", "reponse": "respiration"}),
                InteractionType::ConceptIdentification,
                None,
            )
            .await
            .unwrap();

        let InteractionResult::ConceptIdentification(r) = result else {
            panic!("wrong variant");
        };
        assert!(r.is_correct);
        assert_eq!(r.similarity, 1.0);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn explicit_agent_bypasses_local_binding() {
        let transport = MockThreadTransport::new()
            .with_completion(r#"{"isCorrect": false, "similarity": 0.2, "feedback": "no"}"#);
        let svc = service(transport.clone());

        svc.interact(
            "org-1",
            "respiration",
            InteractionType::ConceptIdentification,
            Some("identify-bot"),
        )
        .await
        .unwrap();

        let threads = transport.created_threads();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].agent.as_str(), "identify-bot");
    }
}
