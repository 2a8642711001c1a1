//! Mock Thread Transport for testing.
//!
//! Provides a configurable implementation of the ThreadTransport port so
//! tests can exercise the interaction pipeline without the agent API.
//!
//! # Features
//!
//! - Queued completions or errors, consumed in order
//! - A responder closure that derives the completion from the prompt
//! - Simulated delays for timeout testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let transport = MockThreadTransport::new()
//!     .with_completion(r#"{"feedback": "ok", "strengths": [], "improvements": []}"#)
//!     .with_delay(Duration::from_millis(100));
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::{AgentId, OrganizationId, ThreadHandle};
use crate::ports::{ThreadTransport, TransportError};

type Responder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Completion returned when nothing is queued.
pub const DEFAULT_MOCK_COMPLETION: &str = "Mock response";

/// A configured reply to `send_message`.
#[derive(Debug, Clone)]
pub enum MockReply {
    Completion(String),
    Error(TransportError),
}

/// A thread opened through the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedThread {
    pub org: OrganizationId,
    pub agent: AgentId,
    pub thread: ThreadHandle,
}

/// A message posted through the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub org: OrganizationId,
    pub thread: ThreadHandle,
    pub prompt: String,
}

/// Mock thread transport for testing.
#[derive(Clone)]
pub struct MockThreadTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    create_errors: Arc<Mutex<VecDeque<TransportError>>>,
    responder: Option<Responder>,
    delay: Duration,
    next_thread: Arc<AtomicUsize>,
    threads: Arc<Mutex<Vec<CreatedThread>>>,
    messages: Arc<Mutex<Vec<SentMessage>>>,
}

impl std::fmt::Debug for MockThreadTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockThreadTransport")
            .field("queued", &lock(&self.replies).len())
            .field("has_responder", &self.responder.is_some())
            .field("delay", &self.delay)
            .finish()
    }
}

impl Default for MockThreadTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockThreadTransport {
    /// Creates a mock with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            create_errors: Arc::new(Mutex::new(VecDeque::new())),
            responder: None,
            delay: Duration::ZERO,
            next_thread: Arc::new(AtomicUsize::new(1)),
            threads: Arc::new(Mutex::new(Vec::new())),
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a completion for the next `send_message`.
    pub fn with_completion(self, content: impl Into<String>) -> Self {
        lock(&self.replies).push_back(MockReply::Completion(content.into()));
        self
    }

    /// Queues an error for the next `send_message`.
    pub fn with_send_error(self, error: TransportError) -> Self {
        lock(&self.replies).push_back(MockReply::Error(error));
        self
    }

    /// Queues an error for the next `create_thread`.
    pub fn with_create_error(self, error: TransportError) -> Self {
        lock(&self.create_errors).push_back(error);
        self
    }

    /// Derives completions from the prompt once the queue is empty.
    pub fn with_responder(mut self, responder: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.responder = Some(Arc::new(responder));
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of `create_thread` calls, failed ones included.
    pub fn create_count(&self) -> usize {
        self.next_thread.load(Ordering::SeqCst) - 1
    }

    /// Number of `send_message` calls.
    pub fn send_count(&self) -> usize {
        lock(&self.messages).len()
    }

    /// Total transport calls.
    pub fn call_count(&self) -> usize {
        self.create_count() + self.send_count()
    }

    /// Threads successfully created, in order.
    pub fn created_threads(&self) -> Vec<CreatedThread> {
        lock(&self.threads).clone()
    }

    /// Messages sent, in order.
    pub fn sent_messages(&self) -> Vec<SentMessage> {
        lock(&self.messages).clone()
    }

    fn next_reply(&self, prompt: &str) -> MockReply {
        if let Some(reply) = lock(&self.replies).pop_front() {
            return reply;
        }
        match &self.responder {
            Some(responder) => MockReply::Completion(responder(prompt)),
            None => MockReply::Completion(DEFAULT_MOCK_COMPLETION.to_string()),
        }
    }
}

/// Locks ignoring poisoning; a panicking test must not hide other failures.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl ThreadTransport for MockThreadTransport {
    async fn create_thread(
        &self,
        org: &OrganizationId,
        agent: &AgentId,
    ) -> Result<ThreadHandle, TransportError> {
        let n = self.next_thread.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        if let Some(err) = lock(&self.create_errors).pop_front() {
            return Err(err);
        }

        let thread = ThreadHandle::new(format!("mock-thread-{}", n));
        lock(&self.threads).push(CreatedThread {
            org: org.clone(),
            agent: agent.clone(),
            thread: thread.clone(),
        });
        Ok(thread)
    }

    async fn send_message(
        &self,
        org: &OrganizationId,
        thread: &ThreadHandle,
        prompt: &str,
    ) -> Result<String, TransportError> {
        lock(&self.messages).push(SentMessage {
            org: org.clone(),
            thread: thread.clone(),
            prompt: prompt.to_string(),
        });

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_reply(prompt) {
            MockReply::Completion(content) => Ok(content),
            MockReply::Error(err) => Err(err),
        }
    }
}
