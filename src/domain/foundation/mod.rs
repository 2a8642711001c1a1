//! Shared domain primitives: the interaction tag and identifier value objects.

mod ids;
mod interaction_type;

pub use ids::{AgentId, OrganizationId, ThreadHandle};
pub use interaction_type::{InteractionType, UnknownInteractionType};
