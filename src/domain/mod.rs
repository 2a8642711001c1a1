//! Domain layer containing the interaction pipeline logic and types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (interaction tag, identifiers)
//! - `interaction` - Prompt catalog, agent selection, JSON repair, validation, results

pub mod foundation;
pub mod interaction;
