//! Scenario assembly engine for Scenarist.
//!
//! This crate turns a natural-language automation request into a Make.com
//! scenario document:
//!
//! - **Classification**: keyword detection of the services a prompt
//!   mentions, via [`classifier::classify`].
//! - **Chain building**: trigger → AI processing → action, with ids, layout
//!   and inter-module references, via [`builder::build`].
//! - **Assembly**: lowering the typed chain to the wire document, via
//!   [`assembler::assemble`].
//! - **Coordination**: remote generation with deterministic fallback, via
//!   [`generator::ScenarioGenerator`].

pub mod assembler;
pub mod builder;
pub mod classifier;
pub mod error;
pub mod generator;
pub mod module;
pub mod scenario;
pub mod validate;

pub use assembler::{DESCRIPTION_MAX_CHARS, assemble, assemble_with_limit};
pub use builder::{ChainBuilder, build, select_action, select_trigger};
pub use classifier::{IntentClassifier, Service, ServiceFlags, classify};
pub use error::{IntentError, Result};
pub use generator::{Generation, GenerationSource, GeneratorConfig, ScenarioGenerator};
pub use module::{ChainModule, ModuleId, ModuleKind, ModuleRole, Reference};
pub use scenario::{
    DocumentMetadata, ExecutionPolicy, Layout, Module, ModuleMetadata, ScenarioDocument, UiHint,
};
pub use validate::validate_scenario;
