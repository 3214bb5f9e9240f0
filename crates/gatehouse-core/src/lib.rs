//! # Gatehouse Core
//!
//! Core types for the Gatehouse authentication middleware pipeline.
//!
//! This crate provides the data entities and request-scoped state shared by
//! the pipeline orchestrator and its strategy plugins:
//!
//! - [`Identity`] - the authenticated subject (login, credential, roles, groups)
//! - [`ResourceAction`] - canonical dotted method+path authorization subject
//! - [`AuthContext`] - per-request outcome state (identified/authenticated/authorized)
//! - [`RequestId`] - UUID v7 request identifier for log correlation
//! - [`AuthError`] - the two pipeline-terminal signals (401/403 equivalents)

#![doc(html_root_url = "https://docs.rs/gatehouse-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod identity;
mod resource;

pub use context::{AuthContext, RequestId};
pub use error::AuthError;
pub use identity::Identity;
pub use resource::ResourceAction;
