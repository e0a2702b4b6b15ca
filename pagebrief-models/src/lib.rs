//! Multi-provider summarization core for pagebrief.
//!
//! This crate provides:
//! - Provider adapters for OpenAI, Gemini and DeepSeek
//! - A registry with per-provider capability flags
//! - A dispatcher enforcing the timeout and classifying failures
//! - Credential management for API keys
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     Dispatcher                       │
//! │        (timeout + cancellation, classify once)       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  ProviderRegistry                    │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  │
//! │  │   OpenAI    │  │   Gemini    │  │  DeepSeek   │  │
//! │  │  Provider   │  │  Provider   │  │  Provider   │  │
//! │  └─────────────┘  └─────────────┘  └─────────────┘  │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                   HttpTransport                      │
//! │              (reqwest, or a test stub)               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! API keys come from [`auth::CredentialStore`] (system keyring with an
//! environment fallback) and are passed to [`Dispatcher::dispatch`]
//! explicitly.

mod error;
mod failure;
mod types;

pub mod auth;
pub mod classify;
pub mod dispatch;
pub mod http;
pub mod providers;
pub mod registry;

pub use dispatch::{DEFAULT_TIMEOUT, DispatchConfig, Dispatcher};
pub use error::{Error, Result};
pub use failure::{
    CanonicalError, ErrorKind, HttpFailure, INVALID_RESPONSE_STRUCTURE, ProviderFailure,
};
pub use registry::{ProviderRegistry, RegisteredProvider};
pub use types::{
    AttachmentMode, ImageRef, MAX_IMAGES, MIN_CONTENT_CHARS, ProviderCapabilities,
    SummaryRequest, SummaryType,
};
