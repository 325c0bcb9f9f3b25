//! TQC Core - the translation quality core's orchestrator
//!
//! The facade crate composing the workspace:
//! - [`TranslationService::handle`] answers every request with a
//!   structured outcome, never an error
//! - Quality-gated caching with deterministic keys
//! - Cascading recovery with a guaranteed emergency backstop
//! - Rate-limited escalation of infrastructure failures
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tqc_core::prelude::*;
//!
//! let service = TranslationService::new(
//!     CoreConfig::new(),
//!     producer,
//!     quality_gate,
//!     synthesizer,
//!     Arc::new(LogTelemetry),
//!     Arc::new(LogNotifier),
//! );
//!
//! # async fn example(service: TranslationService, request: TranslationRequest) {
//! let outcome = service.handle(&request).await;
//! assert!(!outcome.text.is_empty());
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod outcome;
pub mod service;
pub mod state;

// Re-exports for convenience
pub use config::CoreConfig;
pub use outcome::TranslationOutcome;
pub use service::{TranslationService, SUSTAINED_INFRA_RULE};
pub use state::{allowed_transitions, CancelToken, RequestJourney, RequestState};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the translation core
    pub use crate::{CancelToken, CoreConfig, TranslationOutcome, TranslationService};
    pub use tqc_domain::{
        ContentType, LanguagePair, LogTelemetry, Priority, TranslationRequest,
    };
    pub use tqc_escalation::LogNotifier;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
