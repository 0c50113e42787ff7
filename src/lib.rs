//! Lightkeeper drives a headless Chromium through scripted user journeys,
//! runs a Lighthouse audit at each checkpoint against the same live browser
//! (so cookies and navigation state carry over), and asserts category scores
//! against configurable thresholds.
//!
//! The pieces compose as: journey → [`Session`] (navigate to network idle) →
//! [`AuditRunner`] (capture cookies, invoke the engine, persist the report) →
//! [`assert_score`] per category → back to the journey.

pub mod audit;
pub mod config;
pub mod error;
pub mod scoring;
pub mod session;
pub mod tenants;
pub mod thresholds;

pub use audit::{
    AuditEngine, AuditRecord, AuditRef, AuditRun, AuditRunner, CategoryResult, CookieParam,
    LighthouseCli, LighthouseResult,
};
pub use config::{Endpoint, HarnessConfig, TargetEnv, ThresholdMode};
pub use error::{HarnessError, Result};
pub use scoring::{assert_score, AssertionOutcome};
pub use session::Session;
pub use tenants::Tenants;
pub use thresholds::{Category, ThresholdSet};
