//! Audit orchestration: the engine boundary, the result model, and the
//! runner that bridges a live browser session to the out-of-process engine.

pub mod lhr;
pub mod lighthouse;
pub mod runner;

pub use lhr::{AuditRecord, AuditRef, CategoryResult, LighthouseResult};
pub use lighthouse::LighthouseCli;
pub use runner::AuditRunner;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::Cookie;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// A cookie replayed into the audit engine's own browser connection, so the
/// engine observes the session's authenticated/cart state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CookieParam {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<&Cookie> for CookieParam {
    fn from(cookie: &Cookie) -> Self {
        Self {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: Some(cookie.domain.clone()),
            path: Some(cookie.path.clone()),
        }
    }
}

/// Everything the engine hands back for one audit invocation.
#[derive(Clone, Debug)]
pub struct AuditRun {
    pub lhr: LighthouseResult,
    pub report_html: String,
}

/// The external audit engine as an opaque capability.
///
/// The core depends only on this trait; tests substitute an in-memory
/// implementation so the assertion engine is exercised without a browser.
#[async_trait]
pub trait AuditEngine: Send + Sync {
    /// Audits `target` by attaching to the browser at `port`, replaying
    /// `cookies` into its own connection.
    async fn run(&self, target: &Url, port: u16, cookies: &[CookieParam]) -> Result<AuditRun>;
}
