//! Bridges a live session to the audit engine and persists report artifacts.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::audit::lhr::LighthouseResult;
use crate::audit::{AuditEngine, CookieParam};
use crate::error::{HarnessError, Result};
use crate::session::Session;

pub struct AuditRunner {
    engine: Arc<dyn AuditEngine>,
    results_root: PathBuf,
}

impl AuditRunner {
    pub fn new(engine: Arc<dyn AuditEngine>, results_root: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            results_root: results_root.into(),
        }
    }

    /// Audits the session's current page state.
    ///
    /// The target URL and remote-debug port default to the session's own;
    /// `journey` names the report directory under the results root. Cookies
    /// are captured from the session before the engine is invoked, so the
    /// engine replays the session's authenticated/cart state rather than
    /// whatever its own connection observes afterwards.
    pub async fn run(
        &self,
        session: &Session,
        journey: &str,
        explicit_url: Option<Url>,
        explicit_port: Option<u16>,
    ) -> Result<LighthouseResult> {
        let target = match explicit_url {
            Some(url) => url,
            None => session.current_url().await?,
        };
        let port = explicit_port.unwrap_or_else(|| session.debug_port());
        let cookies: Vec<CookieParam> = session
            .cookies()
            .await?
            .iter()
            .map(CookieParam::from)
            .collect();
        self.audit_url(journey, &target, port, &cookies).await
    }

    /// Audits an explicit URL with pre-captured cookies.
    pub async fn audit_url(
        &self,
        journey: &str,
        target: &Url,
        port: u16,
        cookies: &[CookieParam],
    ) -> Result<LighthouseResult> {
        info!(%target, port, journey, cookie_count = cookies.len(), "running audit");
        let run = self.engine.run(target, port, cookies).await?;
        let path = self
            .persist_report(journey, &run.lhr.fetch_time, &run.report_html)
            .await?;
        debug!(path = %path.display(), "audit report persisted");
        Ok(run.lhr)
    }

    /// Writes the HTML report to `<results_root>/<journey>/<fetch_time>.html`.
    /// Directory creation is idempotent; the engine's fetch time keeps
    /// filenames unique across audits within a journey.
    async fn persist_report(
        &self,
        journey: &str,
        fetch_time: &str,
        report_html: &str,
    ) -> Result<PathBuf> {
        let dir = self.results_root.join(journey);
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| HarnessError::Report {
                path: dir.clone(),
                source,
            })?;
        let path = dir.join(format!("{fetch_time}.html"));
        fs::write(&path, report_html)
            .await
            .map_err(|source| HarnessError::Report {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
