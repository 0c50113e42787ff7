//! Production audit engine: the `lighthouse` CLI attached to the session's
//! remote-debugging port.

use std::env;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::json;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};
use url::Url;
use which::which;

use crate::audit::lhr::LighthouseResult;
use crate::audit::{AuditEngine, AuditRun, CookieParam};
use crate::error::{HarnessError, Result};

/// Overrides the `lighthouse` binary location.
const ENGINE_ENV: &str = "LIGHTKEEPER_LIGHTHOUSE";

pub struct LighthouseCli {
    executable: PathBuf,
}

impl LighthouseCli {
    /// Locates the `lighthouse` binary: env override first, then `PATH`.
    pub fn new() -> Result<Self> {
        let executable = detect_lighthouse_executable().ok_or_else(|| {
            HarnessError::Engine(format!(
                "lighthouse binary not found; install it or set {ENGINE_ENV}"
            ))
        })?;
        Ok(Self { executable })
    }

    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Engine configuration: extends the default rule set, desktop form
    /// factor without screen emulation, storage reset disabled so
    /// cross-audit session state (e.g. a shopping cart) survives, and the
    /// captured cookies replayed into the engine's connection.
    pub(crate) fn engine_config(cookies: &[CookieParam]) -> serde_json::Value {
        json!({
            "extends": "lighthouse:default",
            "settings": {
                "formFactor": "desktop",
                "screenEmulation": { "disabled": true },
                "disableStorageReset": true,
                "extraCookies": cookies,
            }
        })
    }
}

#[async_trait]
impl AuditEngine for LighthouseCli {
    async fn run(&self, target: &Url, port: u16, cookies: &[CookieParam]) -> Result<AuditRun> {
        let engine_err = |message: String| HarnessError::Engine(message);

        let workdir = tempfile::Builder::new()
            .prefix("lightkeeper-")
            .tempdir()
            .map_err(|err| engine_err(format!("failed to create engine workdir: {err}")))?;
        let config_path = workdir.path().join("lighthouse-config.json");
        let config_payload = serde_json::to_vec_pretty(&Self::engine_config(cookies))
            .map_err(|err| engine_err(format!("failed to encode engine config: {err}")))?;
        fs::write(&config_path, config_payload)
            .await
            .map_err(|err| engine_err(format!("failed to write engine config: {err}")))?;

        let output_base = workdir.path().join("audit");
        info!(%target, port, "invoking lighthouse");
        let output = Command::new(&self.executable)
            .arg(target.as_str())
            .arg(format!("--port={port}"))
            .arg("--output=json")
            .arg("--output=html")
            .arg(format!("--output-path={}", output_base.display()))
            .arg(format!("--config-path={}", config_path.display()))
            .arg("--quiet")
            .output()
            .await
            .map_err(|err| engine_err(format!("failed to spawn lighthouse: {err}")))?;

        // Engine failures are fatal: the engine could not attach, the port is
        // unreachable, or the navigation was lost. No retry; a retry would
        // re-measure an already-warmed page.
        if !output.status.success() {
            return Err(engine_err(format!(
                "lighthouse exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let json_path = output_base.with_extension("report.json");
        let html_path = output_base.with_extension("report.html");
        let raw = fs::read(&json_path)
            .await
            .map_err(|err| engine_err(format!("missing engine json report: {err}")))?;
        let report_html = fs::read_to_string(&html_path)
            .await
            .map_err(|err| engine_err(format!("missing engine html report: {err}")))?;
        let lhr: LighthouseResult = serde_json::from_slice(&raw)?;
        debug!(fetch_time = %lhr.fetch_time, "lighthouse run complete");

        Ok(AuditRun { lhr, report_html })
    }
}

fn detect_lighthouse_executable() -> Option<PathBuf> {
    if let Ok(raw) = env::var(ENGINE_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            let candidate = PathBuf::from(trimmed);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    which("lighthouse").ok()
}
