//! Harness configuration.
//!
//! The process environment is read exactly once, at harness start, via
//! [`HarnessConfig::from_env`]. The resulting struct is passed by reference
//! into the session manager, the audit runner, and threshold selection;
//! none of the core operations read ambient globals themselves.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Which deployment the journeys run against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TargetEnv {
    Development,
    Production,
}

/// Which named threshold set audits are asserted against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ThresholdMode {
    Default,
    Custom,
}

/// One network endpoint; absolute URLs are built as
/// `protocol + subdomain + domain + port + path`.
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub protocol: String,
    pub domain: String,
    pub port: String,
}

impl Endpoint {
    fn production() -> Self {
        Self {
            protocol: "https://".into(),
            domain: ".thinkific.com".into(),
            port: String::new(),
        }
    }

    fn development() -> Self {
        Self {
            protocol: "https://".into(),
            domain: ".thinkific-dev.com".into(),
            port: ":3000".into(),
        }
    }

    pub fn page_url(&self, subdomain: &str, path: &str) -> String {
        format!(
            "{}{}{}{}{}",
            self.protocol, subdomain, self.domain, self.port, path
        )
    }

    pub fn course_url(&self, subdomain: &str, course: &str) -> String {
        self.page_url(subdomain, &format!("/courses/{course}"))
    }
}

/// Resolved harness configuration.
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Headed browser and slow-motion pacing when set; headless and fast
    /// otherwise.
    pub debug: bool,
    pub environment: TargetEnv,
    pub thresholds: ThresholdMode,
    pub endpoint: Endpoint,
    /// Root directory for persisted HTML reports.
    pub results_root: PathBuf,
}

impl HarnessConfig {
    /// Reads `TESTENV`, `DEBUG`, and `THRESHOLDS` from the process
    /// environment. Unset or unrecognized values fall back to production,
    /// non-debug, and the default threshold set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("TESTENV").as_deref() {
            Some("development") => TargetEnv::Development,
            _ => TargetEnv::Production,
        };
        let debug = lookup("DEBUG")
            .map(|raw| matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let thresholds = match lookup("THRESHOLDS").as_deref() {
            Some("custom") => ThresholdMode::Custom,
            _ => ThresholdMode::Default,
        };
        let endpoint = match environment {
            TargetEnv::Development => Endpoint::development(),
            TargetEnv::Production => Endpoint::production(),
        };
        Self {
            debug,
            environment,
            thresholds,
            endpoint,
            results_root: PathBuf::from("results"),
        }
    }

    pub fn headless(&self) -> bool {
        !self.debug
    }

    /// Delay applied between scripted interactions.
    pub fn slow_motion(&self) -> Duration {
        if self.debug {
            Duration::from_millis(15)
        } else {
            Duration::from_millis(5)
        }
    }
}
