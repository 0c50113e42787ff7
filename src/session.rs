//! Browser session lifecycle: one Chromium process plus one page.
//!
//! The session is the unit of state shared between navigation and auditing.
//! Only session operations mutate browser state; the audit runner reads it
//! through cookie capture and the engine's own debug-port connection.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    Cookie, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};
use url::Url;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(45);
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);
const QUIET_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Inflight-request counter fed by CDP network events.
#[derive(Debug)]
struct NetworkActivity {
    inflight: u64,
    last_activity: Instant,
}

impl NetworkActivity {
    fn new() -> Self {
        Self {
            inflight: 0,
            last_activity: Instant::now(),
        }
    }

    fn request_started(&mut self) {
        self.inflight += 1;
        self.last_activity = Instant::now();
    }

    fn request_settled(&mut self) {
        if self.inflight > 0 {
            self.inflight -= 1;
        }
        self.last_activity = Instant::now();
    }

    /// Marks activity without changing the inflight count, so quiet windows
    /// are measured from this point onward.
    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn quiet_for(&self, window: Duration) -> bool {
        self.inflight == 0 && self.last_activity.elapsed() >= window
    }
}

/// One live browser + page pair.
pub struct Session {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    taps: Vec<JoinHandle<()>>,
    activity: Arc<Mutex<NetworkActivity>>,
    debug_port: u16,
    slow_motion: Duration,
}

impl Session {
    /// Launches a Chromium process and opens one page.
    ///
    /// A requested `remote_debug_port` is handed to Chromium so the audit
    /// engine can attach to a known port later; the effective port is always
    /// parsed back from the browser's devtools websocket endpoint.
    pub async fn launch(config: &HarnessConfig, remote_debug_port: Option<u16>) -> Result<Self> {
        let mut builder = BrowserConfig::builder().viewport(None);
        if config.debug {
            builder = builder.with_head();
        }
        if let Some(port) = remote_debug_port {
            builder = builder.arg(format!("--remote-debugging-port={port}"));
        }
        let browser_config = builder.build().map_err(HarnessError::Launch)?;

        let (browser, mut events) = Browser::launch(browser_config)
            .await
            .map_err(|err| HarnessError::Launch(err.to_string()))?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(err) = event {
                    debug!(error = %err, "browser handler stopped delivering events");
                    break;
                }
            }
        });

        let debug_port = parse_debug_port(browser.websocket_address())?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| HarnessError::Launch(err.to_string()))?;

        let activity = Arc::new(Mutex::new(NetworkActivity::new()));
        let taps = spawn_network_taps(&page, Arc::clone(&activity)).await?;

        info!(
            debug_port,
            headless = config.headless(),
            "browser session started"
        );
        Ok(Self {
            browser,
            page,
            handler,
            taps,
            activity,
            debug_port,
            slow_motion: config.slow_motion(),
        })
    }

    /// Navigates and waits for network idle as one logical operation: the
    /// caller never observes a session that has started navigating but not
    /// yet reached idle.
    ///
    /// `target` may be absolute or relative to the current URL. A navigation
    /// that never reaches idle is fatal and not retried.
    pub async fn navigate(&self, target: &str) -> Result<()> {
        let url = self.resolve_target(target).await?;
        debug!(%url, "navigating");
        self.activity.lock().touch();
        self.page
            .goto(url.as_str())
            .await
            .map_err(|err| HarnessError::Session(format!("navigation to {url} failed: {err}")))?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(|err| HarnessError::Session(format!("navigation to {url} failed: {err}")))?;
        self.wait_for_network_idle(&url, NAVIGATION_TIMEOUT).await
    }

    async fn wait_for_network_idle(&self, url: &Url, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.activity.lock().quiet_for(NETWORK_QUIET_WINDOW) {
                debug!(%url, "network idle reached");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(HarnessError::NavigationTimeout {
                    url: url.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            sleep(QUIET_POLL_INTERVAL).await;
        }
    }

    async fn resolve_target(&self, target: &str) -> Result<Url> {
        match Url::parse(target) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let base = self.current_url().await?;
                base.join(target)
                    .map_err(|_| HarnessError::InvalidTarget(target.to_string()))
            }
            Err(_) => Err(HarnessError::InvalidTarget(target.to_string())),
        }
    }

    /// The page's URL after the most recent navigation.
    pub async fn current_url(&self) -> Result<Url> {
        let raw = self
            .page
            .url()
            .await
            .map_err(|err| HarnessError::Session(err.to_string()))?
            .ok_or_else(|| HarnessError::Session("page has no url".into()))?;
        Url::parse(&raw).map_err(|_| HarnessError::InvalidTarget(raw))
    }

    /// Snapshot of the page's cookie jar.
    pub async fn cookies(&self) -> Result<Vec<Cookie>> {
        self.page
            .get_cookies()
            .await
            .map_err(|err| HarnessError::Session(err.to_string()))
    }

    /// Direct access to the page for scripted interactions (form filling,
    /// clicks) between audits.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// The remote-debugging port the audit engine attaches to.
    pub fn debug_port(&self) -> u16 {
        self.debug_port
    }

    /// Slow-motion pacing between scripted interactions in debug mode.
    pub async fn pace(&self) {
        sleep(self.slow_motion).await;
    }

    /// Closes the browser and severs the devtools connection. Consuming
    /// `self` makes close at-most-once per session.
    pub async fn close(mut self) -> Result<()> {
        for tap in &self.taps {
            tap.abort();
        }
        self.browser
            .close()
            .await
            .map_err(|err| HarnessError::Session(format!("browser close failed: {err}")))?;
        let _ = self.browser.wait().await;
        self.handler.abort();
        info!(debug_port = self.debug_port, "browser session closed");
        Ok(())
    }
}

/// Subscribes to the CDP network events that drive the quiet-window gate.
async fn spawn_network_taps(
    page: &Page,
    activity: Arc<Mutex<NetworkActivity>>,
) -> Result<Vec<JoinHandle<()>>> {
    let tap_err = |err: chromiumoxide::error::CdpError| HarnessError::Session(err.to_string());

    let mut started = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(tap_err)?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(tap_err)?;
    let mut failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(tap_err)?;

    let on_start = Arc::clone(&activity);
    let on_finish = Arc::clone(&activity);
    let on_fail = activity;
    Ok(vec![
        tokio::spawn(async move {
            while started.next().await.is_some() {
                on_start.lock().request_started();
            }
        }),
        tokio::spawn(async move {
            while finished.next().await.is_some() {
                on_finish.lock().request_settled();
            }
        }),
        tokio::spawn(async move {
            while failed.next().await.is_some() {
                on_fail.lock().request_settled();
            }
        }),
    ])
}

fn parse_debug_port(ws_endpoint: &str) -> Result<u16> {
    let url = Url::parse(ws_endpoint).map_err(|_| {
        HarnessError::Launch(format!("invalid devtools endpoint `{ws_endpoint}`"))
    })?;
    url.port().ok_or_else(|| {
        HarnessError::Launch(format!("devtools endpoint `{ws_endpoint}` carries no port"))
    })
}
