//! Browser abstraction used by the harvester.
//!
//! A `Renderer` is one browser session with one or more contexts (tabs). All
//! operations act on the active context. The harvester keeps the search
//! results in one context and visits detail pages in another.

pub mod chromium;

#[cfg(test)]
pub(crate) mod mock;

use anyhow::Result;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub use chromium::ChromiumRenderer;

/// Interval between readiness polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Identifies a browser context (tab) within a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub usize);

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context#{}", self.0)
    }
}

/// A predicate over the rendered page used to bound a wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitCondition {
    /// At least one element matches the selector.
    Present { selector: String },
    /// Some element matching the selector has text containing `needle`.
    TextContains { selector: String, needle: String },
}

impl WaitCondition {
    pub fn present(selector: impl Into<String>) -> Self {
        WaitCondition::Present { selector: selector.into() }
    }

    pub fn text_contains(selector: impl Into<String>, needle: impl Into<String>) -> Self {
        WaitCondition::TextContains { selector: selector.into(), needle: needle.into() }
    }

    fn selector(&self) -> &str {
        match self {
            WaitCondition::Present { selector } | WaitCondition::TextContains { selector, .. } => {
                selector
            }
        }
    }

    /// Evaluates the condition against a parsed snapshot.
    ///
    /// An invalid selector never matches.
    pub fn is_satisfied(&self, document: &Html) -> bool {
        let Ok(selector) = Selector::parse(self.selector()) else {
            return false;
        };

        match self {
            WaitCondition::Present { .. } => document.select(&selector).next().is_some(),
            WaitCondition::TextContains { needle, .. } => document
                .select(&selector)
                .any(|e| e.text().collect::<String>().contains(needle.as_str())),
        }
    }

    /// Renders the condition as a JS expression evaluating to a boolean.
    pub fn to_script(&self) -> String {
        let selector = js_string(self.selector());
        match self {
            WaitCondition::Present { .. } => {
                format!("document.querySelector({}) !== null", selector)
            }
            WaitCondition::TextContains { needle, .. } => format!(
                "Array.from(document.querySelectorAll({})).some(e => (e.textContent || '').includes({}))",
                selector,
                js_string(needle)
            ),
        }
    }
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::Present { selector } => write!(f, "present({})", selector),
            WaitCondition::TextContains { selector, needle } => {
                write!(f, "text({} ~ {:?})", selector, needle)
            }
        }
    }
}

/// Runs `check` every `POLL_INTERVAL` until it returns true or `timeout`
/// elapses.
///
/// A failed or hanging check counts as "not yet". Each check is bounded by the
/// time left, but always gets at least one poll interval.
pub(crate) async fn poll_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        let bound = deadline.saturating_duration_since(Instant::now()).max(POLL_INTERVAL);
        match tokio::time::timeout(bound, check()).await {
            Ok(Ok(true)) => return true,
            Ok(Ok(false)) => {}
            Ok(Err(e)) => debug!("readiness check failed: {:#}", e),
            Err(_) => debug!("readiness check did not answer within {}ms", bound.as_millis()),
        }

        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

/// Quotes a string as a JS literal.
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// A browser session that renders pages, including client-side content.
#[async_trait]
pub trait Renderer: Send {
    /// Navigates the active context to a URL.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Waits until the condition holds or the timeout elapses.
    ///
    /// Returns `Ok(false)` on timeout; errors are reserved for a broken
    /// session.
    async fn wait_for(&mut self, condition: &WaitCondition, timeout: Duration) -> Result<bool>;

    /// Returns the current DOM of the active context as markup.
    async fn rendered_markup(&mut self) -> Result<String>;

    /// Runs a script in the active context, ignoring its value.
    async fn run_script(&mut self, script: &str) -> Result<()>;

    /// Opens a new context and makes it active.
    async fn open_secondary_context(&mut self) -> Result<ContextHandle>;

    /// Makes an existing context active.
    async fn switch_context(&mut self, handle: ContextHandle) -> Result<()>;

    /// Closes a context. Closing the active one activates the primary context.
    async fn close_context(&mut self, handle: ContextHandle) -> Result<()>;

    /// The currently active context.
    fn active_context(&self) -> ContextHandle;

    /// Closes every context and the browser.
    async fn shutdown(&mut self) -> Result<()>;
}
