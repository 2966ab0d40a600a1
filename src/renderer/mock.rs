//! Scripted in-memory renderer for tests.

use super::{ContextHandle, Renderer, WaitCondition};
use anyhow::{bail, Result};
use async_trait::async_trait;
use scraper::Html;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

const BLANK: &str = "<html><head></head><body></body></html>";

/// Serves canned markup per URL and records every call.
#[derive(Default)]
pub struct MockRenderer {
    pages: HashMap<String, String>,
    revealed: HashMap<String, String>,
    failing_navigation: HashSet<String>,
    failing_wait: HashSet<String>,
    failing_markup: HashSet<String>,
    fail_open_context: bool,
    contexts: Vec<Option<String>>,
    active: usize,
    calls: Vec<String>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self { contexts: vec![Some(String::new())], ..Default::default() }
    }

    /// Serves `html` at `url`.
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Replaces the markup at `url` once a script has run there.
    pub fn revealing(mut self, url: &str, html: &str) -> Self {
        self.revealed.insert(url.to_string(), html.to_string());
        self
    }

    pub fn failing_navigation(mut self, url: &str) -> Self {
        self.failing_navigation.insert(url.to_string());
        self
    }

    pub fn failing_wait(mut self, url: &str) -> Self {
        self.failing_wait.insert(url.to_string());
        self
    }

    pub fn failing_markup(mut self, url: &str) -> Self {
        self.failing_markup.insert(url.to_string());
        self
    }

    pub fn failing_open_context(mut self) -> Self {
        self.fail_open_context = true;
        self
    }

    /// Every call made so far, e.g. `"navigate https://..."`.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// URLs navigated to, in order.
    pub fn navigations(&self) -> Vec<&str> {
        self.calls.iter().filter_map(|c| c.strip_prefix("navigate ")).collect()
    }

    /// Number of contexts still open.
    pub fn open_contexts(&self) -> usize {
        self.contexts.iter().filter(|c| c.is_some()).count()
    }

    fn current_url(&self) -> Result<&str> {
        match self.contexts.get(self.active) {
            Some(Some(url)) => Ok(url.as_str()),
            _ => bail!("active context is closed"),
        }
    }

    fn current_markup(&self) -> Result<String> {
        let url = self.current_url()?;
        Ok(self.pages.get(url).cloned().unwrap_or_else(|| BLANK.to_string()))
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.calls.push(format!("navigate {}", url));
        if self.failing_navigation.contains(url) {
            bail!("net::ERR_TIMED_OUT at {}", url);
        }
        match self.contexts.get_mut(self.active) {
            Some(Some(current)) => *current = url.to_string(),
            _ => bail!("active context is closed"),
        }
        Ok(())
    }

    async fn wait_for(&mut self, condition: &WaitCondition, _timeout: Duration) -> Result<bool> {
        self.calls.push(format!("wait {}", condition));
        if self.failing_wait.contains(self.current_url()?) {
            bail!("session lost");
        }
        let markup = self.current_markup()?;
        Ok(condition.is_satisfied(&Html::parse_document(&markup)))
    }

    async fn rendered_markup(&mut self) -> Result<String> {
        self.calls.push("markup".to_string());
        if self.failing_markup.contains(self.current_url()?) {
            bail!("target closed");
        }
        self.current_markup()
    }

    async fn run_script(&mut self, _script: &str) -> Result<()> {
        self.calls.push("script".to_string());
        let url = self.current_url()?.to_string();
        if let Some(html) = self.revealed.remove(&url) {
            self.pages.insert(url, html);
        }
        Ok(())
    }

    async fn open_secondary_context(&mut self) -> Result<ContextHandle> {
        self.calls.push("open".to_string());
        if self.fail_open_context {
            bail!("cannot open tab");
        }
        self.contexts.push(Some(String::new()));
        self.active = self.contexts.len() - 1;
        Ok(ContextHandle(self.active))
    }

    async fn switch_context(&mut self, handle: ContextHandle) -> Result<()> {
        self.calls.push(format!("switch {}", handle));
        match self.contexts.get(handle.0) {
            Some(Some(_)) => {
                self.active = handle.0;
                Ok(())
            }
            _ => bail!("no such context: {}", handle),
        }
    }

    async fn close_context(&mut self, handle: ContextHandle) -> Result<()> {
        self.calls.push(format!("close {}", handle));
        match self.contexts.get_mut(handle.0) {
            Some(slot) if slot.is_some() => *slot = None,
            _ => bail!("no such context: {}", handle),
        }
        if self.active == handle.0 {
            self.active = 0;
        }
        Ok(())
    }

    fn active_context(&self) -> ContextHandle {
        ContextHandle(self.active)
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.calls.push("shutdown".to_string());
        self.contexts.iter_mut().for_each(|c| *c = None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_navigate_and_markup() {
        let mut renderer = MockRenderer::new().page("https://a/", "<h1>A</h1>");

        assert_ok!(renderer.navigate("https://a/").await);
        let markup = renderer.rendered_markup().await.unwrap();
        assert!(markup.contains("<h1>A</h1>"));
        assert_eq!(renderer.navigations(), vec!["https://a/"]);
    }

    #[tokio::test]
    async fn test_failing_navigation() {
        let mut renderer = MockRenderer::new().failing_navigation("https://bad/");
        assert_err!(renderer.navigate("https://bad/").await);
    }

    #[tokio::test]
    async fn test_context_lifecycle() {
        let mut renderer = MockRenderer::new();
        let primary = renderer.active_context();

        let secondary = renderer.open_secondary_context().await.unwrap();
        assert_ne!(primary, secondary);
        assert_eq!(renderer.active_context(), secondary);
        assert_eq!(renderer.open_contexts(), 2);

        assert_ok!(renderer.switch_context(primary).await);
        assert_ok!(renderer.close_context(secondary).await);
        assert_eq!(renderer.open_contexts(), 1);
        assert_err!(renderer.switch_context(secondary).await);
    }

    #[tokio::test]
    async fn test_reveal_on_script() {
        let mut renderer =
            MockRenderer::new().page("https://s/", "<p>before</p>").revealing("https://s/", "<p>after</p>");

        renderer.navigate("https://s/").await.unwrap();
        renderer.run_script("scroll()").await.unwrap();
        assert!(renderer.rendered_markup().await.unwrap().contains("after"));
    }
}
