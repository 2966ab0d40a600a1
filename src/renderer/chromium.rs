//! Chromium-backed renderer using chromiumoxide.

use super::{poll_until, ContextHandle, Renderer, WaitCondition};
use crate::config::Config;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A headless (or headful) Chromium session with one page per context.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    pages: Vec<Option<Page>>,
    active: usize,
    navigation_timeout: Duration,
}

impl ChromiumRenderer {
    /// Launches Chromium and opens the primary context.
    pub async fn launch(config: &Config) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--lang=ru-RU");

        if let Some(path) = &config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    debug!("browser handler event error");
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open primary page")?;

        debug!("Chromium launched (headless: {})", config.headless);

        Ok(Self {
            browser,
            handler,
            pages: vec![Some(page)],
            active: 0,
            navigation_timeout: config.navigation_timeout(),
        })
    }

    fn page(&self) -> Result<&Page> {
        match self.pages.get(self.active) {
            Some(Some(page)) => Ok(page),
            _ => bail!("{} is closed", ContextHandle(self.active)),
        }
    }
}

async fn evaluate_bool(page: &Page, script: &str) -> Result<bool> {
    let result = page.evaluate(script).await.context("JS execution failed")?;
    Ok(result.into_value::<bool>().unwrap_or(false))
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let timeout = self.navigation_timeout;
        let page = self.page()?;

        match tokio::time::timeout(timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {}ms", timeout.as_millis()),
        }
    }

    async fn wait_for(&mut self, condition: &WaitCondition, timeout: Duration) -> Result<bool> {
        // Only a closed context is an error; failed polls count as "not yet".
        let page = self.page()?;
        let script = condition.to_script();
        let script = script.as_str();

        let satisfied = poll_until(timeout, move || evaluate_bool(page, script)).await;
        if !satisfied {
            debug!("wait for {} timed out", condition);
        }
        Ok(satisfied)
    }

    async fn rendered_markup(&mut self) -> Result<String> {
        let result = self
            .page()?
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to read page markup")?;

        result
            .into_value::<String>()
            .map_err(|e| anyhow!("failed to convert page markup: {e:?}"))
    }

    async fn run_script(&mut self, script: &str) -> Result<()> {
        self.page()?.evaluate(script).await.context("JS execution failed")?;
        Ok(())
    }

    async fn open_secondary_context(&mut self) -> Result<ContextHandle> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        self.pages.push(Some(page));
        self.active = self.pages.len() - 1;
        Ok(ContextHandle(self.active))
    }

    async fn switch_context(&mut self, handle: ContextHandle) -> Result<()> {
        match self.pages.get(handle.0) {
            Some(Some(page)) => {
                page.bring_to_front().await.ok();
                self.active = handle.0;
                Ok(())
            }
            _ => bail!("no such context: {}", handle),
        }
    }

    async fn close_context(&mut self, handle: ContextHandle) -> Result<()> {
        let page = self
            .pages
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or_else(|| anyhow!("no such context: {}", handle))?;

        if self.active == handle.0 {
            self.active = 0;
        }
        page.close().await.context("failed to close page")?;
        Ok(())
    }

    fn active_context(&self) -> ContextHandle {
        ContextHandle(self.active)
    }

    async fn shutdown(&mut self) -> Result<()> {
        for page in self.pages.iter_mut().filter_map(Option::take) {
            if let Err(e) = page.close().await {
                debug!("failed to close page: {e}");
            }
        }

        if let Err(e) = self.browser.close().await {
            warn!("failed to close browser: {e}");
        }
        self.browser.wait().await.ok();
        self.handler.abort();
        Ok(())
    }
}

// Reached on early returns and panics; the dropped `Browser` kills its child
// process.
impl Drop for ChromiumRenderer {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
