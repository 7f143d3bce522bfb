use crate::actions::{js_string, BrowserActions};
use crate::error::{BrowserError, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::page::Page;
use docket_core::BrowserConfig;
use futures_util::stream::StreamExt;
use tokio::task::JoinHandle;

/// Browser automation engine
///
/// Owns one Chromium process and one page. A run launches exactly one engine
/// and must hand it back to [`BrowserEngine::close`] on every exit path.
pub struct BrowserEngine {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserEngine {
    /// Launch Chromium with the given settings and open a blank page.
    pub async fn launch(settings: &BrowserConfig) -> Result<Self> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(settings.window_width, settings.window_height)
            .arg("--disable-dev-shm-usage");
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::ChromiumError)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        // Spawn browser handler
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler stopped: {}", e);
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()))?;

        tracing::info!(headless = settings.headless, "browser session started");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Close the browser and wait for the process to exit.
    pub async fn close(self) -> Result<()> {
        let mut browser = self.browser;
        let closed = browser
            .close()
            .await
            .map_err(|e| BrowserError::ChromiumError(e.to_string()));
        if closed.is_ok() {
            let _ = browser.wait().await;
        }
        self.handler.abort();
        tracing::info!("browser session closed");
        closed.map(|_| ())
    }
}

fn chromium(e: chromiumoxide::error::CdpError) -> BrowserError {
    BrowserError::ChromiumError(e.to_string())
}

#[async_trait::async_trait]
impl BrowserActions for BrowserEngine {
    async fn navigate(&self, url: &str) -> Result<()> {
        tracing::debug!("navigating to {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationError(format!("{url}: {e}")))?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.page.content().await.map_err(chromium)
    }

    async fn url(&self) -> Result<Option<String>> {
        self.page.url().await.map_err(chromium)
    }

    async fn fill_field(&self, selector: &str, value: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::SelectorNotFound(format!("{selector}: {e}")))?;

        self.evaluate(&format!(
            "(() => {{ const el = document.querySelector({}); if (el) {{ el.value = ''; }} }})()",
            js_string(selector)
        ))
        .await?;

        element.click().await.map_err(chromium)?;
        element.type_str(value).await.map_err(chromium)?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::SelectorNotFound(format!("{selector}: {e}")))?;
        element.click().await.map_err(chromium)?;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptError(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }
}
