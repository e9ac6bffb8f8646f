use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use std::time::Duration;

use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::app::{Result, ScrapeError};
use crate::scraper::config::ScraperConfig;
use crate::scraper::script;
use crate::scraper::{ClickMode, Driver, FeeRow, FeeSelectors};

fn cdp(context: &'static str) -> impl FnOnce(CdpError) -> ScrapeError {
    move |e| ScrapeError::Browser(format!("{}: {}", context, e))
}

/// A CDP request timeout during `goto` is the page deadline expiring
fn navigation_error(url: &str, after: Duration, e: CdpError) -> ScrapeError {
    match e {
        CdpError::Timeout => ScrapeError::NavigationTimeout {
            what: url.to_string(),
            after,
        },
        other => ScrapeError::Browser(format!("Navigation failed: {}", other)),
    }
}

/// Chrome-backed driver using chromiumoxide, owning a single tab
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    request_timeout: Duration,
}

impl ChromeDriver {
    /// Launch Chrome and open one blank tab
    pub async fn launch(config: &ScraperConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .request_timeout(config.page_timeout());

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScrapeError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            ScrapeError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    trace!("Browser handler error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(cdp("Failed to create page"))?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(cdp("Failed to set user agent"))?;
        }

        debug!(headless = config.headless, "Browser launched");
        Ok(Self {
            browser,
            page,
            handler,
            request_timeout: config.page_timeout(),
        })
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        self.page
            .evaluate(script)
            .await
            .map_err(cdp("Script execution failed"))?
            .into_value()
            .map_err(|e| ScrapeError::Browser(format!("Failed to parse result: {:?}", e)))
    }

    async fn call_on<T: DeserializeOwned>(&self, element: &Element, function: &str) -> Result<T> {
        let returns = element
            .call_js_fn(function, false)
            .await
            .map_err(cdp("Element function failed"))?;
        let value = returns.result.value.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(value)
            .map_err(|e| ScrapeError::Browser(format!("Failed to parse result: {}", e)))
    }

    async fn find(&self, selector: &str) -> Result<Element> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::ElementNotFound(format!("{}: {}", selector, e)))
    }

    async fn find_in(&self, node: &Element, selector: &str) -> Result<Element> {
        node.find_element(selector)
            .await
            .map_err(|e| ScrapeError::ElementNotFound(format!("{}: {}", selector, e)))
    }
}

#[async_trait]
impl Driver for ChromeDriver {
    type Node = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| navigation_error(url, self.request_timeout, e))?;
        Ok(())
    }

    async fn ready_state(&self) -> Result<String> {
        self.eval(script::READY_STATE.to_string()).await
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        self.eval(script::exists(selector)).await
    }

    async fn text(&self, selector: &str) -> Result<Option<String>> {
        self.eval(script::text(selector)).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.find(selector).await?;
        element.click().await.map_err(cdp("Click failed"))?;
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self.find(selector).await?;
        self.call_on::<bool>(&element, script::CLEAR_VALUE_FN).await?;
        element.click().await.map_err(cdp("Could not focus input"))?;
        element.type_str(value).await.map_err(cdp("Typing failed"))?;
        Ok(())
    }

    async fn input_value(&self, selector: &str) -> Result<Option<String>> {
        self.eval(script::input_value(selector)).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Element>> {
        self.page
            .find_elements(selector)
            .await
            .map_err(cdp("Element lookup failed"))
    }

    async fn texts_within(&self, node: &Element, selector: &str) -> Result<Vec<String>> {
        let elements = node
            .find_elements(selector)
            .await
            .map_err(cdp("Element lookup failed"))?;

        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(text) = element.inner_text().await.map_err(cdp("Reading text failed"))? {
                texts.push(text);
            }
        }
        Ok(texts)
    }

    async fn exists_within(&self, node: &Element, selector: &str) -> Result<bool> {
        let elements = node
            .find_elements(selector)
            .await
            .map_err(cdp("Element lookup failed"))?;
        Ok(!elements.is_empty())
    }

    async fn scroll_into_view(&self, node: &Element, selector: &str) -> Result<()> {
        let element = self.find_in(node, selector).await?;
        element
            .scroll_into_view()
            .await
            .map_err(cdp("Scrolling failed"))?;
        Ok(())
    }

    async fn click_within(&self, node: &Element, selector: &str, mode: ClickMode) -> Result<()> {
        let element = self.find_in(node, selector).await?;

        match mode {
            ClickMode::Interactive => {
                let reachable: bool = self.call_on(&element, script::HIT_TEST_FN).await?;
                if !reachable {
                    return Err(ScrapeError::ClickIntercepted(selector.to_string()));
                }
                element.click().await.map_err(cdp("Click failed"))?;
            }
            ClickMode::Forced => {
                self.call_on::<bool>(&element, script::FORCED_CLICK_FN).await?;
            }
        }
        Ok(())
    }

    async fn fee_rows(&self, selectors: &FeeSelectors) -> Result<Vec<FeeRow>> {
        self.eval(script::fee_rows(selectors)).await
    }

    async fn go_back(&self) -> Result<()> {
        self.eval::<bool>(script::HISTORY_BACK.to_string()).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(cdp("Failed to close browser"))?;
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}
