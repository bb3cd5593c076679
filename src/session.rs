//! Chrome DevTools Protocol session adapter (uses the `headless_chrome` crate)
//!
//! `BrowserSession` owns one browser process and one tab. The capture
//! pipeline treats it as the source of the navigate / evaluate / screenshot /
//! click / type primitives; everything above this module is engine-agnostic.

use crate::{Error, Result, Viewport};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::types::Bounds;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

/// Settle delay after growing the window for a full-page capture
const RESIZE_SETTLE: Duration = Duration::from_millis(300);

/// Configuration for launching a browser session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Initial window size
    pub viewport: Viewport,
    /// Hard bound on navigation; a timeout fails the request
    pub nav_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            nav_timeout: Duration::from_secs(30),
        }
    }
}

/// A headless Chrome session: one browser process, one tab
///
/// The session is exclusively owned by the in-flight request (or batch run).
/// Dropping it terminates the browser process; `close` does so explicitly so
/// callers can release the resource on every exit path.
pub struct BrowserSession {
    browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launch a headless browser and open the working tab
    pub fn launch(config: &SessionConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .args(vec![
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
            ])
            .build()
            .map_err(|e| Error::Launch(format!("failed to build launch options: {e}")))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Launch(format!("failed to launch browser: {e}")))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Launch(format!("failed to create tab: {e}")))?;

        tab.set_default_timeout(config.nav_timeout);

        Ok(Self { browser, tab })
    }

    /// Resize the window to match the requested viewport
    pub fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        self.tab
            .set_bounds(Bounds::Normal {
                left: None,
                top: None,
                width: Some(viewport.width as f64),
                height: Some(viewport.height as f64),
            })
            .map_err(|e| Error::Other(format!("failed to set window bounds: {e}")))?;
        Ok(())
    }

    /// Load a URL and wait until navigation completes
    ///
    /// This is the only hard-bounded wait in the pipeline; errors here are
    /// fatal for the request.
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::Navigation(format!("{url}: {e}")))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::Navigation(format!("{url}: {e}")))?;
        Ok(())
    }

    /// Wait for an in-flight navigation triggered by a click to finish
    pub fn wait_until_navigated(&self) -> Result<()> {
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::Navigation(e.to_string()))?;
        Ok(())
    }

    /// Evaluate a JavaScript expression in the page and return its value
    pub fn evaluate(&self, expression: &str) -> Result<serde_json::Value> {
        let result = self
            .tab
            .evaluate(expression, false)
            .map_err(|e| Error::Script(e.to_string()))?;
        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Evaluate an expression expected to yield a boolean
    pub fn evaluate_bool(&self, expression: &str) -> Result<bool> {
        match self.evaluate(expression)? {
            serde_json::Value::Bool(b) => Ok(b),
            other => Err(Error::Script(format!("expected boolean, got {other}"))),
        }
    }

    /// Evaluate an expression expected to yield a number
    pub fn evaluate_f64(&self, expression: &str) -> Result<f64> {
        self.evaluate(expression)?
            .as_f64()
            .ok_or_else(|| Error::Script(format!("expected number from {expression:?}")))
    }

    /// Current URL of the tab (after redirects)
    pub fn current_url(&self) -> String {
        self.tab.get_url()
    }

    /// Screenshot of the visible viewport
    pub fn screenshot_viewport(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::Capture(e.to_string()))
    }

    /// Screenshot of an exact page-coordinate rectangle
    ///
    /// `scale` maps to the device scale factor of the output image.
    pub fn screenshot_clip(
        &self,
        x: f64,
        y: f64,
        width: u32,
        height: u32,
        scale: f64,
    ) -> Result<Vec<u8>> {
        let clip = Page::Viewport {
            x,
            y,
            width: width as f64,
            height: height as f64,
            scale,
        };
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| Error::Capture(e.to_string()))
    }

    /// Screenshot of the entire scrollable extent
    ///
    /// The screenshot helper has no capture-beyond-viewport flag, so the
    /// window is grown to the measured scroll height, captured, and restored.
    pub fn screenshot_full_page(&self, viewport: Viewport) -> Result<Vec<u8>> {
        let total_height = self.evaluate_f64(
            "Math.max(document.body.scrollHeight, document.documentElement.scrollHeight)",
        )?;
        let full_height = total_height.max(viewport.height as f64).ceil() as u32;

        self.set_viewport(Viewport {
            width: viewport.width,
            height: full_height,
        })?;
        std::thread::sleep(RESIZE_SETTLE);

        let shot = self.screenshot_viewport();

        // Restore the working viewport even if the capture failed
        let restore = self.set_viewport(viewport);
        let bytes = shot?;
        restore?;

        Ok(bytes)
    }

    /// Click an element by selector
    pub fn click(&self, selector: &str) -> Result<()> {
        self.tab
            .find_element(selector)
            .map_err(|e| Error::Script(format!("{selector}: {e}")))?
            .click()
            .map_err(|e| Error::Script(format!("click {selector}: {e}")))?;
        Ok(())
    }

    /// Type text into an element by selector
    pub fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        self.tab
            .find_element(selector)
            .map_err(|e| Error::Script(format!("{selector}: {e}")))?
            .type_into(text)
            .map_err(|e| Error::Script(format!("type into {selector}: {e}")))?;
        Ok(())
    }

    /// Whether an element currently exists (no waiting)
    pub fn has_element(&self, selector: &str) -> bool {
        self.tab.find_element(selector).is_ok()
    }

    /// Wait for an element to appear, bounded by `timeout`
    pub fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| Error::Script(format!("wait for {selector}: {e}")))?;
        Ok(())
    }

    /// Close the session and terminate the browser process
    pub fn close(self) -> Result<()> {
        // Dropping tab and browser explicitly terminates the child process
        // promptly; a leaked process would accumulate across server requests.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_config() {
        let config = SessionConfig::default();
        assert_eq!(config.nav_timeout, Duration::from_secs(30));
        assert_eq!(config.viewport.width, 1920);
    }

    #[test]
    fn test_session_launch() {
        // Requires Chrome; skip in CI like the engine smoke tests
        if std::env::var("CI").is_ok() {
            return;
        }
        let session = match BrowserSession::launch(&SessionConfig::default()) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("skipping launch test, Chrome unavailable: {e}");
                return;
            }
        };
        session.close().unwrap();
    }
}
