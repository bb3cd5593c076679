//! shotkit
//!
//! A website screenshot service: drives headless Chrome through a fixed
//! capture pipeline (viewport, navigation, consent/animation stabilization,
//! section targeting) and composites a simulated browser bar on top of the
//! raw capture.
//!
//! # Features
//!
//! - **Single captures**: one `(url, viewport, section)` tuple in, PNG bytes out
//! - **Batch runs**: viewports x pages x sections sweep for a named client,
//!   plus an optional authenticated WordPress admin capture
//! - **HTTP surface**: axum server exposing both paths and the output files
//!
//! # Example
//!
//! ```no_run
//! use shotkit::{capture, CaptureRequest, Section, Viewport};
//!
//! # fn main() -> shotkit::Result<()> {
//! let request = CaptureRequest {
//!     url: "example.com".to_string(),
//!     viewport: Viewport { width: 1280, height: 720 },
//!     section: Section::Footer,
//!     ..CaptureRequest::default()
//! };
//!
//! let png = capture::capture_once(&request)?;
//! std::fs::write("footer.png", png)?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod session;
pub use session::{BrowserSession, SessionConfig};

pub mod locator;
pub mod stabilize;

pub mod overlay;
pub use overlay::{BrowserBar, BAR_HEIGHT};

pub mod compose;

pub mod capture;
pub mod batch;
pub mod wordpress;

pub mod server;

/// Viewport width below which a capture is treated as mobile
pub const MOBILE_MAX_WIDTH: u32 = 500;

/// Viewport width below which a capture is treated as tablet
pub const TABLET_MAX_WIDTH: u32 = 1280;

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Layout bucket derived from viewport width
///
/// Controls which elements of the simulated browser bar are drawn: the tab
/// strip and navigation glyphs are suppressed on mobile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Mobile,
    Tablet,
    Desktop,
}

impl ViewportClass {
    pub fn from_width(width: u32) -> Self {
        if width < MOBILE_MAX_WIDTH {
            ViewportClass::Mobile
        } else if width < TABLET_MAX_WIDTH {
            ViewportClass::Tablet
        } else {
            ViewportClass::Desktop
        }
    }
}

/// Named vertical region of a page targeted for capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Header,
    Content,
    Footer,
}

impl Section {
    /// Fractional position of the section within the scrollable height
    pub fn fraction(self) -> f64 {
        match self {
            Section::Header => 0.0,
            Section::Content => 0.4,
            Section::Footer => 1.0,
        }
    }

    /// Parse a section name; unrecognized names fall back to `Header`
    pub fn from_name(name: &str) -> Self {
        match name {
            "content" => Section::Content,
            "footer" => Section::Footer,
            _ => Section::Header,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Section::Header => "header",
            Section::Content => "content",
            Section::Footer => "footer",
        }
    }
}

/// Input descriptor for one capture
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// Target URL; normalized to `https://` when schemeless
    pub url: String,
    /// Capture viewport
    pub viewport: Viewport,
    /// Device scale factor applied to the capture
    pub device_scale_factor: f64,
    /// Section to scroll to; ignored when `full_page` is set
    pub section: Section,
    /// Capture the entire scrollable extent instead of one viewport
    pub full_page: bool,
    /// Composite the simulated browser bar above the capture
    pub browser_bar: bool,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            url: "https://example.com".to_string(),
            viewport: Viewport::default(),
            device_scale_factor: 1.0,
            section: Section::Header,
            full_page: false,
            browser_bar: true,
        }
    }
}

/// Normalize a URL to an absolute form with an explicit scheme
///
/// Schemeless input gets an `https://` prefix; anything that still does not
/// parse as a URL is rejected.
pub fn normalize_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::InvalidRequest("empty url".to_string()));
    }

    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    url::Url::parse(&candidate)
        .map_err(|e| Error::InvalidRequest(format!("invalid url {raw:?}: {e}")))?;

    Ok(candidate)
}
