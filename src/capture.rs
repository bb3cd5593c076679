//! Capture orchestration: the fixed per-request pipeline
//!
//! Order per request: viewport, navigate, stabilize, locate section,
//! capture, composite. Navigation is the only fatal step; section targeting
//! and compositing degrade to safe fallbacks.

use crate::stabilize::{self, StabilizeOptions};
use crate::{locator, BrowserSession, BrowserBar, CaptureRequest, Result, Section, SessionConfig};
use crate::{compose, normalize_url};
use tracing::{debug, info, warn};

/// Run one capture against a borrowed session
///
/// The session stays open afterwards; the batch runner reuses it across the
/// whole cross-product.
pub fn capture(session: &BrowserSession, request: &CaptureRequest) -> Result<Vec<u8>> {
    capture_with(session, request, &StabilizeOptions::default())
}

/// Run one capture with explicit stabilizer knobs
pub fn capture_with(
    session: &BrowserSession,
    request: &CaptureRequest,
    stabilize_options: &StabilizeOptions,
) -> Result<Vec<u8>> {
    let url = normalize_url(&request.url)?;

    if let Err(e) = session.set_viewport(request.viewport) {
        // The launch window already matches in the single-request path
        warn!(error = %e, "viewport resize failed, capturing at current bounds");
    }

    info!(url = %url, section = request.section.name(), full_page = request.full_page, "navigating");
    session.navigate(&url)?;

    let report = stabilize::stabilize(session, stabilize_options);
    debug!(consent = ?report.consent, animations = ?report.animations, "page stabilized");

    // Header is offset 0 by definition; skipping the scroll is a pure optimization
    let offset = if !request.full_page && request.section != Section::Header {
        match locator::scroll_to_section(session, request.section, request.viewport.height) {
            Ok(offset) => offset,
            Err(e) => {
                warn!(error = %e, "section targeting failed, capturing from the top");
                0.0
            }
        }
    } else {
        0.0
    };

    let raw = if request.full_page {
        session.screenshot_full_page(request.viewport)?
    } else {
        session.screenshot_clip(
            0.0,
            offset,
            request.viewport.width,
            request.viewport.height,
            request.device_scale_factor,
        )?
    };

    if request.browser_bar && !request.full_page {
        let bar = BrowserBar::new(&url, request.viewport.width);
        return Ok(compose::composite_or_original(raw, &bar.to_svg()));
    }

    Ok(raw)
}

/// Launch a session, run one capture, and tear the session down
///
/// The browser is released on every exit path, success or failure, so
/// repeated invocations in a long-lived server never leak processes.
pub fn capture_once(request: &CaptureRequest) -> Result<Vec<u8>> {
    let session = BrowserSession::launch(&SessionConfig {
        viewport: request.viewport,
        ..SessionConfig::default()
    })?;

    let result = capture(&session, request);

    if let Err(e) = session.close() {
        warn!(error = %e, "browser session close failed");
    }

    result
}
