//! Section targeting: map a named section to a vertical scroll offset
//!
//! The offset is advisory. Page content can shift between measurement and
//! scroll on dynamic layouts, so callers must tolerate an approximate
//! section boundary.

use crate::{BrowserSession, Result, Section};
use std::time::Duration;

/// Settle delay after scrolling to the target offset
pub const SCROLL_SETTLE: Duration = Duration::from_millis(500);

/// Compute the scroll offset for a section
///
/// `total_height` is the full scrollable page height, `viewport_height` the
/// configured capture height. The result is clamped to 0 so pages shorter
/// than the viewport never yield a negative offset.
pub fn scroll_offset(section: Section, total_height: f64, viewport_height: f64) -> f64 {
    let span = total_height - viewport_height;
    (section.fraction() * span).max(0.0)
}

/// Measure the page, scroll to the section and return the applied offset
///
/// Measurement failures propagate as errors; the orchestrator downgrades
/// them to offset 0 rather than aborting the capture.
pub fn scroll_to_section(
    session: &BrowserSession,
    section: Section,
    viewport_height: u32,
) -> Result<f64> {
    let total_height = session.evaluate_f64("document.body.scrollHeight")?;
    let offset = scroll_offset(section, total_height, viewport_height as f64);

    session.evaluate(&format!(
        "window.scrollTo({{ top: {offset}, behavior: 'instant' }})"
    ))?;
    std::thread::sleep(SCROLL_SETTLE);

    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_fractions() {
        assert_eq!(scroll_offset(Section::Header, 5000.0, 1080.0), 0.0);
        assert_eq!(scroll_offset(Section::Content, 5000.0, 1080.0), 0.4 * 3920.0);
        assert_eq!(scroll_offset(Section::Footer, 5000.0, 1080.0), 3920.0);
    }

    #[test]
    fn test_offset_is_fraction_of_scrollable_span() {
        for (total, viewport) in [(2000.0, 800.0), (1081.0, 1080.0), (9999.0, 812.0)] {
            for section in [Section::Header, Section::Content, Section::Footer] {
                let offset = scroll_offset(section, total, viewport);
                assert_eq!(offset, section.fraction() * (total - viewport));
                assert!(offset >= 0.0);
            }
        }
    }

    #[test]
    fn test_short_page_clamps_to_zero() {
        // Page shorter than the viewport: span is negative, offset clamps
        assert_eq!(scroll_offset(Section::Footer, 500.0, 1080.0), 0.0);
        assert_eq!(scroll_offset(Section::Content, 500.0, 1080.0), 0.0);
        assert_eq!(scroll_offset(Section::Header, 0.0, 1080.0), 0.0);
    }
}
