//! Drive a freshly navigated page toward a state safe to screenshot
//!
//! Two sequential best-effort sub-steps: dismiss at most one cookie/consent
//! banner, then wait for in-flight animations to settle. Neither step ever
//! fails the capture; outcomes are reported so operators can tell "no banner
//! present" apart from "banner present but click failed".

use crate::BrowserSession;
use std::time::{Duration, Instant};
use tracing::debug;

/// Candidate accept-button selectors for common consent banners, probed in
/// order; the first match is clicked and the probe stops.
pub const CONSENT_SELECTORS: [&str; 10] = [
    r#"[class*="cookie"] button[class*="accept"]"#,
    r#"[class*="cookie"] button[class*="aceptar"]"#,
    r#"[id*="cookie"] button"#,
    ".cookie-consent button",
    "#cookie-banner button",
    r#"[class*="consent"] button[class*="accept"]"#,
    r#"button[id*="accept-cookies"]"#,
    ".cc-btn.cc-dismiss",
    "#onetrust-accept-btn-handler",
    "#CybotCookiebotDialog",
];

/// Settle delay after a successful banner dismissal
pub const CONSENT_SETTLE: Duration = Duration::from_millis(500);

/// Interval between animation-state polls
pub const ANIMATION_POLL: Duration = Duration::from_millis(150);

/// Bound on the animation settle poll; on timeout the capture proceeds
pub const ANIMATION_TIMEOUT: Duration = Duration::from_secs(3);

/// Outcome of the consent-dismissal sub-step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// A banner matched and its accept action was invoked
    Dismissed { selector: &'static str },
    /// No candidate selector matched anything
    NotFound,
    /// Probing itself failed (page in a bad state); capture continues
    Degraded { reason: String },
}

/// Outcome of the animation-settle sub-step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// No animations running, or all finished/idle
    Settled,
    /// Animations still running when the poll bound elapsed
    TimedOut,
    /// The page could not report animation state; capture continues
    Degraded { reason: String },
}

/// Per-capture stabilizer knobs
#[derive(Debug, Clone, Default)]
pub struct StabilizeOptions {
    /// Extra fixed wait after the animation poll (the batch path trades
    /// time for quality on media-heavy client sites)
    pub extra_settle: Option<Duration>,
}

/// What the stabilizer did, for structured logging
#[derive(Debug, Clone)]
pub struct StabilizeReport {
    pub consent: ConsentOutcome,
    pub animations: AnimationOutcome,
}

/// Run both stabilization sub-steps in order
pub fn stabilize(session: &BrowserSession, options: &StabilizeOptions) -> StabilizeReport {
    let consent = dismiss_consent_banner(session);
    debug!(outcome = ?consent, "consent dismissal");

    let animations = wait_for_animations(session, ANIMATION_TIMEOUT);
    debug!(outcome = ?animations, "animation settling");

    if let Some(extra) = options.extra_settle {
        std::thread::sleep(extra);
    }

    StabilizeReport {
        consent,
        animations,
    }
}

/// Probe the consent selector list and click the first match
pub fn dismiss_consent_banner(session: &BrowserSession) -> ConsentOutcome {
    let mut last_error = None;

    for selector in CONSENT_SELECTORS {
        // Selectors contain double quotes, so the probe embeds them single-quoted
        let probe = format!(
            "(function() {{ const el = document.querySelector('{selector}'); \
             if (!el) return false; el.click(); return true; }})()"
        );

        match session.evaluate_bool(&probe) {
            Ok(true) => {
                std::thread::sleep(CONSENT_SETTLE);
                return ConsentOutcome::Dismissed { selector };
            }
            Ok(false) => {}
            Err(e) => last_error = Some(e.to_string()),
        }
    }

    match last_error {
        Some(reason) => ConsentOutcome::Degraded { reason },
        None => ConsentOutcome::NotFound,
    }
}

/// Poll until the page reports no running animations, bounded by `timeout`
pub fn wait_for_animations(session: &BrowserSession, timeout: Duration) -> AnimationOutcome {
    const PROBE: &str = "(function() { \
        const animations = document.getAnimations(); \
        if (animations.length === 0) return true; \
        return animations.every(a => a.playState === 'finished' || a.playState === 'idle'); \
    })()";

    let deadline = Instant::now() + timeout;
    let mut last_error = None;

    loop {
        match session.evaluate_bool(PROBE) {
            Ok(true) => return AnimationOutcome::Settled,
            Ok(false) => {}
            Err(e) => last_error = Some(e.to_string()),
        }

        if Instant::now() >= deadline {
            return match last_error {
                Some(reason) => AnimationOutcome::Degraded { reason },
                None => AnimationOutcome::TimedOut,
            };
        }
        std::thread::sleep(ANIMATION_POLL);
    }
}
