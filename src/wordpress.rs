//! Authenticated WordPress admin captures
//!
//! Logs into `wp-login.php`, screenshots the dashboard and the page listing,
//! then visits each logical page on the frontend and follows the admin-bar
//! "edit" affordance into its editor. The admin markup is an opaque target:
//! every step is best-effort and a failed page never aborts the rest.

use crate::batch::{CaptureRecord, PageTarget};
use crate::{batch, BrowserSession, Error, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Admin-bar link to the in-context editor of the current frontend page
const EDIT_LINK_SELECTOR: &str = "#wp-admin-bar-edit a";

/// Gutenberg, classic and site editors, whichever the install uses
const EDITOR_READY_SELECTOR: &str = ".edit-post-layout, #postdivrich, #editor";

const EDITOR_READY_TIMEOUT: Duration = Duration::from_secs(10);
const EDITOR_RENDER_SETTLE: Duration = Duration::from_secs(2);
const ADMIN_SETTLE: Duration = Duration::from_secs(1);

/// Capture the admin panel; returns whatever was successfully stored
pub fn capture_admin(
    session: &BrowserSession,
    wp_url: &str,
    wp_user: &str,
    wp_pass: &str,
    output_dir: &Path,
    targets: &[PageTarget],
    base_url: &str,
) -> Vec<CaptureRecord> {
    match capture_admin_inner(session, wp_url, wp_user, wp_pass, output_dir, targets, base_url) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "WordPress admin capture failed");
            Vec::new()
        }
    }
}

fn capture_admin_inner(
    session: &BrowserSession,
    wp_url: &str,
    wp_user: &str,
    wp_pass: &str,
    output_dir: &Path,
    targets: &[PageTarget],
    base_url: &str,
) -> Result<Vec<CaptureRecord>> {
    let wp_url = wp_url.trim_end_matches('/');
    let mut records = Vec::new();

    info!(wp_url, "logging into WordPress admin");
    session.navigate(&format!("{wp_url}/wp-login.php"))?;
    session.type_into("#user_login", wp_user)?;
    session.type_into("#user_pass", wp_pass)?;
    session.click("#wp-submit")?;
    session.wait_until_navigated()?;

    if session.current_url().contains("wp-login.php") {
        return Err(Error::Navigation("WordPress login rejected".to_string()));
    }

    // Dashboard
    std::thread::sleep(ADMIN_SETTLE);
    records.push(store_admin_shot(session, output_dir, "dashboard")?);

    // Page listing
    session.navigate(&format!("{wp_url}/wp-admin/edit.php?post_type=page"))?;
    std::thread::sleep(ADMIN_SETTLE);
    records.push(store_admin_shot(session, output_dir, "pages")?);

    // Per-page editors, each individually best-effort
    for target in targets {
        let Some(primary_path) = target.paths.first() else {
            continue;
        };
        let frontend_url = batch::join_base(base_url, primary_path);
        match capture_editor(session, &frontend_url, target.name, output_dir) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => debug!(page = target.name, "no edit affordance on frontend"),
            Err(e) => warn!(page = target.name, error = %e, "editor capture failed"),
        }
    }

    Ok(records)
}

/// Visit a frontend page while logged in and capture its editor if reachable
fn capture_editor(
    session: &BrowserSession,
    frontend_url: &str,
    page_name: &str,
    output_dir: &Path,
) -> Result<Option<CaptureRecord>> {
    session.navigate(frontend_url)?;

    if !session.has_element(EDIT_LINK_SELECTOR) {
        return Ok(None);
    }

    session.click(EDIT_LINK_SELECTOR)?;
    session.wait_until_navigated()?;

    if let Err(e) = session.wait_for(EDITOR_READY_SELECTOR, EDITOR_READY_TIMEOUT) {
        debug!(error = %e, "editor markers not found, capturing anyway");
    }
    std::thread::sleep(EDITOR_RENDER_SETTLE);

    let record = store_admin_shot(session, output_dir, &format!("editor_{page_name}"))?;
    Ok(Some(record))
}

/// Screenshot the visible viewport into `<output_dir>/wordpress/<name>.png`
fn store_admin_shot(
    session: &BrowserSession,
    output_dir: &Path,
    name: &str,
) -> Result<CaptureRecord> {
    let bytes = session.screenshot_viewport()?;

    let filepath = output_dir.join("wordpress").join(format!("{name}.png"));
    if let Some(parent) = filepath.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&filepath, bytes)?;
    info!(file = %filepath.display(), "stored admin capture");

    Ok(CaptureRecord {
        page: "wordpress".to_string(),
        section: name.to_string(),
        viewport: "desktop".to_string(),
        path: filepath.display().to_string(),
        url_local: None,
    })
}
