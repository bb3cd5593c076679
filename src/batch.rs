//! Batch runs: viewports x logical pages x sections for a named client
//!
//! One browser session and one tab serve the whole cross-product, strictly
//! sequentially. Individual failures become entries in the error list; the
//! run always completes the remaining combinations.

use crate::stabilize::StabilizeOptions;
use crate::{capture, wordpress, BrowserSession, CaptureRequest, Result, Section, SessionConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Named viewport profile used by the batch sweep
#[derive(Debug, Clone, Copy)]
pub struct ViewportProfile {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

impl ViewportProfile {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }
}

/// Fixed profile set, iterated in declaration order
pub const VIEWPORT_PROFILES: [ViewportProfile; 3] = [
    ViewportProfile { name: "desktop", width: 1920, height: 1080 },
    ViewportProfile { name: "tablet", width: 768, height: 1024 },
    ViewportProfile { name: "mobile", width: 375, height: 812 },
];

/// A logical page with its candidate URL paths, tried in order
#[derive(Debug, Clone, Copy)]
pub struct PageTarget {
    pub name: &'static str,
    pub paths: &'static [&'static str],
}

/// Fixed logical page set for client sweeps
pub const PAGE_TARGETS: [PageTarget; 3] = [
    PageTarget { name: "home", paths: &["/", ""] },
    PageTarget { name: "services", paths: &["/services", "/servicios", "/our-services"] },
    PageTarget { name: "contact", paths: &["/contact", "/contacto", "/contact-us"] },
];

/// Extra settle the batch path grants media-heavy client sites
const BATCH_EXTRA_SETTLE: Duration = Duration::from_secs(2);

/// Batch run parameters (the `/capturar` request body)
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub url_base: String,
    pub cliente_nombre: String,
    #[serde(default)]
    pub wp_url: Option<String>,
    #[serde(default)]
    pub wp_user: Option<String>,
    #[serde(default)]
    pub wp_pass: Option<String>,
    #[serde(default = "default_true")]
    pub include_browser_bar: bool,
}

fn default_true() -> bool {
    true
}

/// One stored capture
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRecord {
    pub page: String,
    pub section: String,
    pub viewport: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_local: Option<String>,
}

/// One (page, viewport) combination whose every URL candidate failed
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub page: String,
    pub viewport: String,
    pub error: String,
}

/// Final report of a batch run (the `/capturar` response body)
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub success: bool,
    pub archivos: Vec<CaptureRecord>,
    pub errores: Vec<BatchFailure>,
    pub tiempo_total: f64,
    pub output_dir: String,
}

/// Run the full sweep for one client
///
/// Files land under `<output_root>/<client>/<viewport>/<page>_<section>.png`.
/// When `public_base` is set, each record also carries the URL the file is
/// served at under the `/files` mount.
pub fn run(request: &BatchRequest, output_root: &Path, public_base: Option<&str>) -> Result<BatchReport> {
    let started = Instant::now();
    let output_dir = output_root.join(&request.cliente_nombre);

    info!(client = %request.cliente_nombre, url_base = %request.url_base, "starting batch run");

    let session = BrowserSession::launch(&SessionConfig::default())?;

    let mut archivos = Vec::new();
    let mut errores = Vec::new();

    for profile in &VIEWPORT_PROFILES {
        info!(viewport = profile.name, width = profile.width, height = profile.height, "sweeping viewport");

        for target in &PAGE_TARGETS {
            let mut captured = false;

            for path in target.paths {
                let url = join_base(&request.url_base, path);
                match capture_page_sections(
                    &session,
                    &url,
                    target,
                    profile,
                    &output_dir,
                    request.include_browser_bar,
                ) {
                    Ok(records) if !records.is_empty() => {
                        archivos.extend(records);
                        captured = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(url = %url, error = %e, "candidate path failed, trying next");
                    }
                }
            }

            if !captured {
                errores.push(BatchFailure {
                    page: target.name.to_string(),
                    viewport: profile.name.to_string(),
                    error: "no URL path candidate could be captured".to_string(),
                });
            }
        }
    }

    // Authenticated admin sweep, desktop viewport only
    if let (Some(wp_url), Some(wp_user), Some(wp_pass)) =
        (&request.wp_url, &request.wp_user, &request.wp_pass)
    {
        if let Err(e) = session.set_viewport(VIEWPORT_PROFILES[0].viewport()) {
            warn!(error = %e, "could not restore desktop viewport for admin captures");
        }
        archivos.extend(wordpress::capture_admin(
            &session,
            wp_url,
            wp_user,
            wp_pass,
            &output_dir,
            &PAGE_TARGETS,
            &request.url_base,
        ));
    }

    if let Err(e) = session.close() {
        warn!(error = %e, "browser session close failed");
    }

    if let Some(base) = public_base {
        for record in &mut archivos {
            record.url_local = file_url(base, output_root, &record.path);
        }
    }

    let tiempo_total = (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
    info!(
        captures = archivos.len(),
        failures = errores.len(),
        elapsed = tiempo_total,
        "batch run finished"
    );

    Ok(BatchReport {
        success: errores.is_empty(),
        archivos,
        errores,
        tiempo_total,
        output_dir: output_dir.display().to_string(),
    })
}

/// Capture all three sections of one page at one viewport
///
/// A navigation failure before anything was stored fails the candidate so
/// the caller can try the next URL path; failures after the first stored
/// section keep what was captured.
fn capture_page_sections(
    session: &BrowserSession,
    url: &str,
    target: &PageTarget,
    profile: &ViewportProfile,
    output_dir: &Path,
    browser_bar: bool,
) -> Result<Vec<CaptureRecord>> {
    let options = StabilizeOptions {
        extra_settle: Some(BATCH_EXTRA_SETTLE),
    };
    let mut records = Vec::new();

    for section in [Section::Header, Section::Content, Section::Footer] {
        let request = CaptureRequest {
            url: url.to_string(),
            viewport: profile.viewport(),
            device_scale_factor: 1.0,
            section,
            full_page: false,
            browser_bar,
        };

        match capture::capture_with(session, &request, &options) {
            Ok(bytes) => {
                let filename = format!("{}_{}.png", target.name, section.name());
                let filepath = output_dir.join(profile.name).join(&filename);
                if let Some(parent) = filepath.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&filepath, bytes)?;

                records.push(CaptureRecord {
                    page: target.name.to_string(),
                    section: section.name().to_string(),
                    viewport: profile.name.to_string(),
                    path: filepath.display().to_string(),
                    url_local: None,
                });
            }
            Err(e) => {
                if records.is_empty() {
                    return Err(e);
                }
                warn!(page = target.name, section = section.name(), error = %e, "section capture failed");
                break;
            }
        }
    }

    Ok(records)
}

/// Join a base URL and a candidate path without doubling slashes
pub fn join_base(url_base: &str, path: &str) -> String {
    format!("{}{}", url_base.trim_end_matches('/'), path)
}

/// Map a stored file path to its URL under the `/files` mount
fn file_url(public_base: &str, output_root: &Path, stored_path: &str) -> Option<String> {
    let relative = Path::new(stored_path).strip_prefix(output_root).ok()?;
    let mut segments = Vec::new();
    for part in relative.components() {
        segments.push(part.as_os_str().to_string_lossy().into_owned());
    }
    Some(format!(
        "{}/files/{}",
        public_base.trim_end_matches('/'),
        segments.join("/")
    ))
}
