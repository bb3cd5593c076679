//! End-to-end pipeline tests against a local fixture server
//!
//! Tests that drive a real browser are marked `#[ignore]` and require Chrome
//! to be installed, matching the engine smoke tests.

use shotkit::{capture, BAR_HEIGHT, CaptureRequest, Error, Section, Viewport};
use std::sync::Once;
use tiny_http::{Response, Server};

static INIT: Once = Once::new();

/// Start a fixture server with a tall page and a consent banner
fn start_fixture_server() -> String {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18090").unwrap();
            for request in server.incoming_requests() {
                let path = request.url().to_string();
                let response = match path.as_str() {
                    "/" | "/contact" => Response::from_string(
                        r#"<!DOCTYPE html>
<html>
<head><title>Fixture</title></head>
<body style="margin:0">
<div id="cookie-banner"><button>Accept</button></div>
<div style="height:3000px;background:linear-gradient(#fff,#000)">
<h1>Top of page</h1>
</div>
<footer>Bottom of page</footer>
</body>
</html>"#,
                    )
                    .with_header(
                        "Content-Type: text/html; charset=utf-8"
                            .parse::<tiny_http::Header>()
                            .unwrap(),
                    ),
                    _ => Response::from_string("Not Found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
        std::thread::sleep(std::time::Duration::from_millis(100));
    });

    "http://127.0.0.1:18090".to_string()
}

fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).expect("output is not a decodable image");
    (img.width(), img.height())
}

#[test]
#[ignore] // Requires Chrome to be installed
fn header_capture_with_bar_adds_bar_height() {
    let base_url = start_fixture_server();
    let request = CaptureRequest {
        url: base_url,
        viewport: Viewport { width: 800, height: 600 },
        ..CaptureRequest::default()
    };

    let bytes = capture::capture_once(&request).expect("capture failed");
    assert_eq!(&bytes[0..8], b"\x89PNG\r\n\x1a\n");
    let (w, h) = png_dimensions(&bytes);
    assert_eq!(w, 800);
    assert_eq!(h, 600 + BAR_HEIGHT);
}

#[test]
#[ignore] // Requires Chrome to be installed
fn capture_without_bar_keeps_viewport_height() {
    let base_url = start_fixture_server();
    let request = CaptureRequest {
        url: base_url,
        viewport: Viewport { width: 800, height: 600 },
        browser_bar: false,
        ..CaptureRequest::default()
    };

    let bytes = capture::capture_once(&request).expect("capture failed");
    assert_eq!(png_dimensions(&bytes), (800, 600));
}

#[test]
#[ignore] // Requires Chrome to be installed
fn footer_capture_matches_viewport_dimensions() {
    let base_url = start_fixture_server();
    let request = CaptureRequest {
        url: base_url,
        viewport: Viewport { width: 800, height: 600 },
        section: Section::Footer,
        browser_bar: false,
        ..CaptureRequest::default()
    };

    let bytes = capture::capture_once(&request).expect("capture failed");
    // The section offset changes what is captured, never the dimensions
    assert_eq!(png_dimensions(&bytes), (800, 600));
}

#[test]
#[ignore] // Requires Chrome to be installed
fn full_page_capture_ignores_bar_and_captures_everything() {
    let base_url = start_fixture_server();
    let request = CaptureRequest {
        url: base_url,
        viewport: Viewport { width: 800, height: 600 },
        full_page: true,
        browser_bar: true,
        ..CaptureRequest::default()
    };

    let bytes = capture::capture_once(&request).expect("capture failed");
    let (w, h) = png_dimensions(&bytes);
    assert_eq!(w, 800);
    // The fixture page is 3000px tall plus the footer
    assert!(h >= 3000, "expected full scrollable height, got {h}");
}

#[test]
#[ignore] // Requires Chrome to be installed
fn unreachable_url_is_a_navigation_error() {
    let request = CaptureRequest {
        url: "http://127.0.0.1:9".to_string(),
        viewport: Viewport { width: 800, height: 600 },
        ..CaptureRequest::default()
    };

    match capture::capture_once(&request) {
        Err(Error::Navigation(_)) => {}
        other => panic!("expected navigation error, got {other:?}"),
    }
}

#[test]
#[ignore] // Requires Chrome to be installed
fn repeated_captures_have_identical_dimensions() {
    let base_url = start_fixture_server();
    let request = CaptureRequest {
        url: base_url,
        viewport: Viewport { width: 640, height: 480 },
        section: Section::Content,
        ..CaptureRequest::default()
    };

    let first = capture::capture_once(&request).expect("first capture failed");
    let second = capture::capture_once(&request).expect("second capture failed");
    assert_eq!(png_dimensions(&first), png_dimensions(&second));
}

#[test]
#[ignore] // Requires Chrome to be installed
fn batch_run_against_unreachable_site_accumulates_failures() {
    let output_root = tempfile::tempdir().unwrap();

    let request = shotkit::batch::BatchRequest {
        url_base: "http://127.0.0.1:9".to_string(),
        cliente_nombre: "unreachable_client".to_string(),
        wp_url: None,
        wp_user: None,
        wp_pass: None,
        include_browser_bar: true,
    };

    let report = shotkit::batch::run(&request, output_root.path(), None)
        .expect("the run itself completes even when every capture fails");

    // Every URL candidate fails for every (page, viewport) pair, so each
    // pair contributes exactly one failure entry and nothing is stored
    assert!(!report.success);
    assert!(report.archivos.is_empty());
    assert_eq!(report.errores.len(), 3 * 3);
    for failure in &report.errores {
        assert!(!failure.error.is_empty());
    }

    let client_dir = output_root.path().join("unreachable_client");
    assert!(
        !client_dir.join("desktop").join("home_header.png").exists(),
        "no files should be stored for a fully failed run"
    );
}

#[test]
#[ignore] // Requires Chrome to be installed
fn batch_run_builds_the_expected_file_tree() {
    let base_url = start_fixture_server();
    let output_root = tempfile::tempdir().unwrap();

    let request = shotkit::batch::BatchRequest {
        url_base: base_url,
        cliente_nombre: "fixture_client".to_string(),
        wp_url: None,
        wp_user: None,
        wp_pass: None,
        include_browser_bar: true,
    };

    let report = shotkit::batch::run(&request, output_root.path(), Some("http://localhost:3000"))
        .expect("batch run failed");

    // The fixture serves every path (unknown ones as a 404 page that still
    // renders), so the full cross-product succeeds
    assert!(report.success);
    assert_eq!(report.archivos.len(), 3 * 3 * 3);
    assert!(report.errores.is_empty());

    let sample = output_root
        .path()
        .join("fixture_client")
        .join("desktop")
        .join("home_header.png");
    assert!(sample.exists(), "missing {sample:?}");

    let record = &report.archivos[0];
    assert!(record
        .url_local
        .as_deref()
        .unwrap()
        .starts_with("http://localhost:3000/files/fixture_client/"));
}
