//! Fuse the browser-bar overlay with a raw capture
//!
//! The overlay SVG is rasterized off-screen, a canvas of the combined
//! dimensions is allocated, the bar is blitted at the top and the capture
//! below it, and the result is re-encoded as PNG. Compositing is an
//! enhancement: any failure downgrades to the untouched capture.

use crate::{Error, Result, BAR_HEIGHT};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;
use tracing::warn;

/// Composite the overlay above the raw PNG capture
///
/// Output width equals the capture width; output height is the capture
/// height plus [`BAR_HEIGHT`]. The overlay is rasterized at the capture's
/// pixel width so scaled captures keep the width invariant.
pub fn composite(raw_png: &[u8], bar_svg: &str) -> Result<Vec<u8>> {
    let raw = image::load_from_memory(raw_png)
        .map_err(|e| Error::Compose(format!("decode capture: {e}")))?
        .to_rgba8();
    let (width, height) = raw.dimensions();

    let bar = rasterize_bar(bar_svg, width)?;

    let mut canvas = image::RgbaImage::new(width, height + BAR_HEIGHT);

    // Bar occupies rows [0, BAR_HEIGHT)
    for (i, pixel) in bar.pixels().iter().enumerate() {
        let x = (i as u32) % width;
        let y = (i as u32) / width;
        let c = pixel.demultiply();
        canvas.put_pixel(x, y, image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]));
    }

    // Capture occupies rows [BAR_HEIGHT, BAR_HEIGHT + height)
    image::imageops::replace(&mut canvas, &raw, 0, BAR_HEIGHT as i64);

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| Error::Compose(format!("encode composite: {e}")))?;

    Ok(out)
}

/// Composite, falling back to the original capture on any failure
pub fn composite_or_original(raw_png: Vec<u8>, bar_svg: &str) -> Vec<u8> {
    match composite(&raw_png, bar_svg) {
        Ok(combined) => combined,
        Err(e) => {
            warn!(error = %e, "browser bar compositing failed, returning raw capture");
            raw_png
        }
    }
}

/// Rasterize the bar SVG into a pixmap of `target_width` x `BAR_HEIGHT`
///
/// Text requires system fonts; when none are available the glyphs are simply
/// not drawn, which is acceptable for a cosmetic overlay.
fn rasterize_bar(bar_svg: &str, target_width: u32) -> Result<tiny_skia::Pixmap> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(bar_svg, &options)
        .map_err(|e| Error::Compose(format!("parse overlay svg: {e}")))?;

    let mut pixmap = tiny_skia::Pixmap::new(target_width.max(1), BAR_HEIGHT)
        .ok_or_else(|| Error::Compose("zero-sized overlay pixmap".to_string()))?;

    // The capture can be wider than the viewport (device scale factor > 1);
    // stretch the bar horizontally to keep the composite width invariant.
    let sx = target_width as f32 / tree.size().width().max(1.0);
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(sx, 1.0),
        &mut pixmap.as_mut(),
    );

    Ok(pixmap)
}
