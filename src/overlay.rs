//! Simulated browser chrome: a Chrome-style tab strip and address bar
//!
//! `BrowserBar` is a pure, reproducible description of the graphic: the same
//! (url, viewport width) pair always yields the same SVG. Geometry depends
//! only on the width and the fixed bar height; the font references are
//! cosmetic and rasterization must not depend on them being available.

use crate::ViewportClass;

/// Height of the simulated browser bar in pixels
pub const BAR_HEIGHT: u32 = 80;

/// Character budget for the tab title text
const TAB_TITLE_CHARS: usize = 25;

// Chrome palette
const COLOR_BG: &str = "#dfe1e5";
const COLOR_TOOLBAR: &str = "#ffffff";
const COLOR_TEXT: &str = "#3c4043";
const COLOR_TEXT_LIGHT: &str = "#5f6368";
const COLOR_SEPARATOR: &str = "#dadce0";
const COLOR_ADDRESS_BG: &str = "#f1f3f4";

/// Declarative description of the browser bar for one capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserBar {
    width: u32,
    class: ViewportClass,
    display_url: String,
}

impl BrowserBar {
    /// Build the bar spec for a URL at a given viewport width
    pub fn new(url: &str, width: u32) -> Self {
        let class = ViewportClass::from_width(width);
        Self {
            width: width.max(1),
            class,
            display_url: display_url(url, url_char_budget(class)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        BAR_HEIGHT
    }

    pub fn class(&self) -> ViewportClass {
        self.class
    }

    pub fn display_url(&self) -> &str {
        &self.display_url
    }

    /// Serialize the bar to an SVG document of `width` x `BAR_HEIGHT`
    pub fn to_svg(&self) -> String {
        let width = self.width;
        let mobile = self.class == ViewportClass::Mobile;

        let mut svg = String::with_capacity(2048);
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{BAR_HEIGHT}">"#
        ));

        // Tab strip background, toolbar and bottom separator
        svg.push_str(&format!(
            r#"<rect width="{width}" height="{BAR_HEIGHT}" fill="{COLOR_BG}"/>"#
        ));
        svg.push_str(&format!(
            r#"<rect y="40" width="{width}" height="40" fill="{COLOR_TOOLBAR}"/>"#
        ));
        svg.push_str(&format!(
            r#"<line x1="0" y1="80" x2="{width}" y2="80" stroke="{COLOR_SEPARATOR}" stroke-width="1"/>"#
        ));

        if !mobile {
            svg.push_str(&self.tab_strip());
        }
        svg.push_str(&self.address_bar());
        if !mobile {
            svg.push_str(&self.nav_buttons());
        }

        svg.push_str("</svg>");
        svg
    }

    /// Active tab shape, favicon placeholder, title and close glyph
    fn tab_strip(&self) -> String {
        let width = self.width;
        let title = xml_escape(&truncate(&self.display_url, TAB_TITLE_CHARS));

        format!(
            concat!(
                r#"<path d="M 0 40 L 0 40 L 7 40 C 7 40 12 40 12 35 L 12 15 C 12 10 16 7 20 7 "#,
                r#"L 220 7 C 224 7 228 10 228 15 L 228 35 C 228 40 233 40 233 40 "#,
                r#"L {w} 40 L {w} 80 L 0 80 Z" fill="{toolbar}"/>"#,
                r#"<circle cx="25" cy="24" r="7" fill="{separator}"/>"#,
                r#"<text x="40" y="28" font-family="Segoe UI, Roboto, Arial, sans-serif" font-size="12" fill="{text}">{title}</text>"#,
                r#"<text x="210" y="28" font-family="Segoe UI, Roboto, Arial, sans-serif" font-size="14" fill="{light}">&#215;</text>"#
            ),
            w = width,
            toolbar = COLOR_TOOLBAR,
            separator = COLOR_SEPARATOR,
            text = COLOR_TEXT,
            light = COLOR_TEXT_LIGHT,
            title = title,
        )
    }

    /// Pill-shaped address bar with lock glyph and display URL
    fn address_bar(&self) -> String {
        let width = self.width;
        let (pill_x, pill_width, lock_x, text_x) = match self.class {
            ViewportClass::Mobile => (10, width.saturating_sub(20).max(1), 22, 45),
            ViewportClass::Tablet => (100, width.saturating_sub(200).max(1), 115, 135),
            ViewportClass::Desktop => (100, width.saturating_sub(250).max(1), 115, 135),
        };

        format!(
            concat!(
                r#"<rect x="{pill_x}" y="47" width="{pill_w}" height="28" rx="14" fill="{address_bg}"/>"#,
                r#"<g transform="translate({lock_x}, 53)">"#,
                r#"<path d="M4 6V4a4 4 0 118 0v2h1a1 1 0 011 1v7a1 1 0 01-1 1H3a1 1 0 01-1-1V7a1 1 0 011-1h1zm2-2v2h4V4a2 2 0 10-4 0z" "#,
                r#"fill="{light}" transform="scale(0.85)"/></g>"#,
                r#"<text x="{text_x}" y="65" font-family="Segoe UI, Roboto, Arial, sans-serif" font-size="13" fill="{text}">{url}</text>"#
            ),
            pill_x = pill_x,
            pill_w = pill_width,
            address_bg = COLOR_ADDRESS_BG,
            lock_x = lock_x,
            light = COLOR_TEXT_LIGHT,
            text_x = text_x,
            text = COLOR_TEXT,
            url = xml_escape(&self.display_url),
        )
    }

    /// Back / forward / reload glyphs; the forward arrow is drawn in the
    /// separator tint to read as disabled
    fn nav_buttons(&self) -> String {
        format!(
            concat!(
                r#"<g transform="translate(15, 52)">"#,
                r#"<path d="M 20 10 L 10 20 L 30 20 L 13 20 L 20 30" fill="none" stroke="{light}" stroke-width="2" transform="scale(0.5) translate(-10,-10)"/>"#,
                r#"<path d="M 50 10 L 60 20 L 40 20 L 57 20 L 50 30" fill="none" stroke="{separator}" stroke-width="2" transform="scale(0.5) translate(-10,-10)"/>"#,
                r#"<path d="M 90 10 A 10 10 0 1 0 100 20 L 100 15" fill="none" stroke="{light}" stroke-width="2" transform="scale(0.5) translate(-10,-10)"/>"#,
                r#"</g>"#
            ),
            light = COLOR_TEXT_LIGHT,
            separator = COLOR_SEPARATOR,
        )
    }
}

/// Character budget for the address-bar URL per viewport class
fn url_char_budget(class: ViewportClass) -> usize {
    match class {
        ViewportClass::Mobile => 25,
        ViewportClass::Tablet => 50,
        ViewportClass::Desktop => 80,
    }
}

/// Strip the scheme prefix and a single trailing slash, then truncate
fn display_url(url: &str, max_chars: usize) -> String {
    let stripped = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let stripped = stripped.strip_suffix('/').unwrap_or(stripped);
    truncate(stripped, max_chars)
}

/// Truncate to `max_chars` characters, appending an ellipsis marker
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('\u{2026}');
    out
}

/// Escape text for embedding in SVG markup
fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_dimensions() {
        for width in [1, 100, 375, 768, 1920, 3840] {
            let bar = BrowserBar::new("https://example.com", width);
            assert_eq!(bar.width(), width);
            assert_eq!(bar.height(), BAR_HEIGHT);
            let svg = bar.to_svg();
            assert!(svg.starts_with(&format!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="80">"#
            )));
        }
    }

    #[test]
    fn test_mobile_omits_tab_strip_and_nav() {
        let bar = BrowserBar::new("https://example.com", 375);
        let svg = bar.to_svg();
        assert!(!svg.contains("<circle"), "mobile bar should have no favicon");
        assert!(!svg.contains("&#215;"), "mobile bar should have no close glyph");
        // Nav arrows live in the translate(15, 52) group
        assert!(!svg.contains("translate(15, 52)"));
        // Address pill spans nearly the full width
        assert!(svg.contains(r#"<rect x="10" y="47" width="355""#));
    }

    #[test]
    fn test_desktop_includes_tab_strip_and_nav() {
        let bar = BrowserBar::new("https://example.com", 1920);
        let svg = bar.to_svg();
        assert!(svg.contains("<circle cx=\"25\""));
        assert!(svg.contains("&#215;"));
        assert!(svg.contains("translate(15, 52)"));
        assert!(svg.contains(r#"<rect x="100" y="47" width="1670""#));
    }

    #[test]
    fn test_tablet_pill_width() {
        let bar = BrowserBar::new("https://example.com", 768);
        assert_eq!(bar.class(), crate::ViewportClass::Tablet);
        assert!(bar.to_svg().contains(r#"<rect x="100" y="47" width="568""#));
    }

    #[test]
    fn test_display_url_strips_scheme_and_slash() {
        let bar = BrowserBar::new("https://example.com/", 1920);
        assert_eq!(bar.display_url(), "example.com");
        let bar = BrowserBar::new("http://example.com/contact", 1920);
        assert_eq!(bar.display_url(), "example.com/contact");
    }

    #[test]
    fn test_display_url_truncation_by_class() {
        let long = format!("https://example.com/{}", "a".repeat(200));

        let mobile = BrowserBar::new(&long, 375);
        assert_eq!(mobile.display_url().chars().count(), 25 + 1);
        assert!(mobile.display_url().ends_with('\u{2026}'));

        let desktop = BrowserBar::new(&long, 1920);
        assert_eq!(desktop.display_url().chars().count(), 80 + 1);
    }

    #[test]
    fn test_degenerate_width_does_not_panic() {
        let bar = BrowserBar::new("https://example.com", 1);
        let svg = bar.to_svg();
        assert!(svg.contains("width=\"1\""));
        // Pill width is clamped, never zero or underflowed
        assert!(!svg.contains("width=\"0\""));
    }

    #[test]
    fn test_url_text_is_escaped() {
        let bar = BrowserBar::new("https://example.com/?a=1&b=<x>", 1920);
        let svg = bar.to_svg();
        assert!(svg.contains("&amp;"));
        assert!(!svg.contains("<x>"));
    }
}
