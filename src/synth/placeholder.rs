use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Rgb8};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::Fnv1a64;
use crate::render::frame::FrameImage;
use crate::synth::ImageSynthesizer;

/// What the placeholder draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// Solid background with the scene text stamped in the middle.
    #[default]
    TextStamp,
    /// Solid color derived from a stable hash of the scene text.
    SolidColor,
}

/// Placeholder rendering options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderOpts {
    pub style: PlaceholderStyle,
    pub background: Rgb8,
    pub foreground: Rgb8,
    /// Text size in pixels. Defaults to 1/20 of the canvas height.
    pub font_size: Option<f32>,
    pub font_family: String,
}

impl Default for PlaceholderOpts {
    fn default() -> Self {
        Self {
            style: PlaceholderStyle::TextStamp,
            background: Rgb8::WHITE,
            foreground: Rgb8::BLACK,
            font_size: None,
            font_family: "sans-serif".to_owned(),
        }
    }
}

/// Deterministic offline synthesizer.
///
/// Same prompt and size always give the same pixels on a given machine. Text glyphs come from
/// the system font database; without any installed fonts the text is skipped and only the
/// background is drawn.
pub struct PlaceholderSynthesizer {
    opts: PlaceholderOpts,
    fontdb: OnceLock<Arc<usvg::fontdb::Database>>,
}

impl PlaceholderSynthesizer {
    pub fn new(opts: PlaceholderOpts) -> Self {
        Self {
            opts,
            fontdb: OnceLock::new(),
        }
    }

    pub fn opts(&self) -> &PlaceholderOpts {
        &self.opts
    }

    /// Render straight to a [`FrameImage`], skipping the PNG round trip.
    pub fn render_frame(&self, prompt: &str, canvas: Canvas) -> ReelResult<FrameImage> {
        match self.opts.style {
            PlaceholderStyle::SolidColor => Ok(FrameImage::solid(canvas, prompt_color(prompt))),
            PlaceholderStyle::TextStamp => {
                let rgb = self.stamp_text(prompt, canvas)?;
                FrameImage::from_rgb8(canvas.width, canvas.height, rgb)
            }
        }
    }

    fn stamp_text(&self, prompt: &str, canvas: Canvas) -> ReelResult<Vec<u8>> {
        let svg = build_stamp_svg(prompt, canvas, &self.opts);

        let mut opts = usvg::Options::default();
        opts.fontdb = self.fontdb().clone();
        let tree = usvg::Tree::from_str(&svg, &opts).context("parse placeholder svg")?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas.width, canvas.height)
            .ok_or_else(|| ReelError::validation("failed to allocate placeholder pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        // The background rect is opaque, so premultiplied and straight channels agree.
        let mut rgb = Vec::with_capacity(canvas.rgb8_len());
        for px in pixmap.data().chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
        Ok(rgb)
    }

    fn fontdb(&self) -> &Arc<usvg::fontdb::Database> {
        self.fontdb.get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            if db.is_empty() {
                tracing::warn!("no system fonts found; placeholder text will not be drawn");
            } else {
                tracing::debug!(faces = db.len(), "loaded system fonts for placeholders");
            }
            Arc::new(db)
        })
    }
}

impl Default for PlaceholderSynthesizer {
    fn default() -> Self {
        Self::new(PlaceholderOpts::default())
    }
}

impl ImageSynthesizer for PlaceholderSynthesizer {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn synthesize(&self, prompt: &str, width: u32, height: u32) -> ReelResult<Vec<u8>> {
        if width == 0 || height == 0 {
            return Err(ReelError::synthesis("placeholder size must be non-zero"));
        }
        let frame = self.render_frame(prompt, Canvas { width, height })?;
        let rgb = image::RgbImage::from_raw(width, height, frame.as_raw().to_vec())
            .ok_or_else(|| ReelError::synthesis("placeholder buffer size mismatch"))?;

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(rgb)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode placeholder png")?;
        Ok(buf)
    }
}

/// Stable mid-tone color for `prompt`.
pub fn prompt_color(prompt: &str) -> Rgb8 {
    let mut h = Fnv1a64::new();
    h.write_bytes(prompt.as_bytes());
    let bits = h.finish();
    // Keep channels away from pure black/white so fades stay visible.
    let channel = |shift: u32| 48 + ((bits >> shift) & 0xff) as u8 % 160;
    Rgb8::new(channel(0), channel(8), channel(16))
}

fn build_stamp_svg(prompt: &str, canvas: Canvas, opts: &PlaceholderOpts) -> String {
    let font_size = opts
        .font_size
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or((canvas.height as f32 / 20.0).max(8.0));
    let line_height = font_size * 1.25;

    // Rough average glyph advance for proportional sans fonts.
    let max_chars = ((canvas.width as f32 * 0.9) / (font_size * 0.55)).floor().max(1.0) as usize;
    let max_lines = ((canvas.height as f32 * 0.9) / line_height).floor().max(1.0) as usize;
    let lines = wrap_text(prompt, max_chars, max_lines);

    let block_h = line_height * lines.len() as f32;
    let first_baseline = (canvas.height as f32 - block_h) / 2.0 + font_size;
    let cx = canvas.width as f32 / 2.0;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect x="0" y="0" width="{w}" height="{h}" fill="{bg}"/>"#,
        w = canvas.width,
        h = canvas.height,
        bg = opts.background.to_hex(),
    );
    for (i, line) in lines.iter().enumerate() {
        let y = first_baseline + line_height * i as f32;
        svg.push_str(&format!(
            r#"<text x="{cx}" y="{y}" text-anchor="middle" font-family="{family}" font-size="{font_size}" fill="{fg}">{text}</text>"#,
            family = escape_xml(&opts.font_family),
            fg = opts.foreground.to_hex(),
            text = escape_xml(line),
        ));
    }
    svg.push_str("</svg>");
    svg
}

/// Greedy word wrap. Explicit line breaks are kept; overflow lines end with an ellipsis.
fn wrap_text(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push('…');
        }
    }
    lines
}

/// Escape markup and drop control characters that XML 1.0 does not allow.
fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\t' | '\n' | '\r' => out.push(c),
            _ if c.is_control() => {}
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
#[path = "../../tests/unit/synth/placeholder.rs"]
mod tests;
