use image::RgbaImage;

use crate::error::Error;
use crate::fonts;
use crate::model::Font;

/// Drawing capabilities the engine needs from a rendering backend.
///
/// Coordinates are top-down points from the page's upper-left corner; `y`
/// for text is the baseline. Pages form an arena indexed `0..page_count()`,
/// so a finished page can be selected again for the footer pass.
///
/// A surface holds cursor/page state for one build and must not be shared
/// between concurrent builds.
pub trait Surface {
    fn measure_text(&self, text: &str, font: Font) -> Result<f32, Error>;
    fn set_font(&mut self, font: Font);
    fn set_text_color(&mut self, rgb: [u8; 3]);
    fn draw_text(&mut self, text: &str, x: f32, baseline: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: [u8; 3]);
    fn draw_image(
        &mut self,
        image: &RgbaImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), Error>;
    /// Append a page, make it current and return its index.
    fn new_page(&mut self) -> usize;
    fn select_page(&mut self, index: usize);
    fn page_count(&self) -> usize;
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        font: Font,
        color: [u8; 3],
        x: f32,
        baseline: f32,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: [u8; 3],
    },
    Image {
        width_px: u32,
        height_px: u32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

type MeasureFn = Box<dyn Fn(&str, Font) -> f32>;

/// In-memory backend that records draw operations per page.
///
/// Used for dry runs (page counts without producing bytes) and in tests.
pub struct Recorder {
    pages: Vec<Vec<DrawOp>>,
    current: usize,
    font: Font,
    color: [u8; 3],
    measure: MeasureFn,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    /// Measures with the built-in Helvetica width tables.
    pub fn new() -> Self {
        Self::with_measure(|text, font| fonts::helvetica_text_width(text, font.bold, font.size))
    }

    pub fn with_measure(measure: impl Fn(&str, Font) -> f32 + 'static) -> Self {
        Self {
            pages: Vec::new(),
            current: 0,
            font: Font::regular(12.0),
            color: [0, 0, 0],
            measure: Box::new(measure),
        }
    }

    pub fn pages(&self) -> &[Vec<DrawOp>] {
        &self.pages
    }

    /// Text strings drawn on one page, in drawing order.
    pub fn page_texts(&self, index: usize) -> Vec<&str> {
        self.pages
            .get(index)
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        DrawOp::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn push(&mut self, op: DrawOp) {
        if self.pages.is_empty() {
            self.new_page();
        }
        self.pages[self.current].push(op);
    }
}

impl Surface for Recorder {
    fn measure_text(&self, text: &str, font: Font) -> Result<f32, Error> {
        Ok((self.measure)(text, font))
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn set_text_color(&mut self, rgb: [u8; 3]) {
        self.color = rgb;
    }

    fn draw_text(&mut self, text: &str, x: f32, baseline: f32) {
        let op = DrawOp::Text {
            text: text.to_string(),
            font: self.font,
            color: self.color,
            x,
            baseline,
        };
        self.push(op);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: [u8; 3]) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color: rgb,
        });
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), Error> {
        self.push(DrawOp::Image {
            width_px: image.width(),
            height_px: image.height(),
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn new_page(&mut self) -> usize {
        self.pages.push(Vec::new());
        self.current = self.pages.len() - 1;
        self.current
    }

    fn select_page(&mut self, index: usize) {
        debug_assert!(index < self.pages.len(), "page {index} out of range");
        self.current = index.min(self.pages.len().saturating_sub(1));
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Measure through the surface, rejecting NaN, infinite and negative widths.
pub(crate) fn checked_measure<S: Surface + ?Sized>(
    surface: &S,
    text: &str,
    font: Font,
) -> Result<f32, Error> {
    let w = surface.measure_text(text, font)?;
    if !w.is_finite() || w < 0.0 {
        return Err(Error::measurement(text, w));
    }
    Ok(w)
}
