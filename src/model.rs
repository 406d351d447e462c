/// A4 in points.
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

/// Styled fragment produced by the segmenter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

impl TextRun {
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Paragraph {
    /// Whitespace-only input line: advances the cursor by one line, draws nothing.
    Blank,
    Runs(Vec<TextRun>),
}

/// Word or whitespace unit used for line packing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub bold: bool,
}

impl Token {
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedToken {
    pub text: String,
    pub bold: bool,
    pub x: f32, // relative to line start
    pub width: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub tokens: Vec<PlacedToken>,
    pub width: f32,
}

impl Line {
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }
}

/// Cursor state of the page flow. Coordinates are top-down points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageContext {
    pub page_number: usize,
    pub cursor_y: f32,
    pub content_top: f32,
    pub content_bottom: f32,
}

impl PageContext {
    pub fn new(metrics: &DocumentMetrics) -> Self {
        Self {
            page_number: 0,
            cursor_y: metrics.content_top(),
            content_top: metrics.content_top(),
            content_bottom: metrics.content_bottom(),
        }
    }

    pub(crate) fn next_page(&mut self) {
        self.page_number += 1;
        self.cursor_y = self.content_top;
    }
}

/// Vertical strip of the source raster mapped to one output page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slice {
    pub source_y_offset: u32,
    pub height_px: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// Page geometry, all lengths in points except `slice_buffer_px`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DocumentMetrics {
    pub page_width: f32,
    pub page_height: f32,
    pub margins: Margins,
    pub header_height: f32,
    pub footer_height: f32,
    /// Gap kept between each band and the body.
    pub band_gap: f32,
    pub content_font_size: f32,
    pub header_font_size: f32,
    pub footer_font_size: f32,
    pub line_height: f32,
    pub line_spacing: f32,
    pub slice_buffer_px: u32,
    /// `None` leaves the page count unbounded.
    pub max_pages: Option<usize>,
}

impl Default for DocumentMetrics {
    fn default() -> Self {
        Self::text_a4()
    }
}

impl DocumentMetrics {
    /// Answer-key layout: 15 mm margins, 12 pt body.
    pub fn text_a4() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margins: Margins::uniform(42.52),
            header_height: 40.0,
            footer_height: 30.0,
            band_gap: 0.0,
            content_font_size: 12.0,
            header_font_size: 16.0,
            footer_font_size: 10.0,
            line_height: 14.0,
            line_spacing: 4.0,
            slice_buffer_px: 10,
            max_pages: Some(500),
        }
    }

    /// Snapshot layout: full-bleed header band, 20 pt side margins.
    pub fn snapshot_a4() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margins: Margins {
                top: 0.0,
                right: 20.0,
                bottom: 15.0,
                left: 20.0,
            },
            header_height: 50.0,
            footer_height: 30.0,
            band_gap: 10.0,
            content_font_size: 12.0,
            header_font_size: 12.0,
            footer_font_size: 8.0,
            line_height: 14.0,
            line_spacing: 4.0,
            slice_buffer_px: 10,
            max_pages: Some(500),
        }
    }

    pub fn content_top(&self) -> f32 {
        self.margins.top + self.header_height + self.band_gap
    }

    pub fn content_bottom(&self) -> f32 {
        self.page_height - self.margins.bottom - self.footer_height - self.band_gap
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margins.left - self.margins.right
    }

    pub fn content_height(&self) -> f32 {
        self.content_bottom() - self.content_top()
    }

    pub fn line_pitch(&self) -> f32 {
        self.line_height + self.line_spacing
    }

    pub fn validate(&self) -> Result<(), crate::Error> {
        use crate::Error::InvalidMetrics;

        let lengths = [
            ("page_width", self.page_width),
            ("page_height", self.page_height),
            ("content_font_size", self.content_font_size),
            ("header_font_size", self.header_font_size),
            ("footer_font_size", self.footer_font_size),
            ("line_height", self.line_height),
        ];
        for (name, v) in lengths {
            if !v.is_finite() || v <= 0.0 {
                return Err(InvalidMetrics(format!("{name} must be positive, got {v}")));
            }
        }
        let offsets = [
            ("margins.top", self.margins.top),
            ("margins.right", self.margins.right),
            ("margins.bottom", self.margins.bottom),
            ("margins.left", self.margins.left),
            ("header_height", self.header_height),
            ("footer_height", self.footer_height),
            ("band_gap", self.band_gap),
            ("line_spacing", self.line_spacing),
        ];
        for (name, v) in offsets {
            if !v.is_finite() || v < 0.0 {
                return Err(InvalidMetrics(format!("{name} must not be negative, got {v}")));
            }
        }
        if self.content_width() <= 0.0 {
            return Err(InvalidMetrics("margins leave no content width".into()));
        }
        if self.content_height() < self.line_height {
            return Err(InvalidMetrics(format!(
                "content band {:.1}pt is shorter than one line ({:.1}pt)",
                self.content_height(),
                self.line_height
            )));
        }
        if self.max_pages == Some(0) {
            return Err(InvalidMetrics("max_pages must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Font {
    pub bold: bool,
    pub size: f32,
}

impl Font {
    pub fn regular(size: f32) -> Self {
        Self { bold: false, size }
    }

    pub fn bold(size: f32) -> Self {
        Self { bold: true, size }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeaderBand {
    pub title: String,
    pub fill: Option<[u8; 3]>, // None = no background
    pub color: [u8; 3],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FooterLayout {
    /// Copyright on the left, "Page i of N" on the right.
    Split,
    /// One centred string: "<copyright> | Page i of N".
    Centered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FooterBand {
    pub copyright: String,
    pub color: [u8; 3],
    pub layout: FooterLayout,
}

#[derive(Clone, Debug, Default)]
pub enum FontSource {
    /// Standard Type1 Helvetica / Helvetica-Bold, WinAnsi encoded.
    #[default]
    Helvetica,
    /// TrueType/OpenType faces, embedded as subset CID fonts.
    TrueType { regular: Vec<u8>, bold: Vec<u8> },
}

/// Everything constant for one build.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub metrics: DocumentMetrics,
    pub header: HeaderBand,
    pub footer: FooterBand,
    pub font: FontSource,
    /// `{field}` placeholders are filled from the caller's semantic fields.
    pub filename_template: String,
    /// Written to the PDF document-info dictionary.
    pub title: Option<String>,
}

impl BuildConfig {
    pub fn text() -> Self {
        Self {
            metrics: DocumentMetrics::text_a4(),
            header: HeaderBand {
                title: "Answer Key".into(),
                fill: None,
                color: [0, 0, 0],
            },
            footer: FooterBand {
                copyright: "\u{a9} 2025 Papershapers all rights reserved".into(),
                color: [0, 0, 0],
                layout: FooterLayout::Split,
            },
            font: FontSource::Helvetica,
            filename_template: "{query}_Answer_Key.pdf".into(),
            title: Some("Answer Key".into()),
        }
    }

    pub fn snapshot() -> Self {
        Self {
            metrics: DocumentMetrics::snapshot_a4(),
            header: HeaderBand {
                title: "Papershapers: Your Personalized Mock Paper".into(),
                fill: Some([34, 197, 94]),
                color: [255, 255, 255],
            },
            footer: FooterBand {
                copyright: "\u{a9} 2025 Papershapers. All rights reserved.".into(),
                color: [100, 100, 100],
                layout: FooterLayout::Centered,
            },
            font: FontSource::Helvetica,
            filename_template: "{board}_{class}_{subjects}_{chapter}.pdf".into(),
            title: Some("Mock Paper".into()),
        }
    }
}
