#![allow(dead_code)]

use paperflow_pdf::{
    BuildConfig, DocumentMetrics, DrawOp, Error, FontSource, FooterBand, FooterLayout, HeaderBand,
    Margins, Recorder,
};

pub const CONTENT_FONT: f32 = 10.0;
pub const HEADER_FONT: f32 = 14.0;
pub const FOOTER_FONT: f32 = 8.0;
pub const CHAR_ADVANCE: f32 = 5.0;

/// Route `log` output through the test harness; safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Every character is `CHAR_ADVANCE` wide, bold or not.
pub fn fixed_width(text: &str) -> f32 {
    text.chars().count() as f32 * CHAR_ADVANCE
}

pub fn fixed_measure(text: &str, _bold: bool) -> Result<f32, Error> {
    Ok(fixed_width(text))
}

pub fn recorder() -> Recorder {
    Recorder::with_measure(|text, _font| fixed_width(text))
}

/// 10pt margins, 20pt bands, no line spacing; content band is exactly
/// `content_width` x `content_height`, starting at y = 30.
pub fn metrics(content_width: f32, content_height: f32, line_height: f32) -> DocumentMetrics {
    DocumentMetrics {
        page_width: content_width + 20.0,
        page_height: content_height + 60.0,
        margins: Margins::uniform(10.0),
        header_height: 20.0,
        footer_height: 20.0,
        band_gap: 0.0,
        content_font_size: CONTENT_FONT,
        header_font_size: HEADER_FONT,
        footer_font_size: FOOTER_FONT,
        line_height,
        line_spacing: 0.0,
        slice_buffer_px: 10,
        max_pages: None,
    }
}

pub fn config(metrics: DocumentMetrics) -> BuildConfig {
    BuildConfig {
        metrics,
        header: HeaderBand {
            title: "Answer Key".into(),
            fill: None,
            color: [0, 0, 0],
        },
        footer: FooterBand {
            copyright: "(c) Papershapers".into(),
            color: [150, 150, 150],
            layout: FooterLayout::Split,
        },
        font: FontSource::Helvetica,
        filename_template: "{query}_Answer_Key.pdf".into(),
        title: Some("Answer Key".into()),
    }
}

/// `n` space-separated four-letter words.
pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

/// Deterministic pseudo-random prose with occasional bold spans.
pub fn prose(seed: u64, n_words: usize) -> String {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    let vocab = [
        "a", "of", "the", "prime", "number", "photosynthesis", "Q1.", "2+2?", "answer",
        "chlorophyll", "x", "marks", "supercalifragilisticexpialidocious",
    ];
    let mut out = String::new();
    for i in 0..n_words {
        if i > 0 {
            out.push_str(if next() % 7 == 0 { "  " } else { " " });
        }
        let word = vocab[next() % vocab.len()];
        if next() % 5 == 0 {
            out.push_str("**");
            out.push_str(word);
            out.push_str("**");
        } else {
            out.push_str(word);
        }
    }
    out
}

/// Body text ops (content font size) on one page as (text, baseline).
pub fn body_ops(ops: &[DrawOp]) -> Vec<(&str, f32)> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::Text {
                text,
                font,
                baseline,
                ..
            } if font.size == CONTENT_FONT => Some((text.as_str(), *baseline)),
            _ => None,
        })
        .collect()
}

/// Distinct body baselines on one page, top to bottom.
pub fn body_baselines(ops: &[DrawOp]) -> Vec<f32> {
    let mut ys: Vec<f32> = body_ops(ops).iter().map(|&(_, y)| y).collect();
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ys.dedup_by(|a, b| (*a - *b).abs() < 0.01);
    ys
}

pub fn texts_with_size(ops: &[DrawOp], size: f32) -> Vec<&str> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, font, .. } if font.size == size => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

/// Page count of a pdf-writer document, read from its page dictionaries.
pub fn pdf_page_count(bytes: &[u8]) -> usize {
    let needle = b"/Type /Page";
    bytes
        .windows(needle.len() + 1)
        .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
        .count()
}

pub fn contains(bytes: &[u8], needle: &[u8]) -> bool {
    bytes.windows(needle.len()).any(|w| w == needle)
}

const FONT_PAIRS: &[(&str, &str)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    ),
    (
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    ),
];

/// First installed regular/bold TrueType pair, if the system has one.
pub fn system_font_pair() -> Option<(Vec<u8>, Vec<u8>)> {
    FONT_PAIRS.iter().find_map(|(regular, bold)| {
        Some((std::fs::read(regular).ok()?, std::fs::read(bold).ok()?))
    })
}
