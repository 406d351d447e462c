mod common;

use common::{contains, pdf_page_count};
use image::{Rgba, RgbaImage};
use paperflow_pdf::{
    BuildConfig, DocumentAssembler, Error, FontSource, PdfSurface, Recorder, SlicePlan, Surface,
    build_snapshot_document, build_text_document, render_filename, sanitize_field,
};

#[test]
fn text_build_writes_a_pdf_with_matching_page_count() {
    common::init_logging();
    let config = BuildConfig::text();
    let text = format!("**Q1.** Explain.\n\n{}", common::words(2000));
    let artifact = build_text_document(&config, &text, &[("query", "What is photosynthesis?")])
        .expect("build");

    assert!(artifact.bytes.starts_with(b"%PDF-"));
    assert!(artifact.page_count > 1);
    assert_eq!(pdf_page_count(&artifact.bytes), artifact.page_count);
    assert_eq!(artifact.filename, "What_is_photosynthesis_Answer_Key.pdf");
    assert!(contains(&artifact.bytes, b"/Helvetica-Bold"));
    assert!(contains(&artifact.bytes, b"/Producer"));

    // the dry-run backend paginates identically
    let summary = DocumentAssembler::new(&config)
        .render_text(&mut Recorder::new(), &text)
        .unwrap();
    assert_eq!(summary.page_count, artifact.page_count);
}

#[test]
fn snapshot_build_writes_one_page_per_slice() {
    common::init_logging();
    let config = BuildConfig::snapshot();
    let capture = RgbaImage::from_pixel(800, 6000, Rgba([255, 255, 255, 255]));
    let fields = [
        ("board", "CBSE"),
        ("class", "Class 10"),
        ("subjects", "Maths Science"),
        ("chapter", "Ch1 Real Numbers"),
    ];
    let artifact = build_snapshot_document(&config, &capture, &fields).expect("build");

    let plan = SlicePlan::new(&config.metrics, 800, 6000).unwrap();
    assert_eq!(artifact.page_count, plan.page_count());
    assert_eq!(pdf_page_count(&artifact.bytes), plan.page_count());
    assert_eq!(artifact.filename, "CBSE_Class_10_Maths_Science_Ch1_Real_Numbers.pdf");
    assert!(contains(&artifact.bytes, b"/Subtype /Image"));
    assert!(!contains(&artifact.bytes, b"/SMask"));
}

#[test]
fn translucent_capture_carries_a_soft_mask() {
    let config = BuildConfig::snapshot();
    let capture = RgbaImage::from_pixel(100, 100, Rgba([10, 20, 30, 128]));
    let artifact = DocumentAssembler::new(&config)
        .build_snapshot(&capture, &[])
        .unwrap();
    assert_eq!(artifact.page_count, 1);
    assert!(contains(&artifact.bytes, b"/SMask"));
}

#[test]
fn truetype_fonts_are_embedded_as_subset_cid_fonts() {
    common::init_logging();
    let Some((regular, bold)) = common::system_font_pair() else {
        eprintln!("skipping: no DejaVu or Liberation fonts installed");
        return;
    };
    let full_size = regular.len();
    let mut config = BuildConfig::text();
    config.font = FontSource::TrueType { regular, bold };

    let text = format!(
        "**Caf\u{e9}** cr\u{e8}me \u{2013} na\u{ef}ve \u{2713}\n\n{}",
        common::words(1500)
    );
    let artifact = build_text_document(&config, &text, &[]).expect("build");

    assert!(artifact.bytes.starts_with(b"%PDF-"));
    for needle in [
        &b"/Type0"[..],
        b"/CIDFontType2",
        b"/Identity-H",
        b"/FontFile2",
        b"/ToUnicode",
        b"/W [",
    ] {
        assert!(contains(&artifact.bytes, needle), "missing {}", String::from_utf8_lossy(needle));
    }
    assert!(!contains(&artifact.bytes, b"/Helvetica"));
    // both faces together stay well under one full font program
    assert!(artifact.bytes.len() < full_size, "{} bytes", artifact.bytes.len());

    assert!(artifact.page_count > 1);
    assert_eq!(pdf_page_count(&artifact.bytes), artifact.page_count);

    // dry run measuring with the same embedded metrics paginates identically
    let m = &config.metrics;
    let metrics_source = PdfSurface::new(m.page_width, m.page_height, &config.font).unwrap();
    let mut dry = Recorder::with_measure(move |text, font| {
        metrics_source.measure_text(text, font).unwrap_or(f32::NAN)
    });
    let summary = DocumentAssembler::new(&config)
        .render_text(&mut dry, &text)
        .unwrap();
    assert_eq!(summary.page_count, artifact.page_count);
}

#[test]
fn unreadable_truetype_font_is_rejected() {
    let mut config = BuildConfig::text();
    config.font = FontSource::TrueType {
        regular: b"not a font".to_vec(),
        bold: b"nor this".to_vec(),
    };
    let err = build_text_document(&config, "hello", &[]).unwrap_err();
    assert!(matches!(err, Error::Font(_)));
}

#[test]
fn page_limit_stops_the_pdf_build() {
    let mut config = BuildConfig::text();
    config.metrics.max_pages = Some(1);
    let err = build_text_document(&config, &common::words(5000), &[]).unwrap_err();
    assert!(matches!(err, Error::TooManyPages { limit: 1 }));
}

#[test]
fn filenames_are_sanitized_and_completed() {
    assert_eq!(sanitize_field("  Class 10 / Maths!  "), "_Class_10__Maths_");
    assert_eq!(render_filename("{query}_Answer_Key.pdf", &[]), "_Answer_Key.pdf");
    assert_eq!(render_filename("{query}.pdf", &[("query", "?!")]), "document.pdf");
    assert_eq!(render_filename("report", &[]), "report.pdf");
    assert_eq!(render_filename("a{b", &[]), "a{b.pdf");
    assert_eq!(
        render_filename("{ board }-{missing}", &[("board", "ICSE")]),
        "ICSE-.pdf"
    );
}

#[test]
fn default_config_reserves_bands_inside_a4() {
    for config in [BuildConfig::text(), BuildConfig::snapshot()] {
        let m = config.metrics;
        m.validate().unwrap();
        assert_eq!((m.page_width, m.page_height), (paperflow_pdf::A4_WIDTH, paperflow_pdf::A4_HEIGHT));
        assert!(m.content_top() >= m.margins.top + m.header_height);
        assert!(m.content_bottom() <= m.page_height - m.margins.bottom - m.footer_height);
    }
}
