mod error;
mod filename;
mod fonts;
mod model;
mod pdf;
mod segment;
mod surface;

pub use error::Error;
pub use filename::{render_filename, sanitize_field};
pub use fonts::helvetica_text_width;
pub use model::{
    A4_HEIGHT, A4_WIDTH, BuildConfig, DocumentMetrics, Font, FontSource, FooterBand, FooterLayout,
    HeaderBand, Line, Margins, PageContext, Paragraph, PlacedToken, Slice, TextRun, Token,
};
pub use pdf::{
    Artifact, DocumentAssembler, FlowState, HeaderFooter, PageFlow, PdfSurface, Placement,
    RenderSummary, SlicePlan, SnapshotSource, break_lines, page_label, plan_slices, tokenize,
};
pub use segment::{parse_bold, segment};
pub use surface::{DrawOp, Recorder, Surface};

use std::time::Instant;

/// Render marked-up text to a PDF. `fields` fill the config's filename template.
pub fn build_text_document(
    config: &BuildConfig,
    text: &str,
    fields: &[(&str, &str)],
) -> Result<Artifact, Error> {
    let t0 = Instant::now();
    let artifact = DocumentAssembler::new(config).build_text(text, fields)?;
    log::info!(
        "Timing: text build={:.1}ms (output {} bytes, {} pages, {})",
        t0.elapsed().as_secs_f64() * 1000.0,
        artifact.bytes.len(),
        artifact.page_count,
        artifact.filename,
    );
    Ok(artifact)
}

/// Slice a captured snapshot into a PDF. `fields` fill the config's filename template.
pub fn build_snapshot_document(
    config: &BuildConfig,
    source: &dyn SnapshotSource,
    fields: &[(&str, &str)],
) -> Result<Artifact, Error> {
    let t0 = Instant::now();
    let artifact = DocumentAssembler::new(config).build_snapshot(source, fields)?;
    log::info!(
        "Timing: snapshot build={:.1}ms (output {} bytes, {} pages, {})",
        t0.elapsed().as_secs_f64() * 1000.0,
        artifact.bytes.len(),
        artifact.page_count,
        artifact.filename,
    );
    Ok(artifact)
}
