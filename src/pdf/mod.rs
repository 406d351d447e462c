mod flow;
mod header_footer;
mod layout;
mod slice;
mod surface;

use std::time::Instant;

use image::imageops;

use crate::error::Error;
use crate::filename::render_filename;
use crate::model::{BuildConfig, Font, Line, Paragraph, Slice};
use crate::segment::segment;
use crate::surface::{Surface, checked_measure};

pub use flow::{FlowState, PageFlow};
pub use header_footer::{HeaderFooter, page_label};
pub use layout::{break_lines, tokenize};
pub use slice::{Placement, SlicePlan, SnapshotSource, plan_slices};
pub use surface::PdfSurface;

/// A finished build: PDF bytes plus the suggested filename.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
}

/// What a pipeline laid out, independent of the backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderSummary {
    pub page_count: usize,
    /// Text lines drawn (text pipeline).
    pub line_count: usize,
    /// Source strips placed, one per page (snapshot pipeline).
    pub slices: Vec<Slice>,
}

enum LaidOut {
    Blank,
    Lines(Vec<Line>),
}

/// Drives either pipeline end to end for one `BuildConfig`.
pub struct DocumentAssembler<'a> {
    config: &'a BuildConfig,
}

impl<'a> DocumentAssembler<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self { config }
    }

    /// Segment, break and paginate `text` onto `surface`.
    pub fn render_text<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        text: &str,
    ) -> Result<RenderSummary, Error> {
        let t0 = Instant::now();
        let m = &self.config.metrics;
        m.validate()?;

        let paragraphs = segment(text);
        let t_segment = t0.elapsed();

        // Lay everything out before drawing so a measurement failure aborts
        // the build with nothing painted.
        let max_width = m.content_width();
        let mut laid_out = Vec::with_capacity(paragraphs.len());
        for para in &paragraphs {
            let item = match para {
                Paragraph::Blank => LaidOut::Blank,
                Paragraph::Runs(runs) => {
                    let lines = break_lines(runs, max_width, |text, bold| {
                        let font = Font {
                            bold,
                            size: m.content_font_size,
                        };
                        checked_measure(&*surface, text, font)
                    })?;
                    if lines.is_empty() {
                        LaidOut::Blank
                    } else {
                        LaidOut::Lines(lines)
                    }
                }
            };
            laid_out.push(item);
        }
        let t_layout = t0.elapsed();

        let chrome = HeaderFooter::new(m, &self.config.header, &self.config.footer);
        let mut flow = PageFlow::new(surface, m, &chrome);
        flow.begin()?;
        let mut line_count = 0;
        for item in &laid_out {
            match item {
                LaidOut::Blank => flow.push_blank()?,
                LaidOut::Lines(lines) => {
                    for line in lines {
                        flow.push_line(line)?;
                        line_count += 1;
                    }
                }
            }
        }
        let page_count = flow.finish()?;
        let t_paint = t0.elapsed();

        log::info!(
            "Text phases: segment={:.1}ms, layout={:.1}ms, paint={:.1}ms ({} paragraphs, {line_count} lines, {page_count} pages)",
            t_segment.as_secs_f64() * 1000.0,
            (t_layout - t_segment).as_secs_f64() * 1000.0,
            (t_paint - t_layout).as_secs_f64() * 1000.0,
            paragraphs.len(),
        );

        Ok(RenderSummary {
            page_count,
            line_count,
            slices: Vec::new(),
        })
    }

    /// Slice the snapshot into page-height strips and place one per page.
    pub fn render_snapshot<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        source: &dyn SnapshotSource,
    ) -> Result<RenderSummary, Error> {
        let t0 = Instant::now();
        let m = &self.config.metrics;
        m.validate()?;

        let image = source
            .snapshot()
            .ok_or_else(|| Error::Capture("snapshot unavailable".into()))?;
        let (width, height) = image.dimensions();
        let plan = SlicePlan::new(m, width, height)?;
        let t_plan = t0.elapsed();

        let chrome = HeaderFooter::new(m, &self.config.header, &self.config.footer);
        let mut flow = PageFlow::new(surface, m, &chrome);
        for slice in &plan.slices {
            flow.start_page()?;
            let at = plan.placement(m, slice);
            let strip = imageops::crop_imm(image, 0, slice.source_y_offset, width, slice.height_px).to_image();
            flow.surface_mut().draw_image(&strip, at.x, at.y, at.width, at.height)?;
        }
        let page_count = flow.finish()?;
        let t_paint = t0.elapsed();

        log::info!(
            "Snapshot phases: plan={:.1}ms, paint={:.1}ms ({width}x{height}px, raw slice {}px, {page_count} pages)",
            t_plan.as_secs_f64() * 1000.0,
            (t_paint - t_plan).as_secs_f64() * 1000.0,
            plan.raw_slice_height,
        );

        Ok(RenderSummary {
            page_count,
            line_count: 0,
            slices: plan.slices,
        })
    }

    fn pdf_surface(&self) -> Result<PdfSurface, Error> {
        let m = &self.config.metrics;
        Ok(PdfSurface::new(m.page_width, m.page_height, &self.config.font)?
            .with_title(self.config.title.clone()))
    }

    /// Text pipeline into a PDF artifact.
    pub fn build_text(&self, text: &str, fields: &[(&str, &str)]) -> Result<Artifact, Error> {
        let mut surface = self.pdf_surface()?;
        let summary = self.render_text(&mut surface, text)?;
        Ok(Artifact {
            bytes: surface.finish()?,
            filename: render_filename(&self.config.filename_template, fields),
            page_count: summary.page_count,
        })
    }

    /// Snapshot pipeline into a PDF artifact.
    pub fn build_snapshot(
        &self,
        source: &dyn SnapshotSource,
        fields: &[(&str, &str)],
    ) -> Result<Artifact, Error> {
        let mut surface = self.pdf_surface()?;
        let summary = self.render_snapshot(&mut surface, source)?;
        Ok(Artifact {
            bytes: surface.finish()?,
            filename: render_filename(&self.config.filename_template, fields),
            page_count: summary.page_count,
        })
    }
}
