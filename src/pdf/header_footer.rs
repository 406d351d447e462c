use crate::error::Error;
use crate::model::{DocumentMetrics, Font, FooterBand, FooterLayout, HeaderBand};
use crate::surface::{Surface, checked_measure};

// Visual centre of a Helvetica line sits about this far above the baseline.
const CAP_CENTER_RATIO: f32 = 0.35;

pub fn page_label(page_number: usize, total_pages: usize) -> String {
    format!("Page {page_number} of {total_pages}")
}

/// Draws the fixed header and footer bands reserved by `DocumentMetrics`.
pub struct HeaderFooter<'a> {
    metrics: &'a DocumentMetrics,
    header: &'a HeaderBand,
    footer: &'a FooterBand,
}

impl<'a> HeaderFooter<'a> {
    pub fn new(metrics: &'a DocumentMetrics, header: &'a HeaderBand, footer: &'a FooterBand) -> Self {
        Self {
            metrics,
            header,
            footer,
        }
    }

    fn band_baseline(top: f32, height: f32, font_size: f32) -> f32 {
        top + height / 2.0 + font_size * CAP_CENTER_RATIO
    }

    /// Header band on the current page: optional full-bleed fill plus a centred bold title.
    pub fn draw_header<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), Error> {
        let m = self.metrics;
        let top = m.margins.top;

        if let Some(fill) = self.header.fill {
            surface.fill_rect(0.0, top, m.page_width, m.header_height, fill);
        }
        if self.header.title.is_empty() {
            return Ok(());
        }

        let font = Font::bold(m.header_font_size);
        let w = checked_measure(surface, &self.header.title, font)?;
        surface.set_font(font);
        surface.set_text_color(self.header.color);
        surface.draw_text(
            &self.header.title,
            (m.page_width - w) / 2.0,
            Self::band_baseline(top, m.header_height, m.header_font_size),
        );
        Ok(())
    }

    /// Footer band on the current page. Only called once the page total is known.
    pub fn draw_footer<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        page_number: usize,
        total_pages: usize,
    ) -> Result<(), Error> {
        let m = self.metrics;
        let top = m.page_height - m.margins.bottom - m.footer_height;
        let baseline = Self::band_baseline(top, m.footer_height, m.footer_font_size);
        let font = Font::regular(m.footer_font_size);
        let label = page_label(page_number, total_pages);

        surface.set_font(font);
        surface.set_text_color(self.footer.color);

        match self.footer.layout {
            FooterLayout::Split => {
                if !self.footer.copyright.is_empty() {
                    surface.draw_text(&self.footer.copyright, m.margins.left, baseline);
                }
                let w = checked_measure(surface, &label, font)?;
                surface.draw_text(&label, m.page_width - m.margins.right - w, baseline);
            }
            FooterLayout::Centered => {
                let text = if self.footer.copyright.is_empty() {
                    label
                } else {
                    format!("{} | {label}", self.footer.copyright)
                };
                let w = checked_measure(surface, &text, font)?;
                surface.draw_text(&text, (m.page_width - w) / 2.0, baseline);
            }
        }
        Ok(())
    }
}
