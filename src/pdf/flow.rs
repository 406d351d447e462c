use crate::error::Error;
use crate::model::{DocumentMetrics, Font, Line, PageContext};
use crate::surface::Surface;

use super::header_footer::HeaderFooter;

const BODY_COLOR: [u8; 3] = [0, 0, 0];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    BeforeFirstPage,
    InPage,
    Done,
}

/// Turns a stream of lines into pages.
///
/// The header is drawn when each page opens. Footers need the final page
/// count, so `finish` revisits every page of the surface's arena afterwards.
pub struct PageFlow<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    metrics: &'a DocumentMetrics,
    chrome: &'a HeaderFooter<'a>,
    ctx: PageContext,
    state: FlowState,
    current_font: Option<Font>,
    // surface index of each page this flow opened
    pages: Vec<usize>,
}

impl<'a, S: Surface + ?Sized> PageFlow<'a, S> {
    pub fn new(surface: &'a mut S, metrics: &'a DocumentMetrics, chrome: &'a HeaderFooter<'a>) -> Self {
        Self {
            surface,
            metrics,
            chrome,
            ctx: PageContext::new(metrics),
            state: FlowState::BeforeFirstPage,
            current_font: None,
            pages: Vec::new(),
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn context(&self) -> &PageContext {
        &self.ctx
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut *self.surface
    }

    /// Open the first page. Content calls do this implicitly.
    pub fn begin(&mut self) -> Result<(), Error> {
        if self.state == FlowState::BeforeFirstPage {
            self.open_page()?;
            self.state = FlowState::InPage;
        }
        Ok(())
    }

    fn open_page(&mut self) -> Result<(), Error> {
        let next = self.ctx.page_number + 1;
        if let Some(limit) = self.metrics.max_pages
            && next > limit
        {
            return Err(Error::TooManyPages { limit });
        }
        let index = self.surface.new_page();
        self.pages.push(index);
        self.ctx.next_page();
        self.chrome.draw_header(&mut *self.surface)?;
        self.surface.set_text_color(BODY_COLOR);
        self.current_font = None;
        log::debug!("flow: opened page {}", self.ctx.page_number);
        Ok(())
    }

    /// Draw one line, breaking to a new page first if it would cross `content_bottom`.
    pub fn push_line(&mut self, line: &Line) -> Result<(), Error> {
        debug_assert!(self.state != FlowState::Done, "push_line after finish");
        self.begin()?;

        let m = self.metrics;
        if self.ctx.cursor_y + m.line_height > self.ctx.content_bottom {
            self.open_page()?;
        }

        let baseline = self.ctx.cursor_y + m.line_height / 2.0 + m.content_font_size * 0.35;
        for token in line.tokens.iter().filter(|t| !t.text.trim().is_empty()) {
            let font = Font {
                bold: token.bold,
                size: m.content_font_size,
            };
            if self.current_font != Some(font) {
                self.surface.set_font(font);
                self.current_font = Some(font);
            }
            self.surface.draw_text(&token.text, m.margins.left + token.x, baseline);
        }

        self.ctx.cursor_y += m.line_pitch();
        Ok(())
    }

    /// Start a fresh page regardless of the cursor; the first call opens page 1.
    /// Used by pipelines that place one block per page.
    pub fn start_page(&mut self) -> Result<(), Error> {
        debug_assert!(self.state != FlowState::Done, "start_page after finish");
        match self.state {
            FlowState::BeforeFirstPage => self.begin(),
            _ => self.open_page(),
        }
    }

    /// Advance by one line pitch without drawing. Never opens a page by itself:
    /// if the gap crosses the bottom, the next line starts the new page.
    pub fn push_blank(&mut self) -> Result<(), Error> {
        debug_assert!(self.state != FlowState::Done, "push_blank after finish");
        self.begin()?;
        self.ctx.cursor_y += self.metrics.line_pitch();
        Ok(())
    }

    /// Close the flow and write every footer with the now known total. Returns the page count.
    pub fn finish(&mut self) -> Result<usize, Error> {
        self.begin()?;
        self.state = FlowState::Done;

        let total = self.pages.len();
        for (i, &index) in self.pages.iter().enumerate() {
            self.surface.select_page(index);
            self.chrome.draw_footer(&mut *self.surface, i + 1, total)?;
        }
        Ok(total)
    }
}
