use image::RgbaImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{FontEntry, RefAlloc};
use crate::model::{Font, FontSource};
use crate::surface::Surface;

struct PageRecord {
    content: Content,
    images: Vec<(String, Ref)>,
}

/// Vector backend writing a PDF with pdf-writer.
///
/// Content streams stay in memory until `finish`, so any page can be
/// reopened with `select_page` for the footer pass.
pub struct PdfSurface {
    pdf: Pdf,
    alloc: RefAlloc,
    catalog_id: Ref,
    pages_id: Ref,
    page_width: f32,
    page_height: f32,
    // [regular, bold]
    fonts: [FontEntry; 2],
    pages: Vec<PageRecord>,
    current: usize,
    font: Font,
    color: [u8; 3],
    image_count: usize,
    title: Option<String>,
}

impl PdfSurface {
    pub fn new(page_width: f32, page_height: f32, source: &FontSource) -> Result<Self, Error> {
        let mut pdf = Pdf::new();
        let mut alloc = RefAlloc::new();
        let catalog_id = alloc.bump();
        let pages_id = alloc.bump();

        let regular_ref = alloc.bump();
        let bold_ref = alloc.bump();
        let fonts = match source {
            FontSource::Helvetica => [
                FontEntry::helvetica(&mut pdf, regular_ref, false, "F1".into()),
                FontEntry::helvetica(&mut pdf, bold_ref, true, "F2".into()),
            ],
            FontSource::TrueType { regular, bold } => [
                FontEntry::truetype(regular.clone(), regular_ref, "F1".into(), false)?,
                FontEntry::truetype(bold.clone(), bold_ref, "F2".into(), true)?,
            ],
        };

        Ok(Self {
            pdf,
            alloc,
            catalog_id,
            pages_id,
            page_width,
            page_height,
            fonts,
            pages: Vec::new(),
            current: 0,
            font: Font::regular(12.0),
            color: [0, 0, 0],
            image_count: 0,
            title: None,
        })
    }

    /// Title for the document-info dictionary.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    fn font_entry(&self, bold: bool) -> &FontEntry {
        &self.fonts[usize::from(bold)]
    }

    fn page(&mut self) -> &mut PageRecord {
        if self.pages.is_empty() {
            self.new_page();
        }
        &mut self.pages[self.current]
    }

    // PDF space is bottom-up.
    fn flip(&self, y: f32) -> f32 {
        self.page_height - y
    }

    /// Assemble the catalog, page tree and content streams.
    pub fn finish(mut self) -> Result<Vec<u8>, Error> {
        let t0 = std::time::Instant::now();

        for entry in &self.fonts {
            entry.write_embedded(&mut self.pdf, &mut self.alloc)?;
        }

        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| self.alloc.bump()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| self.alloc.bump()).collect();

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        let font_pairs: Vec<(String, Ref)> = self
            .fonts
            .iter()
            .map(|e| (e.pdf_name.clone(), e.font_ref))
            .collect();

        for (i, record) in self.pages.into_iter().enumerate() {
            let raw = record.content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            self.pdf
                .stream(content_ids[i], &compressed)
                .filter(Filter::FlateDecode);

            let mut page = self.pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, self.page_width, self.page_height))
                .parent(self.pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !record.images.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &record.images {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
                xobjects.finish();
            }
        }

        let info_id = self.alloc.bump();
        let mut info = self.pdf.document_info(info_id);
        if let Some(title) = &self.title {
            info.title(TextStr(title));
        }
        info.producer(TextStr(concat!("paperflow-pdf ", env!("CARGO_PKG_VERSION"))));
        info.finish();

        let bytes = self.pdf.finish();
        log::debug!(
            "pdf: assembled {n} pages, {} images, {} bytes in {:.1}ms",
            self.image_count,
            bytes.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        Ok(bytes)
    }
}

fn rgb_components(rgb: [u8; 3]) -> (f32, f32, f32) {
    (
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    )
}

impl Surface for PdfSurface {
    fn measure_text(&self, text: &str, font: Font) -> Result<f32, Error> {
        Ok(self.font_entry(font.bold).text_width(text, font.size))
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn set_text_color(&mut self, rgb: [u8; 3]) {
        self.color = rgb;
    }

    fn draw_text(&mut self, text: &str, x: f32, baseline: f32) {
        let font = self.font;
        let (r, g, b) = rgb_components(self.color);
        let y = self.flip(baseline);
        let entry = &mut self.fonts[usize::from(font.bold)];
        let bytes = entry.encode(text);
        if bytes.is_empty() {
            return;
        }
        let pdf_name = entry.pdf_name.clone();

        let content = &mut self.page().content;
        content.set_fill_rgb(r, g, b);
        content.begin_text();
        content.set_font(Name(pdf_name.as_bytes()), font.size);
        content.next_line(x, y);
        content.show(Str(&bytes));
        content.end_text();
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rgb: [u8; 3]) {
        let (r, g, b) = rgb_components(rgb);
        let bottom = self.flip(y + height);
        let content = &mut self.page().content;
        content.save_state();
        content.set_fill_rgb(r, g, b);
        content.rect(x, bottom, width, height);
        content.fill_nonzero();
        content.restore_state();
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), Error> {
        let (w, h) = image.dimensions();
        let (Ok(w_i), Ok(h_i)) = (i32::try_from(w), i32::try_from(h)) else {
            return Err(Error::Image(format!("image {w}x{h} is too large")));
        };
        if w == 0 || h == 0 {
            return Err(Error::Image("image has no pixels".into()));
        }

        let has_alpha = image.pixels().any(|p| p.0[3] < 255);
        let rgb_data: Vec<u8> = image
            .pixels()
            .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
            .collect();
        let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

        let smask_ref = if has_alpha {
            let alpha_data: Vec<u8> = image.pixels().map(|p| p.0[3]).collect();
            let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
            let mask_ref = self.alloc.bump();
            let mut mask = self.pdf.image_xobject(mask_ref, &compressed_alpha);
            mask.filter(Filter::FlateDecode);
            mask.width(w_i);
            mask.height(h_i);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            Some(mask_ref)
        } else {
            None
        };

        let xobj_ref = self.alloc.bump();
        {
            let mut xobj = self.pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w_i);
            xobj.height(h_i);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }

        self.image_count += 1;
        let pdf_name = format!("Im{}", self.image_count);
        let bottom = self.flip(y + height);
        let record = self.page();
        record.content.save_state();
        record.content.transform([width, 0.0, 0.0, height, x, bottom]);
        record.content.x_object(Name(pdf_name.as_bytes()));
        record.content.restore_state();
        record.images.push((pdf_name, xobj_ref));
        Ok(())
    }

    fn new_page(&mut self) -> usize {
        self.pages.push(PageRecord {
            content: Content::new(),
            images: Vec::new(),
        });
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
