use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::Error;

/// Sequential object-id allocator for one PDF.
pub(crate) struct RefAlloc {
    next: i32,
}

impl RefAlloc {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn bump(&mut self) -> Ref {
        let r = Ref::new(self.next);
        self.next += 1;
        r
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the code page are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b >= 32)
        .collect()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi bytes 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}

/// Approximate Helvetica-Bold widths, same layout as `helvetica_widths`.
fn helvetica_bold_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,
            33..=47 => 333.0,
            48..=57 => 556.0,
            58..=64 => 333.0,
            73 => 278.0,
            74 => 556.0,
            77 => 833.0,
            87 => 944.0,                    // W
            65..=90 => 722.0,
            91..=96 => 333.0,
            105 | 106 | 108 => 278.0,       // i j l
            102 | 116 | 114 => 333.0,       // f t r
            109 => 889.0,                   // m
            119 => 778.0,                   // w
            97..=122 => 611.0,
            _ => 611.0,
        })
        .collect()
}

static HELVETICA: OnceLock<(Vec<f32>, Vec<f32>)> = OnceLock::new();

fn helvetica_table(bold: bool) -> &'static [f32] {
    let (regular, bold_w) = HELVETICA.get_or_init(|| (helvetica_widths(), helvetica_bold_widths()));
    if bold { bold_w.as_slice() } else { regular.as_slice() }
}

/// Width of `text` in points when set in Helvetica (or Helvetica-Bold).
pub fn helvetica_text_width(text: &str, bold: bool, size: f32) -> f32 {
    let table = helvetica_table(bold);
    to_winansi_bytes(text)
        .iter()
        .map(|&b| table[(b - 32) as usize] * size / 1000.0)
        .sum()
}

/// Glyph data of a parsed TrueType face, kept for measuring and for the
/// subset written when the document is finished.
struct EmbeddedFace {
    data: Vec<u8>,
    ps_name: String,
    // char -> (original glyph id, advance in 1000-units)
    glyphs: HashMap<char, (u16, f32)>,
    remapper: subsetter::GlyphRemapper,
    // char -> remapped glyph id, for ToUnicode and /W
    used: BTreeMap<char, u16>,
}

enum FontKind {
    Standard { widths_1000: &'static [f32] },
    Embedded(Box<EmbeddedFace>),
}

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    kind: FontKind,
}

impl FontEntry {
    /// Standard Type1 Helvetica; the font dictionary is written immediately.
    pub(crate) fn helvetica(pdf: &mut Pdf, font_ref: Ref, bold: bool, pdf_name: String) -> Self {
        let base: &[u8] = if bold { b"Helvetica-Bold" } else { b"Helvetica" };
        pdf.type1_font(font_ref)
            .base_font(Name(base))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        Self {
            pdf_name,
            font_ref,
            kind: FontKind::Standard {
                widths_1000: helvetica_table(bold),
            },
        }
    }

    /// Parse a TrueType/OpenType face. Nothing is written until `write_embedded`.
    pub(crate) fn truetype(data: Vec<u8>, font_ref: Ref, pdf_name: String, bold: bool) -> Result<Self, Error> {
        let t0 = std::time::Instant::now();
        let face = Face::parse(&data, 0).map_err(|e| Error::Font(format!("cannot parse font: {e}")))?;
        let units = face.units_per_em() as f32;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
                subtable.codepoints(|cp| {
                    let Some(ch) = char::from_u32(cp) else {
                        return;
                    };
                    if let Some(gid) = subtable.glyph_index(cp) {
                        let adv = face.glyph_hor_advance(gid).unwrap_or(0) as f32 / units * 1000.0;
                        glyphs.entry(ch).or_insert((gid.0, adv));
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return Err(Error::Font("font has no Unicode cmap".into()));
        }

        let family = font_family_name(&face).unwrap_or_else(|| "Embedded".to_string());
        let mut ps_name = family.replace(' ', "");
        if bold {
            ps_name.push_str("-Bold");
        }

        log::debug!(
            "font: parsed {ps_name} ({} glyphs) in {:.1}ms",
            glyphs.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
        );

        Ok(Self {
            pdf_name,
            font_ref,
            kind: FontKind::Embedded(Box::new(EmbeddedFace {
                data,
                ps_name,
                glyphs,
                remapper: subsetter::GlyphRemapper::new(),
                used: BTreeMap::new(),
            })),
        })
    }

    /// Width of a single character in 1000-units.
    fn char_width_1000(&self, ch: char) -> f32 {
        match &self.kind {
            FontKind::Standard { widths_1000 } => {
                let byte = char_to_winansi(ch);
                if byte >= 32 {
                    widths_1000[(byte - 32) as usize]
                } else {
                    0.0
                }
            }
            FontKind::Embedded(face) => face.glyphs.get(&ch).map_or(0.0, |&(_, w)| w),
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    /// Encode text for a content stream: WinAnsi bytes for standard fonts,
    /// big-endian remapped glyph ids for embedded ones.
    pub(crate) fn encode(&mut self, text: &str) -> Vec<u8> {
        match &mut self.kind {
            FontKind::Standard { .. } => to_winansi_bytes(text),
            FontKind::Embedded(face) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let gid = match face.glyphs.get(&ch) {
                        Some(&(orig, _)) => {
                            let new_gid = face.remapper.remap(orig);
                            face.used.insert(ch, new_gid);
                            new_gid
                        }
                        None => 0,
                    };
                    out.extend_from_slice(&gid.to_be_bytes());
                }
                out
            }
        }
    }

    /// Write the subset font program for embedded faces. No-op for standard fonts.
    pub(crate) fn write_embedded(&self, pdf: &mut Pdf, alloc: &mut RefAlloc) -> Result<(), Error> {
        let FontKind::Embedded(face_data) = &self.kind else {
            return Ok(());
        };
        write_truetype(pdf, self.font_ref, face_data, alloc)
    }
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

/// Embed a TrueType/OpenType font as a CIDFont (Type0 composite) with Identity-H encoding,
/// subset to the glyphs the content streams actually reference.
fn write_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    embedded: &EmbeddedFace,
    alloc: &mut RefAlloc,
) -> Result<(), Error> {
    let face = Face::parse(&embedded.data, 0).map_err(|e| Error::Font(e.to_string()))?;
    let units = face.units_per_em() as f32;
    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    let subset_data = subsetter::subset(&embedded.data, 0, &embedded.remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {}: {e}, embedding full font", embedded.ps_name);
        embedded.data.clone()
    });

    let descriptor_ref = alloc.bump();
    let data_ref = alloc.bump();
    let cid_font_ref = alloc.bump();
    let tounicode_ref = alloc.bump();

    let data_len = i32::try_from(subset_data.len())
        .map_err(|_| Error::Font(format!("{} is too large to embed", embedded.ps_name)))?;
    pdf.stream(data_ref, &subset_data)
        .pair(Name(b"Length1"), data_len);

    let ps_name = embedded.ps_name.as_bytes();
    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        let mut gid_widths: Vec<(u16, f32)> = embedded
            .used
            .iter()
            .filter_map(|(ch, &new_gid)| embedded.glyphs.get(ch).map(|&(_, w)| (new_gid, w)))
            .collect();
        gid_widths.sort_by_key(|&(gid, _)| gid);
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{}-UTF16", embedded.ps_name);
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&ch, &new_gid) in &embedded.used {
        cmap.pair(new_gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    log::debug!(
        "font: embedded {} with {} glyphs ({} bytes)",
        embedded.ps_name,
        embedded.used.len(),
        subset_data.len()
    );
    Ok(())
}
