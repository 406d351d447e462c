use image::RgbaImage;

use crate::error::Error;
use crate::model::{DocumentMetrics, Slice};

/// Something that can hand over a captured page snapshot.
///
/// `None` means the capture is unavailable; the build then fails with
/// `Error::Capture` and is not retried.
pub trait SnapshotSource {
    fn snapshot(&self) -> Option<&RgbaImage>;
}

impl SnapshotSource for RgbaImage {
    fn snapshot(&self) -> Option<&RgbaImage> {
        Some(self)
    }
}

impl<T: SnapshotSource> SnapshotSource for Option<T> {
    fn snapshot(&self) -> Option<&RgbaImage> {
        self.as_ref().and_then(|s| s.snapshot())
    }
}

impl<T: SnapshotSource + ?Sized> SnapshotSource for &T {
    fn snapshot(&self) -> Option<&RgbaImage> {
        (**self).snapshot()
    }
}

/// Cut `source_height` rows into page slices.
///
/// Every page but the last takes `raw_slice_height - buffer_px` rows so a
/// line of text sitting on a raw boundary is less likely to be bisected; the
/// last page takes whatever remains. Offsets are cumulative, so the slices
/// are contiguous and their heights sum to `source_height`.
pub fn plan_slices(
    source_height: u32,
    raw_slice_height: u32,
    buffer_px: u32,
) -> Result<Vec<Slice>, Error> {
    if source_height == 0 {
        return Err(Error::Capture("snapshot has zero height".into()));
    }
    if raw_slice_height <= buffer_px {
        return Err(Error::InvalidMetrics(format!(
            "slice buffer {buffer_px}px leaves nothing of a {raw_slice_height}px page slice"
        )));
    }

    let total = source_height.div_ceil(raw_slice_height);
    let step = raw_slice_height - buffer_px;
    let mut slices = Vec::with_capacity(total as usize);
    for page in 0..total - 1 {
        slices.push(Slice {
            source_y_offset: page * step,
            height_px: step,
        });
    }
    let last_offset = (total - 1) * step;
    slices.push(Slice {
        source_y_offset: last_offset,
        height_px: source_height - last_offset,
    });
    Ok(slices)
}

/// Mapping of one snapshot onto the content band.
#[derive(Clone, Debug, PartialEq)]
pub struct SlicePlan {
    /// Points per source pixel.
    pub scale_factor: f32,
    /// Source rows that fill one content band exactly.
    pub raw_slice_height: u32,
    pub slices: Vec<Slice>,
}

impl SlicePlan {
    pub fn new(metrics: &DocumentMetrics, source_width: u32, source_height: u32) -> Result<Self, Error> {
        if source_width == 0 || source_height == 0 {
            return Err(Error::Capture(format!(
                "snapshot is empty ({source_width}x{source_height})"
            )));
        }
        let scale_factor = metrics.content_width() / source_width as f32;
        let raw_slice_height = ((metrics.content_height() / scale_factor).floor() as u32).max(1);

        let pages = source_height.div_ceil(raw_slice_height) as usize;
        if let Some(limit) = metrics.max_pages
            && pages > limit
        {
            return Err(Error::TooManyPages { limit });
        }

        let slices = plan_slices(source_height, raw_slice_height, metrics.slice_buffer_px)?;
        log::debug!(
            "slice: {source_width}x{source_height}px, scale {scale_factor:.4}pt/px, raw slice {raw_slice_height}px, {} pages",
            slices.len()
        );
        Ok(Self {
            scale_factor,
            raw_slice_height,
            slices,
        })
    }

    pub fn page_count(&self) -> usize {
        self.slices.len()
    }

    /// Where `slice` lands on its page.
    ///
    /// A strip taller than the content band (the last slice collects every
    /// earlier page's buffer rows) is shrunk uniformly to the band height and
    /// centred, so none of its rows fall off the page.
    pub fn placement(&self, metrics: &DocumentMetrics, slice: &Slice) -> Placement {
        let natural = slice.height_px as f32 * self.scale_factor;
        let band = metrics.content_height();
        let (width, height) = if natural > band {
            log::debug!(
                "slice: {}px strip is {natural:.1}pt tall, shrunk to the {band:.1}pt band",
                slice.height_px
            );
            (metrics.content_width() * band / natural, band)
        } else {
            (metrics.content_width(), natural)
        };
        Placement {
            x: metrics.margins.left + (metrics.content_width() - width) / 2.0,
            y: metrics.content_top(),
            width,
            height,
        }
    }
}

/// Top-down page rectangle of one placed strip, in points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}
