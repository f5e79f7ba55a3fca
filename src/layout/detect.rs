use rayon::prelude::*;

use crate::foundation::core::{Canvas, LayoutType, Rect, SlotRect};
use crate::layout::geometry::{SLOT_ASPECT, expand_by_shorter_side, fit_aspect_centered, snap_to_canvas};
use crate::render::surface::CanvasRGBA;

/// Pixels with alpha below this are treated as see-through.
pub const ALPHA_THRESHOLD: u8 = 22;
/// Bands shorter than this many rows are noise.
pub const MIN_BAND_HEIGHT: u32 = 12;
/// Bands separated by at most this many rows are one slot.
pub const MAX_MERGE_GAP: u32 = 20;
/// Margin added around each fitted slot, as a fraction of its shorter side.
pub const SLOT_MARGIN_FRAC: f64 = 0.02;

/// Tunables for [`detect_slots`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DetectOpts {
    /// Alpha strictly below this counts as transparent.
    pub alpha_threshold: u8,
    /// Fraction of the row width that must be transparent for the row to count.
    pub min_row_fraction: f64,
    /// Shortest band kept after grouping rows.
    pub min_band_height: u32,
    /// Largest row gap bridged when merging bands.
    pub max_merge_gap: u32,
    /// Margin around each fitted slot.
    pub margin_frac: f64,
}

impl DetectOpts {
    /// Defaults for `layout`. Narrow layouts use a lower row fraction because their slot
    /// windows cover proportionally less of each row.
    pub fn for_layout(layout: LayoutType) -> Self {
        let min_row_fraction = match layout {
            LayoutType::TwoSlot => 0.40,
            LayoutType::ThreeSlot | LayoutType::FourSlot => 0.28,
        };
        Self {
            alpha_threshold: ALPHA_THRESHOLD,
            min_row_fraction,
            min_band_height: MIN_BAND_HEIGHT,
            max_merge_gap: MAX_MERGE_GAP,
            margin_frac: SLOT_MARGIN_FRAC,
        }
    }
}

/// Half-open run of transparent rows `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    /// First row.
    pub start: u32,
    /// One past the last row.
    pub end: u32,
}

impl Band {
    /// Number of rows.
    pub fn height(self) -> u32 {
        self.end - self.start
    }

    /// Middle row.
    pub fn mid(self) -> u32 {
        self.start + (self.height().saturating_sub(1)) / 2
    }
}

/// Find up to `expected` transparent photo slots in a rasterized frame.
///
/// Returns slots ordered top to bottom. A result shorter than `expected` means detection
/// failed; it is never an error.
#[tracing::instrument(skip(frame, opts), fields(width = frame.width, height = frame.height))]
pub fn detect_slots(frame: &CanvasRGBA, expected: usize, opts: &DetectOpts) -> Vec<SlotRect> {
    if expected == 0 || frame.width == 0 || frame.height == 0 {
        return Vec::new();
    }
    let canvas = Canvas {
        width: frame.width,
        height: frame.height,
    };

    let counts = transparent_row_counts(&frame.data, frame.width, opts.alpha_threshold);
    let min_count = f64::from(frame.width) * opts.min_row_fraction;
    let rows: Vec<bool> = counts.iter().map(|&c| f64::from(c) >= min_count).collect();

    let bands = find_bands(&rows, opts.min_band_height);
    let merged = merge_bands(&bands, opts.max_merge_gap);
    let kept = select_bands(&merged, expected);
    tracing::debug!(
        bands = bands.len(),
        merged = merged.len(),
        kept = kept.len(),
        "scanned frame rows"
    );

    kept.into_iter()
        .filter_map(|band| {
            let (left, right) =
                horizontal_extent(&frame.data, frame.width, band, opts.alpha_threshold)?;
            let bounds = Rect::new(
                f64::from(left),
                f64::from(band.start),
                f64::from(right + 1),
                f64::from(band.end),
            );
            let fitted = fit_aspect_centered(bounds, SLOT_ASPECT);
            snap_to_canvas(expand_by_shorter_side(fitted, opts.margin_frac), canvas)
        })
        .collect()
}

/// Count near-transparent pixels in every row.
pub(crate) fn transparent_row_counts(data: &[u8], width: u32, threshold: u8) -> Vec<u32> {
    let row_bytes = (width as usize) * 4;
    if row_bytes == 0 {
        return Vec::new();
    }
    data.par_chunks_exact(row_bytes)
        .map(|row| {
            row.chunks_exact(4)
                .filter(|px| px[3] < threshold)
                .count() as u32
        })
        .collect()
}

/// Group consecutive `true` rows into bands, dropping bands shorter than `min_height`.
pub(crate) fn find_bands(rows: &[bool], min_height: u32) -> Vec<Band> {
    let mut out = Vec::new();
    let mut start: Option<u32> = None;
    for (y, &transparent) in rows.iter().enumerate() {
        let y = y as u32;
        match (transparent, start) {
            (true, None) => start = Some(y),
            (false, Some(s)) => {
                push_band(&mut out, Band { start: s, end: y }, min_height);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        push_band(
            &mut out,
            Band {
                start: s,
                end: rows.len() as u32,
            },
            min_height,
        );
    }
    out
}

fn push_band(out: &mut Vec<Band>, band: Band, min_height: u32) {
    if band.height() >= min_height {
        out.push(band);
    }
}

/// Merge neighbouring bands whose gap is at most `max_gap` rows. Input must be sorted by `start`.
pub(crate) fn merge_bands(bands: &[Band], max_gap: u32) -> Vec<Band> {
    let mut out: Vec<Band> = Vec::with_capacity(bands.len());
    for &band in bands {
        match out.last_mut() {
            Some(prev) if band.start.saturating_sub(prev.end) <= max_gap => {
                prev.end = prev.end.max(band.end);
            }
            _ => out.push(band),
        }
    }
    out
}

/// Keep the `n` tallest bands (earlier band wins ties) and return them top to bottom.
pub(crate) fn select_bands(bands: &[Band], n: usize) -> Vec<Band> {
    let mut ranked = bands.to_vec();
    ranked.sort_by(|a, b| b.height().cmp(&a.height()).then(a.start.cmp(&b.start)));
    ranked.truncate(n);
    ranked.sort_by_key(|b| b.start);
    ranked
}

/// Leftmost and rightmost transparent column of `band`.
///
/// Uses the band's middle row; falls back to the union over all rows when the middle row has
/// no transparent pixel, which happens when a merge bridged a decoration.
fn horizontal_extent(data: &[u8], width: u32, band: Band, threshold: u8) -> Option<(u32, u32)> {
    let row_extent = |y: u32| -> Option<(u32, u32)> {
        let row_bytes = (width as usize) * 4;
        let start = (y as usize) * row_bytes;
        let row = data.get(start..start + row_bytes)?;
        let mut cols = row
            .chunks_exact(4)
            .enumerate()
            .filter(|(_, px)| px[3] < threshold)
            .map(|(x, _)| x as u32);
        let first = cols.next()?;
        let last = cols.last().unwrap_or(first);
        Some((first, last))
    };

    if let Some(ext) = row_extent(band.mid()) {
        return Some(ext);
    }
    (band.start..band.end)
        .filter_map(row_extent)
        .reduce(|(l0, r0), (l1, r1)| (l0.min(l1), r0.max(r1)))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/detect.rs"]
mod tests;
