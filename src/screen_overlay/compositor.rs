use super::{BYTES_PER_PIXEL, Surface, shape::Shape};

/// ORs `shape` into `target`, centered on `(anchor_x, anchor_y)`.
///
/// The sprite box is clipped on every edge; whatever falls outside the
/// surface is skipped, so any anchor is safe. Overlapping discs merge
/// bitwise instead of blending.
pub fn composite(target: &mut Surface<'_>, shape: &Shape, anchor_x: i32, anchor_y: i32) {
    let half = i64::from(shape.diameter() / 2);
    let (width, height) = (i64::from(target.width()), i64::from(target.height()));

    // sprite origin in surface coordinates
    let left = i64::from(anchor_x) - half;
    let top = i64::from(anchor_y) - half;

    let x0 = left.max(0);
    let x1 = (i64::from(anchor_x) + half).min(width);
    let y0 = top.max(0);
    let y1 = (i64::from(anchor_y) + half).min(height);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let src_x0 = (x0 - left) as usize;
    let span = (x1 - x0) as usize;
    for y in y0..y1 {
        let src = &shape.row((y - top) as u32)[src_x0..src_x0 + span];
        let row = target.row_mut(y as u32);
        let dst = &mut row[x0 as usize * BYTES_PER_PIXEL..x1 as usize * BYTES_PER_PIXEL];
        for (px, &s) in dst.chunks_exact_mut(BYTES_PER_PIXEL).zip(src) {
            let d = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&(d | s).to_ne_bytes());
        }
    }
}
