use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255;

/// `dst = a * (1 - w) + b * w`, with `w` an 8-bit weight (255 = all `b`).
pub fn crossfade_rgb8_into(dst: &mut [u8], a: &[u8], b: &[u8], w: u8) -> ReelResult<()> {
    if dst.len() != a.len() || dst.len() != b.len() || !dst.len().is_multiple_of(3) {
        return Err(ReelError::validation(
            "crossfade_rgb8_into expects equal-length rgb8 buffers",
        ));
    }
    let bw = u16::from(w);
    let aw = 255 - bw;
    for ((d, &a), &b) in dst.iter_mut().zip(a).zip(b) {
        *d = mul_div255(u16::from(a), aw).saturating_add(mul_div255(u16::from(b), bw));
    }
    Ok(())
}

/// `dst = src * level`, i.e. `src` over black at `level` opacity.
pub fn fade_rgb8_into(dst: &mut [u8], src: &[u8], level: u8) -> ReelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(3) {
        return Err(ReelError::validation(
            "fade_rgb8_into expects equal-length rgb8 buffers",
        ));
    }
    let lv = u16::from(level);
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = mul_div255(u16::from(s), lv);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/composite.rs"]
mod tests;
