/// FNV-1a 64-bit hasher.
///
/// Used where a hash must be stable across processes and platforms (placeholder colors), which
/// `std`'s randomly seeded hasher does not guarantee.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= u64::from(b);
            self.0 = self.0.wrapping_mul(Self::PRIME);
        }
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// `round(x * y / 255)` for 8-bit channel math.
pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    ((((u32::from(x) * u32::from(y)) + 127) / 255).min(255)) as u8
}

/// Map `t` in `[0, 1]` to an 8-bit weight.
pub(crate) fn unit_to_u8(t: f64) -> u16 {
    ((t.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
