use std::ops::Range;

/// mask with bits `r.start..=r.end` set. `r.end` is inclusive.
#[inline]
pub const fn bit_range(r: Range<u32>) -> u32 {
    let large: u32 = if r.end != 31 { 1 << (r.end + 1) } else { 0 };
    large.wrapping_sub(1 << r.start)
}

#[inline]
pub const fn mask(bin: u32, r: Range<u32>) -> u32 {
    bin & bit_range(r)
}

/// bits `r.start..=r.end` of `bin`, shifted down to bit 0.
#[inline]
pub const fn extract(bin: u32, r: Range<u32>) -> u32 {
    let left = r.start;
    mask(bin, r) >> left
}
