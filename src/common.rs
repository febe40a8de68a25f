//! Shared numeric and decode-array utilities used by every color-space
//! family (`spec.md` §4.9, §9 "Clamped byte semantics").

#[cfg(feature = "logging")]
use log::warn;

/// Clamp a float to `[0, 255]`, rounding to nearest, and truncate to `u8`.
///
/// Every destination buffer in this crate is a "clamped byte container" per
/// `spec.md` §4.1 and §9: Rust has no native saturating-on-write byte type
/// (unlike JavaScript's `Uint8ClampedArray`, which the algorithms here were
/// originally specified against), so every write clamps explicitly. NaN
/// clamps to 0, matching `Uint8ClampedArray`'s behavior for non-finite input.
#[inline]
pub fn clamp_byte(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Write a clamped byte at `dest[idx]`.
#[inline]
pub fn write_clamped(dest: &mut [u8], idx: usize, value: f32) {
    dest[idx] = clamp_byte(value);
}

/// The scale factor that turns an integer sample in `[0, 2^bits - 1]` into
/// `[0, 1]`.
#[inline]
pub fn unit_scale(bits: u8) -> f32 {
    1.0 / max_sample_value(bits)
}

/// The maximum representable integer sample value for `bits` bits per
/// component, as a float (`2^bits - 1`).
#[inline]
pub fn max_sample_value(bits: u8) -> f32 {
    ((1u32 << bits) - 1) as f32
}

/// The number of source bytes one sample occupies for a given bit depth.
///
/// Samples at 1, 2, 4, or 8 bits per component are assumed pre-expanded to
/// one byte each (value still in `[0, 2^bits-1]`, not rescaled) by whatever
/// unpacked the original bit-packed image rows; 16-bit samples occupy two
/// consecutive big-endian bytes, matching how multi-byte PDF image samples
/// are laid out on the wire.
#[inline]
pub fn sample_stride(bits: u8) -> usize {
    if bits == 16 { 2 } else { 1 }
}

/// Read one raw integer sample of `bits` bits per component from `src` at
/// `offset` (measured in bytes via [`sample_stride`]).
#[inline]
pub fn read_sample(src: &[u8], offset: usize, bits: u8) -> u32 {
    if bits == 16 {
        u32::from(src[offset]) << 8 | u32::from(src[offset + 1])
    } else {
        u32::from(src[offset])
    }
}

/// The common `isDefaultDecode` rule (`spec.md` §4.9): a decode array is
/// "default" if it is absent, the wrong length (which is logged as a
/// warning and still treated as default), or every `(min, max)` pair is
/// exactly `(0, 1)`.
pub fn is_default_decode(decode: Option<&[f32]>, num_comps: usize) -> bool {
    let Some(decode) = decode else {
        return true;
    };

    if decode.len() != 2 * num_comps {
        #[cfg(feature = "logging")]
        warn!(
            "decode array has length {} but expected {} for {num_comps} components",
            decode.len(),
            2 * num_comps
        );

        return true;
    }

    decode.chunks_exact(2).all(|pair| pair[0] == 0.0 && pair[1] == 1.0)
}
