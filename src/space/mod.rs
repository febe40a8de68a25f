//! The polymorphic color-space interface (`spec.md` §3, §4.1, §9).
//!
//! [`ColorSpace`] is a cheaply-cloneable handle (an [`Arc`] around a tagged
//! variant) rather than a trait object, mirroring the teacher's own
//! `ColorSpace(Arc<ColorSpaceType>)` design in `hayro_interpret::color`: the
//! nine families differ enough in per-instance state (CalRGB's matrices,
//! Indexed's owned palette, Alternate's tint function) that a method table
//! over an enum reads more plainly here than a trait object would, and
//! `Arc` sharing is what lets the parser's cache hand out the same instance
//! to every caller that resolves the same indirect reference.

mod alternate;
mod calibrated;
mod device;
mod indexed;
mod lab;
mod pattern;

pub use alternate::Alternate;
pub use calibrated::{CalGray, CalRgb};
pub use indexed::Indexed;
pub use lab::Lab;
pub use pattern::Pattern;

use crate::common::is_default_decode;
use crate::resize::nearest_neighbor_resize;
use smallvec::{SmallVec, smallvec};
use std::sync::{Arc, OnceLock};

/// One of the nine families a [`ColorSpace`] can be (`spec.md` §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpaceName {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    CalGray,
    CalRgb,
    Lab,
    Indexed,
    Pattern,
    Alternate,
}

#[derive(Debug, Clone)]
enum ColorSpaceKind {
    DeviceGray,
    DeviceRgb,
    DeviceCmyk,
    CalGray(CalGray),
    CalRgb(CalRgb),
    Lab(Lab),
    Indexed(Indexed),
    Alternate(Alternate),
    Pattern(Pattern),
}

/// A fully constructed, immutable PDF color space.
///
/// Cloning is a reference-count bump: every composite space (`Indexed`,
/// `Alternate`, `Pattern`) holds its base as a `ColorSpace`, and the parser's
/// cache hands out clones of the same `Arc` to every caller that resolves an
/// indirect reference or resource name to the same underlying object.
#[derive(Debug, Clone)]
pub struct ColorSpace(Arc<ColorSpaceKind>);

impl ColorSpace {
    fn from_kind(kind: ColorSpaceKind) -> Self {
        Self(Arc::new(kind))
    }

    /// The `DeviceGray` singleton space (`spec.md` §4.15): created at most
    /// once per process and handed out by reference-count bump thereafter.
    pub fn device_gray() -> Self {
        static SINGLETON: OnceLock<ColorSpace> = OnceLock::new();
        SINGLETON.get_or_init(|| Self::from_kind(ColorSpaceKind::DeviceGray)).clone()
    }

    /// The `DeviceRGB` singleton space.
    pub fn device_rgb() -> Self {
        static SINGLETON: OnceLock<ColorSpace> = OnceLock::new();
        SINGLETON.get_or_init(|| Self::from_kind(ColorSpaceKind::DeviceRgb)).clone()
    }

    /// The `DeviceCMYK` singleton space.
    pub fn device_cmyk() -> Self {
        static SINGLETON: OnceLock<ColorSpace> = OnceLock::new();
        SINGLETON.get_or_init(|| Self::from_kind(ColorSpaceKind::DeviceCmyk)).clone()
    }

    pub(crate) fn cal_gray(cal: CalGray) -> Self {
        Self::from_kind(ColorSpaceKind::CalGray(cal))
    }

    pub(crate) fn cal_rgb(cal: CalRgb) -> Self {
        Self::from_kind(ColorSpaceKind::CalRgb(cal))
    }

    pub(crate) fn lab(lab: Lab) -> Self {
        Self::from_kind(ColorSpaceKind::Lab(lab))
    }

    pub(crate) fn indexed(indexed: Indexed) -> Self {
        Self::from_kind(ColorSpaceKind::Indexed(indexed))
    }

    pub(crate) fn alternate(alternate: Alternate) -> Self {
        Self::from_kind(ColorSpaceKind::Alternate(alternate))
    }

    /// Build a `Pattern` space around an optional underlying color space.
    pub fn pattern(base: Option<ColorSpace>) -> Self {
        Self::from_kind(ColorSpaceKind::Pattern(Pattern::new(base)))
    }

    /// This space's family name.
    pub fn name(&self) -> ColorSpaceName {
        match self.0.as_ref() {
            ColorSpaceKind::DeviceGray => ColorSpaceName::DeviceGray,
            ColorSpaceKind::DeviceRgb => ColorSpaceName::DeviceRgb,
            ColorSpaceKind::DeviceCmyk => ColorSpaceName::DeviceCmyk,
            ColorSpaceKind::CalGray(_) => ColorSpaceName::CalGray,
            ColorSpaceKind::CalRgb(_) => ColorSpaceName::CalRgb,
            ColorSpaceKind::Lab(_) => ColorSpaceName::Lab,
            ColorSpaceKind::Indexed(_) => ColorSpaceName::Indexed,
            ColorSpaceKind::Alternate(_) => ColorSpaceName::Alternate,
            ColorSpaceKind::Pattern(_) => ColorSpaceName::Pattern,
        }
    }

    /// The number of input components per sample.
    pub fn num_comps(&self) -> usize {
        match self.0.as_ref() {
            ColorSpaceKind::DeviceGray | ColorSpaceKind::CalGray(_) | ColorSpaceKind::Indexed(_) => 1,
            ColorSpaceKind::DeviceRgb | ColorSpaceKind::CalRgb(_) | ColorSpaceKind::Lab(_) => 3,
            ColorSpaceKind::DeviceCmyk => 4,
            ColorSpaceKind::Alternate(a) => a.num_comps(),
            // Not a valid image color space; n/a per the glossary.
            ColorSpaceKind::Pattern(_) => 0,
        }
    }

    /// `true` for every space except Lab.
    pub fn uses_zero_to_one_range(&self) -> bool {
        !matches!(self.0.as_ref(), ColorSpaceKind::Lab(_))
    }

    /// The implicit default sample value for this space (`spec.md`
    /// GLOSSARY, "Default sample").
    pub fn default_sample(&self) -> SmallVec<[f32; 4]> {
        match self.0.as_ref() {
            ColorSpaceKind::DeviceGray | ColorSpaceKind::CalGray(_) | ColorSpaceKind::Indexed(_) => {
                smallvec![0.0]
            }
            ColorSpaceKind::DeviceRgb | ColorSpaceKind::CalRgb(_) | ColorSpaceKind::Lab(_) => {
                smallvec![0.0, 0.0, 0.0]
            }
            ColorSpaceKind::DeviceCmyk => smallvec![0.0, 0.0, 0.0, 1.0],
            ColorSpaceKind::Alternate(a) => smallvec![1.0; a.num_comps()],
            ColorSpaceKind::Pattern(p) => {
                p.base().map(|b| b.default_sample()).unwrap_or_default()
            }
        }
    }

    /// Default `false`; `DeviceRGB` returns `true` when `bits == 8`.
    pub fn is_passthrough(&self, bits: u8) -> bool {
        matches!(self.0.as_ref(), ColorSpaceKind::DeviceRgb) && device::rgb_is_passthrough(bits)
    }

    /// `spec.md` §4.1/§4.9; Indexed, Lab, and Pattern override the common
    /// rule.
    pub fn is_default_decode(&self, decode: Option<&[f32]>, bpc: u8) -> bool {
        match self.0.as_ref() {
            ColorSpaceKind::Lab(_) => true,
            ColorSpaceKind::Indexed(_) => indexed::is_default_decode(decode, bpc),
            ColorSpaceKind::Pattern(_) => true,
            _ => is_default_decode(decode, self.num_comps()),
        }
    }

    /// Size in bytes required to hold the conversion output.
    pub fn get_output_length(&self, input_length: usize, alpha01: u8) -> usize {
        match self.0.as_ref() {
            ColorSpaceKind::Indexed(i) => i.get_output_length(input_length, alpha01),
            ColorSpaceKind::Alternate(a) => a.get_output_length(input_length, alpha01),
            _ => (input_length / self.num_comps().max(1)) * (3 + alpha01 as usize),
        }
    }

    /// Write one clamped RGB triple at `dest[dest_offset..+3]`. `src` holds
    /// `num_comps()` components already in this space's native numeric
    /// domain (`[0,1]` for every zero-to-one-range family, Lab's own
    /// `L`/`a`/`b` ranges for Lab, a raw palette index for Indexed).
    pub fn get_rgb_item(&self, src: &[f32], dest: &mut [u8], dest_offset: usize) {
        match self.0.as_ref() {
            ColorSpaceKind::DeviceGray => device::gray_item(src[0], dest, dest_offset),
            ColorSpaceKind::DeviceRgb => device::rgb_item(src, dest, dest_offset),
            ColorSpaceKind::DeviceCmyk => device::cmyk_item(src, dest, dest_offset),
            ColorSpaceKind::CalGray(c) => c.item(src[0], dest, dest_offset),
            ColorSpaceKind::CalRgb(c) => c.item(src, dest, dest_offset),
            ColorSpaceKind::Lab(l) => l.item(src, dest, dest_offset),
            ColorSpaceKind::Indexed(i) => i.item(src[0], dest, dest_offset),
            ColorSpaceKind::Alternate(a) => a.item(src, dest, dest_offset),
            ColorSpaceKind::Pattern(_) => {
                unreachable!("Pattern has no sample conversion (spec.md §4.11, §7)")
            }
        }
    }

    /// Allocate and return a clamped RGB triple for one sample.
    pub fn get_rgb(&self, src: &[f32]) -> [u8; 3] {
        let mut dest = [0u8; 3];
        self.get_rgb_item(src, &mut dest, 0);
        dest
    }

    /// Convert `count` raw integer samples. `bits` is the input
    /// bits-per-component; `alpha01` is the number of destination bytes to
    /// skip after each RGB triple.
    pub fn get_rgb_buffer(
        &self,
        src: &[u8],
        src_offset: usize,
        count: usize,
        dest: &mut [u8],
        dest_offset: usize,
        bits: u8,
        alpha01: u8,
    ) {
        match self.0.as_ref() {
            ColorSpaceKind::DeviceGray => {
                device::gray_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpaceKind::DeviceRgb => {
                device::rgb_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpaceKind::DeviceCmyk => {
                device::cmyk_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpaceKind::CalGray(c) => {
                scalar_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01, 1, |s, d, o| {
                    c.item(s[0], d, o)
                })
            }
            ColorSpaceKind::CalRgb(c) => {
                scalar_buffer(src, src_offset, count, dest, dest_offset, bits, alpha01, 3, |s, d, o| {
                    c.item(s, d, o)
                })
            }
            ColorSpaceKind::Lab(l) => lab::buffer(l, src, src_offset, count, dest, dest_offset, bits, alpha01),
            ColorSpaceKind::Indexed(i) => {
                i.buffer(src, src_offset, count, dest, dest_offset, alpha01)
            }
            ColorSpaceKind::Alternate(a) => {
                a.buffer(src, src_offset, count, dest, dest_offset, bits, alpha01)
            }
            ColorSpaceKind::Pattern(_) => {
                unreachable!("Pattern has no sample conversion (spec.md §4.11, §7)")
            }
        }
    }

    /// Image-fill orchestration (`spec.md` §4.12): convert a whole decoded
    /// image, optionally through a color-map fast path, optionally resizing
    /// into the target dimensions.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_rgb(
        &self,
        dest: &mut [u8],
        comps: &[u8],
        ow: usize,
        oh: usize,
        w: usize,
        h: usize,
        actual_height: usize,
        bpc: u8,
        alpha01: u8,
    ) {
        let count = ow * oh;
        let needs_resizing = ow != w || oh != h;

        if self.is_passthrough(bpc) {
            if needs_resizing {
                nearest_neighbor_resize(comps, ow, actual_height, dest, w, h, alpha01);
            } else {
                spread_alpha(comps, dest, count, alpha01);
            }
            return;
        }

        let domain_size = 1usize << bpc;
        if bpc <= 8
            && self.num_comps() == 1
            && count > domain_size
            && !matches!(self.0.as_ref(), ColorSpaceKind::DeviceGray | ColorSpaceKind::DeviceRgb)
        {
            let mut palette = vec![0u8; domain_size * 3];
            let palette_src: Vec<u8> = (0..domain_size as u32).map(|v| v as u8).collect();
            self.get_rgb_buffer(&palette_src, 0, domain_size, &mut palette, 0, bpc, 0);

            if !needs_resizing {
                let mut dest_pos = 0;
                for &index in &comps[..w * actual_height] {
                    let p = index as usize * 3;
                    dest[dest_pos..dest_pos + 3].copy_from_slice(&palette[p..p + 3]);
                    dest_pos += 3 + alpha01 as usize;
                }
            } else {
                let mut rgb_buf = vec![0u8; count * 3];
                let mut pos = 0;
                for &index in &comps[..w * actual_height] {
                    let p = index as usize * 3;
                    rgb_buf[pos..pos + 3].copy_from_slice(&palette[p..p + 3]);
                    pos += 3;
                }
                nearest_neighbor_resize(&rgb_buf, ow, actual_height, dest, w, h, alpha01);
            }
            return;
        }

        if !needs_resizing {
            self.get_rgb_buffer(comps, 0, w * actual_height, dest, 0, bpc, alpha01);
        } else {
            let mut rgb_buf = vec![0u8; count * 3];
            self.get_rgb_buffer(comps, 0, w * actual_height, &mut rgb_buf, 0, bpc, 0);
            nearest_neighbor_resize(&rgb_buf, ow, actual_height, dest, w, h, alpha01);
        }
    }
}

fn spread_alpha(src: &[u8], dest: &mut [u8], count: usize, alpha01: u8) {
    let mut dest_pos = 0;
    let mut src_pos = 0;
    for _ in 0..count {
        dest[dest_pos..dest_pos + 3].copy_from_slice(&src[src_pos..src_pos + 3]);
        src_pos += 3;
        dest_pos += 3 + alpha01 as usize;
    }
}

/// Shared buffer-path loop for the scalar per-sample families (CalGray,
/// CalRGB) that have no bulk fast path of their own: scale each raw integer
/// sample to `[0,1]` and delegate to the family's item-level conversion.
#[allow(clippy::too_many_arguments)]
fn scalar_buffer(
    src: &[u8],
    src_offset: usize,
    count: usize,
    dest: &mut [u8],
    dest_offset: usize,
    bits: u8,
    alpha01: u8,
    num_comps: usize,
    convert: impl Fn(&[f32], &mut [u8], usize),
) {
    use crate::common::{read_sample, sample_stride, unit_scale};

    let scale = unit_scale(bits);
    let stride = sample_stride(bits);
    let mut src_pos = src_offset;
    let mut dest_pos = dest_offset;
    let mut comps = [0f32; 4];

    for _ in 0..count {
        for comp in comps.iter_mut().take(num_comps) {
            *comp = scale * read_sample(src, src_pos, bits) as f32;
            src_pos += stride;
        }
        convert(&comps[..num_comps], dest, dest_pos);
        dest_pos += 3 + alpha01 as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_gray_output_length_matches_universal_rule() {
        let cs = ColorSpace::device_gray();
        assert_eq!(cs.get_output_length(10, 0), 30);
        assert_eq!(cs.get_output_length(10, 1), 40);
    }

    #[test]
    fn get_rgb_agrees_with_get_rgb_item_and_buffer() {
        let cs = ColorSpace::device_rgb();
        let item_src = [10.0 / 255.0, 20.0 / 255.0, 30.0 / 255.0];
        let via_rgb = cs.get_rgb(&item_src);

        let mut via_item = [0u8; 3];
        cs.get_rgb_item(&item_src, &mut via_item, 0);

        let mut via_buffer = [0u8; 3];
        cs.get_rgb_buffer(&[10, 20, 30], 0, 1, &mut via_buffer, 0, 8, 0);

        assert_eq!(via_rgb, via_item);
        assert_eq!(via_item, via_buffer);
    }

    #[test]
    fn device_rgb_zero_sample_is_black() {
        let cs = ColorSpace::device_rgb();
        assert_eq!(cs.get_rgb(&[0.0, 0.0, 0.0]), [0, 0, 0]);
    }

    #[test]
    fn fill_rgb_passthrough_copies_straight_through() {
        let cs = ColorSpace::device_rgb();
        let comps = [1u8, 2, 3, 4, 5, 6];
        let mut dest = [0u8; 6];
        cs.fill_rgb(&mut dest, &comps, 2, 1, 2, 1, 1, 8, 0);
        assert_eq!(dest, comps);
    }

    #[test]
    fn pattern_conversion_is_unreachable() {
        let cs = ColorSpace::pattern(None);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cs.get_rgb(&[])));
        assert!(result.is_err());
    }
}
