//! The Lab color space (`spec.md` §4.7): `g()` transform with D50/D65
//! branching on the whitepoint's Z component.

#[cfg(feature = "logging")]
use log::info;

use crate::object::Dict;

const D50_MATRIX: [f32; 9] = [3.1339, -1.617, -0.4906, -0.9785, 1.916, 0.0333, 0.072, -0.229, 1.4057];
const D65_MATRIX: [f32; 9] = [3.2406, -1.5372, -0.4986, -0.9689, 1.8758, 0.0415, 0.0557, -0.204, 1.057];

/// `spec.md` §4.7.
#[derive(Debug, Clone, PartialEq)]
pub struct Lab {
    white_point: [f32; 3],
    /// `amin, amax, bmin, bmax`.
    range: [f32; 4],
}

impl Lab {
    /// Build a `Lab` space from its dictionary, repairing an inverted range
    /// (min > max on either axis) per `spec.md` §3/§7. A missing whitepoint
    /// is fatal.
    pub fn new(dict: &Dict) -> crate::error::Result<Self> {
        let white_point: [f32; 3] = dict
            .get("WhitePoint")
            .ok_or(crate::error::ColorSpaceError::MissingWhitePoint)?;

        let mut range = dict.get::<[f32; 4]>("Range").unwrap_or([-100.0, 100.0, -100.0, 100.0]);
        if range[0] > range[1] || range[2] > range[3] {
            #[cfg(feature = "logging")]
            info!("Lab range {range:?} has min > max on an axis, resetting to defaults");
            range = [-100.0, 100.0, -100.0, 100.0];
        }

        // A dictionary's own BlackPoint is accepted but never consulted: the
        // conversion below has no blackpoint term (mirrors the teacher's
        // `_black_point` field, kept only to document the entry was read).
        let _black_point = dict.get::<[f32; 3]>("BlackPoint").unwrap_or([0.0, 0.0, 0.0]);

        Ok(Self { white_point, range })
    }

    fn g(x: f32) -> f32 {
        if x >= 6.0 / 29.0 {
            x.powi(3)
        } else {
            (108.0 / 841.0) * (x - 4.0 / 29.0)
        }
    }

    /// `spec.md` §4.7's buffer-path linear remap from a raw integer sample
    /// in `[0, maxVal]` into `L`'s `[0,100]` or `a`/`b`'s configured range.
    pub(crate) fn remap_component(raw: f32, max_val: f32, lo: f32, hi: f32) -> f32 {
        lo + raw * (hi - lo) / max_val
    }

    pub(crate) fn item(&self, src: &[f32], dest: &mut [u8], dest_offset: usize) {
        let l = src[0];
        let a = src[1].clamp(self.range[0], self.range[1]);
        let b = src[2].clamp(self.range[2], self.range[3]);

        let m = (l + 16.0) / 116.0;
        let l_prime = m + a / 500.0;
        let n = m - b / 200.0;

        let x = self.white_point[0] * Self::g(l_prime);
        let y = self.white_point[1] * Self::g(m);
        let z = self.white_point[2] * Self::g(n);

        let matrix = if self.white_point[2] < 1.0 { &D50_MATRIX } else { &D65_MATRIX };
        let r = matrix[0] * x + matrix[1] * y + matrix[2] * z;
        let g = matrix[3] * x + matrix[4] * y + matrix[5] * z;
        let bl = matrix[6] * x + matrix[7] * y + matrix[8] * z;

        let conv = |v: f32| v.max(0.0).sqrt() * 255.0;

        crate::common::write_clamped(dest, dest_offset, conv(r));
        crate::common::write_clamped(dest, dest_offset + 1, conv(g));
        crate::common::write_clamped(dest, dest_offset + 2, conv(bl));
    }

    pub(crate) fn range(&self) -> [f32; 4] {
        self.range
    }
}

/// The buffer-path entry point for Lab (`spec.md` §4.7): remap each raw
/// integer sample into `L`'s `[0,100]` range and the configured `a`/`b`
/// ranges before delegating to [`Lab::item`]. Lab's `isDefaultDecode`
/// claims `true` unconditionally, so no caller-supplied decode array is
/// consulted here.
#[allow(clippy::too_many_arguments)]
pub(crate) fn buffer(
    lab: &Lab,
    src: &[u8],
    src_offset: usize,
    count: usize,
    dest: &mut [u8],
    dest_offset: usize,
    bits: u8,
    alpha01: u8,
) {
    use crate::common::{max_sample_value, read_sample, sample_stride};

    let max_val = max_sample_value(bits);
    let stride = sample_stride(bits);
    let range = lab.range();
    let mut src_pos = src_offset;
    let mut dest_pos = dest_offset;

    for _ in 0..count {
        let l_raw = read_sample(src, src_pos, bits) as f32;
        let a_raw = read_sample(src, src_pos + stride, bits) as f32;
        let b_raw = read_sample(src, src_pos + 2 * stride, bits) as f32;
        src_pos += 3 * stride;

        let l = Lab::remap_component(l_raw, max_val, 0.0, 100.0);
        let a = Lab::remap_component(a_raw, max_val, range[0], range[1]);
        let b = Lab::remap_component(b_raw, max_val, range[2], range[3]);

        lab.item(&[l, a, b], dest, dest_pos);
        dest_pos += 3 + alpha01 as usize;
    }
}
