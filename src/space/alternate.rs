//! The Alternate family (`spec.md` §4.10), covering PDF `Separation` and
//! `DeviceN`: a tint transform maps `numComps` inputs to the base space's
//! components, which the base then converts as usual.
//!
//! `spec.md` §9 notes the reference implementation keeps a per-instance
//! scratch buffer for the item path; this port instead puts that scratch on
//! the call's own stack (a `SmallVec` sized for the common case), which is
//! what lets `Alternate` — and therefore the `ColorSpace` it lives inside —
//! stay `Send + Sync` without a lock.

use super::ColorSpace;
use crate::common::unit_scale;
use crate::tint::TintFunction;
use smallvec::SmallVec;

/// `spec.md` §3: `numComps` inputs (1 for Separation, >=1 for DeviceN), a
/// base space, and the tint transform between them.
#[derive(Clone)]
pub struct Alternate {
    num_comps: usize,
    base: ColorSpace,
    tint: TintFunction,
}

impl std::fmt::Debug for Alternate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alternate")
            .field("num_comps", &self.num_comps)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl Alternate {
    /// Build an `Alternate` space: `num_comps` is 1 for `Separation` or the
    /// colorant-name-array length for `DeviceN`.
    pub(crate) fn new(num_comps: usize, base: ColorSpace, tint: TintFunction) -> Self {
        Self { num_comps, base, tint }
    }

    pub(crate) fn num_comps(&self) -> usize {
        self.num_comps
    }

    /// `spec.md` §4.10 item path: tint then delegate straight to the base's
    /// `getRgbItem`.
    pub(crate) fn item(&self, src: &[f32], dest: &mut [u8], dest_offset: usize) {
        let mut scratch: SmallVec<[f32; 4]> = SmallVec::from_elem(0.0, self.base.num_comps());
        self.tint.eval(src, &mut scratch);
        self.base.get_rgb_item(&scratch, dest, dest_offset);
    }

    /// `spec.md` §4.10 buffer path.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn buffer(
        &self,
        src: &[u8],
        src_offset: usize,
        count: usize,
        dest: &mut [u8],
        dest_offset: usize,
        bits: u8,
        alpha01: u8,
    ) {
        use crate::common::{read_sample, sample_stride};

        let scale = unit_scale(bits);
        let stride = sample_stride(bits);
        let base_comps = self.base.num_comps();

        // Short-circuit path (spec.md §4.10 step 2): the base is either
        // already byte-passthrough at 8 bits, or doesn't live in [0,1]
        // range (Lab), so there is nothing a second conversion pass would
        // add; write the tinted base values directly into `dest`.
        let is_passthrough = (self.base.is_passthrough(8) || !self.base.uses_zero_to_one_range())
            && alpha01 == 0;

        if is_passthrough {
            let mut src_pos = src_offset;
            let mut dest_pos = dest_offset;
            let mut in_buf: SmallVec<[f32; 4]> = SmallVec::from_elem(0.0, self.num_comps);
            let mut tinted: SmallVec<[f32; 4]> = SmallVec::from_elem(0.0, base_comps);

            for _ in 0..count {
                for comp in in_buf.iter_mut() {
                    *comp = scale * read_sample(src, src_pos, bits) as f32;
                    src_pos += stride;
                }
                self.tint.eval(&in_buf, &mut tinted);
                self.base.get_rgb_item(&tinted, dest, dest_pos);
                dest_pos += base_comps;
            }
            return;
        }

        let mut base_buf = vec![0u8; base_comps * count];
        let mut src_pos = src_offset;
        let mut base_pos = 0;
        let mut in_buf: SmallVec<[f32; 4]> = SmallVec::from_elem(0.0, self.num_comps);
        let mut tinted: SmallVec<[f32; 4]> = SmallVec::from_elem(0.0, base_comps);
        let base_uses_unit_range = self.base.uses_zero_to_one_range();

        for _ in 0..count {
            for comp in in_buf.iter_mut() {
                *comp = scale * read_sample(src, src_pos, bits) as f32;
                src_pos += stride;
            }
            self.tint.eval(&in_buf, &mut tinted);

            if base_uses_unit_range {
                for (j, &v) in tinted.iter().enumerate() {
                    crate::common::write_clamped(&mut base_buf, base_pos + j, v * 255.0);
                }
            } else {
                self.base.get_rgb_item(&tinted, &mut base_buf, base_pos);
            }
            base_pos += base_comps;
        }

        self.base
            .get_rgb_buffer(&base_buf, 0, count, dest, dest_offset, 8, alpha01);
    }

    /// Forwards to the base with `inputLength * base.numComps / numComps`.
    pub(crate) fn get_output_length(&self, input_length: usize, alpha01: u8) -> usize {
        let scaled = input_length * self.base.num_comps() / self.num_comps.max(1);
        self.base.get_output_length(scaled, alpha01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invert_tint(num_comps: usize) -> TintFunction {
        TintFunction::new(move |src, dst| {
            debug_assert_eq!(src.len(), num_comps);
            for (d, &s) in dst.iter_mut().zip(src.iter().chain(std::iter::repeat(&src[0]))) {
                *d = 1.0 - s;
            }
        })
    }

    #[test]
    fn separation_item_delegates_through_tint_to_base() {
        let alt = Alternate::new(1, ColorSpace::device_gray(), invert_tint(1));
        let mut dest = [0u8; 3];
        alt.item(&[0.25], &mut dest, 0);
        // tint(0.25) -> 0.75 -> gray 0.75*255 ~= 191
        assert_eq!(dest, [191, 191, 191]);
    }

    #[test]
    fn device_n_buffer_matches_item_path() {
        let alt = Alternate::new(2, ColorSpace::device_rgb(), TintFunction::new(|src, dst| {
            dst[0] = src[0];
            dst[1] = src[1];
            dst[2] = (src[0] + src[1]) / 2.0;
        }));

        let mut via_item = [0u8; 3];
        alt.item(&[0.2, 0.6], &mut via_item, 0);

        let src_bytes = [(0.2 * 255.0) as u8, (0.6 * 255.0) as u8];
        let mut via_buffer = [0u8; 3];
        alt.buffer(&src_bytes, 0, 1, &mut via_buffer, 0, 8, 0);

        assert_eq!(via_item, via_buffer);
    }

    #[test]
    fn get_output_length_forwards_through_base() {
        let alt = Alternate::new(1, ColorSpace::device_cmyk(), invert_tint(1));
        // 10 separation samples -> 10*4/1 = 40 base components -> (40/4)*3 = 30.
        assert_eq!(alt.get_output_length(10, 0), 30);
    }

    #[test]
    fn lab_base_short_circuits_without_second_pass() {
        let lab_dict = crate::object::Dict::new().with(
            "WhitePoint",
            crate::object::Array::new(vec![
                crate::object::Object::Number(0.9505),
                crate::object::Object::Number(1.0),
                crate::object::Object::Number(1.0888),
            ]),
        );
        let lab = ColorSpace::lab(crate::space::Lab::new(&lab_dict).unwrap());
        let alt = Alternate::new(1, lab, TintFunction::new(|src, dst| {
            dst[0] = src[0] * 100.0;
            dst[1] = 0.0;
            dst[2] = 0.0;
        }));

        let mut dest = [0u8; 3];
        alt.buffer(&[255u8], 0, 1, &mut dest, 0, 8, 0);
        for &b in &dest {
            assert!(b >= 240, "expected near-white, got {dest:?}");
        }
    }
}
