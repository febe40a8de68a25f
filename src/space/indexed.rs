//! The Indexed color space (`spec.md` §4.8): a palette lookup over a base
//! space.

#[cfg(feature = "logging")]
use log::warn;

use super::ColorSpace;
use crate::error::{ColorSpaceError, Result};
use crate::object::Object;

/// `spec.md` §3: a base space, a palette entry count (`hival + 1`), and a
/// flat byte buffer of `base.numComps * count` palette bytes.
#[derive(Debug, Clone)]
pub struct Indexed {
    base: ColorSpace,
    count: usize,
    palette: Vec<u8>,
}

impl Indexed {
    /// Build an `Indexed` space from its base, `hival`, and a lookup table
    /// given as either a decoded stream or a byte string.
    ///
    /// The source masks each code unit of a string lookup with `0xff`
    /// (`spec.md` §9 open question); this crate already stores PDF strings
    /// as raw bytes (see [`crate::object::Object::String`]), so that masking
    /// is implicit here rather than an explicit step.
    pub fn new(base: ColorSpace, hival: u8, lookup: &Object) -> Result<Self> {
        let count = hival as usize + 1;
        let num_comps = base.num_comps();
        let needed = num_comps * count;

        let palette = match lookup {
            Object::Stream(stream) => stream
                .get_bytes(needed)
                .ok_or(ColorSpaceError::Malformed("Indexed lookup stream too short"))?
                .to_vec(),
            Object::String(bytes) => {
                if bytes.len() < needed {
                    return Err(ColorSpaceError::Malformed("Indexed lookup string too short"));
                }
                bytes[..needed].to_vec()
            }
            _ => return Err(ColorSpaceError::UnknownLookupType),
        };

        Ok(Self { base, count, palette })
    }

    pub(crate) fn item(&self, index: f32, dest: &mut [u8], dest_offset: usize) {
        let num_comps = self.base.num_comps();
        let idx = (index.clamp(0.0, (self.count - 1) as f32)) as usize;
        let offset = idx * num_comps;
        self.base.get_rgb_buffer(&self.palette, offset, 1, dest, dest_offset, 8, 0);
    }

    pub(crate) fn buffer(
        &self,
        src: &[u8],
        src_offset: usize,
        count: usize,
        dest: &mut [u8],
        dest_offset: usize,
        alpha01: u8,
    ) {
        let num_comps = self.base.num_comps();
        let stride = self.base.get_output_length(num_comps, 0);
        let mut dest_pos = dest_offset;

        for i in 0..count {
            let index = src[src_offset + i].min((self.count.max(1) - 1) as u8) as usize;
            let offset = index * num_comps;
            self.base.get_rgb_buffer(&self.palette, offset, 1, dest, dest_pos, 8, 0);
            dest_pos += stride + alpha01 as usize;
        }
    }

    pub(crate) fn get_output_length(&self, input_length: usize, alpha01: u8) -> usize {
        let num_comps = self.base.num_comps();
        self.base.get_output_length(input_length * num_comps, alpha01)
    }
}

/// `spec.md` §4.8: true unless `decode` is exactly the palette-index range
/// `[0, (1<<bpc)-1]`; a malformed shape or non-positive `bpc` warns and is
/// still treated as default.
pub(crate) fn is_default_decode(decode: Option<&[f32]>, bpc: u8) -> bool {
    let Some(decode) = decode else {
        return true;
    };

    if bpc == 0 {
        #[cfg(feature = "logging")]
        warn!("Indexed isDefaultDecode: bpc must be a positive integer, got 0");
        return true;
    }

    if decode.len() != 2 {
        #[cfg(feature = "logging")]
        warn!("Indexed isDefaultDecode: decode array has length {} but expected 2", decode.len());
        return true;
    }

    let max = ((1u32 << bpc) - 1) as f32;
    decode[0] == 0.0 && decode[1] == max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    #[test]
    fn literal_scenario_matches_four_entry_palette() {
        let base = ColorSpace::device_rgb();
        let palette = Object::String(vec![0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255]);
        let indexed = Indexed::new(base, 3, &palette).unwrap();

        let src = [1u8, 2, 3, 0];
        let mut dest = [0u8; 12];
        indexed.buffer(&src, 0, 4, &mut dest, 0, 0);

        assert_eq!(dest, [255, 0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0]);
    }

    #[test]
    fn out_of_range_index_clamps_to_hival() {
        let base = ColorSpace::device_rgb();
        let palette = Object::String(vec![10, 20, 30, 40, 50, 60]);
        let indexed = Indexed::new(base, 1, &palette).unwrap();

        let mut dest = [0u8; 3];
        indexed.item(99.0, &mut dest, 0);
        assert_eq!(dest, [40, 50, 60]);
    }

    #[test]
    fn short_lookup_string_is_malformed() {
        let base = ColorSpace::device_rgb();
        let palette = Object::String(vec![0, 0, 0]);
        assert_eq!(
            Indexed::new(base, 1, &palette).unwrap_err(),
            ColorSpaceError::Malformed("Indexed lookup string too short")
        );
    }

    #[test]
    fn wrong_object_kind_is_unknown_lookup_type() {
        let base = ColorSpace::device_rgb();
        let not_a_lookup = Object::Number(1.0);
        assert_eq!(
            Indexed::new(base, 1, &not_a_lookup).unwrap_err(),
            ColorSpaceError::UnknownLookupType
        );
    }

    #[test]
    fn is_default_decode_matches_palette_domain() {
        assert!(is_default_decode(None, 8));
        assert!(is_default_decode(Some(&[0.0, 255.0]), 8));
        assert!(!is_default_decode(Some(&[0.0, 1.0]), 8));
        assert!(is_default_decode(Some(&[0.0]), 8));
        assert!(is_default_decode(Some(&[0.0, 255.0]), 0));
    }
}
