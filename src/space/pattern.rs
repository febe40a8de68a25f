//! The Pattern color space (`spec.md` §4.11): an opaque holder of an
//! optional underlying color space. No sample conversion is defined for it;
//! `ColorSpace::get_rgb_item`/`get_rgb_buffer` panic if dispatched here
//! (`spec.md` §7 "Unreachable").

use super::ColorSpace;

/// `spec.md` §3: "optional base space; no sample evaluation."
#[derive(Debug, Clone)]
pub struct Pattern {
    base: Option<ColorSpace>,
}

impl Pattern {
    pub(crate) fn new(base: Option<ColorSpace>) -> Self {
        Self { base }
    }

    /// The pattern's underlying color space, if one was given (an
    /// uncolored tiling pattern names one; a colored pattern or a shading
    /// pattern does not).
    pub fn base(&self) -> Option<&ColorSpace> {
        self.base.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_without_base_has_no_base() {
        let p = Pattern::new(None);
        assert!(p.base().is_none());
    }

    #[test]
    fn pattern_with_base_keeps_it() {
        let p = Pattern::new(Some(ColorSpace::device_cmyk()));
        assert_eq!(p.base().unwrap().num_comps(), 4);
    }
}
