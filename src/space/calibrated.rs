//! CalGray and CalRGB (`spec.md` §4.5-§4.6), including CalRGB's Bradford
//! chromatic adaptation, black-point compensation, and sRGB transfer.
//!
//! Ported from the same pdf.js lineage the teacher workspace's own
//! `CalGray`/`CalRgb` conversions cite (see
//! `hayro_interpret::color::{CalGray, CalRgb}`), generalized to this crate's
//! `Dict`-based construction path and explicit invariant repair.

#[cfg(feature = "logging")]
use log::{info, warn};

use crate::common::write_clamped;
use crate::object::Dict;

const BRADFORD: [f32; 9] =
    [0.8951, 0.2664, -0.1614, -0.7502, 1.7135, 0.0367, 0.0389, -0.0685, 1.0296];

const BRADFORD_INV: [f32; 9] = [
    0.9869929, -0.1470543, 0.1599627, 0.4323053, 0.5183603, 0.0492912, -0.0085287, 0.0400428,
    0.9684867,
];

const SRGB_D65_XYZ_TO_RGB: [f32; 9] = [
    3.2404542, -1.5371385, -0.4985314, -0.969_266, 1.8760108, 0.0415560, 0.0556434, -0.2040259,
    1.0572252,
];

const FLAT_WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const D65_WHITE: [f32; 3] = [0.95047, 1.0, 1.08883];

fn matrix_product(m: &[f32; 9], v: &[f32; 3]) -> [f32; 3] {
    [
        m[0] * v[0] + m[1] * v[1] + m[2] * v[2],
        m[3] * v[0] + m[4] * v[1] + m[5] * v[2],
        m[6] * v[0] + m[7] * v[1] + m[8] * v[2],
    ]
}

/// `spec.md` §4.5.
#[derive(Debug, Clone, PartialEq)]
pub struct CalGray {
    white_point: [f32; 3],
    gamma: f32,
}

impl CalGray {
    /// Build a `CalGray` space from its dictionary, repairing invalid
    /// parameters per `spec.md` §3/§7 (no fatal error for bad gamma or
    /// blackpoint; only a missing whitepoint is fatal).
    pub fn new(dict: &Dict) -> crate::error::Result<Self> {
        let white_point: [f32; 3] = dict
            .get("WhitePoint")
            .ok_or(crate::error::ColorSpaceError::MissingWhitePoint)?;

        let mut gamma = dict.get::<f32>("Gamma").unwrap_or(1.0);
        if gamma < 1.0 {
            #[cfg(feature = "logging")]
            info!("CalGray gamma {gamma} < 1, resetting to 1");
            gamma = 1.0;
        }

        if let Some(bp) = dict.get::<[f32; 3]>("BlackPoint") {
            if bp.iter().any(|&c| c < 0.0) {
                #[cfg(feature = "logging")]
                info!("CalGray blackpoint has a negative component, resetting to (0,0,0)");
            } else if bp != [0.0, 0.0, 0.0] {
                #[cfg(feature = "logging")]
                warn!("CalGray non-default blackpoint {bp:?} is accepted but numerically ignored");
            }
        }

        Ok(Self { white_point, gamma })
    }

    pub(crate) fn item(&self, src: f32, dest: &mut [u8], dest_offset: usize) {
        let yw = self.white_point[1];
        let a = src.powf(self.gamma);
        let l = yw * a;
        let v = (295.8 * l.powf(1.0 / 3.0) - 40.8).max(0.0);

        write_clamped(dest, dest_offset, v);
        write_clamped(dest, dest_offset + 1, v);
        write_clamped(dest, dest_offset + 2, v);
    }
}

/// `spec.md` §4.6.
#[derive(Debug, Clone, PartialEq)]
pub struct CalRgb {
    white_point: [f32; 3],
    black_point: [f32; 3],
    matrix: [f32; 9],
    gamma: [f32; 3],
}

impl CalRgb {
    /// Build a `CalRgb` space from its dictionary, repairing invalid
    /// parameters per `spec.md` §3/§7.
    pub fn new(dict: &Dict) -> crate::error::Result<Self> {
        let white_point: [f32; 3] = dict
            .get("WhitePoint")
            .ok_or(crate::error::ColorSpaceError::MissingWhitePoint)?;

        let mut black_point = dict.get::<[f32; 3]>("BlackPoint").unwrap_or([0.0, 0.0, 0.0]);
        if black_point.iter().any(|&c| c < 0.0) {
            #[cfg(feature = "logging")]
            info!("CalRGB blackpoint has a negative component, resetting to (0,0,0)");
            black_point = [0.0, 0.0, 0.0];
        }

        let mut gamma = dict.get::<[f32; 3]>("Gamma").unwrap_or([1.0, 1.0, 1.0]);
        if gamma.iter().any(|&c| c < 0.0) {
            #[cfg(feature = "logging")]
            info!("CalRGB gamma has a negative component, resetting to (1,1,1)");
            gamma = [1.0, 1.0, 1.0];
        }

        let matrix = dict
            .get::<[f32; 9]>("Matrix")
            .unwrap_or([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);

        Ok(Self { white_point, black_point, matrix, gamma })
    }

    fn decode_l_constant() -> f32 {
        ((8.0f32 + 16.0) / 116.0).powi(3) / 8.0
    }

    fn decode_l(l: f32) -> f32 {
        if l < 0.0 {
            -Self::decode_l(-l)
        } else if l > 8.0 {
            ((l + 16.0) / 116.0).powi(3)
        } else {
            l * Self::decode_l_constant()
        }
    }

    fn normalize_to_flat(white_point: &[f32; 3], xyz: &[f32; 3]) -> [f32; 3] {
        // The YW==1 invariant (enforced nowhere else in this crate, since the
        // spec never rejects a whitepoint outright) lets this test skip YW.
        if white_point[0] == 1.0 && white_point[2] == 1.0 {
            return *xyz;
        }

        let lms = matrix_product(&BRADFORD, xyz);
        let lms_flat = [lms[0] / white_point[0], lms[1] / white_point[1], lms[2] / white_point[2]];
        matrix_product(&BRADFORD_INV, &lms_flat)
    }

    fn compensate_black_point(black_point: &[f32; 3], xyz: &[f32; 3]) -> [f32; 3] {
        if *black_point == [0.0, 0.0, 0.0] {
            return *xyz;
        }

        let zero_decode = Self::decode_l(0.0);
        let mut out = [0.0; 3];
        for i in 0..3 {
            let src = Self::decode_l(black_point[i]);
            let scale = (1.0 - zero_decode) / (1.0 - src);
            let offset = 1.0 - scale;
            out[i] = xyz[i] * scale + offset;
        }
        out
    }

    fn normalize_to_d65(white_point: &[f32; 3], xyz: &[f32; 3]) -> [f32; 3] {
        let lms = matrix_product(&BRADFORD, xyz);
        let lms_d65 = [
            lms[0] * D65_WHITE[0] / white_point[0],
            lms[1] * D65_WHITE[1] / white_point[1],
            lms[2] * D65_WHITE[2] / white_point[2],
        ];
        matrix_product(&BRADFORD_INV, &lms_d65)
    }

    fn srgb_transfer(c: f32) -> f32 {
        if c <= 0.0031308 {
            (12.92 * c).clamp(0.0, 1.0)
        } else if c >= 0.99554525 {
            1.0
        } else {
            (1.055 * c.powf(1.0 / 2.4) - 0.055).clamp(0.0, 1.0)
        }
    }

    pub(crate) fn item(&self, src: &[f32], dest: &mut [u8], dest_offset: usize) {
        let clamped = [src[0].clamp(0.0, 1.0), src[1].clamp(0.0, 1.0), src[2].clamp(0.0, 1.0)];
        let [gr, gg, gb] = self.gamma;
        let a_g = [
            if clamped[0] == 1.0 { 1.0 } else { clamped[0].powf(gr) },
            if clamped[1] == 1.0 { 1.0 } else { clamped[1].powf(gg) },
            if clamped[2] == 1.0 { 1.0 } else { clamped[2].powf(gb) },
        ];

        let m = &self.matrix;
        let xyz = [
            m[0] * a_g[0] + m[3] * a_g[1] + m[6] * a_g[2],
            m[1] * a_g[0] + m[4] * a_g[1] + m[7] * a_g[2],
            m[2] * a_g[0] + m[5] * a_g[1] + m[8] * a_g[2],
        ];

        let xyz_flat = Self::normalize_to_flat(&self.white_point, &xyz);
        let xyz_black = Self::compensate_black_point(&self.black_point, &xyz_flat);
        let xyz_d65 = Self::normalize_to_d65(&FLAT_WHITE, &xyz_black);
        let rgb = matrix_product(&SRGB_D65_XYZ_TO_RGB, &xyz_d65);

        write_clamped(dest, dest_offset, Self::srgb_transfer(rgb[0]) * 255.0);
        write_clamped(dest, dest_offset + 1, Self::srgb_transfer(rgb[1]) * 255.0);
        write_clamped(dest, dest_offset + 2, Self::srgb_transfer(rgb[2]) * 255.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Dict;

    #[test]
    fn cal_gray_worked_example_matches_scenario() {
        let dict = Dict::new().with("WhitePoint", crate::object::Array::new(vec![
            crate::object::Object::Number(1.0),
            crate::object::Object::Number(1.0),
            crate::object::Object::Number(1.0),
        ])).with("Gamma", 2.2f64);
        let cal = CalGray::new(&dict).unwrap();

        let mut dest = [0u8; 3];
        cal.item(0.5, &mut dest, 0);
        // v = 295.8 * (0.5^2.2)^(1/3) - 40.8 ~= 137.1.
        assert!((dest[0] as i32 - 137).abs() <= 1, "got {dest:?}");
        assert_eq!(dest[0], dest[1]);
        assert_eq!(dest[1], dest[2]);
    }

    #[test]
    fn cal_gray_negative_gamma_below_one_is_reset() {
        let dict = Dict::new()
            .with("WhitePoint", crate::object::Array::new(vec![
                crate::object::Object::Number(1.0),
                crate::object::Object::Number(1.0),
                crate::object::Object::Number(1.0),
            ]))
            .with("Gamma", 0.5f64);
        let cal = CalGray::new(&dict).unwrap();
        assert_eq!(cal.gamma, 1.0);
    }

    #[test]
    fn cal_gray_missing_white_point_is_fatal() {
        let dict = Dict::new();
        assert_eq!(
            CalGray::new(&dict).unwrap_err(),
            crate::error::ColorSpaceError::MissingWhitePoint
        );
    }

    #[test]
    fn cal_rgb_identity_white_is_near_white() {
        let dict = Dict::new()
            .with("WhitePoint", crate::object::Array::new(vec![
                crate::object::Object::Number(0.9505),
                crate::object::Object::Number(1.0),
                crate::object::Object::Number(1.0888),
            ]));
        let cal = CalRgb::new(&dict).unwrap();

        let mut dest = [0u8; 3];
        cal.item(&[1.0, 1.0, 1.0], &mut dest, 0);
        for &b in &dest {
            assert!(b >= 254, "expected near-white, got {dest:?}");
        }
    }

    #[test]
    fn cal_rgb_negative_gamma_component_resets_all() {
        let dict = Dict::new()
            .with("WhitePoint", crate::object::Array::new(vec![
                crate::object::Object::Number(1.0),
                crate::object::Object::Number(1.0),
                crate::object::Object::Number(1.0),
            ]))
            .with("Gamma", crate::object::Array::new(vec![
                crate::object::Object::Number(-1.0),
                crate::object::Object::Number(2.0),
                crate::object::Object::Number(2.0),
            ]));
        let cal = CalRgb::new(&dict).unwrap();
        assert_eq!(cal.gamma, [1.0, 1.0, 1.0]);
    }
}
