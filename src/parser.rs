//! The descriptor parser / factory (`spec.md` §4.14-§4.15): turns a PDF
//! color-space object into a fully constructed [`ColorSpace`], consulting
//! and populating the [`ColorSpaceCache`] along the way.
//!
//! Grounded on `hayro_interpret::color::ColorSpaceType::{new, new_inner,
//! new_from_name}`: same two-level dispatch (name vs. array, then the
//! array's first element picks the family), same `flex_iter` consumption
//! style, same device-name aliases (`G`/`DeviceGray`, `RGB`/`DeviceRGB`,
//! `CMYK`/`DeviceCMYK`). This module generalizes that `Option`-returning,
//! warn-and-give-up dispatch into `spec.md` §7's explicit `FormatError`
//! variants, and adds the by-ref/by-name cache and resource-dictionary name
//! resolution `spec.md` §4.14 calls for (the teacher resolves resource names
//! one layer up, in its content-stream interpreter).

#[cfg(feature = "logging")]
use log::warn;

use crate::cache::ColorSpaceCache;
use crate::error::{ColorSpaceError, Result};
use crate::object::{Array, Dict, Name, Object, XrefResolver};
use crate::space::{Alternate, CalGray, CalRgb, ColorSpace, Indexed, Lab};
use crate::tint::TintFunctionFactory;

/// Parse a color-space descriptor (`spec.md` §4.14).
///
/// `cs` is the (possibly indirect) PDF object naming the color space; `xref`
/// resolves indirect references; `resources` is the content stream's
/// resource dictionary, consulted when `cs` is an unrecognized name;
/// `tint_factory` builds the opaque tint transform an `Alternate` space
/// needs; `cache` is consulted by reference and by resource name before any
/// parsing happens, and is populated with whatever this call parses.
///
/// This function's body has no suspension points (`spec.md` §5): a caller
/// sitting at an `async` call site can await it trivially, or simply call it
/// synchronously, with identical behavior either way.
pub fn parse(
    cs: Object,
    xref: &dyn XrefResolver,
    resources: Option<&Dict>,
    tint_factory: &dyn TintFunctionFactory,
    cache: &ColorSpaceCache,
) -> Result<ColorSpace> {
    parse_inner(cs, xref, resources, tint_factory, cache)
}

fn parse_inner(
    cs: Object,
    xref: &dyn XrefResolver,
    resources: Option<&Dict>,
    tint_factory: &dyn TintFunctionFactory,
    cache: &ColorSpaceCache,
) -> Result<ColorSpace> {
    if let Object::Reference(r) = cs {
        if let Some(hit) = cache.get_by_ref(r) {
            return Ok(hit);
        }

        // `MissingDataException`'s Rust equivalent: `fetch` returns `Err`
        // unconditionally on failure, so the `?` here already re-throws it
        // rather than swallowing it, matching the one exception this
        // subsystem's cache probe must never eat (`spec.md` §7).
        let resolved = xref.fetch(r)?;
        let space = parse_value(resolved, xref, resources, tint_factory, cache)?;
        cache.set(None, Some(r), space.clone());
        return Ok(space);
    }

    parse_value(cs, xref, resources, tint_factory, cache)
}

fn parse_value(
    cs: Object,
    xref: &dyn XrefResolver,
    resources: Option<&Dict>,
    tint_factory: &dyn TintFunctionFactory,
    cache: &ColorSpaceCache,
) -> Result<ColorSpace> {
    match cs {
        Object::Name(name) => parse_name(name, xref, resources, tint_factory, cache),
        Object::Array(arr) => parse_array(&arr, xref, resources, tint_factory, cache),
        _ => Err(ColorSpaceError::Malformed(
            "color space descriptor is neither a name nor an array",
        )),
    }
}

fn device_name(name: &str) -> Option<ColorSpace> {
    match name {
        "G" | "DeviceGray" => Some(ColorSpace::device_gray()),
        "RGB" | "DeviceRGB" => Some(ColorSpace::device_rgb()),
        "CMYK" | "DeviceCMYK" | "CalCMYK" => Some(ColorSpace::device_cmyk()),
        "Pattern" => Some(ColorSpace::pattern(None)),
        _ => None,
    }
}

fn parse_name(
    name: Name,
    xref: &dyn XrefResolver,
    resources: Option<&Dict>,
    tint_factory: &dyn TintFunctionFactory,
    cache: &ColorSpaceCache,
) -> Result<ColorSpace> {
    if let Some(device) = device_name(&name) {
        return Ok(device);
    }

    if let Some(hit) = cache.get_by_name(&name) {
        return Ok(hit);
    }

    let resources = resources.ok_or_else(|| ColorSpaceError::UnknownName(name.clone()))?;
    let cs_dict: Dict = resources
        .get("ColorSpace")
        .ok_or_else(|| ColorSpaceError::UnknownName(name.clone()))?;
    let entry = cs_dict
        .get_object(&name)
        .cloned()
        .ok_or_else(|| ColorSpaceError::UnknownName(name.clone()))?;

    let space = parse_inner(entry, xref, Some(resources), tint_factory, cache)?;
    cache.set(Some(name), None, space.clone());
    Ok(space)
}

fn parse_array(
    arr: &Array,
    xref: &dyn XrefResolver,
    resources: Option<&Dict>,
    tint_factory: &dyn TintFunctionFactory,
    cache: &ColorSpaceCache,
) -> Result<ColorSpace> {
    let mut iter = arr.flex_iter();
    let mode: Name = iter
        .next()
        .ok_or(ColorSpaceError::Malformed("color space array has no mode name"))?;

    if let Some(device) = device_name(&mode) {
        return Ok(device);
    }

    match mode.as_str() {
        "CalGray" => {
            let dict: Dict = iter
                .next()
                .ok_or(ColorSpaceError::Malformed("CalGray array missing dictionary"))?;
            Ok(ColorSpace::cal_gray(CalGray::new(&dict)?))
        }
        "CalRGB" => {
            let dict: Dict = iter
                .next()
                .ok_or(ColorSpaceError::Malformed("CalRGB array missing dictionary"))?;
            Ok(ColorSpace::cal_rgb(CalRgb::new(&dict)?))
        }
        "Lab" => {
            let dict: Dict = iter
                .next()
                .ok_or(ColorSpaceError::Malformed("Lab array missing dictionary"))?;
            Ok(ColorSpace::lab(Lab::new(&dict)?))
        }
        "ICCBased" => {
            let stream: crate::object::Stream = iter
                .next()
                .ok_or(ColorSpaceError::Malformed("ICCBased array missing stream"))?;
            let dict = stream.dict();
            let n: usize = dict
                .get("N")
                .ok_or(ColorSpaceError::Malformed("ICCBased stream missing N"))?;

            if let Some(alternate) = dict.get_object("Alternate").cloned() {
                match parse_inner(alternate, xref, resources, tint_factory, cache) {
                    Ok(space) if space.num_comps() == n => return Ok(space),
                    Ok(_mismatched) => {
                        #[cfg(feature = "logging")]
                        warn!(
                            "ICCBased Alternate numComps does not match N={n}; \
                             discarding Alternate and falling back to a device space"
                        );
                    }
                    Err(ColorSpaceError::MissingData) => return Err(ColorSpaceError::MissingData),
                    Err(_) => {
                        #[cfg(feature = "logging")]
                        warn!("ICCBased Alternate failed to parse; falling back to a device space");
                    }
                }
            }

            match n {
                1 => Ok(ColorSpace::device_gray()),
                3 => Ok(ColorSpace::device_rgb()),
                4 => Ok(ColorSpace::device_cmyk()),
                _ => Err(ColorSpaceError::Malformed(
                    "ICCBased stream's N is not 1, 3, or 4 and has no usable Alternate",
                )),
            }
        }
        "Pattern" => {
            let base_obj: Option<Object> = iter.next();
            let base = match base_obj {
                Some(obj) => Some(parse_inner(obj, xref, resources, tint_factory, cache)?),
                None => None,
            };
            Ok(ColorSpace::pattern(base))
        }
        "I" | "Indexed" => {
            let base_obj: Object = iter
                .next()
                .ok_or(ColorSpaceError::Malformed("Indexed array missing base space"))?;
            let base = parse_inner(base_obj, xref, resources, tint_factory, cache)?;

            let hival_fetched: u32 = iter
                .next()
                .ok_or(ColorSpaceError::Malformed("Indexed array missing hival"))?;
            let hival = u8::try_from(hival_fetched)
                .map_err(|_| ColorSpaceError::Malformed("Indexed hival out of range"))?;

            let lookup: Object = iter
                .next()
                .ok_or(ColorSpaceError::Malformed("Indexed array missing lookup table"))?;
            let lookup = xref.fetch_if_ref(lookup)?;

            Ok(ColorSpace::indexed(Indexed::new(base, hival, &lookup)?))
        }
        "Separation" | "DeviceN" => {
            let num_comps = if mode.as_str() == "Separation" {
                let _colorant: Name = iter.next().ok_or(ColorSpaceError::Malformed(
                    "Separation array missing colorant name",
                ))?;
                1
            } else {
                let names: Array = iter.next().ok_or(ColorSpaceError::Malformed(
                    "DeviceN array missing colorant-name array",
                ))?;
                names.len()
            };

            let base_obj: Object = iter
                .next()
                .ok_or(ColorSpaceError::Malformed("Separation/DeviceN array missing base space"))?;
            let base = parse_inner(base_obj, xref, resources, tint_factory, cache)?;

            let func_obj: Object = iter.next().ok_or(ColorSpaceError::Malformed(
                "Separation/DeviceN array missing tint transform function",
            ))?;
            let func_obj = xref.fetch_if_ref(func_obj)?;
            let tint = tint_factory.create(&func_obj).ok_or(ColorSpaceError::Malformed(
                "tint function factory could not build a function from the given object",
            ))?;

            Ok(ColorSpace::alternate(Alternate::new(num_comps, base, tint)))
        }
        _ => Err(ColorSpaceError::UnknownArrayMode(mode)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{InMemoryXref, ObjRef, Stream};
    use crate::tint::TintFunction;

    struct NegateFactory;

    impl TintFunctionFactory for NegateFactory {
        fn create(&self, _obj: &Object) -> Option<TintFunction> {
            Some(TintFunction::new(|src, dst| {
                for (d, &s) in dst.iter_mut().zip(src.iter()) {
                    *d = 1.0 - s;
                }
            }))
        }
    }

    fn array_of(objs: Vec<Object>) -> Object {
        Object::Array(Array::new(objs))
    }

    #[test]
    fn cal_gray_array_parses_with_gamma() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let dict = Dict::new()
            .with(
                "WhitePoint",
                Array::new(vec![
                    Object::Number(0.9505),
                    Object::Number(1.0),
                    Object::Number(1.0888),
                ]),
            )
            .with("Gamma", 2.2f64);
        let cs = array_of(vec![Object::Name(Name::new("CalGray")), Object::Dict(dict)]);

        let space = parse(cs, &xref, None, &factory, &cache).unwrap();
        assert_eq!(space.num_comps(), 1);
    }

    #[test]
    fn rgb_name_returns_shared_singleton_twice() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let a = parse(Object::Name(Name::new("RGB")), &xref, None, &factory, &cache).unwrap();
        let b = parse(Object::Name(Name::new("RGB")), &xref, None, &factory, &cache).unwrap();
        assert_eq!(a.num_comps(), 3);
        assert_eq!(b.num_comps(), 3);
    }

    #[test]
    fn icc_based_with_matching_alternate_uses_it() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let stream_dict = Dict::new()
            .with("N", 4.0)
            .with("Alternate", Name::new("DeviceCMYK"));
        let stream = Stream::new(stream_dict, vec![0u8; 4]);
        let cs = array_of(vec![Object::Name(Name::new("ICCBased")), Object::Stream(stream)]);

        let space = parse(cs, &xref, None, &factory, &cache).unwrap();
        assert_eq!(space.num_comps(), 4);
    }

    #[test]
    fn indexed_array_parses_hival_plus_one_palette() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let lookup = Object::String(vec![0, 0xff, 0, 0xff, 0, 0, 0, 0, 0xff]);
        let cs = array_of(vec![
            Object::Name(Name::new("Indexed")),
            Object::Name(Name::new("DeviceRGB")),
            Object::Number(2.0),
            lookup,
        ]);

        let space = parse(cs, &xref, None, &factory, &cache).unwrap();
        assert_eq!(space.num_comps(), 1);
    }

    #[test]
    fn unresolvable_name_without_resources_is_unknown() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let err = parse(Object::Name(Name::new("CS0")), &xref, None, &factory, &cache).unwrap_err();
        assert_eq!(err, ColorSpaceError::UnknownName(Name::new("CS0")));
    }

    #[test]
    fn name_resolves_through_resource_dictionary() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let cs_dict = Dict::new().with("CS0", Name::new("DeviceCMYK"));
        let resources = Dict::new().with("ColorSpace", cs_dict);

        let space =
            parse(Object::Name(Name::new("CS0")), &xref, Some(&resources), &factory, &cache)
                .unwrap();
        assert_eq!(space.num_comps(), 4);
    }

    #[test]
    fn reference_is_resolved_and_cached() {
        let mut xref = InMemoryXref::new();
        let r = ObjRef::new(7, 0);
        xref.insert(r, Object::Name(Name::new("DeviceRGB")));
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let first = parse(Object::Reference(r), &xref, None, &factory, &cache).unwrap();
        assert_eq!(first.num_comps(), 3);
        assert!(cache.get_by_ref(r).is_some());

        // Second parse must hit the cache rather than re-fetch.
        let empty_xref = InMemoryXref::new();
        let second = parse(Object::Reference(r), &empty_xref, None, &factory, &cache).unwrap();
        assert_eq!(second.num_comps(), 3);
    }

    #[test]
    fn missing_reference_propagates_missing_data() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let err = parse(Object::Reference(ObjRef::new(99, 0)), &xref, None, &factory, &cache)
            .unwrap_err();
        assert_eq!(err, ColorSpaceError::MissingData);
    }

    #[test]
    fn unrecognized_array_mode_is_an_error() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let cs = array_of(vec![Object::Name(Name::new("Bogus"))]);
        let err = parse(cs, &xref, None, &factory, &cache).unwrap_err();
        assert_eq!(err, ColorSpaceError::UnknownArrayMode(Name::new("Bogus")));
    }

    #[test]
    fn separation_array_builds_alternate_space() {
        let xref = InMemoryXref::new();
        let cache = ColorSpaceCache::new();
        let factory = NegateFactory;

        let cs = array_of(vec![
            Object::Name(Name::new("Separation")),
            Object::Name(Name::new("Spot")),
            Object::Name(Name::new("DeviceGray")),
            Object::Dict(Dict::new().with("FunctionType", 2.0)),
        ]);

        let space = parse(cs, &xref, None, &factory, &cache).unwrap();
        assert_eq!(space.num_comps(), 1);

        let mut dest = [0u8; 3];
        space.get_rgb_item(&[0.25], &mut dest, 0);
        assert_eq!(dest, [191, 191, 191]);
    }
}
