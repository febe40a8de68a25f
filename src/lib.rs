/*!
Evaluates PDF color spaces into sRGB bytes.

This crate implements the color-space machinery behind ISO 32000-1 §8.6:
given a PDF color-space descriptor (a name, or a heterogeneous array whose
shape depends on its first element) and raw sample values, it produces the
sRGB bytes a rasterizer composites into an image. All eight families the PDF
1.7 reference defines are covered — `DeviceGray`, `DeviceRGB`, `DeviceCMYK`,
`CalGray`, `CalRGB`, `Lab`, `Indexed`, and the family covering
`Separation`/`DeviceN` (grouped here as [`space::Alternate`]) — plus
`Pattern`, represented but never evaluated as pixels.

The PDF object model, indirect-reference resolution, tinting-function
evaluation, and binary stream byte access are all external collaborators:
this crate only defines the traits at those seams ([`object::XrefResolver`],
[`tint::TintFunctionFactory`]) and expects a surrounding PDF engine to supply
real implementations. [`object`] additionally ships a minimal in-memory
implementation of the object model itself, useful for embedding this crate
without first owning a full PDF parser, and exercised by this crate's own
tests.

# Example

```
use hayro_color::object::{Array, Dict, InMemoryXref, Name, Object};
use hayro_color::parser::parse;
use hayro_color::cache::ColorSpaceCache;
use hayro_color::tint::{TintFunction, TintFunctionFactory};

struct NoopTintFactory;
impl TintFunctionFactory for NoopTintFactory {
    fn create(&self, _obj: &Object) -> Option<TintFunction> {
        None
    }
}

let xref = InMemoryXref::new();
let cache = ColorSpaceCache::new();
let cs = parse(Object::Name(Name::new("DeviceRGB")), &xref, None, &NoopTintFactory, &cache)
    .unwrap();

assert_eq!(cs.get_rgb(&[0.0, 0.0, 0.0]), [0, 0, 0]);
```

# ICC profiles and gamut mapping

This crate does not interpret embedded ICC profiles: an `ICCBased` space
degrades to its dictionary's `Alternate` entry, or to a device space chosen
by component count. It likewise performs no gamut mapping beyond the sRGB
output this crate's conversions target, and does no I/O of its own.
*/

#![cfg_attr(not(feature = "std"), allow(unused))]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::many_single_char_names)]

pub mod cache;
pub mod common;
pub mod error;
pub mod object;
pub mod parser;
pub mod resize;
pub mod space;
pub mod tint;

pub use cache::ColorSpaceCache;
pub use error::{ColorSpaceError, Result};
pub use parser::parse;
pub use space::{ColorSpace, ColorSpaceName};
