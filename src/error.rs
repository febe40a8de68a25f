//! Error types for color-space parsing.

use core::fmt;

/// A specialized [`Result`] type for color-space operations.
pub type Result<T> = core::result::Result<T, ColorSpaceError>;

/// A fatal error encountered while resolving a color-space descriptor.
///
/// These correspond to the `FormatError` and propagate-through cases of the
/// error model: every variant is surfaced to the caller rather than silently
/// repaired. Recoverable bad parameters (an invalid blackpoint, a negative
/// gamma, an inverted Lab range, ...) are *not* represented here — they are
/// logged and replaced with their documented default, per the component
/// design.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorSpaceError {
    /// A `CalGray`, `CalRGB`, or `Lab` dictionary did not carry a `WhitePoint`
    /// entry.
    MissingWhitePoint,
    /// A color-space name could not be resolved, directly or through the
    /// resource dictionary.
    UnknownName(crate::object::Name),
    /// The first element of a color-space array named a mode this crate does
    /// not recognize.
    UnknownArrayMode(crate::object::Name),
    /// An `Indexed` color space's lookup table was neither a stream nor a
    /// string object.
    UnknownLookupType,
    /// A color-space array, dictionary, or stream was missing a required
    /// entry or had the wrong shape (wrong arity, wrong object kind, ...).
    Malformed(&'static str),
    /// The xref resolver reported that the referenced object has not been
    /// loaded yet. This must propagate out of the cache lookup path
    /// unchanged; it is the only exception the cache does not swallow.
    MissingData,
}

impl fmt::Display for ColorSpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingWhitePoint => f.write_str("color space dictionary has no WhitePoint"),
            Self::UnknownName(name) => write!(f, "unrecognized color space name: {name}"),
            Self::UnknownArrayMode(name) => {
                write!(f, "unrecognized color space array mode: {name}")
            }
            Self::UnknownLookupType => {
                f.write_str("Indexed lookup table was neither a stream nor a string")
            }
            Self::Malformed(what) => write!(f, "malformed color space: {what}"),
            Self::MissingData => f.write_str("referenced object data is not yet available"),
        }
    }
}

impl core::error::Error for ColorSpaceError {}
