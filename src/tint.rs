//! The tint-transform function boundary for Separation/DeviceN color spaces.
//!
//! `spec.md` §1 and §6 list tinting-function evaluation (PDF function types
//! 0/2/3/4) as an external collaborator: a real implementation lives next to
//! a content-stream/function evaluator (see `hayro_syntax::function::Function`
//! in the teacher workspace), not in this color-space crate. This module only
//! defines the boundary: an opaque callable plus the factory that builds one
//! from a PDF function object.

use crate::object::Object;
use std::fmt;
use std::sync::Arc;

/// A tint transform: maps `src.len()` input components to `dst.len()` output
/// components, both roughly in `[0, 1]`, per `spec.md` §3.
///
/// Cloning a [`TintFunction`] is cheap (it is reference-counted), matching
/// how [`crate::space::ColorSpace`] itself is cheaply shareable.
#[derive(Clone)]
pub struct TintFunction(Arc<dyn Fn(&[f32], &mut [f32]) + Send + Sync>);

impl TintFunction {
    /// Wrap a closure as a tint function.
    pub fn new(f: impl Fn(&[f32], &mut [f32]) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Evaluate the transform.
    pub fn eval(&self, src: &[f32], dst: &mut [f32]) {
        (self.0)(src, dst)
    }
}

impl fmt::Debug for TintFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TintFunction(..)")
    }
}

/// Builds a [`TintFunction`] from a PDF function object (a dictionary or
/// stream with a `FunctionType` entry). Supplied by the surrounding PDF
/// engine.
pub trait TintFunctionFactory {
    /// Parse `obj` as a PDF function and return a callable tint transform, or
    /// `None` if it isn't a recognized function.
    fn create(&self, obj: &Object) -> Option<TintFunction>;
}
