//! A minimal, owned stand-in for the PDF object model.
//!
//! `spec.md` §6 treats the PDF object model, the xref resolver, and binary
//! stream byte access as external collaborators supplied by the caller: a
//! real PDF crate has its own zero-copy `Name`/`Dict`/`Array`/`Stream`/`Object`
//! types (see `hayro-syntax::object`) that already implement the shapes used
//! here. This module gives this crate something concrete to parse against —
//! and something a test can build by hand without a byte-level PDF tokenizer
//! — while keeping the exact accessor shape (`Dict::get::<T>(key)`,
//! `Array` iteration, `Name` derefs to `&str`) that the rest of this crate's
//! parser is written against.

use crate::error::{ColorSpaceError, Result};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A PDF name object (`/Foo`), without the leading slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name(Arc<str>);

impl Name {
    /// Create a new name from a string.
    pub fn new(s: impl Into<Arc<str>>) -> Self {
        Self(s.into())
    }

    /// Return the name as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Name {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The identity of an indirect object (object number, generation number).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjRef {
    /// The object number.
    pub num: u32,
    /// The generation number.
    pub gen: u16,
}

impl ObjRef {
    /// Create a new indirect-object reference.
    pub const fn new(num: u32, gen: u16) -> Self {
        Self { num, gen }
    }
}

/// An associative array of names to objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dict(HashMap<Name, Object>);

impl Dict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning `self` for chained construction.
    pub fn with(mut self, key: impl Into<Name>, value: impl Into<Object>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Fetch and convert an entry. Returns `None` if the key is absent or the
    /// stored object cannot be converted to `T`.
    pub fn get<T: FromObject>(&self, key: &str) -> Option<T> {
        self.0.get(key).and_then(T::from_object)
    }

    /// Fetch an entry's raw [`Object`], without conversion.
    pub fn get_object(&self, key: &str) -> Option<&Object> {
        self.0.get(key)
    }

    /// Whether the dictionary has the given key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

/// An ordered sequence of objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array(Vec<Object>);

impl Array {
    /// Create an array from a vector of objects.
    pub fn new(items: Vec<Object>) -> Self {
        Self(items)
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the raw objects.
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.0.iter()
    }

    /// Fetch and convert the element at `index`.
    pub fn get<T: FromObject>(&self, index: usize) -> Option<T> {
        self.0.get(index).and_then(T::from_object)
    }

    /// A small cursor that reads successive elements and converts each on
    /// the fly, mirroring the teacher's `flex_iter` convenience.
    pub fn flex_iter(&self) -> FlexIter<'_> {
        FlexIter { array: self, pos: 0 }
    }
}

/// A cursor over an [`Array`] that converts each element as it's consumed.
pub struct FlexIter<'a> {
    array: &'a Array,
    pos: usize,
}

impl<'a> FlexIter<'a> {
    /// Read and convert the next element, advancing the cursor regardless of
    /// whether conversion succeeded.
    pub fn next<T: FromObject>(&mut self) -> Option<T> {
        let obj = self.array.0.get(self.pos)?;
        self.pos += 1;
        T::from_object(obj)
    }
}

/// A stream object: a dictionary plus its (already-decoded) byte payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stream {
    dict: Dict,
    data: Vec<u8>,
    obj_ref: Option<ObjRef>,
}

impl Stream {
    /// Create a new stream from its dictionary and decoded bytes.
    pub fn new(dict: Dict, data: Vec<u8>) -> Self {
        Self { dict, data, obj_ref: None }
    }

    /// Attach the indirect-object identity this stream was fetched through,
    /// used as a cache key by the parser.
    pub fn with_obj_ref(mut self, obj_ref: ObjRef) -> Self {
        self.obj_ref = Some(obj_ref);
        self
    }

    /// The stream's dictionary.
    pub fn dict(&self) -> &Dict {
        &self.dict
    }

    /// The indirect-object identity this stream was fetched through, if any.
    pub fn obj_ref(&self) -> Option<ObjRef> {
        self.obj_ref
    }

    /// Read exactly `n` decoded bytes from the stream, or `None` if it is
    /// shorter than `n`.
    pub fn get_bytes(&self, n: usize) -> Option<&[u8]> {
        self.data.get(..n)
    }

    /// All decoded bytes.
    pub fn all_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Any PDF object relevant to color-space resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// The `null` object.
    Null,
    /// A boolean.
    Boolean(bool),
    /// An integer or real number.
    Number(f64),
    /// A name.
    Name(Name),
    /// A (byte) string.
    String(Vec<u8>),
    /// An array.
    Array(Array),
    /// A dictionary.
    Dict(Dict),
    /// A stream.
    Stream(Stream),
    /// An indirect reference.
    Reference(ObjRef),
}

impl From<Name> for Object {
    fn from(n: Name) -> Self {
        Self::Name(n)
    }
}

impl From<f64> for Object {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<Dict> for Object {
    fn from(d: Dict) -> Self {
        Self::Dict(d)
    }
}

impl From<Array> for Object {
    fn from(a: Array) -> Self {
        Self::Array(a)
    }
}

impl From<Stream> for Object {
    fn from(s: Stream) -> Self {
        Self::Stream(s)
    }
}

impl From<ObjRef> for Object {
    fn from(r: ObjRef) -> Self {
        Self::Reference(r)
    }
}

/// Converts a borrowed [`Object`] into a concrete Rust value, mirroring
/// `hayro_syntax::object::Dict::get::<T>`'s generic accessor.
pub trait FromObject: Sized {
    /// Attempt the conversion, returning `None` on a type or arity mismatch.
    fn from_object(obj: &Object) -> Option<Self>;
}

impl FromObject for Object {
    fn from_object(obj: &Object) -> Option<Self> {
        Some(obj.clone())
    }
}

impl FromObject for f32 {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Number(n) => Some(*n as f32),
            _ => None,
        }
    }
}

impl FromObject for f64 {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromObject for u8 {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Number(n) if *n >= 0.0 && *n <= u8::MAX as f64 => Some(*n as u8),
            _ => None,
        }
    }
}

impl FromObject for u32 {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Number(n) if *n >= 0.0 => Some(*n as u32),
            _ => None,
        }
    }
}

impl FromObject for usize {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Number(n) if *n >= 0.0 => Some(*n as usize),
            _ => None,
        }
    }
}

impl FromObject for bool {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromObject for Name {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Name(n) => Some(n.clone()),
            _ => None,
        }
    }
}

impl FromObject for Dict {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Dict(d) => Some(d.clone()),
            Object::Stream(s) => Some(s.dict().clone()),
            _ => None,
        }
    }
}

impl FromObject for Array {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Array(a) => Some(a.clone()),
            _ => None,
        }
    }
}

impl FromObject for Stream {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::Stream(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromObject for Vec<u8> {
    fn from_object(obj: &Object) -> Option<Self> {
        match obj {
            Object::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl<const N: usize> FromObject for [f32; N] {
    fn from_object(obj: &Object) -> Option<Self> {
        let Object::Array(arr) = obj else { return None };
        if arr.len() != N {
            return None;
        }
        let mut out = [0.0f32; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = arr.get::<f32>(i)?;
        }
        Some(out)
    }
}

impl FromObject for Vec<f32> {
    fn from_object(obj: &Object) -> Option<Self> {
        let Object::Array(arr) = obj else { return None };
        (0..arr.len()).map(|i| arr.get::<f32>(i)).collect()
    }
}

/// Resolves indirect references against the document's cross-reference
/// table. Supplied by the surrounding PDF engine (`spec.md` §6).
pub trait XrefResolver {
    /// Fetch the object an indirect reference points to.
    ///
    /// Implementations that have not yet loaded the referenced object's data
    /// (e.g. because it lives in a not-yet-fetched object stream) must return
    /// [`ColorSpaceError::MissingData`]; the parser's cache probe re-throws
    /// that variant instead of swallowing it.
    fn fetch(&self, r: ObjRef) -> Result<Object>;

    /// Resolve `obj` through [`Self::fetch`] if it is a reference; otherwise
    /// return it unchanged. A no-op on non-references.
    fn fetch_if_ref(&self, obj: Object) -> Result<Object> {
        match obj {
            Object::Reference(r) => self.fetch(r),
            other => Ok(other),
        }
    }
}

/// A trivial in-memory [`XrefResolver`], for tests and small embedders that
/// have already resolved their whole object graph into memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryXref(HashMap<ObjRef, Object>);

impl InMemoryXref {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object under a reference.
    pub fn insert(&mut self, r: ObjRef, obj: Object) {
        self.0.insert(r, obj);
    }
}

impl XrefResolver for InMemoryXref {
    fn fetch(&self, r: ObjRef) -> Result<Object> {
        self.0.get(&r).cloned().ok_or(ColorSpaceError::MissingData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dict_get_round_trips_scalars() {
        let dict = Dict::new().with("Gamma", 2.2f64).with("N", 4.0);
        assert_eq!(dict.get::<f32>("Gamma"), Some(2.2));
        assert_eq!(dict.get::<u8>("N"), Some(4));
        assert_eq!(dict.get::<f32>("Missing"), None);
    }

    #[test]
    fn array_converts_to_fixed_size() {
        let arr = Array::new(vec![
            Object::Number(0.9505),
            Object::Number(1.0),
            Object::Number(1.0888),
        ]);
        let wp: [f32; 3] = FromObject::from_object(&Object::Array(arr)).unwrap();
        assert_eq!(wp, [0.9505, 1.0, 1.0888]);
    }

    #[test]
    fn flex_iter_advances_even_on_type_mismatch() {
        let arr = Array::new(vec![Object::Name(Name::new("Indexed")), Object::Number(3.0)]);
        let mut iter = arr.flex_iter();
        let _name: Option<Name> = iter.next();
        let n: Option<u8> = iter.next();
        assert_eq!(n, Some(3));
    }

    #[test]
    fn xref_missing_data_propagates() {
        let xref = InMemoryXref::new();
        let err = xref.fetch(ObjRef::new(1, 0)).unwrap_err();
        assert_eq!(err, ColorSpaceError::MissingData);
    }
}
