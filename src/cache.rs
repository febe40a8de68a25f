//! The color-space cache (`spec.md` §4.14, §6): avoids re-parsing the same
//! indirect-object reference or resource name into a fresh `ColorSpace`.
//!
//! Grounded on `hayro-interpret::cache::Cache`, generalized from that cache's
//! generic `Any`-keyed `get_or_insert_with` to the two explicit key shapes
//! `spec.md` §6 names (`getByRef`/`getByName`/`set`), since a color-space
//! cache only ever needs those two identities rather than an arbitrary
//! content hash.

use crate::object::{Name, ObjRef};
use crate::space::ColorSpace;
use std::collections::HashMap;
use std::sync::Mutex;

/// Caches parsed [`ColorSpace`]s by indirect-object reference or by resource
/// name. `spec.md` §6: "a miss returns nothing; a set is idempotent on
/// (name, ref)."
///
/// Matches the teacher's `Cache` in keeping the map behind a `Mutex` rather
/// than requiring `&mut self` at every call site: the parser recurses (a
/// composite space parses its base before caching itself), so the lock must
/// be released between the miss check and the eventual `set`.
#[derive(Default)]
pub struct ColorSpaceCache {
    by_ref: Mutex<HashMap<ObjRef, ColorSpace>>,
    by_name: Mutex<HashMap<Name, ColorSpace>>,
}

impl ColorSpaceCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously parsed space by indirect-object reference.
    pub fn get_by_ref(&self, r: ObjRef) -> Option<ColorSpace> {
        self.by_ref.lock().unwrap().get(&r).cloned()
    }

    /// Look up a previously parsed space by resource-dictionary name.
    pub fn get_by_name(&self, name: &Name) -> Option<ColorSpace> {
        self.by_name.lock().unwrap().get(name).cloned()
    }

    /// Record a parsed space under whichever of (name, ref) the caller
    /// resolved it through. Idempotent: setting the same key twice just
    /// overwrites with an equivalent space.
    pub fn set(&self, name: Option<Name>, obj_ref: Option<ObjRef>, space: ColorSpace) {
        if let Some(r) = obj_ref {
            self.by_ref.lock().unwrap().insert(r, space.clone());
        }
        if let Some(n) = name {
            self.by_name.lock().unwrap().insert(n, space);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_returns_none() {
        let cache = ColorSpaceCache::new();
        assert!(cache.get_by_ref(ObjRef::new(1, 0)).is_none());
        assert!(cache.get_by_name(&Name::new("Foo")).is_none());
    }

    #[test]
    fn set_then_get_by_ref_hits() {
        let cache = ColorSpaceCache::new();
        let r = ObjRef::new(3, 0);
        cache.set(None, Some(r), ColorSpace::device_rgb());
        let hit = cache.get_by_ref(r).unwrap();
        assert_eq!(hit.num_comps(), 3);
    }

    #[test]
    fn set_then_get_by_name_hits() {
        let cache = ColorSpaceCache::new();
        let name = Name::new("CS0");
        cache.set(Some(name.clone()), None, ColorSpace::device_cmyk());
        let hit = cache.get_by_name(&name).unwrap();
        assert_eq!(hit.num_comps(), 4);
    }

    #[test]
    fn set_is_idempotent_on_same_key() {
        let cache = ColorSpaceCache::new();
        let r = ObjRef::new(5, 0);
        cache.set(None, Some(r), ColorSpace::device_gray());
        cache.set(None, Some(r), ColorSpace::device_gray());
        assert_eq!(cache.by_ref.lock().unwrap().len(), 1);
    }
}
