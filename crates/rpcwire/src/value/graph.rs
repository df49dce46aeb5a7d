// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Arena of objects plus a root value.

use crate::error::{AccessError, Result};
use crate::types::{TypeDescriptor, TypeRegistry};
use crate::value::{FromValue, Object, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handle of an object inside one [`ObjectGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Object arena with a root value.
///
/// Two fields holding the same [`ObjectId`] share one instance; the codec
/// preserves that sharing (and cycles) across a round trip.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    objects: Vec<Object>,
    root: Value,
}

impl ObjectGraph {
    /// Create an empty graph with a `Null` root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph holding a single object-free root value.
    pub fn with_root(root: impl Into<Value>) -> Self {
        Self {
            objects: Vec::new(),
            root: root.into(),
        }
    }

    /// Add an object and return its handle.
    pub fn insert(&mut self, object: Object) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    /// Add a blank instance of `descriptor`.
    pub fn instantiate(&mut self, descriptor: &Arc<TypeDescriptor>) -> Result<ObjectId> {
        Ok(self.insert(Object::blank(descriptor)?))
    }

    /// Add a blank instance of the registered type `type_id`.
    pub fn create(&mut self, registry: &TypeRegistry, type_id: &str) -> Result<ObjectId> {
        let descriptor = registry.resolve(type_id)?;
        self.instantiate(descriptor)
    }

    /// Borrow an object.
    pub fn object(&self, id: ObjectId) -> std::result::Result<&Object, AccessError> {
        self.objects
            .get(id.index())
            .ok_or(AccessError::NoSuchObject(id.0))
    }

    /// Mutably borrow an object.
    pub fn object_mut(&mut self, id: ObjectId) -> std::result::Result<&mut Object, AccessError> {
        self.objects
            .get_mut(id.index())
            .ok_or(AccessError::NoSuchObject(id.0))
    }

    /// Get a field of an object.
    pub fn get(&self, id: ObjectId, field: &str) -> std::result::Result<&Value, AccessError> {
        self.object(id)?.get(field)
    }

    /// Get a field of an object converted to `T`.
    pub fn get_as<T: FromValue>(
        &self,
        id: ObjectId,
        field: &str,
    ) -> std::result::Result<T, AccessError> {
        self.object(id)?.get_as(field)
    }

    /// Set a field of an object.
    pub fn set(
        &mut self,
        id: ObjectId,
        field: &str,
        value: impl Into<Value>,
    ) -> std::result::Result<(), AccessError> {
        self.object_mut(id)?.set(field, value)
    }

    /// Follow an object-valued field.
    pub fn follow(&self, id: ObjectId, field: &str) -> std::result::Result<ObjectId, AccessError> {
        let value = self.get(id, field)?;
        value
            .as_object()
            .ok_or_else(|| AccessError::NotAnObject(value.kind_name().to_string()))
    }

    /// Root value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Replace the root value.
    pub fn set_root(&mut self, root: impl Into<Value>) {
        self.root = root.into();
    }

    /// Root object, if the root is an object reference.
    pub fn root_object(&self) -> Option<ObjectId> {
        self.root.as_object()
    }

    /// Number of objects in the arena.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the arena holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over `(id, object)`.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, o)| (ObjectId(i as u32), o))
    }

    /// Structural equality of the parts reachable from both roots.
    ///
    /// Object identity must match one-to-one: two fields sharing an instance
    /// on one side must share an instance on the other. Arena positions and
    /// unreachable objects are ignored.
    pub fn equivalent(&self, other: &ObjectGraph) -> bool {
        let mut walk = Equivalence {
            left: self,
            right: other,
            forward: HashMap::new(),
            backward: HashMap::new(),
            pending: Vec::new(),
        };
        if !walk.values(&self.root, &other.root) {
            return false;
        }
        while let Some((l, r)) = walk.pending.pop() {
            let (Ok(lo), Ok(ro)) = (self.object(l), other.object(r)) else {
                return false;
            };
            if lo.type_id() != ro.type_id() {
                return false;
            }
            let mut lf = lo.fields();
            let mut rf = ro.fields();
            loop {
                match (lf.next(), rf.next()) {
                    (None, None) => break,
                    (Some((ln, lv)), Some((rn, rv))) if ln == rn => {
                        if !walk.values(lv, rv) {
                            return false;
                        }
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}

struct Equivalence<'a> {
    left: &'a ObjectGraph,
    right: &'a ObjectGraph,
    forward: HashMap<ObjectId, ObjectId>,
    backward: HashMap<ObjectId, ObjectId>,
    pending: Vec<(ObjectId, ObjectId)>,
}

impl Equivalence<'_> {
    fn values(&mut self, l: &Value, r: &Value) -> bool {
        match (l, r) {
            (Value::Object(a), Value::Object(b)) => self.pair(*a, *b),
            (Value::List(a), Value::List(b)) | (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.values(x, y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((lk, lv), (rk, rv))| self.values(lk, rk) && self.values(lv, rv))
            }
            // Bit-level float comparison so NaN payloads and -0.0 count.
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            _ => l == r,
        }
    }

    fn pair(&mut self, l: ObjectId, r: ObjectId) -> bool {
        match (self.forward.get(&l), self.backward.get(&r)) {
            (Some(&mapped), Some(&back)) => mapped == r && back == l,
            (None, None) => {
                if self.left.object(l).is_err() || self.right.object(r).is_err() {
                    return false;
                }
                self.forward.insert(l, r);
                self.backward.insert(r, l);
                self.pending.push((l, r));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::types::{PrimitiveKind, TypeDescriptorBuilder};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeDescriptorBuilder::new("Node")
                    .field("v", PrimitiveKind::I32)
                    .object_field("a", "Node")
                    .object_field("b", "Node")
                    .build(),
            )
            .expect("register");
        registry
    }

    #[test]
    fn test_create_and_access() {
        let registry = registry();
        let mut graph = ObjectGraph::new();
        assert!(graph.is_empty());
        let n = graph.create(&registry, "Node").expect("create");
        graph.set(n, "v", 4i32).expect("set");
        assert_eq!(graph.get_as::<i32>(n, "v"), Ok(4));
        assert_eq!(graph.len(), 1);
        assert!(matches!(
            graph.follow(n, "a"),
            Err(AccessError::NotAnObject(k)) if k == "null"
        ));
        assert!(matches!(
            graph.create(&registry, "Missing"),
            Err(CodecError::UnknownType(_))
        ));
        assert!(graph.object(ObjectId(9)).is_err());
    }

    #[test]
    fn test_equivalent_respects_sharing() {
        let registry = registry();

        // root -> shared, root.a == root.b
        let mut shared = ObjectGraph::new();
        let root = shared.create(&registry, "Node").expect("root");
        let child = shared.create(&registry, "Node").expect("child");
        shared.set(root, "a", child).expect("a");
        shared.set(root, "b", child).expect("b");
        shared.set_root(root);

        // same values, two distinct children
        let mut split = ObjectGraph::new();
        let root2 = split.create(&registry, "Node").expect("root");
        let c1 = split.create(&registry, "Node").expect("c1");
        let c2 = split.create(&registry, "Node").expect("c2");
        split.set(root2, "a", c1).expect("a");
        split.set(root2, "b", c2).expect("b");
        split.set_root(root2);

        assert!(shared.equivalent(&shared.clone()));
        assert!(!shared.equivalent(&split));
        assert!(!split.equivalent(&shared));
    }

    #[test]
    fn test_equivalent_cycles_and_arena_order() {
        let registry = registry();

        let mut g1 = ObjectGraph::new();
        let a = g1.create(&registry, "Node").expect("a");
        let b = g1.create(&registry, "Node").expect("b");
        g1.set(a, "a", b).expect("ab");
        g1.set(b, "a", a).expect("ba");
        g1.set_root(a);

        // build in reverse arena order
        let mut g2 = ObjectGraph::new();
        let b2 = g2.create(&registry, "Node").expect("b");
        let a2 = g2.create(&registry, "Node").expect("a");
        g2.set(a2, "a", b2).expect("ab");
        g2.set(b2, "a", a2).expect("ba");
        g2.set_root(a2);

        assert!(g1.equivalent(&g2));
        g2.set(b2, "v", 1i32).expect("v");
        assert!(!g1.equivalent(&g2));
    }

    #[test]
    fn test_equivalent_float_bits() {
        let g1 = ObjectGraph::with_root(f64::NAN);
        let g2 = ObjectGraph::with_root(f64::NAN);
        assert!(g1.equivalent(&g2));
        assert!(!ObjectGraph::with_root(0.0f64).equivalent(&ObjectGraph::with_root(-0.0f64)));
    }
}
