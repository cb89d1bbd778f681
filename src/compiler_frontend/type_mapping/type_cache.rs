//! Session-wide store of semantic type nodes, keyed by signature.
//!
//! Construction is two-phase. `reserve` publishes a `Pending` slot under its signature
//! before any dependent is resolved, so a cyclic reference finds the id and stops there.
//! `complete` then fills the slot exactly once. Reading a pending slot through `get` is a bug
//! and panics.
//!
//! `clear` drops every node and starts a new generation. Ids handed out before the clear
//! never compare equal to ids handed out after it.

use crate::compiler_frontend::string_interning::{StringId, StringTable};
use crate::compiler_frontend::type_mapping::java_types::{
    JavaType, JavaTypeKind, PrimitiveKind, TypeId,
};
use crate::projects::settings::TYPE_CACHE_INITIAL_CAPACITY;
use crate::type_log;
use rustc_hash::FxHashMap;

const UNKNOWN_SIGNATURE: &str = "{undefined}";

/// Keywords where they exist. The others are braced so no class name can collide.
fn primitive_signature(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::String => "{String}",
        PrimitiveKind::None => "{none}",
        other => other.keyword(),
    }
}

#[derive(Debug)]
enum Slot {
    Pending(JavaTypeKind),
    Ready(JavaType),
}

pub struct TypeCache {
    generation: u32,
    slots: Vec<Slot>,

    /// Signature of each slot, parallel to `slots`
    keys: Vec<StringId>,
    by_signature: FxHashMap<StringId, TypeId>,
    signatures: StringTable,
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCache {
    pub fn new() -> Self {
        let mut cache = TypeCache {
            generation: TypeId::RESERVED_GENERATION + 1,
            slots: Vec::with_capacity(TYPE_CACHE_INITIAL_CAPACITY),
            keys: Vec::with_capacity(TYPE_CACHE_INITIAL_CAPACITY),
            by_signature: FxHashMap::default(),
            signatures: StringTable::with_capacity(TYPE_CACHE_INITIAL_CAPACITY),
        };
        cache.seed_reserved();
        cache
    }

    fn seed_reserved(&mut self) {
        for kind in PrimitiveKind::ALL {
            let key = self.signatures.intern(primitive_signature(kind));
            self.slots.push(Slot::Ready(JavaType::Primitive(kind)));
            self.keys.push(key);
            self.by_signature.insert(key, kind.type_id());
        }

        let key = self.signatures.intern(UNKNOWN_SIGNATURE);
        self.slots.push(Slot::Ready(JavaType::Unknown));
        self.keys.push(key);
        self.by_signature.insert(key, TypeId::UNKNOWN);

        debug_assert_eq!(self.slots.len(), TypeId::FIRST_DYNAMIC as usize);
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of constructed nodes, pending ones included
    pub fn len(&self) -> usize {
        self.slots.len() - TypeId::FIRST_DYNAMIC as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookup(&self, signature: &str) -> Option<TypeId> {
        let key = self.signatures.get_existing(signature)?;
        self.by_signature.get(&key).copied()
    }

    /// Publish a pending node under `signature`.
    /// The signature must not be cached yet.
    pub fn reserve(&mut self, signature: &str, kind: JavaTypeKind) -> TypeId {
        let key = self.signatures.intern(signature);
        assert!(
            !self.by_signature.contains_key(&key),
            "type signature reserved twice: {signature}"
        );

        let id = TypeId::new(self.slots.len() as u32, self.generation);
        self.slots.push(Slot::Pending(kind));
        self.keys.push(key);
        self.by_signature.insert(key, id);

        type_log!("Reserved ", Dark Magenta signature);
        id
    }

    /// Fill a pending node. Each node is completed exactly once, with a type of the kind
    /// it was reserved as.
    pub fn complete(&mut self, id: TypeId, ty: JavaType) {
        self.check_generation(id);
        let slot = &mut self.slots[id.index()];

        match slot {
            Slot::Pending(kind) => {
                assert_eq!(*kind, ty.kind(), "type completed as a different kind");
                *slot = Slot::Ready(ty);
            }
            Slot::Ready(_) => panic!("type {id:?} completed twice"),
        }
    }

    pub fn is_pending(&self, id: TypeId) -> bool {
        self.check_generation(id);
        matches!(self.slots[id.index()], Slot::Pending(_))
    }

    /// The variant of a node, pending or not
    pub fn kind(&self, id: TypeId) -> JavaTypeKind {
        self.check_generation(id);
        match &self.slots[id.index()] {
            Slot::Pending(kind) => *kind,
            Slot::Ready(ty) => ty.kind(),
        }
    }

    pub fn get(&self, id: TypeId) -> &JavaType {
        self.check_generation(id);
        match &self.slots[id.index()] {
            Slot::Ready(ty) => ty,
            Slot::Pending(kind) => panic!("read of pending {kind:?} node {id:?}"),
        }
    }

    /// `None` while the node is still under construction
    pub fn try_get(&self, id: TypeId) -> Option<&JavaType> {
        self.check_generation(id);
        match &self.slots[id.index()] {
            Slot::Ready(ty) => Some(ty),
            Slot::Pending(_) => None,
        }
    }

    pub fn signature(&self, id: TypeId) -> &str {
        self.check_generation(id);
        self.signatures.resolve(self.keys[id.index()])
    }

    /// Ids of every constructed node, in allocation order
    pub fn ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (TypeId::FIRST_DYNAMIC..self.slots.len() as u32)
            .map(|index| TypeId::new(index, self.generation))
    }

    /// Drop every node and its signature. Reserved ids stay valid.
    pub fn clear(&mut self) {
        let dropped = self.len();

        self.generation += 1;
        self.slots.clear();
        self.keys.clear();
        self.by_signature.clear();
        self.signatures = StringTable::with_capacity(TYPE_CACHE_INITIAL_CAPACITY);
        self.seed_reserved();

        type_log!(Yellow "Type cache cleared, ", {dropped}, " nodes dropped");
    }

    fn check_generation(&self, id: TypeId) {
        assert!(
            id.is_reserved() || id.generation() == self.generation,
            "stale type id {id:?} read from cache generation {}",
            self.generation
        );
        assert!(id.index() < self.slots.len(), "type id {id:?} out of range");
    }
}

#[cfg(test)]
#[path = "tests/type_cache_tests.rs"]
mod tests;
