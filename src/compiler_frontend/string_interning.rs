use crate::projects::settings::MINIMUM_STRING_TABLE_CAPACITY;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// A unique identifier for an interned string.
/// Only meaningful for the StringTable that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId(u32);

impl StringId {
    #[inline]
    pub fn resolve(self, table: &StringTable) -> &str {
        table.resolve(self)
    }
}

impl std::fmt::Display for StringId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StringId({})", self.0)
    }
}

/// Stores each unique string once.
///
/// Two tables live in a session. The toolchain interns identifiers into one while tokenizing,
/// and the type cache interns signature keys into its own so the keys are dropped with the cache.
///
/// - Vec<Rc<str>> for O(1) ID→string resolution
/// - FxHashMap<Rc<str>, StringId> for O(1) string→ID lookup while interning
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<Rc<str>>,
    string_to_id: FxHashMap<Rc<str>, StringId>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::with_capacity(MINIMUM_STRING_TABLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strings: Vec::with_capacity(capacity),
            string_to_id: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Intern a string slice, returning its unique ID.
    #[inline]
    pub fn intern(&mut self, s: &str) -> StringId {
        // Single hash lookup, no allocation on the hot path
        if let Some(&existing_id) = self.string_to_id.get(s) {
            return existing_id;
        }

        self.intern_new(Rc::from(s))
    }

    /// Intern an owned String, reusing its allocation when the string is new.
    #[inline]
    pub fn get_or_intern(&mut self, s: String) -> StringId {
        if let Some(&existing_id) = self.string_to_id.get(s.as_str()) {
            return existing_id;
        }

        self.intern_new(Rc::from(s.into_boxed_str()))
    }

    #[cold]
    #[inline(never)]
    fn intern_new(&mut self, shared: Rc<str>) -> StringId {
        let new_id = StringId(self.strings.len() as u32);

        // Both maps share the same allocation
        self.string_to_id.insert(Rc::clone(&shared), new_id);
        self.strings.push(shared);

        new_id
    }

    /// Resolve an interned string ID back to its string content.
    /// An id from another table is a caller bug and resolves to an empty string.
    #[inline]
    pub fn resolve(&self, id: StringId) -> &str {
        self.try_resolve(id).unwrap_or_default()
    }

    /// None when the id was not handed out by this table.
    #[inline]
    fn try_resolve(&self, id: StringId) -> Option<&str> {
        self.strings.get(id.0 as usize).map(|s| s.as_ref())
    }

    /// Check if a string is already interned without interning it.
    #[inline]
    pub fn get_existing(&self, s: &str) -> Option<StringId> {
        self.string_to_id.get(s).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/string_interning_tests.rs"]
mod tests;
