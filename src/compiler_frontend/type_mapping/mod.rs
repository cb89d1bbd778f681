//! The semantic type graph and the mapper that builds it.
//!
//! `TypeCache` owns every node. `TypeMapper` borrows the cache and the toolchain's symbol
//! table for the duration of one output build and hands back `TypeId`s.

pub mod annotation_values;
pub mod java_types;
pub mod signatures;
pub mod symbol_recovery;
pub mod type_cache;
pub mod type_display;
pub mod type_mapper;

pub use java_types::{JavaType, TypeId};
pub use type_cache::TypeCache;
pub use type_mapper::TypeMapper;
