//! # memview
//!
//! Typed views over the memory of another process.
//!
//! This crate provides:
//! - Raw memory access traits and an in-memory snapshot backend
//! - Offset tables selected by game version
//! - Property descriptors for scalars, bit-fields, vectors, strings and sub-structures
//! - Array, pointer and begin/end container overlays
//! - Party roster views built from the above
//!
//! Every read goes to the target at the moment of the call. Views own no
//! foreign memory; they hold a memory reference, a base address and the
//! offset table they were built with.

pub mod config;
pub mod error;
pub mod field;
pub mod memory;
pub mod offset;
pub mod overlay;
pub mod party;
pub mod prelude;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::{Error, Result};
pub use field::{
    BitField, Factory, FieldType, Handle, PointerField, Remote, Scalar, Schema, Scope,
    StringField, StructField, Value, ValueField, VectorField,
};
pub use memory::{
    Address, MemoryExt, POINTER_SIZE, Pattern, Primitive, ReadMemory, Region, Scanner,
    SnapshotMemory, Token, WriteMemory, first_hit,
};
pub use offset::{
    FixedVersion, GameVersion, OffsetTable, OffsetTableBuilder, Slot, VersionProbe, Versioned,
    load_table, save_table,
};
pub use overlay::{Array, Container, Elements, Overlay, Ptr};
pub use party::{Member, MemberSnapshot, Party, PartyLayout, PartyManager, Status, StatusManager};
