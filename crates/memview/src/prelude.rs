//! Prelude module for convenient imports
//!
//! ```ignore
//! use memview::prelude::*;
//! ```
//!
//! This brings into scope the memory traits, the descriptor and overlay
//! types, the roster views and `Error`/`Result`.

// Memory access
pub use crate::memory::{Address, MemoryExt, ReadMemory, Scanner, SnapshotMemory, WriteMemory};

// Error handling
pub use crate::error::{Error, Result};

// Layout selection
pub use crate::offset::{GameVersion, OffsetTable, VersionProbe};

// Descriptors and overlays
pub use crate::field::{Handle, Remote, Scalar, Schema, Value};
pub use crate::overlay::{Array, Container, Overlay, Ptr};

// Roster
pub use crate::config::SessionConfig;
pub use crate::party::{Member, Party, PartyLayout, PartyManager};
