mod primitive;
mod reader;
mod scan;
mod snapshot;

pub use primitive::Primitive;
pub use reader::{Address, MemoryExt, POINTER_SIZE, ReadMemory, WriteMemory};
pub use scan::{Pattern, Scanner, Token, first_hit};
pub use snapshot::{Region, SnapshotMemory};
