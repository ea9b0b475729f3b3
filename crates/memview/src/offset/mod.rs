mod table;
mod version;

pub use table::*;
pub use version::*;
