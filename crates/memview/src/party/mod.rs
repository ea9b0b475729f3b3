//! Party roster views.
//!
//! The roster lives in a single block: `capacity` fixed-size member records
//! followed (far later) by a one-byte live count. Two record layouts exist,
//! selected by game build through [`PartyLayout::for_version`].

pub mod layout;
mod manager;
mod member;
mod roster;
mod status;

pub use layout::PartyLayout;
pub use manager::PartyManager;
pub use member::{Member, MemberSnapshot};
pub use roster::Party;
pub use status::{Status, StatusManager};
