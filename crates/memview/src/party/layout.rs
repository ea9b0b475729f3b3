//! Offset tables for the party roster, one set per game build.
//!
//! Raw constants are grouped by structure and build; [`PartyLayout`] turns
//! them into the tables the views resolve against.

use std::sync::Arc;

use serde::Serialize;

use crate::offset::{GameVersion, OffsetTable, Versioned};

/// Member record before 6.5
pub mod member {
    pub const STATUS: u64 = 0x0;
    pub const POS: u64 = 0x190;
    pub const CHARACTER_ID: u64 = 0x1A0;
    pub const ID: u64 = 0x1A8;
    pub const CURRENT_HP: u64 = 0x1B4;
    pub const MAX_HP: u64 = 0x1B8;
    pub const CURRENT_MP: u64 = 0x1BC;
    pub const MAX_MP: u64 = 0x1BE;
    pub const CLASS_JOB: u64 = 0x205;
    pub const LEVEL: u64 = 0x206;
    pub const SHIELD: u64 = 0x207;

    pub const SIZE: u64 = 0x230;
}

/// Member record from 6.5 on
pub mod member_650 {
    pub const STATUS: u64 = 0x0;
    pub const POS: u64 = 0x2F0;
    pub const CHARACTER_ID: u64 = 0x300;
    pub const ID: u64 = 0x308;
    pub const CURRENT_HP: u64 = 0x314;
    pub const MAX_HP: u64 = 0x318;
    pub const CURRENT_MP: u64 = 0x31C;
    pub const MAX_MP: u64 = 0x31E;
    pub const CLASS_JOB: u64 = 0x365;
    pub const LEVEL: u64 = 0x366;
    pub const SHIELD: u64 = 0x367;

    pub const SIZE: u64 = 0x390;
}

/// Party header
pub mod party {
    pub const MEMBERS: u64 = 0x0;
    pub const PARTY_SIZE: u64 = 0x3D5C;
    pub const PARTY_SIZE_650: u64 = 0x63DC;

    /// Member slots allocated by the game, alliance included
    pub const CAPACITY: usize = 28;
}

/// Status list embedded at the start of every member (same on all builds)
pub mod status {
    pub const OWNER: u64 = 0x0;
    pub const ENTRIES: u64 = 0x8;
    pub const ENTRY_SIZE: u64 = 0xC;
    pub const COUNT: usize = 30;
}

/// Tables for every structure in the roster, for one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyLayout {
    pub party: Arc<OffsetTable>,
    pub member: Arc<OffsetTable>,
    pub status: Arc<OffsetTable>,
}

/// First build using the 6.5 member record
pub const V650: GameVersion = GameVersion::new(6, 5, 0);

impl PartyLayout {
    /// Layout of builds before 6.5
    pub fn legacy() -> Self {
        Self {
            party: Arc::new(
                OffsetTable::builder("party")
                    .field("members", party::MEMBERS)
                    .field("party_size", party::PARTY_SIZE)
                    .build(),
            ),
            member: Arc::new(
                OffsetTable::builder("member")
                    .field("status", member::STATUS)
                    .field("pos", member::POS)
                    .field("character_id", member::CHARACTER_ID)
                    .field("id", member::ID)
                    .field("current_hp", member::CURRENT_HP)
                    .field("max_hp", member::MAX_HP)
                    .field("current_mp", member::CURRENT_MP)
                    .field("max_mp", member::MAX_MP)
                    .field("class_job", member::CLASS_JOB)
                    .field("level", member::LEVEL)
                    .field("shield", member::SHIELD)
                    .size(member::SIZE)
                    .build(),
            ),
            status: Arc::new(status_table()),
        }
    }

    /// Layout of 6.5 and later
    pub fn v650() -> Self {
        Self {
            party: Arc::new(
                OffsetTable::builder("party")
                    .field("members", party::MEMBERS)
                    .field("party_size", party::PARTY_SIZE_650)
                    .build(),
            ),
            member: Arc::new(
                OffsetTable::builder("member")
                    .field("status", member_650::STATUS)
                    .field("pos", member_650::POS)
                    .field("character_id", member_650::CHARACTER_ID)
                    .field("id", member_650::ID)
                    .field("current_hp", member_650::CURRENT_HP)
                    .field("max_hp", member_650::MAX_HP)
                    .field("current_mp", member_650::CURRENT_MP)
                    .field("max_mp", member_650::MAX_MP)
                    .field("class_job", member_650::CLASS_JOB)
                    .field("level", member_650::LEVEL)
                    .field("shield", member_650::SHIELD)
                    .size(member_650::SIZE)
                    .build(),
            ),
            status: Arc::new(status_table()),
        }
    }

    /// Every known layout keyed by the first build it applies to
    pub fn catalog() -> Versioned<PartyLayout> {
        Versioned::new()
            .with(GameVersion::new(0, 0, 0), Self::legacy())
            .with(V650, Self::v650())
    }

    pub fn for_version(version: &GameVersion) -> Self {
        Self::catalog()
            .select(version)
            .cloned()
            .unwrap_or_else(Self::legacy)
    }
}

fn status_table() -> OffsetTable {
    OffsetTable::builder("status_manager")
        .field("owner", status::OWNER)
        .field("entries", status::ENTRIES)
        .size(status::ENTRIES + status::ENTRY_SIZE * status::COUNT as u64)
        .build()
}
