use std::cell::OnceCell;
use std::sync::Arc;

use glam::Vec3;
use serde::Serialize;

use super::layout::PartyLayout;
use super::status::StatusManager;
use crate::field::{FieldType, Handle, Remote, Scalar, Schema, ValueField, VectorField};
use crate::memory::{Address, ReadMemory};
use crate::offset::OffsetTable;

/// One roster slot
pub struct Member<'a, M: ?Sized> {
    handle: Handle<'a, M>,
    layout: Arc<PartyLayout>,
    status: OnceCell<StatusManager<'a, M>>,
}

impl<'a, M: ReadMemory + ?Sized + 'a> Remote<'a> for Member<'a, M> {
    type Memory = M;

    fn handle(&self) -> Handle<'a, M> {
        self.handle
    }

    fn offsets(&self) -> &OffsetTable {
        &self.layout.member
    }
}

impl<'a, M: ReadMemory + ?Sized + 'a> Member<'a, M> {
    pub const ID: Scalar<u32> = Scalar::new("id", 0);
    pub const CHARACTER_ID: Scalar<u64> = Scalar::new("character_id", 0);
    pub const CURRENT_HP: Scalar<u32> = Scalar::new("current_hp", 0);
    pub const MAX_HP: Scalar<u32> = Scalar::new("max_hp", 0);
    pub const CURRENT_MP: Scalar<u16> = Scalar::new("current_mp", 0);
    pub const MAX_MP: Scalar<u16> = Scalar::new("max_mp", 0);
    pub const CLASS_JOB: Scalar<i8> = Scalar::new("class_job", 0);
    pub const LEVEL: Scalar<i8> = Scalar::new("level", 0);
    pub const SHIELD: Scalar<u8> = Scalar::new("shield", 0);
    pub const POS: VectorField<Vec3> = VectorField::new("pos", Vec3::ZERO);
    pub const STATUS: ValueField<Self, StatusManager<'a, M>> =
        ValueField::new("status", Self::status_at);

    pub fn new(handle: Handle<'a, M>, layout: Arc<PartyLayout>) -> Self {
        Self {
            handle,
            layout,
            status: OnceCell::new(),
        }
    }

    /// Field declarations shared by every build
    pub fn schema() -> Schema {
        Schema::new("member")
            .field("id", FieldType::U32)
            .field("character_id", FieldType::U64)
            .field("current_hp", FieldType::U32)
            .field("max_hp", FieldType::U32)
            .field("current_mp", FieldType::U16)
            .field("max_mp", FieldType::U16)
            .field("class_job", FieldType::I8)
            .field("level", FieldType::I8)
            .field("shield", FieldType::U8)
            .field("pos", FieldType::Vec3)
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    /// Entity id of the member's actor
    pub fn id(&self) -> u32 {
        Self::ID.get(self)
    }

    pub fn character_id(&self) -> u64 {
        Self::CHARACTER_ID.get(self)
    }

    pub fn current_hp(&self) -> u32 {
        Self::CURRENT_HP.get(self)
    }

    pub fn max_hp(&self) -> u32 {
        Self::MAX_HP.get(self)
    }

    pub fn current_mp(&self) -> u16 {
        Self::CURRENT_MP.get(self)
    }

    pub fn max_mp(&self) -> u16 {
        Self::MAX_MP.get(self)
    }

    pub fn class_job(&self) -> i8 {
        Self::CLASS_JOB.get(self)
    }

    pub fn level(&self) -> i8 {
        Self::LEVEL.get(self)
    }

    pub fn shield(&self) -> u8 {
        Self::SHIELD.get(self)
    }

    pub fn pos(&self) -> Vec3 {
        Self::POS.get(self)
    }

    /// Status list embedded in the member record, built once per member
    pub fn status(&self) -> Option<&StatusManager<'a, M>> {
        Self::STATUS.get(self, &self.status)
    }

    fn status_at(&self, address: Address) -> StatusManager<'a, M> {
        StatusManager::new(self.handle.at(address), Arc::clone(&self.layout))
    }

    pub fn snapshot(&self) -> MemberSnapshot {
        MemberSnapshot {
            address: self.address(),
            id: self.id(),
            character_id: self.character_id(),
            current_hp: self.current_hp(),
            max_hp: self.max_hp(),
            current_mp: self.current_mp(),
            max_mp: self.max_mp(),
            class_job: self.class_job(),
            level: self.level(),
            shield: self.shield(),
            pos: self.pos().to_array(),
        }
    }
}

/// Plain copy of a member's fields at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberSnapshot {
    pub address: Address,
    pub id: u32,
    pub character_id: u64,
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_mp: u16,
    pub max_mp: u16,
    pub class_job: i8,
    pub level: i8,
    pub shield: u8,
    pub pos: [f32; 3],
}
