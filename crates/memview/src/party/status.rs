use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use super::layout::{self, PartyLayout};
use crate::error::Result;
use crate::field::{Handle, Remote, Scalar, Scope, field_address};
use crate::memory::{Address, Primitive, ReadMemory};
use crate::offset::OffsetTable;
use crate::overlay::{Array, Overlay};

/// One status effect slot
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize)]
pub struct Status {
    pub status_id: u16,
    pub param: u16,
    pub remaining: f32,
    pub source_id: u32,
}

impl Primitive for Status {
    const NAME: &'static str = "Status";
}

impl Status {
    /// Empty slots have id 0
    pub fn is_active(&self) -> bool {
        self.status_id != 0
    }
}

/// Fixed list of status effects carried by an actor or party member
pub struct StatusManager<'a, M: ?Sized> {
    handle: Handle<'a, M>,
    layout: Arc<PartyLayout>,
}

impl<'a, M: ReadMemory + ?Sized + 'a> Remote<'a> for StatusManager<'a, M> {
    type Memory = M;

    fn handle(&self) -> Handle<'a, M> {
        self.handle
    }

    fn offsets(&self) -> &OffsetTable {
        &self.layout.status
    }
}

impl<'a, M: ReadMemory + ?Sized + 'a> StatusManager<'a, M> {
    const OWNER: Scalar<Address> = Scalar::new("owner", 0);

    pub fn new(handle: Handle<'a, M>, layout: Arc<PartyLayout>) -> Self {
        Self { handle, layout }
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    /// Actor the list belongs to; 0 when unknown or unreadable
    pub fn owner(&self) -> Address {
        Self::OWNER.get(self)
    }

    /// All slots, active or not
    pub fn entries(&self) -> Result<Array<'a, M, Status>> {
        let address = field_address(self, "entries", Scope::Instance)?;
        Ok(Array::new(self.handle.at(address), layout::status::COUNT))
    }

    /// Slots with a non-zero status id, read in one request
    pub fn active(&self) -> Result<Vec<Status>> {
        let entries = self.entries()?.slice(..)?;
        Ok(entries.into_iter().filter(Status::is_active).collect())
    }

    pub fn find(&self, status_id: u16) -> Result<Option<Status>> {
        Ok(self
            .active()?
            .into_iter()
            .find(|s| s.status_id == status_id))
    }
}
