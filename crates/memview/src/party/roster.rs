use std::sync::Arc;

use super::layout::PartyLayout;
use super::member::{Member, MemberSnapshot};
use crate::error::Result;
use crate::field::{Handle, Remote, Scalar};
use crate::memory::{Address, ReadMemory};
use crate::offset::OffsetTable;

/// Party roster: a fixed block of member slots plus a live member count.
///
/// All `capacity` member views are built up front, so their cached
/// sub-structures survive across reads. Only the first `len()` are live.
pub struct Party<'a, M: ?Sized> {
    handle: Handle<'a, M>,
    layout: Arc<PartyLayout>,
    members: Vec<Member<'a, M>>,
}

impl<'a, M: ReadMemory + ?Sized + 'a> Remote<'a> for Party<'a, M> {
    type Memory = M;

    fn handle(&self) -> Handle<'a, M> {
        self.handle
    }

    fn offsets(&self) -> &OffsetTable {
        &self.layout.party
    }
}

impl<'a, M: ReadMemory + ?Sized + 'a> Party<'a, M> {
    pub const PARTY_SIZE: Scalar<u8> = Scalar::new("party_size", 0);

    pub fn new(handle: Handle<'a, M>, layout: Arc<PartyLayout>, capacity: usize) -> Result<Self> {
        let first = handle.offset(layout.party.offset("members")?);
        let stride = layout.member.size();
        let members = (0..capacity as u64)
            .map(|i| Member::new(first.offset(i * stride), Arc::clone(&layout)))
            .collect();
        Ok(Self {
            handle,
            layout,
            members,
        })
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    pub fn layout(&self) -> &PartyLayout {
        &self.layout
    }

    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    /// Live member count, read now and clamped to the capacity
    pub fn len(&self) -> usize {
        (Self::PARTY_SIZE.get(self) as usize).min(self.capacity())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live member `index`, or `None` past the current count
    pub fn get(&self, index: usize) -> Option<&Member<'a, M>> {
        if index >= self.len() {
            return None;
        }
        self.members.get(index)
    }

    /// Live members; the count is read once when the iterator is created
    pub fn iter(&self) -> std::slice::Iter<'_, Member<'a, M>> {
        self.members[..self.len()].iter()
    }

    /// Every slot, including ones past the live count
    pub fn slots(&self) -> &[Member<'a, M>] {
        &self.members
    }

    pub fn snapshot(&self) -> Vec<MemberSnapshot> {
        self.iter().map(Member::snapshot).collect()
    }
}

impl<'p, 'a, M: ReadMemory + ?Sized + 'a> IntoIterator for &'p Party<'a, M> {
    type Item = &'p Member<'a, M>;
    type IntoIter = std::slice::Iter<'p, Member<'a, M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
