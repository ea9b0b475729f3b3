use std::sync::Arc;

use tracing::debug;

use super::layout::PartyLayout;
use super::roster::Party;
use crate::config::SessionConfig;
use crate::error::Result;
use crate::field::Handle;
use crate::memory::{Address, ReadMemory, Scanner, first_hit};
use crate::offset::{GameVersion, VersionProbe};

/// The live roster and the replay roster, resolved once per session
pub struct PartyManager<'a, M: ?Sized> {
    version: GameVersion,
    real: Party<'a, M>,
    replay: Party<'a, M>,
}

impl<'a, M: ReadMemory + ?Sized + 'a> PartyManager<'a, M> {
    /// Locate both rosters by signature and pick the layout for the build.
    ///
    /// A version pinned in `config` wins over `probe`.
    pub fn new(memory: &'a M, probe: &dyn VersionProbe, config: &SessionConfig) -> Result<Self>
    where
        M: Scanner,
    {
        let version = match config.version {
            Some(version) => version,
            None => probe.probe()?,
        };

        let real = first_hit(
            memory.find_point(&config.party_signature)?,
            &config.party_signature,
        )?;
        let (_, distance) = first_hit(
            memory.find_val(&config.replay_signature)?,
            &config.replay_signature,
        )?;
        let replay = real.wrapping_add_signed(distance);
        debug!(
            "Party at {:#x}, replay party at {:#x} (version {})",
            real, replay, version
        );

        Self::with_addresses(memory, version, real, replay, config.roster_capacity)
    }

    /// Build from already known roster addresses
    pub fn with_addresses(
        memory: &'a M,
        version: GameVersion,
        real: Address,
        replay: Address,
        capacity: usize,
    ) -> Result<Self> {
        let layout = Arc::new(PartyLayout::for_version(&version));
        Ok(Self {
            version,
            real: Party::new(Handle::new(memory, real), Arc::clone(&layout), capacity)?,
            replay: Party::new(Handle::new(memory, replay), layout, capacity)?,
        })
    }

    pub fn version(&self) -> &GameVersion {
        &self.version
    }

    pub fn real(&self) -> &Party<'a, M> {
        &self.real
    }

    pub fn replay(&self) -> &Party<'a, M> {
        &self.replay
    }

    /// Roster currently shown by the game
    pub fn party_list(&self, in_replay: bool) -> &Party<'a, M> {
        if in_replay { &self.replay } else { &self.real }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::memory::{MemoryExt, SnapshotMemory};
    use crate::offset::FixedVersion;
    use crate::party::layout::{member_650, party};

    const CODE: Address = 0x1_4000_0000;
    const REAL: Address = 0x1_4100_0000;
    const REPLAY_DISTANCE: i32 = 0x8000;

    /// Code region holding both signatures, data region holding both rosters
    fn game_memory() -> SnapshotMemory {
        let mut code = vec![0xCCu8; 0x100];
        // 48 8d 0d <disp32> 48 89 74 24 10 b2
        let lea_end = CODE + 0x10 + 7;
        let disp = (REAL - lea_end) as i32;
        code[0x10..0x13].copy_from_slice(&[0x48, 0x8D, 0x0D]);
        code[0x13..0x17].copy_from_slice(&disp.to_le_bytes());
        code[0x17..0x1D].copy_from_slice(&[0x48, 0x89, 0x74, 0x24, 0x10, 0xB2]);
        // 74 05 f6 05 <5 bytes> 48 8d 05 <distance> 75
        code[0x40..0x44].copy_from_slice(&[0x74, 0x05, 0xF6, 0x05]);
        code[0x49..0x4C].copy_from_slice(&[0x48, 0x8D, 0x05]);
        code[0x4C..0x50].copy_from_slice(&REPLAY_DISTANCE.to_le_bytes());
        code[0x50] = 0x75;

        let mem = SnapshotMemory::new()
            .with_bytes(CODE, code)
            .with_region(REAL, 0x10000);
        mem.write_pod(REAL + party::PARTY_SIZE_650, 4u8).unwrap();
        mem.write_pod(REAL + member_650::ID, 0xAAu32).unwrap();
        let replay = REAL + REPLAY_DISTANCE as u64;
        mem.write_pod(replay + party::PARTY_SIZE_650, 1u8).unwrap();
        mem.write_pod(replay + member_650::ID, 0xBBu32).unwrap();
        mem
    }

    #[test]
    fn test_resolves_real_and_replay_party() {
        let mem = game_memory();
        let probe = FixedVersion(GameVersion::new(6, 5, 1));
        let manager = PartyManager::new(&mem, &probe, &SessionConfig::default()).unwrap();

        assert_eq!(manager.real().address(), REAL);
        assert_eq!(manager.replay().address(), REAL + REPLAY_DISTANCE as u64);
        assert_eq!(manager.party_list(false).len(), 4);
        assert_eq!(manager.party_list(true).len(), 1);
        assert_eq!(manager.party_list(false).get(0).unwrap().id(), 0xAA);
        assert_eq!(manager.party_list(true).get(0).unwrap().id(), 0xBB);
    }

    #[test]
    fn test_pinned_version_overrides_probe() {
        let mem = game_memory();
        let probe = FixedVersion(GameVersion::new(6, 5, 1));
        let config = SessionConfig::builder()
            .version(GameVersion::new(6, 4, 0))
            .build();
        let manager = PartyManager::new(&mem, &probe, &config).unwrap();

        assert_eq!(manager.version(), &GameVersion::new(6, 4, 0));
        assert_eq!(manager.real().layout(), &PartyLayout::legacy());
    }

    #[test]
    fn test_missing_signature() {
        let mem = SnapshotMemory::new().with_region(CODE, 0x100);
        let probe = FixedVersion(GameVersion::new(6, 5, 1));
        let result = PartyManager::new(&mem, &probe, &SessionConfig::default());
        assert!(matches!(result, Err(Error::PatternNotFound(_))));
    }
}
