use std::sync::Arc;

use glam::Vec3;
use memview::party::layout::{member, party};
use memview::prelude::*;

const BASE: Address = 0x2_0000_0000;

/// Legacy roster with every slot populated, live count 5
fn populated_roster() -> SnapshotMemory {
    let mem = SnapshotMemory::new().with_region(BASE, 0x4000);
    for slot in 0..party::CAPACITY as u64 {
        let record = BASE + slot * member::SIZE;
        mem.write_pod(record + member::ID, 0x1000_0000 + slot as u32).unwrap();
        mem.write_pod(record + member::CURRENT_HP, 1000 * (slot as u32 + 1)).unwrap();
        mem.write_pod(record + member::LEVEL, 90i8).unwrap();
        mem.write_pod(record + member::POS, Vec3::new(slot as f32, 0.0, 1.0)).unwrap();
    }
    mem.write_pod(BASE + party::PARTY_SIZE, 5u8).unwrap();
    mem
}

#[test]
fn test_roster_yields_exactly_live_members() {
    let mem = populated_roster();
    let roster = Party::new(Handle::new(&mem, BASE), Arc::new(PartyLayout::legacy()), 28).unwrap();

    let members: Vec<_> = roster.iter().collect();
    assert_eq!(members.len(), 5);
    for (i, m) in members.iter().enumerate() {
        assert_eq!(m.id(), 0x1000_0000 + i as u32);
        assert_eq!(m.current_hp(), 1000 * (i as u32 + 1));
    }

    // slots past the live count hold data but are not yielded
    assert!(roster.slots()[5..].iter().all(|m| m.id() != 0));
    assert!(roster.get(5).is_none());
}

#[test]
fn test_roster_survives_snapshot_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.json");
    populated_roster().save(&path).unwrap();

    let mem = SnapshotMemory::load(&path).unwrap();
    let manager =
        PartyManager::with_addresses(&mem, GameVersion::new(6, 4, 5), BASE, BASE, 28).unwrap();
    let roster = manager.party_list(false);

    assert_eq!(roster.len(), 5);
    assert_eq!(roster.get(3).unwrap().pos(), Vec3::new(3.0, 0.0, 1.0));
    let snapshot = roster.snapshot();
    assert_eq!(snapshot[4].level, 90);
}

#[test]
fn test_schema_names_match_both_layouts() {
    let schema = Member::<SnapshotMemory>::schema();
    for layout in [PartyLayout::legacy(), PartyLayout::v650()] {
        for (name, _) in schema.fields() {
            assert!(layout.member.offset(name).is_ok(), "{} missing", name);
        }
    }
}

#[test]
fn test_vanishing_roster_degrades_to_defaults() {
    let mem = populated_roster();
    let roster = Party::new(Handle::new(&mem, BASE), Arc::new(PartyLayout::legacy()), 28).unwrap();
    let first = roster.get(0).unwrap();
    assert_eq!(first.level(), 90);

    mem.inject_fault(BASE..BASE + 0x4000);
    assert_eq!(first.level(), 0);
    assert_eq!(first.pos(), Vec3::ZERO);
    assert!(roster.is_empty());

    mem.clear_faults();
    assert_eq!(roster.len(), 5);
}
