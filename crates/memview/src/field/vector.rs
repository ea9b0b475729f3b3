use bytemuck::Pod;

use super::{Remote, Scope, field_address, swallow};
use crate::error::Result;
use crate::memory::{MemoryExt, WriteMemory};

/// Fixed-size aggregate decoded straight from its bytes (e.g. `glam::Vec3`)
#[derive(Debug, Clone, Copy)]
pub struct VectorField<V> {
    key: &'static str,
    default: V,
    scope: Scope,
}

impl<V: Pod> VectorField<V> {
    pub const fn new(key: &'static str, default: V) -> Self {
        Self {
            key,
            default,
            scope: Scope::Instance,
        }
    }

    pub const fn global(self) -> Self {
        Self {
            scope: Scope::Static,
            ..self
        }
    }

    pub fn try_get<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> Result<V> {
        let address = field_address(entity, self.key, self.scope)?;
        entity.handle().memory().read_pod(address)
    }

    pub fn get<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> V {
        self.try_get(entity).unwrap_or_else(|e| {
            swallow(entity.offsets(), self.key, &e);
            self.default
        })
    }

    pub fn try_set<'a, E>(&self, entity: &E, value: V) -> Result<()>
    where
        E: Remote<'a> + ?Sized,
        E::Memory: WriteMemory,
    {
        let address = field_address(entity, self.key, self.scope)?;
        entity
            .handle()
            .memory()
            .write_bytes(address, bytemuck::bytes_of(&value))
    }

    pub fn set<'a, E>(&self, entity: &E, value: V)
    where
        E: Remote<'a> + ?Sized,
        E::Memory: WriteMemory,
    {
        if let Err(e) = self.try_set(entity, value) {
            swallow(entity.offsets(), self.key, &e);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::field::testing::Probe;
    use crate::memory::{ReadMemory, SnapshotMemory};
    use crate::offset::OffsetTable;

    const POS: VectorField<Vec3> = VectorField::new("pos", Vec3::ZERO);

    #[test]
    fn test_vec3_roundtrip() {
        let mem = SnapshotMemory::new().with_region(0x1000, 0x40);
        let actor = Probe::new(
            &mem,
            0x1000,
            OffsetTable::builder("pos").field("pos", 0x20).build(),
        );

        POS.set(&actor, Vec3::new(100.5, 0.0, -42.25));
        assert_eq!(POS.get(&actor), Vec3::new(100.5, 0.0, -42.25));
        assert_eq!(mem.read_f32(0x1028).unwrap(), -42.25);
    }

    #[test]
    fn test_static_vector_ignores_instance_address() {
        let mem = SnapshotMemory::new()
            .with_region(0x0, 0x40)
            .with_region(0x1000, 0x40);
        let table = || OffsetTable::builder("pos").field("pos", 0x20).build();
        let global_pos = VectorField::new("pos", Vec3::ONE).global();

        global_pos.set(&Probe::new(&mem, 0x1000, table()), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(mem.read_f32(0x24).unwrap(), 2.0);
        assert_eq!(global_pos.get(&Probe::new(&mem, 0, table())), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(POS.get(&Probe::new(&mem, 0x1000, table())), Vec3::ZERO);
    }

    #[test]
    fn test_vec3_default_on_truncated_region() {
        let mem = SnapshotMemory::new().with_region(0x1000, 0x28);
        let actor = Probe::new(
            &mem,
            0x1000,
            OffsetTable::builder("pos").field("pos", 0x20).build(),
        );
        assert_eq!(POS.get(&actor), Vec3::ZERO);
    }
}
