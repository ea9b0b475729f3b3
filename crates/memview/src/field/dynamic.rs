//! Schema-driven access: read or write any declared field by name.

use std::fmt;

use glam::Vec3;
use serde::Serialize;
use strum::{Display, EnumString};

use super::{BitField, Remote, Scalar, VectorField};
use crate::error::{Error, Result};
use crate::memory::{Address, WriteMemory};

/// Declared type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Ptr,
    Bits,
    Vec3,
}

/// Dynamically typed field value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Ptr(Address),
    Bits(u64),
    Vec3([f32; 3]),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::I8(_) => FieldType::I8,
            Value::I16(_) => FieldType::I16,
            Value::I32(_) => FieldType::I32,
            Value::I64(_) => FieldType::I64,
            Value::U8(_) => FieldType::U8,
            Value::U16(_) => FieldType::U16,
            Value::U32(_) => FieldType::U32,
            Value::U64(_) => FieldType::U64,
            Value::F32(_) => FieldType::F32,
            Value::F64(_) => FieldType::F64,
            Value::Ptr(_) => FieldType::Ptr,
            Value::Bits(_) => FieldType::Bits,
            Value::Vec3(_) => FieldType::Vec3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{:#x}", v),
            Value::F32(v) => write!(f, "{:.2}", v),
            Value::F64(v) => write!(f, "{:.2}", v),
            Value::Ptr(v) => write!(f, "{:#x}", v),
            Value::Bits(v) => write!(f, "{:#b}", v),
            Value::Vec3([x, y, z]) => write!(f, "{:.2}, {:.2}, {:.2}", x, y, z),
        }
    }
}

/// Field declarations of one entity kind.
///
/// Names are keys into the entity's offset table; the schema only adds types.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: &'static str,
    fields: Vec<(&'static str, FieldType)>,
}

impl Schema {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, ty: FieldType) -> Self {
        self.fields.push((name, ty));
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn fields(&self) -> &[(&'static str, FieldType)] {
        &self.fields
    }

    fn lookup(&self, name: &str) -> Result<(&'static str, FieldType)> {
        self.fields
            .iter()
            .copied()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| Error::UnknownField {
                table: self.kind.to_string(),
                field: name.to_string(),
            })
    }

    pub fn try_read<'a, E: Remote<'a> + ?Sized>(&self, entity: &E, name: &str) -> Result<Value> {
        let (key, ty) = self.lookup(name)?;
        Ok(match ty {
            FieldType::I8 => Value::I8(Scalar::new(key, 0).try_get(entity)?),
            FieldType::I16 => Value::I16(Scalar::new(key, 0).try_get(entity)?),
            FieldType::I32 => Value::I32(Scalar::new(key, 0).try_get(entity)?),
            FieldType::I64 => Value::I64(Scalar::new(key, 0).try_get(entity)?),
            FieldType::U8 => Value::U8(Scalar::new(key, 0).try_get(entity)?),
            FieldType::U16 => Value::U16(Scalar::new(key, 0).try_get(entity)?),
            FieldType::U32 => Value::U32(Scalar::new(key, 0).try_get(entity)?),
            FieldType::U64 => Value::U64(Scalar::new(key, 0).try_get(entity)?),
            FieldType::F32 => Value::F32(Scalar::new(key, 0.0).try_get(entity)?),
            FieldType::F64 => Value::F64(Scalar::new(key, 0.0).try_get(entity)?),
            FieldType::Ptr => Value::Ptr(Scalar::new(key, 0).try_get(entity)?),
            FieldType::Bits => Value::Bits(BitField::new(key).try_get(entity)?),
            FieldType::Vec3 => {
                Value::Vec3(VectorField::new(key, Vec3::ZERO).try_get(entity)?.to_array())
            }
        })
    }

    /// Read a field, substituting its type's zero value on failure
    pub fn read<'a, E: Remote<'a> + ?Sized>(&self, entity: &E, name: &str) -> Result<Value> {
        let (key, ty) = self.lookup(name)?;
        Ok(match ty {
            FieldType::I8 => Value::I8(Scalar::new(key, 0).get(entity)),
            FieldType::I16 => Value::I16(Scalar::new(key, 0).get(entity)),
            FieldType::I32 => Value::I32(Scalar::new(key, 0).get(entity)),
            FieldType::I64 => Value::I64(Scalar::new(key, 0).get(entity)),
            FieldType::U8 => Value::U8(Scalar::new(key, 0).get(entity)),
            FieldType::U16 => Value::U16(Scalar::new(key, 0).get(entity)),
            FieldType::U32 => Value::U32(Scalar::new(key, 0).get(entity)),
            FieldType::U64 => Value::U64(Scalar::new(key, 0).get(entity)),
            FieldType::F32 => Value::F32(Scalar::new(key, 0.0).get(entity)),
            FieldType::F64 => Value::F64(Scalar::new(key, 0.0).get(entity)),
            FieldType::Ptr => Value::Ptr(Scalar::new(key, 0).get(entity)),
            FieldType::Bits => Value::Bits(BitField::new(key).get(entity)),
            FieldType::Vec3 => Value::Vec3(VectorField::new(key, Vec3::ZERO).get(entity).to_array()),
        })
    }

    /// Every declared field, in declaration order; failed reads show as zero
    pub fn read_all<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> Vec<(&'static str, Value)> {
        self.fields
            .iter()
            .filter_map(|(name, _)| self.read(entity, name).ok().map(|v| (*name, v)))
            .collect()
    }

    /// Write a field; the value's type must match the declaration
    pub fn write<'a, E>(&self, entity: &E, name: &str, value: Value) -> Result<()>
    where
        E: Remote<'a> + ?Sized,
        E::Memory: WriteMemory,
    {
        let (key, ty) = self.lookup(name)?;
        if value.field_type() != ty {
            return Err(Error::TypeMismatch {
                field: name.to_string(),
                expected: ty.to_string(),
            });
        }
        match value {
            Value::I8(v) => Scalar::new(key, 0).try_set(entity, v),
            Value::I16(v) => Scalar::new(key, 0).try_set(entity, v),
            Value::I32(v) => Scalar::new(key, 0).try_set(entity, v),
            Value::I64(v) => Scalar::new(key, 0).try_set(entity, v),
            Value::U8(v) => Scalar::new(key, 0).try_set(entity, v),
            Value::U16(v) => Scalar::new(key, 0).try_set(entity, v),
            Value::U32(v) => Scalar::new(key, 0).try_set(entity, v),
            Value::U64(v) | Value::Ptr(v) => Scalar::new(key, 0).try_set(entity, v),
            Value::F32(v) => Scalar::new(key, 0.0).try_set(entity, v),
            Value::F64(v) => Scalar::new(key, 0.0).try_set(entity, v),
            Value::Bits(v) => BitField::new(key).try_set(entity, v),
            Value::Vec3(v) => VectorField::new(key, Vec3::ZERO).try_set(entity, Vec3::from_array(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::testing::Probe;
    use crate::memory::{MemoryExt, SnapshotMemory};
    use crate::offset::OffsetTable;

    fn schema() -> Schema {
        Schema::new("sample")
            .field("hp", FieldType::U32)
            .field("job", FieldType::I8)
            .field("next", FieldType::Ptr)
            .field("flag", FieldType::Bits)
            .field("pos", FieldType::Vec3)
    }

    fn table() -> OffsetTable {
        OffsetTable::builder("sample")
            .field("hp", 0x0)
            .field("job", 0x4)
            .field("next", 0x8)
            .bits("flag", 0x85, 2)
            .field("pos", 0x20)
            .build()
    }

    #[test]
    fn test_read_by_name() {
        let mem = SnapshotMemory::new().with_region(0x1000, 0x40);
        mem.write_pod(0x1000, 900u32).unwrap();
        mem.write_pod(0x1004, -3i8).unwrap();
        mem.write_pod(0x1008, 0x2000u64).unwrap();
        mem.write_pod(0x1010, 0b0100_0000u8).unwrap();
        let actor = Probe::new(&mem, 0x1000, table());

        let schema = schema();
        assert_eq!(schema.read(&actor, "hp").unwrap(), Value::U32(900));
        assert_eq!(schema.read(&actor, "job").unwrap(), Value::I8(-3));
        assert_eq!(schema.read(&actor, "next").unwrap(), Value::Ptr(0x2000));
        assert_eq!(schema.read(&actor, "flag").unwrap(), Value::Bits(0b10));
        assert!(matches!(
            schema.read(&actor, "mp"),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn test_write_by_name_checks_type() {
        let mem = SnapshotMemory::new().with_region(0x1000, 0x40);
        let actor = Probe::new(&mem, 0x1000, table());
        let schema = schema();

        schema.write(&actor, "hp", Value::U32(77)).unwrap();
        schema
            .write(&actor, "pos", Value::Vec3([1.0, 2.0, 3.0]))
            .unwrap();
        assert_eq!(schema.read(&actor, "hp").unwrap(), Value::U32(77));
        assert_eq!(
            schema.read(&actor, "pos").unwrap(),
            Value::Vec3([1.0, 2.0, 3.0])
        );

        let err = schema.write(&actor, "hp", Value::I8(1)).unwrap_err();
        assert_eq!(err.to_string(), "Field 'hp' expects a u32 value");
    }

    #[test]
    fn test_read_all_degrades_per_field() {
        let mem = SnapshotMemory::new().with_region(0x1000, 0x40);
        mem.write_pod(0x1000, 5u32).unwrap();
        mem.write_pod(0x1004, 8i8).unwrap();
        mem.inject_fault(0x1004..0x1005);
        let actor = Probe::new(&mem, 0x1000, table());

        let values = schema().read_all(&actor);
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], ("hp", Value::U32(5)));
        assert_eq!(values[1], ("job", Value::I8(0)));
        assert!(schema().try_read(&actor, "job").is_err());
    }

    #[test]
    fn test_field_type_parse() {
        assert_eq!("vec3".parse::<FieldType>().unwrap(), FieldType::Vec3);
        assert_eq!(FieldType::Ptr.to_string(), "ptr");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Ptr(0x1A0).to_string(), "0x1a0");
        assert_eq!(Value::Vec3([1.0, 2.5, -3.0]).to_string(), "1.00, 2.50, -3.00");
    }
}
