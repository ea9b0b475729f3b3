use super::{Remote, Scope, field_address, swallow};
use crate::error::Result;
use crate::memory::{Primitive, WriteMemory};

/// Fixed-width integer or float field
#[derive(Debug, Clone, Copy)]
pub struct Scalar<T> {
    key: &'static str,
    default: T,
    scope: Scope,
}

impl<T: Primitive> Scalar<T> {
    pub const fn new(key: &'static str, default: T) -> Self {
        Self {
            key,
            default,
            scope: Scope::Instance,
        }
    }

    /// Resolve against absolute address 0 instead of the instance
    pub const fn global(self) -> Self {
        Self {
            scope: Scope::Static,
            ..self
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default_value(&self) -> T {
        self.default
    }

    pub fn try_get<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> Result<T> {
        let address = field_address(entity, self.key, self.scope)?;
        T::read(entity.handle().memory(), address)
    }

    /// Read the field, falling back to the default on any failure
    pub fn get<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> T {
        self.try_get(entity).unwrap_or_else(|e| {
            swallow(entity.offsets(), self.key, &e);
            self.default
        })
    }

    pub fn try_set<'a, E>(&self, entity: &E, value: T) -> Result<()>
    where
        E: Remote<'a> + ?Sized,
        E::Memory: WriteMemory,
    {
        let address = field_address(entity, self.key, self.scope)?;
        T::write(entity.handle().memory(), address, value)
    }

    /// Best-effort write; failures are dropped
    pub fn set<'a, E>(&self, entity: &E, value: T)
    where
        E: Remote<'a> + ?Sized,
        E::Memory: WriteMemory,
    {
        if let Err(e) = self.try_set(entity, value) {
            swallow(entity.offsets(), self.key, &e);
        }
    }
}
