use encoding_rs::{Encoding, UTF_8};

use super::{Remote, Scope, field_address, swallow};
use crate::error::{Error, Result};
use crate::memory::{Address, MemoryExt, ReadMemory};

/// Distance from the data pointer to the byte length
const LENGTH_OFFSET: u64 = 0x10;

/// Longest string read; a larger length means the header is garbage
pub const MAX_STRING_LEN: u64 = 0x1000;

/// Text owned by a foreign string object: a data pointer at the field and
/// the byte length 0x10 bytes after it.
#[derive(Debug, Clone, Copy)]
pub struct StringField {
    key: &'static str,
    encoding: Option<&'static Encoding>,
    scope: Scope,
}

impl StringField {
    /// UTF-8 string field
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            encoding: None,
            scope: Scope::Instance,
        }
    }

    pub const fn global(self) -> Self {
        Self {
            scope: Scope::Static,
            ..self
        }
    }

    pub fn with_encoding(self, encoding: &'static Encoding) -> Self {
        Self {
            encoding: Some(encoding),
            ..self
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    fn header<M: ReadMemory + ?Sized>(&self, memory: &M, slot: Address) -> Result<(Address, u64)> {
        let data = memory.read_address(slot)?;
        let len_slot = slot
            .checked_add(LENGTH_OFFSET)
            .ok_or(Error::MemoryReadFailed {
                address: slot,
                size: 0x18,
            })?;
        Ok((data, memory.read_pod::<u64>(len_slot)?))
    }

    pub fn try_get<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> Result<String> {
        let memory = entity.handle().memory();
        let slot = field_address(entity, self.key, self.scope)?;
        let (data, len) = self.header(memory, slot)?;
        if len == 0 {
            return Ok(String::new());
        }
        if len > MAX_STRING_LEN {
            return Err(Error::StringLength {
                field: self.key.to_string(),
                len,
            });
        }
        if data == 0 {
            return Err(Error::NullPointer("string data"));
        }

        let size = len as usize;
        let bytes = memory.read_bytes(data, size)?;
        if bytes.len() != size {
            return Err(Error::MemoryReadFailed {
                address: data,
                size,
            });
        }
        let (text, _, _) = self.encoding.unwrap_or(UTF_8).decode(&bytes);
        Ok(text.trim_end_matches('\0').to_string())
    }

    /// Read the text, or an empty string on any failure
    pub fn get<'a, E: Remote<'a> + ?Sized>(&self, entity: &E) -> String {
        self.try_get(entity).unwrap_or_else(|e| {
            swallow(entity.offsets(), self.key, &e);
            String::new()
        })
    }
}
