use crate::{BitpackError, Encoding, PackingStrategy};

/// A non-owning, read-only view over a bit-packed sequence of `length`
/// values of a given [`Encoding`], laid out per a [`PackingStrategy`].
///
/// The view borrows its backing bytes; it must not outlive the storage
/// that owns them.
#[derive(Clone, Copy)]
pub struct CompressedVector<'a, S: PackingStrategy> {
    bytes: &'a [u8],
    length: usize,
    encoding: Encoding,
    strategy: S,
}

impl<'a, S: PackingStrategy> CompressedVector<'a, S> {
    pub fn new(bytes: &'a [u8], length: usize, encoding: Encoding, strategy: S) -> Self {
        debug_assert!(bytes.len() >= strategy.storage_bytes(encoding.bits(), length));
        CompressedVector {
            bytes,
            length,
            encoding,
            strategy,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Decoded value at logical index `i`.
    pub fn get(&self, i: usize) -> i32 {
        debug_assert!(i < self.length);
        let j = self.strategy.logical_to_linear(i);
        let raw = self.strategy.get_linear(self.bytes, self.encoding.bits(), j);
        self.encoding.decode(raw)
    }

    /// Bulk-decodes the first `out.len()` logical elements.
    pub fn unpack_into(&self, out: &mut [u32]) {
        self.strategy
            .bulk_unpack(self.bytes, self.encoding.bits(), out.len().min(self.length), out);
    }

    /// Two views are logically equivalent iff they have the same length,
    /// the same encoding, and decode to the same sequence of values —
    /// regardless of packing strategy.
    pub fn logically_equivalent_to<S2: PackingStrategy>(&self, other: &CompressedVector<'_, S2>) -> bool {
        if self.length != other.length || self.encoding != other.encoding {
            return false;
        }
        (0..self.length).all(|i| self.get(i) == other.get(i))
    }
}

/// A non-owning, mutable view over a bit-packed sequence.
pub struct CompressedVectorMut<'a, S: PackingStrategy> {
    bytes: &'a mut [u8],
    length: usize,
    encoding: Encoding,
    strategy: S,
}

impl<'a, S: PackingStrategy> CompressedVectorMut<'a, S> {
    pub fn new(bytes: &'a mut [u8], length: usize, encoding: Encoding, strategy: S) -> Self {
        debug_assert!(bytes.len() >= strategy.storage_bytes(encoding.bits(), length));
        CompressedVectorMut {
            bytes,
            length,
            encoding,
            strategy,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn as_const(&self) -> CompressedVector<'_, S> {
        CompressedVector {
            bytes: self.bytes,
            length: self.length,
            encoding: self.encoding,
            strategy: self.strategy.clone(),
        }
    }

    pub fn get(&self, i: usize) -> i32 {
        self.as_const().get(i)
    }

    pub fn set(&mut self, value: i32, i: usize) -> Result<(), BitpackError> {
        if i >= self.length {
            return Err(BitpackError::IndexOutOfBounds {
                index: i,
                length: self.length,
            });
        }
        let raw = self.encoding.encode(value)?;
        let j = self.strategy.logical_to_linear(i);
        self.strategy.set_linear(self.bytes, self.encoding.bits(), j, raw);
        Ok(())
    }
}
