use half::f16;
use vsearch_bitpack::{CompressedVector, Encoding, PackingStrategy};

/// The primary level of LVQ: a per-vector `(scale, bias)` pair plus an
/// unsigned `bits`-wide packed sequence. Decoded value at index `i` is
/// `scale * packed.get(i) + bias`.
#[derive(Clone, Debug)]
pub struct ScaledBiasedVector<S: PackingStrategy> {
    pub(crate) scale: f16,
    pub(crate) bias: f16,
    /// Tag propagated from the compressor; not interpreted by decoding or
    /// distance computation.
    pub(crate) selector: u8,
    pub(crate) packed: Vec<u8>,
    pub(crate) length: usize,
    pub(crate) bits: u8,
    pub(crate) strategy: S,
}

impl<S: PackingStrategy> ScaledBiasedVector<S> {
    pub fn new(scale: f32, bias: f32, selector: u8, packed: Vec<u8>, length: usize, bits: u8, strategy: S) -> Self {
        ScaledBiasedVector {
            scale: f16::from_f32(scale),
            bias: f16::from_f32(bias),
            selector,
            packed,
            length,
            bits,
            strategy,
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn scale(&self) -> f32 {
        self.scale.to_f32()
    }

    pub fn bias(&self) -> f32 {
        self.bias.to_f32()
    }

    pub fn selector(&self) -> u8 {
        self.selector
    }

    pub fn view(&self) -> CompressedVector<'_, S> {
        CompressedVector::new(
            &self.packed,
            self.length,
            Encoding::unsigned(self.bits),
            self.strategy.clone(),
        )
    }

    pub fn decode(&self, i: usize) -> f32 {
        self.scale() * self.view().get(i) as f32 + self.bias()
    }

    pub fn decode_all(&self) -> Vec<f32> {
        (0..self.length).map(|i| self.decode(i)).collect()
    }
}

/// A primary level plus a signed residual level: decoded value at index
/// `i` is `primary.decode(i) + (scale_primary / 2^residual_bits) * residual.get(i)`.
#[derive(Clone, Debug)]
pub struct TwoLevelVector<S: PackingStrategy> {
    pub(crate) primary: ScaledBiasedVector<S>,
    pub(crate) residual: Vec<u8>,
    pub(crate) residual_bits: u8,
    pub(crate) residual_strategy: S,
}

impl<S: PackingStrategy> TwoLevelVector<S> {
    pub fn new(primary: ScaledBiasedVector<S>, residual: Vec<u8>, residual_bits: u8, residual_strategy: S) -> Self {
        TwoLevelVector {
            primary,
            residual,
            residual_bits,
            residual_strategy,
        }
    }

    pub fn len(&self) -> usize {
        self.primary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty()
    }

    pub fn residual_view(&self) -> CompressedVector<'_, S> {
        CompressedVector::new(
            &self.residual,
            self.primary.len(),
            Encoding::signed(self.residual_bits),
            self.residual_strategy.clone(),
        )
    }

    pub fn residual_step(&self) -> f32 {
        self.primary.scale() / (1u32 << self.residual_bits) as f32
    }

    pub fn decode(&self, i: usize) -> f32 {
        self.primary.decode(i) + self.residual_step() * self.residual_view().get(i) as f32
    }

    pub fn decode_all(&self) -> Vec<f32> {
        (0..self.len()).map(|i| self.decode(i)).collect()
    }
}
