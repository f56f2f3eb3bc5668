use vsearch_bitpack::{CompressedVector, PackingStrategy};

/// A non-owning view of one dataset entry: its `(scale, bias)` pair plus
/// the packed byte view backing it. Decoded value at index `i` is
/// `scale * view.get(i) + bias`, matching `vsearch_codec::ScaledBiasedVector`.
pub struct DatumRef<'a, S: PackingStrategy> {
    pub scale: f32,
    pub bias: f32,
    pub view: CompressedVector<'a, S>,
}

impl<'a, S: PackingStrategy> DatumRef<'a, S> {
    pub fn len(&self) -> usize {
        self.view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.view.is_empty()
    }

    pub fn decode(&self, i: usize) -> f32 {
        self.scale * self.view.get(i) as f32 + self.bias
    }

    pub fn decode_all(&self) -> Vec<f32> {
        (0..self.len()).map(|i| self.decode(i)).collect()
    }
}
