use crate::{Interleaved, Linear, PackingStrategy};

/// A closed enum over the packing strategies this workspace actually
/// instantiates, used wherever a strategy needs to cross a persistence or
/// dispatch boundary (where a generic `S: PackingStrategy` can't appear,
/// e.g. serialized to TOML or stored in a dataset-wide config). Mirrors
/// spec §9's guidance to use "a small set of monomorphized kernels per
/// compelling combination" rather than full runtime polymorphism.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackingKind {
    Linear,
    Interleaved16x4,
    Interleaved16x8,
}

impl PackingKind {
    pub fn name(&self) -> &'static str {
        match self {
            PackingKind::Linear => "linear",
            PackingKind::Interleaved16x4 => "interleaved_16x4",
            PackingKind::Interleaved16x8 => "interleaved_16x8",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "linear" => Some(PackingKind::Linear),
            "interleaved_16x4" => Some(PackingKind::Interleaved16x4),
            "interleaved_16x8" => Some(PackingKind::Interleaved16x8),
            _ => None,
        }
    }
}

impl PackingStrategy for PackingKind {
    fn storage_bytes(&self, bits: u8, length: usize) -> usize {
        match self {
            PackingKind::Linear => Linear.storage_bytes(bits, length),
            PackingKind::Interleaved16x4 => Interleaved::<16, 4>.storage_bytes(bits, length),
            PackingKind::Interleaved16x8 => Interleaved::<16, 8>.storage_bytes(bits, length),
        }
    }

    fn logical_to_linear(&self, i: usize) -> usize {
        match self {
            PackingKind::Linear => Linear.logical_to_linear(i),
            PackingKind::Interleaved16x4 => Interleaved::<16, 4>.logical_to_linear(i),
            PackingKind::Interleaved16x8 => Interleaved::<16, 8>.logical_to_linear(i),
        }
    }

    fn linear_to_logical(&self, j: usize) -> usize {
        match self {
            PackingKind::Linear => Linear.linear_to_logical(j),
            PackingKind::Interleaved16x4 => Interleaved::<16, 4>.linear_to_logical(j),
            PackingKind::Interleaved16x8 => Interleaved::<16, 8>.linear_to_logical(j),
        }
    }

    fn get_linear(&self, bytes: &[u8], bits: u8, j: usize) -> u32 {
        match self {
            PackingKind::Linear => Linear.get_linear(bytes, bits, j),
            PackingKind::Interleaved16x4 => Interleaved::<16, 4>.get_linear(bytes, bits, j),
            PackingKind::Interleaved16x8 => Interleaved::<16, 8>.get_linear(bytes, bits, j),
        }
    }

    fn set_linear(&self, bytes: &mut [u8], bits: u8, j: usize, value: u32) {
        match self {
            PackingKind::Linear => Linear.set_linear(bytes, bits, j, value),
            PackingKind::Interleaved16x4 => Interleaved::<16, 4>.set_linear(bytes, bits, j, value),
            PackingKind::Interleaved16x8 => Interleaved::<16, 8>.set_linear(bytes, bits, j, value),
        }
    }

    fn bulk_unpack(&self, bytes: &[u8], bits: u8, length: usize, out: &mut [u32]) {
        match self {
            PackingKind::Linear => Linear.bulk_unpack(bytes, bits, length, out),
            PackingKind::Interleaved16x4 => Interleaved::<16, 4>.bulk_unpack(bytes, bits, length, out),
            PackingKind::Interleaved16x8 => Interleaved::<16, 8>.bulk_unpack(bytes, bits, length, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_parse_round_trip() {
        for kind in [
            PackingKind::Linear,
            PackingKind::Interleaved16x4,
            PackingKind::Interleaved16x8,
        ] {
            assert_eq!(PackingKind::parse(kind.name()), Some(kind));
        }
    }
}
