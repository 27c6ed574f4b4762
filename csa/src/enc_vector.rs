//! Compressed vector of integers that change by small steps.

use std::io;

use binout::{AsIs, Serializer};
use bitm::{BitAccess, BitVec, n_lowest_bits};
use dyn_size_of::GetSize;

use crate::packed::{PackedInts, bits_to_store};

/// Maps signed `v` to unsigned: 0, -1, 1, -2, 2, ... to 0, 1, 2, 3, 4, ...
#[inline(always)] fn zigzag(v: i64) -> u64 { ((v << 1) ^ (v >> 63)) as u64 }

/// Inverse of [`zigzag`].
#[inline(always)] fn unzigzag(v: u64) -> i64 { (v >> 1) as i64 ^ -((v & 1) as i64) }

/// Returns the number of bits of the Elias-gamma code of positive `v`.
#[inline(always)] fn gamma_len(v: u64) -> usize { 2 * bits_to_store(v) as usize - 1 }

/// Writes Elias-gamma code of positive `v` at bit `position` of zeroed `stream` and advances `position`.
///
/// The code consists of `k-1` zeros, a one, and the `k-1` less significant bits of `v`,
/// where `k` is the bit length of `v`.
fn gamma_write(stream: &mut [u64], position: &mut usize, v: u64) {
    let low_bits = bits_to_store(v) - 1;
    *position += low_bits as usize;
    stream.set_bit(*position);
    *position += 1;
    if low_bits != 0 {
        stream.set_bits(*position, v & n_lowest_bits(low_bits), low_bits);
        *position += low_bits as usize;
    }
}

/// Reads Elias-gamma code from bit `position` of `stream` and advances `position`.
#[inline] fn gamma_read(stream: &[u64], position: &mut usize) -> u64 {
    let low_bits = stream.get_bits(*position, 63).trailing_zeros() as u8;
    *position += low_bits as usize + 1;
    let mut result = 1 << low_bits;
    if low_bits != 0 {
        result |= stream.get_bits(*position, low_bits);
        *position += low_bits as usize;
    }
    result
}

/// [`EncodedVector`] stores a sequence of integers as Elias-gamma coded differences between successive items.
///
/// Every `sample_rate`-th item is stored directly, together with the position of the codes that follow it,
/// so *get* decodes at most `sample_rate-1` differences.
/// Suits sequences like psi, which increase by small steps within long runs.
pub struct EncodedVector {
    /// Every `sample_rate`-th item.
    samples: PackedInts,
    /// Bit positions in `stream` of the codes that follow each sample.
    pointers: PackedInts,
    /// Gamma codes of zig-zag mapped differences (incremented by one).
    stream: Box<[u64]>,
    sample_rate: u8,
    len: usize,
}

impl EncodedVector {
    /// Default number of items between samples.
    pub const DEFAULT_SAMPLE_RATE: u8 = 32;

    /// Constructs [`EncodedVector`] with copy of the `items`, sampling every `sample_rate`-th item.
    pub fn with_sample_rate(items: &[usize], sample_rate: u8) -> Self {
        assert!(sample_rate > 0, "EncodedVector: sample rate must be positive");
        let rate = sample_rate as usize;
        let code = |index: usize| zigzag(items[index] as i64 - items[index-1] as i64) + 1;
        let stream_len: usize = (1..items.len()).filter(|i| i % rate != 0).map(|i| gamma_len(code(i))).sum();
        // extra word makes reading 63 bits at the end of the stream safe
        let mut stream = Box::<[u64]>::with_zeroed_bits(stream_len + 64);
        let mut pointers = Vec::with_capacity(items.len() / rate + 1);
        let mut position = 0;
        for index in 0..items.len() {
            if index % rate == 0 {
                pointers.push(position);
            } else {
                gamma_write(&mut stream, &mut position, code(index));
            }
        }
        debug_assert_eq!(position, stream_len);
        let samples = PackedInts::with_items(
            items.iter().step_by(rate).copied(), pointers.len(),
            items.iter().copied().max().unwrap_or(0));
        Self {
            samples,
            pointers: PackedInts::from_slice(&pointers),
            stream,
            sample_rate,
            len: items.len()
        }
    }

    /// Constructs [`EncodedVector`] with copy of the `items`, using the default sample rate.
    pub fn new(items: &[usize]) -> Self {
        Self::with_sample_rate(items, Self::DEFAULT_SAMPLE_RATE)
    }

    /// Returns number of stored items.
    #[inline] pub fn len(&self) -> usize { self.len }

    /// Returns whether the vector is empty.
    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Returns the item with given `index`, which must be less than [`Self::len`].
    pub fn get(&self, index: usize) -> usize {
        assert!(index < self.len, "EncodedVector: index {index} out of bounds (len is {})", self.len);
        let rate = self.sample_rate as usize;
        let block = index / rate;
        let mut value = self.samples.get(block) as i64;
        let mut position = self.pointers.get(block);
        for _ in 0..index % rate {
            value += unzigzag(gamma_read(&self.stream, &mut position) - 1);
        }
        value as usize
    }

    /// Returns iterator over all items.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).map(|i| self.get(i))
    }

    /// Returns number of bytes which `write` will write.
    pub fn write_bytes(&self) -> usize {
        AsIs::size(self.len) + AsIs::size(self.sample_rate) +
        self.samples.write_bytes() + self.pointers.write_bytes() +
        AsIs::array_size(&self.stream)
    }

    /// Writes `self` to the `output`.
    pub fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        AsIs::write(output, self.len)?;
        AsIs::write(output, self.sample_rate)?;
        self.samples.write(output)?;
        self.pointers.write(output)?;
        AsIs::write_array(output, &self.stream)
    }

    /// Reads `self` from the `input`.
    pub fn read(input: &mut dyn io::Read) -> io::Result<Self> {
        let len = AsIs::read(input)?;
        let sample_rate: u8 = AsIs::read(input)?;
        let samples = PackedInts::read(input)?;
        let pointers = PackedInts::read(input)?;
        let stream = AsIs::read_array(input)?;
        if sample_rate == 0 || samples.len() != pointers.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "encoded vector: inconsistent samples"));
        }
        Ok(Self { samples, pointers, stream, sample_rate, len })
    }
}

impl GetSize for EncodedVector {
    fn size_bytes_dyn(&self) -> usize {
        self.samples.size_bytes_dyn() + self.pointers.size_bytes_dyn() + self.stream.size_bytes_dyn()
    }
    const USES_DYN_MEM: bool = true;
}
