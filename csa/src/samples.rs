use std::io;

use binout::{AsIs, Serializer};
use bitm::{ArrayWithRank101111, BitAccess, BitVec, Rank, ceiling_div};
use dyn_size_of::GetSize;

use crate::packed::PackedInts;

/// Default distance between sampled text positions.
pub const DEFAULT_SAMPLE_RATE: u8 = 32;

/// Samples of the suffix array and its inverse, taken at text positions divisible by the sample rate.
///
/// The ranks whose suffix array values are sampled are marked in a bit vector with rank support,
/// so the sample of a marked rank is found by the rank of its mark.
pub(crate) struct Samples {
    /// Bit `r` is set if the suffix of rank `r` begins at the sampled position.
    marked: ArrayWithRank101111,
    /// Sampled suffix array values divided by `rate`, in rank order.
    sa: PackedInts,
    /// `isa[k]` is the rank of the suffix that begins at position `k*rate`.
    isa: PackedInts,
    rate: u8,
}

impl Samples {
    /// Samples every `rate`-th position of the suffix array `sa` and its inverse `isa`.
    pub fn new(sa: &[usize], isa: &[usize], rate: u8) -> Self {
        assert!(rate > 0, "sample rate must be positive");
        let r = rate as usize;
        let len = sa.len();
        let mut marked = Box::<[u64]>::with_zeroed_bits(len + 1);
        let mut number_of_marked = 0;
        for (rank, position) in sa.iter().enumerate() {
            if position % r == 0 {
                marked.set_bit(rank);
                number_of_marked += 1;
            }
        }
        let max_sample = len.saturating_sub(1) / r;
        let sa_samples = PackedInts::with_items(
            sa.iter().filter(|p| *p % r == 0).map(|p| p / r),
            number_of_marked, max_sample);
        let isa_samples = PackedInts::with_items(
            isa.iter().step_by(r).copied(),
            ceiling_div(len, r), len.saturating_sub(1));
        Self { marked: ArrayWithRank101111::build(marked).0, sa: sa_samples, isa: isa_samples, rate }
    }

    #[inline] pub fn rate(&self) -> usize { self.rate as usize }

    /// Returns the suffix array value of `rank` if it is sampled.
    #[inline] pub fn sa(&self, rank: usize) -> Option<usize> {
        self.marked.content.get_bit(rank).then(|| self.sa.get(self.marked.rank(rank)) * self.rate())
    }

    /// Returns the rank of the suffix that begins at text position `k*rate`.
    #[inline] pub fn isa(&self, k: usize) -> usize { self.isa.get(k) }

    /// Returns the number of inverse suffix array samples.
    #[inline] pub fn isa_len(&self) -> usize { self.isa.len() }

    /// Returns number of bytes which `write` will write.
    pub fn write_bytes(&self) -> usize {
        AsIs::size(self.rate) +
        AsIs::array_size(&self.marked.content) +
        self.sa.write_bytes() + self.isa.write_bytes()
    }

    /// Writes `self` to the `output`.
    pub fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        AsIs::write(output, self.rate)?;
        AsIs::write_array(output, &self.marked.content)?;
        self.sa.write(output)?;
        self.isa.write(output)
    }

    /// Reads `self`, sampled from an array of `suffixes` items, from the `input`.
    pub fn read(input: &mut dyn io::Read, suffixes: usize) -> io::Result<Self> {
        let rate: u8 = AsIs::read(input)?;
        if rate == 0 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "samples: sample rate must be positive"));
        }
        let marked: Box<[u64]> = AsIs::read_array(input)?;
        let sa = PackedInts::read(input)?;
        let isa = PackedInts::read(input)?;
        if marked.len() != ceiling_div(suffixes + 1, 64) || isa.len() != ceiling_div(suffixes, rate as usize) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "samples: sizes do not match the number of suffixes"));
        }
        let (marked, number_of_marked) = ArrayWithRank101111::build(marked);
        if number_of_marked != sa.len() || sa.len() != isa.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "samples: number of marks differs from number of samples"));
        }
        Ok(Self { marked, sa, isa, rate })
    }
}

impl GetSize for Samples {
    fn size_bytes_dyn(&self) -> usize {
        self.marked.size_bytes_dyn() + self.sa.size_bytes_dyn() + self.isa.size_bytes_dyn()
    }
    const USES_DYN_MEM: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construction::Input;

    #[test]
    fn test_samples() {
        let text: Vec<u8> = (0..500u32).map(|i| b"xyz"[(i % 7 % 3) as usize]).collect();
        let input = Input::new(&text);
        let samples = Samples::new(&input.sa, &input.isa, 8);
        for rank in 0..input.len() {
            let expected = (input.sa[rank] % 8 == 0).then_some(input.sa[rank]);
            assert_eq!(samples.sa(rank), expected, "wrong sample for rank {rank}");
        }
        assert_eq!(samples.isa_len(), ceiling_div(input.len(), 8));
        for k in 0..samples.isa_len() {
            assert_eq!(samples.isa(k), input.isa[k * 8]);
        }
        let mut buff = Vec::new();
        samples.write(&mut buff).unwrap();
        assert_eq!(buff.len(), samples.write_bytes());
        let read = Samples::read(&mut &buff[..], input.len()).unwrap();
        assert_eq!(read.rate(), 8);
        for rank in 0..input.len() { assert_eq!(read.sa(rank), samples.sa(rank)); }
    }

    #[test]
    fn test_read_rejects_samples_of_other_length() {
        let input = Input::new(b"compressed suffix arrays");
        let samples = Samples::new(&input.sa, &input.isa, 4);
        let mut buff = Vec::new();
        samples.write(&mut buff).unwrap();
        for suffixes in [input.len() - 4, input.len() + 8, 1000] {
            let err = Samples::read(&mut &buff[..], suffixes).err().unwrap();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData, "accepted {suffixes} suffixes");
        }
        assert!(Samples::read(&mut &buff[..], input.len()).is_ok());
    }
}
