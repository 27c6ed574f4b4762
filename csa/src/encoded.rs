use std::io;

use dyn_size_of::GetSize;

use crate::{TextIndex, Variant, EncodedVector, alphabet::Alphabet, construction::Input,
    psi::PsiNavigation, samples::{Samples, DEFAULT_SAMPLE_RATE}};

/// Compressed suffix array that keeps the psi function in an [`EncodedVector`].
///
/// Psi increases within the ranks of suffixes that begin with the same symbol,
/// so its differences are small and compress well.
/// Suffix array values are recovered by following psi until a sampled text position is reached.
pub struct EncodedCsa {
    alphabet: Alphabet,
    psi: EncodedVector,
    samples: Samples,
}

impl EncodedCsa {
    /// Builds the index over the `text`, sampling every `sample_rate`-th text position.
    pub fn with_sample_rate(text: &[u8], sample_rate: u8) -> Self {
        let input = Input::new(text);
        let psi: Box<[usize]> = (0..input.len()).map(|rank| input.psi(rank)).collect();
        let samples = Samples::new(&input.sa, &input.isa, sample_rate);
        Self { alphabet: input.alphabet, psi: EncodedVector::new(&psi), samples }
    }

    /// Builds the index over the `text` with the default sample rate.
    pub fn new(text: &[u8]) -> Self {
        Self::with_sample_rate(text, DEFAULT_SAMPLE_RATE)
    }

    /// Reads the index (without the header) from the `input`.
    pub(crate) fn read_content(input: &mut dyn io::Read) -> io::Result<Self> {
        let alphabet = Alphabet::read(input)?;
        let psi = EncodedVector::read(input)?;
        let samples = Samples::read(input, alphabet.suffixes())?;
        if psi.len() != alphabet.suffixes() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "encoded index: psi length differs from text length"));
        }
        Ok(Self { alphabet, psi, samples })
    }
}

impl PsiNavigation for EncodedCsa {
    #[inline] fn alphabet(&self) -> &Alphabet { &self.alphabet }
    #[inline] fn psi_at(&self, rank: usize) -> usize { self.psi.get(rank) }
}

impl TextIndex for EncodedCsa {
    #[inline] fn len(&self) -> usize { self.alphabet.suffixes() - 1 }

    fn count(&self, pattern: &[u8]) -> usize {
        self.backward_search(pattern).len()
    }

    fn locate(&self, pattern: &[u8]) -> Vec<usize> {
        self.backward_search(pattern).map(|rank| self.sa(rank)).collect()
    }

    fn extract(&self, begin: usize, end: usize) -> Vec<u8> {
        let end = end.min(self.len());
        let begin = begin.min(end);
        if begin == end { return Vec::new(); }
        self.extract_from_rank(self.isa(begin), end - begin)
    }

    fn sa(&self, mut rank: usize) -> usize {
        let suffixes = self.alphabet.suffixes();
        let mut steps = 0;
        loop {
            if let Some(position) = self.samples.sa(rank) {
                return (position + suffixes - steps) % suffixes;
            }
            rank = self.psi.get(rank);
            steps += 1;
        }
    }

    fn isa(&self, position: usize) -> usize {
        let rate = self.samples.rate();
        let mut rank = self.samples.isa(position / rate);
        for _ in 0..position % rate { rank = self.psi.get(rank); }
        rank
    }

    #[inline] fn psi(&self, rank: usize) -> usize { self.psi.get(rank) }

    #[inline] fn variant(&self) -> Variant { Variant::EncodedVector }

    fn size_in_bytes(&self) -> usize { self.size_bytes() }

    fn write_bytes(&self) -> usize {
        crate::header_bytes() + self.alphabet.write_bytes() + self.psi.write_bytes() + self.samples.write_bytes()
    }

    fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        crate::write_header(output, Variant::EncodedVector)?;
        self.alphabet.write(output)?;
        self.psi.write(output)?;
        self.samples.write(output)
    }
}

impl GetSize for EncodedCsa {
    fn size_bytes_dyn(&self) -> usize {
        self.alphabet.size_bytes_dyn() + self.psi.size_bytes_dyn() + self.samples.size_bytes_dyn()
    }
    const USES_DYN_MEM: bool = true;
}
