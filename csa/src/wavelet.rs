use std::{io, ops::Range};

use cseq::wavelet_matrix::Sequence;
use dyn_size_of::GetSize;

use crate::{TextIndex, Variant, alphabet::Alphabet, construction::Input, samples::{Samples, DEFAULT_SAMPLE_RATE}};

/// Compressed suffix array that keeps the Burrows-Wheeler transform of the text in a wavelet matrix.
///
/// Pattern search uses backward search, while suffix array values are recovered by
/// following the LF mapping until a sampled text position is reached.
pub struct WaveletCsa {
    alphabet: Alphabet,
    /// Burrows-Wheeler transform: the symbol that precedes each suffix, in rank order.
    bwt: Sequence,
    samples: Samples,
}

impl WaveletCsa {
    /// Builds the index over the `text`, sampling every `sample_rate`-th text position.
    pub fn with_sample_rate(text: &[u8], sample_rate: u8) -> Self {
        let input = Input::new(text);
        let bwt = Sequence::from_fn(|| (0..input.len()).map(|rank| input.bwt(rank)));
        let samples = Samples::new(&input.sa, &input.isa, sample_rate);
        Self { alphabet: input.alphabet, bwt, samples }
    }

    /// Builds the index over the `text` with the default sample rate.
    pub fn new(text: &[u8]) -> Self {
        Self::with_sample_rate(text, DEFAULT_SAMPLE_RATE)
    }

    /// Returns the rank of the suffix that precedes (cyclically) the suffix of rank `rank`.
    #[inline] fn lf(&self, rank: usize) -> usize {
        let symbol = self.bwt.get_or_panic(rank);
        self.alphabet.first_rank(symbol) + self.bwt.rank(rank, symbol)
    }

    fn backward_search(&self, pattern: &[u8]) -> Range<usize> {
        let suffixes = self.alphabet.suffixes();
        if pattern.is_empty() { return 1..suffixes; }
        let mut range = 0..suffixes;
        for b in pattern.iter().rev() {
            let Some(symbol) = self.alphabet.symbol(*b) else { return 0..0 };
            let first = self.alphabet.first_rank(symbol);
            range = first + self.bwt.rank(range.start, symbol) .. first + self.bwt.rank(range.end, symbol);
            if range.is_empty() { return 0..0; }
        }
        range
    }

    /// Reads the index (without the header) from the `input`.
    pub(crate) fn read_content(input: &mut dyn io::Read) -> io::Result<Self> {
        let alphabet = Alphabet::read(input)?;
        let bwt = Sequence::read(input)?;
        let samples = Samples::read(input, alphabet.suffixes())?;
        if bwt.len() != alphabet.suffixes() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "wavelet index: transform length differs from text length"));
        }
        Ok(Self { alphabet, bwt, samples })
    }
}

impl TextIndex for WaveletCsa {
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
        let mut result = Vec::with_capacity(end - begin);
        let mut rank = self.isa(end);
        for _ in begin..end {
            result.push(self.alphabet.byte(self.bwt.get_or_panic(rank)));
            rank = self.lf(rank);
        }
        result.reverse();
        result
    }

    fn sa(&self, mut rank: usize) -> usize {
        let mut steps = 0;
        loop {
            if let Some(position) = self.samples.sa(rank) { return position + steps; }
            rank = self.lf(rank);
            steps += 1;
        }
    }

    fn isa(&self, position: usize) -> usize {
        let rate = self.samples.rate();
        let sample = position.div_ceil(rate);
        let (mut rank, steps) = if sample < self.samples.isa_len() {
            (self.samples.isa(sample), sample * rate - position)
        } else {
            // the sentinel suffix follows the last one, and precedes position 0 cyclically
            (self.samples.isa(0), self.alphabet.suffixes() - position)
        };
        for _ in 0..steps { rank = self.lf(rank); }
        rank
    }

    fn psi(&self, rank: usize) -> usize {
        let symbol = self.alphabet.symbol_at_rank(rank);
        self.bwt.select(rank - self.alphabet.first_rank(symbol), symbol)
    }

    #[inline] fn variant(&self) -> Variant { Variant::WaveletTree }

    fn size_in_bytes(&self) -> usize { self.size_bytes() }

    fn write_bytes(&self) -> usize {
        crate::header_bytes() + self.alphabet.write_bytes() + self.bwt.write_bytes() + self.samples.write_bytes()
    }

    fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        crate::write_header(output, Variant::WaveletTree)?;
        self.alphabet.write(output)?;
        self.bwt.write(output)?;
        self.samples.write(output)
    }
}

impl GetSize for WaveletCsa {
    fn size_bytes_dyn(&self) -> usize {
        self.alphabet.size_bytes_dyn() + self.bwt.size_bytes_dyn() + self.samples.size_bytes_dyn()
    }
    const USES_DYN_MEM: bool = true;
}
