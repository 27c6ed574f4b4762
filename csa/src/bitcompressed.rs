use std::io;

use dyn_size_of::GetSize;

use crate::{TextIndex, Variant, alphabet::Alphabet, construction::Input, packed::PackedInts, psi::PsiNavigation};

/// Suffix array and its inverse, each stored on the minimal number of bits per item.
///
/// It is the largest but fastest variant: all queries but search are answered by direct reads.
pub struct BitCompressedCsa {
    alphabet: Alphabet,
    sa: PackedInts,
    isa: PackedInts,
}

impl BitCompressedCsa {
    /// Builds the index over the `text`.
    pub fn new(text: &[u8]) -> Self {
        let input = Input::new(text);
        Self {
            sa: PackedInts::from_slice(&input.sa),
            isa: PackedInts::from_slice(&input.isa),
            alphabet: input.alphabet,
        }
    }

    /// Reads the index (without the header) from the `input`.
    pub(crate) fn read_content(input: &mut dyn io::Read) -> io::Result<Self> {
        let alphabet = Alphabet::read(input)?;
        let sa = PackedInts::read(input)?;
        let isa = PackedInts::read(input)?;
        if sa.len() != alphabet.suffixes() || isa.len() != sa.len() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bit-compressed index: array length differs from text length"));
        }
        Ok(Self { alphabet, sa, isa })
    }
}

impl PsiNavigation for BitCompressedCsa {
    #[inline] fn alphabet(&self) -> &Alphabet { &self.alphabet }

    #[inline] fn psi_at(&self, rank: usize) -> usize {
        let next = self.sa.get(rank) + 1;
        self.isa.get(if next == self.sa.len() { 0 } else { next })
    }
}

impl TextIndex for BitCompressedCsa {
    #[inline] fn len(&self) -> usize { self.sa.len() - 1 }

    fn count(&self, pattern: &[u8]) -> usize {
        self.backward_search(pattern).len()
    }

    fn locate(&self, pattern: &[u8]) -> Vec<usize> {
        self.backward_search(pattern).map(|rank| self.sa.get(rank)).collect()
    }

    fn extract(&self, begin: usize, end: usize) -> Vec<u8> {
        let end = end.min(self.len());
        let begin = begin.min(end);
        (begin..end).map(|position| self.alphabet.byte(self.alphabet.symbol_at_rank(self.isa.get(position)))).collect()
    }

    #[inline] fn sa(&self, rank: usize) -> usize { self.sa.get(rank) }

    #[inline] fn isa(&self, position: usize) -> usize { self.isa.get(position) }

    #[inline] fn psi(&self, rank: usize) -> usize { self.psi_at(rank) }

    #[inline] fn variant(&self) -> Variant { Variant::BitCompressed }

    fn size_in_bytes(&self) -> usize { self.size_bytes() }

    fn write_bytes(&self) -> usize {
        crate::header_bytes() + self.alphabet.write_bytes() + self.sa.write_bytes() + self.isa.write_bytes()
    }

    fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        crate::write_header(output, Variant::BitCompressed)?;
        self.alphabet.write(output)?;
        self.sa.write(output)?;
        self.isa.write(output)
    }
}

impl GetSize for BitCompressedCsa {
    fn size_bytes_dyn(&self) -> usize {
        self.alphabet.size_bytes_dyn() + self.sa.size_bytes_dyn() + self.isa.size_bytes_dyn()
    }
    const USES_DYN_MEM: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banana() {
        let index = BitCompressedCsa::new(b"banana");
        assert_eq!(index.len(), 6);
        assert_eq!((0..7).map(|r| index.psi(r)).collect::<Vec<_>>(), [4, 0, 5, 6, 3, 1, 2]);
        assert_eq!(index.extract(0, 6), b"banana");
        let mut located = index.locate(b"ana");
        located.sort_unstable();
        assert_eq!(located, [1, 3]);
    }

    #[test]
    fn test_is_larger_than_compressed() {
        let text: Vec<u8> = b"to be or not to be, that is the question. ".iter().copied().cycle().take(20_000).collect();
        let plain = BitCompressedCsa::new(&text);
        let compressed = crate::EncodedCsa::new(&text);
        assert!(plain.size_in_bytes() > compressed.size_in_bytes());
    }
}
