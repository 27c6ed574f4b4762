use std::{io, ops::Range};

use binout::{AsIs, Serializer};
use dyn_size_of::GetSize;

/// Compact alphabet of the indexed text.
///
/// Symbol `0` is the sentinel that terminates the text and is smaller than any byte.
/// The distinct bytes of the text, in increasing order, are symbols `1..=sigma`.
pub(crate) struct Alphabet {
    /// Symbol of each byte value or `0` if the byte does not occur in the text.
    codes: Box<[u16]>,
    /// Byte of each non-sentinel symbol; `bytes[s-1]` is the byte of symbol `s`.
    bytes: Box<[u8]>,
    /// `first_ranks[s]` is the number of suffixes that begin with a symbol smaller than `s`
    /// (the *C* array); has `sigma+2` items, the last one equals the number of suffixes.
    first_ranks: Box<[usize]>,
}

impl Alphabet {
    /// Constructs the alphabet of the `text`.
    pub fn new(text: &[u8]) -> Self {
        let mut occurrences = [0usize; 256];
        for b in text { occurrences[*b as usize] += 1; }
        let bytes: Box<[u8]> = (0..=255u8).filter(|b| occurrences[*b as usize] != 0).collect();
        let mut first_ranks = Vec::with_capacity(bytes.len() + 2);
        first_ranks.push(0);
        let mut total = 1;  // the sentinel
        for b in bytes.iter() {
            first_ranks.push(total);
            total += occurrences[*b as usize];
        }
        first_ranks.push(total);
        Self::from_parts(bytes, first_ranks.into_boxed_slice())
    }

    fn from_parts(bytes: Box<[u8]>, first_ranks: Box<[usize]>) -> Self {
        let mut codes = vec![0u16; 256].into_boxed_slice();
        for (index, b) in bytes.iter().enumerate() {
            codes[*b as usize] = index as u16 + 1;
        }
        Self { codes, bytes, first_ranks }
    }

    /// Returns the number of suffixes of the text, i.e. the text length plus one (for the sentinel).
    #[inline] pub fn suffixes(&self) -> usize { self.first_ranks[self.first_ranks.len() - 1] }

    /// Returns the symbol of the byte `b` or [`None`] if `b` does not occur in the text.
    #[inline] pub fn symbol(&self, b: u8) -> Option<u64> {
        match self.codes[b as usize] {
            0 => None,
            s => Some(s as u64)
        }
    }

    /// Returns the byte of the non-sentinel `symbol`.
    #[inline] pub fn byte(&self, symbol: u64) -> u8 {
        debug_assert!(symbol != 0, "the sentinel has no byte");
        self.bytes[symbol as usize - 1]
    }

    /// Returns the symbol of the byte `b`, which must occur in the text.
    #[inline] pub fn code(&self, b: u8) -> u64 {
        debug_assert!(self.codes[b as usize] != 0, "byte {b} does not occur in the text");
        self.codes[b as usize] as u64
    }

    /// Returns the first rank of the suffixes that begin with the `symbol`.
    #[inline] pub fn first_rank(&self, symbol: u64) -> usize { self.first_ranks[symbol as usize] }

    /// Returns the range of ranks of the suffixes that begin with the `symbol`.
    #[inline] pub fn ranks(&self, symbol: u64) -> Range<usize> {
        self.first_ranks[symbol as usize]..self.first_ranks[symbol as usize + 1]
    }

    /// Returns the first symbol of the suffix with given `rank`.
    #[inline] pub fn symbol_at_rank(&self, rank: usize) -> u64 {
        (self.first_ranks.partition_point(|first| *first <= rank) - 1) as u64
    }

    /// Returns number of bytes which `write` will write.
    pub fn write_bytes(&self) -> usize {
        AsIs::array_size(&self.bytes) + AsIs::array_size(&self.first_ranks)
    }

    /// Writes `self` to the `output`.
    pub fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        AsIs::write_array(output, &self.bytes)?;
        AsIs::write_array(output, &self.first_ranks)
    }

    /// Reads `self` from the `input`.
    pub fn read(input: &mut dyn io::Read) -> io::Result<Self> {
        let bytes: Box<[u8]> = AsIs::read_array(input)?;
        let first_ranks: Box<[usize]> = AsIs::read_array(input)?;
        if first_ranks.len() != bytes.len() + 2 || first_ranks.windows(2).any(|w| w[0] > w[1]) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "alphabet: malformed symbol ranks"));
        }
        Ok(Self::from_parts(bytes, first_ranks))
    }
}

impl GetSize for Alphabet {
    fn size_bytes_dyn(&self) -> usize {
        self.codes.size_bytes_dyn() + self.bytes.size_bytes_dyn() + self.first_ranks.size_bytes_dyn()
    }
    const USES_DYN_MEM: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banana() {
        let a = Alphabet::new(b"banana");
        assert_eq!(a.bytes.len(), 3);
        assert_eq!(a.suffixes(), 7);
        assert_eq!(a.symbol(b'a'), Some(1));
        assert_eq!(a.symbol(b'b'), Some(2));
        assert_eq!(a.symbol(b'n'), Some(3));
        assert_eq!(a.symbol(b'x'), None);
        assert_eq!(a.byte(3), b'n');
        assert_eq!(a.ranks(0), 0..1);
        assert_eq!(a.ranks(1), 1..4);
        assert_eq!(a.ranks(2), 4..5);
        assert_eq!(a.ranks(3), 5..7);
        assert_eq!(a.symbol_at_rank(0), 0);
        assert_eq!(a.symbol_at_rank(3), 1);
        assert_eq!(a.symbol_at_rank(4), 2);
        assert_eq!(a.symbol_at_rank(6), 3);
        assert_eq!([b'n', b'a', b'b'].map(|b| a.code(b)), [3, 1, 2]);
    }

    #[test]
    fn test_zero_byte_is_above_sentinel() {
        let a = Alphabet::new(&[0, 0, 7]);
        assert_eq!(a.symbol(0), Some(1));
        assert_eq!(a.symbol(7), Some(2));
        assert_eq!(a.ranks(1), 1..3);
    }

    #[test]
    fn test_read_write() {
        let a = Alphabet::new(b"mississippi");
        let mut buff = Vec::new();
        a.write(&mut buff).unwrap();
        assert_eq!(buff.len(), a.write_bytes());
        let read = Alphabet::read(&mut &buff[..]).unwrap();
        assert_eq!(read.bytes, a.bytes);
        assert_eq!(read.suffixes(), 12);
        for symbol in 0..=a.bytes.len() as u64 {
            assert_eq!(read.ranks(symbol), a.ranks(symbol));
        }
        assert_eq!(read.symbol(b's'), a.symbol(b's'));
    }
}
