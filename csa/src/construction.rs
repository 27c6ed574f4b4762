//! Building blocks computed once during index construction.

use crate::alphabet::Alphabet;

/// Suffix array and its inverse of the text terminated by the sentinel.
pub(crate) struct Input<'t> {
    pub alphabet: Alphabet,
    pub text: &'t [u8],
    /// Suffix array of the text followed by the sentinel; `sa[0]` is the sentinel suffix.
    pub sa: Box<[usize]>,
    pub isa: Box<[usize]>,
}

impl<'t> Input<'t> {
    pub fn new(text: &'t [u8]) -> Self {
        let alphabet = Alphabet::new(text);
        let sa = suffix_array(text);
        let isa = inverse(&sa);
        Self { alphabet, text, sa, isa }
    }

    /// Returns the number of suffixes (text length plus one).
    #[inline] pub fn len(&self) -> usize { self.sa.len() }

    /// Returns the psi function: the rank of the suffix that follows the suffix of rank `rank`.
    #[inline] pub fn psi(&self, rank: usize) -> usize {
        let next = self.sa[rank] + 1;
        self.isa[if next == self.len() { 0 } else { next }]
    }

    /// Returns the symbol that precedes (cyclically) the suffix of rank `rank`.
    #[inline] pub fn bwt(&self, rank: usize) -> u64 {
        match self.sa[rank] {
            0 => 0,
            position => self.alphabet.code(self.text[position - 1])
        }
    }
}

/// Returns the suffix array of the `text` terminated by the sentinel, which is smaller than any byte.
///
/// The byte suffixes are sorted by divsufsort, the sentinel suffix is put at rank 0.
pub(crate) fn suffix_array(text: &[u8]) -> Box<[usize]> {
    assert!(text.len() < i32::MAX as usize, "text of {} bytes is too long to index", text.len());
    let mut result = Vec::with_capacity(text.len() + 1);
    result.push(text.len());
    if !text.is_empty() {
        let mut sa = vec![0; text.len()];
        divsufsort::sort_in_place(text, &mut sa);
        result.extend(sa.into_iter().map(|p| p as usize));
    }
    result.into_boxed_slice()
}

/// Returns inverse of the permutation `sa`.
pub(crate) fn inverse(sa: &[usize]) -> Box<[usize]> {
    let mut result = vec![0; sa.len()].into_boxed_slice();
    for (rank, position) in sa.iter().enumerate() { result[*position] = rank; }
    result
}
