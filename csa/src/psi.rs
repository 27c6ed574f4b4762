use std::ops::Range;

use crate::alphabet::Alphabet;

/// Returns the number of leading indices in `0..len` that satisfy `pred`,
/// assuming that `pred` is satisfied by a prefix of the indices.
#[inline] pub(crate) fn partition_point<P: Fn(usize) -> bool>(len: usize, pred: P) -> usize {
    let (mut begin, mut end) = (0, len);
    while begin < end {
        let mid = begin + (end - begin) / 2;
        if pred(mid) { begin = mid + 1 } else { end = mid }
    }
    begin
}

/// Search and extraction for indexes that can evaluate the psi function.
pub(crate) trait PsiNavigation {
    fn alphabet(&self) -> &Alphabet;

    /// Returns the rank of the suffix that follows (cyclically) the suffix of rank `rank`.
    fn psi_at(&self, rank: usize) -> usize;

    /// Returns the range of ranks of suffixes prefixed by `pattern`.
    /// The rank of the sentinel suffix is never included.
    ///
    /// Psi is increasing over the ranks of suffixes that begin with the same symbol,
    /// so each pattern symbol narrows the range by two binary searches.
    fn backward_search(&self, pattern: &[u8]) -> Range<usize> {
        let alphabet = self.alphabet();
        if pattern.is_empty() { return 1..alphabet.suffixes(); }
        let mut range = 0..alphabet.suffixes();
        for b in pattern.iter().rev() {
            let Some(symbol) = alphabet.symbol(*b) else { return 0..0 };
            let block = alphabet.ranks(symbol);
            let begin = block.start + partition_point(block.len(), |i| self.psi_at(block.start + i) < range.start);
            let end = block.start + partition_point(block.len(), |i| self.psi_at(block.start + i) < range.end);
            if begin >= end { return 0..0; }
            range = begin..end;
        }
        range
    }

    /// Returns `len` bytes of the text that begins with the suffix of rank `rank`.
    fn extract_from_rank(&self, mut rank: usize, len: usize) -> Vec<u8> {
        let alphabet = self.alphabet();
        let mut result = Vec::with_capacity(len);
        for _ in 0..len {
            result.push(alphabet.byte(alphabet.symbol_at_rank(rank)));
            rank = self.psi_at(rank);
        }
        result
    }
}
