//! Loading query and position/length logs.

use std::{fs::File, io::{self, BufRead, BufReader}, path::Path};

/// Returns the part of the `line` after its first tab, or the whole `line` if it has no tab.
fn payload(line: &[u8]) -> &[u8] {
    match line.iter().position(|b| *b == b'\t') {
        Some(tab) => &line[tab+1..],
        None => line
    }
}

/// Returns the value of decimal digits that begin `field` (after optional spaces),
/// or `0` if there are no such digits.
pub fn parse_lenient(field: &[u8]) -> usize {
    field.iter()
        .skip_while(|b| **b == b' ')
        .take_while(|b| b.is_ascii_digit())
        .fold(0usize, |value, digit| value.wrapping_mul(10).wrapping_add((digit - b'0') as usize))
}

/// Calls `f` with the content of each non-empty line read from the `input`, without the line terminator.
fn for_each_line<R: BufRead, F: FnMut(&[u8])>(mut input: R, mut f: F) -> io::Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 { return Ok(()); }
        let content = line.strip_suffix(b"\n").unwrap_or(&line[..]);
        let content = content.strip_suffix(b"\r").unwrap_or(content);
        if !content.is_empty() { f(content); }
    }
}

/// Reads `<label>\t<query>` lines from the `input` and returns the queries, in order.
pub fn read_queries<R: BufRead>(input: R) -> io::Result<Vec<Box<[u8]>>> {
    let mut result = Vec::new();
    for_each_line(input, |line| result.push(payload(line).into()))?;
    Ok(result)
}

/// Reads `<offset>\t<length>` lines from the `input` and returns the offsets and the lengths.
pub fn read_positions_lengths<R: BufRead>(input: R) -> io::Result<(Vec<usize>, Vec<usize>)> {
    let mut positions = Vec::new();
    let mut lengths = Vec::new();
    for_each_line(input, |line| {
        let (position, length) = match line.iter().position(|b| *b == b'\t') {
            Some(tab) => (&line[..tab], &line[tab+1..]),
            None => (line, &[][..])
        };
        positions.push(parse_lenient(position));
        lengths.push(parse_lenient(length));
    })?;
    Ok((positions, lengths))
}

/// Loads the queries from the file with given `path`.
pub fn load_queries<P: AsRef<Path>>(path: P) -> io::Result<Vec<Box<[u8]>>> {
    read_queries(BufReader::new(File::open(path)?))
}

/// Loads the offsets and the lengths from the file with given `path`.
pub fn load_positions_lengths<P: AsRef<Path>>(path: P) -> io::Result<(Vec<usize>, Vec<usize>)> {
    read_positions_lengths(BufReader::new(File::open(path)?))
}

/// Queries and optional extraction ranges that drive the benchmark.
#[derive(Default)]
pub struct Workload {
    /// Patterns for count and search, in replay order.
    pub queries: Vec<Box<[u8]>>,
    /// Offsets and lengths of the substrings to extract, in replay order.
    /// If `None`, extract uses randomly drawn offsets.
    pub ranges: Option<(Vec<usize>, Vec<usize>)>,
}

impl Workload {
    /// Loads the queries from `queries_path` and, if given, the ranges from `positions_path`.
    pub fn load<P: AsRef<Path>>(queries_path: P, positions_path: Option<P>) -> io::Result<Self> {
        Ok(Self {
            queries: load_queries(queries_path)?,
            ranges: positions_path.map(load_positions_lengths).transpose()?,
        })
    }

    /// Returns the `(begin, end)` pairs of the ranges to extract, if any.
    pub fn extract_ranges(&self) -> Option<impl Iterator<Item = (usize, usize)> + Clone + '_> {
        self.ranges.as_ref().map(|(positions, lengths)|
            positions.iter().zip(lengths.iter()).map(|(p, l)| (*p, p.saturating_add(*l))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries() {
        let queries = read_queries(&b"a\tfoo\nb\tbar\r\n\nc\tbaz\tqux\nnolabel\n"[..]).unwrap();
        let expected: [&[u8]; 4] = [b"foo", b"bar", b"baz\tqux", b"nolabel"];
        assert_eq!(queries.len(), expected.len());
        for (got, expected) in queries.iter().zip(expected) { assert_eq!(&got[..], expected); }
    }

    #[test]
    fn test_query_may_be_empty_or_contain_spaces() {
        let queries = read_queries(&b"x\t\ny\t two words "[..]).unwrap();
        assert_eq!(&queries[0][..], b"");
        assert_eq!(&queries[1][..], b" two words ");
    }

    #[test]
    fn test_positions_lengths() {
        let (positions, lengths) = read_positions_lengths(&b"10\t20\n5\tx\n\nabc\t7\n42\n3\t4\r\n"[..]).unwrap();
        assert_eq!(positions, [10, 5, 0, 42, 3]);
        assert_eq!(lengths, [20, 0, 7, 0, 4]);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(parse_lenient(b"123"), 123);
        assert_eq!(parse_lenient(b" 77abc"), 77);
        assert_eq!(parse_lenient(b"-5"), 0);
        assert_eq!(parse_lenient(b""), 0);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("csa_benchmark_no_such_workload_file");
        assert_eq!(load_queries(&path).err().unwrap().kind(), io::ErrorKind::NotFound);
        assert!(Workload::load(&path, None).is_err());
    }

    #[test]
    fn test_extract_ranges() {
        let workload = Workload { queries: Vec::new(), ranges: Some((vec![1, 8], vec![3, 0])) };
        assert_eq!(workload.extract_ranges().unwrap().collect::<Vec<_>>(), [(1, 4), (8, 8)]);
        assert!(Workload::default().extract_ranges().is_none());
    }
}
