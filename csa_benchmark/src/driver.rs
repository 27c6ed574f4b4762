//! Warm-up and measurement protocol, common to all operations and clocks.

use std::{ffi::OsString, fmt, fs::File, hint::black_box, io::{self, BufWriter, Write}, path::{Path, PathBuf}};

use clap::{Args, ValueEnum};
use csa::TextIndex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::{timer::{Clock, ClockKind, CycleCounter, WallClock}, workload::Workload};

/// Benchmarked index operation.
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum Operation {
    /// Psi (next position array) at random rank
    Npa,
    /// Inverse suffix array at random text position
    Isa,
    /// Suffix array at random rank
    Sa,
    /// Substring of span length at random position, or ranges from the position/length log
    Extract,
    /// Number of occurrences of each query
    Count,
    /// Positions of all occurrences of each query
    Search,
}

impl Operation {
    /// All operations, in the default order of benchmarking.
    pub const ALL: [Operation; 6] = [Operation::Npa, Operation::Isa, Operation::Sa, Operation::Extract, Operation::Count, Operation::Search];

    /// Returns the name of `self`, used also as the extension of the output file.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Npa => "npa",
            Operation::Isa => "isa",
            Operation::Sa => "sa",
            Operation::Extract => "extract",
            Operation::Count => "count",
            Operation::Search => "search",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of the measurement protocol.
#[derive(Args, Clone, Debug)]
pub struct Conf {
    /// Number of warm-up calls (over the head of the query log) before measuring count and search
    #[arg(long, default_value_t = 100)]
    pub warmup_queries: usize,

    /// Number of warm-up calls (with random arguments) before measuring npa, isa, sa and extract
    #[arg(long, default_value_t = 1000)]
    pub warmup_random: usize,

    /// Number of measured calls of npa, isa, sa and (random) extract
    #[arg(short='t', long, default_value_t = 100_000)]
    pub trials: usize,

    /// Length of the substrings extracted at random positions
    #[arg(long, default_value_t = 1000)]
    pub span: usize,

    /// Seed for the (PCG) generator of random arguments
    #[arg(short='s', long, default_value_t = 1234)]
    pub seed: u64,

    /// Directory to write the output files to
    #[arg(short='o', long, default_value = ".")]
    pub output_dir: PathBuf,
}

impl Default for Conf {
    fn default() -> Self {
        Self { warmup_queries: 100, warmup_random: 1000, trials: 100_000, span: 1000, seed: 1234, output_dir: PathBuf::from(".") }
    }
}

/// Returns the beginning of a random substring of length `span` of a text of length `len`,
/// or [`None`] if the text is shorter than `span`.
pub fn random_extract_start<R: Rng>(rng: &mut R, len: usize, span: usize) -> Option<usize> {
    (span <= len).then(|| rng.gen_range(0..=len - span))
}

/// Runs the benchmarks of single index operations and writes their latencies.
pub struct Driver<'a, I: ?Sized> {
    index: &'a I,
    workload: &'a Workload,
    conf: &'a Conf,
    /// Name of the index file, the common prefix of the output file names.
    file_name: OsString,
}

impl<'a, I: TextIndex + ?Sized> Driver<'a, I> {
    /// Constructs a driver of the `index` loaded from `index_path`.
    pub fn new(index: &'a I, index_path: &Path, workload: &'a Workload, conf: &'a Conf) -> Self {
        let file_name = index_path.file_name().map_or_else(|| OsString::from("index"), |n| n.to_owned());
        Self { index, workload, conf, file_name }
    }

    /// Returns the path of the file with latencies of `operation` measured by the clock `C`.
    pub fn output_path<C: Clock>(&self, operation: Operation) -> PathBuf {
        let mut name = self.file_name.clone();
        name.push(".");
        name.push(operation.name());
        name.push(C::FILE_SUFFIX);
        self.conf.output_dir.join(name)
    }

    fn rng(&self) -> Pcg64Mcg { Pcg64Mcg::seed_from_u64(self.conf.seed) }

    /// Calls `f` on `warmup` arguments and then measures its latency on `trials` arguments.
    /// The `i`-th argument of each phase is given by `arg(i)`.
    /// Writes `summary\tlatency` line for each measured call to the output file of `operation`.
    fn measure<C, A, G, F>(&self, clock: &C, operation: Operation, warmup: usize, trials: usize, mut arg: G, f: F) -> io::Result<PathBuf>
        where C: Clock, G: FnMut(usize) -> A, F: Fn(A) -> usize
    {
        let mut checksum = 0usize;
        for i in 0..warmup { checksum = checksum.wrapping_add(f(arg(i))); }
        eprintln!("  {operation}: warm-up with {warmup} calls, checksum {checksum}");
        let path = self.output_path::<C>(operation);
        let mut output = BufWriter::new(File::create(&path)?);
        for i in 0..trials {
            let a = black_box(arg(i));
            let before = clock.now();
            let summary = black_box(f(a));
            let after = clock.now();
            writeln!(output, "{summary}\t{}", C::elapsed(before, after))?;
        }
        output.flush()?;
        eprintln!("  {operation}: {trials} latencies [{}] written to {}", C::UNIT, path.display());
        Ok(path)
    }

    /// Measures `f` called on random numbers from `0..len()`.
    fn measure_random<C, F>(&self, clock: &C, operation: Operation, f: F) -> io::Result<Option<PathBuf>>
        where C: Clock, F: Fn(usize) -> usize
    {
        let len = self.index.len();
        if len == 0 {
            eprintln!("  {operation}: skipped as the index is empty");
            return Ok(None);
        }
        let mut rng = self.rng();
        self.measure(clock, operation, self.conf.warmup_random, self.conf.trials,
            |_| rng.gen_range(0..len), f).map(Some)
    }

    fn measure_extract<C: Clock>(&self, clock: &C) -> io::Result<Option<PathBuf>> {
        let extract = |(begin, end): (usize, usize)| self.index.extract(begin, end).len();
        if let Some(ranges) = self.workload.extract_ranges() {
            let ranges: Vec<(usize, usize)> = ranges.collect();
            return self.measure(clock, Operation::Extract,
                self.conf.warmup_random.min(ranges.len()), ranges.len(),
                |i| ranges[i], extract).map(Some);
        }
        let (len, span) = (self.index.len(), self.conf.span);
        if len == 0 || len < span {
            eprintln!("  extract: skipped as the index ({len} symbols) is shorter than the span ({span})");
            return Ok(None);
        }
        let mut rng = self.rng();
        self.measure(clock, Operation::Extract, self.conf.warmup_random, self.conf.trials,
            |_| {
                let begin = random_extract_start(&mut rng, len, span).unwrap_or(0);
                (begin, begin + span)
            }, extract).map(Some)
    }

    fn measure_queries<C, F>(&self, clock: &C, operation: Operation, f: F) -> io::Result<Option<PathBuf>>
        where C: Clock, F: Fn(&[u8]) -> usize
    {
        let queries = &self.workload.queries;
        self.measure(clock, operation, self.conf.warmup_queries.min(queries.len()), queries.len(),
            |i| &queries[i][..], f).map(Some)
    }

    /// Benchmarks the `operation` using the `clock`.
    /// Returns the path of the output file, or [`None`] if the benchmark was skipped.
    pub fn run<C: Clock>(&self, clock: &C, operation: Operation) -> io::Result<Option<PathBuf>> {
        let index = self.index;
        match operation {
            Operation::Npa => self.measure_random(clock, operation, |rank| index.psi(rank)),
            Operation::Isa => self.measure_random(clock, operation, |position| index.isa(position)),
            Operation::Sa => self.measure_random(clock, operation, |rank| index.sa(rank)),
            Operation::Extract => self.measure_extract(clock),
            Operation::Count => self.measure_queries(clock, operation, |query| index.count(query)),
            Operation::Search => self.measure_queries(clock, operation, |query| index.locate(query).len()),
        }
    }

    /// Benchmarks each of the `operations` using the clock(s) of given `kind`.
    /// The wall clock variant of each operation is run before its cycle counter variant.
    pub fn run_all(&self, operations: &[Operation], kind: ClockKind) -> io::Result<()> {
        for operation in operations {
            if kind.uses_wall_clock() { self.run(&WallClock::new(), *operation)?; }
            if kind.uses_cycle_counter() { self.run(&CycleCounter, *operation)?; }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("csa_benchmark_driver_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn lines(path: &Path) -> Vec<(usize, u64)> {
        fs::read_to_string(path).unwrap().lines().map(|line| {
            let (summary, latency) = line.split_once('\t').unwrap();
            (summary.parse().unwrap(), latency.parse().unwrap())
        }).collect()
    }

    #[test]
    fn test_random_extract_start_is_bounded() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        for _ in 0..10_000 {
            let start = random_extract_start(&mut rng, 1500, 1000).unwrap();
            assert!(start + 1000 <= 1500);
        }
        assert_eq!(random_extract_start(&mut rng, 1000, 1000), Some(0));
        assert_eq!(random_extract_start(&mut rng, 500, 1000), None);
    }

    #[test]
    fn test_output_path() {
        let workload = Workload::default();
        let conf = Conf { output_dir: PathBuf::from("out"), ..Default::default() };
        let index = csa::build(csa::Variant::BitCompressed, b"abc");
        let driver = Driver::new(&*index, Path::new("some/dir/text.csa"), &workload, &conf);
        assert_eq!(driver.output_path::<WallClock>(Operation::Count), Path::new("out/text.csa.count"));
        assert_eq!(driver.output_path::<CycleCounter>(Operation::Npa), Path::new("out/text.csa.npa.ticks"));
    }

    #[test]
    fn test_random_operations() {
        let dir = test_dir("random");
        let text: Vec<u8> = (0..3000u32).map(|i| b"abcd"[(i * 7 % 13 % 4) as usize]).collect();
        let index = csa::build(csa::Variant::EncodedVector, &text);
        let workload = Workload::default();
        let conf = Conf { trials: 500, warmup_random: 10, span: 100, output_dir: dir.clone(), ..Default::default() };
        let driver = Driver::new(&*index, Path::new("text.csa"), &workload, &conf);
        for operation in [Operation::Npa, Operation::Isa, Operation::Sa, Operation::Extract] {
            let path = driver.run(&WallClock::new(), operation).unwrap().unwrap();
            let samples = lines(&path);
            assert_eq!(samples.len(), 500, "wrong number of {operation} samples");
            if operation == Operation::Extract {
                assert!(samples.iter().all(|(summary, _)| *summary == 100));
            } else {
                assert!(samples.iter().all(|(summary, _)| *summary <= text.len()));
            }
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_same_seed_same_arguments() {
        let dir = test_dir("seed");
        let text: Vec<u8> = (0..2000u32).map(|i| (i * 31 % 251) as u8).collect();
        let index = csa::build(csa::Variant::BitCompressed, &text);
        let workload = Workload::default();
        let conf = Conf { trials: 300, warmup_random: 5, output_dir: dir.clone(), ..Default::default() };
        let driver = Driver::new(&*index, Path::new("t"), &workload, &conf);
        let wall = lines(&driver.run(&WallClock::new(), Operation::Sa).unwrap().unwrap());
        let cycles = lines(&driver.run(&CycleCounter, Operation::Sa).unwrap().unwrap());
        assert_eq!(wall.iter().map(|s| s.0).collect::<Vec<_>>(), cycles.iter().map(|s| s.0).collect::<Vec<_>>());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_extract_skipped_for_short_index() {
        let dir = test_dir("short");
        let index = csa::build(csa::Variant::WaveletTree, &[b'x'; 500]);
        let workload = Workload::default();
        let conf = Conf { trials: 10, output_dir: dir.clone(), ..Default::default() };
        let driver = Driver::new(&*index, Path::new("short"), &workload, &conf);
        assert_eq!(driver.run(&WallClock::new(), Operation::Extract).unwrap(), None);
        assert!(!driver.output_path::<WallClock>(Operation::Extract).exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_extract_replays_ranges() {
        let dir = test_dir("ranges");
        let index = csa::build(csa::Variant::WaveletTree, b"0123456789");
        let workload = Workload { queries: Vec::new(), ranges: Some((vec![0, 2, 8, 20], vec![3, 0, 5, 1])) };
        let conf = Conf { output_dir: dir.clone(), ..Default::default() };
        let driver = Driver::new(&*index, Path::new("digits"), &workload, &conf);
        let path = driver.run(&WallClock::new(), Operation::Extract).unwrap().unwrap();
        assert_eq!(lines(&path).iter().map(|s| s.0).collect::<Vec<_>>(), [3, 0, 2, 0]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_queries() {
        let dir = test_dir("queries");
        let index = csa::build(csa::Variant::EncodedVector, b"foo baz ... baz");
        let workload = Workload { queries: vec![Box::from(&b"foo"[..]), Box::from(&b"bar"[..]), Box::from(&b"baz"[..])], ranges: None };
        let conf = Conf { warmup_queries: 100, output_dir: dir.clone(), ..Default::default() };
        let driver = Driver::new(&*index, Path::new("foo.csa"), &workload, &conf);
        for operation in [Operation::Count, Operation::Search] {
            let path = driver.run(&WallClock::new(), operation).unwrap().unwrap();
            assert_eq!(lines(&path).iter().map(|s| s.0).collect::<Vec<_>>(), [1, 0, 2]);
        }
        fs::remove_dir_all(&dir).unwrap();
    }
}
