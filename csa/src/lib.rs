#![doc = include_str!("../README.md")]

mod alphabet;
mod construction;
mod packed;
mod psi;
mod samples;

mod enc_vector;
pub use enc_vector::EncodedVector;

mod wavelet;
pub use wavelet::WaveletCsa;

mod encoded;
pub use encoded::EncodedCsa;

mod bitcompressed;
pub use bitcompressed::BitCompressedCsa;

pub use samples::DEFAULT_SAMPLE_RATE;

use std::{fmt, fs::File, io::{self, BufReader, BufWriter, Write}, path::Path};

use binout::{AsIs, Serializer};

/// Structural variant of the compressed suffix array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Burrows-Wheeler transform in a wavelet matrix, see [`WaveletCsa`].
    WaveletTree,
    /// Psi function in an [`EncodedVector`], see [`EncodedCsa`].
    EncodedVector,
    /// Bit-compressed (uncompressed) suffix array and its inverse, see [`BitCompressedCsa`].
    BitCompressed,
}

impl Variant {
    /// Returns the variant selected by the integer `code`:
    /// 0 - wavelet tree, 1 - encoded vector, any other - bit-compressed.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Variant::WaveletTree,
            1 => Variant::EncodedVector,
            _ => Variant::BitCompressed
        }
    }

    /// Returns the code of `self`, accepted by [`Self::from_code`].
    pub fn code(self) -> u8 {
        match self {
            Variant::WaveletTree => 0,
            Variant::EncodedVector => 1,
            Variant::BitCompressed => 2,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match *self {
            Variant::WaveletTree => "wavelet tree",
            Variant::EncodedVector => "encoded vector",
            Variant::BitCompressed => "bit-compressed",
        })
    }
}

/// Full-text index over a byte string.
///
/// All queries are pure: they neither modify the index nor depend on the previous queries.
/// The text is conceptually terminated by a sentinel which is smaller than any byte,
/// so the suffix array, its inverse and psi have `len()+1` items.
pub trait TextIndex {
    /// Returns the number of indexed text symbols (the sentinel is not counted).
    fn len(&self) -> usize;

    /// Returns whether the indexed text is empty.
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Returns the number of occurrences of `pattern` in the text.
    /// The empty pattern occurs at every text position.
    fn count(&self, pattern: &[u8]) -> usize;

    /// Returns the starting positions (in unspecified order) of all occurrences of `pattern` in the text.
    fn locate(&self, pattern: &[u8]) -> Vec<usize>;

    /// Returns the text bytes in range [`begin`, `end`), clamped to the text.
    fn extract(&self, begin: usize, end: usize) -> Vec<u8>;

    /// Returns the suffix array value at `rank`, which must not be greater than [`Self::len`].
    fn sa(&self, rank: usize) -> usize;

    /// Returns the inverse suffix array value at text `position`, which must not be greater than [`Self::len`].
    fn isa(&self, position: usize) -> usize;

    /// Returns the psi (next position array) value at `rank`, which must not be greater than [`Self::len`].
    fn psi(&self, rank: usize) -> usize;

    /// Returns the structural variant of `self`.
    fn variant(&self) -> Variant;

    /// Returns approximate number of bytes occupied by `self` in memory.
    fn size_in_bytes(&self) -> usize;

    /// Returns number of bytes which `write` will write.
    fn write_bytes(&self) -> usize;

    /// Writes `self`, preceded by the header that identifies the variant, to the `output`.
    fn write(&self, output: &mut dyn io::Write) -> io::Result<()>;
}

/// The first bytes of each serialized index.
const MAGIC: u32 = u32::from_le_bytes(*b"bCSA");

/// Version of the serialization format.
const FORMAT_VERSION: u8 = 1;

/// Returns number of bytes which [`write_header`] writes.
pub(crate) fn header_bytes() -> usize {
    AsIs::size(MAGIC) + AsIs::size(FORMAT_VERSION) + AsIs::size(0u8)
}

/// Writes the header that identifies the index `variant`.
pub(crate) fn write_header(output: &mut dyn io::Write, variant: Variant) -> io::Result<()> {
    AsIs::write(output, MAGIC)?;
    AsIs::write(output, FORMAT_VERSION)?;
    AsIs::write(output, variant.code())
}

fn read_header(input: &mut dyn io::Read) -> io::Result<Variant> {
    let magic: u32 = AsIs::read(input)?;
    if magic != MAGIC {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "not a compressed suffix array file"));
    }
    let version: u8 = AsIs::read(input)?;
    if version != FORMAT_VERSION {
        return Err(io::Error::new(io::ErrorKind::InvalidData,
            format!("unsupported format version {version} (expected {FORMAT_VERSION})")));
    }
    match AsIs::read(input)? {
        0u8 => Ok(Variant::WaveletTree),
        1 => Ok(Variant::EncodedVector),
        2 => Ok(Variant::BitCompressed),
        code => Err(io::Error::new(io::ErrorKind::InvalidData, format!("unknown index variant {code}")))
    }
}

/// Builds the index of given `variant` over the `text`.
pub fn build(variant: Variant, text: &[u8]) -> Box<dyn TextIndex> {
    match variant {
        Variant::WaveletTree => Box::new(WaveletCsa::new(text)),
        Variant::EncodedVector => Box::new(EncodedCsa::new(text)),
        Variant::BitCompressed => Box::new(BitCompressedCsa::new(text)),
    }
}

/// Reads the index written by [`TextIndex::write`] from the `input`.
pub fn read(input: &mut dyn io::Read) -> io::Result<Box<dyn TextIndex>> {
    Ok(match read_header(input)? {
        Variant::WaveletTree => Box::new(WaveletCsa::read_content(input)?),
        Variant::EncodedVector => Box::new(EncodedCsa::read_content(input)?),
        Variant::BitCompressed => Box::new(BitCompressedCsa::read_content(input)?),
    })
}

/// Loads the index from the file with given `path`.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn TextIndex>> {
    read(&mut BufReader::new(File::open(path)?))
}

/// Stores the `index` in the file with given `path`.
///
/// The index is first written to a temporary file in the same directory, which is then renamed,
/// so `path` never refers to a partially written index.
pub fn store_to_file<P: AsRef<Path>>(index: &dyn TextIndex, path: P) -> io::Result<()> {
    let path = path.as_ref();
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);
    let written = File::create(tmp_path).and_then(|file| {
        let mut output = BufWriter::new(file);
        index.write(&mut output)?;
        output.flush()
    });
    if let Err(e) = written.and_then(|()| std::fs::rename(tmp_path, path)) {
        let _ = std::fs::remove_file(tmp_path);
        return Err(e);
    }
    Ok(())
}

/// Returns the size of the `index` in megabytes (2^20 bytes).
pub fn size_in_mega_bytes(index: &dyn TextIndex) -> f64 {
    index.size_in_bytes() as f64 / (1024.0 * 1024.0)
}
