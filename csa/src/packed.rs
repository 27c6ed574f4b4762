use std::io;

use binout::{AsIs, Serializer};
use bitm::{BitAccess, BitVec, ceiling_div};
use dyn_size_of::GetSize;

/// Returns the number of bits needed to store `value` (at least 1).
#[inline] pub(crate) fn bits_to_store(value: u64) -> u8 {
    (64 - value.leading_zeros()).max(1) as u8
}

/// Vector of `len` unsigned integers, each stored on `bits_per_item` bits.
pub(crate) struct PackedInts {
    content: Box<[u64]>,
    bits_per_item: u8,
    len: usize
}

impl PackedInts {
    /// Constructs [`PackedInts`] with the `items` (exactly `len` of them), all not greater than `max_item`.
    pub fn with_items<I>(items: I, len: usize, max_item: usize) -> Self
        where I: IntoIterator<Item = usize>
    {
        let bits_per_item = bits_to_store(max_item as u64);
        let mut content = Box::<[u64]>::with_zeroed_bits(len * bits_per_item as usize);
        let mut inserted = 0;
        for (index, item) in items.into_iter().enumerate() {
            debug_assert!(item <= max_item);
            content.init_fragment(index, item as u64, bits_per_item);
            inserted += 1;
        }
        assert_eq!(inserted, len, "PackedInts: got {inserted} items, but declared {len}");
        Self { content, bits_per_item, len }
    }

    /// Constructs [`PackedInts`] that contains copy of the `items`.
    pub fn from_slice(items: &[usize]) -> Self {
        let max_item = items.iter().copied().max().unwrap_or(0);
        Self::with_items(items.iter().copied(), items.len(), max_item)
    }

    /// Returns the item with given `index`.
    #[inline] pub fn get(&self, index: usize) -> usize {
        debug_assert!(index < self.len);
        self.content.get_fragment(index, self.bits_per_item) as usize
    }

    #[inline] pub fn len(&self) -> usize { self.len }

    /// Returns number of bytes which `write` will write.
    pub fn write_bytes(&self) -> usize {
        AsIs::size(self.len) + AsIs::size(self.bits_per_item) + AsIs::array_content_size(&self.content)
    }

    /// Writes `self` to the `output`.
    pub fn write(&self, output: &mut dyn io::Write) -> io::Result<()> {
        AsIs::write(output, self.len)?;
        AsIs::write(output, self.bits_per_item)?;
        AsIs::write_all(output, self.content.iter())
    }

    /// Reads `self` from the `input`.
    pub fn read(input: &mut dyn io::Read) -> io::Result<Self> {
        let len: usize = AsIs::read(input)?;
        let bits_per_item: u8 = AsIs::read(input)?;
        if bits_per_item == 0 || bits_per_item > 63 {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "packed integers: bits per item out of range"));
        }
        let content = AsIs::read_n(input, ceiling_div(len * bits_per_item as usize, 64))?;
        Ok(Self { content, bits_per_item, len })
    }
}

impl GetSize for PackedInts {
    fn size_bytes_dyn(&self) -> usize { self.content.size_bytes_dyn() }
    const USES_DYN_MEM: bool = true;
}
