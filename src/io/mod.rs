mod file_reader;
mod range_reader;
mod raw_buffer;

pub use file_reader::{FileRangeReader, MemoryRangeReader};
pub use range_reader::{
    read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le, RangeReader,
};
pub use raw_buffer::{load_raw, RawBuffer, MAX_RAW_SIZE};
