//! Binary encoding of an [`AIList`].
//!
//! Layout (all integers little endian):
//!
//! ```text
//! magic                  4 bytes  "AILS"
//! version                u8
//! flags                  u8       bit 0: constructed
//! min_coverage           u32
//! max_components         u32
//! min_component_len      u32      0 = derived from min_coverage
//! linear_scan_threshold  u32
//! wps_window             u32
//! count                  u64
//! count x {
//!     start              u64
//!     end                u64
//!     label              see IntervalLabel
//! }
//! ```
//!
//! Intervals are written in insertion order. The component layout is derived data
//! and is rebuilt on load.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_traits::{PrimInt, Unsigned, cast};

use ailist_core::models::Interval;

use crate::ailist::{AIList, IndexState};
use crate::config::AIListConfig;
use crate::errors::{AIListError, AIListResult};
use crate::store::IntervalStore;

const MAGIC: &[u8; 4] = b"AILS";
const FORMAT_VERSION: u8 = 1;
const FLAG_CONSTRUCTED: u8 = 0b0000_0001;

/// Cap on the capacity reserved up front from an untrusted count.
const MAX_PREALLOCATED: usize = 1 << 16;

/// Labels that can be written to and read back from the binary format.
pub trait IntervalLabel: Sized {
    fn write_label<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    fn read_label<R: Read>(reader: &mut R) -> io::Result<Self>;
}

impl IntervalLabel for () {
    fn write_label<W: Write>(&self, _writer: &mut W) -> io::Result<()> {
        Ok(())
    }

    fn read_label<R: Read>(_reader: &mut R) -> io::Result<Self> {
        Ok(())
    }
}

impl IntervalLabel for u8 {
    fn write_label<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(*self)
    }

    fn read_label<R: Read>(reader: &mut R) -> io::Result<Self> {
        reader.read_u8()
    }
}

macro_rules! impl_int_label {
    ($($ty:ty => $write:ident, $read:ident);* $(;)?) => {
        $(
            impl IntervalLabel for $ty {
                fn write_label<W: Write>(&self, writer: &mut W) -> io::Result<()> {
                    writer.$write::<LittleEndian>(*self)
                }

                fn read_label<R: Read>(reader: &mut R) -> io::Result<Self> {
                    reader.$read::<LittleEndian>()
                }
            }
        )*
    };
}

impl_int_label! {
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
    i16 => write_i16, read_i16;
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
}

impl IntervalLabel for usize {
    fn write_label<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u64::<LittleEndian>(*self as u64)
    }

    fn read_label<R: Read>(reader: &mut R) -> io::Result<Self> {
        let value = reader.read_u64::<LittleEndian>()?;
        usize::try_from(value).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
    }
}

impl IntervalLabel for bool {
    fn write_label<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(<u8 as From<bool>>::from(*self))
    }

    fn read_label<R: Read>(reader: &mut R) -> io::Result<Self> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("invalid bool label: {other}"),
            )),
        }
    }
}

/// Strings are stored as a u32 byte length followed by UTF-8 bytes.
impl IntervalLabel for String {
    fn write_label<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let len = u32::try_from(self.len())
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e))?;
        writer.write_u32::<LittleEndian>(len)?;
        writer.write_all(self.as_bytes())
    }

    fn read_label<R: Read>(reader: &mut R) -> io::Result<Self> {
        let len = reader.read_u32::<LittleEndian>()? as u64;
        let mut bytes = Vec::new();
        reader.by_ref().take(len).read_to_end(&mut bytes)?;
        if bytes.len() as u64 != len {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                "truncated string label",
            ));
        }
        String::from_utf8(bytes).map_err(|e| io::Error::new(ErrorKind::InvalidData, e))
    }
}

/// A one byte tag (0 = none, 1 = some) followed by the inner label.
impl<L: IntervalLabel> IntervalLabel for Option<L> {
    fn write_label<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            None => writer.write_u8(0),
            Some(label) => {
                writer.write_u8(1)?;
                label.write_label(writer)
            }
        }
    }

    fn read_label<R: Read>(reader: &mut R) -> io::Result<Self> {
        match reader.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(L::read_label(reader)?)),
            other => Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("invalid option tag: {other}"),
            )),
        }
    }
}

/// Map read failures caused by bad input to `CorruptData`; anything else stays an io error.
fn corrupt(context: &'static str) -> impl Fn(io::Error) -> AIListError {
    move |e| match e.kind() {
        ErrorKind::UnexpectedEof | ErrorKind::InvalidData => {
            AIListError::CorruptData(format!("{context}: {e}"))
        }
        _ => AIListError::Io(e),
    }
}

fn encode_usize(value: usize, field: &str) -> AIListResult<u32> {
    u32::try_from(value)
        .map_err(|_| AIListError::EncodeError(format!("{field} {value} does not fit in u32")))
}

fn encode_coord<I: PrimInt>(coord: I) -> AIListResult<u64> {
    coord.to_u64().ok_or_else(|| {
        AIListError::EncodeError("coordinate does not fit in 64 bits".to_string())
    })
}

fn decode_coord<I: PrimInt>(coord: u64) -> AIListResult<I> {
    cast::<u64, I>(coord).ok_or_else(|| {
        AIListError::CorruptData(format!("coordinate {coord} out of range for index type"))
    })
}

fn write_config<W: Write>(writer: &mut W, config: &AIListConfig) -> AIListResult<()> {
    writer.write_u32::<LittleEndian>(encode_usize(config.min_coverage, "min_coverage")?)?;
    writer.write_u32::<LittleEndian>(encode_usize(config.max_components, "max_components")?)?;
    writer.write_u32::<LittleEndian>(encode_usize(
        config.min_component_len.unwrap_or(0),
        "min_component_len",
    )?)?;
    writer.write_u32::<LittleEndian>(encode_usize(
        config.linear_scan_threshold,
        "linear_scan_threshold",
    )?)?;
    writer.write_u32::<LittleEndian>(config.wps_window)?;
    Ok(())
}

fn read_config<R: Read>(reader: &mut R) -> AIListResult<AIListConfig> {
    let mut field = || {
        reader
            .read_u32::<LittleEndian>()
            .map_err(corrupt("truncated header"))
    };

    let min_coverage = field()? as usize;
    let max_components = field()? as usize;
    let min_component_len = match field()? {
        0 => None,
        len => Some(len as usize),
    };
    let linear_scan_threshold = field()? as usize;
    let wps_window = field()?;

    let config = AIListConfig {
        min_coverage,
        max_components,
        min_component_len,
        linear_scan_threshold,
        wps_window,
    };
    config
        .validate()
        .map_err(|e| AIListError::CorruptData(format!("bad configuration: {e}")))?;
    Ok(config)
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync + IntervalLabel,
{
    /// Encode the list into `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> AIListResult<()> {
        let flags = match self.state() {
            IndexState::Constructed => FLAG_CONSTRUCTED,
            IndexState::Raw => 0,
        };

        writer.write_all(MAGIC)?;
        writer.write_u8(FORMAT_VERSION)?;
        writer.write_u8(flags)?;
        write_config(writer, self.config())?;
        writer.write_u64::<LittleEndian>(self.len() as u64)?;

        for interval in self.intervals() {
            writer.write_u64::<LittleEndian>(encode_coord(interval.start)?)?;
            writer.write_u64::<LittleEndian>(encode_coord(interval.end)?)?;
            interval
                .val
                .write_label(writer)
                .map_err(|e| match e.kind() {
                    ErrorKind::InvalidInput => AIListError::EncodeError(e.to_string()),
                    _ => AIListError::Io(e),
                })?;
        }

        Ok(())
    }

    /// Encode the list into a new byte vector.
    pub fn to_bytes(&self) -> AIListResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(30 + self.len() * 16);
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    ///
    /// Decode a list from `reader`.
    ///
    /// The returned list is always constructed and ready to query.
    ///
    /// # Returns
    /// - `Err(AIListError::CorruptData)` if the payload is malformed or truncated
    pub fn read_from<R: Read>(reader: &mut R) -> AIListResult<Self> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(corrupt("truncated header"))?;
        if &magic != MAGIC {
            return Err(AIListError::CorruptData("bad magic bytes".to_string()));
        }

        let version = reader.read_u8().map_err(corrupt("truncated header"))?;
        if version != FORMAT_VERSION {
            return Err(AIListError::CorruptData(format!(
                "unsupported format version: {version}"
            )));
        }

        let flags = reader.read_u8().map_err(corrupt("truncated header"))?;
        if flags & !FLAG_CONSTRUCTED != 0 {
            return Err(AIListError::CorruptData(format!("unknown flags: {flags:#04x}")));
        }

        let config = read_config(reader)?;

        let count = reader
            .read_u64::<LittleEndian>()
            .map_err(corrupt("truncated header"))?;
        let count = usize::try_from(count)
            .map_err(|_| AIListError::CorruptData(format!("interval count {count} too large")))?;

        let mut store = IntervalStore::with_capacity(count.min(MAX_PREALLOCATED));
        for _ in 0..count {
            let start = reader
                .read_u64::<LittleEndian>()
                .map_err(corrupt("truncated interval"))?;
            let end = reader
                .read_u64::<LittleEndian>()
                .map_err(corrupt("truncated interval"))?;
            let val = T::read_label(reader).map_err(corrupt("bad label"))?;

            let interval = Interval::new(decode_coord(start)?, decode_coord(end)?, val)
                .map_err(|e| AIListError::CorruptData(e.to_string()))?;
            store.append(interval);
        }

        let ailist = Self::from_parts(store, config);
        ailist.construct();
        Ok(ailist)
    }

    /// Decode a list from a byte slice, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> AIListResult<Self> {
        let mut cursor = Cursor::new(bytes);
        let ailist = Self::read_from(&mut cursor)?;
        if cursor.position() != bytes.len() as u64 {
            return Err(AIListError::CorruptData(format!(
                "{} trailing bytes",
                bytes.len() as u64 - cursor.position()
            )));
        }
        Ok(ailist)
    }

    /// Write the list to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> AIListResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a list written by [`save`](AIList::save).
    pub fn load<P: AsRef<Path>>(path: P) -> AIListResult<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let ailist = Self::read_from(&mut reader)?;

        let mut rest = [0u8; 1];
        if reader.read(&mut rest)? != 0 {
            return Err(AIListError::CorruptData("trailing bytes".to_string()));
        }
        Ok(ailist)
    }
}
