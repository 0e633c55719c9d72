/// Native find-data records — the bit-exact boundary to the OS scan.
///
/// The Win32 driver yields one [`RawFindData`] per find-next call; the
/// platform layer copies the native struct field-for-field (attribute
/// bitmask, three FILETIME low/high pairs, the 64-bit size split across
/// high/low words, and the reparse tag). [`decode`] turns a raw record into
/// validated values or rejects it as corrupt.
///
/// A record with an unconvertible timestamp is an [`InvalidRecord`], not a
/// fatal error: callers skip it and continue the scan.
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use thiserror::Error;

// Attribute bits consumed from the native mask. Values are the Win32
// constants; the cfg(windows) driver copies the mask through unchanged.
pub const FILE_ATTRIBUTE_HIDDEN: u32 = 0x0000_0002;
pub const FILE_ATTRIBUTE_SYSTEM: u32 = 0x0000_0004;
pub const FILE_ATTRIBUTE_DIRECTORY: u32 = 0x0000_0010;
pub const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x0000_0400;

/// Reparse tag identifying a symbolic link. Other tags (mount points, OneDrive
/// placeholders, etc.) are not symlinks and classify as plain entries.
pub const IO_REPARSE_TAG_SYMLINK: u32 = 0xA000_000C;

/// Microseconds between the FILETIME epoch (1601-01-01) and the Unix epoch.
const FILETIME_UNIX_DIFF_MICROS: i64 = 11_644_473_600_000_000;

/// A FILETIME as the native low/high dword pair, 100 ns ticks since 1601.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Filetime {
    pub low: u32,
    pub high: u32,
}

impl Filetime {
    pub fn from_ticks(ticks: u64) -> Self {
        Self {
            low: ticks as u32,
            high: (ticks >> 32) as u32,
        }
    }

    pub fn ticks(self) -> u64 {
        (u64::from(self.high) << 32) | u64::from(self.low)
    }

    /// Convert to a UTC timestamp.
    ///
    /// A FILETIME is convertible only while its high bit is clear, the same
    /// range `FileTimeToSystemTime` accepts. Anything higher comes from a
    /// corrupt record and yields `None`. Zero is a valid (if meaningless)
    /// 1601-01-01 timestamp, which some filesystems report for unset fields.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let ticks = i64::try_from(self.ticks()).ok()?;
        let unix_micros = ticks / 10 - FILETIME_UNIX_DIFF_MICROS;
        DateTime::from_timestamp_micros(unix_micros)
    }
}

/// Mirror of the native find-data record.
///
/// `name` is already decoded from the fixed UTF-16 buffer by the platform
/// layer; every other field is a verbatim copy of the native struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFindData {
    pub name: String,
    pub attributes: u32,
    pub creation_time: Filetime,
    pub last_access_time: Filetime,
    pub last_write_time: Filetime,
    pub file_size_high: u32,
    pub file_size_low: u32,
    pub reparse_tag: u32,
}

/// Which timestamp of a record failed to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    Created,
    Modified,
    Accessed,
}

impl std::fmt::Display for TimestampField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Accessed => "accessed",
        })
    }
}

/// A record whose timestamps cannot be decoded. Skip it and keep scanning.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("find-data record {name:?} has an unconvertible {field} timestamp")]
pub struct InvalidRecord {
    pub name: String,
    pub field: TimestampField,
}

/// A validated record, ready for classification.
///
/// Both backends produce this shape: the Win32 driver through [`decode`],
/// the storage driver by lowering its higher-level items (which may lack
/// timestamps, hence the `Option`s; [`decode`] itself never emits `None`).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    pub name: CompactString,
    pub attributes: u32,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub accessed: Option<DateTime<Utc>>,
    pub size_bytes: Option<u64>,
    pub reparse_tag: u32,
}

impl DecodedRecord {
    pub fn is_directory(&self) -> bool {
        self.attributes & FILE_ATTRIBUTE_DIRECTORY != 0
    }

    pub fn is_hidden(&self) -> bool {
        self.attributes & FILE_ATTRIBUTE_HIDDEN != 0
    }

    pub fn is_system(&self) -> bool {
        self.attributes & FILE_ATTRIBUTE_SYSTEM != 0
    }

    /// Reparse-point symlinks only; other reparse tags are not links.
    pub fn is_symlink(&self) -> bool {
        self.attributes & FILE_ATTRIBUTE_REPARSE_POINT != 0
            && self.reparse_tag == IO_REPARSE_TAG_SYMLINK
    }
}

/// Decode a raw find-data record into validated values.
///
/// Fails with [`InvalidRecord`] when any of the three timestamps cannot be
/// converted; the caller must skip the record and continue the scan rather
/// than abort the enumeration.
pub fn decode(raw: &RawFindData) -> Result<DecodedRecord, InvalidRecord> {
    let invalid = |field| InvalidRecord {
        name: raw.name.clone(),
        field,
    };
    let created = raw
        .creation_time
        .to_datetime()
        .ok_or_else(|| invalid(TimestampField::Created))?;
    let modified = raw
        .last_write_time
        .to_datetime()
        .ok_or_else(|| invalid(TimestampField::Modified))?;
    let accessed = raw
        .last_access_time
        .to_datetime()
        .ok_or_else(|| invalid(TimestampField::Accessed))?;

    let size_bytes = (u64::from(raw.file_size_high) << 32) | u64::from(raw.file_size_low);

    Ok(DecodedRecord {
        name: CompactString::new(&raw.name),
        attributes: raw.attributes,
        created: Some(created),
        modified: Some(modified),
        accessed: Some(accessed),
        size_bytes: Some(size_bytes),
        reparse_tag: raw.reparse_tag,
    })
}
