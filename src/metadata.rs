//! Typed metadata values and the ordered sink that collects them.
//!
//! Every decoded field ends up as a `(key, TagValue)` pair in a
//! [`MetadataSink`]. Keys follow the `Exif.<Group>.<Name>` convention, for
//! example `Exif.Image.Model` or `Exif.MinoltaCs7D.ISO`.

use std::fmt;

use serde::Serialize;

// =============================================================================
// TagValue
// =============================================================================

/// A decoded metadata value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TagValue {
    Byte(Vec<u8>),
    SignedByte(Vec<i8>),
    /// Text up to the first NUL
    Ascii(String),
    UnsignedShort(Vec<u16>),
    SignedShort(Vec<i16>),
    UnsignedLong(Vec<u32>),
    SignedLong(Vec<i32>),
    /// (numerator, denominator) pairs
    UnsignedRational(Vec<(u32, u32)>),
    SignedRational(Vec<(i32, i32)>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    /// Opaque bytes
    Undefined(Vec<u8>),
    /// EXIF user comment with the character-set prefix removed
    Comment(String),
}

/// Expected representation of a known tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Ascii,
    UnsignedShort,
    SignedShort,
    UnsignedLong,
    UnsignedRational,
    SignedRational,
    Undefined,
    Comment,
}

impl ValueKind {
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Ascii => "ascii",
            ValueKind::UnsignedShort => "ushort",
            ValueKind::SignedShort => "sshort",
            ValueKind::UnsignedLong => "ulong",
            ValueKind::UnsignedRational => "urational",
            ValueKind::SignedRational => "srational",
            ValueKind::Undefined => "undefined",
            ValueKind::Comment => "comment",
        }
    }
}

/// 8-byte character set identifiers that prefix an EXIF UserComment.
const COMMENT_CHARSETS: [&[u8; 8]; 4] = [
    b"ASCII\0\0\0",
    b"UNICODE\0",
    b"JIS\0\0\0\0\0",
    b"\0\0\0\0\0\0\0\0",
];

impl TagValue {
    /// Short type name, used in diagnostics.
    pub const fn type_name(&self) -> &'static str {
        match self {
            TagValue::Byte(_) => "byte",
            TagValue::SignedByte(_) => "sbyte",
            TagValue::Ascii(_) => "ascii",
            TagValue::UnsignedShort(_) => "ushort",
            TagValue::SignedShort(_) => "sshort",
            TagValue::UnsignedLong(_) => "ulong",
            TagValue::SignedLong(_) => "slong",
            TagValue::UnsignedRational(_) => "urational",
            TagValue::SignedRational(_) => "srational",
            TagValue::Float(_) => "float",
            TagValue::Double(_) => "double",
            TagValue::Undefined(_) => "undefined",
            TagValue::Comment(_) => "comment",
        }
    }

    /// Number of components in the value. Strings count as one.
    pub fn count(&self) -> usize {
        match self {
            TagValue::Byte(v) | TagValue::Undefined(v) => v.len(),
            TagValue::SignedByte(v) => v.len(),
            TagValue::Ascii(_) | TagValue::Comment(_) => 1,
            TagValue::UnsignedShort(v) => v.len(),
            TagValue::SignedShort(v) => v.len(),
            TagValue::UnsignedLong(v) => v.len(),
            TagValue::SignedLong(v) => v.len(),
            TagValue::UnsignedRational(v) => v.len(),
            TagValue::SignedRational(v) => v.len(),
            TagValue::Float(v) => v.len(),
            TagValue::Double(v) => v.len(),
        }
    }

    /// First component as an unsigned integer, if it is one.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            TagValue::Byte(v) => v.first().map(|&x| x as u32),
            TagValue::UnsignedShort(v) => v.first().map(|&x| x as u32),
            TagValue::UnsignedLong(v) => v.first().copied(),
            _ => None,
        }
    }

    /// First component as a signed integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TagValue::SignedByte(v) => v.first().map(|&x| x as i64),
            TagValue::SignedShort(v) => v.first().map(|&x| x as i64),
            TagValue::SignedLong(v) => v.first().map(|&x| x as i64),
            _ => self.as_u32().map(i64::from),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Ascii(s) | TagValue::Comment(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to the expected kind of a known tag.
    ///
    /// Integers widen freely and narrow only when every component fits.
    /// Byte-like values become strings or blobs. Returns `None` when the
    /// stored value cannot represent the expected kind.
    pub fn coerce(self, kind: ValueKind) -> Option<TagValue> {
        match (kind, self) {
            (ValueKind::Ascii, v @ TagValue::Ascii(_)) => Some(v),
            (ValueKind::Ascii, TagValue::Byte(b) | TagValue::Undefined(b)) => {
                Some(TagValue::Ascii(text_until_nul(&b)))
            }

            (ValueKind::UnsignedShort, v @ TagValue::UnsignedShort(_)) => Some(v),
            (ValueKind::UnsignedShort, TagValue::Byte(b)) => {
                Some(TagValue::UnsignedShort(b.into_iter().map(u16::from).collect()))
            }
            (ValueKind::UnsignedShort, TagValue::UnsignedLong(l)) => l
                .into_iter()
                .map(|x| u16::try_from(x).ok())
                .collect::<Option<Vec<_>>>()
                .map(TagValue::UnsignedShort),

            (ValueKind::SignedShort, v @ TagValue::SignedShort(_)) => Some(v),
            (ValueKind::SignedShort, TagValue::UnsignedShort(s)) => s
                .into_iter()
                .map(|x| i16::try_from(x).ok())
                .collect::<Option<Vec<_>>>()
                .map(TagValue::SignedShort),
            (ValueKind::SignedShort, TagValue::SignedLong(l)) => l
                .into_iter()
                .map(|x| i16::try_from(x).ok())
                .collect::<Option<Vec<_>>>()
                .map(TagValue::SignedShort),

            (ValueKind::UnsignedLong, v @ TagValue::UnsignedLong(_)) => Some(v),
            (ValueKind::UnsignedLong, TagValue::UnsignedShort(s)) => {
                Some(TagValue::UnsignedLong(s.into_iter().map(u32::from).collect()))
            }
            (ValueKind::UnsignedLong, TagValue::Byte(b)) => {
                Some(TagValue::UnsignedLong(b.into_iter().map(u32::from).collect()))
            }

            (ValueKind::UnsignedRational, v @ TagValue::UnsignedRational(_)) => Some(v),
            (ValueKind::SignedRational, v @ TagValue::SignedRational(_)) => Some(v),
            (ValueKind::SignedRational, TagValue::UnsignedRational(r)) => r
                .into_iter()
                .map(|(n, d)| Some((i32::try_from(n).ok()?, i32::try_from(d).ok()?)))
                .collect::<Option<Vec<_>>>()
                .map(TagValue::SignedRational),

            (ValueKind::Undefined, v @ TagValue::Undefined(_)) => Some(v),
            (ValueKind::Undefined, TagValue::Byte(b)) => Some(TagValue::Undefined(b)),

            (ValueKind::Comment, v @ TagValue::Comment(_)) => Some(v),
            (ValueKind::Comment, TagValue::Undefined(b) | TagValue::Byte(b)) => {
                Some(TagValue::Comment(decode_comment(&b)))
            }
            (ValueKind::Comment, TagValue::Ascii(s)) => Some(TagValue::Comment(s)),

            _ => None,
        }
    }
}

/// Text up to the first NUL, invalid UTF-8 replaced.
pub fn text_until_nul(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Strip the character-set prefix of a UserComment and trim padding.
fn decode_comment(bytes: &[u8]) -> String {
    let body = match bytes.get(..8) {
        Some(prefix) if COMMENT_CHARSETS.iter().any(|c| &c[..] == prefix) => &bytes[8..],
        _ => bytes,
    };
    text_until_nul(body).trim_end().to_string()
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

fn write_rationals<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[(T, T)]) -> fmt::Result {
    for (i, (n, d)) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{n}/{d}")?;
    }
    Ok(())
}

/// Blobs longer than this are summarised in text output.
const MAX_DISPLAY_BYTES: usize = 32;

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Ascii(s) | TagValue::Comment(s) => f.write_str(s),
            TagValue::Byte(v) | TagValue::Undefined(v) if v.len() > MAX_DISPLAY_BYTES => {
                write!(f, "({} bytes)", v.len())
            }
            TagValue::Byte(v) | TagValue::Undefined(v) => write_list(f, v),
            TagValue::SignedByte(v) => write_list(f, v),
            TagValue::UnsignedShort(v) => write_list(f, v),
            TagValue::SignedShort(v) => write_list(f, v),
            TagValue::UnsignedLong(v) => write_list(f, v),
            TagValue::SignedLong(v) => write_list(f, v),
            TagValue::UnsignedRational(v) => write_rationals(f, v),
            TagValue::SignedRational(v) => write_rationals(f, v),
            TagValue::Float(v) => write_list(f, v),
            TagValue::Double(v) => write_list(f, v),
        }
    }
}

// =============================================================================
// MetadataSink
// =============================================================================

/// One decoded field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: TagValue,
}

/// Ordered collection of decoded fields.
///
/// Insertion order is preserved and duplicate keys are allowed: a tag that
/// appears in several directories is recorded each time it is seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetadataSink {
    entries: Vec<MetadataEntry>,
}

impl MetadataSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: TagValue) {
        self.entries.push(MetadataEntry {
            key: key.into(),
            value,
        });
    }

    /// First value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    /// Every value recorded under `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a TagValue> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.key == key)
            .map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a MetadataSink {
    type Item = &'a MetadataEntry;
    type IntoIter = std::slice::Iter<'a, MetadataEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
