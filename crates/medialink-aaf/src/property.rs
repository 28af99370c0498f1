//! Decoding of AAF `properties` streams and strong-reference indexes.
//!
//! A properties stream is a byte-order marker, a version byte, an entry
//! count, one `(pid, stored form, size)` header per entry and then the
//! entry payloads back to back. Only little-endian streams are read.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{AafError, AafResult};
use crate::pid;

/// Byte-order marker of little-endian property streams (`'L'`).
pub const LITTLE_ENDIAN_MARKER: u8 = 0x4C;

/// Size of a stored mob id (SMPTE UMID).
pub const MOB_ID_LEN: usize = 32;

/// Size of a stored AUID.
pub const AUID_LEN: usize = 16;

/// One decoded property entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub pid: u16,
    pub form: u16,
    pub data: Vec<u8>,
}

/// All properties of one stored object, in stream order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    entries: Vec<Property>,
}

impl PropertySet {
    /// Parses a whole properties stream.
    pub fn parse(bytes: &[u8]) -> AafResult<Self> {
        if bytes.len() < 4 {
            return Err(AafError::Truncated {
                what: "property header",
            });
        }
        if bytes[0] != LITTLE_ENDIAN_MARKER {
            return Err(AafError::ByteOrder(bytes[0]));
        }
        let count = LittleEndian::read_u16(&bytes[2..4]) as usize;

        let headers_end = 4 + count * 6;
        if bytes.len() < headers_end {
            return Err(AafError::Truncated {
                what: "property headers",
            });
        }

        let mut entries = Vec::with_capacity(count);
        let mut offset = headers_end;
        for header in bytes[4..headers_end].chunks_exact(6) {
            let pid = LittleEndian::read_u16(&header[0..2]);
            let form = LittleEndian::read_u16(&header[2..4]);
            let size = LittleEndian::read_u16(&header[4..6]) as usize;
            let data = bytes
                .get(offset..offset + size)
                .ok_or(AafError::Truncated {
                    what: "property data",
                })?
                .to_vec();
            offset += size;
            entries.push(Property { pid, form, data });
        }
        Ok(Self { entries })
    }

    /// Serializes the set back into a little-endian properties stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![LITTLE_ENDIAN_MARKER, 0x20, 0, 0];
        LittleEndian::write_u16(&mut out[2..4], self.entries.len() as u16);
        for entry in &self.entries {
            let mut header = [0u8; 6];
            LittleEndian::write_u16(&mut header[0..2], entry.pid);
            LittleEndian::write_u16(&mut header[2..4], entry.form);
            LittleEndian::write_u16(&mut header[4..6], entry.data.len() as u16);
            out.extend_from_slice(&header);
        }
        for entry in &self.entries {
            out.extend_from_slice(&entry.data);
        }
        out
    }

    /// Appends a property.
    pub fn push(&mut self, pid: u16, form: u16, data: Vec<u8>) {
        self.entries.push(Property { pid, form, data });
    }

    pub fn get(&self, pid: u16) -> Option<&Property> {
        self.entries.iter().find(|p| p.pid == pid)
    }

    pub fn has(&self, pid: u16) -> bool {
        self.get(pid).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// UTF-16LE string value, cut at the first NUL.
    pub fn string(&self, pid: u16) -> Option<String> {
        self.get(pid).map(|p| decode_utf16(&p.data))
    }

    /// Integer value of 1, 2, 4 or 8 bytes.
    pub fn int(&self, pid: u16) -> Option<i64> {
        let data = &self.get(pid)?.data;
        match data.len() {
            1 => Some(data[0] as i8 as i64),
            2 => Some(LittleEndian::read_i16(data) as i64),
            4 => Some(LittleEndian::read_i32(data) as i64),
            8 => Some(LittleEndian::read_i64(data)),
            _ => None,
        }
    }

    /// Rational value as a float; a zero denominator yields `None`.
    pub fn rational(&self, pid: u16) -> Option<f64> {
        let data = &self.get(pid)?.data;
        if data.len() < 8 {
            return None;
        }
        let num = LittleEndian::read_i32(&data[0..4]);
        let den = LittleEndian::read_i32(&data[4..8]);
        (den != 0).then(|| num as f64 / den as f64)
    }

    /// Mob id value; the all-zero id yields `None`.
    pub fn mob_id(&self, pid: u16) -> Option<String> {
        let data = self.get(pid)?.data.get(..MOB_ID_LEN)?;
        format_mob_id(data)
    }

    /// Key of a weak reference, rendered as an AUID.
    pub fn weak_ref_key(&self, pid: u16) -> Option<String> {
        let property = self.get(pid)?;
        if property.form != pid::SF_WEAK_OBJECT_REFERENCE {
            return None;
        }
        let data = &property.data;
        let key = data.get(data.len().checked_sub(AUID_LEN)?..)?;
        Some(format_auid(key))
    }

    /// Media kind named by a component's data definition.
    pub fn media_kind(&self) -> Option<&'static str> {
        self.weak_ref_key(pid::COMPONENT_DATA_DEFINITION)
            .and_then(|auid| media_kind_name(&auid))
    }
}

/// Decodes a UTF-16LE buffer up to the first NUL code unit.
pub fn decode_utf16(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(LittleEndian::read_u16)
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Encodes a NUL-terminated UTF-16LE buffer.
pub fn encode_utf16(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity((value.len() + 1) * 2);
    for unit in value.encode_utf16().chain(std::iter::once(0)) {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Renders a stored UMID as `urn:smpte:umid:` followed by eight dotted
/// hex groups.
pub fn format_mob_id(bytes: &[u8]) -> Option<String> {
    if bytes.len() != MOB_ID_LEN || bytes.iter().all(|&b| b == 0) {
        return None;
    }
    let groups: Vec<String> = bytes
        .chunks_exact(4)
        .map(|group| group.iter().map(|b| format!("{b:02x}")).collect())
        .collect();
    Some(format!("urn:smpte:umid:{}", groups.join(".")))
}

/// Renders a stored AUID (little-endian GUID layout).
pub fn format_auid(bytes: &[u8]) -> String {
    if bytes.len() != AUID_LEN {
        return String::new();
    }
    let tail: String = bytes[8..].iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{:08x}-{:04x}-{:04x}-{}-{}",
        LittleEndian::read_u32(&bytes[0..4]),
        LittleEndian::read_u16(&bytes[4..6]),
        LittleEndian::read_u16(&bytes[6..8]),
        &tail[..4],
        &tail[4..]
    )
}

const DATA_DEFINITIONS: &[(&str, &str)] = &[
    ("01030202-0200-0000-060e-2b3404010101", "Sound"),
    ("01030202-0100-0000-060e-2b3404010101", "Picture"),
    ("01030201-0100-0000-060e-2b3404010101", "Timecode"),
    ("01030201-1000-0000-060e-2b3404010101", "Edgecode"),
    ("01030202-0300-0000-060e-2b3404010101", "Data"),
    ("78e1ebe1-6cef-11d2-807d-006008143e6f", "LegacySound"),
    ("6f3c8ce1-6cef-11d2-807d-006008143e6f", "LegacyPicture"),
    ("7f275e81-77e5-11d2-807f-006008143e6f", "LegacyTimecode"),
];

/// Maps a well-known data definition AUID to its name.
pub fn media_kind_name(auid: &str) -> Option<&'static str> {
    DATA_DEFINITIONS
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(auid))
        .map(|(_, name)| *name)
}

/// Local keys listed by a strong-reference vector index stream.
pub fn vector_keys(index: &[u8]) -> AafResult<Vec<u32>> {
    let count = index_count(index)?;
    let body = &index[12..];
    if body.len() < count * 4 {
        return Err(AafError::Truncated {
            what: "vector index",
        });
    }
    Ok(body
        .chunks_exact(4)
        .take(count)
        .map(LittleEndian::read_u32)
        .collect())
}

/// Local keys listed by a strong-reference set index stream.
///
/// Set entries carry a reference count and an identification key after the
/// local key; only the local key is returned.
pub fn set_keys(index: &[u8]) -> AafResult<Vec<u32>> {
    let count = index_count(index)?;
    if index.len() < 15 {
        return Err(AafError::Truncated { what: "set index" });
    }
    let key_size = index[14] as usize;
    let stride = 8 + key_size;
    let body = &index[15..];
    if body.len() < count * stride {
        return Err(AafError::Truncated { what: "set index" });
    }
    Ok(body
        .chunks_exact(stride)
        .take(count)
        .map(|entry| LittleEndian::read_u32(&entry[0..4]))
        .collect())
}

fn index_count(index: &[u8]) -> AafResult<usize> {
    if index.len() < 12 {
        return Err(AafError::Truncated {
            what: "index header",
        });
    }
    Ok(LittleEndian::read_u32(&index[0..4]) as usize)
}
