//! Binary payload encoding for one array.
//!
//! ```text
//! kind          u32 len + utf8
//! element type  u8   (0 = real f64, 1 = complex f64 pair)
//! dim count     u32
//! per dim:      name (u32 len + utf8), coord tag u8 (0 float, 1 int, 2 text),
//!               count u64, values
//! cell count    u64
//! cells         little-endian f64 (complex: re, im)
//! ```

use num_complex::Complex64;

use super::{Coords, DataArray, RawArray, Values};
use crate::error::{ModelError, Result};

const ELEMENT_REAL: u8 = 0;
const ELEMENT_COMPLEX: u8 = 1;

const COORD_FLOAT: u8 = 0;
const COORD_INT: u8 = 1;
const COORD_TEXT: u8 = 2;

/// Encode an array into its binary payload.
pub fn encode(array: &DataArray) -> Vec<u8> {
    let cell_size = match array.values() {
        Values::Real(_) => 8,
        Values::Complex(_) => 16,
    };
    let mut out = Vec::with_capacity(64 + array.len() * cell_size);
    put_str(&mut out, array.kind());
    out.push(match array.values() {
        Values::Real(_) => ELEMENT_REAL,
        Values::Complex(_) => ELEMENT_COMPLEX,
    });
    put_u32(&mut out, len_u32(array.dims().len()));
    for (name, coords) in array.dims().iter().zip(array.coords()) {
        put_str(&mut out, name);
        match coords {
            Coords::Float(values) => {
                out.push(COORD_FLOAT);
                put_u64(&mut out, values.len() as u64);
                for value in values {
                    out.extend_from_slice(&value.to_le_bytes());
                }
            }
            Coords::Int(values) => {
                out.push(COORD_INT);
                put_u64(&mut out, values.len() as u64);
                for value in values {
                    out.extend_from_slice(&value.to_le_bytes());
                }
            }
            Coords::Text(values) => {
                out.push(COORD_TEXT);
                put_u64(&mut out, values.len() as u64);
                for value in values {
                    put_str(&mut out, value);
                }
            }
        }
    }
    put_u64(&mut out, array.len() as u64);
    match array.values() {
        Values::Real(cells) => {
            for cell in cells {
                out.extend_from_slice(&cell.to_le_bytes());
            }
        }
        Values::Complex(cells) => {
            for cell in cells {
                out.extend_from_slice(&cell.re.to_le_bytes());
                out.extend_from_slice(&cell.im.to_le_bytes());
            }
        }
    }
    out
}

/// Decode a binary payload into its raw parts.
pub fn decode(bytes: &[u8]) -> Result<RawArray> {
    let mut reader = Reader { bytes, pos: 0 };
    let kind = reader.string()?;
    let element = reader.u8()?;
    let dim_count = reader.u32()? as usize;
    let mut dims = Vec::new();
    let mut coords = Vec::new();
    for _ in 0..dim_count {
        dims.push(reader.string()?);
        let tag = reader.u8()?;
        let count = reader.count(if tag == COORD_TEXT { 4 } else { 8 })?;
        coords.push(match tag {
            COORD_FLOAT => Coords::Float((0..count).map(|_| reader.f64()).collect::<Result<_>>()?),
            COORD_INT => Coords::Int((0..count).map(|_| reader.i64()).collect::<Result<_>>()?),
            COORD_TEXT => Coords::Text((0..count).map(|_| reader.string()).collect::<Result<_>>()?),
            other => return Err(ModelError::payload(format!("unknown coordinate tag {other}"))),
        });
    }
    let values = match element {
        ELEMENT_REAL => {
            let count = reader.count(8)?;
            Values::Real((0..count).map(|_| reader.f64()).collect::<Result<_>>()?)
        }
        ELEMENT_COMPLEX => {
            let count = reader.count(16)?;
            Values::Complex(
                (0..count)
                    .map(|_| -> Result<Complex64> {
                        Ok(Complex64::new(reader.f64()?, reader.f64()?))
                    })
                    .collect::<Result<_>>()?,
            )
        }
        other => return Err(ModelError::payload(format!("unknown element type {other}"))),
    };
    if reader.pos != bytes.len() {
        return Err(ModelError::payload(format!(
            "{} trailing bytes",
            bytes.len() - reader.pos
        )));
    }
    Ok(RawArray {
        kind,
        dims,
        coords,
        values,
    })
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_str(out: &mut Vec<u8>, value: &str) {
    put_u32(out, len_u32(value.len()));
    out.extend_from_slice(value.as_bytes());
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| ModelError::payload(format!("truncated at byte {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.fixed::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        self.fixed().map(u32::from_le_bytes)
    }

    fn u64(&mut self) -> Result<u64> {
        self.fixed().map(u64::from_le_bytes)
    }

    fn i64(&mut self) -> Result<i64> {
        self.fixed().map(i64::from_le_bytes)
    }

    fn f64(&mut self) -> Result<f64> {
        self.fixed().map(f64::from_le_bytes)
    }

    /// Element count, rejected if the remaining bytes cannot hold it.
    fn count(&mut self, min_element_size: usize) -> Result<usize> {
        let count = usize::try_from(self.u64()?)
            .map_err(|_| ModelError::payload("element count overflows usize"))?;
        let remaining = self.bytes.len() - self.pos;
        if count.saturating_mul(min_element_size) > remaining {
            return Err(ModelError::payload(format!(
                "element count {count} exceeds remaining {remaining} bytes"
            )));
        }
        Ok(count)
    }

    fn string(&mut self) -> Result<String> {
        let len = self.u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| ModelError::payload("string is not valid UTF-8"))
    }
}
