//! Binary records for N-dimensional numeric arrays.
//!
//! A record stores an array's element layout, shape and raw row-major
//! payload, in this order (little-endian):
//!
//! ```text
//! elem_size  : u64   bytes per element (all channels)
//! elem_size1 : u64   bytes per channel value
//! channels   : i32
//! depth      : i32   element depth tag, see [`Depth`]
//! type       : i32   depth + ((channels - 1) << 3)
//! dims       : i32   number of dimensions D
//! sizes      : D × i32
//! data       : product(sizes) × elem_size bytes
//! ```
//!
//! Writing then reading a record reproduces the shape, element type and
//! payload byte for byte.

use std::io::{self, Read, Write};
use thiserror::Error;

/// Errors raised while building, writing or reading a [`MatNd`].
#[derive(Error, Debug)]
pub enum MatNdError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unknown element depth tag {0}")]
    UnknownDepth(i32),

    #[error("payload has {actual} bytes, shape requires {expected}")]
    PayloadSize { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, MatNdError>;

const MAX_CHANNELS: i32 = 512;

/// Element depth tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Depth {
    U8 = 0,
    I8 = 1,
    U16 = 2,
    I16 = 3,
    I32 = 4,
    F32 = 5,
    F64 = 6,
}

impl Depth {
    /// Bytes per channel value.
    pub fn size(self) -> usize {
        match self {
            Depth::U8 | Depth::I8 => 1,
            Depth::U16 | Depth::I16 => 2,
            Depth::I32 | Depth::F32 => 4,
            Depth::F64 => 8,
        }
    }

    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn from_tag(tag: i32) -> Result<Self> {
        Ok(match tag {
            0 => Depth::U8,
            1 => Depth::I8,
            2 => Depth::U16,
            3 => Depth::I16,
            4 => Depth::I32,
            5 => Depth::F32,
            6 => Depth::F64,
            other => return Err(MatNdError::UnknownDepth(other)),
        })
    }
}

/// A dense N-dimensional array of fixed-size elements.
#[derive(Debug, Clone, PartialEq)]
pub struct MatNd {
    depth: Depth,
    channels: usize,
    sizes: Vec<usize>,
    data: Vec<u8>,
}

impl MatNd {
    /// Creates a zero-filled array.
    pub fn zeros(sizes: &[usize], depth: Depth, channels: usize) -> Result<Self> {
        validate_channels(channels)?;
        let len = element_count(sizes)? * depth.size() * channels;
        Ok(Self {
            depth,
            channels,
            sizes: sizes.to_vec(),
            data: vec![0; len],
        })
    }

    /// Wraps an existing row-major payload.
    pub fn from_bytes(sizes: &[usize], depth: Depth, channels: usize, data: Vec<u8>) -> Result<Self> {
        validate_channels(channels)?;
        let expected = element_count(sizes)? * depth.size() * channels;
        if data.len() != expected {
            return Err(MatNdError::PayloadSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            depth,
            channels,
            sizes: sizes.to_vec(),
            data,
        })
    }

    /// Single-channel `F64` array from row-major values.
    pub fn from_f64(sizes: &[usize], values: &[f64]) -> Result<Self> {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::from_bytes(sizes, Depth::F64, 1, data)
    }

    /// Reinterprets a single-channel `F64` payload as values.
    pub fn to_f64(&self) -> Result<Vec<f64>> {
        if self.depth != Depth::F64 || self.channels != 1 {
            return Err(MatNdError::InvalidHeader(format!(
                "expected 1-channel F64, found {}-channel {:?}",
                self.channels, self.depth
            )));
        }
        Ok(self
            .data
            .chunks_exact(8)
            .map(|c| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(c);
                f64::from_le_bytes(buf)
            })
            .collect())
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn dims(&self) -> usize {
        self.sizes.len()
    }

    /// Bytes per channel value.
    pub fn elem_size1(&self) -> usize {
        self.depth.size()
    }

    /// Bytes per element, all channels included.
    pub fn elem_size(&self) -> usize {
        self.depth.size() * self.channels
    }

    /// Combined depth/channel type tag.
    pub fn type_tag(&self) -> i32 {
        // channels is bounded by MAX_CHANNELS at construction
        self.depth.tag() + (((self.channels as i32) - 1) << 3)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Writes the record to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&(self.elem_size() as u64).to_le_bytes())?;
        writer.write_all(&(self.elem_size1() as u64).to_le_bytes())?;
        writer.write_all(&(self.channels as i32).to_le_bytes())?;
        writer.write_all(&self.depth.tag().to_le_bytes())?;
        writer.write_all(&self.type_tag().to_le_bytes())?;
        writer.write_all(&to_i32(self.sizes.len(), "dims")?.to_le_bytes())?;
        for &size in &self.sizes {
            writer.write_all(&to_i32(size, "dimension size")?.to_le_bytes())?;
        }
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Reads one record from `reader`, checking header consistency.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let elem_size = read_u64(reader)?;
        let elem_size1 = read_u64(reader)?;
        let channels = read_i32(reader)?;
        let depth = Depth::from_tag(read_i32(reader)?)?;
        let type_tag = read_i32(reader)?;
        let dims = read_i32(reader)?;

        validate_channels_tag(channels)?;
        let channels = channels as usize;
        if elem_size1 != depth.size() as u64 {
            return Err(MatNdError::InvalidHeader(format!(
                "elem_size1 {elem_size1} does not match depth {depth:?}"
            )));
        }
        if elem_size != elem_size1 * channels as u64 {
            return Err(MatNdError::InvalidHeader(format!(
                "elem_size {elem_size} != {elem_size1} x {channels} channels"
            )));
        }
        if dims < 0 {
            return Err(MatNdError::InvalidHeader(format!("negative dims {dims}")));
        }

        let expected_tag = depth.tag() + (((channels as i32) - 1) << 3);
        if expected_tag != type_tag {
            return Err(MatNdError::InvalidHeader(format!(
                "type tag {type_tag} does not match depth {depth:?} with {channels} channels"
            )));
        }

        let mut sizes = Vec::new();
        for _ in 0..dims {
            let size = read_i32(reader)?;
            if size < 0 {
                return Err(MatNdError::InvalidHeader(format!(
                    "negative dimension size {size}"
                )));
            }
            sizes.push(size as usize);
        }

        let len = element_count(&sizes)?
            .checked_mul(elem_size as usize)
            .ok_or_else(|| MatNdError::InvalidHeader("payload size overflows".into()))?;
        // the buffer grows with the bytes actually present, not the header
        let mut data = Vec::new();
        reader.take(len as u64).read_to_end(&mut data)?;
        if data.len() < len {
            return Err(MatNdError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("payload truncated: {} of {len} bytes", data.len()),
            )));
        }

        Ok(Self {
            depth,
            channels,
            sizes,
            data,
        })
    }
}

fn validate_channels(channels: usize) -> Result<()> {
    if channels == 0 || channels > MAX_CHANNELS as usize {
        return Err(MatNdError::InvalidHeader(format!(
            "channel count {channels} outside 1..={MAX_CHANNELS}"
        )));
    }
    Ok(())
}

fn validate_channels_tag(channels: i32) -> Result<()> {
    if !(1..=MAX_CHANNELS).contains(&channels) {
        return Err(MatNdError::InvalidHeader(format!(
            "channel count {channels} outside 1..={MAX_CHANNELS}"
        )));
    }
    Ok(())
}

fn element_count(sizes: &[usize]) -> Result<usize> {
    sizes.iter().try_fold(1usize, |acc, &s| {
        acc.checked_mul(s)
            .ok_or_else(|| MatNdError::InvalidHeader("element count overflows".into()))
    })
}

fn to_i32(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| MatNdError::InvalidHeader(format!("{what} {value} exceeds i32")))
}

fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}
