// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::riff::{ChunkId, RiffError, RiffFile};

pub mod format;
pub mod instrument;
pub mod sample;

pub use format::{Compression, FormatChunk};
pub use instrument::InstrumentChunk;
pub use sample::{SampleChunk, SampleLoop};

/// The form type of a wave container.
pub const WAVE_FORM_TYPE: ChunkId = ChunkId::new(*b"WAVE");
/// The mandatory format chunk tag.
pub const FORMAT_ID: ChunkId = ChunkId::new(*b"fmt ");
/// The mandatory data chunk tag.
pub const DATA_ID: ChunkId = ChunkId::new(*b"data");
/// The optional sampler metadata chunk tag.
pub const SAMPLE_ID: ChunkId = ChunkId::new(*b"smpl");
/// The optional instrument metadata chunk tag.
pub const INSTRUMENT_ID: ChunkId = ChunkId::new(*b"inst");

/// Errors produced while interpreting a wave container.
#[derive(Debug, thiserror::Error)]
pub enum WavError {
    /// The underlying container could not be parsed.
    #[error(transparent)]
    Container(#[from] RiffError),
    /// A mandatory chunk is absent.
    #[error("Mandatory chunk \"{0}\" is missing")]
    MissingChunk(ChunkId),
    /// A chunk is present but its payload does not decode.
    #[error("Malformed \"{id}\" chunk: {reason}")]
    MalformedChunk { id: ChunkId, reason: String },
    /// The compression code is not one this crate handles.
    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A wave file with its known chunks decoded. The format and data chunks are
/// mandatory, sampler and instrument metadata are optional.
pub struct WaveFile {
    riff: RiffFile,
    format: FormatChunk,
    data_len: usize,
    sample: Option<SampleChunk>,
    instrument: Option<InstrumentChunk>,
}

impl WaveFile {
    /// Opens and parses the wave file at the given path.
    pub fn open(path: &Path) -> Result<WaveFile, WavError> {
        let mut reader = BufReader::new(File::open(path)?);
        WaveFile::read(&mut reader)
    }

    /// Parses a wave file from the given byte source.
    pub fn read(reader: &mut impl Read) -> Result<WaveFile, WavError> {
        WaveFile::from_riff(RiffFile::read(reader)?)
    }

    /// Interprets an already parsed container as a wave file.
    pub fn from_riff(riff: RiffFile) -> Result<WaveFile, WavError> {
        if riff.form_type() != WAVE_FORM_TYPE {
            return Err(RiffError::MalformedContainer {
                reason: format!("expected WAVE form type, found \"{}\"", riff.form_type()),
            }
            .into());
        }

        let format = match riff.chunk(FORMAT_ID) {
            Some(chunk) => FormatChunk::decode(chunk.data())?,
            None => return Err(WavError::MissingChunk(FORMAT_ID)),
        };
        let data_len = match riff.chunk(DATA_ID) {
            Some(chunk) => chunk.len(),
            None => return Err(WavError::MissingChunk(DATA_ID)),
        };
        let sample = match riff.chunk(SAMPLE_ID) {
            Some(chunk) => Some(SampleChunk::decode(chunk.data())?),
            None => None,
        };
        let instrument = match riff.chunk(INSTRUMENT_ID) {
            Some(chunk) => Some(InstrumentChunk::decode(chunk.data())?),
            None => None,
        };

        Ok(WaveFile {
            riff,
            format,
            data_len,
            sample,
            instrument,
        })
    }

    /// Gets the underlying container.
    pub fn riff(&self) -> &RiffFile {
        &self.riff
    }

    /// Gets the decoded format chunk.
    pub fn format(&self) -> &FormatChunk {
        &self.format
    }

    /// Gets the length of the data chunk payload in bytes.
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Gets the decoded sampler metadata, if present.
    pub fn sample(&self) -> Option<&SampleChunk> {
        self.sample.as_ref()
    }

    /// Gets the decoded instrument metadata, if present.
    pub fn instrument(&self) -> Option<&InstrumentChunk> {
        self.instrument.as_ref()
    }

    /// The number of sample frames in the data chunk.
    pub fn frames(&self) -> u64 {
        (self.data_len / self.format.frame_size()) as u64
    }
}

// Little endian field accessors for chunk payloads. Callers are responsible
// for checking the payload length first.
pub(crate) fn u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

pub(crate) fn u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
