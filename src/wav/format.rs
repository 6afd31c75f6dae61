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
use std::fmt;

use super::{u16_le, u32_le, WavError, FORMAT_ID};

/// Format tag for uncompressed integer PCM.
pub const FORMAT_TAG_PCM: u16 = 0x0001;
/// Format tag for IEEE float samples.
pub const FORMAT_TAG_IEEE_FLOAT: u16 = 0x0003;
/// Format tag for the extensible format, where the real codec lives in a
/// sub format GUID.
pub const FORMAT_TAG_EXTENSIBLE: u16 = 0xFFFE;

/// The compression kinds this crate accepts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Compression {
    /// Uncompressed integer PCM.
    Pcm,
    /// IEEE float samples.
    IeeeFloat,
    /// Extensible PCM, accepted for mono and stereo files only.
    Extensible,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Pcm => write!(f, "PCM"),
            Compression::IeeeFloat => write!(f, "IEEE float"),
            Compression::Extensible => write!(f, "extensible"),
        }
    }
}

/// The decoded format chunk. Field order matches the stored layout: format
/// tag (u16), channels (u16), sample rate (u32), bytes per second (u32),
/// block align (u16), bits per sample (u16). Extensible files carry a
/// further extension block which this decoder skips.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FormatChunk {
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    bytes_per_second: u32,
    block_align: u16,
    bits_per_sample: u16,
}

impl FormatChunk {
    /// Creates a PCM format chunk, deriving the block align and byte rate.
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> FormatChunk {
        let block_align = channels * (bits_per_sample / 8);
        FormatChunk {
            format_tag: FORMAT_TAG_PCM,
            channels,
            sample_rate,
            bytes_per_second: sample_rate * block_align as u32,
            block_align,
            bits_per_sample,
        }
    }

    /// Decodes a format chunk payload.
    pub fn decode(data: &[u8]) -> Result<FormatChunk, WavError> {
        if data.len() < 16 {
            return Err(WavError::MalformedChunk {
                id: FORMAT_ID,
                reason: format!("payload of {} bytes cannot hold the format fields", data.len()),
            });
        }

        let chunk = FormatChunk {
            format_tag: u16_le(data, 0),
            channels: u16_le(data, 2),
            sample_rate: u32_le(data, 4),
            bytes_per_second: u32_le(data, 8),
            block_align: u16_le(data, 12),
            bits_per_sample: u16_le(data, 14),
        };

        if chunk.channels == 0 {
            return Err(WavError::MalformedChunk {
                id: FORMAT_ID,
                reason: "channel count is zero".to_string(),
            });
        }
        if chunk.bits_per_sample < 8 {
            return Err(WavError::MalformedChunk {
                id: FORMAT_ID,
                reason: format!(
                    "{} bits per sample implies an empty frame",
                    chunk.bits_per_sample
                ),
            });
        }

        Ok(chunk)
    }

    /// Encodes the base format fields.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(16);
        out.extend_from_slice(&self.format_tag.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.bytes_per_second.to_le_bytes());
        out.extend_from_slice(&self.block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        out
    }

    /// Interprets the format tag, rejecting anything this crate cannot
    /// handle. Extensible files are only accepted up to two channels.
    pub fn compression(&self) -> Result<Compression, WavError> {
        match self.format_tag {
            FORMAT_TAG_PCM => Ok(Compression::Pcm),
            FORMAT_TAG_IEEE_FLOAT => Ok(Compression::IeeeFloat),
            FORMAT_TAG_EXTENSIBLE => {
                if self.channels <= 2 {
                    Ok(Compression::Extensible)
                } else {
                    Err(WavError::UnsupportedCompression(format!(
                        "extensible format with {} channels",
                        self.channels
                    )))
                }
            }
            other => Err(WavError::UnsupportedCompression(format!(
                "format tag {:#06x}",
                other
            ))),
        }
    }

    /// Gets the channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Gets the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Gets the average byte rate.
    pub fn bytes_per_second(&self) -> u32 {
        self.bytes_per_second
    }

    /// Gets the block alignment.
    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    /// Gets the bits per sample.
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// The size of one frame in bytes across all channels. Nonzero for any
    /// chunk that passed decode.
    pub fn frame_size(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize / 8)
    }
}

impl fmt::Display for FormatChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.compression() {
            Ok(compression) => write!(f, "{}", compression)?,
            Err(_) => write!(f, "format tag {:#06x}", self.format_tag)?,
        }
        write!(
            f,
            ", {} channel(s), {} Hz, {}-bit",
            self.channels, self.sample_rate, self.bits_per_sample
        )
    }
}
