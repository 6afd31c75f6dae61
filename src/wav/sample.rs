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
use super::{u32_le, WavError, SAMPLE_ID};

/// The fixed fields of a sampler chunk occupy 36 bytes, loop records follow.
const FIXED_LEN: usize = 36;
/// Each loop record occupies 24 bytes.
const LOOP_LEN: usize = 24;

/// A single loop record from the sampler chunk.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SampleLoop {
    cue_point_id: u32,
    loop_type: u32,
    start: u32,
    end: u32,
    fraction: u32,
    play_count: u32,
}

impl SampleLoop {
    /// Creates a forward loop over the given sample range.
    pub fn forward(start: u32, end: u32) -> SampleLoop {
        SampleLoop {
            cue_point_id: 0,
            loop_type: 0,
            start,
            end,
            fraction: 0,
            play_count: 0,
        }
    }

    /// Gets the loop type (0 is forward, 1 alternating, 2 backward).
    pub fn loop_type(&self) -> u32 {
        self.loop_type
    }

    /// Gets the first sample frame of the loop.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Gets the last sample frame of the loop.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Gets the play count, where zero means an indefinite loop.
    pub fn play_count(&self) -> u32 {
        self.play_count
    }

    fn decode(data: &[u8]) -> SampleLoop {
        SampleLoop {
            cue_point_id: u32_le(data, 0),
            loop_type: u32_le(data, 4),
            start: u32_le(data, 8),
            end: u32_le(data, 12),
            fraction: u32_le(data, 16),
            play_count: u32_le(data, 20),
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.cue_point_id.to_le_bytes());
        out.extend_from_slice(&self.loop_type.to_le_bytes());
        out.extend_from_slice(&self.start.to_le_bytes());
        out.extend_from_slice(&self.end.to_le_bytes());
        out.extend_from_slice(&self.fraction.to_le_bytes());
        out.extend_from_slice(&self.play_count.to_le_bytes());
    }
}

/// The decoded sampler chunk. The interesting fields for detection are the
/// unity note, the pitch fraction, and the loops. The pitch fraction is an
/// unsigned fixed point fraction of a semitone with a range of 2^32.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SampleChunk {
    manufacturer: u32,
    product: u32,
    sample_period: u32,
    unity_note: u32,
    pitch_fraction: u32,
    smpte_format: u32,
    smpte_offset: u32,
    sampler_data: u32,
    loops: Vec<SampleLoop>,
}

impl SampleChunk {
    /// Creates a sampler chunk carrying only pitch information.
    pub fn with_pitch(unity_note: u32, pitch_fraction: u32) -> SampleChunk {
        SampleChunk {
            manufacturer: 0,
            product: 0,
            sample_period: 0,
            unity_note,
            pitch_fraction,
            smpte_format: 0,
            smpte_offset: 0,
            sampler_data: 0,
            loops: Vec::new(),
        }
    }

    /// Creates a sampler chunk with pitch information and a forward loop.
    pub fn with_loop(unity_note: u32, pitch_fraction: u32, start: u32, end: u32) -> SampleChunk {
        let mut chunk = SampleChunk::with_pitch(unity_note, pitch_fraction);
        chunk.loops.push(SampleLoop::forward(start, end));
        chunk
    }

    /// Decodes a sampler chunk payload.
    pub fn decode(data: &[u8]) -> Result<SampleChunk, WavError> {
        if data.len() < FIXED_LEN {
            return Err(WavError::MalformedChunk {
                id: SAMPLE_ID,
                reason: format!(
                    "payload of {} bytes cannot hold the sampler fields",
                    data.len()
                ),
            });
        }

        let loop_count = u32_le(data, 28);
        if FIXED_LEN as u64 + loop_count as u64 * LOOP_LEN as u64 > data.len() as u64 {
            return Err(WavError::MalformedChunk {
                id: SAMPLE_ID,
                reason: format!(
                    "{} loops do not fit in a payload of {} bytes",
                    loop_count,
                    data.len()
                ),
            });
        }

        let mut loops = Vec::with_capacity(loop_count as usize);
        for i in 0..loop_count as usize {
            let offset = FIXED_LEN + i * LOOP_LEN;
            loops.push(SampleLoop::decode(&data[offset..offset + LOOP_LEN]));
        }

        Ok(SampleChunk {
            manufacturer: u32_le(data, 0),
            product: u32_le(data, 4),
            sample_period: u32_le(data, 8),
            unity_note: u32_le(data, 12),
            pitch_fraction: u32_le(data, 16),
            smpte_format: u32_le(data, 20),
            smpte_offset: u32_le(data, 24),
            sampler_data: u32_le(data, 32),
            loops,
        })
    }

    /// Encodes the sampler chunk.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FIXED_LEN + self.loops.len() * LOOP_LEN);
        out.extend_from_slice(&self.manufacturer.to_le_bytes());
        out.extend_from_slice(&self.product.to_le_bytes());
        out.extend_from_slice(&self.sample_period.to_le_bytes());
        out.extend_from_slice(&self.unity_note.to_le_bytes());
        out.extend_from_slice(&self.pitch_fraction.to_le_bytes());
        out.extend_from_slice(&self.smpte_format.to_le_bytes());
        out.extend_from_slice(&self.smpte_offset.to_le_bytes());
        out.extend_from_slice(&(self.loops.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.sampler_data.to_le_bytes());
        for sample_loop in self.loops.iter() {
            sample_loop.encode_into(&mut out);
        }
        out
    }

    /// Gets the raw unity note field.
    pub fn unity_note(&self) -> u32 {
        self.unity_note
    }

    /// Gets the raw pitch fraction field.
    pub fn pitch_fraction(&self) -> u32 {
        self.pitch_fraction
    }

    /// Converts the pitch fraction to cents. The stored range of 2^32 maps
    /// to one semitone, so half the range is exactly 50 cents.
    pub fn pitch_fraction_cents(&self) -> i32 {
        ((self.pitch_fraction as u64 * 100) >> 32) as i32
    }

    /// Gets the loop records.
    pub fn loops(&self) -> &[SampleLoop] {
        &self.loops
    }
}
