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
use super::{WavError, INSTRUMENT_ID};

/// An instrument chunk payload is exactly seven bytes.
const CHUNK_LEN: usize = 7;

/// The decoded instrument chunk: the note the sample should be played back
/// at, a fine tune in cents, a gain in dB, and the note and velocity ranges
/// the sample is intended to cover.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InstrumentChunk {
    unshifted_note: u8,
    fine_tune: i8,
    gain: i8,
    low_note: u8,
    high_note: u8,
    low_velocity: u8,
    high_velocity: u8,
}

impl InstrumentChunk {
    /// Creates an instrument chunk.
    pub fn new(
        unshifted_note: u8,
        fine_tune: i8,
        gain: i8,
        low_note: u8,
        high_note: u8,
        low_velocity: u8,
        high_velocity: u8,
    ) -> InstrumentChunk {
        InstrumentChunk {
            unshifted_note,
            fine_tune,
            gain,
            low_note,
            high_note,
            low_velocity,
            high_velocity,
        }
    }

    /// Decodes an instrument chunk payload.
    pub fn decode(data: &[u8]) -> Result<InstrumentChunk, WavError> {
        if data.len() < CHUNK_LEN {
            return Err(WavError::MalformedChunk {
                id: INSTRUMENT_ID,
                reason: format!("payload of {} bytes is shorter than {}", data.len(), CHUNK_LEN),
            });
        }

        Ok(InstrumentChunk {
            unshifted_note: data[0],
            fine_tune: data[1] as i8,
            gain: data[2] as i8,
            low_note: data[3],
            high_note: data[4],
            low_velocity: data[5],
            high_velocity: data[6],
        })
    }

    /// Encodes the instrument chunk.
    pub fn encode(&self) -> Vec<u8> {
        vec![
            self.unshifted_note,
            self.fine_tune as u8,
            self.gain as u8,
            self.low_note,
            self.high_note,
            self.low_velocity,
            self.high_velocity,
        ]
    }

    /// Gets the note the sample plays back at without shifting.
    pub fn unshifted_note(&self) -> u8 {
        self.unshifted_note
    }

    /// Gets the fine tune in cents.
    pub fn fine_tune(&self) -> i8 {
        self.fine_tune
    }

    /// Gets the gain in dB.
    pub fn gain(&self) -> i8 {
        self.gain
    }

    /// Gets the low end of the intended note range.
    pub fn low_note(&self) -> u8 {
        self.low_note
    }

    /// Gets the high end of the intended note range.
    pub fn high_note(&self) -> u8 {
        self.high_note
    }

    /// Gets the low end of the intended velocity range.
    pub fn low_velocity(&self) -> u8 {
        self.low_velocity
    }

    /// Gets the high end of the intended velocity range.
    pub fn high_velocity(&self) -> u8 {
        self.high_velocity
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_trip() {
        let chunk = InstrumentChunk::new(60, -25, 3, 48, 72, 1, 127);
        let decoded = InstrumentChunk::decode(&chunk.encode()).expect("expected decode to succeed");
        assert_eq!(decoded, chunk);
        assert_eq!(decoded.unshifted_note(), 60);
        assert_eq!(decoded.fine_tune(), -25);
        assert_eq!(decoded.gain(), 3);
        assert_eq!(decoded.low_note(), 48);
        assert_eq!(decoded.high_note(), 72);
    }

    #[test]
    fn test_decode_short_payload() {
        match InstrumentChunk::decode(&[60, 0, 0]) {
            Err(WavError::MalformedChunk { id, .. }) => assert_eq!(id, INSTRUMENT_ID),
            other => panic!("expected malformed chunk, got {:?}", other.err()),
        }
    }
}
