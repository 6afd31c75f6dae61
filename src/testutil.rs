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

#[cfg(test)]
use std::{error::Error, fs, fs::File, path::Path};

#[cfg(test)]
use hound::{SampleFormat, WavSpec, WavWriter};

/// Writes a silent 16-bit PCM wave file.
#[cfg(test)]
pub fn write_test_wav(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    frames: u32,
) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    let mut writer = WavWriter::new(
        file,
        WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
    )?;

    for _ in 0..frames {
        for _ in 0..channels {
            writer.write_sample(0i16)?;
        }
    }
    writer.finalize()?;

    Ok(())
}

/// Appends a raw chunk to an existing wave file and patches the container
/// length, using plain byte writes rather than the crate's own writer.
#[cfg(test)]
pub fn append_chunk(path: &Path, id: [u8; 4], payload: &[u8]) -> Result<(), Box<dyn Error>> {
    let mut bytes = fs::read(path)?;

    bytes.extend_from_slice(&id);
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        bytes.push(0);
    }

    let total = (bytes.len() - 8) as u32;
    bytes[4..8].copy_from_slice(&total.to_le_bytes());
    fs::write(path, bytes)?;

    Ok(())
}

/// Builds a sampler chunk payload with the given unity note and pitch
/// fraction and no loops.
#[cfg(test)]
pub fn sample_chunk_payload(unity_note: u32, pitch_fraction: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 36];
    payload[12..16].copy_from_slice(&unity_note.to_le_bytes());
    payload[16..20].copy_from_slice(&pitch_fraction.to_le_bytes());
    payload
}

/// Writes a wave file that carries its unity note in a sampler chunk.
#[cfg(test)]
pub fn write_pitched_wav(path: &Path, channels: u16, unity_note: u8) -> Result<(), Box<dyn Error>> {
    write_test_wav(path, channels, 44100, 64)?;
    append_chunk(path, *b"smpl", &sample_chunk_payload(unity_note as u32, 0))
}
