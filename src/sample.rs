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
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::wav::{Compression, WavError, WaveFile};

/// The default unity note when neither the file metadata nor the file name
/// provides one. Middle C.
const DEFAULT_UNITY_NOTE: u8 = 60;

/// The semantic audio format of a sample file.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FormatInfo {
    compression: Compression,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl FormatInfo {
    /// Creates a format description.
    pub fn new(
        compression: Compression,
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
    ) -> FormatInfo {
        FormatInfo {
            compression,
            channels,
            sample_rate,
            bits_per_sample,
        }
    }

    /// Gets the compression kind.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Gets the channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Gets the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Gets the bits per sample.
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Returns true if this is a single channel file.
    pub fn is_mono(&self) -> bool {
        self.channels == 1
    }
}

impl fmt::Display for FormatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} channel(s), {} Hz, {}-bit",
            self.compression, self.channels, self.sample_rate, self.bits_per_sample
        )
    }
}

/// The pitch metadata of a sample file. Computed once at extraction time
/// and immutable afterwards.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PitchInfo {
    unity_note: u8,
    cents: i32,
    loop_range: Option<(u32, u32)>,
}

impl PitchInfo {
    /// Creates pitch metadata.
    pub fn new(unity_note: u8, cents: i32, loop_range: Option<(u32, u32)>) -> PitchInfo {
        PitchInfo {
            unity_note,
            cents,
            loop_range,
        }
    }

    /// Gets the MIDI note the sample plays at its recorded pitch.
    pub fn unity_note(&self) -> u8 {
        self.unity_note
    }

    /// Gets the sub semitone tuning in cents.
    pub fn cents(&self) -> i32 {
        self.cents
    }

    /// Gets the loop start and end frames, if the file declares a loop.
    pub fn loop_range(&self) -> Option<(u32, u32)> {
        self.loop_range
    }
}

/// One analyzed sample file: its format, its pitch metadata, and its length
/// in frames.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SampleFile {
    path: PathBuf,
    name: String,
    format: FormatInfo,
    pitch: PitchInfo,
    frames: u64,
}

impl SampleFile {
    /// Creates a sample file description. The name is the file stem.
    pub fn new(path: PathBuf, format: FormatInfo, pitch: PitchInfo, frames: u64) -> SampleFile {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        SampleFile {
            path,
            name,
            format,
            pitch,
            frames,
        }
    }

    /// Opens and analyzes the wave file at the given path.
    pub fn analyze(path: &Path) -> Result<SampleFile, WavError> {
        let wave = WaveFile::open(path)?;
        SampleFile::from_wave(path, &wave)
    }

    /// Analyzes an already parsed wave file.
    pub fn from_wave(path: &Path, wave: &WaveFile) -> Result<SampleFile, WavError> {
        let format = wave.format();
        let info = FormatInfo {
            compression: format.compression()?,
            channels: format.channels(),
            sample_rate: format.sample_rate(),
            bits_per_sample: format.bits_per_sample(),
        };

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let pitch = derive_pitch(&name, wave);

        Ok(SampleFile {
            path: path.to_path_buf(),
            name,
            format: info,
            pitch,
            frames: wave.frames(),
        })
    }

    /// Gets the path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the format description.
    pub fn format(&self) -> &FormatInfo {
        &self.format
    }

    /// Gets the pitch metadata.
    pub fn pitch(&self) -> &PitchInfo {
        &self.pitch
    }

    /// Gets the length in frames.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Derives pitch metadata from the file chunks, falling back to the file
/// name and finally to middle C. The instrument chunk's fine tune overrides
/// the sampler chunk's pitch fraction when it is nonzero.
fn derive_pitch(name: &str, wave: &WaveFile) -> PitchInfo {
    let mut unity_note: Option<u8> = None;
    let mut cents: i32 = 0;
    let mut loop_range: Option<(u32, u32)> = None;

    if let Some(sample) = wave.sample() {
        if sample.unity_note() <= 127 {
            unity_note = Some(sample.unity_note() as u8);
            cents = sample.pitch_fraction_cents();
        } else {
            warn!(
                file = name,
                unity_note = sample.unity_note(),
                "Ignoring out of range unity note"
            );
        }
        if let Some(sample_loop) = sample.loops().first() {
            loop_range = Some((sample_loop.start(), sample_loop.end()));
        }
    }

    if let Some(instrument) = wave.instrument() {
        if unity_note.is_none() && instrument.unshifted_note() <= 127 {
            unity_note = Some(instrument.unshifted_note());
        }
        if instrument.fine_tune() != 0 {
            cents = instrument.fine_tune() as i32;
        }
    }

    let unity_note = unity_note
        .or_else(|| note_from_name(name))
        .unwrap_or_else(|| {
            warn!(file = name, "No unity note found, defaulting to middle C");
            DEFAULT_UNITY_NOTE
        });

    PitchInfo {
        unity_note,
        cents,
        loop_range,
    }
}

/// Finds the rightmost note name in a file stem, e.g. C3, F#4, Eb2 or A-1,
/// and converts it to a MIDI note with C-1 as note zero. The note letter
/// must sit on a word boundary, where a case change like the C in C2toC3
/// also counts as one.
pub(crate) fn note_from_name(name: &str) -> Option<u8> {
    let bytes = name.as_bytes();
    let mut result = None;

    let mut i = 0;
    while i < bytes.len() {
        let boundary = i == 0
            || !bytes[i - 1].is_ascii_alphanumeric()
            || (bytes[i - 1].is_ascii_lowercase() && bytes[i].is_ascii_uppercase());
        if boundary {
            if let Some((note, len)) = parse_note_at(name, i) {
                result = Some(note);
                i += len;
                continue;
            }
        }
        i += 1;
    }

    result
}

/// The length of a note name ending the stem, e.g. the C4 in Piano_C4, if
/// one is present.
pub(crate) fn trailing_note_len(name: &str) -> Option<usize> {
    let bytes = name.as_bytes();

    for i in 0..bytes.len() {
        let boundary = i == 0
            || !bytes[i - 1].is_ascii_alphanumeric()
            || (bytes[i - 1].is_ascii_lowercase() && bytes[i].is_ascii_uppercase());
        if !boundary {
            continue;
        }
        if let Some((_, len)) = parse_note_at(name, i) {
            if i + len == name.len() {
                return Some(len);
            }
        }
    }

    None
}

fn parse_note_at(name: &str, start: usize) -> Option<(u8, usize)> {
    let bytes = name.as_bytes();
    let mut semitone: i32 = match bytes.get(start)?.to_ascii_uppercase() {
        b'C' => 0,
        b'D' => 2,
        b'E' => 4,
        b'F' => 5,
        b'G' => 7,
        b'A' => 9,
        b'B' => 11,
        _ => return None,
    };

    let mut pos = start + 1;
    match bytes.get(pos) {
        Some(b'#') => {
            semitone += 1;
            pos += 1;
        }
        Some(b'b') => {
            semitone -= 1;
            pos += 1;
        }
        _ => {}
    }

    let negative = bytes.get(pos) == Some(&b'-');
    if negative {
        pos += 1;
    }
    let digits = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == digits {
        return None;
    }

    let octave: i32 = name[digits..pos].parse().ok()?;
    let octave = if negative { -octave } else { octave };
    let note = (octave + 1) * 12 + semitone;
    if (0..=127).contains(&note) {
        Some((note as u8, pos - start))
    } else {
        None
    }
}
