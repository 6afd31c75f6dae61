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

use crate::sample::SampleFile;

/// Errors found while validating a descriptor.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// The multisample name is empty.
    #[error("Multisample name is empty")]
    EmptyName,
    /// The descriptor holds no zones at all.
    #[error("Multisample contains no zones")]
    NoZones,
    /// A zone's note or velocity numbers are out of order or out of range.
    #[error("Zone \"{zone}\" has an invalid range: {reason}")]
    InvalidRange { zone: String, reason: String },
    /// A group's zones leave part of the key range uncovered.
    #[error("Group \"{group}\" leaves a gap in the key range at note {note}")]
    KeyRangeGap { group: String, note: u8 },
}

/// The sample content of a zone: either a single file, or two mono files
/// that act as the left and right channels of one stereo zone.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ZoneSample {
    /// A single file, mono or natively stereo.
    Single(SampleFile),
    /// Two paired mono files.
    MonoPair {
        left: SampleFile,
        right: SampleFile,
    },
}

impl ZoneSample {
    /// The channel count the zone plays with.
    pub fn channels(&self) -> u16 {
        match self {
            ZoneSample::Single(file) => file.format().channels(),
            ZoneSample::MonoPair { .. } => 2,
        }
    }

    /// The file that carries the zone's pitch metadata. For a mono pair the
    /// two files agree, so the left one is used.
    pub fn primary(&self) -> &SampleFile {
        match self {
            ZoneSample::Single(file) => file,
            ZoneSample::MonoPair { left, .. } => left,
        }
    }

    /// All files backing this zone.
    pub fn files(&self) -> Vec<&SampleFile> {
        match self {
            ZoneSample::Single(file) => vec![file],
            ZoneSample::MonoPair { left, right } => vec![left, right],
        }
    }
}

impl fmt::Display for ZoneSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneSample::Single(file) => write!(f, "{}", file.name()),
            ZoneSample::MonoPair { left, right } => {
                write!(f, "{} + {}", left.name(), right.name())
            }
        }
    }
}

/// One key and velocity region of the instrument. Ranges are inclusive.
/// Adjacent zones may overlap by exactly the stored crossfade width.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Zone {
    name: String,
    sample: ZoneSample,
    root_note: u8,
    low_note: u8,
    high_note: u8,
    /// The velocity range, or none when the zone covers all velocities.
    velocity: Option<[u8; 2]>,
    note_crossfade_low: u8,
    note_crossfade_high: u8,
    velocity_crossfade_low: u8,
    velocity_crossfade_high: u8,
}

impl Zone {
    /// Creates a zone covering the given note range with no velocity
    /// restriction and no crossfades.
    pub fn new(
        name: impl Into<String>,
        sample: ZoneSample,
        root_note: u8,
        low_note: u8,
        high_note: u8,
    ) -> Zone {
        Zone {
            name: name.into(),
            sample,
            root_note,
            low_note,
            high_note,
            velocity: None,
            note_crossfade_low: 0,
            note_crossfade_high: 0,
            velocity_crossfade_low: 0,
            velocity_crossfade_high: 0,
        }
    }

    /// Restricts the zone to a velocity range.
    pub fn with_velocity(mut self, low: u8, high: u8) -> Zone {
        self.velocity = Some([low, high]);
        self
    }

    /// Sets the crossfade widths at the low and high note edges.
    pub fn with_note_crossfade(mut self, low: u8, high: u8) -> Zone {
        self.note_crossfade_low = low;
        self.note_crossfade_high = high;
        self
    }

    /// Sets the crossfade widths at the low and high velocity edges.
    pub fn with_velocity_crossfade(mut self, low: u8, high: u8) -> Zone {
        self.velocity_crossfade_low = low;
        self.velocity_crossfade_high = high;
        self
    }

    /// Gets the zone name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the sample content.
    pub fn sample(&self) -> &ZoneSample {
        &self.sample
    }

    /// Gets the root note.
    pub fn root_note(&self) -> u8 {
        self.root_note
    }

    /// Gets the low end of the key range.
    pub fn low_note(&self) -> u8 {
        self.low_note
    }

    /// Gets the high end of the key range.
    pub fn high_note(&self) -> u8 {
        self.high_note
    }

    /// Gets the velocity range, or none when all velocities sound.
    pub fn velocity(&self) -> Option<[u8; 2]> {
        self.velocity
    }

    /// Gets the crossfade width in semitones at the low note edge.
    pub fn note_crossfade_low(&self) -> u8 {
        self.note_crossfade_low
    }

    /// Gets the crossfade width in semitones at the high note edge.
    pub fn note_crossfade_high(&self) -> u8 {
        self.note_crossfade_high
    }

    /// Gets the crossfade width in velocity steps at the low velocity edge.
    pub fn velocity_crossfade_low(&self) -> u8 {
        self.velocity_crossfade_low
    }

    /// Gets the crossfade width in velocity steps at the high velocity edge.
    pub fn velocity_crossfade_high(&self) -> u8 {
        self.velocity_crossfade_high
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        let invalid = |reason: String| DescriptorError::InvalidRange {
            zone: self.name.clone(),
            reason,
        };

        if self.low_note > self.high_note {
            return Err(invalid(format!(
                "low note {} is above high note {}",
                self.low_note, self.high_note
            )));
        }
        if self.high_note > 127 {
            return Err(invalid(format!("high note {} is above 127", self.high_note)));
        }
        if self.root_note < self.low_note || self.root_note > self.high_note {
            return Err(invalid(format!(
                "root note {} is outside [{}, {}]",
                self.root_note, self.low_note, self.high_note
            )));
        }
        if let Some([low, high]) = self.velocity {
            if low > high {
                return Err(invalid(format!(
                    "low velocity {} is above high velocity {}",
                    low, high
                )));
            }
            if high > 127 {
                return Err(invalid(format!("high velocity {} is above 127", high)));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (root: {}, notes: [{}, {}]",
            self.name, self.root_note, self.low_note, self.high_note
        )?;
        if let Some([low, high]) = self.velocity {
            write!(f, ", velocity: [{}, {}]", low, high)?;
        }
        write!(f, ")")
    }
}

/// An ordered velocity layer of zones.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Group {
    /// The layer name. Empty for the default group.
    name: String,
    zones: Vec<Zone>,
}

impl Group {
    /// Creates a group.
    pub fn new(name: impl Into<String>, zones: Vec<Zone>) -> Group {
        Group {
            name: name.into(),
            zones,
        }
    }

    /// Gets the group name. Empty for the default group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the zones in root note order.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Returns true if this is the default group for unmatched files.
    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }

    /// Verifies that the zones cover the key range without gaps. Zones may
    /// overlap where crossfades widened them.
    fn validate(&self) -> Result<(), DescriptorError> {
        let gap = |note: u8| DescriptorError::KeyRangeGap {
            group: self.name.clone(),
            note,
        };

        if let Some(first) = self.zones.first() {
            if first.low_note() > 0 {
                return Err(gap(0));
            }
        }
        for pair in self.zones.windows(2) {
            if pair[1].low_note() as u16 > pair[0].high_note() as u16 + 1 {
                return Err(gap(pair[0].high_note() + 1));
            }
        }
        if let Some(last) = self.zones.last() {
            if last.high_note() < 127 {
                return Err(gap(127));
            }
        }
        Ok(())
    }
}

/// The immutable result of assembling one folder of samples: the instrument
/// name, the output path segments, and the groups of zones. Constructed
/// through [MultisampleBuilder] only.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MultisampleDescriptor {
    name: String,
    path_parts: Vec<String>,
    groups: Vec<Group>,
}

impl MultisampleDescriptor {
    /// Gets the instrument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the output path segments, from the scan root down.
    pub fn path_parts(&self) -> &[String] {
        &self.path_parts
    }

    /// Gets the groups in velocity layer order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The total number of zones across all groups.
    pub fn zone_count(&self) -> usize {
        self.groups.iter().map(|group| group.zones().len()).sum()
    }
}

impl fmt::Display for MultisampleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} group(s), {} zone(s))",
            self.name,
            self.groups.len(),
            self.zone_count()
        )
    }
}

/// Accumulates groups and yields a validated, immutable descriptor. A
/// failed build drops the builder; a partial descriptor never escapes.
pub struct MultisampleBuilder {
    name: String,
    path_parts: Vec<String>,
    groups: Vec<Group>,
}

impl MultisampleBuilder {
    /// Creates a builder for the given instrument name and path segments.
    pub fn new(name: impl Into<String>, path_parts: Vec<String>) -> MultisampleBuilder {
        MultisampleBuilder {
            name: name.into(),
            path_parts,
            groups: Vec::new(),
        }
    }

    /// Adds a group.
    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Validates the accumulated state and produces the descriptor.
    pub fn build(self) -> Result<MultisampleDescriptor, DescriptorError> {
        if self.name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }
        if self.groups.iter().all(|group| group.zones().is_empty()) {
            return Err(DescriptorError::NoZones);
        }
        for group in self.groups.iter() {
            for zone in group.zones() {
                zone.validate()?;
            }
            group.validate()?;
        }

        Ok(MultisampleDescriptor {
            name: self.name,
            path_parts: self.path_parts,
            groups: self.groups,
        })
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::*;
    use crate::sample::{FormatInfo, PitchInfo};
    use crate::wav::Compression;

    fn sample_file(name: &str, note: u8) -> SampleFile {
        SampleFile::new(
            PathBuf::from(format!("{}.wav", name)),
            FormatInfo::new(Compression::Pcm, 2, 44100, 16),
            PitchInfo::new(note, 0, None),
            1000,
        )
    }

    fn zone(name: &str, root: u8, low: u8, high: u8) -> Zone {
        Zone::new(
            name,
            ZoneSample::Single(sample_file(name, root)),
            root,
            low,
            high,
        )
    }

    #[test]
    fn test_build() {
        let mut builder = MultisampleBuilder::new("Piano", vec!["Library".to_string()]);
        builder.add_group(Group::new(
            "",
            vec![zone("Piano_C3", 48, 0, 54), zone("Piano_C4", 60, 55, 127)],
        ));

        let descriptor = builder.build().expect("expected build to succeed");
        assert_eq!(descriptor.name(), "Piano");
        assert_eq!(descriptor.path_parts(), &["Library".to_string()]);
        assert_eq!(descriptor.groups().len(), 1);
        assert!(descriptor.groups()[0].is_default());
        assert_eq!(descriptor.zone_count(), 2);
        assert_eq!(descriptor.to_string(), "Piano (1 group(s), 2 zone(s))");
    }

    #[test]
    fn test_empty_name() {
        let mut builder = MultisampleBuilder::new("   ", vec![]);
        builder.add_group(Group::new("", vec![zone("A", 60, 0, 127)]));
        assert!(matches!(builder.build(), Err(DescriptorError::EmptyName)));
    }

    #[test]
    fn test_no_zones() {
        let mut builder = MultisampleBuilder::new("Piano", vec![]);
        builder.add_group(Group::new("soft", vec![]));
        assert!(matches!(builder.build(), Err(DescriptorError::NoZones)));
    }

    #[test]
    fn test_inverted_range() {
        let mut builder = MultisampleBuilder::new("Piano", vec![]);
        builder.add_group(Group::new("", vec![zone("A", 60, 70, 50)]));
        assert!(matches!(
            builder.build(),
            Err(DescriptorError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_key_range_gap() {
        let mut builder = MultisampleBuilder::new("Piano", vec![]);
        builder.add_group(Group::new(
            "",
            vec![zone("A", 48, 0, 54), zone("B", 60, 60, 127)],
        ));
        match builder.build() {
            Err(DescriptorError::KeyRangeGap { note, .. }) => assert_eq!(note, 55),
            other => panic!("expected key range gap, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_zone_sample() {
        let single = ZoneSample::Single(sample_file("Piano_C4", 60));
        assert_eq!(single.channels(), 2);
        assert_eq!(single.files().len(), 1);
        assert_eq!(single.to_string(), "Piano_C4");

        let left = SampleFile::new(
            PathBuf::from("Piano-L.wav"),
            FormatInfo::new(Compression::Pcm, 1, 44100, 16),
            PitchInfo::new(60, 0, None),
            1000,
        );
        let right = SampleFile::new(
            PathBuf::from("Piano-R.wav"),
            FormatInfo::new(Compression::Pcm, 1, 44100, 16),
            PitchInfo::new(60, 0, None),
            1000,
        );
        let pair = ZoneSample::MonoPair { left, right };
        assert_eq!(pair.channels(), 2);
        assert_eq!(pair.primary().name(), "Piano-L");
        assert_eq!(pair.to_string(), "Piano-L + Piano-R");
    }
}
