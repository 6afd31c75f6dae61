// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
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
use std::collections::BTreeMap;
use std::path::Path;

use tracing::warn;

use crate::config::{Settings, SplitPattern};
use crate::multisample::{
    DescriptorError, Group, MultisampleBuilder, MultisampleDescriptor, Zone, ZoneSample,
};
use crate::sample::{self, SampleFile};

/// Errors that abort the assembly of one instrument folder.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// No usable name was left after cleanup.
    #[error("No usable instrument name could be derived")]
    EmptyName,

    /// The folder contained no analyzable samples.
    #[error("No samples to assemble")]
    NoSamples,

    /// Two samples in one group claim the same root note, so key ranges
    /// cannot be inferred.
    #[error("Group \"{group}\" has more than one sample with root note {note}")]
    DuplicateRootNote { group: String, note: u8 },

    /// The assembled descriptor failed validation.
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Errors raised while merging two mono files into a stereo zone. These are
/// recoverable. The affected files are kept as independent mono zones.
#[derive(Debug, thiserror::Error)]
pub enum CombinationError {
    /// A split channel file has no partner on the other channel.
    #[error("\"{name}\" has no matching {missing} channel file")]
    MissingPartner { name: String, missing: &'static str },

    /// Two split channel files cannot form one stereo zone.
    #[error("\"{left}\" and \"{right}\" do not match: {reason}")]
    Mismatch {
        left: String,
        right: String,
        reason: String,
    },
}

/// Assembles the samples found in one instrument folder into a multisample
/// descriptor. The folder is the directory the samples came from and the
/// source folder is the root of the scan, used to derive the output path
/// segments.
pub fn assemble(
    files: Vec<SampleFile>,
    folder: &Path,
    source_folder: &Path,
    settings: &Settings,
) -> Result<MultisampleDescriptor, AssemblyError> {
    if files.is_empty() {
        return Err(AssemblyError::NoSamples);
    }

    let name = cleanup_name(&derive_name(&files, folder, settings), settings.postfix_texts());
    if name.is_empty() {
        return Err(AssemblyError::EmptyName);
    }
    let path_parts = path_parts(folder, source_folder, &name);

    let groups = group_files(files, settings);
    let (velocities, velocity_fades) =
        velocity_layout(groups.len(), settings.crossfade_velocities());

    let mut builder = MultisampleBuilder::new(name, path_parts);
    for (index, (group_name, group_files)) in groups.into_iter().enumerate() {
        let mut entries = pair_mono_files(group_files, settings.mono_split_patterns());
        entries.sort_by_key(|entry| entry.sample.primary().pitch().unity_note());

        let roots: Vec<u8> = entries
            .iter()
            .map(|entry| entry.sample.primary().pitch().unity_note())
            .collect();
        for pair in roots.windows(2) {
            if pair[0] == pair[1] {
                return Err(AssemblyError::DuplicateRootNote {
                    group: group_label(&group_name).to_string(),
                    note: pair[0],
                });
            }
        }

        let (ranges, note_fades) = note_layout(&roots, settings.crossfade_notes());

        let mut zones = Vec::with_capacity(entries.len());
        for (entry, (range, fade)) in entries.into_iter().zip(ranges.into_iter().zip(note_fades)) {
            let root = entry.sample.primary().pitch().unity_note();
            let mut zone = Zone::new(entry.name, entry.sample, root, range.0, range.1);
            if let Some([low, high]) = velocities[index] {
                zone = zone.with_velocity(low, high);
            }
            zone = zone
                .with_note_crossfade(fade.0, fade.1)
                .with_velocity_crossfade(velocity_fades[index].0, velocity_fades[index].1);
            zones.push(zone);
        }

        builder.add_group(Group::new(group_name, zones));
    }

    Ok(builder.build()?)
}

/// Derives the raw instrument name, before postfix cleanup. A single sample
/// is named after its stem minus any trailing note name, several samples
/// after their longest common prefix.
fn derive_name(files: &[SampleFile], folder: &Path, settings: &Settings) -> String {
    if settings.prefer_folder_name() {
        return folder
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
    }

    if let [file] = files {
        let name = file.name();
        return match sample::trailing_note_len(name) {
            Some(len) => name[..name.len() - len].to_string(),
            None => name.to_string(),
        };
    }

    longest_common_prefix(files)
}

fn longest_common_prefix(files: &[SampleFile]) -> String {
    let first = files[0].name();
    let mut len = first.len();
    for file in &files[1..] {
        let common = first
            .bytes()
            .zip(file.name().bytes())
            .take_while(|(a, b)| a == b)
            .count();
        len = len.min(common);
    }
    // Do not cut a multi byte character in half.
    while len > 0 && !first.is_char_boundary(len) {
        len -= 1;
    }
    first[..len].to_string()
}

/// Strips at most one matching postfix, then any trailing separators.
fn cleanup_name(raw: &str, postfix_texts: &[String]) -> String {
    let mut name = raw;
    for postfix in postfix_texts {
        if !postfix.is_empty() && name.ends_with(postfix.as_str()) {
            name = &name[..name.len() - postfix.len()];
            break;
        }
    }
    name.trim_end_matches(|c| c == ' ' || c == '-' || c == '_')
        .trim()
        .to_string()
}

/// The output path segments: the scan root's folder name down to the
/// instrument folder, with the final segment replaced by the instrument name
/// and the conventional samples level directly under the root dropped.
fn path_parts(folder: &Path, source_folder: &Path, name: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut current = folder;
    while current != source_folder {
        if let Some(dir_name) = current.file_name() {
            parts.insert(0, dir_name.to_string_lossy().to_string());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    parts.insert(
        0,
        source_folder
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default(),
    );

    if let Some(last) = parts.last_mut() {
        *last = name.to_string();
    }
    if parts.len() > 1 {
        parts.remove(1);
    }
    parts
}

/// Splits the files into velocity layer groups by matching the file names
/// against the configured patterns. The returned groups are ordered from the
/// lowest velocity layer to the highest.
fn group_files(files: Vec<SampleFile>, settings: &Settings) -> Vec<(String, Vec<SampleFile>)> {
    let patterns = settings.group_patterns();
    let mut grouped: BTreeMap<i32, Vec<SampleFile>> = BTreeMap::new();

    for file in files {
        let name = file.name().to_lowercase();
        let index = patterns
            .iter()
            .position(|pattern| !pattern.is_empty() && name.contains(&pattern.to_lowercase()))
            .map(|position| position as i32)
            .unwrap_or(-1);
        grouped.entry(index).or_default().push(file);
    }

    let mut groups: Vec<(String, Vec<SampleFile>)> = grouped
        .into_iter()
        .map(|(index, files)| {
            let name = if index < 0 {
                String::new()
            } else {
                patterns[index as usize].clone()
            };
            (name, files)
        })
        .collect();
    if !settings.ascending() {
        groups.reverse();
    }
    groups
}

fn group_label(name: &str) -> &str {
    if name.is_empty() {
        "default"
    } else {
        name
    }
}

/// One zone to be, either a plain file or a merged stereo pair, together
/// with the name the zone will carry.
struct ZoneEntry {
    name: String,
    sample: ZoneSample,
}

impl ZoneEntry {
    fn single(file: SampleFile) -> ZoneEntry {
        ZoneEntry {
            name: file.name().to_string(),
            sample: ZoneSample::Single(file),
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Side {
    Left,
    Right,
}

struct MarkerMatch {
    pattern: usize,
    side: Side,
    position: usize,
    len: usize,
}

#[derive(Default)]
struct PairSlot {
    left: Option<SampleFile>,
    right: Option<SampleFile>,
}

/// Merges mono split channel files into stereo zones. Files that are not
/// mono, carry no split marker, or cannot be combined stay independent
/// zones.
fn pair_mono_files(files: Vec<SampleFile>, patterns: &[SplitPattern]) -> Vec<ZoneEntry> {
    let mut entries: Vec<ZoneEntry> = Vec::new();
    let mut slots: BTreeMap<(usize, String), PairSlot> = BTreeMap::new();

    for file in files {
        if !file.format().is_mono() {
            entries.push(ZoneEntry::single(file));
            continue;
        }
        let marker = match find_marker(file.name(), patterns) {
            Some(marker) => marker,
            None => {
                entries.push(ZoneEntry::single(file));
                continue;
            }
        };

        let name = file.name();
        let base = format!(
            "{}{}",
            &name[..marker.position],
            &name[marker.position + marker.len..]
        );
        let slot = slots.entry((marker.pattern, base)).or_default();
        let side = match marker.side {
            Side::Left => &mut slot.left,
            Side::Right => &mut slot.right,
        };
        if side.is_some() {
            warn!(
                file = file.name(),
                "Duplicate split channel file, keeping it as a mono zone"
            );
            entries.push(ZoneEntry::single(file));
        } else {
            *side = Some(file);
        }
    }

    for ((_, base), slot) in slots {
        match (slot.left, slot.right) {
            (Some(left), Some(right)) => match check_pair(&left, &right) {
                Ok(()) => entries.push(ZoneEntry {
                    name: base,
                    sample: ZoneSample::MonoPair { left, right },
                }),
                Err(error) => {
                    warn!(
                        err = error.to_string(),
                        "Unable to combine mono files, keeping them as separate zones"
                    );
                    entries.push(ZoneEntry::single(left));
                    entries.push(ZoneEntry::single(right));
                }
            },
            (Some(file), None) | (None, Some(file)) => {
                let missing = if slot_is_left(&file, patterns) {
                    "right"
                } else {
                    "left"
                };
                let error = CombinationError::MissingPartner {
                    name: file.name().to_string(),
                    missing,
                };
                warn!(err = error.to_string(), "Keeping the file as a mono zone");
                entries.push(ZoneEntry::single(file));
            }
            (None, None) => {}
        }
    }

    entries
}

fn slot_is_left(file: &SampleFile, patterns: &[SplitPattern]) -> bool {
    find_marker(file.name(), patterns)
        .map(|marker| marker.side == Side::Left)
        .unwrap_or(false)
}

/// Finds the rightmost split channel marker in the name. Markers are matched
/// case sensitively. On a position tie the longer marker wins.
fn find_marker(name: &str, patterns: &[SplitPattern]) -> Option<MarkerMatch> {
    let mut best: Option<MarkerMatch> = None;
    for (pattern, split) in patterns.iter().enumerate() {
        for (side, marker) in [(Side::Left, split.left()), (Side::Right, split.right())] {
            if marker.is_empty() {
                continue;
            }
            if let Some(position) = name.rfind(marker) {
                let better = match &best {
                    None => true,
                    Some(found) => {
                        position > found.position
                            || (position == found.position && marker.len() > found.len)
                    }
                };
                if better {
                    best = Some(MarkerMatch {
                        pattern,
                        side,
                        position,
                        len: marker.len(),
                    });
                }
            }
        }
    }
    best
}

/// Checks whether two mono files can form one stereo zone.
fn check_pair(left: &SampleFile, right: &SampleFile) -> Result<(), CombinationError> {
    let mismatch = |reason: &str| CombinationError::Mismatch {
        left: left.name().to_string(),
        right: right.name().to_string(),
        reason: reason.to_string(),
    };

    if left.format().compression() != right.format().compression() {
        return Err(mismatch("compression kinds differ"));
    }
    if left.format().sample_rate() != right.format().sample_rate() {
        return Err(mismatch("sample rates differ"));
    }
    if left.format().bits_per_sample() != right.format().bits_per_sample() {
        return Err(mismatch("bit depths differ"));
    }
    if left.pitch().unity_note() != right.pitch().unity_note() {
        return Err(mismatch("unity notes differ"));
    }
    if left.pitch().cents() != right.pitch().cents() {
        return Err(mismatch("tunings differ"));
    }
    Ok(())
}

/// Computes the key range of every zone plus the crossfade bands between
/// neighbors. The roots must be sorted and unique. Every boundary sits at
/// the midpoint between neighboring roots, the outermost ranges extend to
/// note 0 and 127.
fn note_layout(roots: &[u8], crossfade: u8) -> (Vec<(u8, u8)>, Vec<(u8, u8)>) {
    let mut ranges: Vec<(u8, u8)> = Vec::with_capacity(roots.len());
    for (i, &root) in roots.iter().enumerate() {
        let low = if i == 0 {
            0
        } else {
            (roots[i - 1] as u16 + root as u16) / 2 + 1
        };
        let high = if i == roots.len() - 1 {
            127
        } else {
            (root as u16 + roots[i + 1] as u16) / 2
        };
        ranges.push((low as u8, high as u8));
    }

    let mut fades = vec![(0u8, 0u8); ranges.len()];
    if crossfade == 0 || ranges.len() < 2 {
        return (ranges, fades);
    }

    // Widen the ranges around each boundary, half a width to each side,
    // clamped so neither range inverts nor swallows a neighboring root.
    let voronoi = ranges.clone();
    let half = (crossfade / 2) as i32;
    let rest = crossfade as i32 - half;
    for i in 0..voronoi.len() - 1 {
        let boundary = voronoi[i].1 as i32;
        let up = half.min(voronoi[i + 1].1 as i32 - 1 - boundary).max(0);
        let down = rest.min(boundary - voronoi[i].0 as i32).max(0);
        let realized = (up + down) as u8;
        if realized > 0 {
            ranges[i].1 = (boundary + up) as u8;
            ranges[i + 1].0 = (boundary + 1 - down) as u8;
            fades[i].1 = realized;
            fades[i + 1].0 = realized;
        }
    }
    (ranges, fades)
}

/// Computes the velocity range of every group plus the crossfade widths at
/// group boundaries. A single group is unrestricted. Crossfades widen the
/// lower group's high end only.
fn velocity_layout(count: usize, crossfade: u8) -> (Vec<Option<[u8; 2]>>, Vec<(u8, u8)>) {
    let mut fades = vec![(0u8, 0u8); count];
    if count <= 1 {
        return (vec![None; count], fades);
    }

    let mut ranges: Vec<[u8; 2]> = (0..count)
        .map(|i| [(i * 128 / count) as u8, ((i + 1) * 128 / count - 1) as u8])
        .collect();
    if crossfade > 0 {
        for i in 0..count - 1 {
            let width = (crossfade as i32)
                .min(ranges[i + 1][1] as i32 - 1 - ranges[i][1] as i32)
                .max(0) as u8;
            if width > 0 {
                ranges[i][1] += width;
                fades[i].1 = width;
                fades[i + 1].0 = width;
            }
        }
    }
    (ranges.into_iter().map(Some).collect(), fades)
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use crate::config::Settings;
    use crate::sample::{FormatInfo, PitchInfo, SampleFile};
    use crate::wav::Compression;

    use super::*;

    fn mono(name: &str, note: u8) -> SampleFile {
        mono_with_format(name, note, 44100, 16)
    }

    fn mono_with_format(name: &str, note: u8, sample_rate: u32, bits: u16) -> SampleFile {
        SampleFile::new(
            PathBuf::from(format!("/media/Library/Piano/{}.wav", name)),
            FormatInfo::new(Compression::Pcm, 1, sample_rate, bits),
            PitchInfo::new(note, 0, None),
            44100,
        )
    }

    fn stereo(name: &str, note: u8) -> SampleFile {
        SampleFile::new(
            PathBuf::from(format!("/media/Library/Piano/{}.wav", name)),
            FormatInfo::new(Compression::Pcm, 2, 44100, 16),
            PitchInfo::new(note, 0, None),
            44100,
        )
    }

    fn folder() -> PathBuf {
        PathBuf::from("/media/Library/Piano")
    }

    fn source() -> PathBuf {
        PathBuf::from("/media/Library")
    }

    #[test]
    fn test_assemble_stereo_pair() {
        let files = vec![mono("Sample-L", 60), mono("Sample-R", 60)];

        let descriptor = assemble(files, &folder(), &source(), &Settings::default())
            .expect("expected assembly to succeed");

        assert_eq!(descriptor.name(), "Sample");
        assert_eq!(descriptor.groups().len(), 1);
        let group = &descriptor.groups()[0];
        assert_eq!(group.name(), "");
        assert_eq!(group.zones().len(), 1);
        let zone = &group.zones()[0];
        assert_eq!(zone.name(), "Sample");
        assert_eq!(zone.root_note(), 60);
        assert_eq!(zone.low_note(), 0);
        assert_eq!(zone.high_note(), 127);
        assert_eq!(zone.velocity(), None);
        assert_eq!(zone.sample().channels(), 2);
    }

    #[test]
    fn test_assemble_velocity_layers() {
        let files = vec![
            mono("Piano_soft_C3", 48),
            mono("Piano_loud_C3", 48),
            mono("Piano_soft_C4", 60),
        ];
        let settings = Settings::new(
            vec!["soft".to_string(), "loud".to_string()],
            true,
            Vec::new(),
            Vec::new(),
            0,
            16,
            false,
        );

        let descriptor = assemble(files, &folder(), &source(), &settings)
            .expect("expected assembly to succeed");

        assert_eq!(descriptor.name(), "Piano");
        assert_eq!(descriptor.groups().len(), 2);

        let soft = &descriptor.groups()[0];
        assert_eq!(soft.name(), "soft");
        assert_eq!(soft.zones().len(), 2);
        for zone in soft.zones() {
            assert_eq!(zone.velocity(), Some([0, 79]));
            assert_eq!(zone.velocity_crossfade_high(), 16);
            assert_eq!(zone.velocity_crossfade_low(), 0);
        }
        assert_eq!(soft.zones()[0].root_note(), 48);
        assert_eq!(soft.zones()[0].low_note(), 0);
        assert_eq!(soft.zones()[0].high_note(), 54);
        assert_eq!(soft.zones()[1].root_note(), 60);
        assert_eq!(soft.zones()[1].low_note(), 55);
        assert_eq!(soft.zones()[1].high_note(), 127);

        let loud = &descriptor.groups()[1];
        assert_eq!(loud.name(), "loud");
        assert_eq!(loud.zones().len(), 1);
        assert_eq!(loud.zones()[0].velocity(), Some([64, 127]));
        assert_eq!(loud.zones()[0].velocity_crossfade_low(), 16);
        assert_eq!(loud.zones()[0].velocity_crossfade_high(), 0);
    }

    #[test]
    fn test_assemble_descending_groups() {
        let files = vec![mono("Piano_soft_C3", 48), mono("Piano_loud_C3", 48)];
        let settings = Settings::new(
            vec!["soft".to_string(), "loud".to_string()],
            false,
            Vec::new(),
            Vec::new(),
            0,
            0,
            false,
        );

        let descriptor = assemble(files, &folder(), &source(), &settings)
            .expect("expected assembly to succeed");

        assert_eq!(descriptor.groups()[0].name(), "loud");
        assert_eq!(descriptor.groups()[0].zones()[0].velocity(), Some([0, 63]));
        assert_eq!(descriptor.groups()[1].name(), "soft");
        assert_eq!(descriptor.groups()[1].zones()[0].velocity(), Some([64, 127]));
    }

    #[test]
    fn test_assemble_no_samples() {
        let result = assemble(Vec::new(), &folder(), &source(), &Settings::default());
        assert!(matches!(result, Err(AssemblyError::NoSamples)));
    }

    #[test]
    fn test_assemble_duplicate_root_note() {
        let files = vec![mono("Piano_A", 60), mono("Piano_B", 60)];

        let result = assemble(files, &folder(), &source(), &Settings::default());

        match result {
            Err(AssemblyError::DuplicateRootNote { group, note }) => {
                assert_eq!(group, "default");
                assert_eq!(note, 60);
            }
            other => panic!("expected duplicate root note error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_assemble_empty_name() {
        let files = vec![mono("Samples", 60)];
        let settings = Settings::new(
            Vec::new(),
            true,
            Vec::new(),
            vec!["Samples".to_string()],
            0,
            0,
            false,
        );

        let result = assemble(files, &folder(), &source(), &settings);
        assert!(matches!(result, Err(AssemblyError::EmptyName)));
    }

    #[test]
    fn test_derive_name_single_file_strips_note() {
        let files = vec![mono("Trumpet_C4", 60)];

        let descriptor = assemble(files, &folder(), &source(), &Settings::default())
            .expect("expected assembly to succeed");

        assert_eq!(descriptor.name(), "Trumpet");
    }

    #[test]
    fn test_derive_name_prefers_folder() {
        let files = vec![mono("Trumpet_C4", 60)];
        let settings = Settings::new(Vec::new(), true, Vec::new(), Vec::new(), 0, 0, true);

        let descriptor = assemble(files, &folder(), &source(), &settings)
            .expect("expected assembly to succeed");

        assert_eq!(descriptor.name(), "Piano");
    }

    #[test]
    fn test_cleanup_name_strips_one_postfix() {
        let postfixes = vec![" Samples".to_string()];
        assert_eq!(cleanup_name("Grand Samples Samples", &postfixes), "Grand Samples");
        assert_eq!(cleanup_name("Grand Samples", &postfixes), "Grand");
        assert_eq!(cleanup_name("Grand", &postfixes), "Grand");
        // Postfix matching is case sensitive.
        assert_eq!(cleanup_name("Grand samples", &postfixes), "Grand samples");
        // Trailing separators go after the postfix does.
        assert_eq!(cleanup_name("Grand_- Samples", &postfixes), "Grand");
    }

    #[test]
    fn test_group_matching_case_insensitive() {
        let files = vec![mono("Piano_SOFT_C3", 48), mono("Piano_C4", 60)];
        let settings = Settings::with_group_patterns(&["soft"]);

        let descriptor = assemble(files, &folder(), &source(), &settings)
            .expect("expected assembly to succeed");

        // The unmatched file lands in the default group, ordered first.
        assert_eq!(descriptor.groups().len(), 2);
        assert_eq!(descriptor.groups()[0].name(), "");
        assert_eq!(descriptor.groups()[1].name(), "soft");
    }

    #[test]
    fn test_pairing_mismatched_rates_degrades_to_mono() {
        let files = vec![
            mono_with_format("Pad-L", 60, 44100, 16),
            mono_with_format("Pad-R", 62, 48000, 16),
        ];

        let descriptor = assemble(files, &folder(), &source(), &Settings::default())
            .expect("expected assembly to succeed");

        let zones = descriptor.groups()[0].zones();
        assert_eq!(zones.len(), 2);
        for zone in zones {
            assert_eq!(zone.sample().channels(), 1);
        }
    }

    #[test]
    fn test_pairing_missing_partner_stays_mono() {
        let files = vec![mono("Pad-L", 60), mono("Bell", 72)];

        let descriptor = assemble(files, &folder(), &source(), &Settings::default())
            .expect("expected assembly to succeed");

        let zones = descriptor.groups()[0].zones();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name(), "Pad-L");
        assert_eq!(zones[0].sample().channels(), 1);
    }

    #[test]
    fn test_pairing_ignores_non_mono_files() {
        let files = vec![stereo("Pad-L", 60), mono("Pad-R", 62)];

        let descriptor = assemble(files, &folder(), &source(), &Settings::default())
            .expect("expected assembly to succeed");

        // The stereo file keeps its marker name, no pair is formed.
        let zones = descriptor.groups()[0].zones();
        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].name(), "Pad-L");
        assert_eq!(zones[0].sample().channels(), 2);
    }

    #[test]
    fn test_pairing_rightmost_marker_wins() {
        let files = vec![mono("Pad-L-R", 60), mono("Pad-L-L", 60)];

        let descriptor = assemble(files, &folder(), &source(), &Settings::default())
            .expect("expected assembly to succeed");

        // Both names reduce to the base "Pad-L" via their rightmost marker.
        let zones = descriptor.groups()[0].zones();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].name(), "Pad-L");
        assert_eq!(zones[0].sample().channels(), 2);
    }

    #[test]
    fn test_pairing_order_independent() {
        for files in [
            vec![mono("Sample-L", 60), mono("Sample-R", 60)],
            vec![mono("Sample-R", 60), mono("Sample-L", 60)],
        ] {
            let descriptor = assemble(files, &folder(), &source(), &Settings::default())
                .expect("expected assembly to succeed");

            let zones = descriptor.groups()[0].zones();
            assert_eq!(zones.len(), 1);
            assert_eq!(zones[0].sample().channels(), 2);
        }
    }

    #[test]
    fn test_note_layout_voronoi() {
        let roots = [36, 48, 60, 72, 84];
        let (ranges, fades) = note_layout(&roots, 0);

        assert_eq!(
            ranges,
            vec![(0, 42), (43, 54), (55, 66), (67, 78), (79, 127)]
        );
        assert!(fades.iter().all(|fade| *fade == (0, 0)));

        // Contiguous coverage of the whole note axis.
        assert_eq!(ranges[0].0, 0);
        assert_eq!(ranges[ranges.len() - 1].1, 127);
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1 + 1, pair[1].0);
        }
    }

    #[test]
    fn test_note_layout_crossfade() {
        let (ranges, fades) = note_layout(&[48, 60], 4);

        // The boundary at 54 widens by two notes to each side.
        assert_eq!(ranges, vec![(0, 56), (53, 127)]);
        assert_eq!(fades, vec![(0, 4), (4, 0)]);
    }

    #[test]
    fn test_note_layout_crossfade_clamped() {
        let (ranges, fades) = note_layout(&[60, 61, 62], 6);

        // Tight ranges clamp the crossfades without inverting any range.
        assert_eq!(ranges, vec![(0, 60), (58, 64), (62, 127)]);
        assert_eq!(fades, vec![(0, 3), (3, 3), (3, 0)]);
        for (low, high) in ranges {
            assert!(low < high);
        }
    }

    #[test]
    fn test_velocity_layout_thirds() {
        let (ranges, fades) = velocity_layout(3, 0);

        assert_eq!(
            ranges,
            vec![Some([0, 41]), Some([42, 84]), Some([85, 127])]
        );
        assert!(fades.iter().all(|fade| *fade == (0, 0)));
    }

    #[test]
    fn test_velocity_layout_single_group() {
        let (ranges, fades) = velocity_layout(1, 16);
        assert_eq!(ranges, vec![None]);
        assert_eq!(fades, vec![(0, 0)]);
    }

    #[test]
    fn test_velocity_layout_crossfade() {
        let (ranges, fades) = velocity_layout(2, 16);

        assert_eq!(ranges, vec![Some([0, 79]), Some([64, 127])]);
        assert_eq!(fades, vec![(0, 16), (16, 0)]);
    }

    #[test]
    fn test_path_parts() {
        assert_eq!(
            path_parts(
                Path::new("/media/Library"),
                Path::new("/media/Library"),
                "Grand"
            ),
            vec!["Grand"]
        );
        assert_eq!(
            path_parts(
                Path::new("/media/Library/Piano"),
                Path::new("/media/Library"),
                "Grand"
            ),
            vec!["Library"]
        );
        assert_eq!(
            path_parts(
                Path::new("/media/Library/Keys/Piano"),
                Path::new("/media/Library"),
                "Grand"
            ),
            vec!["Library", "Grand"]
        );
        assert_eq!(
            path_parts(
                Path::new("/media/Library/Kontakt/Samples/Piano"),
                Path::new("/media/Library"),
                "Grand"
            ),
            vec!["Library", "Samples", "Grand"]
        );
    }
}
