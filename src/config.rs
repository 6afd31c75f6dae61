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
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod error;

pub use error::ConfigError;

/// A left and right channel marker pair used to recognize mono split files,
/// e.g. "Piano_L.wav" and "Piano_R.wav".
#[derive(Deserialize, Clone, Serialize, Debug, PartialEq, Eq)]
pub struct SplitPattern {
    /// The marker of the left channel file.
    left: String,
    /// The marker of the right channel file.
    right: String,
}

impl SplitPattern {
    /// Creates a split pattern.
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> SplitPattern {
        SplitPattern {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Gets the left channel marker.
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Gets the right channel marker.
    pub fn right(&self) -> &str {
        &self.right
    }
}

/// A YAML representation of the detection settings.
#[derive(Deserialize, Clone, Serialize, Debug)]
pub struct Settings {
    /// Ordered markers denoting velocity layers, e.g. "soft", "loud". Files
    /// matching none of them fall into a single default group.
    #[serde(default)]
    group_patterns: Vec<String>,

    /// Whether the groups are ordered from soft to loud.
    #[serde(default = "default_ascending")]
    ascending: bool,

    /// Marker pairs for mono left/right split files.
    #[serde(default = "default_mono_split_patterns")]
    mono_split_patterns: Vec<SplitPattern>,

    /// Texts to strip once from the end of a derived instrument name.
    #[serde(default)]
    postfix_texts: Vec<String>,

    /// The crossfade width between neighboring key ranges, in semitones.
    #[serde(default)]
    crossfade_notes: u8,

    /// The crossfade width between velocity layers, in velocity steps.
    #[serde(default)]
    crossfade_velocities: u8,

    /// Whether the folder name is preferred over the name derived from the
    /// sample file names.
    #[serde(default)]
    prefer_folder_name: bool,
}

fn default_ascending() -> bool {
    true
}

fn default_mono_split_patterns() -> Vec<SplitPattern> {
    vec![
        SplitPattern::new("_L", "_R"),
        SplitPattern::new("-L", "-R"),
    ]
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            group_patterns: Vec::new(),
            ascending: default_ascending(),
            mono_split_patterns: default_mono_split_patterns(),
            postfix_texts: Vec::new(),
            crossfade_notes: 0,
            crossfade_velocities: 0,
            prefer_folder_name: false,
        }
    }
}

/// Loads settings from a YAML file.
pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    Ok(serde_yml::from_str(&fs::read_to_string(path)?)?)
}

/// Loads settings from a YAML file, or returns the defaults when no path is
/// given.
pub fn load_or_default(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => load(path),
        None => Ok(Settings::default()),
    }
}

impl Settings {
    /// Gets the velocity layer markers.
    pub fn group_patterns(&self) -> &[String] {
        &self.group_patterns
    }

    /// Gets whether groups are ordered from soft to loud.
    pub fn ascending(&self) -> bool {
        self.ascending
    }

    /// Gets the mono split marker pairs.
    pub fn mono_split_patterns(&self) -> &[SplitPattern] {
        &self.mono_split_patterns
    }

    /// Gets the name postfixes to strip.
    pub fn postfix_texts(&self) -> &[String] {
        &self.postfix_texts
    }

    /// Gets the note crossfade width in semitones.
    pub fn crossfade_notes(&self) -> u8 {
        self.crossfade_notes
    }

    /// Gets the velocity crossfade width in steps.
    pub fn crossfade_velocities(&self) -> u8 {
        self.crossfade_velocities
    }

    /// Gets whether the folder name is preferred over derived names.
    pub fn prefer_folder_name(&self) -> bool {
        self.prefer_folder_name
    }
}

#[cfg(test)]
impl Settings {
    /// Creates settings (test only).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        group_patterns: Vec<String>,
        ascending: bool,
        mono_split_patterns: Vec<SplitPattern>,
        postfix_texts: Vec<String>,
        crossfade_notes: u8,
        crossfade_velocities: u8,
        prefer_folder_name: bool,
    ) -> Settings {
        Settings {
            group_patterns,
            ascending,
            mono_split_patterns,
            postfix_texts,
            crossfade_notes,
            crossfade_velocities,
            prefer_folder_name,
        }
    }

    /// Creates settings with the given group patterns (test only).
    pub fn with_group_patterns(patterns: &[&str]) -> Settings {
        Settings {
            group_patterns: patterns.iter().map(|pattern| pattern.to_string()).collect(),
            ..Settings::default()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings: Settings = serde_yml::from_str("{}").expect("expected parse to succeed");
        assert!(settings.group_patterns().is_empty());
        assert!(settings.ascending());
        assert_eq!(settings.mono_split_patterns().len(), 2);
        assert_eq!(settings.mono_split_patterns()[0].left(), "_L");
        assert!(settings.postfix_texts().is_empty());
        assert_eq!(settings.crossfade_notes(), 0);
        assert_eq!(settings.crossfade_velocities(), 0);
        assert!(!settings.prefer_folder_name());
    }

    #[test]
    fn test_parse() {
        let settings: Settings = serde_yml::from_str(
            r#"
group_patterns: ["soft", "medium", "loud"]
ascending: false
mono_split_patterns:
  - { left: "-Left", right: "-Right" }
postfix_texts: [" Samples"]
crossfade_notes: 2
crossfade_velocities: 16
prefer_folder_name: true
"#,
        )
        .expect("expected parse to succeed");

        assert_eq!(settings.group_patterns(), &["soft", "medium", "loud"]);
        assert!(!settings.ascending());
        assert_eq!(
            settings.mono_split_patterns(),
            &[SplitPattern::new("-Left", "-Right")]
        );
        assert_eq!(settings.postfix_texts(), &[" Samples".to_string()]);
        assert_eq!(settings.crossfade_notes(), 2);
        assert_eq!(settings.crossfade_velocities(), 16);
        assert!(settings.prefer_folder_name());
    }

    #[test]
    fn test_load_or_default() {
        let settings = load_or_default(None).expect("expected default settings to succeed");
        assert!(settings.ascending());
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().expect("expected temp dir");
        let path = dir.path().join("detect.yaml");
        std::fs::write(&path, "crossfade_notes: 3\n").expect("expected write to succeed");

        let settings = load(&path).expect("expected load to succeed");
        assert_eq!(settings.crossfade_notes(), 3);

        assert!(matches!(
            load(&dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
