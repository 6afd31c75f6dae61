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
use std::path::{Path, PathBuf};
use std::{fs, io};

use tracing::{debug, info};

use crate::cancel::CancelHandle;
use crate::config::Settings;
use crate::detector::DetectError;
use crate::mapping;
use crate::multisample::MultisampleDescriptor;
use crate::sample::SampleFile;

/// Detects multisample instruments built from plain wave files. Every wave
/// file directly inside a folder becomes a zone of one instrument.
pub struct Detector {}

impl Detector {
    pub fn new() -> Detector {
        Detector {}
    }
}

impl Default for Detector {
    fn default() -> Detector {
        Detector::new()
    }
}

impl crate::detector::Detector for Detector {
    fn name(&self) -> &str {
        "wav"
    }

    fn analyze(
        &self,
        folder: &Path,
        source_folder: &Path,
        settings: &Settings,
        cancel_handle: CancelHandle,
    ) -> Result<Vec<MultisampleDescriptor>, DetectError> {
        let paths = sample_paths(folder)?;
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            if cancel_handle.is_cancelled() {
                return Ok(Vec::new());
            }
            let file = SampleFile::analyze(&path).map_err(|source| DetectError::Analysis {
                file: path.clone(),
                source,
            })?;
            debug!(
                file = file.name(),
                format = file.format().to_string(),
                "Analyzed sample file."
            );
            files.push(file);
        }

        if cancel_handle.is_cancelled() {
            return Ok(Vec::new());
        }
        let descriptor =
            mapping::assemble(files, folder, source_folder, settings).map_err(|source| {
                DetectError::Assembly {
                    folder: folder.to_path_buf(),
                    source,
                }
            })?;
        info!(
            instrument = descriptor.to_string(),
            "Detected multisample instrument."
        );

        Ok(vec![descriptor])
    }
}

/// Lists the wave files directly inside the folder, sorted by name.
fn sample_paths(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_wav = path
            .extension()
            .map(|extension| extension.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);
        if is_wav {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod test {
    use std::error::Error;

    use tempfile::tempdir;

    use crate::detector::Detector as _;
    use crate::testutil;

    use super::*;

    #[test]
    fn test_analyze_folder() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let folder = dir.path().join("Piano");
        fs::create_dir(&folder)?;
        testutil::write_pitched_wav(&folder.join("Piano_C3.wav"), 1, 48)?;
        testutil::write_pitched_wav(&folder.join("Piano_F3.wav"), 1, 53)?;
        // Not a wave file, ignored by the listing.
        fs::write(folder.join("readme.txt"), b"notes")?;

        let descriptors = Detector::new().analyze(
            &folder,
            dir.path(),
            &Settings::default(),
            CancelHandle::new(),
        )?;

        assert_eq!(descriptors.len(), 1);
        let descriptor = &descriptors[0];
        assert_eq!(descriptor.name(), "Piano");
        assert_eq!(descriptor.zone_count(), 2);
        let zones = descriptor.groups()[0].zones();
        assert_eq!(zones[0].root_note(), 48);
        assert_eq!(zones[0].high_note(), 50);
        assert_eq!(zones[1].root_note(), 53);
        assert_eq!(zones[1].low_note(), 51);
        Ok(())
    }

    #[test]
    fn test_analyze_folder_without_samples() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;

        let descriptors = Detector::new().analyze(
            dir.path(),
            dir.path(),
            &Settings::default(),
            CancelHandle::new(),
        )?;

        assert!(descriptors.is_empty());
        Ok(())
    }

    #[test]
    fn test_analyze_broken_file() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("bad.wav"), b"not a wave file")?;

        let result = Detector::new().analyze(
            dir.path(),
            dir.path(),
            &Settings::default(),
            CancelHandle::new(),
        );

        assert!(matches!(result, Err(DetectError::Analysis { .. })));
        Ok(())
    }

    #[test]
    fn test_analyze_cancelled() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        testutil::write_pitched_wav(&dir.path().join("Piano_C3.wav"), 1, 48)?;

        let cancel_handle = CancelHandle::new();
        cancel_handle.cancel();

        let descriptors = Detector::new().analyze(
            dir.path(),
            dir.path(),
            &Settings::default(),
            cancel_handle,
        )?;

        assert!(descriptors.is_empty());
        Ok(())
    }
}
