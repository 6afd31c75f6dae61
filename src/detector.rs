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
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossbeam_channel::{bounded, SendTimeoutError, Sender};
use rayon::ThreadPoolBuilder;
use tracing::{error, info, warn};

use crate::cancel::CancelHandle;
use crate::config::Settings;
use crate::mapping::AssemblyError;
use crate::multisample::MultisampleDescriptor;
use crate::wav::WavError;

pub mod wav;

/// How long a worker waits on the consumer before rechecking cancellation.
const DELIVERY_TICK: Duration = Duration::from_millis(100);

/// Errors from scanning and detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// The scan root is missing or not a directory.
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// A sample file could not be analyzed.
    #[error("Error analyzing {}: {source}", .file.display())]
    Analysis { file: PathBuf, source: WavError },

    /// The samples in a folder could not be assembled into an instrument.
    #[error("Error assembling {}: {source}", .folder.display())]
    Assembly {
        folder: PathBuf,
        source: AssemblyError,
    },

    /// The worker pool could not be built.
    #[error("Error creating worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// An error reading the folder tree.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A format detector. Each implementation recognizes one sample container
/// family and turns a folder of sample files into multisample descriptors.
pub trait Detector: Send + Sync {
    /// The name of the format this detector recognizes.
    fn name(&self) -> &str;

    /// Analyzes one folder and returns a descriptor for every multisample
    /// instrument found in it. A folder without matching samples yields an
    /// empty list. A cancelled analysis also yields an empty list, never a
    /// partial descriptor.
    fn analyze(
        &self,
        folder: &Path,
        source_folder: &Path,
        settings: &Settings,
        cancel_handle: CancelHandle,
    ) -> Result<Vec<MultisampleDescriptor>, DetectError>;
}

/// All known format detectors.
pub fn registry() -> Vec<Box<dyn Detector>> {
    vec![Box::new(wav::Detector::new())]
}

/// Scans a folder tree for multisample instruments with every registered
/// format detector.
pub struct Scanner {
    settings: Settings,
    detectors: Vec<Box<dyn Detector>>,
}

impl Scanner {
    /// Creates a scanner with the default detector registry.
    pub fn new(settings: Settings) -> Scanner {
        Scanner {
            settings,
            detectors: registry(),
        }
    }

    /// Scans the source folder recursively and hands every detected
    /// instrument to the consumer. Hidden folders are skipped. A folder that
    /// fails analysis is logged and skipped without affecting its siblings.
    /// Returns the number of instruments delivered.
    pub fn scan(
        &self,
        source_folder: &Path,
        cancel_handle: CancelHandle,
        mut consumer: impl FnMut(MultisampleDescriptor),
    ) -> Result<usize, DetectError> {
        if !source_folder.is_dir() {
            return Err(DetectError::NotADirectory(source_folder.to_path_buf()));
        }
        let mut folders = Vec::new();
        collect_folders(source_folder, &mut folders);
        info!(
            folders = folders.len(),
            "Scanning for multisample instruments."
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .thread_name(|i| format!("msample-detect-{i}"))
            .build()?;

        let (sender, receiver) = bounded::<MultisampleDescriptor>(0);
        let mut delivered = 0;

        pool.in_place_scope(|scope| {
            for folder in &folders {
                let sender = sender.clone();
                let cancel_handle = cancel_handle.clone();
                let settings = &self.settings;
                let detectors = &self.detectors;

                scope.spawn(move |_| {
                    for detector in detectors {
                        if cancel_handle.is_cancelled() {
                            return;
                        }
                        let descriptors = match detector.analyze(
                            folder,
                            source_folder,
                            settings,
                            cancel_handle.clone(),
                        ) {
                            Ok(descriptors) => descriptors,
                            Err(e) => {
                                error!(
                                    err = e.to_string(),
                                    folder = folder.display().to_string(),
                                    "Error detecting multisamples."
                                );
                                continue;
                            }
                        };
                        for descriptor in descriptors {
                            if !deliver(&sender, &cancel_handle, descriptor) {
                                return;
                            }
                        }
                    }
                });
            }
            drop(sender);

            // Workers rendezvous with this loop, one descriptor at a time.
            for descriptor in receiver.iter() {
                delivered += 1;
                consumer(descriptor);
            }
        });

        Ok(delivered)
    }
}

/// Hands one descriptor to the consumer channel, waiting for the consumer to
/// become ready. Returns false when the scan is cancelled or the consumer is
/// gone.
fn deliver(
    sender: &Sender<MultisampleDescriptor>,
    cancel_handle: &CancelHandle,
    mut descriptor: MultisampleDescriptor,
) -> bool {
    loop {
        if cancel_handle.is_cancelled() {
            return false;
        }
        match sender.send_timeout(descriptor, DELIVERY_TICK) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => descriptor = returned,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

/// Collects the folder and all of its visible subfolders, depth first in
/// name order. A folder that cannot be listed is logged and skipped.
fn collect_folders(folder: &Path, folders: &mut Vec<PathBuf>) {
    folders.push(folder.to_path_buf());

    let entries = match fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                err = e.to_string(),
                folder = folder.display().to_string(),
                "Unable to list folder."
            );
            return;
        }
    };

    let mut children = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    err = e.to_string(),
                    folder = folder.display().to_string(),
                    "Unable to read folder entry."
                );
                continue;
            }
        };
        let is_dir = entry
            .file_type()
            .map(|file_type| file_type.is_dir())
            .unwrap_or(false);
        if !is_dir {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        children.push(entry.path());
    }
    children.sort();

    for child in children {
        collect_folders(&child, folders);
    }
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;

    use tempfile::tempdir;

    use crate::testutil;

    use super::*;

    #[test]
    fn test_scan_tree() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let source = dir.path();
        let piano = source.join("Piano");
        let broken = source.join("Broken");
        let hidden = source.join(".cache");
        fs::create_dir(&piano)?;
        fs::create_dir(&broken)?;
        fs::create_dir(&hidden)?;

        testutil::write_pitched_wav(&piano.join("Grand_C3.wav"), 1, 48)?;
        testutil::write_pitched_wav(&piano.join("Grand_F3.wav"), 1, 53)?;
        testutil::write_pitched_wav(&hidden.join("Ghost_C3.wav"), 1, 48)?;

        // A data chunk declaring 100 bytes with only 40 present.
        let mut bad: Vec<u8> = Vec::new();
        bad.extend_from_slice(b"RIFF");
        bad.extend_from_slice(&(4u32 + 8 + 100).to_le_bytes());
        bad.extend_from_slice(b"WAVE");
        bad.extend_from_slice(b"data");
        bad.extend_from_slice(&100u32.to_le_bytes());
        bad.extend_from_slice(&[0; 40]);
        fs::write(broken.join("bad.wav"), &bad)?;

        let scanner = Scanner::new(Settings::default());
        let mut names = Vec::new();
        let delivered = scanner.scan(source, CancelHandle::new(), |descriptor| {
            names.push(descriptor.name().to_string());
        })?;

        // The broken folder fails on its own, the hidden folder is skipped.
        assert_eq!(delivered, 1);
        assert_eq!(names, vec!["Grand"]);
        Ok(())
    }

    #[test]
    fn test_scan_not_a_directory() {
        let result = Scanner::new(Settings::default()).scan(
            Path::new("/this/does/not/exist"),
            CancelHandle::new(),
            |_| {},
        );
        assert!(matches!(result, Err(DetectError::NotADirectory(_))));
    }

    #[test]
    fn test_scan_cancelled() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let piano = dir.path().join("Piano");
        fs::create_dir(&piano)?;
        testutil::write_pitched_wav(&piano.join("Grand_C3.wav"), 1, 48)?;

        let cancel_handle = CancelHandle::new();
        cancel_handle.cancel();

        let delivered =
            Scanner::new(Settings::default()).scan(dir.path(), cancel_handle, |_| {})?;
        assert_eq!(delivered, 0);
        Ok(())
    }

    #[test]
    fn test_collect_folders_skips_hidden() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        fs::create_dir(dir.path().join("b"))?;
        fs::create_dir(dir.path().join("a"))?;
        fs::create_dir(dir.path().join("a").join("nested"))?;
        fs::create_dir(dir.path().join(".hidden"))?;

        let mut folders = Vec::new();
        collect_folders(dir.path(), &mut folders);

        let names: Vec<_> = folders
            .iter()
            .map(|folder| {
                folder
                    .strip_prefix(dir.path())
                    .map(|stripped| stripped.to_string_lossy().to_string())
                    .unwrap_or_default()
            })
            .collect();
        assert_eq!(names, vec!["", "a", "a/nested", "b"]);
        Ok(())
    }
}
