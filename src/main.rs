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
use std::error::Error;
use std::path::{Path, PathBuf};
use std::{fs, io};

use clap::{crate_version, Parser, Subcommand};
use tracing::error;

use msample::cancel::CancelHandle;
use msample::config::load_or_default;
use msample::detector::Scanner;
use msample::multisample::MultisampleDescriptor;
use msample::wav::{WavError, WaveFile};

const EXAMPLE_SETTINGS: &str = r#"
# Velocity layer markers, from the softest layer to the loudest.
group_patterns: ["soft", "medium", "loud"]
ascending: true

# Markers identifying the left and right halves of a mono split pair.
mono_split_patterns:
  - { left: "_L", right: "_R" }
  - { left: "-L", right: "-R" }

# Texts stripped once from the end of a derived instrument name.
postfix_texts: [" Samples", " Multisamples"]

# Crossfade widths in semitones and velocity steps.
crossfade_notes: 2
crossfade_velocities: 16

# Prefer the folder name over a name derived from the sample file names.
prefer_folder_name: false
"#;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A multisample instrument detector."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scans a folder tree for multisample instruments.
    Scan {
        /// The path to the sample library folder.
        folder: String,
        /// The path to the detection settings file.
        #[arg[short, long]]
        config: Option<String>,
        /// Prints one line per instrument instead of the full layout.
        #[arg[short, long]]
        quiet: bool,
    },
    /// Prints the chunks and metadata of wave files.
    Chunks {
        /// The path to a wave file or a folder of wave files.
        path: String,
    },
    /// Prints an example settings file to stdout.
    Config {},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            folder,
            config,
            quiet,
        } => {
            let settings = load_or_default(config.as_deref().map(Path::new))?;
            let scanner = Scanner::new(settings);

            let cancel_handle = CancelHandle::new();
            let scan_handle = cancel_handle.clone();
            let source = PathBuf::from(&folder);
            let mut scan = tokio::task::spawn_blocking(move || {
                scanner.scan(&source, scan_handle, |descriptor| {
                    if quiet {
                        println!("- {}", descriptor);
                    } else {
                        print_descriptor(&descriptor);
                    }
                })
            });

            let count = tokio::select! {
                result = &mut scan => result??,
                signal = tokio::signal::ctrl_c() => {
                    if let Err(e) = signal {
                        error!(err = e.to_string(), "Error receiving signal");
                    }
                    cancel_handle.cancel();
                    (&mut scan).await??
                }
            };

            if count == 0 {
                println!("No multisample instruments found in {}.", folder);
            } else {
                println!("Instruments detected: {}.", count);
            }
        }
        Commands::Chunks { path } => {
            let path = PathBuf::from(&path);
            let mut paths = Vec::new();
            if path.is_dir() {
                collect_wave_paths(&path, &mut paths)?;
            } else {
                paths.push(path);
            }

            if paths.is_empty() {
                println!("No wave files found.");
                return Ok(());
            }

            for path in paths {
                if let Err(e) = print_chunks(&path) {
                    println!("Error reading {}: {}", path.display(), e);
                }
                println!();
            }
        }
        Commands::Config {} => {
            println!("{}", EXAMPLE_SETTINGS)
        }
    }

    Ok(())
}

/// Prints one detected instrument with its groups and zones.
fn print_descriptor(descriptor: &MultisampleDescriptor) {
    println!("{}", descriptor);
    println!("  Path: {}", descriptor.path_parts().join("/"));
    for group in descriptor.groups() {
        if group.is_default() {
            println!("  Zones:");
        } else {
            println!("  Group \"{}\":", group.name());
        }
        for zone in group.zones() {
            println!("  - {}", zone);
        }
    }
    println!();
}

/// Prints the chunk listing and decoded metadata of one wave file.
fn print_chunks(path: &Path) -> Result<(), WavError> {
    let wave = WaveFile::open(path)?;

    println!("{}:", path.display());
    for chunk in wave.riff().chunks() {
        println!("- {} ({} bytes)", chunk.id(), chunk.len());
    }
    println!("Format: {}", wave.format());
    println!("Frames: {}", wave.frames());
    if let Some(sample) = wave.sample() {
        println!(
            "Unity note: {} ({} cents)",
            sample.unity_note(),
            sample.pitch_fraction_cents()
        );
        for sample_loop in sample.loops() {
            println!("Loop: {}..{}", sample_loop.start(), sample_loop.end());
        }
    }
    if let Some(instrument) = wave.instrument() {
        println!(
            "Instrument note: {} (fine tune: {} cents)",
            instrument.unshifted_note(),
            instrument.fine_tune()
        );
    }
    Ok(())
}

/// Collects every wave file under the folder, sorted by name.
fn collect_wave_paths(folder: &Path, paths: &mut Vec<PathBuf>) -> Result<(), io::Error> {
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(folder)? {
        entries.push(entry?.path());
    }
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            collect_wave_paths(&entry, paths)?;
            continue;
        }
        let is_wav = entry
            .extension()
            .map(|extension| extension.eq_ignore_ascii_case("wav"))
            .unwrap_or(false);
        if is_wav {
            paths.push(entry);
        }
    }
    Ok(())
}
