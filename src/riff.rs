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
use std::io::{self, Read, Write};

/// The signature every container starts with.
const RIFF_SIGNATURE: [u8; 4] = *b"RIFF";

/// Errors produced by the container codec.
#[derive(Debug, thiserror::Error)]
pub enum RiffError {
    /// The container is corrupt or truncated.
    #[error("Malformed container: {reason}")]
    MalformedContainer { reason: String },
    /// The underlying byte source or sink failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl RiffError {
    fn malformed(reason: impl Into<String>) -> RiffError {
        RiffError::MalformedContainer {
            reason: reason.into(),
        }
    }
}

/// A four character chunk tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChunkId([u8; 4]);

impl ChunkId {
    /// Creates a chunk ID from its four tag bytes.
    pub const fn new(id: [u8; 4]) -> ChunkId {
        ChunkId(id)
    }

    /// Gets the raw tag bytes.
    pub fn bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, ".")?;
            }
        }
        Ok(())
    }
}

/// A single tagged chunk: a four byte tag and its payload. The on disk form
/// additionally carries a little endian length and a pad byte when the
/// payload length is odd.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Chunk {
    /// The chunk tag.
    id: ChunkId,
    /// The payload, exactly as many bytes as the stored length declares.
    data: Vec<u8>,
}

impl Chunk {
    /// Creates a new chunk.
    pub fn new(id: ChunkId, data: Vec<u8>) -> Chunk {
        Chunk { id, data }
    }

    /// Gets the chunk tag.
    pub fn id(&self) -> ChunkId {
        self.id
    }

    /// Gets the payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Gets the payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The number of bytes this chunk occupies on disk, including the tag,
    /// the length field, and the pad byte for odd payloads.
    fn stored_len(&self) -> u32 {
        8 + self.data.len() as u32 + (self.data.len() as u32 & 1)
    }
}

/// A parsed container: the form type plus its chunks in stored order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RiffFile {
    /// The form type following the container size, e.g. WAVE.
    form_type: ChunkId,
    /// The chunks in the order they appear in the container.
    chunks: Vec<Chunk>,
}

impl RiffFile {
    /// Creates a container from a form type and its chunks.
    pub fn new(form_type: ChunkId, chunks: Vec<Chunk>) -> RiffFile {
        RiffFile { form_type, chunks }
    }

    /// Gets the form type.
    pub fn form_type(&self) -> ChunkId {
        self.form_type
    }

    /// Gets all chunks in stored order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Gets the first chunk with the given tag, if any.
    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.id == id)
    }

    /// Reads a container from the given byte source. Chunks are consumed
    /// until the declared container length is exhausted. A chunk whose
    /// declared length exceeds the bytes actually available is an error,
    /// never silently truncated.
    pub fn read(reader: &mut impl Read) -> Result<RiffFile, RiffError> {
        let signature = read_array(reader, "container signature")?;
        if signature != RIFF_SIGNATURE {
            return Err(RiffError::malformed(format!(
                "expected RIFF signature, found \"{}\"",
                ChunkId(signature)
            )));
        }

        let total_size = read_u32(reader, "container size")?;
        if total_size < 4 {
            return Err(RiffError::malformed(format!(
                "container size {} cannot hold a form type",
                total_size
            )));
        }
        let form_type = ChunkId(read_array(reader, "form type")?);

        let mut chunks: Vec<Chunk> = Vec::new();
        // The form type is counted in the container size.
        let mut remaining = total_size - 4;
        while remaining > 0 {
            if remaining < 8 {
                return Err(RiffError::malformed(format!(
                    "{} trailing bytes cannot hold a chunk header",
                    remaining
                )));
            }

            let id = ChunkId(read_array(reader, "chunk tag")?);
            let declared = read_u32(reader, "chunk length")?;
            remaining -= 8;

            if declared > remaining {
                return Err(RiffError::malformed(format!(
                    "chunk \"{}\" declares {} bytes but only {} remain in the container",
                    id, declared, remaining
                )));
            }

            // The declared length is untrusted until the bytes are in hand.
            let mut data = Vec::new();
            reader
                .take(declared as u64)
                .read_to_end(&mut data)
                .map_err(RiffError::Io)?;
            if data.len() != declared as usize {
                return Err(RiffError::malformed(format!(
                    "chunk \"{}\" declares {} bytes but only {} are available",
                    id,
                    declared,
                    data.len()
                )));
            }
            remaining -= declared;

            // Odd payloads are followed by a pad byte.
            if declared & 1 == 1 {
                if remaining == 0 {
                    return Err(RiffError::malformed(format!(
                        "chunk \"{}\" is missing its pad byte",
                        id
                    )));
                }
                read_array::<1>(reader, "pad byte")?;
                remaining -= 1;
            }

            chunks.push(Chunk { id, data });
        }

        Ok(RiffFile { form_type, chunks })
    }

    /// Serializes the container. The container size field is recomputed and
    /// a zero pad byte is emitted after every odd length payload, so reading
    /// a well formed container and writing it back reproduces the input
    /// byte for byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let total_size: u32 = 4 + self
            .chunks
            .iter()
            .map(|chunk| chunk.stored_len())
            .sum::<u32>();

        let mut out = Vec::with_capacity(8 + total_size as usize);
        out.extend_from_slice(&RIFF_SIGNATURE);
        out.extend_from_slice(&total_size.to_le_bytes());
        out.extend_from_slice(&self.form_type.0);
        for chunk in self.chunks.iter() {
            out.extend_from_slice(&chunk.id.0);
            out.extend_from_slice(&(chunk.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&chunk.data);
            if chunk.data.len() & 1 == 1 {
                out.push(0);
            }
        }
        out
    }

    /// Writes the container to the given sink.
    pub fn write(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(&self.to_bytes())
    }
}

/// Reads exactly N bytes, turning a premature end of data into a malformed
/// container error naming what was being read.
fn read_array<const N: usize>(reader: &mut impl Read, what: &str) -> Result<[u8; N], RiffError> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            RiffError::malformed(format!("unexpected end of data while reading {}", what))
        } else {
            RiffError::Io(e)
        }
    })?;
    Ok(buf)
}

fn read_u32(reader: &mut impl Read, what: &str) -> Result<u32, RiffError> {
    Ok(u32::from_le_bytes(read_array(reader, what)?))
}

#[cfg(test)]
mod test {
    use super::*;

    fn container(chunks: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut body: Vec<u8> = Vec::new();
        body.extend_from_slice(b"WAVE");
        for (id, data) in chunks {
            body.extend_from_slice(*id);
            body.extend_from_slice(&(data.len() as u32).to_le_bytes());
            body.extend_from_slice(data);
            if data.len() % 2 == 1 {
                body.push(0);
            }
        }

        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&body);
        bytes
    }

    #[test]
    fn test_read_chunks() {
        let bytes = container(&[(b"fmt ", &[1, 2, 3, 4]), (b"data", &[5, 6, 7, 8, 9, 10])]);

        let riff = RiffFile::read(&mut bytes.as_slice()).expect("expected parse to succeed");
        assert_eq!(riff.form_type(), ChunkId::new(*b"WAVE"));
        assert_eq!(riff.chunks().len(), 2);
        assert_eq!(riff.chunks()[0].id(), ChunkId::new(*b"fmt "));
        assert_eq!(riff.chunks()[0].data(), &[1, 2, 3, 4]);
        assert_eq!(riff.chunks()[1].id(), ChunkId::new(*b"data"));
        assert_eq!(riff.chunks()[1].len(), 6);
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let bytes = container(&[
            (b"fmt ", &[0; 16]),
            (b"odd ", &[1, 2, 3]),
            (b"data", &[9; 10]),
        ]);

        let riff = RiffFile::read(&mut bytes.as_slice()).expect("expected parse to succeed");
        assert_eq!(riff.to_bytes(), bytes);
    }

    #[test]
    fn test_odd_length_pad_byte() {
        let bytes = container(&[(b"odd ", &[1, 2, 3]), (b"next", &[4, 4])]);

        let riff = RiffFile::read(&mut bytes.as_slice()).expect("expected parse to succeed");
        // The pad byte is consumed, not folded into the payload.
        assert_eq!(riff.chunks()[0].data(), &[1, 2, 3]);
        assert_eq!(riff.chunks()[1].data(), &[4, 4]);

        // And the writer emits it again.
        let written = riff.to_bytes();
        assert_eq!(written, bytes);
    }

    #[test]
    fn test_bad_signature() {
        let mut bytes = container(&[(b"fmt ", &[0; 16])]);
        bytes[0..4].copy_from_slice(b"RIFX");

        match RiffFile::read(&mut bytes.as_slice()) {
            Err(RiffError::MalformedContainer { reason }) => {
                assert!(reason.contains("RIFF"), "unexpected reason: {}", reason)
            }
            other => panic!("expected malformed container, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_chunk() {
        // A data chunk declaring 100 bytes with only 40 available.
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(4u32 + 8 + 100).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 40]);

        match RiffFile::read(&mut bytes.as_slice()) {
            Err(RiffError::MalformedContainer { reason }) => {
                assert!(reason.contains("100"), "unexpected reason: {}", reason)
            }
            other => panic!("expected malformed container, got {:?}", other),
        }
    }

    #[test]
    fn test_declared_length_beyond_container() {
        // The chunk length field exceeds what the container size allows.
        let mut bytes: Vec<u8> = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&12u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&1000u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 1000]);

        match RiffFile::read(&mut bytes.as_slice()) {
            Err(RiffError::MalformedContainer { .. }) => {}
            other => panic!("expected malformed container, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_header() {
        let bytes = b"RIFF\x04\x00".to_vec();

        match RiffFile::read(&mut bytes.as_slice()) {
            Err(RiffError::MalformedContainer { reason }) => {
                assert!(
                    reason.contains("container size"),
                    "unexpected reason: {}",
                    reason
                )
            }
            other => panic!("expected malformed container, got {:?}", other),
        }
    }

    #[test]
    fn test_find_chunk() {
        let bytes = container(&[(b"fmt ", &[0; 16]), (b"data", &[1, 2])]);
        let riff = RiffFile::read(&mut bytes.as_slice()).expect("expected parse to succeed");

        assert!(riff.chunk(ChunkId::new(*b"data")).is_some());
        assert!(riff.chunk(ChunkId::new(*b"smpl")).is_none());
    }

    #[test]
    fn test_chunk_id_display() {
        assert_eq!(ChunkId::new(*b"fmt ").to_string(), "fmt ");
        assert_eq!(ChunkId::new([0x64, 0x61, 0x74, 0x00]).to_string(), "dat.");
    }
}
