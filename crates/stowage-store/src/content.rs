use std::fmt;
use std::io::{self, Read};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex digest identifying a value's content in the ledger.
///
/// Two writes of the same key with equal hashes are the same content; the
/// second one records nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// SHA-256 of an in-memory buffer.
    pub fn of(data: &[u8]) -> Self { Self(hex::encode(Sha256::digest(data))) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Reader that digests every byte passing through it.
///
/// Stores stream a value to its destination through this wrapper, so the
/// content is read once for both hashing and writing.
pub struct HashingReader<R, D = Sha256> {
    reader: R,
    digest: D,
    read:   u64,
}

impl<R> HashingReader<R, Sha256> {
    pub fn new(reader: R) -> Self { Self::with_digest(reader, Sha256::new()) }
}

impl<R, D: Digest> HashingReader<R, D> {
    pub fn with_digest(reader: R, digest: D) -> Self {
        Self {
            reader,
            digest,
            read: 0,
        }
    }

    /// Number of bytes that have passed through so far.
    pub fn bytes_read(&self) -> u64 { self.read }

    /// Consume the reader and return the hash of everything read.
    pub fn finish(self) -> ContentHash { ContentHash(hex::encode(self.digest.finalize())) }
}

impl<R: Read, D: Digest> Read for HashingReader<R, D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.digest.update(&buf[..n]);
            self.read += n as u64;
        }
        Ok(n)
    }
}
