//! Streaming content digests and directory digest composition.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use sha2::{Digest as _, Sha256};

use dirdigest_core::{Composition, Digest, DigestAlgorithm, DigestError};

/// Read buffer used when streaming file content into a digest context.
const READ_BUFFER_SIZE: usize = 128 * 1024;

/// One streaming digest context. Consumes bytes in order and finalizes once.
enum Context {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Context {
    fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha256 => Context::Sha256(Sha256::new()),
            DigestAlgorithm::Blake3 => Context::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Context::Sha256(h) => h.update(data),
            Context::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize(self) -> Digest {
        match self {
            Context::Sha256(h) => Digest::new(h.finalize().into()),
            Context::Blake3(h) => Digest::new(*h.finalize().as_bytes()),
        }
    }
}

impl Write for Context {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Computes leaf digests from content and directory digests from children.
///
/// Holds no state between calls beyond its configuration; every call uses
/// its own context, so one `Hasher` is shared freely across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher {
    algorithm: DigestAlgorithm,
    composition: Composition,
}

impl Hasher {
    /// Create a hasher for an algorithm and composition rule.
    pub fn new(algorithm: DigestAlgorithm, composition: Composition) -> Self {
        Self {
            algorithm,
            composition,
        }
    }

    /// Digest function in use.
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Composition rule in use.
    pub fn composition(&self) -> Composition {
        self.composition
    }

    /// Digest an in-memory byte sequence.
    pub fn digest_bytes(&self, data: &[u8]) -> Digest {
        let mut ctx = Context::new(self.algorithm);
        ctx.update(data);
        ctx.finalize()
    }

    /// Stream a reader to the end, returning the digest and the byte count.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> io::Result<(Digest, u64)> {
        let mut ctx = Context::new(self.algorithm);
        let read = io::copy(&mut reader, &mut ctx)?;
        Ok((ctx.finalize(), read))
    }

    /// Stream a file's full content through the digest function.
    ///
    /// The handle is released when this returns, on success or failure.
    pub fn digest_file(&self, path: &Path) -> Result<(Digest, u64), DigestError> {
        let file = File::open(path).map_err(|e| DigestError::io(path, e))?;
        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        self.digest_reader(reader).map_err(|e| DigestError::io(path, e))
    }

    /// Compose a directory digest from its children's digests, in order.
    ///
    /// No children yields the digest of the empty sequence.
    pub fn compose<'a, I>(&self, children: I) -> Digest
    where
        I: IntoIterator<Item = &'a Digest>,
    {
        let mut ctx = Context::new(self.algorithm);
        for child in children {
            match self.composition {
                Composition::RawBytes => ctx.update(child.as_bytes()),
                Composition::HexText => ctx.update(child.to_hex().as_bytes()),
            }
        }
        ctx.finalize()
    }
}
