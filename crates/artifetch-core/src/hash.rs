//! Hash registry: algorithm name -> fresh digest accumulator.

use digest::DynDigest;
use std::fmt;
use std::io;

/// Supported checksum algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashKind {
    pub const ALL: [HashKind; 4] = [
        HashKind::Md5,
        HashKind::Sha1,
        HashKind::Sha256,
        HashKind::Sha512,
    ];

    /// Looks up an algorithm by name, ignoring ASCII case. `None` means the
    /// name is not one we can verify with.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        HashKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            HashKind::Md5 => "md5",
            HashKind::Sha1 => "sha1",
            HashKind::Sha256 => "sha256",
            HashKind::Sha512 => "sha512",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashKind::Md5 => 16,
            HashKind::Sha1 => 20,
            HashKind::Sha256 => 32,
            HashKind::Sha512 => 64,
        }
    }

    /// Returns a new accumulator. Each call is independent of every other.
    pub fn hasher(self) -> Hasher {
        let inner: Box<dyn DynDigest + Send> = match self {
            HashKind::Md5 => Box::new(md5::Md5::default()),
            HashKind::Sha1 => Box::new(sha1::Sha1::default()),
            HashKind::Sha256 => Box::new(sha2::Sha256::default()),
            HashKind::Sha512 => Box::new(sha2::Sha512::default()),
        };
        Hasher { kind: self, inner }
    }
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A running digest. Also implements `io::Write` so it can sit at the end
/// of `io::copy`.
pub struct Hasher {
    kind: HashKind,
    inner: Box<dyn DynDigest + Send>,
}

impl Hasher {
    pub fn kind(&self) -> HashKind {
        self.kind
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> Vec<u8> {
        self.inner.finalize().into_vec()
    }
}

impl fmt::Debug for Hasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hasher").field("kind", &self.kind).finish()
    }
}

impl io::Write for Hasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fresh accumulator for `name`, or `None` when the algorithm is unknown.
/// Callers treat `None` as "verification unsupported", not as a failure.
pub fn hash_for_type(name: &str) -> Option<Hasher> {
    HashKind::from_name(name).map(HashKind::hasher)
}
