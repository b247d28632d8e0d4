use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use super::ChunkSource;
use crate::error::{HashError, HashResult};

/// A file on the local filesystem. The handle closes when this is dropped.
pub struct LocalSource {
    path: PathBuf,
    file: File,
}

impl LocalSource {
    pub fn open(path: &Path) -> HashResult<Self> {
        let file = File::open(path).map_err(|source| HashError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read_error(&self, offset: u64, source: io::Error) -> HashError {
        HashError::Read {
            location: self.location(),
            offset,
            source,
        }
    }
}

impl ChunkSource for LocalSource {
    fn total_size(&mut self) -> HashResult<u64> {
        let meta = self.file.metadata().map_err(|source| HashError::Stat {
            path: self.path.clone(),
            source,
        })?;
        Ok(meta.len())
    }

    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> HashResult<()> {
        let n = read_full_at(&self.file, offset, buf).map_err(|e| self.read_error(offset, e))?;
        if n != buf.len() {
            return Err(HashError::ShortRead {
                location: self.location(),
                offset,
                expected: buf.len(),
                actual: n,
            });
        }
        Ok(())
    }
}

/// Positioned read until `buf` is full or end of file; the handle's cursor
/// is left alone.
fn read_full_at(file: &File, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match read_at(file, &mut buf[filled..], offset + filled as u64) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}
