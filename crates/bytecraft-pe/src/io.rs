//! Sources and sinks for complete binary images.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

/// Anything that can yield the complete byte contents of an image.
pub trait Readable {
    fn read_bytes(self) -> io::Result<Vec<u8>>;
}

/// Anything that can persist a complete byte buffer.
pub trait Writable {
    fn write_bytes(self, data: &[u8]) -> io::Result<()>;
}

impl Readable for Vec<u8> {
    fn read_bytes(self) -> io::Result<Vec<u8>> {
        Ok(self)
    }
}

impl Readable for &[u8] {
    fn read_bytes(self) -> io::Result<Vec<u8>> {
        Ok(self.to_vec())
    }
}

impl Readable for &Path {
    fn read_bytes(self) -> io::Result<Vec<u8>> {
        fs::read(self)
    }
}

impl Readable for PathBuf {
    fn read_bytes(self) -> io::Result<Vec<u8>> {
        fs::read(self)
    }
}

/// A path on disk.
impl Readable for &str {
    fn read_bytes(self) -> io::Result<Vec<u8>> {
        fs::read(self)
    }
}

impl Readable for File {
    fn read_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Reads everything remaining in a stream (`Cursor`, `BufReader`, `Stdin` locks, ...).
impl<R: Read + ?Sized> Readable for &mut R {
    fn read_bytes(self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.read_to_end(&mut data)?;
        Ok(data)
    }
}

impl Writable for &Path {
    fn write_bytes(self, data: &[u8]) -> io::Result<()> {
        fs::write(self, data)
    }
}

impl Writable for PathBuf {
    fn write_bytes(self, data: &[u8]) -> io::Result<()> {
        fs::write(self, data)
    }
}

/// A path on disk.
impl Writable for &str {
    fn write_bytes(self, data: &[u8]) -> io::Result<()> {
        fs::write(self, data)
    }
}

impl Writable for File {
    fn write_bytes(mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data)
    }
}

impl<W: Write> Writable for BufWriter<W> {
    fn write_bytes(mut self, data: &[u8]) -> io::Result<()> {
        self.write_all(data)?;
        self.flush()
    }
}

/// Appends to any writer (`Vec<u8>`, `Cursor`, an open `File`, ...).
impl<W: Write + ?Sized> Writable for &mut W {
    fn write_bytes(self, data: &[u8]) -> io::Result<()> {
        self.write_all(data)
    }
}
