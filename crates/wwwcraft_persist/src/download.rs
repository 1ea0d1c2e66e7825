use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Hands a file to the user, the way a browser offers a download.
pub trait DownloadSink {
    fn offer(&mut self, file_name: &str, mime_type: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Drops offered files into a downloads directory.
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl DownloadSink for DirectoryDownloads {
    fn offer(&mut self, file_name: &str, _mime_type: &str, bytes: &[u8]) -> io::Result<()> {
        if file_name.contains(|ch| ch == '/' || ch == '\\') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing download name with a path separator: {file_name}"),
            ));
        }
        fs::create_dir_all(&self.dir)?;
        fs::write(self.file_path(file_name), bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps offered files in memory.
#[derive(Debug, Default)]
pub struct RecordedDownloads {
    pub offered: Vec<OfferedFile>,
}

impl DownloadSink for RecordedDownloads {
    fn offer(&mut self, file_name: &str, mime_type: &str, bytes: &[u8]) -> io::Result<()> {
        self.offered.push(OfferedFile {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DirectoryDownloads, DownloadSink};
    use crate::test_support::scratch_dir;

    #[test]
    fn directory_downloads_write_named_file() {
        let dir = scratch_dir("downloads");
        let mut downloads = DirectoryDownloads::new(&dir);

        downloads
            .offer("index.wwwCraft.json", "application/json", b"{}")
            .expect("offer file");
        let written = std::fs::read(downloads.file_path("index.wwwCraft.json"))
            .expect("read offered file");
        assert_eq!(written, b"{}");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn rejects_names_with_separators() {
        let dir = scratch_dir("downloads-bad");
        let mut downloads = DirectoryDownloads::new(&dir);
        let err = downloads
            .offer("../index.json", "application/json", b"{}")
            .expect_err("path separator must be rejected");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
