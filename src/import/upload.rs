use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Uploaded CSV bytes staged on local disk for the lifetime of one import.
///
/// The file is removed by [`StagedUpload::discard`] or, failing that, on drop.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    original_name: Option<String>,
    size: u64,
}

impl StagedUpload {
    /// Creates an empty staging file under `dir`, creating the directory if needed
    pub fn create_in(dir: &Path, original_name: Option<String>) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let file = tempfile::Builder::new()
            .prefix("csv-upload-")
            .suffix(".csv")
            .tempfile_in(dir)?;
        debug!(path = %file.path().display(), "staging upload");
        Ok(Self {
            file,
            original_name,
            size: 0,
        })
    }

    /// Stages an in-memory payload; used by callers that already hold the bytes
    pub fn from_bytes(dir: &Path, bytes: &[u8]) -> io::Result<Self> {
        let mut upload = Self::create_in(dir, None)?;
        upload.write_chunk(bytes)?;
        upload.finish()?;
        Ok(upload)
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk)?;
        self.size += chunk.len() as u64;
        Ok(())
    }

    /// Flushes buffered writes before the file is read back
    pub fn finish(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    /// Opens an independent read handle positioned at the start of the file
    pub fn open(&self) -> io::Result<File> {
        self.file.reopen()
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Removes the staged file
    pub fn discard(self) {
        let path = self.file.path().to_path_buf();
        if let Err(err) = self.file.close() {
            warn!(path = %path.display(), error = %err, "failed to remove staged upload");
        } else {
            debug!(path = %path.display(), "staged upload removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn staged_bytes_read_back_and_are_removed() {
        let dir = TempDir::new().unwrap();
        let mut upload = StagedUpload::create_in(dir.path(), Some("stock.csv".into())).unwrap();
        upload.write_chunk(b"barcode,name\n").unwrap();
        upload.write_chunk(b"A1,Widget\n").unwrap();
        upload.finish().unwrap();

        let mut contents = String::new();
        upload.open().unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "barcode,name\nA1,Widget\n");
        assert_eq!(upload.size(), contents.len() as u64);
        assert_eq!(upload.original_name(), Some("stock.csv"));

        let path = upload.path().to_path_buf();
        assert!(path.exists());
        upload.discard();
        assert!(!path.exists());
    }

    #[test]
    fn missing_upload_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("uploads").join("csv");
        let upload = StagedUpload::from_bytes(&nested, b"x").unwrap();
        assert!(upload.path().starts_with(&nested));
        upload.discard();
    }
}
