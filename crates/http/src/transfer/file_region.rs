use std::fs::File;

use tracing::trace;

/// A window of an open file, to be written to a transport without copying.
///
/// The region owns the file. It is closed by [`FileRegion::release`], or when the region is
/// dropped, whichever happens first.
#[derive(Debug)]
pub struct FileRegion {
    file: Option<File>,
    position: u64,
    count: u64,
    transferred: u64,
}

impl FileRegion {
    pub fn new(file: File, position: u64, count: u64) -> Self {
        Self { file: Some(file), position, count, transferred: 0 }
    }

    /// Offset of the first byte of the window.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Number of bytes in the window.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.count - self.transferred
    }

    /// The open file, `None` once released.
    pub fn file(&self) -> Option<&File> {
        self.file.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.file.is_none()
    }

    /// Closes the file. Returns false when it was already released.
    pub fn release(&mut self) -> bool {
        match self.file.take() {
            Some(file) => {
                drop(file);
                trace!(position = self.position, count = self.count, transferred = self.transferred, "released file region");
                true
            }
            None => false,
        }
    }

    pub(crate) fn advance(&mut self, n: u64) {
        self.transferred = (self.transferred + n).min(self.count);
    }
}

impl Drop for FileRegion {
    fn drop(&mut self) {
        self.release();
    }
}
