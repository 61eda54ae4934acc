//! Outbound attachment payloads.

/// In-memory file handed to the transport.
#[derive(Clone, PartialEq, Eq)]
pub struct FileData {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileData {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

impl std::fmt::Debug for FileData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileData")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Photo to send, with an optional caption (empty string for none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoConfig {
    pub file: FileData,
    pub caption: String,
}

impl PhotoConfig {
    pub fn new(file: FileData, caption: impl Into<String>) -> Self {
        Self {
            file,
            caption: caption.into(),
        }
    }
}

/// Generic file to send, with an optional caption (empty string for none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    pub file: FileData,
    pub caption: String,
}

impl DocumentConfig {
    pub fn new(file: FileData, caption: impl Into<String>) -> Self {
        Self {
            file,
            caption: caption.into(),
        }
    }
}
