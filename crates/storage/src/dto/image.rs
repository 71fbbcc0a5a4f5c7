use uuid::Uuid;

use crate::error::{Result, StorageError};

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("avif", "image/avif"),
];

/// An image picked from the user's device, ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    extension: String,
    content_type: &'static str,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Accepts image files only, judged by extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        let content_type = IMAGE_TYPES
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, content_type)| *content_type)
            .ok_or_else(|| {
                StorageError::InvalidObject(format!("{} is not a supported image", file_name))
            })?;

        if bytes.is_empty() {
            return Err(StorageError::InvalidObject(format!("{} is empty", file_name)));
        }

        Ok(Self {
            file_name,
            extension,
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Fresh random object path keeping the original extension.
    /// Collisions are not checked for.
    pub fn object_path(&self) -> String {
        format!("{}.{}", Uuid::new_v4(), self.extension)
    }
}
