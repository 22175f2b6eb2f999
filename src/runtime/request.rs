use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub field_name: String,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
    pub stored_path: String,
}

/// Per-request state handed explicitly to handlers.
///
/// Every field is optional; a fresh context carries nothing. The CSRF secret
/// never appears in `Debug` output or serialized form.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_file: Option<UploadedFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_files: Option<Vec<UploadedFile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing)]
    pub csrf_secret: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uploaded_file(mut self, file: UploadedFile) -> Self {
        self.uploaded_file = Some(file);
        self
    }

    pub fn with_uploaded_files(mut self, files: Vec<UploadedFile>) -> Self {
        self.uploaded_files = Some(files);
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_csrf_secret(mut self, secret: impl Into<String>) -> Self {
        self.csrf_secret = Some(secret.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// The single upload first, then the list.
    pub fn all_uploads(&self) -> impl Iterator<Item = &UploadedFile> {
        self.uploaded_file
            .iter()
            .chain(self.uploaded_files.iter().flatten())
    }

    pub fn total_upload_size(&self) -> u64 {
        self.all_uploads().map(|f| f.size).sum()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("uploaded_file", &self.uploaded_file)
            .field("uploaded_files", &self.uploaded_files)
            .field("user_id", &self.user_id)
            .field(
                "csrf_secret",
                &self.csrf_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
