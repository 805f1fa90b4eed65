use uuid::Uuid;

/// Thin client for the external blob-storage service: it only mints upload
/// URLs and derives public file URLs. Bytes never pass through this process.
#[derive(Debug, Clone)]
pub struct FileStorage {
    upload_base_url: String,
    public_base_url: String,
}

impl FileStorage {
    pub fn new(upload_base_url: &str, public_base_url: &str) -> Self {
        Self {
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn issue_upload(&self) -> (Uuid, String) {
        let file_id = Uuid::new_v4();
        let upload_url = format!("{}/upload/{file_id}", self.upload_base_url);
        (file_id, upload_url)
    }

    pub fn file_url(&self, file_id: Uuid) -> String {
        format!("{}/files/{file_id}", self.public_base_url)
    }
}
