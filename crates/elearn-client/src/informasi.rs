use std::path::Path;

use elearn_types::api::{Informasi, UploadedImage};

use crate::client::ApiClient;
use crate::error::ApiError;

pub const DEFAULT_LIST_LIMIT: u32 = 20;

impl ApiClient {
    /// Announcements visible to the current user, newest and highest
    /// priority first as ordered by the backend.
    pub async fn list_informasi(&self, limit: u32) -> Result<Vec<Informasi>, ApiError> {
        self.get_list(&format!("/api/informasi/mobile/list?limit={}", limit))
            .await
    }

    pub async fn informasi_detail(&self, id: i64) -> Result<Informasi, ApiError> {
        self.get(&format!("/api/informasi/mobile/{}", id)).await
    }

    pub async fn upload_informasi_image(&self, path: &Path) -> Result<UploadedImage, ApiError> {
        self.upload_file("/api/informasi/upload-gambar", "file", path)
            .await
    }
}
