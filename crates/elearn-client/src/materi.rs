use elearn_types::api::Materi;

use crate::client::ApiClient;
use crate::error::ApiError;

const NO_CLASS: &str = "Akun ini belum terdaftar di kelas mana pun";

impl ApiClient {
    /// All materials published for a class.
    pub async fn list_materi(&self, id_kelas: i64) -> Result<Vec<Materi>, ApiError> {
        self.get_list(&format!("/materi/?id_kelas={}", id_kelas)).await
    }

    /// Materials for the logged-in student's own class.
    pub async fn my_materi(&self) -> Result<Vec<Materi>, ApiError> {
        let id_kelas = self
            .session()
            .user()
            .map_err(ApiError::storage)?
            .and_then(|user| user.id_kelas())
            .ok_or_else(|| ApiError::Validation(NO_CLASS.to_string()))?;
        self.list_materi(id_kelas).await
    }
}
