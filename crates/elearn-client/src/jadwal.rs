use elearn_types::api::JadwalKuliah;

use crate::client::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// The logged-in student's weekly timetable, Monday first and by start
    /// time within a day.
    pub async fn my_jadwal(&self) -> Result<Vec<JadwalKuliah>, ApiError> {
        let mut jadwal: Vec<JadwalKuliah> = self.get_list("/jadwal-kuliah/mahasiswa/me").await?;
        jadwal.sort_by_key(|j| (j.day_index(), j.jam_mulai));
        Ok(jadwal)
    }
}
