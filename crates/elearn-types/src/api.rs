use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::UserProfile;

// -- Auth --

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: UserProfile,
}

// -- Notifications --

#[derive(Debug, Serialize)]
pub struct DeviceTokenRequest {
    pub fcm_token: String,
}

#[derive(Debug, Deserialize)]
pub struct DeviceTokenResponse {
    pub message: String,
    #[serde(default)]
    pub firebase_active: bool,
    pub id_device: Option<i64>,
}

// -- Informasi --

/// Announcement as served to the mobile app.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Informasi {
    pub id: i64,
    pub judul: String,
    pub deskripsi: String,
    #[serde(default)]
    pub gambar_url: Option<String>,
    #[serde(default)]
    pub priority: i32,
    /// Backend timestamps carry no offset.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Response of the image upload route; `url` is server-relative.
#[derive(Debug, Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

// -- Materi --

/// Course material for one class and week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Materi {
    pub id_materi: i64,
    pub kode_mk: String,
    pub id_kelas: i64,
    pub minggu: i32,
    pub judul: String,
    #[serde(default)]
    pub deskripsi: Option<String>,
    #[serde(default)]
    pub nama_mk: Option<String>,
    #[serde(default)]
    pub nama_dosen: Option<String>,
    #[serde(default)]
    pub file_pdf: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub tanggal_upload: Option<NaiveDateTime>,
}

// -- Jadwal kuliah --

/// Weekday names as the backend writes them, Monday first.
pub const HARI: [&str; 7] = ["Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu"];

/// One weekly lecture slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JadwalKuliah {
    pub id_jadwal: i64,
    pub id_kelas_mk: i64,
    pub hari: String,
    #[serde(default)]
    pub jam_mulai: Option<NaiveTime>,
    #[serde(default)]
    pub jam_selesai: Option<NaiveTime>,
    #[serde(default)]
    pub ruangan: Option<String>,
    #[serde(default)]
    pub kode_mk: Option<String>,
    #[serde(default)]
    pub nama_mk: Option<String>,
    #[serde(default)]
    pub nama_kelas: Option<String>,
    #[serde(default)]
    pub nama_dosen: Option<String>,
}

impl JadwalKuliah {
    /// Position of `hari` in the week; unknown names sort after Sunday.
    pub fn day_index(&self) -> usize {
        HARI.iter()
            .position(|d| d.eq_ignore_ascii_case(self.hari.trim()))
            .unwrap_or(HARI.len())
    }
}

// -- Errors --

/// One entry of a 422 response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationIssue {
    /// Path to the offending field; segments are strings or list indices.
    #[serde(default)]
    pub loc: Option<Vec<Value>>,
    pub msg: String,
}

impl ValidationIssue {
    /// `body.judul: field required`, or `unknown: ...` when no path was sent.
    pub fn describe(&self) -> String {
        let field = match &self.loc {
            Some(loc) => loc
                .iter()
                .map(|seg| match seg {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("."),
            None => "unknown".to_string(),
        };
        format!("{}: {}", field, self.msg)
    }
}

/// Error body shape shared by every backend route.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Issues(Vec<ValidationIssue>),
    Text(String),
    Other(Value),
}

impl ErrorDetail {
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Issues(_) => None,
            Self::Other(v) => Some(v.to_string()),
        }
    }
}
