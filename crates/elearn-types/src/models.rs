use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::LoginResponse;

/// Profile returned by the backend at login.
///
/// Only `role` drives client behaviour; everything else is carried along
/// untouched. Fields the client does not model are kept in `extra` so a
/// stored profile round-trips without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub id_user: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nama: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Name to greet the user with: `nama` when the backend sent one.
    pub fn display_name(&self) -> &str {
        self.nama.as_deref().unwrap_or(&self.username)
    }

    /// Class of a student account, as sent by the mobile login.
    pub fn id_kelas(&self) -> Option<i64> {
        self.extra.get("id_kelas").and_then(Value::as_i64)
    }

    pub fn nama_kelas(&self) -> Option<&str> {
        self.extra.get("nama_kelas").and_then(Value::as_str)
    }
}

/// The authenticated identity bundle.
///
/// Either all four parts exist or there is no session at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
    pub role: String,
    pub username: String,
}

impl Session {
    pub fn from_login(resp: LoginResponse) -> Self {
        Self {
            token: resp.access_token,
            role: resp.user.role.clone(),
            username: resp.user.username.clone(),
            user: resp.user,
        }
    }
}
