use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Data payload of a push notification.
///
/// Push providers deliver every value as a string, so this is a flat
/// string map. The `type` key carries the category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationData(pub HashMap<String, String>);

impl NotificationData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `type` field, if the sender set a non-empty one.
    pub fn category(&self) -> Option<&str> {
        self.get("type").filter(|t| !t.is_empty())
    }
}

/// Visible part of a push notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// A push message as handed over by the messaging SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    #[serde(default)]
    pub notification: Option<NotificationContent>,
    #[serde(default)]
    pub data: NotificationData,
}

/// Screen a notification leads to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", content = "params")]
pub enum Destination {
    /// A single announcement
    InformasiDetail { id: i64 },

    /// All announcements
    InformasiList,

    /// Attendance history
    RiwayatPresensi,

    /// Course materials, optionally for one course code
    DaftarMateri { kode_mk: Option<String> },

    Home,
}

impl Destination {
    pub fn screen_name(&self) -> &'static str {
        match self {
            Self::InformasiDetail { .. } => "InformasiDetail",
            Self::InformasiList => "InformasiList",
            Self::RiwayatPresensi => "RiwayatPresensi",
            Self::DaftarMateri { .. } => "DaftarMateri",
            Self::Home => "Home",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InformasiDetail { id } => write!(f, "{} (id={})", self.screen_name(), id),
            Self::DaftarMateri { kode_mk: Some(kode) } => {
                write!(f, "{} (kode_mk={})", self.screen_name(), kode)
            }
            _ => f.write_str(self.screen_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_message_without_data_is_empty() {
        let msg: PushMessage =
            serde_json::from_str(r#"{"notification":{"title":"Halo"}}"#).unwrap();
        assert_eq!(msg.data.category(), None);
        assert_eq!(msg.notification.unwrap().title.as_deref(), Some("Halo"));
    }

    #[test]
    fn empty_type_is_no_category() {
        let data = NotificationData::new().with("type", "");
        assert_eq!(data.category(), None);
    }

    #[test]
    fn destination_display_includes_params() {
        assert_eq!(
            Destination::InformasiDetail { id: 42 }.to_string(),
            "InformasiDetail (id=42)"
        );
        assert_eq!(Destination::DaftarMateri { kode_mk: None }.to_string(), "DaftarMateri");
    }
}
