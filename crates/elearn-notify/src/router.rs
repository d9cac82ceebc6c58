use elearn_types::{Destination, NotificationData};

/// Whatever can move the user to a screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
}

/// Destination for a notification payload.
///
/// Never fails: an unknown or missing `type` goes to `Home`, and an
/// announcement whose id is not a number opens the list instead.
pub fn route(data: &NotificationData) -> Destination {
    match data.category() {
        Some("informasi") => match data.get("id_informasi").and_then(|id| id.trim().parse().ok()) {
            Some(id) => Destination::InformasiDetail { id },
            None => Destination::InformasiList,
        },
        Some("presensi") => Destination::RiwayatPresensi,
        Some("materi") => Destination::DaftarMateri {
            kode_mk: data
                .get("kode_mk")
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        },
        _ => Destination::Home,
    }
}
