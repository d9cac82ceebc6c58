use std::sync::Mutex;

use tracing::{debug, info};

use elearn_session::SessionStore;
use elearn_types::{Destination, NotificationData, PushMessage};

use crate::router::{Navigator, route};

const DEFAULT_TITLE: &str = "Notifikasi Baru";
const DEFAULT_BODY: &str = "Anda memiliki notifikasi baru";

/// What to show for a notification that arrived while the app was open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundNotice {
    pub title: String,
    pub body: String,
    /// Where the notification leads, if it names a category.
    pub destination: Option<Destination>,
}

/// Holds at most one navigation that arrived before anything could
/// navigate. A newer one replaces an unconsumed older one.
#[derive(Debug, Default)]
pub struct NotificationService {
    pending: Mutex<Option<NotificationData>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notification was tapped while the app was in the background.
    pub fn on_notification_opened(&self, msg: &PushMessage) {
        self.record(&msg.data, "background");
    }

    /// The app was launched by tapping a notification.
    pub fn on_initial_notification(&self, msg: Option<&PushMessage>) {
        if let Some(msg) = msg {
            self.record(&msg.data, "cold start");
        }
    }

    fn record(&self, data: &NotificationData, source: &str) {
        let Some(category) = data.category() else {
            debug!("Ignoring {} notification without a type", source);
            return;
        };

        let mut pending = self.pending.lock().unwrap_or_else(|p| p.into_inner());
        if pending.replace(data.clone()).is_some() {
            debug!("Replacing unconsumed pending navigation");
        }
        info!("Pending navigation recorded from {} ({})", source, category);
    }

    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    /// Take the pending payload. A second call returns `None`.
    pub fn consume_pending_navigation(&self) -> Option<NotificationData> {
        self.pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
    }

    /// A notification arrived while the app is open and a navigator exists.
    /// Navigates right away; the pending cell is left alone.
    pub fn handle_foreground(&self, msg: &PushMessage, navigator: &dyn Navigator) -> ForegroundNotice {
        let content = msg.notification.clone().unwrap_or_default();
        let destination = msg.data.category().map(|_| route(&msg.data));

        if let Some(dest) = &destination {
            debug!("Foreground notification, opening {}", dest);
            navigator.navigate(dest.clone());
        }

        ForegroundNotice {
            title: content.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: content.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            destination,
        }
    }

    /// Deliver the pending navigation once the user is logged in.
    ///
    /// Before login the payload stays where it is, so the first screen
    /// after login can still pick it up.
    pub fn resume_pending(
        &self,
        navigator: &dyn Navigator,
        session: &SessionStore,
    ) -> anyhow::Result<Option<Destination>> {
        if !session.is_authenticated()? {
            if self.has_pending() {
                debug!("Pending navigation waits for login");
            }
            return Ok(None);
        }

        let Some(data) = self.consume_pending_navigation() else {
            return Ok(None);
        };
        let destination = route(&data);
        info!("Opening {} from pending notification", destination);
        navigator.navigate(destination.clone());
        Ok(Some(destination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use elearn_storage::MemoryStorage;
    use elearn_types::events::NotificationContent;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Destination>>);

    impl Navigator for Recorder {
        fn navigate(&self, destination: Destination) {
            self.0.lock().unwrap().push(destination);
        }
    }

    impl Recorder {
        fn seen(&self) -> Vec<Destination> {
            self.0.lock().unwrap().clone()
        }
    }

    fn message(data: NotificationData) -> PushMessage {
        PushMessage {
            notification: None,
            data,
        }
    }

    fn informasi(id: &str) -> PushMessage {
        message(
            NotificationData::new()
                .with("type", "informasi")
                .with("id_informasi", id),
        )
    }

    fn session() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStorage::new()), Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn pending_navigation_is_read_once() {
        let svc = NotificationService::new();
        svc.on_notification_opened(&informasi("42"));

        let first = svc.consume_pending_navigation().unwrap();
        assert_eq!(first.get("id_informasi"), Some("42"));
        assert_eq!(svc.consume_pending_navigation(), None);
    }

    #[test]
    fn later_notification_overwrites_unconsumed_one() {
        let svc = NotificationService::new();
        svc.on_initial_notification(Some(&informasi("1")));
        svc.on_notification_opened(&informasi("2"));

        let data = svc.consume_pending_navigation().unwrap();
        assert_eq!(route(&data), Destination::InformasiDetail { id: 2 });
    }

    #[test]
    fn payload_without_type_is_not_recorded() {
        let svc = NotificationService::new();
        svc.on_notification_opened(&message(NotificationData::new().with("id_informasi", "3")));
        svc.on_initial_notification(None);
        assert!(!svc.has_pending());
    }

    #[test]
    fn foreground_navigates_now_and_leaves_pending_alone() {
        let svc = NotificationService::new();
        svc.on_notification_opened(&informasi("9"));
        let nav = Recorder::default();

        let notice = svc.handle_foreground(
            &message(NotificationData::new().with("type", "presensi")),
            &nav,
        );

        assert_eq!(notice.title, "Notifikasi Baru");
        assert_eq!(notice.body, "Anda memiliki notifikasi baru");
        assert_eq!(notice.destination, Some(Destination::RiwayatPresensi));
        assert_eq!(nav.seen(), vec![Destination::RiwayatPresensi]);
        assert!(svc.has_pending());
    }

    #[test]
    fn foreground_keeps_sender_text_and_skips_untyped_navigation() {
        let svc = NotificationService::new();
        let nav = Recorder::default();
        let msg = PushMessage {
            notification: Some(NotificationContent {
                title: Some("Informasi Baru".into()),
                body: Some("UTS dipindah".into()),
            }),
            data: NotificationData::new(),
        };

        let notice = svc.handle_foreground(&msg, &nav);

        assert_eq!(notice.title, "Informasi Baru");
        assert_eq!(notice.body, "UTS dipindah");
        assert_eq!(notice.destination, None);
        assert!(nav.seen().is_empty());
    }

    #[test]
    fn resume_waits_for_login() {
        let svc = NotificationService::new();
        let nav = Recorder::default();
        let session = session();
        svc.on_initial_notification(Some(&message(
            NotificationData::new().with("type", "materi").with("kode_mk", "IF301"),
        )));

        assert_eq!(svc.resume_pending(&nav, &session).unwrap(), None);
        assert!(svc.has_pending());
        assert!(nav.seen().is_empty());

        session.set_token("tok", false).unwrap();
        let expected = Destination::DaftarMateri {
            kode_mk: Some("IF301".into()),
        };
        assert_eq!(svc.resume_pending(&nav, &session).unwrap(), Some(expected.clone()));
        assert_eq!(nav.seen(), vec![expected]);

        // Consumed.
        assert_eq!(svc.resume_pending(&nav, &session).unwrap(), None);
    }
}
