mod cli;
mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use elearn_client::{ApiClient, ClientConfig, ClientEvent, LoginEndpoint, Poller};
use elearn_notify::{DeviceTokens, Navigator, NotificationService, route};
use elearn_session::SessionStore;
use elearn_storage::{MemoryStorage, SqliteStorage};
use elearn_types::api::{Informasi, JadwalKuliah, Materi};
use elearn_types::{Destination, NotificationData, PushMessage};

use cli::{Cli, Command, DeviceCommand, InformasiCommand, MateriCommand, NotifyCommand};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "elearn=info,elearn_client=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Remembered sessions live in SQLite; the rest end with the process
    let durable = Arc::new(SqliteStorage::open(&config.db_path)?);
    let session = SessionStore::new(durable, Arc::new(MemoryStorage::new()));

    let client = ApiClient::new(
        ClientConfig::new(&config.api_url).with_timeout(config.http_timeout),
        session,
    )?;

    match cli.command {
        Command::Login(args) => {
            let endpoint = if args.mobile {
                LoginEndpoint::Mobile
            } else {
                LoginEndpoint::Web
            };
            let session = client
                .login_via(endpoint, &args.username, &args.password, args.remember)
                .await?;
            println!(
                "Logged in as {} ({})",
                session.user.display_name(),
                session.role
            );
            if !args.remember {
                println!("Session not remembered; it ends when this command exits.");
            }
        }
        Command::Logout => {
            client.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match client.session().load()? {
            Some(s) => println!("{} ({}), role {}", s.user.display_name(), s.username, s.role),
            None => println!("Not logged in"),
        },
        Command::Informasi(InformasiCommand::List {
            limit,
            watch,
            interval_ms,
        }) => {
            let items = client.list_informasi(limit).await?;
            print_informasi(&items);
            if watch {
                let interval = interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(config.poll_interval);
                watch_informasi(client, limit, interval).await;
            }
        }
        Command::Informasi(InformasiCommand::Show { id }) => {
            let item = client.informasi_detail(id).await?;
            println!("{}", item.judul);
            if let Some(created) = item.created_at {
                println!("{}", created.format("%d %b %Y %H:%M"));
            }
            println!();
            println!("{}", item.deskripsi);
            if let Some(url) = item.gambar_url {
                println!();
                println!("Gambar: {}{}", client.base_url(), url);
            }
        }
        Command::Materi(MateriCommand::List { kelas, kode_mk }) => {
            let materi = match kelas {
                Some(id_kelas) => client.list_materi(id_kelas).await?,
                None => client.my_materi().await?,
            };
            let materi: Vec<Materi> = materi
                .into_iter()
                .filter(|m| kode_mk.as_deref().is_none_or(|k| m.kode_mk == k))
                .collect();
            print_materi(&materi);
        }
        Command::Jadwal => print_jadwal(&client.my_jadwal().await?),
        Command::Notify(NotifyCommand::Route {
            payload,
            foreground,
        }) => {
            let data: NotificationData = serde_json::from_str(&payload)?;
            route_notification(&client, data, foreground)?;
        }
        Command::Device(DeviceCommand::Register { token }) => {
            let devices = DeviceTokens::new(client);
            if devices.on_token_refresh(&token).await {
                println!("Push token registered");
            } else {
                println!("Push token cached; it will be registered after the next login");
            }
        }
    }

    Ok(())
}

fn print_informasi(items: &[Informasi]) {
    if items.is_empty() {
        println!("Belum ada informasi");
        return;
    }
    for item in items {
        let when = item
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("[{:>4}] {:<16} {}", item.id, when, item.judul);
    }
}

fn print_materi(materi: &[Materi]) {
    if materi.is_empty() {
        println!("Belum ada materi");
        return;
    }
    for m in materi {
        let pdf = if m.file_pdf.is_some() { " [PDF]" } else { "" };
        println!("{:<8} Minggu {:>2}  {}{}", m.kode_mk, m.minggu, m.judul, pdf);
    }
}

fn print_jadwal(jadwal: &[JadwalKuliah]) {
    if jadwal.is_empty() {
        println!("Belum ada jadwal kuliah");
        return;
    }
    for j in jadwal {
        let mulai = j.jam_mulai.map(|t| t.format("%H:%M").to_string());
        let selesai = j.jam_selesai.map(|t| t.format("%H:%M").to_string());
        println!(
            "{:<7} {}-{}  {:<24} {}",
            j.hari,
            mulai.as_deref().unwrap_or("--:--"),
            selesai.as_deref().unwrap_or("--:--"),
            j.nama_mk.as_deref().or(j.kode_mk.as_deref()).unwrap_or("-"),
            j.ruangan.as_deref().unwrap_or("-")
        );
    }
}

/// Re-list every `interval` until Ctrl-C or the session expires.
async fn watch_informasi(client: ApiClient, limit: u32, interval: Duration) {
    let mut events = client.subscribe();

    let task_client = client.clone();
    let mut poller = Poller::start(
        move || {
            let client = task_client.clone();
            async move {
                match client.list_informasi(limit).await {
                    Ok(items) => {
                        println!();
                        print_informasi(&items);
                    }
                    Err(e) => warn!("Refresh failed: {}", e),
                }
            }
        },
        interval,
        &limit,
    );
    info!("Watching informasi every {:?}, Ctrl-C to stop", interval);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Ok(ClientEvent::SessionExpired) => {
                    println!("Session expired, log in again");
                    break;
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    poller.stop();
}

struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, destination: Destination) {
        println!("Open {}", destination);
    }
}

fn route_notification(client: &ApiClient, data: NotificationData, foreground: bool) -> Result<()> {
    let service = NotificationService::new();
    let msg = PushMessage {
        notification: None,
        data,
    };

    if foreground {
        let notice = service.handle_foreground(&msg, &PrintNavigator);
        println!("{}: {}", notice.title, notice.body);
        return Ok(());
    }

    service.on_notification_opened(&msg);
    if service.resume_pending(&PrintNavigator, client.session())?.is_none() {
        if service.has_pending() {
            println!("Not logged in; {} opens after login", route(&msg.data));
        } else {
            println!("Payload has no type; nothing to open");
        }
    }
    Ok(())
}
