use clap::{Args, Parser, Subcommand};

use elearn_client::informasi::DEFAULT_LIST_LIMIT;

#[derive(Parser, Debug)]
#[command(name = "elearn", version, about = "E-Learn command-line client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show who is logged in
    Whoami,

    /// Announcements
    #[command(subcommand)]
    Informasi(InformasiCommand),

    /// Course materials
    #[command(subcommand)]
    Materi(MateriCommand),

    /// Weekly timetable of the logged-in student
    Jadwal,

    /// Push notification helpers
    #[command(subcommand)]
    Notify(NotifyCommand),

    /// Push token registration
    #[command(subcommand)]
    Device(DeviceCommand),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(short, long)]
    pub username: String,

    #[arg(short, long, env = "ELEARN_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Keep the session on disk. Without this it ends with the process.
    #[arg(long)]
    pub remember: bool,

    /// Log in as a student through the mobile route
    #[arg(long)]
    pub mobile: bool,
}

#[derive(Subcommand, Debug)]
pub enum InformasiCommand {
    /// List announcements
    List {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,

        /// Keep refreshing until Ctrl-C
        #[arg(long)]
        watch: bool,

        /// Refresh interval for --watch, overriding ELEARN_POLL_INTERVAL_MS
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Show one announcement
    Show { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum MateriCommand {
    /// List materials, by default for your own class
    List {
        /// Class id, for accounts that are not in a class themselves
        #[arg(long)]
        kelas: Option<i64>,

        /// Only this course code
        #[arg(long)]
        kode_mk: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotifyCommand {
    /// Show where a notification payload leads
    Route {
        /// Data payload as a JSON object of strings, e.g. '{"type":"informasi","id_informasi":"42"}'
        #[arg(long)]
        payload: String,

        /// Treat it as arriving while the app is open
        #[arg(long)]
        foreground: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommand {
    /// Register a push token with the backend
    Register {
        #[arg(long)]
        token: String,
    },
}
