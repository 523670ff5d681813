use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripmate_app::backend::TripBackend;
use tripmate_app::banner::Banners;
use tripmate_app::config::AppConfig;
use tripmate_app::error::{AppError, AppResult};
use tripmate_app::forms::{self, TripInput};
use tripmate_app::guard::{
    authorize, require_confirmation, Access, AssumeYes, Confirm, DELETE_TRIP_PROMPT,
    DELETE_USER_PROMPT,
};
use tripmate_app::TripDetail;
use tripmate_client::session::{FileSessionStore, SessionStore, StoredSession};
use tripmate_client::TripMateApi;
use tripmate_core::trip::{TripQuery, TripStatus};
use tripmate_core::types::DbId;
use tripmate_core::user::{ChangePasswordForm, Credentials};
use tripmate_maps::google::{GoogleDirections, HttpScriptHost};
use tripmate_maps::scene::Scene;
use tripmate_maps::ScriptLoader;

#[derive(Debug, Parser)]
#[command(name = "tripmate", about = "TripMate trip planner")]
struct Cli {
    /// Base URL of the REST API.
    #[arg(long, global = true, env = "TRIPMATE_API_URL")]
    api_url: Option<String>,

    /// Where the auth session is stored.
    #[arg(long, global = true, env = "TRIPMATE_SESSION_PATH")]
    session_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session.
    Login {
        username: String,
        #[arg(long, env = "TRIPMATE_PASSWORD")]
        password: String,
    },
    /// Log out and forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// List your trips.
    Trips {
        #[arg(long)]
        status: Option<TripStatus>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a trip with its destinations, media, and route.
    Show { trip_id: DbId },
    /// Create a trip.
    Create {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        privacy: Option<String>,
    },
    /// Delete a trip.
    DeleteTrip {
        trip_id: DbId,
        #[arg(long)]
        yes: bool,
    },
    /// Reorder a trip's destinations for the shortest route.
    Optimize { trip_id: DbId },
    /// Search for a place and add the first match to a trip.
    AddPlace { trip_id: DbId, query: String },
    /// Remove a destination from a trip.
    DeleteDestination {
        trip_id: DbId,
        destination_id: DbId,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Upload a photo or video to a trip.
    UploadMedia {
        trip_id: DbId,
        path: PathBuf,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Attach the media to this destination.
        #[arg(long)]
        destination: Option<DbId>,
    },
    /// Change your password.
    ChangePassword {
        #[arg(long, env = "TRIPMATE_OLD_PASSWORD")]
        old: String,
        #[arg(long, env = "TRIPMATE_NEW_PASSWORD")]
        new: String,
        #[arg(long, env = "TRIPMATE_CONFIRM_PASSWORD")]
        confirm: String,
    },
    /// List all users (staff only).
    Users,
    /// List contact form submissions (staff only).
    Contacts,
    /// Delete a user account (staff only).
    DeleteUser {
        user_id: DbId,
        #[arg(long)]
        yes: bool,
    },
}

/// Everything `show` prints.
#[derive(Serialize)]
struct ShowOutput<T: Serialize> {
    #[serde(flatten)]
    detail: T,
    scene: Option<Scene>,
}

/// Asks on the terminal.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "tripmate=info,tripmate_app=info,tripmate_maps=info,tripmate_client=info".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // --- Configuration ---
    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(path) = cli.session_path {
        config.session_path = path;
    }
    tracing::debug!(api_url = %config.api_url, "Loaded configuration");

    let api = TripMateApi::new(&config.api_url, config.request_timeout)?;
    let store = FileSessionStore::new(&config.session_path);

    run(cli.command, &config, api, &store).await
}

async fn run(
    command: Command,
    config: &AppConfig,
    api: TripMateApi,
    store: &FileSessionStore,
) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let response = api.login(&Credentials { username, password }).await?;
            let session = StoredSession::from_login(response);
            store.save(&session)?;
            println!("Logged in as {}", session.user.username);
        }
        Command::Logout => {
            if let Some(session) = authorize(store, Access::Public)? {
                api.set_token(Some(session.token)).await;
                if let Err(e) = api.logout().await {
                    tracing::warn!(error = %e, "Backend logout failed");
                }
            }
            store.clear()?;
            println!("Logged out");
        }
        Command::Whoami => {
            signed_in(&api, store, Access::Private).await?;
            let user = api.get_profile().await?;
            print_json(&user)?;
        }
        Command::Trips { status, search } => {
            signed_in(&api, store, Access::Private).await?;
            let trips = api.list_trips(&TripQuery { status, search }).await?;
            print_json(&trips)?;
        }
        Command::Show { trip_id } => {
            signed_in(&api, store, Access::Private).await?;
            let (detail, host) = trip_detail(config, api, trip_id);
            detail.mount().await;
            let scene = host.recording().last_canvas().map(|c| c.snapshot());
            print_json(&ShowOutput {
                detail: detail.snapshot().await,
                scene,
            })?;
            detail.unmount();
        }
        Command::Create {
            title,
            description,
            start,
            end,
            status,
            privacy,
        } => {
            signed_in(&api, store, Access::Private).await?;
            let form = forms::trip_form(&TripInput {
                title,
                description,
                start_date: start,
                end_date: end,
                status,
                privacy,
            })?;
            let trip = api.create_trip(&form).await?;
            print_json(&trip)?;
        }
        Command::DeleteTrip { trip_id, yes } => {
            signed_in(&api, store, Access::Private).await?;
            match require_confirmation(confirmer(yes), DELETE_TRIP_PROMPT) {
                Err(AppError::Declined) => return Ok(()),
                other => other?,
            }
            api.delete_trip(trip_id).await?;
            println!("Trip deleted");
        }
        Command::Optimize { trip_id } => {
            signed_in(&api, store, Access::Private).await?;
            let (detail, _) = trip_detail(config, api, trip_id);
            detail.mount().await;
            let result = detail.optimize_route().await;
            report(&detail, result.map(|_| ())).await?;
        }
        Command::AddPlace { trip_id, query } => {
            signed_in(&api, store, Access::Private).await?;
            let (detail, _) = trip_detail(config, api, trip_id);
            detail.mount().await;
            let candidates = detail.search_places(&query).await?;
            let Some(first) = candidates.first() else {
                anyhow::bail!("No places found for {query:?}");
            };
            let result = detail.add_place(first).await;
            report(&detail, result.map(|_| ())).await?;
        }
        Command::DeleteDestination {
            trip_id,
            destination_id,
            yes,
        } => {
            signed_in(&api, store, Access::Private).await?;
            let (detail, _) = trip_detail(config, api, trip_id);
            detail.mount().await;
            let result = detail.delete_destination(destination_id, confirmer(yes)).await;
            report(&detail, result).await?;
        }
        Command::UploadMedia {
            trip_id,
            path,
            title,
            description,
            destination,
        } => {
            signed_in(&api, store, Access::Private).await?;
            let upload = forms::media_upload(&path, title, description, destination)?;
            let (detail, _) = trip_detail(config, api, trip_id);
            detail.mount().await;
            let result = detail.upload_media(upload).await;
            report(&detail, result.map(|_| ())).await?;
        }
        Command::ChangePassword { old, new, confirm } => {
            signed_in(&api, store, Access::Private).await?;
            api.change_password(&ChangePasswordForm {
                old_password: old,
                new_password: new,
                new_password2: confirm,
            })
            .await?;
            println!("Password changed");
        }
        Command::Users => {
            signed_in(&api, store, Access::Admin).await?;
            print_json(&api.list_users().await?)?;
        }
        Command::Contacts => {
            signed_in(&api, store, Access::Admin).await?;
            print_json(&api.list_contacts().await?)?;
        }
        Command::DeleteUser { user_id, yes } => {
            signed_in(&api, store, Access::Admin).await?;
            match require_confirmation(confirmer(yes), DELETE_USER_PROMPT) {
                Err(AppError::Declined) => return Ok(()),
                other => other?,
            }
            api.delete_user(user_id).await?;
            println!("User deleted");
        }
    }
    Ok(())
}

// ---- private helpers ----

/// Check the route guard and install the stored token on the client.
async fn signed_in(api: &TripMateApi, store: &dyn SessionStore, access: Access) -> anyhow::Result<()> {
    if let Some(session) = authorize(store, access)? {
        api.set_token(Some(session.token)).await;
    }
    Ok(())
}

fn trip_detail(config: &AppConfig, api: TripMateApi, trip_id: DbId) -> (TripDetail, Arc<HttpScriptHost>) {
    let http = reqwest::Client::new();
    let directions = Arc::new(GoogleDirections::new(
        http.clone(),
        config.google_maps_api_key.clone().unwrap_or_default(),
    ));
    let host = Arc::new(HttpScriptHost::new(http, directions));
    let loader = ScriptLoader::new(
        host.clone(),
        config.google_maps_api_key.clone(),
        config.maps_script_timeout,
    );
    let backend: Arc<dyn TripBackend> = Arc::new(api);
    let banners = Banners::new(config.success_banner, config.error_banner);
    (TripDetail::new(trip_id, backend, loader, banners), host)
}

/// Print the banner an action left behind and fail when the action did.
async fn report(detail: &TripDetail, result: AppResult<()>) -> anyhow::Result<()> {
    if let Some(banner) = detail.banner() {
        println!("{}", banner.message);
    }
    detail.unmount();
    match result {
        Err(AppError::Declined) => Ok(()),
        other => other.map_err(anyhow::Error::from),
    }
}

fn confirmer(yes: bool) -> &'static dyn Confirm {
    if yes {
        &AssumeYes
    } else {
        &StdinConfirm
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
