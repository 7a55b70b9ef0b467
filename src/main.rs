use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use news_portal::auth::AuthContext;
use news_portal::config::AppConfig;
use news_portal::domains::user::NewUser;
use news_portal::web::{self, AppState};
use std::net::SocketAddr;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "news_portal")]
#[command(about = "News portal server and administration commands.")]
struct CommandLine {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Overrides BIND_ADDR
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Mark every course as not deleted and print how many rows matched
    ActivateCourses,
    /// Create a login
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long, env = "NEW_USER_PASSWORD")]
        password: String,
        /// admin, editor or reader
        #[arg(long, default_value = "admin")]
        role: String,
    },
    /// Bring a soft-deleted news item back into the listing
    RestoreNews {
        id: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let commands = CommandLine::parse();
    let config = AppConfig::from_env()?;
    if matches!(commands.command, Commands::Serve { .. }) {
        config.require_jwt_secret()?;
    }
    let services = news_portal::initialize(&config).await?;
    let system = AuthContext::internal_system_context();

    match commands.command {
        Commands::Serve { bind } => {
            let purged = services.auth_service.purge_expired_tokens().await?;
            if purged > 0 {
                log::info!("Purged {} expired revoked token(s)", purged);
            }

            let addr = bind.unwrap_or(config.bind_addr);
            let app = web::router(AppState::new(&services, config.default_locale));
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("binding {}", addr))?;

            log::info!("Listening on http://{}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    log::info!("Shutting down");
                })
                .await?;
        }
        Commands::ActivateCourses => {
            let count = services.course_service.activate_all(&system).await?;
            println!("{}", count);
        }
        Commands::CreateUser { username, password, role } => {
            let user = services
                .user_service
                .create_user(NewUser { username, password, role, active: true }, &system)
                .await?;
            println!("Created {} ({}) with role {}", user.username, user.id, user.role.as_str());
        }
        Commands::RestoreNews { id } => {
            let news = services.news_service.restore_news(id, &system).await?;
            println!("Restored '{}'", news.title);
        }
    }

    Ok(())
}
