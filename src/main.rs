use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::validator::Validation;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use storerate::auth::{PasswordService, RawPassword, TokenService, generate_secret};
use storerate::config::ServerConfig;
use storerate::error::Error;
use storerate::server::validation::{validate_email, validate_name};
use storerate::server::{AppState, create_router};
use storerate::store::{Database, SqliteStore};
use storerate::types::{NewUser, Role};

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "storerate")]
#[command(about = "A store rating server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "5006")]
        port: u16,

        /// Data directory for the database and signing secret
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Token signing secret. Defaults to the secret written by `admin init`.
        #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database, signing secret and admin account)
    Init {
        /// Data directory for the database and signing secret
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,

        /// Name of the first admin account
        #[arg(long)]
        admin_name: Option<String>,

        /// Email of the first admin account
        #[arg(long)]
        admin_email: Option<String>,

        /// Password of the first admin account
        #[arg(long)]
        admin_password: Option<String>,
    },
}

struct AdminDetails {
    name: String,
    email: String,
    password: RawPassword,
}

fn run_init(
    data_dir: String,
    non_interactive: bool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: PathBuf::from(data_dir),
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    if store.has_admin()? {
        bail!(
            "Server already initialized. An admin account exists in {}",
            config.db_path().display()
        );
    }

    let admin = if non_interactive {
        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            bail!(
                "--admin-name, --admin-email and --admin-password are required with --non-interactive"
            );
        };
        AdminDetails {
            name,
            email,
            password: RawPassword::new(password),
        }
    } else {
        prompt_admin(name, email, password)?
    };

    if admin.name.trim().is_empty() {
        bail!("Admin name cannot be empty");
    }
    validate_name(admin.name.trim()).map_err(|e| anyhow::anyhow!(e.message))?;
    validate_email(admin.email.trim()).map_err(|e| anyhow::anyhow!(e.message))?;
    if admin.password.is_blank() {
        bail!("Admin password cannot be empty");
    }

    let secret_file = config.secret_path();
    if secret_file.exists() {
        info!("Keeping existing signing secret at {}", secret_file.display());
    } else {
        fs::write(&secret_file, generate_secret())?;

        #[cfg(unix)]
        set_restrictive_permissions(&secret_file);
    }

    let password_hash = PasswordService::new().hash(&admin.password)?;
    let id = match store.create_user(&NewUser {
        name: admin.name.trim().to_string(),
        email: admin.email.trim().to_string(),
        address: None,
        password_hash,
        role: Role::Admin,
    }) {
        Ok(id) => id,
        Err(Error::AlreadyExists) => bail!("A user with email '{}' already exists", admin.email),
        Err(e) => return Err(e.into()),
    };

    println!();
    println!("========================================");
    println!("Created admin '{}' (id {id})", admin.email.trim());
    println!();
    println!("Signing secret written to: {}", secret_file.display());
    println!("========================================");
    println!();

    Ok(())
}

fn not_empty(input: &str) -> Result<Validation, inquire::CustomUserError> {
    if input.trim().is_empty() {
        Ok(Validation::Invalid("Value cannot be empty".into()))
    } else {
        Ok(Validation::Valid)
    }
}

fn prompt_admin(
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<AdminDetails> {
    let name = match name {
        Some(name) => name,
        None => inquire::Text::new("Admin name:")
            .with_validator(not_empty)
            .prompt()?,
    };

    let email = match email {
        Some(email) => email,
        None => inquire::Text::new("Admin email:")
            .with_validator(not_empty)
            .prompt()?,
    };

    let password = match password {
        Some(password) => password,
        None => inquire::Password::new("Admin password:")
            .with_validator(not_empty)
            .prompt()?,
    };

    Ok(AdminDetails {
        name,
        email,
        password: RawPassword::new(password),
    })
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let secret = config
        .load_secret()
        .context("Server not initialized. Run 'storerate admin init' or set JWT_SECRET")?;
    let tokens = TokenService::new(secret.as_bytes(), config.token_ttl)?;

    fs::create_dir_all(&config.data_dir)?;
    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    if !store.has_admin()? {
        warn!("No admin account exists. Run 'storerate admin init' to create one.");
    }

    let state = Arc::new(AppState::new(Arc::new(store), tokens));

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("storerate=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
                admin_name,
                admin_email,
                admin_password,
            } => {
                run_init(
                    data_dir,
                    non_interactive,
                    admin_name,
                    admin_email,
                    admin_password,
                )?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            jwt_secret,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                jwt_secret,
                ..ServerConfig::default()
            };
            run_serve(config).await?;
        }
    }

    Ok(())
}
