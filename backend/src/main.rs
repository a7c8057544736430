//! Work location planner server and account administration.

use std::env;
use std::sync::Arc;

use tokio::net::TcpListener;
use worklocation_backend::auth::hash_password;
use worklocation_backend::logging::init_tracing;
use worklocation_backend::{routes, AppState, Config};

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "usage: worklocation [--version | create-user <username> <password> | set-password <username> <password> | delete-user <username>]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("worklocation {}", VERSION);
        return Ok(());
    }

    // Load configuration
    let config = Config::load().map_err(|e| {
        format!(
            "Failed to load configuration: {}. \
             Make sure config.toml exists or set WORKLOC__SESSION__SECRET.",
            e
        )
    })?;

    init_tracing(&config.logging.level);

    match args.first().map(String::as_str) {
        None => serve(config).await,
        Some("create-user") | Some("set-password") => manage_user(config, &args),
        Some("delete-user") => delete_user(config, &args),
        Some(other) => Err(format!("Unknown command: {}\n{}", other, USAGE).into()),
    }
}

async fn serve(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting work location planner {}", VERSION);

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config)?);
    let app = routes::app(state);

    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn manage_user(config: Config, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let [command, username, password] = args else {
        return Err(USAGE.into());
    };
    if username.trim().is_empty() || password.is_empty() {
        return Err("Username and password must not be empty".into());
    }

    let state = AppState::new(config)?;
    let hash = hash_password(password)?;

    if command == "create-user" {
        let user = state.store.create_user(username.trim(), &hash)?;
        println!("Created user {} (id {})", user.username, user.id);
    } else {
        state.store.set_password(username.trim(), &hash)?;
        println!("Updated password for {}", username.trim());
    }

    Ok(())
}

fn delete_user(config: Config, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let [_, username] = args else {
        return Err(USAGE.into());
    };

    let state = AppState::new(config)?;
    state.store.delete_user(username.trim())?;
    println!("Deleted user {}", username.trim());

    Ok(())
}
