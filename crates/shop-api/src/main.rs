//! # Storefront
//!
//! Storefront backend with stateless order-session tokens.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export ORDER_TOKEN_SECRET=$(openssl rand -hex 32)
//! export ORDER_TOKEN_TTL_SECS=900
//!
//! # Run the server
//! storefront
//! ```

use shop_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    print_banner();

    // Missing signing secret stops the process here
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Catalog backend: {}", state.catalog.backend_name());
    info!("Order token lifetime: {}s", state.token_ttl_secs);

    let app = routes::create_router(state);

    info!("Storefront starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Issue token: POST http://{}/api/v1/checkout/token", addr);
        info!("Verify token: POST http://{}/api/v1/checkout/verify", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Storefront
  ━━━━━━━━━━━━━━━━━━━━━━━
  Order-session token service
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
