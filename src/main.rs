use std::sync::Arc;

use plant_assist::config::{ServerConfig, SmtpConfig};
use plant_assist::otp::{OtpServerState, OtpStore, SmtpMailer, otp_routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let smtp = SmtpConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export SMTP_HOST=smtp.example.com");
        eprintln!("  export SMTP_USERNAME=... SMTP_PASSWORD=...");
        std::process::exit(1);
    });

    let server = ServerConfig::from_env();

    eprintln!("🌱 Plant Assist OTP backend v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Relay: {}:{}", smtp.host, smtp.port);
    eprintln!("   API: http://0.0.0.0:{}/send-otp", server.port);
    eprintln!("        http://0.0.0.0:{}/verify-otp", server.port);

    let state = OtpServerState {
        store: Arc::new(OtpStore::new()),
        mailer: Arc::new(SmtpMailer::new(smtp)),
    };

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server.port)).await?;
    tracing::info!(port = server.port, "OTP backend listening");
    axum::serve(listener, otp_routes(state)).await?;

    Ok(())
}
