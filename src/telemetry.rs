use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,tower_http=info";

/// `LOG_LEVEL` accepts the Python-style names as well
fn normalize_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Filter used when `RUST_LOG` is not set.
pub fn fallback_filter(log_level: Option<&str>, debug: Option<&str>) -> String {
    if let Some(level) = log_level.filter(|l| !l.trim().is_empty()) {
        return normalize_level(level);
    }
    if debug.is_some_and(is_truthy) {
        return "debug".to_string();
    }
    DEFAULT_FILTER.to_string()
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let log_level = std::env::var("LOG_LEVEL").ok();
        let debug = std::env::var("DEBUG").ok();
        EnvFilter::try_new(fallback_filter(log_level.as_deref(), debug.as_deref()))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        assert_eq!(fallback_filter(Some("WARNING"), Some("true")), "warn");
        assert_eq!(fallback_filter(Some("DEBUG"), None), "debug");
        assert_eq!(fallback_filter(Some(" "), Some("1")), "debug");
        assert_eq!(fallback_filter(None, Some("False")), DEFAULT_FILTER);
        assert_eq!(fallback_filter(None, None), DEFAULT_FILTER);
    }
}
