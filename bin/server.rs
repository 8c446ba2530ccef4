// Gastos Bot - Webhook Server
// Receives chat events, appends parsed records, serves the dashboard API

use axum::{
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use gastos_bot::{
    extract_event, is_from_target_group, parse_message, summarize, AppConfig, CachedLedger,
    FinancialRecord, IncomingMessage, LedgerBackend, LedgerError, LedgerStore, ReactionSender,
    ACK_FAIL, ACK_OK,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<dyn LedgerStore>,
    cache: Arc<CachedLedger>,
    ack: Option<Arc<ReactionSender>>,
    config: Arc<AppConfig>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

/// Webhook outcome reported back to the transport. Every inbound request
/// gets one of these; nothing propagates past the handler.
#[derive(Serialize)]
struct WebhookStatus {
    status: &'static str,
}

impl WebhookStatus {
    fn of(status: &'static str) -> Json<Self> {
        Json(WebhookStatus { status })
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /webhook - Inbound chat event
async fn receive_webhook(State(state): State<AppState>, Json(event): Json<Value>) -> Json<WebhookStatus> {
    let Some(message) = extract_event(&event) else {
        eprintln!("Ignoring event with unexpected shape");
        return WebhookStatus::of("ignored_unexpected_shape");
    };

    if !is_from_target_group(&message, state.config.target_group.as_deref()) {
        return WebhookStatus::of("ignored_not_target_group");
    }

    let command = match parse_message(&message.text) {
        Ok(command) => command,
        Err(rejection) => {
            println!("Ignoring non-command message: {}", rejection);
            return WebhookStatus::of("ignored_not_command");
        }
    };

    let record = FinancialRecord::new(Utc::now(), command.kind, command.amount, command.category);

    let store = state.store.clone();
    let saved = tokio::task::spawn_blocking(move || store.append(&record))
        .await
        .unwrap_or_else(|e| {
            Err(LedgerError::Write(anyhow::anyhow!(
                "Append task panicked: {}",
                e
            )))
        });

    match saved {
        Ok(()) => {
            acknowledge(&state, &message, ACK_OK).await;
            WebhookStatus::of("processed")
        }
        Err(e) => {
            eprintln!("Error appending record: {}", e);
            acknowledge(&state, &message, ACK_FAIL).await;
            WebhookStatus::of("save_failed")
        }
    }
}

/// Send the reaction for an outcome. Best-effort: failures are logged and
/// never change the webhook response.
async fn acknowledge(state: &AppState, message: &IncomingMessage, glyph: &'static str) {
    let Some(sender) = state.ack.clone() else {
        return;
    };

    let message = message.clone();
    match tokio::task::spawn_blocking(move || sender.send(&message, glyph)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => eprintln!("Error sending {} reaction: {}", glyph, e),
        Err(e) => eprintln!("Reaction task panicked: {}", e),
    }
}

/// GET /api/records - Full ledger, newest first (dashboard table)
async fn get_records(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.cache.clone();
    let mut records = tokio::task::spawn_blocking(move || cache.records())
        .await
        .unwrap_or_default();

    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Json(ApiResponse::ok(records))
}

/// GET /api/summary - Totals, balance and category chart data
async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    let cache = state.cache.clone();
    let records = tokio::task::spawn_blocking(move || cache.records())
        .await
        .unwrap_or_default();

    Json(ApiResponse::ok(summarize(&records)))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("💸 Gastos Bot - Webhook Server v{}", gastos_bot::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Could not open ledger store: {:#}", e);
            std::process::exit(1);
        }
    };

    match &config.backend {
        LedgerBackend::Csv { path } => println!("✓ Ledger: CSV file at {}", path),
        LedgerBackend::Sheet { base_url, .. } => println!("✓ Ledger: remote sheet at {}", base_url),
    }

    match &config.target_group {
        Some(group) => println!("✓ Target group: {}", group),
        None => println!("⚠ No target group configured; accepting events from every chat"),
    }

    let ack = match &config.ack {
        Some(ack_config) => {
            match ReactionSender::new(ack_config.endpoint.clone(), ack_config.token.clone()) {
                Ok(sender) => {
                    println!("✓ Acknowledgements: {}", ack_config.endpoint);
                    Some(Arc::new(sender))
                }
                Err(e) => {
                    eprintln!("⚠ Acknowledgements disabled: {:#}", e);
                    None
                }
            }
        }
        None => None,
    };

    let cache = Arc::new(CachedLedger::new(store.clone(), config.cache_window));
    let bind_addr = config.bind_addr.clone();

    let state = AppState {
        store,
        cache,
        ack,
        config: Arc::new(config),
    };

    let app = Router::new()
        .route("/webhook", post(receive_webhook))
        .route("/api/health", get(health_check))
        .route("/api/records", get(get_records))
        .route("/api/summary", get(get_summary))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    println!("\n🚀 Server running on http://{}", bind_addr);
    println!("   Webhook: POST /webhook");
    println!("   API:     GET  /api/summary\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
