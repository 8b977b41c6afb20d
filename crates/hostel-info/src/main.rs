//! Static info page for the hostel manager: a presentational landing
//! page plus a health endpoint. Carries no application state.

use std::net::SocketAddr;

use axum::{Json, Router, response::Html, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const INFO_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Hostel Manager</title>
    <style>
        body { font-family: sans-serif; margin: 0; padding: 20px;
               background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
               min-height: 100vh; color: white; }
        .container { max-width: 800px; margin: 0 auto; padding: 30px;
                     background: rgba(255, 255, 255, 0.1); border-radius: 15px; }
        h1 { text-align: center; }
        ul { line-height: 1.8; }
    </style>
</head>
<body>
    <div class="container">
        <h1>Hostel Manager</h1>
        <p>Role-based dormitory management: students track their room,
        complaints, payments, the weekly mess menu, and room-renewal
        applications; hostel admins manage rooms, students, reviews, and
        fee records.</p>
        <ul>
            <li>Room allocation and roommate directory</li>
            <li>Complaint tracking with status updates</li>
            <li>Fee payment records</li>
            <li>Weekly mess menu</li>
            <li>Renewal applications with document upload</li>
        </ul>
        <p>Sign in through the dashboard client to get started.</p>
    </div>
</body>
</html>
"#;

async fn index() -> Html<&'static str> {
    Html(INFO_PAGE)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostel_info=info,tower_http=info".into()),
        )
        .init();

    let host = std::env::var("HOSTEL_INFO_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("HOSTEL_INFO_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("info server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
