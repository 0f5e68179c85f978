//! Servidor web Axum com WebSocket para visualizar o spotter de entidades em tempo real

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use spotter_core::{
    demo::{demo_texts, sample_pipeline},
    Entity, Pipeline, PipelineConfig, PipelineEvent, Token,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: Pipeline,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    entities: Vec<Entity>,
    tokens: Vec<Token>,
    total_tokens: usize,
    processing_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let pipeline = match load_pipeline() {
        Ok(pipeline) => pipeline,
        Err(err) => {
            error!("não foi possível montar o pipeline: {err}");
            std::process::exit(1);
        }
    };
    info!(recognizers = ?pipeline.recognizer_names(), "pipeline pronto");
    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let addr = std::env::var("SPOTTER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = match addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!("SPOTTER_ADDR inválido ({addr}): {err}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("falha ao abrir {addr}: {err}");
            std::process::exit(1);
        }
    };
    info!("🚀 Servidor do spotter iniciado em http://{addr}");
    if let Err(err) = axum::serve(listener, app).await {
        error!("servidor encerrado com erro: {err}");
    }
}

/// Usa `SPOTTER_CONFIG` (caminho de um JSON) quando definido; senão o pipeline de demonstração.
fn load_pipeline() -> spotter_core::Result<Pipeline> {
    match std::env::var("SPOTTER_CONFIG") {
        Ok(path) => {
            info!("carregando configuração de {path}");
            PipelineConfig::from_path(&path)?.build()
        }
        Err(_) => Ok(sample_pipeline()?),
    }
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Análise via HTTP POST (sem streaming)
async fn analyze_handler(State(state): State<Arc<AppState>>, Json(req): Json<AnalyzeRequest>) -> Response {
    if req.text.trim().is_empty() {
        warn!("requisição de análise com texto vazio");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let started = std::time::Instant::now();
    let state_for_task = Arc::clone(&state);
    let analyzed = tokio::task::spawn_blocking(move || state_for_task.pipeline.analyze(&req.text)).await;

    let document = match analyzed {
        Ok(document) => document,
        Err(err) => {
            error!("análise interrompida: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Falha na análise"})),
            )
                .into_response();
        }
    };

    Json(AnalyzeResponse {
        entities: document.entities(),
        total_tokens: document.tokens.len(),
        processing_ms: started.elapsed().as_millis() as u64,
        tokens: document.tokens,
    })
    .into_response()
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(topic, text)| {
            serde_json::json!({
                "topic": topic,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Mensagem WebSocket recebida do cliente; texto puro também é aceito
#[derive(Deserialize)]
struct WsRequest {
    text: String,
}

/// Lógica do WebSocket: recebe texto, executa o pipeline e envia os eventos em sequência
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(raw) => {
                let text = match serde_json::from_str::<WsRequest>(&raw) {
                    Ok(req) => req.text,
                    Err(_) => raw,
                };
                // Offsets dos tokens se referem ao texto recebido, sem trim
                if text.trim().is_empty() {
                    continue;
                }

                info!("Analisando via WebSocket: {} chars", text.len());

                // O pipeline é síncrono: roda fora do runtime assíncrono
                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let state_for_task = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    state_for_task.pipeline.analyze_streaming(&text, tx);
                });
                if let Err(err) = handle.await {
                    error!("análise interrompida: {err}");
                    continue;
                }

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    let json = match serde_json::to_string(event) {
                        Ok(json) => json,
                        Err(err) => {
                            warn!("evento não serializável: {err}");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(json)).await.is_err() {
                        return; // cliente desconectou
                    }
                    // Pequena pausa para a animação passo a passo
                    tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
