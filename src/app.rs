use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, chat, favorites, food_logs, planner, profile, progress, recipes, seed};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api/v1",
            Router::new()
                .merge(auth::router())
                .merge(profile::router())
                .merge(food_logs::router())
                .merge(progress::router())
                .merge(recipes::router())
                .merge(planner::router())
                .merge(favorites::router())
                .merge(chat::router())
                .merge(seed::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::JwtKeys;
    use crate::state::Collaborators;
    use crate::testing::{nutrition, ScriptedLlm, StubNutritionProvider};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn bearer(state: &AppState) -> String {
        let token = JwtKeys::from(&state.config.jwt)
            .sign_access(Uuid::new_v4())
            .unwrap();
        format!("Bearer {token}")
    }

    async fn json_body(res: axum::response::Response) -> Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::get("/api/v1/food-logs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let state = AppState::fake();
        let token = JwtKeys::from(&state.config.jwt)
            .sign_refresh(Uuid::new_v4())
            .unwrap();
        let res = build_app(state)
            .oneshot(
                Request::get("/api/v1/meal-plans")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn food_search_requires_query() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(
                Request::get("/api/v1/foods/search?query=%20")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn food_search_goes_through_the_cache() {
        let state = AppState::fake_with(Collaborators {
            nutrition: Arc::new(StubNutritionProvider::returning(vec![nutrition("apple", 95.0)])),
            ..Collaborators::fake()
        });
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(
                Request::get("/api/v1/foods/search?query=Apple")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][0]["name"], "apple");
        assert_eq!(body["data"][0]["calories"], 95.0);
    }

    #[tokio::test]
    async fn chat_rejects_missing_messages() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(
                Request::post("/api/v1/chat")
                    .header(header::AUTHORIZATION, auth)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"message": "hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "Invalid messages format");
    }

    #[tokio::test]
    async fn meal_plan_runs_the_pipeline() {
        let reply = r#"{"analysis": "Plenty left today.", "suggestions": [
            {"title": "Chicken Bowl", "searchQuery": "chicken bowl", "reasoning": "protein"},
            {"title": "Lentil Soup", "searchQuery": "lentil soup", "reasoning": "fiber"},
            {"title": "Beef Stir Fry", "searchQuery": "beef stir fry", "reasoning": "iron"}
        ]}"#;
        let state = AppState::fake_with(Collaborators {
            llm: Arc::new(ScriptedLlm::replying([reply])),
            ..Collaborators::fake()
        });
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(
                Request::post("/api/v1/meal-plans")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        let data = &body["data"];
        assert_eq!(data["analysis"], "Plenty left today.");
        assert_eq!(data["suggestions"].as_array().unwrap().len(), 3);
        assert_eq!(data["suggestions"][1]["searchQuery"], "lentil soup");
        assert!(data["suggestions"][1]["recipe"].is_null());
        assert_eq!(data["evaluation"]["status"], "under");
        assert!(data["plan_id"].is_string());
    }

    #[tokio::test]
    async fn meal_plan_failure_is_generic() {
        let state = AppState::fake_with(Collaborators {
            llm: Arc::new(ScriptedLlm::replying(["no idea"])),
            ..Collaborators::fake()
        });
        let auth = bearer(&state);
        let res = build_app(state)
            .oneshot(
                Request::post("/api/v1/meal-plans")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(res).await["error"], "Failed to generate meal plan");
    }
}
