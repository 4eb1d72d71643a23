use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::employees;
use crate::state::AppState;
use crate::storage::UPLOADS_ROUTE;

pub fn build_app(state: AppState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .merge(employees::router(state.config.max_upload_bytes))
        .route("/health", get(|| async { "ok" }))
        .nest_service(&format!("/{UPLOADS_ROUTE}"), uploads)
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
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = addr.parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::employees::{memory::MemoryRecordStore, RecordService};
    use crate::storage::LocalStorage;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use bytes::Bytes;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let res = build_app(AppState::fake()).oneshot(get("/health")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn serves_stored_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            upload_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let files = LocalStorage::new(dir.path()).await.unwrap();
        let reference = crate::storage::StorageClient::put_object(
            &files,
            "42-deadbeef.png",
            Bytes::from_static(b"pixels"),
            "image/png",
        )
        .await
        .unwrap();

        let records = RecordService::new(Arc::new(MemoryRecordStore::new()), Arc::new(files));
        let app = build_app(AppState::from_parts(Arc::new(config), records));

        let res = app.clone().oneshot(get(&format!("/{reference}"))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"pixels");

        let res = app.oneshot(get("/uploads/missing.png")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
