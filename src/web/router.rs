use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};

use crate::{
    modules,
    ordered::kind::MAX_FORM_BYTES,
    web::{AppState, admins, auth, backup},
};

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/admin/auth/login", post(auth::login))
        .route("/admin/auth/logout", post(auth::logout))
        .route("/admin/create-admin", post(admins::create_admin))
        .route("/admin/getAll-admin", get(admins::list_admins))
        .route("/admin/get-admin", get(admins::current_admin))
        .route("/admin/edit/:id", put(admins::update_admin))
        .route("/admin/delete/:id", delete(admins::delete_admin))
        .route("/admin/db-backup", get(backup::download_backup))
        .merge(modules::gallery::router())
        .merge(modules::leadership::router())
        .merge(modules::testimonials::router())
        .merge(modules::partners::router())
        .merge(modules::career::router())
        .merge(modules::pages::router())
        .merge(modules::intake::router());

    with_upload_limit(router).with_state(state)
}

/// Raises the request body cap so the largest multipart form fits.
pub fn with_upload_limit<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        extract::State,
        http::{Request, header},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        media::testing::RecordingStore,
        ordered::PARTNER_INSTITUTIONS,
        web::{
            error::AppResult,
            extract::Multipart,
            forms::upload_fields,
            responses::ApiResponse,
            uploads::process_upload_form,
        },
    };

    const BOUNDARY: &str = "outreach-test-boundary";

    fn multipart_body(files: &[(&str, &str, usize)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (field, file_name, size) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
                     filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend(std::iter::repeat_n(0x89u8, *size));
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn store_partner_form(
        State(store): State<Arc<RecordingStore>>,
        multipart: Multipart,
    ) -> AppResult<ApiResponse<usize>> {
        let outcome = process_upload_form(
            multipart.0,
            store.as_ref(),
            &upload_fields(&PARTNER_INSTITUTIONS),
            2,
        )
        .await?;
        Ok(ApiResponse::ok(outcome.files.len()))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn partner_form_larger_than_the_default_limit_is_accepted() {
        let store = Arc::new(RecordingStore::default());
        let app = with_upload_limit(
            Router::new().route("/upload", post(store_partner_form)),
        )
        .with_state(store.clone());

        let body = multipart_body(&[
            ("featuredImage", "front.png", 1_500_000),
            ("detailImages", "hall.png", 1_500_000),
        ]);
        let request = Request::post("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"], 2);
        let stored = store.stored();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].starts_with("partner-institutions/"));
        assert!(stored[1].starts_with("partner-institutions/details/"));
    }

    #[tokio::test]
    async fn malformed_json_body_gets_the_error_envelope() {
        let app = build_router(AppState::detached(Arc::new(RecordingStore::default())));
        let request = Request::put("/admin/gallery/reorder")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn malformed_query_gets_the_error_envelope() {
        let app = build_router(AppState::detached(Arc::new(RecordingStore::default())));
        let request = Request::get("/admin/db-backup?format=csv&format=")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["success"], false);
    }
}
