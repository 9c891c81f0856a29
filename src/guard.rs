//! Title validation in front of the page routes.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::warn;
use percent_encoding::percent_decode_str;

use crate::types::AppState;

pub type GuardedFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// True iff `candidate` is non-empty and only ASCII letters and digits
pub fn is_valid_title(candidate: &str) -> bool {
    !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Wrap a page operation so it only runs for a valid title.
///
/// The title is whatever follows `prefix` in the request path, percent-decoded.
/// Invalid titles get a bare 404 and `op` is not called.
pub fn guard<F, Fut>(
    prefix: &'static str,
    op: F,
) -> impl Fn(State<AppState>, Request) -> GuardedFuture + Clone + Send + Sync + 'static
where
    F: Fn(AppState, Request, String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    move |State(state): State<AppState>, req: Request| -> GuardedFuture {
        let op = op.clone();
        Box::pin(async move {
            let raw = req.uri().path().strip_prefix(prefix).unwrap_or_default();
            // Undecodable UTF-8 leaves an empty title, which is rejected below.
            let title = percent_decode_str(raw)
                .decode_utf8()
                .map(|t| t.into_owned())
                .unwrap_or_default();
            if !is_valid_title(&title) {
                warn!("Rejected invalid title {:?} under {}", raw, prefix);
                return StatusCode::NOT_FOUND.into_response();
            }
            op(state, req, title).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::{to_bytes, Body};

    use crate::components::Templates;
    use crate::services::FileStore;

    fn state() -> AppState {
        AppState::new(Arc::new(FileStore::new("unused".into())), Templates::builtin())
    }

    async fn call(path: &str, calls: Arc<AtomicUsize>) -> Response {
        let handler = guard("/view/", move |_state, _req, title: String| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                (StatusCode::OK, title).into_response()
            }
        });
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        handler(State(state()), req).await
    }

    #[test]
    fn accepts_letters_and_digits_only() {
        for ok in ["squirrel", "Ruby", "test123", "A", "0"] {
            assert!(is_valid_title(ok), "{ok}");
        }
        for bad in ["", "bad title", "a/b", "dot.txt", "dash-ed", "under_score", "ümlaut", "%20"] {
            assert!(!is_valid_title(bad), "{bad}");
        }
    }

    #[tokio::test]
    async fn forwards_valid_titles() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = call("/view/squirrel", calls.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn percent_encoded_titles_are_decoded_before_validation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = call("/view/squ%69rrel", calls.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let title = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&title[..], b"squirrel");

        for path in ["/view/a%2Fb", "/view/%FF", "/view/%2E%2E"] {
            assert_eq!(call(path, calls.clone()).await.status(), StatusCode::NOT_FOUND, "{path}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_titles_without_calling_op() {
        let calls = Arc::new(AtomicUsize::new(0));
        for path in ["/view/", "/view/a/b", "/view/bad%20title", "/view/..", "/view/x.txt"] {
            let response = call(path, calls.clone()).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
