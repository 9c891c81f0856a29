use axum::{
    extract::{FromRequest, Multipart, Query, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::errors::WikiError;
use crate::guard::guard;
use crate::types::{AppState, Page};

pub const VIEW_PREFIX: &str = "/view/";
pub const EDIT_PREFIX: &str = "/edit/";
pub const SAVE_PREFIX: &str = "/save/";

/// Submitted edit form
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    pub body: Option<String>,
}

/// Build the wiki router over `state`
pub fn router(state: AppState) -> Router {
    let view_page = guard(VIEW_PREFIX, view);
    let edit_page = guard(EDIT_PREFIX, edit);
    let save_page = guard(SAVE_PREFIX, save);

    // The bare prefixes are routed too so an empty title is rejected by the guard.
    Router::new()
        .route("/", get(handle_root))
        .route("/view/", get(view_page.clone()))
        .route("/view/*title", get(view_page))
        .route("/edit/", get(edit_page.clone()))
        .route("/edit/*title", get(edit_page))
        .route("/save/", get(save_page.clone()).post(save_page.clone()))
        .route("/save/*title", get(save_page.clone()).post(save_page))
        .with_state(state)
}

/// Handle root path requests
pub async fn handle_root() -> &'static str {
    "Welcome! Go to /view/[topic] to read, edit, or add that topic to the wiki. For example: /view/squirrel, /view/ruby, /view/test"
}

/// Show a page, or send the reader to the editor when it does not exist yet
pub async fn view(state: AppState, _req: Request, title: String) -> Response {
    log::info!("View request for '{}'", title);

    match state.store.read(&title).await {
        Ok(page) => render(&state, "view", &page),
        Err(WikiError::NotFound) => {
            log::debug!("Page '{}' missing, redirecting to editor", title);
            found(&format!("{}{}", EDIT_PREFIX, title))
        }
        Err(e) => {
            log::error!("Failed to load page '{}': {}", title, e);
            e.into_response()
        }
    }
}

/// Show the edit form; a missing page opens a blank form
pub async fn edit(state: AppState, _req: Request, title: String) -> Response {
    log::info!("Edit request for '{}'", title);

    let page = match state.store.read(&title).await {
        Ok(page) => page,
        Err(WikiError::NotFound) => {
            log::debug!("Page '{}' missing, starting a new one", title);
            Page::blank(title)
        }
        Err(e) => {
            log::error!("Failed to load page '{}' for editing: {}", title, e);
            return e.into_response();
        }
    };
    render(&state, "edit", &page)
}

/// Store the submitted body and go back to the page
pub async fn save(state: AppState, req: Request, title: String) -> Response {
    let body = submitted_body(&state, req).await;

    log::info!("Save request for '{}', {} bytes", title, body.len());
    let page = Page::new(title, body);

    if let Err(e) = state.store.write(&page.title, &page.body).await {
        log::error!("Failed to save page '{}': {}", page.title, e);
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    found(&format!("{}{}", VIEW_PREFIX, page.title))
}

/// The `body` field from a urlencoded or multipart form, else from the query string.
///
/// A request carrying neither saves an empty page.
async fn submitted_body(state: &AppState, req: Request) -> String {
    let from_query = Query::<SaveForm>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(form)| form.body);

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let from_form = if content_type.starts_with("application/x-www-form-urlencoded") {
        match Form::<SaveForm>::from_request(req, state).await {
            Ok(Form(form)) => form.body,
            Err(rejection) => {
                log::warn!("Ignoring unreadable form body: {}", rejection);
                None
            }
        }
    } else if content_type.starts_with("multipart/form-data") {
        match Multipart::from_request(req, state).await {
            Ok(multipart) => multipart_body(multipart).await,
            Err(rejection) => {
                log::warn!("Ignoring unreadable multipart body: {}", rejection);
                None
            }
        }
    } else {
        None
    };

    from_form.or(from_query).unwrap_or_default()
}

async fn multipart_body(mut multipart: Multipart) -> Option<String> {
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("body") => return field.text().await.ok(),
            Ok(Some(_)) => continue,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Ignoring malformed multipart field: {}", e);
                return None;
            }
        }
    }
}

fn render(state: &AppState, template: &str, page: &Page) -> Response {
    match state.templates.render(template, page) {
        Ok(html) => html.into_response(),
        Err(e) => {
            log::error!("Failed to render '{}' for page '{}': {}", template, page.title, e);
            e.into_response()
        }
    }
}

/// 302 redirect to `location`
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
