use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{FormRejection, PathRejection},
        DefaultBodyLimit, Form, FromRequest, Multipart, Path, Request, State,
    },
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::{debug, error, info, log_enabled, warn, Level};

use crate::errors::WikiError;
use crate::services::MarkupService;
use crate::types::{AppState, Page, Title};
use crate::utils::last_modified_html;

/// Largest accepted save request
pub const MAX_FORM_BYTES: usize = 10 * 1024 * 1024;

/// Build the wiki router.
///
/// Only `/`, `/view/{title}`, `/edit/{title}` and `/save/{title}` are served;
/// every other path is a 404, as is any title outside `[a-zA-Z0-9]+`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_list))
        .route("/view/:title", get(handle_view))
        .route("/edit/:title", get(handle_edit))
        .route("/save/:title", post(handle_save))
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
        .with_state(state)
}

/// List every page saved during this run
pub async fn handle_list(State(state): State<AppState>) -> Result<Response, WikiError> {
    let pages = state.store.list();
    info!("Listing {} pages", pages.len());
    let html = state.templates.render_list(&pages).inspect_err(log_render_failure)?;
    Ok(Html(html).into_response())
}

/// Show a page, or send the client to its edit form if it does not exist yet
pub async fn handle_view(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, WikiError> {
    let title = title_from(path)?;
    info!("View request received: '{}'", title);

    let page = match state.store.load(&title) {
        Ok(page) => page,
        Err(WikiError::PageMissing(_)) => {
            debug!("Page '{}' missing, redirecting to edit", title);
            return Ok(found(format!("/edit/{}", title)));
        }
        Err(e) => return Err(e),
    };

    let markup = MarkupService::new();
    if log_enabled!(Level::Debug) {
        for linked in markup.linked_titles(&page.body) {
            if let Ok(target) = Title::parse(&linked) {
                if !state.store.path_for(&target).is_file() {
                    debug!("Page '{}' links to missing page '{}'", title, target);
                }
            }
        }
    }
    let content = markup.render(&page.body);
    let meta = last_modified_html(&state.store.path_for(&title));

    let html = state
        .templates
        .render_view(&title, &content, &meta)
        .inspect_err(log_render_failure)?;
    Ok(Html(html).into_response())
}

/// Show the edit form, empty when the page does not exist
pub async fn handle_edit(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, WikiError> {
    let title = title_from(path)?;
    info!("Edit request received: '{}'", title);

    let page = state.store.load(&title).unwrap_or_else(|_| {
        debug!("Page '{}' missing, opening empty edit form", title);
        Page::empty(title.clone())
    });

    let html = state.templates.render_edit(&page).inspect_err(log_render_failure)?;
    Ok(Html(html).into_response())
}

/// Store the submitted body and redirect to the page view.
pub async fn handle_save(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    request: Request,
) -> Result<Response, WikiError> {
    let title = title_from(path)?;
    let body = submitted_body(request, &state).await.inspect_err(|e| {
        warn!("Rejected save of '{}': {}", title, e);
    })?;
    info!("Save request received: '{}' ({} bytes)", title, body.len());

    state.store.save(&Page::new(title.clone(), body))?;
    Ok(found(format!("/view/{}", title)))
}

pub async fn handle_not_found(uri: Uri) -> WikiError {
    debug!("No route for '{}'", uri.path());
    WikiError::NotFound
}

fn title_from(path: Result<Path<String>, PathRejection>) -> Result<Title, WikiError> {
    let Path(raw) = path.map_err(|rejection| {
        debug!("Rejected path segment: {}", rejection);
        WikiError::NotFound
    })?;
    Title::parse(&raw).inspect_err(|_| debug!("Rejected title: {:?}", raw))
}

/// First `body` field of a urlencoded or multipart form.
///
/// A request without a form content type, or a form without a `body` field,
/// yields an empty body. Oversized or malformed forms are errors so that an
/// existing page is never overwritten with a truncated body.
async fn submitted_body(request: Request, state: &AppState) -> Result<String, WikiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|rejection| WikiError::BadForm {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;
        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            if field.name() == Some("body") {
                return field.text().await.map_err(bad_multipart);
            }
        }
        return Ok(String::new());
    }

    match Form::<Vec<(String, String)>>::from_request(request, state).await {
        Ok(Form(fields)) => Ok(fields
            .into_iter()
            .find(|(name, _)| name == "body")
            .map(|(_, value)| value)
            .unwrap_or_default()),
        Err(FormRejection::InvalidFormContentType(_)) => {
            debug!("Save without a form content type, using empty body");
            Ok(String::new())
        }
        Err(rejection) => Err(WikiError::BadForm {
            status: rejection.status(),
            message: rejection.body_text(),
        }),
    }
}

fn bad_multipart(err: MultipartError) -> WikiError {
    WikiError::BadForm { status: StatusCode::BAD_REQUEST, message: err.to_string() }
}

fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

fn log_render_failure(err: &WikiError) {
    error!("Render failed: {}", err);
}
