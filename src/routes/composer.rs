//! Post composer routes — upload previews, serve them back, submit.
//!
//! Both form actions accept the same multipart body (`content` text plus any
//! number of `images` files) so typed text survives an "Add Photos" round trip.

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use uuid::Uuid;

use super::auth::Gated;
use super::pages::render_profile_with_error;
use crate::services::composer::{self, ComposerDraft, ComposerError};
use crate::state::AppState;

/// Where composer actions land. The marker keeps the displayed gallery as is.
pub(crate) const COMPOSER_RETURN: &str = "/my-profile?composer";

/// Request body cap for composer uploads: a full draft of images plus form overhead.
pub const COMPOSER_BODY_LIMIT: usize = composer::MAX_IMAGES * composer::MAX_IMAGE_BYTES + 64 * 1024;

#[derive(Default)]
struct ComposerForm {
    content: Option<String>,
    uploads: Vec<(String, Bytes)>,
}

async fn read_form(mut multipart: Multipart) -> Result<ComposerForm, Response> {
    let mut form = ComposerForm::default();
    while let Some(field) = multipart.next_field().await.map_err(IntoResponse::into_response)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("content") => {
                form.content = Some(field.text().await.map_err(IntoResponse::into_response)?);
            }
            Some("images") => {
                let has_file_name = field.file_name().is_some_and(|n| !n.is_empty());
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field.bytes().await.map_err(IntoResponse::into_response)?;
                // Browsers send an empty part when no file was picked.
                if has_file_name || !bytes.is_empty() {
                    form.uploads.push((content_type, bytes));
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// Apply a whole form to the draft. A rejected field leaves the draft untouched.
fn apply(draft: &mut ComposerDraft, form: ComposerForm) -> Result<(), ComposerError> {
    let mut next = draft.clone();
    if let Some(content) = form.content {
        next.set_content(content);
    }
    for (content_type, bytes) in form.uploads {
        next.add_image(&content_type, bytes)?;
    }
    *draft = next;
    Ok(())
}

/// `POST /my-profile/composer/images` — add uploaded images to the draft.
pub async fn upload_images(State(state): State<AppState>, gated: Gated, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    let result = state
        .sessions
        .with_session(&gated.token, move |s| apply(&mut s.draft, form))
        .await;
    match result {
        Some(Ok(())) => Redirect::to(COMPOSER_RETURN).into_response(),
        Some(Err(e)) => {
            tracing::warn!(error = %e, "composer upload rejected");
            render_profile_with_error(&state, &gated, e.to_string()).await
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// `POST /my-profile/composer` — log the draft as a post and clear it.
pub async fn submit(State(state): State<AppState>, gated: Gated, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    let result = state
        .sessions
        .with_session(&gated.token, move |s| {
            apply(&mut s.draft, form)?;
            Ok::<_, ComposerError>(s.draft.submit())
        })
        .await;
    match result {
        Some(Ok(post)) => {
            tracing::debug!(chars = post.content.len(), images = post.image_urls.len(), "draft cleared");
            Redirect::to(COMPOSER_RETURN).into_response()
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "composer submit rejected");
            render_profile_with_error(&state, &gated, e.to_string()).await
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// `GET /my-profile/composer/images/{id}` — serve a draft image preview.
pub async fn preview_image(State(state): State<AppState>, gated: Gated, Path(id): Path<Uuid>) -> Response {
    let preview = state
        .sessions
        .with_session(&gated.token, |s| s.draft.image(id).cloned())
        .await
        .flatten();
    match preview {
        Some(img) => (
            [
                (header::CONTENT_TYPE, img.content_type),
                (header::CACHE_CONTROL, "no-store".to_owned()),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_owned()),
                (header::CONTENT_SECURITY_POLICY, "sandbox".to_owned()),
            ],
            img.bytes,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
#[path = "composer_test.rs"]
mod tests;
