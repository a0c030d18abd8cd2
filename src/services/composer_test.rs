use super::*;

fn png() -> Bytes {
    Bytes::from_static(b"\x89PNG\r\n\x1a\n")
}

#[test]
fn new_draft_is_empty() {
    let draft = ComposerDraft::default();
    assert!(draft.content.is_empty());
    assert!(draft.images().is_empty());
}

#[test]
fn add_image_returns_servable_preview() {
    let mut draft = ComposerDraft::default();
    let id = draft.add_image("image/png", png()).unwrap();
    let preview = draft.image(id).unwrap();
    assert_eq!(preview.content_type, "image/png");
    assert_eq!(preview.bytes, png());
    assert_eq!(draft.image_urls(), vec![format!("/my-profile/composer/images/{id}")]);
}

#[test]
fn previews_accumulate_in_upload_order() {
    let mut draft = ComposerDraft::default();
    let a = draft.add_image("image/png", png()).unwrap();
    let b = draft.add_image("image/jpeg", png()).unwrap();
    let ids: Vec<Uuid> = draft.images().iter().map(|img| img.id).collect();
    assert_eq!(ids, vec![a, b]);
}

#[test]
fn add_image_rejects_non_images() {
    let mut draft = ComposerDraft::default();
    let err = draft.add_image("application/pdf", png()).unwrap_err();
    assert!(matches!(err, ComposerError::NotAnImage(ref ct) if ct == "application/pdf"));
    assert!(draft.images().is_empty());
}

#[test]
fn add_image_rejects_svg() {
    let mut draft = ComposerDraft::default();
    for ct in ["image/svg+xml", "IMAGE/SVG+XML", "image/svg+xml; charset=utf-8"] {
        assert!(matches!(draft.add_image(ct, png()), Err(ComposerError::NotAnImage(_))), "{ct}");
    }
    assert!(draft.images().is_empty());
}

#[test]
fn add_image_accepts_raster_with_parameters() {
    let mut draft = ComposerDraft::default();
    assert!(draft.add_image("image/webp; q=1", png()).is_ok());
}

#[test]
fn add_image_enforces_count_limit() {
    let mut draft = ComposerDraft::default();
    for _ in 0..MAX_IMAGES {
        draft.add_image("image/png", png()).unwrap();
    }
    let err = draft.add_image("image/png", png()).unwrap_err();
    assert!(matches!(err, ComposerError::TooManyImages { max: MAX_IMAGES }));
}

#[test]
fn add_image_enforces_size_limit() {
    let mut draft = ComposerDraft::default();
    let big = Bytes::from(vec![0_u8; MAX_IMAGE_BYTES + 1]);
    assert!(matches!(draft.add_image("image/png", big), Err(ComposerError::ImageTooLarge { .. })));
}

#[test]
fn unknown_image_id_is_none() {
    let draft = ComposerDraft::default();
    assert!(draft.image(Uuid::new_v4()).is_none());
}

#[test]
fn submit_returns_post_and_clears_draft() {
    let mut draft = ComposerDraft::default();
    draft.set_content("Road trip mix");
    let id = draft.add_image("image/png", png()).unwrap();

    let post = draft.submit();

    assert_eq!(post.content, "Road trip mix");
    assert_eq!(post.image_urls, vec![preview_url(id)]);
    assert!(draft.content.is_empty());
    assert!(draft.images().is_empty());
    assert!(draft.image(id).is_none());
}

#[test]
fn submit_empty_draft_is_allowed() {
    let mut draft = ComposerDraft::default();
    let post = draft.submit();
    assert!(post.content.is_empty());
    assert!(post.image_urls.is_empty());
}
