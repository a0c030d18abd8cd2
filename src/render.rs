//! Server-side page rendering.
//!
//! DESIGN
//! ======
//! Handlebars templates are compiled into the binary and registered once at
//! startup. Handlers build a serializable page context and hand it to
//! [`Renderer::render`]; escaping is left to handlebars.

use axum::response::Html;
use handlebars::Handlebars;
use serde::Serialize;

use crate::services::composer::ComposerDraft;
use crate::services::session::SessionUser;
use crate::services::spotify::Playlist;

pub const DEFAULT_PLAYLIST_IMAGE: &str = "/static/default-playlist.png";
pub const BANNER_IMAGE: &str = "/static/banner-image.png";
const DEFAULT_AVATAR: &str = "/static/profile-picture.png";

const PARTIALS: &[(&str, &str)] = &[
    ("head", include_str!("../templates/head.hbs")),
    ("topbar", include_str!("../templates/topbar.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    ("landing", include_str!("../templates/landing.hbs")),
    ("home", include_str!("../templates/home.hbs")),
    ("profile", include_str!("../templates/profile.hbs")),
];

/// Static placeholder shown while the session status is indeterminate.
pub const LOADING_HTML: &str = include_str!("../templates/loading.html");

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("render error: {0}")]
    Render(#[from] handlebars::RenderError),
}

pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    /// Compile every embedded template.
    ///
    /// # Errors
    ///
    /// Returns an error if any template fails to parse.
    pub fn new() -> Result<Self, RenderError> {
        let mut registry = Handlebars::new();
        for (name, source) in PARTIALS {
            registry.register_partial(name, *source)?;
        }
        for (name, source) in PAGES {
            registry.register_template_string(name, *source)?;
        }
        Ok(Self { registry })
    }

    /// Render a registered page with `context`.
    pub fn render<T: Serialize>(&self, page: &str, context: &T) -> Result<Html<String>, RenderError> {
        Ok(Html(self.registry.render(page, context)?))
    }
}

// =============================================================================
// PAGE CONTEXTS
// =============================================================================

#[derive(Serialize)]
pub struct LandingPage {
    pub login_enabled: bool,
}

#[derive(Serialize)]
pub struct UserCard {
    pub name: String,
    pub avatar_url: String,
    pub followers: String,
}

impl From<&SessionUser> for UserCard {
    fn from(user: &SessionUser) -> Self {
        Self {
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone().unwrap_or_else(|| DEFAULT_AVATAR.to_owned()),
            followers: group_thousands(user.followers),
        }
    }
}

#[derive(Serialize)]
pub struct HomePage {
    pub user: UserCard,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PlaylistCard {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub external_url: String,
}

impl From<&Playlist> for PlaylistCard {
    fn from(p: &Playlist) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            image_url: p
                .image_url
                .clone()
                .unwrap_or_else(|| DEFAULT_PLAYLIST_IMAGE.to_owned()),
            external_url: p.external_url.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct FeaturedPost {
    pub author: &'static str,
    pub author_image: &'static str,
    pub title: &'static str,
    pub posted: &'static str,
    pub content: &'static str,
    pub images: &'static [&'static str],
}

/// Showcase post rendered under the composer.
pub static FEATURED_POST: FeaturedPost = FeaturedPost {
    author: "John Smith",
    author_image: DEFAULT_AVATAR,
    title: "My Recent Adventure",
    posted: "2 hours ago",
    content: "Had an amazing time hiking the trails at the national park. The views were breathtaking!",
    images: &["/static/playlist1.png", "/static/playlist3.png", "/static/playlist4.png"],
};

#[derive(Serialize)]
pub struct ProfilePage {
    pub user: UserCard,
    pub banner_url: &'static str,
    pub playlists: Vec<PlaylistCard>,
    pub draft_content: String,
    pub draft_images: Vec<String>,
    pub composer_error: Option<String>,
    pub post: &'static FeaturedPost,
}

impl ProfilePage {
    #[must_use]
    pub fn new(user: &SessionUser, playlists: &[Playlist], draft: &ComposerDraft, composer_error: Option<String>) -> Self {
        Self {
            user: UserCard::from(user),
            banner_url: BANNER_IMAGE,
            playlists: playlists.iter().map(PlaylistCard::from).collect(),
            draft_content: draft.content.clone(),
            draft_images: draft.image_urls(),
            composer_error,
            post: &FEATURED_POST,
        }
    }
}

/// `34554` -> `"34,554"`.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
