//! Client side of a small news site: article search, a front page with a
//! date header and article cards, and per-article comments kept by a
//! backend elsewhere.

pub mod article;
pub mod backend;
pub mod comment;
pub mod config;
pub mod date;
pub mod error;
pub mod page;
pub mod request;
pub mod search;
pub mod surface;

pub use article::{image_src, present, Article, ArticleCard, ArticleSummary, FALLBACK_IMAGE};
pub use backend::Backend;
pub use comment::{
    format_comment_count, Comment, CommentRequest, Moderation, REDACTION_MARK,
    REMOVED_BY_MODERATOR,
};
pub use config::{ClientConfig, Config, PageConfig};
pub use date::{format_date, today};
pub use error::{FetchError, Result};
pub use page::FrontPage;
pub use search::SearchClient;
pub use surface::{
    auto_resize, login, logout, Height, Location, Navigator, TextField, LOGIN_PATH, LOGOUT_PATH,
};
