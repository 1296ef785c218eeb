//! Platform seams
//!
//! The comment API and the credential flow are external collaborators. The
//! pipeline only sees these traits; `ts-client` provides the YouTube
//! implementations and `testing` provides in-memory fakes.

use crate::comment::CommentPage;
use crate::error::Result;
use crate::types::{CommentId, ModerationStatus, VideoId};
use std::path::Path;
use std::sync::Arc;

/// Maximum page size accepted by the comment listing endpoint
pub const MAX_PAGE_SIZE: u32 = 100;

/// OAuth scope needed to list and moderate comments
pub const YOUTUBE_FORCE_SSL_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

/// Authorized handle on the comment API
pub trait CommentApi: Send + Sync {
    /// Fetch one page of top-level comment threads
    fn list_page(
        &self,
        video_id: &VideoId,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<CommentPage>;

    /// Change the moderation status of a comment
    fn set_moderation_status(
        &self,
        comment_id: &CommentId,
        status: ModerationStatus,
        ban_author: bool,
    ) -> Result<()>;
}

/// Credential flow producing an authorized API handle
pub trait Authenticator: Send + Sync {
    /// Run the flow with the given client credentials file.
    ///
    /// `on_consent_url` receives the URL the operator has to open, if the flow
    /// needs one.
    fn authenticate(
        &self,
        credentials: &Path,
        on_consent_url: &mut dyn FnMut(&str),
    ) -> Result<Arc<dyn CommentApi>>;
}
