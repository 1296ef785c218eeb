//! Paginated comment loading

use crate::api::{CommentApi, MAX_PAGE_SIZE};
use crate::comment::CommentSet;
use crate::error::Result;
use crate::types::VideoId;
use tracing::debug;

/// Fetch every top-level comment of a video.
///
/// Pages are requested one after another until the API stops returning a
/// continuation token. Any error discards what was accumulated so far.
pub fn fetch_all(api: &dyn CommentApi, video_id: &VideoId, page_size: u32) -> Result<CommentSet> {
    fetch_all_with(api, video_id, page_size, |_, _| {})
}

/// Like [`fetch_all`], reporting `(pages, comments)` after every page
pub fn fetch_all_with(
    api: &dyn CommentApi,
    video_id: &VideoId,
    page_size: u32,
    mut on_page: impl FnMut(usize, usize),
) -> Result<CommentSet> {
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let mut comments = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0;

    loop {
        let page = api.list_page(video_id, page_token.as_deref(), page_size)?;
        pages += 1;

        let has_more = page.has_more();
        comments.extend(page.items);
        on_page(pages, comments.len());

        if !has_more {
            break;
        }
        page_token = page.next_page_token;
    }

    debug!(
        "Fetched {} comments in {} pages for video {}",
        comments.len(),
        pages,
        video_id
    );
    Ok(CommentSet::new(video_id.clone(), comments))
}
