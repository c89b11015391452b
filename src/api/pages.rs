//! View-model endpoints backing the client-rendered pages. The client keeps its own
//! expand/collapse state; this module just decides what there is to show.
use crate::api::{observe, State};
use crate::datastore::structs::{Post, ThreadComment, User};
use crate::datastore::Client;
use crate::fault::{Fallible, Surface, SurfaceAs};
use actix_web::web;
use actix_web_httpauth::extractors::bearer::BearerAuth;
use anyhow::anyhow;
use chrono::{offset::Utc, DateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment bodies longer than this get a preview; the client renders the preview with a
/// "more" toggle.
pub const COMMENT_PREVIEW_CHARS: usize = 100;

pub fn configure<DS: Client + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/pages/comments").route(web::get().to(comment_thread::<DS>)));
}

#[derive(Deserialize)]
pub struct ThreadQuery {
    /// Raw, not Uuid: a malformed id means the post doesn't resolve, which is a 404 on
    /// this page rather than a 400.
    #[serde(rename = "postId")]
    pub post_id: Option<String>,
}

/// Everything the comment-thread page renders.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ThreadPage {
    pub post: Post,
    /// None for anonymous readers; the client hides the composer.
    pub current_user: Option<User>,
    pub comments: Vec<CommentView>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct CommentView {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user: User,
    pub body: String,
    /// Set only when the body exceeds the preview threshold.
    pub preview: Option<String>,
}

impl From<ThreadComment> for CommentView {
    fn from(tc: ThreadComment) -> Self {
        let preview = preview(&tc.comment.body);
        Self {
            id: tc.comment.id,
            created_at: tc.comment.created_at,
            user: tc.user,
            body: tc.comment.body,
            preview,
        }
    }
}

/// The first COMMENT_PREVIEW_CHARS characters, or None if the body already fits.
/// Counts chars, not bytes, so multi-byte text never splits mid-character.
fn preview(body: &str) -> Option<String> {
    if body.chars().count() <= COMMENT_PREVIEW_CHARS {
        return None;
    }
    Some(body.chars().take(COMMENT_PREVIEW_CHARS).collect())
}

async fn comment_thread<DS: Client>(
    state: web::Data<State<DS>>,
    query: web::Query<ThreadQuery>,
    auth: Option<BearerAuth>,
) -> Fallible<web::Json<ThreadPage>> {
    observe("comment_thread", || async {
        let post_id = query
            .post_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok());
        guard!(let Some(post_id) = post_id else {
            return Err(anyhow!("comments page requested without a resolvable postId")
                .surface_as(Surface::not_found("page not found")));
        });
        guard!(let Some(thread) = state.ds.find_thread(post_id).await? else {
            return Err(anyhow!("post {} not found", post_id)
                .surface_as(Surface::not_found("page not found")));
        });

        // Anonymous readers are fine; a token that doesn't resolve to a profile just
        // renders the page signed out.
        let current_user = match &auth {
            Some(auth) => state.caller_profile(auth.token()).await.ok(),
            None => None,
        };

        Ok(web::Json(ThreadPage {
            post: thread.post,
            current_user,
            comments: thread.comments.into_iter().map(Into::into).collect(),
        }))
    })
    .await
}
