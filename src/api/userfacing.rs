//! The userfacing mutation/query handlers. Every handler authenticates against the
//! identity boundary, re-reads whatever it needs from the datastore (never trusting
//! caller-supplied record state), and invalidates the cached listing page after a
//! successful mutation.
use crate::api::{observe, State};
use crate::datastore::postfilters::PostFilters;
use crate::datastore::structs::{Category, Comment, NewComment, NewPost, Post, Thread, User};
use crate::datastore::Client;
use crate::fault::{Fallible, Fault, Kind, Surface, SurfaceAs};
use actix_web::{web, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use anyhow::anyhow;
use serde::Deserialize;
use uuid::Uuid;

pub fn configure<DS: Client + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/posts")
            .route("", web::post().to(create_post::<DS>))
            .route("", web::get().to(list_posts::<DS>))
            .route("/{post_id}", web::get().to(get_post::<DS>))
            .route("/{post_id}", web::delete().to(delete_post::<DS>))
            .route("/{post_id}/likes", web::post().to(like_post::<DS>))
            .route("/{post_id}/comments", web::post().to(create_comment::<DS>)),
    )
    .service(web::resource("/me").route(web::get().to(current_user::<DS>)));
}

#[derive(Deserialize)]
pub struct CreatePostBody {
    pub body: String,
    /// Deserialization already rejects strings outside the fixed category set.
    pub category: Category,
}

#[derive(Deserialize)]
pub struct CreateCommentBody {
    pub body: String,
}

// Insert a post owned by the caller, with an empty liker set.
async fn create_post<DS: Client>(
    state: web::Data<State<DS>>,
    auth: BearerAuth,
    body: web::Json<CreatePostBody>,
) -> Fallible<web::Json<Post>> {
    observe("create_post", || async {
        let author_id = state.caller_id(auth.token())?;
        let body = body.into_inner();
        if body.body.trim().is_empty() {
            return Err(anyhow!("empty post body")
                .surface_as(Surface::invalid_field("post body must not be empty")));
        }
        let post = state
            .ds
            .new_post(NewPost::new(body.body, body.category, author_id))
            .await?;
        state.hook.invalidate_listing().await;
        Ok(web::Json(post))
    })
    .await
}

async fn list_posts<DS: Client>(
    state: web::Data<State<DS>>,
    filters: web::Query<PostFilters>,
) -> Fallible<web::Json<Vec<Post>>> {
    observe("list_posts", || async {
        let posts = state.ds.list_posts(filters.into_inner()).await?;
        Ok(web::Json(posts))
    })
    .await
}

// The post with its full comment thread.
async fn get_post<DS: Client>(
    state: web::Data<State<DS>>,
    post_id: web::Path<Uuid>,
) -> Fallible<web::Json<Thread>> {
    observe("get_post", || async {
        let post_id = post_id.into_inner();
        guard!(let Some(thread) = state.ds.find_thread(post_id).await? else {
            return Err(anyhow!("post {} not found", post_id)
                .surface_as(Surface::not_found("post not found")));
        });
        Ok(web::Json(thread))
    })
    .await
}

// Flip the caller's membership in the post's liker set.
async fn like_post<DS: Client>(
    state: web::Data<State<DS>>,
    auth: BearerAuth,
    post_id: web::Path<Uuid>,
) -> Fallible<HttpResponse> {
    observe("like_post", || async {
        let user = state.caller_profile(auth.token()).await?;
        let post_id = post_id.into_inner();
        guard!(let Some(_post) = state.ds.toggle_like(post_id, user.id).await? else {
            return Err(anyhow!("post {} not found", post_id)
                .surface_as(Surface::not_found("post not found")));
        });
        state.hook.invalidate_listing().await;
        // Callers re-fetch; the new liker set is not echoed back.
        Ok(HttpResponse::NoContent().finish())
    })
    .await
}

async fn delete_post<DS: Client>(
    state: web::Data<State<DS>>,
    auth: BearerAuth,
    post_id: web::Path<Uuid>,
) -> Fallible<web::Json<Post>> {
    observe("delete_post", || async {
        let user = state.caller_profile(auth.token()).await?;
        let post_id = post_id.into_inner();

        // The authorization decision uses the freshly read row. The caller's copy of the
        // post is never trusted for anything but its id.
        guard!(let Some(existing) = state.ds.find_post(post_id).await.map_err(as_failed)? else {
            return Err(anyhow!("post {} not found", post_id)
                .surface_as(Surface::not_found("unexisting")));
        });
        if existing.author_id != user.id {
            return Err(anyhow!(
                "user {} may not delete post {} authored by {}",
                user.id,
                post_id,
                existing.author_id
            )
            .surface_as(Surface::forbidden("unauthorized")));
        }

        guard!(let Some(deleted) = state.ds.delete_post(post_id).await.map_err(as_failed)? else {
            // Another delete won the race between our check and our delete.
            return Err(anyhow!("post {} vanished before deletion", post_id)
                .surface_as(Surface::not_found("unexisting")));
        });
        state.hook.invalidate_listing().await;
        Ok(web::Json(deleted))
    })
    .await
}

/// Store exceptions during deletion surface as the tag "failed".
fn as_failed(fault: Fault) -> Fault {
    Fault {
        internal: fault.internal,
        surface: Surface {
            kind: Kind::ServerError,
            text: "failed",
        },
    }
}

async fn create_comment<DS: Client>(
    state: web::Data<State<DS>>,
    auth: BearerAuth,
    post_id: web::Path<Uuid>,
    body: web::Json<CreateCommentBody>,
) -> Fallible<web::Json<Comment>> {
    observe("create_comment", || async {
        let user_id = state.caller_id(auth.token())?;
        let post_id = post_id.into_inner();
        let body = body.into_inner().body;
        if body.trim().is_empty() {
            return Err(anyhow!("empty comment body")
                .surface_as(Surface::invalid_field("comment body must not be empty")));
        }
        // The parent has to exist right now, per current persisted state.
        guard!(let Some(post) = state.ds.find_post(post_id).await? else {
            return Err(anyhow!("post {} not found", post_id)
                .surface_as(Surface::not_found("post not found")));
        });
        let comment = state
            .ds
            .new_comment(NewComment {
                body,
                post_id: post.id,
                user_id,
            })
            .await?;
        state.hook.invalidate_listing().await;
        Ok(web::Json(comment))
    })
    .await
}

async fn current_user<DS: Client>(
    state: web::Data<State<DS>>,
    auth: BearerAuth,
) -> Fallible<web::Json<User>> {
    observe("current_user", || async {
        let user = state.caller_profile(auth.token()).await?;
        Ok(web::Json(user))
    })
    .await
}
