#[cfg(test)]
pub mod mock;
pub mod postfilters;
pub mod postgres;
pub mod structs;
pub mod tables;

use crate::datastore::structs::{
    Comment, NewComment, NewPost, NewUser, Post, Thread, User, WipeReport,
};
use crate::fault::Fallible;
use async_trait::async_trait;
use postfilters::PostFilters;
use uuid::Uuid;

#[async_trait]
/// The interface for storing posts, comments and mirrored user profiles. Handlers hold
/// no authoritative state of their own; every operation re-reads from the store.
pub trait Client: Clone {
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post>;
    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>>;
    async fn find_post(&self, post_id: Uuid) -> Fallible<Option<Post>>;
    /// The post with its comments, each joined with the commenter's profile.
    async fn find_thread(&self, post_id: Uuid) -> Fallible<Option<Thread>>;
    /// Re-read the post and flip the caller's membership in its liker set, as one
    /// transaction. Returns None if the post doesn't exist.
    async fn toggle_like(&self, post_id: Uuid, user_id: String) -> Fallible<Option<Post>>;
    /// Hard-delete. Returns the deleted post, or None if no row matched.
    async fn delete_post(&self, post_id: Uuid) -> Fallible<Option<Post>>;
    async fn new_comment(&self, new_comment: NewComment) -> Fallible<Comment>;
    async fn get_user(&self, user_id: String) -> Fallible<Option<User>>;
    /// Insert or update a profile mirrored from the identity provider.
    async fn upsert_user(&self, user: NewUser) -> Fallible<User>;
    /// Maintenance wipe: delete all comments, then posts, then users, in that
    /// dependency order.
    async fn wipe_all(&self) -> Fallible<WipeReport>;
}
