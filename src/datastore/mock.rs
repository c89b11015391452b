use crate::datastore::{
    postfilters::PostFilters,
    structs::{Comment, NewComment, NewPost, NewUser, Post, Thread, User, WipeReport},
};
use crate::fault::{Fallible, Surface, SurfaceAs};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::offset::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

type Store<T> = Arc<Mutex<Vec<T>>>;

/// An in-memory implementation of datastore::Client for tests.
#[derive(Clone, Default, Debug)]
pub struct Client {
    posts: Store<Post>,
    comments: Store<Comment>,
    users: Store<User>,
}

impl Client {
    pub fn set_users(&self, users: Vec<User>) {
        *self.users.lock().unwrap() = users;
    }

    pub fn user(id: &str, name: &str) -> User {
        User {
            id: id.to_owned(),
            created_at: Utc::now(),
            name: name.to_owned(),
            image: None,
        }
    }

    pub fn comment_count(&self) -> usize {
        self.comments.lock().unwrap().len()
    }
}

#[async_trait]
impl super::Client for Client {
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post> {
        let post = Post {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            body: new_post.body,
            category: new_post.category,
            author_id: new_post.author_id,
            liked_ids: new_post.liked_ids,
        };
        self.posts.lock().unwrap().push(post.clone());

        Ok(post)
    }

    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>> {
        let all_posts = self.posts.lock().unwrap();
        let mut results: Vec<_> = all_posts
            .iter()
            .filter(|p| p.matches(&filters))
            .cloned()
            .collect();
        // Newest first, like the SQL store, and only then truncate to the limit.
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        results.truncate(filters.limit as usize);
        Ok(results)
    }

    async fn find_post(&self, post_id: Uuid) -> Fallible<Option<Post>> {
        let post = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == post_id)
            .cloned();
        Ok(post)
    }

    async fn find_thread(&self, post_id: Uuid) -> Fallible<Option<Thread>> {
        guard!(let Some(post) = self.find_post(post_id).await? else {
            return Ok(None);
        });
        let users = self.users.lock().unwrap();
        let mut comments: Vec<Comment> = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let comments = comments
            .into_iter()
            .filter_map(|c| {
                let user = users.iter().find(|u| u.id == c.user_id)?.clone();
                Some((c, user).into())
            })
            .collect();
        Ok(Some(Thread { post, comments }))
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: String) -> Fallible<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        let post = posts.iter_mut().find(|p| p.id == post_id).map(|post| {
            post.liked_ids = post.toggled_likes(&user_id);
            post.clone()
        });
        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid) -> Fallible<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        guard!(let Some(index) = posts.iter().position(|p| p.id == post_id) else {
            return Ok(None);
        });
        let post = posts.remove(index);
        self.comments.lock().unwrap().retain(|c| c.post_id != post_id);
        Ok(Some(post))
    }

    async fn new_comment(&self, new_comment: NewComment) -> Fallible<Comment> {
        // Same behavior as the real store's foreign key: no parent, no comment.
        let parent_exists = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.id == new_comment.post_id);
        if !parent_exists {
            return Err(anyhow!("post {} does not exist", new_comment.post_id)
                .surface_as(Surface::not_found("post not found")));
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            body: new_comment.body,
            post_id: new_comment.post_id,
            user_id: new_comment.user_id,
        };
        self.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn get_user(&self, user_id: String) -> Fallible<Option<User>> {
        let user = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned();
        Ok(user)
    }

    async fn upsert_user(&self, new_user: NewUser) -> Fallible<User> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.id == new_user.id) {
            existing.name = new_user.name;
            existing.image = new_user.image;
            return Ok(existing.clone());
        }
        let user = User {
            id: new_user.id,
            created_at: Utc::now(),
            name: new_user.name,
            image: new_user.image,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn wipe_all(&self) -> Fallible<WipeReport> {
        let comments_deleted = std::mem::take(&mut *self.comments.lock().unwrap()).len();
        let posts_deleted = std::mem::take(&mut *self.posts.lock().unwrap()).len();
        let users_deleted = std::mem::take(&mut *self.users.lock().unwrap()).len();
        Ok(WipeReport {
            comments_deleted,
            posts_deleted,
            users_deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::Client;
    use crate::datastore::postfilters::PostFilters;
    use crate::datastore::structs::{Category, NewPost};
    use crate::datastore::Client as _;
    use std::thread::sleep;
    use std::time::Duration;

    #[actix_rt::test]
    async fn test_limit_keeps_the_newest_posts() {
        let ds = Client::default();
        let older = ds
            .new_post(NewPost::new(
                "older".to_owned(),
                Category::Question,
                "user_a".to_owned(),
            ))
            .await
            .unwrap();
        sleep(Duration::from_micros(10));
        let newer = ds
            .new_post(NewPost::new(
                "newer".to_owned(),
                Category::Question,
                "user_a".to_owned(),
            ))
            .await
            .unwrap();

        // The limit must truncate after the newest-first sort, like the SQL store's
        // ORDER BY created_at DESC LIMIT n, not in insertion order.
        let posts = ds
            .list_posts(PostFilters {
                limit: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, newer.id);

        let posts = ds.list_posts(PostFilters::default()).await.unwrap();
        assert_eq!(
            posts.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![newer.id, older.id]
        );
    }

    #[actix_rt::test]
    async fn test_interleaved_toggles_never_lose_one() {
        let ds = Client::default();
        let post = ds
            .new_post(NewPost::new(
                "toggle me".to_owned(),
                Category::Discussion,
                "user_a".to_owned(),
            ))
            .await
            .unwrap();

        // An even number of toggles by one user, run as concurrently as the store
        // allows, must leave their membership unchanged.
        let toggles: Vec<_> = (0..4)
            .map(|_| ds.toggle_like(post.id, "user_b".to_owned()))
            .collect();
        futures::future::join_all(toggles).await;

        let post = ds.find_post(post.id).await.unwrap().unwrap();
        assert!(post.liked_ids.is_empty());

        let toggles: Vec<_> = (0..3)
            .map(|_| ds.toggle_like(post.id, "user_b".to_owned()))
            .collect();
        futures::future::join_all(toggles).await;

        let post = ds.find_post(post.id).await.unwrap().unwrap();
        assert_eq!(post.liked_ids, vec!["user_b".to_owned()]);
    }
}

