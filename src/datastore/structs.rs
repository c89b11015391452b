use crate::datastore::tables::{comments, posts, users};
use chrono::{offset::Utc, DateTime};
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user of the site, mirrored from the identity provider. The id is the
/// provider-issued id and is authoritative; this service never mints user ids.
#[derive(Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub image: Option<String>,
}

/// Parameters for the database statement which upserts mirrored users.
#[derive(Insertable, AsChangeset, Deserialize, Clone, Debug)]
#[table_name = "users"]
pub struct NewUser {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

/// A post on the learning board.
#[derive(Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Post {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub body: String,
    pub category: Category,
    /// Immutable after creation; authorization checks compare against this.
    pub author_id: String,
    /// Ids of users who currently like this post. Never contains duplicates.
    pub liked_ids: Vec<String>,
}

/// The fixed set of post categories. Unknown strings fail deserialization, which is how
/// category validation happens at the API boundary.
#[derive(DbEnum, Debug, PartialEq, Serialize, Deserialize, Clone, Copy, Eq, Hash)]
pub enum Category {
    Question,
    Resource,
    Discussion,
    Announcement,
}

impl Post {
    /// Whether the given user currently likes this post.
    pub fn liked_by(&self, user_id: &str) -> bool {
        self.liked_ids.iter().any(|id| id == user_id)
    }

    /// The liker set after one toggle by `user_id`: remove the id if present, append it
    /// otherwise. Membership-keyed, so toggling twice always round-trips.
    pub fn toggled_likes(&self, user_id: &str) -> Vec<String> {
        if self.liked_by(user_id) {
            self.liked_ids
                .iter()
                .filter(|id| *id != user_id)
                .cloned()
                .collect()
        } else {
            let mut liked = self.liked_ids.clone();
            liked.push(user_id.to_owned());
            liked
        }
    }
}

/// Parameters for the database statement which inserts new posts.
#[derive(Insertable)]
#[table_name = "posts"]
pub struct NewPost {
    pub body: String,
    pub category: Category,
    pub author_id: String,
    pub liked_ids: Vec<String>,
}

impl NewPost {
    /// New posts always start with an empty liker set.
    pub fn new(body: String, category: Category, author_id: String) -> Self {
        Self {
            body,
            category,
            author_id,
            liked_ids: Vec::new(),
        }
    }
}

/// A comment under a post. The parent post must exist when the comment is created;
/// comments have no update or delete surface.
#[derive(
    Queryable, Identifiable, Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, Associations,
)]
#[belongs_to(Post)]
#[belongs_to(User)]
pub struct Comment {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub body: String,
    pub post_id: Uuid,
    pub user_id: String,
}

/// Parameters for the database statement which inserts new comments.
#[derive(Insertable)]
#[table_name = "comments"]
pub struct NewComment {
    pub body: String,
    pub post_id: Uuid,
    pub user_id: String,
}

/// A post plus its comments, each joined with its author's mirrored profile.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Thread {
    pub post: Post,
    pub comments: Vec<ThreadComment>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ThreadComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

impl From<(Comment, User)> for ThreadComment {
    fn from((comment, user): (Comment, User)) -> Self {
        Self { comment, user }
    }
}

/// Rows removed by the maintenance wipe, per table.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct WipeReport {
    pub comments_deleted: usize,
    pub posts_deleted: usize,
    pub users_deleted: usize,
}
