use crate::datastore::{
    postfilters::PostFilters,
    postgres::{
        errors::{BlockingResp, DbPoolResult},
        PostgresStore,
    },
    structs::{Comment, NewComment, NewPost, NewUser, Post, Thread, User, WipeReport},
    tables::{comments, posts, users},
    Client,
};
use crate::fault::{Fallible, Fault};
use actix_web::web::block;
use async_trait::async_trait;
use diesel::{
    expression::BoxableExpression,
    pg::Pg,
    query_dsl::{QueryDsl, RunQueryDsl},
    sql_types::Bool,
    Connection, ExpressionMethods, OptionalExtension, TextExpressionMethods,
};
use uuid::Uuid;

#[async_trait]
impl Client for PostgresStore {
    async fn new_post(&self, new_post: NewPost) -> Fallible<Post> {
        let conn = self.pool.get()?;
        let post = block(move || {
            conn.transaction::<_, Fault, _>(|| {
                // Insert the new post
                let post: Post = diesel::insert_into(posts::table)
                    .values(&new_post)
                    .get_result(&conn)?;

                Ok(post)
            })
        })
        .await
        .to_resp()?;
        Ok(post)
    }

    async fn list_posts(&self, filters: PostFilters) -> Fallible<Vec<Post>> {
        let conn = self.pool.get()?;
        let query_result: DbPoolResult<_> = block(move || {
            let mut query = posts::table.into_boxed();
            let limit = filters.limit;
            for filter in filters.as_sql_where() {
                query = query.filter(filter);
            }
            // Newest first: this feeds the listing page.
            let posts = query
                .limit(limit as i64)
                .order_by(posts::created_at.desc())
                .get_results(&conn)?;

            Ok(posts)
        })
        .await;
        Ok(query_result.to_resp()?)
    }

    async fn find_post(&self, post_id: Uuid) -> Fallible<Option<Post>> {
        let conn = self.pool.get()?;
        let query_result: DbPoolResult<_> = block(move || {
            let post: Option<Post> = posts::table.find(post_id).first(&conn).optional()?;
            Ok(post)
        })
        .await;
        Ok(query_result.to_resp()?)
    }

    async fn find_thread(&self, post_id: Uuid) -> Fallible<Option<Thread>> {
        let conn = self.pool.get()?;
        let query_result: DbPoolResult<_> = block(move || {
            let post: Option<Post> = posts::table.find(post_id).first(&conn).optional()?;
            guard!(let Some(post) = post else {
                return Ok(None);
            });

            // Each comment joined with its author's mirrored profile, oldest first.
            let rows: Vec<(Comment, User)> = comments::table
                .inner_join(users::table)
                .filter(comments::post_id.eq(post_id))
                .order_by(comments::created_at.asc())
                .get_results(&conn)?;

            Ok(Some(Thread {
                post,
                comments: rows.into_iter().map(Into::into).collect(),
            }))
        })
        .await;
        Ok(query_result.to_resp()?)
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: String) -> Fallible<Option<Post>> {
        let conn = self.pool.get()?;
        let post = block(move || {
            // SELECT ... FOR UPDATE: a concurrent toggle blocks here until this
            // transaction commits, then re-reads the committed liker set. Without the
            // row lock both could read the same set and one toggle would be lost.
            conn.transaction::<_, Fault, _>(|| {
                let existing: Option<Post> = posts::table
                    .find(post_id)
                    .for_update()
                    .first(&conn)
                    .optional()?;
                guard!(let Some(existing) = existing else {
                    return Ok(None);
                });

                let updated: Post = diesel::update(posts::table.find(post_id))
                    .set(posts::liked_ids.eq(existing.toggled_likes(&user_id)))
                    .get_result(&conn)?;
                Ok(Some(updated))
            })
        })
        .await
        .to_resp()?;
        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid) -> Fallible<Option<Post>> {
        let conn = self.pool.get()?;
        let post = block(move || {
            conn.transaction::<_, Fault, _>(|| {
                // Comments reference the post, so they go first.
                diesel::delete(comments::table.filter(comments::post_id.eq(post_id)))
                    .execute(&conn)?;
                let deleted: Option<Post> = diesel::delete(posts::table.find(post_id))
                    .get_result::<Post>(&conn)
                    .optional()?;
                Ok(deleted)
            })
        })
        .await
        .to_resp()?;
        Ok(post)
    }

    async fn new_comment(&self, new_comment: NewComment) -> Fallible<Comment> {
        let conn = self.pool.get()?;
        let comment = block(move || {
            conn.transaction::<_, Fault, _>(|| {
                let comment: Comment = diesel::insert_into(comments::table)
                    .values(&new_comment)
                    .get_result(&conn)?;

                Ok(comment)
            })
        })
        .await
        .to_resp()?;
        Ok(comment)
    }

    async fn get_user(&self, user_id: String) -> Fallible<Option<User>> {
        let conn = self.pool.get()?;
        let query_result: DbPoolResult<_> = block(move || {
            let user: Option<User> = users::table.find(user_id).first(&conn).optional()?;
            Ok(user)
        })
        .await;
        Ok(query_result.to_resp()?)
    }

    async fn upsert_user(&self, user: NewUser) -> Fallible<User> {
        let conn = self.pool.get()?;
        let upserted = block(move || {
            conn.transaction::<_, Fault, _>(|| {
                let upserted: User = diesel::insert_into(users::table)
                    .values(&user)
                    .on_conflict(users::id)
                    .do_update()
                    .set(&user)
                    .get_result(&conn)?;
                Ok(upserted)
            })
        })
        .await
        .to_resp()?;
        Ok(upserted)
    }

    async fn wipe_all(&self) -> Fallible<WipeReport> {
        let conn = self.pool.get()?;
        // Three separate statements in dependency order, deliberately not one
        // transaction. The pooled connection goes back to the pool when `conn` drops,
        // whichever delete fails.
        let query_result: DbPoolResult<_> = block(move || {
            let comments_deleted = diesel::delete(comments::table).execute(&conn)?;
            let posts_deleted = diesel::delete(posts::table).execute(&conn)?;
            let users_deleted = diesel::delete(users::table).execute(&conn)?;
            Ok(WipeReport {
                comments_deleted,
                posts_deleted,
                users_deleted,
            })
        })
        .await;
        Ok(query_result.to_resp()?)
    }
}

impl PostFilters {
    pub fn as_sql_where(
        &self,
    ) -> Vec<Box<dyn BoxableExpression<posts::table, Pg, SqlType = Bool>>> {
        let mut wheres: Vec<Box<dyn BoxableExpression<posts::table, Pg, SqlType = Bool>>> =
            Vec::new();
        if let Some(category) = self.category {
            wheres.push(Box::new(posts::category.eq(category)))
        }
        if let Some(author_id) = &self.author_id {
            wheres.push(Box::new(posts::author_id.eq(author_id.clone())))
        }
        if let Some(substring) = &self.body_contains {
            wheres.push(Box::new(posts::body.like(format!("%{}%", substring))))
        }
        wheres
    }
}
