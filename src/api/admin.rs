//! Out-of-band administrative surface: profile sync from the identity provider's user
//! webhook, and the maintenance wipe. Served on its own listener, which is expected to
//! be network-isolated.
use crate::api::{observe, State};
use crate::datastore::structs::{NewUser, User, WipeReport};
use crate::datastore::Client;
use crate::fault::Fallible;
use actix_web::web;

pub fn configure<DS: Client + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/users").route(web::put().to(sync_user::<DS>)))
        .service(web::resource("/wipe").route(web::post().to(wipe::<DS>)));
}

// Mirror a user profile from the identity provider. Insert or update by provider id.
async fn sync_user<DS: Client>(
    state: web::Data<State<DS>>,
    body: web::Json<NewUser>,
) -> Fallible<web::Json<User>> {
    observe("sync_user", || async {
        let user = state.ds.upsert_user(body.into_inner()).await?;
        Ok(web::Json(user))
    })
    .await
}

// Delete everything: comments, then posts, then users.
async fn wipe<DS: Client>(state: web::Data<State<DS>>) -> Fallible<web::Json<WipeReport>> {
    observe("wipe", || async {
        let report = state.ds.wipe_all().await?;
        Ok(web::Json(report))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Verifier;
    use crate::datastore::mock;
    use crate::datastore::structs::{Category, NewComment, NewPost};
    use crate::datastore::Client as _;
    use crate::revalidate::RevalidateHook;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn state() -> State<mock::Client> {
        State {
            ds: Arc::new(mock::Client::default()),
            verifier: Arc::new(Verifier::disabled()),
            hook: Arc::new(RevalidateHook::new(None)),
        }
    }

    #[actix_rt::test]
    async fn test_sync_user_upserts() {
        let state = state();
        let mut app = test::init_service(
            App::new()
                .data(state.clone())
                .configure(configure::<mock::Client>),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/users")
            .set_json(&serde_json::json!({"id": "user_a", "name": "Ada", "image": null}))
            .to_request();
        let user: User = test::read_response_json(&mut app, req).await;
        assert_eq!(user.name, "Ada");

        // Same id again: update, not duplicate.
        let req = test::TestRequest::put()
            .uri("/users")
            .set_json(&serde_json::json!({
                "id": "user_a",
                "name": "Ada L.",
                "image": "https://img.example/ada.png",
            }))
            .to_request();
        let user: User = test::read_response_json(&mut app, req).await;
        assert_eq!(user.name, "Ada L.");
        assert_eq!(
            state.ds.get_user("user_a".to_owned()).await.unwrap().unwrap().name,
            "Ada L."
        );
    }

    #[actix_rt::test]
    async fn test_wipe_empties_every_table() {
        let state = state();
        state
            .ds
            .upsert_user(NewUser {
                id: "user_a".to_owned(),
                name: "Ada".to_owned(),
                image: None,
            })
            .await
            .unwrap();
        let post = state
            .ds
            .new_post(NewPost::new(
                "to be wiped".to_owned(),
                Category::Discussion,
                "user_a".to_owned(),
            ))
            .await
            .unwrap();
        state
            .ds
            .new_comment(NewComment {
                body: "same".to_owned(),
                post_id: post.id,
                user_id: "user_a".to_owned(),
            })
            .await
            .unwrap();

        let mut app = test::init_service(
            App::new()
                .data(state.clone())
                .configure(configure::<mock::Client>),
        )
        .await;

        let req = test::TestRequest::post().uri("/wipe").to_request();
        let report: WipeReport = test::read_response_json(&mut app, req).await;
        assert_eq!(
            report,
            WipeReport {
                comments_deleted: 1,
                posts_deleted: 1,
                users_deleted: 1,
            }
        );

        assert_eq!(state.ds.find_post(post.id).await.unwrap(), None);
        assert_eq!(state.ds.get_user("user_a".to_owned()).await.unwrap(), None);
        assert_eq!(state.ds.comment_count(), 0);

        // Wiping an empty store is fine and reports zeroes.
        let req = test::TestRequest::post().uri("/wipe").to_request();
        let report: WipeReport = test::read_response_json(&mut app, req).await;
        assert_eq!(report, WipeReport::default());
    }
}
