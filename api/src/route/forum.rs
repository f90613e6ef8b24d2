use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::forum::{
    create_comment, create_post, delete_comment, delete_post, like_comment, like_post, list_posts,
    show_post, update_post,
};

pub fn build_forum_routers() -> Router<AppRegistry> {
    let forum_routers = Router::new()
        .route("/posts", get(list_posts))
        .route("/posts", post(create_post))
        .route("/posts/:post_id", get(show_post))
        .route("/posts/:post_id", put(update_post))
        .route("/posts/:post_id", delete(delete_post))
        .route("/posts/:post_id/comments", post(create_comment))
        .route("/posts/:post_id/like", post(like_post))
        .route("/comments/:comment_id", delete(delete_comment))
        .route("/comments/:comment_id/like", post(like_comment));

    Router::new().nest("/forum", forum_routers)
}
