use crate::{
    extractor::{AppJson, AppPath, AppQuery, AuthorizedUser, OptionalUser},
    model::{
        forum::{
            CommentResponse, CreateCommentRequest, CreatePostRequest, LikeResponse,
            PostDetailResponse, PostListQuery, PostResponse, UpdatePostRequest,
        },
        pagination::{PaginatedResponse, PaginationQuery},
        response::ApiResponse,
    },
};
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    forum::{
        event::{ToggleCommentLike, TogglePostLike},
        ForumComment, ForumPost, PostListOptions,
    },
    id::{CommentId, PostId, UserId},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

async fn fetch_post(
    registry: &AppRegistry,
    post_id: PostId,
    viewer: Option<UserId>,
) -> AppResult<ForumPost> {
    registry
        .forum_repository()
        .find_post_by_id(post_id, viewer)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("post ({post_id}) not found")))
}

async fn fetch_comment(registry: &AppRegistry, comment_id: CommentId) -> AppResult<ForumComment> {
    registry
        .forum_repository()
        .find_comment_by_id(comment_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("comment ({comment_id}) not found")))
}

// 投稿者本人か SUPER_ADMIN のみ変更できる
fn ensure_author(user: &AuthorizedUser, author_id: UserId) -> AppResult<()> {
    if user.id() == author_id || user.is_super_admin() {
        Ok(())
    } else {
        Err(AppError::ForbiddenOperation)
    }
}

pub async fn list_posts(
    viewer: OptionalUser,
    AppQuery(page): AppQuery<PaginationQuery>,
    AppQuery(query): AppQuery<PostListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<PostResponse>>>> {
    page.validate(&())?;

    let options = PostListOptions {
        library_id: query.library_id,
        category: query.category,
        search: query.search,
        viewer: viewer.id(),
        list: page.into(),
    };
    registry
        .forum_repository()
        .find_posts(options)
        .await
        .map(PaginatedResponse::from_list)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn show_post(
    viewer: OptionalUser,
    AppPath(post_id): AppPath<PostId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<PostDetailResponse>>> {
    let post = fetch_post(&registry, post_id, viewer.id()).await?;
    let comments = registry
        .forum_repository()
        .find_comments(post_id, viewer.id())
        .await?;

    Ok(Json(ApiResponse::ok(PostDetailResponse {
        post: post.into(),
        comments: comments.into_iter().map(CommentResponse::from).collect(),
    })))
}

pub async fn create_post(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PostResponse>>)> {
    req.validate(&())?;

    let post_id = registry
        .forum_repository()
        .create_post(req.into_event(user.id()))
        .await?;
    let post = fetch_post(&registry, post_id, Some(user.id())).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(post.into()))))
}

pub async fn update_post(
    user: AuthorizedUser,
    AppPath(post_id): AppPath<PostId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<UpdatePostRequest>,
) -> AppResult<Json<ApiResponse<PostResponse>>> {
    let post = fetch_post(&registry, post_id, Some(user.id())).await?;
    ensure_author(&user, post.author.user_id)?;
    req.validate(&())?;

    registry
        .forum_repository()
        .update_post(req.into_event(post_id))
        .await?;
    let post = fetch_post(&registry, post_id, Some(user.id())).await?;
    Ok(Json(ApiResponse::ok(post.into())))
}

pub async fn delete_post(
    user: AuthorizedUser,
    AppPath(post_id): AppPath<PostId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<()>>> {
    let post = fetch_post(&registry, post_id, None).await?;
    ensure_author(&user, post.author.user_id)?;

    registry.forum_repository().delete_post(post_id).await?;
    Ok(Json(ApiResponse::ok(()).with_message("post deleted")))
}

pub async fn create_comment(
    user: AuthorizedUser,
    AppPath(post_id): AppPath<PostId>,
    State(registry): State<AppRegistry>,
    AppJson(req): AppJson<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CommentResponse>>)> {
    req.validate(&())?;

    let comment_id = registry
        .forum_repository()
        .create_comment(req.into_event(post_id, user.id()))
        .await?;
    let comment = fetch_comment(&registry, comment_id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment.into()))))
}

pub async fn delete_comment(
    user: AuthorizedUser,
    AppPath(comment_id): AppPath<CommentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<()>>> {
    let comment = fetch_comment(&registry, comment_id).await?;
    ensure_author(&user, comment.author.user_id)?;

    registry.forum_repository().delete_comment(comment_id).await?;
    Ok(Json(ApiResponse::ok(()).with_message("comment deleted")))
}

pub async fn like_post(
    user: AuthorizedUser,
    AppPath(post_id): AppPath<PostId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<LikeResponse>>> {
    registry
        .forum_repository()
        .toggle_post_like(TogglePostLike::new(post_id, user.id()))
        .await
        .map(LikeResponse::from)
        .map(ApiResponse::ok)
        .map(Json)
}

pub async fn like_comment(
    user: AuthorizedUser,
    AppPath(comment_id): AppPath<CommentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ApiResponse<LikeResponse>>> {
    registry
        .forum_repository()
        .toggle_comment_like(ToggleCommentLike::new(comment_id, user.id()))
        .await
        .map(LikeResponse::from)
        .map(ApiResponse::ok)
        .map(Json)
}
