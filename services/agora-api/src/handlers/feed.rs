//! Feed, hashtag and activity reads

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use agora_social_core::{ActivityView, FeedEntry, PageRequest, PostView};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub hashtag: Option<String>,
}

impl FeedQuery {
    fn page(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(PageRequest::DEFAULT_LIMIT),
        )
    }
}

/// GET /feed?page=&limit=&hashtag=
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> ApiResult<Json<Vec<FeedEntry>>> {
    let page = query.page();
    let entries = state
        .feed
        .get_feed(page.page, page.limit, query.hashtag.as_deref())
        .await?;
    Ok(Json(entries))
}

/// GET /hashtags/{name}/posts
pub async fn hashtag_posts(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<PostView>>> {
    Ok(Json(state.feed.posts_by_hashtag(&name).await?))
}

/// GET /activity/{username}?page=&limit=
pub async fn activity(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<Vec<ActivityView>>> {
    let entries = state
        .activity
        .for_user(&username, page.page, page.limit)
        .await?;
    Ok(Json(entries))
}
