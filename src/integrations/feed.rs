//! Social feed mirror. Fetches recent posts from the configured upstream and
//! degrades to a static fallback payload on any failure, so the storefront
//! never surfaces an upstream error.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    posts: Option<Vec<FeedPost>>,
}

static FALLBACK_POSTS: Lazy<Vec<FeedPost>> = Lazy::new(|| {
    vec![
        FeedPost {
            id: "fallback-1".to_string(),
            text: "Visit the shop for this week's arrivals and trade-in offers.".to_string(),
            image_url: None,
            permalink: None,
            posted_at: None,
        },
        FeedPost {
            id: "fallback-2".to_string(),
            text: "Every device we sell is TRCSL-checked and comes with warranty.".to_string(),
            image_url: None,
            permalink: None,
            posted_at: None,
        },
    ]
});

pub fn fallback_posts() -> Vec<FeedPost> {
    FALLBACK_POSTS.clone()
}

async fn try_fetch(feed_url: &str) -> Option<Vec<FeedPost>> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .ok()?;

    let resp = client.get(feed_url).send().await.ok()?;

    if !resp.status().is_success() {
        return None;
    }

    let body = resp.text().await.ok()?;
    let parsed: FeedResponse = serde_json::from_str(&body).ok()?;
    parsed.posts
}

/// Fetch mirrored posts, falling back to the static payload when the
/// upstream is unset, unreachable or returns garbage.
pub async fn fetch_posts(feed_url: Option<&str>) -> (Vec<FeedPost>, bool) {
    let Some(url) = feed_url.filter(|u| !u.is_empty()) else {
        return (fallback_posts(), true);
    };

    match try_fetch(url).await {
        Some(posts) if !posts.is_empty() => (posts, false),
        _ => {
            tracing::warn!("feed mirror unavailable, serving fallback payload");
            (fallback_posts(), true)
        }
    }
}
