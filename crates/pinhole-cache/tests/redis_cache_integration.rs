use std::time::Duration;

use jiff::Timestamp;
use pinhole_cache::{CachedUrl, RedisUrlCache, UrlCache};
use pinhole_core::ShortCode;
use pinhole_test_infra::redis::RedisServer;

/// Test fixture that manages a Redis container using test-infra.
struct RedisTestContainer {
    _redis: RedisServer,
    redis_url: String,
}

impl RedisTestContainer {
    async fn start() -> Self {
        let redis = RedisServer::new().await.expect("start redis");
        let redis_url = redis.redis_url().await.expect("redis url");

        // Wait a moment to ensure Redis is fully ready
        tokio::time::sleep(Duration::from_millis(500)).await;

        Self {
            _redis: redis,
            redis_url,
        }
    }

    async fn cache(&self) -> RedisUrlCache {
        RedisUrlCache::connect(&self.redis_url)
            .await
            .expect("connect redis cache")
    }
}

fn cached(url: &str, expires_at: Option<Timestamp>) -> CachedUrl {
    CachedUrl {
        original_url: url.to_string(),
        expires_at,
    }
}

const HOUR: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn test_redis_cache_basic_get_set() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache().await;

    let code = ShortCode::new("test123").unwrap();
    let value = cached("https://example.com", Some(Timestamp::from_second(1_900_000_000).unwrap()));

    assert!(cache.get_url(&code).await.unwrap().is_none());

    cache.set_url(&code, &value, HOUR).await.unwrap();

    let got = cache.get_url(&code).await.unwrap();
    assert_eq!(got, Some(value));
}

#[tokio::test]
async fn test_redis_cache_delete() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache().await;

    let code = ShortCode::new("delete123").unwrap();
    cache
        .set_url(&code, &cached("https://example.com/delete", None), HOUR)
        .await
        .unwrap();
    assert!(cache.get_url(&code).await.unwrap().is_some());

    cache.del(&code).await.unwrap();

    assert!(cache.get_url(&code).await.unwrap().is_none());
}

#[tokio::test]
async fn test_redis_cache_entry_expires_with_ttl() {
    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache().await;

    let code = ShortCode::new("ttl123").unwrap();
    cache
        .set_url(&code, &cached("https://example.com/ttl", None), Duration::from_millis(200))
        .await
        .unwrap();
    assert!(cache.get_url(&code).await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(cache.get_url(&code).await.unwrap().is_none());
}

#[tokio::test]
async fn test_redis_cache_with_custom_prefix_is_isolated() {
    let fixture = RedisTestContainer::start().await;
    let client = redis::Client::open(fixture.redis_url.as_str()).unwrap();
    let conn_a = client.get_connection_manager().await.unwrap();
    let conn_b = client.get_connection_manager().await.unwrap();
    let cache_a = RedisUrlCache::with_prefix(conn_a, "a:");
    let cache_b = RedisUrlCache::with_prefix(conn_b, "b:");

    let code = ShortCode::new("shared").unwrap();
    cache_a
        .set_url(&code, &cached("https://a.example", None), HOUR)
        .await
        .unwrap();

    assert!(cache_a.get_url(&code).await.unwrap().is_some());
    assert!(cache_b.get_url(&code).await.unwrap().is_none());
}

#[tokio::test]
async fn test_redis_cache_rejects_corrupt_value() {
    use redis::AsyncCommands;

    let fixture = RedisTestContainer::start().await;
    let cache = fixture.cache().await;
    let client = redis::Client::open(fixture.redis_url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();

    conn.set::<_, _, ()>("ph:url:corrupt", "not json")
        .await
        .unwrap();

    let code = ShortCode::new("corrupt").unwrap();
    assert!(cache.get_url(&code).await.is_err());
}
