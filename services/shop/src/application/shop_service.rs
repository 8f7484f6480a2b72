//! 商铺服务

use std::sync::Arc;

use hotcache_common::{RequestContext, ShopId};
use hotcache_errors::{AppError, AppResult};
use hotcache_read_through::{CacheInvalidator, ReadThroughCache};
use tracing::{debug, info};

use crate::domain::{SHOP, Shop, ShopRepository};

/// 商铺服务
///
/// 查询走读穿透缓存（空值缓存 + 互斥重建），更新先写库后删缓存
#[derive(Clone)]
pub struct ShopService {
    repo: Arc<dyn ShopRepository>,
    cache: ReadThroughCache,
    invalidator: CacheInvalidator,
}

impl ShopService {
    pub fn new(
        repo: Arc<dyn ShopRepository>,
        cache: ReadThroughCache,
        invalidator: CacheInvalidator,
    ) -> Self {
        Self {
            repo,
            cache,
            invalidator,
        }
    }

    /// 根据 ID 查询商铺
    pub async fn query_by_id(&self, ctx: &RequestContext, id: ShopId) -> AppResult<Shop> {
        let repo = self.repo.clone();
        let result = self
            .cache
            .resolve_with_source(&SHOP, id, move || async move { repo.find_by_id(id).await })
            .await?;

        debug!(
            request_id = %ctx.request_id,
            shop_id = %id,
            source = result.source.as_str(),
            "Shop lookup resolved"
        );

        result
            .value
            .ok_or_else(|| AppError::not_found("Shop does not exist"))
    }

    /// 更新商铺
    ///
    /// 数据库更新成功后才删除缓存；没有行被更新时不触碰缓存
    pub async fn update(&self, ctx: &RequestContext, shop: Shop) -> AppResult<()> {
        let id = shop
            .id
            .ok_or_else(|| AppError::validation("Shop id must not be empty"))?;

        if !self.repo.update(id, &shop).await? {
            return Err(AppError::not_found("Shop does not exist"));
        }

        self.invalidator.invalidate(&SHOP, id).await?;
        info!(request_id = %ctx.request_id, shop_id = %id, "Shop updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockShopRepository;
    use hotcache_common::ShopTypeId;
    use hotcache_ports::CachePort;
    use hotcache_read_through::MemoryCache;

    fn shop(id: i64, name: &str) -> Shop {
        Shop::new(name, ShopTypeId::new(1)).with_id(ShopId::new(id))
    }

    fn service(repo: MockShopRepository) -> (Arc<MemoryCache>, ShopService) {
        let cache = Arc::new(MemoryCache::new());
        let service = ShopService::new(
            Arc::new(repo),
            ReadThroughCache::with_store(cache.clone()),
            CacheInvalidator::new(cache.clone()),
        );
        (cache, service)
    }

    #[tokio::test]
    async fn test_query_by_id_loads_once() {
        let mut repo = MockShopRepository::new();
        repo.expect_find_by_id()
            .withf(|id| *id == ShopId::new(42))
            .times(1)
            .returning(|_| Ok(Some(shop(42, "X"))));
        let (cache, service) = service(repo);
        let ctx = RequestContext::anonymous();

        let first = service.query_by_id(&ctx, ShopId::new(42)).await.unwrap();
        let second = service.query_by_id(&ctx, ShopId::new(42)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.name, "X");
        assert!(cache.exists("cache:shop:42").await.unwrap());
    }

    #[tokio::test]
    async fn test_query_missing_shop_is_not_found_and_cached() {
        let mut repo = MockShopRepository::new();
        repo.expect_find_by_id().times(1).returning(|_| Ok(None));
        let (cache, service) = service(repo);
        let ctx = RequestContext::anonymous();

        for _ in 0..3 {
            let err = service.query_by_id(&ctx, ShopId::new(999)).await.unwrap_err();
            assert!(err.is_not_found());
        }
        assert_eq!(
            cache.get("cache:shop:999").await.unwrap(),
            Some(String::new())
        );
    }

    #[tokio::test]
    async fn test_database_error_is_not_cached() {
        let mut repo = MockShopRepository::new();
        repo.expect_find_by_id()
            .times(1)
            .returning(|_| Err(AppError::database("connection refused")));
        let (cache, service) = service(repo);

        let err = service
            .query_by_id(&RequestContext::anonymous(), ShopId::new(5))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_update_without_id_is_rejected() {
        let mut repo = MockShopRepository::new();
        repo.expect_update().never();
        let (_cache, service) = service(repo);

        let err = service
            .update(
                &RequestContext::anonymous(),
                Shop::new("no id", ShopTypeId::new(1)),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_missing_row_keeps_cache() {
        let mut repo = MockShopRepository::new();
        repo.expect_update().times(1).returning(|_, _| Ok(false));
        let (cache, service) = service(repo);
        cache.set("cache:shop:7", "", None).await.unwrap();

        let err = service
            .update(&RequestContext::anonymous(), shop(7, "ghost"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(cache.exists("cache:shop:7").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_invalidates_after_write() {
        let mut repo = MockShopRepository::new();
        repo.expect_update()
            .withf(|id, shop| *id == ShopId::new(42) && shop.name == "Y")
            .times(1)
            .returning(|_, _| Ok(true));
        let (cache, service) = service(repo);
        cache
            .set("cache:shop:42", r#"{"id":42}"#, None)
            .await
            .unwrap();

        service
            .update(&RequestContext::anonymous(), shop(42, "Y"))
            .await
            .unwrap();

        assert!(!cache.exists("cache:shop:42").await.unwrap());
    }

    #[tokio::test]
    async fn test_write_failure_does_not_invalidate() {
        let mut repo = MockShopRepository::new();
        repo.expect_update()
            .returning(|_, _| Err(AppError::database("deadlock detected")));
        let (cache, service) = service(repo);
        cache
            .set("cache:shop:42", r#"{"id":42}"#, None)
            .await
            .unwrap();

        let err = service
            .update(&RequestContext::anonymous(), shop(42, "Y"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Database(_)));
        assert!(cache.exists("cache:shop:42").await.unwrap());
    }
}
