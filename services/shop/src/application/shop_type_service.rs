//! 商铺类型服务

use std::sync::Arc;

use hotcache_common::RequestContext;
use hotcache_errors::AppResult;
use hotcache_read_through::CollectionCache;
use tracing::debug;

use crate::domain::{SHOP_TYPE, ShopType, ShopTypeRepository};

/// 商铺类型服务
#[derive(Clone)]
pub struct ShopTypeService {
    repo: Arc<dyn ShopTypeRepository>,
    cache: CollectionCache,
}

impl ShopTypeService {
    pub fn new(repo: Arc<dyn ShopTypeRepository>, cache: CollectionCache) -> Self {
        Self { repo, cache }
    }

    /// 查询全部商铺类型（按 sort 升序）
    ///
    /// 类型表为空时返回 NotFound，且不写缓存
    pub async fn query_type_list(&self, ctx: &RequestContext) -> AppResult<Vec<ShopType>> {
        let repo = self.repo.clone();
        let types = self
            .cache
            .resolve(&SHOP_TYPE, move || async move { repo.list_ordered().await })
            .await?;

        debug!(request_id = %ctx.request_id, count = types.len(), "Shop type list resolved");
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockShopTypeRepository;
    use hotcache_common::ShopTypeId;
    use hotcache_ports::CachePort;
    use hotcache_read_through::MemoryCache;
    use std::time::Duration;

    fn shop_type(id: i64, name: &str, sort: i32) -> ShopType {
        ShopType {
            id: ShopTypeId::new(id),
            name: name.to_string(),
            icon: format!("/types/{}.png", id),
            sort,
            create_time: None,
            update_time: None,
        }
    }

    fn service(repo: MockShopTypeRepository) -> (Arc<MemoryCache>, ShopTypeService) {
        let cache = Arc::new(MemoryCache::new());
        let service = ShopTypeService::new(
            Arc::new(repo),
            CollectionCache::new(cache.clone(), Duration::from_secs(1800)),
        );
        (cache, service)
    }

    #[tokio::test]
    async fn test_list_loaded_once_then_cached() {
        let mut repo = MockShopTypeRepository::new();
        repo.expect_list_ordered()
            .times(1)
            .returning(|| Ok(vec![shop_type(1, "美食", 1), shop_type(2, "KTV", 2)]));
        let (cache, service) = service(repo);
        let ctx = RequestContext::anonymous();

        let first = service.query_type_list(&ctx).await.unwrap();
        let second = service.query_type_list(&ctx).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0].sort, 1);
        let raw = cache.get("cache:shopType:").await.unwrap().unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains("\"createTime\""));
    }

    #[tokio::test]
    async fn test_empty_table_is_an_error_and_not_cached() {
        let mut repo = MockShopTypeRepository::new();
        repo.expect_list_ordered().times(2).returning(|| Ok(vec![]));
        let (cache, service) = service(repo);
        let ctx = RequestContext::anonymous();

        for _ in 0..2 {
            let err = service.query_type_list(&ctx).await.unwrap_err();
            assert!(err.is_not_found());
        }
        assert!(!cache.exists("cache:shopType:").await.unwrap());
    }

    #[tokio::test]
    async fn test_blank_payload_reloads() {
        let mut repo = MockShopTypeRepository::new();
        repo.expect_list_ordered()
            .times(1)
            .returning(|| Ok(vec![shop_type(1, "美食", 1)]));
        let (cache, service) = service(repo);
        cache.set("cache:shopType:", "", None).await.unwrap();

        let types = service
            .query_type_list(&RequestContext::anonymous())
            .await
            .unwrap();
        assert_eq!(types.len(), 1);
    }
}
