//! PostgreSQL 商铺类型仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hotcache_adapter_postgres::map_sqlx_error;
use hotcache_common::ShopTypeId;
use hotcache_errors::AppResult;
use sqlx::PgPool;

use crate::domain::{ShopType, ShopTypeRepository};

pub struct PostgresShopTypeRepository {
    pool: PgPool,
}

impl PostgresShopTypeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopTypeRepository for PostgresShopTypeRepository {
    async fn list_ordered(&self) -> AppResult<Vec<ShopType>> {
        let rows = sqlx::query_as::<_, ShopTypeRow>(
            r#"
            SELECT id, name, icon, sort, create_time, update_time
            FROM tb_shop_type ORDER BY sort ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(sqlx::FromRow)]
struct ShopTypeRow {
    id: i64,
    name: String,
    icon: String,
    sort: i32,
    create_time: Option<DateTime<Utc>>,
    update_time: Option<DateTime<Utc>>,
}

impl From<ShopTypeRow> for ShopType {
    fn from(row: ShopTypeRow) -> Self {
        Self {
            id: ShopTypeId::new(row.id),
            name: row.name,
            icon: row.icon,
            sort: row.sort,
            create_time: row.create_time,
            update_time: row.update_time,
        }
    }
}
