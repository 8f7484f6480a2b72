//! PostgreSQL 商铺仓储实现

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hotcache_adapter_postgres::map_sqlx_error;
use hotcache_common::{ShopId, ShopTypeId};
use hotcache_errors::AppResult;
use sqlx::PgPool;

use crate::domain::{Shop, ShopRepository};

pub struct PostgresShopRepository {
    pool: PgPool,
}

impl PostgresShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopRepository for PostgresShopRepository {
    async fn find_by_id(&self, id: ShopId) -> AppResult<Option<Shop>> {
        let row = sqlx::query_as::<_, ShopRow>(
            r#"
            SELECT id, name, type_id, images, area, address, x, y, avg_price,
                   sold, comments, score, open_hours, create_time, update_time
            FROM tb_shop WHERE id = $1
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ShopRow::into_shop))
    }

    async fn update(&self, id: ShopId, shop: &Shop) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE tb_shop
            SET name = $2, type_id = $3, images = $4, area = $5, address = $6,
                x = $7, y = $8, avg_price = $9, sold = $10, comments = $11,
                score = $12, open_hours = $13, update_time = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.value())
        .bind(&shop.name)
        .bind(shop.type_id.value())
        .bind(&shop.images)
        .bind(&shop.area)
        .bind(&shop.address)
        .bind(shop.x)
        .bind(shop.y)
        .bind(shop.avg_price)
        .bind(shop.sold)
        .bind(shop.comments)
        .bind(shop.score)
        .bind(&shop.open_hours)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ShopRow {
    id: i64,
    name: String,
    type_id: i64,
    images: String,
    area: Option<String>,
    address: String,
    x: f64,
    y: f64,
    avg_price: Option<i64>,
    sold: i32,
    comments: i32,
    score: i32,
    open_hours: Option<String>,
    create_time: Option<DateTime<Utc>>,
    update_time: Option<DateTime<Utc>>,
}

impl ShopRow {
    fn into_shop(self) -> Shop {
        Shop {
            id: Some(ShopId::new(self.id)),
            name: self.name,
            type_id: ShopTypeId::new(self.type_id),
            images: self.images,
            area: self.area,
            address: self.address,
            x: self.x,
            y: self.y,
            avg_price: self.avg_price,
            sold: self.sold,
            comments: self.comments,
            score: self.score,
            open_hours: self.open_hours,
            create_time: self.create_time,
            update_time: self.update_time,
        }
    }
}
