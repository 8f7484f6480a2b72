//! 数据库错误映射
//!
//! 统一的 SQLx 错误到 AppError 的转换。连接类错误一律归为 Database，
//! 读路径上它们会原样向上传播，不会被当作"实体不存在"写入空值缓存。

use hotcache_errors::AppError;

/// 将 SQLx 错误转换为 AppError，区分不同错误类型
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
        sqlx::Error::Database(db_err) => match db_err.code() {
            Some(code) => match code.as_ref() {
                // PostgreSQL 约束违规代码
                "23505" => AppError::conflict("Duplicate entry violates unique constraint"),
                "23503" => AppError::validation("Foreign key constraint violation"),
                "23514" => AppError::validation("Check constraint violation"),
                "23502" => AppError::validation("Not null constraint violation"),
                "22001" => AppError::validation("String data too long"),
                _ => AppError::database(format!("Database error ({}): {}", code, db_err)),
            },
            None => AppError::database(db_err.to_string()),
        },
        sqlx::Error::PoolTimedOut => AppError::database("Database connection pool timeout"),
        sqlx::Error::PoolClosed => AppError::database("Database connection pool is closed"),
        sqlx::Error::ColumnDecode { index, source } => {
            AppError::internal(format!("Failed to decode column {}: {}", index, source))
        }
        _ => AppError::database(e.to_string()),
    }
}
