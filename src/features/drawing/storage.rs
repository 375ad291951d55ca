use std::{path::Path, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    ConnectOptions, Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};

use crate::error::AppError;
use crate::features::leaderboard::models::LeaderboardEntry;

use super::models::DrawingRecord;

/// 读取 `COUNT(..) AS c` 列，解码失败视为存储错误
fn read_count(row: &SqliteRow, what: &str) -> Result<i64, AppError> {
    row.try_get("c")
        .map_err(|e| AppError::Storage(format!("decode {what}: {e}")))
}

/// 手写数字记录存储（SQLite）。记录只增不改，不提供更新/删除。
#[derive(Clone)]
pub struct DrawingStore {
    pub pool: SqlitePool,
}

impl DrawingStore {
    pub async fn connect_sqlite(path: &str, wal: bool) -> Result<Self, AppError> {
        let opt = SqliteConnectOptions::new()
            .filename(Path::new(path))
            .create_if_missing(true)
            .log_statements(tracing::log::LevelFilter::Off);
        let pool = SqlitePool::connect_with(opt)
            .await
            .map_err(|e| AppError::Storage(format!("sqlite connect: {e}")))?;
        if wal {
            sqlx::query("PRAGMA journal_mode=WAL;")
                .execute(&pool)
                .await
                .ok();
        }
        sqlx::query("PRAGMA synchronous=NORMAL;")
            .execute(&pool)
            .await
            .ok();
        Ok(Self { pool })
    }

    /// 进程内内存库（单连接，连接关闭即丢失数据），用于测试与临时运行。
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Storage(format!("sqlite options: {e}")))?
            .log_statements(tracing::log::LevelFilter::Off);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| AppError::Storage(format!("sqlite connect: {e}")))?;
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), AppError> {
        let ddl = r#"
        CREATE TABLE IF NOT EXISTS drawn_digits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL DEFAULT 'Anonymous',
            digit_label INTEGER NOT NULL,
            image_data TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_drawn_digits_username ON drawn_digits(username);
        CREATE INDEX IF NOT EXISTS idx_drawn_digits_created ON drawn_digits(created_at, id);
        "#;
        sqlx::query(ddl)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("init schema: {e}")))?;
        Ok(())
    }

    /// 写入一条记录并返回新 id。不校验标签范围与图片内容。
    pub async fn insert(
        &self,
        username: &str,
        digit_label: i64,
        image_data: &str,
    ) -> Result<i64, AppError> {
        // 定宽 RFC3339（微秒 + Z），保证按字符串排序即按时间排序
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let res = sqlx::query(
            "INSERT INTO drawn_digits(username, digit_label, image_data, created_at) VALUES(?,?,?,?)",
        )
        .bind(username)
        .bind(digit_label)
        .bind(image_data)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("insert drawing: {e}")))?;
        Ok(res.last_insert_rowid())
    }

    pub async fn count_all(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(1) AS c FROM drawn_digits")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("count drawings: {e}")))?;
        read_count(&row, "drawing count")
    }

    pub async fn count_by_username(&self, username: &str) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(1) AS c FROM drawn_digits WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Storage(format!("count user drawings: {e}")))?;
        read_count(&row, "user drawing count")
    }

    /// 按创建时间升序读取全部记录（同一时间戳以 id 升序稳定排序）
    pub async fn list_all_ordered(&self) -> Result<Vec<DrawingRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT id, username, digit_label, image_data, created_at FROM drawn_digits ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("list drawings: {e}")))?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let created_raw: String = r.get("created_at");
            let created_at = DateTime::parse_from_rfc3339(&created_raw)
                .map_err(|e| AppError::Storage(format!("invalid created_at {created_raw:?}: {e}")))?
                .with_timezone(&Utc);
            out.push(DrawingRecord {
                id: r.get("id"),
                username: r.get("username"),
                digit_label: r.get("digit_label"),
                image_data: r.get("image_data"),
                created_at,
            });
        }
        Ok(out)
    }

    /// 按提交者聚合计数，计数降序；同分按名称升序，保证结果确定。
    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT username, COUNT(1) AS c FROM drawn_digits
             GROUP BY username
             ORDER BY c DESC, username ASC
             LIMIT ?",
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(format!("query leaderboard: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|r| LeaderboardEntry {
                username: r.get("username"),
                count: r.get("c"),
            })
            .collect())
    }
}
