use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// 慢查询日志阈值: 宽时间窗口的聚合查询超过 5 秒记 Warn
const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_secs(5);

/// 创建数据库连接池 (报表服务只读, 共享一个池)
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let connect_options = PgConnectOptions::from_str(database_url)?
        .log_slow_statements(tracing::log::LevelFilter::Warn, SLOW_STATEMENT_THRESHOLD);

    PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
}
