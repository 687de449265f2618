use crate::db::queries;
use crate::error::ReportError;
use crate::models::{ReportQuery, ReportTable};
use crate::service::aggregate::{self, ReportRow};
use crate::service::parser::{self, ParsedRequest, RawReportRequest};
use crate::service::resolver::{self, FetchPlan};
use crate::service::{legacy, table};
use sqlx::PgPool;

/// 报表运行服务: `run(query) -> Table | Error` 单一入口
///
/// 无状态, 只持有连接池; 并发请求之间不共享任何可变数据。
pub struct ReportService {
    pool: PgPool,
}

impl ReportService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 运行一次报表请求
    ///
    /// 租户ID显式传参, 不从请求上下文隐式读取。整个请求只发出
    /// 一条查询 (头粒度单表, 或明细粒度一次多表 JOIN),
    /// 之后的过滤/分组/渲染全部在内存中完成, 不逐组回查。
    pub async fn run(
        &self,
        tenant_id: i64,
        raw: &RawReportRequest,
    ) -> Result<ReportTable, ReportError> {
        match parser::parse(raw)? {
            ParsedRequest::Legacy(report) => legacy::run(&self.pool, tenant_id, report).await,
            ParsedRequest::Query(query) => self.run_query(tenant_id, &query).await,
        }
    }

    async fn run_query(
        &self,
        tenant_id: i64,
        query: &ReportQuery,
    ) -> Result<ReportTable, ReportError> {
        let plan = resolver::resolve(query)?;

        let table = match plan {
            FetchPlan::SalesHeaders => {
                let rows = queries::fetch_sales_headers(
                    &self.pool,
                    tenant_id,
                    query.from_utc,
                    query.to_utc_exclusive,
                )
                .await?;
                finish(query, rows)
            }
            FetchPlan::SalesItems => {
                let rows = queries::fetch_sales_items(
                    &self.pool,
                    tenant_id,
                    query.from_utc,
                    query.to_utc_exclusive,
                )
                .await?;
                finish(query, rows)
            }
            FetchPlan::PurchaseHeaders => {
                let rows = queries::fetch_purchase_headers(
                    &self.pool,
                    tenant_id,
                    query.from_utc,
                    query.to_utc_exclusive,
                )
                .await?;
                finish(query, rows)
            }
        };

        tracing::info!(
            "报表聚合完成: source={} plan={:?} groups={}",
            query.source.as_str(),
            plan,
            table.rows.len()
        );

        Ok(table)
    }
}

/// 三条管线共用的收尾: 过滤 -> 聚合 -> 渲染
fn finish<R: ReportRow>(query: &ReportQuery, rows: Vec<R>) -> ReportTable {
    let rows = aggregate::filter_rows(rows, query);
    let groups = aggregate::aggregate(&rows, &query.dims);
    table::build_table(query, groups)
}
