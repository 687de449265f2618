use crate::db::queries;
use crate::error::ReportError;
use crate::models::{or_zero, Cell, ReportTable};
use crate::service::parser::LegacyReport;
use sqlx::PgPool;

/// 运行旧式命名报表
///
/// 固定形状的只读点查询, 不经过维度解析与聚合引擎,
/// 只是和通用报表共用同一个入口与表格输出。
pub async fn run(
    pool: &PgPool,
    tenant_id: i64,
    report: LegacyReport,
) -> Result<ReportTable, ReportError> {
    match report {
        LegacyReport::LowStock => low_stock(pool, tenant_id).await,
        LegacyReport::SalesDueSoon => sales_due_soon(pool, tenant_id).await,
    }
}

/// 库存跌破警戒线的商品
async fn low_stock(pool: &PgPool, tenant_id: i64) -> Result<ReportTable, ReportError> {
    let records = queries::fetch_low_stock(pool, tenant_id).await?;
    let rows = records
        .into_iter()
        .map(|r| {
            vec![
                Cell::Text(r.product_sku),
                Cell::Text(r.product_name),
                Cell::from_decimal(&or_zero(&r.stock_qty)),
                Cell::from_decimal(&or_zero(&r.min_stock)),
            ]
        })
        .collect();

    Ok(ReportTable {
        title: "Low stock".to_string(),
        source: "products".to_string(),
        columns: vec![
            "product_sku".to_string(),
            "product_name".to_string(),
            "stock".to_string(),
            "min_stock".to_string(),
        ],
        rows,
    })
}

/// 七天内到期、尚未收款的销售发票
async fn sales_due_soon(pool: &PgPool, tenant_id: i64) -> Result<ReportTable, ReportError> {
    let today = chrono::Utc::now().date_naive();
    let records = queries::fetch_sales_due_soon(pool, tenant_id, today).await?;
    let rows = records
        .into_iter()
        .map(|r| {
            vec![
                Cell::Text(r.invoice_number),
                Cell::Text(r.customer_name.unwrap_or_default()),
                Cell::Text(r.due_date.format("%Y-%m-%d").to_string()),
                Cell::from_decimal(&or_zero(&r.total)),
            ]
        })
        .collect();

    Ok(ReportTable {
        title: "Sales due soon".to_string(),
        source: "sales".to_string(),
        columns: vec![
            "invoice".to_string(),
            "customer".to_string(),
            "due_date".to_string(),
            "total".to_string(),
        ],
        rows,
    })
}
