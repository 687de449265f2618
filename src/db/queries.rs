use crate::models::{DueSoonRow, HeaderRow, ItemRow, LowStockRow};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

/// 销售单头粒度流 (一次查询, 不逐组回查)
///
/// 租户与时间窗口在 SQL 侧收敛; 两个边界参数均可为 NULL 表示无界。
pub async fn fetch_sales_headers(
    pool: &PgPool,
    tenant_id: i64,
    from: Option<DateTime<Utc>>,
    to_exclusive: Option<DateTime<Utc>>,
) -> Result<Vec<HeaderRow>, sqlx::Error> {
    sqlx::query_as::<_, HeaderRow>(
        r#"
        SELECT coalesce(si.issued_at, si.created_at) as doc_date,
               si.status,
               si.currency,
               si.subtotal,
               si.discount_total,
               si.tax_total,
               si.total
        FROM sales_invoices si
        WHERE si.tenant_id = $1
          AND ($2::timestamptz IS NULL OR coalesce(si.issued_at, si.created_at) >= $2)
          AND ($3::timestamptz IS NULL OR coalesce(si.issued_at, si.created_at) < $3)
        "#,
    )
    .bind(tenant_id)
    .bind(from)
    .bind(to_exclusive)
    .fetch_all(pool)
    .await
}

/// 采购单头粒度流 (与销售头共用 HeaderRow 投影)
pub async fn fetch_purchase_headers(
    pool: &PgPool,
    tenant_id: i64,
    from: Option<DateTime<Utc>>,
    to_exclusive: Option<DateTime<Utc>>,
) -> Result<Vec<HeaderRow>, sqlx::Error> {
    sqlx::query_as::<_, HeaderRow>(
        r#"
        SELECT coalesce(pi.received_at, pi.created_at) as doc_date,
               pi.status,
               pi.currency,
               pi.subtotal,
               pi.discount_total,
               pi.tax_total,
               pi.total
        FROM purchase_invoices pi
        WHERE pi.tenant_id = $1
          AND ($2::timestamptz IS NULL OR coalesce(pi.received_at, pi.created_at) >= $2)
          AND ($3::timestamptz IS NULL OR coalesce(pi.received_at, pi.created_at) < $3)
        "#,
    )
    .bind(tenant_id)
    .bind(from)
    .bind(to_exclusive)
    .fetch_all(pool)
    .await
}

/// 销售明细粒度流: 明细 JOIN 单据头 JOIN 商品, 左连客户
///
/// 状态/币种取所属单据头的值, 由调用方在分组前统一过滤。
pub async fn fetch_sales_items(
    pool: &PgPool,
    tenant_id: i64,
    from: Option<DateTime<Utc>>,
    to_exclusive: Option<DateTime<Utc>>,
) -> Result<Vec<ItemRow>, sqlx::Error> {
    sqlx::query_as::<_, ItemRow>(
        r#"
        SELECT coalesce(si.issued_at, si.created_at) as doc_date,
               si.status,
               si.currency,
               si.number as invoice_number,
               c.name as customer_name,
               p.id as product_id,
               p.sku as product_sku,
               p.name as product_name,
               it.quantity as qty,
               it.unit_price,
               it.discount_rate,
               it.tax_rate,
               it.line_total
        FROM sales_invoice_items it
        INNER JOIN sales_invoices si ON si.id = it.invoice_id
        INNER JOIN products p ON p.id = it.product_id
        LEFT JOIN customers c ON c.id = si.customer_id
        WHERE si.tenant_id = $1
          AND ($2::timestamptz IS NULL OR coalesce(si.issued_at, si.created_at) >= $2)
          AND ($3::timestamptz IS NULL OR coalesce(si.issued_at, si.created_at) < $3)
        "#,
    )
    .bind(tenant_id)
    .bind(from)
    .bind(to_exclusive)
    .fetch_all(pool)
    .await
}

/// 低库存商品 (固定报表, 库存升序)
pub async fn fetch_low_stock(
    pool: &PgPool,
    tenant_id: i64,
) -> Result<Vec<LowStockRow>, sqlx::Error> {
    sqlx::query_as::<_, LowStockRow>(
        r#"
        SELECT p.sku as product_sku,
               p.name as product_name,
               p.stock_qty,
               p.min_stock
        FROM products p
        WHERE p.tenant_id = $1
          AND p.stock_qty <= p.min_stock
        ORDER BY p.stock_qty ASC, p.sku ASC
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await
}

/// 七天内到期、仍处于 issued 状态的销售发票 (固定报表, 到期日升序)
pub async fn fetch_sales_due_soon(
    pool: &PgPool,
    tenant_id: i64,
    today: NaiveDate,
) -> Result<Vec<DueSoonRow>, sqlx::Error> {
    sqlx::query_as::<_, DueSoonRow>(
        r#"
        SELECT si.number as invoice_number,
               c.name as customer_name,
               si.due_date,
               si.total
        FROM sales_invoices si
        LEFT JOIN customers c ON c.id = si.customer_id
        WHERE si.tenant_id = $1
          AND lower(si.status) = 'issued'
          AND si.due_date IS NOT NULL
          AND si.due_date >= $2
          AND si.due_date < $2 + 7
        ORDER BY si.due_date ASC, si.number ASC
        "#,
    )
    .bind(tenant_id)
    .bind(today)
    .fetch_all(pool)
    .await
}
