use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// 缺省币种 (历史数据 currency 列可为空)
pub const DEFAULT_CURRENCY: &str = "NIO";

/// 单据头粒度行 (销售/采购共用一个投影)
///
/// doc_date 已在 SQL 侧做过回退: 开票/收货时间为空时取创建时间。
#[derive(Debug, Clone, FromRow)]
pub struct HeaderRow {
    pub doc_date: DateTime<Utc>,
    pub status: String,
    pub currency: Option<String>,
    pub subtotal: Option<BigDecimal>,
    pub discount_total: Option<BigDecimal>,
    pub tax_total: Option<BigDecimal>,
    pub total: Option<BigDecimal>,
}

/// 明细粒度行 (仅销售): 明细 JOIN 单据头 JOIN 商品, 左连客户
#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub doc_date: DateTime<Utc>,
    pub status: String,
    pub currency: Option<String>,
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub product_id: i64,
    pub product_sku: String,
    pub product_name: String,
    pub qty: Option<BigDecimal>,
    pub unit_price: Option<BigDecimal>,
    pub discount_rate: Option<BigDecimal>,
    pub tax_rate: Option<BigDecimal>,
    pub line_total: Option<BigDecimal>,
}

/// 低库存商品行 (固定报表 low-stock)
#[derive(Debug, Clone, FromRow)]
pub struct LowStockRow {
    pub product_sku: String,
    pub product_name: String,
    pub stock_qty: Option<BigDecimal>,
    pub min_stock: Option<BigDecimal>,
}

/// 即将到期的销售发票行 (固定报表 sales-due-soon)
#[derive(Debug, Clone, FromRow)]
pub struct DueSoonRow {
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub due_date: NaiveDate,
    pub total: Option<BigDecimal>,
}

/// 金额/数量列空值一律按 0 参与汇总
pub fn or_zero(value: &Option<BigDecimal>) -> BigDecimal {
    value.clone().unwrap_or_else(BigDecimal::zero)
}
