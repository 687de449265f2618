use crate::models::{or_zero, Cell, Dimensions, HeaderRow, ItemRow, Metric, ReportQuery, DEFAULT_CURRENCY};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::{BTreeMap, HashSet};

/// 统一的报表行投影
///
/// 三条聚合管线 (销售头/销售明细/采购头) 都走这一个 trait,
/// 分组与汇总逻辑只写一遍。头粒度没有明细概念: qty 恒为 0,
/// 发票/客户/商品恒为空。
pub trait ReportRow {
    fn doc_date(&self) -> DateTime<Utc>;
    fn status(&self) -> &str;
    fn currency(&self) -> &str;
    fn invoice_number(&self) -> &str;
    fn customer_name(&self) -> &str;
    fn product_id(&self) -> Option<i64>;
    fn product_sku(&self) -> &str;
    fn product_name(&self) -> &str;
    fn qty(&self) -> BigDecimal;
    fn subtotal(&self) -> BigDecimal;
    fn discount(&self) -> BigDecimal;
    fn tax(&self) -> BigDecimal;
    fn total(&self) -> BigDecimal;
}

impl ReportRow for HeaderRow {
    fn doc_date(&self) -> DateTime<Utc> {
        self.doc_date
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    fn invoice_number(&self) -> &str {
        ""
    }

    fn customer_name(&self) -> &str {
        ""
    }

    fn product_id(&self) -> Option<i64> {
        None
    }

    fn product_sku(&self) -> &str {
        ""
    }

    fn product_name(&self) -> &str {
        ""
    }

    fn qty(&self) -> BigDecimal {
        BigDecimal::from(0)
    }

    fn subtotal(&self) -> BigDecimal {
        or_zero(&self.subtotal)
    }

    fn discount(&self) -> BigDecimal {
        or_zero(&self.discount_total)
    }

    fn tax(&self) -> BigDecimal {
        or_zero(&self.tax_total)
    }

    fn total(&self) -> BigDecimal {
        or_zero(&self.total)
    }
}

impl ReportRow for ItemRow {
    fn doc_date(&self) -> DateTime<Utc> {
        self.doc_date
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    fn invoice_number(&self) -> &str {
        &self.invoice_number
    }

    fn customer_name(&self) -> &str {
        self.customer_name.as_deref().unwrap_or("")
    }

    fn product_id(&self) -> Option<i64> {
        Some(self.product_id)
    }

    fn product_sku(&self) -> &str {
        &self.product_sku
    }

    fn product_name(&self) -> &str {
        &self.product_name
    }

    fn qty(&self) -> BigDecimal {
        or_zero(&self.qty)
    }

    fn subtotal(&self) -> BigDecimal {
        or_zero(&self.unit_price) * or_zero(&self.qty)
    }

    fn discount(&self) -> BigDecimal {
        self.subtotal() * or_zero(&self.discount_rate) / BigDecimal::from(100)
    }

    // 折扣后计税, 与开票时的运算顺序一致
    fn tax(&self) -> BigDecimal {
        (self.subtotal() - self.discount()) * or_zero(&self.tax_rate) / BigDecimal::from(100)
    }

    // 取存储的行合计, 不从费率重算, 舍入误差不向 sum_total 累积
    fn total(&self) -> BigDecimal {
        or_zero(&self.line_total)
    }
}

/// 维度种类, 固定顺序: 日期, 状态, 币种, 发票, 客户, 商品
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionKind {
    Day,
    Month,
    Status,
    Currency,
    Invoice,
    Customer,
    Product,
}

impl DimensionKind {
    /// 按固定顺序展开选中的维度 (解析层保证日/月不同时出现)
    pub fn selected(dims: &Dimensions) -> Vec<DimensionKind> {
        let mut kinds = Vec::new();
        if dims.day {
            kinds.push(DimensionKind::Day);
        } else if dims.month {
            kinds.push(DimensionKind::Month);
        }
        if dims.status {
            kinds.push(DimensionKind::Status);
        }
        if dims.currency {
            kinds.push(DimensionKind::Currency);
        }
        if dims.invoice {
            kinds.push(DimensionKind::Invoice);
        }
        if dims.customer {
            kinds.push(DimensionKind::Customer);
        }
        if dims.product {
            kinds.push(DimensionKind::Product);
        }
        kinds
    }

    /// 该维度贡献的输出列 (商品展开为三列)
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            DimensionKind::Day => &["date"],
            DimensionKind::Month => &["month"],
            DimensionKind::Status => &["status"],
            DimensionKind::Currency => &["currency"],
            DimensionKind::Invoice => &["invoice"],
            DimensionKind::Customer => &["customer"],
            DimensionKind::Product => &["product_id", "product_sku", "product_name"],
        }
    }

    fn extract<R: ReportRow>(&self, row: &R) -> DimValue {
        match self {
            DimensionKind::Day => DimValue::Day(row.doc_date().date_naive()),
            DimensionKind::Month => {
                let day = row.doc_date().date_naive();
                DimValue::Month(day.year(), day.month())
            }
            DimensionKind::Status => DimValue::Text(row.status().to_string()),
            DimensionKind::Currency => DimValue::Text(row.currency().to_string()),
            DimensionKind::Invoice => DimValue::Text(row.invoice_number().to_string()),
            DimensionKind::Customer => DimValue::Text(row.customer_name().to_string()),
            DimensionKind::Product => DimValue::Product {
                id: row.product_id(),
                sku: row.product_sku().to_string(),
                name: row.product_name().to_string(),
            },
        }
    }
}

/// 组合键的一个分量
///
/// 派生的字典序就是输出要求的组排序 (日期, 状态, 币种, 发票,
/// 客户, 商品, 全部升序), 同一报表里每个键位的变体固定。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DimValue {
    Day(NaiveDate),
    Month(i32, u32),
    Text(String),
    Product {
        id: Option<i64>,
        sku: String,
        name: String,
    },
}

impl DimValue {
    /// 渲染为输出单元格: 空值渲染为空串, 不输出 null
    pub fn render_into(self, cells: &mut Vec<Cell>) {
        match self {
            DimValue::Day(day) => cells.push(Cell::Text(day.format("%Y-%m-%d").to_string())),
            DimValue::Month(year, month) => cells.push(Cell::Text(format!("{year:04}-{month:02}"))),
            DimValue::Text(text) => cells.push(Cell::Text(text)),
            DimValue::Product { id, sku, name } => {
                cells.push(id.map(Cell::Int).unwrap_or_else(|| Cell::Text(String::new())));
                cells.push(Cell::Text(sku));
                cells.push(Cell::Text(name));
            }
        }
    }
}

/// 指标累加器: 枚举键取数, 不做运行时反射
///
/// 六个指标一次遍历全部算好, 提取哪些由查询的指标列表决定。
#[derive(Debug, Clone, Default)]
pub struct MetricAcc {
    pub count: i64,
    pub sum_qty: BigDecimal,
    pub sum_subtotal: BigDecimal,
    pub sum_discount: BigDecimal,
    pub sum_tax: BigDecimal,
    pub sum_total: BigDecimal,
}

impl MetricAcc {
    fn absorb<R: ReportRow>(&mut self, row: &R) {
        self.count += 1;
        self.sum_qty += row.qty();
        self.sum_subtotal += row.subtotal();
        self.sum_discount += row.discount();
        self.sum_tax += row.tax();
        self.sum_total += row.total();
    }

    /// 提取单个指标为输出单元格 (指标恒为数值, 不会为 null)
    pub fn cell(&self, metric: Metric) -> Cell {
        match metric {
            Metric::Count => Cell::Int(self.count),
            Metric::SumQty => Cell::from_decimal(&self.sum_qty),
            Metric::SumSubtotal => Cell::from_decimal(&self.sum_subtotal),
            Metric::SumDiscount => Cell::from_decimal(&self.sum_discount),
            Metric::SumTax => Cell::from_decimal(&self.sum_tax),
            Metric::SumTotal => Cell::from_decimal(&self.sum_total),
        }
    }
}

/// 状态/币种集合过滤, 分组之前执行
///
/// 大小写不敏感, 空集合不排除任何行; 明细粒度也按所属单据头的
/// 状态/币种判断 (明细流本身带着头上的两列)。
pub fn filter_rows<R: ReportRow>(rows: Vec<R>, query: &ReportQuery) -> Vec<R> {
    rows.into_iter()
        .filter(|row| {
            set_allows(&query.status_set, row.status())
                && set_allows(&query.currency_set, row.currency())
        })
        .collect()
}

fn set_allows(set: &HashSet<String>, value: &str) -> bool {
    set.is_empty() || set.contains(&value.to_lowercase())
}

/// 通用聚合: 按选中维度分区, 逐行吸收指标
///
/// 组合键只含选中的维度值, 未选维度整体塌缩;
/// BTreeMap 迭代自带升序, 不需要再排一遍。
pub fn aggregate<R: ReportRow>(rows: &[R], dims: &Dimensions) -> Vec<(Vec<DimValue>, MetricAcc)> {
    let kinds = DimensionKind::selected(dims);
    let mut groups: BTreeMap<Vec<DimValue>, MetricAcc> = BTreeMap::new();
    for row in rows {
        let key: Vec<DimValue> = kinds.iter().map(|kind| kind.extract(row)).collect();
        groups.entry(key).or_default().absorb(row);
    }
    groups.into_iter().collect()
}
