use bigdecimal::{BigDecimal, ToPrimitive};
use serde::Serialize;

/// 表格单元格: 线上格式只有 string | number, 不会出现 null
///
/// 维度空值渲染为空串; 指标恒为数值。整数值走 `Int`,
/// 避免 150 被序列化成 150.0。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Int(i64),
    Number(f64),
}

impl Cell {
    /// 高精度金额转单元格
    pub fn from_decimal(value: &BigDecimal) -> Cell {
        let (_, exponent) = value.normalized().as_bigint_and_exponent();
        if exponent <= 0 {
            if let Some(i) = value.to_i64() {
                return Cell::Int(i);
            }
        }
        Cell::Number(value.to_f64().unwrap_or(0.0))
    }
}

/// 动态形状的报表结果: 列清单 + 行清单, 形状由查询决定
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub title: String,
    pub source: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}
