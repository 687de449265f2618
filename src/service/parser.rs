use crate::error::ReportError;
use crate::models::{Dimensions, Metric, ReportQuery, Source};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexSet;
use serde::Deserialize;
use std::collections::HashSet;

/// 原始报表请求 (POST /reports/run 请求体, 字段全部可选)
///
/// `from`/`to` 与 `dateFrom`/`dateTo` 等价, 短写法优先;
/// `status`/`currency` 既可扁平也可嵌套在 `filters` 下, 扁平优先。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawReportRequest {
    pub name: Option<String>,
    pub source: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub status: Option<String>,
    pub currency: Option<String>,
    pub filters: Option<RawFilters>,
    pub group_by: Option<Vec<String>>,
    pub metrics: Option<Vec<String>>,
}

/// 嵌套过滤器写法
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFilters {
    pub status: Option<String>,
    pub currency: Option<String>,
}

/// 旧式命名报表: 固定形状点查询, 不经过维度解析与聚合引擎
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyReport {
    LowStock,
    SalesDueSoon,
}

/// 解析结果: 带 name 的请求直接分流到命名报表
#[derive(Debug, Clone)]
pub enum ParsedRequest {
    Legacy(LegacyReport),
    Query(ReportQuery),
}

/// 把原始请求规范化为类型化查询
pub fn parse(raw: &RawReportRequest) -> Result<ParsedRequest, ReportError> {
    if let Some(name) = raw.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let report = match name {
            "low-stock" => LegacyReport::LowStock,
            "sales-due-soon" => LegacyReport::SalesDueSoon,
            other => {
                return Err(ReportError::NotFound(format!(
                    "unknown report name '{other}', valid names: low-stock | sales-due-soon"
                )))
            }
        };
        return Ok(ParsedRequest::Legacy(report));
    }

    let source_raw = raw
        .source
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReportError::Validation("source is required".to_string()))?;
    let source = Source::parse(source_raw).ok_or_else(|| {
        let valid = Source::ALL.map(|s| s.as_str()).join(" | ");
        ReportError::NotFound(format!(
            "unknown source '{source_raw}', valid sources: {valid}"
        ))
    })?;

    // to 为用户含义上的闭区间: 上界取 to+1 天零点, 按不含处理,
    // 结束日当天任何时刻的记录都会命中
    let from_utc = pick(&raw.from, &raw.date_from)
        .and_then(parse_day)
        .and_then(utc_midnight);
    let to_utc_exclusive = pick(&raw.to, &raw.date_to)
        .and_then(parse_day)
        .and_then(|d| d.succ_opt())
        .and_then(utc_midnight);

    let status_set = parse_set(
        raw.status.as_deref(),
        raw.filters.as_ref().and_then(|f| f.status.as_deref()),
    );
    let currency_set = parse_set(
        raw.currency.as_deref(),
        raw.filters.as_ref().and_then(|f| f.currency.as_deref()),
    );

    let mut dims = Dimensions::default();
    for token in raw.group_by.iter().flatten() {
        match token.trim().to_lowercase().as_str() {
            "date:day" => dims.day = true,
            "date:month" => dims.month = true,
            "status" => dims.status = true,
            "currency" => dims.currency = true,
            "invoice" => dims.invoice = true,
            "customer" => dims.customer = true,
            "product" => dims.product = true,
            // 未知维度与非法日期同一宽松口径: 忽略
            _ => {}
        }
    }
    if dims.day {
        dims.month = false; // 日/月互斥, 日优先
    }

    let mut selected: IndexSet<Metric> = IndexSet::new();
    for token in raw.metrics.iter().flatten() {
        if let Some(metric) = Metric::parse(token) {
            selected.insert(metric);
        }
    }
    let metrics: Vec<Metric> = if selected.is_empty() {
        vec![Metric::Count, Metric::SumTotal]
    } else {
        selected.into_iter().collect()
    };

    Ok(ParsedRequest::Query(ReportQuery {
        source,
        from_utc,
        to_utc_exclusive,
        status_set,
        currency_set,
        dims,
        metrics,
    }))
}

fn pick<'a>(short: &'a Option<String>, long: &'a Option<String>) -> Option<&'a str> {
    short.as_deref().or(long.as_deref())
}

/// 宽松日期解析: 非法字符串不报错, 视为无边界 (沿用旧系统行为)
fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn utc_midnight(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

/// 逗号或斜杠分隔的集合, 统一小写
fn parse_set(flat: Option<&str>, nested: Option<&str>) -> HashSet<String> {
    flat.or(nested)
        .unwrap_or("")
        .split([',', '/'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
