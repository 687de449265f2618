use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// 报表数据源
///
/// `Inventory` / `Products` 会被解析为合法来源, 但聚合引擎不支持,
/// 统一在维度解析阶段拒绝 (沿用旧系统行为)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Sales,
    Purchases,
    Inventory,
    Products,
}

impl Source {
    /// 合法来源列表 (404 报错信息按此顺序枚举)
    pub const ALL: [Source; 4] = [
        Source::Sales,
        Source::Purchases,
        Source::Inventory,
        Source::Products,
    ];

    pub fn parse(raw: &str) -> Option<Source> {
        match raw.trim().to_lowercase().as_str() {
            "sales" => Some(Source::Sales),
            "purchases" => Some(Source::Purchases),
            "inventory" => Some(Source::Inventory),
            "products" => Some(Source::Products),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Sales => "sales",
            Source::Purchases => "purchases",
            Source::Inventory => "inventory",
            Source::Products => "products",
        }
    }

    /// 报表标题
    pub fn title(&self) -> &'static str {
        match self {
            Source::Sales => "Sales report",
            Source::Purchases => "Purchases report",
            Source::Inventory => "Inventory report",
            Source::Products => "Products report",
        }
    }
}

/// 分组维度开关
///
/// `day` 与 `month` 互斥, 解析阶段保证两者不会同时为真 (day 优先)。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub day: bool,
    pub month: bool,
    pub status: bool,
    pub currency: bool,
    pub invoice: bool,
    pub customer: bool,
    pub product: bool,
}

impl Dimensions {
    /// 是否选择了明细级维度 (发票/客户/商品), 决定连接粒度
    pub fn needs_items(&self) -> bool {
        self.invoice || self.customer || self.product
    }
}

/// 汇总指标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Count,
    SumQty,
    SumSubtotal,
    SumDiscount,
    SumTax,
    SumTotal,
}

impl Metric {
    pub fn parse(token: &str) -> Option<Metric> {
        match token.trim().to_lowercase().as_str() {
            "count" => Some(Metric::Count),
            "sum_qty" => Some(Metric::SumQty),
            "sum_subtotal" => Some(Metric::SumSubtotal),
            "sum_discount" => Some(Metric::SumDiscount),
            "sum_tax" => Some(Metric::SumTax),
            "sum_total" => Some(Metric::SumTotal),
            _ => None,
        }
    }

    /// 输出表格中的列名
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::Count => "count",
            Metric::SumQty => "sum_qty",
            Metric::SumSubtotal => "sum_subtotal",
            Metric::SumDiscount => "sum_discount",
            Metric::SumTax => "sum_tax",
            Metric::SumTotal => "sum_total",
        }
    }
}

/// 规范化后的报表查询 (请求作用域, 不落库)
///
/// 时间窗口: `from_utc` 为含下界, `to_utc_exclusive` 为不含上界
/// (用户给出的 to 加一天), 所以结束日当天任何时刻的记录都会命中。
/// 状态/币种集合统一小写, 空集合表示不过滤。
#[derive(Debug, Clone)]
pub struct ReportQuery {
    pub source: Source,
    pub from_utc: Option<DateTime<Utc>>,
    pub to_utc_exclusive: Option<DateTime<Utc>>,
    pub status_set: HashSet<String>,
    pub currency_set: HashSet<String>,
    pub dims: Dimensions,
    pub metrics: Vec<Metric>,
}
