use crate::error::ReportError;
use crate::models::{ReportQuery, Source};

/// 取数计划: 数据源与连接粒度的合法组合
///
/// 明细粒度只存在于销售侧; 采购明细聚合未实现,
/// `inventory`/`products` 虽是合法来源但没有聚合路径。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPlan {
    SalesHeaders,
    SalesItems,
    PurchaseHeaders,
}

/// 根据数据源与维度选择决定连接粒度
///
/// 销售侧只要选了发票/客户/商品任一维度就切到明细粒度
/// (明细 JOIN 单据头 JOIN 商品, 左连客户), 否则单据头一张表就够。
pub fn resolve(query: &ReportQuery) -> Result<FetchPlan, ReportError> {
    match query.source {
        Source::Sales => {
            if query.dims.needs_items() {
                Ok(FetchPlan::SalesItems)
            } else {
                Ok(FetchPlan::SalesHeaders)
            }
        }
        Source::Purchases => {
            if query.dims.needs_items() {
                Err(ReportError::Unsupported(
                    "item-level grouping (invoice/customer/product) is not implemented for purchases"
                        .to_string(),
                ))
            } else {
                Ok(FetchPlan::PurchaseHeaders)
            }
        }
        Source::Inventory | Source::Products => Err(ReportError::Unsupported(format!(
            "source '{}' does not support ad-hoc aggregation",
            query.source.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dimensions, Metric};

    fn query(source: Source, dims: Dimensions) -> ReportQuery {
        ReportQuery {
            source,
            from_utc: None,
            to_utc_exclusive: None,
            status_set: Default::default(),
            currency_set: Default::default(),
            dims,
            metrics: vec![Metric::Count],
        }
    }

    #[test]
    fn sales_switches_to_item_granularity_on_item_dimensions() {
        for dims in [
            Dimensions {
                invoice: true,
                ..Default::default()
            },
            Dimensions {
                customer: true,
                ..Default::default()
            },
            Dimensions {
                product: true,
                status: true,
                ..Default::default()
            },
        ] {
            let plan = resolve(&query(Source::Sales, dims)).unwrap();
            assert_eq!(plan, FetchPlan::SalesItems);
        }
    }

    #[test]
    fn sales_stays_on_headers_without_item_dimensions() {
        let dims = Dimensions {
            month: true,
            status: true,
            currency: true,
            ..Default::default()
        };
        let plan = resolve(&query(Source::Sales, dims)).unwrap();
        assert_eq!(plan, FetchPlan::SalesHeaders);
    }

    #[test]
    fn purchases_reject_item_dimensions() {
        let dims = Dimensions {
            product: true,
            ..Default::default()
        };
        let err = resolve(&query(Source::Purchases, dims)).unwrap_err();
        assert!(matches!(err, ReportError::Unsupported(_)));

        let plan = resolve(&query(Source::Purchases, Dimensions::default())).unwrap();
        assert_eq!(plan, FetchPlan::PurchaseHeaders);
    }

    #[test]
    fn inventory_and_products_are_always_unsupported() {
        for source in [Source::Inventory, Source::Products] {
            let err = resolve(&query(source, Dimensions::default())).unwrap_err();
            assert!(matches!(err, ReportError::Unsupported(_)));
        }
    }
}
