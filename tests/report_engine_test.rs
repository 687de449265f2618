use bigdecimal::BigDecimal;
use chrono::{DateTime, TimeZone, Utc};
use erp_reports_rust::models::{Cell, HeaderRow, ItemRow, ReportQuery, ReportTable};
use erp_reports_rust::service::aggregate::{aggregate, filter_rows, ReportRow};
use erp_reports_rust::service::parser::{parse, ParsedRequest, RawReportRequest};
use erp_reports_rust::service::resolver::{resolve, FetchPlan};
use erp_reports_rust::service::table::build_table;
use erp_reports_rust::ReportError;

fn raw(source: &str) -> RawReportRequest {
    RawReportRequest {
        source: Some(source.to_string()),
        ..Default::default()
    }
}

fn parse_query(request: &RawReportRequest) -> ReportQuery {
    match parse(request).unwrap() {
        ParsedRequest::Query(q) => q,
        ParsedRequest::Legacy(r) => panic!("unexpected legacy report {r:?}"),
    }
}

/// 取数之后的纯管线: 过滤 -> 聚合 -> 渲染
fn run<R: ReportRow>(query: &ReportQuery, rows: Vec<R>) -> ReportTable {
    let rows = filter_rows(rows, query);
    let groups = aggregate(&rows, &query.dims);
    build_table(query, groups)
}

fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn dec(value: &str) -> BigDecimal {
    value.parse().unwrap()
}

fn header(doc_date: DateTime<Utc>, status: &str, currency: &str, total: &str) -> HeaderRow {
    HeaderRow {
        doc_date,
        status: status.to_string(),
        currency: Some(currency.to_string()),
        subtotal: Some(dec(total)),
        discount_total: Some(dec("0")),
        tax_total: Some(dec("0")),
        total: Some(dec(total)),
    }
}

fn item(invoice: &str, product_id: i64, name: &str, qty: &str, unit_price: &str) -> ItemRow {
    let line_total = dec(qty) * dec(unit_price);
    ItemRow {
        doc_date: ts(2025, 1, 10, 9),
        status: "paid".to_string(),
        currency: Some("NIO".to_string()),
        invoice_number: invoice.to_string(),
        customer_name: Some("ACME".to_string()),
        product_id,
        product_sku: format!("SKU-{product_id}"),
        product_name: name.to_string(),
        qty: Some(dec(qty)),
        unit_price: Some(dec(unit_price)),
        discount_rate: None,
        tax_rate: None,
        line_total: Some(line_total),
    }
}

#[test]
fn empty_group_by_and_metrics_default_to_count_and_sum_total() {
    let query = parse_query(&raw("sales"));
    let table = run(&query, vec![header(ts(2025, 1, 1, 10), "paid", "NIO", "10")]);

    // 0 个维度列 + 2 个默认指标列
    assert_eq!(table.columns, vec!["count", "sum_total"]);
    assert_eq!(table.rows, vec![vec![Cell::Int(1), Cell::Int(10)]]);
}

#[test]
fn month_grouping_scenario() {
    let mut request = raw("sales");
    request.group_by = Some(vec!["date:month".to_string()]);
    request.metrics = Some(vec!["count".to_string(), "sum_total".to_string()]);
    let query = parse_query(&request);

    let rows = vec![
        header(ts(2025, 1, 15, 8), "paid", "NIO", "100"),
        header(ts(2025, 1, 20, 22), "issued", "NIO", "50"),
    ];
    let table = run(&query, rows);

    assert_eq!(table.columns, vec!["month", "count", "sum_total"]);
    assert_eq!(
        table.rows,
        vec![vec![
            Cell::Text("2025-01".to_string()),
            Cell::Int(2),
            Cell::Int(150)
        ]]
    );

    // 线上格式: 单元格只有 string | number
    let wire = serde_json::to_value(&table).unwrap();
    assert_eq!(wire["rows"], serde_json::json!([["2025-01", 2, 150]]));
}

#[test]
fn per_product_quantities_scenario() {
    let mut request = raw("sales");
    request.group_by = Some(vec!["product".to_string()]);
    request.metrics = Some(vec!["sum_qty".to_string()]);
    let query = parse_query(&request);

    assert_eq!(resolve(&query).unwrap(), FetchPlan::SalesItems);

    let rows = vec![
        item("F-0001", 1, "Product A", "2", "10"),
        item("F-0001", 2, "Product B", "1", "5"),
    ];
    let table = run(&query, rows);

    assert_eq!(
        table.columns,
        vec!["product_id", "product_sku", "product_name", "sum_qty"]
    );
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][3], Cell::Int(2));
    assert_eq!(table.rows[1][3], Cell::Int(1));
}

#[test]
fn unknown_source_is_not_found_listing_valid_sources() {
    match parse(&raw("foobar")).unwrap_err() {
        ReportError::NotFound(message) => assert!(message.contains("sales | purchases")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn currency_filter_excludes_foreign_rows_entirely() {
    let mut request = raw("sales");
    request.currency = Some("NIO".to_string());
    request.metrics = Some(vec!["count".to_string(), "sum_total".to_string()]);
    let query = parse_query(&request);

    let rows = vec![
        header(ts(2025, 1, 1, 10), "paid", "NIO", "100"),
        header(ts(2025, 1, 2, 10), "paid", "USD", "40"),
    ];
    let table = run(&query, rows);

    // USD 行整体被排除, 而不是按 0 计入
    assert_eq!(table.rows, vec![vec![Cell::Int(1), Cell::Int(100)]]);
}

#[test]
fn status_filter_property_holds_for_every_group() {
    let mut request = raw("sales");
    request.status = Some("Issued,Paid".to_string());
    request.group_by = Some(vec!["status".to_string()]);
    let query = parse_query(&request);

    let rows = vec![
        header(ts(2025, 1, 1, 1), "issued", "NIO", "1"),
        header(ts(2025, 1, 2, 1), "PAID", "NIO", "2"),
        header(ts(2025, 1, 3, 1), "voided", "NIO", "3"),
    ];
    let table = run(&query, rows.clone());
    assert_eq!(table.rows.len(), 2);
    for row in &table.rows {
        match &row[0] {
            Cell::Text(status) => {
                assert!(query.status_set.contains(&status.to_lowercase()))
            }
            other => panic!("status cell should be text, got {other:?}"),
        }
    }

    // 空集合不排除任何行
    let query = parse_query(&raw("sales"));
    assert_eq!(filter_rows(rows, &query).len(), 3);
}

#[test]
fn to_bound_includes_the_whole_final_day() {
    let mut request = raw("sales");
    request.to = Some("2025-03-31".to_string());
    let query = parse_query(&request);
    let to_exclusive = query.to_utc_exclusive.unwrap();

    // 结束日零点与深夜都命中, 次日零点整被排除
    assert!(ts(2025, 3, 31, 0) < to_exclusive);
    assert!(ts(2025, 3, 31, 23) < to_exclusive);
    assert_eq!(ts(2025, 4, 1, 0), to_exclusive);
}

#[test]
fn header_granularity_has_zero_sum_qty() {
    let mut request = raw("sales");
    request.group_by = Some(vec!["status".to_string()]);
    request.metrics = Some(vec!["sum_qty".to_string()]);
    let query = parse_query(&request);

    assert_eq!(resolve(&query).unwrap(), FetchPlan::SalesHeaders);

    let rows = vec![
        header(ts(2025, 1, 1, 1), "paid", "NIO", "100"),
        header(ts(2025, 1, 2, 1), "issued", "NIO", "50"),
    ];
    let table = run(&query, rows);
    for row in &table.rows {
        assert_eq!(row[1], Cell::Int(0));
    }
}

#[test]
fn identical_queries_return_identical_tables() {
    let mut request = raw("sales");
    request.group_by = Some(vec!["date:day".to_string(), "status".to_string()]);
    request.metrics = Some(vec!["sum_subtotal".to_string(), "count".to_string()]);
    let query = parse_query(&request);

    let rows = vec![
        header(ts(2025, 2, 1, 5), "paid", "NIO", "10"),
        header(ts(2025, 2, 1, 6), "issued", "NIO", "20"),
        header(ts(2025, 2, 3, 7), "paid", "USD", "30"),
    ];

    let first = run(&query, rows.clone());
    let second = run(&query, rows);
    assert_eq!(first, second);
}

#[test]
fn row_width_always_matches_column_count() {
    let combos: Vec<(Vec<&str>, Vec<&str>)> = vec![
        (vec![], vec![]),
        (vec!["date:day"], vec!["count"]),
        (vec!["date:month", "currency"], vec!["sum_total", "sum_tax"]),
        (vec!["status", "product"], vec!["sum_qty", "sum_discount", "count"]),
        (vec!["invoice", "customer", "product"], vec!["sum_subtotal"]),
    ];

    let rows = vec![
        item("F-0001", 1, "Product A", "2", "10"),
        item("F-0002", 2, "Product B", "1", "5"),
        item("F-0002", 3, "Product C", "4", "2.50"),
    ];

    for (group_by, metrics) in combos {
        let mut request = raw("sales");
        request.group_by = Some(group_by.iter().map(|s| s.to_string()).collect());
        request.metrics = Some(metrics.iter().map(|s| s.to_string()).collect());
        let query = parse_query(&request);

        let table = run(&query, rows.clone());
        for row in &table.rows {
            assert_eq!(row.len(), table.columns.len());
        }
    }
}
