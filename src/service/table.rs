use crate::models::{Cell, ReportQuery, ReportTable};
use crate::service::aggregate::{DimValue, DimensionKind, MetricAcc};
use std::path::Path;

/// 由有序分组渲染列清单与行清单
///
/// 只遍历选中的维度/指标列表, 不对维度×指标组合做分支,
/// 新增一个维度或指标都是局部改动。
pub fn build_table(query: &ReportQuery, groups: Vec<(Vec<DimValue>, MetricAcc)>) -> ReportTable {
    let kinds = DimensionKind::selected(&query.dims);

    let mut columns: Vec<String> = Vec::new();
    for kind in &kinds {
        columns.extend(kind.columns().iter().map(|c| c.to_string()));
    }
    for metric in &query.metrics {
        columns.push(metric.column_name().to_string());
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (key, acc) in groups {
        let mut cells = Vec::with_capacity(columns.len());
        for value in key {
            value.render_into(&mut cells);
        }
        for metric in &query.metrics {
            cells.push(acc.cell(*metric));
        }
        rows.push(cells);
    }

    ReportTable {
        title: query.source.title().to_string(),
        source: query.source.as_str().to_string(),
        columns,
        rows,
    }
}

/// 导出渲染好的报表到 CSV 文件 (首行为列名)
pub fn export_to_csv(
    table: &ReportTable,
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use csv::Writer;
    use std::fs::File;

    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        let record: Vec<String> = row.iter().map(cell_to_csv).collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn cell_to_csv(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => text.clone(),
        Cell::Int(value) => value.to_string(),
        Cell::Number(value) => value.to_string(),
    }
}
