use crate::error::CliError;
use connectors::store::TableInfo;
use engine_core::report::BackfillReport;

fn report_json(report: &BackfillReport) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

pub async fn write_report(report: &BackfillReport, path: &str) -> Result<(), CliError> {
    let report_json = report_json(report)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_report(report: &BackfillReport) -> Result<(), CliError> {
    let report_json = report_json(report)?;
    println!("{report_json}");
    Ok(())
}

pub fn print_table_info(info: &TableInfo, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(info)?);
        return Ok(());
    }

    println!("Table '{}':", info.name);
    println!("-----------------------------");
    println!("{:<16} {}", "Key schema", info.key_schema);
    println!(
        "{:<16} {}",
        "Status",
        info.status.as_deref().unwrap_or("n/a")
    );
    let items = info
        .item_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    println!("{:<16} {}", "Items (approx.)", items);
    Ok(())
}
