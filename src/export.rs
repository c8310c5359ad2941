//! Report export to spreadsheet-friendly formats

use crate::error::{CostwatchError, Result};
use crate::report::DailyReport;
use chrono::Utc;
use std::path::Path;

/// Export reports as CSV or HTML, to a file or stdout
pub fn export_reports(reports: &[DailyReport], format: &str, file: Option<&Path>) -> Result<()> {
    let rendered = match format {
        "csv" => generate_csv(reports),
        "html" => generate_html(reports),
        _ => {
            return Err(CostwatchError::Validation {
                field: "format".to_string(),
                reason: format!("Unsupported export format: {}. Use 'csv' or 'html'", format),
            });
        }
    };

    if let Some(path) = file {
        std::fs::write(path, rendered)?;
        println!("Exported to {}", path.display());
    } else {
        print!("{}", rendered);
    }
    Ok(())
}

fn generate_csv(reports: &[DailyReport]) -> String {
    let mut csv = String::from("Date,Region,Instance Type,Hours,Unique Instances,Cost\n");
    for report in reports {
        for region in report.regions.values() {
            for class in region.classes.values() {
                csv.push_str(&format!(
                    "{},{},{},{},{},{:.2}\n",
                    report.date,
                    region.region,
                    class.instance_type,
                    class.hours,
                    class.unique_instances.len(),
                    class.cost
                ));
            }
        }
    }
    csv
}

fn generate_html(reports: &[DailyReport]) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>costwatch Usage Report</title>
    <style>
        body { font-family: monospace; margin: 20px; }
        table { border-collapse: collapse; width: 100%; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background-color: #4CAF50; color: white; }
        tr:nth-child(even) { background-color: #f2f2f2; }
    </style>
</head>
<body>
    <h1>EC2 Usage Report</h1>
    <p>Generated: "#,
    );
    html.push_str(&Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string());
    html.push_str(
        r#"</p>
    <table>
        <tr>
            <th>Date</th>
            <th>Region</th>
            <th>Instance Type</th>
            <th>Hours</th>
            <th>Unique Instances</th>
            <th>Cost</th>
        </tr>"#,
    );

    for report in reports {
        for region in report.regions.values() {
            for class in region.classes.values() {
                html.push_str(&format!(
                    r#"
        <tr>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>{}</td>
            <td>${:.2}</td>
        </tr>"#,
                    report.date,
                    region.region,
                    class.instance_type,
                    class.hours,
                    class.unique_instances.len(),
                    class.cost
                ));
            }
        }
    }

    html.push_str(
        r#"
    </table>
</body>
</html>"#,
    );
    html
}
