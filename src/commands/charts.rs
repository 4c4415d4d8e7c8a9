use crate::*;

use revdash::controller::{load_charts, ChartData};

pub async fn handle(json: bool) -> anyhow::Result<()> {
    let cfg = load_config()?;
    let gw = gateway(&cfg)?;
    let charts = load_charts(&gw).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&charts)?);
    } else {
        print!("{}", format_charts(&charts));
    }
    Ok(())
}

fn format_charts(charts: &ChartData) -> String {
    let mut out = format!("Current year: {}\n", charts.current_year);

    for period in &charts.revenue_periods {
        out.push_str(&format!("\n{}\n", period.name));
        for p in &period.points {
            out.push_str(&format!("  {:<24} {:>6.1}%\n", p.name, p.value));
        }
    }

    out.push_str("\nTop 5 Products by Revenue\n");
    if charts.top_products.is_empty() {
        out.push_str("  (none)\n");
    }
    for p in &charts.top_products {
        out.push_str(&format!("  {:<24} {:>6}K\n", p.label, p.value));
    }

    out.push_str("\nCompare Revenue By Years\n");
    for series in &charts.restaurant_series {
        out.push_str(&format!("  {}\n", series.name));
        for p in &series.points {
            out.push_str(&format!("    {}  {:>12.2}\n", p.label, p.value));
        }
    }
    out
}
