use crate::*;

use revdash::controller::{Controller, Phase};
use revdash::transform::OrderRecord;

pub async fn handle(restaurant: Option<i64>, search: Option<String>, json: bool) -> anyhow::Result<()> {
    let cfg = load_config()?;
    let gw = gateway(&cfg)?;
    let restaurant_id = restaurant.unwrap_or_else(|| cfg.default_restaurant());

    let mut controller = Controller::new(restaurant_id, cfg.date_pattern()?);
    controller.search(search.as_deref());
    controller.reload(&gw).await;

    if controller.phase() == Phase::Failed {
        if let Some(e) = controller.last_error() {
            return Err(anyhow::Error::new(e.clone()).context("could not load orders"));
        }
    }

    let rows = &controller.view().rows;
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    println!("{} · {} orders", cfg.restaurant_name(restaurant_id), rows.len());
    if let Some(text) = controller.filter().search_text() {
        println!("  search: {}", text);
    }
    if rows.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    println!();
    print!("{}", format_table(rows));
    Ok(())
}

fn format_table(rows: &[OrderRecord]) -> String {
    let item_width = rows
        .iter()
        .map(|r| r.item_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Item".len());

    let mut out = format!(
        "  {:>8}  {:<16}  {:<iw$}  {:>5}  {:>10}  {:>10}\n",
        "Order #",
        "Date",
        "Item",
        "Qty",
        "Price",
        "Total",
        iw = item_width
    );
    for r in rows {
        out.push_str(&format!(
            "  {:>8}  {:<16}  {:<iw$}  {:>5}  {:>10.2}  {:>10.2}\n",
            r.order_number,
            r.order_date,
            r.item_name,
            r.quantity,
            r.product_price,
            r.total_products,
            iw = item_width
        ));
    }
    out
}
