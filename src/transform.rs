//! Pure conversions from API schema types into chart points and table rows.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::{ProductRevenue, RawOrder, RestaurantRevenueResponse, RevenuePeriodResponse};

/// One restaurant's share of a period, in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePeriodPoint {
    pub name: String,
    pub value: f64,
}

/// Product revenue in thousands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopProductPoint {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantYearPoint {
    pub label: i32,
    pub value: f64,
}

/// One visual grouping of points, named after the response key it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<P> {
    pub name: String,
    pub points: Vec<P>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_number: i64,
    pub order_date: String,
    pub item_name: String,
    pub quantity: i64,
    pub product_price: Decimal,
    pub total_products: Decimal,
}

pub fn to_revenue_points(raw: &RevenuePeriodResponse) -> Vec<Series<RevenuePeriodPoint>> {
    raw.iter()
        .map(|(period, shares)| Series {
            name: period.to_string(),
            points: shares
                .iter()
                .map(|share| RevenuePeriodPoint {
                    name: share.restaurant_name.clone(),
                    value: share.percentage,
                })
                .collect(),
        })
        .collect()
}

/// Scales raw revenue to thousands, rounding half away from zero.
/// Negative revenue clamps to zero.
pub fn scale_to_thousands(revenue: f64) -> u64 {
    let scaled = (revenue / 1000.0).round();
    if scaled.is_finite() && scaled > 0.0 {
        scaled as u64
    } else {
        0
    }
}

pub fn to_top_product_points(product_revenues: &[ProductRevenue]) -> Vec<TopProductPoint> {
    product_revenues
        .iter()
        .map(|p| TopProductPoint {
            label: p.product_name.clone(),
            value: scale_to_thousands(p.revenue),
        })
        .collect()
}

pub fn to_restaurant_year_series(raw: &RestaurantRevenueResponse) -> Vec<Series<RestaurantYearPoint>> {
    raw.iter()
        .map(|(restaurant_type, years)| Series {
            name: restaurant_type.to_string(),
            points: years
                .iter()
                .map(|y| RestaurantYearPoint {
                    label: y.year,
                    value: y.revenue,
                })
                .collect(),
        })
        .collect()
}

pub fn to_order_rows<F>(raw: Vec<RawOrder>, format_date: F) -> Vec<OrderRecord>
where
    F: Fn(&DateTime<FixedOffset>) -> String,
{
    raw.into_iter()
        .map(|o| OrderRecord {
            order_number: o.order_number,
            order_date: format_date(&o.order_date),
            item_name: o.item_name,
            quantity: o.quantity,
            product_price: o.product_price,
            total_products: o.total_products,
        })
        .collect()
}
