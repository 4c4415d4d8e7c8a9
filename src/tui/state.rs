use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::datefmt::DatePattern;
use crate::transform::OrderRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Orders,
}

impl Tab {
    pub fn from_str(s: &str) -> Self {
        match s {
            "orders" => Tab::Orders,
            _ => Tab::Dashboard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Orders => "orders",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Dashboard => Tab::Orders,
            Tab::Orders => Tab::Dashboard,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    OrderNumber,
    OrderDate,
    ItemName,
    Quantity,
    ProductPrice,
    TotalProducts,
}

impl SortColumn {
    pub const ALL: [SortColumn; 6] = [
        SortColumn::OrderNumber,
        SortColumn::OrderDate,
        SortColumn::ItemName,
        SortColumn::Quantity,
        SortColumn::ProductPrice,
        SortColumn::TotalProducts,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            SortColumn::OrderNumber => "Order #",
            SortColumn::OrderDate => "Date",
            SortColumn::ItemName => "Item",
            SortColumn::Quantity => "Qty",
            SortColumn::ProductPrice => "Price",
            SortColumn::TotalProducts => "Total",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "▲"),
            SortDirection::Desc => write!(f, "▼"),
        }
    }
}

/// Paging and sorting over the loaded order rows. The rows themselves stay
/// in the controller; this only decides which of them are on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableView {
    pub page: usize,
    pub page_size: usize,
    pub sort: Option<(SortColumn, SortDirection)>,
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 0,
            page_size: page_size.max(1),
            sort: None,
        }
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page + 1 < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Back to the first page, as when a new result set arrives.
    pub fn reset(&mut self) {
        self.page = 0;
    }

    /// none -> each column ascending -> none
    pub fn cycle_sort(&mut self) {
        self.sort = match self.sort {
            None => Some((SortColumn::ALL[0], SortDirection::Asc)),
            Some((col, _)) => {
                let idx = SortColumn::ALL.iter().position(|c| *c == col).unwrap_or(0);
                SortColumn::ALL.get(idx + 1).map(|next| (*next, SortDirection::Asc))
            }
        };
        self.page = 0;
    }

    pub fn flip_direction(&mut self) {
        if let Some((col, dir)) = self.sort {
            let flipped = match dir {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
            self.sort = Some((col, flipped));
        }
    }

    pub fn visible<'a>(&self, rows: &'a [OrderRecord], pattern: &DatePattern) -> Vec<&'a OrderRecord> {
        let mut ordered: Vec<&OrderRecord> = rows.iter().collect();
        if let Some((col, dir)) = self.sort {
            ordered.sort_by(|a, b| {
                let ord = compare(col, a, b, pattern);
                match dir {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            });
        }
        let page = self.page.min(self.page_count(rows.len()) - 1);
        ordered
            .into_iter()
            .skip(page * self.page_size)
            .take(self.page_size)
            .collect()
    }
}

fn compare(col: SortColumn, a: &OrderRecord, b: &OrderRecord, pattern: &DatePattern) -> Ordering {
    match col {
        SortColumn::OrderNumber => a.order_number.cmp(&b.order_number),
        SortColumn::OrderDate => match (pattern.sort_key(&a.order_date), pattern.sort_key(&b.order_date)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => a.order_date.cmp(&b.order_date),
        },
        SortColumn::ItemName => a.item_name.to_lowercase().cmp(&b.item_name.to_lowercase()),
        SortColumn::Quantity => a.quantity.cmp(&b.quantity),
        SortColumn::ProductPrice => a.product_price.cmp(&b.product_price),
        SortColumn::TotalProducts => a.total_products.cmp(&b.total_products),
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    pub last_active_tab: String,
    pub restaurant_id: Option<i64>,
}

impl UserPreferences {
    pub fn default_prefs() -> Self {
        Self {
            last_active_tab: "dashboard".to_string(),
            restaurant_id: None,
        }
    }
}
