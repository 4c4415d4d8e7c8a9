//! View-state controller for the orders table and the chart snapshot.
//!
//! The controller owns [`Filter`] and [`ViewState`]. Every reload is issued
//! as a [`ReloadTicket`] carrying a sequence number; a response is applied
//! only when its ticket is still the most recently issued one.

use crate::api::{DashboardApi, RawOrder};
use crate::datefmt::DatePattern;
use crate::error::{ExportError, FetchError};
use crate::export::{ExportCoordinator, FileSaver, Notifier};
use crate::transform::{self, OrderRecord, RestaurantYearPoint, RevenuePeriodPoint, Series, TopProductPoint};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub restaurant_id: i64,
    search_text: Option<String>,
}

impl Filter {
    pub fn new(restaurant_id: i64) -> Self {
        Self {
            restaurant_id,
            search_text: None,
        }
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search_text.as_deref()
    }

    /// An empty string clears the search.
    fn set_search(&mut self, text: Option<&str>) {
        self.search_text = text.filter(|t| !t.is_empty()).map(str::to_string);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub is_loading: bool,
    pub rows: Vec<OrderRecord>,
    pub is_exporting: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// An issued reload: its sequence number and the filter it was issued with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadTicket {
    pub seq: u64,
    pub filter: Filter,
}

impl ReloadTicket {
    pub async fn fetch<A: DashboardApi>(&self, api: &A) -> Result<Vec<RawOrder>, FetchError> {
        api.orders(self.filter.restaurant_id, self.filter.search_text()).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Superseded,
}

pub struct Controller {
    filter: Filter,
    view: ViewState,
    phase: Phase,
    issued: u64,
    last_error: Option<FetchError>,
    date_pattern: DatePattern,
}

impl Controller {
    pub fn new(restaurant_id: i64, date_pattern: DatePattern) -> Self {
        Self {
            filter: Filter::new(restaurant_id),
            view: ViewState::default(),
            phase: Phase::Idle,
            issued: 0,
            last_error: None,
            date_pattern,
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn select_restaurant(&mut self, restaurant_id: i64) -> ReloadTicket {
        self.filter.restaurant_id = restaurant_id;
        self.filter.set_search(None);
        self.begin_reload()
    }

    pub fn search(&mut self, text: Option<&str>) -> ReloadTicket {
        self.filter.set_search(text);
        self.begin_reload()
    }

    /// Issues a new request for the current filter. Any request still in
    /// flight is superseded from this point on.
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.issued += 1;
        self.view.is_loading = true;
        self.phase = Phase::Loading;
        tracing::debug!(seq = self.issued, filter = ?self.filter, "reload issued");
        ReloadTicket {
            seq: self.issued,
            filter: self.filter.clone(),
        }
    }

    /// Applies the response of ticket `seq`, or drops it if a newer ticket
    /// has been issued since.
    pub fn complete(&mut self, seq: u64, result: Result<Vec<RawOrder>, FetchError>) -> Outcome {
        if seq != self.issued {
            tracing::debug!(seq, latest = self.issued, "discarding superseded response");
            return Outcome::Superseded;
        }

        self.view.is_loading = false;
        match result {
            Ok(raw) => {
                let pattern = &self.date_pattern;
                self.view.rows = transform::to_order_rows(raw, |ts| pattern.format(ts));
                self.phase = Phase::Loaded;
                self.last_error = None;
                tracing::info!(seq, rows = self.view.rows.len(), "orders loaded");
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "orders reload failed");
                self.phase = Phase::Failed;
                self.last_error = Some(e);
            }
        }
        Outcome::Applied
    }

    pub async fn reload<A: DashboardApi>(&mut self, api: &A) -> Outcome {
        let ticket = self.begin_reload();
        let result = ticket.fetch(api).await;
        self.complete(ticket.seq, result)
    }

    pub fn begin_export(&mut self) {
        self.view.is_exporting = true;
    }

    /// Saves and announces a finished export download.
    pub fn finish_export<S: FileSaver, N: Notifier>(
        &mut self,
        coordinator: &ExportCoordinator<S, N>,
        downloaded: Result<Vec<u8>, FetchError>,
    ) -> Result<(), ExportError> {
        let outcome = coordinator.finish(downloaded);
        self.view.is_exporting = false;
        outcome
    }

    pub async fn export_current<A: DashboardApi, S: FileSaver, N: Notifier>(
        &mut self,
        api: &A,
        coordinator: &ExportCoordinator<S, N>,
    ) -> Result<(), ExportError> {
        self.begin_export();
        let downloaded = api.export_orders().await;
        self.finish_export(coordinator, downloaded)
    }
}

/// Everything the chart views show, loaded together.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub current_year: i32,
    pub revenue_periods: Vec<Series<RevenuePeriodPoint>>,
    pub top_products: Vec<TopProductPoint>,
    pub restaurant_series: Vec<Series<RestaurantYearPoint>>,
}

pub async fn load_charts<A: DashboardApi>(api: &A) -> Result<ChartData, FetchError> {
    let (periods, current_year, top, restaurants) = tokio::try_join!(
        api.revenue_period(),
        api.current_year(),
        api.top_products(),
        api.restaurant_revenue(),
    )?;

    Ok(ChartData {
        current_year,
        revenue_periods: transform::to_revenue_points(&periods),
        top_products: transform::to_top_product_points(&top.product_revenues),
        restaurant_series: transform::to_restaurant_year_series(&restaurants),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{
        Endpoint, OrderedMap, ProductRevenue, RestaurantRevenueResponse, RestaurantShare, RevenuePeriodResponse,
        TopProductResponse, YearRevenue,
    };
    use std::sync::Mutex;

    /// In-memory API double. Orders are keyed by restaurant id and filtered
    /// by item name when a search text is given.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub orders: Vec<(i64, RawOrder)>,
        pub fail_orders: bool,
        pub export: Option<Vec<u8>>,
        pub calls: Mutex<Vec<(i64, Option<String>)>>,
    }

    pub(crate) fn raw_order(number: i64, item: &str) -> RawOrder {
        RawOrder {
            order_number: number,
            order_date: chrono::DateTime::parse_from_rfc3339("2024-01-02T10:00:00Z").unwrap(),
            item_name: item.to_string(),
            quantity: 1,
            product_price: rust_decimal::Decimal::from(5),
            total_products: rust_decimal::Decimal::from(5),
        }
    }

    impl DashboardApi for FakeApi {
        async fn revenue_period(&self) -> Result<RevenuePeriodResponse, FetchError> {
            Ok(OrderedMap(vec![(
                "Period 1".to_string(),
                vec![RestaurantShare {
                    restaurant_name: "Restaurant 1".to_string(),
                    percentage: 20.1,
                }],
            )]))
        }

        async fn current_year(&self) -> Result<i32, FetchError> {
            Ok(2024)
        }

        async fn top_products(&self) -> Result<TopProductResponse, FetchError> {
            Ok(TopProductResponse {
                product_revenues: vec![ProductRevenue {
                    product_name: "A".to_string(),
                    revenue: 15000.0,
                }],
            })
        }

        async fn restaurant_revenue(&self) -> Result<RestaurantRevenueResponse, FetchError> {
            Ok(OrderedMap(vec![(
                "1".to_string(),
                vec![YearRevenue {
                    year: 2024,
                    revenue: 10.0,
                }],
            )]))
        }

        async fn orders(&self, restaurant_id: i64, search_text: Option<&str>) -> Result<Vec<RawOrder>, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((restaurant_id, search_text.map(str::to_string)));
            if self.fail_orders {
                return Err(FetchError::new(Endpoint::Orders, "connection refused"));
            }
            Ok(self
                .orders
                .iter()
                .filter(|(id, o)| *id == restaurant_id && search_text.map_or(true, |s| o.item_name.contains(s)))
                .map(|(_, o)| o.clone())
                .collect())
        }

        async fn export_orders(&self) -> Result<Vec<u8>, FetchError> {
            self.export
                .clone()
                .ok_or_else(|| FetchError::new(Endpoint::OrdersExport, "HTTP 500 Internal Server Error"))
        }
    }

    fn controller() -> Controller {
        Controller::new(1, DatePattern::default())
    }

    #[tokio::test]
    async fn reload_transforms_rows() {
        let api = FakeApi {
            orders: vec![(1, raw_order(1, "Burger")), (2, raw_order(2, "Sushi"))],
            ..Default::default()
        };
        let mut c = controller();
        assert_eq!(c.phase(), Phase::Idle);

        assert_eq!(c.reload(&api).await, Outcome::Applied);
        assert_eq!(c.phase(), Phase::Loaded);
        assert!(!c.view().is_loading);
        assert_eq!(c.view().rows.len(), 1);
        assert_eq!(c.view().rows[0].order_date, "02-01-2024 10:00");
    }

    #[test]
    fn newest_ticket_wins_when_answered_first() {
        let mut c = controller();
        let r1 = c.search(Some("old"));
        let r2 = c.search(Some("new"));
        assert!(c.view().is_loading);

        assert_eq!(c.complete(r2.seq, Ok(vec![raw_order(2, "new")])), Outcome::Applied);
        assert_eq!(c.complete(r1.seq, Ok(vec![raw_order(1, "old")])), Outcome::Superseded);

        assert_eq!(c.phase(), Phase::Loaded);
        assert_eq!(c.view().rows.len(), 1);
        assert_eq!(c.view().rows[0].item_name, "new");
    }

    #[test]
    fn stale_response_keeps_loading_flag() {
        let mut c = controller();
        let r1 = c.begin_reload();
        let _r2 = c.begin_reload();

        assert_eq!(c.complete(r1.seq, Ok(vec![raw_order(1, "old")])), Outcome::Superseded);
        assert!(c.view().is_loading);
        assert_eq!(c.phase(), Phase::Loading);
        assert!(c.view().rows.is_empty());
    }

    #[test]
    fn stale_failure_is_ignored_too() {
        let mut c = controller();
        let r1 = c.begin_reload();
        let r2 = c.begin_reload();
        c.complete(r2.seq, Ok(vec![raw_order(7, "Pizza")]));
        let outcome = c.complete(r1.seq, Err(FetchError::new(Endpoint::Orders, "timeout")));

        assert_eq!(outcome, Outcome::Superseded);
        assert_eq!(c.phase(), Phase::Loaded);
        assert!(c.last_error().is_none());
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_rows() {
        let mut api = FakeApi {
            orders: vec![(1, raw_order(1, "Burger"))],
            ..Default::default()
        };
        let mut c = controller();
        c.reload(&api).await;
        let before = c.view().rows.clone();

        api.fail_orders = true;
        c.reload(&api).await;

        assert_eq!(c.phase(), Phase::Failed);
        assert!(!c.view().is_loading);
        assert_eq!(c.view().rows, before);
        assert!(c.last_error().unwrap().to_string().contains("connection refused"));
    }

    #[test]
    fn empty_search_means_no_filter() {
        let mut c = controller();
        let with_empty = c.search(Some(""));
        let with_none = c.search(None);
        assert_eq!(with_empty.filter, with_none.filter);
        assert_eq!(c.filter().search_text(), None);
    }

    #[test]
    fn selecting_a_restaurant_clears_search() {
        let mut c = controller();
        c.search(Some("fries"));
        let ticket = c.select_restaurant(2);
        assert_eq!(ticket.filter, Filter::new(2));
        assert_eq!(c.phase(), Phase::Loading);
    }

    #[tokio::test]
    async fn ticket_fetch_uses_its_own_filter() {
        let api = FakeApi::default();
        let mut c = controller();
        let ticket = c.search(Some("taco"));
        c.select_restaurant(3);

        ticket.fetch(&api).await.unwrap();
        assert_eq!(api.calls.lock().unwrap()[0], (1, Some("taco".to_string())));
    }

    #[tokio::test]
    async fn charts_load_and_transform() {
        let charts = load_charts(&FakeApi::default()).await.unwrap();
        assert_eq!(charts.current_year, 2024);
        assert_eq!(charts.revenue_periods[0].points[0].value, 20.1);
        assert_eq!(charts.top_products[0].value, 15);
        assert_eq!(charts.restaurant_series[0].points[0].label, 2024);
    }
}
