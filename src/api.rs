use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::error::FetchError;

/// The fixed set of remote resources the dashboard reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    RevenuePeriod,
    CurrentYear,
    TopProduct,
    RestaurantRevenue,
    Orders,
    OrdersExport,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::RevenuePeriod => "/dashboards/revenue-period",
            Endpoint::CurrentYear => "/dashboards/current-year",
            Endpoint::TopProduct => "/dashboards/top-product",
            Endpoint::RestaurantRevenue => "/dashboards/restaurant-revenue",
            Endpoint::Orders => "/orders",
            Endpoint::OrdersExport => "/orders/export",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Optional query parameters accepted by the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub restaurant_id: Option<i64>,
    pub search_text: Option<String>,
}

impl Query {
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = self.restaurant_id {
            pairs.push(("type", id.to_string()));
        }
        if let Some(text) = &self.search_text {
            pairs.push(("searchText", text.clone()));
        }
        pairs
    }
}

/// A JSON object decoded with its keys kept in response order, so chart
/// groups appear in the order the server lists them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantShare {
    pub restaurant_name: String,
    pub percentage: f64,
}

/// period -> share of each restaurant
pub type RevenuePeriodResponse = OrderedMap<Vec<RestaurantShare>>;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRevenue {
    pub product_name: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProductResponse {
    pub product_revenues: Vec<ProductRevenue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YearRevenue {
    pub year: i32,
    pub revenue: f64,
}

/// restaurant type -> revenue per year
pub type RestaurantRevenueResponse = OrderedMap<Vec<YearRevenue>>;

/// An order as the API returns it, before the date is formatted for display.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrder {
    pub order_number: i64,
    #[serde(deserialize_with = "deserialize_order_date")]
    pub order_date: DateTime<FixedOffset>,
    pub item_name: String,
    pub quantity: i64,
    pub product_price: Decimal,
    pub total_products: Decimal,
}

/// Parses an order timestamp. Zone-less values are read as UTC.
pub fn parse_order_date(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).or_else(|rfc_err| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc().fixed_offset())
            .map_err(|_| rfc_err)
    })
}

fn deserialize_order_date<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_order_date(&raw).map_err(|e| de::Error::custom(format!("invalid orderDate '{}': {}", raw, e)))
}

/// Typed access to the dashboard API.
///
/// Each call is exactly one round trip: no retry, no caching.
#[allow(async_fn_in_trait)]
pub trait DashboardApi {
    async fn revenue_period(&self) -> Result<RevenuePeriodResponse, FetchError>;
    async fn current_year(&self) -> Result<i32, FetchError>;
    async fn top_products(&self) -> Result<TopProductResponse, FetchError>;
    async fn restaurant_revenue(&self) -> Result<RestaurantRevenueResponse, FetchError>;
    async fn orders(&self, restaurant_id: i64, search_text: Option<&str>) -> Result<Vec<RawOrder>, FetchError>;
    async fn export_orders(&self) -> Result<Vec<u8>, FetchError>;
}

/// HTTP implementation of [`DashboardApi`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(concat!("revdash/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, endpoint: Endpoint, query: Option<&Query>) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let mut request = self.client.get(&url);
        if let Some(query) = query {
            let pairs = query.pairs();
            if !pairs.is_empty() {
                request = request.query(&pairs);
            }
        }

        tracing::debug!(%endpoint, ?query, "issuing request");
        let response = request.send().await.map_err(|e| FetchError::new(endpoint, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::new(endpoint, format!("HTTP {}: {}", status, body.trim())));
        }

        Ok(response)
    }

    /// Fetches an endpoint and returns its body as untyped JSON, object keys
    /// in response order.
    pub async fn fetch_json(&self, endpoint: Endpoint, query: Option<&Query>) -> Result<serde_json::Value, FetchError> {
        self.fetch(endpoint, query).await
    }

    pub async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint, query: Option<&Query>) -> Result<T, FetchError> {
        let body = self
            .send(endpoint, query)
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::new(endpoint, e))?;
        serde_json::from_slice(&body).map_err(|e| FetchError::new(endpoint, format!("malformed body: {}", e)))
    }

    pub async fn fetch_binary(&self, endpoint: Endpoint) -> Result<Vec<u8>, FetchError> {
        let body = self
            .send(endpoint, None)
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::new(endpoint, e))?;
        Ok(body.to_vec())
    }
}

impl DashboardApi for HttpGateway {
    async fn revenue_period(&self) -> Result<RevenuePeriodResponse, FetchError> {
        self.fetch(Endpoint::RevenuePeriod, None).await
    }

    async fn current_year(&self) -> Result<i32, FetchError> {
        self.fetch(Endpoint::CurrentYear, None).await
    }

    async fn top_products(&self) -> Result<TopProductResponse, FetchError> {
        self.fetch(Endpoint::TopProduct, None).await
    }

    async fn restaurant_revenue(&self) -> Result<RestaurantRevenueResponse, FetchError> {
        self.fetch(Endpoint::RestaurantRevenue, None).await
    }

    async fn orders(&self, restaurant_id: i64, search_text: Option<&str>) -> Result<Vec<RawOrder>, FetchError> {
        let query = Query {
            restaurant_id: Some(restaurant_id),
            search_text: search_text.map(str::to_string),
        };
        self.fetch(Endpoint::Orders, Some(&query)).await
    }

    async fn export_orders(&self) -> Result<Vec<u8>, FetchError> {
        self.fetch_binary(Endpoint::OrdersExport).await
    }
}
