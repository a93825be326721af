//! Catalog and points clients for the Ecoleta collection point API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use ecoleta_core::{
    model::{Category, CategoryId, Point, PointId},
    ports::{CatalogPort, PointsPort, PointsQuery, PortError},
};

/// Base URL of a locally running API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";

/// Query key repeated once per selected category.
const ITEMS_KEY: &str = "items[]";

/// Single entry from /items
#[derive(Debug, Deserialize)]
struct ItemEntry {
    id: u32,
    title: String,
    image_url: String,
}

/// Single entry from /points
#[derive(Debug, Deserialize)]
struct PointEntry {
    id: u32,
    #[serde(alias = "image_url")]
    image: String,
    name: String,
    city: String,
    uf: String,
    latitude: Degrees,
    longitude: Degrees,
}

/// Coordinates come back as numbers or as decimal strings depending on the database.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Degrees {
    Number(f64),
    Text(String),
}

impl Degrees {
    fn value(self) -> Result<f64, PortError> {
        match self {
            Degrees::Number(value) => Ok(value),
            Degrees::Text(text) => match text.trim().parse() {
                Ok(value) => Ok(value),
                Err(_err) => Err(PortError::InvalidCoordinate(text)),
            },
        }
    }
}

impl From<ItemEntry> for Category {
    fn from(entry: ItemEntry) -> Self {
        Category {
            id: CategoryId(entry.id),
            title: entry.title,
            icon_uri: entry.image_url,
        }
    }
}

impl TryFrom<PointEntry> for Point {
    type Error = PortError;

    fn try_from(entry: PointEntry) -> Result<Self, Self::Error> {
        Ok(Point {
            id: PointId(entry.id),
            image_uri: entry.image,
            name: entry.name,
            city: entry.city,
            state: entry.uf,
            latitude: entry.latitude.value()?,
            longitude: entry.longitude.value()?,
        })
    }
}

/// Category catalog backed by `GET /items`.
pub struct ApiCatalogPort {
    client: Client,
    base_url: String,
}

impl ApiCatalogPort {
    /// Create a catalog client for the API at `base_url`.
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize(base_url),
        }
    }
}

#[async_trait]
impl CatalogPort for ApiCatalogPort {
    #[tracing::instrument(level = "debug", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_categories(&self) -> Result<Vec<Category>, PortError> {
        let req = self.client.get(format!("{}/items", self.base_url));
        let entries = fetch_json::<Vec<ItemEntry>>(req).await?;
        debug!(count = entries.len(), "items received");

        Ok(entries.into_iter().map(Category::from).collect())
    }
}

/// Collection point search backed by `GET /points`.
pub struct ApiPointsPort {
    client: Client,
    base_url: String,
}

impl ApiPointsPort {
    /// Create a points client for the API at `base_url`.
    #[must_use]
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: normalize(base_url),
        }
    }

    /// Build the request for `query`.
    ///
    /// Every selected id becomes its own `items[]` pair. An empty selection is
    /// sent as a single empty `items[]` pair, which the API reads as "no
    /// category filter"; the key is never left out.
    #[must_use]
    pub fn request(&self, query: &PointsQuery) -> RequestBuilder {
        let mut pairs = vec![("city", query.city.clone()), ("uf", query.state.clone())];

        if query.matches_all_categories() {
            pairs.push((ITEMS_KEY, String::new()));
        } else {
            pairs.extend(query.items.iter().map(|id| (ITEMS_KEY, id.to_string())));
        }

        self.client
            .get(format!("{}/points", self.base_url))
            .query(&pairs)
    }
}

#[async_trait]
impl PointsPort for ApiPointsPort {
    #[tracing::instrument(level = "debug", skip(self), fields(base_url = %self.base_url))]
    async fn fetch_points(&self, query: &PointsQuery) -> Result<Vec<Point>, PortError> {
        let entries = fetch_json::<Vec<PointEntry>>(self.request(query)).await?;
        debug!(count = entries.len(), "points received");

        entries.into_iter().map(Point::try_from).collect()
    }
}

/// Both API clients sharing one HTTP client.
pub struct ApiPorts {
    /// Category catalog.
    pub catalog: Arc<dyn CatalogPort>,
    /// Collection point search.
    pub points: Arc<dyn PointsPort>,
}

/// Build the catalog and points clients for the API at `base_url`.
#[must_use]
pub fn ports(client: Client, base_url: &str) -> ApiPorts {
    ApiPorts {
        catalog: Arc::new(ApiCatalogPort::new(client.clone(), base_url)),
        points: Arc::new(ApiPointsPort::new(client, base_url)),
    }
}

fn normalize(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_owned()
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let response = req.send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(PortError::Status(status.as_u16()));
    }

    response.json().await.map_err(PortError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(items: &[u32]) -> PointsQuery {
        PointsQuery {
            state: "SP".into(),
            city: "São Paulo".into(),
            items: items.iter().copied().map(CategoryId).collect(),
        }
    }

    fn pairs(port: &ApiPointsPort, query: &PointsQuery) -> Vec<(String, String)> {
        let request = port.request(query).build().unwrap();
        request
            .url()
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    #[test]
    fn points_request_repeats_items_per_id() {
        let port = ApiPointsPort::new(Client::new(), "http://api.test/");
        let request = port.request(&query(&[1, 4])).build().unwrap();
        assert_eq!(request.url().path(), "/points");

        assert_eq!(
            pairs(&port, &query(&[1, 4])),
            vec![
                ("city".to_owned(), "São Paulo".to_owned()),
                ("uf".to_owned(), "SP".to_owned()),
                ("items[]".to_owned(), "1".to_owned()),
                ("items[]".to_owned(), "4".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_selection_sends_empty_items_pair() {
        let port = ApiPointsPort::new(Client::new(), "http://api.test");
        let pairs = pairs(&port, &query(&[]));

        let items: Vec<_> = pairs.iter().filter(|(key, _)| key == "items[]").collect();
        assert_eq!(items.len(), 1, "items key must be present for an empty selection");
        assert_eq!(items[0].1, "");
    }

    #[test]
    fn item_entries_map_to_categories_in_order() {
        let body = r#"[
            {"id": 1, "title": "Lâmpadas", "image_url": "http://api.test/uploads/lampadas.svg"},
            {"id": 2, "title": "Pilhas e Baterias", "image_url": "http://api.test/uploads/baterias.svg"}
        ]"#;
        let entries: Vec<ItemEntry> = serde_json::from_str(body).unwrap();
        let categories: Vec<Category> = entries.into_iter().map(Category::from).collect();

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].id, CategoryId(1));
        assert_eq!(categories[1].title, "Pilhas e Baterias");
        assert_eq!(categories[1].icon_uri, "http://api.test/uploads/baterias.svg");
    }

    #[test]
    fn point_entries_accept_numeric_and_string_coordinates() {
        let body = r#"[
            {"id": 7, "image": "a.jpg", "name": "Mercado", "city": "São Paulo", "uf": "SP",
             "latitude": -23.55, "longitude": -46.63},
            {"id": 8, "image": "b.jpg", "name": "Oficina", "city": "São Paulo", "uf": "SP",
             "latitude": "-23.56", "longitude": " -46.64 "}
        ]"#;
        let entries: Vec<PointEntry> = serde_json::from_str(body).unwrap();
        let points: Vec<Point> = entries
            .into_iter()
            .map(Point::try_from)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(points[0].id, PointId(7));
        assert_eq!(points[0].state, "SP");
        assert!((points[1].latitude - -23.56).abs() < f64::EPSILON);
        assert!((points[1].longitude - -46.64).abs() < f64::EPSILON);
    }

    #[test]
    fn unreadable_coordinate_is_rejected() {
        let body = r#"{"id": 9, "image": "c.jpg", "name": "X", "city": "Y", "uf": "RJ",
                        "latitude": "north", "longitude": 0}"#;
        let entry: PointEntry = serde_json::from_str(body).unwrap();

        match Point::try_from(entry) {
            Err(PortError::InvalidCoordinate(raw)) => assert_eq!(raw, "north"),
            other => panic!("Expected InvalidCoordinate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_service_reports_network_error() {
        let ApiPorts { catalog, .. } = ports(Client::new(), "http://127.0.0.1:1");

        match catalog.fetch_categories().await {
            Err(PortError::Network(_)) => {}
            other => panic!("Expected Network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_its_code() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).unwrap();
            stream
                .write_all(
                    b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .unwrap();
        });

        let ApiPorts { points, .. } = ports(Client::new(), &format!("http://{address}"));
        match points.fetch_points(&query(&[1])).await {
            Err(PortError::Status(code)) => assert_eq!(code, 503),
            other => panic!("Expected Status error, got {other:?}"),
        }
        server.join().unwrap();
    }
}
