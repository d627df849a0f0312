//! Wire types for the provider's JSON responses.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{Hotel, RatingSource};

/// OAuth2 client-credentials token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// One page of the catalog-by-city listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub data: Vec<HotelStub>,
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    /// Total number of results advertised by the server.
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
}

impl CatalogPage {
    /// Server-supplied link to the next page, if any.
    pub fn next_link(&self) -> Option<&str> {
        self.meta
            .as_ref()
            .and_then(|m| m.links.as_ref())
            .and_then(|l| l.next.as_deref())
            .filter(|next| !next.trim().is_empty())
    }

    /// Total result count advertised in metadata, if any.
    pub fn advertised_total(&self) -> Option<usize> {
        self.meta
            .as_ref()
            .and_then(|m| m.count)
            .map(|c| c as usize)
    }
}

/// Catalog entry for one hotel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelStub {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub hotel_id: String,
    #[serde(default)]
    pub chain_code: Option<String>,
    #[serde(default)]
    pub dupe_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub address: Option<StubAddress>,
    #[serde(default)]
    pub geo_code: Option<GeoCode>,
    #[serde(default)]
    pub distance: Option<Value>,
    #[serde(default)]
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StubAddress {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoCode {
    pub latitude: f64,
    pub longitude: f64,
}

impl HotelStub {
    /// Map the stub onto a canonical hotel record.
    ///
    /// Rating fields are left empty so the upsert never clears ratings
    /// gathered by other stages.
    pub fn to_hotel(&self) -> Hotel {
        let name = if self.name.trim().is_empty() {
            self.hotel_id.clone()
        } else {
            self.name.trim().to_string()
        };
        let mut hotel = Hotel::new(&self.hotel_id, RatingSource::Amadeus.as_str(), name);
        hotel.source_hotel_id = Some(self.hotel_id.clone());
        hotel.hotel_type = self.kind.clone();
        hotel.chain_code = self.chain_code.clone();
        hotel.dupe_id = self.dupe_id;
        hotel.iata_code = self.iata_code.clone();
        hotel.last_update = self.last_update.clone();

        if let Some(address) = &self.address {
            hotel.city = address.city_name.clone();
            hotel.country = address.country_code.clone();
            hotel.postal_code = address.postal_code.clone();
            if !address.lines.is_empty() {
                hotel.street_address = Some(address.lines.join(", "));
            }
        }
        if let Some(geo) = self.geo_code {
            hotel.latitude = Some(geo.latitude);
            hotel.longitude = Some(geo.longitude);
        }
        hotel
    }
}

/// Envelope shared by the detail endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Search detail for one hotel: amenities, offers, contact, policies.
///
/// Nested structures are kept as raw JSON and stored as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearchData {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub hotel_id: String,
    #[serde(default)]
    pub chain_code: Option<String>,
    #[serde(default)]
    pub dupe_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub official_rating: Option<i32>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub media: Option<Value>,
    #[serde(default)]
    pub amenities: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
    #[serde(default)]
    pub contact: Option<Value>,
    #[serde(default)]
    pub policies: Option<Value>,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub offers: Option<Value>,
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub hotel_distance: Option<Value>,
    #[serde(default)]
    pub last_update: Option<String>,
}

/// Sentiment ratings for one hotel (scores are 0-100).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRatingsData {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub hotel_id: String,
    #[serde(default)]
    pub number_of_reviews: Option<i32>,
    #[serde(default)]
    pub number_of_ratings: Option<i32>,
    #[serde(default)]
    pub overall_rating: Option<i32>,
    /// Per-aspect scores such as `sleepQuality`, `service`, `location`.
    #[serde(default)]
    pub sentiments: Option<Value>,
    #[serde(default)]
    pub last_update: Option<String>,
}

/// Accept integers encoded either as JSON numbers or numeric strings.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().map(|v| v as i32),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_page_signals() {
        let page: CatalogPage = serde_json::from_str(
            r#"{
                "data": [{"hotelId": "ALAUS001", "name": "Driskill"}],
                "meta": {"count": 12, "links": {"self": "a", "next": "https://x/next"}}
            }"#,
        )
        .unwrap();
        assert_eq!(page.next_link(), Some("https://x/next"));
        assert_eq!(page.advertised_total(), Some(12));

        let bare: CatalogPage = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(bare.next_link().is_none());
        assert!(bare.advertised_total().is_none());

        let blank: CatalogPage =
            serde_json::from_str(r#"{"data": [], "meta": {"links": {"next": ""}}}"#).unwrap();
        assert!(blank.next_link().is_none());
    }

    #[test]
    fn test_stub_to_hotel() {
        let stub: HotelStub = serde_json::from_str(
            r#"{
                "type": "location",
                "hotelId": "HIAUS123",
                "chainCode": "HI",
                "dupeId": 700012345,
                "name": "  Holiday Inn Downtown ",
                "iataCode": "AUS",
                "address": {"countryCode": "US", "cityName": "AUSTIN", "lines": ["1 Main St", "Suite 2"]},
                "geoCode": {"latitude": 30.26, "longitude": -97.74},
                "distance": {"value": 1.2, "unit": "MILE"},
                "lastUpdate": "2024-01-01T00:00:00"
            }"#,
        )
        .unwrap();
        let hotel = stub.to_hotel();

        assert_eq!(hotel.hotel_id, "HIAUS123");
        assert_eq!(hotel.source, "amadeus");
        assert_eq!(hotel.name, "Holiday Inn Downtown");
        assert_eq!(hotel.city.as_deref(), Some("AUSTIN"));
        assert_eq!(hotel.country.as_deref(), Some("US"));
        assert_eq!(hotel.street_address.as_deref(), Some("1 Main St, Suite 2"));
        assert_eq!(hotel.latitude, Some(30.26));
        assert_eq!(hotel.dupe_id, Some(700012345));
        assert!(hotel.amadeus_rating.is_none());
    }

    #[test]
    fn test_search_rating_accepts_strings() {
        let data: HotelSearchData = serde_json::from_str(
            r#"{"hotelId": "H1", "rating": "4", "officialRating": 5, "available": true}"#,
        )
        .unwrap();
        assert_eq!(data.rating, Some(4));
        assert_eq!(data.official_rating, Some(5));
        assert!(data.available);
    }
}
