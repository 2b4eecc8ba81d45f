use crate::error::{CollectorError, Result};
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

const CONSUMPTION_QUERY: &str = r#"
query Consumption($homeId: ID!, $first: Int, $last: Int, $after: String) {
  viewer {
    home(id: $homeId) {
      consumption(resolution: HOURLY, first: $first, last: $last, after: $after) {
        pageInfo {
          hasNextPage
          endCursor
        }
        edges {
          node {
            from
            to
            consumption
            consumptionUnit
            cost
            unitPrice
            unitPriceVAT
            currency
          }
        }
      }
    }
  }
}
"#;

const HOMES_QUERY: &str = r#"
{
  viewer {
    homes {
      id
      appNickname
    }
  }
}
"#;

const MAX_ATTEMPTS: u32 = 3;
const PAGE_DELAY: Duration = Duration::from_millis(300);

/// One hourly consumption entry as returned by the Tibber GraphQL API.
/// Timestamps keep the offset Tibber reports (local time of the home).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionRecord {
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
    pub consumption: Option<f64>,
    pub consumption_unit: Option<String>,
    pub cost: Option<f64>,
    pub unit_price: Option<f64>,
    #[serde(rename = "unitPriceVAT")]
    pub unit_price_vat: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ConsumptionData {
    viewer: ConsumptionViewer,
}

#[derive(Debug, Deserialize)]
struct ConsumptionViewer {
    home: Option<ConsumptionHome>,
}

#[derive(Debug, Deserialize)]
struct ConsumptionHome {
    consumption: Option<ConsumptionConnection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConsumptionConnection {
    page_info: PageInfo,
    edges: Vec<ConsumptionEdge>,
}

#[derive(Debug, Deserialize)]
struct ConsumptionEdge {
    node: ConsumptionRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HomesData {
    viewer: HomesViewer,
}

#[derive(Debug, Deserialize)]
struct HomesViewer {
    homes: Vec<HomeRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HomeRef {
    id: String,
    app_nickname: Option<String>,
}

pub struct TibberClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl TibberClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.to_string(),
            token: token.to_string(),
        })
    }

    /// Picks the first home on the account when TIBBER_HOME_ID is not configured.
    pub async fn discover_home_id(&self) -> Result<String> {
        let data: HomesData = self.post_graphql(&json!({ "query": HOMES_QUERY })).await?;

        let home = data.viewer.homes.into_iter().next().ok_or_else(|| {
            CollectorError::Api("no homes found on this Tibber account".to_string())
        })?;

        info!(home_id = %home.id, nickname = ?home.app_nickname, "Using home");
        Ok(home.id)
    }

    /// Fetches hourly consumption for the given window, newest data first.
    ///
    /// The first page requests the `last` N records; later pages walk the
    /// cursor with `first`/`after`. Pagination stops once a page reaches back
    /// past `since`, and the final set is filtered to `[since, until]`.
    pub async fn fetch_consumption(
        &self,
        home_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        page_size: i64,
    ) -> Result<Vec<ConsumptionRecord>> {
        let mut records: Vec<ConsumptionRecord> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 0u32;

        loop {
            page += 1;
            let variables = match &cursor {
                None => json!({ "homeId": home_id, "last": page_size }),
                Some(after) => json!({ "homeId": home_id, "first": page_size, "after": after }),
            };

            let data: ConsumptionData = self
                .post_graphql(&json!({ "query": CONSUMPTION_QUERY, "variables": variables }))
                .await?;

            let connection = data
                .viewer
                .home
                .and_then(|h| h.consumption)
                .ok_or_else(|| {
                    CollectorError::Api(format!("no consumption data for home {}", home_id))
                })?;

            let page_records: Vec<ConsumptionRecord> =
                connection.edges.into_iter().map(|e| e.node).collect();
            debug!(page, count = page_records.len(), "Fetched consumption page");

            if page_records.is_empty() {
                break;
            }

            let reached_since = page_records
                .iter()
                .map(|r| r.from.with_timezone(&Utc))
                .min()
                .map(|oldest| oldest < since)
                .unwrap_or(false);

            records.extend(page_records);

            if reached_since {
                debug!("Reached start of requested window");
                break;
            }
            if !connection.page_info.has_next_page {
                break;
            }
            cursor = connection.page_info.end_cursor;

            tokio::time::sleep(PAGE_DELAY).await;
        }

        records.retain(|r| {
            let from = r.from.with_timezone(&Utc);
            from >= since && from <= until
        });
        records.sort_by_key(|r| r.from.with_timezone(&Utc));

        info!(count = records.len(), "Collected consumption records");
        Ok(records)
    }

    async fn post_graphql<T: DeserializeOwned>(&self, payload: &serde_json::Value) -> Result<T> {
        let mut last_err: Option<CollectorError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_secs(1 << attempt)).await;
            }

            let response = match self
                .http
                .post(&self.api_url)
                .bearer_auth(&self.token)
                .json(payload)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(attempt, error = %e, "Tibber request failed");
                    last_err = Some(e.into());
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(attempt, %status, "Tibber request rejected, backing off");
                last_err = Some(CollectorError::Api(format!("upstream returned {}", status)));
                continue;
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let detail: String = body.chars().take(200).collect();
                return Err(CollectorError::Api(format!(
                    "request failed with {}: {}",
                    status, detail
                )));
            }

            let parsed: GraphQlResponse<T> = response.json().await?;
            if let Some(errors) = &parsed.errors {
                let messages = errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                if parsed.data.is_none() {
                    return Err(CollectorError::Api(messages));
                }
                warn!("GraphQL errors alongside data: {}", messages);
            }

            return parsed
                .data
                .ok_or_else(|| CollectorError::Api("response contained no data".to_string()));
        }

        Err(last_err
            .unwrap_or_else(|| CollectorError::Api("request failed after retries".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_consumption_node_with_vat_casing() {
        let node: ConsumptionRecord = serde_json::from_value(json!({
            "from": "2024-10-15T00:00:00.000+02:00",
            "to": "2024-10-15T01:00:00.000+02:00",
            "consumption": 1.25,
            "consumptionUnit": "kWh",
            "cost": 0.625,
            "unitPrice": 0.5,
            "unitPriceVAT": 0.125,
            "currency": "SEK"
        }))
        .unwrap();

        assert_eq!(node.consumption, Some(1.25));
        assert_eq!(node.consumption_unit.as_deref(), Some("kWh"));
        assert_eq!(node.unit_price_vat, Some(0.125));
        assert_eq!(node.from.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn parses_node_with_null_consumption() {
        let node: ConsumptionRecord = serde_json::from_value(json!({
            "from": "2024-10-15T02:00:00.000+02:00",
            "to": "2024-10-15T03:00:00.000+02:00",
            "consumption": null,
            "consumptionUnit": null,
            "cost": null,
            "unitPrice": 0.5,
            "unitPriceVAT": 0.125,
            "currency": "SEK"
        }))
        .unwrap();

        assert_eq!(node.consumption, None);
        assert_eq!(node.cost, None);
        assert_eq!(node.unit_price, Some(0.5));
    }

    #[test]
    fn parses_homes_response() {
        let parsed: GraphQlResponse<HomesData> = serde_json::from_value(json!({
            "data": {
                "viewer": {
                    "homes": [
                        { "id": "home-1", "appNickname": "Apartment" },
                        { "id": "home-2", "appNickname": null }
                    ]
                }
            }
        }))
        .unwrap();

        let homes = parsed.data.unwrap().viewer.homes;
        assert_eq!(homes.len(), 2);
        assert_eq!(homes[0].id, "home-1");
        assert_eq!(homes[0].app_nickname.as_deref(), Some("Apartment"));
        assert_eq!(homes[1].app_nickname, None);
    }

    #[test]
    fn parses_graphql_errors() {
        let parsed: GraphQlResponse<HomesData> = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "invalid token" }]
        }))
        .unwrap();

        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors.unwrap()[0].message, "invalid token");
    }
}
