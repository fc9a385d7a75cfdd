//! HTTP fetcher for procyclingstats.com.
//!
//! Pages are fetched one at a time and reduced to raw records with the
//! helpers in [`super::html`]. Extraction is best effort: optional fields
//! that cannot be found come back as `None`, never as an error.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::html;
use super::types::{RankingRow, RawNation, RawRider, RawTeam, SeasonPoints, SeasonTeam};
use super::{FetchError, Fetcher, RankingQuery};
use crate::utils::{parse_birthdate, parse_count, parse_decimal};

// ============================================================================
// Constants
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "https://www.procyclingstats.com/";

/// HTTP request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting
const INITIAL_BACKOFF_MS: u64 = 1000;

const USER_AGENT: &str = concat!("tourdedata/", env!("CARGO_PKG_VERSION"));

/// Fetcher backed by procyclingstats.com.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PcsClient {
    client: Client,
    base_url: String,
}

impl PcsClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
        url: &str,
    ) -> Result<Option<reqwest::Response>, FetchError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::from_status(status, url, &body))
        }
    }

    /// GET a page as text, backing off on HTTP 429
    async fn get_page(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url(path);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            debug!(url = %url, "GET");
            let response = self.client.get(&url).send().await?;

            match Self::check_response_for_retry(response, &url).await? {
                Some(response) => {
                    let body = response.text().await?;
                    if is_not_found_page(&body) {
                        return Err(FetchError::NotFound(url));
                    }
                    return Ok(body);
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(FetchError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    /// A count from a nation subpage. A missing page or an empty table
    /// counts as 0; any other failure is returned.
    async fn nation_page_count(&self, path: String, extract: fn(&str) -> Option<u32>) -> Result<u32, FetchError> {
        match self.get_page(&path).await {
            Ok(page) => Ok(extract(&page).unwrap_or(0)),
            Err(e) if e.is_not_found() => {
                debug!(path = %path, "Nation count page missing, using 0");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }
}

/// The site answers unknown entities with a 200 and an error page
fn is_not_found_page(body: &str) -> bool {
    html::first_text(body, "title")
        .map(|t| t.to_lowercase().contains("page not found"))
        .unwrap_or(false)
}

/// Slug of a nation url: `nation/belgium` -> `belgium`
pub fn nation_slug(nation_url: &str) -> &str {
    nation_url
        .trim_matches('/')
        .split('/')
        .nth(1)
        .unwrap_or(nation_url)
}

/// Team links of WorldTour rows (third column is the class)
fn parse_nation_teams(page: &str) -> Vec<String> {
    let Some(table) = html::tables(page).into_iter().next() else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .filter(|cells| cells.get(2).map(|c| c.text == "WT").unwrap_or(false))
        .filter_map(|cells| cells.get(1).and_then(|c| c.href.clone()))
        .collect()
}

/// Rider links from the second column of the contract riders table
fn parse_nation_riders(page: &str) -> Vec<String> {
    let Some(table) = html::tables(page).into_iter().next() else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .filter_map(|cells| cells.get(1).and_then(|c| c.href.clone()))
        .collect()
}

fn parse_first_cell_count(page: &str) -> Option<u32> {
    let table = html::tables(page).into_iter().next()?;
    let first = table.rows.first()?.first()?;
    first.text.parse().ok()
}

fn parse_points_sum(page: &str) -> Option<u32> {
    html::rows_with_class(page, "sum")
        .first()
        .and_then(|cells| cells.get(4))
        .and_then(|c| parse_count(&c.text))
}

fn parse_team(page: &str) -> RawTeam {
    let fields = html::info_fields(page);
    let field = |keys: &[&str]| keys.iter().find_map(|k| fields.get(*k)).cloned();
    let count = |keys: &[&str]| field(keys).and_then(|v| parse_count::<u32>(&v));

    RawTeam {
        name: html::first_text(page, "h1").unwrap_or_default(),
        abbreviation: field(&["abbreviation"]),
        nationality: field(&["country", "nationality"]),
        status: field(&["status", "class"]),
        bike: field(&["bike", "bike_brand"]),
        wins: count(&["wins", "season_wins"]),
        pcs_points: count(&["pcs_points", "points"]),
        pcs_rank: count(&["pcs_ranking", "pcs_rank"]),
        uci_rank: count(&["uci_ranking", "uci_rank", "uci_world_ranking"]),
        rider_urls: html::links(page, "rider/"),
    }
}

fn parse_rider(page: &str) -> RawRider {
    let fields = html::info_fields(page);
    let field = |keys: &[&str]| keys.iter().find_map(|k| fields.get(*k)).cloned();

    let birthdate = field(&["date_of_birth", "born", "birthdate"])
        .and_then(|v| parse_birthdate(&v))
        .map(|d| d.format("%Y-%m-%d").to_string());

    let teams_history = html::list_items(page)
        .into_iter()
        .filter_map(|item| {
            let href = item.href?.trim_start_matches('/').to_string();
            if !href.starts_with("team/") {
                return None;
            }
            let season = item.text.split_whitespace().next()?;
            if season.len() != 4 {
                return None;
            }
            Some(SeasonTeam {
                season: season.parse().ok()?,
                team_url: href,
            })
        })
        .collect();

    let points_history = html::tables(page)
        .into_iter()
        .map(html::Table::into_rows)
        .find(|rows| {
            rows.first()
                .map(|r| r.has_column("points") && (r.has_column("season") || r.has_column("year")))
                .unwrap_or(false)
        })
        .unwrap_or_default()
        .iter()
        .filter_map(|row| {
            Some(SeasonPoints {
                season: row.count(&["season", "year"])?,
                points: row.decimal(&["points"]).unwrap_or(0.0),
                rank: row.count(&["rank", "pos"]),
            })
        })
        .collect();

    RawRider {
        name: html::first_text(page, "h1").unwrap_or_default(),
        nationality: field(&["nationality"]),
        birthdate,
        place_of_birth: field(&["place_of_birth"]),
        weight: field(&["weight"]).and_then(|v| parse_decimal(&v)),
        height: field(&["height"]).and_then(|v| parse_decimal(&v)),
        image_url: html::image_src(page, "images/riders"),
        teams_history,
        points_history,
    }
}

impl Fetcher for PcsClient {
    async fn fetch_ranking(&self, query: &RankingQuery) -> Result<Vec<RankingRow>, FetchError> {
        let page = self.get_page(&query.path()).await?;
        Ok(html::first_table_rows(&page))
    }

    async fn fetch_nation(&self, year: i32, nation_url: &str) -> Result<RawNation, FetchError> {
        let name = nation_slug(nation_url).to_string();

        let teams_page = self
            .get_page(&format!(
                "nation.php?season={}&filter=Filter&id={}&c=me&p=overview&s=teams",
                year, name
            ))
            .await?;
        let riders_page = self
            .get_page(&format!(
                "nation.php?season={}&level=wt&filter=Filter&id={}&c=me&p=overview&s=contract-riders",
                year, name
            ))
            .await?;

        let wins = self
            .nation_page_count(
                format!(
                    "nation.php?season={}&level=1&plevel=smallerorequal&prowin=0&pprowin=largerorequal&filter=Filter&id={}&c=me&p=overview&s=nation-wins",
                    year, name
                ),
                parse_first_cell_count,
            )
            .await?;
        let pcs_points = self
            .nation_page_count(
                format!(
                    "nation.php?date={}-12-31&filter=Filter&id={}&c=me&p=overview&s=pcs-ranking",
                    year, name
                ),
                parse_points_sum,
            )
            .await?;

        Ok(RawNation {
            team_urls: parse_nation_teams(&teams_page),
            rider_urls: parse_nation_riders(&riders_page),
            name,
            wins,
            pcs_points,
        })
    }

    async fn fetch_teams(&self, year: i32) -> Result<Vec<String>, FetchError> {
        let page = self
            .get_page(&format!("teams.php?year={}&filter=Filter&s=worldtour", year))
            .await?;
        Ok(html::links(&page, "team/"))
    }

    async fn fetch_team(&self, team_url: &str) -> Result<RawTeam, FetchError> {
        let page = self.get_page(team_url.trim()).await?;
        Ok(parse_team(&page))
    }

    async fn fetch_rider(&self, rider_url: &str) -> Result<RawRider, FetchError> {
        let page = self.get_page(rider_url.trim()).await?;
        let rider = parse_rider(&page);
        if rider.name.is_empty() {
            return Err(FetchError::parse(rider_url, "no rider name on page"));
        }
        Ok(rider)
    }

    async fn fetch_race_stats(&self, race_id: &str) -> Result<Vec<RankingRow>, FetchError> {
        let page = self
            .get_page(&format!("race/{}/results/fastest-editions", race_id))
            .await?;
        Ok(html::first_table_rows(&page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = PcsClient::with_base_url("https://example.org", Duration::from_secs(1))
            .expect("client");
        assert_eq!(client.url("/rider/tadej-pogacar"), "https://example.org/rider/tadej-pogacar");
        assert_eq!(client.url("team/x"), "https://example.org/team/x");
    }

    #[test]
    fn test_nation_slug() {
        assert_eq!(nation_slug("nation/belgium"), "belgium");
        assert_eq!(nation_slug("/nation/great-britain/"), "great-britain");
        assert_eq!(nation_slug("belgium"), "belgium");
    }

    #[test]
    fn test_not_found_page() {
        assert!(is_not_found_page("<html><title>Page not found | PCS</title></html>"));
        assert!(!is_not_found_page("<html><title>Tadej Pogačar</title></html>"));
    }

    #[test]
    fn test_parse_nation_tables() {
        let teams = r#"<table><tr><th>#</th><th>Team</th><th>Class</th></tr>
            <tr><td>1</td><td><a href="team/soudal-quick-step-2024">Soudal</a></td><td>WT</td></tr>
            <tr><td>2</td><td><a href="team/lotto-dstny-2024">Lotto</a></td><td>PRT</td></tr></table>"#;
        assert_eq!(parse_nation_teams(teams), vec!["team/soudal-quick-step-2024"]);

        let riders = r#"<table><tr><td>1</td><td><a href="rider/remco-evenepoel">EVENEPOEL Remco</a></td></tr></table>"#;
        assert_eq!(parse_nation_riders(riders), vec!["rider/remco-evenepoel"]);

        assert_eq!(parse_first_cell_count("<table><tr><td>17</td></tr></table>"), Some(17));
        assert_eq!(parse_first_cell_count("<p>none</p>"), None);

        let points = r#"<table><tbody><tr class="sum"><td></td><td></td><td></td><td></td><td>12,450</td></tr></tbody></table>"#;
        assert_eq!(parse_points_sum(points), Some(12450));
    }

    #[test]
    fn test_parse_rider_page() {
        let page = r#"<html><title>Tadej Pogačar</title><h1>Tadej  Pogačar</h1>
            <img src="images/riders/bp/tadej.jpg">
            <ul class="info">
              <li><b>Date of birth:</b> 21st September 1998 (26)</li>
              <li><b>Nationality:</b> <a href="nation/slovenia">Slovenia</a></li>
              <li><b>Weight:</b> 66 kg</li>
              <li><b>Place of birth:</b> Komenda</li>
            </ul>
            <ul class="teams">
              <li>2024 <a href="team/uae-team-emirates-2024">UAE Team Emirates</a></li>
              <li>2019 <a href="/team/uae-team-emirates-2019">UAE Team Emirates</a></li>
            </ul>
            <table><tr><th>Season</th><th>Points</th><th>Rank</th></tr>
              <tr><td>2024</td><td>5,120</td><td>1</td></tr>
              <tr><td>2023</td><td>3,990</td><td>2</td></tr></table></html>"#;

        let rider = parse_rider(page);
        assert_eq!(rider.name, "Tadej Pogačar");
        assert_eq!(rider.birthdate.as_deref(), Some("1998-09-21"));
        assert_eq!(rider.nationality.as_deref(), Some("Slovenia"));
        assert_eq!(rider.weight, Some(66.0));
        assert_eq!(rider.height, None);
        assert_eq!(rider.place_of_birth.as_deref(), Some("Komenda"));
        assert_eq!(rider.image_url.as_deref(), Some("images/riders/bp/tadej.jpg"));
        assert_eq!(rider.teams_history.len(), 2);
        assert_eq!(rider.teams_history[1].team_url, "team/uae-team-emirates-2019");
        assert_eq!(rider.points_history.len(), 2);
        assert_eq!(rider.points_history[0].points, 5120.0);
        assert_eq!(rider.points_history[1].rank, Some(2));
    }

    #[test]
    fn test_parse_team_page() {
        let page = r#"<h1>UAE Team Emirates</h1><ul>
            <li>Abbreviation: UAD</li><li>Status: WT</li><li>Bike: Colnago</li>
            <li>Country: United Arab Emirates</li></ul>
            <a href="rider/tadej-pogacar">POGAČAR Tadej</a><a href="rider/adam-yates">YATES Adam</a>"#;
        let team = parse_team(page);
        assert_eq!(team.name, "UAE Team Emirates");
        assert_eq!(team.abbreviation.as_deref(), Some("UAD"));
        assert_eq!(team.status.as_deref(), Some("WT"));
        assert_eq!(team.bike.as_deref(), Some("Colnago"));
        assert_eq!(team.nationality.as_deref(), Some("United Arab Emirates"));
        assert_eq!(team.wins, None);
        assert_eq!(team.rider_urls, vec!["rider/tadej-pogacar", "rider/adam-yates"]);
    }

    mod http {
        use std::time::Duration;

        use crate::fetch::{FetchError, Fetcher, PcsClient};
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        async fn mount_section(server: &MockServer, section: &str, template: ResponseTemplate) {
            Mock::given(method("GET"))
                .and(path("/nation.php"))
                .and(query_param("s", section))
                .respond_with(template)
                .mount(server)
                .await;
        }

        async fn mount_listings(server: &MockServer) {
            let teams = r#"<table><tr><td>1</td><td><a href="team/soudal-quick-step-2024">Soudal</a></td><td>WT</td></tr></table>"#;
            let riders = r#"<table><tr><td>1</td><td><a href="rider/remco-evenepoel">EVENEPOEL Remco</a></td></tr></table>"#;
            mount_section(server, "teams", ResponseTemplate::new(200).set_body_string(teams)).await;
            mount_section(server, "contract-riders", ResponseTemplate::new(200).set_body_string(riders)).await;
        }

        fn client(server: &MockServer) -> PcsClient {
            PcsClient::with_base_url(&server.uri(), Duration::from_secs(5)).expect("client")
        }

        #[tokio::test]
        async fn test_missing_nation_count_is_zero() {
            let server = MockServer::start().await;
            mount_listings(&server).await;
            mount_section(&server, "nation-wins", ResponseTemplate::new(200).set_body_string("<table><tr><td>17</td></tr></table>")).await;
            mount_section(&server, "pcs-ranking", ResponseTemplate::new(404)).await;

            let nation = client(&server).fetch_nation(2024, "nation/belgium").await.unwrap();
            assert_eq!(nation.name, "belgium");
            assert_eq!(nation.wins, 17);
            assert_eq!(nation.pcs_points, 0);
            assert_eq!(nation.rider_urls, vec!["rider/remco-evenepoel"]);
        }

        #[tokio::test]
        async fn test_failing_nation_count_is_an_error() {
            let server = MockServer::start().await;
            mount_listings(&server).await;
            mount_section(&server, "nation-wins", ResponseTemplate::new(503)).await;
            mount_section(&server, "pcs-ranking", ResponseTemplate::new(200).set_body_string("<p></p>")).await;

            let err = client(&server).fetch_nation(2024, "nation/belgium").await.unwrap_err();
            assert!(matches!(err, FetchError::Server(_)), "unexpected error: {:?}", err);
        }
    }
}
