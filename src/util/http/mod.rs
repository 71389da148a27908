use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::{Lazy, OnceCell};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

use crate::{logging::Logger, util};

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("http"));

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
fn get_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        util::ensure_rustls_crypto_provider();

        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(15))
            // ===== TCP 優化 =====
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // ===== 連接池 =====
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and deserializes the JSON response into the specified type.
///
/// Non-2xx statuses are reported as errors, the body is not parsed in that case.
pub async fn get_json<RES: DeserializeOwned>(url: &str) -> Result<RES> {
    send(Method::GET, url, None::<fn(_) -> _>)
        .await?
        .json::<RES>()
        .await
        .map_err(|e| anyhow!("Error parsing response JSON from {}: {:?}", url, e))
}

/// Performs an HTTP POST request with a JSON body and deserializes the JSON response.
pub async fn post_use_json<REQ, RES>(url: &str, req: &REQ) -> Result<RES>
where
    REQ: Serialize,
    RES: DeserializeOwned,
{
    let res = send(
        Method::POST,
        url,
        Some(|rb: RequestBuilder| rb.json(req)),
    )
    .await?;

    let res_body = res
        .text()
        .await
        .map_err(|e| anyhow!("Error reading response body: {}", e))?;

    serde_json::from_str(&res_body)
        .map_err(|e| anyhow!("Error parsing response JSON({}): {:?}", &res_body, e))
}

/// Sends a single HTTP request. There is no retry: callers decide how to degrade.
async fn send(
    method: Method,
    url: &str,
    body: Option<impl FnOnce(RequestBuilder) -> RequestBuilder>,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client()?;
    let mut rb = client.request(method, url);

    if let Some(body_fn) = body {
        rb = body_fn(rb);
    }

    let start = Instant::now();
    let res = rb.send().await;
    let elapsed = start.elapsed().as_millis();

    match res {
        Ok(response) => {
            let status = response.status();
            LOGGER.info(format!("{} {} {} ms", visit_log, status, elapsed));
            if !status.is_success() {
                return Err(anyhow!("{} responded with status {}", visit_log, status));
            }

            Ok(response)
        }
        Err(why) => {
            LOGGER.error(format!("{} failed because {:?}. {} ms", visit_log, why, elapsed));
            Err(anyhow!("Failed to send request to {} because {:?}", url, why))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    #[derive(Deserialize, Serialize, Debug, PartialEq)]
    struct Echo {
        value: i32,
    }

    #[tokio::test]
    async fn test_get_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/echo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value":7}"#))
            .mount(&server)
            .await;

        let echo: Echo = get_json(&format!("{}/echo", server.uri())).await.unwrap();
        assert_eq!(echo, Echo { value: 7 });
    }

    #[tokio::test]
    async fn test_get_json_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/echo"))
            .respond_with(ResponseTemplate::new(503).set_body_string(r#"{"value":7}"#))
            .mount(&server)
            .await;

        let result = get_json::<Echo>(&format!("{}/echo", server.uri())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_post_use_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value":9}"#))
            .mount(&server)
            .await;

        let echo: Echo = post_use_json(&format!("{}/echo", server.uri()), &Echo { value: 1 })
            .await
            .unwrap();
        assert_eq!(echo.value, 9);
    }
}
