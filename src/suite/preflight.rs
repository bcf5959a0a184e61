//! Pre-flight reachability check

use anyhow::{Context, Result};
use tracing::info;

use crate::http::HttpClient;
use crate::models::Endpoint;

/// Confirm the gateway answers at all.
///
/// Any HTTP status counts as reachable; only a transport failure is fatal.
pub async fn check_reachable(client: &HttpClient) -> Result<()> {
    let response = client
        .get(Endpoint::Health.path())
        .await
        .context("Gateway unreachable")?;

    info!(
        "Gateway reachable - {} answered HTTP {} in {:.2}ms",
        Endpoint::Health,
        response.status_code,
        response.duration_ms
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_gateway::{MockGateway, MockOptions};

    #[tokio::test]
    async fn test_unhealthy_gateway_is_still_reachable() {
        let gateway = MockGateway::start(MockOptions {
            unhealthy: true,
            ..Default::default()
        })
        .await;
        let client = HttpClient::with_timeout(5)
            .unwrap()
            .base_url(gateway.http_url());

        assert!(check_reachable(&client).await.is_ok());
    }
}
