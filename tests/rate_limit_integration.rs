//! Admission-control behavior over the HTTP surface.

use axum::http::StatusCode;

mod common;
use common::start_proxy;

use pagegate::config::ProxyConfig;

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn limited_config(max_requests: usize) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.rate_limit.max_requests = max_requests;
    config
}

#[tokio::test]
async fn requests_past_the_limit_are_rejected_with_429() {
    let proxy = start_proxy(limited_config(3)).await;
    let client = client();
    let url = format!("http://{}/healthz", proxy);

    for _ in 0..3 {
        let res = client.get(&url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.text().await.unwrap(), "Too many requests");
}

#[tokio::test]
async fn forwarded_for_identities_are_limited_independently() {
    let proxy = start_proxy(limited_config(2)).await;
    let client = client();
    let url = format!("http://{}/healthz", proxy);

    for _ in 0..2 {
        let res = client
            .get(&url)
            .header("x-forwarded-for", "203.0.113.7")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(&url)
        .header("x-forwarded-for", "203.0.113.7")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different client identity is still admitted
    let res = client
        .get(&url)
        .header("x-forwarded-for", "203.0.113.8")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn disabled_rate_limiting_admits_everything() {
    let mut config = limited_config(1);
    config.rate_limit.enabled = false;
    let proxy = start_proxy(config).await;
    let client = client();
    let url = format!("http://{}/healthz", proxy);

    for _ in 0..10 {
        let res = client.get(&url).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
