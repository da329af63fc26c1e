use anyhow::Result;
use pretty_assertions::assert_eq;
use stacksign_cloudstack::{Client, Config};
use stacksign_core::{Context, ErrorKind};

use super::mock::{client, MockHttpSend};

#[test]
fn test_build_url() -> Result<()> {
    let client = client(&MockHttpSend::new());
    let url = client.build_url("listZones", &[("available", "true")])?;

    assert!(url.starts_with("https://cloud.example/client/api?command=listZones&available=true&apiKey=AK&signature="));
    let signature = url.rsplit("signature=").next().unwrap_or_default();
    assert!(!signature.is_empty());
    Ok(())
}

#[test]
fn test_build_url_without_credentials() {
    let client = Client::new(
        Context::new(),
        Config::new().with_endpoint("https://cloud.example/client"),
    );

    let err = client
        .build_url("listZones", &[])
        .expect_err("missing keys must fail");
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}

#[tokio::test]
async fn test_call_without_endpoint_sends_nothing() {
    let mock = MockHttpSend::new().respond(200, "<listzonesresponse/>");
    let client = Client::new(
        Context::new().with_http_send(mock.clone()),
        Config::new().with_api_key("AK").with_secret_key("SK"),
    );

    let err = client
        .call("listZones", &[])
        .await
        .expect_err("missing endpoint must fail");
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_call_returns_document() -> Result<()> {
    let mock = MockHttpSend::new().respond(
        200,
        "<listzonesresponse><count>1</count><zone><id>1</id><name>zone-a</name></zone></listzonesresponse>",
    );
    let client = client(&mock);

    let doc = client
        .call("listZones", &[("available", "true")])
        .await?
        .expect("document must be present");
    assert_eq!(doc.find_text("name"), Some("zone-a"));

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].contains("command=listZones"));
    assert!(requests[0].contains("&available=true&"));
    Ok(())
}

#[tokio::test]
async fn test_sentinel_html_is_no_data() -> Result<()> {
    let mock = MockHttpSend::new().respond(
        431,
        "<html><body><h1>HTTP Status 431</h1></body></html>",
    );

    let resp = client(&mock).call("listVolumes", &[("id", "v-1")]).await?;
    assert!(resp.is_none());
    Ok(())
}

#[tokio::test]
async fn test_cloud_error_end_to_end() {
    let mock = MockHttpSend::new().respond(
        530,
        "<response><errorcode>530</errorcode><errortext>internal</errortext></response>",
    );
    let client = client(&mock);

    let err = client
        .call("listZones", &[("available", "true")])
        .await
        .expect_err("530 must fail");
    assert_eq!(err.kind(), ErrorKind::ServiceError);
    assert_eq!(err.code(), Some(530));
    assert_eq!(err.message(), "internal");

    let requests = mock.requests();
    assert!(requests[0].starts_with(
        "https://cloud.example/client/api?command=listZones&available=true&apiKey=AK&signature="
    ));
}

#[tokio::test]
async fn test_authentication_error() {
    let mock = MockHttpSend::new().respond(401, "<html><body>Unauthorized</body></html>");

    let err = client(&mock)
        .call("listZones", &[])
        .await
        .expect_err("401 must fail");
    assert!(err.is_authentication_error());
    assert_eq!(err.code(), Some(401));
    assert_eq!(err.message(), "Unauthorized user");
}

#[tokio::test]
async fn test_malformed_ok_response() {
    let mock = MockHttpSend::new().respond(200, "Service Temporarily Unavailable");

    let err = client(&mock)
        .call("listZones", &[])
        .await
        .expect_err("non-xml must fail");
    assert_eq!(err.kind(), ErrorKind::ResponseMalformed);
    assert_eq!(err.code(), Some(200));
    assert_eq!(
        err.body().map(|b| b.as_ref()),
        Some(&b"Service Temporarily Unavailable"[..])
    );
}

#[tokio::test]
async fn test_transport_error_is_not_retried() {
    let mock = MockHttpSend::new();

    let err = client(&mock)
        .call("listZones", &[])
        .await
        .expect_err("transport must fail");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(mock.requests().len(), 1);
    assert!(err.context().iter().any(|c| c.contains("apiKey=***")));
}

#[tokio::test]
async fn test_client_is_shareable_across_tasks() -> Result<()> {
    let mock = MockHttpSend::new()
        .respond(200, "<listzonesresponse/>")
        .respond(200, "<listzonesresponse/>");
    let client = client(&mock);

    let handles: Vec<_> = (0..2)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move { client.call("listZones", &[("id", &i.to_string())]).await })
        })
        .collect();
    for handle in handles {
        assert!(handle.await??.is_some());
    }

    assert_eq!(mock.requests().len(), 2);
    Ok(())
}
