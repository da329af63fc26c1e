use anyhow::Result;
use pretty_assertions::assert_eq;

use super::mock::{client, MockHttpSend};

fn zones(count: usize, ids: std::ops::Range<usize>) -> String {
    let mut body = format!("<listzonesresponse><count>{count}</count>");
    for id in ids {
        body.push_str(&format!("<zone><id>{id}</id><name>zone-{id}</name></zone>"));
    }
    body.push_str("</listzonesresponse>");
    body
}

#[tokio::test]
async fn test_list_single_page() -> Result<()> {
    let mock = MockHttpSend::new().respond(200, zones(2, 0..2));

    let items = client(&mock)
        .list("listZones", &[("available", "true")], "zone")
        .await?;

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].child("name").map(|e| e.text()), Some("zone-1"));

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].contains("command=listZones&available=true&page=1&pagesize=500&apiKey=AK"));
    Ok(())
}

#[tokio::test]
async fn test_list_follows_pages() -> Result<()> {
    let mock = MockHttpSend::new()
        .respond(200, zones(501, 0..500))
        .respond(200, zones(501, 500..501));

    let items = client(&mock).list("listZones", &[], "zone").await?;

    assert_eq!(items.len(), 501);
    assert_eq!(items[500].child("id").map(|e| e.text()), Some("500"));

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].contains("&page=1&"));
    assert!(requests[1].contains("&page=2&"));
    Ok(())
}

#[tokio::test]
async fn test_list_stops_at_reported_count() -> Result<()> {
    let mock = MockHttpSend::new().respond(200, zones(500, 0..500));

    let items = client(&mock).list("listZones", &[], "zone").await?;

    assert_eq!(items.len(), 500);
    assert_eq!(mock.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_list_without_data() -> Result<()> {
    let mock = MockHttpSend::new().respond(431, "<html><body>nothing</body></html>");

    let items = client(&mock).list("listZones", &[], "zone").await?;

    assert!(items.is_empty());
    assert_eq!(mock.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_list_empty_response() -> Result<()> {
    let mock = MockHttpSend::new().respond(200, "<listzonesresponse/>");

    let items = client(&mock).list("listZones", &[], "zone").await?;

    assert!(items.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_list_stops_when_page_is_ignored() -> Result<()> {
    // Full pages without `count`, the same items each time.
    let page = zones(0, 0..500).replace("<count>0</count>", "");
    let mock = MockHttpSend::new()
        .respond(200, page.clone())
        .respond(200, page.clone())
        .respond(200, page);

    let items = client(&mock).list("listZones", &[], "zone").await?;

    assert_eq!(items.len(), 500);
    assert_eq!(mock.requests().len(), 2);
    Ok(())
}
