use anyhow::Result;
use stacksign_cloudstack::{Client, Config, ErrorCause, JobOutcome};
use stacksign_core::{Context, OsEnv};
use stacksign_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    // Reads CLOUDSTACK_ENDPOINT, CLOUDSTACK_API_KEY and CLOUDSTACK_SECRET_KEY.
    let env_ctx = Context::new().with_env(OsEnv);
    let config = Config::new().from_env(&env_ctx);

    if config.credential().is_err() {
        println!("No CloudStack credentials found, printing a signed url with demo keys");
        let demo = Config::new()
            .with_endpoint("http://localhost:8080/client")
            .with_api_key("demo-api-key")
            .with_secret_key("demo-secret-key");
        let client = Client::new(Context::new(), demo);
        println!("{}", client.build_url("listZones", &[("available", "true")])?);
        return Ok(());
    }

    let ctx = env_ctx.with_http_send(ReqwestHttpSend::new(config.http_client()?));
    let client = Client::new(ctx, config);

    println!("Example 1: list zones");
    for zone in client.list("listZones", &[("available", "true")], "zone").await? {
        println!(
            "  {} {}",
            zone.child("id").map(|e| e.text()).unwrap_or_default(),
            zone.child("name").map(|e| e.text()).unwrap_or_default()
        );
    }

    // Set CLOUDSTACK_VOLUME_ID to try snapshotting a volume.
    let Ok(volume_id) = std::env::var("CLOUDSTACK_VOLUME_ID") else {
        return Ok(());
    };

    println!("\nExample 2: snapshot volume {volume_id}");
    let Some(resp) = client
        .call("createSnapshot", &[("volumeId", volume_id.as_str())])
        .await?
    else {
        println!("  volume not found");
        return Ok(());
    };

    match client.job_poller("createSnapshot").wait_outcome(&resp).await {
        Ok(JobOutcome::Completed(doc)) => {
            println!("  snapshot {:?} created", doc.find_text("id"))
        }
        Ok(JobOutcome::NotModified(_)) => println!("  nothing changed since last snapshot"),
        Err(err) if ErrorCause::of(&err) == ErrorCause::PermissionDenied => {
            eprintln!("  not allowed: {err}")
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
