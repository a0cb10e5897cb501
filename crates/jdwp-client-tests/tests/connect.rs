use jdb_test_fixtures::JavaInstance;
use jdwp_client_tests::JdwpJavaInstanceExt;
use std::time::Duration;
use tracing::info;

#[test_log::test(tokio::test)]
async fn test_connect() -> eyre::Result<()> {
    let java_instance = JavaInstance::new(0, "BusyBeaver").await?;
    println!("started java instance");
    let mut client = java_instance.connect().await?;
    client
        .on_event(|_policy, event| async move {
            info!("event: {event:?}");
            Ok(())
        })
        .await;
    tokio::time::sleep(Duration::from_millis(5000)).await;
    Ok(())
}
