use jdb_test_fixtures::JavaInstance;
use jdwp_client::commands::{AllClasses, AllThreads, ClassesBySignature, Version};
use jdwp_client_tests::JdwpJavaInstanceExt;
use tracing::info;

#[test_log::test(tokio::test)]
async fn test_get_jvm_version() -> eyre::Result<()> {
    let java_instance = JavaInstance::new(0, "BusyBeaver").await?;
    println!("started java instance");
    let mut client = java_instance.connect().await?;
    let version = client.send(Version).await?;
    println!("got version: {version:#?}");
    assert!(
        version.jdwp_major >= 8,
        "major is not >= 8: {}",
        version.jdwp_major
    );
    assert!(
        version.jdwp_minor >= 0,
        "minor is not >= 0: {}",
        version.jdwp_minor
    );
    client.dispose().await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_get_string_class() -> eyre::Result<()> {
    let java_instance = JavaInstance::new(0, "BusyBeaver").await?;
    println!("started java instance");
    let mut client = java_instance.connect().await?;
    let data = client
        .send(ClassesBySignature {
            signature: "Ljava/lang/String;".to_string(),
        })
        .await?;
    println!("data: {data:#?}");
    client.dispose().await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_get_all_classes() -> eyre::Result<()> {
    let java_instance = JavaInstance::new(0, "BusyBeaver").await?;
    println!("started java instance");
    let mut client = java_instance.connect().await?;
    let data = client.send(AllClasses).await?;
    info!("initialized:");
    for x in data.classes {
        if x.status.initialized() {
            info!(" - {} ({:?})", x.signature, x.type_id);
        }
    }
    client.dispose().await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_get_all_threads() -> eyre::Result<()> {
    let java_instance = JavaInstance::new(0, "BusyBeaver").await?;
    println!("started java instance");
    let mut client = java_instance.connect().await?;
    let data = client.send(AllThreads).await?;
    println!("data: {data:#?}");
    client.dispose().await?;
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_dispose() -> eyre::Result<()> {
    let java_instance = JavaInstance::new(0, "BusyBeaver").await?;
    println!("started java instance");
    let mut client = java_instance.connect().await?;
    client
        .on_event(|_, e| async move {
            println!("got event: {e:?}");
            Ok(())
        })
        .await;
    client.dispose().await?;
    println!("client disposed");

    Ok(())
}
