use super::support::Fixture;
use recipe_digest::{DigestConfig, DigestError, RemoteTreatment};
use std::time::Duration;

fn remote_fixture() -> Fixture {
    let fixture = Fixture::new();
    fixture.write("entry.sh", "#!/bin/sh\nexec \"$@\"\n");
    fixture.write(
        "Dockerfile",
        "FROM debian:bookworm\n\
         ADD https://example.com/releases/tool-1.2.tar.gz /opt/\n\
         COPY entry.sh /entry.sh\n",
    );
    fixture
}

#[tokio::test]
async fn unchanged_policy_is_stable_over_time() {
    let fixture = remote_fixture();
    let config = DigestConfig::default().with_remote_treatment(RemoteTreatment::Unchanged);
    let first = fixture.digest(&config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(fixture.digest(&config).await.unwrap(), first);
}

#[tokio::test]
async fn unchanged_policy_tracks_the_url() {
    let fixture = remote_fixture();
    let config = DigestConfig::default();
    let before = fixture.digest(&config).await.unwrap();

    fixture.write(
        "Dockerfile",
        "FROM debian:bookworm\n\
         ADD https://example.com/releases/tool-1.3.tar.gz /opt/\n\
         COPY entry.sh /entry.sh\n",
    );
    assert_ne!(fixture.digest(&config).await.unwrap(), before);
}

#[tokio::test]
async fn always_changed_policy_differs_over_time() {
    let fixture = remote_fixture();
    let config = DigestConfig::default().with_remote_treatment(RemoteTreatment::AlwaysChanged);
    let first = fixture.digest(&config).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = fixture.digest(&config).await.unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn plain_http_is_remote_too() {
    let fixture = Fixture::new();
    fixture.write("Dockerfile", "FROM alpine\nADD http://mirror.local/pkg.apk /tmp/\n");
    // Nothing named like the URL exists locally, so success means it was not walked
    assert!(fixture.digest(&DigestConfig::default()).await.is_ok());
}

#[tokio::test]
async fn download_remote_is_rejected() {
    let fixture = remote_fixture();
    let config = DigestConfig {
        download_remote: true,
        ..DigestConfig::default()
    };
    assert!(matches!(
        fixture.digest(&config).await,
        Err(DigestError::Config(_))
    ));
}
