use super::support::{Fixture, WORKED_RECIPE};
use recipe_digest::accumulator::digest_sequence;
use recipe_digest::resolve::OpenedFileEntry;
use recipe_digest::{compute_digest_from_bytes, DigestConfig};

#[tokio::test]
async fn repeated_runs_agree() {
    let fixture = Fixture::worked_example();
    let config = DigestConfig::default();
    let first = fixture.digest(&config).await.unwrap();
    for _ in 0..5 {
        assert_eq!(fixture.digest(&config).await.unwrap(), first);
    }
}

#[tokio::test]
async fn worker_counts_agree_on_large_tree() {
    let fixture = Fixture::new();
    for dir in 0..10 {
        for file in 0..25 {
            fixture.write(
                &format!("src/mod{:02}/file{:02}.rs", dir, file),
                &format!("// module {} file {}\n", dir, file),
            );
        }
    }
    let mut recipe = String::from("FROM rust:1.80 AS build\n");
    for dir in (0..10).rev() {
        recipe.push_str(&format!("COPY src/mod{:02}/ /src/mod{:02}/\n", dir, dir));
    }
    fixture.write("Dockerfile", &recipe);

    let one = fixture
        .digest(&DigestConfig::default().with_workers(1))
        .await
        .unwrap();
    let eight = fixture
        .digest(&DigestConfig::default().with_workers(8))
        .await
        .unwrap();
    let tiny_buffers = fixture
        .digest(&DigestConfig {
            buffer_capacity: 1,
            ..DigestConfig::default().with_workers(8)
        })
        .await
        .unwrap();
    assert_eq!(one, eight);
    assert_eq!(one, tiny_buffers);
}

#[tokio::test]
async fn worked_example_hashes_recipe_then_sorted_files() {
    let fixture = Fixture::worked_example();
    let digest = fixture.digest(&DigestConfig::default()).await.unwrap();

    let expected = digest_sequence(
        WORKED_RECIPE.as_bytes(),
        vec![
            OpenedFileEntry::local("app.go", fixture.path("app.go")),
            OpenedFileEntry::local("lib/x.go", fixture.path("lib/x.go")),
            OpenedFileEntry::local("lib/y.go", fixture.path("lib/y.go")),
        ],
    )
    .unwrap();
    assert_eq!(digest, expected);
}

#[tokio::test]
async fn recipe_in_memory_matches_recipe_on_disk() {
    let fixture = Fixture::worked_example();
    let config = DigestConfig::default();
    let from_disk = fixture.digest(&config).await.unwrap();
    let from_bytes = compute_digest_from_bytes(WORKED_RECIPE.as_bytes(), fixture.root(), &config)
        .await
        .unwrap();
    assert_eq!(from_disk, from_bytes);
}

#[tokio::test]
async fn declaration_order_does_not_matter_for_entries() {
    let fixture = Fixture::worked_example();
    let forward = "FROM alpine\nCOPY app.go lib/ /dst/\n";
    let reverse = "FROM alpine\nCOPY lib/ app.go /dst/\n";
    let base = b"base";
    let (names_a, digest_a) = super::support::sorted_sequence(fixture.root(), forward, base);
    let (names_b, digest_b) = super::support::sorted_sequence(fixture.root(), reverse, base);
    assert_eq!(names_a, vec!["app.go", "lib/x.go", "lib/y.go"]);
    assert_eq!(names_a, names_b);
    assert_eq!(digest_a, digest_b);
}
