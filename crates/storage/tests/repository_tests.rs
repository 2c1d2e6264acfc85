//! Integration tests for the filesystem repository.

use bytes::Bytes;
use dropslot_core::SlotId;
use dropslot_storage::{ByteStream, FileRepository, Repository, StreamingUpload};
use futures::StreamExt;

async fn collect(mut stream: ByteStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}

async fn store(repo: &FileRepository, id: &SlotId, data: &[u8]) {
    let mut upload = repo.open_write(id).await.unwrap();
    upload.write(Bytes::copy_from_slice(data)).await.unwrap();
    upload.finish().await.unwrap();
}

#[tokio::test]
async fn test_large_object_streams_in_chunks() {
    let repo = FileRepository::in_temp_dir().unwrap();
    let id = SlotId::generate();

    // Larger than one read chunk so the stream yields several items.
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let mut upload = repo.open_write(&id).await.unwrap();
    for piece in data.chunks(10_000) {
        upload.write(Bytes::copy_from_slice(piece)).await.unwrap();
    }
    let written = upload.finish().await.unwrap();
    assert_eq!(written, data.len() as u64);

    let mut stream = repo.open_read(&id).await.unwrap();
    let mut chunks = 0;
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks += 1;
        body.extend_from_slice(&chunk.unwrap());
    }
    assert!(chunks > 1, "expected a chunked read, got {chunks} chunk(s)");
    assert_eq!(body, data);
}

#[tokio::test]
async fn test_concurrent_writes_to_same_id_never_corrupt() {
    let repo = FileRepository::in_temp_dir().unwrap();
    let id = SlotId::generate();

    // Two in-flight uploads for one identifier; whichever finishes last
    // wins, and the visible object is always one complete body.
    let mut first = repo.open_write(&id).await.unwrap();
    let mut second = repo.open_write(&id).await.unwrap();

    first.write(Bytes::from_static(b"first body")).await.unwrap();
    second
        .write(Bytes::from_static(b"second body"))
        .await
        .unwrap();

    first.finish().await.unwrap();
    second.finish().await.unwrap();

    let body = collect(repo.open_read(&id).await.unwrap()).await;
    assert_eq!(body, b"second body");
}

#[tokio::test]
async fn test_rewrite_changes_validator() {
    let repo = FileRepository::in_temp_dir().unwrap();
    let id = SlotId::generate();

    store(&repo, &id, b"version one").await;
    let before = repo.etag(&id).await.unwrap();

    // Filesystem mtime granularity can be coarse; make sure the clock moves.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    store(&repo, &id, b"version two").await;
    let after = repo.etag(&id).await.unwrap();

    assert_ne!(before, after);
}

#[tokio::test]
async fn test_temp_root_cleaned_up_on_drop() {
    let root;
    {
        let repo = FileRepository::in_temp_dir().unwrap();
        root = repo.root().to_path_buf();
        let id = SlotId::generate();
        store(&repo, &id, b"ephemeral").await;
        assert!(root.exists());
    }
    assert!(!root.exists());
}
