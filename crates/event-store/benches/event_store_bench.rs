use criterion::{Criterion, criterion_group, criterion_main};
use event_store::{AggregateId, EventStore, InMemoryEventStore, UncommittedEvent, Version};

fn make_event() -> UncommittedEvent {
    UncommittedEvent::new(
        "CommentAdded",
        serde_json::json!({
            "comment_id": "00000000-0000-0000-0000-000000000001",
            "comment": "benchmark comment",
            "username": "bench"
        }),
    )
}

fn bench_append_single_event(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("event_store/append_single_event", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::in_memory();
                store
                    .append(AggregateId::new(), "Post", vec![make_event()], Version::none())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_append_batch_10(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("event_store/append_batch_10", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryEventStore::in_memory();
                let events: Vec<_> = (0..10).map(|_| make_event()).collect();
                store
                    .append(AggregateId::new(), "Post", events, Version::none())
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_read_stream_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryEventStore::in_memory();
    let aggregate_id = AggregateId::new();
    rt.block_on(async {
        let events: Vec<_> = (0..100).map(|_| make_event()).collect();
        store
            .append(aggregate_id, "Post", events, Version::none())
            .await
            .unwrap();
    });

    c.bench_function("event_store/read_stream_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.read(aggregate_id).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_append_single_event,
    bench_append_batch_10,
    bench_read_stream_100
);
criterion_main!(benches);
