//! Relay fan-out benchmark suite.
//!
//! Benchmarks status broadcast and bridge forwarding at different scales:
//! - Relay counts: 10, 100, 1000
//! - Burst sizes: 100, 1000 messages
//!
//! Run with: cargo bench --bench broadcast
//! Results saved to: target/criterion/

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use parking_lot::Mutex;
use serde_json::json;
use tokio::runtime::Runtime;

use cast_shim_relay::{
    Bridge, BridgeInfo, Connection, ContentIdentity, FrameId, Message, ReceiverId, RelayOptions,
    RelayRegistry, Result, TabId,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const RELAY_COUNTS: &[usize] = &[10, 100, 1000];
const BURST_SIZES: &[usize] = &[100, 1000];

// ============================================================================
// Fixtures
// ============================================================================

/// Bridge that keeps the host end of every connection open.
#[derive(Default)]
struct HoldingBridge {
    hosts: Mutex<Vec<Connection>>,
}

#[async_trait]
impl Bridge for HoldingBridge {
    async fn connect(&self) -> Result<Connection> {
        let (relay_side, host_side) = Connection::port_pair(None);
        self.hosts.lock().push(host_side);
        Ok(relay_side)
    }

    async fn info(&self) -> BridgeInfo {
        BridgeInfo::default()
    }
}

/// Registry with `count` relays and the page end of each.
async fn populated_registry(count: usize) -> (Arc<RelayRegistry>, Vec<Connection>) {
    let bridge = Arc::new(HoldingBridge::default());
    let registry = RelayRegistry::new(bridge, RelayOptions::default().bridge_connect_timeout);

    let mut pages = Vec::with_capacity(count);
    for tab in 0..count {
        let identity = ContentIdentity::new(TabId::new(tab as u32), FrameId::main());
        let (relay_side, page) = Connection::port_pair(Some(identity));
        registry.create(relay_side).await.expect("relay created");
        page.on_message(Box::new(|_| {}));
        pages.push(page);
    }

    (registry, pages)
}

// ============================================================================
// Benchmark: Status Broadcast
// ============================================================================

fn bench_status_broadcast(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("status_broadcast");

    for &count in RELAY_COUNTS {
        let (registry, _pages) = rt.block_on(populated_registry(count));
        let message = Message::service_up(&ReceiverId::new("receiver-1"));

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("relays", count), &count, |b, _| {
            b.iter(|| registry.broadcast(&message));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Bridge Forwarding
// ============================================================================

fn bench_bridge_forwarding(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");

    let mut group = c.benchmark_group("bridge_forwarding");
    group.sample_size(20);

    for &burst in BURST_SIZES {
        group.throughput(Throughput::Elements(burst as u64));
        group.bench_with_input(BenchmarkId::new("burst", burst), &burst, |b, &burst| {
            b.to_async(&rt).iter(|| async move {
                let (content_side, page) = Connection::channel_pair();
                let (bridge_side, host) = Connection::port_pair(None);

                let forward = content_side.clone();
                bridge_side.on_message(Box::new(move |message| forward.send(message)));

                let mut rx = page.messages();
                for seq in 0..burst {
                    host.send(Message::with_data("shim:/bridgeMessage", json!({ "seq": seq })));
                }
                for _ in 0..burst {
                    rx.recv().await.expect("forwarded message");
                }

                bridge_side.disconnect();
                content_side.disconnect();
            });
        });
    }

    group.finish();
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(benches, bench_status_broadcast, bench_bridge_forwarding);
criterion_main!(benches);
