//! Criterion benchmarks for the fleet statistics and store search.
//!
//! The dashboard recomputes these on every tablet-list update, so they should
//! stay well under a millisecond for a few thousand tablets.
//!
//! Run with:
//! ```bash
//! cargo bench --package robo-core --bench fleet_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use robo_core::{
    encode_wifi_payload, search_stores, version_distribution, FleetSummary, SecurityType, Store,
    Tablet, WifiCredentials,
};

// ── Fixture builders ──────────────────────────────────────────────────────────

/// Creates `n` tablets spread over ten stores with varied telemetry.
fn build_fleet(n: usize) -> Vec<Tablet> {
    (0..n)
        .map(|i| Tablet {
            id: format!("tablet-{i}"),
            mac_address: String::new(),
            table_number: format!("Table {:02}", i % 40 + 1),
            wifi_strength: format!("{}%", (i * 7) % 101),
            battery_level: if i % 13 == 0 {
                "N/A".to_string()
            } else {
                format!("{}%", (i * 11) % 101)
            },
            version: format!("v1.2.{}", i % 4),
            ip_address: format!("192.168.{}.{}", i / 250, i % 250),
            firmware_build: "FW-2024.11.28".to_string(),
            is_on: i % 3 != 0,
            store_id: Some(format!("store{}", i % 10)),
        })
        .collect()
}

fn build_stores(n: usize) -> Vec<Store> {
    (0..n)
        .map(|i| Store {
            id: format!("store{i}"),
            name: format!("Branch {i}"),
            location: format!("District {}, Seoul", i % 25),
            tablet_count: 0,
        })
        .collect()
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_fleet_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("fleet_summary");

    for &count in &[3usize, 100, 1000, 5000] {
        let fleet = build_fleet(count);
        group.bench_with_input(BenchmarkId::new("tablets", count), &fleet, |b, fleet| {
            b.iter(|| FleetSummary::from_tablets(black_box(fleet)))
        });
    }

    group.finish();
}

fn bench_version_distribution(c: &mut Criterion) {
    let fleet = build_fleet(1000);
    c.bench_function("version_distribution_1000", |b| {
        b.iter(|| version_distribution(black_box(&fleet)))
    });
}

fn bench_store_search(c: &mut Criterion) {
    let stores = build_stores(500);
    let mut group = c.benchmark_group("search_stores");

    group.bench_function("blank_query", |b| {
        b.iter(|| search_stores(black_box(&stores), black_box("  ")))
    });
    group.bench_function("location_query", |b| {
        b.iter(|| search_stores(black_box(&stores), black_box("district 7")))
    });

    group.finish();
}

fn bench_wifi_payload(c: &mut Criterion) {
    let creds = WifiCredentials {
        ssid: "HomeNet".to_string(),
        password: "secret123".to_string(),
        security: SecurityType::Wpa,
        hidden: false,
    };
    c.bench_function("encode_wifi_payload", |b| {
        b.iter(|| encode_wifi_payload(black_box(&creds)))
    });
}

criterion_group!(
    benches,
    bench_fleet_summary,
    bench_version_distribution,
    bench_store_search,
    bench_wifi_payload,
);
criterion_main!(benches);
