use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use satquest_api::models::{ActiveEffect, ItemKind, User};

/// Build a user with `live` live effects and `lapsed` lapsed ones.
fn user_with_effects(live: usize, lapsed: usize) -> User {
    let now = Utc::now();
    let mut user = User::new("bench-user", None, "Bench", 0, now);

    for i in 0..live {
        let id = format!("live-{}", i);
        user.active_effects.insert(
            id.clone(),
            ActiveEffect {
                item_id: id.clone(),
                name: id,
                kind: ItemKind::Multiplier,
                value: 1.0 + (i as f64) / 100.0,
                active_until: now + Duration::minutes(30 + i as i64),
            },
        );
    }
    for i in 0..lapsed {
        let id = format!("lapsed-{}", i);
        user.active_effects.insert(
            id.clone(),
            ActiveEffect {
                item_id: id.clone(),
                name: id,
                kind: ItemKind::Multiplier,
                value: 5.0,
                active_until: now - Duration::minutes(1 + i as i64),
            },
        );
    }

    user
}

fn benchmark_read_path(c: &mut Criterion) {
    let now = Utc::now();
    let small = user_with_effects(4, 2);
    let large = user_with_effects(100, 100);

    let mut group = c.benchmark_group("expiry_and_resolver");

    group.bench_function("active_effects_typical", |b| {
        b.iter(|| black_box(&small).active_effects_at(black_box(now)))
    });

    group.bench_function("active_effects_large", |b| {
        b.iter(|| black_box(&large).active_effects_at(black_box(now)))
    });

    group.bench_function("highest_multiplier_large", |b| {
        b.iter(|| black_box(&large).highest_multiplier_at(black_box(now)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_read_path);
criterion_main!(benches);
