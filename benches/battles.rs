// benches/battles.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};

use royale_harvest::core::TagCursor;
use royale_harvest::stages::battles::extract_event;

fn sample_log() -> Vec<Value> {
    (0..25)
        .map(|i| {
            let deck = |p: &str, n: usize| -> Value {
                (0..n).map(|c| json!({ "name": format!("{p}{c}"), "level": 14, "maxLevel": 16 })).collect()
            };
            // every fifth battle has a 7-card side
            let team_cards = deck("t", if i % 5 == 0 { 7 } else { 8 });
            json!({
                "type": "PvP",
                "battleTime": "20240101T120000.000Z",
                "team": [{ "tag": format!("#T{i}"), "crowns": i % 4, "startingTrophies": 6000 + i, "cards": team_cards }],
                "opponent": [{ "tag": format!("#O{i}"), "crowns": (i + 1) % 4, "startingTrophies": 6100 + i, "cards": deck("o", 8) }],
            })
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let log = sample_log();
    c.bench_function("extract_event_log_25", |b| {
        b.iter(|| {
            let kept = log.iter().filter_map(|raw| extract_event(black_box(raw)).ok()).count();
            black_box(kept)
        })
    });
}

fn bench_cursor(c: &mut Criterion) {
    c.bench_function("tag_cursor_len3", |b| {
        b.iter(|| {
            let n = TagCursor::new(black_box("0289PYLQGRJCUV"), 3).count();
            black_box(n)
        })
    });
    c.bench_function("tag_cursor_resume_len5", |b| {
        b.iter(|| TagCursor::after(black_box("0289PYLQGRJCUV"), 5, black_box("VVVV0")).map(|c| c.position()))
    });
}

criterion_group!(benches, bench_extract, bench_cursor);
criterion_main!(benches);
