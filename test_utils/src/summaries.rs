//! Random coverage summaries for property-style tests and benchmarks.

use rand::Rng;
use serde_json::{json, Map, Value};

fn metric(rng: &mut impl Rng) -> Value {
    let total = rng.gen_range(0..200u64);
    let covered = rng.gen_range(0..=total);
    let pct = if total == 0 {
        100.0
    } else {
        (covered as f64 * 10000.0 / total as f64).round() / 100.0
    };
    json!({"total": total, "covered": covered, "skipped": 0, "pct": pct})
}

fn totals(rng: &mut impl Rng) -> Value {
    json!({
        "lines": metric(rng),
        "statements": metric(rng),
        "functions": metric(rng),
        "branches": metric(rng),
    })
}

/// One file entry with a statement map in which roughly a third of the
/// statements never ran.
pub fn random_file(rng: &mut impl Rng) -> Value {
    let mut statement_map = Map::new();
    let mut hits = Map::new();
    let mut line = 1u32;
    for id in 0..rng.gen_range(0..20u32) {
        let len = rng.gen_range(0..3u32);
        statement_map.insert(
            id.to_string(),
            json!({"start": {"line": line, "column": 0}, "end": {"line": line + len, "column": 12}}),
        );
        let count = if rng.gen_bool(0.3) {
            0
        } else {
            rng.gen_range(1..50u64)
        };
        hits.insert(id.to_string(), json!(count));
        line += len + 1;
    }

    let mut file = totals(rng);
    if let Some(entry) = file.as_object_mut() {
        entry.insert("statementMap".to_string(), Value::Object(statement_map));
        entry.insert("s".to_string(), Value::Object(hits));
    }
    file
}

/// A summary document with `file_count` files plus the `total` entry.
pub fn random_summary(rng: &mut impl Rng, file_count: usize) -> Value {
    let mut doc = Map::new();
    doc.insert("total".to_string(), totals(rng));
    for i in 0..file_count {
        doc.insert(format!("src/module_{i}.js"), random_file(rng));
    }
    Value::Object(doc)
}

/// The summary of a later run: some files are deleted, some re-measured and
/// a few new ones appear.
pub fn next_run(rng: &mut impl Rng, previous: &Value) -> Value {
    let mut doc = previous.as_object().cloned().unwrap_or_default();
    let files: Vec<String> = doc.keys().filter(|key| *key != "total").cloned().collect();
    for file in files {
        if rng.gen_bool(0.2) {
            doc.remove(&file);
        } else if rng.gen_bool(0.5) {
            doc.insert(file, random_file(rng));
        }
    }
    for i in 0..rng.gen_range(0..5) {
        let suffix: u32 = rng.gen();
        doc.insert(format!("src/added_{suffix}_{i}.js"), random_file(rng));
    }
    doc.insert("total".to_string(), totals(rng));
    Value::Object(doc)
}
