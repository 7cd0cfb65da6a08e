//! Encode/decode throughput over a representative tree with a pooled
//! vocabulary of constructor and keyword names.

use std::collections::HashMap;

use criterion::{criterion_group, criterion_main, Criterion};
use esexpr_core::{read_embedded, write_embedded, Expr};
use num_bigint::BigInt;

fn sample_tree(records: usize) -> Expr {
    let rows = (0..records)
        .map(|i| Expr::Constructor {
            name: "record".into(),
            args: vec![
                Expr::Int(BigInt::from(i)),
                Expr::Str(format!("name-{i}")),
                Expr::Float64(i as f64 * 0.5),
            ],
            kwargs: HashMap::from([
                ("active".to_owned(), Expr::Bool(i % 2 == 0)),
                ("payload".to_owned(), Expr::Binary(vec![0xAB; 16])),
            ]),
        })
        .collect();

    Expr::Constructor {
        name: "table".into(),
        args: rows,
        kwargs: HashMap::new(),
    }
}

fn bench_roundtrip(c: &mut Criterion) {
    let tree = sample_tree(200);

    let mut encoded = Vec::new();
    write_embedded(&mut encoded, [&tree]).unwrap();

    c.bench_function("encode_embedded_200_records", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(encoded.len());
            write_embedded(&mut out, [&tree]).unwrap();
            out
        })
    });

    c.bench_function("decode_embedded_200_records", |b| {
        b.iter(|| {
            read_embedded(encoded.as_slice())
                .unwrap()
                .collect::<Result<Vec<_>, _>>()
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
