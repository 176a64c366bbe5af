use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use cypher_fluent::{CypherFluentQuery, CypherResponse, NodeReference, StartBit, ident};
use serde_json::{Value, json};

/// START with `n` node bits, one MATCH and WHERE per bit:
/// START n0=node({p0}), n1=node({p1}) ... MATCH n0-->m0, ... WHERE (m0.Age > {pN}) AND ...
fn build_query(n: usize) -> CypherFluentQuery {
    let bits: Vec<StartBit> = (0..n)
        .map(|i| StartBit::node(format!("n{i}"), NodeReference::new(i as u64)))
        .collect();
    let mut query = CypherFluentQuery::new().start_bits(bits);
    for i in 0..n {
        query = query
            .match_(&format!("n{i}-->m{i}"))
            .where_template(&format!("m{i}.Age > ?"), [json!(i)]);
    }
    query
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/render");

    for n in [1, 5, 10, 50] {
        let query = build_query(n).return_::<Value>("n0").limit(10);
        group.bench_with_input(BenchmarkId::from_parameter(n), &query, |b, query| {
            b.iter(|| black_box(query.query()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/build_and_render");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let query = build_query(n).return_::<Value>("n0").order_by("n0.Name");
                black_box(query.query());
            });
        });
    }

    group.finish();
}

fn bench_projection_materialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/projection_materialize");

    let typed = CypherFluentQuery::new()
        .start("root", NodeReference::new(0))
        .match_("root-->other")
        .return_shape::<Value>(|p| {
            p.field("Id", ident("other").id())
                .field("Name", ident("other").prop("Name"))
        });

    for rows in [10, 100, 1000] {
        let response = CypherResponse {
            columns: vec!["Id".to_string(), "Name".to_string()],
            data: (0..rows)
                .map(|i| vec![json!(i), json!(format!("node-{i}"))])
                .collect(),
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(rows),
            &response,
            |b, response| {
                b.iter(|| black_box(typed.materialize(response.clone())));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render,
    bench_build_and_render,
    bench_projection_materialize
);
criterion_main!(benches);
