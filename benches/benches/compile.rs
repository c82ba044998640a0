use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use entitygen_typegen::ir::{Cardinality, Entity, Property, Relationship, Schema, Storage};
use entitygen_typegen::output::{
    GoOptions, OpenApiOptions, SqlOptions, generate_go_types, generate_openapi,
    generate_sql_bundle,
};
use std::hint::black_box;

/// A schema of `n` entities. Every entity links to the next one through a
/// scalar reference and to the one after that through an id array, so the
/// SQL planner sees a foreign key cycle and one join table per entity.
fn synthetic_schema(n: usize) -> Schema {
    let mut schema = Schema::new();
    schema.definitions.insert(
        "id".into(),
        Property::primitive("string").with_format("uuid"),
    );
    schema.definitions.insert(
        "entity_id".into(),
        Property::primitive("string").with_format("uuid"),
    );
    schema.definitions.insert(
        "timestamp".into(),
        Property::primitive("string").with_format("date-time"),
    );

    let name = |i: usize| format!("Entity{}", i % n);
    for i in 0..n {
        let mut entity = Entity {
            required: vec!["id".into(), "name".into()],
            ..Default::default()
        };
        let props = &mut entity.properties;
        props.insert("id".into(), Property::reference("#/definitions/id"));
        props.insert("name".into(), Property::primitive("string"));
        props.insert("created_at".into(), Property::reference("#/definitions/timestamp"));
        props.insert("next_id".into(), Property::reference("#/definitions/entity_id"));
        props.insert(
            "peer_ids".into(),
            Property::array_of(Property::reference("#/definitions/entity_id")),
        );
        entity.relationships.insert(
            "next_id".into(),
            Relationship {
                target: name(i + 1),
                cardinality: Cardinality::ZeroOrOne,
                storage: Storage::Auto,
            },
        );
        entity.relationships.insert(
            "peer_ids".into(),
            Relationship {
                target: name(i + 2),
                cardinality: Cardinality::ZeroOrMany,
                storage: Storage::Auto,
            },
        );
        schema.entities.insert(name(i), entity);
    }
    schema
}

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for n in [10, 100, 500] {
        let schema = synthetic_schema(n);

        group.bench_with_input(BenchmarkId::new("sql_bundle", n), &schema, |b, schema| {
            b.iter(|| generate_sql_bundle(black_box(schema), &SqlOptions::default()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("go", n), &schema, |b, schema| {
            b.iter(|| generate_go_types(black_box(schema), &GoOptions::default()).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("openapi", n), &schema, |b, schema| {
            b.iter(|| generate_openapi(black_box(schema), &OpenApiOptions::default()).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
