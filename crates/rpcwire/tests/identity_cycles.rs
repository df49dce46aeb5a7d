// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Object identity across a round trip: sharing, self references, cycles
// through collections, and chains near the depth limit.

use rpcwire::{
    Codec, CodecConfig, CodecError, FieldKind, ObjectGraph, ObjectId, PrimitiveKind,
    TypeDescriptorBuilder, TypeRegistry, Value,
};
use std::collections::HashSet;
use std::sync::Arc;

fn codec() -> Codec {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            TypeDescriptorBuilder::new("Person")
                .string_field("name")
                .object_field("manager", "Person")
                .list_field("reports", FieldKind::object("Person"))
                .map_field("notes", FieldKind::object("Person"), PrimitiveKind::String)
                .build(),
        )
        .expect("person");
    registry
        .register(
            TypeDescriptorBuilder::new("Link")
                .field("seq", PrimitiveKind::U32)
                .object_field("next", "Link")
                .build(),
        )
        .expect("link");
    Codec::new(Arc::new(registry))
}

fn roundtrip(codec: &Codec, graph: &ObjectGraph) -> ObjectGraph {
    let bytes = codec.serialize(graph).expect("serialize");
    codec.deserialize(&bytes).expect("deserialize")
}

fn person(graph: &mut ObjectGraph, codec: &Codec, name: &str) -> ObjectId {
    let id = graph.create(codec.registry(), "Person").expect("person");
    graph.set(id, "name", name).expect("name");
    id
}

fn list_ids(graph: &ObjectGraph, id: ObjectId, field: &str) -> Vec<ObjectId> {
    graph
        .get(id, field)
        .expect("field")
        .as_elements()
        .expect("list")
        .iter()
        .map(|v| v.as_object().expect("object"))
        .collect()
}

#[test]
fn test_org_chart_cycles_through_collections() {
    let codec = codec();
    let mut graph = ObjectGraph::new();
    let boss = person(&mut graph, &codec, "boss");
    let a = person(&mut graph, &codec, "a");
    let b = person(&mut graph, &codec, "b");
    graph.set(a, "manager", boss).expect("a.manager");
    graph.set(b, "manager", boss).expect("b.manager");
    graph.set(boss, "manager", boss).expect("self");
    graph.set(boss, "reports", vec![a, b, a]).expect("reports");
    graph
        .set(boss, "notes", Value::map_of([(a, "steady"), (boss, "me")]))
        .expect("notes");
    graph.set_root(boss);

    let decoded = roundtrip(&codec, &graph);
    assert!(graph.equivalent(&decoded));
    assert_eq!(decoded.len(), 3);

    let boss2 = decoded.root_object().expect("root");
    assert_eq!(decoded.follow(boss2, "manager").expect("self"), boss2);
    let reports = list_ids(&decoded, boss2, "reports");
    assert_eq!(reports[0], reports[2]);
    assert_ne!(reports[0], reports[1]);
    for r in &reports {
        assert_eq!(decoded.follow(*r, "manager").expect("manager"), boss2);
    }

    let notes = decoded.get(boss2, "notes").expect("notes").as_map().expect("map");
    assert_eq!(notes[0].0.as_object(), Some(reports[0]));
    assert_eq!(notes[1].0.as_object(), Some(boss2));
}

#[test]
fn test_each_object_written_once() {
    let codec = codec();
    let mut graph = ObjectGraph::new();
    let shared = person(&mut graph, &codec, "a-rather-long-name-that-is-easy-to-count");
    let roots: Vec<ObjectId> = (0..10)
        .map(|i| {
            let p = person(&mut graph, &codec, &format!("p{i}"));
            graph.set(p, "manager", shared).expect("manager");
            p
        })
        .collect();
    graph.set_root(Value::List(roots.iter().map(|&id| Value::Object(id)).collect()));

    let bytes = codec.serialize(&graph).expect("serialize");
    let needle = b"a-rather-long-name-that-is-easy-to-count";
    let occurrences = bytes.windows(needle.len()).filter(|w| *w == needle).count();
    assert_eq!(occurrences, 1);
    let type_name_occurrences = bytes.windows(6).filter(|w| *w == b"Person").count();
    assert_eq!(type_name_occurrences, 1);

    let decoded = codec.deserialize(&bytes).expect("deserialize");
    assert_eq!(decoded.len(), 11);
    let managers: HashSet<ObjectId> = decoded
        .root()
        .as_elements()
        .expect("list")
        .iter()
        .map(|v| {
            decoded
                .follow(v.as_object().expect("object"), "manager")
                .expect("manager")
        })
        .collect();
    assert_eq!(managers.len(), 1);
}

#[test]
fn test_unreachable_objects_are_not_sent() {
    let codec = codec();
    let mut graph = ObjectGraph::new();
    let kept = person(&mut graph, &codec, "kept");
    person(&mut graph, &codec, "orphan");
    graph.set_root(kept);

    let decoded = roundtrip(&codec, &graph);
    assert_eq!(decoded.len(), 1);
    let root = decoded.root_object().expect("root");
    assert_eq!(decoded.get_as::<String>(root, "name").expect("name"), "kept");
}

fn chain(codec: &Codec, len: u32) -> ObjectGraph {
    let mut graph = ObjectGraph::new();
    let mut next: Option<ObjectId> = None;
    for seq in (0..len).rev() {
        let link = graph.create(codec.registry(), "Link").expect("link");
        graph.set(link, "seq", seq).expect("seq");
        graph.set(link, "next", next).expect("next");
        next = Some(link);
    }
    graph.set_root(next);
    graph
}

#[test]
fn test_long_chain_with_raised_depth_limit() {
    // A 200-link list needs max_depth >= 200 and a stack to match.
    let handle = std::thread::Builder::new()
        .stack_size(16 << 20)
        .spawn(|| {
            let codec = Codec::with_config(
                Arc::clone(codec().registry()),
                CodecConfig::default().with_max_depth(256),
            );
            let graph = chain(&codec, 200);
            let decoded = roundtrip(&codec, &graph);
            assert_eq!(decoded.len(), 200);

            let mut cursor = decoded.root_object();
            let mut expected = 0u32;
            while let Some(id) = cursor {
                assert_eq!(decoded.get_as::<u32>(id, "seq").expect("seq"), expected);
                expected += 1;
                cursor = decoded.get_as::<Option<ObjectId>>(id, "next").expect("next");
            }
            assert_eq!(expected, 200);
        })
        .expect("spawn");
    handle.join().expect("chain thread");
}

#[test]
fn test_default_depth_limit_bounds_chain_length() {
    let codec = codec();
    let limit = CodecConfig::default().max_depth as u32;
    codec.serialize(&chain(&codec, limit)).expect("chain at the limit");
    assert!(matches!(
        codec.serialize(&chain(&codec, limit + 1)),
        Err(CodecError::LimitExceeded { what: "nesting depth", .. })
    ));
}

#[test]
fn test_chain_past_depth_limit_is_rejected() {
    let codec = Codec::with_config(
        Arc::clone(codec().registry()),
        CodecConfig::default().with_max_depth(32),
    );
    assert!(matches!(
        codec.serialize(&chain(&codec, 40)),
        Err(CodecError::LimitExceeded { what: "nesting depth", .. })
    ));
    codec.serialize(&chain(&codec, 20)).expect("shallow chain");
}

#[test]
fn test_repeated_serialization_is_deterministic() {
    let codec = codec();
    let mut graph = ObjectGraph::new();
    let a = person(&mut graph, &codec, "a");
    let b = person(&mut graph, &codec, "b");
    graph.set(a, "manager", b).expect("a");
    graph.set(b, "manager", a).expect("b");
    graph.set_root(a);

    let first = codec.serialize(&graph).expect("first");
    let second = codec.serialize(&graph).expect("second");
    assert_eq!(first, second);

    // Re-encoding the decoded graph reproduces the stream.
    let decoded = codec.deserialize(&first).expect("decode");
    assert_eq!(codec.serialize(&decoded).expect("again"), first);
}
