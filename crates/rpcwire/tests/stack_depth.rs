// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Nesting at and past the default depth limit, run on threads with a 2 MiB
// stack (the std default for spawned threads). Reaching the limit must
// succeed and going past it must return an error, never overflow the stack.

use rpcwire::config::DEFAULT_MAX_DEPTH;
use rpcwire::{
    Codec, CodecConfig, CodecError, ObjectGraph, ObjectId, PrimitiveKind, TypeDescriptorBuilder,
    TypeRegistry, Value,
};
use std::sync::Arc;

const SMALL_STACK: usize = 2 << 20;

fn on_small_stack<F>(body: F)
where
    F: FnOnce() + Send + 'static,
{
    std::thread::Builder::new()
        .stack_size(SMALL_STACK)
        .spawn(body)
        .expect("spawn")
        .join()
        .expect("worker thread");
}

fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry
        .register(
            TypeDescriptorBuilder::new("Link")
                .field("seq", PrimitiveKind::U32)
                .object_field("next", "Link")
                .build(),
        )
        .expect("link");
    Arc::new(registry)
}

/// `[version, (list of one) x levels, null]`
fn nested_list_stream(levels: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 * levels + 2);
    bytes.push(1);
    for _ in 0..levels {
        bytes.extend_from_slice(&[18, 1]);
    }
    bytes.push(0);
    bytes
}

fn chain(registry: &TypeRegistry, len: usize) -> ObjectGraph {
    let mut graph = ObjectGraph::new();
    let mut next: Option<ObjectId> = None;
    for seq in (0..len).rev() {
        let link = graph.create(registry, "Link").expect("link");
        graph.set(link, "seq", seq as u32).expect("seq");
        graph.set(link, "next", next).expect("next");
        next = Some(link);
    }
    graph.set_root(next);
    graph
}

#[test]
fn test_nested_lists_at_default_limit() {
    on_small_stack(|| {
        let codec = Codec::new(registry());
        let decoded = codec
            .deserialize(&nested_list_stream(DEFAULT_MAX_DEPTH))
            .expect("nesting at the limit");

        let mut value = decoded.root();
        let mut levels = 0;
        while let Some(items) = value.as_elements() {
            value = &items[0];
            levels += 1;
        }
        assert_eq!(levels, DEFAULT_MAX_DEPTH);
        assert_eq!(value, &Value::Null);

        assert!(matches!(
            codec.deserialize(&nested_list_stream(DEFAULT_MAX_DEPTH + 1)),
            Err(CodecError::MalformedStream { .. })
        ));
    });
}

#[test]
fn test_hostile_nesting_is_rejected() {
    on_small_stack(|| {
        let codec = Codec::new(registry());
        for levels in [250, 10_000, 200_000] {
            assert!(matches!(
                codec.deserialize(&nested_list_stream(levels)),
                Err(CodecError::MalformedStream { .. })
            ));
        }
    });
}

#[test]
fn test_mixed_collections_at_default_limit() {
    on_small_stack(|| {
        let codec = Codec::new(registry());
        let mut value = Value::Null;
        for level in 0..DEFAULT_MAX_DEPTH {
            value = if level % 2 == 0 {
                Value::List(vec![value])
            } else {
                Value::Map(vec![(Value::I32(level as i32), value)])
            };
        }
        let graph = ObjectGraph::with_root(value);
        let bytes = codec.serialize(&graph).expect("serialize at the limit");
        let decoded = codec.deserialize(&bytes).expect("deserialize at the limit");
        assert!(graph.equivalent(&decoded));

        let too_deep = ObjectGraph::with_root(Value::List(vec![graph.root().clone()]));
        assert!(matches!(
            codec.serialize(&too_deep),
            Err(CodecError::LimitExceeded { what: "nesting depth", .. })
        ));
    });
}

#[test]
fn test_object_chain_at_default_limit() {
    on_small_stack(|| {
        let registry = registry();
        let codec = Codec::new(Arc::clone(&registry));

        let graph = chain(&registry, DEFAULT_MAX_DEPTH);
        let bytes = codec.serialize(&graph).expect("serialize at the limit");
        let decoded = codec.deserialize(&bytes).expect("deserialize at the limit");
        assert_eq!(decoded.len(), DEFAULT_MAX_DEPTH);
        assert!(graph.equivalent(&decoded));

        let longer = chain(&registry, DEFAULT_MAX_DEPTH + 1);
        assert!(matches!(
            codec.serialize(&longer),
            Err(CodecError::LimitExceeded { what: "nesting depth", .. })
        ));

        // Written by a peer with a higher limit, refused by the default one.
        let lenient = Codec::with_config(
            Arc::clone(&registry),
            CodecConfig::default().with_max_depth(DEFAULT_MAX_DEPTH + 1),
        );
        let bytes = lenient.serialize(&longer).expect("lenient serialize");
        assert!(matches!(
            codec.deserialize(&bytes),
            Err(CodecError::MalformedStream { .. })
        ));
    });
}
