use std::time::Instant;
use vd_core::{Insets, LayoutSnapshot, Node, NodeId, NodeType, Point, SceneStore, ViewTransform};

/// 500 top-level frames, each holding a frame that holds three texts.
fn large_scene() -> SceneStore {
    let mut nodes = Vec::new();
    for i in 0..500 {
        let x = (i % 25) as f32 * 400.0;
        let y = (i / 25) as f32 * 400.0;
        let outer = format!("pf_{i}");
        let inner = format!("pf_{i}_inner");
        nodes.push(
            Node::builder(NodeType::Frame)
                .id(&outer)
                .absolute(Insets::new(x, y, 10_000.0 - x - 380.0, 10_000.0 - y - 380.0))
                .build()
                .expect("frame"),
        );
        nodes.push(
            Node::builder(NodeType::Frame)
                .id(&inner)
                .parent(NodeId::intern(&outer), 0)
                .absolute(Insets::new(10.0, 10.0, 10.0, 10.0))
                .build()
                .expect("inner frame"),
        );
        for t in 0..3 {
            nodes.push(
                Node::builder(NodeType::Text)
                    .id(&format!("pf_{i}_text_{t}"))
                    .parent(NodeId::intern(&inner), 1)
                    .absolute(Insets::new(10.0, 10.0 + 50.0 * t as f32, 10.0, 250.0 - 50.0 * t as f32))
                    .build()
                    .expect("text"),
            );
        }
    }
    let mut store = SceneStore::new();
    store.add(nodes).expect("add");
    store
}

#[test]
#[ignore] // Run manually with `cargo test --test perf_benchmark -- --nocapture --ignored`
fn benchmark_hierarchy_queries() {
    let start = Instant::now();
    let store = large_scene();
    println!("Built {} nodes in {:?}", store.len(), start.elapsed());

    let start = Instant::now();
    let layout = LayoutSnapshot::resolve(&store, &ViewTransform::default());
    println!("Resolved layout in {:?}", start.elapsed());

    let start = Instant::now();
    let mut chain_len = 0;
    for node in store.nodes() {
        chain_len += store.ancestors_of(node.id).map_or(0, |c| c.len());
    }
    println!("ancestors_of x{} in {:?} ({chain_len} links)", store.len(), start.elapsed());

    let start = Instant::now();
    let mut resolved = 0;
    for i in 0..100 {
        let p = Point::new((i % 25) as f32 * 400.0 + 30.0, (i / 25) as f32 * 400.0 + 30.0);
        let hits = layout.hits(&store, p);
        if store.overlap_target(&hits).is_some() {
            resolved += 1;
        }
    }
    println!("100 hit resolutions in {:?}", start.elapsed());
    assert_eq!(resolved, 100);
}
