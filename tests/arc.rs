// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(feature = "arc")]
#![allow(clippy::expect_used)]

use lazy_static::lazy_static;
use std::sync::Mutex;
use std::thread;

use repschema::*;

const TYPES: &str = r#"
types:
  - name: Pawn
    kind: class
    fields:
      - { name: Health, type: float }
    layout:
      - { parent: Health, handle: 1 }
"#;

// Ensure that graphs can be shared across threads.
lazy_static! {
    static ref DATABASE: TypeDatabase = TypeDatabase::from_yaml_str(TYPES).expect("invalid types");
    static ref GRAPHS: Mutex<Vec<Rc<TypeGraph>>> = Mutex::new(Vec::new());
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn graphs_are_send_and_sync() {
    assert_send_sync::<TypeGraph>();
    assert_send_sync::<Rc<TypeGraph>>();
    assert_send_sync::<TypeDatabase>();
}

#[test]
fn shared_graph() -> anyhow::Result<()> {
    let compiler = SchemaCompiler::from_database(&DATABASE);
    let graph = compiler
        .build(&TypeId::from("Pawn"), &[])
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let graph = graph.clone();
            thread::spawn(move || graph.replicated_properties(graph.root()).len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread panicked"), 1);
    }

    GRAPHS.lock().expect("failed to lock graphs").push(graph);
    Ok(())
}
