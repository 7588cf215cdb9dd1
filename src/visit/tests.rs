// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used)]

use super::*;
use crate::tests::common::build;

const TYPES: &str = r#"
types:
  - name: Pawn
    kind: class
    fields:
      - { name: Stats, type: struct Stats }
      - name: Weapon
        type: object Weapon
        default: { class: Weapon, owned: true }
      - { name: Target, type: object Weapon }
      - { name: Health, type: float }
  - name: Stats
    kind: struct
    fields:
      - { name: Level, type: int }
      - { name: Origin, type: struct Vector }
  - name: Vector
    kind: struct
    fields:
      - { name: X, type: float }
  - name: Weapon
    kind: class
    fields:
      - { name: Ammo, type: int }
    functions:
      - name: ServerFire
        flags: { netServer: true }
        params:
          - { name: Aim, type: struct Vector }
          - { name: Power, type: float }
"#;

fn names(graph: &TypeGraph, policy: RecursionPolicy) -> Vec<String> {
    let mut names = Vec::new();
    graph.visit_properties(graph.root(), policy, |_, property| {
        names.push(property.name().to_string());
        Visit::Descend
    });
    names
}

#[test]
fn structs_only_stays_out_of_objects() {
    let graph = build(TYPES, "Pawn", &[]).unwrap();
    assert_eq!(
        names(&graph, RecursionPolicy::StructsOnly),
        ["Stats", "Level", "Origin", "X", "Weapon", "Target", "Health"]
    );
}

#[test]
fn owned_objects_are_entered_on_request() {
    let graph = build(TYPES, "Pawn", &[]).unwrap();
    assert_eq!(
        names(&graph, RecursionPolicy::StructsAndOwnedObjects),
        ["Stats", "Level", "Origin", "X", "Weapon", "Ammo", "Target", "Health"]
    );
}

#[test]
fn skip_children_prunes_one_subtree() {
    let graph = build(TYPES, "Pawn", &[]).unwrap();
    let mut names = Vec::new();
    graph.visit_properties(
        graph.root(),
        RecursionPolicy::StructsAndOwnedObjects,
        |_, property| {
            names.push(property.name().to_string());
            if property.name() == "Stats" {
                Visit::SkipChildren
            } else {
                Visit::Descend
            }
        },
    );
    assert_eq!(names, ["Stats", "Weapon", "Ammo", "Target", "Health"]);
}

#[test]
fn type_walk_follows_policy() {
    let graph = build(TYPES, "Pawn", &[]).unwrap();
    let types = |policy| {
        let mut types = Vec::new();
        graph.visit_types(graph.root(), policy, |_, node| {
            types.push(node.source_type.to_string());
            Visit::Descend
        });
        types
    };

    assert_eq!(
        types(RecursionPolicy::StructsOnly),
        ["Pawn", "Stats", "Vector"]
    );
    assert_eq!(
        types(RecursionPolicy::StructsAndOwnedObjects),
        ["Pawn", "Stats", "Vector", "Weapon"]
    );
}

#[test]
fn rpc_parameters_share_the_walk() {
    let graph = build(TYPES, "Pawn", &[]).unwrap();
    let weapon = graph
        .property(graph.child_by_name(graph.root(), "Weapon").unwrap())
        .nested_type
        .unwrap();
    let rpc = *graph.ty(weapon).rpcs.values().next().unwrap();

    let mut names = Vec::new();
    graph.visit_rpc_parameters(rpc, RecursionPolicy::StructsOnly, |_, property| {
        names.push(property.name().to_string());
        Visit::Descend
    });
    assert_eq!(names, ["Aim", "X", "Power"]);
}
