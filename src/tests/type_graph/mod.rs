// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![allow(clippy::unwrap_used, clippy::pattern_type_mismatch)]

use crate::builder::TypeGraphBuilder;
use crate::graph::{TypeGraph, TypeRef};
use crate::migration::PropertyChain;
use crate::reflection::memory::{TypeDatabase, TypeSpec};
use crate::reflection::{RpcDirection, TypeId};
use crate::views::ReplicatedGroup;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use test_generator::test_resources;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlTest {
    cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TestCase {
    note: String,
    types: Vec<TypeSpec>,
    root: String,
    #[serde(default)]
    migratable: Vec<PropertyChain>,

    /// Rendered property tree, two spaces per nesting level.
    #[serde(default)]
    tree: Option<Vec<String>>,
    /// Group name -> handle -> dotted path.
    #[serde(default)]
    replicated: Option<BTreeMap<String, BTreeMap<u16, String>>>,
    /// Handle -> dotted path.
    #[serde(default)]
    migrated: Option<BTreeMap<u16, String>>,
    /// Direction name -> RPCs as `Owner::Name`.
    #[serde(default)]
    rpcs: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    rpc_owners: Option<Vec<String>>,
    /// RPC -> dotted paths of its flattened parameters.
    #[serde(default)]
    rpc_parameters: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    diagnostics: Option<Vec<String>>,

    #[serde(default)]
    error: Option<String>,
}

fn render_tree(graph: &TypeGraph, ty: TypeRef, depth: usize, lines: &mut Vec<String>) {
    for r in graph.ty(ty).properties.values() {
        let property = graph.property(*r);
        let mut line = format!("{}{}: {}", "  ".repeat(depth), property.name(), property.field.ty);
        if let Some(replication) = &property.replication {
            line.push_str(&format!(" rep={}", replication.handle));
        }
        if let Some(migration) = &property.migration {
            line.push_str(&format!(" mig={}", migration.handle));
        }
        match property.nested_type {
            Some(nested) => {
                if property.field.ty.is_object() {
                    line.push_str(&format!(" => {}", graph.ty(nested).source_type));
                }
                lines.push(line);
                render_tree(graph, nested, depth + 1, lines);
            }
            None => lines.push(line),
        }
    }
}

fn check_views(case: &TestCase, graph: &TypeGraph) -> Result<()> {
    let root = graph.root();

    if let Some(expected) = &case.tree {
        let mut actual = Vec::new();
        render_tree(graph, root, 0, &mut actual);
        if &actual != expected {
            bail!("tree mismatch\nexpected: {expected:#?}\nactual: {actual:#?}");
        }
    }

    if let Some(expected) = &case.replicated {
        let groups = graph.replicated_properties(root);
        let mut actual = BTreeMap::new();
        for group in ReplicatedGroup::ALL {
            let properties = groups.get(group);
            if !properties.is_empty() {
                let paths = properties
                    .iter()
                    .map(|(handle, r)| (*handle, graph.dotted_path(*r)))
                    .collect::<BTreeMap<_, _>>();
                actual.insert(group.name().to_string(), paths);
            }
        }
        if &actual != expected {
            bail!("replicated view mismatch\nexpected: {expected:#?}\nactual: {actual:#?}");
        }
    }

    if let Some(expected) = &case.migrated {
        let actual = graph
            .migratable_properties(root)
            .into_iter()
            .map(|(handle, r)| (handle, graph.dotted_path(r)))
            .collect::<BTreeMap<_, _>>();
        if &actual != expected {
            bail!("migratable view mismatch\nexpected: {expected:#?}\nactual: {actual:#?}");
        }
    }

    let by_direction = graph.rpcs_by_direction(root);
    if let Some(expected) = &case.rpcs {
        let mut actual = BTreeMap::new();
        for direction in RpcDirection::ALL {
            let rpcs = by_direction.get(direction);
            if !rpcs.is_empty() {
                let names = rpcs
                    .iter()
                    .map(|r| graph.rpc(*r).function.to_string())
                    .collect::<Vec<_>>();
                actual.insert(direction.name().to_string(), names);
            }
        }
        if &actual != expected {
            bail!("rpc view mismatch\nexpected: {expected:#?}\nactual: {actual:#?}");
        }
    }

    if let Some(expected) = &case.rpc_owners {
        let actual = graph
            .rpc_type_owners(root)
            .iter()
            .map(|owner| owner.to_string())
            .collect::<Vec<_>>();
        if &actual != expected {
            bail!("rpc owners mismatch\nexpected: {expected:?}\nactual: {actual:?}");
        }
    }

    if let Some(expected) = &case.rpc_parameters {
        for (function, parameters) in expected {
            let rpc = RpcDirection::ALL
                .iter()
                .flat_map(|direction| by_direction.get(*direction).iter().copied())
                .find(|r| graph.rpc(*r).function.to_string() == *function)
                .with_context(|| format!("rpc `{function}` not found"))?;
            let actual = graph
                .flat_rpc_parameters(rpc)
                .into_iter()
                .map(|r| graph.dotted_path(r))
                .collect::<Vec<_>>();
            if &actual != parameters {
                bail!("parameters of `{function}`\nexpected: {parameters:?}\nactual: {actual:?}");
            }
        }
    }

    if let Some(expected) = &case.diagnostics {
        let actual = graph
            .diagnostics()
            .iter()
            .map(|diagnostic| diagnostic.to_string())
            .collect::<Vec<_>>();
        if &actual != expected {
            bail!("diagnostics mismatch\nexpected: {expected:#?}\nactual: {actual:#?}");
        }
    }

    Ok(())
}

fn run_case(case: &TestCase) -> Result<()> {
    let database = TypeDatabase::new(case.types.clone()).map_err(|e| anyhow!("{e}"))?;
    let builder = TypeGraphBuilder::new(&database, &database, &database);

    match (builder.build(&TypeId::from(case.root.as_str()), &case.migratable), &case.error) {
        (Ok(graph), None) => check_views(case, &graph),
        (Ok(_), Some(expected)) => bail!("build succeeded, expected error `{expected}`"),
        (Err(actual), Some(expected)) => {
            let actual = actual.to_string();
            if !actual.contains(expected.as_str()) {
                bail!("error mismatch\nexpected: {expected}\nactual: {actual}");
            }
            Ok(())
        }
        (Err(actual), None) => bail!("build failed: {actual}"),
    }
}

fn yaml_test(path: &str) -> Result<()> {
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read yaml test file {path}"))?;
    let test: YamlTest = serde_yaml::from_str(&yaml)
        .with_context(|| format!("failed to parse yaml test file {path}"))?;

    for case in &test.cases {
        print!("{:50}", case.note);
        run_case(case).with_context(|| format!("case `{}`", case.note))?;
        println!(" passed");
    }

    Ok(())
}

#[test_resources("tests/type_graph/**/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}
