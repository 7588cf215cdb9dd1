// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::{anyhow, Result};
use repschema::*;

const TYPES: &str = r#"
types:
  - name: Character
    kind: class
    fields:
      - { name: Health, type: float }
      - { name: Movement, type: struct RepMovement }
    functions:
      - name: ServerMove
        flags: { netServer: true }
        params:
          - { name: Input, type: struct MoveInput }
    layout:
      - { parent: Health, handle: 1 }
      - { parent: Movement, handle: 2, condition: SimulatedOrPhysics }
  - name: Hero
    kind: class
    base: Character
    fields:
      - { name: Stats, type: struct Stats }
      - name: Backpack
        type: object Container
        default: { class: Backpack, owned: true }
      - { name: OnLevelUp, type: delegate }
    functions:
      - name: ClientReward
        flags: { netClient: true, netReliable: true }
        params:
          - { name: Amount, type: int }
    layout:
      - { parent: Health, handle: 1 }
      - { parent: Movement, handle: 2, condition: SimulatedOrPhysics }
      - { parent: Stats, field: Level, fieldOwner: Stats, handle: 3, condition: OwnerOnly }
      - { parent: Stats, field: Xp, fieldOwner: Stats, handle: 4, condition: OwnerOnly }
  - name: Stats
    kind: struct
    fields:
      - { name: Level, type: int }
      - { name: Xp, type: uint32 }
  - name: RepMovement
    kind: struct
    fields:
      - { name: Location, type: struct Vector }
  - name: Vector
    kind: struct
    fields:
      - { name: X, type: float }
  - name: MoveInput
    kind: struct
    fields:
      - { name: Direction, type: struct Vector_NetQuantize10 }
      - { name: Jump, type: bool }
  - name: Vector_NetQuantize10
    kind: struct
  - name: Container
    kind: class
    fields:
      - { name: Slots, type: array object Item }
  - name: Backpack
    kind: class
    base: Container
    fields:
      - { name: Gold, type: int64 }
    functions:
      - name: ServerSort
        flags: { netServer: true }
    layout:
      - { parent: Gold, handle: 1 }
  - name: Item
    kind: class
"#;

const CONFIG: &str = r#"
classes:
  - class: Hero
    migratable:
      - Health
      - Stats.Xp
      - Backpack.Gold
  - class: Character
"#;

fn compile(database: &TypeDatabase) -> Result<Vec<Rc<TypeGraph>>> {
    let config = GeneratorConfig::from_yaml_str(CONFIG)?;
    SchemaCompiler::from_database(database)
        .compile(&config)
        .map_err(|e| anyhow!("{e}"))
}

#[test]
fn hero_schema() -> Result<()> {
    let database = TypeDatabase::from_yaml_str(TYPES)?;
    let graphs = compile(&database)?;
    let hero = &graphs[0];
    let root = hero.root();

    let groups = hero.replicated_properties(root);
    let group = |group| -> Vec<(u16, String, String)> {
        groups
            .get(group)
            .iter()
            .map(|(handle, r)| {
                let info = hero.property(*r).replication.as_ref().map(|info| info.condition);
                (
                    *handle,
                    hero.dotted_path(*r),
                    info.map(|condition| condition.to_string()).unwrap_or_default(),
                )
            })
            .collect()
    };
    assert_eq!(
        group(ReplicatedGroup::MultiClient),
        [
            (1, "Health".to_string(), "COND_None".to_string()),
            (2, "Movement".to_string(), "COND_SimulatedOrPhysics".to_string()),
        ]
    );
    assert_eq!(
        group(ReplicatedGroup::SingleClient),
        [
            (3, "Stats.Level".to_string(), "COND_OwnerOnly".to_string()),
            (4, "Stats.Xp".to_string(), "COND_OwnerOnly".to_string()),
        ]
    );

    let migratable: Vec<(u16, String, RepLayoutKind)> = hero
        .migratable_properties(root)
        .into_iter()
        .map(|(handle, r)| {
            let property = hero.property(r);
            let kind = property.migration.as_ref().map(|info| info.layout_kind);
            (handle, hero.dotted_path(r), kind.unwrap_or(RepLayoutKind::Generic))
        })
        .collect();
    assert_eq!(
        migratable,
        [
            (1, "Health".to_string(), RepLayoutKind::Float),
            (2, "Stats.Xp".to_string(), RepLayoutKind::UInt32),
            (3, "Backpack.Gold".to_string(), RepLayoutKind::Generic),
        ]
    );

    let rpcs = hero.rpcs_by_direction(root);
    let server: Vec<String> = rpcs
        .get(RpcDirection::Server)
        .iter()
        .map(|r| hero.rpc(*r).function.to_string())
        .collect();
    assert_eq!(server, ["Character::ServerMove", "Backpack::ServerSort"]);

    let server_move = rpcs.get(RpcDirection::Server)[0];
    let parameters: Vec<String> = hero
        .flat_rpc_parameters(server_move)
        .into_iter()
        .map(|r| hero.dotted_path(r))
        .collect();
    assert_eq!(parameters, ["Input.Direction", "Input.Jump"]);

    assert_eq!(
        hero.rpc_type_owners(root),
        [
            TypeId::from("Character"),
            TypeId::from("Hero"),
            TypeId::from("Backpack")
        ]
    );

    let diagnostics: Vec<String> = hero.diagnostics().iter().map(ToString::to_string).collect();
    assert_eq!(
        diagnostics,
        ["Hero: Hero::OnLevelUp - multicast delegate property, skipping"]
    );
    Ok(())
}

#[test]
fn graphs_are_registered() -> Result<()> {
    let database = TypeDatabase::from_yaml_str(TYPES)?;
    let compiler = SchemaCompiler::from_database(&database);
    compiler
        .compile(&GeneratorConfig::from_yaml_str(CONFIG)?)
        .map_err(|e| anyhow!("{e}"))?;

    assert_eq!(
        compiler.compiled_classes(),
        [TypeId::from("Character"), TypeId::from("Hero")]
    );
    let character = compiler
        .graph("Character")
        .ok_or_else(|| anyhow!("Character not registered"))?;
    assert!(character.migratable_properties(character.root()).is_empty());
    assert_eq!(character.replicated_properties(character.root()).len(), 2);
    Ok(())
}

#[test]
fn builder_without_compiler() -> Result<()> {
    let database = TypeDatabase::from_yaml_str(TYPES)?;
    let builder = TypeGraphBuilder::new(&database, &database, &database);
    let graph = builder
        .build(&TypeId::from("Stats"), &[])
        .map_err(|e| anyhow!("{e}"))?;

    assert_eq!(graph.ty(graph.root()).kind, TypeKind::Struct);
    assert_eq!(graph.ty(graph.root()).properties.len(), 2);
    let types: Vec<&str> = graph
        .types()
        .map(|(_, node)| node.source_type.name())
        .collect();
    assert_eq!(types, ["Stats"]);
    assert!(graph.rpcs_by_direction(graph.root()).is_empty());
    Ok(())
}
