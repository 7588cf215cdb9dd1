// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use tracing::info;

use crate::builder::TypeGraphBuilder;
use crate::config::GeneratorConfig;
use crate::error::CompileError;
use crate::graph::TypeGraph;
use crate::layout::LayoutProvider;
use crate::migration::PropertyChain;
use crate::reflection::memory::TypeDatabase;
use crate::reflection::{DefaultValueProvider, ReflectionProvider, TypeId};
use crate::registry::Registry;
use crate::Rc;

/// Builds type graphs for configured classes and keeps the latest graph of
/// each class for later lookup by name.
pub struct SchemaCompiler<'a> {
    builder: TypeGraphBuilder<'a>,
    graphs: Registry<TypeGraph>,
}

impl<'a> SchemaCompiler<'a> {
    pub fn new(
        reflection: &'a dyn ReflectionProvider,
        defaults: &'a dyn DefaultValueProvider,
        layout: &'a dyn LayoutProvider,
    ) -> Self {
        SchemaCompiler {
            builder: TypeGraphBuilder::new(reflection, defaults, layout),
            graphs: Registry::new("TYPE_GRAPH_REGISTRY"),
        }
    }

    pub fn from_database(database: &'a TypeDatabase) -> Self {
        Self::new(database, database, database)
    }

    /// Builds and registers the graph of `class`, replacing any graph
    /// registered for it before.
    pub fn build(
        &self,
        class: &TypeId,
        chains: &[PropertyChain],
    ) -> Result<Rc<TypeGraph>, CompileError> {
        let graph = self
            .builder
            .build(class, chains)
            .map_err(|source| CompileError::Build {
                class: class.clone(),
                source,
            })?;
        let graph = Rc::new(graph);
        self.graphs.insert(class.name(), graph.clone())?;
        Ok(graph)
    }

    /// Compiles every class of `config` in order, stopping at the first
    /// failure.
    pub fn compile(&self, config: &GeneratorConfig) -> Result<Vec<Rc<TypeGraph>>, CompileError> {
        config.validate()?;

        let mut graphs = Vec::with_capacity(config.classes.len());
        for class in &config.classes {
            let graph = self.build(&class.class, &class.migratable)?;
            let root = graph.root();
            let replicated = graph.replicated_properties(root);
            info!(
                class = %class.class,
                types = graph.type_count(),
                replicated = replicated.len(),
                migratable = graph.migratable_properties(root).len(),
                skipped = graph.diagnostics().len(),
                "compiled replication schema"
            );
            graphs.push(graph);
        }
        Ok(graphs)
    }

    /// Latest graph built for the class named `class`.
    pub fn graph(&self, class: &str) -> Option<Rc<TypeGraph>> {
        self.graphs.get(class)
    }

    /// Names of every class with a registered graph, sorted.
    pub fn compiled_classes(&self) -> Vec<TypeId> {
        self.graphs.names().into_iter().map(TypeId::new).collect()
    }
}
