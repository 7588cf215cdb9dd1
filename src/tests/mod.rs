// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

pub mod common;
mod type_graph;
