// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Flat replication layouts, as computed by the external layout system.
//!
//! A layout lists one command per replicated scalar. Root-level properties
//! map 1:1 to commands, except for structs without a whole-struct serializer:
//! those are expanded into one command per leaf field, and every such command
//! still names the root property as its parent.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::RepLayoutKind;
use crate::reflection::{FieldId, ReflectionError, TypeId};

/// Condition under which a replicated property is sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifetimeCondition {
    #[default]
    None,
    InitialOnly,
    OwnerOnly,
    SkipOwner,
    SimulatedOnly,
    AutonomousOnly,
    SimulatedOrPhysics,
    InitialOrOwner,
    Custom,
    ReplayOrOwner,
    ReplayOnly,
    SimulatedOnlyNoReplay,
    SimulatedOrPhysicsNoReplay,
    SkipReplay,
    Never,
}

impl LifetimeCondition {
    pub fn name(self) -> &'static str {
        match self {
            LifetimeCondition::None => "COND_None",
            LifetimeCondition::InitialOnly => "COND_InitialOnly",
            LifetimeCondition::OwnerOnly => "COND_OwnerOnly",
            LifetimeCondition::SkipOwner => "COND_SkipOwner",
            LifetimeCondition::SimulatedOnly => "COND_SimulatedOnly",
            LifetimeCondition::AutonomousOnly => "COND_AutonomousOnly",
            LifetimeCondition::SimulatedOrPhysics => "COND_SimulatedOrPhysics",
            LifetimeCondition::InitialOrOwner => "COND_InitialOrOwner",
            LifetimeCondition::Custom => "COND_Custom",
            LifetimeCondition::ReplayOrOwner => "COND_ReplayOrOwner",
            LifetimeCondition::ReplayOnly => "COND_ReplayOnly",
            LifetimeCondition::SimulatedOnlyNoReplay => "COND_SimulatedOnlyNoReplay",
            LifetimeCondition::SimulatedOrPhysicsNoReplay => "COND_SimulatedOrPhysicsNoReplay",
            LifetimeCondition::SkipReplay => "COND_SkipReplay",
            LifetimeCondition::Never => "COND_Never",
        }
    }

    /// True for conditions that deliver to a single client only.
    pub fn is_single_recipient(self) -> bool {
        matches!(
            self,
            LifetimeCondition::AutonomousOnly | LifetimeCondition::OwnerOnly
        )
    }
}

impl fmt::Display for LifetimeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// When change notifications fire for a replicated property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepNotifyCondition {
    #[default]
    OnChanged,
    Always,
}

impl RepNotifyCondition {
    pub fn name(self) -> &'static str {
        match self {
            RepNotifyCondition::OnChanged => "REPNOTIFY_OnChanged",
            RepNotifyCondition::Always => "REPNOTIFY_Always",
        }
    }
}

impl fmt::Display for RepNotifyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of a flat replication layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatCommand {
    /// Root-level property this command belongs to.
    pub parent: FieldId,
    /// Property replicated by this command. `None` for commands without a
    /// backing field.
    pub field: Option<FieldId>,
    /// Wire kind decided by the layout system, when it names one.
    pub kind: Option<RepLayoutKind>,
    pub condition: LifetimeCondition,
    pub notify: RepNotifyCondition,
    pub handle: u16,
    /// Handle of the paired role property, if this is a role property.
    pub role_swap_handle: Option<u16>,
    /// For array markers, the number of commands after the marker that
    /// belong to the array, terminator included.
    pub array_span: usize,
}

impl FlatCommand {
    pub fn is_return(&self) -> bool {
        self.kind == Some(RepLayoutKind::Return)
    }

    pub fn is_array_marker(&self) -> bool {
        self.kind == Some(RepLayoutKind::DynamicArray)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplicationLayout {
    pub commands: Vec<FlatCommand>,
}

/// Computes the flat replication layout of a class.
pub trait LayoutProvider {
    fn compute_layout(&self, class: &TypeId) -> Result<ReplicationLayout, ReflectionError>;
}
