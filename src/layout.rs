// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Layout metadata assigned by an earlier stage of the compiler: binding
// indices, semantic names and resource usage for variables and their fields.
// The transformations consume these tables; computing them is not this
// crate's job.

use std::rc::Rc;

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::diagnostics::SourceLoc;

// The pipeline stage an entry point executes in.
#[derive(Copy, Clone, Eq, PartialEq)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum Stage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Fragment,
    Compute,
    RayGeneration,
    Intersection,
    AnyHit,
    ClosestHit,
    Miss,
    Callable,
}

impl Stage {
    // Ray-tracing stages keep their aggregate payloads intact; the varying
    // scalarization model does not apply to them.
    pub fn is_ray_tracing(&self) -> bool {
        matches!(
            self,
            Stage::RayGeneration
                | Stage::Intersection
                | Stage::AnyHit
                | Stage::ClosestHit
                | Stage::Miss
                | Stage::Callable
        )
    }
}

// The kinds of resources a variable can consume.  A varying `inout` parameter
// consumes both an input and an output slot, so a variable carries a table of
// these rather than a single entry.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum ResourceKind {
    VaryingInput,
    VaryingOutput,
}

// Packing rules a type layout was computed under.
#[derive(Copy, Clone, Eq, PartialEq)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum LayoutRules {
    Varying,
    Std140,
    Std430,
}

bitflags! {
    // Interpolation qualifiers recorded on a varying; carried through
    // unchanged when the varying is split into its leaves.
    #[derive(Copy, Clone, Eq, PartialEq)]
    #[cfg_attr(debug_assertions, derive(Debug))]
    pub struct VarLayoutFlags: u32 {
        const FLAT           = 1 << 0;
        const NO_PERSPECTIVE = 1 << 1;
        const CENTROID       = 1 << 2;
        const SAMPLE         = 1 << 3;
    }
}

// How many slots of a given kind a type consumes.
#[derive(Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct TypeResourceInfo {
    pub kind: ResourceKind,
    pub count: u32,
}

// Which slot of a given kind a variable (or field) starts at.
#[derive(Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct VarResourceInfo {
    pub kind: ResourceKind,
    pub index: u32,
}

// The layout of a type, mirroring the type tree.
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum TypeLayoutKind {
    Simple,
    Array { element: Rc<TypeLayout> },
    Stream { element: Rc<TypeLayout> },
    Struct { fields: Vec<Rc<VarLayout>> },
}

#[cfg_attr(debug_assertions, derive(Debug))]
pub struct TypeLayout {
    pub rules: LayoutRules,
    pub resources: SmallVec<[TypeResourceInfo; 2]>,
    pub kind: TypeLayoutKind,
}

impl TypeLayout {
    pub fn new_simple(rules: LayoutRules, resources: &[TypeResourceInfo]) -> TypeLayout {
        TypeLayout { rules, resources: SmallVec::from_slice(resources), kind: TypeLayoutKind::Simple }
    }

    pub fn new_array(
        rules: LayoutRules,
        resources: &[TypeResourceInfo],
        element: Rc<TypeLayout>,
    ) -> TypeLayout {
        TypeLayout {
            rules,
            resources: SmallVec::from_slice(resources),
            kind: TypeLayoutKind::Array { element },
        }
    }

    pub fn new_stream(
        rules: LayoutRules,
        resources: &[TypeResourceInfo],
        element: Rc<TypeLayout>,
    ) -> TypeLayout {
        TypeLayout {
            rules,
            resources: SmallVec::from_slice(resources),
            kind: TypeLayoutKind::Stream { element },
        }
    }

    pub fn new_struct(
        rules: LayoutRules,
        resources: &[TypeResourceInfo],
        fields: Vec<Rc<VarLayout>>,
    ) -> TypeLayout {
        TypeLayout {
            rules,
            resources: SmallVec::from_slice(resources),
            kind: TypeLayoutKind::Struct { fields },
        }
    }

    pub fn find_resource_info(&self, kind: ResourceKind) -> Option<&TypeResourceInfo> {
        self.resources.iter().find(|info| info.kind == kind)
    }

    pub fn get_array_element(&self) -> &Rc<TypeLayout> {
        match &self.kind {
            TypeLayoutKind::Array { element } => element,
            _ => panic!("Internal error: Expected array type layout"),
        }
    }

    pub fn get_stream_element(&self) -> &Rc<TypeLayout> {
        match &self.kind {
            TypeLayoutKind::Stream { element } => element,
            _ => panic!("Internal error: Expected stream type layout"),
        }
    }

    pub fn get_struct_fields(&self) -> &Vec<Rc<VarLayout>> {
        match &self.kind {
            TypeLayoutKind::Struct { fields } => fields,
            _ => panic!("Internal error: Expected struct type layout"),
        }
    }
}

// The layout of one variable, parameter or field: its semantics, where it
// came from, and which slot of each resource kind it occupies.
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct VarLayout {
    pub loc: SourceLoc,
    // A user semantic such as `TEXCOORD`, with its index.
    pub semantic_name: Option<String>,
    pub semantic_index: u32,
    // A system-value semantic such as `SV_Position`, with its index.
    pub system_value_semantic: Option<String>,
    pub system_value_semantic_index: u32,
    pub stage: Option<Stage>,
    pub flags: VarLayoutFlags,
    pub type_layout: Rc<TypeLayout>,
    pub resource_infos: SmallVec<[VarResourceInfo; 2]>,
}

impl VarLayout {
    pub fn new(type_layout: Rc<TypeLayout>) -> VarLayout {
        VarLayout {
            loc: SourceLoc::UNKNOWN,
            semantic_name: None,
            semantic_index: 0,
            system_value_semantic: None,
            system_value_semantic_index: 0,
            stage: None,
            flags: VarLayoutFlags::empty(),
            type_layout,
            resource_infos: SmallVec::new(),
        }
    }

    pub fn add_resource_info(&mut self, kind: ResourceKind, index: u32) {
        debug_assert!(self.find_resource_info(kind).is_none());
        self.resource_infos.push(VarResourceInfo { kind, index });
    }

    pub fn find_resource_info(&self, kind: ResourceKind) -> Option<&VarResourceInfo> {
        self.resource_infos.iter().find(|info| info.kind == kind)
    }

    // The starting slot for the given kind; variables that don't consume the
    // kind start at zero.
    pub fn resource_index(&self, kind: ResourceKind) -> u32 {
        self.find_resource_info(kind).map_or(0, |info| info.index)
    }
}

// The layout of an entry point: its stage, one layout per parameter in
// declaration order, and the layout of the return value if there is one.
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct EntryPointLayout {
    pub name: String,
    pub stage: Stage,
    pub params: Vec<Rc<VarLayout>>,
    pub result: Option<Rc<VarLayout>>,
}
