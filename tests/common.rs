// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Shared helpers for the integration tests: building entry points with
// hand-written layouts, running the legalization, and describing the
// resulting global parameters.
#![allow(dead_code)]

use std::rc::Rc;

use slir::debug;
use slir::diagnostics::DiagnosticSink;
use slir::extensions::ExtensionTracker;
use slir::ir::*;
use slir::layout::*;
use slir::transform::legalize_entry_points;
use slir::validator;

// A type layout for a leaf varying: one slot per requested kind.
pub fn simple_type_layout(kinds: &[ResourceKind]) -> Rc<TypeLayout> {
    let resources: Vec<TypeResourceInfo> =
        kinds.iter().map(|&kind| TypeResourceInfo { kind, count: 1 }).collect();
    Rc::new(TypeLayout::new_simple(LayoutRules::Varying, &resources))
}

// A var layout for a leaf varying at the given slots.
pub fn simple_var_layout(bindings: &[(ResourceKind, u32)]) -> VarLayout {
    let kinds: Vec<ResourceKind> = bindings.iter().map(|&(kind, _)| kind).collect();
    let mut layout = VarLayout::new(simple_type_layout(&kinds));
    for &(kind, index) in bindings {
        layout.add_resource_info(kind, index);
    }
    layout
}

// Mirror a type as a layout tree, assigning every leaf one slot of each
// requested kind and giving struct fields consecutive offsets, the way the
// real layout stage numbers varyings.
pub fn mirror_type_layout(
    module: &Module,
    type_id: TypeId,
    kinds: &[ResourceKind],
) -> Rc<TypeLayout> {
    match module.get_type(type_id) {
        Type::Struct(_, fields) => {
            let field_types: Vec<TypeId> = fields.iter().map(|field| field.type_id).collect();
            let mut offsets: Vec<(ResourceKind, u32)> =
                kinds.iter().map(|&kind| (kind, 0)).collect();
            let mut field_layouts = Vec::with_capacity(field_types.len());
            for field_type in field_types {
                let child = mirror_type_layout(module, field_type, kinds);
                let mut var = VarLayout::new(Rc::clone(&child));
                for (kind, offset) in offsets.iter_mut() {
                    var.add_resource_info(*kind, *offset);
                    *offset += child.find_resource_info(*kind).map_or(0, |info| info.count);
                }
                field_layouts.push(Rc::new(var));
            }
            let resources: Vec<TypeResourceInfo> = offsets
                .into_iter()
                .map(|(kind, count)| TypeResourceInfo { kind, count })
                .collect();
            Rc::new(TypeLayout::new_struct(LayoutRules::Varying, &resources, field_layouts))
        }
        &Type::Array(element_type, count) => {
            let element = mirror_type_layout(module, element_type, kinds);
            let resources: Vec<TypeResourceInfo> = element
                .resources
                .iter()
                .map(|info| TypeResourceInfo { kind: info.kind, count: info.count * count })
                .collect();
            Rc::new(TypeLayout::new_array(LayoutRules::Varying, &resources, element))
        }
        &Type::Stream(_, element_type) => {
            let element = mirror_type_layout(module, element_type, kinds);
            let resources: Vec<TypeResourceInfo> = element.resources.to_vec();
            Rc::new(TypeLayout::new_stream(LayoutRules::Varying, &resources, element))
        }
        _ => simple_type_layout(kinds),
    }
}

// A var layout mirroring a whole aggregate at the given starting slots.
pub fn aggregate_var_layout(
    module: &Module,
    type_id: TypeId,
    bindings: &[(ResourceKind, u32)],
) -> VarLayout {
    let kinds: Vec<ResourceKind> = bindings.iter().map(|&(kind, _)| kind).collect();
    let mut layout = VarLayout::new(mirror_type_layout(module, type_id, &kinds));
    for &(kind, index) in bindings {
        layout.add_resource_info(kind, index);
    }
    layout
}

// Create an entry-point function with an empty entry block and its layout
// decoration attached.  The caller fills the body and terminates it.
pub fn make_entry_point(
    module: &mut Module,
    stage: Stage,
    param_types: &[TypeId],
    return_type: TypeId,
    param_layouts: Vec<Rc<VarLayout>>,
    result_layout: Option<Rc<VarLayout>>,
) -> FuncId {
    let func = module.add_func(Name::new_exact("main"), param_types.to_vec(), return_type);
    let layout = EntryPointLayout {
        name: "main".to_string(),
        stage,
        params: param_layouts,
        result: result_layout,
    };
    module.get_func_mut(func).decorations.add_entry_point(Rc::new(layout));
    module.get_func_mut(func).blocks.push(Block::new());
    func
}

pub fn add_block(module: &mut Module, func: FuncId) -> BlockId {
    let blocks = &mut module.get_func_mut(func).blocks;
    let id = BlockId { id: blocks.len() as u32 };
    blocks.push(Block::new());
    id
}

// Run the legalization over the function and validate the result.
pub fn legalize(module: &mut Module, func: FuncId) -> (DiagnosticSink, ExtensionTracker) {
    let mut sink = DiagnosticSink::new();
    let mut extensions = ExtensionTracker::new();
    legalize_entry_points::run(module, func, &mut sink, &mut extensions);
    validator::validate_module(module);
    (sink, extensions)
}

pub fn global_id(index: usize) -> GlobalParamId {
    GlobalParamId { id: index as u32 }
}

// One line per global parameter: its type, its built-in binding if any, and
// its layout slots.  Tests compare against these strings wholesale.
pub fn global_descs(module: &Module) -> Vec<String> {
    module
        .all_global_params()
        .iter()
        .map(|global| {
            let mut desc = debug::type_str(module, global.type_id);
            if let Some(name) = global.decorations.find_import_name() {
                desc.push_str(&format!(" import {}", name));
            }
            if let Some(name) = global.decorations.find_glsl_outer_array() {
                desc.push_str(&format!(" outer {}", name));
            }
            if let Some(layout) = global.decorations.find_layout() {
                for info in &layout.resource_infos {
                    let kind = match info.kind {
                        ResourceKind::VaryingInput => "in",
                        ResourceKind::VaryingOutput => "out",
                    };
                    desc.push_str(&format!(" {}:{}", kind, info.index));
                }
            }
            desc
        })
        .collect()
}

pub fn find_global_with_import(module: &Module, name: &str) -> Option<GlobalParamId> {
    (0..module.all_global_params().len()).map(global_id).find(|&id| {
        module
            .get_global_param(id)
            .decorations
            .find_import_name()
            .map_or(false, |import| import == name)
    })
}

// The opcodes of one block, cloned in order.
pub fn block_ops(module: &Module, func: FuncId, block: usize) -> Vec<Op> {
    module.get_func(func).blocks[block]
        .insts
        .iter()
        .map(|&inst_id| module.get_inst(inst_id).op.clone())
        .collect()
}

// Count the instructions of a whole function matching a predicate.
pub fn count_ops<Pred>(module: &Module, func: FuncId, pred: Pred) -> usize
where
    Pred: Fn(&Op) -> bool,
{
    module
        .get_func(func)
        .blocks
        .iter()
        .flat_map(|block| block.insts.iter())
        .filter(|&&inst_id| pred(&module.get_inst(inst_id).op))
        .count()
}

// The function has been fully rewritten: no parameters, `() -> void`, and
// no value-returning terminator anywhere.
pub fn assert_fully_legalized(module: &Module, func: FuncId) {
    assert!(module.get_func(func).params.is_empty());
    match module.get_type(module.get_func(func).type_id) {
        Type::Func(params, return_type) => {
            assert!(params.is_empty());
            assert_eq!(*return_type, TYPE_ID_VOID);
        }
        _ => panic!("entry point lost its function type"),
    }
    assert_eq!(count_ops(module, func, |op| matches!(op, Op::ReturnVal(_))), 0);
}
