// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Tests for geometry-shader output streams: EmitVertex() call sites write
// the scalarized output globals, and the stream parameter itself disappears.

mod common;

use std::rc::Rc;

use pretty_assertions::assert_eq;
use slir::builder::Builder;
use slir::ir::*;
use slir::layout::{LayoutRules, ResourceKind, Stage, TypeLayout, TypeResourceInfo, VarLayout};

struct StreamSetup {
    module: Module,
    func: FuncId,
    emit_vertex: FuncId,
    vertex_type: TypeId,
    param_type: TypeId,
}

// An entry point with an Out<TriangleStream<Vertex>> parameter, where Vertex
// has an SV_Position field and a location-qualified field.
fn make_stream_entry() -> StreamSetup {
    let mut module = Module::new();
    let float4 = module.get_vector_type_id(ScalarType::Float, 4);
    let float2 = module.get_vector_type_id(ScalarType::Float, 2);
    let vertex_type = module.get_struct_type_id(
        Name::new_temp("Vertex"),
        vec![(Name::new_temp("pos"), float4), (Name::new_temp("uv"), float2)],
    );
    let stream_type = module.get_stream_type_id(StreamKind::Triangle, vertex_type);
    let param_type = module.get_out_type_id(stream_type);

    // The intrinsic the stream's Append lowers to.  It has no body; it is
    // identified by its target-intrinsic decoration.
    let emit_vertex = module.add_func(
        Name::new_exact("EmitVertex"),
        vec![param_type, vertex_type],
        TYPE_ID_VOID,
    );
    module.get_func_mut(emit_vertex).decorations.add_target_intrinsic("glsl", "EmitVertex()");

    let mut pos_field = VarLayout::new(common::simple_type_layout(&[]));
    pos_field.system_value_semantic = Some("SV_Position".to_string());
    let mut uv_field =
        VarLayout::new(common::simple_type_layout(&[ResourceKind::VaryingOutput]));
    uv_field.add_resource_info(ResourceKind::VaryingOutput, 0);
    let vertex_layout = Rc::new(TypeLayout::new_struct(
        LayoutRules::Varying,
        &[TypeResourceInfo { kind: ResourceKind::VaryingOutput, count: 1 }],
        vec![Rc::new(pos_field), Rc::new(uv_field)],
    ));
    let mut param_layout = VarLayout::new(Rc::new(TypeLayout::new_stream(
        LayoutRules::Varying,
        &[TypeResourceInfo { kind: ResourceKind::VaryingOutput, count: 1 }],
        vertex_layout,
    )));
    param_layout.add_resource_info(ResourceKind::VaryingOutput, 0);

    let func = common::make_entry_point(
        &mut module,
        Stage::Geometry,
        &[param_type],
        TYPE_ID_VOID,
        vec![Rc::new(param_layout)],
        None,
    );

    StreamSetup { module, func, emit_vertex, vertex_type, param_type }
}

#[test]
fn emit_vertex_calls_write_the_output_globals() {
    let StreamSetup { mut module, func, emit_vertex, vertex_type, param_type } =
        make_stream_entry();
    let param = module.get_func(func).params[0];

    // Two appends: one calling the intrinsic directly, one through a
    // specialize-of-generic wrapper, as the front-end produces for generic
    // stream types.
    let mut builder = Builder::at(func, 0, 0);
    let vertex = builder.emit_undefined(&mut module, vertex_type);
    builder.emit_call(&mut module, Id::Func(emit_vertex), vec![Id::Inst(param), vertex]);
    let generic = builder.emit_generic(&mut module, Id::Func(emit_vertex));
    let specialized = builder.emit_specialize(&mut module, generic, vec![]);
    builder.emit_call(&mut module, specialized, vec![Id::Inst(param), vertex]);
    builder.emit_return_void(&mut module);

    common::legalize(&mut module, func);

    common::assert_fully_legalized(&module, func);
    assert_eq!(
        common::global_descs(&module),
        ["Out<float4> import gl_Position out:0", "Out<float2> out:0"]
    );

    // Each append is preceded by one store per vertex field.
    let ops = common::block_ops(&module, func, 0);
    let call_positions: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter_map(|(index, op)| matches!(op, Op::Call(..)).then_some(index))
        .collect();
    assert_eq!(call_positions.len(), 2);
    for &position in &call_positions {
        assert!(matches!(ops[position - 4], Op::FieldExtract(..)));
        assert!(matches!(ops[position - 3], Op::Store(..)));
        assert!(matches!(ops[position - 2], Op::FieldExtract(..)));
        assert!(matches!(ops[position - 1], Op::Store(..)));
    }
    assert_eq!(common::count_ops(&module, func, |op| matches!(op, Op::Store(..))), 4);

    // The stream argument of both calls is now an undefined value of the
    // stream parameter's type.
    for &position in &call_positions {
        let Op::Call(_, args) = &ops[position] else { unreachable!() };
        let Id::Inst(stream_arg) = args[0] else {
            panic!("expected the stream argument to be an instruction")
        };
        assert!(matches!(module.get_inst(stream_arg).op, Op::Undefined));
        assert_eq!(module.get_inst(stream_arg).type_id, param_type);
    }
}

#[test]
fn stream_without_appends_still_creates_the_varyings() {
    let StreamSetup { mut module, func, .. } = make_stream_entry();

    let mut builder = Builder::at(func, 0, 0);
    builder.emit_return_void(&mut module);

    common::legalize(&mut module, func);

    common::assert_fully_legalized(&module, func);
    assert_eq!(
        common::global_descs(&module),
        ["Out<float4> import gl_Position out:0", "Out<float2> out:0"]
    );
    assert_eq!(common::count_ops(&module, func, |op| matches!(op, Op::Store(..))), 0);
}
