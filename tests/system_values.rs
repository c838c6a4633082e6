// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Tests for the system-value semantic table: built-in names, outer arrays,
// required types with their conversions, and extension/version side-effects.

mod common;

use std::rc::Rc;

use pretty_assertions::assert_eq;
use slir::builder::Builder;
use slir::diagnostics::DiagnosticSink;
use slir::extensions::{ExtensionTracker, ProfileVersion};
use slir::ir::*;
use slir::layout::{ResourceKind, Stage};

// The user-declared type of a varying under test.
#[derive(Copy, Clone)]
enum Ty {
    Float,
    Int,
    Uint,
    Bool,
    Float3,
    Float4,
    Uint3,
    FloatArr4,
}

fn make_type(module: &mut Module, ty: Ty) -> TypeId {
    match ty {
        Ty::Float => TYPE_ID_FLOAT,
        Ty::Int => TYPE_ID_INT,
        Ty::Uint => TYPE_ID_UINT,
        Ty::Bool => TYPE_ID_BOOL,
        Ty::Float3 => module.get_vector_type_id(ScalarType::Float, 3),
        Ty::Float4 => module.get_vector_type_id(ScalarType::Float, 4),
        Ty::Uint3 => module.get_vector_type_id(ScalarType::Uint, 3),
        Ty::FloatArr4 => module.get_array_type_id(TYPE_ID_FLOAT, 4),
    }
}

// Legalize an entry point with a single unused input parameter carrying the
// given semantic.
fn legalize_input(
    stage: Stage,
    semantic: &str,
    ty: Ty,
) -> (Module, FuncId, DiagnosticSink, ExtensionTracker) {
    let mut module = Module::new();
    let type_id = make_type(&mut module, ty);

    let mut layout = common::simple_var_layout(&[(ResourceKind::VaryingInput, 0)]);
    layout.system_value_semantic = Some(semantic.to_string());

    let func = common::make_entry_point(
        &mut module,
        stage,
        &[type_id],
        TYPE_ID_VOID,
        vec![Rc::new(layout)],
        None,
    );
    let mut builder = Builder::at(func, 0, 0);
    builder.emit_return_void(&mut module);

    let (sink, extensions) = common::legalize(&mut module, func);
    (module, func, sink, extensions)
}

// Legalize an entry point whose return value carries the given semantic.
fn legalize_output(
    stage: Stage,
    semantic: &str,
    ty: Ty,
) -> (Module, FuncId, DiagnosticSink, ExtensionTracker) {
    let mut module = Module::new();
    let type_id = make_type(&mut module, ty);

    let mut layout = common::simple_var_layout(&[(ResourceKind::VaryingOutput, 0)]);
    layout.system_value_semantic = Some(semantic.to_string());

    let func = common::make_entry_point(
        &mut module,
        stage,
        &[],
        type_id,
        vec![],
        Some(Rc::new(layout)),
    );
    let mut builder = Builder::at(func, 0, 0);
    let value = builder.emit_undefined(&mut module, type_id);
    builder.emit_return_val(&mut module, value);

    let (sink, extensions) = common::legalize(&mut module, func);
    (module, func, sink, extensions)
}

#[test]
fn input_semantics_bind_to_their_built_ins() {
    // Declared types match what GLSL requires, so no conversion applies.
    let cases: &[(&str, Stage, Ty, &str)] = &[
        ("SV_ClipDistance", Stage::Fragment, Ty::Float, "gl_ClipDistance"),
        ("SV_CullDistance", Stage::Fragment, Ty::Float, "gl_CullDistance"),
        ("SV_Coverage", Stage::Fragment, Ty::Int, "gl_SampleMask"),
        ("SV_DispatchThreadID", Stage::Compute, Ty::Uint3, "gl_GlobalInvocationID"),
        ("SV_DomainLocation", Stage::Domain, Ty::Float3, "gl_TessCoord"),
        ("SV_GroupID", Stage::Compute, Ty::Uint3, "gl_WorkGroupID"),
        ("SV_GroupIndex", Stage::Compute, Ty::Uint, "gl_LocalInvocationIndex"),
        ("SV_GroupThreadID", Stage::Compute, Ty::Uint3, "gl_LocalInvocationID"),
        ("SV_GSInstanceID", Stage::Geometry, Ty::Int, "gl_InvocationID"),
        ("SV_OutputControlPointID", Stage::Hull, Ty::Int, "gl_InvocationID"),
        ("SV_InstanceID", Stage::Vertex, Ty::Int, "gl_InstanceIndex"),
        ("SV_IsFrontFace", Stage::Fragment, Ty::Bool, "gl_FrontFacing"),
        ("SV_PrimitiveID", Stage::Fragment, Ty::Int, "gl_PrimitiveID"),
        ("SV_SampleIndex", Stage::Fragment, Ty::Int, "gl_SampleID"),
        ("SV_VertexID", Stage::Vertex, Ty::Int, "gl_VertexIndex"),
        ("SV_ViewportArrayIndex", Stage::Fragment, Ty::Int, "gl_ViewportIndex"),
        // gl_Layer is also readable from the fragment stage.
        ("SV_RenderTargetArrayIndex", Stage::Fragment, Ty::Int, "gl_Layer"),
        // The tess factors keep their array declaration.
        ("SV_TessFactor", Stage::Domain, Ty::FloatArr4, "gl_TessLevelOuter"),
    ];

    for &(semantic, stage, ty, expected) in cases {
        let (module, _, sink, _) = legalize_input(stage, semantic, ty);
        assert!(sink.is_empty(), "{} was not recognized", semantic);
        assert!(
            common::find_global_with_import(&module, expected).is_some(),
            "{} did not bind to {}",
            semantic,
            expected
        );
    }
}

#[test]
fn output_semantics_bind_to_their_built_ins() {
    let cases: &[(&str, Stage, Ty, &str)] = &[
        ("SV_Position", Stage::Vertex, Ty::Float4, "gl_Position"),
        ("SV_Depth", Stage::Fragment, Ty::Float, "gl_FragDepth"),
        ("SV_DepthGreaterEqual", Stage::Fragment, Ty::Float, "gl_FragDepth"),
        ("SV_DepthLessEqual", Stage::Fragment, Ty::Float, "gl_FragDepth"),
        ("SV_PointSize", Stage::Vertex, Ty::Float, "gl_PointSize"),
        ("SV_StencilRef", Stage::Fragment, Ty::Int, "gl_FragStencilRef"),
        ("SV_RenderTargetArrayIndex", Stage::Geometry, Ty::Int, "gl_Layer"),
    ];

    for &(semantic, stage, ty, expected) in cases {
        let (module, _, sink, _) = legalize_output(stage, semantic, ty);
        assert!(sink.is_empty(), "{} was not recognized", semantic);
        assert!(
            common::find_global_with_import(&module, expected).is_some(),
            "{} did not bind to {}",
            semantic,
            expected
        );
    }
}

#[test]
fn position_depends_on_stage_and_direction() {
    // As a vertex output, SV_Position is gl_Position.
    let (module, _, _, _) = legalize_output(Stage::Vertex, "SV_Position", Ty::Float4);
    assert_eq!(common::global_descs(&module), ["Out<float4> import gl_Position out:0"]);

    // As a fragment input it reads gl_FragCoord instead.
    let (module, _, _, _) = legalize_input(Stage::Fragment, "SV_Position", Ty::Float4);
    assert_eq!(common::global_descs(&module), ["float4 import gl_FragCoord in:0"]);

    // As a geometry input it is gl_Position again, wrapped in gl_in[...].
    let (module, _, _, _) = legalize_input(Stage::Geometry, "SV_Position", Ty::Float4);
    assert_eq!(
        common::global_descs(&module),
        ["float4 import gl_Position outer gl_in in:0"]
    );
}

#[test]
fn target_output_is_an_ordinary_location() {
    let (module, _, sink, _) = legalize_output(Stage::Fragment, "SV_Target", Ty::Float4);
    // Recognized, but deliberately not bound to any built-in.
    assert!(sink.is_empty());
    assert_eq!(common::global_descs(&module), ["Out<float4> out:0"]);
}

#[test]
fn semantics_match_case_insensitively() {
    let (module, _, sink, _) = legalize_input(Stage::Vertex, "Sv_VeRtExId", Ty::Int);
    assert!(sink.is_empty());
    assert!(common::find_global_with_import(&module, "gl_VertexIndex").is_some());
}

#[test]
fn instance_id_reads_convert_from_the_built_in_type() {
    let mut module = Module::new();

    let mut layout = common::simple_var_layout(&[(ResourceKind::VaryingInput, 0)]);
    layout.system_value_semantic = Some("SV_InstanceID".to_string());

    // The user declares uint; GLSL's gl_InstanceIndex is an int.
    let func = common::make_entry_point(
        &mut module,
        Stage::Vertex,
        &[TYPE_ID_UINT],
        TYPE_ID_VOID,
        vec![Rc::new(layout)],
        None,
    );
    let param = module.get_func(func).params[0];
    let mut builder = Builder::at(func, 0, 0);
    let local = builder.emit_var(&mut module, TYPE_ID_UINT);
    builder.emit_store(&mut module, local, Id::Inst(param));
    builder.emit_return_void(&mut module);

    common::legalize(&mut module, func);

    // The global has the built-in's type.
    assert_eq!(common::global_descs(&module), ["int import gl_InstanceIndex in:0"]);

    // Exactly one conversion back to the declared type, and the body reads
    // through it.
    let ops = common::block_ops(&module, func, 0);
    let insts = &module.get_func(func).blocks[0].insts;
    match &ops[0] {
        Op::Construct(args) => assert_eq!(args[..], [Id::Global(common::global_id(0))]),
        _ => panic!("expected the conversion at the top of the function"),
    }
    assert_eq!(module.get_inst(insts[0]).type_id, TYPE_ID_UINT);
    assert_eq!(common::count_ops(&module, func, |op| matches!(op, Op::Construct(_))), 1);
    match &ops[2] {
        Op::Store(_, value) => assert_eq!(*value, Id::Inst(insts[0])),
        _ => panic!("expected the body store to read the converted value"),
    }
}

#[test]
fn coverage_writes_convert_to_the_built_in_type() {
    let mut module = Module::new();
    let out_uint = module.get_out_type_id(TYPE_ID_UINT);

    let mut layout = common::simple_var_layout(&[(ResourceKind::VaryingOutput, 0)]);
    layout.system_value_semantic = Some("SV_Coverage".to_string());

    // The user declares uint; GLSL's gl_SampleMask is an int.
    let func = common::make_entry_point(
        &mut module,
        Stage::Fragment,
        &[out_uint],
        TYPE_ID_VOID,
        vec![Rc::new(layout)],
        None,
    );
    let mut builder = Builder::at(func, 0, 0);
    builder.emit_return_void(&mut module);

    common::legalize(&mut module, func);

    assert_eq!(common::global_descs(&module), ["Out<int> import gl_SampleMask out:0"]);

    // Exactly one conversion on the way out: load the uint local, construct
    // an int, store the built-in.
    let ops = common::block_ops(&module, func, 0);
    assert!(matches!(ops[0], Op::Var));
    assert!(matches!(ops[1], Op::Load(_)));
    match &ops[2] {
        Op::Construct(_) => {}
        _ => panic!("expected the conversion before the store"),
    }
    match &ops[3] {
        Op::Store(ptr, _) => assert_eq!(*ptr, Id::Global(common::global_id(0))),
        _ => panic!("expected the store to the built-in"),
    }
    assert_eq!(common::count_ops(&module, func, |op| matches!(op, Op::Construct(_))), 1);
}

#[test]
fn cull_distance_requires_its_extension() {
    let (_, _, _, extensions) = legalize_input(Stage::Fragment, "SV_CullDistance", Ty::Float);
    assert!(extensions.requires_glsl_extension("ARB_cull_distance"));
}

#[test]
fn stencil_ref_requires_its_extension() {
    let (_, _, _, extensions) = legalize_output(Stage::Fragment, "SV_StencilRef", Ty::Int);
    assert!(extensions.requires_glsl_extension("ARB_shader_stencil_export"));
}

#[test]
fn render_target_array_index_requirements_depend_on_the_stage() {
    // Geometry shaders have gl_Layer since 150.
    let (_, _, _, extensions) =
        legalize_output(Stage::Geometry, "SV_RenderTargetArrayIndex", Ty::Int);
    assert_eq!(extensions.glsl_version(), ProfileVersion::Glsl150);
    assert!(extensions.glsl_extensions().is_empty());

    // Reading it from a fragment shader needs 430.
    let (_, _, _, extensions) =
        legalize_input(Stage::Fragment, "SV_RenderTargetArrayIndex", Ty::Int);
    assert_eq!(extensions.glsl_version(), ProfileVersion::Glsl430);
    assert!(extensions.glsl_extensions().is_empty());

    // Writing it from any other stage needs 450 plus the extension.
    let (_, _, _, extensions) =
        legalize_output(Stage::Vertex, "SV_RenderTargetArrayIndex", Ty::Int);
    assert_eq!(extensions.glsl_version(), ProfileVersion::Glsl450);
    assert!(extensions.requires_glsl_extension("GL_ARB_shader_viewport_layer_array"));
}

#[test]
fn per_view_attributes_keep_the_user_type() {
    let (module, _, sink, extensions) =
        legalize_output(Stage::Vertex, "NV_X_Right", Ty::Float4);
    assert!(sink.is_empty());
    assert_eq!(extensions.glsl_version(), ProfileVersion::Glsl450);
    assert!(extensions.requires_glsl_extension("GL_NVX_multiview_per_view_attributes"));
    // No required type, so no conversion is inserted anywhere.
    assert_eq!(
        common::global_descs(&module),
        ["Out<float4> import gl_PositionPerViewNV[1] out:0"]
    );

    let (module, _, _, extensions) =
        legalize_output(Stage::Vertex, "NV_Viewport_Mask", Ty::Int);
    assert!(extensions.requires_glsl_extension("GL_NVX_multiview_per_view_attributes"));
    assert_eq!(
        common::global_descs(&module),
        ["Out<int> import gl_ViewportMaskPerViewNV out:0"]
    );
}
