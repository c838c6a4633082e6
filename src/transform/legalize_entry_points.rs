// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Legalization of entry points for the GLSL family of back-ends.
//
// Entry points arrive in an HLSL-style calling convention: parameters and
// return values carry semantics, and `out`/`inout` parameters are wrapped in
// pointer-like types.  GLSL instead wants every varying to be a module-scope
// variable, either bound to a named built-in (gl_Position, gl_FragCoord, ...)
// or given a numbered in/out location.  This transformation rewrites one
// entry-point function in place:
//
// - Aggregate varyings are scalarized: a struct becomes one global per leaf
//   field, and an array of structs becomes one *array* global per leaf field
//   (structure-of-arrays), as GLSL requires.  User code keeps operating on
//   the original aggregate shape through a reconstructed value.
// - Semantics that name a system value are bound to the corresponding GLSL
//   built-in, converting between the declared type and the built-in's type
//   where the two disagree.
// - `out` and `inout` parameters become a local temporary plus global
//   varyings; the temporary is copied out at every return site.
// - Geometry-shader output streams become output varyings written just
//   before each EmitVertex() call.
// - Ray-tracing payloads are lifted to globals of their original type; their
//   linkage is by type, not by use, so a keep-alive decoration protects them
//   from dead-code elimination.
//
// Afterwards the function takes no parameters and returns nothing.

use std::rc::Rc;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::builder::Builder;
use crate::diagnostics::{DiagnosticKind, DiagnosticSink};
use crate::extensions::{ExtensionTracker, ProfileVersion};
use crate::ir::*;
use crate::layout::{ResourceKind, Stage, TypeLayout, TypeLayoutKind, TypeResourceInfo, VarLayout};

struct State<'a> {
    module: &'a mut Module,
    sink: &'a mut DiagnosticSink,
    extensions: &'a mut ExtensionTracker,
    stage: Stage,
    func: FuncId,
}

// A GLSL built-in matching a system-value semantic: the variable name, the
// name of an outer array wrapping it (gl_in for geometry inputs), and the
// type GLSL requires of it, when that is fixed.
struct GlslSystemValueInfo {
    name: &'static str,
    outer_array_name: Option<&'static str>,
    required_type: Option<TypeId>,
}

// Scalarizing a varying turns one conceptual value into several IR-level
// values.  `ScalarizedVal` is the bookkeeping for that: a value may be a
// plain r-value, an address to load from or store to, a tuple of separately
// legalized fields, or a value whose GLSL type differs from the type user
// code expects.
#[derive(Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
enum ScalarizedVal {
    // No value; the legalized form of `void`.
    None,
    // An IR value that is the value itself.
    Value(Id),
    // An IR value holding the address of the value.
    Address(Id),
    // An aggregate whose fields were legalized one by one.
    Tuple(Rc<TupleVal>),
    // A value stored as one type but presented to user code as another;
    // conversions are emitted lazily on read and write.
    TypeAdapter(Rc<TypeAdapterVal>),
}

#[derive(Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
struct TupleElement {
    key: FieldKey,
    val: ScalarizedVal,
}

#[cfg_attr(debug_assertions, derive(Debug))]
struct TupleVal {
    // The logical type of the aggregate, including any outer arrays the
    // scalarization distributed over the fields.
    type_id: TypeId,
    elements: Vec<TupleElement>,
}

#[cfg_attr(debug_assertions, derive(Debug))]
struct TypeAdapterVal {
    val: ScalarizedVal,
    // The type `val` really has.
    actual_type: TypeId,
    // The type user code believes it has.
    pretend_type: TypeId,
}

impl ScalarizedVal {
    fn value(id: Id) -> ScalarizedVal {
        ScalarizedVal::Value(id)
    }

    fn address(id: Id) -> ScalarizedVal {
        ScalarizedVal::Address(id)
    }

    fn tuple(type_id: TypeId, elements: Vec<TupleElement>) -> ScalarizedVal {
        ScalarizedVal::Tuple(Rc::new(TupleVal { type_id, elements }))
    }

    // Adapters never stack; wrapping an adapter composes with it instead.
    fn type_adapter(val: ScalarizedVal, actual_type: TypeId, pretend_type: TypeId) -> ScalarizedVal {
        if let ScalarizedVal::TypeAdapter(inner) = &val {
            let inner = Rc::clone(inner);
            return ScalarizedVal::TypeAdapter(Rc::new(TypeAdapterVal {
                val: inner.val.clone(),
                actual_type: inner.actual_type,
                pretend_type,
            }));
        }
        ScalarizedVal::TypeAdapter(Rc::new(TypeAdapterVal { val, actual_type, pretend_type }))
    }
}

// Outer-array wrappers accumulated while recursing into a varying's type.
// Arrays distribute over aggregate fields, so the wrappers are applied to
// each leaf rather than to the aggregate.  Array is the only wrapper the
// recursion produces today.  The chain lives on the stack, linked through
// the recursion frames.
struct GlobalVaryingDeclarator<'a> {
    element_count: u32,
    next: Option<&'a GlobalVaryingDeclarator<'a>>,
}

// Map a system-value semantic to the GLSL built-in it binds to, recording
// any extension and version requirements on the way.  Returns None both for
// ordinary varyings (no semantic, or a semantic like SV_Target that GLSL
// treats as a plain location-qualified output) and for unknown semantics;
// the latter also produce a diagnostic.
fn glsl_system_value_info(
    state: &mut State,
    var_layout: &VarLayout,
    kind: ResourceKind,
) -> Option<GlslSystemValueInfo> {
    let spelling = var_layout.system_value_semantic.as_deref().unwrap_or("");
    if spelling.is_empty() {
        return None;
    }

    // HLSL semantics are matched case-insensitively.  Users also declare
    // these with almost any type the front-end can implicitly convert, so
    // most entries fix the type GLSL requires and let the caller adapt.
    let semantic = spelling.to_ascii_lowercase();
    let stage = state.stage;

    let mut outer_array_name = None;
    let mut required_type = None;

    let name = match semantic.as_str() {
        "sv_position" => {
            // Behaves like gl_FragCoord when read by a fragment shader and
            // like gl_Position everywhere else.  Input-vs-output alone does
            // not decide it: a vertex shader writes SV_Position and a
            // geometry shader can read the same semantic back as an input.
            required_type = Some(state.module.get_vector_type_id(ScalarType::Float, 4));
            if stage == Stage::Fragment && kind == ResourceKind::VaryingInput {
                "gl_FragCoord"
            } else if stage == Stage::Geometry && kind == ResourceKind::VaryingInput {
                // As a geometry input the spelling is gl_in[...].gl_Position;
                // record the outer array so the emitter can reconstruct it.
                outer_array_name = Some("gl_in");
                "gl_Position"
            } else {
                "gl_Position"
            }
        }
        "sv_target" => {
            // Fragment-shader outputs are ordinary `out` variables with
            // ordinary locations as far as GLSL is concerned.
            return None;
        }
        "sv_clipdistance" => {
            required_type = Some(TYPE_ID_FLOAT);
            "gl_ClipDistance"
        }
        "sv_culldistance" => {
            state.extensions.require_glsl_extension("ARB_cull_distance");
            required_type = Some(TYPE_ID_FLOAT);
            "gl_CullDistance"
        }
        "sv_coverage" => {
            // uint in HLSL, int in GLSL.
            required_type = Some(TYPE_ID_INT);
            "gl_SampleMask"
        }
        "sv_depth" | "sv_depthgreaterequal" | "sv_depthlessequal" => {
            required_type = Some(TYPE_ID_FLOAT);
            "gl_FragDepth"
        }
        "sv_dispatchthreadid" => {
            required_type = Some(state.module.get_vector_type_id(ScalarType::Uint, 3));
            "gl_GlobalInvocationID"
        }
        "sv_domainlocation" => {
            // float2|3 in HLSL, always vec3 in GLSL.
            required_type = Some(state.module.get_vector_type_id(ScalarType::Float, 3));
            "gl_TessCoord"
        }
        "sv_groupid" => {
            required_type = Some(state.module.get_vector_type_id(ScalarType::Uint, 3));
            "gl_WorkGroupID"
        }
        "sv_groupindex" => {
            required_type = Some(TYPE_ID_UINT);
            "gl_LocalInvocationIndex"
        }
        "sv_groupthreadid" => {
            required_type = Some(state.module.get_vector_type_id(ScalarType::Uint, 3));
            "gl_LocalInvocationID"
        }
        "sv_gsinstanceid" | "sv_outputcontrolpointid" => {
            // uint in HLSL, int in GLSL.
            required_type = Some(TYPE_ID_INT);
            "gl_InvocationID"
        }
        "sv_instanceid" => {
            // uint in HLSL, int in GLSL.
            required_type = Some(TYPE_ID_INT);
            "gl_InstanceIndex"
        }
        "sv_isfrontface" => {
            required_type = Some(TYPE_ID_BOOL);
            "gl_FrontFacing"
        }
        "sv_pointsize" => {
            required_type = Some(TYPE_ID_FLOAT);
            "gl_PointSize"
        }
        "sv_primitiveid" => {
            required_type = Some(TYPE_ID_INT);
            "gl_PrimitiveID"
        }
        "sv_rendertargetarrayindex" => {
            // gl_Layer is core as a GS output since 150 and as an FS input
            // since 430; writing it from other stages needs the
            // viewport-layer-array extension.
            match stage {
                Stage::Geometry => state.extensions.require_glsl_version(ProfileVersion::Glsl150),
                Stage::Fragment => state.extensions.require_glsl_version(ProfileVersion::Glsl430),
                _ => {
                    state.extensions.require_glsl_version(ProfileVersion::Glsl450);
                    state
                        .extensions
                        .require_glsl_extension("GL_ARB_shader_viewport_layer_array");
                }
            }
            required_type = Some(TYPE_ID_INT);
            "gl_Layer"
        }
        "sv_sampleindex" => {
            required_type = Some(TYPE_ID_INT);
            "gl_SampleID"
        }
        "sv_stencilref" => {
            state.extensions.require_glsl_extension("ARB_shader_stencil_export");
            required_type = Some(TYPE_ID_INT);
            "gl_FragStencilRef"
        }
        "sv_tessfactor" => {
            // HLSL allows float[2..4] here while GLSL fixes float[4].
            // TODO: the constructor-based conversion in adapt_type does not
            // resize arrays, so a float[3] declaration reaches the emitter
            // unconverted; resize the array when adapting.
            required_type = Some(state.module.get_array_type_id(TYPE_ID_FLOAT, 4));
            "gl_TessLevelOuter"
        }
        "sv_vertexid" => {
            // uint in HLSL, int in GLSL.
            required_type = Some(TYPE_ID_INT);
            "gl_VertexIndex"
        }
        "sv_viewportarrayindex" => {
            required_type = Some(TYPE_ID_INT);
            "gl_ViewportIndex"
        }
        "nv_x_right" => {
            state.extensions.require_glsl_version(ProfileVersion::Glsl450);
            state
                .extensions
                .require_glsl_extension("GL_NVX_multiview_per_view_attributes");
            // The GLSL output is `vec4 gl_PositionPerViewNV[]` covering an
            // arbitrary number of views; the HLSL side only ever declares a
            // second position, so bind it to element 1 and keep the user's
            // type.
            "gl_PositionPerViewNV[1]"
        }
        "nv_viewport_mask" => {
            state.extensions.require_glsl_version(ProfileVersion::Glsl450);
            state
                .extensions
                .require_glsl_extension("GL_NVX_multiview_per_view_attributes");
            "gl_ViewportMaskPerViewNV"
        }
        _ => {
            state.sink.diagnose(
                var_layout.loc,
                DiagnosticKind::UnknownSystemValueSemantic(spelling.to_string()),
            );
            return None;
        }
    };

    Some(GlslSystemValueInfo { name, outer_array_name, required_type })
}

// Create one global shader parameter for a leaf varying: wrap the leaf type
// in the accumulated outer arrays, give the global a fresh layout with the
// single resource entry that applies here, and attach the built-in binding
// when the semantic names a system value.
fn create_simple_varying(
    state: &mut State,
    in_type_id: TypeId,
    in_var_layout: &VarLayout,
    in_type_layout: &Rc<TypeLayout>,
    kind: ResourceKind,
    binding_index: u32,
    declarator: Option<&GlobalVaryingDeclarator>,
) -> ScalarizedVal {
    let system_value = glsl_system_value_info(state, in_var_layout, kind);

    // A system value may require a different type than the user declared.
    let mut type_id = in_type_id;
    if let Some(info) = &system_value {
        if let Some(required) = info.required_type {
            type_id = required;
        }
    }

    // Apply the outer-array wrappers, innermost first, growing the type
    // layout alongside the type.  Each wrap multiplies the leaf's resource
    // usage by that array's extent.
    let mut type_layout = Rc::clone(in_type_layout);
    let mut next = declarator;
    while let Some(dd) = next {
        type_id = state.module.get_array_type_id(type_id, dd.element_count);

        let mut resources = SmallVec::new();
        if let Some(info) = in_type_layout.find_resource_info(kind) {
            resources.push(TypeResourceInfo { kind, count: info.count * dd.element_count });
        }
        let rules = type_layout.rules;
        type_layout = Rc::new(TypeLayout {
            rules,
            resources,
            kind: TypeLayoutKind::Array { element: type_layout },
        });

        next = dd.next;
    }

    // The global gets a fresh layout even when the original variable had
    // one: an `inout` parameter is being split in two here, and only the
    // side selected by `kind` belongs on this global.
    let mut var_layout = VarLayout::new(type_layout);
    var_layout.loc = in_var_layout.loc;
    var_layout.semantic_name = in_var_layout.semantic_name.clone();
    var_layout.semantic_index = in_var_layout.semantic_index;
    var_layout.system_value_semantic = in_var_layout.system_value_semantic.clone();
    var_layout.system_value_semantic_index = in_var_layout.system_value_semantic_index;
    var_layout.stage = in_var_layout.stage;
    var_layout.flags = in_var_layout.flags;
    var_layout.add_resource_info(kind, binding_index);

    // Global shader parameters are read-only the same way function
    // parameters are; varying outputs get an `Out<...>` wrapper so that
    // writes are expressible as stores.
    let is_output = kind == ResourceKind::VaryingOutput;
    let param_type_id =
        if is_output { state.module.get_out_type_id(type_id) } else { type_id };

    let global = state.module.create_global_param(param_type_id);
    let global_id = Id::Global(global);

    let mut val = if is_output {
        ScalarizedVal::address(global_id)
    } else {
        ScalarizedVal::value(global_id)
    };

    if let Some(info) = &system_value {
        let decorations = &mut state.module.get_global_param_mut(global).decorations;
        decorations.add_import_name(info.name);
        if let Some(outer_array_name) = info.outer_array_name {
            decorations.add_glsl_outer_array(outer_array_name);
        }
        if let Some(required) = info.required_type {
            if required != in_type_id {
                // The global has the built-in's type; user code keeps seeing
                // the declared one and converts at each access.
                val = ScalarizedVal::type_adapter(val, required, in_type_id);
            }
        }
    }

    state.module.get_global_param_mut(global).decorations.add_layout(Rc::new(var_layout));

    val
}

// Create the global varyings for a type, recursing structurally.  Arrays
// become outer wrappers around every leaf (structure-of-arrays), stream
// wrappers are stripped, and structs fan out field by field with their
// binding indices advanced by the layout's per-field resource offsets.
fn create_varyings_impl(
    state: &mut State,
    type_id: TypeId,
    var_layout: &VarLayout,
    type_layout: &Rc<TypeLayout>,
    kind: ResourceKind,
    binding_index: u32,
    declarator: Option<&GlobalVaryingDeclarator>,
) -> ScalarizedVal {
    enum Shape {
        Void,
        Simple,
        Array(TypeId, u32),
        Stream(TypeId),
        Struct(Vec<(FieldKey, TypeId)>),
    }

    let shape = match state.module.get_type(type_id) {
        Type::Void => Shape::Void,
        &Type::Array(element, count) => Shape::Array(element, count),
        &Type::Stream(_, element) => Shape::Stream(element),
        Type::Struct(_, fields) => {
            Shape::Struct(fields.iter().map(|field| (field.key, field.type_id)).collect())
        }
        // Scalars, vectors and matrices are leaves; a matrix is one varying,
        // it is not decomposed into rows.  Anything else falls back on the
        // simple behavior as well.
        _ => Shape::Simple,
    };

    match shape {
        Shape::Void => ScalarizedVal::None,
        Shape::Simple => create_simple_varying(
            state,
            type_id,
            var_layout,
            type_layout,
            kind,
            binding_index,
            declarator,
        ),
        Shape::Array(element_type_id, element_count) => {
            let element_layout = Rc::clone(type_layout.get_array_element());
            let array_declarator =
                GlobalVaryingDeclarator { element_count, next: declarator };
            create_varyings_impl(
                state,
                element_type_id,
                var_layout,
                &element_layout,
                kind,
                binding_index,
                Some(&array_declarator),
            )
        }
        Shape::Stream(element_type_id) => {
            // A stream of vertices legalizes as the vertex type itself;
            // appending to the stream is handled at the call sites.
            let element_layout = Rc::clone(type_layout.get_stream_element());
            create_varyings_impl(
                state,
                element_type_id,
                var_layout,
                &element_layout,
                kind,
                binding_index,
                declarator,
            )
        }
        Shape::Struct(fields) => {
            let field_layouts = type_layout.get_struct_fields().clone();
            if field_layouts.len() != fields.len() {
                panic!("Internal error: Struct type layout does not match the type");
            }

            // The logical type of the tuple is the struct wrapped in the
            // outer arrays; the elements each carry the wrappers themselves.
            let mut full_type_id = type_id;
            let mut next = declarator;
            while let Some(dd) = next {
                full_type_id = state.module.get_array_type_id(full_type_id, dd.element_count);
                next = dd.next;
            }

            let mut elements = Vec::with_capacity(fields.len());
            for ((key, field_type_id), field_layout) in
                fields.into_iter().zip(field_layouts.iter())
            {
                let field_binding_index = binding_index + field_layout.resource_index(kind);
                let field_val = create_varyings_impl(
                    state,
                    field_type_id,
                    field_layout,
                    &Rc::clone(&field_layout.type_layout),
                    kind,
                    field_binding_index,
                    declarator,
                );
                if !matches!(field_val, ScalarizedVal::None) {
                    elements.push(TupleElement { key, val: field_val });
                }
            }

            ScalarizedVal::tuple(full_type_id, elements)
        }
    }
}

fn create_varyings(
    state: &mut State,
    type_id: TypeId,
    layout: &VarLayout,
    kind: ResourceKind,
) -> ScalarizedVal {
    let binding_index = layout.resource_index(kind);
    let type_layout = Rc::clone(&layout.type_layout);
    create_varyings_impl(state, type_id, layout, &type_layout, kind, binding_index, None)
}

// Extract one field of a scalarized aggregate.  Tuples are indexed by
// position; the key only matters for values and addresses, and for pairing
// elements across the two sides of an assignment.
fn extract_field(
    module: &mut Module,
    builder: &mut Builder,
    val: &ScalarizedVal,
    field_index: usize,
    key: FieldKey,
) -> ScalarizedVal {
    match val {
        ScalarizedVal::Value(id) => {
            ScalarizedVal::value(builder.emit_field_extract(module, *id, key))
        }
        ScalarizedVal::Address(id) => {
            ScalarizedVal::address(builder.emit_field_address(module, *id, key))
        }
        ScalarizedVal::Tuple(tuple) => tuple.elements[field_index].val.clone(),
        _ => panic!("Internal error: Unimplemented field extraction on scalarized value"),
    }
}

// Convert a value between the type a global really has and the type user
// code declared.  The source type takes no part in the constructor-based
// conversions emitted today.
fn adapt_type(
    module: &mut Module,
    builder: &mut Builder,
    val: &ScalarizedVal,
    to_type_id: TypeId,
    _from_type_id: TypeId,
) -> ScalarizedVal {
    match val {
        ScalarizedVal::Value(id) => {
            ScalarizedVal::value(builder.emit_construct(module, to_type_id, vec![*id]))
        }
        ScalarizedVal::Address(id) => {
            let loaded = builder.emit_load(module, *id);
            ScalarizedVal::value(builder.emit_construct(module, to_type_id, vec![loaded]))
        }
        _ => panic!("Internal error: Unimplemented type adaptation on scalarized value"),
    }
}

// Assign one scalarized value to another, decomposing tuples element by
// element and converting through type adapters.
fn assign(module: &mut Module, builder: &mut Builder, left: &ScalarizedVal, right: &ScalarizedVal) {
    match left {
        ScalarizedVal::Address(left_id) => match right {
            ScalarizedVal::Value(right_id) => {
                builder.emit_store(module, *left_id, *right_id);
            }
            ScalarizedVal::Address(right_id) => {
                let value = builder.emit_load(module, *right_id);
                builder.emit_store(module, *left_id, value);
            }
            ScalarizedVal::Tuple(tuple) => {
                // The destination is not a tuple; assign element by element,
                // extracting the matching field on the left.
                let tuple = Rc::clone(tuple);
                for (index, element) in tuple.elements.iter().enumerate() {
                    let left_element = extract_field(module, builder, left, index, element.key);
                    assign(module, builder, &left_element, &element.val);
                }
            }
            _ => panic!("Internal error: Unimplemented assignment to an address"),
        },
        ScalarizedVal::Tuple(tuple) => {
            let tuple = Rc::clone(tuple);
            for (index, element) in tuple.elements.iter().enumerate() {
                let right_element = extract_field(module, builder, right, index, element.key);
                assign(module, builder, &element.val, &right_element);
            }
        }
        ScalarizedVal::TypeAdapter(adapter) => {
            // Writing through an adapter converts from the type the value
            // pretends to have to the actual type of the global.
            let adapter = Rc::clone(adapter);
            let adapted =
                adapt_type(module, builder, right, adapter.actual_type, adapter.pretend_type);
            assign(module, builder, &adapter.val, &adapted);
        }
        _ => panic!("Internal error: Unimplemented assignment"),
    }
}

// Index into a scalarized value.  Subscripting a tuple distributes over its
// elements: the tuple represents an array of structs stored as one array per
// field, so the result is a tuple of per-field element accesses.
fn get_subscript_val(
    module: &mut Module,
    builder: &mut Builder,
    element_type_id: TypeId,
    val: &ScalarizedVal,
    index: Id,
) -> ScalarizedVal {
    match val {
        ScalarizedVal::Value(id) => {
            ScalarizedVal::value(builder.emit_element_extract(module, *id, index))
        }
        ScalarizedVal::Address(id) => {
            ScalarizedVal::address(builder.emit_element_address(module, *id, index))
        }
        ScalarizedVal::Tuple(tuple) => {
            let field_types: Vec<TypeId> = match module.get_type(element_type_id) {
                Type::Struct(_, fields) => fields.iter().map(|field| field.type_id).collect(),
                _ => panic!("Internal error: Expected struct type when subscripting a tuple"),
            };
            let tuple = Rc::clone(tuple);
            // zip_eq: the tuple must have exactly one element per field.
            let elements = field_types
                .iter()
                .zip_eq(tuple.elements.iter())
                .map(|(&field_type_id, element)| TupleElement {
                    key: element.key,
                    val: get_subscript_val(
                        module,
                        builder,
                        field_type_id,
                        &element.val,
                        index,
                    ),
                })
                .collect();
            ScalarizedVal::tuple(element_type_id, elements)
        }
        _ => panic!("Internal error: Unimplemented subscript on scalarized value"),
    }
}

fn materialize_tuple(module: &mut Module, builder: &mut Builder, tuple: &Rc<TupleVal>) -> Id {
    let array_info = match module.get_type(tuple.type_id) {
        &Type::Array(element_type_id, count) => Some((element_type_id, count)),
        _ => None,
    };

    if let Some((element_type_id, count)) = array_info {
        // The tuple represents an array, so its elements are arrays as well;
        // gather one struct value per index and build the array from those.
        let mut element_vals = Vec::with_capacity(count as usize);
        for index in 0..count {
            let index_val = Id::Const(module.get_int_value(index as i64));
            let element = get_subscript_val(
                module,
                builder,
                element_type_id,
                &ScalarizedVal::Tuple(Rc::clone(tuple)),
                index_val,
            );
            element_vals.push(materialize(module, builder, &element));
        }
        builder.emit_make_array(module, tuple.type_id, element_vals)
    } else {
        // An aggregate: materialize the elements and construct the value.
        let element_vals = tuple
            .elements
            .iter()
            .map(|element| materialize(module, builder, &element.val))
            .collect();
        builder.emit_construct(module, tuple.type_id, element_vals)
    }
}

// Reassemble a scalarized value into a single IR r-value.
fn materialize(module: &mut Module, builder: &mut Builder, val: &ScalarizedVal) -> Id {
    match val {
        ScalarizedVal::Value(id) => *id,
        ScalarizedVal::Address(id) => builder.emit_load(module, *id),
        ScalarizedVal::Tuple(tuple) => {
            let tuple = Rc::clone(tuple);
            materialize_tuple(module, builder, &tuple)
        }
        ScalarizedVal::TypeAdapter(adapter) => {
            // The value is stored at its actual type but is being used at
            // the type it pretends to have; convert on the way out.
            let adapter = Rc::clone(adapter);
            let adapted = adapt_type(
                module,
                builder,
                &adapter.val,
                adapter.pretend_type,
                adapter.actual_type,
            );
            materialize(module, builder, &adapted)
        }
        ScalarizedVal::None => panic!("Internal error: Cannot materialize an absent value"),
    }
}

// Call sites can refer to a callee through `specialize` wrappers and through
// generics that yield the callee; follow both until something else turns up.
fn resolve_callee(module: &Module, callee: Id) -> Id {
    let mut callee = callee;
    loop {
        let Id::Inst(inst_id) = callee else {
            return callee;
        };
        match &module.get_inst(inst_id).op {
            Op::Specialize(base, _) => callee = *base,
            Op::Generic(yielded) => callee = *yielded,
            _ => return callee,
        }
    }
}

fn is_emit_vertex_callee(module: &Module, callee: Id) -> bool {
    match resolve_callee(module, callee) {
        // The operation is identified by the target-intrinsic definition
        // the standard library gave it.
        Id::Func(func_id) => {
            module.get_func(func_id).decorations.find_target_intrinsic("glsl")
                == Some("EmitVertex()")
        }
        _ => false,
    }
}

// An output stream parameter like TriangleStream<V> translates to `out`
// varyings for V, written immediately before every EmitVertex() call.
fn legalize_stream_output_param(
    state: &mut State,
    builder: &mut Builder,
    param: InstId,
    param_layout: &Rc<VarLayout>,
    stream_type_id: TypeId,
) {
    let global_output =
        create_varyings(state, stream_type_id, param_layout, ResourceKind::VaryingOutput);

    let block_count = state.module.get_func(state.func).blocks.len();
    for block in 0..block_count {
        let mut index = 0;
        loop {
            let insts = &state.module.get_func(state.func).blocks[block].insts;
            if index >= insts.len() {
                break;
            }
            let inst_id = insts[index];

            let (callee, payload) = match &state.module.get_inst(inst_id).op {
                Op::Call(callee, args) => (*callee, args.get(1).copied()),
                _ => {
                    index += 1;
                    continue;
                }
            };
            if !is_emit_vertex_callee(state.module, callee) {
                index += 1;
                continue;
            }
            let Some(payload) = payload else {
                panic!("Internal error: EmitVertex call is missing its payload argument");
            };

            // Copy the vertex into the output varyings right before the call.
            let mut call_builder = Builder::before_inst(state.module, state.func, inst_id);
            assign(
                state.module,
                &mut call_builder,
                &global_output,
                &ScalarizedVal::value(payload),
            );
            index = call_builder.index() + 1;
        }
    }

    // The EmitVertex calls still refer to the stream parameter.  No value of
    // the stream type exists to put there, so an undefined value stands in;
    // the emitted code never reads it.
    let param_type_id = state.module.get_inst(param).type_id;
    let undefined = builder.emit_undefined(state.module, param_type_id);
    state.module.replace_uses_in_func(state.func, Id::Inst(param), undefined);
}

// Ray-tracing payloads keep their aggregate type: the parameter is lifted
// verbatim to a global, pointer wrapper and all.  Payload linkage between
// ray-tracing stages is established by type rather than by use, so the entry
// point records a dependency that keeps the global alive through dead-code
// elimination even when the body never touches it.
fn legalize_ray_tracing_param(state: &mut State, param: InstId, param_layout: &Rc<VarLayout>) {
    let param_type_id = state.module.get_inst(param).type_id;
    let global = state.module.create_global_param(param_type_id);
    state
        .module
        .get_global_param_mut(global)
        .decorations
        .add_layout(Rc::clone(param_layout));

    state.module.replace_uses_in_func(state.func, Id::Inst(param), Id::Global(global));
    state.module.get_func_mut(state.func).decorations.add_depends_on(Id::Global(global));
}

fn legalize_entry_point_param(
    state: &mut State,
    builder: &mut Builder,
    param: InstId,
    param_layout: &Rc<VarLayout>,
) {
    let param_type_id = state.module.get_inst(param).type_id;

    // Stage outputs that don't fit the varying model come first: a geometry
    // shader's output stream.
    if let &Type::Ptr(ptr_kind, value_type_id) = state.module.get_type(param_type_id) {
        if ptr_kind.is_out_like() && state.module.get_type(value_type_id).is_stream() {
            legalize_stream_output_param(state, builder, param, param_layout, value_type_id);
            return;
        }
    }

    // Ray-tracing stages don't scalarize; their payloads stay whole.
    if state.stage.is_ray_tracing() {
        legalize_ray_tracing_param(state, param, param_layout);
        return;
    }

    if let &Type::Ptr(ptr_kind, value_type_id) = state.module.get_type(param_type_id) {
        if ptr_kind.is_out_like() {
            // The parameter is passed by reference.  A local variable of the
            // pointed-to type replaces it, with global varyings carrying the
            // actual input and output.
            let local = builder.emit_var(state.module, value_type_id);
            let local_val = ScalarizedVal::address(local);

            if ptr_kind == PtrKind::InOut {
                // `inout` also reads: initialize the local from input
                // varyings at the top of the function.
                let global_input = create_varyings(
                    state,
                    value_type_id,
                    param_layout,
                    ResourceKind::VaryingInput,
                );
                assign(state.module, builder, &local_val, &global_input);
            }

            // The parameter was a pointer, so the variable (itself a
            // pointer) substitutes directly.
            state.module.replace_uses_in_func(state.func, Id::Inst(param), local);

            let global_output =
                create_varyings(state, value_type_id, param_layout, ResourceKind::VaryingOutput);

            // Copy the local out on every path that leaves the function.
            let block_count = state.module.get_func(state.func).blocks.len();
            for block in 0..block_count {
                let insts = &state.module.get_func(state.func).blocks[block].insts;
                let Some(&terminator) = insts.last() else {
                    continue;
                };
                if !matches!(
                    state.module.get_inst(terminator).op,
                    Op::ReturnVal(_) | Op::ReturnVoid
                ) {
                    continue;
                }
                let terminator_index = state.module.get_func(state.func).blocks[block].insts.len() - 1;

                // A separate builder, so the main builder keeps pointing at
                // the top of the function for parameter initializations.
                let mut return_builder = Builder::at(state.func, block, terminator_index);
                assign(state.module, &mut return_builder, &global_output, &local_val);
            }
            return;
        }
    }

    // A plain input: create the globals, reassemble them into a single value
    // at the top of the function, and use that wherever the parameter was
    // used.
    let global_value =
        create_varyings(state, param_type_id, param_layout, ResourceKind::VaryingInput);
    let materialized = materialize(state.module, builder, &global_value);
    state.module.replace_uses_in_func(state.func, Id::Inst(param), materialized);
}

// Rewrite every `ReturnVal` into a write of the result varyings followed by
// a plain `ReturnVoid`.
fn rewrite_returns(state: &mut State, result_global: &ScalarizedVal) {
    let block_count = state.module.get_func(state.func).blocks.len();
    for block in 0..block_count {
        // A `ReturnVal` can only be a terminator, but scanning every
        // instruction costs little and tolerates odd positions.
        let mut index = 0;
        loop {
            let insts = &state.module.get_func(state.func).blocks[block].insts;
            if index >= insts.len() {
                break;
            }
            let inst_id = insts[index];

            let value = match &state.module.get_inst(inst_id).op {
                &Op::ReturnVal(value) => value,
                _ => {
                    index += 1;
                    continue;
                }
            };

            let mut return_builder = Builder::at(state.func, block, index);
            assign(
                state.module,
                &mut return_builder,
                result_global,
                &ScalarizedVal::value(value),
            );
            return_builder.emit_return_void(state.module);

            // The old `ReturnVal` now sits right after the new terminator.
            // Remove it and resume the scan there so no neighbor is skipped.
            let removed_index = return_builder.index();
            state.module.get_func_mut(state.func).blocks[block].insts.remove(removed_index);
            index = removed_index;
        }
    }
}

// Rewrite one entry-point function into the form GLSL needs: varyings become
// global shader parameters, return sites write the result globals, and the
// function ends up taking no parameters and returning nothing.
//
// The entry point must not be called anywhere in the module; rewriting its
// signature would invalidate the call sites.  A caller that is also an
// ordinary callee must be cloned first.
pub fn run(
    module: &mut Module,
    func: FuncId,
    sink: &mut DiagnosticSink,
    extensions: &mut ExtensionTracker,
) {
    let entry_layout = match module.get_func(func).decorations.find_entry_point() {
        Some(layout) => Rc::clone(layout),
        None => panic!("Internal error: Entry point function has no layout"),
    };

    if module.count_func_uses(func) != 0 {
        panic!("Internal error: Entry point function must have no uses");
    }

    let return_type_id = module.get_func_return_type_id(func);

    // A void entry point without parameters is already in legal form.
    if return_type_id == TYPE_ID_VOID && module.get_func(func).params.is_empty() {
        return;
    }

    let mut state = State {
        module,
        sink,
        extensions,
        stage: entry_layout.stage,
        func,
    };

    // The main builder points at the top of the entry block; everything a
    // parameter needs initialized lands there, in parameter order.
    let mut builder = Builder::at_entry_begin(func);

    if return_type_id != TYPE_ID_VOID {
        let result_layout = match &entry_layout.result {
            Some(layout) => Rc::clone(layout),
            None => panic!("Internal error: Entry point returns a value but has no result layout"),
        };
        let result_global = create_varyings(
            &mut state,
            return_type_id,
            &result_layout,
            ResourceKind::VaryingOutput,
        );
        rewrite_returns(&mut state, &result_global);
    }

    if !state.module.get_func(func).blocks.is_empty() {
        let params = state.module.get_func(func).params.clone();
        if params.len() != entry_layout.params.len() {
            panic!("Internal error: Entry point parameter count does not match its layout");
        }
        for (param, param_layout) in params.iter().zip(entry_layout.params.iter()) {
            legalize_entry_point_param(&mut state, &mut builder, *param, param_layout);
        }
    }

    // All instruction uses of the parameters are gone; drop the parameters
    // themselves and make the signature `() -> void`.
    state.module.get_func_mut(func).params.clear();
    let void_func_type = state.module.get_func_type_id(vec![], TYPE_ID_VOID);
    state.module.get_func_mut(func).type_id = void_func_type;
}
