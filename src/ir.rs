// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// The IR itself: strongly-typed ids, types, instructions, decorations and the
// module that owns them.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::layout::{EntryPointLayout, VarLayout};

// Strong types for ids that refer to types, instructions, constants, functions
// and global parameters.  They are used to look information up in the
// respective tables of `Module`.
#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct TypeId {
    pub id: u32,
}

#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct InstId {
    pub id: u32,
}

#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct ConstId {
    pub id: u32,
}

#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct FuncId {
    pub id: u32,
}

#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct GlobalParamId {
    pub id: u32,
}

// Index of a block within one function's block list.
#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct BlockId {
    pub id: u32,
}

// The identity of a struct field.  Field keys are allocated once per field
// when the struct type is created and never reused, so a key identifies a
// field independently of its position.
#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct FieldKey {
    pub id: u32,
}

// Fixed type ids for the basic types, created by `Module::new`.
pub const TYPE_ID_VOID: TypeId = TypeId { id: 0 };
pub const TYPE_ID_FLOAT: TypeId = TypeId { id: 1 };
pub const TYPE_ID_INT: TypeId = TypeId { id: 2 };
pub const TYPE_ID_UINT: TypeId = TypeId { id: 3 };
pub const TYPE_ID_BOOL: TypeId = TypeId { id: 4 };

// An id that can be referred to by an operand of an instruction.
#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum Id {
    Inst(InstId),
    Const(ConstId),
    Global(GlobalParamId),
    Func(FuncId),
}

// Where a name came from.  Interface names must survive into the generated
// text in a predictable form; temporaries can be freely renamed.
#[derive(Copy, Clone, PartialEq)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum NameSource {
    ShaderInterface,
    Internal,
    Temporary,
}

// A name associated with a function, struct or struct field.  Names are
// slices into the shader source or static strings; either way they live for
// the duration of the compilation.
#[derive(Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Name {
    pub name: &'static str,
    pub source: NameSource,
}

impl Name {
    pub fn new_temp(name: &'static str) -> Name {
        Name { name, source: NameSource::Temporary }
    }
    pub fn new_interface(name: &'static str) -> Name {
        Name { name, source: NameSource::ShaderInterface }
    }
    pub fn new_exact(name: &'static str) -> Name {
        Name { name, source: NameSource::Internal }
    }
}

#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum ScalarType {
    Float,
    Int,
    Uint,
    Bool,
}

// The pointer flavor distinguishes plain storage pointers (local variables)
// from the `out` and `inout` wrappers of the HLSL calling convention.  Global
// shader parameters for varying outputs are typed `Out<T>` so that writing
// them is expressible as a store.
#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum PtrKind {
    Ptr,
    Out,
    InOut,
}

impl PtrKind {
    // Whether the pointer represents an `out` or `inout` parameter.
    pub fn is_out_like(&self) -> bool {
        matches!(self, PtrKind::Out | PtrKind::InOut)
    }
}

// The primitive topology of a geometry-shader output stream.
#[derive(Eq, PartialEq, Hash, Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum StreamKind {
    Point,
    Line,
    Triangle,
}

// A field of a struct type.
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Field {
    pub name: Name,
    pub key: FieldKey,
    pub type_id: TypeId,
}

// The type of a value.  Types can be recursive, for example an array or
// pointer of another type.
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum Type {
    Void,
    Scalar(ScalarType),
    // A vector of a scalar type
    Vector(ScalarType, u32),
    // A matrix; columns x rows.  Matrices are treated as a single leaf by the
    // varying transformations, they are never decomposed per column.
    Matrix(ScalarType, u32, u32),
    // An array of another type
    Array(TypeId, u32),
    Struct(Name, Vec<Field>),
    // A geometry-shader output stream of another type
    Stream(StreamKind, TypeId),
    // A pointer to another type; local variables, `out`/`inout` parameters
    // and access chains
    Ptr(PtrKind, TypeId),
    Func(Vec<TypeId>, TypeId),
}

impl Type {
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }
    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Scalar(_))
    }
    pub fn is_vector(&self) -> bool {
        matches!(self, Type::Vector(..))
    }
    pub fn is_matrix(&self) -> bool {
        matches!(self, Type::Matrix(..))
    }
    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(..))
    }
    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(..))
    }
    pub fn is_stream(&self) -> bool {
        matches!(self, Type::Stream(..))
    }
    pub fn is_ptr(&self) -> bool {
        matches!(self, Type::Ptr(..))
    }

    pub fn get_ptr(&self) -> (PtrKind, TypeId) {
        match self {
            &Type::Ptr(kind, pointee) => (kind, pointee),
            _ => panic!("Internal error: Expected pointer type"),
        }
    }

    pub fn get_array(&self) -> (TypeId, u32) {
        match self {
            &Type::Array(element, count) => (element, count),
            _ => panic!("Internal error: Expected array type"),
        }
    }

    pub fn get_struct_fields(&self) -> &Vec<Field> {
        match self {
            Type::Struct(_, fields) => fields,
            _ => panic!("Internal error: Expected struct type"),
        }
    }

    pub fn get_func_return_type(&self) -> TypeId {
        match self {
            &Type::Func(_, return_type) => return_type,
            _ => panic!("Internal error: Expected function type"),
        }
    }
}

// The value of a constant.  Float constants are interned by their bit
// pattern because Rust does not implement Eq and Hash for f32.
#[derive(Copy, Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum ConstValue {
    Int(i64),
    Uint(u64),
    Float(f32),
    Bool(bool),
}

#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Const {
    pub type_id: TypeId,
    pub value: ConstValue,
}

// The opcode of an instruction together with its operands.  The result type
// is specified in the `Inst` struct.
#[derive(Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum Op {
    // A function parameter.  Parameter instructions are listed in the
    // function, not in any block.
    Param,
    // A local variable; the result is a pointer to the variable's storage.
    //   %result = Var
    Var,
    // An undefined value of the result type.
    //   %result = Undefined
    Undefined,

    // Extract a field of a struct value.
    //   %result = FieldExtract %struct key
    FieldExtract(Id, FieldKey),
    // Given a struct pointer, form a pointer to one field.  The pointer kind
    // of the operand is preserved in the result.
    //   %result = FieldAddress %struct_ptr key
    FieldAddress(Id, FieldKey),
    // Extract an element of an array or vector value.
    //   %result = ElementExtract %value %index
    ElementExtract(Id, Id),
    // Given an array or vector pointer, form a pointer to one element.
    //   %result = ElementAddress %ptr %index
    ElementAddress(Id, Id),

    // Load from a pointer.
    //   %result = Load %ptr
    Load(Id),
    // Store a value through a pointer.
    //   Store %ptr %value
    Store(Id, Id),

    // Construct a value of the result type from the given arguments.  A
    // single argument of a different type is a conversion.
    //   %result = Construct %args...
    Construct(Vec<Id>),
    // Construct an array value from one value per element.
    //   %result = MakeArray %elements...
    MakeArray(Vec<Id>),

    // Call a function, directly or through specialization wrappers.
    //   [%result =] Call %callee %args...
    Call(Id, Vec<Id>),
    // Specialize a generic; the result stands for the specialized callee.
    //   %result = Specialize %generic %args...
    Specialize(Id, Vec<Id>),
    // A generic whose body yields the wrapped value.
    //   %result = Generic %yielded
    Generic(Id),

    // Block terminators.
    Branch(BlockId),
    CondBranch(Id, BlockId, BlockId),
    ReturnVal(Id),
    ReturnVoid,
}

impl Op {
    pub fn is_terminator(&self) -> bool {
        matches!(
            *self,
            Op::Branch(_) | Op::CondBranch(..) | Op::ReturnVal(_) | Op::ReturnVoid
        )
    }

    // The value operands of the instruction, in order.  Block targets of
    // branches are not values and are not included.
    pub fn operands(&self) -> SmallVec<[Id; 4]> {
        let mut operands = SmallVec::new();
        match self {
            Op::Param | Op::Var | Op::Undefined | Op::Branch(_) | Op::ReturnVoid => {}
            &Op::FieldExtract(base, _) | &Op::FieldAddress(base, _) => operands.push(base),
            &Op::ElementExtract(base, index) | &Op::ElementAddress(base, index) => {
                operands.push(base);
                operands.push(index);
            }
            &Op::Load(ptr) => operands.push(ptr),
            &Op::Store(ptr, value) => {
                operands.push(ptr);
                operands.push(value);
            }
            Op::Construct(args) | Op::MakeArray(args) => operands.extend(args.iter().copied()),
            Op::Call(callee, args) | Op::Specialize(callee, args) => {
                operands.push(*callee);
                operands.extend(args.iter().copied());
            }
            &Op::Generic(yielded) => operands.push(yielded),
            &Op::CondBranch(condition, _, _) => operands.push(condition),
            &Op::ReturnVal(value) => operands.push(value),
        }
        operands
    }

    // Run a closure on every value operand, allowing it to be replaced.
    pub fn for_each_operand_mut<Visit>(&mut self, mut visit: Visit)
    where
        Visit: FnMut(&mut Id),
    {
        match self {
            Op::Param | Op::Var | Op::Undefined | Op::Branch(_) | Op::ReturnVoid => {}
            Op::FieldExtract(base, _) | Op::FieldAddress(base, _) => visit(base),
            Op::ElementExtract(base, index) | Op::ElementAddress(base, index) => {
                visit(base);
                visit(index);
            }
            Op::Load(ptr) => visit(ptr),
            Op::Store(ptr, value) => {
                visit(ptr);
                visit(value);
            }
            Op::Construct(args) | Op::MakeArray(args) => args.iter_mut().for_each(&mut visit),
            Op::Call(callee, args) | Op::Specialize(callee, args) => {
                visit(callee);
                args.iter_mut().for_each(&mut visit);
            }
            Op::Generic(yielded) => visit(yielded),
            Op::CondBranch(condition, _, _) => visit(condition),
            Op::ReturnVal(value) => visit(value),
        }
    }
}

// An instruction: an opcode and the type of its result.  Instructions without
// a meaningful result (stores, terminators) have type void.
#[derive(Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Inst {
    pub op: Op,
    pub type_id: TypeId,
}

impl Inst {
    pub fn new(op: Op, type_id: TypeId) -> Inst {
        Inst { op, type_id }
    }
}

// Out-of-band metadata attached to global parameters and functions.  The
// code generators act on these when emitting declarations.
#[derive(Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub enum Decoration {
    // Binding and semantic information assigned by the layout stage.
    Layout(Rc<VarLayout>),
    // Marks a function as a pipeline entry point.
    EntryPoint(Rc<EntryPointLayout>),
    // Bind a global parameter to a named GLSL built-in variable.
    ImportName(&'static str),
    // The name of an outer array wrapping the built-in, e.g. `gl_in` for
    // geometry-shader inputs.
    GlslOuterArray(&'static str),
    // The function is an intrinsic of the given target, with the given
    // definition text.
    TargetIntrinsic { target: &'static str, definition: &'static str },
    // A keep-alive edge: dead-code elimination must not remove the referenced
    // value while the decorated function is live.
    DependsOn(Id),
}

#[derive(Clone)]
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Decorations {
    pub decorations: Vec<Decoration>,
}

impl Decorations {
    pub fn new_none() -> Decorations {
        Decorations { decorations: Vec::new() }
    }
    pub fn new(decorations: Vec<Decoration>) -> Decorations {
        Decorations { decorations }
    }

    pub fn add_layout(&mut self, layout: Rc<VarLayout>) {
        self.decorations.push(Decoration::Layout(layout));
    }
    pub fn add_entry_point(&mut self, layout: Rc<EntryPointLayout>) {
        self.decorations.push(Decoration::EntryPoint(layout));
    }
    pub fn add_import_name(&mut self, name: &'static str) {
        self.decorations.push(Decoration::ImportName(name));
    }
    pub fn add_glsl_outer_array(&mut self, name: &'static str) {
        self.decorations.push(Decoration::GlslOuterArray(name));
    }
    pub fn add_target_intrinsic(&mut self, target: &'static str, definition: &'static str) {
        self.decorations.push(Decoration::TargetIntrinsic { target, definition });
    }
    pub fn add_depends_on(&mut self, id: Id) {
        self.decorations.push(Decoration::DependsOn(id));
    }

    pub fn find_layout(&self) -> Option<&Rc<VarLayout>> {
        self.decorations.iter().find_map(|decoration| match decoration {
            Decoration::Layout(layout) => Some(layout),
            _ => None,
        })
    }
    pub fn find_entry_point(&self) -> Option<&Rc<EntryPointLayout>> {
        self.decorations.iter().find_map(|decoration| match decoration {
            Decoration::EntryPoint(layout) => Some(layout),
            _ => None,
        })
    }
    pub fn find_import_name(&self) -> Option<&'static str> {
        self.decorations.iter().find_map(|decoration| match decoration {
            &Decoration::ImportName(name) => Some(name),
            _ => None,
        })
    }
    pub fn find_glsl_outer_array(&self) -> Option<&'static str> {
        self.decorations.iter().find_map(|decoration| match decoration {
            &Decoration::GlslOuterArray(name) => Some(name),
            _ => None,
        })
    }
    // The definition text of the intrinsic for the given target, if any.
    pub fn find_target_intrinsic(&self, for_target: &str) -> Option<&'static str> {
        self.decorations.iter().find_map(|decoration| match decoration {
            &Decoration::TargetIntrinsic { target, definition } if target == for_target => {
                Some(definition)
            }
            _ => None,
        })
    }
    pub fn depends_on(&self, query: Id) -> bool {
        self.decorations
            .iter()
            .any(|decoration| matches!(decoration, &Decoration::DependsOn(id) if id == query))
    }
}

// A module-scope shader parameter.  Global parameters have no name of their
// own; the name used in the output comes from their layout or import-name
// decorations.
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct GlobalParam {
    pub type_id: TypeId,
    pub decorations: Decorations,
}

// A block is an ordered list of instructions; the last one is always a
// terminator.
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Block {
    pub insts: Vec<InstId>,
}

impl Block {
    pub fn new() -> Block {
        Block { insts: Vec::with_capacity(8) }
    }
}

impl Default for Block {
    fn default() -> Block {
        Block::new()
    }
}

// A function: its type, its parameters (as `Param` instructions) and a list
// of blocks.  The first block is the entry.
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Func {
    pub name: Name,
    pub type_id: TypeId,
    pub params: Vec<InstId>,
    pub blocks: Vec<Block>,
    pub decorations: Decorations,
}

// The entire IR: tables of types, constants, instructions, global parameters
// and functions, addressed by the strong id types.  Types and constants are
// interned so that structural equality coincides with id equality (except for
// structs, which are nominal).
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Module {
    types: Vec<Type>,
    consts: Vec<Const>,
    insts: Vec<Inst>,
    global_params: Vec<GlobalParam>,
    funcs: Vec<Func>,

    // Interning maps for structural types.
    vector_type_map: FxHashMap<(ScalarType, u32), TypeId>,
    matrix_type_map: FxHashMap<(ScalarType, u32, u32), TypeId>,
    array_type_map: FxHashMap<(TypeId, u32), TypeId>,
    stream_type_map: FxHashMap<(StreamKind, TypeId), TypeId>,
    ptr_type_map: FxHashMap<(PtrKind, TypeId), TypeId>,
    func_type_map: FxHashMap<(Vec<TypeId>, TypeId), TypeId>,

    // Interning maps for constants.
    int_const_map: FxHashMap<i64, ConstId>,
    uint_const_map: FxHashMap<u64, ConstId>,
    float_const_map: FxHashMap<u32, ConstId>,
    bool_const_map: FxHashMap<bool, ConstId>,

    next_field_key: u32,
}

impl Module {
    pub fn new() -> Module {
        // The basic types occupy fixed ids, see the TYPE_ID_* constants.
        let types = vec![
            Type::Void,
            Type::Scalar(ScalarType::Float),
            Type::Scalar(ScalarType::Int),
            Type::Scalar(ScalarType::Uint),
            Type::Scalar(ScalarType::Bool),
        ];

        Module {
            types,
            consts: Vec::new(),
            insts: Vec::new(),
            global_params: Vec::new(),
            funcs: Vec::new(),
            vector_type_map: FxHashMap::default(),
            matrix_type_map: FxHashMap::default(),
            array_type_map: FxHashMap::default(),
            stream_type_map: FxHashMap::default(),
            ptr_type_map: FxHashMap::default(),
            func_type_map: FxHashMap::default(),
            int_const_map: FxHashMap::default(),
            uint_const_map: FxHashMap::default(),
            float_const_map: FxHashMap::default(),
            bool_const_map: FxHashMap::default(),
            next_field_key: 0,
        }
    }

    fn add_type_and_get_id(types: &mut Vec<Type>, type_desc: Type) -> TypeId {
        let id = types.len() as u32;
        types.push(type_desc);
        TypeId { id }
    }

    pub fn get_basic_type_id(&self, scalar_type: ScalarType) -> TypeId {
        match scalar_type {
            ScalarType::Float => TYPE_ID_FLOAT,
            ScalarType::Int => TYPE_ID_INT,
            ScalarType::Uint => TYPE_ID_UINT,
            ScalarType::Bool => TYPE_ID_BOOL,
        }
    }

    pub fn get_vector_type_id(&mut self, scalar_type: ScalarType, size: u32) -> TypeId {
        debug_assert!((2..=4).contains(&size));
        *self.vector_type_map.entry((scalar_type, size)).or_insert_with(|| {
            Self::add_type_and_get_id(&mut self.types, Type::Vector(scalar_type, size))
        })
    }

    pub fn get_matrix_type_id(&mut self, scalar_type: ScalarType, cols: u32, rows: u32) -> TypeId {
        debug_assert!((2..=4).contains(&cols) && (2..=4).contains(&rows));
        *self.matrix_type_map.entry((scalar_type, cols, rows)).or_insert_with(|| {
            Self::add_type_and_get_id(&mut self.types, Type::Matrix(scalar_type, cols, rows))
        })
    }

    pub fn get_array_type_id(&mut self, element_type_id: TypeId, count: u32) -> TypeId {
        *self.array_type_map.entry((element_type_id, count)).or_insert_with(|| {
            Self::add_type_and_get_id(&mut self.types, Type::Array(element_type_id, count))
        })
    }

    pub fn get_stream_type_id(&mut self, kind: StreamKind, element_type_id: TypeId) -> TypeId {
        *self.stream_type_map.entry((kind, element_type_id)).or_insert_with(|| {
            Self::add_type_and_get_id(&mut self.types, Type::Stream(kind, element_type_id))
        })
    }

    pub fn get_ptr_type_id(&mut self, kind: PtrKind, pointee_type_id: TypeId) -> TypeId {
        debug_assert!(!self.get_type(pointee_type_id).is_ptr());
        *self.ptr_type_map.entry((kind, pointee_type_id)).or_insert_with(|| {
            Self::add_type_and_get_id(&mut self.types, Type::Ptr(kind, pointee_type_id))
        })
    }

    pub fn get_out_type_id(&mut self, pointee_type_id: TypeId) -> TypeId {
        self.get_ptr_type_id(PtrKind::Out, pointee_type_id)
    }

    pub fn get_inout_type_id(&mut self, pointee_type_id: TypeId) -> TypeId {
        self.get_ptr_type_id(PtrKind::InOut, pointee_type_id)
    }

    pub fn get_func_type_id(&mut self, params: Vec<TypeId>, return_type_id: TypeId) -> TypeId {
        if let Some(&existing) = self.func_type_map.get(&(params.clone(), return_type_id)) {
            return existing;
        }
        let id = Self::add_type_and_get_id(
            &mut self.types,
            Type::Func(params.clone(), return_type_id),
        );
        self.func_type_map.insert((params, return_type_id), id);
        id
    }

    // Struct types are nominal: this always makes a new type, and allocates a
    // fresh key for every field.
    pub fn get_struct_type_id(&mut self, name: Name, fields: Vec<(Name, TypeId)>) -> TypeId {
        let fields = fields
            .into_iter()
            .map(|(field_name, type_id)| {
                let key = FieldKey { id: self.next_field_key };
                self.next_field_key += 1;
                Field { name: field_name, key, type_id }
            })
            .collect();
        Self::add_type_and_get_id(&mut self.types, Type::Struct(name, fields))
    }

    pub fn get_type(&self, type_id: TypeId) -> &Type {
        &self.types[type_id.id as usize]
    }

    pub fn all_types(&self) -> &Vec<Type> {
        &self.types
    }

    // The element type of an array or vector.
    pub fn get_element_type_id(&self, type_id: TypeId) -> TypeId {
        match self.get_type(type_id) {
            &Type::Array(element, _) => element,
            &Type::Vector(scalar_type, _) => self.get_basic_type_id(scalar_type),
            _ => panic!("Internal error: Expected array or vector type"),
        }
    }

    // The type of a struct field identified by key.
    pub fn get_field_type_id(&self, struct_type_id: TypeId, key: FieldKey) -> TypeId {
        let fields = self.get_type(struct_type_id).get_struct_fields();
        match fields.iter().find(|field| field.key == key) {
            Some(field) => field.type_id,
            None => panic!("Internal error: No such field"),
        }
    }

    pub fn get_int_value(&mut self, value: i64) -> ConstId {
        let consts = &mut self.consts;
        *self.int_const_map.entry(value).or_insert_with(|| {
            let id = ConstId { id: consts.len() as u32 };
            consts.push(Const { type_id: TYPE_ID_INT, value: ConstValue::Int(value) });
            id
        })
    }

    pub fn get_uint_value(&mut self, value: u64) -> ConstId {
        let consts = &mut self.consts;
        *self.uint_const_map.entry(value).or_insert_with(|| {
            let id = ConstId { id: consts.len() as u32 };
            consts.push(Const { type_id: TYPE_ID_UINT, value: ConstValue::Uint(value) });
            id
        })
    }

    pub fn get_float_value(&mut self, value: f32) -> ConstId {
        let consts = &mut self.consts;
        *self.float_const_map.entry(value.to_bits()).or_insert_with(|| {
            let id = ConstId { id: consts.len() as u32 };
            consts.push(Const { type_id: TYPE_ID_FLOAT, value: ConstValue::Float(value) });
            id
        })
    }

    pub fn get_bool_value(&mut self, value: bool) -> ConstId {
        let consts = &mut self.consts;
        *self.bool_const_map.entry(value).or_insert_with(|| {
            let id = ConstId { id: consts.len() as u32 };
            consts.push(Const { type_id: TYPE_ID_BOOL, value: ConstValue::Bool(value) });
            id
        })
    }

    pub fn get_const(&self, const_id: ConstId) -> &Const {
        &self.consts[const_id.id as usize]
    }

    pub fn all_consts(&self) -> &Vec<Const> {
        &self.consts
    }

    pub fn add_inst(&mut self, inst: Inst) -> InstId {
        let id = InstId { id: self.insts.len() as u32 };
        self.insts.push(inst);
        id
    }

    pub fn get_inst(&self, inst_id: InstId) -> &Inst {
        &self.insts[inst_id.id as usize]
    }

    pub fn get_inst_mut(&mut self, inst_id: InstId) -> &mut Inst {
        &mut self.insts[inst_id.id as usize]
    }

    pub fn inst_count(&self) -> usize {
        self.insts.len()
    }

    pub fn create_global_param(&mut self, type_id: TypeId) -> GlobalParamId {
        let id = GlobalParamId { id: self.global_params.len() as u32 };
        self.global_params.push(GlobalParam { type_id, decorations: Decorations::new_none() });
        id
    }

    pub fn get_global_param(&self, id: GlobalParamId) -> &GlobalParam {
        &self.global_params[id.id as usize]
    }

    pub fn get_global_param_mut(&mut self, id: GlobalParamId) -> &mut GlobalParam {
        &mut self.global_params[id.id as usize]
    }

    pub fn all_global_params(&self) -> &Vec<GlobalParam> {
        &self.global_params
    }

    pub fn add_func(
        &mut self,
        name: Name,
        param_type_ids: Vec<TypeId>,
        return_type_id: TypeId,
    ) -> FuncId {
        let type_id = self.get_func_type_id(param_type_ids.clone(), return_type_id);
        let params = param_type_ids
            .into_iter()
            .map(|param_type_id| self.add_inst(Inst::new(Op::Param, param_type_id)))
            .collect();
        let id = FuncId { id: self.funcs.len() as u32 };
        self.funcs.push(Func {
            name,
            type_id,
            params,
            blocks: Vec::new(),
            decorations: Decorations::new_none(),
        });
        id
    }

    pub fn get_func(&self, func_id: FuncId) -> &Func {
        &self.funcs[func_id.id as usize]
    }

    pub fn get_func_mut(&mut self, func_id: FuncId) -> &mut Func {
        &mut self.funcs[func_id.id as usize]
    }

    pub fn all_funcs(&self) -> &Vec<Func> {
        &self.funcs
    }

    pub fn get_func_return_type_id(&self, func_id: FuncId) -> TypeId {
        self.get_type(self.get_func(func_id).type_id).get_func_return_type()
    }

    // The type of any operand id.
    pub fn type_of(&self, id: Id) -> TypeId {
        match id {
            Id::Inst(inst_id) => self.get_inst(inst_id).type_id,
            Id::Const(const_id) => self.get_const(const_id).type_id,
            Id::Global(global_id) => self.get_global_param(global_id).type_id,
            Id::Func(func_id) => self.get_func(func_id).type_id,
        }
    }

    // Replace every use of `from` with `to` in the operands of the given
    // function's instructions.
    pub fn replace_uses_in_func(&mut self, func_id: FuncId, from: Id, to: Id) {
        let block_insts: Vec<InstId> = self
            .get_func(func_id)
            .blocks
            .iter()
            .flat_map(|block| block.insts.iter().copied())
            .collect();
        for inst_id in block_insts {
            self.insts[inst_id.id as usize].op.for_each_operand_mut(|operand| {
                if *operand == from {
                    *operand = to;
                }
            });
        }
    }

    // The number of operand references to the given function anywhere in the
    // module.  Entry points must have none before legalization, since
    // rewriting their signature would invalidate call sites.
    pub fn count_func_uses(&self, func_id: FuncId) -> usize {
        let query = Id::Func(func_id);
        self.funcs
            .iter()
            .flat_map(|func| func.blocks.iter())
            .flat_map(|block| block.insts.iter())
            .map(|&inst_id| {
                self.get_inst(inst_id)
                    .op
                    .operands()
                    .iter()
                    .filter(|&&operand| operand == query)
                    .count()
            })
            .sum()
    }
}

impl Default for Module {
    fn default() -> Module {
        Module::new()
    }
}
