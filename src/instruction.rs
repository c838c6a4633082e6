// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Helper functions to create instructions given operands.  The result type is
// deduced from the operand types; mistakes are programmer errors and panic.

use crate::ir::*;

// The type referenced by a pointer operand, together with the pointer kind.
// Access instructions on pointers preserve the kind in their result, so that
// a field of an `out` aggregate is itself writable as an `out`.
fn pointee(module: &Module, ptr: Id) -> (PtrKind, TypeId) {
    module.get_type(module.type_of(ptr)).get_ptr()
}

// A local variable holding a value of the given type.  The result is a plain
// pointer to the storage.
pub fn var(module: &mut Module, value_type_id: TypeId) -> Inst {
    let type_id = module.get_ptr_type_id(PtrKind::Ptr, value_type_id);
    Inst::new(Op::Var, type_id)
}

pub fn undefined(type_id: TypeId) -> Inst {
    Inst::new(Op::Undefined, type_id)
}

pub fn field_extract(module: &mut Module, base: Id, key: FieldKey) -> Inst {
    let field_type_id = module.get_field_type_id(module.type_of(base), key);
    Inst::new(Op::FieldExtract(base, key), field_type_id)
}

pub fn field_address(module: &mut Module, base: Id, key: FieldKey) -> Inst {
    let (ptr_kind, struct_type_id) = pointee(module, base);
    let field_type_id = module.get_field_type_id(struct_type_id, key);
    let result_type_id = module.get_ptr_type_id(ptr_kind, field_type_id);
    Inst::new(Op::FieldAddress(base, key), result_type_id)
}

pub fn element_extract(module: &mut Module, base: Id, index: Id) -> Inst {
    let element_type_id = module.get_element_type_id(module.type_of(base));
    Inst::new(Op::ElementExtract(base, index), element_type_id)
}

pub fn element_address(module: &mut Module, base: Id, index: Id) -> Inst {
    let (ptr_kind, base_type_id) = pointee(module, base);
    let element_type_id = module.get_element_type_id(base_type_id);
    let result_type_id = module.get_ptr_type_id(ptr_kind, element_type_id);
    Inst::new(Op::ElementAddress(base, index), result_type_id)
}

pub fn load(module: &mut Module, ptr: Id) -> Inst {
    let (_, pointee_type_id) = pointee(module, ptr);
    Inst::new(Op::Load(ptr), pointee_type_id)
}

pub fn store(module: &mut Module, ptr: Id, value: Id) -> Inst {
    debug_assert!({
        let (_, pointee_type_id) = pointee(module, ptr);
        pointee_type_id == module.type_of(value)
    });
    Inst::new(Op::Store(ptr, value), TYPE_ID_VOID)
}

pub fn construct(type_id: TypeId, args: Vec<Id>) -> Inst {
    Inst::new(Op::Construct(args), type_id)
}

pub fn make_array(module: &mut Module, type_id: TypeId, elements: Vec<Id>) -> Inst {
    debug_assert!({
        let (_, count) = module.get_type(type_id).get_array();
        count as usize == elements.len()
    });
    Inst::new(Op::MakeArray(elements), type_id)
}

// The result type of a call is the return type of the callee's function
// type; specialization wrappers have their callee's type, so the deduction
// sees through them.
pub fn call(module: &mut Module, callee: Id, args: Vec<Id>) -> Inst {
    let return_type_id = module.get_type(module.type_of(callee)).get_func_return_type();
    Inst::new(Op::Call(callee, args), return_type_id)
}

pub fn specialize(module: &mut Module, generic: Id, args: Vec<Id>) -> Inst {
    let type_id = module.type_of(generic);
    Inst::new(Op::Specialize(generic, args), type_id)
}

pub fn generic(module: &mut Module, yielded: Id) -> Inst {
    let type_id = module.type_of(yielded);
    Inst::new(Op::Generic(yielded), type_id)
}

pub fn branch(target: BlockId) -> Inst {
    Inst::new(Op::Branch(target), TYPE_ID_VOID)
}

pub fn cond_branch(condition: Id, if_true: BlockId, if_false: BlockId) -> Inst {
    Inst::new(Op::CondBranch(condition, if_true, if_false), TYPE_ID_VOID)
}

pub fn return_val(value: Id) -> Inst {
    Inst::new(Op::ReturnVal(value), TYPE_ID_VOID)
}

pub fn return_void() -> Inst {
    Inst::new(Op::ReturnVoid, TYPE_ID_VOID)
}
