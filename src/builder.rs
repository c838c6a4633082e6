// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// An insertion-point based builder over the blocks of one function.  The
// builder holds only a position, not a borrow of the module, so several
// builders over the same function can coexist; transformations rely on this
// to keep a stable top-of-function insertion point while also rewriting
// return sites elsewhere.

use crate::instruction;
use crate::ir::*;

#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Builder {
    func: FuncId,
    block: usize,
    index: usize,
}

impl Builder {
    // A builder inserting at the top of the function's entry block.
    pub fn at_entry_begin(func: FuncId) -> Builder {
        Builder { func, block: 0, index: 0 }
    }

    // A builder inserting at the given position of the given block.
    pub fn at(func: FuncId, block: usize, index: usize) -> Builder {
        Builder { func, block, index }
    }

    // A builder inserting immediately before the given instruction.
    pub fn before_inst(module: &Module, func: FuncId, inst_id: InstId) -> Builder {
        for (block, block_data) in module.get_func(func).blocks.iter().enumerate() {
            if let Some(index) = block_data.insts.iter().position(|&id| id == inst_id) {
                return Builder { func, block, index };
            }
        }
        panic!("Internal error: Instruction not found in function");
    }

    pub fn func(&self) -> FuncId {
        self.func
    }
    pub fn block(&self) -> usize {
        self.block
    }
    // The position the next instruction will be inserted at.  After emitting,
    // this is the position just past the last emitted instruction.
    pub fn index(&self) -> usize {
        self.index
    }

    // Add the instruction to the module and insert it at the current
    // position, advancing past it.
    pub fn insert(&mut self, module: &mut Module, inst: Inst) -> InstId {
        let inst_id = module.add_inst(inst);
        let insts = &mut module.get_func_mut(self.func).blocks[self.block].insts;
        debug_assert!(self.index <= insts.len());
        insts.insert(self.index, inst_id);
        self.index += 1;
        inst_id
    }

    pub fn emit_var(&mut self, module: &mut Module, value_type_id: TypeId) -> Id {
        let inst = instruction::var(module, value_type_id);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_undefined(&mut self, module: &mut Module, type_id: TypeId) -> Id {
        Id::Inst(self.insert(module, instruction::undefined(type_id)))
    }

    pub fn emit_field_extract(&mut self, module: &mut Module, base: Id, key: FieldKey) -> Id {
        let inst = instruction::field_extract(module, base, key);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_field_address(&mut self, module: &mut Module, base: Id, key: FieldKey) -> Id {
        let inst = instruction::field_address(module, base, key);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_element_extract(&mut self, module: &mut Module, base: Id, index: Id) -> Id {
        let inst = instruction::element_extract(module, base, index);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_element_address(&mut self, module: &mut Module, base: Id, index: Id) -> Id {
        let inst = instruction::element_address(module, base, index);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_load(&mut self, module: &mut Module, ptr: Id) -> Id {
        let inst = instruction::load(module, ptr);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_store(&mut self, module: &mut Module, ptr: Id, value: Id) {
        let inst = instruction::store(module, ptr, value);
        self.insert(module, inst);
    }

    pub fn emit_construct(&mut self, module: &mut Module, type_id: TypeId, args: Vec<Id>) -> Id {
        Id::Inst(self.insert(module, instruction::construct(type_id, args)))
    }

    pub fn emit_make_array(
        &mut self,
        module: &mut Module,
        type_id: TypeId,
        elements: Vec<Id>,
    ) -> Id {
        let inst = instruction::make_array(module, type_id, elements);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_call(&mut self, module: &mut Module, callee: Id, args: Vec<Id>) -> Id {
        let inst = instruction::call(module, callee, args);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_specialize(&mut self, module: &mut Module, generic: Id, args: Vec<Id>) -> Id {
        let inst = instruction::specialize(module, generic, args);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_generic(&mut self, module: &mut Module, yielded: Id) -> Id {
        let inst = instruction::generic(module, yielded);
        Id::Inst(self.insert(module, inst))
    }

    pub fn emit_branch(&mut self, module: &mut Module, target: BlockId) {
        self.insert(module, instruction::branch(target));
    }

    pub fn emit_cond_branch(
        &mut self,
        module: &mut Module,
        condition: Id,
        if_true: BlockId,
        if_false: BlockId,
    ) {
        self.insert(module, instruction::cond_branch(condition, if_true, if_false));
    }

    pub fn emit_return_val(&mut self, module: &mut Module, value: Id) {
        self.insert(module, instruction::return_val(value));
    }

    pub fn emit_return_void(&mut self, module: &mut Module) -> InstId {
        self.insert(module, instruction::return_void())
    }
}
