// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Structural validation of the IR.  This is meant to run after
// transformations, to catch IR the transformations should not have produced.
// It checks shape, not full typing; a later stage type-checks the module.

use crate::ir::*;

struct Validator<'a> {
    module: &'a Module,
}

impl<'a> Validator<'a> {
    fn new(module: &'a Module) -> Validator<'a> {
        Validator { module }
    }

    fn validate(&self) {
        for func_index in 0..self.module.all_funcs().len() {
            self.validate_func(FuncId { id: func_index as u32 });
        }
        for global in self.module.all_global_params() {
            // Make sure the type table contains the type.
            let _ = self.module.get_type(global.type_id);
        }
    }

    fn validate_func(&self, func_id: FuncId) {
        let func = self.module.get_func(func_id);

        let param_count = match self.module.get_type(func.type_id) {
            Type::Func(params, _) => params.len(),
            _ => panic!("Internal error: Function with a non-function type"),
        };
        if func.params.len() != param_count {
            panic!("Internal error: Function parameter list does not match its type");
        }
        for &param in &func.params {
            if !matches!(self.module.get_inst(param).op, Op::Param) {
                panic!("Internal error: Function parameter is not a Param instruction");
            }
        }

        for block in &func.blocks {
            self.validate_block(func, block);
        }
    }

    fn validate_block(&self, func: &Func, block: &Block) {
        if block.insts.is_empty() {
            panic!("Internal error: Empty block");
        }

        for (index, &inst_id) in block.insts.iter().enumerate() {
            let inst = self.module.get_inst(inst_id);
            let is_last = index + 1 == block.insts.len();
            if inst.op.is_terminator() != is_last {
                panic!("Internal error: Terminator must be the last instruction of its block");
            }
            self.validate_inst(func, inst);
        }
    }

    fn validate_inst(&self, func: &Func, inst: &Inst) {
        // Every operand must refer to something the module knows about.
        for operand in inst.op.operands() {
            let _ = self.module.type_of(operand);
        }

        match &inst.op {
            Op::Load(ptr) => {
                if !self.module.get_type(self.module.type_of(*ptr)).is_ptr() {
                    panic!("Internal error: Load from a non-pointer");
                }
            }
            Op::Store(ptr, value) => {
                let (_, pointee) = self.module.get_type(self.module.type_of(*ptr)).get_ptr();
                if pointee != self.module.type_of(*value) {
                    panic!("Internal error: Store of a mismatched type");
                }
            }
            Op::FieldExtract(base, key) => {
                // Panics if the base is not a struct or the key is foreign.
                let _ = self.module.get_field_type_id(self.module.type_of(*base), *key);
            }
            Op::FieldAddress(base, key) => {
                let (_, pointee) = self.module.get_type(self.module.type_of(*base)).get_ptr();
                let _ = self.module.get_field_type_id(pointee, *key);
            }
            Op::ElementExtract(base, _) => {
                let _ = self.module.get_element_type_id(self.module.type_of(*base));
            }
            Op::ElementAddress(base, _) => {
                let (_, pointee) = self.module.get_type(self.module.type_of(*base)).get_ptr();
                let _ = self.module.get_element_type_id(pointee);
            }
            Op::MakeArray(elements) => {
                let (element_type, count) = self.module.get_type(inst.type_id).get_array();
                if count as usize != elements.len() {
                    panic!("Internal error: MakeArray with the wrong element count");
                }
                for &element in elements {
                    if self.module.type_of(element) != element_type {
                        panic!("Internal error: MakeArray element of a mismatched type");
                    }
                }
            }
            Op::Construct(args) => {
                if args.is_empty() {
                    panic!("Internal error: Construct with no arguments");
                }
                if self.module.get_type(inst.type_id).is_void() {
                    panic!("Internal error: Construct of void");
                }
            }
            Op::Call(callee, _) => {
                let callee = *callee;
                let resolved_type = self.module.type_of(callee);
                if !matches!(self.module.get_type(resolved_type), Type::Func(..)) {
                    panic!("Internal error: Call of a non-function");
                }
            }
            Op::Branch(target) => {
                self.validate_branch_target(func, *target);
            }
            Op::CondBranch(_, if_true, if_false) => {
                self.validate_branch_target(func, *if_true);
                self.validate_branch_target(func, *if_false);
            }
            _ => {}
        }
    }

    fn validate_branch_target(&self, func: &Func, target: BlockId) {
        if target.id as usize >= func.blocks.len() {
            panic!("Internal error: Branch to a block outside the function");
        }
    }
}

// Validate the structural rules of the IR, panicking on the first violation.
pub fn validate_module(module: &Module) {
    Validator::new(module).validate();
}
