// Copyright 2026 The slir Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.
//
// Debug utilities.  Notably, the module can be dumped as text for
// inspection.

use std::fmt::Write;

use crate::ir::*;

fn inst_id_str(id: InstId) -> String {
    format!("i{}", id.id)
}

fn const_id_str(id: ConstId) -> String {
    format!("c{}", id.id)
}

fn global_id_str(id: GlobalParamId) -> String {
    format!("g{}", id.id)
}

fn func_id_str(id: FuncId) -> String {
    format!("f{}", id.id)
}

fn id_str(id: Id) -> String {
    match id {
        Id::Inst(inst_id) => inst_id_str(inst_id),
        Id::Const(const_id) => const_id_str(const_id),
        Id::Global(global_id) => global_id_str(global_id),
        Id::Func(func_id) => func_id_str(func_id),
    }
}

fn id_list_str(ids: &[Id]) -> String {
    ids.iter().map(|&id| id_str(id)).collect::<Vec<_>>().join(", ")
}

fn scalar_type_str(scalar_type: ScalarType) -> &'static str {
    match scalar_type {
        ScalarType::Float => "float",
        ScalarType::Int => "int",
        ScalarType::Uint => "uint",
        ScalarType::Bool => "bool",
    }
}

pub fn type_str(module: &Module, type_id: TypeId) -> String {
    match module.get_type(type_id) {
        Type::Void => "void".to_string(),
        &Type::Scalar(scalar_type) => scalar_type_str(scalar_type).to_string(),
        &Type::Vector(scalar_type, size) => {
            format!("{}{}", scalar_type_str(scalar_type), size)
        }
        &Type::Matrix(scalar_type, cols, rows) => {
            format!("{}{}x{}", scalar_type_str(scalar_type), cols, rows)
        }
        &Type::Array(element, count) => format!("{}[{}]", type_str(module, element), count),
        Type::Struct(name, _) => name.name.to_string(),
        &Type::Stream(kind, element) => {
            let kind = match kind {
                StreamKind::Point => "PointStream",
                StreamKind::Line => "LineStream",
                StreamKind::Triangle => "TriangleStream",
            };
            format!("{}<{}>", kind, type_str(module, element))
        }
        &Type::Ptr(kind, pointee) => {
            let kind = match kind {
                PtrKind::Ptr => "Ptr",
                PtrKind::Out => "Out",
                PtrKind::InOut => "InOut",
            };
            format!("{}<{}>", kind, type_str(module, pointee))
        }
        Type::Func(params, return_type) => {
            let params =
                params.iter().map(|&param| type_str(module, param)).collect::<Vec<_>>().join(", ");
            format!("({}) -> {}", params, type_str(module, *return_type))
        }
    }
}

fn op_str(module: &Module, op: &Op) -> String {
    match op {
        Op::Param => "Param".to_string(),
        Op::Var => "Var".to_string(),
        Op::Undefined => "Undefined".to_string(),
        Op::FieldExtract(base, key) => {
            format!("FieldExtract {} key{}", id_str(*base), key.id)
        }
        Op::FieldAddress(base, key) => {
            format!("FieldAddress {} key{}", id_str(*base), key.id)
        }
        Op::ElementExtract(base, index) => {
            format!("ElementExtract {} {}", id_str(*base), id_str(*index))
        }
        Op::ElementAddress(base, index) => {
            format!("ElementAddress {} {}", id_str(*base), id_str(*index))
        }
        Op::Load(ptr) => format!("Load {}", id_str(*ptr)),
        Op::Store(ptr, value) => format!("Store {} {}", id_str(*ptr), id_str(*value)),
        Op::Construct(args) => format!("Construct {}", id_list_str(args)),
        Op::MakeArray(elements) => format!("MakeArray {}", id_list_str(elements)),
        Op::Call(callee, args) => {
            format!("Call {} {}", id_str(*callee), id_list_str(args))
        }
        Op::Specialize(generic, args) => {
            format!("Specialize {} {}", id_str(*generic), id_list_str(args))
        }
        Op::Generic(yielded) => format!("Generic {}", id_str(*yielded)),
        Op::Branch(target) => format!("Branch b{}", target.id),
        Op::CondBranch(condition, if_true, if_false) => {
            format!("CondBranch {} b{} b{}", id_str(*condition), if_true.id, if_false.id)
        }
        Op::ReturnVal(value) => format!("Return {}", id_str(*value)),
        Op::ReturnVoid => "Return".to_string(),
    }
}

fn resource_kind_str(kind: crate::layout::ResourceKind) -> &'static str {
    match kind {
        crate::layout::ResourceKind::VaryingInput => "in",
        crate::layout::ResourceKind::VaryingOutput => "out",
    }
}

fn decorations_str(decorations: &Decorations) -> String {
    let mut result = String::new();
    for decoration in &decorations.decorations {
        match decoration {
            Decoration::Layout(layout) => {
                for info in &layout.resource_infos {
                    write!(result, " [layout {}:{}]", resource_kind_str(info.kind), info.index)
                        .unwrap();
                }
            }
            Decoration::EntryPoint(layout) => {
                write!(result, " [entry point \"{}\"]", layout.name).unwrap();
            }
            Decoration::ImportName(name) => write!(result, " [import \"{}\"]", name).unwrap(),
            Decoration::GlslOuterArray(name) => {
                write!(result, " [outer array \"{}\"]", name).unwrap()
            }
            Decoration::TargetIntrinsic { target, definition } => {
                write!(result, " [intrinsic {} \"{}\"]", target, definition).unwrap()
            }
            &Decoration::DependsOn(id) => {
                write!(result, " [depends on {}]", id_str(id)).unwrap()
            }
        }
    }
    result
}

// Dump the entire module as text, for inspection while debugging.
pub fn module_debug_string(module: &Module) -> String {
    let mut text = String::new();

    for (index, global) in module.all_global_params().iter().enumerate() {
        let id = GlobalParamId { id: index as u32 };
        writeln!(
            text,
            "global param {}: {}{}",
            global_id_str(id),
            type_str(module, global.type_id),
            decorations_str(&global.decorations),
        )
        .unwrap();
    }

    for (index, func) in module.all_funcs().iter().enumerate() {
        let id = FuncId { id: index as u32 };
        writeln!(
            text,
            "func {} \"{}\": {}{}",
            func_id_str(id),
            func.name.name,
            type_str(module, func.type_id),
            decorations_str(&func.decorations),
        )
        .unwrap();

        for &param in &func.params {
            let param_type = module.get_inst(param).type_id;
            writeln!(
                text,
                "  param {}: {}",
                inst_id_str(param),
                type_str(module, param_type)
            )
            .unwrap();
        }

        for (block_index, block) in func.blocks.iter().enumerate() {
            writeln!(text, "  b{}:", block_index).unwrap();
            for &inst_id in &block.insts {
                let inst = module.get_inst(inst_id);
                if inst.type_id == TYPE_ID_VOID {
                    writeln!(text, "    {}", op_str(module, &inst.op)).unwrap();
                } else {
                    writeln!(
                        text,
                        "    {}: {} = {}",
                        inst_id_str(inst_id),
                        type_str(module, inst.type_id),
                        op_str(module, &inst.op),
                    )
                    .unwrap();
                }
            }
        }
    }

    text
}
