//! The built-in `dotlin.lang` module.
//!
//! The types themselves live at fixed ids in every [`TypeHierarchy`]; this module
//! describes the operator functions defined on them. The description is built once
//! per process and instantiated into each compilation's arenas.
//!
//! [`TypeHierarchy`]: dotlin_core::TypeHierarchy

use dotlin_core::FunctionModifiers;
use lazy_static::lazy_static;

/// A parameter of a built-in function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinParam {
    pub name: &'static str,
    /// Simple name of a `dotlin.lang` type.
    pub ty: &'static str,
    pub nullable: bool,
}

/// A function implemented outside the language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub receiver: &'static str,
    pub params: Vec<BuiltinParam>,
    pub return_type: &'static str,
    pub modifiers: FunctionModifiers,
}

impl BuiltinFunction {
    fn operator(name: &'static str, receiver: &'static str, params: Vec<BuiltinParam>, returns: &'static str) -> Self {
        Self {
            name,
            receiver,
            params,
            return_type: returns,
            modifiers: FunctionModifiers::EXTERNAL
                | FunctionModifiers::PURE
                | FunctionModifiers::READONLY
                | FunctionModifiers::OPERATOR,
        }
    }
}

fn param(ty: &'static str) -> BuiltinParam {
    BuiltinParam {
        name: "other",
        ty,
        nullable: false,
    }
}

/// Simple names of the built-in types, in [`builtin_types`](dotlin_core::builtin_types) order.
pub const BUILTIN_TYPE_NAMES: [&str; 6] = ["Any", "Unit", "Number", "Float", "Int", "Boolean"];

lazy_static! {
    /// Operator functions of `dotlin.lang`, in declaration order.
    pub static ref BUILTIN_FUNCTIONS: Vec<BuiltinFunction> = {
        let mut functions = Vec::new();

        for name in ["opPlus", "opMinus", "opTimes", "opDivide"] {
            functions.push(BuiltinFunction::operator(name, "Int", vec![param("Int")], "Int"));
            functions.push(BuiltinFunction::operator(name, "Int", vec![param("Float")], "Float"));
            functions.push(BuiltinFunction::operator(name, "Float", vec![param("Float")], "Float"));
            functions.push(BuiltinFunction::operator(name, "Float", vec![param("Int")], "Float"));
        }

        functions.push(BuiltinFunction::operator("opCompare", "Number", vec![param("Number")], "Int"));
        functions.push(BuiltinFunction::operator(
            "opEquals",
            "Any",
            vec![BuiltinParam {
                name: "other",
                ty: "Any",
                nullable: true,
            }],
            "Boolean",
        ));

        functions.push(BuiltinFunction::operator("unaryMinus", "Int", vec![], "Int"));
        functions.push(BuiltinFunction::operator("unaryMinus", "Float", vec![], "Float"));
        functions.push(BuiltinFunction::operator("unaryNot", "Boolean", vec![], "Boolean"));

        functions
    };
}
