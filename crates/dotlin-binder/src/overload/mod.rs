//! Overload resolution for invocations.
//!
//! ## Algorithm
//!
//! 1. Collect every function visible under the invoked name (done by the caller)
//! 2. Keep candidates whose receiver is compatible with the actual receiver
//! 3. Keep candidates whose parameter count and parameter types accept the arguments
//! 4. Rank survivors by total hierarchical distance, declaration order breaking ties
//!
//! Unknown types never rule a candidate out: an argument (or a declared parameter)
//! without a resolved type matches anything at distance zero, so one unresolved
//! expression does not cascade into a second error at every enclosing call.

mod ranking;

pub use ranking::{ambiguous_invocation_error, format_candidate, is_ambiguous, rank};

use dotlin_core::{InternalResult, TypeRef};

use crate::function::Signature;
use crate::ids::FunctionId;
use crate::program::BoundProgram;

/// A candidate that accepts the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverloadMatch {
    /// The applicable function.
    pub function: FunctionId,
    /// Hierarchical distance summed over receiver and parameters (lower is better).
    pub distance: u32,
}

/// Resolve an invocation against `candidates`.
///
/// `receiver` is `None` for an unqualified call. Returns every applicable
/// candidate, best first; an empty list means nothing applies.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_overload(
    program: &BoundProgram<'_>,
    candidates: &[FunctionId],
    receiver: Option<&TypeRef>,
    arguments: &[Option<TypeRef>],
) -> InternalResult<Vec<OverloadMatch>> {
    let mut applicable = Vec::with_capacity(candidates.len());
    for &function in candidates {
        let signature = program.function(function)?.signature(program);
        if let Some(distance) = try_match_candidate(program, signature, receiver, arguments)? {
            applicable.push(OverloadMatch { function, distance });
        } else {
            tracing::trace!(?function, "overload candidate rejected");
        }
    }
    rank(&mut applicable);
    Ok(applicable)
}

/// The distance of a candidate, or `None` if it does not accept the invocation.
fn try_match_candidate(
    program: &BoundProgram<'_>,
    signature: &Signature,
    receiver: Option<&TypeRef>,
    arguments: &[Option<TypeRef>],
) -> InternalResult<Option<u32>> {
    let types = program.types();
    let mut distance = 0;

    match (receiver, signature.has_receiver) {
        (None, false) => {}
        (None, true) | (Some(_), false) => return Ok(None),
        (Some(actual), true) => {
            if let Some(declared) = &signature.receiver {
                if !types.is_subtype_of(actual.base, declared.base)? {
                    return Ok(None);
                }
                distance += types.hierarchical_distance_to(actual.base, declared.base)?;
            }
        }
    }

    if signature.params.len() != arguments.len() {
        return Ok(None);
    }

    for (param, argument) in signature.params.iter().zip(arguments) {
        let (Some(param), Some(argument)) = (param, argument) else {
            continue;
        };
        if !types.is_assignable(argument, param)? {
            return Ok(None);
        }
        distance += types.hierarchical_distance_to(argument.base, param.base)?;
    }

    Ok(Some(distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use dotlin_ast::AstBuilder;
    use dotlin_core::builtin_types;

    use crate::ids::ContextId;
    use crate::options::BinderOptions;
    use crate::passes::ConstructionPass;

    fn ty(base: dotlin_core::TypeId) -> Option<TypeRef> {
        Some(TypeRef::simple(base))
    }

    #[test]
    fn unknown_argument_matches_at_distance_zero() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let module = ast.module(
            "app",
            &[],
            &[
                ast.fun("f").param("a", "Int").build(),
                ast.fun("f").param("a", "Number").build(),
            ],
        );
        let program = ConstructionPass::new(BinderOptions::default())
            .run(&[module])
            .unwrap()
            .program;
        let candidates: Vec<FunctionId> = program.find_functions("f").map(|f| f.id()).collect();

        let matches = resolve_overload(&program, &candidates, None, &[None]).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| m.distance == 0));

        let matches = resolve_overload(&program, &candidates, None, &[ty(builtin_types::INT)]).unwrap();
        assert_eq!(matches[0].function, candidates[0]);
        assert_eq!(matches[1].distance, 1);

        let matches = resolve_overload(
            &program,
            &candidates,
            None,
            &[ty(builtin_types::INT), ty(builtin_types::INT)],
        )
        .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn receiver_presence_must_agree() {
        let program = ConstructionPass::new(BinderOptions::default())
            .run(&[])
            .unwrap()
            .program;
        let candidates = program
            .contexts()
            .resolve_any_functions(ContextId::BUILTIN, "opPlus");
        let int = TypeRef::simple(builtin_types::INT);

        let matches =
            resolve_overload(&program, &candidates, Some(&int), &[ty(builtin_types::FLOAT)]).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].distance, 0);

        let matches = resolve_overload(&program, &candidates, None, &[ty(builtin_types::FLOAT)]).unwrap();
        assert!(matches.is_empty());
    }
}
