//! Distance-based ranking of applicable overloads.

use dotlin_core::{InternalResult, SemanticError, Span, TypeRef};

use super::OverloadMatch;
use crate::program::BoundProgram;

/// Sort by distance, ascending. The sort is stable, so candidates at equal
/// distance stay in declaration order.
pub fn rank(matches: &mut [OverloadMatch]) {
    matches.sort_by_key(|m| m.distance);
}

/// Whether the two best matches tie.
pub fn is_ambiguous(ranked: &[OverloadMatch]) -> bool {
    match ranked {
        [best, second, ..] => best.distance == second.distance,
        _ => false,
    }
}

/// Build the diagnostic for a tie, naming every candidate at the best distance.
pub fn ambiguous_invocation_error(
    program: &BoundProgram<'_>,
    name: &str,
    ranked: &[OverloadMatch],
    span: Span,
) -> InternalResult<SemanticError> {
    let best = ranked.first().map_or(0, |m| m.distance);
    let candidates = ranked
        .iter()
        .take_while(|m| m.distance == best)
        .map(|m| format_candidate(program, m))
        .collect::<InternalResult<Vec<_>>>()?;

    Ok(SemanticError::AmbiguousInvocation {
        name: name.to_string(),
        candidates: candidates.join(" and "),
        span,
    })
}

/// `Receiver.name(Param, Param)`, with `?` for parameters of unknown type.
pub fn format_candidate(program: &BoundProgram<'_>, m: &OverloadMatch) -> InternalResult<String> {
    let function = program.function(m.function)?;
    let signature = function.signature(program);
    let types = program.types();
    let show = |ty: Option<&TypeRef>| ty.map_or_else(|| "?".to_string(), |ty| types.display(ty));

    let params: Vec<_> = signature.params.iter().map(|p| show(p.as_ref())).collect();
    Ok(if signature.has_receiver {
        format!(
            "{}.{}({})",
            show(signature.receiver.as_ref()),
            function.name(),
            params.join(", ")
        )
    } else {
        format!("{}({})", function.name(), params.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::FunctionId;

    fn make_match(function: u32, distance: u32) -> OverloadMatch {
        OverloadMatch {
            function: FunctionId(function),
            distance,
        }
    }

    #[test]
    fn lower_distance_wins() {
        let mut matches = vec![make_match(0, 2), make_match(1, 0), make_match(2, 1)];
        rank(&mut matches);
        assert_eq!(matches[0].function, FunctionId(1));
        assert!(!is_ambiguous(&matches));
    }

    #[test]
    fn ties_keep_declaration_order() {
        let mut matches = vec![make_match(3, 1), make_match(1, 1), make_match(2, 0)];
        rank(&mut matches);
        let order: Vec<_> = matches.iter().map(|m| m.function).collect();
        assert_eq!(order, vec![FunctionId(2), FunctionId(3), FunctionId(1)]);
    }

    #[test]
    fn equal_best_distance_is_ambiguous() {
        assert!(is_ambiguous(&[make_match(0, 1), make_match(1, 1)]));
        assert!(!is_ambiguous(&[make_match(0, 1)]));
        assert!(!is_ambiguous(&[]));
    }
}
