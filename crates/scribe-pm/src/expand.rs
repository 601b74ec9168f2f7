//! Function-call expansion and variable substitution over scanned segments.
//!
//! Both passes replace tokens with [`Segment::Resolved`] in place. Resolved
//! text is never looked at again, so a resolver returning `{{...}}` cannot
//! trigger another substitution.

use crate::context::ResolutionContext;
use crate::resolvers::{SCENEBEAT, Variable};
use crate::scanner::Segment;

/// Expands `{{name(args)}}` calls.
///
/// Only function-capable variables are expanded; any other call token is
/// left exactly as written and is not touched by [`substitute_variables`].
pub fn expand_calls(segments: &mut [Segment<'_>], ctx: &ResolutionContext) {
    for segment in segments.iter_mut() {
        let resolved = match &*segment {
            Segment::Call { name, args, .. } => {
                match Variable::lookup(name).filter(|v| v.is_function()) {
                    Some(variable) => variable.resolve(ctx, &[*args]),
                    None => {
                        tracing::debug!(function = %name, "unknown function left in place");
                        continue;
                    }
                }
            }
            _ => continue,
        };
        *segment = Segment::Resolved(resolved);
    }
}

/// Substitutes `{{name params...}}` tokens, left to right.
///
/// A non-empty scene beat replaces `{{scenebeat}}` verbatim. Unknown names
/// become the empty string and are logged; they never stop the pass.
pub fn substitute_variables(segments: &mut [Segment<'_>], ctx: &ResolutionContext) {
    for segment in segments.iter_mut() {
        let resolved = match &*segment {
            Segment::Variable { name, params, .. } => resolve_variable(name, params, ctx),
            _ => continue,
        };
        *segment = Segment::Resolved(resolved);
    }
}

fn resolve_variable(name: &str, params: &[&str], ctx: &ResolutionContext) -> String {
    if name == SCENEBEAT && !ctx.scenebeat.is_empty() {
        return ctx.scenebeat.clone();
    }

    match Variable::lookup(name) {
        Some(variable) => variable.resolve(ctx, params),
        None => {
            tracing::warn!(variable = %name, "no resolver found for variable");
            String::new()
        }
    }
}
