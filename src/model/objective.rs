use super::{LinExpr, VariableRegistry};
use crate::catalog::Catalog;
use crate::config::ModelConfig;
use crate::Result;

/// Build the objective (to be maximised): the preference-weighted sum of all enrollments minus a
/// penalty for every enrollment in a filler section.
///
/// The penalty makes the solver prefer real courses, while still allowing fillers when no real
/// course fits into a student's period.
pub(super) fn build(
    catalog: &Catalog,
    registry: &VariableRegistry,
    config: &ModelConfig,
) -> Result<LinExpr> {
    let fillers = catalog.filler_courses();
    let mut objective = LinExpr::new();
    for s in 0..catalog.students.len() {
        for c in 0..catalog.courses.len() {
            let mut coefficient = catalog.preferences[[s, c]];
            if fillers.contains(&c) {
                coefficient -= config.filler_penalty;
            }
            objective.add(registry.x(s, c)?, coefficient);
        }
    }
    Ok(objective)
}
