use good_lp::{
    constraint, microlp, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};

use super::formulation::{LinearProgram, Relation, VarId};
use crate::error::ReserveFundError;
use crate::ReserveFundResult;

/// Anything able to maximise a [`LinearProgram`] over non-negative
/// continuous variables. Returns one value per variable, indexed by
/// [`VarId`].
pub trait LpSolver {
    fn solve(&self, lp: &LinearProgram) -> ReserveFundResult<Vec<f64>>;
}

/// Pure-Rust simplex solver (`good_lp` with the `microlp` backend).
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl LpSolver for MicroLpSolver {
    fn solve(&self, lp: &LinearProgram) -> ReserveFundResult<Vec<f64>> {
        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = vars.add_vector(variable().min(0.0), lp.variable_count());

        let objective = linear_expression(&handles, &lp.objective);
        let mut model = vars.maximise(objective).using(microlp);

        for c in &lp.constraints {
            let lhs = linear_expression(&handles, &c.terms);
            let row = match c.relation {
                Relation::Equal => constraint::eq(lhs, c.rhs),
                Relation::LessOrEqual => constraint::leq(lhs, c.rhs),
            };
            model.add_constraint(row);
        }

        let solution = model.solve().map_err(map_resolution_error)?;
        Ok(handles.iter().map(|v| solution.value(*v)).collect())
    }
}

fn linear_expression(handles: &[Variable], terms: &[(VarId, f64)]) -> Expression {
    terms
        .iter()
        .map(|(id, coef)| *coef * handles[id.0])
        .sum()
}

fn map_resolution_error(e: ResolutionError) -> ReserveFundError {
    match e {
        ResolutionError::Infeasible => ReserveFundError::Infeasible(
            "no allocation keeps every period's available cash above the minimum bank balance"
                .into(),
        ),
        ResolutionError::Unbounded => {
            ReserveFundError::Unbounded("total interest has no finite maximum".into())
        }
        other => ReserveFundError::SolverFailure(other.to_string()),
    }
}
