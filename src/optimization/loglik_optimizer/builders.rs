//! loglik_optimizer::builders — construct configured L-BFGS solvers.
//!
//! Purpose
//! -------
//! Turn an [`MLEOptions`] into a ready-to-run argmin `LBFGS` instance with the
//! requested line search, history size, stopping tolerances and, when the
//! options carry a positive `l1_penalty`, orthant-wise L1 regularization.
//!
//! Conventions
//! -----------
//! - Iteration limits are not set here; they belong to the executor state and
//!   are applied in [`run_lbfgs`](super::run::run_lbfgs).
//! - `l1_penalty == 0.0` leaves the solver as plain L-BFGS; argmin rejects a
//!   zero coefficient, so the call is skipped rather than forwarded.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};

/// L-BFGS with a Hager–Zhang line search.
///
/// # Errors
/// Propagates argmin's rejection of any tolerance or penalty.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with a More–Thuente line search.
///
/// # Errors
/// Propagates argmin's rejection of any tolerance or penalty.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply tolerances and the optional L1 coefficient to a raw solver.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    if opts.l1_penalty > 0.0 {
        solver = solver.with_l1_regularization(opts.l1_penalty)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::loglik_optimizer::traits::{LineSearcher, Tolerances};

    fn options(searcher: LineSearcher, mem: Option<usize>, l1: f64) -> MLEOptions {
        let tols = Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).expect("valid tolerances");
        MLEOptions::new(tols, searcher, mem)
            .and_then(|o| o.with_l1_penalty(l1))
            .expect("valid options")
    }

    #[test]
    // Purpose
    // -------
    // Both line-search variants build with default and explicit memory.
    //
    // Given
    // -----
    // - HagerZhang and MoreThuente options with `lbfgs_mem` None and Some(11).
    //
    // Expect
    // ------
    // - Every builder call succeeds.
    fn builders_accept_default_and_explicit_memory() {
        for mem in [None, Some(11)] {
            assert!(build_optimizer_hager_zhang(&options(LineSearcher::HagerZhang, mem, 0.0)).is_ok());
            assert!(
                build_optimizer_more_thuente(&options(LineSearcher::MoreThuente, mem, 0.0)).is_ok()
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // A positive L1 coefficient is forwarded to argmin and accepted.
    //
    // Given
    // -----
    // - MoreThuente options with `l1_penalty = 0.01`.
    //
    // Expect
    // ------
    // - `configure_lbfgs` succeeds.
    fn configure_lbfgs_accepts_positive_l1_penalty() {
        let raw = LBFGS::new(MoreThuenteLS::new(), DEFAULT_LBFGS_MEM);

        let configured = configure_lbfgs(raw, &options(LineSearcher::MoreThuente, None, 0.01));

        assert!(configured.is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Absent tolerances leave the solver defaults in place.
    //
    // Given
    // -----
    // - Tolerances with only `max_iter` set.
    //
    // Expect
    // ------
    // - `configure_lbfgs` succeeds.
    fn configure_lbfgs_respects_absent_tolerances() {
        let raw = LBFGS::new(HagerZhangLS::new(), DEFAULT_LBFGS_MEM);
        let tols = Tolerances::new(None, None, Some(50)).expect("valid tolerances");
        let opts = MLEOptions::new(tols, LineSearcher::HagerZhang, None).expect("valid options");

        let configured = configure_lbfgs(raw, &opts);

        assert!(configured.is_ok());
    }
}
