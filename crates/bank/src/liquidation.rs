//! On-demand liquidation and the keeper sweep

use flowbank_access::Role;
use flowbank_core::{Address, FlowRate};
use flowbank_events::BankEvent;
use flowbank_host::{StreamHost, TokenService, Transactional};
use flowbank_risk::{LiquidationPlan, LiquidationTrigger};
use tracing::{info, warn};

use crate::bank::Bank;
use crate::error::BankError;

/// Result of a keeper sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    pub liquidated: Vec<LiquidationPlan>,
    pub failed: Vec<(Address, BankError)>,
}

impl<T, S> Bank<T, S>
where
    T: TokenService + Transactional,
    S: StreamHost + Transactional,
{
    /// Liquidate an undercollateralized vault. Anyone may call this.
    ///
    /// Seized collateral goes to the reserve, the debt is written off and the
    /// borrower's payment stream is terminated.
    pub fn liquidate(&mut self, user: &Address) -> Result<LiquidationPlan, BankError> {
        self.atomically("liquidate", |bank| {
            let plan = bank
                .engine
                .plan(&bank.state, user, LiquidationTrigger::Undercollateralized)?;
            bank.engine.apply(&mut bank.state, &plan)?;

            let rate = bank.streams.flow_rate(user);
            if !rate.is_zero() {
                bank.streams.terminate(user)?;
                bank.adjust_revenue(rate, FlowRate::ZERO)?;
            }

            bank.stage(BankEvent::Liquidated {
                user: user.clone(),
                trigger: plan.trigger,
                debt_cleared: plan.debt_cleared,
                collateral_seized: plan.collateral_seized,
            });
            Ok(plan)
        })
    }

    /// Liquidate every vault that is liquidatable right now. Keeper only.
    ///
    /// Each vault is its own step: one failure does not undo the others.
    pub fn liquidate_unhealthy(&mut self, caller: &Address) -> Result<SweepReport, BankError> {
        self.roles.authorize(caller, Role::Keeper)?;

        let candidates = self.engine.liquidatable(&self.state)?;
        let mut report = SweepReport::default();

        for user in candidates {
            match self.liquidate(&user) {
                Ok(plan) => report.liquidated.push(plan),
                Err(err) => {
                    warn!(user = %user, error = %err, "Sweep could not liquidate vault");
                    report.failed.push((user, err));
                }
            }
        }

        info!(
            keeper = %caller,
            liquidated = report.liquidated.len(),
            failed = report.failed.len(),
            "Liquidation sweep finished"
        );
        Ok(report)
    }
}
