//! Stream-rate translation
//!
//! The streaming host tells the bank about every change to a borrower's
//! payment stream. A rise in rate is a borrow, a fall is a repayment, and a
//! deletion repays everything (or, failing that, defaults the vault).

use flowbank_core::{Address, Amount, FlowRate, PrincipalDelta};
use flowbank_events::BankEvent;
use flowbank_host::{Delivery, StreamHost, StreamNotification, TokenService, Transactional};
use flowbank_ledger::AssetRole;
use flowbank_risk::{LiquidationPlan, LiquidationTrigger};
use tracing::{info, warn};

use crate::bank::Bank;
use crate::error::BankError;

/// How a deleted stream was settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamClosure {
    /// The borrower repaid the full principal
    Repaid,
    /// Repayment failed; the vault was closed at the liquidation penalty
    Defaulted(LiquidationPlan),
    /// Neither could be booked; a reconciliation fault was recorded
    Faulted,
}

impl StreamClosure {
    pub fn is_default(&self) -> bool {
        !matches!(self, StreamClosure::Repaid)
    }
}

impl<T, S> Bank<T, S>
where
    T: TokenService + Transactional,
    S: StreamHost + Transactional,
{
    /// A new stream at `rate`: lend the principal it carries
    pub fn on_stream_opened(&mut self, sender: &Address, rate: FlowRate) -> Result<(), BankError> {
        self.atomically("stream_opened", |bank| {
            bank.apply_rate_change(sender, FlowRate::ZERO, rate)
        })
    }

    /// A stream changed rate: lend or collect the principal difference
    pub fn on_stream_updated(
        &mut self,
        sender: &Address,
        old_rate: FlowRate,
        new_rate: FlowRate,
    ) -> Result<(), BankError> {
        self.atomically("stream_updated", |bank| {
            bank.apply_rate_change(sender, old_rate, new_rate)
        })
    }

    /// A stream is gone. Never fails.
    ///
    /// The full principal carried by `old_rate` is collected first. If that
    /// cannot be done, the vault is closed unconditionally at the penalty rate.
    pub fn on_stream_deleted(&mut self, sender: &Address, old_rate: FlowRate) -> StreamClosure {
        let repaid = self.atomically("stream_deleted", |bank| {
            bank.apply_rate_change(sender, old_rate, FlowRate::ZERO)
        });

        match repaid {
            Ok(()) => StreamClosure::Repaid,
            Err(err) => {
                warn!(sender = %sender, error = %err, "Stream deleted without repayment");
                if !err.is_transfer_failure() {
                    self.record_fault(sender, "stream repayment", &err);
                }
                self.close_defaulted(sender, old_rate, false)
            }
        }
    }

    /// Answer a notification from the streaming host
    pub fn deliver(&mut self, notification: StreamNotification) -> Delivery {
        match notification {
            StreamNotification::Opened { sender, rate } => {
                match self.on_stream_opened(&sender, rate) {
                    Ok(()) => Delivery::Accepted,
                    Err(err) => Delivery::Rejected {
                        reason: err.to_string(),
                    },
                }
            }
            StreamNotification::Updated {
                sender,
                old_rate,
                new_rate,
            } => match self.on_stream_updated(&sender, old_rate, new_rate) {
                Ok(()) => Delivery::Accepted,
                Err(err) => {
                    // only a refused repayment pull is the borrower defaulting
                    if err.is_transfer_failure() && self.is_repayment(old_rate, new_rate) {
                        self.close_defaulted(&sender, old_rate, true);
                    }
                    Delivery::Rejected {
                        reason: err.to_string(),
                    }
                }
            },
            StreamNotification::Deleted { sender, old_rate } => {
                let closure = self.on_stream_deleted(&sender, old_rate);
                Delivery::Acknowledged {
                    defaulted: closure.is_default(),
                }
            }
        }
    }

    /// Involuntary closure. `live` means the stream still runs and must be
    /// terminated here.
    fn close_defaulted(&mut self, sender: &Address, rate: FlowRate, live: bool) -> StreamClosure {
        let closed = self.atomically("stream_default", |bank| {
            if live {
                bank.streams.terminate(sender)?;
            }

            let plan = bank
                .engine
                .plan(&bank.state, sender, LiquidationTrigger::StreamDefault)?;
            if !plan.is_empty() {
                bank.engine.apply(&mut bank.state, &plan)?;
                bank.stage(BankEvent::Liquidated {
                    user: sender.clone(),
                    trigger: plan.trigger,
                    debt_cleared: plan.debt_cleared,
                    collateral_seized: plan.collateral_seized,
                });
            }

            bank.adjust_revenue(rate, FlowRate::ZERO)?;
            Ok(plan)
        });

        match closed {
            Ok(plan) => {
                info!(sender = %sender, seized = %plan.collateral_seized, "Defaulted stream closed");
                StreamClosure::Defaulted(plan)
            }
            Err(err) => {
                self.record_fault(sender, "default closure", &err);
                StreamClosure::Faulted
            }
        }
    }

    fn is_repayment(&self, old_rate: FlowRate, new_rate: FlowRate) -> bool {
        matches!(
            self.translator.principal_delta(old_rate, new_rate),
            Ok(PrincipalDelta::Repay(_))
        )
    }

    fn apply_rate_change(
        &mut self,
        sender: &Address,
        old_rate: FlowRate,
        new_rate: FlowRate,
    ) -> Result<(), BankError> {
        match self.translator.principal_delta(old_rate, new_rate)? {
            PrincipalDelta::Borrow(principal) => {
                let debt = self.lend(sender, principal)?;
                self.stage(BankEvent::Borrowed {
                    user: sender.clone(),
                    principal,
                    debt,
                    rate: new_rate,
                });
            }
            PrincipalDelta::Repay(principal) => {
                let debt = self.collect(sender, principal)?;
                self.stage(BankEvent::Repaid {
                    user: sender.clone(),
                    principal,
                    debt,
                    rate: new_rate,
                });
            }
            PrincipalDelta::Unchanged => {}
        }

        self.adjust_revenue(old_rate, new_rate)
    }

    /// Pay `principal` out of the reserve to `user`; returns the new debt
    fn lend(&mut self, user: &Address, principal: Amount) -> Result<Amount, BankError> {
        self.state.reserve.debit(principal)?;

        let updated = self.state.vaults.get(user).with_additional_debt(principal)?;
        if !self.guard().is_healthy(&updated)? {
            return Err(BankError::InsufficientCollateral(format!(
                "{} collateral cannot back {} debt for {user} at {}%",
                updated.collateral,
                updated.debt,
                self.config.collateralization_ratio
            )));
        }
        self.state.vaults.put(user, updated);

        let token = self.token(AssetRole::Debt)?;
        self.tokens.transfer(&token, &self.address, user, principal)?;
        Ok(updated.debt)
    }

    /// Pull `principal` from `user` back into the reserve; returns the new debt
    fn collect(&mut self, user: &Address, principal: Amount) -> Result<Amount, BankError> {
        let token = self.token(AssetRole::Debt)?;
        self.tokens
            .transfer_from(&token, &self.address, user, &self.address, principal)?;

        let debt = self.state.vaults.repay(user, principal)?;
        self.state.reserve.credit(principal)?;
        Ok(debt)
    }
}
