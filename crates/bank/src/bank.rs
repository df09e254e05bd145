//! The bank - wires the ledger, risk, access and collaborators together
//!
//! Every public operation runs through `atomically`: the ledger state and role
//! registry are snapshotted, both collaborators take a savepoint, and staged
//! events are held back. If the operation fails, everything is restored and
//! the staged events are dropped. If it succeeds, the events are committed
//! (and journaled) under one correlation id.

use flowbank_access::{Role, RoleRegistry};
use flowbank_core::{Address, Amount, FlowRate, RateTranslator};
use flowbank_events::{BankEvent, EventRecord, EventStore};
use flowbank_host::{StreamHost, TokenService, Transactional};
use flowbank_ledger::{AssetRole, BankConfig, LedgerState, PriceRecord, Vault};
use flowbank_risk::{CollateralGuard, LiquidationEngine, VaultStatus};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::BankError;

/// A stream-rate lending bank
pub struct Bank<T, S> {
    pub(crate) config: BankConfig,
    pub(crate) translator: RateTranslator,
    pub(crate) engine: LiquidationEngine,
    /// The bank's own account (custody of collateral and reserves)
    pub(crate) address: Address,
    pub(crate) state: LedgerState,
    pub(crate) roles: RoleRegistry,
    pub(crate) tokens: T,
    pub(crate) streams: S,
    /// Events of the operation in progress
    pending: Vec<BankEvent>,
    committed: Vec<EventRecord>,
    /// Highest sequence number handed out, including a resumed journal's
    last_sequence: u64,
    journal: Option<EventStore>,
}

impl<T, S> Bank<T, S>
where
    T: TokenService + Transactional,
    S: StreamHost + Transactional,
{
    /// Create a bank with empty reserves, owned by `owner`
    pub fn new(
        config: BankConfig,
        address: Address,
        owner: Address,
        tokens: T,
        streams: S,
    ) -> Result<Self, BankError> {
        config.validate()?;
        let translator = config.translator()?;
        let engine = LiquidationEngine::from_config(&config);

        Ok(Self {
            config,
            translator,
            engine,
            address,
            state: LedgerState::new(),
            roles: RoleRegistry::new(owner),
            tokens,
            streams,
            pending: Vec::new(),
            committed: Vec::new(),
            last_sequence: 0,
            journal: None,
        })
    }

    /// Also append committed events to a JSONL journal.
    ///
    /// Numbering continues after the journal's last record.
    pub fn with_journal(mut self, journal: EventStore) -> Self {
        if let Some(sequence) = journal.last_sequence() {
            self.last_sequence = self.last_sequence.max(sequence);
        }
        self.journal = Some(journal);
        self
    }

    /// Run `op` as one indivisible step
    pub(crate) fn atomically<R>(
        &mut self,
        operation: &'static str,
        op: impl FnOnce(&mut Self) -> Result<R, BankError>,
    ) -> Result<R, BankError> {
        let state = self.state.clone();
        let roles = self.roles.clone();
        let tokens = self.tokens.savepoint();
        let streams = self.streams.savepoint();
        self.pending.clear();

        let outcome = op(self).and_then(|value| {
            self.commit_pending()?;
            Ok(value)
        });

        match outcome {
            Ok(value) => {
                debug!(operation, "Operation committed");
                Ok(value)
            }
            Err(err) => {
                self.state = state;
                self.roles = roles;
                self.tokens.rollback(tokens);
                self.streams.rollback(streams);
                self.pending.clear();
                warn!(operation, error = %err, "Operation rejected");
                Err(err)
            }
        }
    }

    /// Queue an event for the operation in progress
    pub(crate) fn stage(&mut self, event: BankEvent) {
        self.pending.push(event);
    }

    fn commit_pending(&mut self) -> Result<(), BankError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let correlation_id = Uuid::new_v4();
        let first = self.last_sequence + 1;
        let records: Vec<EventRecord> = self
            .pending
            .drain(..)
            .zip(first..)
            .map(|(event, sequence)| EventRecord::new(sequence, correlation_id, event))
            .collect();

        if let Some(journal) = self.journal.as_mut() {
            journal.append_batch(&records)?;
        }

        if let Some(last) = records.last() {
            self.last_sequence = last.sequence;
        }
        self.committed.extend(records);
        Ok(())
    }

    /// Commit a reconciliation fault on its own, outside any rolled-back step
    pub(crate) fn record_fault(&mut self, user: &Address, stage: &str, err: &BankError) {
        error!(user = %user, stage, error = %err, "Reconciliation fault");

        let fault = BankEvent::ReconciliationFault {
            user: user.clone(),
            stage: stage.to_string(),
            error: err.to_string(),
        };
        let recorded = self.atomically("record_fault", |bank| {
            bank.stage(fault);
            Ok(())
        });
        if let Err(journal_err) = recorded {
            error!(user = %user, error = %journal_err, "Reconciliation fault could not be journaled");
        }
    }

    /// Move the outbound revenue stream from `old` to `new` inbound rate
    pub(crate) fn adjust_revenue(&mut self, old: FlowRate, new: FlowRate) -> Result<(), BankError> {
        if old == new {
            return Ok(());
        }

        let revenue = self
            .state
            .revenue_rate
            .checked_sub(&old)
            .and_then(|rate| rate.checked_add(&new))
            .ok_or_else(|| {
                BankError::Arithmetic(format!(
                    "revenue rate {} cannot move from {old} to {new}",
                    self.state.revenue_rate
                ))
            })?;

        let owner = self.roles.owner().clone();
        self.streams.set_revenue_flow(&owner, revenue)?;
        self.state.revenue_rate = revenue;
        self.stage(BankEvent::RevenueFlowUpdated {
            receiver: owner,
            rate: revenue,
        });
        Ok(())
    }

    /// Token contract of an asset
    pub(crate) fn token(&self, role: AssetRole) -> Result<Address, BankError> {
        Ok(self.state.prices.get(role)?.token.clone())
    }

    pub(crate) fn guard(&self) -> CollateralGuard<'_> {
        self.engine.guard(&self.state.prices)
    }

    // === Views ===

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn interest_rate(&self) -> u32 {
        self.config.interest_rate
    }

    pub fn collateralization_ratio(&self) -> u32 {
        self.config.collateralization_ratio
    }

    pub fn liquidation_penalty(&self) -> u32 {
        self.config.liquidation_penalty
    }

    pub fn translator(&self) -> &RateTranslator {
        &self.translator
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        self.roles.owner()
    }

    pub fn reserve_balance(&self) -> Amount {
        self.state.reserve.balance
    }

    pub fn reserve_collateral_balance(&self) -> Amount {
        self.state.reserve.collateral_balance
    }

    /// Aggregate rate forwarded to the owner
    pub fn revenue_rate(&self) -> FlowRate {
        self.state.revenue_rate
    }

    /// Token address, symbol, granularity and price of an asset
    pub fn asset(&self, role: AssetRole) -> Result<&PriceRecord, BankError> {
        Ok(self.state.prices.get(role)?)
    }

    pub fn vault(&self, user: &Address) -> Vault {
        self.state.vaults.get(user)
    }

    pub fn vault_collateral(&self, user: &Address) -> Amount {
        self.state.vaults.collateral(user)
    }

    pub fn vault_debt(&self, user: &Address) -> Amount {
        self.state.vaults.debt(user)
    }

    /// Collateralization in percent with two decimals; `None` without debt
    pub fn vault_collateralization_ratio(&self, user: &Address) -> Result<Option<Decimal>, BankError> {
        Ok(self.guard().ratio_percent(&self.vault(user))?)
    }

    pub fn vault_status(&self, user: &Address) -> Result<VaultStatus, BankError> {
        Ok(self.engine.status(&self.state.prices, &self.vault(user))?)
    }

    pub fn has_role(&self, role: Role, account: &Address) -> bool {
        self.roles.has_role(role, account)
    }

    pub fn role_members(&self, role: Role) -> Vec<Address> {
        self.roles.members(role)
    }

    pub fn role_member_count(&self, role: Role) -> usize {
        self.roles.member_count(role)
    }

    /// Full ledger state (for comparison and reporting)
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Every committed event, oldest first
    pub fn events(&self) -> &[EventRecord] {
        &self.committed
    }

    /// Committed reconciliation faults
    pub fn faults(&self) -> Vec<&EventRecord> {
        self.committed
            .iter()
            .filter(|record| record.event.is_fault())
            .collect()
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// Direct access to the token collaborator (minting, approvals)
    pub fn tokens_mut(&mut self) -> &mut T {
        &mut self.tokens
    }

    pub fn streams(&self) -> &S {
        &self.streams
    }

    pub fn streams_mut(&mut self) -> &mut S {
        &mut self.streams
    }
}
