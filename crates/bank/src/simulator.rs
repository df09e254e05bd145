//! In-memory simulation
//!
//! Runs the bank against `InMemoryTokenLedger`, `InMemoryStreamHost` and a
//! `MockOracle`, driven by a JSONL script with one `Command` per line:
//!
//! ```text
//! {"op":"mint","token":"usdc","account":"owner","amount":"10000000000000000000000"}
//! {"op":"stream","sender":"alice","rate":"634195839675"}
//! {"op":"liquidate","user":"alice"}
//! ```

use flowbank_access::Role;
use flowbank_core::{Address, Amount, FlowRate};
use flowbank_events::EventStore;
use flowbank_host::{
    Delivery, InMemoryStreamHost, InMemoryTokenLedger, StreamHost, StreamNotification,
    TokenService, Transactional,
};
use flowbank_ledger::{AssetRole, BankConfig};
use flowbank_oracle::MockOracle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

use crate::bank::Bank;
use crate::error::BankError;

/// A bank wired to in-memory collaborators
pub type SimulatedBank = Bank<InMemoryTokenLedger, InMemoryStreamHost>;

impl<T> Bank<T, InMemoryStreamHost>
where
    T: TokenService + Transactional,
{
    /// Have `sender` stream `rate` to the bank, the way a streaming host would.
    ///
    /// The matching notification is delivered first; the flow only changes on
    /// the host if the bank accepts it. Deletions always go through.
    pub fn stream_to_bank(&mut self, sender: &Address, rate: FlowRate) -> Delivery {
        let old_rate = self.streams().flow_rate(sender);

        let notification = match (old_rate.is_zero(), rate.is_zero()) {
            (true, true) => return Delivery::Accepted,
            (true, false) => StreamNotification::Opened {
                sender: sender.clone(),
                rate,
            },
            (false, true) => {
                self.streams_mut().set_flow(sender, FlowRate::ZERO);
                StreamNotification::Deleted {
                    sender: sender.clone(),
                    old_rate,
                }
            }
            (false, false) => StreamNotification::Updated {
                sender: sender.clone(),
                old_rate,
                new_rate: rate,
            },
        };
        let deletion = rate.is_zero();

        let delivery = self.deliver(notification);
        if !deletion && !delivery.is_rejected() {
            self.streams_mut().set_flow(sender, rate);
        }
        delivery
    }
}

/// One scripted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Mint {
        token: Address,
        account: Address,
        amount: Amount,
    },
    /// Let the bank pull `amount` of `token` from `owner`
    Approve {
        token: Address,
        owner: Address,
        amount: Amount,
    },
    SetCollateral {
        caller: Address,
        token: Address,
        symbol: String,
        granularity: u64,
        price: u64,
    },
    SetDebt {
        caller: Address,
        token: Address,
        symbol: String,
        granularity: u64,
        price: u64,
    },
    ReserveDeposit {
        caller: Address,
        amount: Amount,
    },
    ReserveWithdraw {
        caller: Address,
        amount: Amount,
    },
    ReserveCollateralWithdraw {
        caller: Address,
        amount: Amount,
    },
    VaultDeposit {
        user: Address,
        amount: Amount,
    },
    VaultWithdraw {
        user: Address,
        amount: Amount,
    },
    /// Set `sender`'s stream to the bank (zero deletes it)
    Stream {
        sender: Address,
        rate: FlowRate,
    },
    /// Change what the mock oracle quotes for `symbol`
    OraclePrice {
        symbol: String,
        value: Decimal,
    },
    UpdatePrice {
        caller: Address,
        asset: AssetRole,
    },
    Liquidate {
        user: Address,
    },
    Sweep {
        caller: Address,
    },
    Grant {
        caller: Address,
        role: Role,
        account: Address,
    },
    Revoke {
        caller: Address,
        role: Role,
        account: Address,
    },
    TransferOwnership {
        caller: Address,
        new_owner: Address,
    },
}

/// What happened to one command
#[derive(Debug)]
pub enum Outcome {
    Done,
    Stream(Delivery),
    Failed(BankError),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Done => write!(f, "ok"),
            Outcome::Stream(Delivery::Accepted) => write!(f, "stream accepted"),
            Outcome::Stream(Delivery::Rejected { reason }) => write!(f, "stream rejected: {reason}"),
            Outcome::Stream(Delivery::Acknowledged { defaulted }) => {
                write!(f, "stream deleted (defaulted: {defaulted})")
            }
            Outcome::Failed(err) => write!(f, "failed: {err}"),
        }
    }
}

/// A simulated bank plus its oracle
pub struct Simulation {
    pub bank: SimulatedBank,
    pub oracle: MockOracle,
}

impl Simulation {
    pub fn new(config: BankConfig, bank_address: Address, owner: Address) -> Result<Self, BankError> {
        let bank = Bank::new(
            config,
            bank_address,
            owner,
            InMemoryTokenLedger::new(),
            InMemoryStreamHost::new(),
        )?;

        Ok(Self {
            bank,
            oracle: MockOracle::new(),
        })
    }

    /// Journal every committed event
    pub fn with_journal(self, journal: EventStore) -> Self {
        Self {
            bank: self.bank.with_journal(journal),
            oracle: self.oracle,
        }
    }

    /// Run one command. Failures are reported, not raised: a rejected step
    /// leaves the bank as it was and the script goes on.
    pub async fn run(&mut self, command: Command) -> Outcome {
        let result = match command {
            Command::Mint {
                token,
                account,
                amount,
            } => self
                .bank
                .tokens_mut()
                .mint(&token, &account, amount)
                .map_err(BankError::from),
            Command::Approve {
                token,
                owner,
                amount,
            } => {
                let spender = self.bank.address().clone();
                self.bank
                    .tokens_mut()
                    .approve(&token, &owner, &spender, amount);
                Ok(())
            }
            Command::SetCollateral {
                caller,
                token,
                symbol,
                granularity,
                price,
            } => self
                .bank
                .set_collateral(&caller, token, &symbol, granularity, price),
            Command::SetDebt {
                caller,
                token,
                symbol,
                granularity,
                price,
            } => self
                .bank
                .set_debt(&caller, token, &symbol, granularity, price),
            Command::ReserveDeposit { caller, amount } => {
                self.bank.reserve_deposit(&caller, amount).map(drop)
            }
            Command::ReserveWithdraw { caller, amount } => {
                self.bank.reserve_withdraw(&caller, amount).map(drop)
            }
            Command::ReserveCollateralWithdraw { caller, amount } => self
                .bank
                .reserve_collateral_withdraw(&caller, amount)
                .map(drop),
            Command::VaultDeposit { user, amount } => {
                self.bank.vault_deposit(&user, amount).map(drop)
            }
            Command::VaultWithdraw { user, amount } => {
                self.bank.vault_withdraw(&user, amount).map(drop)
            }
            Command::Stream { sender, rate } => {
                return Outcome::Stream(self.bank.stream_to_bank(&sender, rate));
            }
            Command::OraclePrice { symbol, value } => {
                self.oracle.set_price(&symbol, value);
                Ok(())
            }
            Command::UpdatePrice { caller, asset } => self
                .bank
                .update_price(&caller, asset, &self.oracle)
                .await
                .map(drop),
            Command::Liquidate { user } => self.bank.liquidate(&user).map(drop),
            Command::Sweep { caller } => self.bank.liquidate_unhealthy(&caller).map(drop),
            Command::Grant {
                caller,
                role,
                account,
            } => self.bank.grant_role(&caller, role, &account).map(drop),
            Command::Revoke {
                caller,
                role,
                account,
            } => self.bank.revoke_role(&caller, role, &account).map(drop),
            Command::TransferOwnership { caller, new_owner } => {
                self.bank.transfer_ownership(&caller, &new_owner)
            }
        };

        match result {
            Ok(()) => Outcome::Done,
            Err(err) => Outcome::Failed(err),
        }
    }
}

/// Parse a JSONL script, skipping blank lines and `#` comments
pub fn parse_script(reader: impl BufRead) -> anyhow::Result<Vec<Command>> {
    let mut commands = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let command = serde_json::from_str(trimmed)
            .map_err(|e| anyhow::anyhow!("line {}: {}", index + 1, e))?;
        commands.push(command);
    }

    Ok(commands)
}
