//! Shared fixtures for bank integration tests

#![allow(dead_code)]

use flowbank_bank::{Bank, SimulatedBank};
use flowbank_core::{Address, Amount, FlowRate};
use flowbank_host::{InMemoryStreamHost, InMemoryTokenLedger};
use flowbank_ledger::BankConfig;
use flowbank_oracle::MockOracle;
use rust_decimal::Decimal;

/// One whole token (18 decimals)
pub const UNIT: u128 = 1_000_000_000_000_000_000;

pub fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

pub fn owner() -> Address {
    addr("owner")
}

pub fn alice() -> Address {
    addr("alice")
}

pub fn ric() -> Address {
    addr("ric")
}

pub fn usdc() -> Address {
    addr("usdc")
}

/// `n` whole tokens
pub fn units(n: u128) -> Amount {
    Amount::new(n * UNIT)
}

/// Equal up to the per-second rounding of a stream rate
pub fn assert_approx(actual: Amount, expected: Amount) {
    let diff = actual.abs_diff(&expected).value();
    assert!(
        diff <= UNIT / 1_000_000,
        "expected ~{expected}, got {actual} (off by {diff})"
    );
}

/// Stream rate carrying `n` whole tokens of principal
pub fn rate_for(bank: &SimulatedBank, n: u128) -> FlowRate {
    bank.translator().principal_to_rate(units(n)).unwrap()
}

pub fn new_bank(config: BankConfig) -> SimulatedBank {
    let mut bank = Bank::new(
        config,
        addr("bank"),
        owner(),
        InMemoryTokenLedger::new(),
        InMemoryStreamHost::new(),
    )
    .unwrap();

    bank.set_collateral(&owner(), ric(), "RIC", 1000, 1000).unwrap();
    bank.set_debt(&owner(), usdc(), "USDC", 1000, 1000).unwrap();
    bank
}

/// Fund the reserve with `n` tokens from the owner
pub fn fund_reserve(bank: &mut SimulatedBank, n: u128) {
    let bank_address = bank.address().clone();
    bank.tokens_mut().mint(&usdc(), &owner(), units(n)).unwrap();
    bank.tokens_mut()
        .approve(&usdc(), &owner(), &bank_address, units(n));
    bank.reserve_deposit(&owner(), units(n)).unwrap();
}

/// Give `user` `n` collateral tokens and deposit them
pub fn deposit_collateral(bank: &mut SimulatedBank, user: &Address, n: u128) {
    let bank_address = bank.address().clone();
    bank.tokens_mut().mint(&ric(), user, units(n)).unwrap();
    bank.tokens_mut().approve(&ric(), user, &bank_address, units(n));
    bank.vault_deposit(user, units(n)).unwrap();
}

/// Let the bank pull up to `n` debt tokens from `user`
pub fn approve_repayment(bank: &mut SimulatedBank, user: &Address, n: u128) {
    let bank_address = bank.address().clone();
    bank.tokens_mut().approve(&usdc(), user, &bank_address, units(n));
}

/// Default bank: 10000 reserve, alice with 5000 collateral, both prices 1.0
pub fn standard_bank() -> SimulatedBank {
    let mut bank = new_bank(BankConfig::default());
    fund_reserve(&mut bank, 10_000);
    deposit_collateral(&mut bank, &alice(), 5000);
    bank
}

/// Report a new collateral price through the oracle
pub async fn report_collateral_price(bank: &mut SimulatedBank, value: Decimal) {
    let oracle = MockOracle::new();
    oracle.set_price("RIC", value);
    bank.update_collateral_price(&owner(), &oracle).await.unwrap();
}
