//! ERC-20 conformance of the derivative token.
//!
//! Balances are seeded the only way a holder can get them: mint base
//! units, wrap them, then transfer the derivative to the account under test.

use anyhow::Result;
use wrapper_contracts::tokens::BadErc20;
use wrapper_contracts::{BaseToken, ErrorKind, Event, MeasuredAdapter, WrapperEngine};
use wrapper_protocol::logging::init_test_logging;
use wrapper_protocol::{Address, Amount, WrapperConfig, INFINITE_ALLOWANCE};

type Womg = WrapperEngine<MeasuredAdapter<BadErc20>>;

fn deployer() -> Address {
    Address::from_label("accounts[0]")
}

fn alice() -> Address {
    Address::from_label("accounts[1]")
}

fn bob() -> Address {
    Address::from_label("accounts[2]")
}

fn carol() -> Address {
    Address::from_label("accounts[3]")
}

fn create() -> Womg {
    init_test_logging();
    let omg = BadErc20::new(Address::from_label("OMG"), deployer());
    WrapperEngine::over_token(WrapperConfig::default(), omg).unwrap()
}

/// Mints base units to the deployer, wraps them, and sends the derivative
/// to `to`.
fn mint(womg: &mut Womg, to: Address, amount: Amount) -> Result<()> {
    let wrapper = womg.address();
    womg.base_token_mut().mint(deployer(), deployer(), amount)?;
    womg.base_token_mut().approve(deployer(), wrapper, amount)?;
    womg.deposit(deployer(), amount)?;
    womg.transfer(deployer(), to, amount)?;
    Ok(())
}

fn funded() -> Result<Womg> {
    let mut womg = create();
    mint(&mut womg, alice(), 100)?;
    womg.drain_events();
    Ok(womg)
}

// ---------------------------------------------------------------------------
// Metadata and supply
// ---------------------------------------------------------------------------

#[test]
fn metadata_is_fixed_at_deployment() {
    let womg = create();
    assert_eq!(womg.name(), "Wrapped OMG");
    assert_eq!(womg.symbol(), "WOMG");
    assert_eq!(womg.decimals(), 18);
}

#[test]
fn total_supply_tracks_minting() -> Result<()> {
    let mut womg = create();
    assert_eq!(womg.total_supply(), 0);
    mint(&mut womg, alice(), 100)?;
    mint(&mut womg, bob(), 50)?;
    assert_eq!(womg.total_supply(), 150);
    assert_eq!(womg.balance_of(deployer()), 0);
    Ok(())
}

#[test]
fn unknown_account_has_zero_balance() {
    let womg = create();
    assert_eq!(womg.balance_of(Address::from_label("nobody")), 0);
}

// ---------------------------------------------------------------------------
// transfer
// ---------------------------------------------------------------------------

#[test]
fn transfer_moves_balance_and_emits_event() -> Result<()> {
    let mut womg = funded()?;
    assert!(womg.transfer(alice(), bob(), 30)?);
    assert_eq!(womg.balance_of(alice()), 70);
    assert_eq!(womg.balance_of(bob()), 30);
    assert_eq!(womg.total_supply(), 100);
    assert_eq!(
        womg.events(),
        &[Event::Transfer {
            from: alice(),
            to: bob(),
            amount: 30,
        }]
    );
    Ok(())
}

#[test]
fn transfer_entire_balance() -> Result<()> {
    let mut womg = funded()?;
    womg.transfer(alice(), bob(), 100)?;
    assert_eq!(womg.balance_of(alice()), 0);
    assert_eq!(womg.balance_of(bob()), 100);
    Ok(())
}

#[test]
fn transfer_more_than_balance_fails_without_side_effects() -> Result<()> {
    let mut womg = funded()?;
    let err = womg.transfer(alice(), bob(), 101).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(womg.balance_of(alice()), 100);
    assert_eq!(womg.balance_of(bob()), 0);
    assert!(womg.events().is_empty());
    Ok(())
}

#[test]
fn transfer_zero_is_allowed() -> Result<()> {
    let mut womg = funded()?;
    assert!(womg.transfer(alice(), bob(), 0)?);
    assert_eq!(womg.balance_of(alice()), 100);
    assert_eq!(womg.events().len(), 1);
    Ok(())
}

#[test]
fn transfer_zero_from_empty_account_is_allowed() {
    let mut womg = create();
    assert!(womg.transfer(bob(), carol(), 0).unwrap());
}

#[test]
fn transfer_to_self_keeps_balance() -> Result<()> {
    let mut womg = funded()?;
    womg.transfer(alice(), alice(), 60)?;
    assert_eq!(womg.balance_of(alice()), 100);
    assert_eq!(womg.total_supply(), 100);
    Ok(())
}

#[test]
fn transfer_to_null_address_fails() -> Result<()> {
    let mut womg = funded()?;
    let err = womg.transfer(alice(), Address::ZERO, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRecipient);
    Ok(())
}

// ---------------------------------------------------------------------------
// approve
// ---------------------------------------------------------------------------

#[test]
fn approve_sets_allowance_and_emits_event() -> Result<()> {
    let mut womg = funded()?;
    assert!(womg.approve(alice(), bob(), 40)?);
    assert_eq!(womg.allowance(alice(), bob()), 40);
    assert_eq!(
        womg.events(),
        &[Event::Approval {
            owner: alice(),
            spender: bob(),
            amount: 40,
        }]
    );
    Ok(())
}

#[test]
fn approve_replaces_instead_of_adding() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), 40)?;
    womg.approve(alice(), bob(), 10)?;
    assert_eq!(womg.allowance(alice(), bob()), 10);
    womg.approve(alice(), bob(), 0)?;
    assert_eq!(womg.allowance(alice(), bob()), 0);
    Ok(())
}

#[test]
fn approve_more_than_balance_is_allowed() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), 1_000)?;
    assert_eq!(womg.allowance(alice(), bob()), 1_000);
    Ok(())
}

#[test]
fn approve_null_spender_fails() -> Result<()> {
    let mut womg = funded()?;
    let err = womg.approve(alice(), Address::ZERO, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSpender);
    Ok(())
}

#[test]
fn allowances_are_per_pair() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), 5)?;
    assert_eq!(womg.allowance(alice(), carol()), 0);
    assert_eq!(womg.allowance(bob(), alice()), 0);
    Ok(())
}

// ---------------------------------------------------------------------------
// transfer_from
// ---------------------------------------------------------------------------

#[test]
fn transfer_from_spends_allowance() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), 50)?;
    womg.drain_events();

    assert!(womg.transfer_from(bob(), alice(), carol(), 30)?);
    assert_eq!(womg.balance_of(alice()), 70);
    assert_eq!(womg.balance_of(carol()), 30);
    assert_eq!(womg.balance_of(bob()), 0);
    assert_eq!(womg.allowance(alice(), bob()), 20);
    assert_eq!(
        womg.events(),
        &[Event::Transfer {
            from: alice(),
            to: carol(),
            amount: 30,
        }]
    );
    Ok(())
}

#[test]
fn transfer_from_exact_allowance_leaves_zero() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), 50)?;
    womg.transfer_from(bob(), alice(), bob(), 50)?;
    assert_eq!(womg.allowance(alice(), bob()), 0);
    assert_eq!(womg.balance_of(bob()), 50);
    Ok(())
}

#[test]
fn transfer_from_beyond_allowance_fails() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), 50)?;
    let err = womg.transfer_from(bob(), alice(), carol(), 51).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientAllowance);
    assert_eq!(womg.allowance(alice(), bob()), 50);
    assert_eq!(womg.balance_of(alice()), 100);
    Ok(())
}

#[test]
fn transfer_from_beyond_balance_fails_and_keeps_allowance() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), 500)?;
    let err = womg.transfer_from(bob(), alice(), carol(), 101).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(womg.allowance(alice(), bob()), 500);
    Ok(())
}

#[test]
fn transfer_from_without_approval_fails() -> Result<()> {
    let mut womg = funded()?;
    let err = womg.transfer_from(bob(), alice(), bob(), 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientAllowance);
    Ok(())
}

#[test]
fn transfer_from_to_null_address_fails() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), 10)?;
    let err = womg.transfer_from(bob(), alice(), Address::ZERO, 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRecipient);
    assert_eq!(womg.allowance(alice(), bob()), 10);
    Ok(())
}

#[test]
fn transfer_from_with_infinite_allowance_does_not_decrease() -> Result<()> {
    let mut womg = funded()?;
    womg.approve(alice(), bob(), INFINITE_ALLOWANCE)?;
    womg.transfer_from(bob(), alice(), carol(), 60)?;
    womg.transfer_from(bob(), alice(), carol(), 40)?;
    assert_eq!(womg.allowance(alice(), bob()), INFINITE_ALLOWANCE);
    assert_eq!(womg.balance_of(carol()), 100);
    Ok(())
}

#[test]
fn owner_spending_own_balance_still_needs_allowance() -> Result<()> {
    let mut womg = funded()?;
    let err = womg.transfer_from(alice(), alice(), bob(), 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientAllowance);
    Ok(())
}
