use crate::account::LockupKind;
use anchor_lang::prelude::*;

#[event]
pub struct ExchangeRateCreated {
    pub registrar: Pubkey,
    pub rate_idx: u16,
    pub mint: Pubkey,
    pub voting_mint: Pubkey,
    pub rate: u64,
}

#[event]
pub struct DepositEvent {
    pub voter: Pubkey,
    pub deposit_id: u8,
    pub kind: LockupKind,
    pub amount: u64,
    pub amount_scaled: u64,
}

#[event]
pub struct WithdrawEvent {
    pub voter: Pubkey,
    pub deposit_id: u8,
    pub amount: u64,
    pub amount_scaled: u64,
    /// Tokens left in the deposit entry.
    pub amount_left: u64,
}

#[event]
pub struct LockupReset {
    pub voter: Pubkey,
    pub deposit_id: u8,
    pub start_ts: i64,
    pub end_ts: i64,
}

#[event]
pub struct VoterWeightUpdated {
    pub voter: Pubkey,
    pub voter_weight: u64,
    pub slot: u64,
}
