use anchor_lang::prelude::*;

// Codes are stable: new variants go at the end.
#[error]
pub enum ErrorCode {
    #[msg("Exchange rate must be greater than zero")]
    InvalidRate,
    #[msg("Exchange rate index is taken or out of range")]
    InvalidRateIndex,
    #[msg("No exchange rate registered for the mint")]
    ExchangeRateEntryNotFound,
    #[msg("All deposit entries are in use")]
    DepositEntryFull,
    #[msg("Deposit entry is not in use")]
    InvalidDepositId,
    #[msg("Not enough tokens have vested")]
    InsufficientVestedTokens,
    #[msg("Lockup period is out of range")]
    InvalidPeriod,
    #[msg("Amount must be greater than zero")]
    InvalidAmount,
    #[msg("Exchange rate decimals differ from the deposit mint")]
    InvalidDecimals,
    #[msg("Voting mint does not belong to the exchange rate")]
    InvalidVotingMint,
    #[msg("Mint does not match the deposit entry")]
    InvalidMint,
    #[msg("Voter still holds locked tokens")]
    VotingTokenNonZero,
    #[msg("Signer is not the registrar authority")]
    Unauthorized,
    #[msg("Arithmetic overflow")]
    Overflow,
}
