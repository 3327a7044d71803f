use access_control::*;
use account::*;
use anchor_lang::prelude::*;
use anchor_spl::token;
use context::*;
use error::*;
use events::*;
use spl_governance::addins::voter_weight::VoterWeightAccountType;

mod access_control;
pub mod account;
mod context;
pub mod error;
pub mod events;

// The program address.
declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

/// # Introduction
///
/// The governance registry is an "addin" to the SPL governance program that
/// allows one to vote with many different types of tokens, each locked up
/// under a vesting schedule.
///
/// The flow for voting with this program is as follows:
///
/// - Create a SPL governance realm.
/// - Create a governance registry account.
/// - Add exchange rates for any tokens one wants to deposit. For example,
///   if one wants to vote with tokens A and B, where token B has twice the
///   voting power of token A, then the exchange rate of B would be 2 and the
///   exchange rate of A would be 1.
/// - Create a voter account.
/// - Deposit tokens into this program, choosing a lockup kind and period.
///   Frozen voting tokens are minted in exchange at the registered rate.
/// - Vote.
///
/// Deposited tokens vest according to their lockup:
///
/// - `Cliff`: everything unlocks once the lockup period ends.
/// - `Daily`: an equal share unlocks at the end of every day.
/// - `Monthly`: an equal share unlocks at the end of every month.
///
/// Only vested tokens can be withdrawn. Withdrawing burns the corresponding
/// voting tokens.
///
/// Upon voting with SPL governance, a client is expected to call
/// `update_voter_weight_record` to get an up to date measurement of a given
/// `Voter`'s voting power for the given slot. If this is not done, then the
/// transaction will fail (since the SPL governance program will require the
/// measurement to be active for the current slot).
///
/// # Interacting with SPL Governance
///
/// This program does not directly interact with SPL governance via CPI.
/// Instead, it simply writes a `VoterWeightRecord` account with a well defined
/// format, which is then used by SPL governance as the voting power measurement
/// for a given user.
///
/// # Voter Weight
///
/// Given that one can use multiple tokens to vote, the voter weight is
/// expressed in the registrar's voting decimals: every deposit's voting
/// tokens are converted into those decimals before being summed up.
#[program]
pub mod governance_registry {
    use super::*;

    /// Creates a new voting registrar. There can only be a single registrar
    /// per governance realm.
    pub fn create_registrar(
        ctx: Context<CreateRegistrar>,
        registrar_bump: u8,
        voting_mint_decimals: u8,
    ) -> Result<()> {
        let registrar = &mut ctx.accounts.registrar.load_init()?;
        registrar.bump = registrar_bump;
        registrar.voting_mint_decimals = voting_mint_decimals;
        registrar.realm = ctx.accounts.realm.key();
        registrar.realm_community_mint = ctx.accounts.realm_community_mint.key();
        registrar.authority = ctx.accounts.authority.key();

        msg!("Created registrar for realm {}", registrar.realm);
        Ok(())
    }

    /// Creates a new exchange rate for a given mint. This allows a voter to
    /// deposit the mint in exchange for voting tokens. There can only be a
    /// single exchange rate per mint and entries can't be changed once
    /// created.
    ///
    /// Calling this again with an identical entry at the same index is a
    /// no-op, which allows clients to blindly re-register their rates.
    #[access_control(exchange_rate_authority(&ctx))]
    pub fn create_exchange_rate(
        ctx: Context<CreateExchangeRate>,
        idx: u16,
        rate: u64,
        decimals: u8,
        _voting_mint_bump: u8,
    ) -> Result<()> {
        require!(rate > 0, ErrorCode::InvalidRate);
        require!(
            decimals == ctx.accounts.deposit_mint.decimals,
            ErrorCode::InvalidDecimals
        );

        let er = ExchangeRateEntry {
            is_used: true,
            mint: ctx.accounts.deposit_mint.key(),
            voting_mint: ctx.accounts.voting_mint.key(),
            rate,
            decimals,
        };

        let registrar = &mut ctx.accounts.registrar.load_mut()?;
        if registrar.check_rate_idx(idx as usize, &er)? {
            registrar.rates[idx as usize] = er;

            msg!("Exchange rate {} for mint {}: {}", idx, er.mint, rate);
            emit!(ExchangeRateCreated {
                registrar: ctx.accounts.registrar.key(),
                rate_idx: idx,
                mint: er.mint,
                voting_mint: er.voting_mint,
                rate,
            });
        }

        Ok(())
    }

    /// Hands the registrar over to a new authority.
    #[access_control(current_authority(&ctx))]
    pub fn set_registrar_authority(
        ctx: Context<SetRegistrarAuthority>,
        new_authority: Pubkey,
    ) -> Result<()> {
        let registrar = &mut ctx.accounts.registrar.load_mut()?;
        registrar.authority = new_authority;

        msg!("Registrar authority set to {}", new_authority);
        Ok(())
    }

    /// Creates a new voter account. There can only be a single voter per
    /// user wallet.
    pub fn create_voter(
        ctx: Context<CreateVoter>,
        voter_bump: u8,
        voter_weight_record_bump: u8,
    ) -> Result<()> {
        // Load accounts.
        let registrar = &ctx.accounts.registrar.load()?;
        let voter = &mut ctx.accounts.voter.load_init()?;
        let voter_weight_record = &mut ctx.accounts.voter_weight_record;

        // Init the voter.
        voter.voter_bump = voter_bump;
        voter.voter_weight_record_bump = voter_weight_record_bump;
        voter.authority = ctx.accounts.authority.key();
        voter.registrar = ctx.accounts.registrar.key();

        // Init the voter weight record.
        voter_weight_record.account_type = VoterWeightAccountType::VoterWeightRecord;
        voter_weight_record.realm = registrar.realm;
        voter_weight_record.governing_token_mint = registrar.realm_community_mint;
        voter_weight_record.governing_token_owner = ctx.accounts.authority.key();
        voter_weight_record.voter_weight = 0;
        voter_weight_record.voter_weight_expiry = None;

        Ok(())
    }

    /// Creates a new deposit entry in the first free slot and locks `amount`
    /// tokens in it for `periods` days (`Daily`, `Cliff`) or months
    /// (`Monthly`).
    pub fn create_deposit(
        ctx: Context<Deposit>,
        kind: LockupKind,
        amount: u64,
        periods: u32,
    ) -> Result<()> {
        require!(amount > 0, ErrorCode::InvalidAmount);

        let (deposit_id, amount_scaled, realm, bump) = {
            // Load accounts.
            let registrar = &ctx.accounts.registrar.load()?;
            let voter = &mut ctx.accounts.voter.load_mut()?;

            // Get the exchange rate entry associated with this deposit.
            let er_idx = registrar.exchange_rate_idx(ctx.accounts.deposit_mint.key())?;
            let er = registrar.rates[er_idx];
            require!(
                er.voting_mint == ctx.accounts.voting_mint.key(),
                ErrorCode::InvalidVotingMint
            );

            let start_ts = Clock::get()?.unix_timestamp;
            let lockup = Lockup::new(kind, start_ts, periods)?;

            // Get and set up the first free deposit entry.
            let free_entry_idx = voter.free_deposit_idx()?;
            voter.deposits[free_entry_idx] = DepositEntry::new(er_idx as u8, amount, lockup);

            (
                free_entry_idx as u8,
                er.convert(amount)?,
                registrar.realm,
                registrar.bump,
            )
        };

        lock_tokens(ctx.accounts, realm, bump, amount, amount_scaled)?;

        msg!(&format!(
            "Deposit {}: locked {} for {} periods, minted {}",
            deposit_id,
            amount,
            periods,
            amount_scaled
        ));
        emit!(DepositEvent {
            voter: ctx.accounts.voter.key(),
            deposit_id,
            kind,
            amount,
            amount_scaled,
        });

        Ok(())
    }

    /// Adds tokens to an existing deposit entry. The lockup schedule is kept
    /// and applies to the new tokens as well, so the share of periods that
    /// already elapsed is withdrawable right away.
    pub fn update_deposit(ctx: Context<Deposit>, deposit_id: u8, amount: u64) -> Result<()> {
        require!(amount > 0, ErrorCode::InvalidAmount);

        let (kind, amount_scaled, realm, bump) = {
            let registrar = &ctx.accounts.registrar.load()?;
            let voter = &mut ctx.accounts.voter.load_mut()?;

            let d_entry = voter.active_deposit_mut(deposit_id)?;
            let er = registrar.rates[d_entry.rate_idx as usize];
            require!(
                er.mint == ctx.accounts.deposit_mint.key(),
                ErrorCode::InvalidMint
            );
            require!(
                er.voting_mint == ctx.accounts.voting_mint.key(),
                ErrorCode::InvalidVotingMint
            );

            d_entry.amount_deposited = d_entry
                .amount_deposited
                .checked_add(amount)
                .ok_or(ErrorCode::Overflow)?;
            d_entry.amount_initial = d_entry
                .amount_initial
                .checked_add(amount)
                .ok_or(ErrorCode::Overflow)?;

            (
                d_entry.lockup.kind,
                er.convert(amount)?,
                registrar.realm,
                registrar.bump,
            )
        };

        lock_tokens(ctx.accounts, realm, bump, amount, amount_scaled)?;

        msg!("Deposit {}: added {}, minted {}", deposit_id, amount, amount_scaled);
        emit!(DepositEvent {
            voter: ctx.accounts.voter.key(),
            deposit_id,
            kind,
            amount,
            amount_scaled,
        });

        Ok(())
    }

    /// Withdraws tokens from a deposit entry, if they are unlocked according
    /// to its vesting schedule. The whole call fails if fewer than `amount`
    /// tokens are withdrawable.
    ///
    /// `amount` is in units of the native currency being withdrawn.
    pub fn withdraw(ctx: Context<Withdraw>, deposit_id: u8, amount: u64) -> Result<()> {
        require!(amount > 0, ErrorCode::InvalidAmount);

        let (amount_scaled, amount_left, realm, bump) = {
            // Load the accounts.
            let registrar = &ctx.accounts.registrar.load()?;
            let voter = &mut ctx.accounts.voter.load_mut()?;
            let curr_ts = Clock::get()?.unix_timestamp;

            let d_entry = voter.active_deposit_mut(deposit_id)?;
            let er = registrar.rates[d_entry.rate_idx as usize];
            require!(
                er.mint == ctx.accounts.withdraw_mint.key(),
                ErrorCode::InvalidMint
            );
            require!(
                er.voting_mint == ctx.accounts.voting_mint.key(),
                ErrorCode::InvalidVotingMint
            );
            require!(
                d_entry.withdrawable(curr_ts) >= amount,
                ErrorCode::InsufficientVestedTokens
            );

            // Update deposit book keeping.
            d_entry.amount_deposited -= amount;

            (
                er.convert(amount)?,
                d_entry.amount_deposited,
                registrar.realm,
                registrar.bump,
            )
        };

        let bump = [bump];
        let seeds = [realm.as_ref(), bump.as_ref()];
        let signer = &[&seeds[..]];

        // Transfer the tokens to withdraw.
        token::transfer(ctx.accounts.transfer_ctx().with_signer(signer), amount)?;

        // Burn the voting tokens, which are frozen in between.
        token::thaw_account(ctx.accounts.thaw_ctx().with_signer(signer))?;
        token::burn(ctx.accounts.burn_ctx(), amount_scaled)?;
        token::freeze_account(ctx.accounts.freeze_ctx().with_signer(signer))?;

        msg!(&format!(
            "Deposit {}: withdrew {}, burned {}, {} left",
            deposit_id,
            amount,
            amount_scaled,
            amount_left
        ));
        emit!(WithdrawEvent {
            voter: ctx.accounts.voter.key(),
            deposit_id,
            amount,
            amount_scaled,
            amount_left,
        });

        Ok(())
    }

    /// Resets a lockup to start at the current timestamp and to last for
    /// `periods`, which must be longer than the number of periods left on the
    /// lockup. All remaining tokens of the deposit are locked again.
    pub fn reset_lockup(ctx: Context<ResetLockup>, deposit_id: u8, periods: u32) -> Result<()> {
        let voter = &mut ctx.accounts.voter.load_mut()?;
        let curr_ts = Clock::get()?.unix_timestamp;

        let d_entry = voter.active_deposit_mut(deposit_id)?;

        // The lockup period can only be increased.
        require!(
            u64::from(periods) > d_entry.lockup.periods_left(curr_ts),
            ErrorCode::InvalidPeriod
        );

        let lockup = Lockup::new(d_entry.lockup.kind, curr_ts, periods)?;
        d_entry.relock(lockup);
        let amount_locked = d_entry.amount_initial;

        msg!(
            "Deposit {}: relocked {} for {} periods",
            deposit_id,
            amount_locked,
            periods
        );

        emit!(LockupReset {
            voter: ctx.accounts.voter.key(),
            deposit_id,
            start_ts: lockup.start_ts,
            end_ts: lockup.end_ts,
        });

        Ok(())
    }

    /// Calculates the voting power for the given voter (the outstanding
    /// voting tokens of all deposits) and writes it into a
    /// `VoteWeightRecord` account to be used by the SPL governance program.
    ///
    /// This "revise" instruction should be called in the same transaction,
    /// immediately before voting.
    pub fn update_voter_weight_record(ctx: Context<UpdateVoterWeightRecord>) -> Result<()> {
        let registrar = ctx.accounts.registrar.load()?;
        let voter = ctx.accounts.voter.load()?;
        let voter_weight = voter.weight(&registrar)?;
        let slot = Clock::get()?.slot;

        let record = &mut ctx.accounts.voter_weight_record;
        record.voter_weight = voter_weight;
        record.voter_weight_expiry = Some(slot);

        emit!(VoterWeightUpdated {
            voter: ctx.accounts.voter.key(),
            voter_weight,
            slot,
        });

        Ok(())
    }

    /// Closes the voter account and its voter weight record, allowing one to
    /// retrieve rent exemption SOL. Only accounts with no remaining deposits
    /// can be closed.
    pub fn close_voter(ctx: Context<CloseVoter>) -> Result<()> {
        let voter = &ctx.accounts.voter.load()?;
        require!(!voter.has_locked_tokens(), ErrorCode::VotingTokenNonZero);
        Ok(())
    }
}

/// Moves `amount` tokens into the exchange vault and mints `amount_scaled`
/// frozen voting tokens to the depositor, signing as the registrar.
fn lock_tokens(
    accounts: &Deposit,
    realm: Pubkey,
    bump: u8,
    amount: u64,
    amount_scaled: u64,
) -> Result<()> {
    let bump = [bump];
    let seeds = [realm.as_ref(), bump.as_ref()];
    let signer = &[&seeds[..]];

    // Deposit tokens into the registrar.
    token::transfer(accounts.transfer_ctx(), amount)?;

    // Thaw the account if it's frozen, so that we can mint.
    if accounts.voting_token.is_frozen() {
        token::thaw_account(accounts.thaw_ctx().with_signer(signer))?;
    }

    token::mint_to(accounts.mint_to_ctx().with_signer(signer), amount_scaled)?;

    // Freeze the vote tokens; they are just used for UIs + accounting.
    token::freeze_account(accounts.freeze_ctx().with_signer(signer))?;

    Ok(())
}
