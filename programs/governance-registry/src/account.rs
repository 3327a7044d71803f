use crate::error::*;
use anchor_lang::prelude::*;
use anchor_spl::vote_weight_record;

// Generate a VoteWeightRecord Anchor wrapper, owned by the current program.
// VoteWeightRecords are unique in that they are defined by the SPL governance
// program, but they are actually owned by this program.
vote_weight_record!(crate::ID);

/// Seconds in one day.
pub const SECS_PER_DAY: i64 = 86_400;

/// Seconds in one month (a twelfth of a 365 day year).
pub const SECS_PER_MONTH: i64 = 365 * SECS_PER_DAY / 12;

/// Maximum number of days one can lock for.
pub const MAX_DAYS_LOCKED: u32 = 2555;

/// Maximum number of months one can lock for.
pub const MAX_MONTHS_LOCKED: u32 = 84;

/// Instance of a voting rights distributor.
#[account(zero_copy)]
pub struct Registrar {
    pub authority: Pubkey,
    pub realm: Pubkey,
    pub realm_community_mint: Pubkey,
    pub bump: u8,
    // Decimals the voter weight is expressed in.
    pub voting_mint_decimals: u8,
    // The length should be adjusted for one's use case.
    pub rates: [ExchangeRateEntry; 5],
}

impl Registrar {
    /// Index of the exchange rate registered for `mint`.
    pub fn exchange_rate_idx(&self, mint: Pubkey) -> Result<usize> {
        self.rates
            .iter()
            .position(|r| r.is_used && r.mint == mint)
            .ok_or_else(|| ErrorCode::ExchangeRateEntryNotFound.into())
    }

    /// Checks that `er` may be stored at `idx`.
    ///
    /// Entries are append only: `idx` must be the first unused slot, unless
    /// the slot already holds an identical entry. Returns `false` in the
    /// latter case, meaning there is nothing to write.
    pub fn check_rate_idx(&self, idx: usize, er: &ExchangeRateEntry) -> Result<bool> {
        require!(idx < self.rates.len(), ErrorCode::InvalidRateIndex);

        let existing = &self.rates[idx];
        if existing.is_used {
            require!(existing.same_config(er), ErrorCode::InvalidRateIndex);
            return Ok(false);
        }

        let next_free = self.rates.iter().position(|r| !r.is_used);
        require!(next_free == Some(idx), ErrorCode::InvalidRateIndex);
        require!(
            !self.rates.iter().any(|r| r.is_used && r.mint == er.mint),
            ErrorCode::InvalidRateIndex
        );
        Ok(true)
    }

    /// Rescales voting tokens minted under `er` to the registrar's voting
    /// decimals.
    pub fn normalize(&self, er: &ExchangeRateEntry, amount_scaled: u64) -> Result<u64> {
        let (from, to) = (er.decimals, self.voting_mint_decimals);
        let normalized = if from <= to {
            10u64
                .checked_pow(u32::from(to - from))
                .and_then(|factor| amount_scaled.checked_mul(factor))
        } else {
            Some(
                10u64
                    .checked_pow(u32::from(from - to))
                    .map_or(0, |factor| amount_scaled / factor),
            )
        };
        normalized.ok_or_else(|| ErrorCode::Overflow.into())
    }
}

/// Exchange rate for an asset that can be used to mint voting rights.
#[zero_copy]
pub struct ExchangeRateEntry {
    // True if the exchange rate entry is being used.
    pub is_used: bool,
    // Mint that can be deposited.
    pub mint: Pubkey,
    // Registrar owned mint of the frozen voting tokens.
    pub voting_mint: Pubkey,
    pub rate: u64,
    // Mint decimals.
    pub decimals: u8,
}

impl ExchangeRateEntry {
    /// Amount of voting tokens minted for `amount` deposited tokens.
    pub fn convert(&self, amount: u64) -> Result<u64> {
        amount
            .checked_mul(self.rate)
            .ok_or_else(|| ErrorCode::Overflow.into())
    }

    fn same_config(&self, other: &ExchangeRateEntry) -> bool {
        self.mint == other.mint && self.rate == other.rate && self.decimals == other.decimals
    }
}

/// User account for minting voting rights.
#[account(zero_copy)]
pub struct Voter {
    pub authority: Pubkey,
    pub registrar: Pubkey,
    pub voter_bump: u8,
    pub voter_weight_record_bump: u8,
    pub deposits: [DepositEntry; 32],
}

impl Voter {
    /// Sum of the outstanding voting tokens of all deposits, in the
    /// registrar's voting decimals.
    pub fn weight(&self, registrar: &Registrar) -> Result<u64> {
        self.deposits
            .iter()
            .filter(|d| d.is_used)
            .try_fold(0u64, |sum, d| {
                let er = registrar
                    .rates
                    .get(d.rate_idx as usize)
                    .ok_or(ErrorCode::ExchangeRateEntryNotFound)?;
                let weight = registrar.normalize(er, er.convert(d.amount_deposited)?)?;
                sum.checked_add(weight)
                    .ok_or_else(|| ErrorCode::Overflow.into())
            })
    }

    /// First slot that is unused or fully withdrawn.
    pub fn free_deposit_idx(&self) -> Result<usize> {
        self.deposits
            .iter()
            .position(|d| d.is_free())
            .ok_or_else(|| ErrorCode::DepositEntryFull.into())
    }

    /// Deposit entry `id`, which must still hold tokens.
    pub fn active_deposit_mut(&mut self, id: u8) -> Result<&mut DepositEntry> {
        let d = self
            .deposits
            .get_mut(id as usize)
            .ok_or(ErrorCode::InvalidDepositId)?;
        require!(!d.is_free(), ErrorCode::InvalidDepositId);
        Ok(d)
    }

    pub fn has_locked_tokens(&self) -> bool {
        self.deposits
            .iter()
            .any(|d| d.is_used && d.amount_deposited > 0)
    }
}

/// Bookkeeping for a single deposit for a given mint and lockup schedule.
///
/// A fully withdrawn entry keeps `is_used` set so it stays inspectable, but
/// the allocator treats it as free and overwrites every field on reuse.
#[zero_copy]
pub struct DepositEntry {
    // True if the deposit entry is being used.
    pub is_used: bool,
    // Points to the ExchangeRate this deposit uses.
    pub rate_idx: u8,
    // Amount in the native currency still deposited.
    pub amount_deposited: u64,
    // Amount the vesting schedule applies to.
    pub amount_initial: u64,
    // Locked state.
    pub lockup: Lockup,
}

impl DepositEntry {
    pub fn new(rate_idx: u8, amount: u64, lockup: Lockup) -> Self {
        Self {
            is_used: true,
            rate_idx,
            amount_deposited: amount,
            amount_initial: amount,
            lockup,
        }
    }

    pub fn is_free(&self) -> bool {
        !self.is_used || self.amount_deposited == 0
    }

    pub fn amount_withdrawn(&self) -> u64 {
        self.amount_initial.saturating_sub(self.amount_deposited)
    }

    /// # Vesting
    ///
    /// The vested amount is the initial principal times the vested fraction
    /// of the lockup, rounded down. Withdrawals are subtracted afterwards, so
    /// the result never depends on when earlier withdrawals happened.
    pub fn vested(&self, curr_ts: i64) -> u64 {
        let (num, den) = self.lockup.vested_fraction(curr_ts);
        let vested = u128::from(self.amount_initial) * u128::from(num) / u128::from(den);
        // num <= den, so this fits.
        vested as u64
    }

    /// Amount that may be withdrawn at `curr_ts`.
    pub fn withdrawable(&self, curr_ts: i64) -> u64 {
        self.vested(curr_ts)
            .saturating_sub(self.amount_withdrawn())
            .min(self.amount_deposited)
    }

    /// Restarts the lockup at `lockup`, relocking all remaining tokens.
    pub fn relock(&mut self, lockup: Lockup) {
        self.amount_initial = self.amount_deposited;
        self.lockup = lockup;
    }
}

#[zero_copy]
pub struct Lockup {
    pub kind: LockupKind,
    // Start of the lockup.
    pub start_ts: i64,
    // End of the lockup.
    pub end_ts: i64,
    // Length in days or months, depending on the kind.
    pub periods: u32,
    // Empty bytes for future upgrades.
    pub padding: [u8; 16],
}

impl Lockup {
    pub fn new(kind: LockupKind, start_ts: i64, periods: u32) -> Result<Self> {
        require!(
            periods > 0 && periods <= kind.max_periods(),
            ErrorCode::InvalidPeriod
        );
        let end_ts = i64::from(periods)
            .checked_mul(kind.period_secs())
            .and_then(|secs| start_ts.checked_add(secs))
            .ok_or(ErrorCode::Overflow)?;
        Ok(Self {
            kind,
            start_ts,
            end_ts,
            periods,
            padding: [0u8; 16],
        })
    }

    /// Number of whole periods since the start, capped at the lockup length.
    pub fn periods_elapsed(&self, curr_ts: i64) -> u64 {
        if curr_ts <= self.start_ts {
            return 0;
        }
        let elapsed = curr_ts.saturating_sub(self.start_ts) / self.kind.period_secs();
        (elapsed as u64).min(u64::from(self.periods))
    }

    pub fn periods_left(&self, curr_ts: i64) -> u64 {
        u64::from(self.periods) - self.periods_elapsed(curr_ts)
    }

    pub fn expired(&self, curr_ts: i64) -> bool {
        curr_ts >= self.end_ts
    }

    /// Vested share of the principal as `(numerator, denominator)`.
    pub fn vested_fraction(&self, curr_ts: i64) -> (u64, u64) {
        let total = u64::from(self.periods);
        if total == 0 {
            return (1, 1);
        }
        match self.kind {
            LockupKind::Cliff => {
                if self.expired(curr_ts) {
                    (1, 1)
                } else {
                    (0, 1)
                }
            }
            LockupKind::Daily | LockupKind::Monthly => (self.periods_elapsed(curr_ts), total),
        }
    }
}

#[repr(u8)]
#[derive(AnchorSerialize, AnchorDeserialize, Debug, Clone, Copy, PartialEq)]
pub enum LockupKind {
    Daily,
    Monthly,
    Cliff,
}

impl LockupKind {
    pub fn period_secs(&self) -> i64 {
        match self {
            LockupKind::Daily | LockupKind::Cliff => SECS_PER_DAY,
            LockupKind::Monthly => SECS_PER_MONTH,
        }
    }

    pub fn max_periods(&self) -> u32 {
        match self {
            LockupKind::Daily | LockupKind::Cliff => MAX_DAYS_LOCKED,
            LockupKind::Monthly => MAX_MONTHS_LOCKED,
        }
    }
}
