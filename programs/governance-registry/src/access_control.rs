use crate::account::*;
use crate::context::*;
use crate::error::*;
use anchor_lang::prelude::*;

pub fn exchange_rate_authority(ctx: &Context<CreateExchangeRate>) -> Result<()> {
    check_registrar_authority(&ctx.accounts.registrar, &ctx.accounts.authority)
}

pub fn current_authority(ctx: &Context<SetRegistrarAuthority>) -> Result<()> {
    check_registrar_authority(&ctx.accounts.registrar, &ctx.accounts.authority)
}

fn check_registrar_authority(
    registrar: &AccountLoader<Registrar>,
    authority: &Signer,
) -> Result<()> {
    require!(
        registrar.load()?.authority == authority.key(),
        ErrorCode::Unauthorized
    );
    Ok(())
}
