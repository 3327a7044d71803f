use std::cell::RefCell;
use std::sync::Arc;

use solana_program::{program_option::COption, program_pack::Pack};
use solana_program_test::*;
use solana_sdk::{account::Account, pubkey::Pubkey, signature::Keypair, signer::Signer};

pub use addin::*;
pub use solana::*;
pub use utils::*;

pub mod utils;

trait AddPacked {
    fn add_packable_account<T: Pack>(
        &mut self,
        pubkey: Pubkey,
        amount: u64,
        data: &T,
        owner: &Pubkey,
    );
}

impl AddPacked for ProgramTest {
    fn add_packable_account<T: Pack>(
        &mut self,
        pubkey: Pubkey,
        amount: u64,
        data: &T,
        owner: &Pubkey,
    ) {
        let mut account = Account::new(amount, T::get_packed_len(), owner);
        data.pack_into_slice(&mut account.data);
        self.add_account(pubkey, account);
    }
}

#[derive(Clone, Copy)]
pub struct MintCookie {
    pub decimals: u8,
    pub unit: u64,
    pub pubkey: Pubkey,
}

impl MintCookie {
    pub fn amount(&self, units: u64) -> u64 {
        units * self.unit
    }
}

pub struct UserCookie {
    pub key: Keypair,
    pub token_accounts: Vec<Pubkey>,
}

pub struct TestContext {
    pub solana: Arc<SolanaCookie>,
    pub addin: AddinCookie,
    pub mints: Vec<MintCookie>,
    pub users: Vec<UserCookie>,
}

impl TestContext {
    pub async fn new() -> Self {
        // Surfaces the program's msg! output in failing tests.
        solana_logger::setup_with_default("solana_runtime::message_processor=debug");

        let addin_program_id = governance_registry::id();

        let mut test = ProgramTest::new(
            "governance_registry",
            addin_program_id,
            processor!(governance_registry::entry),
        );

        let mint_decimals = [6u8, 6, 3];
        let mints: Vec<MintCookie> = mint_decimals
            .iter()
            .map(|&decimals| MintCookie {
                decimals,
                unit: 10u64.pow(decimals as u32),
                pubkey: Pubkey::new_unique(),
            })
            .collect();
        let mint_authority = Keypair::new();
        for mint in mints.iter() {
            test.add_packable_account(
                mint.pubkey,
                u32::MAX as u64,
                &spl_token::state::Mint {
                    is_initialized: true,
                    mint_authority: COption::Some(mint_authority.pubkey()),
                    decimals: mint.decimals,
                    ..spl_token::state::Mint::default()
                },
                &spl_token::id(),
            );
        }

        // Users, each with a funded token account for every mint.
        let num_users = 4;
        let mut users = Vec::new();
        for _ in 0..num_users {
            let key = Keypair::new();
            test.add_account(
                key.pubkey(),
                Account {
                    lamports: u32::MAX as u64,
                    ..Account::default()
                },
            );

            let mut token_accounts = Vec::new();
            for mint in mints.iter() {
                let token_key = Pubkey::new_unique();
                test.add_packable_account(
                    token_key,
                    u32::MAX as u64,
                    &spl_token::state::Account {
                        mint: mint.pubkey,
                        owner: key.pubkey(),
                        amount: mint.amount(1_000_000),
                        state: spl_token::state::AccountState::Initialized,
                        ..spl_token::state::Account::default()
                    },
                    &spl_token::id(),
                );
                token_accounts.push(token_key);
            }
            users.push(UserCookie {
                key,
                token_accounts,
            });
        }

        let mut context = test.start_with_context().await;
        let rent = context.banks_client.get_rent().await.unwrap();

        let solana = Arc::new(SolanaCookie {
            context: RefCell::new(context),
            rent,
        });

        TestContext {
            solana: solana.clone(),
            addin: AddinCookie {
                solana: solana.clone(),
                program_id: addin_program_id,
            },
            mints,
            users,
        }
    }
}
