pub use anchor_lang::__private::ErrorCode as AnchorErrorCode;
use governance_registry::error::ErrorCode;
use solana_sdk::instruction::InstructionError;
use solana_sdk::transaction::TransactionError;
use solana_sdk::transport::TransportError;

/// Custom program errors declared with `#[error]` start at this code.
pub const ANCHOR_ERROR_CODE_OFFSET: u32 = 300;

pub fn error_code(error: ErrorCode) -> u32 {
    error as u32 + ANCHOR_ERROR_CODE_OFFSET
}

pub fn assert_custom_error<T>(result: Result<T, TransportError>, error: ErrorCode) {
    assert_error_code(result, error_code(error));
}

/// Fails with one of Anchor's built in account constraint errors.
pub fn assert_anchor_error<T>(result: Result<T, TransportError>, error: AnchorErrorCode) {
    assert_error_code(result, error as u32);
}

pub fn assert_error_code<T>(result: Result<T, TransportError>, expected: u32) {
    match result {
        Err(TransportError::TransactionError(TransactionError::InstructionError(
            _,
            InstructionError::Custom(code),
        ))) => assert_eq!(code, expected, "expected custom error {}", expected),
        Err(other) => panic!("expected custom error {}, got {:?}", expected, other),
        Ok(_) => panic!("expected custom error {}, but the transaction succeeded", expected),
    }
}
