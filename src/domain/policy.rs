//! Monetary rules shared by deposits, withdrawals and bets.

/// Size of one fee block.
pub const FEE_BLOCK: i64 = 1000;
/// Flat fee charged for every complete block.
pub const FEE_PER_BLOCK: i64 = 50;

pub const MIN_WITHDRAWAL: i64 = 1000;
pub const WITHDRAWAL_INCREMENT: i64 = 100;

pub const MIN_BET: i64 = 100;
pub const BET_INCREMENT: i64 = 100;
pub const PAYOUT_MULTIPLIER: i64 = 2;

/// Fee for a requested amount: 50 per full thousand units.
pub fn fee_for(amount: i64) -> i64 {
    (amount / FEE_BLOCK) * FEE_PER_BLOCK
}

/// Requested amount minus its fee.
pub fn net_of_fee(amount: i64) -> i64 {
    amount - fee_for(amount)
}

pub fn is_valid_bet(bet_amount: i64) -> bool {
    bet_amount >= MIN_BET && bet_amount % BET_INCREMENT == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_is_charged_per_full_block() {
        assert_eq!(fee_for(999), 0);
        assert_eq!(fee_for(1000), 50);
        assert_eq!(fee_for(1999), 50);
        assert_eq!(fee_for(2500), 100);
    }

    #[test]
    fn test_net_of_fee() {
        assert_eq!(net_of_fee(1000), 950);
        assert_eq!(net_of_fee(500), 500);
        assert_eq!(net_of_fee(10_000), 9_500);
    }

    #[test]
    fn test_bet_amount_rules() {
        assert!(is_valid_bet(100));
        assert!(is_valid_bet(1200));
        assert!(!is_valid_bet(150));
        assert!(!is_valid_bet(0));
        assert!(!is_valid_bet(-100));
    }
}
