//! Handler-level tests
//!
//! Command construction and the balance rules the handlers apply inside
//! their transactions. Database-backed flows live in `tests/`.

#[cfg(test)]
mod tests {
    use crate::domain::{quote, Amount, Balance, DomainError, InvestorProfile};
    use crate::error::AppError;
    use crate::handlers::{
        ConvertCommand, LoginCommand, RegisterCommand, SetProfileCommand, TransferCommand,
        INITIAL_OPCOIN_BALANCE,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    // =========================================================================
    // Registration / login commands
    // =========================================================================

    #[test]
    fn test_register_command_normalizes_input() {
        let cmd = RegisterCommand::new("  Alice@Example.com ", "secret1".to_string(), " Alice ");

        assert_eq!(cmd.email, "alice@example.com");
        assert_eq!(cmd.name, "Alice");
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_register_command_rejects_bad_input() {
        let blank_name = RegisterCommand::new("a@b.com", "secret1".to_string(), "   ");
        assert!(matches!(blank_name.validate(), Err(AppError::InvalidRequest(_))));

        let bad_email = RegisterCommand::new("not-an-email", "secret1".to_string(), "Bob");
        assert!(matches!(bad_email.validate(), Err(AppError::InvalidRequest(_))));

        let short_password = RegisterCommand::new("a@b.com", "12345".to_string(), "Bob");
        assert!(matches!(short_password.validate(), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_login_command_normalizes_email() {
        let cmd = LoginCommand::new("BOB@Example.com", "pw".to_string());
        assert_eq!(cmd.email, "bob@example.com");
    }

    // =========================================================================
    // Convert
    // =========================================================================

    #[test]
    fn test_convert_fifty_opcoin() {
        let cmd = ConvertCommand::new(Uuid::new_v4(), dec!(50));
        let quote = quote(Amount::new(cmd.op_coins).unwrap()).unwrap();

        let op = Balance::new(Decimal::from(INITIAL_OPCOIN_BALANCE))
            .debit(&quote.op_coins)
            .unwrap();
        let brl = Balance::zero().credit(&quote.brl);

        assert_eq!(op.value(), dec!(4950));
        assert_eq!(brl.value(), dec!(10));
    }

    #[test]
    fn test_convert_more_than_balance() {
        let quote = quote(Amount::new(dec!(5001)).unwrap()).unwrap();
        let result = Balance::new(Decimal::from(INITIAL_OPCOIN_BALANCE)).debit(&quote.op_coins);

        assert!(matches!(result, Err(DomainError::InsufficientFunds { .. })));
    }

    #[test]
    fn test_convert_rejects_non_positive_amount() {
        let err = Amount::new(Decimal::ZERO).map_err(DomainError::from).unwrap_err();
        assert!(matches!(err, DomainError::InvalidAmount(_)));
    }

    // =========================================================================
    // Transfer
    // =========================================================================

    #[test]
    fn test_transfer_command_normalizes_input() {
        let sender = Uuid::new_v4();
        let cmd = TransferCommand::new(sender, " Bob@Example.com", "brl ", dec!(4));

        assert_eq!(cmd.sender_id, sender);
        assert_eq!(cmd.recipient_email, "bob@example.com");
        assert_eq!(cmd.coin_symbol, "BRL");
        assert_eq!(cmd.amount, dec!(4));
    }

    #[test]
    fn test_transfer_balances() {
        let amount = Amount::new(dec!(4)).unwrap();

        let sender = Balance::new(dec!(10)).debit(&amount).unwrap();
        let recipient = Balance::zero().credit(&amount);

        assert_eq!(sender.value(), dec!(6));
        assert_eq!(recipient.value(), dec!(4));
    }

    #[test]
    fn test_transfer_exact_balance() {
        let amount = Amount::new(dec!(10)).unwrap();
        let sender = Balance::new(dec!(10)).debit(&amount).unwrap();
        assert_eq!(sender.value(), Decimal::ZERO);
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    #[test]
    fn test_set_profile_command_parses() {
        let cmd = SetProfileCommand::new(Uuid::new_v4(), "moderate");
        assert_eq!(cmd.parsed_profile().unwrap(), InvestorProfile::Moderate);
    }

    #[test]
    fn test_set_profile_command_rejects_unknown() {
        let cmd = SetProfileCommand::new(Uuid::new_v4(), "YOLO");
        assert!(matches!(
            cmd.parsed_profile(),
            Err(AppError::Domain(DomainError::InvalidProfile(_)))
        ));
    }
}
