//! # Responder
//!
//! Maps a free-text query to a canned reply using literal keyword tests.
//! This is not intent classification: the query is lower-cased and checked
//! for substrings, in a fixed priority order.
//!
//! ## Matching Rules (first match wins):
//! 1. "checking" + "balance" → checking balance
//! 2. "savings" + "balance" → savings balance
//! 3. "account" + "balance" → both balances
//! 4. anything else → help message
//!
//! A query naming both accounts gets the checking reply because rule 1 is
//! tested first.

use crate::ledger::{Account, AccountLedger};

pub const HELP_REPLY: &str =
    "I can help with account balance questions. Try asking: what is my checking account balance?";

/// Which rule produced a reply. Used for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Checking,
    Savings,
    AllAccounts,
    Help,
}

impl ReplyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyKind::Checking => "checking",
            ReplyKind::Savings => "savings",
            ReplyKind::AllAccounts => "all_accounts",
            ReplyKind::Help => "help",
        }
    }
}

/// Stateless query-to-reply mapping over an injected ledger.
#[derive(Debug, Clone)]
pub struct Responder {
    ledger: AccountLedger,
}

impl Responder {
    pub fn new(ledger: AccountLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &AccountLedger {
        &self.ledger
    }

    /// Decide which rule a query falls under.
    pub fn classify(&self, query: &str) -> ReplyKind {
        let normalized = query.to_lowercase();
        let mentions = |word: &str| normalized.contains(word);

        if !mentions("balance") {
            return ReplyKind::Help;
        }

        if mentions("checking") {
            ReplyKind::Checking
        } else if mentions("savings") {
            ReplyKind::Savings
        } else if mentions("account") {
            ReplyKind::AllAccounts
        } else {
            ReplyKind::Help
        }
    }

    /// Classify once and render the matching reply.
    pub fn respond(&self, query: &str) -> (ReplyKind, String) {
        let kind = self.classify(query);
        (kind, self.render(kind))
    }

    /// Produce the reply text for a query. Never fails.
    pub fn reply(&self, query: &str) -> String {
        self.respond(query).1
    }

    fn render(&self, kind: ReplyKind) -> String {
        match kind {
            ReplyKind::Checking => format!(
                "Your checking account balance is ${}.",
                self.ledger.formatted_balance(Account::Checking)
            ),
            ReplyKind::Savings => format!(
                "Your savings account balance is ${}.",
                self.ledger.formatted_balance(Account::Savings)
            ),
            ReplyKind::AllAccounts => format!(
                "Your checking account balance is ${} and your savings account balance is ${}.",
                self.ledger.formatted_balance(Account::Checking),
                self.ledger.formatted_balance(Account::Savings)
            ),
            ReplyKind::Help => HELP_REPLY.to_string(),
        }
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(AccountLedger::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checking_round_trip() {
        let responder = Responder::default();
        assert_eq!(
            responder.reply("What is my checking account balance?"),
            "Your checking account balance is $2540.34."
        );
    }

    #[test]
    fn test_savings_balance() {
        let responder = Responder::default();
        let reply = responder.reply("savings BALANCE please");
        assert_eq!(reply, "Your savings account balance is $10420.76.");
    }

    #[test]
    fn test_combined_account_balance() {
        let responder = Responder::default();
        let reply = responder.reply("What is my account balance?");
        assert!(reply.contains("$2540.34"));
        assert!(reply.contains("$10420.76"));
        assert_eq!(responder.classify("account balance"), ReplyKind::AllAccounts);
    }

    #[test]
    fn test_checking_wins_over_savings() {
        let responder = Responder::default();
        let reply = responder.reply("balance of savings and checking");
        assert_eq!(reply, "Your checking account balance is $2540.34.");
    }

    #[test]
    fn test_keywords_without_balance_get_help() {
        let responder = Responder::default();
        for query in ["checking", "open a savings account", "hello", "what's my balanc"] {
            assert_eq!(responder.reply(query), HELP_REPLY, "query: {}", query);
        }
    }

    #[test]
    fn test_balance_alone_gets_help() {
        let responder = Responder::default();
        assert_eq!(responder.classify("balance"), ReplyKind::Help);
    }

    #[test]
    fn test_substring_matching_is_literal() {
        // "balances" and "accounts" still contain the keywords.
        let responder = Responder::default();
        assert_eq!(responder.classify("show all accounts balances"), ReplyKind::AllAccounts);
    }

    #[test]
    fn test_respond_pairs_kind_with_reply() {
        let responder = Responder::default();
        let (kind, reply) = responder.respond("What is my Savings balance?");
        assert_eq!(kind, ReplyKind::Savings);
        assert_eq!(reply, "Your savings account balance is $10420.76.");

        let (kind, reply) = responder.respond("good morning");
        assert_eq!(kind, ReplyKind::Help);
        assert_eq!(reply, HELP_REPLY);
    }

    #[test]
    fn test_injected_ledger_is_used() {
        let responder = Responder::new(AccountLedger::new(1.5, 99.999));
        assert_eq!(responder.reply("checking balance"), "Your checking account balance is $1.50.");
        assert_eq!(responder.reply("savings balance"), "Your savings account balance is $100.00.");
    }
}
