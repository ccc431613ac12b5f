//! The accounts committed to by the merkle root and their leaf encoding.
//!
//! Every account is committed to as the leaf `(<id>,<balance>)`: an opening
//! parenthesis, the decimal id, a comma, the decimal balance and a closing
//! parenthesis, without any whitespace.
use std::{
    collections::HashMap,
    fmt::{
        self,
        Display,
        Formatter,
    },
    num::ParseIntError,
    str::FromStr,
};

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: u64,
    pub balance: u64,
}

impl Account {
    /// Returns the leaf committing to this account.
    #[must_use]
    pub fn leaf(&self) -> String {
        format!("({},{})", self.id, self.balance)
    }
}

/// A non-empty, ordered list of accounts with unique ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    accounts: Vec<Account>,
    index_by_id: HashMap<u64, usize>,
}

impl Ledger {
    /// Constructs a ledger, keeping the order of `accounts`.
    ///
    /// # Errors
    /// Returns an error if `accounts` is empty or if two accounts share an id.
    pub fn try_from_accounts(accounts: Vec<Account>) -> Result<Self, LedgerError> {
        if accounts.is_empty() {
            return Err(LedgerError::empty());
        }
        let mut index_by_id = HashMap::with_capacity(accounts.len());
        for (index, account) in accounts.iter().enumerate() {
            if index_by_id.insert(account.id, index).is_some() {
                return Err(LedgerError::duplicate_id(account.id));
            }
        }
        Ok(Self {
            accounts,
            index_by_id,
        })
    }

    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Returns the position of the account with `id` in ledger order, if any.
    #[must_use]
    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    /// Returns the account with `id`, if any.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Account> {
        self.index_of(id).map(|index| &self.accounts[index])
    }

    /// Returns the leaves of all accounts, in ledger order.
    #[must_use]
    pub fn leaves(&self) -> Vec<String> {
        self.accounts.iter().map(Account::leaf).collect()
    }
}

/// Parses the `<id>:<balance>,<id>:<balance>,...` form used in configuration.
///
/// Whitespace around entries, ids and balances is ignored. Empty entries,
/// including one after a trailing comma, are rejected.
impl FromStr for Ledger {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(LedgerError::empty());
        }
        let accounts = s
            .split(',')
            .map(str::trim)
            .map(parse_account)
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from_accounts(accounts)
    }
}

impl Display for Ledger {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut accounts = self.accounts.iter();
        if let Some(Account {
            id,
            balance,
        }) = accounts.next()
        {
            write!(f, "{id}:{balance}")?;
        }
        for Account {
            id,
            balance,
        } in accounts
        {
            write!(f, ",{id}:{balance}")?;
        }
        Ok(())
    }
}

fn parse_account(entry: &str) -> Result<Account, LedgerError> {
    let (id, balance) = entry
        .split_once(':')
        .ok_or_else(|| LedgerError::missing_separator(entry))?;
    let id = id
        .trim()
        .parse()
        .map_err(|source| LedgerError::id(entry, source))?;
    let balance = balance
        .trim()
        .parse()
        .map_err(|source| LedgerError::balance(entry, source))?;
    Ok(Account {
        id,
        balance,
    })
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct LedgerError(LedgerErrorKind);

impl LedgerError {
    fn empty() -> Self {
        Self(LedgerErrorKind::Empty)
    }

    fn duplicate_id(id: u64) -> Self {
        Self(LedgerErrorKind::DuplicateId {
            id,
        })
    }

    fn missing_separator(entry: &str) -> Self {
        Self(LedgerErrorKind::MissingSeparator {
            entry: entry.to_string(),
        })
    }

    fn id(entry: &str, source: ParseIntError) -> Self {
        Self(LedgerErrorKind::Id {
            entry: entry.to_string(),
            source,
        })
    }

    fn balance(entry: &str, source: ParseIntError) -> Self {
        Self(LedgerErrorKind::Balance {
            entry: entry.to_string(),
            source,
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum LedgerErrorKind {
    #[error("the ledger must contain at least one account")]
    Empty,
    #[error("account id `{id}` appears more than once")]
    DuplicateId { id: u64 },
    #[error("account entry `{entry}` is not of the form `<id>:<balance>`")]
    MissingSeparator { entry: String },
    #[error("failed to parse id of account entry `{entry}`")]
    Id {
        entry: String,
        source: ParseIntError,
    },
    #[error("failed to parse balance of account entry `{entry}`")]
    Balance {
        entry: String,
        source: ParseIntError,
    },
}

/// Extracts the balance from a leaf of the form `(<id>,<balance>)`.
///
/// # Errors
/// Returns an error if `leaf` is not of that form or if the balance is not a
/// non-negative integer fitting into a `u64`.
pub fn parse_balance(leaf: &[u8]) -> Result<u64, ParseBalanceError> {
    let leaf = std::str::from_utf8(leaf).map_err(|_| ParseBalanceError::not_utf8())?;
    let inner = leaf
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(ParseBalanceError::missing_parentheses)?;
    let (_id, balance) = inner
        .split_once(',')
        .ok_or_else(ParseBalanceError::missing_comma)?;
    balance.parse().map_err(ParseBalanceError::balance)
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ParseBalanceError(ParseBalanceErrorKind);

impl ParseBalanceError {
    fn not_utf8() -> Self {
        Self(ParseBalanceErrorKind::NotUtf8)
    }

    fn missing_parentheses() -> Self {
        Self(ParseBalanceErrorKind::MissingParentheses)
    }

    fn missing_comma() -> Self {
        Self(ParseBalanceErrorKind::MissingComma)
    }

    fn balance(source: ParseIntError) -> Self {
        Self(ParseBalanceErrorKind::Balance(source))
    }
}

#[derive(Debug, thiserror::Error)]
enum ParseBalanceErrorKind {
    #[error("leaf is not valid utf8")]
    NotUtf8,
    #[error("leaf is not enclosed in parentheses")]
    MissingParentheses,
    #[error("leaf does not contain a comma separating id and balance")]
    MissingComma,
    #[error("failed to parse balance as an unsigned integer")]
    Balance(#[source] ParseIntError),
}
