use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ReaderId, UserId};
use crate::money::{Money, RatePerMinute};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AccountError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("reader rating must be between 0 and 5")]
    InvalidRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Reader,
    Admin,
}

/// A marketplace user and their prepaid balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: UserId,
    name: String,
    email: String,
    role: Role,
    balance: Money,
}

impl Account {
    /// # Errors
    ///
    /// Returns `AccountError::EmptyName` for a blank name and
    /// `AccountError::InvalidEmail` when the address has no `@`.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        balance: Money,
    ) -> Result<Self, AccountError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(AccountError::EmptyName);
        }
        let email = email.into().trim().to_owned();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(AccountError::InvalidEmail(email)),
        }

        Ok(Self {
            id,
            name,
            email,
            role,
            balance,
        })
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn balance(&self) -> Money {
        self.balance
    }

    #[must_use]
    pub fn can_afford(&self, amount: Money) -> bool {
        self.balance >= amount
    }

    pub fn set_balance(&mut self, balance: Money) {
        self.balance = balance;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingKind {
    Chat,
    Phone,
    Video,
}

impl ReadingKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReadingKind::Chat => "chat",
            ReadingKind::Phone => "phone",
            ReadingKind::Video => "video",
        }
    }
}

/// Public profile of a reader offering pay-per-minute readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reader {
    id: ReaderId,
    user_id: UserId,
    name: String,
    rate: RatePerMinute,
    is_online: bool,
    rating: Option<f32>,
    specialties: Vec<String>,
}

impl Reader {
    /// # Errors
    ///
    /// Returns `AccountError::EmptyName` for a blank display name.
    pub fn new(
        id: ReaderId,
        user_id: UserId,
        name: impl Into<String>,
        rate: RatePerMinute,
    ) -> Result<Self, AccountError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(AccountError::EmptyName);
        }
        Ok(Self {
            id,
            user_id,
            name,
            rate,
            is_online: false,
            rating: None,
            specialties: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_online(mut self, is_online: bool) -> Self {
        self.is_online = is_online;
        self
    }

    /// # Errors
    ///
    /// Returns `AccountError::InvalidRating` outside `0.0..=5.0`.
    pub fn with_rating(mut self, rating: f32) -> Result<Self, AccountError> {
        if !(0.0..=5.0).contains(&rating) {
            return Err(AccountError::InvalidRating);
        }
        self.rating = Some(rating);
        Ok(self)
    }

    #[must_use]
    pub fn with_specialties<I, S>(mut self, specialties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specialties = specialties.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn id(&self) -> ReaderId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn rate(&self) -> RatePerMinute {
        self.rate
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.is_online
    }

    #[must_use]
    pub fn rating(&self) -> Option<f32> {
        self.rating
    }

    #[must_use]
    pub fn specialties(&self) -> &[String] {
        &self.specialties
    }
}
