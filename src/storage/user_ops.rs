use std::collections::HashSet;

use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::{Account, Session, Subscription, UserProfile, UserPurchase};
use super::tables::*;

impl Database {
    // ========================================================================
    // Account operations
    // ========================================================================

    /// Store an account and index it by email.
    pub fn put_account(&self, account: &Account) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(ACCOUNTS)?;
            let data = rmp_serde::to_vec_named(account)?;
            table.insert(account.id.as_str(), data.as_slice())?;

            let mut email_table = write_txn.open_table(ACCOUNT_EMAILS)?;
            email_table.insert(account.email.as_str(), account.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_account(&self, id: &str) -> Result<Option<Account>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let email_table = read_txn.open_table(ACCOUNT_EMAILS)?;

        let id = match email_table.get(email)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(id.as_str())? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Session operations
    // ========================================================================

    pub fn put_session(&self, session: &Session) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSIONS)?;
            let data = rmp_serde::to_vec_named(session)?;
            table.insert(session.token.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_session(&self, token: &str) -> Result<Option<Session>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;

        match table.get(token)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    pub fn delete_session(&self, token: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let removed = table.remove(token)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    // ========================================================================
    // Profile operations
    // ========================================================================

    pub fn put_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(USER_PROFILES)?;
            let data = rmp_serde::to_vec_named(profile)?;
            table.insert(profile.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Single-row fetch-or-none; a missing profile is not an error.
    pub fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(USER_PROFILES)?;

        match table.get(user_id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    pub fn delete_profile(&self, user_id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(USER_PROFILES)?;
            let removed = table.remove(user_id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    // ========================================================================
    // Purchase ledger
    // ========================================================================

    /// Record a purchase row and index it by user. Duplicate (user, content)
    /// pairs are allowed; nothing constrains the ledger to one row each.
    pub fn put_purchase(&self, purchase: &UserPurchase) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(USER_PURCHASES)?;
            let data = rmp_serde::to_vec_named(purchase)?;
            table.insert(purchase.id.as_str(), data.as_slice())?;

            let mut index = write_txn.open_table(USER_PURCHASE_INDEX)?;
            let mut ids: Vec<String> = match index.get(purchase.user_id.as_str())? {
                Some(data) => rmp_serde::from_slice(data.value())?,
                None => Vec::new(),
            };
            if !ids.contains(&purchase.id) {
                ids.push(purchase.id.clone());
                let data = rmp_serde::to_vec_named(&ids)?;
                index.insert(purchase.user_id.as_str(), data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// All purchase rows for a user, most recent first.
    pub fn list_purchases(&self, user_id: &str) -> Result<Vec<UserPurchase>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(USER_PURCHASE_INDEX)?;
        let table = read_txn.open_table(USER_PURCHASES)?;

        let ids: Vec<String> = match index.get(user_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut purchases = Vec::new();
        for id in ids {
            if let Some(data) = table.get(id.as_str())? {
                let purchase: UserPurchase = rmp_serde::from_slice(data.value())?;
                purchases.push(purchase);
            }
        }

        purchases.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        Ok(purchases)
    }

    /// Project the purchase ledger to the set of content ids the user holds.
    /// A point-in-time snapshot; membership tests are O(1) on the set.
    pub fn purchased_content_ids(&self, user_id: &str) -> Result<HashSet<String>, DatabaseError> {
        Ok(self
            .list_purchases(user_id)?
            .into_iter()
            .map(|p| p.content_id)
            .collect())
    }

    // ========================================================================
    // Subscriptions (read-only entitlement source, not wired into the gate)
    // ========================================================================

    pub fn put_subscription(&self, subscription: &Subscription) -> Result<(), DatabaseError> {
        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(SUBSCRIPTIONS)?;
            let data = rmp_serde::to_vec_named(subscription)?;
            table.insert(subscription.id.as_str(), data.as_slice())?;

            let mut index = write_txn.open_table(USER_SUBSCRIPTIONS)?;
            let mut ids: Vec<String> = match index.get(subscription.user_id.as_str())? {
                Some(data) => rmp_serde::from_slice(data.value())?,
                None => Vec::new(),
            };
            if !ids.contains(&subscription.id) {
                ids.push(subscription.id.clone());
                let data = rmp_serde::to_vec_named(&ids)?;
                index.insert(subscription.user_id.as_str(), data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// True when the user holds a subscription with status "active" that has
    /// not yet expired at `now`.
    pub fn has_active_subscription(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index = read_txn.open_table(USER_SUBSCRIPTIONS)?;
        let table = read_txn.open_table(SUBSCRIPTIONS)?;

        let ids: Vec<String> = match index.get(user_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(false),
        };

        for id in ids {
            if let Some(data) = table.get(id.as_str())? {
                let subscription: Subscription = rmp_serde::from_slice(data.value())?;
                if subscription.is_active(now) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
