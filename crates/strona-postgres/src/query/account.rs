//! Account repository for the `users` table.

use std::future::Future;

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{Account, NewAccount};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for account database operations.
pub trait AccountRepository {
    /// Inserts a new account and returns the stored row.
    ///
    /// A duplicate name fails with a [`PgError::Query`] whose
    /// [`constraint_violation`] is [`AccountConstraints::NameUnique`].
    ///
    /// [`constraint_violation`]: PgError::constraint_violation
    /// [`AccountConstraints::NameUnique`]: crate::types::AccountConstraints::NameUnique
    fn create_account(
        &mut self,
        new_account: NewAccount,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    /// Finds an account by its exact name.
    ///
    /// Absence is `Ok(None)`, never an error.
    fn find_account_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Checks whether an account with this exact name exists.
    fn account_name_exists(&mut self, name: &str) -> impl Future<Output = PgResult<bool>> + Send;
}

impl AccountRepository for PgConnection {
    async fn create_account(&mut self, new_account: NewAccount) -> PgResult<Account> {
        use schema::users;

        let account = diesel::insert_into(users::table)
            .values(&new_account)
            .returning(Account::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            account_id = account.id,
            "Account row inserted"
        );

        Ok(account)
    }

    async fn find_account_by_name(&mut self, name: &str) -> PgResult<Option<Account>> {
        use schema::users::{self, dsl};

        users::table
            .filter(dsl::name.eq(name))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn account_name_exists(&mut self, name: &str) -> PgResult<bool> {
        use schema::users::{self, dsl};

        diesel::select(exists(users::table.filter(dsl::name.eq(name))))
            .get_result(self)
            .await
            .map_err(PgError::from)
    }
}
