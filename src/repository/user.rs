//! Repository implementation for user accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, NewClient};
use crate::domain::sort::UserSortField;
use crate::domain::types::{UserEmail, UserId};
use crate::domain::user::{NewUser, UpdateUser, User, UserCredentials};
use crate::models::client::{Client as DbClient, NewClient as DbNewClient};
use crate::models::user::{NewUser as DbNewUser, UpdateUser as DbUpdateUser, User as DbUser};
use crate::pagination::{Paginated, paginate};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, LIKE_ESCAPE, UserListQuery, UserReader, UserWriter, like_pattern, sql_window,
    stale_write,
};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .find(id.to_string())
            .first::<DbUser>(&mut conn)
            .optional()?;

        match db_user {
            Some(db_user) => Ok(Some(User::try_from(db_user)?)),
            None => Ok(None),
        }
    }

    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>> {
        Ok(self
            .get_user_credentials_by_email(email)?
            .map(|credentials| credentials.user))
    }

    fn get_user_credentials_by_email(
        &self,
        email: &UserEmail,
    ) -> RepositoryResult<Option<UserCredentials>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user = users::table
            .filter(users::email.eq(email.as_str()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        match db_user {
            Some(db_user) => Ok(Some(UserCredentials::try_from(db_user)?)),
            None => Ok(None),
        }
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<Paginated<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = users::table.into_boxed::<Sqlite>();

            if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = like_pattern(search);
                items = items.filter(
                    users::email
                        .like(pattern.clone())
                        .escape(LIKE_ESCAPE)
                        .or(users::name.like(pattern).escape(LIKE_ESCAPE)),
                );
            }
            if let Some(role) = query.role {
                items = items.filter(users::role.eq(role.as_str()));
            }
            items
        };

        let page = paginate(
            query.page,
            &mut conn,
            |conn| {
                let total = query_builder().count().get_result::<i64>(conn)?;
                Ok::<_, RepositoryError>(total as usize)
            },
            |conn, offset, limit| {
                let (sql_offset, sql_limit) = sql_window(offset, limit);
                let desc = query.sort.is_desc();
                let items = query_builder();
                let items = match query.sort.field {
                    UserSortField::Id => sorted!(items, users::id, users::id, desc),
                    UserSortField::Email => sorted!(items, users::email, users::id, desc),
                    UserSortField::Name => sorted!(items, users::name, users::id, desc),
                    UserSortField::Role => sorted!(items, users::role, users::id, desc),
                };
                let db_users = items
                    .offset(sql_offset)
                    .limit(sql_limit)
                    .load::<DbUser>(conn)?;
                Ok(db_users)
            },
        )?;

        Ok(page.try_map(User::try_from)?)
    }

    fn list_all_users(&self) -> RepositoryResult<Vec<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_users = users::table
            .order(users::email.asc())
            .load::<DbUser>(&mut conn)?;

        db_users
            .into_iter()
            .map(|user| User::try_from(user).map_err(RepositoryError::from))
            .collect()
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_new_user: DbNewUser = new_user.into();

        let db_user = diesel::insert_into(users::table)
            .values(&db_new_user)
            .get_result::<DbUser>(&mut conn)?;

        Ok(User::try_from(db_user)?)
    }

    fn create_user_with_client(
        &self,
        new_user: &NewUser,
        new_client: &NewClient,
    ) -> RepositoryResult<(User, Client)> {
        use crate::schema::{clients, users};

        let mut conn = self.conn()?;
        let db_new_user: DbNewUser = new_user.into();
        let mut db_new_client: DbNewClient = new_client.into();
        db_new_client.user_id = Some(new_user.id.to_string());

        let (db_user, db_client) = conn.transaction::<_, RepositoryError, _>(|conn| {
            let db_user = diesel::insert_into(users::table)
                .values(&db_new_user)
                .get_result::<DbUser>(conn)?;
            let db_client = diesel::insert_into(clients::table)
                .values(&db_new_client)
                .get_result::<DbClient>(conn)?;
            Ok((db_user, db_client))
        })?;

        Ok((User::try_from(db_user)?, Client::try_from(db_client)?))
    }

    fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_updates: DbUpdateUser = updates.into();
        let key = id.to_string();

        let db_user = diesel::update(
            users::table
                .filter(users::id.eq(&key))
                .filter(users::version.eq(updates.version)),
        )
        .set((&db_updates, users::version.eq(users::version + 1)))
        .get_result::<DbUser>(&mut conn)
        .optional()?;

        match db_user {
            Some(db_user) => Ok(User::try_from(db_user)?),
            None => {
                let exists = diesel::select(diesel::dsl::exists(users::table.find(&key)))
                    .get_result::<bool>(&mut conn)?;
                Err(stale_write(exists))
            }
        }
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<()> {
        use crate::schema::{clients, users};

        let mut conn = self.conn()?;
        let key = id.to_string();

        conn.transaction::<(), RepositoryError, _>(|conn| {
            diesel::update(clients::table.filter(clients::user_id.eq(&key)))
                .set((
                    clients::user_id.eq(None::<String>),
                    clients::version.eq(clients::version + 1),
                ))
                .execute(conn)?;

            let deleted = diesel::delete(users::table.find(&key)).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }

    fn set_password_hash(&self, id: UserId, password_hash: Option<&str>) -> RepositoryResult<()> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.find(id.to_string()))
            .set((
                users::password_hash.eq(password_hash),
                users::reset_token_hash.eq(None::<String>),
                users::reset_token_expires_at.eq(None::<NaiveDateTime>),
                users::version.eq(users::version + 1),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let updated = diesel::update(users::table.find(id.to_string()))
            .set((
                users::reset_token_hash.eq(Some(token_hash)),
                users::reset_token_expires_at.eq(Some(expires_at)),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
