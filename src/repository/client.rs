//! Repository implementation for foster caretakers.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, ClientWithUser, NewClient, UpdateClient};
use crate::domain::sort::ClientSortField;
use crate::domain::types::{ClientId, UserId};
use crate::domain::user::User;
use crate::models::client::{
    Client as DbClient, NewClient as DbNewClient, UpdateClient as DbUpdateClient,
};
use crate::models::user::User as DbUser;
use crate::pagination::{Paginated, paginate};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, DieselRepository, LIKE_ESCAPE, like_pattern,
    sql_window, stale_write,
};

fn client_with_user(
    (client, user): (DbClient, Option<DbUser>),
) -> RepositoryResult<ClientWithUser> {
    Ok(ClientWithUser {
        client: Client::try_from(client)?,
        user: user.map(User::try_from).transpose()?,
    })
}

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<ClientWithUser>> {
        use crate::schema::{clients, users};

        let mut conn = self.conn()?;
        let row = clients::table
            .left_join(users::table)
            .filter(clients::id.eq(id.get()))
            .select((clients::all_columns, users::all_columns.nullable()))
            .first::<(DbClient, Option<DbUser>)>(&mut conn)
            .optional()?;

        row.map(client_with_user).transpose()
    }

    fn get_client_by_user_id(&self, user_id: UserId) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_client = clients::table
            .filter(clients::user_id.eq(user_id.to_string()))
            .order(clients::id.asc())
            .first::<DbClient>(&mut conn)
            .optional()?;

        match db_client {
            Some(db_client) => Ok(Some(Client::try_from(db_client)?)),
            None => Ok(None),
        }
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<Paginated<ClientWithUser>> {
        use crate::schema::{clients, users};

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = clients::table
                .left_join(users::table)
                .into_boxed::<Sqlite>();

            if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = like_pattern(search);
                items = items.filter(
                    clients::name
                        .like(pattern.clone())
                        .escape(LIKE_ESCAPE)
                        .or(clients::address.like(pattern.clone()).escape(LIKE_ESCAPE))
                        .or(clients::phone.like(pattern.clone()).escape(LIKE_ESCAPE))
                        .or(clients::description.like(pattern.clone()).escape(LIKE_ESCAPE))
                        .or(users::email.nullable().like(pattern).escape(LIKE_ESCAPE)),
                );
            }
            match query.has_user {
                Some(true) => items = items.filter(clients::user_id.is_not_null()),
                Some(false) => items = items.filter(clients::user_id.is_null()),
                None => {}
            }
            if let Some(user_id) = query.user_id {
                items = items.filter(clients::user_id.eq(user_id.to_string()));
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
                    ClientSortField::Id => sorted!(items, clients::id, clients::id, desc),
                    ClientSortField::Name => sorted!(items, clients::name, clients::id, desc),
                    ClientSortField::Address => {
                        sorted!(items, clients::address, clients::id, desc)
                    }
                    ClientSortField::User => {
                        sorted!(items, users::email.nullable(), clients::id, desc)
                    }
                };
                let rows = items
                    .select((clients::all_columns, users::all_columns.nullable()))
                    .offset(sql_offset)
                    .limit(sql_limit)
                    .load::<(DbClient, Option<DbUser>)>(conn)?;
                Ok(rows)
            },
        )?;

        page.try_map(client_with_user)
    }

    fn list_all_clients(&self) -> RepositoryResult<Vec<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_clients = clients::table
            .order((clients::name.asc(), clients::id.asc()))
            .load::<DbClient>(&mut conn)?;

        db_clients
            .into_iter()
            .map(|client| Client::try_from(client).map_err(RepositoryError::from))
            .collect()
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_new_client: DbNewClient = new_client.into();

        let db_client = diesel::insert_into(clients::table)
            .values(&db_new_client)
            .get_result::<DbClient>(&mut conn)?;

        Ok(Client::try_from(db_client)?)
    }

    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_updates: DbUpdateClient = updates.into();

        let db_client = diesel::update(
            clients::table
                .filter(clients::id.eq(id.get()))
                .filter(clients::version.eq(updates.version)),
        )
        .set((&db_updates, clients::version.eq(clients::version + 1)))
        .get_result::<DbClient>(&mut conn)
        .optional()?;

        match db_client {
            Some(db_client) => Ok(Client::try_from(db_client)?),
            None => {
                let exists = diesel::select(diesel::dsl::exists(clients::table.find(id.get())))
                    .get_result::<bool>(&mut conn)?;
                Err(stale_write(exists))
            }
        }
    }

    fn delete_client(&self, id: ClientId) -> RepositoryResult<()> {
        use crate::schema::{clients, fosters};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            diesel::update(fosters::table.filter(fosters::client_id.eq(id.get())))
                .set((
                    fosters::client_id.eq(None::<i32>),
                    fosters::version.eq(fosters::version + 1),
                ))
                .execute(conn)?;

            let deleted = diesel::delete(clients::table.find(id.get())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }
}
