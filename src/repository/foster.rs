//! Repository implementation for foster assignments.

use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::Client;
use crate::domain::foster::{Foster, FosterDetails, FosterStats, NewFoster, UpdateFoster};
use crate::domain::pet::Pet;
use crate::domain::sort::FosterSortField;
use crate::domain::types::{FosterId, PetId};
use crate::models::client::Client as DbClient;
use crate::models::foster::{
    Foster as DbFoster, NewFoster as DbNewFoster, UpdateFoster as DbUpdateFoster,
};
use crate::models::pet::Pet as DbPet;
use crate::pagination::{Paginated, paginate};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, FosterListQuery, FosterReader, FosterWriter, LIKE_ESCAPE, like_pattern,
    sql_window, stale_write,
};

type FosterRow = (DbFoster, Option<DbClient>, Option<DbPet>);

fn foster_details((foster, client, pet): FosterRow) -> RepositoryResult<FosterDetails> {
    Ok(FosterDetails {
        foster: Foster::try_from(foster)?,
        pet: pet.map(Pet::try_from).transpose()?,
        client: client.map(Client::try_from).transpose()?,
    })
}

/// Mean length in days of the bounded `(start, end)` pairs.
fn average_duration(intervals: &[(NaiveDate, Option<NaiveDate>)]) -> f64 {
    let durations: Vec<i64> = intervals
        .iter()
        .filter_map(|(start, end)| end.map(|end| end.signed_duration_since(*start).num_days()))
        .collect();

    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<i64>() as f64 / durations.len() as f64
}

impl FosterReader for DieselRepository {
    fn get_foster_by_id(&self, id: FosterId) -> RepositoryResult<Option<FosterDetails>> {
        use crate::schema::{clients, fosters, pets};

        let mut conn = self.conn()?;
        let row = fosters::table
            .left_join(clients::table)
            .left_join(pets::table)
            .filter(fosters::id.eq(id.get()))
            .select((
                fosters::all_columns,
                clients::all_columns.nullable(),
                pets::all_columns.nullable(),
            ))
            .first::<FosterRow>(&mut conn)
            .optional()?;

        row.map(foster_details).transpose()
    }

    fn list_fosters(&self, query: FosterListQuery) -> RepositoryResult<Paginated<FosterDetails>> {
        use crate::schema::{clients, fosters, pets};

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = fosters::table
                .left_join(clients::table)
                .left_join(pets::table)
                .into_boxed::<Sqlite>();

            if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = like_pattern(search);
                items = items.filter(
                    fosters::description
                        .like(pattern.clone())
                        .escape(LIKE_ESCAPE)
                        .or(clients::name.nullable().like(pattern.clone()).escape(LIKE_ESCAPE))
                        .or(pets::name.nullable().like(pattern).escape(LIKE_ESCAPE)),
                );
            }
            if let Some(date) = query.start_date_gte {
                items = items.filter(fosters::start_date.ge(date));
            }
            if let Some(date) = query.start_date_lt {
                items = items.filter(fosters::start_date.lt(date));
            }
            if let Some(date) = query.end_date_gte {
                items = items.filter(fosters::end_date.ge(date));
            }
            if let Some(date) = query.end_date_lt {
                items = items.filter(fosters::end_date.lt(date));
            }
            if let Some(client_id) = query.client_id {
                items = items.filter(fosters::client_id.eq(client_id.get()));
            }
            if let Some(pet_id) = query.pet_id {
                items = items.filter(fosters::pet_id.eq(pet_id.get()));
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
                    FosterSortField::Id => sorted!(items, fosters::id, fosters::id, desc),
                    FosterSortField::StartDate => {
                        sorted!(items, fosters::start_date, fosters::id, desc)
                    }
                    FosterSortField::EndDate => {
                        sorted!(items, fosters::end_date, fosters::id, desc)
                    }
                    FosterSortField::ClientId => {
                        sorted!(items, fosters::client_id, fosters::id, desc)
                    }
                    FosterSortField::PetId => sorted!(items, fosters::pet_id, fosters::id, desc),
                };
                let rows = items
                    .select((
                        fosters::all_columns,
                        clients::all_columns.nullable(),
                        pets::all_columns.nullable(),
                    ))
                    .offset(sql_offset)
                    .limit(sql_limit)
                    .load::<FosterRow>(conn)?;
                Ok(rows)
            },
        )?;

        page.try_map(foster_details)
    }

    fn list_fosters_for_pet(&self, pet_id: PetId) -> RepositoryResult<Vec<Foster>> {
        use crate::schema::fosters;

        let mut conn = self.conn()?;
        let db_fosters = fosters::table
            .filter(fosters::pet_id.eq(pet_id.get()))
            .order((fosters::start_date.asc(), fosters::id.asc()))
            .load::<DbFoster>(&mut conn)?;

        db_fosters
            .into_iter()
            .map(|foster| Foster::try_from(foster).map_err(RepositoryError::from))
            .collect()
    }

    fn foster_stats(&self) -> RepositoryResult<FosterStats> {
        use crate::schema::{fosters, pets};
        use diesel::dsl::count_distinct;

        let mut conn = self.conn()?;

        let nr_of_pets = pets::table.count().get_result::<i64>(&mut conn)?;
        let nr_of_fosters = fosters::table.count().get_result::<i64>(&mut conn)?;
        let nr_of_fostered_pets = fosters::table
            .select(count_distinct(fosters::pet_id))
            .get_result::<i64>(&mut conn)?;
        let intervals = fosters::table
            .filter(fosters::end_date.is_not_null())
            .select((fosters::start_date, fosters::end_date))
            .load::<(NaiveDate, Option<NaiveDate>)>(&mut conn)?;

        Ok(FosterStats {
            nr_of_pets,
            nr_of_fosters,
            nr_of_fostered_pets,
            avg_foster_duration: average_duration(&intervals),
        })
    }
}

impl FosterWriter for DieselRepository {
    fn create_foster(&self, new_foster: &NewFoster) -> RepositoryResult<Foster> {
        use crate::schema::fosters;

        let mut conn = self.conn()?;
        let db_new_foster: DbNewFoster = new_foster.into();

        let db_foster = diesel::insert_into(fosters::table)
            .values(&db_new_foster)
            .get_result::<DbFoster>(&mut conn)?;

        Ok(Foster::try_from(db_foster)?)
    }

    fn update_foster(&self, id: FosterId, updates: &UpdateFoster) -> RepositoryResult<Foster> {
        use crate::schema::fosters;

        let mut conn = self.conn()?;
        let db_updates: DbUpdateFoster = updates.into();

        let db_foster = diesel::update(
            fosters::table
                .filter(fosters::id.eq(id.get()))
                .filter(fosters::version.eq(updates.version)),
        )
        .set((&db_updates, fosters::version.eq(fosters::version + 1)))
        .get_result::<DbFoster>(&mut conn)
        .optional()?;

        match db_foster {
            Some(db_foster) => Ok(Foster::try_from(db_foster)?),
            None => {
                let exists = diesel::select(diesel::dsl::exists(fosters::table.find(id.get())))
                    .get_result::<bool>(&mut conn)?;
                Err(stale_write(exists))
            }
        }
    }

    fn delete_foster(&self, id: FosterId) -> RepositoryResult<()> {
        use crate::schema::fosters;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(fosters::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
