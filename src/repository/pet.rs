//! Repository implementation for pets.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::pet::{NewPet, Pet, UpdatePet};
use crate::domain::sort::PetSortField;
use crate::domain::types::PetId;
use crate::models::pet::{NewPet as DbNewPet, Pet as DbPet, UpdatePet as DbUpdatePet};
use crate::pagination::{Paginated, paginate};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, LIKE_ESCAPE, PetListQuery, PetReader, PetWriter, like_pattern, sql_window,
    stale_write,
};

impl PetReader for DieselRepository {
    fn get_pet_by_id(&self, id: PetId) -> RepositoryResult<Option<Pet>> {
        use crate::schema::pets;

        let mut conn = self.conn()?;
        let db_pet = pets::table
            .find(id.get())
            .first::<DbPet>(&mut conn)
            .optional()?;

        match db_pet {
            Some(db_pet) => Ok(Some(Pet::try_from(db_pet)?)),
            None => Ok(None),
        }
    }

    fn list_pets(&self, query: PetListQuery) -> RepositoryResult<Paginated<Pet>> {
        use crate::schema::pets;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = pets::table.into_boxed::<Sqlite>();

            if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
                let pattern = like_pattern(search);
                items = items.filter(
                    pets::name
                        .like(pattern.clone())
                        .escape(LIKE_ESCAPE)
                        .or(pets::species.like(pattern.clone()).escape(LIKE_ESCAPE))
                        .or(pets::description.like(pattern).escape(LIKE_ESCAPE)),
                );
            }
            if let Some(species) = query.species {
                items = items.filter(pets::species.eq(species.as_str()));
            }
            if let Some(gender) = query.gender {
                items = items.filter(pets::gender.eq(gender.as_str()));
            }
            if let Some(age) = query.age_gte {
                items = items.filter(pets::age.ge(age));
            }
            if let Some(age) = query.age_lte {
                items = items.filter(pets::age.le(age));
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
                    PetSortField::Id => sorted!(items, pets::id, pets::id, desc),
                    PetSortField::Name => sorted!(items, pets::name, pets::id, desc),
                    PetSortField::Species => sorted!(items, pets::species, pets::id, desc),
                    PetSortField::Gender => sorted!(items, pets::gender, pets::id, desc),
                    PetSortField::Age => sorted!(items, pets::age, pets::id, desc),
                };
                let db_pets = items
                    .offset(sql_offset)
                    .limit(sql_limit)
                    .load::<DbPet>(conn)?;
                Ok(db_pets)
            },
        )?;

        Ok(page.try_map(Pet::try_from)?)
    }

    fn list_all_pets(&self) -> RepositoryResult<Vec<Pet>> {
        use crate::schema::pets;

        let mut conn = self.conn()?;
        let db_pets = pets::table
            .order((pets::name.asc(), pets::id.asc()))
            .load::<DbPet>(&mut conn)?;

        db_pets
            .into_iter()
            .map(|pet| Pet::try_from(pet).map_err(RepositoryError::from))
            .collect()
    }
}

impl PetWriter for DieselRepository {
    fn create_pet(&self, new_pet: &NewPet) -> RepositoryResult<Pet> {
        use crate::schema::pets;

        let mut conn = self.conn()?;
        let db_new_pet: DbNewPet = new_pet.into();

        let db_pet = diesel::insert_into(pets::table)
            .values(&db_new_pet)
            .get_result::<DbPet>(&mut conn)?;

        Ok(Pet::try_from(db_pet)?)
    }

    fn update_pet(&self, id: PetId, updates: &UpdatePet) -> RepositoryResult<Pet> {
        use crate::schema::pets;

        let mut conn = self.conn()?;
        let db_updates: DbUpdatePet = updates.into();

        let db_pet = diesel::update(
            pets::table
                .filter(pets::id.eq(id.get()))
                .filter(pets::version.eq(updates.version)),
        )
        .set((&db_updates, pets::version.eq(pets::version + 1)))
        .get_result::<DbPet>(&mut conn)
        .optional()?;

        match db_pet {
            Some(db_pet) => Ok(Pet::try_from(db_pet)?),
            None => {
                let exists = diesel::select(diesel::dsl::exists(pets::table.find(id.get())))
                    .get_result::<bool>(&mut conn)?;
                Err(stale_write(exists))
            }
        }
    }

    fn delete_pet(&self, id: PetId) -> RepositoryResult<()> {
        use crate::schema::{fosters, pets};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            diesel::update(fosters::table.filter(fosters::pet_id.eq(id.get())))
                .set((
                    fosters::pet_id.eq(None::<i32>),
                    fosters::version.eq(fosters::version + 1),
                ))
                .execute(conn)?;

            let deleted = diesel::delete(pets::table.find(id.get())).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }
}
