use chrono::NaiveDate;
use pet_rescue::domain::client::{NewClient, UpdateClient};
use pet_rescue::domain::foster::{NewFoster, UpdateFoster};
use pet_rescue::domain::pet::{Gender, NewPet, Species, UpdatePet};
use pet_rescue::domain::sort::{FosterSort, FosterSortField, PetSort, PetSortField, UserSort};
use pet_rescue::domain::types::{
    ClientName, FosterDescription, PetAge, PetName, UserEmail, UserId, UserName,
};
use pet_rescue::domain::user::{NewUser, UserRole};
use pet_rescue::repository::errors::RepositoryError;
use pet_rescue::repository::{
    ClientListQuery, ClientReader, ClientWriter, DieselRepository, FosterListQuery, FosterReader,
    FosterWriter, PetListQuery, PetReader, PetWriter, UserListQuery, UserReader, UserWriter,
};

mod common;

fn new_pet(name: &str, species: Species, gender: Gender, age: i32) -> NewPet {
    NewPet {
        name: PetName::new(name).unwrap(),
        species,
        gender,
        age: Some(PetAge::new(age).unwrap()),
        description: None,
    }
}

fn new_client(name: &str) -> NewClient {
    NewClient {
        user_id: None,
        name: ClientName::new(name).unwrap(),
        address: None,
        phone: None,
        description: None,
    }
}

fn new_user(email: &str, role: UserRole) -> NewUser {
    NewUser {
        id: UserId::generate(),
        email: UserEmail::new(email).unwrap(),
        name: None,
        phone: None,
        role,
        password_hash: None,
    }
}

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

fn seed_pets(repo: &DieselRepository) {
    for (name, species, gender, age) in [
        ("Rex", Species::Dog, Gender::M, 4),
        ("Luna", Species::Cat, Gender::F, 2),
        ("Bella", Species::Dog, Gender::F, 7),
        ("Milo", Species::Cat, Gender::M, 2),
        ("Kiwi", Species::Bird, Gender::F, 1),
        ("Nibbles", Species::Rodent, Gender::M, 1),
        ("Slinky", Species::Snake, Gender::F, 9),
    ] {
        repo.create_pet(&new_pet(name, species, gender, age)).unwrap();
    }
}

#[test]
fn test_pet_repository_crud() {
    let test_db = common::TestDb::new("test_pet_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());

    let created = repo
        .create_pet(&new_pet("Rex", Species::Dog, Gender::M, 4))
        .unwrap();
    assert_eq!(created.version, 1);

    let fetched = repo.get_pet_by_id(created.id).unwrap().unwrap();
    assert_eq!(fetched, created);

    let updates = UpdatePet {
        name: PetName::new("Rexy").unwrap(),
        species: Species::Dog,
        gender: Gender::M,
        age: None,
        description: None,
        version: created.version,
    };
    let updated = repo.update_pet(created.id, &updates).unwrap();
    assert_eq!(updated.name.as_str(), "Rexy");
    assert_eq!(updated.age, None);
    assert_eq!(updated.version, 2);

    repo.delete_pet(created.id).unwrap();
    assert!(repo.get_pet_by_id(created.id).unwrap().is_none());
    assert!(matches!(
        repo.delete_pet(created.id),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_stale_version_is_a_conflict() {
    let test_db = common::TestDb::new("test_stale_version_is_a_conflict.db");
    let repo = DieselRepository::new(test_db.pool());

    let pet = repo
        .create_pet(&new_pet("Luna", Species::Cat, Gender::F, 2))
        .unwrap();
    let updates = UpdatePet {
        name: PetName::new("Luna II").unwrap(),
        species: pet.species,
        gender: pet.gender,
        age: pet.age,
        description: None,
        version: pet.version,
    };
    repo.update_pet(pet.id, &updates).unwrap();

    // Same version again: somebody else already moved the row on.
    assert!(matches!(
        repo.update_pet(pet.id, &updates),
        Err(RepositoryError::Conflict)
    ));

    let missing = pet_rescue::domain::types::PetId::new(pet.id.get() + 100).unwrap();
    assert!(matches!(
        repo.update_pet(missing, &updates),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_pet_pagination_and_filters() {
    let test_db = common::TestDb::new("test_pet_pagination_and_filters.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_pets(&repo);

    let first = repo
        .list_pets(PetListQuery::default().paginate(1, 3))
        .unwrap();
    assert_eq!(first.total_count, 7);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.items.len(), 3);
    assert!(first.has_next_page);
    assert!(!first.has_previous_page);

    let last = repo
        .list_pets(PetListQuery::default().paginate(3, 3))
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(!last.has_next_page);

    let beyond = repo
        .list_pets(PetListQuery::default().paginate(9, 3))
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_count, 7);

    let dogs = repo
        .list_pets(PetListQuery::default().species(Species::Dog))
        .unwrap();
    assert_eq!(dogs.total_count, 2);

    let young_females = repo
        .list_pets(
            PetListQuery::default()
                .gender(Gender::F)
                .age_between(None, Some(2)),
        )
        .unwrap();
    let names: Vec<_> = young_females
        .items
        .iter()
        .map(|pet| pet.name.as_str())
        .collect();
    assert_eq!(names, vec!["Luna", "Kiwi"]);

    let search = repo.list_pets(PetListQuery::default().search("li")).unwrap();
    let names: Vec<_> = search.items.iter().map(|pet| pet.name.as_str()).collect();
    assert_eq!(names, vec!["Milo", "Slinky"]);
}

#[test]
fn test_pet_descending_sort_reverses_ascending() {
    let test_db = common::TestDb::new("test_pet_descending_sort_reverses_ascending.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_pets(&repo);

    let ids = |sort: PetSort| -> Vec<i32> {
        repo.list_pets(PetListQuery::default().sort(sort).paginate(1, 50))
            .unwrap()
            .items
            .iter()
            .map(|pet| pet.id.get())
            .collect()
    };

    // Ages contain ties, which must be broken the same way in both directions.
    let asc = ids(PetSort::asc(PetSortField::Age));
    let mut desc = ids(PetSort::desc(PetSortField::Age));
    desc.reverse();
    assert_eq!(asc, desc);

    let by_name = repo
        .list_pets(
            PetListQuery::default()
                .sort(PetSort::asc(PetSortField::Name))
                .paginate(1, 2),
        )
        .unwrap();
    assert_eq!(by_name.items[0].name.as_str(), "Bella");
    assert_eq!(by_name.items[1].name.as_str(), "Kiwi");
}

#[test]
fn test_client_repository_crud_and_search() {
    let test_db = common::TestDb::new("test_client_repository_crud_and_search.db");
    let repo = DieselRepository::new(test_db.pool());

    let user = repo
        .create_user(&new_user("ann@example.com", UserRole::User))
        .unwrap();
    let ann = repo
        .create_client(&NewClient {
            user_id: Some(user.id),
            ..new_client("Ann Smith")
        })
        .unwrap();
    let bob = repo.create_client(&new_client("Bob Jones")).unwrap();

    let fetched = repo.get_client_by_id(ann.id).unwrap().unwrap();
    assert_eq!(fetched.user.unwrap().email.as_str(), "ann@example.com");

    let by_user = repo.get_client_by_user_id(user.id).unwrap().unwrap();
    assert_eq!(by_user.id, ann.id);

    let search = repo
        .list_clients(ClientListQuery::default().search("ann@"))
        .unwrap();
    assert_eq!(search.total_count, 1);
    assert_eq!(search.items[0].client.id, ann.id);

    let without_user = repo
        .list_clients(ClientListQuery::default().has_user(false))
        .unwrap();
    assert_eq!(without_user.total_count, 1);
    assert_eq!(without_user.items[0].client.id, bob.id);

    let updated = repo
        .update_client(
            bob.id,
            &UpdateClient {
                user_id: None,
                name: ClientName::new("Robert Jones").unwrap(),
                address: None,
                phone: None,
                description: None,
                version: bob.version,
            },
        )
        .unwrap();
    assert_eq!(updated.name.as_str(), "Robert Jones");
    assert_eq!(updated.version, bob.version + 1);
}

#[test]
fn test_deleting_references_keeps_foster_history() {
    let test_db = common::TestDb::new("test_deleting_references_keeps_foster_history.db");
    let repo = DieselRepository::new(test_db.pool());

    let pet = repo
        .create_pet(&new_pet("Rex", Species::Dog, Gender::M, 4))
        .unwrap();
    let client = repo.create_client(&new_client("Ann Smith")).unwrap();
    let foster = repo
        .create_foster(&NewFoster {
            client_id: client.id,
            pet_id: pet.id,
            description: Some(FosterDescription::new("Summer stay").unwrap()),
            start_date: date("2024-06-01"),
            end_date: Some(date("2024-06-30")),
        })
        .unwrap();

    repo.delete_pet(pet.id).unwrap();
    let details = repo.get_foster_by_id(foster.id).unwrap().unwrap();
    assert_eq!(details.foster.pet_id, None);
    assert!(details.pet.is_none());
    assert_eq!(details.foster.client_id, Some(client.id));
    assert!(details.foster.version > foster.version);

    repo.delete_client(client.id).unwrap();
    let details = repo.get_foster_by_id(foster.id).unwrap().unwrap();
    assert_eq!(details.foster.client_id, None);
    assert!(details.client.is_none());
}

#[test]
fn test_deleting_user_unlinks_client() {
    let test_db = common::TestDb::new("test_deleting_user_unlinks_client.db");
    let repo = DieselRepository::new(test_db.pool());

    let (user, client) = repo
        .create_user_with_client(
            &new_user("kim@example.com", UserRole::User),
            &new_client("Kim Lee"),
        )
        .unwrap();
    assert_eq!(client.user_id, Some(user.id));

    repo.delete_user(user.id).unwrap();
    assert!(repo.get_user_by_id(user.id).unwrap().is_none());

    let client = repo.get_client_by_id(client.id).unwrap().unwrap();
    assert_eq!(client.client.user_id, None);
    assert!(client.user.is_none());
}

#[test]
fn test_foster_filters_and_stats() {
    let test_db = common::TestDb::new("test_foster_filters_and_stats.db");
    let repo = DieselRepository::new(test_db.pool());

    let rex = repo
        .create_pet(&new_pet("Rex", Species::Dog, Gender::M, 4))
        .unwrap();
    let luna = repo
        .create_pet(&new_pet("Luna", Species::Cat, Gender::F, 2))
        .unwrap();
    repo.create_pet(&new_pet("Kiwi", Species::Bird, Gender::F, 1))
        .unwrap();
    let ann = repo.create_client(&new_client("Ann Smith")).unwrap();
    let bob = repo.create_client(&new_client("Bob Jones")).unwrap();

    let foster = |client, pet, start: &str, end: Option<&str>| NewFoster {
        client_id: client,
        pet_id: pet,
        description: None,
        start_date: date(start),
        end_date: end.map(date),
    };
    repo.create_foster(&foster(ann.id, rex.id, "2024-01-01", Some("2024-01-21")))
        .unwrap();
    repo.create_foster(&foster(bob.id, rex.id, "2024-03-01", Some("2024-03-31")))
        .unwrap();
    let open = repo
        .create_foster(&foster(ann.id, luna.id, "2024-05-01", None))
        .unwrap();

    let anns = repo
        .list_fosters(FosterListQuery::default().client(ann.id))
        .unwrap();
    assert_eq!(anns.total_count, 2);

    let by_pet_name = repo
        .list_fosters(FosterListQuery::default().search("Luna"))
        .unwrap();
    assert_eq!(by_pet_name.total_count, 1);
    assert_eq!(by_pet_name.items[0].foster.id, open.id);

    let spring = repo
        .list_fosters(FosterListQuery {
            start_date_gte: Some(date("2024-02-01")),
            start_date_lt: Some(date("2024-04-01")),
            ..FosterListQuery::default()
        })
        .unwrap();
    assert_eq!(spring.total_count, 1);

    let latest_first = repo
        .list_fosters(FosterListQuery::default().sort(FosterSort::desc(FosterSortField::StartDate)))
        .unwrap();
    assert_eq!(latest_first.items[0].foster.id, open.id);

    let history = repo.list_fosters_for_pet(rex.id).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].start_date < history[1].start_date);

    let stats = repo.foster_stats().unwrap();
    assert_eq!(stats.nr_of_pets, 3);
    assert_eq!(stats.nr_of_fosters, 3);
    assert_eq!(stats.nr_of_fostered_pets, 2);
    assert!((stats.avg_foster_duration - 25.0).abs() < f64::EPSILON);

    let moved = repo
        .update_foster(
            open.id,
            &UpdateFoster {
                client_id: bob.id,
                pet_id: luna.id,
                description: None,
                start_date: open.start_date,
                end_date: Some(date("2024-05-31")),
                version: open.version,
            },
        )
        .unwrap();
    assert_eq!(moved.client_id, Some(bob.id));

    repo.delete_foster(open.id).unwrap();
    assert!(repo.get_foster_by_id(open.id).unwrap().is_none());
}

#[test]
fn test_user_repository_lookup_and_credentials() {
    let test_db = common::TestDb::new("test_user_repository_lookup_and_credentials.db");
    let repo = DieselRepository::new(test_db.pool());

    let admin = repo
        .create_user(&NewUser {
            name: Some(UserName::new("Admin").unwrap()),
            password_hash: Some("hash".into()),
            ..new_user("admin@example.com", UserRole::Admin)
        })
        .unwrap();
    repo.create_user(&new_user("zed@example.com", UserRole::User))
        .unwrap();

    let email = UserEmail::new("ADMIN@example.com").unwrap();
    let found = repo.get_user_by_email(&email).unwrap().unwrap();
    assert_eq!(found.id, admin.id);

    let duplicate = repo.create_user(&new_user("admin@example.com", UserRole::User));
    assert!(matches!(
        duplicate,
        Err(RepositoryError::ConstraintViolation(_))
    ));

    let expires = date("2030-01-01").and_hms_opt(0, 0, 0).unwrap();
    repo.set_reset_token(admin.id, "token-hash", expires).unwrap();
    let credentials = repo.get_user_credentials_by_email(&email).unwrap().unwrap();
    assert_eq!(credentials.password_hash.as_deref(), Some("hash"));
    assert_eq!(credentials.reset_token_hash.as_deref(), Some("token-hash"));
    assert_eq!(credentials.reset_token_expires_at, Some(expires));

    repo.set_password_hash(admin.id, Some("new-hash")).unwrap();
    let credentials = repo.get_user_credentials_by_email(&email).unwrap().unwrap();
    assert_eq!(credentials.password_hash.as_deref(), Some("new-hash"));
    assert!(credentials.reset_token_hash.is_none());

    let admins = repo
        .list_users(UserListQuery::default().role(UserRole::Admin))
        .unwrap();
    assert_eq!(admins.total_count, 1);

    let by_email_desc = repo
        .list_users(UserListQuery::default().sort("email_desc".parse::<UserSort>().unwrap()))
        .unwrap();
    assert_eq!(by_email_desc.items[0].email.as_str(), "zed@example.com");
}

#[test]
fn test_pages_far_past_the_end_are_empty() {
    let test_db = common::TestDb::new("test_pages_far_past_the_end_are_empty.db");
    let repo = DieselRepository::new(test_db.pool());
    for name in ["Rex", "Luna", "Bella"] {
        repo.create_pet(&new_pet(name, Species::Dog, Gender::F, 3))
            .unwrap();
    }

    for page in [usize::MAX, 1 << 61, (i64::MAX as usize) / 6 + 2] {
        let result = repo
            .list_pets(PetListQuery::default().paginate(page, 6))
            .unwrap();
        assert!(result.items.is_empty(), "page {page} returned rows");
        assert_eq!(result.total_count, 3);
        assert_eq!(result.total_pages, 1);
        assert!(!result.has_next_page);
    }

    let everything = repo
        .list_pets(PetListQuery::default().paginate(1, usize::MAX))
        .unwrap();
    assert_eq!(everything.items.len(), 3);
    assert_eq!(everything.total_pages, 1);
}

#[test]
fn test_search_treats_like_wildcards_literally() {
    let test_db = common::TestDb::new("test_search_treats_like_wildcards_literally.db");
    let repo = DieselRepository::new(test_db.pool());
    seed_pets(&repo);

    let underscore = repo.list_pets(PetListQuery::default().search("_")).unwrap();
    assert_eq!(underscore.total_count, 0);
    let percent = repo.list_pets(PetListQuery::default().search("%")).unwrap();
    assert_eq!(percent.total_count, 0);

    repo.create_pet(&new_pet("Mr_Whiskers", Species::Cat, Gender::M, 5))
        .unwrap();
    let found = repo.list_pets(PetListQuery::default().search("_")).unwrap();
    assert_eq!(found.total_count, 1);
    assert_eq!(found.items[0].name.as_str(), "Mr_Whiskers");

    repo.create_client(&new_client("Ann 100% Smith")).unwrap();
    repo.create_client(&new_client("Bob Jones")).unwrap();
    let clients = repo
        .list_clients(ClientListQuery::default().search("0%"))
        .unwrap();
    assert_eq!(clients.total_count, 1);

    repo.create_user(&new_user("a_b@example.com", UserRole::User))
        .unwrap();
    repo.create_user(&new_user("axb@example.com", UserRole::User))
        .unwrap();
    let users = repo
        .list_users(UserListQuery::default().search("a_b"))
        .unwrap();
    assert_eq!(users.total_count, 1);
    assert_eq!(users.items[0].email.as_str(), "a_b@example.com");

    let fosters = repo
        .list_fosters(FosterListQuery::default().search("_"))
        .unwrap();
    assert_eq!(fosters.total_count, 0);
}
