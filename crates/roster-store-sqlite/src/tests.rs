//! Integration tests for `SqliteStore` against an in-memory database.
//!
//! Writes go through `roster_core::service` so validation, stamping, and the
//! store's error mapping are exercised together.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use roster_core::{
  EntityKind, Error,
  address::{Address, AddressFilter},
  audit::Actor,
  filter::PageParams,
  person::{Person, PersonFilter},
  reference::{City, Country, Role, State},
  service,
  store::{ReferenceStore, Repository},
  user::{User, UserFilter},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn actor() -> Actor { Actor::new("tester") }

fn at(day: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap() }

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn person(first: &str, last: &str) -> Person {
  Person {
    first_name: first.into(),
    last_name: last.into(),
    ..Default::default()
  }
}

fn address(name: &str) -> Address {
  Address {
    street_type: Some("rua".into()),
    name: name.into(),
    number: Some("10".into()),
    ..Default::default()
  }
}

fn city_link(id: Option<i64>) -> Option<City> { Some(City { id, ..Default::default() }) }

/// Seeds Brasil → SP → São Paulo and returns the city.
async fn sao_paulo(s: &SqliteStore) -> City {
  let country = s
    .add_country(Country { id: None, name: "Brasil".into() })
    .await
    .unwrap();
  let state = s
    .add_state(State { id: None, name: "SP".into(), country: Some(country) })
    .await
    .unwrap();
  s.add_city(City { id: None, name: "São Paulo".into(), state: Some(state) })
    .await
    .unwrap()
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn reference_chain_resolves_top_down() {
  let s = store().await;
  let city = sao_paulo(&s).await;

  let state = city.state.as_ref().unwrap();
  assert_eq!(state.name, "SP");
  assert_eq!(state.country.as_ref().map(|c| c.name.as_str()), Some("Brasil"));

  let country_id = state.country.as_ref().and_then(|c| c.id).unwrap();
  let states = s.list_states(country_id).await.unwrap();
  assert_eq!(states.len(), 1);

  let cities = s.list_cities(state.id.unwrap()).await.unwrap();
  assert_eq!(cities, vec![city]);
}

#[tokio::test]
async fn listing_children_of_missing_parent_is_not_found() {
  let s = store().await;
  let err = s.list_states(404).await.unwrap_err();
  assert!(matches!(err, crate::Error::NotFound { entity: EntityKind::Country, id: 404 }));
}

#[tokio::test]
async fn state_with_missing_country_is_rejected() {
  let s = store().await;
  let err = service::create_state(&s, State {
    id:      None,
    name:    "Nowhere".into(),
    country: Some(Country { id: Some(77), name: String::new() }),
  })
  .await
  .unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: EntityKind::Country, id: 77 }));
}

#[tokio::test]
async fn roles_are_seeded() {
  let s = store().await;
  let names: Vec<String> = s.list_roles().await.unwrap().into_iter().map(|r| r.name).collect();
  assert_eq!(names, vec!["ADMIN", "USER"]);
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn person_with_owned_address_round_trips() {
  let s = store().await;
  let city = sao_paulo(&s).await;

  let mut input = person("Ana", "Silva");
  input.birthdate = Some(date(1990, 5, 17));
  input.cpf = Some("529.982.247-25".into());
  input.address = Some(Address { city: city_link(city.id), ..address("Augusta") });

  let created = service::create(&s, input, &actor(), at(1)).await.unwrap();
  let id = created.id.unwrap();

  let found: Person = service::find(&s, id).await.unwrap();
  assert_eq!(found.cpf.as_deref(), Some("52998224725"));
  assert_eq!(found.birthdate, Some(date(1990, 5, 17)));
  assert_eq!(found.audit.created_at, Some(at(1)));
  assert_eq!(found.audit.created_by.as_deref(), Some("tester"));

  let address = found.address.as_ref().unwrap();
  assert!(address.id.is_some());
  assert_eq!(address.audit.created_at, Some(at(1)));
  assert_eq!(address.formatted(), "Rua Augusta, 10. São Paulo - SP - Brasil");
}

#[tokio::test]
async fn duplicate_cpf_is_a_conflict() {
  let s = store().await;
  let first = Person { cpf: Some("11144477735".into()), ..person("Ana", "Silva") };
  let second = Person { cpf: Some("111.444.777-35".into()), ..person("Bia", "Souza") };

  service::create(&s, first, &actor(), at(1)).await.unwrap();
  let err = service::create(&s, second, &actor(), at(1)).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn link_to_missing_city_is_not_found_for_city() {
  let s = store().await;
  let input = Person { birth_city: city_link(Some(9)), ..person("Ana", "Silva") };
  let err = service::create(&s, input, &actor(), at(1)).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: EntityKind::City, id: 9 }));

  let people: Vec<_> = service::list::<Person, _>(&s).await.unwrap();
  assert!(people.is_empty());
}

#[tokio::test]
async fn update_reuses_owned_address_identity() {
  let s = store().await;
  let input = Person { address: Some(address("Old Street")), ..person("Ana", "Silva") };
  let created = service::create(&s, input, &actor(), at(1)).await.unwrap();
  let id = created.id.unwrap();
  let address_id = created.address.as_ref().and_then(|a| a.id);

  let edit = Person { address: Some(address("New Street")), ..person("Ana", "Silva") };
  let updated = service::update(&s, id, edit, &Actor::new("editor"), at(2)).await.unwrap();

  let new_address = updated.address.as_ref().unwrap();
  assert_eq!(new_address.id, address_id);
  assert_eq!(new_address.name, "New Street");
  assert_eq!(new_address.audit.created_at, Some(at(1)));
  assert_eq!(new_address.audit.updated_by.as_deref(), Some("editor"));
  assert_eq!(updated.audit.created_by.as_deref(), Some("tester"));
  assert_eq!(updated.audit.updated_at, Some(at(2)));
}

#[tokio::test]
async fn dropping_the_address_removes_the_orphan() {
  let s = store().await;
  let input = Person { address: Some(address("Augusta")), ..person("Ana", "Silva") };
  let created = service::create(&s, input, &actor(), at(1)).await.unwrap();
  let id = created.id.unwrap();
  let address_id = created.address.as_ref().and_then(|a| a.id).unwrap();

  let updated = service::update(&s, id, person("Ana", "Silva"), &actor(), at(2)).await.unwrap();
  assert!(updated.address.is_none());

  let orphan = Repository::<Address>::find_by_id(&s, address_id).await.unwrap();
  assert!(orphan.is_none());
}

#[tokio::test]
async fn delete_cascades_to_owned_address() {
  let s = store().await;
  let input = Person { address: Some(address("Augusta")), ..person("Ana", "Silva") };
  let created = service::create(&s, input, &actor(), at(1)).await.unwrap();
  let id = created.id.unwrap();
  let address_id = created.address.as_ref().and_then(|a| a.id).unwrap();

  service::delete::<Person, _>(&s, id).await.unwrap();

  assert!(Repository::<Person>::find_by_id(&s, id).await.unwrap().is_none());
  assert!(Repository::<Address>::find_by_id(&s, address_id).await.unwrap().is_none());

  let err = service::delete::<Person, _>(&s, id).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: EntityKind::Person, .. }));
}

#[tokio::test]
async fn delete_keeps_referenced_city() {
  let s = store().await;
  let city = sao_paulo(&s).await;
  let input = Person { birth_city: city_link(city.id), ..person("Ana", "Silva") };
  let created = service::create(&s, input, &actor(), at(1)).await.unwrap();

  service::delete::<Person, _>(&s, created.id.unwrap()).await.unwrap();

  let state_id = city.state.as_ref().and_then(|st| st.id).unwrap();
  assert_eq!(s.list_cities(state_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn find_all_orders_people_by_first_name() {
  let s = store().await;
  for (first, last) in [("Carla", "A"), ("Ana", "B"), ("Bia", "C")] {
    service::create(&s, person(first, last), &actor(), at(1)).await.unwrap();
  }
  let names: Vec<String> = service::list::<Person, _>(&s)
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.first_name)
    .collect();
  assert_eq!(names, vec!["Ana", "Bia", "Carla"]);
}

// ─── Search ──────────────────────────────────────────────────────────────────

async fn seed_people(s: &SqliteStore) {
  let rows = [
    ("Ana", "Silva", date(1985, 1, 10)),
    ("Bruno", "Silveira", date(1990, 6, 1)),
    ("Carla", "Souza", date(1995, 12, 31)),
    ("Diego", "50%_Off", date(2000, 2, 29)),
  ];
  for (first, last, birthdate) in rows {
    let p = Person { birthdate: Some(birthdate), ..person(first, last) };
    service::create(s, p, &actor(), at(1)).await.unwrap();
  }
}

#[tokio::test]
async fn name_filter_matches_first_or_last_case_insensitively() {
  let s = store().await;
  seed_people(&s).await;

  let filter = PersonFilter { name: Some("SILV".into()), ..Default::default() };
  let page = service::search::<Person, _>(&s, &filter, &PageParams::default()).await.unwrap();
  assert_eq!(page.total_elements, 2);

  let filter = PersonFilter { name: Some("carla".into()), ..Default::default() };
  let page = service::search::<Person, _>(&s, &filter, &PageParams::default()).await.unwrap();
  assert_eq!(page.content.len(), 1);
  assert_eq!(page.content[0].full_name.as_deref(), Some("Carla Souza"));
}

#[tokio::test]
async fn name_filter_folds_accented_letters() {
  let s = store().await;
  service::create(&s, person("Ângela", "Érica"), &actor(), at(1)).await.unwrap();
  service::create(&s, person("Angela", "Souza"), &actor(), at(1)).await.unwrap();

  for needle in ["Ângela", "ângela", "ÂNGELA", "érica", "ÉRICA"] {
    let filter = PersonFilter { name: Some(needle.into()), ..Default::default() };
    let page = service::search::<Person, _>(&s, &filter, &PageParams::default()).await.unwrap();
    assert_eq!(page.total_elements, 1, "needle {needle:?}");
    assert_eq!(page.content[0].first_name, "Ângela");
  }
}

#[tokio::test]
async fn description_filter_matches_substring() {
  let s = store().await;
  let vip = Person { description: Some("Cliente VIP desde 2019".into()), ..person("Ana", "Silva") };
  service::create(&s, vip, &actor(), at(1)).await.unwrap();
  service::create(&s, person("Bruno", "Costa"), &actor(), at(1)).await.unwrap();

  let filter = PersonFilter { description: Some("vip".into()), ..Default::default() };
  let page = service::search::<Person, _>(&s, &filter, &PageParams::default()).await.unwrap();
  assert_eq!(page.total_elements, 1);
  assert_eq!(page.content[0].first_name, "Ana");
}

#[tokio::test]
async fn like_wildcards_in_filter_are_literal() {
  let s = store().await;
  seed_people(&s).await;

  let filter = PersonFilter { name: Some("%".into()), ..Default::default() };
  let page = service::search::<Person, _>(&s, &filter, &PageParams::default()).await.unwrap();
  assert_eq!(page.total_elements, 1);
  assert_eq!(page.content[0].first_name, "Diego");

  let filter = PersonFilter { name: Some("_".into()), ..Default::default() };
  let page = service::search::<Person, _>(&s, &filter, &PageParams::default()).await.unwrap();
  assert_eq!(page.total_elements, 1);
}

#[tokio::test]
async fn birthdate_range_is_inclusive() {
  let s = store().await;
  seed_people(&s).await;

  let filter = PersonFilter {
    start_date: Some(date(1990, 6, 1)),
    end_date: Some(date(1995, 12, 31)),
    ..Default::default()
  };
  let page = service::search::<Person, _>(&s, &filter, &PageParams::default()).await.unwrap();
  let names: Vec<&str> = page.content.iter().map(|p| p.first_name.as_str()).collect();
  assert_eq!(names, vec!["Bruno", "Carla"]);
}

#[tokio::test]
async fn pages_are_sorted_and_counted() {
  let s = store().await;
  seed_people(&s).await;

  let params = PageParams {
    current_page:  2,
    rows_per_page: 3,
    sort_column:   Some("first_name".into()),
    sort:          Some("desc".into()),
  };
  let page = service::search::<Person, _>(&s, &PersonFilter::default(), &params).await.unwrap();
  assert_eq!(page.total_elements, 4);
  assert_eq!(page.total_pages, 2);
  assert_eq!(page.page, 1);
  assert_eq!(page.size, 3);
  let names: Vec<&str> = page.content.iter().map(|p| p.first_name.as_str()).collect();
  assert_eq!(names, vec!["Ana"]);
}

#[tokio::test]
async fn address_created_range_compares_dates() {
  let s = store().await;
  service::create(&s, address("Early"), &actor(), at(1)).await.unwrap();
  service::create(&s, address("Late"), &actor(), at(20)).await.unwrap();

  let filter = AddressFilter {
    start_date: Some(date(2024, 3, 1)),
    end_date: Some(date(2024, 3, 1)),
    ..Default::default()
  };
  let page = service::search::<Address, _>(&s, &filter, &PageParams::default()).await.unwrap();
  assert_eq!(page.total_elements, 1);
  assert_eq!(page.content[0].name, "Early");
  assert_eq!(page.content[0].fmt_address.as_deref(), Some("Rua Early, 10"));
}

// ─── Users ───────────────────────────────────────────────────────────────────

fn user(username: &str) -> User {
  User {
    username: username.into(),
    new_password: Some("s3cret".into()),
    ..Default::default()
  }
}

#[tokio::test]
async fn user_password_is_stored_hashed_and_kept_on_update() {
  let s = store().await;
  let created = service::create(&s, user("jdoe"), &actor(), at(1)).await.unwrap();
  let id = created.id.unwrap();
  assert!(created.password_hash.starts_with("$argon2"));
  assert!(!created.password_hash.contains("s3cret"));

  let edit = User { name: Some("John".into()), new_password: None, ..user("jdoe") };
  let updated = service::update(&s, id, edit, &actor(), at(2)).await.unwrap();
  assert_eq!(updated.password_hash, created.password_hash);
  assert_eq!(updated.name.as_deref(), Some("John"));
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
  let s = store().await;
  service::create(&s, user("jdoe"), &actor(), at(1)).await.unwrap();
  let err = service::create(&s, user("jdoe"), &actor(), at(1)).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn user_roles_are_linked_not_written() {
  let s = store().await;
  let roles = s.list_roles().await.unwrap();
  let admin = roles.iter().find(|r| r.name == "ADMIN").cloned().unwrap();

  let input = User {
    roles: vec![Role { id: admin.id, name: "renamed".into() }],
    ..user("root")
  };
  let created = service::create(&s, input, &actor(), at(1)).await.unwrap();
  assert_eq!(created.roles, vec![admin]);
  assert_eq!(s.list_roles().await.unwrap(), roles);

  let missing = User { roles: vec![Role { id: Some(99), name: String::new() }], ..user("x") };
  let err = service::create(&s, missing, &actor(), at(1)).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { entity: EntityKind::Role, id: 99 }));
}

#[tokio::test]
async fn users_list_by_username_and_filter_by_username() {
  let s = store().await;
  for name in ["zed", "amy", "max"] {
    service::create(&s, user(name), &actor(), at(1)).await.unwrap();
  }
  let names: Vec<String> = service::list::<User, _>(&s)
    .await
    .unwrap()
    .into_iter()
    .map(|u| u.username)
    .collect();
  assert_eq!(names, vec!["amy", "max", "zed"]);

  let filter = UserFilter { username: Some("M".into()), ..Default::default() };
  let page = service::search::<User, _>(&s, &filter, &PageParams::default()).await.unwrap();
  assert_eq!(page.total_elements, 2);
}
