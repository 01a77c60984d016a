use petshelter_core::{
    FieldMap, FieldValue, PetRepository, RepoError, ResourceType, ShelterDb, SqlitePetRepository,
};
use std::collections::HashSet;

fn pet_fields(name: &str, breed: &str, gender: i64, weight: i64) -> FieldMap {
    FieldMap::new()
        .with("name", name)
        .with("breed", breed)
        .with("gender", gender)
        .with("weight", weight)
}

fn row_values(repo: &SqlitePetRepository<'_>, id: i64) -> Vec<FieldValue> {
    let mut cursor = repo
        .query(&format!("/pets/{id}"), &[], None, &[], None)
        .unwrap();
    let row = cursor.next().expect("row should exist");
    assert!(cursor.next().is_none());
    row.values().to_vec()
}

#[test]
fn insert_then_query_by_id_returns_inserted_values() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let id = repo
        .insert("/pets", &pet_fields("Terry", "Terrier", 2, 11))
        .unwrap();
    assert!(id > 0);

    assert_eq!(
        row_values(&repo, id),
        vec![
            FieldValue::Integer(id),
            FieldValue::Text("Terry".into()),
            FieldValue::Text("Terrier".into()),
            FieldValue::Integer(2),
            FieldValue::Integer(11),
        ]
    );
}

#[test]
fn insert_accepts_empty_breed_and_zero_weight() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let id = repo.insert("/pets", &pet_fields("Binx", "", 0, 0)).unwrap();
    let pet = repo
        .query(&format!("/pets/{id}"), &[], None, &[], None)
        .unwrap()
        .into_pets()
        .unwrap()
        .remove(0);
    assert_eq!(pet.breed.as_deref(), Some(""));
    assert_eq!(pet.weight, 0);
}

#[test]
fn insert_rejects_out_of_range_gender() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let err = repo
        .insert("/pets", &pet_fields("Rex", "Boxer", 3, 20))
        .unwrap_err();
    assert!(matches!(err, RepoError::InvalidRecord(_)));
    assert_eq!(repo.query("/pets", &[], None, &[], None).unwrap().count(), 0);
}

#[test]
fn insert_rejects_missing_name_and_negative_weight() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let mut missing_name = pet_fields("Rex", "Boxer", 1, 20);
    missing_name.remove("name");
    assert!(matches!(
        repo.insert("/pets", &missing_name),
        Err(RepoError::InvalidRecord(_))
    ));

    assert!(matches!(
        repo.insert("/pets", &pet_fields("Rex", "Boxer", 1, -1)),
        Err(RepoError::InvalidRecord(_))
    ));
}

#[test]
fn insert_on_item_path_is_unknown_resource() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let err = repo
        .insert("/pets/4", &pet_fields("Rex", "Boxer", 1, 20))
        .unwrap_err();
    assert!(matches!(err, RepoError::UnknownResource(path) if path == "/pets/4"));
}

#[test]
fn unknown_path_is_rejected_by_every_operation() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    let fields = pet_fields("Rex", "Boxer", 1, 20);

    assert!(matches!(
        repo.query("/unknown/path", &[], None, &[], None),
        Err(RepoError::UnknownResource(_))
    ));
    assert!(matches!(
        repo.insert("/owners", &fields),
        Err(RepoError::UnknownResource(_))
    ));
    assert!(matches!(
        repo.update("/pets/x", &fields, None, &[]),
        Err(RepoError::UnknownResource(_))
    ));
    assert!(matches!(
        repo.delete("/pets/1/2", None, &[]),
        Err(RepoError::UnknownResource(_))
    ));
    assert!(matches!(
        repo.resource_type("/"),
        Err(RepoError::UnknownResource(_))
    ));
}

#[test]
fn resource_type_distinguishes_list_and_item() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    assert_eq!(repo.resource_type("/pets").unwrap(), ResourceType::PetList);
    assert_eq!(repo.resource_type("/pets/12").unwrap(), ResourceType::PetItem);
    assert!(!db.is_open(), "classification must not open storage");
}

#[test]
fn query_all_returns_each_inserted_row_once() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let mut inserted = HashSet::new();
    for index in 0..5 {
        let id = repo
            .insert("/pets", &pet_fields(&format!("pet-{index}"), "mixed", 0, index))
            .unwrap();
        inserted.insert(id);
    }

    let ids: Vec<i64> = repo
        .query("/pets", &["_id"], None, &[], None)
        .unwrap()
        .map(|row| row.get_integer("_id").unwrap())
        .collect();
    assert_eq!(ids.len(), 5);
    assert_eq!(ids.iter().copied().collect::<HashSet<_>>(), inserted);
}

#[test]
fn query_applies_projection_filter_and_sort() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    repo.insert("/pets", &pet_fields("Ada", "Pug", 2, 8)).unwrap();
    repo.insert("/pets", &pet_fields("Bo", "Mastiff", 1, 70)).unwrap();
    repo.insert("/pets", &pet_fields("Cy", "Beagle", 1, 12)).unwrap();

    let cursor = repo
        .query(
            "/pets",
            &["name", "weight"],
            Some("weight <= ?"),
            &[FieldValue::from("30")],
            Some("name DESC"),
        )
        .unwrap();
    assert_eq!(cursor.columns(), ["name", "weight"]);
    let names: Vec<String> = cursor
        .map(|row| row.get_text("name").unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Cy", "Ada"]);
}

#[test]
fn query_rejects_unknown_projection_column() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let err = repo
        .query("/pets", &["name", "owner"], None, &[], None)
        .unwrap_err();
    assert!(matches!(err, RepoError::UnknownColumn(column) if column == "owner"));
}

#[test]
fn query_for_missing_row_is_empty_not_error() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let cursor = repo.query("/pets/404", &[], None, &[], None).unwrap();
    assert_eq!(cursor.remaining(), 0);
}

#[test]
fn item_query_ignores_caller_filter() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    let id = repo.insert("/pets", &pet_fields("Ada", "Pug", 2, 8)).unwrap();

    let rows = repo
        .query(
            &format!("/pets/{id}"),
            &[],
            Some("name = ?"),
            &[FieldValue::from("nobody")],
            None,
        )
        .unwrap();
    assert_eq!(rows.count(), 1);
}

#[test]
fn item_update_ignores_caller_filter_and_touches_only_that_row() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    let first = repo.insert("/pets", &pet_fields("Ada", "Pug", 2, 8)).unwrap();
    let second = repo.insert("/pets", &pet_fields("Bo", "Pug", 1, 9)).unwrap();

    let changed = repo
        .update(
            &format!("/pets/{first}"),
            &FieldMap::new().with("weight", 10),
            Some("breed = ?"),
            &[FieldValue::from("Pug")],
        )
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(row_values(&repo, first)[4], FieldValue::Integer(10));
    assert_eq!(row_values(&repo, second)[4], FieldValue::Integer(9));
}

#[test]
fn collection_update_applies_caller_filter() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    repo.insert("/pets", &pet_fields("Ada", "Pug", 2, 8)).unwrap();
    repo.insert("/pets", &pet_fields("Bo", "Pug", 1, 9)).unwrap();
    repo.insert("/pets", &pet_fields("Cy", "Beagle", 1, 12)).unwrap();

    let changed = repo
        .update(
            "/pets",
            &FieldMap::new().with("breed", "Pug mix"),
            Some("breed = ?"),
            &[FieldValue::from("Pug")],
        )
        .unwrap();
    assert_eq!(changed, 2);

    let none = repo
        .update(
            "/pets",
            &FieldMap::new().with("weight", 1),
            Some("name = ?"),
            &[FieldValue::from("Nobody")],
        )
        .unwrap();
    assert_eq!(none, 0);
}

#[test]
fn update_with_current_values_is_idempotent() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    let id = repo
        .insert("/pets", &pet_fields("Terry", "Terrier", 2, 11))
        .unwrap();
    let before = row_values(&repo, id);

    let changed = repo
        .update(
            &format!("/pets/{id}"),
            &pet_fields("Terry", "Terrier", 2, 11),
            None,
            &[],
        )
        .unwrap();
    assert_eq!(changed, 1);
    assert_eq!(row_values(&repo, id), before);
}

#[test]
fn update_validates_present_fields() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    let id = repo.insert("/pets", &pet_fields("Ada", "Pug", 2, 8)).unwrap();
    let path = format!("/pets/{id}");

    for fields in [
        FieldMap::new().with("gender", 7),
        FieldMap::new().with("name", ""),
        FieldMap::new().with("weight", -3),
        FieldMap::new().with("_id", 99),
    ] {
        let err = repo.update(&path, &fields, None, &[]).unwrap_err();
        assert!(matches!(err, RepoError::InvalidRecord(_)));
    }
    assert_eq!(repo.update(&path, &FieldMap::new(), None, &[]).unwrap(), 0);
}

#[test]
fn delete_missing_id_returns_zero() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    assert_eq!(repo.delete("/pets/77", None, &[]).unwrap(), 0);
}

#[test]
fn deleted_ids_are_never_reused() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    let first = repo.insert("/pets", &pet_fields("Ada", "Pug", 2, 8)).unwrap();

    assert_eq!(repo.delete(&format!("/pets/{first}"), None, &[]).unwrap(), 1);
    let second = repo.insert("/pets", &pet_fields("Bo", "Pug", 1, 9)).unwrap();
    assert!(second > first);
}

#[test]
fn collection_delete_with_filter_and_without() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);
    repo.insert("/pets", &pet_fields("Ada", "Pug", 2, 8)).unwrap();
    repo.insert("/pets", &pet_fields("Bo", "Mastiff", 1, 70)).unwrap();
    repo.insert("/pets", &pet_fields("Cy", "Beagle", 1, 12)).unwrap();

    let heavy = repo
        .delete("/pets", Some("weight > ?"), &[FieldValue::Integer(50)])
        .unwrap();
    assert_eq!(heavy, 1);
    assert_eq!(repo.delete("/pets", None, &[]).unwrap(), 2);
    assert_eq!(repo.query("/pets", &[], None, &[], None).unwrap().count(), 0);
}

#[test]
fn malformed_filter_on_write_is_write_failed() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let err = repo
        .delete("/pets", Some("weight >>> ?"), &[FieldValue::Integer(1)])
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::WriteFailed {
            operation: "delete",
            cause: Some(_)
        }
    ));
}

#[test]
fn content_uri_paths_route_like_bare_paths() {
    let db = ShelterDb::in_memory();
    let repo = SqlitePetRepository::new(&db);

    let id = repo
        .insert(
            "content://com.example.android.pets/pets",
            &pet_fields("Ada", "Pug", 2, 8),
        )
        .unwrap();
    let rows = repo
        .query(
            &format!("content://com.example.android.pets/pets/{id}"),
            &["name"],
            None,
            &[],
            None,
        )
        .unwrap();
    assert_eq!(rows.count(), 1);
}
