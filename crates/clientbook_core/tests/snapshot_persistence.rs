use clientbook_core::db::open_db_in_memory;
use clientbook_core::{
    AddressBook, AppointmentDateTime, AppointmentLength, AppointmentLocation, AppointmentStatus,
    ClientService, Command, CommandError, EditPersonDescriptor, Email, JsonSnapshotRepository,
    LinkCreateRequest, Name, Person, PersonMatchPolicy, Phone, Rank, RepoError, Snapshot,
    SnapshotRepository, SqliteSnapshotRepository, Tag,
};
use rusqlite::params;

fn name(raw: &str) -> Name {
    Name::parse(raw).unwrap()
}

fn populate<R: SnapshotRepository>(service: &mut ClientService<R>) {
    let alex = Person::new(name("Alex Wu"), Phone::parse("87438807").unwrap())
        .with_email(Email::parse("alexwu@example.com").unwrap())
        .with_rank(Rank::Urgent)
        .with_tags([Tag::parse("friends").unwrap(), Tag::parse("vip").unwrap()]);
    service.execute(Command::AddPerson(alex)).unwrap();
    service
        .execute(Command::AddPerson(Person::new(
            name("Bernice Yu"),
            Phone::parse("99272758").unwrap(),
        )))
        .unwrap();

    for (client, when) in [
        ("Alex Wu", "12-10-2025 1430"),
        ("Bernice Yu", "12-10-2025 0900"),
        ("Alex Wu", "14-10-2025 1000"),
    ] {
        let request = LinkCreateRequest::new(
            name(client),
            AppointmentDateTime::parse(when).unwrap(),
            AppointmentLength::from_minutes(45).unwrap(),
        )
        .with_location(AppointmentLocation::parse("Bukit Merah FSC").unwrap())
        .with_status(AppointmentStatus::Confirmed);
        service.execute(Command::LinkCreate(request)).unwrap();
    }
}

fn assert_round_trip(expected: &Snapshot, loaded: Snapshot) {
    assert_eq!(&loaded, expected);
    let book = AddressBook::from_snapshot(loaded).unwrap();
    for appointment in expected.appointments.iter() {
        assert!(book.contains_id(&appointment.id));
    }
    assert_eq!(book.allocated_ids().count(), expected.appointments.len());
}

#[test]
fn sqlite_round_trip_preserves_order_and_back_references() {
    let mut conn = open_db_in_memory().unwrap();
    let expected = {
        let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
        let mut service = ClientService::new(repo, PersonMatchPolicy::ExactName);
        populate(&mut service);
        service.book().snapshot()
    };

    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let loaded = repo.load_snapshot().unwrap().unwrap();
    assert_eq!(loaded.persons[0].appointment_ids.len(), 2);
    assert_round_trip(&expected, loaded);
}

#[test]
fn sqlite_load_of_empty_database_is_none() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    assert!(repo.load_snapshot().unwrap().is_none());
}

#[test]
fn sqlite_rename_rewrites_owned_appointments() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
        let mut service = ClientService::new(repo, PersonMatchPolicy::ExactName);
        populate(&mut service);
        service
            .execute(Command::EditPerson {
                target: name("Alex Wu"),
                descriptor: EditPersonDescriptor {
                    name: Some(name("Alex Wu Jr")),
                    ..EditPersonDescriptor::default()
                },
            })
            .unwrap();
    }

    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let service = ClientService::load(repo, PersonMatchPolicy::ExactName).unwrap();
    let renamed = service.book().person(&name("Alex Wu Jr")).unwrap();
    assert_eq!(renamed.appointment_ids.len(), 2);
    for id in &renamed.appointment_ids {
        let appointment = service.book().find_appointment(id).unwrap();
        assert_eq!(appointment.client_name, name("Alex Wu Jr"));
    }
    assert!(service.book().person(&name("Alex Wu")).is_none());
}

#[test]
fn sqlite_load_rejects_invalid_persisted_values() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO persons (position, name, phone, rank) VALUES (?1, ?2, ?3, ?4);",
        params![0, "Alex Wu", "not-a-phone", "none"],
    )
    .unwrap();

    let repo = SqliteSnapshotRepository::try_new(&mut conn).unwrap();
    let err = repo.load_snapshot().unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn json_round_trip_preserves_order_and_back_references() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("clientbook.json");

    let mut service = ClientService::new(
        JsonSnapshotRepository::new(&path),
        PersonMatchPolicy::ExactName,
    );
    populate(&mut service);
    let expected = service.book().snapshot();

    let loaded = JsonSnapshotRepository::new(&path)
        .load_snapshot()
        .unwrap()
        .unwrap();
    assert_round_trip(&expected, loaded);
    assert!(!dir.path().join("data").join("clientbook.json.tmp").exists());
}

#[test]
fn json_snapshot_uses_snake_case_wire_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clientbook.json");
    let mut service = ClientService::new(
        JsonSnapshotRepository::new(&path),
        PersonMatchPolicy::ExactName,
    );
    populate(&mut service);

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let appointment = &value["appointments"][0];
    assert_eq!(appointment["status"], "confirmed");
    assert_eq!(appointment["client_name"], "Alex Wu");
    assert!(appointment.get("type").is_some());
}

#[test]
fn json_missing_file_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonSnapshotRepository::new(dir.path().join("absent.json"));
    assert!(repo.load_snapshot().unwrap().is_none());
}

#[test]
fn json_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clientbook.json");
    std::fs::write(
        &path,
        r#"{ "persons": [ { "name": "Alex Wu", "phone": "12" } ], "appointments": [] }"#,
    )
    .unwrap();

    let err = JsonSnapshotRepository::new(&path)
        .load_snapshot()
        .unwrap_err();
    assert!(matches!(err, RepoError::Json(_)));
}

#[test]
fn load_rejects_orphan_appointments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clientbook.json");
    std::fs::write(
        &path,
        r#"{
            "persons": [],
            "appointments": [
                {
                    "id": "a1b2c3d",
                    "client_name": "Alex Wu",
                    "date_time": "12-10-2025 1430",
                    "length": 60
                }
            ]
        }"#,
    )
    .unwrap();

    let result = ClientService::load(
        JsonSnapshotRepository::new(&path),
        PersonMatchPolicy::ExactName,
    );
    assert!(matches!(result, Err(CommandError::Store(_))));
}

#[test]
fn every_mutation_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clientbook.json");
    let mut service = ClientService::new(
        JsonSnapshotRepository::new(&path),
        PersonMatchPolicy::ExactName,
    );
    populate(&mut service);
    service
        .execute(Command::DeletePerson(name("Bernice Yu")))
        .unwrap();

    let loaded = JsonSnapshotRepository::new(&path)
        .load_snapshot()
        .unwrap()
        .unwrap();
    assert_eq!(loaded.persons.len(), 1);
    assert_eq!(loaded.appointments.len(), 2);

    service.execute(Command::Clear).unwrap();
    let cleared = JsonSnapshotRepository::new(&path)
        .load_snapshot()
        .unwrap()
        .unwrap();
    assert!(cleared.is_empty());
}
