use hrdesk::{Database, DynamicRowWriter, EditedCell, Error, Row, RowState, Session, Value, WriteOutcome};

async fn setup() -> Result<Session, Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    db.raw(
        "CREATE TABLE Staff (ID INTEGER PRIMARY KEY AUTOINCREMENT, Name NVARCHAR(50) NOT NULL, Age INT NULL, \
         Active BIT NULL)",
    )
    .execute()
    .await?;
    db.raw("CREATE TABLE Journal (Entry NVARCHAR(50))").execute().await?;

    let mut session = Session::open(db).await?;
    session.select_table("Staff").await?;
    Ok(session)
}

async fn count(session: &Session, sql: &str) -> Result<Option<i64>, Box<dyn std::error::Error>> {
    Ok(session.database().raw(sql).fetch_scalar().await?.and_then(|v| v.as_i64()))
}

#[tokio::test]
async fn test_new_row_is_inserted_with_generated_key() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;

    let mut row = Row::added();
    let outcome = session.commit_edit(&mut row, &EditedCell::new("Name", "Alice")).await?;
    assert_eq!(outcome, WriteOutcome::Inserted { id: 1 });
    assert_eq!(row.state, RowState::Unchanged);
    assert_eq!(row.get("ID"), Some(&Value::BigInt(1)));

    let browse = session.views().browse().expect("table reloaded");
    assert_eq!(browse.len(), 1);
    assert_eq!(browse.get(0, "Name"), Some(&Value::Text("Alice".to_string())));
    assert_eq!(browse.get(0, "ID").and_then(Value::as_i64), Some(1));
    assert_eq!(browse.get(0, "Age"), Some(&Value::Null));
    Ok(())
}

#[tokio::test]
async fn test_inserted_values_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;

    let mut row = Row::added();
    row.set_text("Name", "Bob");
    row.set_text("Age", "41");
    row.set_text("Active", "true");
    let outcome = session.insert_row(&mut row).await?;
    let WriteOutcome::Inserted { id } = outcome else {
        panic!("expected an insert, got {:?}", outcome);
    };

    let reloaded = session.find_row(id).await?.expect("inserted row is visible");
    assert_eq!(reloaded.get("Name"), Some(&Value::Text("Bob".to_string())));
    assert_eq!(reloaded.get("Age").and_then(Value::as_i64), Some(41));
    assert_eq!(reloaded.get("Active").and_then(Value::as_i64), Some(1));
    assert_eq!(reloaded.get("ID").and_then(Value::as_i64), Some(id));
    Ok(())
}

#[tokio::test]
async fn test_existing_row_is_updated_and_verified() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;
    session.run_script("INSERT INTO Staff (Name, Age) VALUES ('Carol', 29)").await.into_result()?;
    session.reload().await?;

    let mut row = session.row(0).expect("one row");
    let outcome = session.commit_edit(&mut row, &EditedCell::new("Age", "30")).await?;
    match outcome {
        WriteOutcome::Updated { rows, verified } => {
            assert_eq!(rows, 1);
            assert_eq!(verified.and_then(|v| v.as_i64()), Some(30));
        }
        other => panic!("expected an update, got {:?}", other),
    }
    assert_eq!(row.get("Age").and_then(Value::as_i64), Some(30));
    assert_eq!(count(&session, "SELECT Age FROM Staff WHERE Name = 'Carol'").await?, Some(30));
    Ok(())
}

#[tokio::test]
async fn test_blank_value_for_not_null_column_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;
    session.run_script("INSERT INTO Staff (Name) VALUES ('Dana')").await.into_result()?;
    session.reload().await?;

    let mut row = session.row(0).expect("one row");
    let err = session.commit_edit(&mut row, &EditedCell::new("Name", "   ")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(count(&session, "SELECT COUNT(*) FROM Staff WHERE Name = 'Dana'").await?, Some(1));

    // A new row whose first edit leaves Name blank is not inserted either.
    let mut fresh = Row::added();
    let err = session.commit_edit(&mut fresh, &EditedCell::new("Age", "50")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(count(&session, "SELECT COUNT(*) FROM Staff").await?, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_vanished_row_is_not_updated_or_inserted() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;
    session.run_script("INSERT INTO Staff (Name) VALUES ('Eve')").await.into_result()?;
    session.reload().await?;
    let mut row = session.row(0).expect("one row");

    // Someone else deletes the row after it was loaded.
    session.database().raw("DELETE FROM Staff").execute().await?;

    let err = session.commit_edit(&mut row, &EditedCell::new("Name", "Eva")).await.unwrap_err();
    match err {
        Error::StaleRow { column, key } => {
            assert_eq!(column, "ID");
            assert_eq!(key, 1);
        }
        other => panic!("expected a stale row, got {:?}", other),
    }
    assert_eq!(count(&session, "SELECT COUNT(*) FROM Staff").await?, Some(0));

    // Submitting it again as a new row stores it under a fresh key.
    row.mark_added();
    let outcome = session.commit_edit(&mut row, &EditedCell::new("Name", "Eva")).await?;
    let WriteOutcome::Inserted { id } = outcome else {
        panic!("expected an insert, got {:?}", outcome);
    };
    assert_ne!(id, 1);
    assert_eq!(row.state, RowState::Unchanged);
    assert_eq!(count(&session, "SELECT COUNT(*) FROM Staff WHERE Name = 'Eva'").await?, Some(1));
    Ok(())
}

#[tokio::test]
async fn test_unparsable_value_for_not_null_column_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;
    session
        .run_script("CREATE TABLE Badge (ID INTEGER PRIMARY KEY AUTOINCREMENT, Label NVARCHAR(50) NULL, Level INT NOT NULL)")
        .await
        .into_result()?;
    session.refresh_tables().await?;
    session.select_table("Badge").await?;

    let mut fresh = Row::added();
    let err = session.commit_edit(&mut fresh, &EditedCell::new("Level", "abc")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{:?}", err);

    let mut typed = Row::added();
    typed.set_text("Label", "gold");
    typed.set_text("Level", "high");
    let err = session.insert_row(&mut typed).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{:?}", err);
    assert_eq!(count(&session, "SELECT COUNT(*) FROM Badge").await?, Some(0));

    session.run_script("INSERT INTO Badge (Label, Level) VALUES ('silver', 2)").await.into_result()?;
    session.reload().await?;
    let mut row = session.row(0).expect("one row");
    let err = session.commit_edit(&mut row, &EditedCell::new("Level", "two")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "{:?}", err);
    assert_eq!(count(&session, "SELECT Level FROM Badge").await?, Some(2));
    Ok(())
}

#[tokio::test]
async fn test_unparsable_number_becomes_null() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;
    session.run_script("INSERT INTO Staff (Name, Age) VALUES ('Finn', 33)").await.into_result()?;
    session.reload().await?;

    let mut row = session.row(0).expect("one row");
    let outcome = session.commit_edit(&mut row, &EditedCell::new("Age", "thirty")).await?;
    assert!(matches!(outcome, WriteOutcome::Updated { rows: 1, verified: Some(Value::Null) }));
    Ok(())
}

#[tokio::test]
async fn test_schema_failures() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;
    let writer = DynamicRowWriter::new(session.database());
    let mut row = Row::added();

    let err = writer.commit(None, &mut row, &EditedCell::new("Name", "x")).await.unwrap_err();
    assert!(matches!(err, Error::NoTableSelected));

    let err = writer.commit(Some("Journal"), &mut row, &EditedCell::new("Entry", "x")).await.unwrap_err();
    assert!(matches!(err, Error::SchemaResolution(_)));

    let err = writer.commit(Some("Staff"), &mut row, &EditedCell::new("Salary", "x")).await.unwrap_err();
    assert!(matches!(err, Error::SchemaResolution(_)));

    let mut typo = Row::added();
    typo.set_text("Nmae", "Gus");
    let err = session.insert_row(&mut typo).await.unwrap_err();
    assert!(matches!(err, Error::SchemaResolution(_)));
    Ok(())
}

#[tokio::test]
async fn test_delete_row_requires_confirmation() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = setup().await?;
    session.run_script("INSERT INTO Staff (Name) VALUES ('Hana')").await.into_result()?;
    session.reload().await?;
    let row = session.row(0).expect("one row");

    let err = session.delete_row(&row, &|_: &str| false).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert_eq!(count(&session, "SELECT COUNT(*) FROM Staff").await?, Some(1));

    let deleted = session.delete_row(&row, &hrdesk::AssumeYes).await?;
    assert_eq!(deleted, 1);
    assert!(session.views().browse().is_some_and(|rs| rs.is_empty()));
    Ok(())
}
