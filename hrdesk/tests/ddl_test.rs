use hrdesk::{AssumeYes, ColumnType, Database, Error, RenameOutcome, Session};

async fn session() -> Result<Session, Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    Ok(Session::open(db).await?)
}

#[test]
fn test_column_type_parsing() {
    assert_eq!("int".parse::<ColumnType>().ok(), Some(ColumnType::Int));
    assert_eq!("nvarchar(50)".parse::<ColumnType>().ok(), Some(ColumnType::NVarChar50));
    assert_eq!(" DATETIME ".parse::<ColumnType>().ok(), Some(ColumnType::DateTime));
    assert_eq!("Bit".parse::<ColumnType>().ok(), Some(ColumnType::Bit));
    assert!(matches!("money".parse::<ColumnType>(), Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_add_and_drop_table() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session().await?;

    session.add_table("Projects").await?;
    assert!(session.tables().iter().any(|t| t == "Projects"));
    assert_eq!(session.introspector().get_primary_key("Projects").await.as_deref(), Some("ID"));

    assert!(matches!(session.add_table("bad name").await, Err(Error::Validation(_))));
    assert!(matches!(session.add_table("").await, Err(Error::Validation(_))));

    session.select_table("Projects").await?;
    let err = session.drop_table("Projects", &|_: &str| false).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(session.tables().iter().any(|t| t == "Projects"));

    session.drop_table("Projects", &AssumeYes).await?;
    assert!(session.tables().is_empty());
    assert_eq!(session.current_table(), None);
    assert!(session.views().browse().is_none());

    assert!(matches!(session.drop_table("Projects", &AssumeYes).await, Err(Error::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn test_column_administration() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session().await?;
    session.add_table("Projects").await?;

    assert!(matches!(session.add_column("Title", ColumnType::NVarChar50).await, Err(Error::NoTableSelected)));

    session.select_table("Projects").await?;
    session.add_column("Title", ColumnType::NVarChar50).await?;
    session.add_column("Budget", ColumnType::Int).await?;
    assert_eq!(session.introspector().get_columns("Projects").await, vec!["ID", "Title", "Budget"]);
    assert_eq!(session.views().browse().map(|rs| rs.columns.clone()), Some(vec![
        "ID".to_string(),
        "Title".to_string(),
        "Budget".to_string(),
    ]));

    assert!(matches!(session.add_column("1st", ColumnType::Int).await, Err(Error::Validation(_))));

    let outcome = session.rename_column("Title", "Name").await?;
    assert_eq!(outcome, RenameOutcome::Renamed { from: "Title".to_string(), to: "Name".to_string() });
    assert_eq!(session.rename_column("Name", "Name").await?, RenameOutcome::Unchanged);
    assert_eq!(session.rename_column("Name", "  ").await?, RenameOutcome::Unchanged);
    assert!(matches!(session.rename_column("Title", "Other").await, Err(Error::Validation(_))));

    assert!(matches!(session.drop_column("ID", &AssumeYes).await, Err(Error::Validation(_))));
    assert!(matches!(session.drop_column("Budget", &|_: &str| false).await, Err(Error::Cancelled)));

    session.drop_column("Budget", &AssumeYes).await?;
    assert_eq!(session.introspector().get_columns("Projects").await, vec!["ID", "Name"]);
    Ok(())
}
