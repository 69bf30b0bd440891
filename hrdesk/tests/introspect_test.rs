use hrdesk::{Database, Nullability, SchemaIntrospector};

async fn setup() -> Result<Database, Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    db.raw(
        "CREATE TABLE Department (Department_id INTEGER PRIMARY KEY AUTOINCREMENT, Name NVARCHAR(50) NOT NULL, \
         Budget BIGINT NULL, Active BIT NULL, Founded DATETIME2 NULL)",
    )
    .execute()
    .await?;
    db.raw("CREATE TABLE Assignment (Employee_id INT NOT NULL, Project_id INT NOT NULL, PRIMARY KEY (Employee_id, Project_id))")
        .execute()
        .await?;
    Ok(db)
}

#[tokio::test]
async fn test_columns_and_primary_key() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup().await?;
    let schema = SchemaIntrospector::new(&db);

    let columns = schema.get_columns("Department").await;
    assert_eq!(columns, vec!["Department_id", "Name", "Budget", "Active", "Founded"]);

    let key = schema.get_primary_key("Department").await;
    assert_eq!(key.as_deref(), Some("Department_id"));
    assert!(columns.contains(&key.unwrap()));

    assert!(schema.is_primary_key("Department", "Department_id").await);
    assert!(!schema.is_primary_key("Department", "Name").await);
    Ok(())
}

#[tokio::test]
async fn test_types_and_nullability() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup().await?;
    let schema = SchemaIntrospector::new(&db);

    assert_eq!(schema.get_data_type("Department", "Name").await, "nvarchar");
    assert_eq!(schema.get_data_type("Department", "Budget").await, "bigint");
    assert_eq!(schema.get_data_type("Department", "Active").await, "bit");
    assert_eq!(schema.get_data_type("Department", "Missing").await, "nvarchar");

    assert_eq!(schema.allows_null("Department", "Name").await, Nullability::No);
    assert_eq!(schema.allows_null("Department", "Budget").await, Nullability::Yes);
    assert_eq!(schema.allows_null("Department", "Department_id").await, Nullability::No);
    assert_eq!(schema.allows_null("Department", "Missing").await, Nullability::No);
    Ok(())
}

#[tokio::test]
async fn test_composite_and_missing_tables() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup().await?;
    let schema = SchemaIntrospector::new(&db);

    // Composite keys are not supported.
    assert_eq!(schema.get_primary_key("Assignment").await, None);
    assert!(schema.is_primary_key("Assignment", "Project_id").await);

    assert!(schema.get_columns("Nowhere").await.is_empty());
    assert_eq!(schema.get_primary_key("Nowhere").await, None);

    let described = schema.describe("Nowhere").await;
    assert!(described.columns.is_empty());
    assert_eq!(described.data_type("anything"), "nvarchar");
    assert_eq!(described.allows_null("anything"), Nullability::No);
    Ok(())
}

#[tokio::test]
async fn test_describe_matches_single_lookups() -> Result<(), Box<dyn std::error::Error>> {
    let db = setup().await?;
    let schema = SchemaIntrospector::new(&db);

    let table = schema.describe("Department").await;
    assert_eq!(table.primary_key.as_deref(), Some("Department_id"));
    assert_eq!(table.column_names(), schema.get_columns("Department").await);

    let insertable: Vec<&str> = table.insertable_columns().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(insertable, vec!["Name", "Budget", "Active", "Founded"]);

    for column in table.column_names() {
        assert_eq!(table.data_type(&column), schema.get_data_type("Department", &column).await);
        assert_eq!(table.allows_null(&column), schema.allows_null("Department", &column).await);
    }

    assert_eq!(db.list_tables().await?, vec!["Assignment", "Department"]);
    Ok(())
}
