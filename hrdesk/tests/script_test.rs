use hrdesk::{
    script::{classify, split_batches},
    BatchOutcome, Database, Error, ScriptRunner, Session, StatementKind, Value,
};

#[test]
fn test_split_on_go_lines() {
    let batches = split_batches("SELECT 1\nGO\nSELECT 2");
    assert_eq!(batches, vec!["SELECT 1", "SELECT 2"]);

    let batches = split_batches("select 1\n  go  -- end of first\n\nGO\nselect 2\ngo");
    assert_eq!(batches, vec!["select 1", "select 2"]);

    // GO inside a line is not a separator.
    let batches = split_batches("SELECT 'GO' AS word\nGO");
    assert_eq!(batches, vec!["SELECT 'GO' AS word"]);

    assert!(split_batches("  \nGO\n  ").is_empty());
}

#[test]
fn test_classify_by_prefix() {
    assert_eq!(classify("  select * from t"), StatementKind::Query);
    assert_eq!(classify("WITH x AS (SELECT 1) SELECT * FROM x"), StatementKind::Query);
    assert_eq!(classify("insert into t values (1)"), StatementKind::Insert);
    assert_eq!(classify("Update t set a = 1"), StatementKind::Update);
    assert_eq!(classify("DELETE FROM t"), StatementKind::Delete);
    assert_eq!(classify("CREATE TABLE t (a INT)"), StatementKind::Other);
    assert_eq!(classify("-- comment\nSELECT 1"), StatementKind::Other);
}

#[tokio::test]
async fn test_two_query_batches_run_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    let report = ScriptRunner::new(&db).run("SELECT 1 AS n\nGO\nSELECT 2 AS n").await;

    assert!(report.is_success());
    assert_eq!(report.outcomes.len(), 2);
    let values: Vec<Option<i64>> = report
        .outcomes
        .iter()
        .map(|o| o.rows().and_then(|rs| rs.get(0, "n")).and_then(Value::as_i64))
        .collect();
    assert_eq!(values, vec![Some(1), Some(2)]);
    Ok(())
}

#[tokio::test]
async fn test_dml_batches_report_row_counts() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    let script = "CREATE TABLE Team (ID INTEGER PRIMARY KEY AUTOINCREMENT, Name NVARCHAR(50))
GO
INSERT INTO Team (Name) VALUES ('Payroll'), ('Recruiting')
GO
UPDATE Team SET Name = 'Hiring' WHERE Name = 'Recruiting'
GO
DELETE FROM Team WHERE Name = 'Payroll'";

    let report = ScriptRunner::new(&db).run(script).await;
    assert!(report.is_success());
    assert_eq!(report.outcomes[1], BatchOutcome::Inserted(2));
    assert_eq!(report.outcomes[2], BatchOutcome::Updated(1));
    assert_eq!(report.outcomes[3], BatchOutcome::Deleted(1));
    assert!(report.outcomes[2].rows().is_none());

    assert_eq!(report.outcomes[1].message(), ("Create Result", "Inserted 2 row(s)".to_string()));
    assert_eq!(report.outcomes[3].message(), ("Delete Result", "Deleted 1 row(s)".to_string()));
    assert_eq!(report.outcomes[0].message().0, "Result");
    Ok(())
}

#[tokio::test]
async fn test_first_failure_stops_the_script() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    let script = "CREATE TABLE Note (ID INTEGER PRIMARY KEY, Body NVARCHAR(50))
GO
INSERT INTO Missing (Body) VALUES ('x')
GO
INSERT INTO Note (Body) VALUES ('never')";

    let report = ScriptRunner::new(&db).run(script).await;
    assert_eq!(report.outcomes.len(), 1);
    let failure = report.failure.as_ref().expect("second batch fails");
    assert_eq!(failure.index, 1);
    assert!(matches!(failure.error, Error::Statement(_)));

    let count = db.raw("SELECT COUNT(*) FROM Note").fetch_scalar().await?;
    assert_eq!(count.and_then(|v| v.as_i64()), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_session_publishes_results_to_both_views() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    let mut session = Session::open(db).await?;

    let report = session.run_script("SELECT 'a' AS letter\nGO\nSELECT 'b' AS letter").await;
    assert!(report.is_success());
    assert_eq!(session.last_script(), Some("SELECT 'a' AS letter\nGO\nSELECT 'b' AS letter"));

    let browse = session.views().browse().expect("browse view");
    let query = session.views().query().expect("query view");
    assert!(std::sync::Arc::ptr_eq(browse, query));
    assert_eq!(browse.get(0, "letter"), Some(&Value::Text("b".to_string())));
    Ok(())
}
