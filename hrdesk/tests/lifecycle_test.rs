use hrdesk::{
    export_filter_report, hr, AssumeYes, CsvSink, Database, DocumentLayout, EmployeeLifecycle, Error, Filter,
    HireForm, Session, TextSink, Value,
};

async fn setup(docs: &std::path::Path) -> Result<(Database, EmployeeLifecycle), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;
    hr::bootstrap(&db).await?;
    let lifecycle = EmployeeLifecycle::new(db.clone(), DocumentLayout::new(docs), Box::new(TextSink));
    Ok((db, lifecycle))
}

fn form() -> HireForm {
    HireForm {
        first_name: "Olena".to_string(),
        last_name: "Bondarenko".to_string(),
        middle_name: "Petrivna".to_string(),
        phone: "+380501112233".to_string(),
        email: "olena@example.com".to_string(),
        address: "12 Khreshchatyk St, Kyiv".to_string(),
        job_title: "Accountant".to_string(),
        hire_date: "01.03.2024".to_string(),
        department_id: "3".to_string(),
        position_id: "2".to_string(),
        salary: "1450.50".to_string(),
    }
}

async fn scalar(db: &Database, sql: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    Ok(db.raw(sql).fetch_scalar().await?)
}

#[tokio::test]
async fn test_bootstrap_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await?;

    let created = hr::bootstrap(&db).await?;
    assert_eq!(created, vec!["Person", "Employee", "Document"]);
    assert!(hr::bootstrap(&db).await?.is_empty());

    let schema = hrdesk::SchemaIntrospector::new(&db);
    assert_eq!(schema.get_primary_key("Employee").await.as_deref(), Some("Employee_id"));
    assert_eq!(schema.get_primary_key("Document").await.as_deref(), Some("Document_id"));
    Ok(())
}

#[test]
fn test_hire_form_stops_at_first_invalid_field() {
    let request = form().validate().expect("valid form");
    assert_eq!(request.department_id, 3);
    assert_eq!(request.hire_date.to_string(), "2024-03-01");

    let mut bad = form();
    bad.email = "olena.example.com".to_string();
    bad.department_id = "9".to_string();
    match bad.validate() {
        Err(Error::Validation(msg)) => assert!(msg.contains("Email"), "{}", msg),
        other => panic!("unexpected result: {:?}", other),
    }

    let cases: [(fn(&mut HireForm), &str); 6] = [
        (|f| f.first_name.clear(), "First name"),
        (|f| f.hire_date = "31.02.2024".to_string(), "Hire date"),
        (|f| f.department_id = "9".to_string(), "Department id"),
        (|f| f.position_id = "0".to_string(), "Position id"),
        (|f| f.salary = "0".to_string(), "Salary"),
        (|f| f.salary = "-10".to_string(), "Salary"),
    ];
    for (break_form, field) in cases {
        let mut f = form();
        break_form(&mut f);
        match f.validate() {
            Err(Error::Validation(msg)) => assert!(msg.starts_with(field), "{} / {}", field, msg),
            other => panic!("{} should be rejected, got {:?}", field, other),
        }
    }
}

#[tokio::test]
async fn test_hire_writes_rows_and_contract() -> Result<(), Box<dyn std::error::Error>> {
    let docs = tempfile::tempdir()?;
    let (db, lifecycle) = setup(docs.path()).await?;

    let outcome = lifecycle.hire(&form()).await?;
    assert_eq!(outcome.contract, docs.path().join("Docs").join("Hired").join(format!("{}.txt", outcome.employee_id)));

    let contract = std::fs::read_to_string(&outcome.contract)?;
    assert!(contract.contains("Bondarenko Olena Petrivna"));
    assert!(contract.contains("1450.50"));

    let record = lifecycle.lookup(outcome.employee_id).await?.expect("employee exists");
    assert_eq!(record.person_id, outcome.person_id);
    assert_eq!(record.hire_date, "2024-03-01");
    assert_eq!(record.department_id, 3);
    assert_eq!(record.salary, 1450.5);

    let kind = scalar(&db, &format!("SELECT DocumentType FROM Document WHERE Document_id = {}", outcome.document_id)).await?;
    assert_eq!(kind, Some(Value::Text("Employement".to_string())));
    let degree = scalar(&db, "SELECT AcademicDegree_id FROM Employee").await?;
    assert_eq!(degree.and_then(|v| v.as_i64()), Some(1));
    Ok(())
}

#[tokio::test]
async fn test_invalid_hire_sends_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let docs = tempfile::tempdir()?;
    let (db, lifecycle) = setup(docs.path()).await?;

    let mut bad = form();
    bad.salary = "free".to_string();
    assert!(matches!(lifecycle.hire(&bad).await, Err(Error::Validation(_))));

    let people = scalar(&db, "SELECT COUNT(*) FROM Person").await?;
    assert_eq!(people.and_then(|v| v.as_i64()), Some(0));
    Ok(())
}

#[tokio::test]
async fn test_dismiss_deletes_employee_and_person() -> Result<(), Box<dyn std::error::Error>> {
    let docs = tempfile::tempdir()?;
    let (db, lifecycle) = setup(docs.path()).await?;
    let hired = lifecycle.hire(&form()).await?;

    let outcome = lifecycle.dismiss(hired.employee_id, "by mutual agreement", &AssumeYes).await?;
    assert_eq!(outcome.letter, docs.path().join("Docs").join("Fired").join(format!("{}.txt", hired.employee_id)));
    let letter = std::fs::read_to_string(&outcome.letter)?;
    assert!(letter.contains("by mutual agreement"));

    let employees = scalar(&db, "SELECT COUNT(*) FROM Employee").await?;
    let people = scalar(&db, "SELECT COUNT(*) FROM Person").await?;
    assert_eq!(employees.and_then(|v| v.as_i64()), Some(0));
    assert_eq!(people.and_then(|v| v.as_i64()), Some(0));

    let kind = scalar(&db, &format!("SELECT DocumentType FROM Document WHERE Document_id = {}", outcome.document_id)).await?;
    assert_eq!(kind, Some(Value::Text("Dismissial".to_string())));

    assert!(matches!(lifecycle.dismiss(hired.employee_id, "", &AssumeYes).await, Err(Error::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn test_dismiss_rolls_back_when_person_delete_fails() -> Result<(), Box<dyn std::error::Error>> {
    let docs = tempfile::tempdir()?;
    let (db, lifecycle) = setup(docs.path()).await?;
    let hired = lifecycle.hire(&form()).await?;

    db.raw("CREATE TRIGGER keep_person BEFORE DELETE ON Person BEGIN SELECT RAISE(ABORT, 'person is locked'); END")
        .execute()
        .await?;

    let err = lifecycle.dismiss(hired.employee_id, "", &AssumeYes).await.unwrap_err();
    assert!(matches!(err, Error::Statement(_)), "{:?}", err);

    // Both rows are still there and no dismissal was recorded.
    let employees = scalar(&db, "SELECT COUNT(*) FROM Employee").await?;
    let people = scalar(&db, "SELECT COUNT(*) FROM Person").await?;
    let dismissals = scalar(&db, "SELECT COUNT(*) FROM Document WHERE DocumentType = 'Dismissial'").await?;
    assert_eq!(employees.and_then(|v| v.as_i64()), Some(1));
    assert_eq!(people.and_then(|v| v.as_i64()), Some(1));
    assert_eq!(dismissals.and_then(|v| v.as_i64()), Some(0));
    assert!(!docs.path().join("Docs").join("Fired").exists());
    Ok(())
}

#[tokio::test]
async fn test_declined_dismissal_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let docs = tempfile::tempdir()?;
    let (_db, lifecycle) = setup(docs.path()).await?;
    let hired = lifecycle.hire(&form()).await?;

    let err = lifecycle.dismiss(hired.employee_id, "", &|_: &str| false).await.unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(lifecycle.lookup(hired.employee_id).await?.is_some());

    assert!(matches!(hr::parse_employee_id("abc"), Err(Error::Validation(_))));
    assert!(matches!(hr::parse_employee_id("-4"), Err(Error::Validation(_))));
    assert_eq!(hr::parse_employee_id(" 12 ")?, 12);
    Ok(())
}

#[tokio::test]
async fn test_filter_report_is_recorded_and_written() -> Result<(), Box<dyn std::error::Error>> {
    let docs = tempfile::tempdir()?;
    let (db, lifecycle) = setup(docs.path()).await?;
    lifecycle.hire(&form()).await?;
    let mut second = form();
    second.first_name = "Taras".to_string();
    second.salary = "900".to_string();
    lifecycle.hire(&second).await?;

    let mut session = Session::open(db.clone()).await?;
    session.select_table("Employee").await?;

    let layout = DocumentLayout::new(docs.path());
    let report = export_filter_report(&mut session, &[Filter::parse("Salary > 1000")?], &layout, &CsvSink).await?;
    assert_eq!(report.rows, 1);
    assert_eq!(report.path, docs.path().join("Docs").join("Filters").join(format!("_report_{}.csv", report.document_id)));

    let csv = std::fs::read_to_string(&report.path)?;
    let mut lines = csv.lines();
    assert!(lines.next().is_some_and(|header| header.starts_with("Employee_id,Person_id")));
    assert_eq!(lines.count(), 1);

    let owner = scalar(&db, &format!("SELECT Employee_id FROM Document WHERE Document_id = {}", report.document_id)).await?;
    assert_eq!(owner.and_then(|v| v.as_i64()), Some(0));
    let kind = scalar(&db, &format!("SELECT DocumentType FROM Document WHERE Document_id = {}", report.document_id)).await?;
    assert_eq!(kind, Some(Value::Text("Filters".to_string())));
    Ok(())
}
