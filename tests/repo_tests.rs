use rollcall::db::pool::DbPool;
use rollcall::db::repo::{Order, Query, Repo};
use rollcall::errors::AppError;
use rollcall::models::school::School;

fn seeded() -> DbPool {
    let pool = DbPool::in_memory().unwrap();
    let repo = Repo::<School>::new(&pool.conn);
    for (name, code, region) in [
        ("Hill School", "HILL", Some("North")),
        ("River School", "RIVER", Some("South")),
        ("Lake School", "LAKE", None),
    ] {
        repo.insert(&School::new(name, code, region.map(str::to_string)))
            .unwrap();
    }
    pool
}

fn codes(schools: &[School]) -> Vec<&str> {
    schools.iter().map(|s| s.code.as_str()).collect()
}

#[test]
fn test_insert_assigns_ids_and_get_reads_back() {
    let pool = seeded();
    let repo = Repo::<School>::new(&pool.conn);

    let river = repo.get(2).unwrap().unwrap();
    assert_eq!(river.name, "River School");
    assert_eq!(river.region.as_deref(), Some("South"));
    assert!(repo.get(99).unwrap().is_none());
}

#[test]
fn test_filters_order_and_limit() {
    let pool = seeded();
    let repo = Repo::<School>::new(&pool.conn);

    let sorted = repo.list(&Query::new().order_by("code", Order::Asc)).unwrap();
    assert_eq!(codes(&sorted), vec!["HILL", "LAKE", "RIVER"]);

    let with_region = repo
        .list(&Query::new().not_null("region").order_by("id", Order::Desc))
        .unwrap();
    assert_eq!(codes(&with_region), vec!["RIVER", "HILL"]);

    let without = repo.list(&Query::new().is_null("region")).unwrap();
    assert_eq!(codes(&without), vec!["LAKE"]);

    let picked = repo
        .list(&Query::new().any_of("code", ["HILL".to_string(), "LAKE".to_string()]).order_by("id", Order::Asc))
        .unwrap();
    assert_eq!(codes(&picked), vec!["HILL", "LAKE"]);

    let none: Vec<i64> = Vec::new();
    assert!(repo.list(&Query::new().any_of("id", none)).unwrap().is_empty());

    assert_eq!(repo.count(&Query::new().between("id", 2i64, 3i64)).unwrap(), 2);
    assert_eq!(
        repo.first(&Query::new().ne("code", "HILL".to_string()).order_by("id", Order::Asc))
            .unwrap()
            .map(|s| s.code),
        Some("RIVER".to_string())
    );
    assert_eq!(repo.list(&Query::new().limit(1)).unwrap().len(), 1);
}

#[test]
fn test_unknown_columns_are_refused() {
    let pool = seeded();
    let repo = Repo::<School>::new(&pool.conn);

    let err = repo.list(&Query::new().eq("name; DROP TABLE schools", 1i64)).unwrap_err();
    assert!(matches!(err, AppError::UnknownColumn { table: "schools", .. }));
    assert!(repo.list(&Query::new().order_by("nope", Order::Asc)).is_err());
    assert_eq!(repo.count(&Query::new()).unwrap(), 3);
}

#[test]
fn test_update_upsert_and_delete() {
    let pool = seeded();
    let repo = Repo::<School>::new(&pool.conn);

    let mut hill = repo.get(1).unwrap().unwrap();
    hill.region = Some("West".into());
    assert!(repo.update(&hill).unwrap());
    assert_eq!(repo.get(1).unwrap().unwrap().region.as_deref(), Some("West"));

    let id = repo
        .upsert(&School::new("Hill Academy", "HILL", None), &["code"])
        .unwrap();
    assert_eq!(id, 1);
    assert_eq!(repo.get(1).unwrap().unwrap().name, "Hill Academy");
    assert_eq!(repo.count(&Query::new()).unwrap(), 3);

    let changed = repo
        .update_where(&[("region", "Central".to_string().into())], &Query::new().is_null("region"))
        .unwrap();
    assert_eq!(changed, 2);
    assert!(!repo.exists(&Query::new().is_null("region")).unwrap());

    assert!(repo.delete(3).unwrap());
    assert!(!repo.delete(3).unwrap());
    assert_eq!(repo.count(&Query::new()).unwrap(), 2);
}
