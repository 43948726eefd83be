use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use rulekit::{Context, Expression, Frontend, MongoQuery, SqlWhere};

#[test]
fn evaluate_across_threads() {
    let rule = Arc::new(
        Expression::new()
            .parse(r#"user.age >= 18 and user.status == "active" and not user.banned"#)
            .unwrap(),
    );

    let cases = [
        (25_i64, "active", false, true),
        (30, "active", true, false),
        (15, "active", false, false),
        (25, "inactive", false, false),
    ];

    let handles: Vec<_> = cases
        .into_iter()
        .map(|(age, status, banned, expected)| {
            let rule = Arc::clone(&rule);
            thread::spawn(move || {
                let ctx = Context::new()
                    .set("user.age", age)
                    .set("user.status", status)
                    .set("user.banned", banned);
                (rule.evaluate(&ctx).unwrap(), expected)
            })
        })
        .collect();

    for handle in handles {
        let (actual, expected) = handle.join().unwrap();
        assert_eq!(actual, expected);
    }
}

#[test]
fn actions_fire_once_per_match_across_threads() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let rule = Arc::new(
        SqlWhere::new()
            .parse_with_action("score BETWEEN 50 AND 100", move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap(),
    );

    let handles: Vec<_> = (0..8_i64)
        .map(|i| {
            let rule = Arc::clone(&rule);
            thread::spawn(move || rule.execute(&Context::new().set("score", i * 20)).unwrap())
        })
        .collect();
    let matched = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|m| *m)
        .count();

    // 60, 80, 100
    assert_eq!(matched, 3);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn deferred_values_resolve_per_thread() {
    let rule = Arc::new(MongoQuery::new().parse(r#"{"load": {"$lt": 0.75}}"#).unwrap());
    let handles: Vec<_> = [0.5_f64, 0.9]
        .into_iter()
        .map(|load| {
            let rule = Arc::clone(&rule);
            thread::spawn(move || {
                let ctx = Context::new().set_deferred("load", move || load.into());
                rule.evaluate(&ctx).unwrap()
            })
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, false]);
}
