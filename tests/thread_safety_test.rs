//! Tests for sharing one validator across threads.

use std::sync::Arc;
use std::thread;

use contextual_validator::{AtomicRegistry, RegistryError, Validator};
use serde_json::{json, Value};

fn shared_validator() -> Arc<Validator> {
    Arc::new(
        Validator::from_json(
            &json!({
                "name": { "checkIf": "isAlpha", "sanitizeIt": "trim" },
                "qty":  { "requireIt": "never", "checkIf": "isInt", "default": 1 }
            }),
            AtomicRegistry::with_builtins(),
        )
        .unwrap()
        .exit_on_first_error(false),
    )
}

#[test]
fn test_concurrent_validation() {
    let validator = shared_validator();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let payload = json!({ "name": "Pasta", "qty": i });
                let data = validator
                    .validate(&payload, "add")
                    .unwrap()
                    .into_result()
                    .unwrap();
                assert_eq!(data.save["qty"], json!(i));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_registration_and_validation() {
    let registry = AtomicRegistry::with_builtins();
    let validator = Arc::new(
        Validator::from_json(&json!({ "name": { "checkIf": "isAlpha" } }), registry.clone())
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let validator = Arc::clone(&validator);
            let registry = registry.clone();
            thread::spawn(move || {
                registry
                    .register_check(format!("custom{}", i), |_: &Value, _: &[Value]| {
                        Ok::<_, RegistryError>(true)
                    })
                    .unwrap();
                assert!(validator
                    .validate(&json!({ "name": "abc" }), "add")
                    .unwrap()
                    .is_success());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(registry.check_names().iter().filter(|n| n.starts_with("custom")).count(), 8);
}

#[test]
fn test_batch_preserves_order() {
    let validator = shared_validator();
    let payloads: Vec<Value> = (0..100)
        .map(|i| {
            if i % 10 == 0 {
                json!({ "name": "n0t-alpha", "qty": i })
            } else {
                json!({ "name": "Pasta", "qty": i })
            }
        })
        .collect();

    let results = validator.validate_batch(&payloads, "add");
    assert_eq!(results.len(), 100);

    for (i, result) in results.into_iter().enumerate() {
        match result.unwrap().into_result() {
            Ok(data) => {
                assert_ne!(i % 10, 0);
                assert_eq!(data.save["qty"], json!(i));
            }
            Err(errors) => {
                assert_eq!(i % 10, 0);
                assert_eq!(errors.first().path.to_string(), "name");
            }
        }
    }
}
