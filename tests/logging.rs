//! Events emitted through `tracing`.

use std::{
    any::Any,
    fmt,
    sync::{Arc, Mutex},
};

use polyvec::{NoCloning, PolyVec};
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context, prelude::*};

#[derive(Debug)]
struct Recorded {
    level: Level,
    target: String,
    message: String,
    fields: Vec<(String, String)>,
}

impl Recorded {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    fn take(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

struct FieldVisitor<'a> {
    message: &'a mut String,
    fields: &'a mut Vec<(String, String)>,
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields.push((field.name().to_owned(), value.to_owned()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.message = format!("{value:?}");
        } else {
            self.fields
                .push((field.name().to_owned(), format!("{value:?}")));
        }
    }
}

impl<S: Subscriber> Layer<S> for Recorder {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        let mut fields = Vec::new();
        event.record(&mut FieldVisitor {
            message: &mut message,
            fields: &mut fields,
        });
        self.0.lock().unwrap().push(Recorded {
            level: *event.metadata().level(),
            target: event.metadata().target().to_owned(),
            message,
            fields,
        });
    }
}

fn recording<R>(f: impl FnOnce() -> R) -> (R, Vec<Recorded>) {
    let recorder = Recorder::default();
    let subscriber = tracing_subscriber::registry().with(recorder.clone());
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, recorder.take())
}

#[test]
fn test_reallocation_is_logged() {
    let (_, events) = recording(|| {
        let mut vec = PolyVec::<dyn Any>::new();
        for value in 0..5u64 {
            vec.push(value).unwrap();
        }
        vec.reserve_aligned(4, 8, 8).unwrap();
        let _copy = vec.try_clone().unwrap();
    });

    let reallocations: Vec<&Recorded> = events
        .iter()
        .filter(|event| event.message == "reallocated storage")
        .collect();
    assert_eq!(reallocations.len(), 2, "{events:#?}");
    assert!(reallocations.iter().all(|event| event.level == Level::DEBUG));
    assert!(reallocations.iter().all(|event| event.target.starts_with("polyvec")));
    assert_eq!(reallocations[0].field("operation"), Some("push"));
    assert_eq!(reallocations[0].field("old_capacity"), Some("0"));
    assert_eq!(reallocations[0].field("new_capacity"), Some("4"));
    assert_eq!(reallocations[1].field("new_capacity"), Some("8"));

    assert!(
        events
            .iter()
            .any(|event| event.level == Level::TRACE && event.message == "copying container")
    );
}

#[test]
fn test_failure_is_logged() {
    let (result, events) = recording(|| {
        let mut vec = PolyVec::<dyn Any, NoCloning>::new();
        vec.push(1u32).unwrap();
        vec.reserve(100, 4)
    });

    assert!(result.is_err());
    let failure = events
        .iter()
        .find(|event| event.message == "operation failed")
        .unwrap();
    assert_eq!(failure.level, Level::DEBUG);
    assert_eq!(failure.field("operation"), Some("reserve"));
    assert_eq!(failure.field("len"), Some("1"));
    assert!(failure.field("error").unwrap().contains("NoCloning"));
}
