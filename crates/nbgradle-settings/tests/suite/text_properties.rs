use std::sync::{Arc, Barrier};
use std::thread;

use crossbeam_channel::unbounded;
use nbgradle_settings::standard::{source_encoding, text_property_def};
use nbgradle_settings::{ConfigUpdate, MutableProperty, ProfileSettings};

use super::{path, settings1, settle, waitable_listener, TIMEOUT};

fn assert_text_property_update(
    keys: &[&'static str],
    initial: &str,
    new_value: &str,
    natural_equality: bool,
) {
    let settings = settings1();
    let property = settings.get_property(path(keys), &text_property_def(natural_equality));
    assert_eq!(property.value().as_deref(), Some(initial), "{keys:?}");
    settle();

    let (doc_tx, doc_rx) = unbounded();
    let _doc_listener = settings.add_document_change_listener(move |update: &ConfigUpdate| {
        let _ = doc_tx.send(update.paths().to_vec());
    });
    let (listener, calls) = waitable_listener();
    let _listener = property.add_change_listener(listener);

    property.set_value(Some(new_value.to_string()));
    assert_eq!(property.value().as_deref(), Some(new_value), "{keys:?}");

    calls.recv_timeout(TIMEOUT).expect("value change callback");
    let changed = doc_rx.recv_timeout(TIMEOUT).expect("document change callback");
    assert_eq!(changed, vec![path(keys)]);

    settle();
    assert_eq!(calls.try_iter().count(), 0, "property listener called more than once");
    assert_eq!(doc_rx.try_iter().count(), 0, "document listener called more than once");
    assert_eq!(
        settings.current_config().deep_sub_tree(&path(keys)).value(),
        Some(new_value)
    );
}

#[test]
fn set_value_of_root_text_property() {
    for _ in 0..20 {
        assert_text_property_update(&["source-encoding"], "UTF-8", "ISO-8859-1", true);
    }
    assert_text_property_update(&["target-platform-name"], "j2se", "j2me", true);
    assert_text_property_update(&["target-platform"], "1.7", "1.6", true);
    assert_text_property_update(&["source-level"], "1.7", "1.8", true);
}

#[test]
fn set_value_of_root_text_property_with_reference_equality() {
    assert_text_property_update(&["source-encoding"], "UTF-8", "ISO-8859-1", false);
    assert_text_property_update(&["target-platform-name"], "j2se", "j2me", false);
    assert_text_property_update(&["target-platform"], "1.7", "1.6", false);
    assert_text_property_update(&["source-level"], "1.7", "1.8", false);
}

#[test]
fn set_value_of_deep_text_property() {
    let keys = ["auxiliary", "com-junichi11-netbeans-changelf.lf-kind"];
    for _ in 0..20 {
        assert_text_property_update(&keys, "LF", "CRLF", true);
    }
    assert_text_property_update(&keys, "LF", "CRLF", false);
}

#[test]
fn setting_an_equal_value_is_not_a_change() {
    let settings = settings1();
    let property = source_encoding(&settings);
    settle();

    let (doc_tx, doc_rx) = unbounded();
    let _doc_listener = settings.add_document_change_listener(move |_: &ConfigUpdate| {
        let _ = doc_tx.send(());
    });
    let (listener, calls) = waitable_listener();
    let _listener = property.add_change_listener(listener);

    property.set_value(Some("UTF-8".to_string()));
    settle();

    assert_eq!(calls.try_iter().count(), 0);
    assert_eq!(doc_rx.try_iter().count(), 0);
}

#[test]
fn reference_equality_treats_every_assignment_as_a_change() {
    let settings = settings1();
    let property = settings.get_property(path(&["source-encoding"]), &text_property_def(false));
    settle();

    let (listener, calls) = waitable_listener();
    let _listener = property.add_change_listener(listener);

    property.set_value(Some("UTF-8".to_string()));
    calls.recv_timeout(TIMEOUT).expect("value change callback");
}

#[test]
fn property_created_before_load_reads_the_loaded_document() {
    for (keys, expected) in [
        (&["source-encoding"][..], "UTF-8"),
        (&["target-platform-name"][..], "j2se"),
        (&["target-platform"][..], "1.7"),
        (&["source-level"][..], "1.7"),
    ] {
        let settings = ProfileSettings::new();
        let property = settings.get_property(path(keys), &text_property_def(true));
        assert_eq!(property.value(), None);

        settings.load_from_file(super::fixture("settings1.xml"));
        assert_eq!(property.value().as_deref(), Some(expected), "{keys:?}");
    }
}

#[test]
fn rapid_writes_keep_only_the_latest_value() {
    let settings = settings1();
    let property = source_encoding(&settings);

    for i in 0..100 {
        property.set_value(Some(format!("enc-{i}")));
    }
    assert_eq!(property.value().as_deref(), Some("enc-99"));

    settle();
    assert_eq!(
        settings.current_config().child_tree("source-encoding").value(),
        Some("enc-99")
    );
    assert_eq!(property.value().as_deref(), Some("enc-99"));
}

#[test]
fn concurrent_writers_leave_the_document_and_property_in_sync() {
    const WRITERS: usize = 8;

    let settings = settings1();
    let property = source_encoding(&settings);

    for round in 0..200 {
        let barrier = Barrier::new(WRITERS);
        thread::scope(|scope| {
            for writer in 0..WRITERS {
                let (property, barrier) = (&property, &barrier);
                scope.spawn(move || {
                    barrier.wait();
                    property.set_value(Some(format!("r{round}-w{writer}")));
                });
            }
        });
        settle();

        let stored = settings
            .current_config()
            .child_tree("source-encoding")
            .value()
            .map(str::to_owned);
        assert_eq!(stored, property.value(), "round {round}");
    }

    settings.load_from_stream(
        &b"<gradle-project-properties><source-encoding>RELOADED</source-encoding></gradle-project-properties>"[..],
    );
    assert_eq!(property.value().as_deref(), Some("RELOADED"));
}

#[test]
fn clearing_a_value_removes_its_node() {
    let settings = settings1();
    let property = settings.get_property(
        path(&["auxiliary", "com-junichi11-netbeans-changelf.lf-kind"]),
        &text_property_def(true),
    );

    property.set_value(None);
    settle();

    let config = settings.current_config();
    assert!(config.child_tree("auxiliary").is_empty());
    assert_eq!(config.child_tree("source-level").value(), Some("1.7"));
    assert_eq!(property.value(), None);
}

#[test]
fn properties_work_through_the_trait_objects() {
    let settings = settings1();
    let property: Arc<dyn MutableProperty<Option<String>>> = Arc::new(source_encoding(&settings));

    property.set_value(Some("UTF-16".to_string()));
    assert_eq!(property.value().as_deref(), Some("UTF-16"));

    let (listener, calls) = waitable_listener();
    let _listener = property.add_change_listener(listener);
    property.set_value(Some("UTF-32".to_string()));
    calls.recv_timeout(TIMEOUT).expect("value change callback");
}
