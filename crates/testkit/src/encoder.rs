use feldera_testkit_types::{Key, Polarity, SnapshotEvent, Value};

/// The change event that applies a row with the given polarity.
pub fn encode(polarity: Polarity, key: Key, values: Vec<Value>) -> SnapshotEvent {
    match polarity {
        Polarity::Insert => SnapshotEvent::insert(key, values),
        Polarity::Delete => SnapshotEvent::delete(key, values),
    }
}

#[cfg(test)]
mod test {
    use super::encode;
    use feldera_testkit_types::{Key, Polarity, SnapshotEvent, Value};

    #[test]
    fn polarity_selects_the_event() {
        let key = Key::from_raw(1);
        assert_eq!(
            encode(Polarity::Insert, key, vec![Value::Int(1)]),
            SnapshotEvent::Insert(key, vec![Value::Int(1)])
        );
        assert_eq!(
            encode(Polarity::Delete, key, vec![Value::Int(1)]),
            SnapshotEvent::Delete(key, vec![Value::Int(1)])
        );
    }
}
