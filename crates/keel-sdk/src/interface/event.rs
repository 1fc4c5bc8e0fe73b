//! Events: topic filters and log decoding

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use keel_primitives::{Address, LogEntry, H256, U256};

use crate::abi::{event_topic, Args, FieldValues, Fields, Integer, Value};
use crate::error::{AbiError, DecodeError};

/// Topics available to indexed fields of a non-anonymous event
const MAX_INDEXED: usize = 3;
/// Topics available to indexed fields of an anonymous event
const MAX_INDEXED_ANONYMOUS: usize = 4;

/// A contract event
#[derive(Debug, Clone)]
pub struct Event {
    name: String,
    fields: Fields,
    indexed: Vec<bool>,
    anonymous: bool,
    indexed_fields: Fields,
    data_fields: Fields,
    topic: OnceLock<H256>,
}

impl Event {
    /// Create an event, marking the fields named in `indexed` as topics
    pub fn new<'a>(
        name: impl Into<String>,
        fields: Fields,
        indexed: impl IntoIterator<Item = &'a str>,
        anonymous: bool,
    ) -> Result<Self, AbiError> {
        let mut flags = vec![false; fields.len()];
        let mut seen = HashSet::new();
        for field in indexed {
            let index = fields.position(field).ok_or_else(|| {
                AbiError::declaration(format!("Unknown indexed field: `{field}`"))
            })?;
            if !seen.insert(index) {
                return Err(AbiError::declaration(format!(
                    "Field `{field}` is marked as indexed more than once"
                )));
            }
            flags[index] = true;
        }
        Self::from_flags(name, fields, flags, anonymous)
    }

    /// Create an event from per-field `indexed` flags
    pub(crate) fn from_flags(
        name: impl Into<String>,
        fields: Fields,
        indexed: Vec<bool>,
        anonymous: bool,
    ) -> Result<Self, AbiError> {
        if indexed.len() != fields.len() {
            return Err(AbiError::declaration(format!(
                "expected {} indexed flags, got {}",
                fields.len(),
                indexed.len()
            )));
        }

        let count = indexed.iter().filter(|&&flag| flag).count();
        if anonymous && count > MAX_INDEXED_ANONYMOUS {
            return Err(AbiError::declaration(format!(
                "Anonymous events can have at most {MAX_INDEXED_ANONYMOUS} indexed fields"
            )));
        }
        if !anonymous && count > MAX_INDEXED {
            return Err(AbiError::declaration(format!(
                "Non-anonymous events can have at most {MAX_INDEXED} indexed fields"
            )));
        }

        let indexed_fields = fields.subset(|i| indexed[i]);
        let data_fields = fields.subset(|i| !indexed[i]);
        Ok(Self {
            name: name.into(),
            fields,
            indexed,
            anonymous,
            indexed_fields,
            data_fields,
            topic: OnceLock::new(),
        })
    }

    /// Event name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Indexed fields in declaration order
    pub fn indexed_fields(&self) -> &Fields {
        &self.indexed_fields
    }

    /// Fields stored in the log data
    pub fn data_fields(&self) -> &Fields {
        &self.data_fields
    }

    /// Whether field `index` is stored as a topic
    pub fn is_indexed(&self, index: usize) -> bool {
        self.indexed.get(index).copied().unwrap_or(false)
    }

    /// No selector topic is emitted for anonymous events
    pub fn anonymous(&self) -> bool {
        self.anonymous
    }

    /// Selector topic: the full hash of `name(canonical form of all fields)`
    pub fn topic(&self) -> H256 {
        *self
            .topic
            .get_or_init(|| event_topic(&self.name, self.fields.canonical_form()))
    }

    /// Build a topic filter from values for (some of) the indexed fields.
    ///
    /// Unspecified fields match anything; trailing wildcards are dropped.
    pub fn filter(&self, args: &Args<FilterValue>) -> Result<EventFilter, AbiError> {
        let bound = self.indexed_fields.bind_partial(args)?;

        let mut topics = Vec::with_capacity(bound.len() + 1);
        if !self.anonymous {
            topics.push(Some(vec![self.topic()]));
        }
        for (ty, slot) in self.indexed_fields.types().zip(bound) {
            let topic = match slot {
                None => None,
                Some(FilterValue::One(value)) => Some(vec![ty.encode_to_topic(value)?]),
                Some(FilterValue::Either(values)) => Some(
                    values
                        .iter()
                        .map(|value| ty.encode_to_topic(value))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
            };
            topics.push(topic);
        }

        while matches!(topics.last(), Some(None)) {
            topics.pop();
        }
        Ok(EventFilter { topics })
    }

    /// Decode a log entry emitted by this event.
    ///
    /// Indexed reference-type fields are hashed in the log and decode to `None`.
    pub fn decode_log_entry(&self, entry: &LogEntry) -> Result<FieldValues<Option<Value>>, AbiError> {
        let topics = self.check_topics(&entry.topics).map_err(|e| self.decode_error(e))?;

        let mut indexed = Vec::with_capacity(topics.len());
        for (ty, word) in self.indexed_fields.types().zip(topics) {
            indexed.push(ty.decode_from_topic(word)?);
        }
        let data = self.data_fields.decode(&entry.data)?.into_tuple();

        let mut indexed = indexed.into_iter();
        let mut data = data.into_iter();
        let merged = self
            .indexed
            .iter()
            .map(|&flag| {
                if flag {
                    indexed.next().flatten()
                } else {
                    data.next()
                }
            })
            .collect();
        Ok(self.fields.values(merged))
    }

    /// Strip the selector topic and check the count against the indexed fields
    fn check_topics<'t>(&self, topics: &'t [H256]) -> Result<&'t [H256], DecodeError> {
        let expected = self.indexed_fields.len();
        let topics = if self.anonymous {
            topics
        } else {
            match topics.split_first() {
                Some((first, rest)) if *first == self.topic() => rest,
                Some(_) => return Err(DecodeError::ForeignEvent),
                None => return Err(DecodeError::TopicCount { expected, got: 0 }),
            }
        };
        if topics.len() != expected {
            return Err(DecodeError::TopicCount {
                expected,
                got: topics.len(),
            });
        }
        Ok(topics)
    }

    fn decode_error(&self, source: DecodeError) -> AbiError {
        AbiError::decode(format!("{}{}", self.name, self.fields.canonical_form()), source)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fields == other.fields
            && self.indexed == other.indexed
            && self.anonymous == other.anonymous
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event {}(", self.name)?;
        for (i, param) in self.fields.params().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param.ty())?;
            if self.indexed[i] {
                f.write_str(" indexed")?;
            }
            if let Some(name) = param.name() {
                write!(f, " {name}")?;
            }
        }
        f.write_str(")")?;
        if self.anonymous {
            f.write_str(" anonymous")?;
        }
        Ok(())
    }
}

/// Acceptable value(s) of an indexed field in a filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Match a single value
    One(Value),
    /// Match any of the values
    Either(Vec<Value>),
}

impl FilterValue {
    /// Match any of `values`
    pub fn either<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        FilterValue::Either(values.into_iter().map(Into::into).collect())
    }
}

macro_rules! impl_filter_value_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for FilterValue {
                fn from(value: $t) -> Self {
                    FilterValue::One(value.into())
                }
            }
        )*
    };
}

impl_filter_value_from!(
    Value, Integer, U256, Address, bool, String, &str, Vec<u8>, &[u8], u8, u16, u32, u64, u128,
    usize, i8, i16, i32, i64, i128,
);

/// Topic filter for log queries: one entry per topic position.
///
/// `None` matches any topic; `Some(values)` matches any of the values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventFilter {
    topics: Vec<Option<Vec<H256>>>,
}

impl EventFilter {
    /// Topic positions, trailing wildcards trimmed
    pub fn topics(&self) -> &[Option<Vec<H256>>] {
        &self.topics
    }

    /// Consume into topic positions
    pub fn into_topics(self) -> Vec<Option<Vec<H256>>> {
        self.topics
    }

    /// Whether a log's topics satisfy the filter
    pub fn matches(&self, topics: &[H256]) -> bool {
        self.topics.iter().enumerate().all(|(i, wanted)| match wanted {
            None => true,
            Some(values) => topics.get(i).map_or(false, |t| values.contains(t)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::Type;

    fn address(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn address_word(address: &Address) -> H256 {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_bytes());
        H256::from(word)
    }

    fn transfer() -> Event {
        Event::new(
            "Transfer",
            Fields::named([
                ("from", Type::address()),
                ("to", Type::address()),
                ("value", Type::uint(256).unwrap()),
            ])
            .unwrap(),
            ["from", "to"],
            false,
        )
        .unwrap()
    }

    // ==================== Construction ====================

    #[test]
    fn test_transfer_topic() {
        assert_eq!(
            transfer().topic().to_hex(),
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_too_many_indexed_fields() {
        let fields = Fields::named([
            ("a", Type::bool()),
            ("b", Type::bool()),
            ("c", Type::bool()),
            ("d", Type::bool()),
            ("e", Type::bool()),
        ])
        .unwrap();

        let err = Event::new("E", fields.clone(), ["a", "b", "c", "d"], false).unwrap_err();
        assert!(err.to_string().contains("Non-anonymous events can have at most 3 indexed fields"));
        assert!(Event::new("E", fields.clone(), ["a", "b", "c", "d"], true).is_ok());

        let err = Event::new("E", fields, ["a", "b", "c", "d", "e"], true).unwrap_err();
        assert!(err.to_string().contains("Anonymous events can have at most 4 indexed fields"));
    }

    #[test]
    fn test_unknown_indexed_field() {
        let fields = Fields::named([("a", Type::bool())]).unwrap();
        assert!(Event::new("E", fields, ["b"], false).is_err());
    }

    #[test]
    fn test_event_display() {
        let event = Event::new(
            "Foo",
            Fields::named([
                ("from", Type::address()),
                ("foo", Type::dynamic_bytes()),
                ("bar", Type::uint(8).unwrap()),
            ])
            .unwrap(),
            ["from", "foo"],
            true,
        )
        .unwrap();
        assert_eq!(
            event.to_string(),
            "event Foo(address indexed from, bytes indexed foo, uint8 bar) anonymous"
        );
    }

    // ==================== Filters ====================

    #[test]
    fn test_filter_trims_trailing_wildcards() {
        let event = transfer();
        let from = address(1);
        let filter = event.filter(&Args::new().kwarg("from", from)).unwrap();
        assert_eq!(
            filter.topics(),
            &[Some(vec![event.topic()]), Some(vec![address_word(&from)])]
        );

        let filter = event.filter(&Args::new()).unwrap();
        assert_eq!(filter.topics(), &[Some(vec![event.topic()])]);
    }

    #[test]
    fn test_filter_wildcard_and_either() {
        let event = transfer();
        let filter = event
            .filter(&Args::new().kwarg("to", FilterValue::either([address(2), address(3)])))
            .unwrap();
        assert_eq!(
            filter.topics(),
            &[
                Some(vec![event.topic()]),
                None,
                Some(vec![address_word(&address(2)), address_word(&address(3))]),
            ]
        );
        assert!(filter.matches(&[event.topic(), H256::ZERO, address_word(&address(3))]));
        assert!(!filter.matches(&[event.topic(), H256::ZERO, address_word(&address(4))]));
    }

    #[test]
    fn test_filter_rejects_data_field() {
        let err = transfer().filter(&Args::new().kwarg("value", 1u8)).unwrap_err();
        assert!(err.to_string().contains("unexpected keyword argument 'value'"));
    }

    #[test]
    fn test_anonymous_filter_has_no_selector_topic() {
        let event = Event::new(
            "E",
            Fields::named([("a", Type::uint(8).unwrap())]).unwrap(),
            ["a"],
            true,
        )
        .unwrap();
        let filter = event.filter(&Args::new().arg(1u8)).unwrap();
        let mut word = [0u8; 32];
        word[31] = 1;
        assert_eq!(filter.topics(), &[Some(vec![H256::from(word)])]);
    }

    // ==================== Log decoding ====================

    #[test]
    fn test_decode_log_entry() {
        let event = transfer();
        let mut data = vec![0u8; 32];
        data[31] = 100;
        let entry = LogEntry::new(
            address(9),
            vec![event.topic(), address_word(&address(1)), address_word(&address(2))],
            data,
        );

        let values = event.decode_log_entry(&entry).unwrap();
        assert_eq!(values["from"], Some(Value::Address(address(1))));
        assert_eq!(values["to"], Some(Value::Address(address(2))));
        assert_eq!(values["value"], Some(Value::from(100u8)));
    }

    #[test]
    fn test_decode_hashed_topic_is_none() {
        let event = Event::new(
            "Named",
            Fields::named([("name", Type::string()), ("id", Type::uint(8).unwrap())]).unwrap(),
            ["name"],
            false,
        )
        .unwrap();
        let hashed = Type::string().encode_to_topic(&Value::from("alice")).unwrap();
        let mut data = vec![0u8; 32];
        data[31] = 7;
        let entry = LogEntry::new(address(9), vec![event.topic(), hashed], data);

        let values = event.decode_log_entry(&entry).unwrap();
        assert_eq!(values["name"], None);
        assert_eq!(values["id"], Some(Value::from(7u8)));
    }

    #[test]
    fn test_decode_topic_mismatch() {
        let event = transfer();
        let entry = LogEntry::new(address(9), vec![event.topic()], vec![0u8; 32]);
        match event.decode_log_entry(&entry).unwrap_err() {
            AbiError::Decode { source, .. } => {
                assert_eq!(source, DecodeError::TopicCount { expected: 2, got: 0 })
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let entry = LogEntry::new(
            address(9),
            vec![H256::ZERO, H256::ZERO, H256::ZERO],
            vec![0u8; 32],
        );
        match event.decode_log_entry(&entry).unwrap_err() {
            AbiError::Decode { source, .. } => assert_eq!(source, DecodeError::ForeignEvent),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
