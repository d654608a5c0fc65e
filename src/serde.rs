//! `serde` support.
//!
//! A map is written as the tuple `(load_factor, default_return_value,
//! entries)`, where `entries` is a sequence of `(key, value)` pairs in
//! iteration order. A set is written as `(load_factor, keys)`. Reading sizes
//! the table for the sequence length at the stored load factor and
//! reinserts every entry, so the rebuilt collection grows, shrinks and
//! answers absent keys the same way as the one that was written.

use core::fmt;
use core::marker::PhantomData;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::DeserializeSeed;
use serde::de::Error as _;
use serde::de::SeqAccess;
use serde::de::Visitor;
use serde::ser::SerializeSeq;
use serde::ser::SerializeTuple;

use crate::hash_map::HashMap;
use crate::hash_set::HashSet;
use crate::strategy::KeyHasher;
use crate::strategy::PrimitiveKey;

struct MapEntries<'a, K, V, S>(&'a HashMap<K, V, S>);

impl<K, V, S> Serialize for MapEntries<'_, K, V, S>
where
    K: PrimitiveKey + Serialize,
    V: Default + Serialize,
    S: KeyHasher<K>,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for (k, v) in self.0.iter() {
            seq.serialize_element(&(k, v))?;
        }
        seq.end()
    }
}

impl<K, V, S> Serialize for HashMap<K, V, S>
where
    K: PrimitiveKey + Serialize,
    V: Default + Serialize,
    S: KeyHasher<K>,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.load_factor())?;
        tuple.serialize_element(self.default_return_value())?;
        tuple.serialize_element(&MapEntries(self))?;
        tuple.end()
    }
}

/// Reads the entry sequence into a map built for `load_factor`.
struct MapEntriesSeed<K, V, S> {
    load_factor: f32,
    marker: PhantomData<(K, V, S)>,
}

impl<'de, K, V, S> DeserializeSeed<'de> for MapEntriesSeed<K, V, S>
where
    K: PrimitiveKey + Deserialize<'de>,
    V: Default + Deserialize<'de>,
    S: KeyHasher<K> + Default,
{
    type Value = HashMap<K, V, S>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, K, V, S> Visitor<'de> for MapEntriesSeed<K, V, S>
where
    K: PrimitiveKey + Deserialize<'de>,
    V: Default + Deserialize<'de>,
    S: KeyHasher<K> + Default,
{
    type Value = HashMap<K, V, S>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a sequence of (key, value) pairs")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let expected = seq.size_hint().unwrap_or(0);
        let mut map = HashMap::with_capacity_and_load_factor(expected, self.load_factor)
            .map_err(A::Error::custom)?;
        while let Some((k, v)) = seq.next_element::<(K, V)>()? {
            map.try_insert(k, v).map_err(A::Error::custom)?;
        }
        Ok(map)
    }
}

impl<'de, K, V, S> Deserialize<'de> for HashMap<K, V, S>
where
    K: PrimitiveKey + Deserialize<'de>,
    V: Default + Deserialize<'de>,
    S: KeyHasher<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct MapVisitor<K, V, S>(PhantomData<(K, V, S)>);

        impl<'de, K, V, S> Visitor<'de> for MapVisitor<K, V, S>
        where
            K: PrimitiveKey + Deserialize<'de>,
            V: Default + Deserialize<'de>,
            S: KeyHasher<K> + Default,
        {
            type Value = HashMap<K, V, S>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a (load factor, default value, entries) tuple")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let load_factor: f32 = seq
                    .next_element()?
                    .ok_or_else(|| A::Error::invalid_length(0, &self))?;
                let default_return_value: V = seq
                    .next_element()?
                    .ok_or_else(|| A::Error::invalid_length(1, &self))?;
                let mut map = seq
                    .next_element_seed(MapEntriesSeed {
                        load_factor,
                        marker: PhantomData,
                    })?
                    .ok_or_else(|| A::Error::invalid_length(2, &self))?;
                map.set_default_return_value(default_return_value);
                Ok(map)
            }
        }

        deserializer.deserialize_tuple(3, MapVisitor(PhantomData))
    }
}

struct SetKeys<'a, K, S>(&'a HashSet<K, S>);

impl<K, S> Serialize for SetKeys<'_, K, S>
where
    K: PrimitiveKey + Serialize,
    S: KeyHasher<K>,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for k in self.0.iter() {
            seq.serialize_element(&k)?;
        }
        seq.end()
    }
}

impl<K, S> Serialize for HashSet<K, S>
where
    K: PrimitiveKey + Serialize,
    S: KeyHasher<K>,
{
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.load_factor())?;
        tuple.serialize_element(&SetKeys(self))?;
        tuple.end()
    }
}

/// Reads the key sequence into a set built for `load_factor`.
struct SetKeysSeed<K, S> {
    load_factor: f32,
    marker: PhantomData<(K, S)>,
}

impl<'de, K, S> DeserializeSeed<'de> for SetKeysSeed<K, S>
where
    K: PrimitiveKey + Deserialize<'de>,
    S: KeyHasher<K> + Default,
{
    type Value = HashSet<K, S>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, K, S> Visitor<'de> for SetKeysSeed<K, S>
where
    K: PrimitiveKey + Deserialize<'de>,
    S: KeyHasher<K> + Default,
{
    type Value = HashSet<K, S>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a sequence of keys")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let expected = seq.size_hint().unwrap_or(0);
        let mut set = HashSet::with_capacity_and_load_factor(expected, self.load_factor)
            .map_err(A::Error::custom)?;
        while let Some(k) = seq.next_element::<K>()? {
            set.try_insert(k).map_err(A::Error::custom)?;
        }
        Ok(set)
    }
}

impl<'de, K, S> Deserialize<'de> for HashSet<K, S>
where
    K: PrimitiveKey + Deserialize<'de>,
    S: KeyHasher<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SetVisitor<K, S>(PhantomData<(K, S)>);

        impl<'de, K, S> Visitor<'de> for SetVisitor<K, S>
        where
            K: PrimitiveKey + Deserialize<'de>,
            S: KeyHasher<K> + Default,
        {
            type Value = HashSet<K, S>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a (load factor, keys) tuple")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let load_factor: f32 = seq
                    .next_element()?
                    .ok_or_else(|| A::Error::invalid_length(0, &self))?;
                seq.next_element_seed(SetKeysSeed {
                    load_factor,
                    marker: PhantomData,
                })?
                .ok_or_else(|| A::Error::invalid_length(1, &self))
            }
        }

        deserializer.deserialize_tuple(2, SetVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::*;
    use crate::hash_table::array_size;

    #[test]
    fn map_round_trips_through_json() {
        let mut map: HashMap<i32, String> = HashMap::new();
        map.insert(0, "zero".into());
        map.insert(-7, "minus seven".into());
        map.insert(1 << 20, "big".into());

        let json = serde_json::to_string(&map).unwrap();
        let back: HashMap<i32, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);

        // The zero key is written first.
        assert!(json.starts_with("[0.75,\"\",[[0,\"zero\"]"), "{json}");
    }

    #[test]
    fn layout_is_config_then_pairs() {
        let map: HashMap<u8, u16> = [(1, 100)].into_iter().collect();
        let value = serde_json::to_value(&map).unwrap();
        assert_eq!(value, serde_json::json!([0.75, 0, [[1, 100]]]));

        let bytes = bincode::serialize(&map).unwrap();
        // f32 load factor, u16 default value, u64 length prefix, then the
        // key byte and the little-endian value.
        assert_eq!(
            bytes,
            [0, 0, 64, 63, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 100, 0]
        );

        let set: HashSet<u8> = [7].into_iter().collect();
        let value = serde_json::to_value(&set).unwrap();
        assert_eq!(value, serde_json::json!([0.75, [7]]));
    }

    #[test]
    fn map_keeps_load_factor_and_default_value() {
        let mut map: HashMap<u32, i64> = HashMap::with_capacity_and_load_factor(4, 0.25).unwrap();
        map.set_default_return_value(-1);
        for k in 1..=5 {
            map.insert(k, k as i64 * 10);
        }

        let bytes = bincode::serialize(&map).unwrap();
        let back: HashMap<u32, i64> = bincode::deserialize(&bytes).unwrap();

        assert_eq!(back, map);
        assert_eq!(back.load_factor(), 0.25);
        assert_eq!(*back.default_return_value(), -1);
        assert_eq!(back.get_value(99), -1);
        assert_eq!(back.table().slot_count(), array_size(5, 0.25).unwrap());

        let json = serde_json::to_string(&map).unwrap();
        let back: HashMap<u32, i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.load_factor(), 0.25);
        assert_eq!(back.get_value(99), -1);
    }

    #[test]
    fn set_keeps_load_factor() {
        let mut set: HashSet<f64> = HashSet::with_capacity_and_load_factor(0, 0.5).unwrap();
        set.extend([0.0, -0.0, 1.5, f64::NAN]);

        let bytes = bincode::serialize(&set).unwrap();
        let back: HashSet<f64> = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back.len(), 4);
        assert_eq!(back, set);
        assert_eq!(back.load_factor(), 0.5);
        assert_eq!(back.table().slot_count(), array_size(4, 0.5).unwrap());
    }

    #[test]
    fn duplicate_keys_keep_the_last_value() {
        let map: HashMap<u32, u32> = serde_json::from_str("[0.75,0,[[1,1],[2,2],[1,3]]]").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(1), Some(&3));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(serde_json::from_str::<HashSet<u8>>("[0.75,[1,300]]").is_err());
        assert!(serde_json::from_str::<HashSet<u8>>("[1,2]").is_err());
        assert!(serde_json::from_str::<HashSet<u8>>("[1.5,[1]]").is_err());
        assert!(serde_json::from_str::<HashMap<u8, u8>>("{\"1\": 2}").is_err());
        assert!(serde_json::from_str::<HashMap<u8, u8>>("[0.75,0]").is_err());
        let empty: Vec<u8> = serde_json::from_str::<HashSet<u8>>("[0.75,[]]")
            .unwrap()
            .into_iter()
            .collect();
        assert!(empty.is_empty());
    }

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Postings {
        name: String,
        counts: HashMap<u32, u32>,
        seen: HashSet<u64>,
    }

    #[test]
    fn nests_in_derived_types() {
        let mut counts: HashMap<u32, u32> = HashMap::with_capacity_and_load_factor(8, 0.5).unwrap();
        counts.set_default_return_value(u32::MAX);
        counts.insert(3, 30);
        counts.insert(0, 1);
        let postings = Postings {
            name: "terms".into(),
            counts,
            seen: [0, 9, u64::MAX].into_iter().collect(),
        };

        let json = serde_json::to_string(&postings).unwrap();
        let back: Postings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, postings);
        assert_eq!(back.counts.get_value(5), u32::MAX);
        assert_eq!(back.counts.load_factor(), 0.5);
    }
}
