//! serde adapters that apply a [`NamingStrategy`] to struct field names.
//!
//! Only names coming from `serialize_struct`/`deserialize_struct` (and struct
//! variants) are touched. Map keys, enum variants and field names that are
//! not snake_case pass through as they are.

use serde::de::{
    self, DeserializeSeed, Deserializer, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};
use serde::ser::{self, Serialize, Serializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::NamingStrategy;

type Fields = &'static [&'static str];

/// Serialize `value` into a tree with struct fields in their wire spelling.
pub(crate) fn to_value<T>(value: &T, naming: NamingStrategy) -> serde_json::Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(RenameSerializer { naming })
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct RenameSerializer {
    naming: NamingStrategy,
}

impl RenameSerializer {
    fn tree<T: ?Sized + Serialize>(self, value: &T) -> serde_json::Result<Value> {
        value.serialize(self)
    }
}

/// Map keys follow serde_json's rules: strings as is, numbers and booleans
/// as their text.
fn map_key<T: ?Sized + Serialize>(key: &T) -> serde_json::Result<String> {
    match key.serialize(serde_json::value::Serializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ser::Error::custom("key must be a string")),
    }
}

macro_rules! delegate_primitive {
    ($($method:ident($ty:ty))*) => {$(
        fn $method(self, v: $ty) -> serde_json::Result<Value> {
            serde_json::value::Serializer.$method(v)
        }
    )*};
}

impl Serializer for RenameSerializer {
    type Ok = Value;
    type Error = serde_json::Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeObject;
    type SerializeStruct = SerializeObject;
    type SerializeStructVariant = SerializeStructVariant;

    delegate_primitive! {
        serialize_bool(bool)
        serialize_i8(i8)
        serialize_i16(i16)
        serialize_i32(i32)
        serialize_i64(i64)
        serialize_i128(i128)
        serialize_u8(u8)
        serialize_u16(u16)
        serialize_u32(u32)
        serialize_u64(u64)
        serialize_u128(u128)
        serialize_f32(f32)
        serialize_f64(f64)
        serialize_char(char)
        serialize_str(&str)
        serialize_bytes(&[u8])
    }

    fn serialize_none(self) -> serde_json::Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> serde_json::Result<Value> {
        self.tree(value)
    }

    fn serialize_unit(self) -> serde_json::Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> serde_json::Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> serde_json::Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> serde_json::Result<Value> {
        self.tree(value)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> serde_json::Result<Value> {
        let mut object = Map::new();
        object.insert(variant.to_string(), self.tree(value)?);
        Ok(Value::Object(object))
    }

    fn serialize_seq(self, len: Option<usize>) -> serde_json::Result<SerializeVec> {
        Ok(SerializeVec {
            items: Vec::with_capacity(len.unwrap_or(0)),
            ser: self,
        })
    }

    fn serialize_tuple(self, len: usize) -> serde_json::Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> serde_json::Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> serde_json::Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
            ser: self,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> serde_json::Result<SerializeObject> {
        Ok(SerializeObject {
            members: Map::new(),
            next_key: None,
            ser: self,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> serde_json::Result<SerializeObject> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        _len: usize,
    ) -> serde_json::Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            variant,
            members: Map::new(),
            ser: self,
        })
    }
}

struct SerializeVec {
    items: Vec<Value>,
    ser: RenameSerializer,
}

impl SerializeVec {
    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        self.items.push(self.ser.tree(value)?);
        Ok(())
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        self.push(value)
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        self.push(value)
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        self.push(value)
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Array(self.items))
    }
}

struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<Value>,
    ser: RenameSerializer,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        self.items.push(self.ser.tree(value)?);
        Ok(())
    }

    fn end(self) -> serde_json::Result<Value> {
        let mut object = Map::new();
        object.insert(self.variant.to_string(), Value::Array(self.items));
        Ok(Value::Object(object))
    }
}

struct SerializeObject {
    members: Map<String, Value>,
    next_key: Option<String>,
    ser: RenameSerializer,
}

impl ser::SerializeMap for SerializeObject {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> serde_json::Result<()> {
        self.next_key = Some(map_key(key)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> serde_json::Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| ser::Error::custom("map value without a key"))?;
        self.members.insert(key, self.ser.tree(value)?);
        Ok(())
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Object(self.members))
    }
}

impl ser::SerializeStruct for SerializeObject {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> serde_json::Result<()> {
        let name = self.ser.naming.field_to_wire(key).into_owned();
        self.members.insert(name, self.ser.tree(value)?);
        Ok(())
    }

    fn end(self) -> serde_json::Result<Value> {
        Ok(Value::Object(self.members))
    }
}

struct SerializeStructVariant {
    variant: &'static str,
    members: Map<String, Value>,
    ser: RenameSerializer,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = serde_json::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> serde_json::Result<()> {
        let name = self.ser.naming.field_to_wire(key).into_owned();
        self.members.insert(name, self.ser.tree(value)?);
        Ok(())
    }

    fn end(self) -> serde_json::Result<Value> {
        let mut object = Map::new();
        object.insert(self.variant.to_string(), Value::Object(self.members));
        Ok(Value::Object(object))
    }
}

// ---------------------------------------------------------------------------
// Deserialization
// ---------------------------------------------------------------------------

/// Wraps any deserializer so struct fields are matched by their wire spelling.
///
/// Keys are read from the wrapped deserializer before they are translated,
/// so anything tracking paths underneath sees the names of the document.
pub(crate) struct RenameDeserializer<D> {
    de: D,
    naming: NamingStrategy,
}

impl<D> RenameDeserializer<D> {
    pub(crate) fn new(de: D, naming: NamingStrategy) -> Self {
        Self { de, naming }
    }
}

macro_rules! forward_deserialize {
    ($($method:ident)*) => {$(
        fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, D::Error> {
            self.de.$method(RenameVisitor::new(visitor, self.naming, None))
        }
    )*};
}

impl<'de, D> Deserializer<'de> for RenameDeserializer<D>
where
    D: Deserializer<'de>,
{
    type Error = D::Error;

    forward_deserialize! {
        deserialize_any
        deserialize_bool
        deserialize_i8
        deserialize_i16
        deserialize_i32
        deserialize_i64
        deserialize_i128
        deserialize_u8
        deserialize_u16
        deserialize_u32
        deserialize_u64
        deserialize_u128
        deserialize_f32
        deserialize_f64
        deserialize_char
        deserialize_str
        deserialize_string
        deserialize_bytes
        deserialize_byte_buf
        deserialize_option
        deserialize_unit
        deserialize_seq
        deserialize_map
        deserialize_identifier
        deserialize_ignored_any
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.de
            .deserialize_unit_struct(name, RenameVisitor::new(visitor, self.naming, None))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.de
            .deserialize_newtype_struct(name, RenameVisitor::new(visitor, self.naming, None))
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.de
            .deserialize_tuple(len, RenameVisitor::new(visitor, self.naming, None))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.de
            .deserialize_tuple_struct(name, len, RenameVisitor::new(visitor, self.naming, None))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: Fields,
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.de.deserialize_struct(
            name,
            fields,
            RenameVisitor::new(visitor, self.naming, Some(fields)),
        )
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, D::Error> {
        self.de
            .deserialize_enum(name, variants, RenameVisitor::new(visitor, self.naming, None))
    }

    fn is_human_readable(&self) -> bool {
        self.de.is_human_readable()
    }
}

struct RenameVisitor<V> {
    visitor: V,
    naming: NamingStrategy,
    fields: Option<Fields>,
}

impl<V> RenameVisitor<V> {
    fn new(visitor: V, naming: NamingStrategy, fields: Option<Fields>) -> Self {
        Self {
            visitor,
            naming,
            fields,
        }
    }
}

macro_rules! forward_visit {
    ($($method:ident($ty:ty))*) => {$(
        fn $method<E: de::Error>(self, v: $ty) -> Result<V::Value, E> {
            self.visitor.$method(v)
        }
    )*};
}

impl<'de, V> Visitor<'de> for RenameVisitor<V>
where
    V: Visitor<'de>,
{
    type Value = V::Value;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.visitor.expecting(f)
    }

    forward_visit! {
        visit_bool(bool)
        visit_i8(i8)
        visit_i16(i16)
        visit_i32(i32)
        visit_i64(i64)
        visit_i128(i128)
        visit_u8(u8)
        visit_u16(u16)
        visit_u32(u32)
        visit_u64(u64)
        visit_u128(u128)
        visit_f32(f32)
        visit_f64(f64)
        visit_char(char)
        visit_str(&str)
        visit_borrowed_str(&'de str)
        visit_string(String)
        visit_bytes(&[u8])
        visit_borrowed_bytes(&'de [u8])
        visit_byte_buf(Vec<u8>)
    }

    fn visit_none<E: de::Error>(self) -> Result<V::Value, E> {
        self.visitor.visit_none()
    }

    fn visit_unit<E: de::Error>(self) -> Result<V::Value, E> {
        self.visitor.visit_unit()
    }

    fn visit_some<D2: Deserializer<'de>>(self, de: D2) -> Result<V::Value, D2::Error> {
        self.visitor
            .visit_some(RenameDeserializer::new(de, self.naming))
    }

    fn visit_newtype_struct<D2: Deserializer<'de>>(self, de: D2) -> Result<V::Value, D2::Error> {
        self.visitor
            .visit_newtype_struct(RenameDeserializer::new(de, self.naming))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<V::Value, A::Error> {
        self.visitor.visit_seq(RenameSeq {
            seq,
            naming: self.naming,
        })
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<V::Value, A::Error> {
        self.visitor.visit_map(RenameMap {
            map,
            naming: self.naming,
            fields: self.fields,
        })
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<V::Value, A::Error> {
        self.visitor.visit_enum(RenameEnum {
            data,
            naming: self.naming,
        })
    }
}

struct RenameSeed<S> {
    seed: S,
    naming: NamingStrategy,
}

impl<'de, S> DeserializeSeed<'de> for RenameSeed<S>
where
    S: DeserializeSeed<'de>,
{
    type Value = S::Value;

    fn deserialize<D: Deserializer<'de>>(self, de: D) -> Result<S::Value, D::Error> {
        self.seed.deserialize(RenameDeserializer::new(de, self.naming))
    }
}

/// Struct field key: read as written, then matched against the field list.
struct FieldSeed<K> {
    seed: K,
    naming: NamingStrategy,
    fields: Fields,
}

impl<'de, K> DeserializeSeed<'de> for FieldSeed<K>
where
    K: DeserializeSeed<'de>,
{
    type Value = K::Value;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<K::Value, D::Error> {
        let key = String::deserialize(deserializer)?;
        match self.naming.field_from_wire(&key, self.fields) {
            Some(field) => {
                let field: de::value::StrDeserializer<'_, D::Error> = field.into_deserializer();
                self.seed.deserialize(field)
            }
            None => {
                let key: de::value::StringDeserializer<D::Error> = key.into_deserializer();
                self.seed.deserialize(key)
            }
        }
    }
}

struct RenameSeq<A> {
    seq: A,
    naming: NamingStrategy,
}

impl<'de, A> SeqAccess<'de> for RenameSeq<A>
where
    A: SeqAccess<'de>,
{
    type Error = A::Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, A::Error> {
        self.seq.next_element_seed(RenameSeed {
            seed,
            naming: self.naming,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        self.seq.size_hint()
    }
}

struct RenameMap<A> {
    map: A,
    naming: NamingStrategy,
    fields: Option<Fields>,
}

impl<'de, A> MapAccess<'de> for RenameMap<A>
where
    A: MapAccess<'de>,
{
    type Error = A::Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, A::Error> {
        match self.fields {
            Some(fields) => self.map.next_key_seed(FieldSeed {
                seed,
                naming: self.naming,
                fields,
            }),
            None => self.map.next_key_seed(seed),
        }
    }

    fn next_value_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<T::Value, A::Error> {
        self.map.next_value_seed(RenameSeed {
            seed,
            naming: self.naming,
        })
    }

    fn size_hint(&self) -> Option<usize> {
        self.map.size_hint()
    }
}

struct RenameEnum<A> {
    data: A,
    naming: NamingStrategy,
}

impl<'de, A> EnumAccess<'de> for RenameEnum<A>
where
    A: EnumAccess<'de>,
{
    type Error = A::Error;
    type Variant = RenameVariant<A::Variant>;

    fn variant_seed<S: DeserializeSeed<'de>>(
        self,
        seed: S,
    ) -> Result<(S::Value, Self::Variant), A::Error> {
        let (value, variant) = self.data.variant_seed(seed)?;
        Ok((
            value,
            RenameVariant {
                variant,
                naming: self.naming,
            },
        ))
    }
}

struct RenameVariant<A> {
    variant: A,
    naming: NamingStrategy,
}

impl<'de, A> VariantAccess<'de> for RenameVariant<A>
where
    A: VariantAccess<'de>,
{
    type Error = A::Error;

    fn unit_variant(self) -> Result<(), A::Error> {
        self.variant.unit_variant()
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, A::Error> {
        self.variant.newtype_variant_seed(RenameSeed {
            seed,
            naming: self.naming,
        })
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, A::Error> {
        self.variant
            .tuple_variant(len, RenameVisitor::new(visitor, self.naming, None))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        fields: Fields,
        visitor: V,
    ) -> Result<V::Value, A::Error> {
        self.variant
            .struct_variant(fields, RenameVisitor::new(visitor, self.naming, Some(fields)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Account {
        #[serde(rename = "ID")]
        id: String,
        display_name: String,
        labels: BTreeMap<String, u32>,
        plan: Plan,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Plan {
        Free,
        Paid { seat_count: u32 },
    }

    fn account() -> Account {
        Account {
            id: "x".into(),
            display_name: "Ada".into(),
            labels: BTreeMap::from([("en_US".into(), 2), ("Foo".into(), 1)]),
            plan: Plan::Paid { seat_count: 3 },
        }
    }

    fn from_value<T: DeserializeOwned>(value: &Value, naming: NamingStrategy) -> T {
        T::deserialize(RenameDeserializer::new(value, naming)).unwrap()
    }

    #[test]
    fn only_struct_fields_are_renamed() {
        let tree = to_value(&account(), NamingStrategy::CamelCase).unwrap();
        assert_eq!(
            tree,
            json!({
                "ID": "x",
                "displayName": "Ada",
                "labels": {"Foo": 1, "en_US": 2},
                "plan": {"Paid": {"seatCount": 3}}
            })
        );
    }

    #[test]
    fn wire_names_map_back_to_fields() {
        for naming in [
            NamingStrategy::CamelCase,
            NamingStrategy::PascalCase,
            NamingStrategy::KebabCase,
            NamingStrategy::ScreamingSnakeCase,
        ] {
            let tree = to_value(&account(), naming).unwrap();
            let back: Account = from_value(&tree, naming);
            assert_eq!(back, account(), "{:?}", naming);
        }
    }

    #[test]
    fn unit_variants_and_options_pass_through() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Holder {
            current_plan: Option<Plan>,
            past_plans: Vec<Plan>,
        }

        let holder = Holder {
            current_plan: None,
            past_plans: vec![Plan::Free],
        };
        let tree = to_value(&holder, NamingStrategy::KebabCase).unwrap();
        assert_eq!(tree, json!({"current-plan": null, "past-plans": ["Free"]}));
        let back: Holder = from_value(&tree, NamingStrategy::KebabCase);
        assert_eq!(back, holder);
    }

    #[test]
    fn numeric_map_keys_are_written_as_text() {
        let map = BTreeMap::from([(1u32, "one")]);
        let tree = to_value(&map, NamingStrategy::CamelCase).unwrap();
        assert_eq!(tree, json!({"1": "one"}));
    }
}
