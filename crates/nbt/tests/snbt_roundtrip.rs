//! Property tests: `pack(unpack(s))` is stable for generated trees.

use mapshift_nbt::{Compound, Number, Tag, pack, unpack};
use proptest::prelude::*;

fn leaf() -> impl Strategy<Value = Tag> {
    prop_oneof![
        any::<i8>().prop_map(|v| Tag::byte(v.into())),
        any::<i16>().prop_map(|v| Tag::short(v.into())),
        any::<i32>().prop_map(|v| Tag::int(v.into())),
        any::<i64>().prop_map(|v| Tag::Number(Number::long(v))),
        (-1.0e6f64..1.0e6).prop_map(Tag::double),
        (-1.0e3f64..1.0e3).prop_map(Tag::float),
        "[a-zA-Z0-9 _:.\"'\\\\-]{0,12}".prop_map(Tag::String),
        "[a-z]{1,6}".prop_map(Tag::Macro),
        prop::collection::vec(any::<i32>(), 0..4).prop_map(Tag::IntArray),
        prop::collection::vec(any::<i64>(), 0..4).prop_map(Tag::LongArray),
        prop::collection::vec(any::<i8>(), 0..4).prop_map(Tag::ByteArray),
    ]
}

fn tree() -> impl Strategy<Value = Tag> {
    leaf().prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Tag::list),
            prop::collection::vec(("[A-Za-z_][A-Za-z0-9_ ]{0,7}", inner), 0..5).prop_map(|entries| {
                let mut map = Compound::new();
                for (k, v) in entries {
                    map.insert(k, v);
                }
                Tag::Compound(map)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn pack_then_unpack_is_identity(tag in tree()) {
        let text = pack(&tag);
        let back = unpack(&text).expect("packed SNBT must parse");
        prop_assert_eq!(&back, &tag);
        prop_assert_eq!(pack(&back), text);
    }
}

#[test]
fn handwritten_snbt_round_trips_modulo_normalizations() {
    let cases = [
        (r#"{id:"minecraft:stone",Count:1b}"#, r#"{id:"minecraft:stone",Count:1b}"#),
        ("{Count:1B,Damage:3S}", "{Count:1b,Damage:3s}"),
        ("[1,\"a\"]", r#"[{"":1},{"":"a"}]"#),
        ("{display:{Name:'{\"text\":\"x\"}'}}", r#"{display:{Name:"{\"text\":\"x\"}"}}"#),
        ("{a:[I;1,2],b:[]}", "{a:[I;1,2],b:[]}"),
    ];
    for (input, expected) in cases {
        assert_eq!(pack(&unpack(input).unwrap()), expected, "input: {input}");
    }
}
