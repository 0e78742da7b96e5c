//! Integration tests for descriptor-driven PDU encoding and decoding

use bytes::Bytes;
use proptest::prelude::*;

use crate::codec::{decode, encode};
use crate::syntax::{StrFormat, Syntax};
use crate::value::Value;

/// A submit_multi-shaped descriptor: header constants, scalar body fields,
/// and a count-prefixed destination list of anonymous composites.
fn submit_multi() -> Syntax {
    let dest_address = Syntax::composite(vec![
        Syntax::integer(1, 0, 6),                      // dest_addr_ton
        Syntax::integer(1, 0, 18),                     // dest_addr_npi
        Syntax::cstring(false, 21, StrFormat::Free),   // destination_addr
    ]);
    Syntax::record(
        "submit_multi",
        vec![
            Syntax::constant(&b"\x00\x00\x00\x21"[..]), // command_id
            Syntax::integer(4, 1, 0x7FFF_FFFF),         // sequence_number
            Syntax::cstring(false, 6, StrFormat::Free), // service_type
            Syntax::list(dest_address, 254),            // dest_addresses
        ],
    )
}

fn cancel_sm() -> Syntax {
    Syntax::record(
        "cancel_sm",
        vec![
            Syntax::constant(&b"\x00\x00\x00\x08"[..]), // command_id
            Syntax::integer(4, 1, 0x7FFF_FFFF),         // sequence_number
            Syntax::cstring(false, 6, StrFormat::Free), // service_type
            Syntax::cstring(false, 65, StrFormat::Free), // message_id
        ],
    )
}

#[test]
fn submit_multi_shaped_roundtrip() {
    let spec = submit_multi();
    let wire = Bytes::from_static(&[
        0x00, 0x00, 0x00, 0x21, // command_id
        0x00, 0x00, 0x00, 0x01, // sequence_number
        0x53, 0x4D, 0x53, 0x00, // service_type "SMS"
        0x02, // number_of_dests
        0x01, 0x01, 0x31, 0x32, 0x33, 0x00, // ton=1 npi=1 addr "123"
        0x02, 0x08, 0x34, 0x35, 0x36, 0x37, 0x00, // ton=2 npi=8 addr "4567"
    ]);

    let (value, rest) = decode(&wire, &spec).unwrap();
    assert!(rest.is_empty());

    let fields = value.fields().unwrap();
    assert_eq!(fields[1], Value::Integer(1));
    assert_eq!(fields[2], Value::bytes(&b"SMS\0"[..]));

    let dests = fields[3].as_list().unwrap();
    assert_eq!(dests.len(), 2);
    assert_eq!(
        dests[1],
        Value::Tuple(vec![
            Value::Integer(2),
            Value::Integer(8),
            Value::bytes(&b"4567\0"[..]),
        ])
    );

    assert_eq!(encode(&value, &spec).unwrap(), wire);
}

#[test]
fn failure_report_pinpoints_inner_field() {
    let spec = submit_multi();
    // Valid header and service_type, one destination whose address never
    // terminates before the input runs out.
    let wire = Bytes::from_static(&[
        0x00, 0x00, 0x00, 0x21, // command_id
        0x00, 0x00, 0x00, 0x01, // sequence_number
        0x00, // service_type (empty)
        0x01, // number_of_dests
        0x01, 0x01, // ton, npi
        0x41, 0x42, 0x43, 0x44, 0x45, // "ABCDE" with no NUL
    ]);

    let err = decode(&wire, &spec).unwrap_err();

    // submit_multi -> dest list -> dest composite -> destination_addr.
    let trail = err.trail();
    assert_eq!(trail.len(), 4);
    assert_eq!(
        err.leaf().spec,
        Syntax::cstring(false, 21, StrFormat::Free)
    );
}

#[test]
fn union_failure_names_the_branch_that_got_furthest() {
    // The command_id matches submit_multi, so its branch error must win
    // over cancel_sm's sentinel rejection no matter the branch order.
    let operations = Syntax::union(vec![cancel_sm(), submit_multi()]);

    let wire = Bytes::from_static(&[
        0x00, 0x00, 0x00, 0x21, // submit_multi command_id
        0x00, 0x00, // truncated sequence_number
    ]);

    let err = decode(&wire, &operations).unwrap_err();
    let branch_err = err.cause().expect("union wraps the branch failure");
    assert_eq!(branch_err.spec, submit_multi());
    assert_eq!(
        branch_err.leaf().spec,
        Syntax::integer(4, 1, 0x7FFF_FFFF)
    );
}

// Generators pairing a descriptor with a value it accepts.

fn arb_constant_pair() -> impl Strategy<Value = (Syntax, Value)> {
    prop::collection::vec(any::<u8>(), 1..6)
        .prop_map(|data| (Syntax::constant(data.clone()), Value::bytes(data)))
}

fn arb_integer_pair() -> impl Strategy<Value = (Syntax, Value)> {
    (1usize..=4).prop_flat_map(|size| {
        let max = if size == 4 {
            u32::MAX
        } else {
            (1u32 << (8 * size as u32)) - 1
        };
        (0..=max).prop_map(move |v| (Syntax::integer(size, 0, max), Value::Integer(v)))
    })
}

fn arb_fixed_cstring_pair() -> impl Strategy<Value = (Syntax, Value)> {
    (2usize..=12).prop_flat_map(|size| {
        prop_oneof![
            Just(vec![0u8]),
            prop::collection::vec(1u8..=255, size - 1).prop_map(|mut content| {
                content.push(0);
                content
            }),
        ]
        .prop_map(move |data| (Syntax::cstring(true, size, StrFormat::Free), Value::bytes(data)))
    })
}

fn arb_var_cstring_pair() -> impl Strategy<Value = (Syntax, Value)> {
    (1usize..=12).prop_flat_map(|size| {
        prop::collection::vec(1u8..=255, 0..size).prop_map(move |mut content| {
            content.push(0);
            (
                Syntax::cstring(false, size, StrFormat::Free),
                Value::bytes(content),
            )
        })
    })
}

fn arb_fixed_octet_pair() -> impl Strategy<Value = (Syntax, Value)> {
    (0usize..=8).prop_flat_map(|size| {
        prop::collection::vec(any::<u8>(), size).prop_map(move |data| {
            (
                Syntax::octet_string(true, size, StrFormat::Free),
                Value::bytes(data),
            )
        })
    })
}

fn arb_scalar_pair() -> impl Strategy<Value = (Syntax, Value)> {
    prop_oneof![
        arb_constant_pair(),
        arb_integer_pair(),
        arb_fixed_cstring_pair(),
        arb_var_cstring_pair(),
        arb_fixed_octet_pair(),
    ]
}

fn arb_list_pair() -> impl Strategy<Value = (Syntax, Value)> {
    (1usize..=300).prop_flat_map(|size| {
        let cap = size.min(6);
        prop::collection::vec(0u32..=255, 0..=cap).prop_map(move |items| {
            (
                Syntax::list(Syntax::integer(1, 0, 255), size),
                Value::List(items.into_iter().map(Value::Integer).collect()),
            )
        })
    })
}

fn arb_composite_pair() -> impl Strategy<Value = (Syntax, Value)> {
    (
        prop::collection::vec(arb_scalar_pair(), 1..4),
        prop::option::of("[a-z]{3,8}"),
    )
        .prop_map(|(pairs, name)| {
            let (specs, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
            match name {
                Some(name) => (
                    Syntax::record(name.clone(), specs),
                    Value::record(name, values),
                ),
                None => (Syntax::composite(specs), Value::Tuple(values)),
            }
        })
}

/// Unions shaped like real PDU choices: each branch fronted by a distinct
/// one-octet discriminator constant, the way command ids disambiguate.
fn arb_union_pair() -> impl Strategy<Value = (Syntax, Value)> {
    (prop::collection::vec(arb_scalar_pair(), 2..=3), 0usize..3).prop_map(|(pairs, pick)| {
        let pick = pick % pairs.len();
        let mut branches = Vec::new();
        let mut chosen = None;
        for (i, (spec, value)) in pairs.into_iter().enumerate() {
            let name = format!("op{i}");
            let discriminator = vec![i as u8 + 1];
            branches.push(Syntax::record(
                name.clone(),
                vec![Syntax::constant(discriminator.clone()), spec],
            ));
            if i == pick {
                chosen = Some(Value::record(
                    name,
                    vec![Value::bytes(discriminator), value],
                ));
            }
        }
        (Syntax::union(branches), chosen.expect("pick is in range"))
    })
}

fn arb_pair() -> impl Strategy<Value = (Syntax, Value)> {
    prop_oneof![
        arb_scalar_pair(),
        arb_list_pair(),
        arb_composite_pair(),
        arb_union_pair(),
    ]
}

proptest! {
    #[test]
    fn round_trip_self_delimiting((spec, value) in arb_pair()) {
        let wire = encode(&value, &spec).unwrap();
        let (decoded, rest) = decode(&wire, &spec).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert!(rest.is_empty());
    }

    #[test]
    fn prefix_preservation(
        (spec, value) in arb_pair(),
        tail in prop::collection::vec(any::<u8>(), 0..8),
    ) {
        // Whatever follows an encoded value comes back untouched as the
        // remainder, and re-encoding the value reproduces the prefix.
        let wire = encode(&value, &spec).unwrap();
        let mut framed = wire.to_vec();
        framed.extend_from_slice(&tail);

        let input = Bytes::from(framed);
        let (decoded, rest) = decode(&input, &spec).unwrap();
        prop_assert_eq!(&decoded, &value);
        prop_assert_eq!(rest.as_ref(), tail.as_slice());
        prop_assert_eq!(encode(&decoded, &spec).unwrap(), wire);
    }

    #[test]
    fn decode_is_total_over_arbitrary_input(
        data in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        // Every outcome is Ok or a TypeMismatch; nothing panics, and a
        // successful decode consumed a prefix of the input.
        let spec = Syntax::union(vec![cancel_sm(), submit_multi()]);
        let input = Bytes::from(data);
        if let Ok((_, rest)) = decode(&input, &spec) {
            prop_assert!(rest.len() <= input.len());
        }
    }

    #[test]
    fn integer_encode_enforces_declared_range(v in 0u32..=1000) {
        let spec = Syntax::integer(2, 100, 500);
        let outcome = encode(&Value::Integer(v), &spec);
        prop_assert_eq!(outcome.is_ok(), (100..=500).contains(&v));
    }

    #[test]
    fn list_bound_gates_encode(count in 0usize..=12) {
        let spec = Syntax::list(Syntax::integer(1, 0, 255), 8);
        let value = Value::List(vec![Value::Integer(7); count]);
        match encode(&value, &spec) {
            Ok(wire) => {
                prop_assert!(count <= 8);
                let (decoded, _) = decode(&wire, &spec).unwrap();
                prop_assert_eq!(decoded.as_list().unwrap().len(), count);
            }
            Err(_) => prop_assert!(count > 8),
        }
    }

    #[test]
    fn union_first_match_is_deterministic(v in 0u32..=255) {
        // Both branches accept any single octet; the earlier one must win
        // every time.
        let spec = Syntax::union(vec![
            Syntax::integer(1, 0, 255),
            Syntax::octet_string(true, 1, StrFormat::Free),
        ]);
        let input = Bytes::from(vec![v as u8]);
        let (decoded, _) = decode(&input, &spec).unwrap();
        prop_assert_eq!(decoded, Value::Integer(v));
    }

    #[test]
    fn deeper_failures_outrank_sentinel_rejections(garbage in any::<u8>()) {
        // One branch always clears its command_id and fails inside the
        // body; every sibling dies on the sentinel. The reported error must
        // carry the deeper branch regardless of what the body held.
        let wire = Bytes::from(vec![0x00, 0x00, 0x00, 0x08, garbage]);
        let operations = Syntax::union(vec![submit_multi(), cancel_sm()]);

        let err = decode(&wire, &operations).unwrap_err();
        let branch_err = err.cause().expect("branch failure is wrapped");
        prop_assert_eq!(&branch_err.spec, &cancel_sm());
    }
}
