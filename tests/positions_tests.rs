//! Registry integration tests.
//!
//! These tests configure the employee registry end to end and check lookup
//! identity, membership and ordering across every position variant.

use std::sync::Arc;
use std::thread;

use positionable::{
    sort_positions, BuildContext, ConfigurationError, Declaration, Keyword, Kind, PatternRule,
    PositionKey, Position, Positions, PositionsConfig, Resolved, Script,
};

/// Employee registry with a custom "value is odd" predicate.
fn employees() -> Positions {
    let mut positions = Positions::new(PositionsConfig::for_owner("Employee"))
        .with_predicate("value is odd", |v| v % 2 != 0);
    positions
        .configure(
            Script::new()
                .number()
                .special(-1, "CEO")
                .special(-2, "CTO")
                .special(-3, "CFO")
                .group(-100, "Executive Team", ["ceo", "cto", "cfo"])
                .declare(
                    Declaration::new("pattern")
                        .arg(-200)
                        .arg("Odd")
                        .arg("value is odd"),
                ),
        )
        .unwrap();
    positions
}

fn get(positions: &Positions, key: impl Into<PositionKey>) -> Arc<Position> {
    positions.position(key).unwrap().unwrap()
}

#[test]
fn test_employee_scenario() {
    let positions = employees();

    assert_eq!(get(&positions, -1).keyword().as_str(), "ceo");
    assert!(get(&positions, "executive_team").includes(-1));
    assert!(!get(&positions, "executive_team").includes(-4));
    assert!(!get(&positions, 3).includes(7));
    assert!(get(&positions, Keyword::number()).includes(7));
    assert!(get(&positions, "odd").includes(7));
    assert!(!get(&positions, "odd").includes(4));
}

/// Value, keyword and instance lookups return the same registered object.
#[test]
fn test_special_lookup_identity() {
    let positions = employees();

    for special in positions.iter().filter(|p| p.kind() == Kind::Special) {
        let by_value = get(&positions, special.value());
        let by_keyword = get(&positions, special.keyword());
        let by_instance = get(&positions, special);

        assert!(Arc::ptr_eq(&by_value, special), "{special}");
        assert!(Arc::ptr_eq(&by_keyword, special), "{special}");
        assert!(Arc::ptr_eq(&by_instance, special), "{special}");
    }
}

#[test]
fn test_nil_and_idempotence() {
    let positions = employees();

    assert!(positions.lookup(None::<i64>).unwrap().is_none());
    assert!(positions.lookup(PositionKey::Nil).unwrap().is_none());

    let team = get(&positions, "executive_team");
    let again = get(&positions, &team);
    assert!(Arc::ptr_eq(&team, &again));

    let three = get(&positions, 3);
    assert_eq!(get(&positions, &three), three);
}

#[test]
fn test_absent_keys_are_not_errors() {
    let positions = employees();

    assert!(positions.position(-4).unwrap().is_none());
    assert!(positions.position("janitor").unwrap().is_none());
    assert!(positions.position(Keyword::new("janitor")).unwrap().is_none());
}

#[test]
fn test_string_keys() {
    let positions = employees();

    assert_eq!(get(&positions, "12").value(), Some(12));
    assert_eq!(get(&positions, "Executive Team").keyword().as_str(), "executive_team");
    assert_eq!(get(&positions, "CEO").value(), Some(-1));
}

#[test]
fn test_group_law() {
    let positions = employees();
    let team = get(&positions, "executive_team");

    for x in -300..300 {
        let expected = x == -100 || team.members().iter().any(|m| m.includes(x));
        assert_eq!(team.includes(x), expected, "candidate {x}");
    }
}

#[test]
fn test_group_over_pattern_member() {
    let positions = Positions::build(
        PositionsConfig::for_owner("Employee"),
        Script::new()
            .number()
            .special(-1, "CEO")
            .pattern(-200, "Odd", PatternRule::Odd)
            .group(-300, "Mixed", ["ceo", "odd"]),
    )
    .unwrap();
    let mixed = get(&positions, "mixed");

    for x in -400..400 {
        let expected = x == -300 || mixed.members().iter().any(|m| m.includes(x));
        assert_eq!(mixed.includes(x), expected, "candidate {x}");
    }
    assert!(mixed.includes(7));
    assert!(!mixed.includes(8));
    assert!(positions.accessors().get("mixed").unwrap().check(Some(9)));
}

#[test]
fn test_group_members_exclude_self() {
    let positions = employees();
    let team = get(&positions, "executive_team");

    let members: Vec<_> = team.members().iter().map(|m| m.keyword().as_str()).collect();
    assert_eq!(members, vec!["ceo", "cto", "cfo"]);
}

#[test]
fn test_group_expansion_cached() {
    let positions = employees();
    let team = get(&positions, "executive_team");

    let first = team.expanded_values().unwrap();
    let second = team.expanded_values().unwrap();
    assert_eq!(first, second);
    assert!(std::ptr::eq(first, second));
}

#[test]
fn test_bind_law() {
    let positions = employees();
    let number = positions.number().unwrap();

    for n in [1, 2, 17, 32767] {
        let bound = number.bind(n).unwrap();
        assert_eq!(bound.value(), Some(n));
        assert!(bound.includes(n));
        assert!(!bound.includes(n + 1));
        assert!(!bound.includes(-1));
    }
    assert!(number.value().is_none());
}

#[test]
fn test_sorting() {
    let positions = employees();
    let mut primitives: Vec<_> = positions
        .iter()
        .filter(|p| p.is_primitive() && !p.is_number())
        .cloned()
        .collect();
    primitives.push(get(&positions, 2));
    primitives.reverse();

    sort_positions(&mut primitives).unwrap();
    let values: Vec<_> = primitives.iter().map(|p| p.to_integer()).collect();
    assert_eq!(values, vec![-3, -2, -1, 2]);

    for complex in positions.iter().filter(|p| p.is_complex()) {
        let err = complex.sort_index().unwrap_err();
        assert_eq!(err.keyword, *complex.keyword());
    }
}

#[test]
fn test_collection_includes() {
    let positions = employees();

    let mixed = positions.collection(["executive_team", "odd"]).unwrap();
    assert!(mixed.includes(-1));
    assert!(mixed.includes(-100));
    assert!(mixed.includes(7));
    assert!(!mixed.includes(4));

    let specials = positions.collection(vec![PositionKey::from(-1), PositionKey::from("cto")]).unwrap();
    assert!(specials.includes(-2));
    assert!(!specials.includes(-3));
    assert!(!specials.includes(-100));
}

#[test]
fn test_collection_keeps_order_and_duplicates() {
    let positions = employees();

    let Some(Resolved::Collection(collection)) = positions
        .lookup(vec![PositionKey::from("cfo"), PositionKey::from(-1), PositionKey::from("cfo")])
        .unwrap()
    else {
        panic!("expected a collection");
    };
    assert_eq!(collection.values(), vec![Some(-3), Some(-1), Some(-3)]);
}

#[test]
fn test_configuration_errors() {
    let mut positions = employees();
    assert!(matches!(
        positions.configure(Script::new()),
        Err(ConfigurationError::AlreadyConfigured { .. })
    ));

    let err = Positions::build(PositionsConfig::default(), Script::new().number().number()).unwrap_err();
    assert_eq!(err, ConfigurationError::DuplicateNumber);

    let err = Positions::build(
        PositionsConfig::default(),
        Script::new().group(-100, "Team", ["ceo"]).special(-1, "CEO"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::UnknownMember { .. }));

    let err = Positions::build(
        PositionsConfig::default(),
        Script::new().special(-1, "CEO").special(-1, "Chief"),
    )
    .unwrap_err();
    assert!(matches!(err, ConfigurationError::DuplicateValue { value: -1, .. }));
}

#[test]
fn test_function_verb() {
    let mut positions = Positions::new(PositionsConfig::for_owner("Seat"))
        .with_verb("function", |declaration: &Declaration, _ctx: &BuildContext<'_>| {
            let value = declaration.int_arg(0, "value")?;
            let name = declaration.text_arg(1, "name")?;
            Ok(Position::function(value, name, |v| v < 0))
        });
    positions
        .configure(
            Script::new()
                .number()
                .special(-1, "Chair")
                .declare(Declaration::new("function").arg(-500).arg("Reserved")),
        )
        .unwrap();

    let reserved = get(&positions, "reserved");
    assert_eq!(reserved.kind(), Kind::Function);
    assert!(reserved.includes(-1));
    assert!(!reserved.includes(1));
    assert!(positions.accessors().get("reserved").unwrap().check(Some(-1)));

    let levels: Vec<_> = positions.accessors().by_level().iter().map(|a| a.level()).collect();
    assert_eq!(levels, vec![0, 0, 3]);
}

#[test]
fn test_concurrent_reads() {
    let positions = Arc::new(employees());

    let handles: Vec<_> = (1..=8)
        .map(|n| {
            let positions = Arc::clone(&positions);
            thread::spawn(move || {
                let bound = positions.position(n).unwrap().unwrap();
                let team = positions.position("executive_team").unwrap().unwrap();
                (bound.value(), bound.name().to_string(), team.includes(-2))
            })
        })
        .collect();

    for (n, handle) in (1..=8).zip(handles) {
        let (value, name, in_team) = handle.join().unwrap();
        assert_eq!(value, Some(n));
        assert_eq!(name, format!("Employee {n}"));
        assert!(in_team);
    }
    assert!(positions.number().unwrap().value().is_none());
}
