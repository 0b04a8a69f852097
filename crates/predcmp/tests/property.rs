use predcmp::{
    compare,
    core::{
        ast::ExprNode, compare::Relation, logic::generate, session::Session, transform::transform,
    },
};
use proptest::prelude::*;

const TYPES: [&str; 3] = ["book", "movie", "show"];
const FIELDS: [&str; 2] = ["x", "y"];

fn arb_leaf() -> impl Strategy<Value = ExprNode> {
    prop_oneof![
        (0..TYPES.len())
            .prop_map(|i| ExprNode::eq(ExprNode::attr("_type"), ExprNode::string(TYPES[i]))),
        (0..FIELDS.len(), 0..4u8, 0..4u8).prop_map(|(field, op, bound)| {
            let left = ExprNode::attr(FIELDS[field]);
            let right = ExprNode::number(f64::from(bound));
            match op {
                0 => ExprNode::lt(left, right),
                1 => ExprNode::lte(left, right),
                2 => ExprNode::gt(left, right),
                _ => ExprNode::gte(left, right),
            }
        }),
        Just(ExprNode::lt(ExprNode::attr("x"), ExprNode::attr("y"))),
        Just(ExprNode::attr("published")),
    ]
}

fn arb_filter() -> impl Strategy<Value = ExprNode> {
    arb_leaf().prop_recursive(3, 8, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l & r),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| l | r),
            inner.prop_map(ExprNode::not),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn comparison_is_symmetric(left in arb_filter(), right in arb_filter()) {
        let forward = compare(&left, &right).expect("forward");
        let reverse = compare(&right, &left).expect("reverse");

        prop_assert_eq!(forward, reverse.inverse());
    }

    #[test]
    fn filter_equals_itself(filter in arb_filter()) {
        prop_assert_eq!(compare(&filter, &filter).expect("compare"), Relation::Equal);
    }

    #[test]
    fn simplify_is_idempotent(filter in arb_filter()) {
        let mut session = Session::default();
        let node = transform(&filter);

        let once = session.simplify(&node);
        let twice = session.simplify(&once);

        prop_assert_eq!(once.hash(), twice.hash(), "{}", generate(&once));
    }

    #[test]
    fn shared_session_matches_fresh_sessions(left in arb_filter(), right in arb_filter()) {
        let mut session = Session::default();
        let (a, b) = (transform(&left), transform(&right));

        let warm_up = session.compare(&b, &a).expect("warm up");
        let shared = session.compare(&a, &b).expect("shared");

        prop_assert_eq!(shared, compare(&left, &right).expect("fresh"));
        prop_assert_eq!(shared, warm_up.inverse());
    }
}
