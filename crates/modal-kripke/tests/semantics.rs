//! # Semantics Integration Tests
//!
//! Kripke semantics over whole models: modal duality, vacuous quantifiers,
//! cache coherence under mutation and the diagnostics scenario the engine
//! was built around.

use modal_kripke::{
    evaluate, AgentId, BeliefStore, EvalError, Evaluator, EvaluatorConfig, FrameProperty,
    KripkeModel, ModalSystem, Observation, Valuation,
};
use modal_logic::{parse, Formula, Modality, SyntaxError, MAX_NESTING};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ATOMS: [&str; 3] = ["a", "b", "c"];
const MODALITIES: [&str; 2] = ["m", "n"];

fn arb_formula() -> impl Strategy<Value = Formula> {
    let leaf = prop_oneof![
        Just(Formula::True),
        Just(Formula::False),
        prop::sample::select(ATOMS.to_vec()).prop_map(Formula::atom),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::not),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::or(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::implies(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::iff(l, r)),
            (prop::sample::select(MODALITIES.to_vec()), inner.clone())
                .prop_map(|(m, f)| Formula::necessity(m, f)),
            (prop::sample::select(MODALITIES.to_vec()), inner)
                .prop_map(|(m, f)| Formula::possibility(m, f)),
        ]
    })
}

/// Models with 1-4 worlds, every atom defined everywhere, random edges.
fn arb_total_model() -> impl Strategy<Value = KripkeModel> {
    (1usize..=4)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::array::uniform3(any::<bool>()), n),
                prop::collection::vec((0..n, 0..n, 0usize..2), 0..10),
            )
        })
        .prop_map(|(valuations, edges)| {
            let mut model = KripkeModel::new();
            for (i, bits) in valuations.iter().enumerate() {
                let valuation: Valuation = ATOMS
                    .iter()
                    .zip(bits)
                    .map(|(name, value)| (name.to_string(), *value))
                    .collect();
                model.add_world(format!("w{}", i), valuation).unwrap();
            }
            for (from, to, tag) in edges {
                model
                    .add_accessibility(MODALITIES[tag], format!("w{}", from), format!("w{}", to))
                    .unwrap();
            }
            model
        })
}

fn diagnostics_model() -> KripkeModel {
    let mut model = KripkeModel::new();
    model
        .add_world(
            "w1",
            Valuation::from([
                ("pressure_high".to_string(), true),
                ("valve_open".to_string(), false),
            ]),
        )
        .unwrap();
    model
        .add_world(
            "w2",
            Valuation::from([
                ("pressure_high".to_string(), false),
                ("valve_open".to_string(), false),
            ]),
        )
        .unwrap();
    model.add_accessibility("RF", "w1", "w2").unwrap();
    model
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// `<m>φ` and `~[m]~φ` agree everywhere on total models.
    #[test]
    fn diamond_is_dual_of_box(
        formula in arb_formula(),
        model in arb_total_model(),
        tag in prop::sample::select(MODALITIES.to_vec()),
    ) {
        let diamond = Formula::possibility(tag, formula.clone());
        let dual = Formula::not(Formula::necessity(tag, Formula::not(formula)));
        for world in model.worlds() {
            let lhs = evaluate(&diamond, world, &model);
            let rhs = evaluate(&dual, world, &model);
            prop_assert!(lhs.is_ok());
            prop_assert_eq!(lhs, rhs);
        }
    }

    /// The caching evaluator returns what a fresh uncached walk returns.
    #[test]
    fn cached_matches_uncached(
        formulas in prop::collection::vec(arb_formula(), 1..6),
        model in arb_total_model(),
    ) {
        let mut evaluator =
            Evaluator::with_config(EvaluatorConfig::new().with_max_cache_entries(16));
        for _ in 0..2 {
            for formula in &formulas {
                for world in model.worlds() {
                    prop_assert_eq!(
                        evaluator.evaluate(formula, world, &model),
                        evaluate(formula, world, &model)
                    );
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario Tests
// ---------------------------------------------------------------------------

#[test]
fn test_pressure_rule_follows_valve_observation() {
    // pressure_high=true@w1, valve_open=false@w2, RF: w1 -> w2
    let mut model = KripkeModel::new();
    model
        .add_world("w1", Valuation::from([("pressure_high".to_string(), true)]))
        .unwrap();
    model
        .add_world("w2", Valuation::from([("valve_open".to_string(), false)]))
        .unwrap();
    model.add_accessibility("RF", "w1", "w2").unwrap();

    let body = parse("pressure_high -> diamond[RF](valve_open)").unwrap();
    let rule = parse("[RF](pressure_high -> diamond[RF](valve_open))").unwrap();
    let mut evaluator = Evaluator::new();

    assert_eq!(evaluator.evaluate(&body, &"w1".into(), &model), Ok(false));
    // the box reaches w2, where pressure_high was never assigned
    assert_eq!(
        evaluator.evaluate(&rule, &"w1".into(), &model),
        Err(EvalError::UndefinedProposition {
            proposition: "pressure_high".into(),
            world: "w2".into()
        })
    );

    model.set_proposition(&"w2".into(), "valve_open", true).unwrap();
    assert_eq!(evaluator.evaluate(&body, &"w1".into(), &model), Ok(true));
}

#[test]
fn test_boxed_pressure_rule_on_reflexive_frame() {
    let mut model = diagnostics_model();
    model.add_accessibility("RF", "w1", "w1").unwrap();
    let rule = parse("[RF](pressure_high -> diamond[RF](valve_open))").unwrap();
    let mut evaluator = Evaluator::new();

    assert_eq!(evaluator.evaluate(&rule, &"w1".into(), &model), Ok(false));
    model.set_proposition(&"w2".into(), "valve_open", true).unwrap();
    assert_eq!(evaluator.evaluate(&rule, &"w1".into(), &model), Ok(true));
}

#[test]
fn test_vacuous_quantifiers_on_dead_end() {
    let model = diagnostics_model();
    let w2 = "w2".into();
    assert_eq!(evaluate(&parse("[RF]false").unwrap(), &w2, &model), Ok(true));
    assert_eq!(evaluate(&parse("<RF>true").unwrap(), &w2, &model), Ok(false));
    assert_eq!(evaluate(&parse("[]false").unwrap(), &"w1".into(), &model), Ok(true));
}

#[test]
fn test_unrelated_mutation_keeps_result() {
    let mut model = diagnostics_model();
    let formula = parse("<RF>~valve_open").unwrap();
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &model), Ok(true));

    model.set_proposition(&"w1".into(), "fan_on", true).unwrap();
    assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &model), Ok(true));
    assert_eq!(evaluator.stats().invalidations, 1);
}

#[test]
fn test_dependent_mutation_changes_result() {
    let mut model = diagnostics_model();
    let formula = parse("[RF]~valve_open").unwrap();
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &model), Ok(true));
    assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &model), Ok(true));
    assert!(evaluator.stats().hits >= 1);

    model.set_proposition(&"w2".into(), "valve_open", true).unwrap();
    assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &model), Ok(false));
}

#[test]
fn test_switching_models_never_serves_stale_results() {
    let model = diagnostics_model();
    let mut copy = model.clone();
    copy.set_proposition(&"w2".into(), "valve_open", true).unwrap();
    let mut other = model.clone();
    other.set_proposition(&"w2".into(), "valve_open", false).unwrap();

    // copy and other share a version number but not an id
    assert_eq!(copy.version(), other.version());
    let formula = parse("<RF>valve_open").unwrap();
    let mut evaluator = Evaluator::new();
    assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &copy), Ok(true));
    assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &other), Ok(false));
}

#[test]
fn test_undefined_proposition_propagates() {
    let model = diagnostics_model();
    let err = evaluate(&parse("temperature_critical").unwrap(), &"w1".into(), &model).unwrap_err();
    assert!(matches!(
        err,
        EvalError::UndefinedProposition { ref proposition, .. }
            if proposition == "temperature_critical"
    ));
}

#[test]
fn test_belief_walk_over_diagnostics_model() {
    let model = diagnostics_model();
    let mut store = BeliefStore::new();
    store.register("RF_Agent", "RF", "w1", &model).unwrap();
    let agent = AgentId::new("RF_Agent");

    store
        .transition(&agent, "w2", Observation::reading("pressure_high", false), &model)
        .unwrap();
    // w2 has no RF successors
    assert!(store
        .transition(&agent, "w1", Observation::report("rollback"), &model)
        .is_err());
    assert_eq!(store.log(&agent).unwrap().len(), 1);
}

#[test]
fn test_declared_system_violations() {
    let model = diagnostics_model();
    let rf = Modality::new("RF");
    assert_eq!(
        ModalSystem::T.violations(&model, &rf),
        vec![FrameProperty::Reflexive]
    );
    assert!(ModalSystem::K.violations(&model, &rf).is_empty());
}

#[test]
fn test_longest_parsed_chains_evaluate() {
    let model = diagnostics_model();
    let cases = [
        ("[RF]~valve_open", " & ", true),
        ("<RF>pressure_high", " | ", false),
        ("pressure_high", " -> ", true),
        ("<RF>valve_open", " <-> ", true),
    ];
    for (term, op, expected) in cases {
        let formula = parse(&vec![term; MAX_NESTING].join(op)).unwrap();
        assert_eq!(evaluate(&formula, &"w1".into(), &model), Ok(expected), "{op}");

        let mut evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &model), Ok(expected));
        assert_eq!(evaluator.evaluate(&formula, &"w1".into(), &model), Ok(expected));
    }
}

#[test]
fn test_overlong_chain_never_reaches_evaluation() {
    for op in [" & ", " | ", " -> ", " <-> "] {
        let text = vec!["pressure_high"; 8 * MAX_NESTING].join(op);
        assert!(matches!(parse(&text), Err(SyntaxError::TooDeep { .. })), "{op}");
    }
}
