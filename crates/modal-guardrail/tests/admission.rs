//! # Admission Integration Tests
//!
//! The accelerator diagnostics rule set applied end to end: rejection
//! messages, error propagation and the guarantee that admission leaves the
//! model untouched.

use modal_guardrail::{Admission, Guardrail, GuardrailConfig, GuardrailError, Rejection, RuleSet};
use modal_kripke::{EvalError, KripkeModel, Valuation};
use modal_logic::parse;

// ============================================================================
// Fixtures
// ============================================================================

const PROPS: [&str; 6] = [
    "rf_temp_high",
    "cooling_fault_reported",
    "klystron_fault_reported",
    "rf_power_fault_reported",
    "vacuum_fault_reported",
    "rf_fault_is_root_cause",
];

fn diagnostic_rules() -> RuleSet {
    RuleSet::load([
        ("cooling_may_cause_rf_temp", "[] (rf_temp_high -> <>cooling_fault_reported)"),
        ("klystron_implies_rf_power", "[] (klystron_fault_reported -> rf_power_fault_reported)"),
        ("cooling_and_klystron_distinct", "[] ~(cooling_fault_reported & klystron_fault_reported)"),
        ("vacuum_not_rf_root", "[] (vacuum_fault_reported -> ~<>rf_fault_is_root_cause)"),
    ])
    .unwrap()
}

/// Three worlds, all propositions defined, default modality w0 -> {w1, w2}.
fn plant(overrides: &[(&str, &str, bool)]) -> KripkeModel {
    let mut model = KripkeModel::new();
    for world in ["w0", "w1", "w2"] {
        let mut valuation: Valuation = PROPS.iter().map(|p| (p.to_string(), false)).collect();
        for (w, p, v) in overrides {
            if *w == world {
                valuation.insert(p.to_string(), *v);
            }
        }
        model.add_world(world, valuation).unwrap();
    }
    model.add_accessibility("default", "w0", "w1").unwrap();
    model.add_accessibility("default", "w0", "w2").unwrap();
    model
}

fn snapshot(model: &KripkeModel) -> Vec<u8> {
    serde_json::to_vec(model).unwrap()
}

// ============================================================================
// Verdicts
// ============================================================================

#[test]
fn test_conflating_cooling_and_klystron_is_rejected() {
    let model = plant(&[
        ("w1", "cooling_fault_reported", true),
        ("w1", "klystron_fault_reported", true),
        ("w1", "rf_power_fault_reported", true),
    ]);
    let guardrail = Guardrail::new(diagnostic_rules());
    let verdict = guardrail
        .admit(&parse("~cooling_fault_reported").unwrap(), &"w0".into(), &model)
        .unwrap();
    assert_eq!(verdict.violated_rule(), Some("cooling_and_klystron_distinct"));
}

#[test]
fn test_consistent_hypothesis_accepted() {
    let model = plant(&[
        ("w0", "rf_temp_high", true),
        ("w1", "cooling_fault_reported", true),
    ]);
    let guardrail = Guardrail::new(diagnostic_rules());
    let verdict = guardrail
        .admit(&parse("rf_temp_high & ~klystron_fault_reported").unwrap(), &"w0".into(), &model)
        .unwrap();
    assert_eq!(verdict, Admission::Accepted);
}

#[test]
fn test_false_candidate_is_contradicted() {
    let model = plant(&[]);
    let guardrail = Guardrail::new(diagnostic_rules());
    let verdict = guardrail
        .admit(&parse("klystron_fault_reported").unwrap(), &"w0".into(), &model)
        .unwrap();
    assert_eq!(verdict, Admission::Rejected(Rejection::Contradicted));
}

#[test]
fn test_rejection_is_deterministic() {
    let model = plant(&[
        ("w1", "cooling_fault_reported", true),
        ("w1", "klystron_fault_reported", true),
        ("w2", "vacuum_fault_reported", true),
    ]);
    let guardrail = Guardrail::new(diagnostic_rules());
    let candidate = parse("~rf_temp_high").unwrap();
    let first = guardrail.admit(&candidate, &"w0".into(), &model).unwrap();
    for _ in 0..5 {
        assert_eq!(guardrail.admit(&candidate, &"w0".into(), &model).unwrap(), first);
    }
    // two rules are false; the earlier one wins
    assert_eq!(first.violated_rule(), Some("klystron_implies_rf_power"));
}

#[test]
fn test_undefined_candidate_returns_error() {
    let model = plant(&[]);
    let guardrail = Guardrail::new(diagnostic_rules());
    let err = guardrail
        .admit(&parse("temperature_critical").unwrap(), &"w0".into(), &model)
        .unwrap_err();
    assert_eq!(
        err,
        GuardrailError::Eval(EvalError::UndefinedProposition {
            proposition: "temperature_critical".into(),
            world: "w0".into(),
        })
    );
}

#[test]
fn test_reachable_scope_reports_world() {
    let model = plant(&[("w1", "vacuum_fault_reported", true)]);
    let rules = RuleSet::load([("no_vacuum_here", "~vacuum_fault_reported")]).unwrap();
    let local = Guardrail::new(rules.clone());
    let wide = Guardrail::with_config(rules, GuardrailConfig::new().with_check_reachable(true));

    assert!(local.check_all(&"w0".into(), &model).unwrap().is_empty());
    let found = wide.check_all(&"w0".into(), &model).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].world.as_str(), "w1");
}

// ============================================================================
// Non-destructiveness
// ============================================================================

#[test]
fn test_rejected_admission_leaves_model_unchanged() {
    let model = plant(&[
        ("w1", "cooling_fault_reported", true),
        ("w1", "klystron_fault_reported", true),
    ]);
    let before = snapshot(&model);
    let version = model.version();
    let guardrail = Guardrail::with_config(
        diagnostic_rules(),
        GuardrailConfig::new().with_check_reachable(true),
    );

    for text in ["~cooling_fault_reported", "klystron_fault_reported", "temperature_critical"] {
        let _ = guardrail.admit(&parse(text).unwrap(), &"w0".into(), &model);
    }

    assert_eq!(snapshot(&model), before);
    assert_eq!(model.version(), version);
}
