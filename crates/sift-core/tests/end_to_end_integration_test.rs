use sift_core::{
    Action, FactValue, FnArtifacts, IdGenerator, KnowledgeElement, Rule, RuleBase, RuleId, Scope,
    SelectionStrategy, SiftError,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn routing_base(seed: u64) -> RuleBase {
    let mut base = RuleBase::with_seed(seed);
    for (namespace, target, destination, weight) in [
        ("level-1", "*.openai.com", "ollama", 0.20),
        ("level-1", "*.com", "openai", 0.80),
        ("level-2", "*.openai.com", "Should_Not_Get_Here", 1.00),
    ] {
        base.add_new(
            Rule::builder(KnowledgeElement::from_pairs([("target", target)]).unwrap())
                .action(Action::pair("destination", destination))
                .weight(weight)
                .namespace(namespace),
        )
        .unwrap();
    }
    base
}

fn session() -> KnowledgeElement {
    KnowledgeElement::from_pairs([
        ("target", "api.openai.com"),
        ("body", "string model=ollama string"),
    ])
    .unwrap()
}

fn destination_of(rule: &Rule) -> FactValue {
    match &rule.actions()[0] {
        Action::Pair(_, value) => value.clone(),
        other => panic!("unexpected action {other}"),
    }
}

#[test]
fn routing_strategies() {
    init_tracing();
    let mut base = routing_base(11);

    let first = base.select(&mut session(), "level-1", SelectionStrategy::FirstMatch).unwrap();
    assert_eq!(destination_of(first.rule.as_ref().unwrap()), FactValue::from("ollama"));

    for _ in 0..20 {
        let best = base.select(&mut session(), "level-1", SelectionStrategy::BestMatches).unwrap();
        assert_eq!(destination_of(best.rule.as_ref().unwrap()), FactValue::from("ollama"));
        assert_eq!(best.candidates.unwrap().len(), 1);
        assert!((best.score - (100.0 + 11.0 / 14.0)).abs() < 1e-9);
    }

    let all = base.select(&mut session(), "level-1", SelectionStrategy::AllMatches).unwrap();
    assert_eq!(all.candidates.unwrap().len(), 2);
    assert!((all.score - (100.0 + 11.0 / 14.0)).abs() < 1e-9);
}

#[test]
fn namespaces_partition_the_search_space() {
    init_tracing();
    let mut base = routing_base(3);

    for _ in 0..50 {
        let selection =
            base.select(&mut session(), "level-1", SelectionStrategy::AllMatches).unwrap();
        let destination = destination_of(selection.rule.as_ref().unwrap());
        assert_ne!(destination, FactValue::from("Should_Not_Get_Here"));
    }

    let everywhere = base.select(&mut session(), Scope::All, SelectionStrategy::AllMatches).unwrap();
    assert_eq!(everywhere.candidates.unwrap().len(), 3);
}

#[test]
fn capture_then_execute_across_namespaces() {
    init_tracing();
    let mut base = RuleBase::with_seed(5);
    base.add_new(
        Rule::builder(KnowledgeElement::from_pairs([("h_host", "*openai*")]).unwrap())
            .action(Action::pair("provider", "openai"))
            .namespace("f_provider"),
    )
    .unwrap();
    base.add_new(
        Rule::builder(
            KnowledgeElement::from_pairs([
                ("provider", "openai"),
                ("h_body", "model=$*$/@model"),
            ])
            .unwrap(),
        )
        .action(Action::pair("model", "$h_body/model"))
        .action(Action::pair("@last_model", "$h_body/model"))
        .namespace("f_model"),
    )
    .unwrap();

    let mut belief = KnowledgeElement::new();
    let mut session = KnowledgeElement::from_pairs([
        ("h_host", "api.openai.com"),
        ("h_method", "/api/chat"),
        ("h_body", "string model=llama3.2 string"),
    ])
    .unwrap();

    for namespace in ["f_provider", "f_model"] {
        let selection =
            base.select(&mut session, namespace, SelectionStrategy::AllMatches).unwrap();
        let rule = selection.rule.expect("each stage decides");
        rule.execute(&mut session, Some(&mut belief), None).unwrap();
    }

    assert_eq!(session.get("provider"), Some(&FactValue::from("openai")));
    assert_eq!(session.get("h_body/model"), Some(&FactValue::from("llama3.2")));
    assert_eq!(session.get("model"), Some(&FactValue::from("llama3.2")));
    assert_eq!(belief.get("last_model"), Some(&FactValue::from("llama3.2")));
    assert!(!session.contains("last_model"));
}

#[test]
fn model_capture_is_written_back_on_selection() {
    init_tracing();
    let mut base = RuleBase::with_seed(1);
    base.add_new(Rule::builder(
        KnowledgeElement::from_pairs([("h_body", "model=$*$/@model")]).unwrap(),
    ))
    .unwrap();

    let mut facts =
        KnowledgeElement::from_pairs([("h_body", "string model=llama3.2 string")]).unwrap();
    let selection = base.select(&mut facts, Scope::All, SelectionStrategy::BestMatches).unwrap();

    assert!(selection.is_decision());
    assert_eq!(facts.get("h_body/model"), Some(&FactValue::from("llama3.2")));
}

#[test]
fn artifact_failure_reaches_the_caller() {
    init_tracing();
    let mut base = RuleBase::with_seed(1);
    base.add_new(
        Rule::builder(KnowledgeElement::from_pairs([("target", "*")]).unwrap())
            .action(Action::artifact("notify", Some("ops".into())))
            .action(Action::pair("notified", "yes")),
    )
    .unwrap();

    let mut facts = session();
    let rule = base
        .select(&mut facts, Scope::All, SelectionStrategy::FirstMatch)
        .unwrap()
        .rule
        .unwrap();

    let mut artifacts = FnArtifacts(|function: &str, _: Option<&FactValue>| -> anyhow::Result<()> {
        anyhow::bail!("{function} unavailable")
    });
    let err = rule.execute(&mut facts, None, Some(&mut artifacts)).unwrap_err();

    assert!(matches!(err, SiftError::Artifact { .. }));
    assert_eq!(err.to_string(), "Artifact 'notify' failed: notify unavailable");
    assert!(!facts.contains("notified"));
}

#[test]
fn rule_ids_come_from_the_rule_base_only() {
    init_tracing();
    let mut caller_ids = IdGenerator::new();
    assert_eq!(caller_ids.next_rule_id(), RuleId::new("r-1"));

    let mut base = routing_base(3);
    let extra = base
        .add_new(
            Rule::builder(KnowledgeElement::from_pairs([("target", "*")]).unwrap())
                .namespace("other"),
        )
        .unwrap();
    assert_eq!(extra.id(), &RuleId::new("r-4"));

    let mut ids: Vec<String> = base
        .namespaces()
        .flat_map(|namespace| base.rules_in(namespace).iter().map(|rule| rule.id().to_string()))
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    let other = RuleBase::with_seed(3).add_new(Rule::builder(KnowledgeElement::new())).unwrap();
    assert_eq!(other.id(), &RuleId::new("r-1"));
    assert_eq!(base.ids().issued("r-"), 4);
}
