// Integration tests for Shoin components
// These tests drive a reasoning session end to end across the crates

use proptest::prelude::*;
use shoin::prelude::*;
use shoin_datatypes::Ordered;
use shoin_kernel::StructuralKernel;
use std::sync::Arc;
use std::thread;

fn ex(name: &str) -> String {
    format!("http://example.org/{}", name)
}

fn class(name: &str) -> ClassExpression {
    ClassExpression::named(ex(name))
}

fn subclass(sub: &str, sup: &str) -> Axiom {
    Axiom::SubClassOf(class(sub), class(sup))
}

fn ontology(axioms: impl IntoIterator<Item = Axiom>) -> Ontology {
    let mut ontology = Ontology::new();
    for axiom in axioms {
        ontology.add_axiom(axiom);
    }
    ontology
}

fn pets() -> Ontology {
    let mut ontology = ontology([
        subclass("Cat", "Animal"),
        subclass("Dog", "Animal"),
        subclass("Kitten", "Cat"),
        Axiom::DisjointClasses(vec![class("Cat"), class("Dog")]),
    ]);
    ontology.add_axiom(Axiom::ClassAssertion(class("Kitten"), Individual::named(ex("tom"))));
    ontology
}

#[test]
fn test_cat_is_an_animal_end_to_end() -> anyhow::Result<()> {
    let reasoner = Reasoner::structural(&ontology([subclass("Cat", "Animal")]), ReasonerConfiguration::default())?;

    assert!(reasoner.is_entailed(&subclass("Cat", "Animal"))?);

    let supers = reasoner.super_classes(&class("Cat"), true)?;
    assert_eq!(supers.len(), 1);
    let node = &supers.nodes()[0];
    assert_eq!(node.len(), 1);
    assert!(node.contains(&Class::named(ex("Animal"))));
    Ok(())
}

#[test]
fn test_add_then_remove_leaves_session_untouched() -> anyhow::Result<()> {
    let reasoner = Reasoner::structural(&pets(), ReasonerConfiguration::default())?;
    assert!(reasoner.is_consistent()?);
    let before = reasoner.committed_axioms();

    let extra = subclass("Kitten", "Pet");
    let mut host = pets();
    let added = host.add_axiom(extra.clone());
    let removed = host.remove_axiom(&AnnotatedAxiom::new(extra));
    reasoner.record_changes(added.into_iter().chain(removed))?;
    assert_eq!(reasoner.pending_changes().len(), 2);
    assert!(reasoner.pending_axiom_additions().is_empty());
    assert!(reasoner.pending_axiom_removals().is_empty());

    reasoner.flush()?;
    assert_eq!(reasoner.committed_axioms(), before);
    assert_eq!(reasoner.consistency_state(), ConsistencyState::Consistent);
    assert!(reasoner.pending_changes().is_empty());
    Ok(())
}

#[test]
fn test_incremental_changes_reach_queries() -> anyhow::Result<()> {
    let reasoner = Reasoner::structural(&pets(), ReasonerConfiguration::default())?;
    assert!(reasoner.is_consistent()?);

    let mut host = pets();
    let change = host.add_axiom(subclass("Animal", "LivingThing"));
    reasoner.record_changes(change)?;
    assert_eq!(reasoner.consistency_state(), ConsistencyState::Consistent);
    reasoner.flush()?;
    assert_eq!(reasoner.consistency_state(), ConsistencyState::Unknown);

    let supers = reasoner.super_classes(&class("Kitten"), false)?;
    assert!(supers.contains_entity(&Class::named(ex("LivingThing"))));
    assert!(supers.contains_entity(&Class::named(ex("Animal"))));
    assert!(supers.contains_entity(&Class::Thing));

    let tom = Individual::named(ex("tom"));
    assert!(reasoner.types(&tom, false)?.contains_entity(&Class::named(ex("LivingThing"))));
    assert!(reasoner
        .instances(&class("Animal"), false)?
        .contains_entity(&tom));
    Ok(())
}

#[test]
fn test_subclasses_of_undeclared_class_under_disallow() -> anyhow::Result<()> {
    let config = ReasonerConfiguration::new().with_fresh_entity_policy(FreshEntityPolicy::Disallow);
    let reasoner = Reasoner::structural(&pets(), config)?;

    match reasoner.sub_classes(&class("Unicorn"), false) {
        Err(ReasonerError::FreshEntities { entities }) => {
            assert!(entities.contains(&Entity::Class(Iri::new(ex("Unicorn")))));
        }
        other => panic!("expected a fresh entity error, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_query_results_are_never_fresh() -> anyhow::Result<()> {
    let reasoner = Reasoner::structural(&pets(), ReasonerConfiguration::default())?;

    let mut classes = Vec::new();
    for name in ["Animal", "Cat", "Dog", "Kitten"] {
        for node in reasoner.sub_classes(&class(name), false)? {
            classes.extend(node);
        }
        for node in reasoner.super_classes(&class(name), false)? {
            classes.extend(node);
        }
        classes.extend(reasoner.equivalent_classes(&class(name))?);
        for node in reasoner.disjoint_classes(&class(name))? {
            classes.extend(node);
        }
    }
    assert!(!classes.is_empty());
    for c in classes {
        assert!(!reasoner.is_fresh(&c.entity()), "{:?} reported fresh", c);
    }

    for node in reasoner.instances(&ClassExpression::Thing, false)? {
        for individual in node {
            assert!(!reasoner.is_fresh(&individual.entity()));
        }
    }
    Ok(())
}

#[test]
fn test_disjointness_makes_intersection_unsatisfiable() -> anyhow::Result<()> {
    let reasoner = Reasoner::structural(&pets(), ReasonerConfiguration::default())?;
    let both = ClassExpression::IntersectionOf(vec![class("Cat"), class("Dog")]);
    assert!(!reasoner.is_satisfiable(&both)?);
    assert!(reasoner.is_satisfiable(&class("Kitten"))?);
    assert!(reasoner
        .disjoint_classes(&class("Kitten"))?
        .contains_entity(&Class::named(ex("Dog"))));
    Ok(())
}

#[test]
fn test_datatype_inheritance_through_a_loaded_schema() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("shoin-chain-{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"[
            {"name": "http://example.org/dt#Root", "properties": {"ordered": "partial", "numeric": "false"}},
            {"name": "http://example.org/dt#Mid", "base": "http://example.org/dt#Root", "properties": {"numeric": "true"}},
            {"name": "http://example.org/dt#Leaf", "base": "http://example.org/dt#Mid"}
        ]"#,
    )?;
    let model = shoin::load_datatype_model(&path);
    std::fs::remove_file(&path)?;
    let model = model?;

    let leaf = "http://example.org/dt#Leaf";
    assert!(model.numeric(leaf));
    assert_eq!(model.ordered(leaf), Ordered::Partial);
    assert_eq!(model.ordered(leaf), model.ordered("http://example.org/dt#Root"));
    assert!(model.is_subtype_of(leaf, "http://example.org/dt#Root"));
    Ok(())
}

#[test]
fn test_restricted_datatype_range_violation_is_inconsistent() -> anyhow::Result<()> {
    let schema = r#"[{
        "name": "http://example.org/dt#Percent",
        "base": "integer",
        "facet_values": {"minInclusive": "0", "maxInclusive": "100"}
    }]"#;
    let score = DataProperty::named(ex("score"));
    let percent = DataRange::Datatype(Iri::new("http://example.org/dt#Percent"));
    let bob = Individual::named(ex("bob"));

    let mut host = ontology([Axiom::DataPropertyRange(score.clone(), percent)]);
    host.add_axiom(Axiom::DataPropertyAssertion(score.clone(), bob.clone(), Literal::xsd("42", "integer")));
    let reasoner = Reasoner::with_datatype_schema(&host, schema, ReasonerConfiguration::default())?;
    assert!(reasoner.is_consistent()?);

    let change = host.add_axiom(Axiom::DataPropertyAssertion(score, bob.clone(), Literal::xsd("150", "integer")));
    reasoner.record_changes(change)?;
    reasoner.flush()?;
    assert!(!reasoner.is_consistent()?);
    assert!(matches!(reasoner.types(&bob, false), Err(ReasonerError::Inconsistent)));
    Ok(())
}

#[test]
fn test_session_over_explicit_kernel_and_model() -> anyhow::Result<()> {
    let model = DatatypeModel::xsd()?;
    let kernel = StructuralKernel::with_datatypes(Arc::new(model));
    let reasoner = Reasoner::new(&pets(), kernel, ReasonerConfiguration::default().with_tracing(true))?;

    let query = subclass("Kitten", "Animal");
    assert!(reasoner.is_entailed(&query)?);
    let trace = reasoner.last_trace();
    assert!(trace.iter().any(|a| **a == subclass("Kitten", "Cat")));
    assert!(trace.iter().any(|a| **a == subclass("Cat", "Animal")));
    Ok(())
}

#[test]
fn test_queries_from_many_threads_then_interrupt() -> anyhow::Result<()> {
    let reasoner = Arc::new(Reasoner::structural(&pets(), ReasonerConfiguration::default())?);

    let handles: Vec<_> = ["Cat", "Dog", "Kitten", "Animal"]
        .into_iter()
        .map(|name| {
            let reasoner = Arc::clone(&reasoner);
            thread::spawn(move || reasoner.super_classes(&class(name), false).map(|set| set.len()))
        })
        .collect();
    for handle in handles {
        let supers = handle.join().map_err(|_| anyhow::anyhow!("query thread panicked"))??;
        assert!(supers >= 1);
    }

    let flag = reasoner.interrupt_flag();
    thread::spawn(move || flag.interrupt())
        .join()
        .map_err(|_| anyhow::anyhow!("interrupt thread panicked"))?;
    assert!(matches!(
        reasoner.super_classes(&class("Cat"), false),
        Err(ReasonerError::Interrupted)
    ));
    Ok(())
}

proptest! {
    /// SubsOf(E) never reports E's own equivalence class, except for the
    /// bottom class
    #[test]
    fn prop_hierarchy_irreflexive(edges in prop::collection::vec((0usize..8, 0usize..8), 0..16)) {
        let axioms = edges
            .iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| subclass(&format!("C{}", a), &format!("C{}", b)));
        let reasoner = Reasoner::structural(&ontology(axioms), ReasonerConfiguration::default()).unwrap();

        for i in 0..8 {
            let name = format!("C{}", i);
            let own = reasoner.equivalent_classes(&class(&name)).unwrap();
            if own.contains(&Class::Nothing) {
                continue;
            }
            let subs = reasoner.sub_classes(&class(&name), false).unwrap();
            for node in subs.nodes() {
                prop_assert!(node.entities().all(|c| !own.contains(c)), "{} is its own subclass", name);
            }
        }
    }
}
