use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shoin_core::{Axiom, ClassExpression, Individual, Ontology, OntologyChange};
use shoin_reasoner::{InferenceType, Reasoner, ReasonerConfiguration};

fn class(i: usize) -> ClassExpression {
    ClassExpression::named(format!("http://example.org/Class{}", i))
}

fn individual(i: usize) -> Individual {
    Individual::named(format!("http://example.org/ind{}", i))
}

fn create_chain_ontology(size: usize) -> Ontology {
    let mut ontology = Ontology::new();

    for i in 0..size {
        ontology.add_axiom(Axiom::ClassAssertion(class(i), individual(i)));

        // Subclass relation (except for root)
        if i > 0 {
            ontology.add_axiom(Axiom::SubClassOf(class(i), class(i - 1)));
        }
    }

    ontology
}

fn benchmark_consistency_check(c: &mut Criterion) {
    let sizes = vec![10, 50, 100];

    for size in sizes {
        let ontology = create_chain_ontology(size);
        c.bench_function(&format!("session_consistency_{}_classes", size), |b| {
            b.iter(|| {
                let reasoner = Reasoner::structural(black_box(&ontology), ReasonerConfiguration::default()).unwrap();
                black_box(reasoner.is_consistent().unwrap());
            });
        });
    }
}

fn benchmark_classification(c: &mut Criterion) {
    let sizes = vec![10, 50, 100];

    for size in sizes {
        let ontology = create_chain_ontology(size);
        c.bench_function(&format!("session_classification_{}_classes", size), |b| {
            b.iter(|| {
                let reasoner = Reasoner::structural(black_box(&ontology), ReasonerConfiguration::default()).unwrap();
                reasoner.precompute_inferences(&[InferenceType::ClassHierarchy]).unwrap();
                black_box(reasoner.super_classes(&class(size - 1), false).unwrap());
            });
        });
    }
}

fn benchmark_incremental_flush(c: &mut Criterion) {
    let sizes = vec![10, 50, 100];

    for size in sizes {
        let ontology = create_chain_ontology(size);
        let reasoner = Reasoner::structural(&ontology, ReasonerConfiguration::default()).unwrap();
        let extra = Axiom::SubClassOf(class(size), class(0));
        c.bench_function(&format!("session_flush_{}_classes", size), |b| {
            b.iter(|| {
                reasoner
                    .record_change(OntologyChange::AddAxiom(extra.clone().into()))
                    .unwrap();
                reasoner.flush().unwrap();
                reasoner
                    .record_change(OntologyChange::RemoveAxiom(extra.clone().into()))
                    .unwrap();
                reasoner.flush().unwrap();
                black_box(reasoner.committed_axioms().len());
            });
        });
    }
}

fn benchmark_entailment(c: &mut Criterion) {
    let sizes = vec![10, 50, 100];

    for size in sizes {
        let ontology = create_chain_ontology(size);
        let reasoner = Reasoner::structural(&ontology, ReasonerConfiguration::default()).unwrap();
        let query = Axiom::SubClassOf(class(size - 1), class(0));
        c.bench_function(&format!("session_entailment_{}_classes", size), |b| {
            b.iter(|| {
                black_box(reasoner.is_entailed(black_box(&query)).unwrap());
            });
        });
    }
}

criterion_group!(
    benches,
    benchmark_consistency_check,
    benchmark_classification,
    benchmark_incremental_flush,
    benchmark_entailment
);
criterion_main!(benches);
