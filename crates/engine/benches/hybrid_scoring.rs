//! Benchmarks for hybrid scoring
//!
//! Run with: cargo bench --package engine
//!
//! Builds a synthetic catalog so the bench does not depend on data files.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use data_loader::{Destination, SustainabilityMetrics, TravelIndex, User};
use engine::{HybridConfig, HybridRecommender};
use recommenders::{NeuralCfConfig, Recommender};
use std::sync::Arc;

const NUM_DESTINATIONS: u32 = 200;
const NUM_USERS: u32 = 500;

fn synthetic_index() -> Arc<TravelIndex> {
    let countries = ["Spain", "Japan", "Norway", "Chile", "Kenya", "Canada", "Italy"];
    let landscapes = ["Beach", "Mountain", "City", "Forest", "Island"];
    let categories = ["Nature", "Cultural", "Adventure", "Relaxation"];

    let mut index = TravelIndex::new();
    for id in 1..=NUM_DESTINATIONS {
        let spread = (id % 10) as f32;
        index.insert_destination(Destination {
            id,
            name: format!("Destination {}", id),
            country: countries[id as usize % countries.len()].to_string(),
            region: String::new(),
            climate: "Temperate".to_string(),
            landscape_type: landscapes[id as usize % landscapes.len()].to_string(),
            category: categories[id as usize % categories.len()].to_string(),
            metrics: SustainabilityMetrics {
                carbon_footprint: Some(spread),
                water_consumption: Some(10.0 - spread),
                waste_management: Some(5.0),
                biodiversity_impact: Some(spread),
                local_economy_support: Some(10.0 - spread),
            },
            overall_sustainability_score: None,
            transportation_options: vec![],
            eco_certifications: vec![],
        });
    }
    for id in 1..=NUM_USERS {
        // A deterministic, overlapping spread of visits
        let history: Vec<u32> = (0..5)
            .map(|i| ((id * 7 + i * 13) % NUM_DESTINATIONS) + 1)
            .collect();
        index.insert_user(User {
            id,
            age_group: "25-34".to_string(),
            interests: vec!["Nature".to_string()],
            sustainability_preference: (id % 11) as f32,
            travel_style: "Eco-conscious".to_string(),
            budget_level: 3,
            travel_history: history,
        });
    }
    index.build_secondary_indices();
    index.build_interactions();
    Arc::new(index)
}

fn fitted_hybrid() -> HybridRecommender {
    let neural = NeuralCfConfig {
        embedding_dim: 8,
        hidden_layers: vec![16],
        epochs: 2,
        ..NeuralCfConfig::default()
    };
    let mut hybrid =
        HybridRecommender::with_configs(synthetic_index(), HybridConfig::default(), neural);
    hybrid.fit().expect("hybrid fit");
    hybrid
}

fn bench_recommend_weighted(c: &mut Criterion) {
    let hybrid = fitted_hybrid();

    c.bench_function("hybrid_recommend_top20", |b| {
        b.iter(|| {
            let recs = hybrid
                .recommend_weighted(black_box(1), black_box(20), true, black_box(0.3))
                .expect("recommend");
            black_box(recs)
        })
    });
}

fn bench_weight_sweep(c: &mut Criterion) {
    let hybrid = fitted_hybrid();

    c.bench_function("hybrid_weight_sweep", |b| {
        b.iter(|| {
            for weight in [0.0f32, 0.3, 0.7, 1.0] {
                let recs = hybrid
                    .recommend_weighted(black_box(2), 10, true, black_box(weight))
                    .expect("recommend");
                black_box(recs);
            }
        })
    });
}

criterion_group!(benches, bench_recommend_weighted, bench_weight_sweep);
criterion_main!(benches);
